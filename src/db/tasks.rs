//! Task CRUD and tree operations.

use super::{hierarchy, now_ms, Database};
use crate::error::{ApiError, ApiResult};
use crate::query::{self, TaskFilter};
use crate::types::{CreateTreeResult, SkippedChild, Task, TaskStatus, TaskTreeInput};
use crate::validate::{validate_task, ValidTask};
use anyhow::Result;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

/// Maximum supported tree depth for a single create call. Children nested
/// deeper than this are skipped rather than created, which also bounds the
/// recursion on adversarial input.
pub const MAX_TREE_DEPTH: usize = 32;

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    let status: String = row.get("status")?;

    Ok(Task {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        // The CHECK constraint keeps the column inside the enum.
        status: TaskStatus::parse(&status).unwrap_or(TaskStatus::Todo),
        priority: row.get("priority")?,
        title: row.get("title")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Fetch a task on an existing connection (usable inside transactions).
fn get_task_internal(conn: &Connection, task_id: &str) -> Result<Option<Task>> {
    let mut stmt = conn.prepare("SELECT * FROM tasks WHERE id = ?1")?;

    match stmt.query_row(params![task_id], parse_task_row) {
        Ok(task) => Ok(Some(task)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Insert one task row from validated fields and return it.
fn insert_task(conn: &Connection, owner_id: &str, fields: &ValidTask) -> Result<Task> {
    let now = now_ms();
    let task = Task {
        id: Uuid::now_v7().to_string(),
        user_id: owner_id.to_string(),
        status: fields.status,
        priority: fields.priority,
        title: fields.title.clone(),
        description: fields.description.clone(),
        created_at: now,
        updated_at: now,
    };

    conn.execute(
        "INSERT INTO tasks (id, user_id, status, priority, title, description, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            task.id,
            task.user_id,
            task.status.as_str(),
            task.priority,
            task.title,
            task.description,
            task.created_at,
            task.updated_at,
        ],
    )?;

    Ok(task)
}

impl Database {
    /// Create a root task and its nested children for `owner_id`.
    ///
    /// The root must validate or nothing is created. Children are
    /// best-effort: a child that fails validation is skipped together with
    /// its whole subtree while its siblings continue, and each skip is
    /// reported in the result. The whole walk runs inside one transaction,
    /// so every created task commits together with its closure edges.
    pub fn create_tree(&self, owner_id: &str, input: &TaskTreeInput) -> ApiResult<CreateTreeResult> {
        let root_fields = validate_task(&input.fields).map_err(ApiError::Validation)?;

        let mut created = 0usize;
        let mut skipped: Vec<SkippedChild> = Vec::new();

        let task = self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let root = insert_task(&tx, owner_id, &root_fields)?;
            created += 1;

            for child in &input.children {
                create_child_recursive(
                    &tx,
                    owner_id,
                    &root.id,
                    child,
                    1,
                    &mut created,
                    &mut skipped,
                )?;
            }

            tx.commit()?;
            Ok(root)
        })?;

        Ok(CreateTreeResult {
            task,
            created,
            skipped,
        })
    }

    /// Get a task by id.
    pub fn get_task(&self, task_id: &str) -> Result<Option<Task>> {
        self.with_conn(|conn| get_task_internal(conn, task_id))
    }

    /// List tasks owned by `owner_id`, filtered and sorted per the plan.
    /// Without a recognized sort field the rows come back in storage order.
    pub fn list_tasks(&self, owner_id: &str, filter: &TaskFilter) -> Result<Vec<Task>> {
        let plan = query::build_plan(filter);

        self.with_conn(|conn| {
            let mut sql = String::from("SELECT * FROM tasks WHERE user_id = ?");
            for condition in &plan.conditions {
                sql.push_str(" AND ");
                sql.push_str(condition);
            }
            if let Some(ref order_by) = plan.order_by {
                sql.push_str(" ORDER BY ");
                sql.push_str(order_by);
            }

            let mut params_refs: Vec<&dyn rusqlite::ToSql> = vec![&owner_id];
            params_refs.extend(plan.params.iter().map(|b| b.as_ref()));

            let mut stmt = conn.prepare(&sql)?;
            let tasks = stmt
                .query_map(params_refs.as_slice(), parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(tasks)
        })
    }

    /// Full-field update. All four fields are replaced from the validated
    /// payload; hierarchy edges are untouched.
    pub fn update_task(&self, task_id: &str, fields: &ValidTask) -> ApiResult<Task> {
        let now = now_ms();

        let task = self.with_conn(|conn| {
            let task = get_task_internal(conn, task_id)?;
            let Some(task) = task else {
                return Ok(None);
            };

            conn.execute(
                "UPDATE tasks SET status = ?1, priority = ?2, title = ?3, description = ?4, updated_at = ?5
                 WHERE id = ?6",
                params![
                    fields.status.as_str(),
                    fields.priority,
                    fields.title,
                    fields.description,
                    now,
                    task_id,
                ],
            )?;

            Ok(Some(Task {
                status: fields.status,
                priority: fields.priority,
                title: fields.title.clone(),
                description: fields.description.clone(),
                updated_at: now,
                ..task
            }))
        })?;

        task.ok_or_else(ApiError::task_not_found)
    }

    /// Mark a task done when `is_done` is true. A false flag performs no
    /// mutation and returns `None` (it does not revert the status).
    pub fn complete_task(&self, task_id: &str, is_done: bool) -> ApiResult<Option<Task>> {
        let now = now_ms();

        let task = self.with_conn(|conn| {
            let Some(task) = get_task_internal(conn, task_id)? else {
                return Ok(None);
            };

            if !is_done {
                return Ok(Some(None));
            }

            conn.execute(
                "UPDATE tasks SET status = 'done', updated_at = ?1 WHERE id = ?2",
                params![now, task_id],
            )?;

            Ok(Some(Some(Task {
                status: TaskStatus::Done,
                updated_at: now,
                ..task
            })))
        })?;

        task.ok_or_else(ApiError::task_not_found)
    }

    /// Delete a task. Completed tasks are immutable against deletion and
    /// yield a conflict. The cascading foreign keys remove every closure
    /// edge touching the task; descendant tasks themselves survive and
    /// become roots of their own subtrees.
    pub fn delete_task(&self, task_id: &str) -> ApiResult<()> {
        let outcome = self.with_conn(|conn| {
            let Some(task) = get_task_internal(conn, task_id)? else {
                return Ok(None);
            };

            if task.status == TaskStatus::Done {
                return Ok(Some(false));
            }

            conn.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
            Ok(Some(true))
        })?;

        match outcome {
            None => Err(ApiError::task_not_found()),
            Some(false) => Err(ApiError::Conflict(
                "Task is done! We can't delete it!".to_string(),
            )),
            Some(true) => Ok(()),
        }
    }
}

/// Create one child node and recurse into its children. Validation
/// failures and depth overflows record a skip entry and prune the subtree;
/// they never abort the surrounding transaction.
fn create_child_recursive(
    conn: &Connection,
    owner_id: &str,
    parent_id: &str,
    input: &TaskTreeInput,
    depth: usize,
    created: &mut usize,
    skipped: &mut Vec<SkippedChild>,
) -> Result<()> {
    if depth > MAX_TREE_DEPTH {
        skipped.push(SkippedChild {
            title: input.fields.title.clone(),
            errors: [(
                "children".to_string(),
                vec![format!("tree exceeds maximum depth of {MAX_TREE_DEPTH}")],
            )]
            .into_iter()
            .collect(),
        });
        return Ok(());
    }

    let fields = match validate_task(&input.fields) {
        Ok(fields) => fields,
        Err(errors) => {
            skipped.push(SkippedChild {
                title: input.fields.title.clone(),
                errors,
            });
            return Ok(());
        }
    };

    let child = insert_task(conn, owner_id, &fields)?;
    hierarchy::link_child(conn, parent_id, &child.id)?;
    *created += 1;

    for grandchild in &input.children {
        create_child_recursive(
            conn,
            owner_id,
            &child.id,
            grandchild,
            depth + 1,
            created,
            skipped,
        )?;
    }

    Ok(())
}
