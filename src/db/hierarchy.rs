//! Closure-table maintenance for the task hierarchy.
//!
//! Every non-root task carries one edge per proper ancestor, with the
//! depth equal to the hop count. Linking happens inside the transaction
//! that creates the child, after the parent's own edges exist, so the
//! closure property holds at every commit point. Edge removal is left
//! entirely to the `ON DELETE CASCADE` foreign keys.

use super::{now_ms, Database};
use crate::types::Edge;
use anyhow::Result;
use rusqlite::{params, Connection, Row};

fn parse_edge_row(row: &Row) -> rusqlite::Result<Edge> {
    Ok(Edge {
        ancestor: row.get("ancestor")?,
        descendant: row.get("descendant")?,
        depth: row.get("depth")?,
    })
}

/// Link `child_id` under `parent_id`: insert the depth-1 edge plus one
/// edge per ancestor of the parent at that ancestor's depth + 1.
///
/// Must run on the connection (or transaction) that created the child,
/// and only after the parent's own ancestor edges are fully in place.
pub fn link_child(conn: &Connection, parent_id: &str, child_id: &str) -> Result<()> {
    let now = now_ms();

    conn.execute(
        "INSERT INTO task_relationships (ancestor, descendant, depth, created_at)
         VALUES (?1, ?2, 1, ?3)",
        params![parent_id, child_id, now],
    )?;

    conn.execute(
        "INSERT INTO task_relationships (ancestor, descendant, depth, created_at)
         SELECT ancestor, ?2, depth + 1, ?3
         FROM task_relationships
         WHERE descendant = ?1",
        params![parent_id, child_id, now],
    )?;

    Ok(())
}

/// Ancestor chain of a task, nearest first.
pub fn ancestors_of(conn: &Connection, task_id: &str) -> Result<Vec<Edge>> {
    let mut stmt = conn.prepare(
        "SELECT ancestor, descendant, depth FROM task_relationships
         WHERE descendant = ?1 ORDER BY depth",
    )?;
    let edges = stmt
        .query_map(params![task_id], parse_edge_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(edges)
}

/// All edges where the task is the ancestor, shallowest first.
pub fn descendants_of(conn: &Connection, task_id: &str) -> Result<Vec<Edge>> {
    let mut stmt = conn.prepare(
        "SELECT ancestor, descendant, depth FROM task_relationships
         WHERE ancestor = ?1 ORDER BY depth",
    )?;
    let edges = stmt
        .query_map(params![task_id], parse_edge_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(edges)
}

impl Database {
    /// Every edge touching a task, in either direction. Used by tests to
    /// assert the closure invariants.
    pub fn edges_for(&self, task_id: &str) -> Result<Vec<Edge>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT ancestor, descendant, depth FROM task_relationships
                 WHERE ancestor = ?1 OR descendant = ?1
                 ORDER BY depth, ancestor, descendant",
            )?;
            let edges = stmt
                .query_map(params![task_id], parse_edge_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(edges)
        })
    }

    /// Ancestor edges of a task, nearest first.
    pub fn task_ancestors(&self, task_id: &str) -> Result<Vec<Edge>> {
        self.with_conn(|conn| ancestors_of(conn, task_id))
    }

    /// Descendant edges of a task, shallowest first.
    pub fn task_descendants(&self, task_id: &str) -> Result<Vec<Edge>> {
        self.with_conn(|conn| descendants_of(conn, task_id))
    }
}
