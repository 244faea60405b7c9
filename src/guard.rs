//! Ownership check applied before every mutating task operation.

use crate::types::Task;

/// Returns true iff the acting user owns the task.
///
/// Never errors; callers map `false` to a permission-denied outcome.
/// The check is a plain equality today, but it is the single choke point
/// any future sharing model would extend.
pub fn can_access(acting_user_id: &str, task: &Task) -> bool {
    task.user_id == acting_user_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskStatus;

    fn task_owned_by(user_id: &str) -> Task {
        Task {
            id: "t1".into(),
            user_id: user_id.into(),
            status: TaskStatus::Todo,
            priority: 3,
            title: "A".into(),
            description: "d".into(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn owner_is_allowed() {
        assert!(can_access("alice", &task_owned_by("alice")));
    }

    #[test]
    fn non_owner_is_denied() {
        assert!(!can_access("bob", &task_owned_by("alice")));
    }
}
