//! Field-shape validation for task payloads.
//!
//! Mirrors the write rules enforced on every create/update path:
//! status must be a known enum value, priority an integer in [1,5],
//! title and description non-empty strings. On failure a field-keyed
//! message map is produced and nothing is written.

use crate::error::FieldErrors;
use crate::types::{TaskInput, TaskStatus, PRIORITY_MAX, PRIORITY_MIN};

/// A validated task payload, ready for the store.
#[derive(Debug, Clone)]
pub struct ValidTask {
    pub status: TaskStatus,
    pub priority: i64,
    pub title: String,
    pub description: String,
}

/// Validate a raw payload into a [`ValidTask`] or a field error map.
pub fn validate_task(input: &TaskInput) -> Result<ValidTask, FieldErrors> {
    let mut errors = FieldErrors::new();

    let status = match input.status.as_deref() {
        None => {
            errors
                .entry("status".into())
                .or_default()
                .push("status is required".into());
            None
        }
        Some(s) => match TaskStatus::parse(s) {
            Some(status) => Some(status),
            None => {
                errors
                    .entry("status".into())
                    .or_default()
                    .push("status must be one of: todo, done".into());
                None
            }
        },
    };

    let priority = match input.priority {
        None => {
            errors
                .entry("priority".into())
                .or_default()
                .push("priority is required".into());
            None
        }
        Some(p) if !(PRIORITY_MIN..=PRIORITY_MAX).contains(&p) => {
            errors.entry("priority".into()).or_default().push(format!(
                "priority must be between {PRIORITY_MIN} and {PRIORITY_MAX}"
            ));
            None
        }
        Some(p) => Some(p),
    };

    let title = non_empty_string("title", input.title.as_deref(), &mut errors);
    let description = non_empty_string("description", input.description.as_deref(), &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidTask {
        status: status.expect("checked above"),
        priority: priority.expect("checked above"),
        title: title.expect("checked above"),
        description: description.expect("checked above"),
    })
}

fn non_empty_string(
    field: &str,
    value: Option<&str>,
    errors: &mut FieldErrors,
) -> Option<String> {
    match value {
        None => {
            errors
                .entry(field.into())
                .or_default()
                .push(format!("{field} is required"));
            None
        }
        Some(s) if s.is_empty() => {
            errors
                .entry(field.into())
                .or_default()
                .push(format!("{field} must be a non-empty string"));
            None
        }
        Some(s) => Some(s.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(status: &str, priority: i64, title: &str, description: &str) -> TaskInput {
        TaskInput {
            status: Some(status.to_string()),
            priority: Some(priority),
            title: Some(title.to_string()),
            description: Some(description.to_string()),
        }
    }

    #[test]
    fn accepts_well_formed_payload() {
        let valid = validate_task(&input("todo", 3, "A", "d")).unwrap();
        assert_eq!(valid.status, TaskStatus::Todo);
        assert_eq!(valid.priority, 3);
        assert_eq!(valid.title, "A");
    }

    #[test]
    fn rejects_unknown_status() {
        let errors = validate_task(&input("doing", 3, "A", "d")).unwrap_err();
        assert!(errors["status"][0].contains("todo, done"));
    }

    #[test]
    fn rejects_priority_out_of_range() {
        for p in [0, 6, -1, 100] {
            let errors = validate_task(&input("todo", p, "A", "d")).unwrap_err();
            assert!(errors.contains_key("priority"), "priority {p} accepted");
        }
        assert!(validate_task(&input("todo", 1, "A", "d")).is_ok());
        assert!(validate_task(&input("todo", 5, "A", "d")).is_ok());
    }

    #[test]
    fn rejects_empty_strings() {
        let errors = validate_task(&input("todo", 3, "", "")).unwrap_err();
        assert!(errors.contains_key("title"));
        assert!(errors.contains_key("description"));
    }

    #[test]
    fn missing_fields_reported_per_field() {
        let errors = validate_task(&TaskInput {
            status: None,
            priority: None,
            title: None,
            description: None,
        })
        .unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors["title"], vec!["title is required"]);
    }
}
