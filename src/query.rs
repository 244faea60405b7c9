//! Translates list-endpoint query parameters into a storage query plan.
//!
//! All recognized filters compose with AND. Unrecognized sort fields are
//! ignored rather than rejected, matching the permissive contract of the
//! list endpoint.

use rusqlite::ToSql;
use serde::Deserialize;

/// Raw filter/sort parameters as they arrive on the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFilter {
    /// Exact status match ("todo" or "done").
    pub status: Option<String>,
    /// Inclusive priority range as "low,high".
    pub priority: Option<String>,
    /// Case-sensitive title substring.
    pub title: Option<String>,
    /// "created_at" or "priority"; anything else applies no sort.
    pub sort_field: Option<String>,
    /// "desc" (case-insensitive) for descending; anything else is ascending.
    pub sort_type: Option<String>,
}

/// A composed WHERE/ORDER BY plan for the task list query.
pub struct QueryPlan {
    /// SQL fragments to AND onto the owner-scoped WHERE clause.
    pub conditions: Vec<&'static str>,
    /// Positional parameters matching `conditions`, in order.
    pub params: Vec<Box<dyn ToSql>>,
    /// Full ORDER BY expression, if a recognized sort field was given.
    pub order_by: Option<String>,
}

/// Build a query plan from the raw filter parameters.
pub fn build_plan(filter: &TaskFilter) -> QueryPlan {
    let mut conditions: Vec<&'static str> = Vec::new();
    let mut params: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(status) = filter.status.as_deref().filter(|s| !s.is_empty()) {
        conditions.push("status = ?");
        params.push(Box::new(status.to_string()));
    }

    if let Some((low, high)) = filter.priority.as_deref().and_then(parse_priority_range) {
        conditions.push("priority BETWEEN ? AND ?");
        params.push(Box::new(low));
        params.push(Box::new(high));
    }

    if let Some(title) = filter.title.as_deref().filter(|t| !t.is_empty()) {
        // instr() keeps the match case-sensitive; LIKE folds ASCII case.
        conditions.push("instr(title, ?) > 0");
        params.push(Box::new(title.to_string()));
    }

    QueryPlan {
        conditions,
        params,
        order_by: build_order_by(filter.sort_field.as_deref(), filter.sort_type.as_deref()),
    }
}

/// Parse "low,high" into an inclusive range. Malformed input (wrong arity,
/// non-integers) yields `None` and the priority filter is not applied.
fn parse_priority_range(raw: &str) -> Option<(i64, i64)> {
    let mut parts = raw.split(',');
    let low = parts.next()?.trim().parse::<i64>().ok()?;
    let high = parts.next()?.trim().parse::<i64>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((low, high))
}

fn build_order_by(sort_field: Option<&str>, sort_type: Option<&str>) -> Option<String> {
    let field = match sort_field {
        Some("created_at") => "created_at",
        Some("priority") => "priority",
        _ => return None,
    };

    let direction = match sort_type {
        Some(t) if t.eq_ignore_ascii_case("desc") => "DESC",
        _ => "ASC",
    };

    Some(format!("{field} {direction}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_builds_empty_plan() {
        let plan = build_plan(&TaskFilter::default());
        assert!(plan.conditions.is_empty());
        assert!(plan.params.is_empty());
        assert!(plan.order_by.is_none());
    }

    #[test]
    fn status_and_title_conditions_compose() {
        let plan = build_plan(&TaskFilter {
            status: Some("todo".into()),
            title: Some("groceries".into()),
            ..Default::default()
        });
        assert_eq!(plan.conditions, vec!["status = ?", "instr(title, ?) > 0"]);
        assert_eq!(plan.params.len(), 2);
    }

    #[test]
    fn priority_range_parses_two_integers() {
        assert_eq!(parse_priority_range("2,4"), Some((2, 4)));
        assert_eq!(parse_priority_range(" 1 , 5 "), Some((1, 5)));
        assert_eq!(parse_priority_range("2"), None);
        assert_eq!(parse_priority_range("2,4,5"), None);
        assert_eq!(parse_priority_range("a,b"), None);
    }

    #[test]
    fn malformed_priority_range_is_ignored() {
        let plan = build_plan(&TaskFilter {
            priority: Some("high".into()),
            ..Default::default()
        });
        assert!(plan.conditions.is_empty());
    }

    #[test]
    fn unrecognized_sort_field_applies_no_order() {
        assert_eq!(build_order_by(Some("title"), Some("desc")), None);
        assert_eq!(build_order_by(None, Some("desc")), None);
    }

    #[test]
    fn sort_type_defaults_to_asc() {
        assert_eq!(
            build_order_by(Some("priority"), None).as_deref(),
            Some("priority ASC")
        );
        assert_eq!(
            build_order_by(Some("priority"), Some("descending")).as_deref(),
            Some("priority ASC")
        );
        assert_eq!(
            build_order_by(Some("created_at"), Some("DeSc")).as_deref(),
            Some("created_at DESC")
        );
    }
}
