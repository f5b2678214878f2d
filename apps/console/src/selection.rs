//! Selected-id bookkeeping, shared by all three entity families.
//!
//! The rules are pure functions over the current list snapshot so the cache
//! can re-run them after every list application and after deletes.

use crate::types::HasId;

/// Reconcile a selection against the rows it points into: an empty list
/// clears it, a vanished id falls back to the first row, a surviving id is
/// kept.
pub fn reconcile_selection<S: HasId>(selected: Option<&str>, rows: &[S]) -> Option<String> {
    let first = rows.first()?;
    match selected {
        Some(id) if rows.iter().any(|row| row.id() == id) => Some(id.to_string()),
        _ => Some(first.id().to_string()),
    }
}

/// Resolve an explicitly requested id. Unlike [`reconcile_selection`] there
/// is no fallback: asking for an id the list does not contain resolves to
/// nothing, so the caller can answer not-found instead of silently showing
/// a different record.
pub fn resolve_requested<S: HasId>(requested: &str, rows: &[S]) -> Option<String> {
    rows.iter()
        .find(|row| row.id() == requested)
        .map(|row| row.id().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(&'static str);

    impl HasId for Row {
        fn id(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn empty_list_clears_the_selection() {
        assert_eq!(reconcile_selection(Some("r-1"), &[] as &[Row]), None);
        assert_eq!(reconcile_selection(None, &[] as &[Row]), None);
    }

    #[test]
    fn vanished_id_falls_back_to_the_first_row() {
        let rows = [Row("r-2"), Row("r-3")];
        assert_eq!(
            reconcile_selection(Some("r-1"), &rows),
            Some("r-2".to_string())
        );
        assert_eq!(reconcile_selection(None, &rows), Some("r-2".to_string()));
    }

    #[test]
    fn surviving_id_is_kept() {
        let rows = [Row("r-2"), Row("r-3")];
        assert_eq!(
            reconcile_selection(Some("r-3"), &rows),
            Some("r-3".to_string())
        );
    }

    #[test]
    fn requested_id_must_exist() {
        let rows = [Row("r-2"), Row("r-3")];
        assert_eq!(resolve_requested("r-3", &rows), Some("r-3".to_string()));
        assert_eq!(resolve_requested("r-9", &rows), None);
    }
}
