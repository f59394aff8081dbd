//! Rotation Cursor Resolver
//!
//! No cursor is persisted between processing passes. The position where a
//! pool's rotation left off is recovered from the position identifiers the
//! event's volunteers already hold: the most recent identifier that occurs
//! exactly once is the anchor, and the rotation resumes right after it.
//!
//! The scan direction depends on whether the role class is mid-cycle:
//! - some entries blank (unassigned volunteers present): scan from the end
//! - no blank entries (every volunteer placed): scan from the start

use std::collections::HashMap;

fn non_blank(entry: Option<&str>) -> Option<&str> {
    entry.filter(|id| !id.trim().is_empty())
}

/// Latest uniquely-occurring identifier in `used`, if any.
///
/// `used` is in storage order, which reflects assignment order. Returns
/// `None` for an empty list, an all-blank list, or when every identifier
/// occurs more than once.
pub fn latest_unique_anchor<'a>(used: &[Option<&'a str>]) -> Option<&'a str> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut partial_cycle = false;

    for entry in used {
        match non_blank(*entry) {
            Some(id) => *counts.entry(id).or_default() += 1,
            None => partial_cycle = true,
        }
    }

    let unique = |entry: &Option<&'a str>| non_blank(*entry).filter(|id| counts.get(id) == Some(&1));

    if partial_cycle {
        used.iter().rev().find_map(unique)
    } else {
        used.iter().find_map(unique)
    }
}

/// Next round-robin index into `pool`.
///
/// 0 when there is no anchor or the anchor is no longer in the pool,
/// otherwise the index right after the anchor, wrapping at the pool end.
pub fn resolve_cursor(used: &[Option<&str>], pool: &[&str]) -> usize {
    let Some(anchor) = latest_unique_anchor(used) else {
        return 0;
    };

    match pool.iter().position(|id| *id == anchor) {
        Some(index) => (index + 1) % pool.len(),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POOL: [&str; 4] = ["P1", "P2", "P3", "P4"];

    #[test]
    fn test_empty_input_has_no_anchor() {
        assert_eq!(latest_unique_anchor(&[]), None);
        assert_eq!(resolve_cursor(&[], &POOL), 0);
    }

    #[test]
    fn test_all_blank_has_no_anchor() {
        let used = [None, Some(""), Some("   ")];
        assert_eq!(latest_unique_anchor(&used), None);
        assert_eq!(resolve_cursor(&used, &POOL), 0);
    }

    #[test]
    fn test_single_identifier() {
        let used = [Some("P2")];
        assert_eq!(latest_unique_anchor(&used), Some("P2"));
        assert_eq!(resolve_cursor(&used, &POOL), 2);
    }

    #[test]
    fn test_all_duplicated_has_no_anchor() {
        let used = [Some("P1"), Some("P2"), Some("P1"), Some("P2")];
        assert_eq!(latest_unique_anchor(&used), None);
        assert_eq!(resolve_cursor(&used, &POOL), 0);

        let with_blank = [Some("P1"), Some("P1"), None];
        assert_eq!(latest_unique_anchor(&with_blank), None);
    }

    #[test]
    fn test_partial_cycle_scans_backward() {
        // Unassigned entries present: last unique wins
        let used = [Some("P1"), Some("P2"), Some("P3"), None];
        assert_eq!(latest_unique_anchor(&used), Some("P3"));
        assert_eq!(resolve_cursor(&used, &POOL), 3);
    }

    #[test]
    fn test_partial_cycle_skips_duplicates_from_end() {
        let used = [Some("P1"), Some("P2"), Some("P3"), Some("P3"), None];
        assert_eq!(latest_unique_anchor(&used), Some("P2"));
    }

    #[test]
    fn test_full_cycle_scans_forward() {
        // Wrapped once: P1, P2 repeat; P3 is the first single occurrence
        let used = [Some("P1"), Some("P2"), Some("P3"), Some("P4"), Some("P1"), Some("P2")];
        assert_eq!(latest_unique_anchor(&used), Some("P3"));
        assert_eq!(resolve_cursor(&used, &POOL), 3);
    }

    #[test]
    fn test_wraps_at_pool_end() {
        let used = [Some("P4"), None];
        assert_eq!(resolve_cursor(&used, &POOL), 0);
    }

    #[test]
    fn test_anchor_outside_pool_restarts() {
        let used = [Some("GONE"), None];
        assert_eq!(latest_unique_anchor(&used), Some("GONE"));
        assert_eq!(resolve_cursor(&used, &POOL), 0);
    }

    #[test]
    fn test_empty_pool() {
        assert_eq!(resolve_cursor(&[Some("P1")], &[]), 0);
    }
}
