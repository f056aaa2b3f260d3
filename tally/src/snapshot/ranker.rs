//! Ranking
//!
//! Total order: count descending, then PID ascending. The tie-break keeps
//! output stable across ticks when counts are equal.

use std::cmp::Ordering;

use crate::domain::{Entry, RankedView, Snapshot};

/// Sort `snapshot` and keep the first `top_n` entries.
#[must_use]
pub fn rank(snapshot: Snapshot, top_n: usize) -> RankedView {
    let mut entries = snapshot.into_entries();
    entries.sort_unstable_by(by_rank);
    entries.truncate(top_n);
    RankedView::from_ranked(entries)
}

fn by_rank(a: &Entry, b: &Entry) -> Ordering {
    b.count.cmp(&a.count).then_with(|| a.pid.cmp(&b.pid))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ties_break_by_pid() {
        let snapshot = Snapshot::from(vec![Entry::new(5, 10), Entry::new(2, 10), Entry::new(9, 3)]);
        let view = rank(snapshot, 2);
        assert_eq!(view.entries(), &[Entry::new(2, 10), Entry::new(5, 10)]);
    }

    #[test]
    fn test_top_n_larger_than_snapshot() {
        let snapshot = Snapshot::from(vec![Entry::new(1, 1), Entry::new(2, 2)]);
        let view = rank(snapshot, 10);
        assert_eq!(view.entries(), &[Entry::new(2, 2), Entry::new(1, 1)]);
    }

    #[test]
    fn test_empty_snapshot_and_zero_width() {
        assert!(rank(Snapshot::new(), 5).is_empty());
        assert!(rank(Snapshot::from(vec![Entry::new(1, 1)]), 0).is_empty());
    }
}
