use crate::domain::model::{Semester, Subject};
use crate::domain::policy::CollectionLimits;
use serde::Serialize;
use std::fmt;

/// Credit weight of a row for limit checks. Blank credits weigh nothing.
pub trait Weighted {
    fn weight(&self) -> u32;
}

impl Weighted for Subject {
    fn weight(&self) -> u32 {
        self.credits().unwrap_or(0)
    }
}

impl Weighted for Semester {
    fn weight(&self) -> u32 {
        self.credits().unwrap_or(0)
    }
}

/// Rows whose display name follows their position.
pub trait Numbered {
    fn renumber(&mut self, number: usize);
}

impl Numbered for Semester {
    fn renumber(&mut self, number: usize) {
        self.set_number(number)
    }
}

pub fn total_weight<T: Weighted>(items: &[T]) -> u32 {
    items.iter().map(Weighted::weight).sum()
}

/// Pops rows off the end until the total weight fits `max_total`. The last
/// remaining row is never removed. Returns how many rows were popped.
pub fn prune_excess<T: Weighted>(items: &mut Vec<T>, max_total: u32) -> usize {
    let mut removed = 0;
    while items.len() > 1 && total_weight(items) > max_total {
        items.pop();
        removed += 1;
    }
    removed
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Admission {
    Admitted,
    RowLimitReached,
    CreditLimitReached,
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted)
    }
}

/// Look-ahead check for a new row: refused when the row count is at its
/// maximum or when a row of default weight would not fit.
pub fn admits<T: Weighted>(items: &[T], limits: &CollectionLimits) -> Admission {
    if items.len() >= limits.max_rows {
        return Admission::RowLimitReached;
    }
    let headroom = limits.max_total_credits.saturating_sub(total_weight(items));
    if headroom < limits.default_credits {
        return Admission::CreditLimitReached;
    }
    Admission::Admitted
}

/// Renumbers rows `1..=n` in their current order.
pub fn renumber<T: Numbered>(items: &mut [T]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.renumber(index + 1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RowKind {
    Subject,
    Semester,
}

/// Produced whenever pruning removed rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PruneNotice {
    pub kind: RowKind,
    pub removed: usize,
    pub max_total_credits: u32,
}

impl PruneNotice {
    pub fn from_pruned(kind: RowKind, removed: usize, max_total_credits: u32) -> Option<Self> {
        (removed > 0).then_some(Self {
            kind,
            removed,
            max_total_credits,
        })
    }
}

impl fmt::Display for PruneNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = match self.kind {
            RowKind::Subject => "semester",
            RowKind::Semester => "programme",
        };
        write!(
            f,
            "Automatically deleted last {} columns: total credits exceeded the {} limit of {}",
            self.removed, scope, self.max_total_credits
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(u32, usize);

    impl Weighted for Row {
        fn weight(&self) -> u32 {
            self.0
        }
    }

    impl Numbered for Row {
        fn renumber(&mut self, number: usize) {
            self.1 = number;
        }
    }

    #[test]
    fn test_prune_pops_from_end() {
        let mut rows = vec![Row(6, 1), Row(6, 2), Row(6, 3), Row(6, 4)];
        let removed = prune_excess(&mut rows, 21);
        assert_eq!(removed, 1);
        assert_eq!(rows.len(), 3);
        assert_eq!(total_weight(&rows), 18);
    }

    #[test]
    fn test_prune_keeps_sole_row() {
        let mut rows = vec![Row(30, 1)];
        assert_eq!(prune_excess(&mut rows, 21), 0);
        assert_eq!(rows.len(), 1);

        let mut rows = vec![Row(25, 1), Row(3, 2), Row(3, 3)];
        assert_eq!(prune_excess(&mut rows, 21), 2);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_prune_within_limit_is_noop() {
        let mut rows = vec![Row(18, 1), Row(18, 2)];
        assert_eq!(prune_excess(&mut rows, 216), 0);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_admission() {
        let limits = CollectionLimits::SUBJECTS;
        let full: Vec<Row> = (1..=7).map(|i| Row(2, i)).collect();
        assert_eq!(admits(&full, &limits), Admission::RowLimitReached);

        let heavy = vec![Row(6, 1), Row(6, 2), Row(6, 3), Row(1, 4)];
        assert_eq!(admits(&heavy, &limits), Admission::CreditLimitReached);

        let exact = vec![Row(6, 1), Row(6, 2), Row(6, 3)];
        assert_eq!(admits(&exact, &limits), Admission::Admitted);
    }

    #[test]
    fn test_admission_saturates_when_over_limit() {
        let limits = CollectionLimits::SUBJECTS;
        let over = vec![Row(30, 1)];
        assert_eq!(admits(&over, &limits), Admission::CreditLimitReached);
    }

    #[test]
    fn test_renumber_is_contiguous() {
        let mut rows = vec![Row(1, 1), Row(1, 3), Row(1, 4)];
        renumber(&mut rows);
        let numbers: Vec<usize> = rows.iter().map(|r| r.1).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_notice_only_when_rows_removed() {
        assert!(PruneNotice::from_pruned(RowKind::Subject, 0, 21).is_none());
        let notice = PruneNotice::from_pruned(RowKind::Semester, 2, 216).unwrap();
        assert_eq!(
            notice.to_string(),
            "Automatically deleted last 2 columns: total credits exceeded the programme limit of 216"
        );
    }
}
