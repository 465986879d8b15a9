//! Deterministic enumeration of (branch, category, month, day)

use crate::models::Combination;

pub const MONTHS: u32 = 12;
pub const DAYS_PER_MONTH: u32 = 31;

/// Full Cartesian product over sorted branches and categories. Invalid
/// calendar days are still enumerated; the aggregator skips them, so the
/// order never depends on the calendar.
#[derive(Debug, Clone)]
pub struct CombinationSpace {
    branches: Vec<String>,
    categories: Vec<String>,
}

impl CombinationSpace {
    pub fn new(branches: &[String], categories: &[String]) -> Self {
        let mut branches = branches.to_vec();
        let mut categories = categories.to_vec();
        branches.sort();
        branches.dedup();
        categories.sort();
        categories.dedup();
        Self {
            branches,
            categories,
        }
    }

    pub fn len(&self) -> usize {
        self.branches.len() * self.categories.len() * (MONTHS * DAYS_PER_MONTH) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Combination> + '_ {
        self.branches.iter().flat_map(move |branch| {
            self.categories.iter().flat_map(move |category| {
                (1..=MONTHS).flat_map(move |month| {
                    (1..=DAYS_PER_MONTH)
                        .map(move |day| Combination::new(branch.as_str(), category.as_str(), month, day))
                })
            })
        })
    }
}
