//! Pre-grouped volume tables: the only data the main loop touches

use crate::models::{CategoryRecord, HistoricalRecord};
use std::collections::{BTreeSet, HashMap};

type DayCounts = HashMap<(u32, u32), i64>;

#[derive(Debug, Default)]
pub struct GroupedVolumes {
    /// branch -> category -> (month, day) -> summed count
    category_counts: HashMap<String, HashMap<String, DayCounts>>,
    /// branch -> (month, day) -> summed count
    total_counts: HashMap<String, DayCounts>,
    branches: Vec<String>,
    categories: Vec<String>,
    null_counts: usize,
}

impl GroupedVolumes {
    /// Sum counts per calendar day across all years. Null counts are left out
    /// of the sums and tallied separately. Sums saturate at the `i64` bounds.
    pub fn build(totals: Vec<HistoricalRecord>, categories: Vec<CategoryRecord>) -> Self {
        let mut grouped = Self::default();
        let mut branch_names = BTreeSet::new();
        let mut category_names = BTreeSet::new();

        for record in categories {
            branch_names.insert(record.branch.clone());
            category_names.insert(record.category.clone());
            let key = record.month_day();
            match record.count {
                Some(count) => {
                    let sum = grouped
                        .category_counts
                        .entry(record.branch)
                        .or_default()
                        .entry(record.category)
                        .or_default()
                        .entry(key)
                        .or_insert(0);
                    *sum = sum.saturating_add(count);
                }
                None => grouped.null_counts += 1,
            }
        }

        for record in totals {
            let key = record.month_day();
            match record.count {
                Some(count) => {
                    let sum = grouped
                        .total_counts
                        .entry(record.branch)
                        .or_default()
                        .entry(key)
                        .or_insert(0);
                    *sum = sum.saturating_add(count);
                }
                None => grouped.null_counts += 1,
            }
        }

        grouped.branches = branch_names.into_iter().collect();
        grouped.categories = category_names.into_iter().collect();
        grouped
    }

    pub fn category_count(&self, branch: &str, category: &str, month: u32, day: u32) -> i64 {
        self.category_counts
            .get(branch)
            .and_then(|by_category| by_category.get(category))
            .and_then(|days| days.get(&(month, day)))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_count(&self, branch: &str, month: u32, day: u32) -> i64 {
        self.total_counts
            .get(branch)
            .and_then(|days| days.get(&(month, day)))
            .copied()
            .unwrap_or(0)
    }

    /// Branches with at least one category record, ascending
    pub fn branches(&self) -> &[String] {
        &self.branches
    }

    /// Every category seen in the category records, ascending
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn null_counts(&self) -> usize {
        self.null_counts
    }
}
