//! In-process store used by tests and local dry runs

use crate::db::{PercentageStore, VolumeSource};
use crate::error::{MovecastError, Result};
use crate::models::{CategoryRecord, HistoricalRecord, SeasonalPercentage};
use async_trait::async_trait;
use chrono::Datelike;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

type PercentageKey = (String, String, u32, u32);

#[derive(Default)]
pub struct MemoryStore {
    totals: Vec<HistoricalRecord>,
    categories: Vec<CategoryRecord>,
    percentages: RwLock<BTreeMap<PercentageKey, f64>>,
    failing_upserts: AtomicUsize,
    upsert_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_totals(mut self, totals: Vec<HistoricalRecord>) -> Self {
        self.totals = totals;
        self
    }

    pub fn with_categories(mut self, categories: Vec<CategoryRecord>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_percentages(mut self, rows: Vec<SeasonalPercentage>) -> Self {
        let table = self.percentages.get_mut();
        for row in rows {
            table.insert(
                (row.branch, row.category, row.month, row.day),
                row.avg_percentage,
            );
        }
        self
    }

    /// Make the next `count` upserts fail with a transient error
    pub fn fail_next_upserts(&self, count: usize) {
        self.failing_upserts.store(count, Ordering::SeqCst);
    }

    /// Number of upsert attempts seen, successful or not
    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    /// Whole table, ordered by key
    pub async fn snapshot(&self) -> Vec<SeasonalPercentage> {
        self.percentages
            .read()
            .await
            .iter()
            .map(|((branch, category, month, day), value)| SeasonalPercentage {
                branch: branch.clone(),
                category: category.clone(),
                month: *month,
                day: *day,
                avg_percentage: *value,
            })
            .collect()
    }
}

#[async_trait]
impl VolumeSource for MemoryStore {
    async fn load_totals(&self, min_year: i32, max_year: i32) -> Result<Vec<HistoricalRecord>> {
        Ok(self
            .totals
            .iter()
            .filter(|r| (min_year..=max_year).contains(&r.date.year()))
            .cloned()
            .collect())
    }

    async fn load_categories(
        &self,
        min_year: i32,
        max_year: i32,
    ) -> Result<Vec<CategoryRecord>> {
        Ok(self
            .categories
            .iter()
            .filter(|r| (min_year..=max_year).contains(&r.date.year()))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PercentageStore for MemoryStore {
    async fn upsert_percentages(&self, rows: &[SeasonalPercentage]) -> Result<u64> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failing_upserts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if failing.is_ok() {
            return Err(MovecastError::TransientStore("injected upsert failure".into()));
        }

        let mut table = self.percentages.write().await;
        for row in rows {
            table.insert(
                (row.branch.clone(), row.category.clone(), row.month, row.day),
                row.avg_percentage,
            );
        }
        Ok(rows.len() as u64)
    }

    async fn exact_percentage(
        &self,
        branch: &str,
        category: &str,
        month: u32,
        day: u32,
    ) -> Result<Option<f64>> {
        let table = self.percentages.read().await;
        Ok(table
            .get(&(branch.to_string(), category.to_string(), month, day))
            .copied())
    }

    async fn monthly_average(
        &self,
        branch: &str,
        category: &str,
        month: u32,
    ) -> Result<Option<f64>> {
        let table = self.percentages.read().await;
        let values: Vec<f64> = table
            .iter()
            .filter(|((b, c, m, _), _)| b == branch && c == category && *m == month)
            .map(|(_, v)| *v)
            .collect();
        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(values.iter().sum::<f64>() / values.len() as f64))
    }

    async fn branches(&self) -> Result<Vec<String>> {
        let table = self.percentages.read().await;
        let set: BTreeSet<&String> = table.keys().map(|(b, _, _, _)| b).collect();
        Ok(set.into_iter().cloned().collect())
    }

    async fn categories(&self) -> Result<Vec<String>> {
        let table = self.percentages.read().await;
        let set: BTreeSet<&String> = table.keys().map(|(_, c, _, _)| c).collect();
        Ok(set.into_iter().cloned().collect())
    }
}
