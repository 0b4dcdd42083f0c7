//! Append-only log of detected hiccups
//!
//! Unbounded by default. With a cap configured the log evicts the oldest
//! records the same way the history does.

use std::collections::VecDeque;

use crate::HiccupRecord;

#[derive(Debug, Clone, Default)]
pub struct HiccupLog {
    records: VecDeque<HiccupRecord>,
    max_records: Option<usize>,

    /// Number of records ever pushed, including evicted ones
    total: u64,
}

impl HiccupLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cap(max_records: Option<usize>) -> Self {
        Self {
            max_records: max_records.map(|max| max.max(1)),
            ..Self::default()
        }
    }

    pub fn push(&mut self, record: HiccupRecord) {
        self.records.push_back(record);
        self.total += 1;

        if let Some(max) = self.max_records
            && self.records.len() > max
        {
            self.records.pop_front();
        }
    }

    /// Ordered copy of the log, oldest first
    pub fn snapshot(&self) -> Vec<HiccupRecord> {
        self.records.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}
