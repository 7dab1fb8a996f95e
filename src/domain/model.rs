use crate::utils::error::{AnalyticsError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

/// 呼叫端指定的查詢區間（含首尾兩天）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl DateRange {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self> {
        if start_date > end_date {
            return Err(AnalyticsError::ValidationError {
                message: format!(
                    "start date {} is after end date {}",
                    start_date, end_date
                ),
            });
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }
}

/// 單次分頁查詢所涵蓋的子區間
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    /// 區間跨越的天數（start == end 時為 0）
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    pub path: String,
    pub pageviews: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportPage {
    pub total_results: u64,
    pub rows: Vec<RawRow>,
}

/// 一次分頁請求的參數；報表維度與篩選條件由 ReportSource 實作決定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub window: Window,
    pub start_index: u64,
    pub max_results: u64,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DocumentId(pub u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for DocumentId {
    fn from(id: u64) -> Self {
        DocumentId(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct PageviewCounts {
    counts: BTreeMap<DocumentId, u64>,
}

impl PageviewCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// 同一份文件可能因網址參數出現多次，累加而不是覆蓋
    pub fn add(&mut self, id: DocumentId, pageviews: u64) {
        *self.counts.entry(id).or_insert(0) += pageviews;
    }

    pub fn get(&self, id: DocumentId) -> Option<u64> {
        self.counts.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, DocumentId, u64> {
        self.counts.iter()
    }

    pub fn into_inner(self) -> BTreeMap<DocumentId, u64> {
        self.counts
    }
}

impl<'a> IntoIterator for &'a PageviewCounts {
    type Item = (&'a DocumentId, &'a u64);
    type IntoIter = btree_map::Iter<'a, DocumentId, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<(DocumentId, u64)> for PageviewCounts {
    fn from_iter<I: IntoIterator<Item = (DocumentId, u64)>>(iter: I) -> Self {
        let mut counts = PageviewCounts::new();
        for (id, pageviews) in iter {
            counts.add(id, pageviews);
        }
        counts
    }
}

/// 執行摘要；未能對應到文件的路徑不算錯誤，只在這裡計數
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RunSummary {
    pub windows: usize,
    pub pages: usize,
    pub rows: u64,
    pub unresolved_rows: u64,
    pub unresolved_pageviews: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageviewReport {
    pub range: DateRange,
    pub counts: PageviewCounts,
    pub summary: RunSummary,
}
