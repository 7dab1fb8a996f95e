use crate::core::collector::{PageCollector, PAGE_SIZE};
use crate::core::range::RangeWalker;
use crate::core::retry::RetryPolicy;
use crate::domain::model::{DateRange, PageviewCounts, PageviewReport, RunSummary};
use crate::domain::ports::{DocumentResolver, ReportSource};
use crate::utils::error::Result;

/// 依文件彙總某段期間的 pageviews。
///
/// 視窗與分頁都是依序處理：下一頁的 `start_index` 取決於上一頁的結果，
/// 而所有視窗共用同一份累計表。任何致命錯誤都會中止整個彙總，不回傳部分結果。
pub struct PageviewAggregator<S: ReportSource, R: DocumentResolver> {
    source: S,
    resolver: R,
    retry: RetryPolicy,
    page_size: u64,
    verbose: bool,
}

impl<S: ReportSource, R: DocumentResolver> PageviewAggregator<S, R> {
    pub fn new(source: S, resolver: R) -> Self {
        Self {
            source,
            resolver,
            retry: RetryPolicy::default(),
            page_size: PAGE_SIZE,
            verbose: false,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    /// 只影響進度訊息的輸出層級，不影響結果
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub async fn aggregate(&self, range: DateRange) -> Result<PageviewCounts> {
        Ok(self.aggregate_report(range).await?.counts)
    }

    pub async fn aggregate_report(&self, range: DateRange) -> Result<PageviewReport> {
        let collector = PageCollector::new(&self.source, &self.resolver)
            .with_retry_policy(self.retry)
            .with_page_size(self.page_size)
            .verbose(self.verbose);

        let mut counts = PageviewCounts::new();
        let mut summary = RunSummary::default();

        for window in RangeWalker::new(range) {
            collector
                .collect_window(window, &mut counts, &mut summary)
                .await?;
        }

        tracing::info!(
            "📊 Aggregated {} pageviews for {} documents ({} windows, {} pages)",
            counts.total(),
            counts.len(),
            summary.windows,
            summary.pages
        );
        if summary.unresolved_rows > 0 {
            tracing::info!(
                "📊 Skipped {} unresolved paths ({} pageviews)",
                summary.unresolved_rows,
                summary.unresolved_pageviews
            );
        }

        Ok(PageviewReport {
            range,
            counts,
            summary,
        })
    }
}
