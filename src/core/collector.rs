use crate::core::retry::{with_retry, RetryPolicy};
use crate::domain::model::{PageRequest, PageviewCounts, RunSummary, Window};
use crate::domain::ports::{DocumentResolver, ReportSource};
use crate::utils::error::Result;

/// Reporting API 單頁最多回傳的筆數
pub const PAGE_SIZE: u64 = 10_000;

/// 在單一視窗內逐頁抓取，並把 pageviews 累加到共用的統計表
pub struct PageCollector<'a, S: ReportSource, R: DocumentResolver> {
    source: &'a S,
    resolver: &'a R,
    retry: RetryPolicy,
    page_size: u64,
    verbose: bool,
}

impl<'a, S: ReportSource, R: DocumentResolver> PageCollector<'a, S, R> {
    pub fn new(source: &'a S, resolver: &'a R) -> Self {
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
        self.page_size = page_size.max(1);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub async fn collect_window(
        &self,
        window: Window,
        counts: &mut PageviewCounts,
        summary: &mut RunSummary,
    ) -> Result<()> {
        progress(self.verbose, format_args!("Fetching data for {}:", window));

        let mut start_index = 1;
        loop {
            let request = PageRequest {
                window,
                start_index,
                max_results: self.page_size,
            };
            let label = format!("{} @ {}", window, start_index);
            let page = with_retry(&label, self.retry, || self.source.fetch_page(&request)).await?;

            summary.pages += 1;
            let fetched = (start_index + self.page_size - 1).min(page.total_results);
            progress(
                self.verbose,
                format_args!("- Got {} of {} results.", fetched, page.total_results),
            );

            for row in page.rows {
                summary.rows += 1;
                match self.resolver.resolve(&row.path) {
                    Some(id) => counts.add(id, row.pageviews),
                    None => {
                        tracing::trace!("Skipping unresolved path {}", row.path);
                        summary.unresolved_rows += 1;
                        summary.unresolved_pageviews += row.pageviews;
                    }
                }
            }

            start_index += self.page_size;
            if start_index > page.total_results {
                break;
            }
        }

        summary.windows += 1;
        Ok(())
    }
}

fn progress(verbose: bool, message: std::fmt::Arguments<'_>) {
    if verbose {
        tracing::info!("{}", message);
    } else {
        tracing::debug!("{}", message);
    }
}
