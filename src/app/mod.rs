use crate::adapters::analytics::{AnalyticsClient, AnalyticsSettings};
use crate::core::aggregator::PageviewAggregator;
use crate::domain::model::{DateRange, PageviewCounts};
use crate::domain::ports::DocumentResolver;
use crate::utils::error::Result;
use chrono::NaiveDate;

/// 取得期間內每份文件的 pageviews：
///
/// ```text
/// {<document_id>: <pageviews>, 1: 42, 7: 1337, ...}
/// ```
///
/// `verbose` 只把進度訊息提升到 info 層級，不影響回傳的資料。
/// 任何致命錯誤都不會回傳部分結果。
pub async fn pageviews_by_document<R: DocumentResolver>(
    settings: &AnalyticsSettings,
    resolver: R,
    start_date: NaiveDate,
    end_date: NaiveDate,
    verbose: bool,
) -> Result<PageviewCounts> {
    let range = DateRange::new(start_date, end_date)?;
    let client = AnalyticsClient::connect(settings).await?;

    PageviewAggregator::new(client, resolver)
        .verbose(verbose)
        .aggregate(range)
        .await
}
