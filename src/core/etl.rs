use crate::core::aggregator::PageviewAggregator;
use crate::domain::model::{DateRange, PageviewReport};
use crate::domain::ports::{DocumentResolver, ReportSource, Storage};
use crate::utils::error::{AnalyticsError, Result};
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = AnalyticsError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(AnalyticsError::InvalidConfigValueError {
                field: "output.format".to_string(),
                value: other.to_string(),
                reason: "Valid formats: csv, json".to_string(),
            }),
        }
    }
}

#[derive(Serialize)]
struct CsvRow {
    document_id: u64,
    pageviews: u64,
}

/// 依文件 id 排序輸出 `document_id,pageviews`
pub fn render_csv(report: &PageviewReport) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for (id, pageviews) in &report.counts {
        writer.serialize(CsvRow {
            document_id: id.0,
            pageviews: *pageviews,
        })?;
    }
    writer.into_inner().map_err(|e| AnalyticsError::ProcessingError {
        message: format!("Failed to flush CSV output: {}", e),
    })
}

pub fn render_json(report: &PageviewReport) -> Result<Vec<u8>> {
    let value = serde_json::json!({
        "start_date": report.range.start_date(),
        "end_date": report.range.end_date(),
        "counts": report.counts,
        "summary": report.summary,
    });
    Ok(serde_json::to_vec_pretty(&value)?)
}

/// 彙總後把結果寫到 storage
pub struct ReportEngine<S: ReportSource, R: DocumentResolver, St: Storage> {
    aggregator: PageviewAggregator<S, R>,
    storage: St,
    format: OutputFormat,
    filename: String,
}

impl<S: ReportSource, R: DocumentResolver, St: Storage> ReportEngine<S, R, St> {
    pub fn new(
        aggregator: PageviewAggregator<S, R>,
        storage: St,
        format: OutputFormat,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            aggregator,
            storage,
            format,
            filename: filename.into(),
        }
    }

    /// 回傳寫出的檔名（相對於 storage 根目錄）
    pub async fn run(&self, range: DateRange) -> Result<String> {
        tracing::info!(
            "🚀 Aggregating pageviews from {} to {}",
            range.start_date(),
            range.end_date()
        );

        let report = self.aggregator.aggregate_report(range).await?;

        let data = match self.format {
            OutputFormat::Csv => render_csv(&report)?,
            OutputFormat::Json => render_json(&report)?,
        };

        tracing::debug!("Writing {} bytes to {}", data.len(), self.filename);
        self.storage.write_file(&self.filename, &data).await?;

        Ok(self.filename.clone())
    }
}
