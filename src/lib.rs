pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use adapters::analytics::{AnalyticsClient, AnalyticsSettings};
pub use adapters::resolver::{LookupDocumentResolver, ResolveOptions};
pub use app::pageviews_by_document;
pub use crate::core::{
    aggregator::PageviewAggregator,
    etl::{OutputFormat, ReportEngine},
    range::RangeWalker,
    retry::RetryPolicy,
};
pub use domain::model::{DateRange, DocumentId, PageviewCounts, PageviewReport, Window};
pub use utils::error::{AnalyticsError, Result};
