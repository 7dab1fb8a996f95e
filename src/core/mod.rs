pub mod aggregator;
pub mod collector;
pub mod etl;
pub mod range;
pub mod retry;

pub use crate::domain::model::{
    DateRange, DocumentId, PageRequest, PageviewCounts, PageviewReport, RawRow, ReportPage,
    RunSummary, Window,
};
pub use crate::domain::ports::{DocumentResolver, ReportSource, Storage};
pub use crate::utils::error::Result;
