use crate::domain::model::{DocumentId, PageRequest, ReportPage};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 報表輸出目的地
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 報表來源：每次呼叫取回一頁 pagePath/pageviews 資料
#[async_trait]
pub trait ReportSource: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> Result<ReportPage>;
}

/// 將網址路徑對應回內部文件 id；找不到時回傳 None
pub trait DocumentResolver: Send + Sync {
    fn resolve(&self, path: &str) -> Option<DocumentId>;
}

impl<F> DocumentResolver for F
where
    F: Fn(&str) -> Option<DocumentId> + Send + Sync,
{
    fn resolve(&self, path: &str) -> Option<DocumentId> {
        self(path)
    }
}

#[async_trait]
impl<'a, T: ReportSource + ?Sized> ReportSource for &'a T {
    async fn fetch_page(&self, request: &PageRequest) -> Result<ReportPage> {
        (**self).fetch_page(request).await
    }
}
