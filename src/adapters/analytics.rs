//! Core Reporting API (v3) 的 HTTP client
//!
//! 每次查詢固定取 `ga:pagePath` 維度與 `ga:pageviews` 指標，
//! 並以 `ga:pagePathLevel1==/<locale>/` 限定在單一語系的路徑底下。

use crate::adapters::auth::ServiceAccountAuth;
use crate::config::toml_config::TomlConfig;
use crate::domain::model::{PageRequest, RawRow, ReportPage};
use crate::domain::ports::ReportSource;
use crate::utils::error::{AnalyticsError, Result};
use crate::utils::validation::{self, Validate};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// 建立 client 所需的全部設定；建構時即驗證
#[derive(Debug, Clone)]
pub struct AnalyticsSettings {
    pub account: String,
    pub private_key: String,
    pub profile_id: String,
    pub locale: String,
    pub api_endpoint: String,
    pub token_endpoint: String,
    pub timeout: Option<Duration>,
}

impl AnalyticsSettings {
    pub fn from_config(config: &TomlConfig) -> Result<Self> {
        let settings = Self {
            account: config.analytics.account.clone(),
            private_key: config.private_key()?,
            profile_id: config.analytics.profile_id.clone(),
            locale: config.locale().to_string(),
            api_endpoint: config.api_endpoint().to_string(),
            token_endpoint: config.token_endpoint().to_string(),
            timeout: config.timeout(),
        };
        settings.validate()?;
        Ok(settings)
    }
}

impl Validate for AnalyticsSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("analytics.account", &self.account)?;
        validation::validate_non_empty_string("analytics.key", &self.private_key)?;
        validation::validate_numeric_id("analytics.profile_id", &self.profile_id)?;
        validation::validate_non_empty_string("analytics.locale", &self.locale)?;
        validation::validate_url("analytics.api_endpoint", &self.api_endpoint)?;
        validation::validate_url("analytics.token_endpoint", &self.token_endpoint)?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataResponse {
    #[serde(default)]
    total_results: u64,
    #[serde(default)]
    rows: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// 已認證、可重複使用的報表查詢 handle
pub struct AnalyticsClient {
    client: Client,
    auth: ServiceAccountAuth,
    api_endpoint: String,
    profile_id: String,
    locale: String,
}

impl AnalyticsClient {
    /// 建立 client 並立即交換第一個 access token；憑證問題在這裡就會以
    /// `AuthenticationError` 回報，不會等到第一次查詢
    pub async fn connect(settings: &AnalyticsSettings) -> Result<Self> {
        settings.validate()?;

        let mut builder = Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let auth = ServiceAccountAuth::new(
            client.clone(),
            settings.account.clone(),
            &settings.private_key,
            settings.token_endpoint.clone(),
        )?;
        auth.access_token().await?;

        tracing::info!(
            "🔑 Authenticated as {} for profile ga:{}",
            settings.account,
            settings.profile_id
        );

        Ok(Self {
            client,
            auth,
            api_endpoint: settings.api_endpoint.clone(),
            profile_id: settings.profile_id.clone(),
            locale: settings.locale.clone(),
        })
    }

    pub fn query_params(&self, request: &PageRequest) -> Vec<(&'static str, String)> {
        vec![
            ("ids", format!("ga:{}", self.profile_id)),
            ("start-date", request.window.start.format("%Y-%m-%d").to_string()),
            ("end-date", request.window.end.format("%Y-%m-%d").to_string()),
            ("metrics", "ga:pageviews".to_string()),
            ("dimensions", "ga:pagePath".to_string()),
            ("filters", format!("ga:pagePathLevel1==/{}/", self.locale)),
            ("sort", "ga:pagePath".to_string()),
            ("max-results", request.max_results.to_string()),
            ("start-index", request.start_index.to_string()),
        ]
    }
}

#[async_trait]
impl ReportSource for AnalyticsClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<ReportPage> {
        let token = self.auth.access_token().await?;
        let params = self.query_params(request);

        tracing::debug!(
            "📡 Querying {} for {} (start-index {})",
            self.api_endpoint,
            request.window,
            request.start_index
        );

        let response = self
            .client
            .get(&self.api_endpoint)
            .bearer_auth(token)
            .query(&params)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(AnalyticsError::from_status(
                status.as_u16(),
                error_message(&body),
            ));
        }

        parse_page(&body)
    }
}

/// 連線、逾時或讀取 body 失敗都不重試
fn transport_error(e: reqwest::Error) -> AnalyticsError {
    AnalyticsError::FatalRequestError {
        status: e.status().map(|s| s.as_u16()),
        message: e.to_string(),
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

fn parse_page(body: &str) -> Result<ReportPage> {
    let data: DataResponse = serde_json::from_str(body)?;

    let rows = data
        .rows
        .into_iter()
        .map(|row| -> Result<RawRow> {
            let [path, pageviews, ..] = row.as_slice() else {
                return Err(AnalyticsError::ProcessingError {
                    message: format!("Expected [path, pageviews] row, got {:?}", row),
                });
            };
            let pageviews = pageviews
                .parse::<u64>()
                .map_err(|e| AnalyticsError::ProcessingError {
                    message: format!("Invalid pageviews value '{}' for {}: {}", pageviews, path, e),
                })?;
            Ok(RawRow {
                path: path.clone(),
                pageviews,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ReportPage {
        total_results: data.total_results,
        rows,
    })
}
