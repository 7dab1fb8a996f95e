use crate::utils::error::{AnalyticsError, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

pub const ANALYTICS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/analytics.readonly";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

/// Service account 簽出的 JWT assertion
#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .checked_sub_signed(Duration::seconds(REFRESH_MARGIN_SECS))
            .is_some_and(|refresh_at| refresh_at > now)
    }
}

/// 以 service account 私鑰換取唯讀 access token，並快取到過期前一分鐘
pub struct ServiceAccountAuth {
    client: Client,
    account: String,
    token_endpoint: String,
    key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn new(
        client: Client,
        account: impl Into<String>,
        private_key_pem: &str,
        token_endpoint: impl Into<String>,
    ) -> Result<Self> {
        let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes()).map_err(|e| {
            AnalyticsError::AuthenticationError {
                message: format!("Invalid service account private key: {}", e),
            }
        })?;

        Ok(Self {
            client,
            account: account.into(),
            token_endpoint: token_endpoint.into(),
            key,
            cached: Mutex::new(None),
        })
    }

    pub fn signed_assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let claims = AssertionClaims {
            iss: self.account.clone(),
            scope: ANALYTICS_READONLY_SCOPE.to_string(),
            aud: self.token_endpoint.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ASSERTION_LIFETIME_SECS)).timestamp(),
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.key).map_err(|e| {
            AnalyticsError::AuthenticationError {
                message: format!("Failed to sign assertion: {}", e),
            }
        })
    }

    /// 取得有效的 access token，必要時向 token endpoint 重新交換
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let token = self.exchange(now).await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn exchange(&self, now: DateTime<Utc>) -> Result<CachedToken> {
        let assertion = self.signed_assertion(now)?;
        tracing::debug!("Requesting access token for {}", self.account);

        let response = self
            .client
            .post(&self.token_endpoint)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| AnalyticsError::AuthenticationError {
                message: format!("Token endpoint unreachable: {}", e),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AnalyticsError::AuthenticationError {
                message: format!("Failed to read token response: {}", e),
            })?;
        if !status.is_success() {
            return Err(AnalyticsError::AuthenticationError {
                message: format!("Token exchange rejected with HTTP {}: {}", status.as_u16(), body.trim()),
            });
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| AnalyticsError::AuthenticationError {
                message: format!("Malformed token response: {}", e),
            })?;

        let expires_in = token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS);
        let expires_at = Duration::try_seconds(expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| AnalyticsError::AuthenticationError {
                message: format!("Invalid expires_in in token response: {}", expires_in),
            })?;

        Ok(CachedToken {
            value: token.access_token,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    const PRIVATE_KEY: &str = include_str!("../../tests/fixtures/service_account_key.pem");
    const PUBLIC_KEY: &str = include_str!("../../tests/fixtures/service_account_pub.pem");
    const ACCOUNT: &str = "reporter@project.iam.gserviceaccount.com";

    fn auth(token_endpoint: String) -> ServiceAccountAuth {
        ServiceAccountAuth::new(Client::new(), ACCOUNT, PRIVATE_KEY, token_endpoint).unwrap()
    }

    #[test]
    fn test_invalid_key_is_authentication_error() {
        let result = ServiceAccountAuth::new(
            Client::new(),
            ACCOUNT,
            "not a pem key",
            "https://oauth2.googleapis.com/token",
        );
        assert!(matches!(
            result,
            Err(AnalyticsError::AuthenticationError { .. })
        ));
    }

    #[test]
    fn test_assertion_claims() {
        let endpoint = "https://oauth2.googleapis.com/token".to_string();
        let auth = auth(endpoint.clone());
        let now = Utc::now();

        let jwt = auth.signed_assertion(now).unwrap();

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[endpoint.as_str()]);
        let key = DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).unwrap();
        let claims = decode::<AssertionClaims>(&jwt, &key, &validation)
            .unwrap()
            .claims;

        assert_eq!(claims.iss, ACCOUNT);
        assert_eq!(claims.scope, ANALYTICS_READONLY_SCOPE);
        assert_eq!(claims.aud, endpoint);
        assert_eq!(claims.exp - claims.iat, ASSERTION_LIFETIME_SECS);
    }

    #[tokio::test]
    async fn test_token_is_exchanged_once_and_cached() {
        let server = MockServer::start();
        let token_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/token")
                .body_contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer")
                .body_contains("assertion=");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "access_token": "ya29.token",
                    "expires_in": 3600,
                    "token_type": "Bearer"
                }));
        });

        let auth = auth(server.url("/token"));

        assert_eq!(auth.access_token().await.unwrap(), "ya29.token");
        assert_eq!(auth.access_token().await.unwrap(), "ya29.token");
        token_mock.assert_hits(1);
    }

    #[tokio::test]
    async fn test_short_lived_token_is_refreshed() {
        let server = MockServer::start();
        let token_mock = server.mock(|when, then| {
            when.method(POST).path("/token");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"access_token": "short", "expires_in": 30}));
        });

        let auth = auth(server.url("/token"));

        auth.access_token().await.unwrap();
        auth.access_token().await.unwrap();
        token_mock.assert_hits(2);
    }

    #[tokio::test]
    async fn test_rejected_exchange_is_authentication_error() {
        let server = MockServer::start();
        let token_mock = server.mock(|when, then| {
            when.method(POST).path("/token");
            then.status(400)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"error": "invalid_grant"}));
        });

        let auth = auth(server.url("/token"));
        let result = auth.access_token().await;

        token_mock.assert();
        match result {
            Err(AnalyticsError::AuthenticationError { message }) => {
                assert!(message.contains("HTTP 400"));
                assert!(message.contains("invalid_grant"));
            }
            other => panic!("expected authentication error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_out_of_range_expiry_is_authentication_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/token");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"access_token": "x", "expires_in": i64::MAX}));
        });

        let auth = auth(server.url("/token"));
        match auth.access_token().await {
            Err(AnalyticsError::AuthenticationError { message }) => {
                assert!(message.contains("expires_in"));
            }
            other => panic!("expected authentication error, got {:?}", other),
        }
    }

    #[test]
    fn test_expiry_near_minimum_is_stale() {
        let token = CachedToken {
            value: "old".to_string(),
            expires_at: DateTime::<Utc>::MIN_UTC,
        };
        assert!(!token.is_fresh(Utc::now()));
    }

    #[tokio::test]
    async fn test_malformed_token_response_is_authentication_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/token");
            then.status(200).body("not json");
        });

        let auth = auth(server.url("/token"));
        assert!(matches!(
            auth.access_token().await,
            Err(AnalyticsError::AuthenticationError { .. })
        ));
    }
}
