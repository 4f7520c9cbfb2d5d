use crate::config::SheetsConfig;
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Refresh the access token this long before it actually expires
const TOKEN_EXPIRY_SLACK_SECS: i64 = 60;

/// Tabular record storage
///
/// The badge services only need two operations against the backing sheet:
/// read every row in the configured range, and append one row at the end.
/// Appends carry no transactional guarantee against concurrent writers.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read all rows in the configured range, in sheet order
    async fn read_rows(&self) -> Result<Vec<Vec<String>>, StoreError>;

    /// Append one row at the end of the configured range
    async fn append_row(&self, row: Vec<String>) -> Result<(), StoreError>;
}

/// Record store adapter over the Google Sheets v4 values API
pub struct SheetStore {
    http: reqwest::Client,
    config: SheetsConfig,
    token_expiry: Duration,
    token: Mutex<Option<CachedToken>>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - ChronoDuration::seconds(TOKEN_EXPIRY_SLACK_SECS) > now
    }
}

/// Service account JWT assertion claims
#[derive(Debug, Serialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// values.get / values.append payload
#[derive(Debug, Default, Serialize, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

impl SheetStore {
    /// Create a new adapter; validates the private key eagerly so credential
    /// problems surface at startup rather than on the first request
    pub fn new(config: &SheetsConfig, token_expiry: Duration) -> Result<Self, StoreError> {
        EncodingKey::from_rsa_pem(config.private_key_pem().as_bytes())
            .map_err(|e| StoreError::Auth(format!("invalid private key: {e}")))?;

        info!(
            spreadsheet_id = %config.spreadsheet_id,
            range = %config.range,
            "Sheet store initialized"
        );

        Ok(Self {
            http: reqwest::Client::new(),
            config: config.clone(),
            token_expiry,
            token: Mutex::new(None),
        })
    }

    /// Get a valid access token, exchanging a fresh assertion if the cached
    /// one is missing or close to expiry
    async fn access_token(&self) -> Result<String, StoreError> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.exchange_assertion().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);

        Ok(access_token)
    }

    /// Sign a JWT assertion and exchange it at the token endpoint
    async fn exchange_assertion(&self) -> Result<CachedToken, StoreError> {
        let now = Utc::now();
        let claims = build_claims(
            &self.config.service_account_email,
            &self.config.token_uri,
            now,
            self.token_expiry,
        );

        let key = EncodingKey::from_rsa_pem(self.config.private_key_pem().as_bytes())
            .map_err(|e| StoreError::Auth(format!("invalid private key: {e}")))?;
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| StoreError::Auth(format!("failed to sign assertion: {e}")))?;

        let response = self
            .http
            .post(&self.config.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(format!("token response: {e}")))?;

        debug!(expires_in = token.expires_in, "Access token refreshed");

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: now + ChronoDuration::seconds(token.expires_in),
        })
    }

    fn values_url(&self) -> String {
        format!(
            "{SHEETS_API_BASE}/{}/values/{}",
            self.config.spreadsheet_id, self.config.range
        )
    }
}

#[async_trait]
impl RecordStore for SheetStore {
    #[instrument(skip(self))]
    async fn read_rows(&self) -> Result<Vec<Vec<String>>, StoreError> {
        let token = self.access_token().await?;

        let response = self
            .http
            .get(self.values_url())
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api { status, body });
        }

        let range: ValueRange = response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(format!("values.get response: {e}")))?;

        debug!(rows = range.values.len(), "Read sheet rows");

        Ok(range.values)
    }

    #[instrument(skip(self, row))]
    async fn append_row(&self, row: Vec<String>) -> Result<(), StoreError> {
        let token = self.access_token().await?;

        let body = ValueRange { values: vec![row] };
        let response = self
            .http
            .post(format!("{}:append", self.values_url()))
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api { status, body });
        }

        debug!("Appended sheet row");

        Ok(())
    }
}

fn build_claims(
    email: &str,
    token_uri: &str,
    now: DateTime<Utc>,
    expiry: Duration,
) -> AssertionClaims {
    AssertionClaims {
        iss: email.to_string(),
        scope: SHEETS_SCOPE.to_string(),
        aud: token_uri.to_string(),
        iat: now.timestamp(),
        exp: now.timestamp() + expiry.as_secs() as i64,
    }
}

/// In-memory record store used by service and route tests
#[cfg(test)]
pub struct MemoryStore {
    rows: Mutex<Vec<Vec<String>>>,
    fail: bool,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows: Mutex::new(rows),
            fail: false,
        }
    }

    /// A store whose every operation fails as unreachable
    pub fn unavailable() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub async fn rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().await.clone()
    }
}

#[cfg(test)]
#[async_trait]
impl RecordStore for MemoryStore {
    async fn read_rows(&self) -> Result<Vec<Vec<String>>, StoreError> {
        if self.fail {
            return Err(StoreError::Api {
                status: 503,
                body: "backend unavailable".to_string(),
            });
        }
        Ok(self.rows.lock().await.clone())
    }

    async fn append_row(&self, row: Vec<String>) -> Result<(), StoreError> {
        if self.fail {
            return Err(StoreError::Api {
                status: 503,
                body: "backend unavailable".to_string(),
            });
        }
        self.rows.lock().await.push(row);
        Ok(())
    }
}
