//! Blocking HTTP client for the record cleaning service.
//!
//! Authenticated calls carry a bearer token obtained with the configured
//! username and password. The token and the rule catalogue are cached so a
//! run of many batches logs in once.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use rc_model::{OrgGroupCatalogue, Record, ServiceResult, VerifyRequest, VerifyResponse};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};
use crate::rules::{OrgGroup, OrgGroupDetail, build_catalogue};
use crate::service::RecordService;
use crate::status::{ServiceStatus, StatusResponse};

/// How long a token is reused before logging in again (10 minutes).
const TOKEN_LIFETIME: Duration = Duration::from_secs(600);

/// Cache duration for the rule catalogue (24 hours).
const CATALOGUE_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

struct CachedToken {
    token: String,
    fetched_at: Instant,
}

struct CachedCatalogue {
    catalogue: OrgGroupCatalogue,
    fetched_at: Instant,
}

/// Client for the record cleaning service.
pub struct ApiClient {
    client: Client,
    config: ServiceConfig,
    token: Mutex<Option<CachedToken>>,
    catalogue: Mutex<Option<CachedCatalogue>>,
}

impl ApiClient {
    /// Create a new client for `config`.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("record-cleaner/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            config,
            token: Mutex::new(None),
            catalogue: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Send a request and fail on non-success statuses.
    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = status.as_u16(), %body, "service request failed");
            return Err(ServiceError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Bearer token, fetched again once the cached one has expired.
    fn token(&self) -> Result<String> {
        {
            let cache = self.token.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(cached) = cache.as_ref()
                && cached.fetched_at.elapsed() < TOKEN_LIFETIME
            {
                return Ok(cached.token.clone());
            }
        }

        debug!("Requesting service token");
        let form = [
            ("username", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
            ("grant_type", "password"),
            ("scope", ""),
            ("client_id", ""),
            ("client_secret", ""),
        ];
        let response = self.send(self.client.post(self.config.url("token")).form(&form))?;
        let token: TokenResponse = Self::decode(response)?;

        let mut cache = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        *cache = Some(CachedToken {
            token: token.access_token.clone(),
            fetched_at: Instant::now(),
        });
        Ok(token.access_token)
    }

    /// Current availability of the service.
    ///
    /// Never fails: connection and HTTP errors are reported as offline.
    pub fn status(&self) -> ServiceStatus {
        let response = self
            .send(self.client.get(self.config.url("/")))
            .and_then(Self::decode::<StatusResponse>);
        match response {
            Ok(response) => ServiceStatus::from_response(&response),
            Err(err) => {
                debug!(error = %err, "status check failed");
                ServiceStatus::Offline(err.user_message().to_string())
            }
        }
    }

    /// Submit records for validation.
    pub fn validate(&self, records: &[Record]) -> Result<Vec<ServiceResult>> {
        let token = self.token()?;
        debug!(records = records.len(), "POST /validate");
        let request = self
            .client
            .post(self.config.url("validate"))
            .bearer_auth(token)
            .json(records);
        Self::decode(self.send(request)?)
    }

    /// Submit records for verification against the requested rules.
    pub fn verify(&self, request: &VerifyRequest, verbose: bool) -> Result<Vec<ServiceResult>> {
        let token = self.token()?;
        debug!(records = request.records.len(), verbose, "POST /verify");
        let request = self
            .client
            .post(self.config.url("verify"))
            .query(&[("verbose", verbose)])
            .bearer_auth(token)
            .json(request);
        let response: VerifyResponse = Self::decode(self.send(request)?)?;
        Ok(response.records)
    }

    /// Organisations, their groups, and the rules each group runs.
    ///
    /// Cached for 24 hours unless `force_refresh` is set.
    pub fn org_group_catalogue(&self, force_refresh: bool) -> Result<OrgGroupCatalogue> {
        if !force_refresh {
            let cache = self.catalogue.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(cached) = cache.as_ref()
                && cached.fetched_at.elapsed() < CATALOGUE_LIFETIME
            {
                debug!("Using cached rule catalogue (age: {:?})", cached.fetched_at.elapsed());
                return Ok(cached.catalogue.clone());
            }
        }

        debug!("Fetching rule catalogue");
        let groups: Vec<OrgGroup> =
            Self::decode(self.send(self.client.get(self.config.url("rules/org-groups")))?)?;
        let mut details = Vec::with_capacity(groups.len());
        for group in &groups {
            let url = self.config.url(&format!("rules/org-groups/{}", group.id));
            let detail: OrgGroupDetail = Self::decode(self.send(self.client.get(url))?)?;
            details.push(detail);
        }
        let catalogue = build_catalogue(details);

        let mut cache = self.catalogue.lock().unwrap_or_else(PoisonError::into_inner);
        *cache = Some(CachedCatalogue {
            catalogue: catalogue.clone(),
            fetched_at: Instant::now(),
        });
        Ok(catalogue)
    }
}

impl RecordService for ApiClient {
    fn validate(&self, records: &[Record]) -> Result<Vec<ServiceResult>> {
        ApiClient::validate(self, records)
    }

    fn verify(&self, request: &VerifyRequest, verbose: bool) -> Result<Vec<ServiceResult>> {
        ApiClient::verify(self, request, verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = ApiClient::new(ServiceConfig::new("http://localhost:8000/"));
        assert!(client.is_ok());
    }

    #[test]
    fn unreachable_service_is_offline() {
        let mut config = ServiceConfig::new("http://127.0.0.1:9");
        config.timeout_secs = 2;
        let client = ApiClient::new(config).expect("client");
        assert!(matches!(client.status(), ServiceStatus::Offline(_)));
        assert!(matches!(
            client.validate(&[]),
            Err(ServiceError::Connect(_))
        ));
    }
}
