//! Blocking HTTP client for the app registry push endpoint

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::PushRequest;
use crate::error::{
    Result,
    registry::{communication, invalid_token, rejected},
};

const MEDIA_TYPE: &str = "helm";
const NO_ERROR_DETAILS: &str = "Failed to get error details.";

#[derive(Debug, Serialize)]
struct PushBody<'a> {
    blob: &'a str,
    release: &'a str,
    media_type: &'a str,
}

#[derive(Debug, Clone)]
pub struct RegistryClient {
    base_url: String,
    http: Client,
}

impl RegistryClient {
    /// Client for `host`; a bare host name is reached over https
    ///
    /// # Errors
    ///
    /// Returns `CourierError::RegistryCommunication` if the HTTP client cannot be set up.
    pub fn new(host: &str) -> Result<Self> {
        let host = host.trim_end_matches('/');
        let base_url = if host.contains("://") {
            host.to_string()
        } else {
            format!("https://{host}")
        };
        let http = Client::builder()
            .user_agent(concat!("opcourier/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| communication(&base_url, e.to_string()))?;

        Ok(Self { base_url, http })
    }

    pub fn push_url(&self, namespace: &str, repository: &str) -> String {
        format!(
            "{}/cnr/api/v1/packages/{namespace}/{repository}",
            self.base_url
        )
    }

    /// POST an encoded bundle; any 2xx status is success
    ///
    /// # Errors
    ///
    /// Returns `CourierError::InvalidToken` before sending anything if the token
    /// is not a valid header value, `CourierError::RegistryCommunication` when no
    /// response arrives and `CourierError::RegistryRejected` for any other status.
    pub fn push(&self, request: &PushRequest, blob: &str) -> Result<()> {
        let mut token =
            HeaderValue::from_str(&request.token).map_err(|e| invalid_token(e.to_string()))?;
        token.set_sensitive(true);

        let url = self.push_url(&request.namespace, &request.repository);
        let body = PushBody {
            blob,
            release: &request.release,
            media_type: MEDIA_TYPE,
        };
        debug!(url = %url, release = %request.release, "pushing bundle");

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, token)
            .json(&body)
            .send()
            .map_err(|e| communication(&url, e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            info!(url = %url, status = status.as_u16(), "bundle pushed");
            return Ok(());
        }

        let text = response.text().unwrap_or_default();
        Err(rejection(status, &text))
    }
}

fn rejection(status: StatusCode, text: &str) -> crate::error::CourierError {
    let body: Value = serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()));
    let message = body
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
        .unwrap_or(NO_ERROR_DETAILS)
        .to_string();
    rejected(status.as_u16(), message, body)
}
