//! Stability AI API client

use reqwest::multipart::Form;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::error::{Result, StabilityError};
use crate::types::{ApiVersion, Engine, StabilityConfig};

const DEFAULT_BASE_URL: &str = "https://api.stability.ai";
const DEFAULT_TIMEOUT: u64 = 60;
const USER_AGENT: &str = concat!("stability-ai-rust/", env!("CARGO_PKG_VERSION"));

/// Stability AI API client
///
/// # Example
///
/// ```no_run
/// use stability_ai::{Stability, GenerateOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Stability::new("sk-xxx")?;
///
///     let result = client
///         .generate_core("A painting of a cat wearing a top hat", GenerateOptions::new())
///         .await?;
///
///     println!("Image written to {}", result.filepath.display());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Stability {
    api_key: String,
    base_url: String,
    organization: Option<String>,
    client_id: Option<String>,
    client_version: Option<String>,
    client: Client,
}

impl Stability {
    /// Create a new client with an API key
    ///
    /// # Errors
    ///
    /// Returns `StabilityError::EmptyApiKey` if the API key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(StabilityConfig::new(api_key))
    }

    /// Create a new client with custom configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use stability_ai::{Stability, StabilityConfig};
    ///
    /// let client = Stability::with_config(
    ///     StabilityConfig::new("sk-xxx")
    ///         .with_timeout(120)
    ///         .with_organization("org-xxx"),
    /// )?;
    /// # Ok::<(), stability_ai::StabilityError>(())
    /// ```
    pub fn with_config(config: StabilityConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(StabilityError::EmptyApiKey);
        }

        let timeout = config.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let base_url = config
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            api_key: config.api_key,
            base_url,
            organization: config.organization,
            client_id: config.client_id,
            client_version: config.client_version,
            client,
        })
    }

    // ============ Account (v1) ============

    /// Get the remaining credit balance for the account
    ///
    /// # Example
    ///
    /// ```no_run
    /// use stability_ai::Stability;
    ///
    /// # async fn example() -> stability_ai::Result<()> {
    /// let client = Stability::new("sk-xxx")?;
    /// let credits = client.balance().await?;
    /// println!("Credits: {credits}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn balance(&self) -> Result<f64> {
        let url = self.make_url(ApiVersion::V1, "user", "balance");
        let (status, body) = self.get_json(&url, false).await?;

        if status == 200 {
            if let Some(credits) = body.get("credits").and_then(Value::as_f64) {
                return Ok(credits);
            }
        }

        Err(StabilityError::from_status(
            status,
            "Failed to get user credit balance",
            &body,
        ))
    }

    /// List the generation engines available to the account
    pub async fn list_engines(&self) -> Result<Vec<Engine>> {
        let url = self.make_url(ApiVersion::V1, "engines", "list");
        let (status, body) = self.get_json(&url, true).await?;

        if status == 200 && body.is_array() {
            return serde_json::from_value(body).map_err(|error| {
                StabilityError::MalformedResponse(format!("invalid engines list: {error}"))
            });
        }

        Err(StabilityError::from_status(
            status,
            "Failed to list engines",
            &body,
        ))
    }

    // ============ Internal dispatch ============

    pub(crate) fn http_client(&self) -> &Client {
        &self.client
    }

    /// Compose the versioned endpoint URL; empty segments are skipped
    pub(crate) fn make_url(&self, version: ApiVersion, resource: &str, endpoint: &str) -> String {
        let mut url = format!("{}/{}/{}", self.base_url, version.as_str(), resource);
        if !endpoint.is_empty() {
            url.push('/');
            url.push_str(endpoint);
        }
        url
    }

    /// Ordered header list derived purely from the stored configuration.
    ///
    /// The optional organization and client identification headers only
    /// apply to the v1 endpoint family.
    fn auth_headers(&self, with_org: bool) -> Vec<(&'static str, String)> {
        let mut headers = vec![("Authorization", format!("Bearer {}", self.api_key))];

        if with_org {
            if let Some(organization) = &self.organization {
                headers.push(("Organization", organization.clone()));
            }
            if let Some(client_id) = &self.client_id {
                headers.push(("Stability-Client-ID", client_id.clone()));
            }
            if let Some(client_version) = &self.client_version {
                headers.push(("Stability-Client-Version", client_version.clone()));
            }
        }

        headers
    }

    fn apply_headers(
        &self,
        mut request: reqwest::RequestBuilder,
        with_org: bool,
    ) -> reqwest::RequestBuilder {
        for (name, value) in self.auth_headers(with_org) {
            request = request.header(name, value);
        }
        request.header("Accept", "application/json")
    }

    /// POST a multipart form, returning the status and parsed body.
    ///
    /// Statuses are never converted to transport errors here; callers
    /// inspect 200/202/other uniformly.
    pub(crate) async fn post_form(
        &self,
        url: &str,
        form: Form,
        with_org: bool,
    ) -> Result<(u16, Value)> {
        let request = self
            .apply_headers(self.client.post(url), with_org)
            .multipart(form);
        let response = request.send().await?;
        Self::read_json(response).await
    }

    /// POST a multipart form whose success body is raw binary (3D endpoints)
    pub(crate) async fn post_form_binary(&self, url: &str, form: Form) -> Result<(u16, Vec<u8>)> {
        let request = self.client.post(url).multipart(form);
        let response = self.apply_auth_only(request).send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        tracing::debug!(%url, status, bytes = bytes.len(), "binary response received");
        Ok((status, bytes.to_vec()))
    }

    pub(crate) async fn post_json(
        &self,
        url: &str,
        body: &Value,
        with_org: bool,
    ) -> Result<(u16, Value)> {
        let request = self
            .apply_headers(self.client.post(url), with_org)
            .header("Content-Type", "application/json")
            .json(body);
        let response = request.send().await?;
        Self::read_json(response).await
    }

    pub(crate) async fn get_json(&self, url: &str, with_org: bool) -> Result<(u16, Value)> {
        let request = self.apply_headers(self.client.get(url), with_org);
        let response = request.send().await?;
        Self::read_json(response).await
    }

    fn apply_auth_only(&self, mut request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        for (name, value) in self.auth_headers(false) {
            request = request.header(name, value);
        }
        request
    }

    /// Read the body as JSON; a non-JSON body is preserved as a string so
    /// error diagnostics never lose the raw payload.
    async fn read_json(response: reqwest::Response) -> Result<(u16, Value)> {
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let bytes = response.bytes().await?;

        let body = match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(_) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
        };

        tracing::debug!(%url, status, "api response received");
        Ok((status, body))
    }
}
