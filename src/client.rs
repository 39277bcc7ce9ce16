//! Mifiel API client.
//!
//! Holds the configured HTTP transport, the API base URL and the signing
//! credentials. Every request issued by a resource goes through here.

use crate::auth::ApiAuth;
use crate::document::DocumentsClient;
use crate::error::{MifielError, Result};
use crate::form::FormFields;
use reqwest::{multipart, Client as HttpClient, Method, Response, StatusCode};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const DEFAULT_BASE_URL: &str = "https://www.mifiel.com";
const SANDBOX_BASE_URL: &str = "https://sandbox.mifiel.com";
const API_PREFIX: &str = "api/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Mifiel API client.
///
/// Cloning is cheap; clones share the underlying connection pool.
///
/// # Example
///
/// ```rust,no_run
/// use mifiel::{Client, CreateDocument, Signatory};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Client::new("app-id", "secret-key")?;
///
///     let document = client
///         .documents()
///         .create(
///             CreateDocument::new(vec![Signatory::new().email("signer@example.com")])
///                 .file("contract.pdf"),
///         )
///         .await?;
///
///     println!("Created document {:?}", document.id());
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    pub(crate) http: HttpClient,
    pub(crate) base_url: String,
    pub(crate) auth: ApiAuth,
}

/// Configuration options for the client.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Base URL for the API. Overrides `sandbox` when set.
    pub base_url: Option<String>,
    /// Talk to the sandbox environment (default: false).
    pub sandbox: bool,
    /// Request timeout (default: 30 seconds).
    pub timeout: Option<Duration>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
}

/// Body attached to an outgoing request.
pub enum RequestBody {
    /// No body.
    Empty,
    /// `application/x-www-form-urlencoded` fields.
    Form(FormFields),
    /// `multipart/form-data`, used for file uploads.
    Multipart(multipart::Form),
}

impl Client {
    /// Create a client for production with default configuration.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use mifiel::Client;
    ///
    /// let client = Client::new("app-id", "secret-key").unwrap();
    /// ```
    pub fn new(app_id: impl Into<String>, secret_key: impl Into<String>) -> Result<Self> {
        Self::with_config(app_id, secret_key, ClientConfig::default())
    }

    /// Create a client with custom configuration.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use mifiel::{Client, ClientConfig};
    /// use std::time::Duration;
    ///
    /// let client = Client::with_config("app-id", "secret-key", ClientConfig {
    ///     sandbox: true,
    ///     timeout: Some(Duration::from_secs(60)),
    ///     ..Default::default()
    /// }).unwrap();
    /// ```
    pub fn with_config(
        app_id: impl Into<String>,
        secret_key: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let app_id = app_id.into();
        let secret_key = secret_key.into();
        if app_id.is_empty() || secret_key.is_empty() {
            return Err(MifielError::Config(
                "app id and secret key must not be empty".to_string(),
            ));
        }

        let timeout = config
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let user_agent = config
            .user_agent
            .unwrap_or_else(|| format!("mifiel-rust/{}", env!("CARGO_PKG_VERSION")));

        let http = HttpClient::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| MifielError::Config(format!("failed to create HTTP client: {}", e)))?;

        let base_url = match config.base_url {
            Some(url) => url,
            None if config.sandbox => SANDBOX_BASE_URL.to_string(),
            None => DEFAULT_BASE_URL.to_string(),
        };

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth: ApiAuth::new(app_id, secret_key),
        })
    }

    /// Create a client from `MIFIEL_APP_ID` and `MIFIEL_SECRET_KEY`.
    ///
    /// `MIFIEL_BASE_URL` and `MIFIEL_SANDBOX` (`1` or `true`) are honoured
    /// when present.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| {
            std::env::var(name).map_err(|_| MifielError::Config(format!("{} is not set", name)))
        };
        let app_id = var("MIFIEL_APP_ID")?;
        let secret_key = var("MIFIEL_SECRET_KEY")?;

        let sandbox = std::env::var("MIFIEL_SANDBOX")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true"))
            .unwrap_or(false);

        Self::with_config(
            app_id,
            secret_key,
            ClientConfig {
                base_url: std::env::var("MIFIEL_BASE_URL").ok(),
                sandbox,
                ..Default::default()
            },
        )
    }

    /// Get the base URL for the API.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The app id requests are signed with.
    pub fn app_id(&self) -> &str {
        self.auth.app_id()
    }

    /// Absolute URL for `path` under the versioned API root.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            API_PREFIX,
            path.trim_start_matches('/')
        )
    }

    /// Get the documents client.
    pub fn documents(&self) -> DocumentsClient {
        DocumentsClient::new(self.clone())
    }

    /// Send a request and decode the JSON object it returns.
    pub(crate) async fn request_json(
        &self,
        method: Method,
        url: &str,
        body: RequestBody,
    ) -> Result<Map<String, Value>> {
        let response = self.send(method, url, body).await?;
        let text = response.text().await?;
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(MifielError::Decode(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
            Err(e) => Err(MifielError::Decode(e.to_string())),
        }
    }

    /// Send an authenticated GET and hand back the successful response
    /// unread, for callers that stream the body.
    pub(crate) async fn get_raw(&self, url: &str) -> Result<Response> {
        self.send(Method::GET, url, RequestBody::Empty).await
    }

    #[instrument(skip_all, fields(method = %method, url = %url))]
    async fn send(&self, method: Method, url: &str, body: RequestBody) -> Result<Response> {
        let builder = self.http.request(method, url);
        let builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Form(fields) => builder.form(&fields),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        let mut request = builder.build()?;
        self.auth.sign(&mut request)?;

        debug!("sending request");
        let response = self.http.execute(request).await.map_err(|e| {
            warn!(error = %e, "transport failure");
            MifielError::from(e)
        })?;

        let status = response.status();
        debug!(status = status.as_u16(), "received response");
        if status.is_success() {
            Ok(response)
        } else {
            let error = parse_error(response).await;
            warn!(error = %error, "request failed");
            Err(error)
        }
    }
}

async fn parse_error(response: Response) -> MifielError {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return MifielError::Unauthorized;
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|body| error_message(&body))
        .unwrap_or_else(|| {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                trimmed.to_string()
            }
        });

    MifielError::Api {
        status_code: status.as_u16(),
        message,
    }
}

// Mifiel reports failures as {"errors": [...]}; older endpoints use
// "error" or "message".
fn error_message(body: &Value) -> Option<String> {
    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        let messages: Vec<String> = errors
            .iter()
            .map(|e| match e {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        if !messages.is_empty() {
            return Some(messages.join("; "));
        }
    }
    ["error", "message"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
