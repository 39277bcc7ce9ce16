//! Request signing for the Mifiel API.
//!
//! Mifiel authenticates every call with the ApiAuth HMAC scheme: the client
//! signs a canonical description of the request with its secret key and
//! sends the result alongside its app id.

use crate::error::{MifielError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use reqwest::header::{self, HeaderValue};
use sha1::Sha1;
use std::fmt;

type HmacSha1 = Hmac<Sha1>;

/// Header carrying the base64 MD5 of the request body.
pub const CONTENT_MD5: &str = "Content-MD5";

/// App id / secret key pair used to sign requests.
#[derive(Clone)]
pub struct ApiAuth {
    app_id: String,
    secret_key: String,
}

impl fmt::Debug for ApiAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiAuth")
            .field("app_id", &self.app_id)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl ApiAuth {
    /// Create credentials from an app id and secret key.
    pub fn new(app_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            secret_key: secret_key.into(),
        }
    }

    /// The public half of the credentials.
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Build the string that gets signed.
    pub fn canonical_string(
        method: &str,
        content_type: &str,
        content_md5: &str,
        request_uri: &str,
        date: &str,
    ) -> String {
        [method, content_type, content_md5, request_uri, date].join(",")
    }

    /// Base64 HMAC-SHA1 of `canonical` keyed by the secret.
    pub fn signature(&self, canonical: &str) -> Result<String> {
        let mut mac = HmacSha1::new_from_slice(self.secret_key.as_bytes())
            .map_err(|e| MifielError::Config(format!("invalid secret key: {}", e)))?;
        mac.update(canonical.as_bytes());
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }

    /// Value of the `Authorization` header for a canonical string.
    pub fn authorization(&self, canonical: &str) -> Result<String> {
        Ok(format!("APIAuth {}:{}", self.app_id, self.signature(canonical)?))
    }

    /// Sign a fully built request in place.
    ///
    /// Sets `Date`, `Content-MD5` (buffered bodies only) and `Authorization`.
    /// Streamed bodies such as file uploads are signed with an empty MD5.
    pub fn sign(&self, request: &mut reqwest::Request) -> Result<()> {
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();

        let content_md5 = request
            .body()
            .and_then(|body| body.as_bytes())
            .filter(|bytes| !bytes.is_empty())
            .map(|bytes| BASE64.encode(Md5::digest(bytes)))
            .unwrap_or_default();

        let content_type = request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let url = request.url();
        let request_uri = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };

        let canonical = Self::canonical_string(
            request.method().as_str(),
            &content_type,
            &content_md5,
            &request_uri,
            &date,
        );
        let authorization = self.authorization(&canonical)?;

        let headers = request.headers_mut();
        headers.insert(header::DATE, header_value(&date)?);
        if !content_md5.is_empty() {
            headers.insert(CONTENT_MD5, header_value(&content_md5)?);
        }
        headers.insert(header::AUTHORIZATION, header_value(&authorization)?);
        Ok(())
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| MifielError::InvalidArgument(format!("invalid header value: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_string_order() {
        let canonical = ApiAuth::canonical_string(
            "POST",
            "application/x-www-form-urlencoded",
            "abc==",
            "/api/v1/documents",
            "Thu, 15 Oct 2026 10:00:00 GMT",
        );
        assert_eq!(
            canonical,
            "POST,application/x-www-form-urlencoded,abc==,/api/v1/documents,Thu, 15 Oct 2026 10:00:00 GMT"
        );
    }

    #[test]
    fn test_signature_is_deterministic() {
        let auth = ApiAuth::new("app-id", "secret");
        let a = auth.signature("GET,,,/api/v1/documents/1,date").unwrap();
        let b = auth.signature("GET,,,/api/v1/documents/1,date").unwrap();
        let c = auth.signature("GET,,,/api/v1/documents/2,date").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        // 20-byte SHA-1 MAC, base64 encoded
        assert_eq!(BASE64.decode(&a).unwrap().len(), 20);
    }

    #[test]
    fn test_authorization_header_format() {
        let auth = ApiAuth::new("app-id", "secret");
        let value = auth.authorization("GET,,,/,date").unwrap();
        assert!(value.starts_with("APIAuth app-id:"));
    }

    #[test]
    fn test_sign_sets_headers() {
        let auth = ApiAuth::new("app-id", "secret");
        let mut request = reqwest::Client::new()
            .post("https://www.mifiel.com/api/v1/documents")
            .form(&[("original_hash", "abc")])
            .build()
            .unwrap();

        auth.sign(&mut request).unwrap();

        let headers = request.headers();
        assert!(headers.get(header::DATE).is_some());
        assert!(headers.get(CONTENT_MD5).is_some());
        let authorization = headers.get(header::AUTHORIZATION).unwrap();
        assert!(authorization.to_str().unwrap().starts_with("APIAuth app-id:"));
    }

    #[test]
    fn test_sign_without_body_skips_md5() {
        let auth = ApiAuth::new("app-id", "secret");
        let mut request = reqwest::Client::new()
            .get("https://www.mifiel.com/api/v1/documents/1")
            .build()
            .unwrap();

        auth.sign(&mut request).unwrap();
        assert!(request.headers().get(CONTENT_MD5).is_none());
        assert!(request.headers().get(header::AUTHORIZATION).is_some());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let auth = ApiAuth::new("app-id", "top-secret");
        let debug = format!("{:?}", auth);
        assert!(debug.contains("app-id"));
        assert!(!debug.contains("top-secret"));
    }
}
