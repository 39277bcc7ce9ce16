//! Type definitions for the Mifiel SDK.
//!
//! Request builders and the typed attribute set that responses hydrate.

use crate::error::{MifielError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// A person or entity invited to sign a document.
///
/// Fields are sent in insertion order as `signatories[i][field]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signatory {
    fields: Vec<(String, String)>,
}

impl Signatory {
    /// Create an empty signatory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the signer's email.
    pub fn email(self, email: impl Into<String>) -> Self {
        self.field("email", email)
    }

    /// Set the signer's tax id (RFC).
    pub fn tax_id(self, tax_id: impl Into<String>) -> Self {
        self.field("tax_id", tax_id)
    }

    /// Set the signer's display name.
    pub fn name(self, name: impl Into<String>) -> Self {
        self.field("name", name)
    }

    /// Set an arbitrary field. Setting an existing field replaces its value
    /// in place.
    pub fn field(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((field, value)),
        }
        self
    }

    /// Fields in insertion order.
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

impl<K, V> FromIterator<(K, V)> for Signatory
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Signatory::new(), |signatory, (k, v)| signatory.field(k, v))
    }
}

/// What backs a new document: an uploaded file or the hash of a file kept
/// elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// Upload the file at this path.
    File(PathBuf),
    /// Register the document by its content hash only.
    Hash(String),
}

impl DocumentSource {
    /// Hex SHA-256 of a local file, suitable for [`DocumentSource::Hash`].
    pub async fn hash_file(path: impl AsRef<Path>) -> Result<String> {
        let mut file = tokio::fs::File::open(path.as_ref()).await?;
        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; 64 * 1024];
        loop {
            let n = file.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(hex::encode(hasher.finalize()))
    }
}

/// Parameters for creating a document.
///
/// Exactly one of `file` and `original_hash` must be set; this is checked by
/// [`CreateDocument::source`] before any request is made.
#[derive(Debug, Clone, Default)]
pub struct CreateDocument {
    /// Signers, in the order they are sent.
    pub signatories: Vec<Signatory>,
    /// Local file to upload.
    pub file: Option<PathBuf>,
    /// Content hash of a file that is not uploaded.
    pub original_hash: Option<String>,
    /// URL notified by the service when the document changes.
    pub callback_url: Option<String>,
}

impl CreateDocument {
    /// Start a request for the given signatories.
    pub fn new(signatories: Vec<Signatory>) -> Self {
        Self {
            signatories,
            ..Default::default()
        }
    }

    /// Upload this file.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Register by hash instead of uploading.
    pub fn original_hash(mut self, hash: impl Into<String>) -> Self {
        self.original_hash = Some(hash.into());
        self
    }

    /// Set the notification URL.
    pub fn callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    /// Resolve the upload source. Empty values count as absent.
    pub fn source(&self) -> Result<DocumentSource> {
        let file = self.file.as_ref().filter(|p| !p.as_os_str().is_empty());
        let hash = self.original_hash.as_ref().filter(|h| !h.is_empty());

        match (file, hash) {
            (Some(path), None) => Ok(DocumentSource::File(path.clone())),
            (None, Some(hash)) => Ok(DocumentSource::Hash(hash.clone())),
            (None, None) => Err(MifielError::InvalidArgument(
                "either file or original_hash must be provided".to_string(),
            )),
            (Some(_), Some(_)) => Err(MifielError::InvalidArgument(
                "only one of file or original_hash must be provided".to_string(),
            )),
        }
    }
}

/// Attributes of a document as reported by the API.
///
/// Keys this struct does not know about are kept in `extra`, so newer API
/// fields survive a round trip. A known key whose value has an unexpected
/// JSON type is kept in `extra` as well, so decoding never fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct DocumentAttributes {
    /// Server-assigned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Notification URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    /// Hash of the original file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_hash: Option<String>,
    /// Name of the uploaded file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_file_name: Option<String>,
    /// Whether every signer has signed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed: Option<bool>,
    /// When the last signature was applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<String>,
    /// Server-side status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Every other key from the response.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for DocumentAttributes {
    fn from(mut map: Map<String, Value>) -> Self {
        // Ids are opaque; numeric ones are kept as their decimal text.
        let id = match map.remove("id") {
            Some(Value::String(id)) => Some(id),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Null) | None => None,
            Some(other) => {
                map.insert("id".to_string(), other);
                None
            }
        };

        Self {
            id,
            callback_url: take_typed(&mut map, "callback_url"),
            original_hash: take_typed(&mut map, "original_hash"),
            file_file_name: take_typed(&mut map, "file_file_name"),
            signed: take_typed(&mut map, "signed"),
            signed_at: take_typed(&mut map, "signed_at"),
            status: take_typed(&mut map, "status"),
            extra: map,
        }
    }
}

// Remove `key` and decode it as `T`. Nulls read as absent; a value of the
// wrong type goes back into `map` untouched.
fn take_typed<T: DeserializeOwned>(map: &mut Map<String, Value>, key: &str) -> Option<T> {
    match map.remove(key)? {
        Value::Null => None,
        value => match T::deserialize(&value) {
            Ok(typed) => Some(typed),
            Err(_) => {
                map.insert(key.to_string(), value);
                None
            }
        },
    }
}
