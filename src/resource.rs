//! Shared REST resource behaviour.
//!
//! A [`Resource`] lives under a collection path (`documents`, ...), is bound
//! to a [`Client`] and carries a typed attribute set that server responses
//! are merged into.

use crate::client::{Client, RequestBody};
use crate::error::{MifielError, Result};
use crate::form::{flatten_object, FormFields};
use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// A REST resource exposed by the Mifiel API.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Typed attribute set hydrated from responses.
    type Attributes: Serialize + DeserializeOwned + Send + Sync;

    /// Collection path under the API root, e.g. `documents`.
    const PATH: &'static str;

    /// Attribute keys never sent back in an update.
    const READ_ONLY: &'static [&'static str] = &[];

    /// The client this resource issues requests through.
    fn client(&self) -> &Client;

    /// Current attributes.
    fn attributes(&self) -> &Self::Attributes;

    /// Mutable access to the attributes, e.g. before [`Resource::save`].
    fn attributes_mut(&mut self) -> &mut Self::Attributes;

    /// Server-assigned identifier, if any.
    fn id(&self) -> Option<&str>;

    /// Collection URL with `segments` appended (`[id]`, `[id, "file"]`, ...).
    ///
    /// Each segment is percent-encoded, so an id containing `/`, `?` or `#`
    /// stays a single path segment.
    fn url(&self, segments: &[&str]) -> Result<String> {
        let collection = self.client().url(Self::PATH);
        let invalid = || MifielError::Config(format!("invalid base URL: {}", collection));
        let mut url = Url::parse(&collection).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .extend(segments);
        Ok(url.into())
    }

    /// Issue one request and merge the JSON object it returns into the
    /// attributes.
    async fn process_request(
        &mut self,
        method: Method,
        url: &str,
        body: RequestBody,
    ) -> Result<()> {
        let response = self.client().request_json(method, url, body).await?;
        let merged = hydrate(self.attributes(), response)?;
        *self.attributes_mut() = merged;
        Ok(())
    }

    /// Push every attribute to the server with a PUT.
    ///
    /// Returns `Ok(false)` without touching the network when the resource
    /// has no id yet.
    async fn save(&mut self) -> Result<bool> {
        let Some(id) = self.id().map(str::to_string) else {
            return Ok(false);
        };
        let url = self.url(&[&id])?;
        let fields = update_fields(self.attributes(), Self::READ_ONLY)?;
        self.process_request(Method::PUT, &url, RequestBody::Form(fields))
            .await?;
        Ok(true)
    }
}

/// Shallow-merge a response object over the current attributes.
///
/// Keys present in `response` win; keys it lacks keep their current value.
pub fn hydrate<T>(current: &T, response: Map<String, Value>) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let mut merged = match serde_json::to_value(current)? {
        Value::Object(map) => map,
        other => {
            return Err(MifielError::Decode(format!(
                "attributes must serialize to an object, got {}",
                other
            )));
        }
    };
    merged.extend(response);
    Ok(serde_json::from_value(Value::Object(merged))?)
}

/// Form body for an update: every non-null attribute except `read_only`.
pub fn update_fields<T: Serialize>(attributes: &T, read_only: &[&str]) -> Result<FormFields> {
    let mut object = match serde_json::to_value(attributes)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    object.retain(|key, _| !read_only.contains(&key.as_str()));
    Ok(flatten_object(&object))
}
