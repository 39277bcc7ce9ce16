//! Documents submitted for electronic signature.
//!
//! A [`Document`] is created from either an uploaded file or the hash of a
//! file kept elsewhere, fetched back by id, updated with [`Resource::save`],
//! and exposes three downloads: the original file, the signed file and the
//! signature XML.

use crate::client::{Client, RequestBody};
use crate::error::{MifielError, Result};
use crate::form::{encode_signatories, FormFields};
use crate::mime;
use crate::resource::Resource;
use crate::types::{CreateDocument, DocumentAttributes, DocumentSource};
use async_trait::async_trait;
use reqwest::{multipart, Body, Method};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};

/// Downloadable artifacts of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Artifact {
    File,
    FileSigned,
    Xml,
}

impl Artifact {
    fn path(self) -> &'static str {
        match self {
            Artifact::File => "file",
            Artifact::FileSigned => "file_signed",
            Artifact::Xml => "xml",
        }
    }
}

/// A document tracked by Mifiel.
///
/// Each instance is a detached snapshot: it is only refreshed by the calls
/// made through it.
#[derive(Debug, Clone)]
pub struct Document {
    client: Client,
    attributes: DocumentAttributes,
}

#[async_trait]
impl Resource for Document {
    type Attributes = DocumentAttributes;

    const PATH: &'static str = "documents";

    // Signers are fixed at creation.
    const READ_ONLY: &'static [&'static str] = &["signatories", "signers"];

    fn client(&self) -> &Client {
        &self.client
    }

    fn attributes(&self) -> &DocumentAttributes {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut DocumentAttributes {
        &mut self.attributes
    }

    fn id(&self) -> Option<&str> {
        Document::id(self)
    }
}

impl Document {
    /// An empty, unsaved document bound to `client`.
    pub fn new(client: &Client) -> Self {
        Self {
            client: client.clone(),
            attributes: DocumentAttributes::default(),
        }
    }

    /// A document handle for an id obtained elsewhere, without fetching it.
    pub fn with_id(client: &Client, id: impl Into<String>) -> Self {
        let mut document = Self::new(client);
        document.attributes.id = Some(id.into());
        document
    }

    /// Server-assigned id, `None` until created or found.
    pub fn id(&self) -> Option<&str> {
        self.attributes.id.as_deref()
    }

    /// Last path component of the server-reported `file_file_name`.
    ///
    /// Directory parts, `..` and empty names yield `None`, so the result is
    /// safe to join onto a local directory.
    pub fn local_file_name(&self) -> Option<&str> {
        let name = self.attributes.file_file_name.as_deref()?;
        Path::new(name).file_name()?.to_str()
    }

    /// Fetch a document by id.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use mifiel::{Client, Document, Resource};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::new("app-id", "secret-key")?;
    ///     let document = Document::find(&client, "8600153a-4845-4d11-aac6-1d3d6048e022").await?;
    ///     println!("signed: {:?}", document.attributes().signed);
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip(client))]
    pub async fn find(client: &Client, doc_id: &str) -> Result<Self> {
        if doc_id.is_empty() {
            return Err(MifielError::InvalidArgument(
                "document id must not be empty".to_string(),
            ));
        }

        let mut document = Self::new(client);
        let url = document.url(&[doc_id])?;
        document
            .process_request(Method::GET, &url, RequestBody::Empty)
            .await?;
        Ok(document)
    }

    /// Create a document from a file upload or an original hash.
    ///
    /// The request is validated before anything is opened or sent: exactly
    /// one of `file` and `original_hash` must be given.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use mifiel::{Client, CreateDocument, Document, Signatory};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::new("app-id", "secret-key")?;
    ///     let signatories = vec![
    ///         Signatory::new().email("signer@example.com").tax_id("AAA010101AAA"),
    ///     ];
    ///
    ///     let document = Document::create(
    ///         &client,
    ///         CreateDocument::new(signatories)
    ///             .original_hash("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
    ///             .callback_url("https://example.com/webhooks/mifiel"),
    ///     )
    ///     .await?;
    ///     println!("created {:?}", document.id());
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip_all)]
    pub async fn create(client: &Client, request: CreateDocument) -> Result<Self> {
        let source = request.source()?;

        let mut fields = encode_signatories(&request.signatories);
        if let Some(callback_url) = request.callback_url.filter(|url| !url.is_empty()) {
            fields.push(("callback_url".to_string(), callback_url));
        }

        let body = match source {
            DocumentSource::Hash(hash) => {
                fields.push(("original_hash".to_string(), hash));
                RequestBody::Form(fields)
            }
            DocumentSource::File(path) => {
                RequestBody::Multipart(upload_form(fields, &path).await?)
            }
        };

        let mut document = Self::new(client);
        let url = document.url(&[])?;
        document.process_request(Method::POST, &url, body).await?;
        debug!(id = ?document.id(), "document created");
        Ok(document)
    }

    /// Download the original file to `path`. Returns the bytes written.
    pub async fn save_file(&self, path: impl AsRef<Path>) -> Result<u64> {
        self.download(Artifact::File, path.as_ref()).await
    }

    /// Download the signed file to `path`. Returns the bytes written.
    pub async fn save_file_signed(&self, path: impl AsRef<Path>) -> Result<u64> {
        self.download(Artifact::FileSigned, path.as_ref()).await
    }

    /// Download the signature XML to `path`. Returns the bytes written.
    pub async fn save_xml(&self, path: impl AsRef<Path>) -> Result<u64> {
        self.download(Artifact::Xml, path.as_ref()).await
    }

    // Streams into a sibling `.part` file and renames it over `path`, so the
    // target is either the complete body or untouched.
    #[instrument(skip(self), fields(id = ?self.id()))]
    async fn download(&self, artifact: Artifact, path: &Path) -> Result<u64> {
        let id = self.id().ok_or(MifielError::MissingId("download"))?;
        let partial = partial_path(path)?;
        let url = self.url(&[id, artifact.path()])?;

        let mut response = self.client.get_raw(&url).await?;

        let result = async {
            let mut file = tokio::fs::File::create(&partial).await?;
            let mut written = 0u64;
            while let Some(chunk) = response.chunk().await? {
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            file.flush().await?;
            drop(file);
            tokio::fs::rename(&partial, path).await?;
            Ok::<_, MifielError>(written)
        }
        .await;

        match &result {
            Ok(written) => debug!(bytes = written, path = %path.display(), "download complete"),
            Err(e) => {
                warn!(error = %e, "download failed, removing partial file");
                let _ = tokio::fs::remove_file(&partial).await;
            }
        }
        result
    }
}

/// Client for document operations.
///
/// Access via `client.documents()`.
pub struct DocumentsClient {
    client: Client,
}

impl DocumentsClient {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetch a document by id. See [`Document::find`].
    pub async fn find(&self, doc_id: &str) -> Result<Document> {
        Document::find(&self.client, doc_id).await
    }

    /// Create a document. See [`Document::create`].
    pub async fn create(&self, request: CreateDocument) -> Result<Document> {
        Document::create(&self.client, request).await
    }
}

// The opened file is owned by the multipart body and closed when the request
// that carries it is dropped, whether it succeeded or not.
async fn upload_form(fields: FormFields, path: &Path) -> Result<multipart::Form> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            MifielError::InvalidArgument(format!("{} has no file name", path.display()))
        })?;

    let file = tokio::fs::File::open(path).await?;
    let length = file.metadata().await?.len();

    let part = multipart::Part::stream_with_length(Body::from(file), length)
        .file_name(file_name)
        .mime_str(mime::guess(path))?;

    let form = fields
        .into_iter()
        .fold(multipart::Form::new(), |form, (name, value)| form.text(name, value));
    Ok(form.part("file", part))
}

fn partial_path(path: &Path) -> Result<PathBuf> {
    let mut name = path
        .file_name()
        .ok_or_else(|| {
            MifielError::InvalidArgument(format!("{} is not a file path", path.display()))
        })?
        .to_os_string();
    name.push(".part");
    Ok(path.with_file_name(name))
}
