//! # Mifiel Rust SDK
//!
//! Client for the Mifiel electronic signature API.
//!
//! Mifiel tracks documents that need to be signed by one or more
//! signatories. A document is registered either by uploading the file or by
//! sending the hash of a file kept elsewhere; once everyone has signed, the
//! signed file and the signature XML can be downloaded.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mifiel::{Client, CreateDocument, Document, Signatory};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new("app-id", "secret-key")?;
//!
//!     // Upload a contract for two signers
//!     let document = Document::create(
//!         &client,
//!         CreateDocument::new(vec![
//!             Signatory::new().email("ana@example.com").tax_id("AAA010101AAA"),
//!             Signatory::new().email("luis@example.com").tax_id("BBB010101BBB"),
//!         ])
//!         .file("contract.pdf")
//!         .callback_url("https://example.com/webhooks/mifiel"),
//!     )
//!     .await?;
//!
//!     // Later, once signed
//!     let document = Document::find(&client, document.id().unwrap_or_default()).await?;
//!     document.save_file_signed("contract-signed.pdf").await?;
//!     document.save_xml("contract.xml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Updating
//!
//! Attributes are edited in place and pushed with [`Resource::save`], which
//! is a no-op returning `false` for documents that have no id yet:
//!
//! ```rust,no_run
//! use mifiel::{Client, Document, Resource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new("app-id", "secret-key")?;
//!     let mut document = Document::with_id(&client, "8600153a-4845-4d11-aac6-1d3d6048e022");
//!     document.attributes_mut().callback_url = Some("https://example.com/new".to_string());
//!     document.save().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, MifielError>`:
//!
//! ```rust,no_run
//! use mifiel::{Client, MifielError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new("app-id", "secret-key")?;
//!
//!     match client.documents().find("missing").await {
//!         Ok(doc) => println!("Found {:?}", doc.id()),
//!         Err(MifielError::Unauthorized) => println!("Check your credentials"),
//!         Err(MifielError::Api { status_code: 404, .. }) => println!("No such document"),
//!         Err(e) => println!("Error: {}", e),
//!     }
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod document;
pub mod error;
pub mod form;
pub mod mime;
pub mod resource;
pub mod types;

// Re-export main types at the crate root
pub use auth::ApiAuth;
pub use client::{Client, ClientConfig, RequestBody};
pub use document::{Document, DocumentsClient};
pub use error::{MifielError, Result};
pub use resource::Resource;

pub use types::{CreateDocument, DocumentAttributes, DocumentSource, Signatory};
