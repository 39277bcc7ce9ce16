//! Create a document for signing.
//!
//! Uploads a file when a path is given, otherwise registers the SHA-256 of
//! the file by hash only.
//!
//! Run with:
//! ```bash
//! MIFIEL_APP_ID=... MIFIEL_SECRET_KEY=... MIFIEL_SANDBOX=1 \
//!     cargo run --example create_document -- contract.pdf signer@example.com [--hash-only]
//! ```

use mifiel::{Client, CreateDocument, DocumentSource, Resource, Signatory};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "mifiel=debug".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let file = args.next().ok_or("usage: create_document <file> <email> [--hash-only]")?;
    let email = args.next().ok_or("usage: create_document <file> <email> [--hash-only]")?;
    let hash_only = args.next().as_deref() == Some("--hash-only");

    let client = Client::from_env()?;
    println!("Using {}", client.base_url());

    let request = CreateDocument::new(vec![Signatory::new().email(email)]);
    let request = if hash_only {
        let hash = DocumentSource::hash_file(&file).await?;
        println!("Registering by hash {}", hash);
        request.original_hash(hash)
    } else {
        println!("Uploading {}", file);
        request.file(&file)
    };

    let document = client.documents().create(request).await?;

    println!("Created document:");
    println!("  ID:       {}", document.id().unwrap_or("-"));
    println!(
        "  File:     {}",
        document.attributes().file_file_name.as_deref().unwrap_or("-")
    );
    for (key, value) in &document.attributes().extra {
        println!("  {:<9} {}", format!("{}:", key), value);
    }

    Ok(())
}
