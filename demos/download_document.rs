//! Download the artifacts of a document.
//!
//! Writes the original file, and when the document is signed, the signed
//! file and the signature XML into the given directory.
//!
//! Run with:
//! ```bash
//! MIFIEL_APP_ID=... MIFIEL_SECRET_KEY=... \
//!     cargo run --example download_document -- <document-id> ./out
//! ```

use mifiel::{Client, Document, Resource};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "mifiel=info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let doc_id = args.next().ok_or("usage: download_document <id> <dir>")?;
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));
    tokio::fs::create_dir_all(&out_dir).await?;

    let client = Client::from_env()?;
    let document = Document::find(&client, &doc_id).await?;

    // Only the last component of the server-supplied name is used, so
    // nothing lands outside `out_dir`.
    let name = document
        .local_file_name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}.pdf", doc_id.replace(['/', '\\'], "_")));

    let bytes = document.save_file(out_dir.join(&name)).await?;
    println!("Original:  {} ({} bytes)", name, bytes);

    if document.attributes().signed == Some(true) {
        let signed = out_dir.join(format!("signed-{}", name));
        let bytes = document.save_file_signed(&signed).await?;
        println!("Signed:    {} ({} bytes)", signed.display(), bytes);

        let xml = out_dir.join(format!("{}.xml", name.trim_end_matches(".pdf")));
        let bytes = document.save_xml(&xml).await?;
        println!("XML:       {} ({} bytes)", xml.display(), bytes);
    } else {
        println!("Not signed yet, skipping signed file and XML");
    }

    Ok(())
}
