//! Build script for trackport.
//!
//! Installs the `.env.example` template next to where the application looks
//! for its `.env` file, so users can copy it and fill in their service URL
//! and tuning values.

use std::{env, fs, path::PathBuf};

/// Copies `.env.example` from the crate root into the local data directory.
///
/// Destination:
/// - Linux: `~/.local/share/trackport/.env.example`
/// - macOS: `~/Library/Application Support/trackport/.env.example`
/// - Windows: `%LOCALAPPDATA%/trackport/.env.example`
///
/// A missing template only emits a cargo warning. Failing to create the
/// directory or write the file fails the build.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let template = manifest_dir.join(".env.example");

    let mut data_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    data_dir.push("trackport");

    if !template.is_file() {
        println!(
            "cargo:warning=.env.example not found at {}",
            template.display()
        );
        return Ok(());
    }

    fs::create_dir_all(&data_dir)?;
    fs::copy(&template, data_dir.join(".env.example"))?;

    Ok(())
}
