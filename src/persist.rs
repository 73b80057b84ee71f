//! JSON files for fleet documents and single-node configurations.

use crate::config::{ConfigDocument, NodeConfig};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub fn document_to_json(document: &ConfigDocument) -> Result<String> {
    serde_json::to_string_pretty(document).context("Failed to serialise configuration document")
}

/// Parse a document and check its shared sections
pub fn document_from_json(json: &str) -> Result<ConfigDocument> {
    let document: ConfigDocument =
        serde_json::from_str(json).context("Failed to parse configuration document")?;
    document.validate()?;
    Ok(document)
}

pub fn node_to_json(config: &NodeConfig) -> Result<String> {
    serde_json::to_string_pretty(config).context("Failed to serialise node configuration")
}

pub fn node_from_json(json: &str) -> Result<NodeConfig> {
    let config: NodeConfig =
        serde_json::from_str(json).context("Failed to parse node configuration")?;
    config.validate()?;
    Ok(config)
}

pub fn save_document(path: impl AsRef<Path>, document: &ConfigDocument) -> Result<()> {
    write_json(path.as_ref(), document)
}

pub fn load_document(path: impl AsRef<Path>) -> Result<ConfigDocument> {
    let path = path.as_ref();
    let document: ConfigDocument = read_json(path)?;
    document
        .validate()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    tracing::info!(
        "Loaded {} document with {} device(s) from {}",
        document.variant,
        document.devices.len(),
        path.display()
    );
    Ok(document)
}

pub fn save_node(path: impl AsRef<Path>, config: &NodeConfig) -> Result<()> {
    write_json(path.as_ref(), config)
}

pub fn load_node(path: impl AsRef<Path>) -> Result<NodeConfig> {
    let path = path.as_ref();
    let config: NodeConfig = read_json(path)?;
    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    Ok(config)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}
