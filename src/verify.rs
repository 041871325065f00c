use std::path::{Path, PathBuf};

use anyhow::Context as _;
use url::Url;

use crate::fetcher::Fetcher;
use crate::progress::Progress;
use crate::registry::Registry;

/// Where a registry entry's bytes live once resolved against the base URL
/// and the input document's directory.
#[derive(Debug, Clone)]
pub enum EntrySource {
    Local(PathBuf),
    Remote(Url),
    /// Already self-contained (a `data:` URI); nothing to fetch.
    Inline(String),
}

pub fn resolve_entry(
    entry: &str,
    base_url: Option<&Url>,
    input_dir: Option<&Path>,
) -> anyhow::Result<EntrySource> {
    let e = entry.trim();
    if e.is_empty() {
        anyhow::bail!("empty registry entry");
    }
    if e.starts_with("data:") {
        return Ok(EntrySource::Inline(e.to_string()));
    }
    if e.starts_with("http://") || e.starts_with("https://") {
        return Ok(EntrySource::Remote(Url::parse(e)?));
    }
    if e.starts_with("//") {
        let base = base_url.with_context(|| {
            format!("protocol-relative entry {:?} requires --base-url", entry)
        })?;
        return Ok(EntrySource::Remote(Url::parse(&format!(
            "{}:{}",
            base.scheme(),
            e
        ))?));
    }
    if e.starts_with('/') {
        let base = base_url
            .with_context(|| format!("root-relative entry {:?} requires --base-url", entry))?;
        return Ok(EntrySource::Remote(base.join(e)?));
    }
    if let Some(dir) = input_dir {
        return Ok(EntrySource::Local(dir.join(e)));
    }
    if let Some(base) = base_url {
        return Ok(EntrySource::Remote(base.join(e)?));
    }
    anyhow::bail!("relative entry {:?} requires an input document or --base-url", entry)
}

/// Confirms every registry entry loads: local entries must be readable,
/// remote ones must respond successfully. A resolvable entry served with a
/// non-CSS content type is only warned about; the browser would apply the
/// same tolerance.
pub async fn verify_registry(
    registry: &Registry,
    base_url: Option<&Url>,
    input_dir: Option<&Path>,
    fetcher: &Fetcher,
    progress: &Progress,
) -> anyhow::Result<()> {
    progress.set_fetch_total(registry.len());

    for (i, entry) in registry.entries().iter().enumerate() {
        let source = resolve_entry(entry, base_url, input_dir)
            .with_context(|| format!("verify stylesheet [{}] {}", i, entry))?;

        match source {
            EntrySource::Inline(_) => {
                tracing::debug!(index = i, "inline entry; nothing to fetch");
            }
            EntrySource::Local(path) => {
                let bytes = std::fs::read(&path)
                    .with_context(|| format!("verify stylesheet [{}] {}", i, entry))?;
                progress.add_fetched(bytes.len());
            }
            EntrySource::Remote(url) => {
                let (bytes, content_type) = fetcher
                    .get_bytes(url.clone())
                    .await
                    .with_context(|| format!("verify stylesheet [{}] {}", i, entry))?;
                if let Some(ct) = content_type.as_deref() {
                    if !ct.trim_start().starts_with("text/css") {
                        tracing::warn!(
                            index = i,
                            url = %url,
                            content_type = ct,
                            "stylesheet served with a non-css content type"
                        );
                    }
                }
                progress.add_fetched(bytes.len());
            }
        }
        progress.fetch_done(entry);
    }
    Ok(())
}
