use std::path::Path;

use anyhow::Context as _;
use kuchiki::NodeRef;
use regex::Regex;
use serde::Deserialize;

use crate::inject;

/// The ordered list of candidate stylesheet URLs.
///
/// Positions are identities: the control's numeric values index into this
/// sequence, so the registry is never deduplicated or reordered. It is
/// always passed in explicitly rather than read from ambient scope.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RegistryFile {
    Bare(Vec<String>),
    Keyed { stylesheets: Vec<String> },
}

impl Registry {
    pub fn from_urls(entries: Vec<String>) -> Self {
        Self { entries }
    }

    /// Loads a registry JSON file: either a bare array of URLs or an object
    /// with a `stylesheets` key.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read registry {}", path.display()))?;
        Self::parse_json(&text).with_context(|| format!("parse registry {}", path.display()))
    }

    pub fn parse_json(text: &str) -> anyhow::Result<Self> {
        let file: RegistryFile = serde_json::from_str(text)
            .context("expected a JSON array of URLs or {\"stylesheets\": [...]}")?;
        let entries = match file {
            RegistryFile::Bare(entries) => entries,
            RegistryFile::Keyed { stylesheets } => stylesheets,
        };
        Ok(Self { entries })
    }

    /// Recovers the registry a page already carries: the payload script this
    /// tool injects, or a legacy inline `stylesheets = [...]` assignment in
    /// any other script.
    pub fn discover_from_document(document: &NodeRef) -> Option<Self> {
        if let Some(own) = script_text_by_id(document, inject::REGISTRY_SCRIPT_ID) {
            if let Some(entries) = extract_stylesheets_array(&own) {
                return Some(Self { entries });
            }
        }

        if let Ok(nodes) = document.select("script") {
            for node in nodes {
                let text = node.as_node().text_contents();
                if let Some(entries) = extract_stylesheets_array(&text) {
                    return Some(Self { entries });
                }
            }
        }
        None
    }

    pub fn get(&self, index: u32) -> Option<&str> {
        self.entries.get(index as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

fn script_text_by_id(document: &NodeRef, id: &str) -> Option<String> {
    let nodes = document.select("script[id]").ok()?;
    for node in nodes {
        if node.attributes.borrow().get("id") == Some(id) {
            return Some(node.as_node().text_contents());
        }
    }
    None
}

fn extract_stylesheets_array(script: &str) -> Option<Vec<String>> {
    let re = Regex::new(r"stylesheets\s*=\s*\[(?P<body>[^\]]*)\]").expect("stylesheets regex");
    let body = re.captures(script)?.name("body")?.as_str();

    // Our own payload is JSON; legacy pages tend to use single quotes.
    if let Ok(entries) = serde_json::from_str::<Vec<String>>(&format!("[{}]", body)) {
        return Some(entries);
    }

    let string_re = Regex::new(r#""(?P<q_d>[^"]*)"|'(?P<q_s>[^']*)'"#).expect("string regex");
    let entries: Vec<String> = string_re
        .captures_iter(body)
        .filter_map(|caps| {
            caps.name("q_d")
                .or_else(|| caps.name("q_s"))
                .map(|m| m.as_str().to_string())
        })
        .collect();
    if entries.is_empty() { None } else { Some(entries) }
}
