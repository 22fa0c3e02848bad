//! License-text resolution for records that only carry an SPDX identifier.
//!
//! Texts come from the local [`cache::LicenseCache`] first and from spdx.org
//! otherwise ([`spdx_api::fetch_license_text`]); fetched texts are written
//! back to the cache. Failures are logged and leave the record without text.

pub mod cache;
pub mod spdx_api;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tracing::{info, warn};

use crate::license::spdx::license_components;
use crate::models::Record;

use cache::LicenseCache;

const BATCH_SIZE: usize = 75;

/// Looks up license texts by SPDX identifier or compound expression.
pub struct LicenseTextResolver {
    cache: Option<LicenseCache>,
    client: Option<Client>,
}

impl LicenseTextResolver {
    /// `offline` restricts lookups to the cache.
    pub fn new(cache_dir: Option<PathBuf>, offline: bool) -> Result<Self> {
        let client = if offline {
            None
        } else {
            Some(Client::builder().timeout(Duration::from_secs(10)).build()?)
        };
        Ok(Self {
            cache: cache_dir.map(LicenseCache::new),
            client,
        })
    }

    /// Text for a license expression: every component's text, in expression
    /// order, separated by a blank line. `None` when no component resolves.
    pub async fn resolve(&self, expr: &str) -> Option<String> {
        let mut texts = Vec::new();
        for component in license_components(expr) {
            if let Some(text) = self.resolve_component(&component).await {
                texts.push(text);
            }
        }
        if texts.is_empty() {
            None
        } else {
            Some(texts.join("\n\n"))
        }
    }

    async fn resolve_component(&self, id: &str) -> Option<String> {
        if let Some(text) = self.cache.as_ref().and_then(|c| c.lookup(id)) {
            return Some(text);
        }

        let client = self.client.as_ref()?;
        info!(license = id, "fetching license text from spdx.org");
        match spdx_api::fetch_license_text(client, id).await {
            Ok(Some(text)) => {
                if let Some(cache) = &self.cache {
                    match cache.store(id, &text) {
                        Ok(path) => info!(license = id, path = %path.display(), "cached license text"),
                        Err(e) => warn!(license = id, error = %e, "could not cache license text"),
                    }
                }
                Some(text)
            }
            Ok(None) => {
                warn!(license = id, "spdx.org has no text for license");
                None
            }
            Err(e) => {
                warn!(license = id, error = %e, "could not fetch license text");
                None
            }
        }
    }
}

/// Give every record that has an identifier but no text the resolved text of
/// its identifier. Returns how many records were filled.
pub async fn fill_license_texts(
    records: &mut [Record],
    resolver: &LicenseTextResolver,
    quiet: bool,
) -> Result<usize> {
    let mut ids: Vec<String> = Vec::new();
    for record in records.iter().filter(|r| r.text().is_none()) {
        if let Some(id) = record.license() {
            if !ids.iter().any(|i| i == id) {
                ids.push(id.to_string());
            }
        }
    }
    if ids.is_empty() {
        return Ok(0);
    }

    let pb = if !quiet {
        let pb = ProgressBar::new(ids.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut resolved: HashMap<String, String> = HashMap::new();
    for batch in ids.chunks(BATCH_SIZE) {
        let results = join_all(batch.iter().map(|id| resolver.resolve(id))).await;

        for (id, text) in batch.iter().zip(results) {
            if let Some(text) = text {
                resolved.insert(id.clone(), text);
            }
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    let mut filled = 0;
    for record in records.iter_mut().filter(|r| r.text().is_none()) {
        let text = record.license().and_then(|id| resolved.get(id)).cloned();
        if let Some(text) = text {
            record.raw_text = Some(text);
            filled += 1;
        }
    }
    Ok(filled)
}
