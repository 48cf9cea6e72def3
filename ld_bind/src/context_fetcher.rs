use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::Value as Json;

use crate::context::{Context, ContextFetch};
use crate::error::{LDError, LDResult};

/// Fetches remote contexts over HTTP.
///
/// Fetched contexts are kept in memory for the lifetime of the fetcher.
/// With a cache directory, documents are also written to disk and read back
/// when the network is unavailable.
#[derive(Debug, Default)]
pub struct HttpContextFetcher {
    cache_dir: Option<PathBuf>,
    loaded: Mutex<HashMap<String, Arc<Context>>>,
}

impl HttpContextFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    fn fetch_document(&self, url: &str) -> LDResult<String> {
        let Some(cache_path) = self.cache_path(url) else {
            return Self::fetch_from_network(url);
        };

        match Self::fetch_from_network(url) {
            Ok(body) => {
                if let Err(e) = Self::write_cache(&cache_path, &body) {
                    tracing::warn!(url, error = %e, "failed to write context cache");
                }
                Ok(body)
            }
            Err(network_err) => {
                if cache_path.exists() {
                    tracing::warn!(url, "network fetch failed, using cached context");
                    fs::read_to_string(&cache_path).map_err(|e| LDError::Fetch {
                        url: url.to_string(),
                        source: Box::new(e),
                    })
                } else {
                    Err(network_err)
                }
            }
        }
    }

    /// Cache file for `url`, named by a hash of the URL.
    fn cache_path(&self, url: &str) -> Option<PathBuf> {
        let dir = self.cache_dir.as_ref()?;
        let mut hasher = DefaultHasher::new();
        url.hash(&mut hasher);
        Some(dir.join(format!("{:016x}.json", hasher.finish())))
    }

    fn fetch_from_network(url: &str) -> LDResult<String> {
        let body = ureq::get(url)
            .header("Accept", "application/ld+json")
            .call()
            .map_err(|e| LDError::Fetch {
                url: url.to_string(),
                source: Box::new(e),
            })?
            .body_mut()
            .read_to_string()
            .map_err(|e| LDError::Fetch {
                url: url.to_string(),
                source: Box::new(e),
            })?;

        Ok(body)
    }

    fn write_cache(path: &Path, content: &str) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)
    }
}

impl ContextFetch for HttpContextFetcher {
    fn fetch(&self, url: &str) -> LDResult<Arc<Context>> {
        if let Ok(loaded) = self.loaded.lock()
            && let Some(ctx) = loaded.get(url)
        {
            return Ok(ctx.clone());
        }

        let body = self.fetch_document(url)?;
        let document: Json = serde_json::from_str(&body)?;
        let ctx = Context::from_document(url, &document)?;
        tracing::debug!(url, terms = ctx.entries().len(), "loaded remote context");

        if let Ok(mut loaded) = self.loaded.lock() {
            loaded.insert(url.to_string(), ctx.clone());
        }
        Ok(ctx)
    }
}
