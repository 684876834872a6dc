//! Reference definition lookups
//!
//! A lookup turns reference names into ready-to-insert definition lines
//! (`[name]: target`). Names it cannot resolve are left out of the result;
//! only genuine failures are errors.

use crate::append::Options;
use crate::error::LookupError;
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Definition lines returned by a lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResult {
    pub links: Vec<String>,
}

#[async_trait]
pub trait Lookup: Send + Sync {
    async fn lookup(&self, names: &[String], options: &Options)
        -> Result<LookupResult, LookupError>;
}

#[async_trait]
impl<L: Lookup + ?Sized> Lookup for Box<L> {
    async fn lookup(
        &self,
        names: &[String],
        options: &Options,
    ) -> Result<LookupResult, LookupError> {
        (**self).lookup(names, options).await
    }
}

/// `[name]: target`
pub fn definition_line(name: &str, target: &str) -> String {
    format!("[{}]: {}", name, target)
}

/// Name defined by a definition line
pub fn defined_name(line: &str) -> Option<&str> {
    line.strip_prefix('[')?.split_once("]: ").map(|(name, _)| name)
}

/// Lookup over a fixed name-to-target table
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    links: BTreeMap<String, String>,
}

impl StaticLookup {
    pub fn new(links: BTreeMap<String, String>) -> Self {
        Self { links }
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticLookup {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[async_trait]
impl Lookup for StaticLookup {
    async fn lookup(
        &self,
        names: &[String],
        _options: &Options,
    ) -> Result<LookupResult, LookupError> {
        let links = names
            .iter()
            .filter_map(|name| {
                self.links
                    .get(name)
                    .map(|target| definition_line(name, target))
            })
            .collect();
        Ok(LookupResult { links })
    }
}

/// Resolve with `first`, then hand the leftovers to `second`
#[derive(Debug, Clone)]
pub struct Chain<A, B> {
    first: A,
    second: B,
}

impl<A, B> Chain<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

#[async_trait]
impl<A: Lookup, B: Lookup> Lookup for Chain<A, B> {
    async fn lookup(
        &self,
        names: &[String],
        options: &Options,
    ) -> Result<LookupResult, LookupError> {
        let mut result = self.first.lookup(names, options).await?;

        let rest: Vec<String> = names
            .iter()
            .filter(|name| {
                !result
                    .links
                    .iter()
                    .any(|line| defined_name(line) == Some(name.as_str()))
            })
            .cloned()
            .collect();

        if !rest.is_empty() {
            let more = self.second.lookup(&rest, options).await?;
            result.links.extend(more.links);
        }
        Ok(result)
    }
}

/// Package metadata fields used to pick a link target
#[derive(Debug, Deserialize)]
struct PackageMeta {
    homepage: Option<String>,
    repository: Option<Repository>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Repository {
    Url(String),
    Detailed { url: Option<String> },
}

impl PackageMeta {
    fn target(&self) -> Option<String> {
        let homepage = self.homepage.as_deref().and_then(web_url);
        homepage.or_else(|| {
            let repo = match self.repository.as_ref()? {
                Repository::Url(url) => url.as_str(),
                Repository::Detailed { url } => url.as_deref()?,
            };
            repository_url(repo)
        })
    }
}

/// `url` if it parses as an http(s) URL
fn web_url(url: &str) -> Option<String> {
    let url = url.trim();
    let parsed = Url::parse(url).ok()?;
    matches!(parsed.scheme(), "http" | "https").then(|| url.to_string())
}

/// Browser URL for a package.json `repository` value
pub fn repository_url(repo: &str) -> Option<String> {
    let repo = repo.trim();

    for (prefix, host) in [
        ("github:", "github.com"),
        ("gitlab:", "gitlab.com"),
        ("bitbucket:", "bitbucket.org"),
    ] {
        if let Some(path) = repo.strip_prefix(prefix) {
            return web_url(&format!("https://{}/{}", host, path.trim_end_matches(".git")));
        }
    }

    // owner/repo shorthand
    if !repo.contains(':') && repo.matches('/').count() == 1 {
        return web_url(&format!("https://github.com/{}", repo));
    }

    let url = repo.strip_prefix("git+").unwrap_or(repo);
    let url = if let Some(rest) = url.strip_prefix("git@") {
        // git@host:owner/repo
        format!("https://{}", rest.replacen(':', "/", 1))
    } else if let Some(rest) = url
        .strip_prefix("git://")
        .or_else(|| url.strip_prefix("ssh://git@"))
    {
        format!("https://{}", rest)
    } else {
        url.to_string()
    };

    let url = url.strip_suffix(".git").unwrap_or(&url);
    web_url(url)
}

/// Lookup against an npm-compatible registry
#[derive(Debug, Clone)]
pub struct RegistryLookup {
    client: reqwest::Client,
    registry: String,
}

impl RegistryLookup {
    pub fn new(registry: &str, timeout_ms: u64) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("reflint/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(LookupError::Client)?;

        Ok(Self {
            client,
            registry: registry.trim_end_matches('/').to_string(),
        })
    }

    /// Link target for one package, `None` when the registry doesn't know it
    async fn resolve(&self, name: &str, fallback: bool) -> Result<Option<String>, LookupError> {
        let url = format!("{}/{}", self.registry, name.replace('/', "%2f"));
        tracing::debug!(%url, "fetching package metadata");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| LookupError::Http {
                name: name.to_string(),
                source,
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(name, "package not found in registry");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(LookupError::Status {
                name: name.to_string(),
                status: response.status().as_u16(),
            });
        }

        let meta: PackageMeta = response
            .json()
            .await
            .map_err(|source| LookupError::Decode {
                name: name.to_string(),
                source,
            })?;

        Ok(meta
            .target()
            .or_else(|| fallback.then(|| format!("https://www.npmjs.com/package/{}", name))))
    }
}

#[async_trait]
impl Lookup for RegistryLookup {
    async fn lookup(
        &self,
        names: &[String],
        options: &Options,
    ) -> Result<LookupResult, LookupError> {
        let fallback = options
            .passthrough
            .get("fallback")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(true);

        let targets = join_all(names.iter().map(|name| self.resolve(name, fallback))).await;

        let mut links = Vec::with_capacity(names.len());
        for (name, target) in names.iter().zip(targets) {
            if let Some(target) = target? {
                links.push(definition_line(name, &target));
            }
        }
        Ok(LookupResult { links })
    }
}
