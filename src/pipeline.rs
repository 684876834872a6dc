//! Run the append transform over many documents
//!
//! Documents are processed with bounded parallelism. Each document's own
//! reflinks are folded into a shared cache once all of them are done.

use crate::append::{Outcome, Reflinks};
use crate::cache::ReflinkCache;
use crate::document::Document;
use crate::lookup::Lookup;
use futures::stream::{self, StreamExt};
use serde::Serialize;

/// Per-document result (compact)
#[derive(Debug, Serialize)]
pub struct DocumentReport {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reflinks: Vec<String>,
    /// Names this document added to the cache
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cached: Vec<String>,
}

impl DocumentReport {
    pub fn changed(&self) -> bool {
        self.outcome.is_some_and(|o| o.changed())
    }
}

pub struct Pipeline<L> {
    reflinks: Reflinks<L>,
    parallel: usize,
    cache: ReflinkCache,
}

impl<L: Lookup> Pipeline<L> {
    pub fn new(reflinks: Reflinks<L>, parallel: usize) -> Self {
        Self {
            reflinks,
            parallel: parallel.max(1),
            cache: ReflinkCache::new(),
        }
    }

    /// Start from a cache filled by earlier runs
    pub fn with_cache(mut self, cache: ReflinkCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &ReflinkCache {
        &self.cache
    }

    pub fn into_cache(self) -> ReflinkCache {
        self.cache
    }

    /// Apply the transform to every document, in place.
    ///
    /// A lookup failure is reported on its document; the others still run.
    /// Reports come back in input order.
    pub async fn process(&mut self, documents: &mut [Document]) -> Vec<DocumentReport> {
        let reflinks = &self.reflinks;
        let outcomes: Vec<_> = stream::iter(documents.iter_mut())
            .map(move |doc| reflinks.apply(doc))
            .buffered(self.parallel)
            .collect()
            .await;

        documents
            .iter()
            .zip(outcomes)
            .map(|(doc, outcome)| {
                let file = doc.path.display().to_string();
                let (outcome, error) = match outcome {
                    Ok(outcome) => (Some(outcome), None),
                    Err(e) => {
                        tracing::warn!(file = %file, error = %e, "lookup failed");
                        (None, Some(e.to_string()))
                    }
                };
                DocumentReport {
                    file,
                    outcome,
                    error,
                    reflinks: doc.reflinks.clone().unwrap_or_default(),
                    cached: self.cache.record(doc),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::append::Options;
    use crate::error::LookupError;
    use crate::lookup::{LookupResult, StaticLookup};
    use async_trait::async_trait;

    /// Fails for any request that includes `broken`
    struct Picky(StaticLookup);

    #[async_trait]
    impl Lookup for Picky {
        async fn lookup(
            &self,
            names: &[String],
            options: &Options,
        ) -> Result<LookupResult, LookupError> {
            if names.iter().any(|n| n == "broken") {
                return Err(LookupError::Status {
                    name: "broken".to_string(),
                    status: 500,
                });
            }
            self.0.lookup(names, options).await
        }
    }

    fn pipeline() -> Pipeline<Picky> {
        let links: StaticLookup = [
            ("verb", "https://github.com/verbose/verb"),
            ("generate", "https://github.com/generate/generate"),
        ]
        .into_iter()
        .collect();
        Pipeline::new(Reflinks::new(Picky(links), Options::default()), 2)
    }

    #[tokio::test]
    async fn test_process_updates_cache_in_order() {
        let mut docs = vec![
            Document::new("a.md", "[verb][]\n"),
            Document::new("b.md", "[generate] and [verb]\n"),
            Document::placeholder("dir"),
        ];
        let mut pipeline = pipeline();
        let reports = pipeline.process(&mut docs).await;

        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].file, "a.md");
        assert_eq!(reports[0].cached, vec!["verb"]);
        assert_eq!(reports[1].reflinks, vec!["generate", "verb"]);
        assert_eq!(reports[1].cached, vec!["generate"]);
        assert_eq!(reports[2].outcome, Some(Outcome::Skipped));
        assert!(reports[0].changed() && reports[1].changed() && !reports[2].changed());
        assert_eq!(pipeline.cache().names(), ["verb", "generate"]);
    }

    #[tokio::test]
    async fn test_failure_is_per_document() {
        let mut docs = vec![
            Document::new("bad.md", "[broken]\n"),
            Document::new("good.md", "[verb]\n"),
        ];
        let original = docs[0].contents.clone();
        let mut pipeline = pipeline();
        let reports = pipeline.process(&mut docs).await;

        assert_eq!(reports[0].error.as_deref(), Some("registry returned 500 for `broken`"));
        assert!(reports[0].outcome.is_none());
        assert_eq!(docs[0].contents, original);
        assert!(reports[1].changed());
        assert_eq!(pipeline.into_cache().names(), ["verb"]);
    }

    #[tokio::test]
    async fn test_existing_cache_is_respected() {
        let mut docs = vec![Document::new("a.md", "[verb] [generate]\n")];
        let cache: ReflinkCache = ["verb"].into_iter().collect();
        let mut pipeline = pipeline().with_cache(cache);
        let reports = pipeline.process(&mut docs).await;

        assert_eq!(reports[0].cached, vec!["generate"]);
        assert_eq!(pipeline.cache().len(), 2);
    }

    #[test]
    fn test_report_serialization() {
        let report = DocumentReport {
            file: "README.md".to_string(),
            outcome: Some(Outcome::Appended { lines: 2 }),
            error: None,
            reflinks: vec!["verb".to_string()],
            cached: Vec::new(),
        };
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(
            json,
            r#"{"file":"README.md","outcome":{"status":"appended","lines":2},"reflinks":["verb"]}"#
        );
    }
}
