//! Append missing reference definitions to a document
//!
//! The transform is atomic: a document is either left exactly as it was or
//! has every new definition appended at once.

use crate::cache::union;
use crate::document::Document;
use crate::error::LookupError;
use crate::expand::expand_reflinks;
use crate::lookup::Lookup;
use crate::matcher::matches;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Transform options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Options {
    /// Names requested for every document, on top of what it cites
    #[serde(default)]
    pub reflinks: Vec<String>,
    /// Everything else, forwarded to the lookup as-is
    #[serde(default, flatten)]
    pub passthrough: Map<String, Value>,
}

/// What the transform did to a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// No content buffer, or contents that are not UTF-8
    Skipped,
    /// Every citation already has a definition
    NoCandidates,
    /// Lookup returned nothing that isn't already in the text
    NothingNew,
    /// Definitions appended
    Appended { lines: usize },
}

impl Outcome {
    pub fn changed(&self) -> bool {
        matches!(self, Outcome::Appended { .. })
    }
}

/// The append transform, bound to a lookup and its options
pub struct Reflinks<L> {
    lookup: L,
    options: Options,
}

impl<L: Lookup> Reflinks<L> {
    pub fn new(lookup: L, options: Options) -> Self {
        Self { lookup, options }
    }

    /// Find the document's missing reflinks, look them up, and append the
    /// definitions that are not already present.
    ///
    /// Only a lookup failure is an error, and it leaves the document as it
    /// was. Contents that are not valid UTF-8 are skipped, never rewritten.
    pub async fn apply(&self, doc: &mut Document) -> Result<Outcome, LookupError> {
        let Some(contents) = doc.contents.as_deref() else {
            tracing::debug!(path = %doc.path.display(), "no content buffer, skipping");
            return Ok(Outcome::Skipped);
        };
        let Ok(text) = std::str::from_utf8(contents) else {
            tracing::warn!(path = %doc.path.display(), "contents are not valid UTF-8, skipping");
            return Ok(Outcome::Skipped);
        };
        let text = expand_reflinks(text).into_owned();

        let found = matches(&text);
        if found.is_empty() {
            return Ok(Outcome::NoCandidates);
        }
        tracing::debug!(path = %doc.path.display(), reflinks = ?found, "missing reflinks");

        let request = union(&self.options.reflinks, &found);
        let result = self.lookup.lookup(&request, &self.options).await?;
        doc.reflinks = Some(found);

        let links: Vec<&str> = result
            .links
            .iter()
            .map(String::as_str)
            .filter(|link| !text.contains(link))
            .collect();
        if links.is_empty() {
            return Ok(Outcome::NothingNew);
        }

        let mut text = text;
        text.push_str("\n\n");
        text.push_str(&links.join("\n"));
        doc.contents = Some(text.into_bytes());

        tracing::info!(path = %doc.path.display(), lines = links.len(), "appended reference definitions");
        Ok(Outcome::Appended { lines: links.len() })
    }
}
