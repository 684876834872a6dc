//! Documents flowing through the append transform

use std::path::{Path, PathBuf};

/// A markdown document.
///
/// `contents` is `None` for entries that have no buffer (directories,
/// stream placeholders); the transform passes those through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub contents: Option<Vec<u8>>,
    /// Missing reference names found in this document, excluding presets.
    /// Set by the transform once candidates were found and looked up.
    pub reflinks: Option<Vec<String>>,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: Some(contents.into()),
            reflinks: None,
        }
    }

    /// Document without a content buffer
    pub fn placeholder(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            contents: None,
            reflinks: None,
        }
    }

    /// Read a document from disk
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let contents = tokio::fs::read(path).await?;
        Ok(Self::new(path, contents))
    }

    /// Contents as UTF-8. `None` without a buffer or when the bytes are not
    /// valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(self.contents.as_deref()?).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_has_no_buffer() {
        let doc = Document::placeholder("docs/");
        assert!(doc.contents.is_none());
        assert!(doc.text().is_none());
    }

    #[test]
    fn test_text_requires_utf8() {
        let doc = Document::new("a.md", vec![b'[', 0xff, b']']);
        assert!(doc.text().is_none());
        assert_eq!(doc.contents.as_deref(), Some([b'[', 0xff, b']'].as_slice()));

        let doc = Document::new("b.md", "café [verb]");
        assert_eq!(doc.text(), Some("café [verb]"));
    }
}
