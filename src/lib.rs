//! reflint: Append missing reference-link definitions to markdown
//!
//! Commands:
//! - check: List reflinks without a definition line
//! - fix: Look up missing reflinks and append their definitions

pub mod append;
pub mod cache;
pub mod check;
pub mod config;
pub mod document;
pub mod error;
pub mod expand;
pub mod files;
pub mod fix;
pub mod lookup;
pub mod matcher;
pub mod names;
pub mod pipeline;

pub use append::{Options, Outcome, Reflinks};
pub use cache::{diff, ReflinkCache};
pub use document::Document;
pub use error::{ConfigError, LookupError};
pub use lookup::{Chain, Lookup, LookupResult, RegistryLookup, StaticLookup};
pub use matcher::{extract, matches};
pub use pipeline::{DocumentReport, Pipeline};
