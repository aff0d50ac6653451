//! Core resolution engine for pinpoint.
//!
//! Turns fuzzy, human-style location hints (symbol text + approximate line +
//! occurrence index) into exact 0-based coordinates, and anchors literal text
//! spans uniquely within a file. Operates on raw text only; no parsing, no
//! caching, every call re-reads current disk content.

pub mod config;
pub mod engine;
pub mod locate;
pub mod position;
pub mod resolve;
mod scan;
pub mod snippet;
pub mod source;

pub use engine::SymbolResolver;
pub use locate::LocateError;
pub use position::{DiskRange, ExactPosition, FuzzyPosition};
pub use resolve::{ResolveError, ResolverConfig};
pub use source::{ContentSource, DiskContentSource};
