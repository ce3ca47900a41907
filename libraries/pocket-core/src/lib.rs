//! Pocket Player Core
//!
//! Platform-agnostic domain types shared by every Pocket Player crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `TrackId`, `Locator`
//! - **Catalog Contract**: the `TrackCatalog` trait and an in-memory implementation
//! - **Error Handling**: `CoreError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use pocket_core::{CatalogEntry, MemoryCatalog, TrackCatalog};
//!
//! let catalog = MemoryCatalog::from_entries(vec![
//!     CatalogEntry::music("2", "beta", 200_000, "content://audio/2"),
//!     CatalogEntry::music("1", "Alpha", 180_000, "content://audio/1"),
//! ]);
//!
//! let tracks = catalog.list_tracks().unwrap();
//! assert_eq!(tracks[0].title, "Alpha");
//! ```

#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod traits;
pub mod types;

pub use catalog::{normalize, CatalogEntry, MemoryCatalog, UNKNOWN_ARTIST, UNKNOWN_TITLE};
pub use error::{CoreError, Result};
pub use traits::TrackCatalog;
pub use types::{Locator, Track, TrackId};
