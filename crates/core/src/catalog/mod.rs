//! Catalog entry types shared by feeds, jobs and playlists.

mod types;

pub use types::CatalogEntry;
