//! Storage targets: local destinations for downloaded content.
//!
//! A target receives materialized content and may additionally expose a
//! history store and a playlist manager through optional capability
//! accessors. Targets are configured once at startup and collected into a
//! read-only [`TargetRegistry`] for the process lifetime.

mod directory;
mod error;
mod registry;
mod traits;

pub use directory::DirectoryTarget;
pub use error::TargetError;
pub use registry::TargetRegistry;
pub use traits::StorageTarget;
