//! Download boundary: transfer mechanics live outside this crate.
//!
//! Jobs hand a [`DownloadContainer`] (temporary storage allocated by a
//! [`ContainerProvider`]) to a [`Downloader`], which either fills it and
//! returns a [`DownloadedContent`] handle or reports why it could not.

mod error;
mod traits;
mod types;

pub use error::DownloadError;
pub use traits::{ContainerProvider, Downloader};
pub use types::{DownloadContainer, DownloadedContent, TempDirContainers};
