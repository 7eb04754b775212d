//! Feed client boundary.
//!
//! Feed clients know each remote service's protocol and pagination; this
//! crate only consumes their results. A fetch either yields an ordered,
//! key-unique collection of catalog entries or an error the drivers treat
//! as a skipped sub-feed.

mod error;
mod traits;
mod types;

pub use error::FeedError;
pub use traits::FeedClient;
pub use types::{FeedResult, FeedSettings};
