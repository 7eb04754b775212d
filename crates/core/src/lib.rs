pub mod catalog;
pub mod config;
pub mod download;
pub mod feed;
pub mod history;
pub mod job;
pub mod metrics;
pub mod orchestrator;
pub mod playlist;
pub mod reconcile;
pub mod scheduler;
pub mod target;
pub mod testing;

pub use catalog::CatalogEntry;
pub use config::{
    load_config, load_config_from_str, validate_config, AppConfig, ConfigError, PlaylistStyle,
};
pub use orchestrator::{OrchestratorError, PipelineBuilder, SyncOrchestrator, SyncSummary};
pub use scheduler::{JobCompletionHandler, JobHandle, JobManager};
