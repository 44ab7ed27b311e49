//! Configuration file loading for content-quorum
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CONTENT_QUORUM_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./content-quorum.toml` or `./.content-quorum.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/content-quorum/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileApprovalServerConfig, FileBreakerConfig, FileConfig,
    FileEventsConfig, FileLoggingConfig, FileProviderConfig, FileResilienceConfig,
    FileRetryConfig, FileWorkflowConfig, ProviderKind,
};
pub use loader::ConfigLoader;
