//! Log Configuration
//!
//! Controls how segments are sized and where the first one starts:
//!
//! - **max_store_bytes**: roll the active segment when its store file
//!   reaches this size (default: 1024)
//! - **max_index_bytes**: pre-allocated index mapping size, which doubles as
//!   the index rollover threshold (default: 1024)
//! - **initial_offset**: base offset of the first segment when the log
//!   directory is empty (default: 0)
//!
//! The defaults are deliberately tiny: sized for tests, where a handful of
//! appends should exercise rollover. Deployments override them.
//!
//! ## Usage
//!
//! ```ignore
//! use driftlog_storage::LogConfig;
//!
//! let config = LogConfig {
//!     max_store_bytes: 64 * 1024 * 1024,
//!     max_index_bytes: 10 * 1024 * 1024,
//!     ..Default::default()
//! };
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Store file size in bytes at which the active segment rolls.
    #[serde(default = "default_max_store_bytes")]
    pub max_store_bytes: u64,

    /// Index mapping size in bytes; pre-allocated at segment open and also
    /// the index rollover threshold.
    #[serde(default = "default_max_index_bytes")]
    pub max_index_bytes: u64,

    /// Base offset assigned to the first segment of an empty log.
    #[serde(default)]
    pub initial_offset: u64,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            max_store_bytes: default_max_store_bytes(),
            max_index_bytes: default_max_index_bytes(),
            initial_offset: 0,
        }
    }
}

fn default_max_store_bytes() -> u64 {
    1024
}

fn default_max_index_bytes() -> u64 {
    1024
}
