use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
    file_queue::DEFAULT_MAX_RECORD_LEN,
    path_utils::{AlertsLayout, DEFAULT_ALERTS_DIR},
    FileQueue, QueueFlags, Target,
};

/// Settings of a queue reading the local filesystem, usually loaded from agent configuration.
///
/// Every field is optional when deserializing.
///
/// ```rust
/// # use jsontrack::QueueConfig;
/// let config: QueueConfig = serde_json::from_str(r#"{"base_dir": "/tmp/alerts", "follow_today": true}"#)?;
/// assert_eq!(config.max_record_len, 65536);
/// assert!(!config.flags.read_from_start);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct QueueConfig {
    /// directory the alerts writer logs into
    pub base_dir: PathBuf,
    pub max_record_len: usize,
    pub flags: QueueFlags,
    /// read today's dated file and follow day rotation instead of the canonical file
    pub follow_today: bool,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(DEFAULT_ALERTS_DIR),
            max_record_len: DEFAULT_MAX_RECORD_LEN,
            flags: QueueFlags::default(),
            follow_today: false,
        }
    }
}

impl FileQueue {
    /// Build a closed queue from `config`. Nothing is opened until `open` or `next` is called.
    pub fn from_config(config: &QueueConfig) -> Self {
        let target = if config.follow_today {
            Target::Today
        } else {
            Target::Canonical
        };
        let mut queue = FileQueue::new()
            .with_layout(AlertsLayout::new(&config.base_dir))
            .with_max_record_len(config.max_record_len)
            .with_default_target(target);
        queue.set_flags(config.flags);
        queue
    }
}
