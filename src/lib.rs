//! # Jsontrack
//!
//! Jsontrack reads logs that are written as one JSON object per line and rotated into a new dated file every day,
//! like the alerts log of a monitoring agent. It is meant to be polled: each call hands back at most one record
//! and `None` simply means that the writer has not appended anything yet.
//!
//! * `FileQueue` locates the file for a date (or the undated canonical file), opens it in tail or full mode and
//! follows rotation.
//!
//! ```rust no_run
//! # use jsontrack::{FileQueue, Target};
//! let mut queue = FileQueue::new().with_default_target(Target::Today);
//! loop {
//!     match queue.next() {
//!         Some(record) => println!("alert: {}", serde_json::Value::Object(record)),
//!         None => std::thread::sleep(std::time::Duration::from_secs(1)),
//!     }
//! }
//! ```
//!
//! * `QueueFlags` chooses between tail mode and replay from start, and lets the caller hand over its own handle.
//!
//! ```rust
//! # use jsontrack::{FileQueue, QueueFlags, Target, path_utils::AlertsLayout};
//! # let dir = tempfile::tempdir()?;
//! # std::fs::write(dir.path().join("alerts.json"), "{\"Test\":\"Hello World 1\"}\n")?;
//! let mut queue = FileQueue::new().with_layout(AlertsLayout::new(dir.path()));
//! queue.set_flags(QueueFlags { read_from_start: true, ..Default::default() });
//! queue.open(Target::Canonical)?;
//! let record = queue.next().unwrap();
//! assert_eq!(record["Test"], "Hello World 1");
//! queue.close();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! * `path_utils` holds the pluggable mapping from dates to file names.

mod config;
mod error;
mod file_queue;
pub mod flags;
pub mod path_utils;
pub mod report;
pub mod source;

pub use config::QueueConfig;
pub use error::{QueueError, OPEN_ERROR_CODE, STAT_ERROR_CODE};
pub use file_queue::{FileQueue, Record, Target, DEFAULT_MAX_RECORD_LEN};
pub use flags::QueueFlags;
