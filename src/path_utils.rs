use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Directory the alerts writer logs into by default.
pub const DEFAULT_ALERTS_DIR: &str = "/var/ossec/logs/alerts";

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Date stamp embedded into the name of a rotated log file.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogDate {
    pub year: i32,
    /// 1-based month
    pub month: u32,
    /// day of month, 1-based
    pub day: u32,
}

impl LogDate {
    /// Build a date stamp, returning None if the calendar date does not exist.
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self::from)
    }

    /// Date stamp of the current local day.
    pub fn today() -> Self {
        Local::now().date_naive().into()
    }

    /// Short english label of the month as used in directory names, e.g. `Jan`.
    pub fn month_label(&self) -> &'static str {
        MONTH_LABELS[(self.month.clamp(1, 12) - 1) as usize]
    }
}

impl From<NaiveDate> for LogDate {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

/// Rule that turns a date stamp into a path of a log file.
///
/// The reader never builds file names on its own: it asks the layout, so deployments with a different
/// naming scheme only need to provide their own implementation.
pub trait PathLayout {
    /// Path used when no explicit date is requested.
    fn canonical(&self) -> PathBuf;

    /// Path of the file written on `date`.
    fn dated(&self, date: &LogDate) -> PathBuf;
}

/// Default layout of the alerts directory
///
/// * canonical file: `{base}/alerts.json`
/// * dated files: `{base}/{year}/{Mon}/ossec-alerts-{DD}.json`
///
/// ```rust
/// use std::path::PathBuf;
/// use jsontrack::path_utils::{AlertsLayout, LogDate, PathLayout};
/// let layout = AlertsLayout::new("/logs/alerts");
/// let date = LogDate::new(2019, 3, 7).unwrap();
/// assert_eq!(layout.dated(&date), PathBuf::from("/logs/alerts/2019/Mar/ossec-alerts-07.json"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertsLayout {
    base_dir: PathBuf,
}

impl AlertsLayout {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl Default for AlertsLayout {
    fn default() -> Self {
        Self::new(DEFAULT_ALERTS_DIR)
    }
}

impl PathLayout for AlertsLayout {
    fn canonical(&self) -> PathBuf {
        append_extension(self.base_dir.join("alerts"), "json")
    }

    fn dated(&self, date: &LogDate) -> PathBuf {
        let file_name = format!("ossec-alerts-{:02}", date.day);
        let path = self
            .base_dir
            .join(date.year.to_string())
            .join(date.month_label())
            .join(file_name);
        append_extension(path, "json")
    }
}

/// Add extension to existing PathBuf
///
/// ## Example
///
/// ```rust
/// use std::path::PathBuf;
/// let original_path = "/var/ossec/logs/alerts/alerts".into();
/// let path = jsontrack::path_utils::append_extension(original_path, "json");
/// assert_eq!(path, PathBuf::from("/var/ossec/logs/alerts/alerts.json"));
/// ```
pub fn append_extension(path: PathBuf, ext: impl AsRef<std::ffi::OsStr>) -> PathBuf {
    let mut os_string: std::ffi::OsString = path.into();
    os_string.push(".");
    os_string.push(ext.as_ref());
    os_string.into()
}
