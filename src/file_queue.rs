use std::{
    io::{self, BufRead, BufReader, Read, Seek, SeekFrom},
    path::{Path, PathBuf},
    time::SystemTime,
};

use chrono::{Days, NaiveDate};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{
    path_utils::{AlertsLayout, LogDate, PathLayout},
    report::{ErrorReporter, TracingReporter},
    source::{FileSource, FileStat, LocalFs, QueueFile},
    QueueError, QueueFlags,
};

/// Longest line the queue reads in one piece. Longer lines are split and fail to parse.
pub const DEFAULT_MAX_RECORD_LEN: usize = 65536;

/// One parsed line of the log.
pub type Record = Map<String, Value>;

/// Which file `FileQueue::open` should look for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// Undated path of the layout.
    Canonical,
    /// File written on a specific day.
    Date(LogDate),
    /// File of the current day. Reading with this target follows day rotation.
    Today,
}

impl Target {
    /// Decode signed day addressing: negative values mean the canonical file, others count days since 1970-01-01.
    ///
    /// ```rust
    /// use jsontrack::{Target, path_utils::LogDate};
    /// assert_eq!(Target::from_raw(-1), Target::Canonical);
    /// assert_eq!(Target::from_raw(31), Target::Date(LogDate::new(1970, 2, 1).unwrap()));
    /// ```
    pub fn from_raw(raw: i64) -> Self {
        let Ok(days) = u64::try_from(raw) else {
            return Target::Canonical;
        };
        NaiveDate::from_ymd_opt(1970, 1, 1)
            .and_then(|epoch| epoch.checked_add_days(Days::new(days)))
            .map_or(Target::Canonical, |date| Target::Date(date.into()))
    }
}

/// Sequential reader of a rotating, date-stamped JSON-lines log
///
/// ## Usage
///
/// Call `next` repeatedly. The file is opened lazily, positioned at its end unless `read_from_start` is set, and
/// each call hands back at most one record. `None` means that nothing is available right now, so poll again later.
///
/// ```rust no_run
/// # use jsontrack::{FileQueue, QueueFlags, Target};
/// let mut queue = FileQueue::new().with_default_target(Target::Today);
/// queue.set_flags(QueueFlags { read_from_start: true, ..Default::default() });
/// while let Some(record) = queue.next() {
///     println!("{}", record["rule"]["description"]);
/// }
/// queue.close();
/// ```
///
/// ## Rotation
///
/// When the handle hits end of file, the queue checks whether it should move on:
///
/// * with `Target::Today` as default target, a new day switches to the new day's file, read from its start,
///   as soon as that file exists;
/// * if the file behind the current path was replaced (different inode), it is reopened from its start;
/// * if it shrank below the read position, reading restarts from its start.
///
/// ## Failures
///
/// `open` reports every failure once through the `ErrorReporter` (a `tracing` event by default) and returns it.
/// The queue is left closed after a failure and nothing is retried on its own: the next call to `next` or `open`
/// makes a new attempt.
pub struct FileQueue<S: FileSource = LocalFs> {
    current_path: PathBuf,
    handle: Option<BufReader<S::File>>,
    /// date stamp of `current_path`, None for the canonical file
    date: Option<LogDate>,
    last_change: Option<SystemTime>,
    inode: u64,
    /// handle came from `attach` rather than from `open`
    attached: bool,
    flags: QueueFlags,

    source: S,
    layout: Box<dyn PathLayout>,
    reporter: Box<dyn ErrorReporter>,
    clock: Box<dyn Fn() -> LogDate>,
    default_target: Target,
    max_record_len: usize,
}

impl FileQueue<LocalFs> {
    /// Creates a closed queue reading the default alerts directory of the local filesystem.
    pub fn new() -> Self {
        Self::with_source(LocalFs)
    }
}

impl Default for FileQueue<LocalFs> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: FileSource> FileQueue<S> {
    /// Creates a closed queue opening its files through `source`.
    pub fn with_source(source: S) -> Self {
        Self {
            current_path: PathBuf::new(),
            handle: None,
            date: None,
            last_change: None,
            inode: 0,
            attached: false,
            flags: QueueFlags::default(),
            source,
            layout: Box::new(AlertsLayout::default()),
            reporter: Box::new(TracingReporter),
            clock: Box::new(LogDate::today),
            default_target: Target::Canonical,
            max_record_len: DEFAULT_MAX_RECORD_LEN,
        }
    }

    pub fn with_layout(mut self, layout: impl PathLayout + 'static) -> Self {
        self.layout = Box::new(layout);
        self
    }

    pub fn with_reporter(mut self, reporter: impl ErrorReporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Replace the source of the current date used to resolve `Target::Today`.
    pub fn with_clock(mut self, clock: impl Fn() -> LogDate + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Target used when `next` has to open a file on its own.
    pub fn with_default_target(mut self, target: Target) -> Self {
        self.default_target = target;
        self
    }

    pub fn with_max_record_len(mut self, max_record_len: usize) -> Self {
        self.max_record_len = max_record_len.max(1);
        self
    }

    /// Reset the queue to its initial state: no handle, no path, no date stamp, default flags.
    ///
    /// A handle that is still held is released.
    pub fn init(&mut self) {
        self.close();
        self.current_path = PathBuf::new();
        self.date = None;
        self.last_change = None;
        self.inode = 0;
        self.flags = QueueFlags::default();
    }

    /// (Re)acquire the handle for `target`, positioned according to current flags.
    ///
    /// On failure, the error is reported once and the queue stays closed. Path bookkeeping is updated in both cases.
    pub fn open(&mut self, target: Target) -> Result<(), QueueError> {
        self.open_positioned(target, self.flags.read_from_start)
    }

    /// Give the queue a handle opened by the caller.
    ///
    /// Used together with `handle_preattached`: `open` will then keep this handle instead of opening one itself.
    ///
    /// An attached handle is not tied to a path, so it is never swapped out by rotation checks.
    pub fn attach(&mut self, file: S::File) {
        self.close();
        match file.stat() {
            Ok(stat) => {
                self.last_change = Some(stat.modified);
                self.inode = stat.inode;
            }
            Err(error) => debug!(%error, "cannot stat attached handle"),
        }
        self.handle = Some(BufReader::new(file));
        self.attached = true;
    }

    /// Read and parse the next line.
    ///
    /// Returns `None` when no record is available: the file could not be opened (already reported by `open`), the
    /// end of file was reached or the line is not a JSON object. Records longer than the configured limit are split
    /// into pieces that will not parse.
    pub fn next(&mut self) -> Option<Record> {
        if self.handle.is_none()
            && self
                .open_positioned(self.default_target, self.flags.read_from_start)
                .is_err()
        {
            return None;
        }

        let line = match self.read_line() {
            Some(line) => line,
            None if self.follow_rotation() => self.read_line()?,
            None => return None,
        };
        parse_record(line)
    }

    /// Release the handle. Path is kept to know what was being read.
    pub fn close(&mut self) {
        self.attached = false;
        if let Some(handle) = self.handle.take() {
            debug!(path = %self.current_path.display(), "closing log file");
            drop(handle);
        }
    }

    /// Overwrite flags. They are taken into account by the next `open`.
    pub fn set_flags(&mut self, flags: QueueFlags) {
        self.flags = flags;
    }

    pub fn flags(&self) -> QueueFlags {
        self.flags
    }

    /// Path of the file currently or last opened, empty if `open` was never attempted.
    pub fn path(&self) -> &Path {
        &self.current_path
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Year of the date stamp in current path, 0 if there is none.
    pub fn year(&self) -> i32 {
        self.date.map(|date| date.year).unwrap_or_default()
    }

    /// Day of month of the date stamp in current path, 0 if there is none.
    pub fn day(&self) -> u32 {
        self.date.map(|date| date.day).unwrap_or_default()
    }

    /// Month label of the date stamp in current path, empty if there is none.
    pub fn month_label(&self) -> &str {
        self.date.as_ref().map(LogDate::month_label).unwrap_or_default()
    }

    /// Modification time of the file, as seen at open or at the last end of file.
    pub fn last_change(&self) -> Option<SystemTime> {
        self.last_change
    }

    fn open_positioned(&mut self, target: Target, from_start: bool) -> Result<(), QueueError> {
        if self.flags.handle_preattached {
            self.locate(target);
            if self.handle.is_some() {
                return Ok(());
            }
            let error = QueueError::OpenFailed {
                path: self.current_path.clone(),
                source: io::Error::new(io::ErrorKind::NotConnected, "no handle was attached"),
            };
            self.reporter.report(&error);
            return Err(error);
        }

        self.close();
        self.locate(target);
        match self.acquire(from_start) {
            Ok((file, stat)) => {
                debug!(path = %self.current_path.display(), from_start, "opened log file");
                self.handle = Some(BufReader::new(file));
                self.last_change = Some(stat.modified);
                self.inode = stat.inode;
                Ok(())
            }
            Err(error) => {
                self.reporter.report(&error);
                Err(error)
            }
        }
    }

    fn locate(&mut self, target: Target) {
        self.date = match target {
            Target::Canonical => None,
            Target::Date(date) => Some(date),
            Target::Today => Some((self.clock)()),
        };
        self.current_path = match &self.date {
            Some(date) => self.layout.dated(date),
            None => self.layout.canonical(),
        };
    }

    /// Open, position and stat the file at current path. Whatever was opened is dropped on failure.
    fn acquire(&self, from_start: bool) -> Result<(S::File, FileStat), QueueError> {
        let open_failed = |source: io::Error| QueueError::OpenFailed {
            path: self.current_path.clone(),
            source,
        };

        let mut file = self.source.open(&self.current_path).map_err(open_failed)?;
        let position = if from_start {
            SeekFrom::Start(0)
        } else {
            SeekFrom::End(0)
        };
        file.seek(position).map_err(open_failed)?;
        let stat = file.stat().map_err(|source| QueueError::StatFailed {
            path: self.current_path.clone(),
            source,
        })?;

        Ok((file, stat))
    }

    fn read_line(&mut self) -> Option<Vec<u8>> {
        let limit = self.max_record_len as u64;
        let reader = self.handle.as_mut()?;
        let mut line = Vec::new();
        match reader.by_ref().take(limit).read_until(b'\n', &mut line) {
            Ok(0) => None,
            Ok(read) => {
                if read as u64 == limit && line.last() != Some(&b'\n') {
                    debug!(path = %self.current_path.display(), limit, "line exceeds record limit");
                }
                Some(line)
            }
            Err(error) => {
                debug!(path = %self.current_path.display(), %error, "failed to read line");
                None
            }
        }
    }

    /// Check whether the file we hit end of should be left for another one.
    ///
    /// Returns true if the handle moved and reading is worth retrying.
    fn follow_rotation(&mut self) -> bool {
        if self.attached || self.flags.handle_preattached {
            return false;
        }

        if self.default_target == Target::Today {
            let today = (self.clock)();
            if self.date != Some(today) {
                let next_path = self.layout.dated(&today);
                match self.source.stat(&next_path) {
                    Ok(_) => {
                        info!(
                            from = %self.current_path.display(),
                            to = %next_path.display(),
                            "day changed, switching log file"
                        );
                        return self.open_positioned(Target::Date(today), true).is_ok();
                    }
                    Err(error) => {
                        // writer has not created the new day's file yet
                        debug!(path = %next_path.display(), %error, "day changed, waiting for new log file");
                    }
                }
            }
        }

        let stat = match self.source.stat(&self.current_path) {
            Ok(stat) => stat,
            Err(error) => {
                debug!(path = %self.current_path.display(), %error, "cannot check log file for rotation");
                return false;
            }
        };

        if stat.inode != self.inode {
            info!(path = %self.current_path.display(), "log file was replaced, reloading");
            let target = self.date.map_or(Target::Canonical, Target::Date);
            return self.open_positioned(target, true).is_ok();
        }

        self.last_change = Some(stat.modified);
        let Some(handle) = self.handle.as_mut() else {
            return false;
        };
        match handle.stream_position() {
            Ok(position) if stat.len < position => {
                info!(path = %self.current_path.display(), position, len = stat.len, "log file was truncated, reading from start");
                handle.rewind().is_ok()
            }
            _ => false,
        }
    }
}

fn parse_record(mut line: Vec<u8>) -> Option<Record> {
    if line.last() == Some(&b'\n') {
        line.pop();
    }
    match serde_json::from_slice(&line) {
        Ok(Value::Object(record)) => Some(record),
        Ok(_) => {
            debug!("skipping line that is not a JSON object");
            None
        }
        Err(error) => {
            debug!(%error, "skipping line that is not valid JSON");
            None
        }
    }
}
