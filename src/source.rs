use std::{
    fs::{File, Metadata},
    io::{self, Read, Seek},
    os::unix::prelude::MetadataExt,
    path::Path,
    time::SystemTime,
};

/// Subset of file metadata the queue relies on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FileStat {
    pub len: u64,
    pub modified: SystemTime,
    pub inode: u64,
}

impl From<Metadata> for FileStat {
    fn from(metadata: Metadata) -> Self {
        Self {
            len: metadata.len(),
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            inode: metadata.ino(),
        }
    }
}

/// Handle that can be read from, positioned and queried for metadata.
pub trait QueueFile: Read + Seek {
    fn stat(&self) -> io::Result<FileStat>;
}

impl QueueFile for File {
    fn stat(&self) -> io::Result<FileStat> {
        Ok(self.metadata()?.into())
    }
}

/// Place log files are opened from.
///
/// `LocalFs` is what you want outside of tests.
pub trait FileSource {
    type File: QueueFile;

    /// Open file at `path` for reading.
    fn open(&self, path: &Path) -> io::Result<Self::File>;

    /// Ask for metadata of whatever `path` currently points to.
    fn stat(&self, path: &Path) -> io::Result<FileStat>;
}

/// Local filesystem
#[derive(Copy, Clone, Debug, Default)]
pub struct LocalFs;

impl FileSource for LocalFs {
    type File = File;

    fn open(&self, path: &Path) -> io::Result<File> {
        File::open(path)
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        Ok(std::fs::metadata(path)?.into())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::{FileSource, LocalFs, QueueFile};

    #[test]
    fn handle_and_path_report_same_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"{}\n")?;

        let opened = LocalFs.open(file.path())?;
        let by_handle = opened.stat()?;
        let by_path = LocalFs.stat(file.path())?;

        assert_eq!(by_handle.inode, by_path.inode);
        assert_eq!(by_handle.len, 3);
        Ok(())
    }

    #[test]
    fn missing_file_cannot_be_opened() {
        let dir = tempfile::tempdir().unwrap();
        let error = LocalFs.open(&dir.path().join("missing.json")).unwrap_err();
        assert_eq!(error.kind(), std::io::ErrorKind::NotFound);
    }
}
