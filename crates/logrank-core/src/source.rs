use crate::locator::LogFileRef;
use crate::{Error, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Lazy line reader over a plain or gzip-compressed log file.
///
/// The file handle is owned by the source and released as soon as the last
/// line has been read, the first read error has been yielded, or the source
/// is dropped. A finished source keeps returning `None`.
pub struct LineSource {
    path: PathBuf,
    reader: Option<Box<dyn BufRead>>,
    buf: Vec<u8>,
}

impl LineSource {
    /// Open the log file selected by the locator
    pub fn open(log: &LogFileRef) -> Result<Self> {
        Self::open_path(&log.path, log.compressed)
    }

    /// Open an arbitrary log file, treating a `.gz` extension as compressed
    pub fn from_path(path: &Path) -> Result<Self> {
        let compressed = path.extension().is_some_and(|ext| ext == "gz");
        Self::open_path(path, compressed)
    }

    fn open_path(path: &Path, compressed: bool) -> Result<Self> {
        tracing::debug!(
            "Opening log file: {} (compressed: {})",
            path.display(),
            compressed
        );

        let file = File::open(path).map_err(|source| Error::ReadLog {
            path: path.to_path_buf(),
            source,
        })?;

        let reader: Box<dyn BufRead> = if compressed {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        Ok(Self {
            path: path.to_path_buf(),
            reader: Some(reader),
            buf: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn close(&mut self) {
        if self.reader.take().is_some() {
            tracing::debug!("Closed log file: {}", self.path.display());
        }
    }
}

impl Iterator for LineSource {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;

        self.buf.clear();
        match reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.close();
                None
            }
            Ok(_) => {
                while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
                    self.buf.pop();
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(source) => {
                self.close();
                Some(Err(Error::ReadLog {
                    path: self.path.clone(),
                    source,
                }))
            }
        }
    }
}

impl std::iter::FusedIterator for LineSource {}
