use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Errors from the trace file.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("failed to open trace file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write trace file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("tracing is not enabled")]
    NotEnabled,
}

/// One trace line: `timestamp:<seconds, 4 decimals>,<message>\n`.
pub fn format_line(timestamp: f64, message: &str) -> String {
    format!("timestamp:{timestamp:.4},{message}\n")
}

#[derive(Debug)]
struct TraceSink {
    path: PathBuf,
    writer: BufWriter<File>,
    lines: u64,
}

/// Appends one line of actor state per frame to a text file while enabled.
#[derive(Debug, Default)]
pub struct TraceLogger {
    sink: Option<TraceSink>,
}

impl TraceLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Path of the open trace file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.sink.as_ref().map(|s| s.path.as_path())
    }

    /// Lines written since the file was opened.
    pub fn lines_written(&self) -> u64 {
        self.sink.as_ref().map_or(0, |s| s.lines)
    }

    /// Open (truncating) `path`. Returns `Ok(false)` without touching the
    /// current file if tracing is already enabled.
    pub fn enable(&mut self, path: impl AsRef<Path>) -> Result<bool, TraceError> {
        let path = path.as_ref();
        if let Some(sink) = &self.sink {
            tracing::debug!(open = %sink.path.display(), requested = %path.display(), "tracing already enabled");
            return Ok(false);
        }
        let file = File::create(path).map_err(|source| TraceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "tracing enabled");
        self.sink = Some(TraceSink {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            lines: 0,
        });
        Ok(true)
    }

    /// Flush and close the trace file. Returns `Ok(false)` if tracing was
    /// not enabled. The file is closed even when the final flush fails.
    pub fn disable(&mut self) -> Result<bool, TraceError> {
        let Some(mut sink) = self.sink.take() else {
            return Ok(false);
        };
        sink.writer.flush().map_err(|source| TraceError::Write {
            path: sink.path.clone(),
            source,
        })?;
        tracing::info!(path = %sink.path.display(), lines = sink.lines, "tracing disabled");
        Ok(true)
    }

    /// Append one line stamped with `timestamp` seconds.
    pub fn write(&mut self, timestamp: f64, message: &str) -> Result<(), TraceError> {
        let sink = self.sink.as_mut().ok_or(TraceError::NotEnabled)?;
        sink.writer
            .write_all(format_line(timestamp, message).as_bytes())
            .map_err(|source| TraceError::Write {
                path: sink.path.clone(),
                source,
            })?;
        sink.lines += 1;
        Ok(())
    }
}
