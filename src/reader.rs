use anyhow::Result;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// Configuration for file reading behavior
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Whether to fail fast on first error or continue processing
    pub fail_fast: bool,
    /// Buffer size for async reading (default: 64KB)
    pub buffer_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            // annotation files run to gigabytes; larger reads cut syscalls
            buffer_size: 64 * 1024,
        }
    }
}

/// Statistics for file reading operations
#[derive(Debug, Clone)]
pub struct ReadStats {
    pub file_path: String,
    pub lines_read: u64,
    pub bytes_read: u64,
    pub duration_ms: u64,
    pub read_error: Option<String>,
}

impl ReadStats {
    fn failed(path: &Path, lines_read: u64, start: std::time::Instant, error: String) -> Self {
        Self {
            file_path: path.display().to_string(),
            lines_read,
            bytes_read: 0,
            duration_ms: start.elapsed().as_millis() as u64,
            read_error: Some(error),
        }
    }
}

/// Async reader that loads an annotation file as UTF-8 text
pub struct AsyncFileReader {
    config: ReaderConfig,
}

impl AsyncFileReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Read the whole file line by line into one string.
    ///
    /// Without `fail_fast`, open and decode errors are reported through
    /// `ReadStats::read_error` and the returned text is empty.
    pub async fn read_file_text<P: AsRef<Path>>(&self, file_path: P) -> Result<(String, ReadStats)> {
        let path = file_path.as_ref();
        let start_time = std::time::Instant::now();

        debug!("Starting async read of file: {}", path.display());

        let file = match File::open(path).await {
            Ok(file) => file,
            Err(e) => {
                let error_msg = format!("Failed to open file {}: {}", path.display(), e);
                warn!("{}", error_msg);

                if self.config.fail_fast {
                    return Err(anyhow::anyhow!(error_msg));
                }
                return Ok((String::new(), ReadStats::failed(path, 0, start_time, error_msg)));
            }
        };

        // `lines()` drops `\r\n` endings; take the size from metadata
        let byte_count = match file.metadata().await {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                let error_msg = format!("Failed to stat file {}: {}", path.display(), e);
                warn!("{}", error_msg);

                if self.config.fail_fast {
                    return Err(anyhow::anyhow!(error_msg));
                }
                return Ok((String::new(), ReadStats::failed(path, 0, start_time, error_msg)));
            }
        };

        let reader = BufReader::with_capacity(self.config.buffer_size, file);
        let mut lines = reader.lines();
        let mut text = String::new();
        let mut line_count = 0u64;

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    line_count += 1;
                    text.push_str(&line);
                    text.push('\n');
                }
                Ok(None) => break,
                Err(e) => {
                    let error_msg = format!(
                        "Read error in {} at line {}: {}",
                        path.display(),
                        line_count + 1,
                        e
                    );
                    warn!("{}", error_msg);

                    if self.config.fail_fast {
                        return Err(anyhow::anyhow!(error_msg));
                    }
                    // a partially read file is not a unit of work; drop what was read
                    return Ok((
                        String::new(),
                        ReadStats::failed(path, line_count, start_time, error_msg),
                    ));
                }
            }
        }

        let stats = ReadStats {
            file_path: path.display().to_string(),
            lines_read: line_count,
            bytes_read: byte_count,
            duration_ms: start_time.elapsed().as_millis() as u64,
            read_error: None,
        };

        info!(
            "Loaded {}: {} lines, {} bytes in {}ms",
            path.display(),
            line_count,
            byte_count,
            stats.duration_ms
        );

        Ok((text, stats))
    }
}
