// src/crawl/sink.rs
// =============================================================================
// The per-site results file: <output_root>/<site_name>.txt
//
// One discovered URL per line, in discovery order. The file is created (and
// truncated) when the crawl starts and flushed when it ends. Only the site's
// own crawler ever holds it.
// =============================================================================

use super::site::SiteError;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};

/// Append-only text file collecting one site's discovered links
#[derive(Debug)]
pub struct OutputSink {
    path: PathBuf,
    writer: BufWriter<File>,
    lines: usize,
}

impl OutputSink {
    /// Creates `output_root` if needed and opens `<site_name>.txt` inside it
    pub async fn create(output_root: &Path, site_name: &str) -> Result<Self, SiteError> {
        fs::create_dir_all(output_root)
            .await
            .map_err(|source| SiteError::OutputDir {
                path: output_root.to_path_buf(),
                source,
            })?;

        let path = Self::path_for(output_root, site_name);
        let file = File::create(&path)
            .await
            .map_err(|source| SiteError::OutputFile {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            lines: 0,
        })
    }

    /// Where the results for `site_name` go
    pub fn path_for(output_root: &Path, site_name: &str) -> PathBuf {
        output_root.join(format!("{}.txt", site_name))
    }

    /// Appends one URL as its own line
    pub async fn append(&mut self, url: &str) -> Result<(), SiteError> {
        self.writer
            .write_all(format!("{}\n", url).as_bytes())
            .await
            .map_err(|source| SiteError::OutputFile {
                path: self.path.clone(),
                source,
            })?;
        self.lines += 1;
        Ok(())
    }

    /// Flushes buffered lines and returns the file path
    pub async fn close(mut self) -> Result<PathBuf, SiteError> {
        match self.writer.flush().await {
            Ok(()) => Ok(self.path),
            Err(source) => Err(SiteError::OutputFile {
                path: self.path,
                source,
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> usize {
        self.lines
    }
}
