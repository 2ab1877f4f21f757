//! Headless Chromium rasterizer.
//!
//! Writes the HTML into a temporary directory, runs the browser's
//! print-to-pdf mode against it, and reads the PDF back.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tempfile::{tempdir, TempDir};
use thiserror::Error;
use tokio::process::Command;

const HTML_FILENAME: &str = "document.html";
const PDF_FILENAME: &str = "document.pdf";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum RasterizeError {
    #[error("failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("failed to write HTML source: {0}")]
    WriteHtml(#[source] std::io::Error),
    #[error("browser execution failed: {0}")]
    BrowserIo(#[source] std::io::Error),
    #[error("browser exited with status {0}")]
    Exit(i32),
    #[error("browser did not finish within {0:?}")]
    Timeout(Duration),
    #[error("failed to read generated PDF: {0}")]
    ReadPdf(#[source] std::io::Error),
    #[error("browser produced an empty PDF")]
    EmptyPdf,
}

/// HTML in, PDF bytes out.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(&self, html: &str) -> Result<Vec<u8>, RasterizeError>;
}

pub struct ChromeRasterizer {
    binary: String,
    timeout: Duration,
}

impl ChromeRasterizer {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Rasterizer for ChromeRasterizer {
    async fn rasterize(&self, html: &str) -> Result<Vec<u8>, RasterizeError> {
        // Create temp directory for the browser's input and output
        let temp_dir = tempdir().map_err(RasterizeError::TempDir)?;
        let html_path = temp_dir.path().join(HTML_FILENAME);

        tokio::fs::write(&html_path, html)
            .await
            .map_err(RasterizeError::WriteHtml)?;

        let pdf = print_to_pdf(&self.binary, &temp_dir, &html_path, self.timeout).await?;
        log::debug!("Rasterized {} bytes of HTML into {} bytes of PDF", html.len(), pdf.len());
        Ok(pdf)
    }
}

async fn print_to_pdf(
    binary: &str,
    temp_dir: &TempDir,
    html_path: &Path,
    timeout: Duration,
) -> Result<Vec<u8>, RasterizeError> {
    let output_path = temp_dir.path().join(PDF_FILENAME);

    let mut command = Command::new(binary);
    command
        .arg("--headless")
        .arg("--disable-gpu")
        .arg("--no-sandbox")
        .arg("--no-pdf-header-footer")
        .arg(format!("--user-data-dir={}", temp_dir.path().join("profile").display()))
        .arg(format!("--print-to-pdf={}", output_path.display()))
        .arg(format!("file://{}", html_path.display()))
        .current_dir(temp_dir.path())
        .kill_on_drop(true);

    let status = tokio::time::timeout(timeout, command.status())
        .await
        .map_err(|_| RasterizeError::Timeout(timeout))?
        .map_err(RasterizeError::BrowserIo)?;

    if !status.success() {
        let code = status.code().unwrap_or(-1);
        return Err(RasterizeError::Exit(code));
    }

    let pdf = tokio::fs::read(&output_path)
        .await
        .map_err(RasterizeError::ReadPdf)?;
    if pdf.is_empty() {
        return Err(RasterizeError::EmptyPdf);
    }
    Ok(pdf)
}
