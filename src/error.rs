use std::io;

use pdf::error::PdfError;
use thiserror::Error;

/// Primary error type for box and image extraction.
#[derive(Debug, Error)]
pub enum BoxError {
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("PNG encoding error: {0}")]
    Png(#[from] png::EncodingError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("render failed: {0}")]
    Render(String),
    #[error("unsupported image: {0}")]
    UnsupportedImage(String),
}
