use thiserror::Error;

/// Logo bytes that cannot be decoded as PNG or JPEG.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ImageDecodeError(pub(crate) String);

/// Fatal rendering failures. There is no partial output: a render
/// either returns a complete document or one of these.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("logo image could not be decoded: {0}")]
    ImageDecode(#[from] ImageDecodeError),
    #[error("document serialization failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Remote typeface acquisition failures. Recovered internally by
/// substituting the builtin monospace family; callers never see these.
#[derive(Debug, Error)]
pub enum FontEmbedError {
    #[error("typeface download failed: {0}")]
    Fetch(String),
    #[error("typeface could not be parsed: {0}")]
    Parse(String),
}
