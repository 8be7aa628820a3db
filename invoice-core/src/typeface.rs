use std::io::Read;
use std::thread;

use crate::error::FontEmbedError;

/// Courier Prime, the preferred monospace family, served from the
/// google/fonts repository.
pub const COURIER_PRIME_REGULAR_URL: &str =
    "https://raw.githubusercontent.com/google/fonts/main/apache/courierprime/CourierPrime-Regular.ttf";
pub const COURIER_PRIME_BOLD_URL: &str =
    "https://raw.githubusercontent.com/google/fonts/main/apache/courierprime/CourierPrime-Bold.ttf";

/// Where the renderer's typefaces come from.
#[derive(Debug, Clone)]
pub enum TypefaceSource {
    /// Fetch a regular and a bold face over HTTP, falling back to the
    /// builtin Courier family if either download or embed fails.
    Remote {
        regular_url: String,
        bold_url: String,
    },
    /// Use the builtin Courier family directly; no network touched.
    Builtin,
}

impl Default for TypefaceSource {
    fn default() -> Self {
        TypefaceSource::Remote {
            regular_url: COURIER_PRIME_REGULAR_URL.to_string(),
            bold_url: COURIER_PRIME_BOLD_URL.to_string(),
        }
    }
}

/// Download a font file into memory.
pub(crate) fn fetch(url: &str) -> Result<Vec<u8>, FontEmbedError> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| FontEmbedError::Fetch(e.to_string()))?;
    let mut bytes = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| FontEmbedError::Fetch(e.to_string()))?;
    Ok(bytes)
}

/// Download the regular and bold faces concurrently and join both
/// before returning. The two downloads have no ordering requirement;
/// this is the only concurrency in a render.
pub(crate) fn fetch_pair(
    regular_url: &str,
    bold_url: &str,
) -> Result<(Vec<u8>, Vec<u8>), FontEmbedError> {
    thread::scope(|scope| {
        let regular = scope.spawn(|| fetch(regular_url));
        let bold = scope.spawn(|| fetch(bold_url));
        let regular = regular
            .join()
            .map_err(|_| FontEmbedError::Fetch("download thread panicked".to_string()))??;
        let bold = bold
            .join()
            .map_err(|_| FontEmbedError::Fetch("download thread panicked".to_string()))??;
        Ok((regular, bold))
    })
}

/// Run `attempt`; on failure log a warning and substitute `fallback`.
/// Typeface acquisition must never abort a render.
pub(crate) fn attempt_or<T>(
    attempt: impl FnOnce() -> Result<T, FontEmbedError>,
    fallback: T,
) -> T {
    match attempt() {
        Ok(value) => value,
        Err(err) => {
            log::warn!("using builtin typefaces: {}", err);
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempt_or_keeps_the_success_value() {
        let value = attempt_or(|| Ok(7), 0);
        assert_eq!(value, 7);
    }

    #[test]
    fn attempt_or_substitutes_on_failure() {
        let value = attempt_or(
            || Err::<i32, _>(FontEmbedError::Fetch("connection refused".to_string())),
            42,
        );
        assert_eq!(value, 42);
    }

    #[test]
    fn fetch_reports_unreachable_hosts() {
        // Port 9 (discard) is not listening; the connection fails fast.
        let err = fetch("http://127.0.0.1:9/font.ttf").unwrap_err();
        assert!(matches!(err, FontEmbedError::Fetch(_)));
    }

    #[test]
    fn fetch_pair_surfaces_either_failure() {
        let result = fetch_pair(
            "http://127.0.0.1:9/regular.ttf",
            "http://127.0.0.1:9/bold.ttf",
        );
        assert!(result.is_err());
    }
}
