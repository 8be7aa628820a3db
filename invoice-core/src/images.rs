use crate::error::ImageDecodeError;

/// The 8-byte PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Raster formats the canvas can embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

/// PDF color space for image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    DeviceRgb,
    DeviceGray,
}

impl ColorSpace {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceRgb => "DeviceRGB",
            ColorSpace::DeviceGray => "DeviceGray",
        }
    }
}

/// Image data ready for embedding: raw pixels for PNG sources, the
/// untouched byte stream for JPEG sources.
#[derive(Debug)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub color_space: ColorSpace,
    pub bits_per_component: u8,
    pub data: Vec<u8>,
    /// Alpha channel split out for a /SMask, when the source had one.
    pub alpha: Option<Vec<u8>>,
}

/// Classify image bytes by their leading signature. Anything that is
/// not a PNG is treated as JPEG; undecodable JPEG bytes are rejected
/// later by the SOF scan in [`decode_image`].
pub fn detect_format(data: &[u8]) -> ImageFormat {
    if data.starts_with(&PNG_SIGNATURE) {
        ImageFormat::Png
    } else {
        ImageFormat::Jpeg
    }
}

/// Sniff and decode image bytes for embedding.
pub fn decode_image(data: Vec<u8>) -> Result<DecodedImage, ImageDecodeError> {
    match detect_format(&data) {
        ImageFormat::Png => decode_png(data),
        ImageFormat::Jpeg => parse_jpeg(data),
    }
}

/// JPEG bytes embed as-is under DCTDecode; only the dimensions and
/// component count are needed, read from the SOF header.
fn parse_jpeg(data: Vec<u8>) -> Result<DecodedImage, ImageDecodeError> {
    let (width, height, components) = jpeg_dimensions(&data)?;
    let color_space = match components {
        1 => ColorSpace::DeviceGray,
        3 => ColorSpace::DeviceRgb,
        n => {
            return Err(ImageDecodeError(format!(
                "unsupported JPEG component count: {} (expected 1 or 3)",
                n
            )))
        }
    };
    Ok(DecodedImage {
        width,
        height,
        format: ImageFormat::Jpeg,
        color_space,
        bits_per_component: 8,
        data,
        alpha: None,
    })
}

/// Scan for an SOF0..SOF3 marker and read width, height and the
/// component count.
fn jpeg_dimensions(data: &[u8]) -> Result<(u32, u32, u8), ImageDecodeError> {
    let len = data.len();
    let mut i = 0;
    while i + 1 < len {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }
        let marker = data[i + 1];
        if (0xC0..=0xC3).contains(&marker) {
            if i + 9 >= len {
                return Err(ImageDecodeError("JPEG SOF marker truncated".to_string()));
            }
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
            return Ok((width, height, data[i + 9]));
        }
        // Fill bytes and escaped 0xFF data.
        if marker == 0xFF || marker == 0x00 {
            i += 1;
            continue;
        }
        // Standalone markers carry no length field.
        if marker == 0xD8 || marker == 0xD9 || (0xD0..=0xD7).contains(&marker) {
            i += 2;
            continue;
        }
        if i + 3 >= len {
            break;
        }
        let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + seg_len;
    }
    Err(ImageDecodeError(
        "no SOF marker found in JPEG data".to_string(),
    ))
}

/// Decode a PNG to raw pixel data, splitting any alpha channel into a
/// separate grayscale buffer for the SMask.
fn decode_png(data: Vec<u8>) -> Result<DecodedImage, ImageDecodeError> {
    let decoder = png::Decoder::new(data.as_slice());
    let mut reader = decoder
        .read_info()
        .map_err(|e| ImageDecodeError(format!("PNG decode error: {}", e)))?;

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| ImageDecodeError(format!("PNG frame error: {}", e)))?;
    buf.truncate(info.buffer_size());

    let (width, height) = (info.width, info.height);
    let pixels = (width * height) as usize;

    match info.color_type {
        png::ColorType::Rgb => Ok(DecodedImage {
            width,
            height,
            format: ImageFormat::Png,
            color_space: ColorSpace::DeviceRgb,
            bits_per_component: 8,
            data: buf,
            alpha: None,
        }),
        png::ColorType::Rgba => {
            let mut rgb = Vec::with_capacity(pixels * 3);
            let mut alpha = Vec::with_capacity(pixels);
            for px in buf.chunks_exact(4) {
                rgb.extend_from_slice(&px[..3]);
                alpha.push(px[3]);
            }
            Ok(DecodedImage {
                width,
                height,
                format: ImageFormat::Png,
                color_space: ColorSpace::DeviceRgb,
                bits_per_component: 8,
                data: rgb,
                alpha: Some(alpha),
            })
        }
        png::ColorType::Grayscale => Ok(DecodedImage {
            width,
            height,
            format: ImageFormat::Png,
            color_space: ColorSpace::DeviceGray,
            bits_per_component: 8,
            data: buf,
            alpha: None,
        }),
        png::ColorType::GrayscaleAlpha => {
            let mut gray = Vec::with_capacity(pixels);
            let mut alpha = Vec::with_capacity(pixels);
            for px in buf.chunks_exact(2) {
                gray.push(px[0]);
                alpha.push(px[1]);
            }
            Ok(DecodedImage {
                width,
                height,
                format: ImageFormat::Png,
                color_space: ColorSpace::DeviceGray,
                bits_per_component: 8,
                data: gray,
                alpha: Some(alpha),
            })
        }
        other => Err(ImageDecodeError(format!(
            "unsupported PNG color type: {:?}",
            other
        ))),
    }
}
