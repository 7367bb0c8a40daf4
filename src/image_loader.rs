//! # Image Loading and Geometry
//!
//! Resolves the uploaded preview (data URL, raw base64, file path or bytes),
//! decodes it far enough to know its pixel size, and prepares it for PDF
//! embedding. JPEG passes through untouched (PDF reads DCT natively); PNG
//! and WebP are decoded to RGB with a separate alpha channel for SMask
//! transparency.
//!
//! [`fit_image_size`] computes the box the preview is drawn in.

use std::io::Cursor;
use std::path::Path;

use thiserror::Error;

/// Why an image could not be used.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Failed to read image file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Image data too short")]
    TooShort,
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// The uploaded preview: encoded bytes plus the original file name.
#[derive(Debug, Clone, Default)]
pub struct PreviewImage {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
}

impl PreviewImage {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: None,
        }
    }

    /// Resolve a source string.
    ///
    /// Supported `src` formats:
    /// - `data:image/...;base64,...`
    /// - File path (absolute or `./`, `../` relative), not on wasm
    /// - Raw base64-encoded image data
    pub fn from_source(src: &str) -> Result<Self, DecodeError> {
        let bytes = read_source_bytes(src)?;
        Ok(Self::from_bytes(bytes))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| DecodeError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self {
            bytes,
            file_name: path.file_name().map(|n| n.to_string_lossy().into_owned()),
        })
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

/// A decoded image ready for PDF embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

/// The pixel data in a format the PDF serializer can consume directly.
#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Raw JPEG bytes, embedded with DCTDecode.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// Decoded RGB pixels + optional alpha channel.
    Decoded {
        /// width * height * 3 bytes (RGB)
        rgb: Vec<u8>,
        /// width * height bytes. None if fully opaque.
        alpha: Option<Vec<u8>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

/// Width and height of a fitted image, in page units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageBox {
    pub width: f64,
    pub height: f64,
}

/// The largest box with the image's aspect ratio that fits in
/// `max_width × max_height`.
///
/// When the max box is relatively wider than the image, height binds;
/// otherwise width binds.
pub fn fit_image_size(
    natural_width: f64,
    natural_height: f64,
    max_width: f64,
    max_height: f64,
) -> ImageBox {
    let image_ratio = natural_width / natural_height;
    let box_ratio = max_width / max_height;

    if box_ratio > image_ratio {
        ImageBox {
            width: max_height * image_ratio,
            height: max_height,
        }
    } else {
        ImageBox {
            width: max_width,
            height: max_width / image_ratio,
        }
    }
}

/// Decode a preview for embedding.
pub fn decode(preview: &PreviewImage) -> Result<LoadedImage, DecodeError> {
    decode_image_bytes(&preview.bytes)
}

fn read_source_bytes(src: &str) -> Result<Vec<u8>, DecodeError> {
    if src.starts_with("data:") {
        let comma_pos = src
            .find(',')
            .ok_or_else(|| DecodeError::InvalidDataUrl("missing comma".to_string()))?;
        let header = &src[..comma_pos];
        if !header.ends_with(";base64") {
            return Err(DecodeError::InvalidDataUrl(
                "only base64 data URLs are supported".to_string(),
            ));
        }
        return base64_decode(&src[comma_pos + 1..]);
    }

    // Only explicit path prefixes, base64 strings contain '/' too
    if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
        #[cfg(not(target_arch = "wasm32"))]
        {
            return std::fs::read(src).map_err(|source| DecodeError::Read {
                path: src.to_string(),
                source,
            });
        }
    }

    base64_decode(src)
}

fn base64_decode(input: &str) -> Result<Vec<u8>, DecodeError> {
    use base64::Engine;
    let cleaned: String = input.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(base64::engine::general_purpose::STANDARD.decode(cleaned)?)
}

/// Detect the format from magic bytes and decode accordingly.
fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage, DecodeError> {
    if data.len() < 4 {
        return Err(DecodeError::TooShort);
    }

    if is_jpeg(data) {
        decode_jpeg(data)
    } else {
        decode_raster(data)
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

/// JPEG: read dimensions without decoding pixels.
fn decode_jpeg(data: &[u8]) -> Result<LoadedImage, DecodeError> {
    let reader = image::io::Reader::new(Cursor::new(data)).with_guessed_format()
        .map_err(image::ImageError::IoError)?;
    let (width, height) = reader.into_dimensions()?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space: detect_jpeg_color_space(data),
        },
        width_px: width,
        height_px: height,
    })
}

/// Scan JPEG markers for the SOF segment and read the component count.
fn detect_jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2; // skip SOI
    while i + 1 < data.len() {
        if data[i] != 0xFF {
            break;
        }
        let marker = data[i + 1];
        // SOF markers: C0-C3, C5-C7, C9-CB, CD-CF
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof && i + 9 < data.len() {
            // length(2) + precision(1) + height(2) + width(2) + components(1)
            return if data[i + 9] == 1 {
                JpegColorSpace::DeviceGray
            } else {
                JpegColorSpace::DeviceRGB
            };
        }
        if i + 3 < data.len() {
            let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            i += 2 + seg_len;
        } else {
            break;
        }
    }
    JpegColorSpace::DeviceRGB
}

/// PNG, WebP and anything else the image crate reads: decode to RGBA and
/// split into RGB + alpha.
fn decode_raster(data: &[u8]) -> Result<LoadedImage, DecodeError> {
    let img = image::load_from_memory(data)?;
    let rgba = img.to_rgba8();
    let width = rgba.width();
    let height = rgba.height();

    let pixel_count = (width as usize) * (height as usize);
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    let mut has_transparency = false;

    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel[3]);
        if pixel[3] != 255 {
            has_transparency = true;
        }
    }

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: if has_transparency { Some(alpha) } else { None },
        },
        width_px: width,
        height_px: height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), w, h, image::ColorType::Rgba8)
            .unwrap();
        buf
    }

    fn assert_fits(b: ImageBox, w: f64, h: f64, max_w: f64, max_h: f64) {
        let eps = 1e-9;
        assert!(b.width <= max_w + eps && b.height <= max_h + eps, "{:?}", b);
        assert!((b.width / b.height - w / h).abs() < 1e-9, "ratio drift {:?}", b);
        let hits = (b.width - max_w).abs() < eps || (b.height - max_h).abs() < eps;
        assert!(hits, "neither bound reached: {:?}", b);
    }

    #[test]
    fn fit_portrait_in_landscape_box_is_height_bound() {
        let b = fit_image_size(600.0, 800.0, 100.0, 50.0);
        assert_eq!(b.height, 50.0);
        assert!((b.width - 37.5).abs() < 1e-9);
    }

    #[test]
    fn fit_landscape_in_portrait_box_is_width_bound() {
        let b = fit_image_size(1600.0, 900.0, 51.75, 69.0);
        assert_eq!(b.width, 51.75);
        assert!((b.height - 51.75 * 900.0 / 1600.0).abs() < 1e-9);
    }

    #[test]
    fn fit_equal_ratio_uses_width() {
        let b = fit_image_size(45.0, 60.0, 51.75, 69.0);
        assert_eq!(b.width, 51.75);
        assert!((b.height - 69.0).abs() < 1e-9);
    }

    #[test]
    fn fit_preserves_ratio_and_bounds() {
        let sizes = [
            (1.0, 1.0),
            (4000.0, 3000.0),
            (3000.0, 4000.0),
            (10.0, 1000.0),
            (1000.0, 10.0),
            (333.0, 777.0),
        ];
        let boxes = [(51.75, 69.0), (170.0, 257.0), (10.0, 10.0), (200.0, 5.0)];
        for (w, h) in sizes {
            for (mw, mh) in boxes {
                assert_fits(fit_image_size(w, h, mw, mh), w, h, mw, mh);
            }
        }
    }

    #[test]
    fn invalid_data_url() {
        assert!(matches!(
            PreviewImage::from_source("data:image/png;base64"),
            Err(DecodeError::InvalidDataUrl(_))
        ));
    }

    #[test]
    fn too_short_data() {
        let result = decode(&PreviewImage::from_bytes(vec![0x00, 0x01]));
        assert!(matches!(result, Err(DecodeError::TooShort)));
    }

    #[test]
    fn garbage_data_fails_to_decode() {
        let result = decode(&PreviewImage::from_bytes(vec![0x00, 0x01, 0x02, 0x03, 0x04]));
        assert!(matches!(result, Err(DecodeError::Decode(_))));
    }

    #[test]
    fn decode_opaque_png() {
        let loaded = decode(&PreviewImage::from_bytes(png_bytes(3, 2, [255, 0, 0, 255]))).unwrap();
        assert_eq!((loaded.width_px, loaded.height_px), (3, 2));
        match &loaded.pixel_data {
            ImagePixelData::Decoded { rgb, alpha } => {
                assert_eq!(rgb.len(), 18);
                assert_eq!(&rgb[..3], &[255, 0, 0]);
                assert!(alpha.is_none(), "fully opaque should have no alpha");
            }
            _ => panic!("PNG should decode to Decoded variant"),
        }
    }

    #[test]
    fn decode_png_with_alpha() {
        let loaded = decode(&PreviewImage::from_bytes(png_bytes(1, 1, [0, 0, 255, 128]))).unwrap();
        match &loaded.pixel_data {
            ImagePixelData::Decoded { alpha, .. } => {
                assert_eq!(alpha.as_deref(), Some(&[128u8][..]));
            }
            _ => panic!("PNG should decode to Decoded variant"),
        }
    }

    #[test]
    fn decode_jpeg_passthrough() {
        let img = image::RgbImage::from_fn(4, 2, |_, _| image::Rgb([0, 128, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 4, 2, image::ColorType::Rgb8)
            .unwrap();

        let loaded = decode(&PreviewImage::from_bytes(buf)).unwrap();
        assert_eq!((loaded.width_px, loaded.height_px), (4, 2));
        match &loaded.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                assert!(data.starts_with(&[0xFF, 0xD8]));
                assert_eq!(*color_space, JpegColorSpace::DeviceRGB);
            }
            _ => panic!("JPEG should stay as Jpeg variant"),
        }
    }

    #[test]
    fn data_url_source() {
        use base64::Engine;
        let b64 = base64::engine::general_purpose::STANDARD.encode(png_bytes(2, 2, [0, 255, 0, 255]));
        let preview = PreviewImage::from_source(&format!("data:image/png;base64,{}", b64)).unwrap();
        let loaded = decode(&preview).unwrap();
        assert_eq!(loaded.width_px, 2);
    }

    #[test]
    fn file_source_keeps_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sunset.png");
        std::fs::write(&path, png_bytes(1, 1, [1, 2, 3, 255])).unwrap();
        let preview = PreviewImage::from_path(&path).unwrap();
        assert_eq!(preview.file_name.as_deref(), Some("sunset.png"));
    }
}
