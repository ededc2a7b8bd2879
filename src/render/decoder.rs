//! Frame decoders
//!
//! Decoding runs on the blocking thread pool, so implementations are plain
//! synchronous functions from payload bytes to displayable content.

use base64::Engine;
use bytes::Bytes;

use super::resource::ResourceContent;
use crate::error::DecodeError;

const JPEG_SIGNATURE: [u8; 3] = [0xFF, 0xD8, 0xFF];
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Turns one frame payload into displayable content
pub trait FrameDecoder: Send + Sync + 'static {
    /// Decode a non-empty frame payload
    fn decode(&self, frame: &[u8]) -> Result<ResourceContent, DecodeError>;
}

/// Encodes frames as `data:` URLs without inspecting the pixels.
///
/// This is what a browser `<img>` consumes directly; the image itself is
/// decoded by whoever displays the URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlDecoder;

impl DataUrlDecoder {
    /// Guess the MIME type from the payload signature.
    ///
    /// Streams are JPEG unless proven otherwise.
    pub fn sniff_mime(frame: &[u8]) -> &'static str {
        if frame.starts_with(&PNG_SIGNATURE) {
            "image/png"
        } else {
            "image/jpeg"
        }
    }
}

impl FrameDecoder for DataUrlDecoder {
    fn decode(&self, frame: &[u8]) -> Result<ResourceContent, DecodeError> {
        let mime = Self::sniff_mime(frame);
        let encoded = base64::engine::general_purpose::STANDARD.encode(frame);
        Ok(ResourceContent::DataUrl(format!(
            "data:{};base64,{}",
            mime, encoded
        )))
    }
}

/// Fully decodes frames to RGBA pixels.
///
/// Corrupt payloads are reported as errors instead of reaching the display.
#[derive(Debug, Clone, Copy, Default)]
pub struct PixelDecoder;

impl PixelDecoder {
    /// Check whether a payload starts like an image we can decode
    pub fn looks_like_image(frame: &[u8]) -> bool {
        frame.starts_with(&JPEG_SIGNATURE) || frame.starts_with(&PNG_SIGNATURE)
    }
}

impl FrameDecoder for PixelDecoder {
    fn decode(&self, frame: &[u8]) -> Result<ResourceContent, DecodeError> {
        if !Self::looks_like_image(frame) {
            return Err(DecodeError::InvalidImage(
                "unrecognized image signature".to_string(),
            ));
        }

        let image = image::load_from_memory(frame)
            .map_err(|e| DecodeError::InvalidImage(e.to_string()))?
            .into_rgba8();

        let (width, height) = image.dimensions();
        Ok(ResourceContent::Pixels {
            width,
            height,
            rgba: Bytes::from(image.into_raw()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgba, RgbaImage};

    use super::*;

    fn encode(format: ImageFormat) -> Vec<u8> {
        let img = RgbaImage::from_pixel(4, 3, Rgba([200, 10, 10, 255]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .to_rgb8()
            .write_to(&mut out, format)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_data_url_jpeg_default() {
        let content = DataUrlDecoder.decode(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
        assert_eq!(content, ResourceContent::DataUrl("data:image/jpeg;base64,/9j/4A==".into()));

        // Unknown signatures are still labelled as JPEG
        assert_eq!(DataUrlDecoder::sniff_mime(b"????"), "image/jpeg");
    }

    #[test]
    fn test_data_url_png_sniffed() {
        let png = encode(ImageFormat::Png);
        match DataUrlDecoder.decode(&png).unwrap() {
            ResourceContent::DataUrl(url) => assert!(url.starts_with("data:image/png;base64,")),
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn test_pixel_decoder_png_and_jpeg() {
        for format in [ImageFormat::Png, ImageFormat::Jpeg] {
            let bytes = encode(format);
            assert!(PixelDecoder::looks_like_image(&bytes));

            match PixelDecoder.decode(&bytes).unwrap() {
                ResourceContent::Pixels {
                    width,
                    height,
                    rgba,
                } => {
                    assert_eq!((width, height), (4, 3));
                    assert_eq!(rgba.len(), 4 * 3 * 4);
                }
                other => panic!("unexpected content: {:?}", other),
            }
        }
    }

    #[test]
    fn test_pixel_decoder_rejects_garbage() {
        let err = PixelDecoder.decode(&[0x01, 0x02, 0x03]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidImage("unrecognized image signature".into())
        );

        // Truncated JPEG
        let mut jpeg = encode(ImageFormat::Jpeg);
        jpeg.truncate(20);
        assert!(PixelDecoder.decode(&jpeg).is_err());
    }
}
