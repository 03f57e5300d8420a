//! Image decoding.

use crate::{RenderError, RenderResult};
use strata_core::Surface;

/// Decode an encoded PNG, JPEG or WebP file into a surface.
///
/// Exposed as a future so hosts can drive it from their own executor and
/// hand the result to `EditorSession::complete_import` with the token they
/// took when the request started.
pub async fn decode_image(bytes: Vec<u8>) -> RenderResult<Surface> {
    let image = image::load_from_memory(&bytes).map_err(|e| RenderError::Decode(e.to_string()))?;
    let rgba = image.to_rgba8();
    log::debug!("Decoded {}x{} image ({} bytes)", rgba.width(), rgba.height(), bytes.len());
    Ok(Surface::from_image(rgba))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode_png(image: &RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        bytes
    }

    #[test]
    fn test_decode_png() {
        let source = RgbaImage::from_fn(4, 3, |x, y| Rgba([x as u8 * 60, y as u8 * 80, 7, 255]));
        let surface = pollster::block_on(decode_image(encode_png(&source))).unwrap();
        assert_eq!((surface.width(), surface.height()), (4, 3));
        assert_eq!(surface.as_image(), &source);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = pollster::block_on(decode_image(b"not an image".to_vec()));
        assert!(matches!(result, Err(RenderError::Decode(_))));
    }

    #[test]
    fn test_decode_error_maps_to_editor_error() {
        let err = pollster::block_on(decode_image(Vec::new())).unwrap_err();
        assert!(matches!(strata_core::EditorError::from(err), strata_core::EditorError::Decode(_)));
    }
}
