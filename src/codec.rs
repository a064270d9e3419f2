//! PNG decode/encode between files and [`PixelBuffer`]

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat};
use std::fs;
use std::path::Path;
use crate::buffer::PixelBuffer;
use crate::error::{Result, PrismError};

/// Load an image file as RGBA.
///
/// Missing or unreadable paths, non-files, unsupported formats and 16-bit
/// sources are input errors; malformed image data is a decode error. Images
/// without an alpha channel come back fully opaque.
pub fn decode(path: &Path) -> Result<PixelBuffer> {
    let metadata = fs::metadata(path)
        .map_err(|e| PrismError::input(path, format!("cannot access path: {}", e)))?;
    if !metadata.is_file() {
        return Err(PrismError::input(path, "not a regular file"));
    }

    match ImageFormat::from_path(path) {
        Ok(ImageFormat::Png) => {}
        _ => return Err(PrismError::input(path, "not a PNG image")),
    }

    let bytes = fs::read(path)
        .map_err(|e| PrismError::input(path, format!("cannot read file: {}", e)))?;
    decode_with_path(&bytes, path)
}

/// Decode in-memory PNG bytes
pub fn decode_bytes(bytes: &[u8]) -> Result<PixelBuffer> {
    decode_with_path(bytes, Path::new("<memory>"))
}

fn decode_with_path(bytes: &[u8], path: &Path) -> Result<PixelBuffer> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Png).map_err(|e| {
        PrismError::Decode {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    // 8-bit grey/palette/RGB widen to RGBA without touching visible values;
    // wider channels would be narrowed on the way back out
    let color = img.color();
    if color.bytes_per_pixel() > color.channel_count() {
        return Err(PrismError::input(
            path,
            format!("unsupported {:?} pixel format, only 8-bit channels are repaired", color),
        ));
    }
    Ok(PixelBuffer::from_rgba_image(img.to_rgba8()))
}

/// Encode as an 8-bit RGBA PNG. Lossless: every byte of the buffer survives.
pub fn encode(buffer: &PixelBuffer) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(
            buffer.as_bytes(),
            buffer.width(),
            buffer.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(PrismError::Encode)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::tempdir;

    fn checkerboard() -> PixelBuffer {
        let mut img = RgbaImage::new(7, 5);
        for (x, y, px) in img.enumerate_pixels_mut() {
            let alpha = if (x + y) % 2 == 0 { 0 } else { 200 };
            *px = Rgba([x as u8 * 30, y as u8 * 40, 9, alpha]);
        }
        PixelBuffer::from_rgba_image(img)
    }

    #[test]
    fn test_encode_decode_is_lossless() {
        let buffer = checkerboard();
        let bytes = encode(&buffer).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = decode_bytes(&bytes).unwrap();
        assert_eq!(decoded, buffer);
    }

    #[test]
    fn test_rgb_png_gets_opaque_alpha() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rgb.png");
        RgbImage::from_pixel(3, 2, Rgb([1, 2, 3])).save(&path).unwrap();

        let buffer = decode(&path).unwrap();
        assert_eq!(buffer.dimensions(), (3, 2));
        assert_eq!(buffer.transparent_count(), 0);
        assert_eq!(buffer.get(2, 1), Some([1, 2, 3, 255]));
    }

    #[test]
    fn test_corrupt_bytes_are_decode_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"\x89PNG\r\n\x1a\nnot really").unwrap();
        assert!(matches!(decode(&path), Err(PrismError::Decode { .. })));
        assert!(matches!(decode_bytes(b"junk"), Err(PrismError::Decode { .. })));
    }

    #[test]
    fn test_bad_paths_are_input_errors() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            decode(&dir.path().join("missing.png")),
            Err(PrismError::Input { .. })
        ));
        assert!(matches!(decode(dir.path()), Err(PrismError::Input { .. })));

        let text = dir.path().join("notes.txt");
        fs::write(&text, "hello").unwrap();
        assert!(matches!(decode(&text), Err(PrismError::Input { .. })));
    }

    #[test]
    fn test_uppercase_extension_is_accepted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("SHOUT.PNG");
        fs::write(&path, encode(&checkerboard()).unwrap()).unwrap();
        assert_eq!(decode(&path).unwrap(), checkerboard());
    }

    #[test]
    fn test_sixteen_bit_png_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deep.png");
        ImageBuffer::<Rgba<u16>, Vec<u16>>::from_pixel(2, 2, Rgba([1000, 2000, 3000, 0]))
            .save(&path)
            .unwrap();
        let before = fs::read(&path).unwrap();

        assert!(matches!(decode(&path), Err(PrismError::Input { .. })));
        assert!(matches!(decode_bytes(&before), Err(PrismError::Input { .. })));
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_grey_png_widens_to_rgba() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grey.png");
        ImageBuffer::<Luma<u8>, Vec<u8>>::from_pixel(2, 2, Luma([77]))
            .save(&path)
            .unwrap();
        assert_eq!(decode(&path).unwrap().get(1, 1), Some([77, 77, 77, 255]));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_input_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("locked.png");
        fs::write(&path, encode(&checkerboard()).unwrap()).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users read through the mode bits; nothing to check then
        if fs::read(&path).is_ok() {
            return;
        }
        assert!(matches!(decode(&path), Err(PrismError::Input { .. })));
    }
}
