//! Image Preprocessing
//!
//! Turns uploaded soil photos into the `[1, 224, 224, 3]` NHWC tensor the
//! soil classifier was trained on. Pixels are only scaled to [0, 1]; there is
//! no mean/std normalization.

use std::io::Cursor;

use image::{imageops, imageops::FilterType, DynamicImage, ImageDecoder, ImageError, ImageReader, Rgb32FImage};
use ndarray::{Array4, ShapeError};

/// Side length the soil classifier expects
pub const SOIL_IMAGE_SIZE: u32 = 224;

/// Decode raw upload bytes into an RGB image
///
/// The format is sniffed from the content, not the file name. An EXIF
/// orientation tag is applied, so rotated phone photos come out upright.
/// The decoder yields RGB channel order directly, so no BGR swap is needed.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_decoder()?;
    let orientation = decoder.orientation()?;

    let mut image = DynamicImage::from_decoder(decoder)?;
    image.apply_orientation(orientation);
    Ok(image)
}

/// Scale every channel of an 8-bit RGB image into [0, 1]
fn scale_to_unit(image: &DynamicImage) -> Rgb32FImage {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    let scaled: Vec<f32> = rgb.into_raw().into_iter().map(|v| v as f32 / 255.0).collect();

    // Buffer length is width * height * 3 by construction
    Rgb32FImage::from_raw(width, height, scaled).unwrap_or_else(|| Rgb32FImage::new(width, height))
}

/// Preprocessor for the soil classifier input
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    /// Target side length
    pub image_size: u32,
    /// Interpolation used for resizing
    pub filter: FilterType,
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self {
            image_size: SOIL_IMAGE_SIZE,
            filter: FilterType::Triangle,
        }
    }
}

impl ImagePreprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure image size
    pub fn with_image_size(mut self, size: u32) -> Self {
        self.image_size = size;
        self
    }

    /// Scale to [0, 1], resize bilinearly, add the batch dimension
    pub fn preprocess(&self, image: &DynamicImage) -> Result<Array4<f32>, ShapeError> {
        let scaled = scale_to_unit(image);
        let resized = imageops::resize(&scaled, self.image_size, self.image_size, self.filter);

        let side = self.image_size as usize;
        // ImageBuffer raw layout is row-major HWC, which is exactly NHWC with N = 1
        Array4::from_shape_vec((1, side, side, 3), resized.into_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid(width: u32, height: u32, pixel: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(pixel)))
    }

    #[test]
    fn test_preprocess_shape() {
        let tensor = ImagePreprocessor::new().preprocess(&solid(640, 480, [10, 20, 30])).unwrap();
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
    }

    #[test]
    fn test_preprocess_scales_without_normalization() {
        let tensor = ImagePreprocessor::new().preprocess(&solid(50, 80, [255, 0, 51])).unwrap();

        for y in [0, 100, 223] {
            for x in [0, 57, 223] {
                assert!((tensor[[0, y, x, 0]] - 1.0).abs() < 1e-5);
                assert!(tensor[[0, y, x, 1]].abs() < 1e-5);
                assert!((tensor[[0, y, x, 2]] - 0.2).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_channel_order_is_rgb() {
        let mut img = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
        for pixel in img.pixels_mut() {
            *pixel = Rgb([200, 100, 0]);
        }
        let tensor = ImagePreprocessor::new()
            .with_image_size(8)
            .preprocess(&DynamicImage::ImageRgb8(img))
            .unwrap();

        assert!(tensor[[0, 3, 3, 0]] > tensor[[0, 3, 3, 1]]);
        assert!(tensor[[0, 3, 3, 1]] > tensor[[0, 3, 3, 2]]);
    }

    #[test]
    fn test_grayscale_expands_to_three_channels() {
        let gray = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(30, 30, image::Luma([128])));
        let tensor = ImagePreprocessor::new().preprocess(&gray).unwrap();
        let expected = 128.0 / 255.0;
        for c in 0..3 {
            assert!((tensor[[0, 10, 10, c]] - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn test_decode_rejects_text() {
        assert!(decode_image(b"this is not an image, just text renamed to .jpg").is_err());
        assert!(decode_image(&[]).is_err());
    }

    /// JPEG with an APP1 Exif segment holding a single Orientation tag
    fn jpeg_with_orientation(width: u32, height: u32, orientation: u8) -> Vec<u8> {
        let mut jpeg = Vec::new();
        solid(width, height, [90, 60, 40])
            .write_to(&mut std::io::Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
            .unwrap();

        let mut app1 = vec![0xFF, 0xE1, 0x00, 0x22];
        app1.extend_from_slice(b"Exif\0\0");
        // Big-endian TIFF header, first IFD at offset 8
        app1.extend_from_slice(&[b'M', b'M', 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08]);
        app1.extend_from_slice(&[0x00, 0x01]);
        // Tag 0x0112 (Orientation), SHORT, count 1
        app1.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01, 0x00, orientation, 0x00, 0x00]);
        app1.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

        // Right after SOI
        jpeg.splice(2..2, app1);
        jpeg
    }

    #[test]
    fn test_decode_applies_exif_orientation() {
        let rotated = decode_image(&jpeg_with_orientation(64, 48, 6)).unwrap();
        assert_eq!((rotated.width(), rotated.height()), (48, 64));

        let upright = decode_image(&jpeg_with_orientation(64, 48, 1)).unwrap();
        assert_eq!((upright.width(), upright.height()), (64, 48));
    }

    #[test]
    fn test_decode_png_roundtrip() {
        let mut bytes = Vec::new();
        solid(12, 9, [1, 2, 3])
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let decoded = decode_image(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (12, 9));
    }
}
