//! Image preprocessing for CLIP visual encoding.
//!
//! CLIP ViT-B/32 expects:
//! - Input size: 224×224 pixels
//! - Normalization: per-channel `(pixel/255 - mean) / std` with the
//!   OpenAI CLIP statistics
//! - Channel order: RGB
//! - Tensor layout: NCHW [batch, channels, height, width]

use ndarray::Array4;

use crate::types::PixelBuffer;

/// Number of color channels (RGB).
const CHANNELS: usize = 3;

/// OpenAI CLIP per-channel normalization mean.
const NORM_MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];

/// OpenAI CLIP per-channel normalization std.
const NORM_STD: [f32; 3] = [0.268_629_54, 0.261_302_58, 0.275_777_11];

/// Preprocess a canonical pixel buffer for CLIP inference.
///
/// Resizes to `image_size × image_size`, normalizes per channel, and
/// returns an NCHW tensor suitable for ONNX Runtime.
pub fn preprocess(pixels: &PixelBuffer, image_size: u32) -> Array4<f32> {
    let resized = image::imageops::resize(
        pixels.as_rgb8(),
        image_size,
        image_size,
        image::imageops::FilterType::CatmullRom,
    );

    let size = image_size as usize;
    let mut tensor = Array4::<f32>::zeros((1, CHANNELS, size, size));

    // Walk the raw RGB bytes directly instead of per-pixel get_pixel()
    // and 4D ndarray indexing.
    let raw = resized.as_raw();
    let tensor_data = tensor.as_slice_mut().unwrap();
    for (i, pixel) in raw.chunks_exact(3).enumerate() {
        let y = i / size;
        let x = i % size;
        for (c, &val) in pixel.iter().enumerate() {
            // NCHW layout: offset = c * size * size + y * size + x
            let idx = c * size * size + y * size + x;
            tensor_data[idx] = (val as f32 / 255.0 - NORM_MEAN[c]) / NORM_STD[c];
        }
    }

    tensor
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_preprocess_shape() {
        let pixels = PixelBuffer::from_rgb8(RgbImage::new(640, 480));
        let tensor = preprocess(&pixels, 224);
        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);
    }

    #[test]
    fn test_preprocess_normalization() {
        // White pixels land at (1.0 - mean) / std per channel.
        let pixels = PixelBuffer::from_rgb8(RgbImage::from_pixel(10, 10, Rgb([255, 255, 255])));
        let tensor = preprocess(&pixels, 32);
        for c in 0..3 {
            let expected = (1.0 - NORM_MEAN[c]) / NORM_STD[c];
            let got = tensor[[0, c, 0, 0]];
            assert!((got - expected).abs() < 1e-4, "channel {c}: {got} vs {expected}");
        }

        // Black pixels land at (0.0 - mean) / std, which is negative.
        let pixels = PixelBuffer::from_rgb8(RgbImage::from_pixel(10, 10, Rgb([0, 0, 0])));
        let tensor = preprocess(&pixels, 32);
        assert!(tensor.iter().all(|v| *v < 0.0));
    }
}
