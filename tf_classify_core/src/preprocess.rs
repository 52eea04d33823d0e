use std::path::Path;

use anyhow::{Context, Result};
use candle_core::{Device, Tensor};
use image::RgbImage;
use tracing::debug;

use crate::config::ModelConfig;

/// A decoded image laid out as NHWC `[1, size, size, 3]` f32.
pub struct InputImage {
    tensor: Tensor,
}

impl InputImage {
    pub fn dims(&self) -> &[usize] {
        self.tensor.dims()
    }

    pub fn to_vec(&self) -> Result<Vec<f32>> {
        Ok(self.tensor.flatten_all()?.to_vec1::<f32>()?)
    }
}

pub fn load_image<T: AsRef<Path>>(path: T, config: &ModelConfig) -> Result<InputImage> {
    let path = path.as_ref();
    let img = image::ImageReader::open(path)
        .with_context(|| format!("failed to open image {}", path.display()))?
        .with_guessed_format()?
        .decode()
        .with_context(|| format!("failed to decode image {}", path.display()))?;
    debug!(width = img.width(), height = img.height(), "decoded {}", path.display());
    from_dynamic_image(&img, config)
}

pub fn from_dynamic_image(img: &image::DynamicImage, config: &ModelConfig) -> Result<InputImage> {
    let size = config.image_size;
    let pixels = resize_bilinear(&img.to_rgb8(), size);

    // (pixel - mean) / std
    let scale = 1.0 / config.input_std as f64;
    let shift = -(config.input_mean as f64) * scale;
    let tensor =
        Tensor::from_vec(pixels, (1, size, size, 3), &Device::Cpu)?.affine(scale, shift)?;
    Ok(InputImage { tensor })
}

/// Resizes to `size x size` the way TensorFlow's `ResizeBilinear` does with
/// default attributes: source coordinate `dst * in / out`, four nearest
/// pixels, no antialiasing, f32 output in HWC order.
pub fn resize_bilinear(img: &RgbImage, size: usize) -> Vec<f32> {
    let rows = sample_points(img.height() as usize, size);
    let cols = sample_points(img.width() as usize, size);
    let px = |x: usize, y: usize, c: usize| img.get_pixel(x as u32, y as u32)[c] as f32;

    let mut out = Vec::with_capacity(size * size * 3);
    for &(y0, y1, dy) in &rows {
        for &(x0, x1, dx) in &cols {
            for c in 0..3 {
                let top = px(x0, y0, c) + (px(x1, y0, c) - px(x0, y0, c)) * dx;
                let bottom = px(x0, y1, c) + (px(x1, y1, c) - px(x0, y1, c)) * dx;
                out.push(top + (bottom - top) * dy);
            }
        }
    }
    out
}

/// For each output index: lower and upper source index, and the weight of upper.
fn sample_points(input: usize, output: usize) -> Vec<(usize, usize, f32)> {
    let scale = input as f32 / output as f32;
    (0..output)
        .map(|i| {
            let src = i as f32 * scale;
            let lower = (src.floor() as usize).min(input - 1);
            let upper = (lower + 1).min(input - 1);
            (lower, upper, src - lower as f32)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    fn config(size: usize) -> ModelConfig {
        ModelConfig {
            image_size: size,
            ..ModelConfig::default()
        }
    }

    #[test]
    fn resizes_to_nhwc() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(10, 6));
        let input = from_dynamic_image(&img, &config(4)).unwrap();
        assert_eq!(input.dims(), &[1, 4, 4, 3]);
        assert_eq!(input.to_vec().unwrap().len(), 48);
    }

    #[test]
    fn normalises_pixels() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([0, 128, 255])));
        let data = from_dynamic_image(&img, &config(2)).unwrap().to_vec().unwrap();
        for px in data.chunks(3) {
            assert!((px[0] + 1.0).abs() < 1e-6);
            assert!(px[1].abs() < 1e-6);
            assert!((px[2] - 127.0 / 128.0).abs() < 1e-6);
        }
    }

    #[test]
    fn upscale_interpolates_neighbours() {
        let img = RgbImage::from_fn(2, 2, |x, _| Rgb([(x * 100) as u8, 0, 0]));
        let out = resize_bilinear(&img, 4);
        let first_row: Vec<f32> = out[..12].chunks(3).map(|px| px[0]).collect();
        assert_eq!(first_row, vec![0.0, 50.0, 100.0, 100.0]);
    }

    #[test]
    fn downscale_samples_without_smoothing() {
        let img = RgbImage::from_fn(4, 4, |x, y| Rgb([(x * 10 + y * 40) as u8, 7, 9]));
        let out = resize_bilinear(&img, 2);
        let red: Vec<f32> = out.chunks(3).map(|px| px[0]).collect();
        assert_eq!(red, vec![0.0, 20.0, 80.0, 100.0]);
        assert!(out.chunks(3).all(|px| px[1] == 7.0 && px[2] == 9.0));
    }

    #[test]
    fn decodes_by_content_not_extension() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("photo.jpg");
        RgbImage::from_pixel(3, 3, Rgb([10, 20, 30]))
            .save_with_format(&png, image::ImageFormat::Png)
            .unwrap();
        let input = load_image(&png, &config(3)).unwrap();
        assert_eq!(input.dims(), &[1, 3, 3, 3]);
    }

    #[test]
    fn rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.jpg");
        std::fs::write(&path, b"definitely not an image").unwrap();
        assert!(load_image(&path, &config(3)).is_err());
        assert!(load_image(dir.path().join("missing.jpg"), &config(3)).is_err());
    }
}
