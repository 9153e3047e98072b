use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::otsu_level;
use imageproc::filter::gaussian_blur_f32;

use crate::ocr::Thresholding;

const SHARPEN_SIGMA: f32 = 10.0;
// OpenCV's sigma for a 5x5 kernel when sigma is left at 0.
const OTSU_BLUR_SIGMA: f32 = 1.1;
// OpenCV's sigma for the 21x21 adaptive Gaussian window.
const ADAPTIVE_SIGMA: f32 = 3.5;
const ADAPTIVE_OFFSET: f32 = -5.0;

/// One binarized candidate of the source image.
pub struct Variant {
    pub name: &'static str,
    pub image: DynamicImage,
}

/// Flattens alpha onto white and converts to 8-bit luma.
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut luma = GrayImage::new(width, height);

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as f32 / 255.0;
        let r = r as f32 * alpha + 255.0 * (1.0 - alpha);
        let g = g as f32 * alpha + 255.0 * (1.0 - alpha);
        let b = b as f32 * alpha + 255.0 * (1.0 - alpha);
        let value = (0.299 * r + 0.587 * g + 0.114 * b).round().clamp(0.0, 255.0) as u8;
        luma.put_pixel(x, y, Luma([value]));
    }
    luma
}

/// Unsharp mask: `1.5 * gray - 0.5 * blur(gray, 10)`.
pub fn sharpen(gray: &GrayImage) -> GrayImage {
    let blurred = gaussian_blur_f32(gray, SHARPEN_SIGMA);
    let mut output = gray.clone();
    for (out, soft) in output.pixels_mut().zip(blurred.pixels()) {
        let value = 1.5 * out[0] as f32 - 0.5 * soft[0] as f32;
        out[0] = value.round().clamp(0.0, 255.0) as u8;
    }
    output
}

pub fn otsu(gray: &GrayImage) -> GrayImage {
    binarize(gray, otsu_level(gray))
}

pub fn otsu_gaussian(gray: &GrayImage) -> GrayImage {
    otsu(&gaussian_blur_f32(gray, OTSU_BLUR_SIGMA))
}

/// White where the pixel is brighter than its Gaussian-weighted
/// neighbourhood mean minus the offset.
pub fn adaptive_gaussian(gray: &GrayImage) -> GrayImage {
    let local_mean = gaussian_blur_f32(gray, ADAPTIVE_SIGMA);
    let mut output = gray.clone();
    for (out, mean) in output.pixels_mut().zip(local_mean.pixels()) {
        let threshold = mean[0] as f32 - ADAPTIVE_OFFSET;
        out[0] = if out[0] as f32 > threshold { 255 } else { 0 };
    }
    output
}

/// Candidates for one strategy, unsharpened first.
pub fn variants(gray: &GrayImage, thresholding: Thresholding) -> Vec<Variant> {
    let sharp = sharpen(gray);
    let mut out = Vec::new();
    let wanted: &[Thresholding] = match thresholding {
        Thresholding::All => &[
            Thresholding::Otsu,
            Thresholding::OtsuGaussian,
            Thresholding::AdaptiveGaussian,
        ],
        Thresholding::Otsu => &[Thresholding::Otsu],
        Thresholding::OtsuGaussian => &[Thresholding::OtsuGaussian],
        Thresholding::AdaptiveGaussian => &[Thresholding::AdaptiveGaussian],
    };
    for strategy in wanted {
        let (plain_name, sharp_name) = match strategy {
            Thresholding::Otsu => ("otsu", "otsu_sharp"),
            Thresholding::OtsuGaussian => ("otsu_gaussian", "otsu_gaussian_sharp"),
            Thresholding::AdaptiveGaussian => ("adaptive_gaussian", "adaptive_gaussian_sharp"),
            Thresholding::All => continue,
        };
        let apply: fn(&GrayImage) -> GrayImage = match strategy {
            Thresholding::OtsuGaussian => otsu_gaussian,
            Thresholding::AdaptiveGaussian => adaptive_gaussian,
            _ => otsu,
        };
        out.push(Variant {
            name: plain_name,
            image: DynamicImage::ImageLuma8(apply(gray)),
        });
        out.push(Variant {
            name: sharp_name,
            image: DynamicImage::ImageLuma8(apply(&sharp)),
        });
    }
    out
}

fn binarize(image: &GrayImage, threshold: u8) -> GrayImage {
    let mut output = image.clone();
    for pixel in output.pixels_mut() {
        pixel[0] = if pixel[0] > threshold { 255 } else { 0 };
    }
    output
}
