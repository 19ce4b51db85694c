//! Merged-overlay composition for visualization.
//!
//! Overlays a segmentation mask onto its source image by per-channel
//! saturating addition, which brightens masked regions instead of
//! occluding the pixels underneath. An optional Gaussian blur softens
//! the source first so the highlight reads clearly on busy textures.

use image::{GrayImage, Luma, Rgba, RgbaImage};

/// Overlay `mask` onto `image` by saturating per-channel addition.
///
/// The single-channel mask value is added to each of R, G, and B;
/// alpha is left untouched. A `blur_sigma` of `Some(s)` with `s > 0`
/// Gaussian-blurs the source before the overlay.
///
/// Both inputs must share dimensions; the runner guarantees this since
/// the reconciled mask is produced at source resolution.
#[must_use = "returns the merged visualization image"]
pub fn merge_overlay(image: &RgbaImage, mask: &GrayImage, blur_sigma: Option<f32>) -> RgbaImage {
    debug_assert_eq!(image.dimensions(), mask.dimensions());

    let base = match blur_sigma {
        Some(sigma) if sigma > 0.0 => blur_rgba(image, sigma),
        _ => image.clone(),
    };

    RgbaImage::from_fn(base.width(), base.height(), |x, y| {
        let Rgba([r, g, b, a]) = *base.get_pixel(x, y);
        let m = mask.get_pixel(x, y).0[0];
        Rgba([
            r.saturating_add(m),
            g.saturating_add(m),
            b.saturating_add(m),
            a,
        ])
    })
}

/// Gaussian blur applied independently to each R/G/B/A channel.
///
/// `imageproc::filter::gaussian_blur_f32` only accepts single-channel
/// images, so the color image is split, blurred per channel, and
/// reassembled. Gaussian blur is linear and per-channel, so this equals
/// blurring in color space.
fn blur_rgba(image: &RgbaImage, sigma: f32) -> RgbaImage {
    let (width, height) = image.dimensions();

    let channel = |index: usize| {
        GrayImage::from_fn(width, height, |x, y| Luma([image.get_pixel(x, y).0[index]]))
    };
    let blurred: Vec<GrayImage> = (0..4)
        .map(|i| imageproc::filter::gaussian_blur_f32(&channel(i), sigma))
        .collect();

    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            blurred[0].get_pixel(x, y).0[0],
            blurred[1].get_pixel(x, y).0[0],
            blurred[2].get_pixel(x, y).0[0],
            blurred[3].get_pixel(x, y).0[0],
        ])
    })
}
