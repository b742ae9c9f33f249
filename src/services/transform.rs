//! Square thumbnail transform.

use image::DynamicImage;
use image::imageops::FilterType;

/// Antialiased resampling used for every thumbnail.
pub const THUMBNAIL_FILTER: FilterType = FilterType::Lanczos3;

/// Scale `image` so its smaller side equals `size`, then crop the larger side
/// around the center. The result is always exactly `size`×`size`.
pub fn fit_square(image: &DynamicImage, size: u32) -> DynamicImage {
    image.resize_to_fill(size, size, THUMBNAIL_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    const RED: Rgb<u8> = Rgb([255, 0, 0]);
    const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
    const BLUE: Rgb<u8> = Rgb([0, 0, 255]);

    /// Three bands along the long axis: a quarter red, half green, a quarter blue.
    fn banded(width: u32, height: u32) -> DynamicImage {
        let long = width.max(height);
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            let pos = if width >= height { x } else { y };
            if pos < long / 4 {
                RED
            } else if pos < long * 3 / 4 {
                GREEN
            } else {
                BLUE
            }
        }))
    }

    fn assert_close(actual: &Rgb<u8>, expected: Rgb<u8>) {
        for (a, e) in actual.0.iter().zip(expected.0) {
            assert!(
                a.abs_diff(e) <= 2,
                "pixel {:?} differs from {:?}",
                actual,
                expected
            );
        }
    }

    #[test]
    fn output_is_exactly_square() {
        for (w, h) in [(80, 20), (20, 80), (37, 91), (1, 1), (300, 299), (5, 5)] {
            for size in [1, 16, 33, 128] {
                let out = fit_square(&banded(w, h), size);
                assert_eq!(out.dimensions(), (size, size), "source {w}x{h} -> {size}");
            }
        }
    }

    #[test]
    fn wide_image_is_center_cropped() {
        // 80x20 scales to 40x10, the crop keeps source columns 30..50.
        let out = fit_square(&banded(80, 20), 10).to_rgb8();
        for (x, y) in [(0, 0), (9, 0), (0, 9), (9, 9), (5, 5)] {
            assert_close(out.get_pixel(x, y), GREEN);
        }
    }

    #[test]
    fn tall_image_is_center_cropped() {
        let out = fit_square(&banded(20, 80), 10).to_rgb8();
        for (x, y) in [(0, 0), (9, 0), (0, 9), (9, 9)] {
            assert_close(out.get_pixel(x, y), GREEN);
        }
    }

    #[test]
    fn square_image_is_only_scaled() {
        let source = DynamicImage::ImageRgb8(RgbImage::from_fn(40, 40, |x, _| {
            if x < 20 { RED } else { BLUE }
        }));
        let out = fit_square(&source, 20).to_rgb8();
        assert_close(out.get_pixel(0, 10), RED);
        assert_close(out.get_pixel(19, 10), BLUE);
    }
}
