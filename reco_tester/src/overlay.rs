// Drawing helpers for the tester: everything here is presentation only and never
// feeds back into recognition.

use chroma_reco::{Chunk, ColorClass, Pixel, RecognitionSession};
use image::{Rgb, RgbImage};

pub const LEGEND_X: u32 = 10;
pub const LEGEND_FIRST_BASELINE: u32 = 30;
pub const LEGEND_ROW_HEIGHT: u32 = 30;
pub const LEGEND_SWATCH_SIZE: u32 = 20;

/// Baseline (bottom edge) of the legend row for class `index`.
pub fn legend_baseline(index: usize) -> u32 {
    LEGEND_FIRST_BASELINE + index as u32 * LEGEND_ROW_HEIGHT
}

/// Builds the displayed frame: the label image blended over a grayscale copy of
/// the frame when recognition produced one, then the selection outline and the
/// legend swatches.
pub fn compose(frame: &RgbImage, painted: Option<&RgbImage>, session: &RecognitionSession) -> RgbImage {
    let mut output = match painted {
        Some(labels) => blend_over_gray(labels, frame, session.config().blend_ratio),
        None => frame.clone(),
    };
    outline(&mut output, session.selection(), Pixel::WHITE);
    draw_legend(&mut output, session.registry().classes());
    output
}

/// `ratio * labels + (1 - ratio) * gray(frame)`, pixel by pixel.
pub fn blend_over_gray(labels: &RgbImage, frame: &RgbImage, ratio: f32) -> RgbImage {
    let (width, height) = frame.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let gray = Pixel::from(frame.get_pixel(x, y)).to_gray();
        let label = labels
            .get_pixel_checked(x, y)
            .map_or(Pixel::BLACK, Pixel::from);
        label.blend(&gray, ratio).into()
    })
}

/// Draws a 1-pixel rectangle outline, clipped to the image.
pub fn outline(image: &mut RgbImage, chunk: Chunk, color: Pixel) {
    if chunk.width == 0 || chunk.height == 0 {
        return;
    }
    let rgb: Rgb<u8> = color.into();
    let (width, height) = image.dimensions();
    let last_col = chunk.right() - 1;
    let last_row = chunk.bottom() - 1;
    let mut put = |x: u32, y: u32| {
        if x < width && y < height {
            image.put_pixel(x, y, rgb);
        }
    };
    for x in chunk.x..=last_col {
        put(x, chunk.y);
        put(x, last_row);
    }
    for y in chunk.y..=last_row {
        put(chunk.x, y);
        put(last_col, y);
    }
}

/// Fills a rectangle, clipped to the image.
pub fn fill_clipped(image: &mut RgbImage, chunk: Chunk, color: Pixel) {
    let rgb: Rgb<u8> = color.into();
    let (width, height) = image.dimensions();
    for y in chunk.y..chunk.bottom().min(height) {
        for x in chunk.x..chunk.right().min(width) {
            image.put_pixel(x, y, rgb);
        }
    }
}

/// One swatch per class, stacked down the left edge.
pub fn draw_legend(image: &mut RgbImage, classes: &[ColorClass]) {
    for (index, class) in classes.iter().enumerate() {
        let baseline = legend_baseline(index);
        let swatch = Chunk::square(LEGEND_X, baseline - LEGEND_SWATCH_SIZE, LEGEND_SWATCH_SIZE);
        fill_clipped(image, swatch, class.display_color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chroma_reco::RecoConfig;

    #[test]
    fn gray_blend_mixes_half_and_half() {
        let labels = RgbImage::from_pixel(2, 2, Rgb([200, 0, 0]));
        let frame = RgbImage::from_pixel(2, 2, Rgb([100, 100, 100]));
        let blended = blend_over_gray(&labels, &frame, 0.5);
        assert_eq!(*blended.get_pixel(1, 1), Rgb([150, 50, 50]));
    }

    #[test]
    fn outline_leaves_the_inside_untouched() {
        let mut image = RgbImage::new(10, 10);
        outline(&mut image, Chunk::square(2, 2, 5), Pixel::WHITE);
        assert_eq!(*image.get_pixel(2, 2), Rgb([255, 255, 255]));
        assert_eq!(*image.get_pixel(6, 6), Rgb([255, 255, 255]));
        assert_eq!(*image.get_pixel(4, 4), Rgb([0, 0, 0]));
        assert_eq!(*image.get_pixel(7, 7), Rgb([0, 0, 0]));
    }

    #[test]
    fn compose_draws_background_swatch_and_selection() {
        let session = RecognitionSession::new(RecoConfig {
            worker_count: 1,
            ..RecoConfig::for_frame(100, 100)
        })
        .unwrap();
        let frame = RgbImage::from_pixel(100, 100, Rgb([90, 90, 90]));
        let output = compose(&frame, None, &session);
        // Background swatch is black.
        assert_eq!(*output.get_pixel(15, 15), Rgb([0, 0, 0]));
        // Selection outline at the frame center.
        assert_eq!(*output.get_pixel(25, 25), Rgb([255, 255, 255]));
        assert_eq!(*output.get_pixel(50, 50), Rgb([90, 90, 90]));
    }
}
