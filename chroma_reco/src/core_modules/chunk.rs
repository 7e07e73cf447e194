// THEORY:
// The `Chunk` module represents a rectangular region of an image. It is the bridge
// between raw image buffers and the histogram-based analysis: every histogram in
// the system (a scanned block, a background tile, the user's selection, each half
// of the frame) is computed over exactly one `Chunk`.
//
// Key architectural principles:
// 1.  **View, not copy**: A `Chunk` only stores its placement (x, y, width, height).
//     Pixels are read straight out of the source image when a distribution is
//     requested, so tiling a frame allocates nothing per block.
// 2.  **Explicit bounds**: Reading a chunk that does not fit its image is a caller
//     error and is reported as such. The chunk never clamps itself.
// 3.  **Regular tiling**: `Chunk::grid` enumerates the non-overlapping square blocks
//     of an image in row-major order, stopping before any block that would cross
//     the right or bottom edge. Trailing margins narrower than one block are simply
//     not covered.

pub mod chunk {
    use crate::core_modules::color_distribution::ColorDistribution;
    use crate::core_modules::pixel::pixel::Pixel;
    use crate::error::{RecoError, Result};
    use image::{Rgb, RgbImage};

    /// A rectangular block of pixels, addressed by its top-left corner.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Chunk {
        /// Column of the top-left pixel.
        pub x: u32,
        /// Row of the top-left pixel.
        pub y: u32,
        /// The width of the chunk in pixels.
        pub width: u32,
        /// The height of the chunk in pixels.
        pub height: u32,
    }

    impl Chunk {
        pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
            Self {
                x,
                y,
                width,
                height,
            }
        }

        /// A square chunk of side `size` at (x, y).
        pub fn square(x: u32, y: u32, size: u32) -> Self {
            Self::new(x, y, size, size)
        }

        /// The square of side `size` centered in an image of the given dimensions.
        pub fn centered(image_width: u32, image_height: u32, size: u32) -> Self {
            let x = (image_width / 2).saturating_sub(size / 2);
            let y = (image_height / 2).saturating_sub(size / 2);
            Self::square(x, y, size)
        }

        /// Exclusive right edge.
        pub fn right(&self) -> u32 {
            self.x + self.width
        }

        /// Exclusive bottom edge.
        pub fn bottom(&self) -> u32 {
            self.y + self.height
        }

        /// Whether the chunk lies entirely inside an image of the given size.
        pub fn fits(&self, image_width: u32, image_height: u32) -> bool {
            self.x
                .checked_add(self.width)
                .is_some_and(|right| right <= image_width)
                && self
                    .y
                    .checked_add(self.height)
                    .is_some_and(|bottom| bottom <= image_height)
        }

        fn check_bounds(&self, image: &RgbImage) -> Result<()> {
            let (image_width, image_height) = image.dimensions();
            if self.fits(image_width, image_height) {
                Ok(())
            } else {
                Err(RecoError::RegionOutOfBounds {
                    x: self.x,
                    y: self.y,
                    width: self.width,
                    height: self.height,
                    image_width,
                    image_height,
                })
            }
        }

        /// Iterates over the chunk's pixels in row-major order.
        pub fn pixels(self, image: &RgbImage) -> Result<impl Iterator<Item = Pixel> + '_> {
            self.check_bounds(image)?;
            let Chunk {
                x,
                y,
                width,
                height,
            } = self;
            Ok((y..y + height)
                .flat_map(move |row| (x..x + width).map(move |col| (col, row)))
                .map(move |(col, row)| Pixel::from(image.get_pixel(col, row))))
        }

        /// The finished color distribution of this chunk's pixels.
        pub fn distribution(&self, image: &RgbImage) -> Result<ColorDistribution> {
            Ok(ColorDistribution::from_pixels(self.pixels(image)?))
        }

        /// Paints every pixel of the chunk with a solid color.
        pub fn fill(&self, image: &mut RgbImage, color: Pixel) -> Result<()> {
            self.check_bounds(image)?;
            let rgb: Rgb<u8> = color.into();
            for row in self.y..self.bottom() {
                for col in self.x..self.right() {
                    image.put_pixel(col, row, rgb);
                }
            }
            Ok(())
        }

        /// Number of whole blocks of side `block_size` along each axis.
        pub fn grid_dimensions(image_width: u32, image_height: u32, block_size: u32) -> (u32, u32) {
            if block_size == 0 {
                return (0, 0);
            }
            (image_width / block_size, image_height / block_size)
        }

        /// All whole square blocks of an image, row by row.
        pub fn grid(
            image_width: u32,
            image_height: u32,
            block_size: u32,
        ) -> impl Iterator<Item = Chunk> {
            let (grid_width, grid_height) =
                Self::grid_dimensions(image_width, image_height, block_size);
            (0..grid_height).flat_map(move |grid_y| {
                (0..grid_width)
                    .map(move |grid_x| Chunk::square(grid_x * block_size, grid_y * block_size, block_size))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::chunk::*;
    use crate::core_modules::pixel::pixel::Pixel;
    use crate::error::RecoError;
    use image::{Rgb, RgbImage};

    #[test]
    fn grid_skips_trailing_partial_blocks() {
        let blocks: Vec<Chunk> = Chunk::grid(20, 17, 8).collect();
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0], Chunk::square(0, 0, 8));
        assert_eq!(blocks[1], Chunk::square(8, 0, 8));
        assert_eq!(blocks[2], Chunk::square(0, 8, 8));
        assert!(blocks.iter().all(|b| b.fits(20, 17)));
    }

    #[test]
    fn grid_of_zero_block_size_is_empty() {
        assert_eq!(Chunk::grid(64, 64, 0).count(), 0);
    }

    #[test]
    fn centered_selection_matches_frame_center() {
        let selection = Chunk::centered(640, 480, 50);
        assert_eq!(selection, Chunk::square(295, 215, 50));
        assert!(selection.fits(640, 480));
    }

    #[test]
    fn distribution_counts_every_pixel_once() {
        let image = RgbImage::from_fn(10, 10, |x, _| if x < 5 { Rgb([255, 0, 0]) } else { Rgb([0, 0, 255]) });
        let distribution = Chunk::new(3, 2, 4, 5).distribution(&image).unwrap();
        assert_eq!(distribution.sample_count(), 20);
        assert_eq!(distribution.cell(7, 0, 0), 0.5);
        assert_eq!(distribution.cell(0, 0, 7), 0.5);
    }

    #[test]
    fn out_of_bounds_chunk_is_rejected() {
        let image = RgbImage::new(16, 16);
        let err = Chunk::square(10, 10, 8).distribution(&image).unwrap_err();
        assert!(matches!(err, RecoError::RegionOutOfBounds { x: 10, y: 10, .. }));
    }

    #[test]
    fn fill_paints_only_the_chunk() {
        let mut image = RgbImage::new(4, 4);
        Chunk::square(2, 2, 2).fill(&mut image, Pixel::WHITE).unwrap();
        assert_eq!(*image.get_pixel(3, 3), Rgb([255, 255, 255]));
        assert_eq!(*image.get_pixel(1, 1), Rgb([0, 0, 0]));
    }
}
