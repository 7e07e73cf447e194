// THEORY:
// The `RegionScanner` is the recognition layer proper. It takes one frame and a
// read-only list of classes, and turns the frame into a coarse map of labels.
//
// Key architectural principles:
// 1.  **Tiling**: The frame is cut into a regular grid of non-overlapping square
//     blocks, starting at (0, 0). Only whole blocks are scanned; the right and
//     bottom margins narrower than one block are left unclassified.
// 2.  **Per-block decision**: For every block, the scanner builds the block's
//     `ColorDistribution` and asks `nearest_class` which class holds the closest
//     exemplar. Each decision depends on that block alone.
// 3.  **Two outputs**: The raw result is a `LabelMap` (one class index per block).
//     Painting that map with the classes' display colors gives the label image,
//     whose uncovered margins stay black.
// 4.  **Purity**: A scan reads the frame and the classes and nothing else. It owns
//     no state between frames, which is what lets `ParallelScanner` split the same
//     work across threads without changing the result.

use crate::core_modules::chunk::chunk::Chunk;
use crate::core_modules::color_class::ColorClass;
use crate::core_modules::distance_search::distance_search::nearest_class;
use crate::core_modules::pixel::pixel::Pixel;
use crate::error::{RecoError, Result};
use image::{Rgb, RgbImage};

/// One class index per whole block of a scanned image, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    /// The width of the grid in blocks (image_width / block_size).
    pub grid_width: u32,
    /// The height of the grid in blocks (image_height / block_size).
    pub grid_height: u32,
    /// The side of a block in pixels.
    pub block_size: u32,
    labels: Vec<usize>,
}

impl LabelMap {
    pub fn new(grid_width: u32, grid_height: u32, block_size: u32, labels: Vec<usize>) -> Self {
        debug_assert_eq!(labels.len(), (grid_width * grid_height) as usize);
        Self {
            grid_width,
            grid_height,
            block_size,
            labels,
        }
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn label_at(&self, grid_x: u32, grid_y: u32) -> Option<usize> {
        if grid_x >= self.grid_width || grid_y >= self.grid_height {
            return None;
        }
        self.labels.get((grid_y * self.grid_width + grid_x) as usize).copied()
    }

    /// The pixel block covered by grid cell `index`, `None` outside the grid.
    pub fn block(&self, index: usize) -> Option<Chunk> {
        if index >= self.labels.len() || self.grid_width == 0 {
            return None;
        }
        let grid_x = index as u32 % self.grid_width;
        let grid_y = index as u32 / self.grid_width;
        Some(Chunk::square(grid_x * self.block_size, grid_y * self.block_size, self.block_size))
    }

    /// Number of blocks assigned to each class index.
    pub fn counts(&self, class_count: usize) -> Vec<usize> {
        let mut counts = vec![0; class_count];
        for &label in &self.labels {
            if let Some(count) = counts.get_mut(label) {
                *count += 1;
            }
        }
        counts
    }

    /// Paints every labeled block with its class's display color on a black
    /// image of the given size.
    pub fn paint(&self, classes: &[ColorClass], image_width: u32, image_height: u32) -> RgbImage {
        let mut painted = RgbImage::new(image_width, image_height);
        for (index, &label) in self.labels.iter().enumerate() {
            let color: Rgb<u8> = classes
                .get(label)
                .map_or(Pixel::BLACK, |class| class.display_color)
                .into();
            let Some(block) = self.block(index) else {
                continue;
            };
            for row in block.y..block.bottom().min(image_height) {
                for col in block.x..block.right().min(image_width) {
                    painted.put_pixel(col, row, color);
                }
            }
        }
        painted
    }
}

/// Sequential block-wise classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionScanner {
    block_size: u32,
}

impl RegionScanner {
    /// Creates a scanner for square blocks of `block_size` pixels.
    pub fn new(block_size: u32) -> Result<Self> {
        if block_size == 0 {
            return Err(RecoError::InvalidBlockSize(block_size));
        }
        Ok(Self { block_size })
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Classifies every whole block of `image` against `classes`.
    pub fn label_map(&self, image: &RgbImage, classes: &[ColorClass]) -> Result<LabelMap> {
        if classes.is_empty() {
            return Err(RecoError::NoClasses);
        }
        let (width, height) = image.dimensions();
        let (grid_width, grid_height) = Chunk::grid_dimensions(width, height, self.block_size);
        log::debug!(
            "scanning {}x{} frame as {}x{} blocks of {}px against {} classes",
            width,
            height,
            grid_width,
            grid_height,
            self.block_size,
            classes.len()
        );

        let labels = classify_rows(image, classes, self.block_size, 0..grid_height)?;
        Ok(LabelMap::new(grid_width, grid_height, self.block_size, labels))
    }

    /// Classifies `image` and paints each block with its class's display color.
    pub fn classify(&self, image: &RgbImage, classes: &[ColorClass]) -> Result<RgbImage> {
        let map = self.label_map(image, classes)?;
        let (width, height) = image.dimensions();
        Ok(map.paint(classes, width, height))
    }
}

/// Labels of the whole blocks in grid rows `rows`, row-major.
///
/// Shared by the sequential and the parallel scanner so both apply exactly the
/// same per-block rule.
pub(crate) fn classify_rows(
    image: &RgbImage,
    classes: &[ColorClass],
    block_size: u32,
    rows: std::ops::Range<u32>,
) -> Result<Vec<usize>> {
    let (width, _) = image.dimensions();
    let grid_width = width / block_size;
    let row_count = rows.end.saturating_sub(rows.start);
    let mut labels = Vec::with_capacity((row_count * grid_width) as usize);

    for grid_y in rows {
        for grid_x in 0..grid_width {
            let block = Chunk::square(grid_x * block_size, grid_y * block_size, block_size);
            let histogram = block.distribution(image)?;
            let (label, _) = nearest_class(&histogram, classes).ok_or(RecoError::NoClasses)?;
            labels.push(label);
        }
    }
    Ok(labels)
}
