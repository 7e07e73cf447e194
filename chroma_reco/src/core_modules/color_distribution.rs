// THEORY:
// A `ColorDistribution` is the appearance signature of an image region: a coarse
// 3D color histogram with 8 bins per channel (512 cells). It is the unit that
// everything else in the engine compares. A class is nothing more than a list of
// these, and a block is classified by the class holding the closest one.
//
// Lifecycle:
// 1.  **Accumulate**: `add` is called once per pixel of the region. Cells hold raw
//     counts and `sample_count` equals their sum.
// 2.  **Finish**: `finished` turns counts into a probability mass function by
//     dividing by the sample count. It runs once; later calls are no-ops so a
//     normalized histogram is never re-divided by its stale count. An empty
//     histogram stays all-zero, which is a valid (if uninformative) distribution.
// 3.  **Compare**: once finished, the value is treated as immutable and is only
//     read by `distance` and `average_color`.
//
// The distance is a chi-square-family statistic, Σ (a-b)² / (a+b+ε). The epsilon
// only keeps empty-vs-empty cells from dividing by zero; it contributes nothing
// when the two cells agree. The statistic is symmetric and zero for identical
// histograms, but it is not a metric (no triangle inequality).

use crate::core_modules::pixel::pixel::{BINS_PER_CHANNEL, BIN_WIDTH, Pixel};

pub type Cell = f32;
pub type Distance = f32;

const DISTANCE_EPSILON: Cell = 1e-10;
/// Offset to the middle of a bin when mapping a bin back to a channel value.
const BIN_CENTER_OFFSET: Cell = (BIN_WIDTH / 2) as Cell;

type Cells = [[[Cell; BINS_PER_CHANNEL]; BINS_PER_CHANNEL]; BINS_PER_CHANNEL];

/// A fixed-resolution RGB histogram over a pixel region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorDistribution {
    /// Cells indexed by `[red_bin][green_bin][blue_bin]`.
    data: Cells,
    /// Number of pixels accumulated since the last reset.
    sample_count: u32,
    /// Whether `finished` has normalized the cells.
    finished: bool,
}

impl Default for ColorDistribution {
    fn default() -> Self {
        Self {
            data: [[[0.0; BINS_PER_CHANNEL]; BINS_PER_CHANNEL]; BINS_PER_CHANNEL],
            sample_count: 0,
            finished: false,
        }
    }
}

impl ColorDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds and finalizes a distribution from a stream of pixels.
    pub fn from_pixels<I>(pixels: I) -> Self
    where
        I: IntoIterator<Item = Pixel>,
    {
        let mut distribution = Self::new();
        for pixel in pixels {
            distribution.add(pixel);
        }
        distribution.finished();
        distribution
    }

    /// Clears every cell and the sample count, making the histogram reusable.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Counts one pixel in the cell of its (red, green, blue) bins.
    pub fn add(&mut self, color: Pixel) {
        debug_assert!(!self.finished, "add() called on a finished distribution");
        let (r, g, b) = color.bins();
        self.data[r][g][b] += 1.0;
        self.sample_count += 1;
    }

    /// Normalizes the counts into a probability distribution.
    pub fn finished(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        if self.sample_count == 0 {
            return;
        }
        let count = self.sample_count as Cell;
        for plane in self.data.iter_mut() {
            for row in plane.iter_mut() {
                for cell in row.iter_mut() {
                    *cell /= count;
                }
            }
        }
    }

    /// Chi-square-like dissimilarity between two finished distributions.
    pub fn distance(&self, other: &ColorDistribution) -> Distance {
        self.cells()
            .zip(other.cells())
            .map(|(a, b)| {
                let diff = a - b;
                (diff * diff) / (a + b + DISTANCE_EPSILON)
            })
            .sum()
    }

    /// A representative display color: the weighted centroid of the occupied bins.
    ///
    /// Each occupied cell contributes `bin * 32 * value + 16` per channel, and the
    /// channel sums are divided by the total occupied mass. An empty distribution
    /// yields black.
    pub fn average_color(&self) -> Pixel {
        let mut red_sum: Cell = 0.0;
        let mut green_sum: Cell = 0.0;
        let mut blue_sum: Cell = 0.0;
        let mut total: Cell = 0.0;

        for (r, plane) in self.data.iter().enumerate() {
            for (g, row) in plane.iter().enumerate() {
                for (b, &value) in row.iter().enumerate() {
                    if value > 0.0 {
                        red_sum += Self::bin_contribution(r, value);
                        green_sum += Self::bin_contribution(g, value);
                        blue_sum += Self::bin_contribution(b, value);
                        total += value;
                    }
                }
            }
        }

        if total == 0.0 {
            return Pixel::BLACK;
        }

        let to_channel = |sum: Cell| (sum / total).clamp(0.0, 255.0) as u8;
        Pixel::new(to_channel(red_sum), to_channel(green_sum), to_channel(blue_sum))
    }

    #[inline]
    fn bin_contribution(bin: usize, value: Cell) -> Cell {
        bin as Cell * BIN_WIDTH as Cell * value + BIN_CENTER_OFFSET
    }

    /// Value of a single cell, by bin indices.
    pub fn cell(&self, red_bin: usize, green_bin: usize, blue_bin: usize) -> Cell {
        self.data[red_bin][green_bin][blue_bin]
    }

    /// All 512 cells in `[red][green][blue]` order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.data.iter().flatten().flatten().copied()
    }

    /// Sum of all cells: the sample count before `finished`, 1.0 (or 0.0) after.
    pub fn total(&self) -> Cell {
        self.cells().sum()
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-5;

    fn uniform(color: Pixel, count: usize) -> ColorDistribution {
        ColorDistribution::from_pixels(std::iter::repeat_n(color, count))
    }

    fn nonzero_cells(distribution: &ColorDistribution) -> usize {
        distribution.cells().filter(|&c| c != 0.0).count()
    }

    #[test]
    fn add_increments_one_cell_and_the_count() {
        let mut distribution = ColorDistribution::new();
        distribution.add(Pixel::new(40, 100, 250));
        assert_eq!(distribution.sample_count(), 1);
        assert_eq!(nonzero_cells(&distribution), 1);
        assert_eq!(distribution.cell(1, 3, 7), 1.0);

        distribution.add(Pixel::new(63, 127, 224));
        assert_eq!(distribution.sample_count(), 2);
        assert_eq!(nonzero_cells(&distribution), 1);
        assert_eq!(distribution.cell(1, 3, 7), 2.0);
    }

    #[test]
    fn raw_cells_sum_to_the_sample_count() {
        let mut distribution = ColorDistribution::new();
        for i in 0..=255u8 {
            distribution.add(Pixel::new(i, i.wrapping_mul(7), 255 - i));
        }
        assert_eq!(distribution.sample_count(), 256);
        assert_eq!(distribution.total(), 256.0);
    }

    #[test]
    fn finished_normalizes_to_one() {
        let mut distribution = ColorDistribution::new();
        for i in 0..1000u32 {
            distribution.add(Pixel::new((i % 256) as u8, (i * 3 % 256) as u8, (i * 11 % 256) as u8));
        }
        distribution.finished();
        assert!((distribution.total() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn finished_on_empty_stays_zero() {
        let mut distribution = ColorDistribution::new();
        distribution.finished();
        assert!(distribution.is_finished());
        assert_eq!(distribution.total(), 0.0);
        assert_eq!(nonzero_cells(&distribution), 0);
    }

    #[test]
    fn finished_twice_does_not_renormalize() {
        let mut distribution = ColorDistribution::new();
        distribution.add(Pixel::new(255, 0, 0));
        distribution.add(Pixel::new(0, 0, 255));
        distribution.add(Pixel::new(0, 0, 255));
        distribution.finished();
        let once = distribution;
        distribution.finished();
        assert_eq!(distribution, once);
        assert!((distribution.cell(0, 0, 7) - 2.0 / 3.0).abs() < TOLERANCE);
    }

    #[test]
    fn reset_clears_everything() {
        let mut distribution = uniform(Pixel::new(10, 10, 10), 5);
        distribution.reset();
        assert_eq!(distribution, ColorDistribution::new());
        distribution.add(Pixel::WHITE);
        assert_eq!(distribution.sample_count(), 1);
    }

    #[test]
    fn hundred_red_pixels_fill_the_top_red_bin() {
        let distribution = uniform(Pixel::new(255, 0, 0), 100);
        assert_eq!(distribution.cell(7, 0, 0), 1.0);
        assert_eq!(nonzero_cells(&distribution), 1);
    }

    #[test]
    fn distance_to_self_is_zero() {
        let mixed = ColorDistribution::from_pixels(
            (0..64u8).map(|i| Pixel::new(i * 4, 255 - i * 4, i * 2)),
        );
        assert_eq!(mixed.distance(&mixed), 0.0);

        let empty = ColorDistribution::from_pixels(std::iter::empty());
        assert_eq!(empty.distance(&empty), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = ColorDistribution::from_pixels((0..50u8).map(|i| Pixel::new(i * 5, 20, 200)));
        let b = ColorDistribution::from_pixels((0..80u8).map(|i| Pixel::new(90, i * 3, 100)));
        assert_eq!(a.distance(&b), b.distance(&a));
        assert!(a.distance(&b) > 0.0);
    }

    #[test]
    fn disjoint_distributions_are_maximally_apart() {
        let red = uniform(Pixel::new(255, 0, 0), 10);
        let blue = uniform(Pixel::new(0, 0, 255), 10);
        // Two disjoint one-hot histograms: (1)^2/1 + (1)^2/1.
        assert!((red.distance(&blue) - 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn average_color_of_uniform_region_is_within_one_bin() {
        for color in [
            Pixel::new(255, 0, 0),
            Pixel::new(0, 0, 255),
            Pixel::new(100, 150, 200),
            Pixel::new(16, 16, 16),
        ] {
            let average = uniform(color, 64).average_color();
            for (got, want) in [
                (average.red, color.red),
                (average.green, color.green),
                (average.blue, color.blue),
            ] {
                assert!((got as i32 - want as i32).abs() <= BIN_WIDTH as i32);
            }
        }
    }

    #[test]
    fn average_color_of_red_is_the_bin_center() {
        let average = uniform(Pixel::new(255, 0, 0), 100).average_color();
        assert_eq!(average, Pixel::new(240, 16, 16));
    }

    #[test]
    fn average_color_of_empty_is_black() {
        let empty = ColorDistribution::from_pixels(std::iter::empty());
        assert_eq!(empty.average_color(), Pixel::BLACK);
    }

    #[test]
    fn average_color_is_clamped() {
        // Eight occupied cells on the top red bin push the raw red sum past 255.
        let distribution = ColorDistribution::from_pixels(
            (0..8u8).map(|g| Pixel::new(255, g * 32, 0)),
        );
        assert_eq!(distribution.average_color().red, 255);
    }
}
