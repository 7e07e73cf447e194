// THEORY:
// The `ParallelScanner` runs the exact same block-wise classification as
// `RegionScanner`, split across a pool of blocking tokio workers.
//
// The scan is embarrassingly parallel: every block's histogram and class search
// depend on that block alone. The grid is cut into contiguous bands of block rows,
// one band per worker. Each worker reads the shared frame and the shared class
// snapshot (both behind `Arc`, never mutated during a scan) and produces the labels
// of its own band only, so no two workers ever write the same output. Bands are
// joined back in row order, and because ties are resolved per block the stitched
// map is identical to the sequential one regardless of which worker finishes first.

use crate::core_modules::chunk::chunk::Chunk;
use crate::core_modules::color_class::ColorClass;
use crate::core_modules::region_scanner::{LabelMap, classify_rows};
use crate::error::{RecoError, Result};
use futures::future::try_join_all;
use image::RgbImage;
use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;

/// Block-wise classifier that spreads block rows over several workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelScanner {
    block_size: u32,
    worker_count: usize,
}

impl ParallelScanner {
    /// One worker per logical CPU.
    pub fn new(block_size: u32) -> Result<Self> {
        Self::with_workers(block_size, num_cpus::get())
    }

    pub fn with_workers(block_size: u32, worker_count: usize) -> Result<Self> {
        if block_size == 0 {
            return Err(RecoError::InvalidBlockSize(block_size));
        }
        if worker_count == 0 {
            return Err(RecoError::InvalidConfig("worker count must be at least 1".into()));
        }
        Ok(Self {
            block_size,
            worker_count,
        })
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Classifies every whole block of `image` against `classes`.
    pub async fn label_map(&self, image: Arc<RgbImage>, classes: Arc<[ColorClass]>) -> Result<LabelMap> {
        if classes.is_empty() {
            return Err(RecoError::NoClasses);
        }
        let started = Instant::now();
        let (width, height) = image.dimensions();
        let (grid_width, grid_height) = Chunk::grid_dimensions(width, height, self.block_size);
        let bands = split_rows(grid_height, self.worker_count);

        let workers = bands.iter().cloned().map(|rows| {
            let image = Arc::clone(&image);
            let classes = Arc::clone(&classes);
            let block_size = self.block_size;
            tokio::task::spawn_blocking(move || classify_rows(&image, &classes, block_size, rows))
        });

        let results = try_join_all(workers)
            .await
            .map_err(|e| RecoError::Worker(e.to_string()))?;

        let mut labels = Vec::with_capacity((grid_width * grid_height) as usize);
        for band in results {
            labels.extend(band?);
        }

        log::debug!(
            "parallel scan of {}x{} blocks over {} bands took {:?}",
            grid_width,
            grid_height,
            bands.len(),
            started.elapsed()
        );
        Ok(LabelMap::new(grid_width, grid_height, self.block_size, labels))
    }

    /// Classifies `image` and paints each block with its class's display color.
    pub async fn classify(&self, image: Arc<RgbImage>, classes: Arc<[ColorClass]>) -> Result<RgbImage> {
        let (width, height) = image.dimensions();
        let map = self.label_map(image, Arc::clone(&classes)).await?;
        Ok(map.paint(&classes, width, height))
    }
}

/// Splits `0..row_count` into at most `parts` contiguous, non-empty, ordered ranges
/// whose lengths differ by at most one.
fn split_rows(row_count: u32, parts: usize) -> Vec<Range<u32>> {
    let parts = (parts.max(1) as u32).min(row_count);
    if parts == 0 {
        return Vec::new();
    }
    let base = row_count / parts;
    let extra = row_count % parts;
    let mut bands = Vec::with_capacity(parts as usize);
    let mut start = 0;
    for part in 0..parts {
        let len = base + u32::from(part < extra);
        bands.push(start..start + len);
        start += len;
    }
    bands
}
