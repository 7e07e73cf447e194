// THEORY:
// A `ColorClass` is one semantic label the engine can recognize: "background" or
// one of the user's objects. It bundles everything the scan needs about a label
// into a single record, namely the display color used to paint its blocks and the
// exemplar histograms that define what it looks like. Keeping both in one record
// means there is no second, parallel list that could drift out of step.
//
// The `ClassRegistry` is the ordered collection of those records. Its only hard
// invariant is that index 0 is the background class and always exists, even before
// it has any exemplar. Object classes are appended after it and keep their index for
// the life of the registry. The scanners never see the registry itself, only a
// read-only slice (or a cloned snapshot) of its classes.

use crate::core_modules::chunk::chunk::Chunk;
use crate::core_modules::color_distribution::ColorDistribution;
use crate::core_modules::pixel::pixel::Pixel;
use crate::error::{RecoError, Result};
use image::RgbImage;
use std::sync::Arc;

/// Index of the background class in every registry.
pub const BACKGROUND_INDEX: usize = 0;
pub const BACKGROUND_LABEL: &str = "background";

/// A labeled set of exemplar histograms with the color used to display it.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorClass {
    /// Human-readable name, e.g. "background" or "object 2".
    pub label: String,
    /// Solid color painted over blocks assigned to this class.
    pub display_color: Pixel,
    /// Finished reference histograms for this class.
    pub exemplars: Vec<ColorDistribution>,
}

impl ColorClass {
    pub fn new(label: impl Into<String>, display_color: Pixel, exemplars: Vec<ColorDistribution>) -> Self {
        Self {
            label: label.into(),
            display_color,
            exemplars,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exemplars.is_empty()
    }
}

/// The ordered list of classes, background first.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassRegistry {
    classes: Vec<ColorClass>,
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassRegistry {
    /// A registry holding only the (empty, black) background class.
    pub fn new() -> Self {
        Self {
            classes: vec![ColorClass::new(BACKGROUND_LABEL, Pixel::BLACK, Vec::new())],
        }
    }

    pub fn classes(&self) -> &[ColorClass] {
        &self.classes
    }

    /// A cheap, immutable copy of the classes to hand to a scan.
    pub fn snapshot(&self) -> Arc<[ColorClass]> {
        Arc::from(self.classes.as_slice())
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Always false: the background class is never removed.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Number of user-defined classes, excluding the background.
    pub fn object_count(&self) -> usize {
        self.classes.len() - 1
    }

    pub fn background(&self) -> &ColorClass {
        &self.classes[BACKGROUND_INDEX]
    }

    pub fn get(&self, index: usize) -> Option<&ColorClass> {
        self.classes.get(index)
    }

    /// Replaces the background exemplars with the given histograms.
    pub fn set_background<I>(&mut self, exemplars: I)
    where
        I: IntoIterator<Item = ColorDistribution>,
    {
        let background = &mut self.classes[BACKGROUND_INDEX].exemplars;
        background.clear();
        background.extend(exemplars);
    }

    /// Re-learns the background from every whole `block_size` tile of `image`.
    /// Returns the number of background exemplars.
    pub fn scan_background(&mut self, image: &RgbImage, block_size: u32) -> Result<usize> {
        if block_size == 0 {
            return Err(RecoError::InvalidBlockSize(block_size));
        }
        let (width, height) = image.dimensions();
        let tiles = Chunk::grid(width, height, block_size)
            .map(|tile| tile.distribution(image))
            .collect::<Result<Vec<_>>>()?;
        self.set_background(tiles);
        let count = self.background().exemplars.len();
        log::debug!("background re-learned from {} tiles of {}px", count, block_size);
        Ok(count)
    }

    /// Appends a new, exemplar-less object class and returns its index.
    ///
    /// The display color is the centroid color of `sample`.
    pub fn add_object(&mut self, sample: &ColorDistribution) -> usize {
        let index = self.classes.len();
        self.classes.push(ColorClass::new(
            format!("object {}", index),
            sample.average_color(),
            Vec::new(),
        ));
        index
    }

    /// Appends an exemplar to the most recently created object class.
    /// Returns that class's index and its new exemplar count.
    pub fn add_exemplar(&mut self, exemplar: ColorDistribution) -> Result<(usize, usize)> {
        if self.object_count() == 0 {
            return Err(RecoError::NoObjectClass);
        }
        let index = self.classes.len() - 1;
        let class = &mut self.classes[index];
        class.exemplars.push(exemplar);
        Ok((index, class.exemplars.len()))
    }
}
