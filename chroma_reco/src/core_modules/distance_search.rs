// THEORY:
// `DistanceSearch` is the decision rule of the engine: a nearest-neighbor search
// over exemplar histograms, done in two levels.
//
// 1.  **Within a class**: `min_distance` returns how close a query histogram gets to
//     any exemplar of one class. A class with no exemplars answers `f32::MAX`, the
//     "maximal distance" sentinel. This matters: the background class exists from
//     the start but is empty until the background is scanned, and it must never
//     win against a class that has learned something.
// 2.  **Across classes**: `nearest_class` walks the classes in index order and keeps
//     the first strict improvement. A later class at an equal distance never
//     overrides an earlier one, so ties always resolve to the lowest index, and the
//     outcome for a block depends on nothing but that block.
//
// Both functions are stateless utilities over read-only data.

use crate::core_modules::color_class::ColorClass;
use crate::core_modules::color_distribution::{ColorDistribution, Distance};

pub mod distance_search {
    use super::*;

    /// Distance reported for a class that holds no exemplars.
    pub const EMPTY_CLASS_DISTANCE: Distance = Distance::MAX;

    /// The smallest distance between `query` and any of `exemplars`.
    pub fn min_distance(query: &ColorDistribution, exemplars: &[ColorDistribution]) -> Distance {
        let mut min_dist = EMPTY_CLASS_DISTANCE;
        for exemplar in exemplars {
            let dist = query.distance(exemplar);
            if dist < min_dist {
                min_dist = dist;
            }
        }
        min_dist
    }

    /// Index of the class closest to `query`, with its distance.
    ///
    /// Returns `None` only for an empty class list. If every class is empty the
    /// first class wins with `EMPTY_CLASS_DISTANCE`.
    pub fn nearest_class(query: &ColorDistribution, classes: &[ColorClass]) -> Option<(usize, Distance)> {
        nearest_index(classes.iter().map(|class| min_distance(query, &class.exemplars)))
    }

    /// First index holding the strictly smallest value of `distances`.
    pub fn nearest_index<I>(distances: I) -> Option<(usize, Distance)>
    where
        I: IntoIterator<Item = Distance>,
    {
        let mut best: Option<(usize, Distance)> = None;
        for (index, dist) in distances.into_iter().enumerate() {
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((index, dist)),
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::distance_search::*;
    use crate::core_modules::color_class::ColorClass;
    use crate::core_modules::color_distribution::ColorDistribution;
    use crate::core_modules::pixel::pixel::Pixel;

    fn uniform(color: Pixel) -> ColorDistribution {
        ColorDistribution::from_pixels(std::iter::repeat_n(color, 64))
    }

    fn class_of(exemplars: Vec<ColorDistribution>) -> ColorClass {
        ColorClass::new("test", Pixel::BLACK, exemplars)
    }

    #[test]
    fn empty_collection_answers_the_sentinel() {
        let query = uniform(Pixel::new(10, 200, 30));
        assert_eq!(min_distance(&query, &[]), EMPTY_CLASS_DISTANCE);
    }

    #[test]
    fn empty_collection_never_beats_a_populated_one() {
        let query = uniform(Pixel::new(255, 0, 0));
        for exemplar in [
            uniform(Pixel::new(0, 0, 255)),
            uniform(Pixel::new(255, 0, 0)),
            ColorDistribution::from_pixels(std::iter::empty()),
        ] {
            assert!(min_distance(&query, &[]) > min_distance(&query, &[exemplar]));
        }
    }

    #[test]
    fn picks_the_closest_exemplar() {
        let query = uniform(Pixel::new(255, 0, 0));
        let exemplars = [uniform(Pixel::new(0, 255, 0)), uniform(Pixel::new(255, 0, 0))];
        assert_eq!(min_distance(&query, &exemplars), 0.0);
    }

    #[test]
    fn empty_background_does_not_win() {
        let query = uniform(Pixel::new(0, 0, 255));
        let classes = [class_of(vec![]), class_of(vec![uniform(Pixel::new(255, 0, 0))])];
        let (index, _) = nearest_class(&query, &classes).unwrap();
        assert_eq!(index, 1);
    }

    #[test]
    fn all_empty_classes_fall_back_to_the_first() {
        let query = uniform(Pixel::WHITE);
        let classes = [class_of(vec![]), class_of(vec![])];
        assert_eq!(nearest_class(&query, &classes), Some((0, EMPTY_CLASS_DISTANCE)));
        assert_eq!(nearest_class(&query, &[]), None);
    }

    #[test]
    fn ties_resolve_to_the_lowest_index() {
        assert_eq!(nearest_index([3.0, 1.0, 1.0, 2.0]), Some((1, 1.0)));
        assert_eq!(nearest_index([0.5, 0.5]), Some((0, 0.5)));
    }

    #[test]
    fn equal_exemplars_in_two_classes_pick_the_first() {
        let query = uniform(Pixel::new(255, 0, 0));
        let exemplar = uniform(Pixel::new(0, 0, 255));
        let classes = [
            class_of(vec![]),
            class_of(vec![exemplar]),
            class_of(vec![exemplar]),
        ];
        assert_eq!(nearest_class(&query, &classes).map(|(i, _)| i), Some(1));
    }
}
