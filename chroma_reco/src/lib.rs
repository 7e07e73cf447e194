// THEORY:
// This file is the main entry point for the `chroma_reco` library crate. It
// exposes a small, pure recognition engine: color histograms over image regions,
// a chi-square-like distance between them, and a block-wise scan that labels a
// whole frame by nearest class.
//
// The public surface is layered the same way the engine is:
// - `core_modules`: the building blocks (pixels, chunks, histograms, the distance
//   search, classes and the sequential `RegionScanner`).
// - `parallel_scanner`: the same scan spread over tokio blocking workers.
// - `session`: the key-driven state machine that edits classes and toggles
//   recognition, for interactive front-ends.
// - `config` and `error`: tunables and the error taxonomy.
//
// The crate performs no I/O and never installs a logger; it only emits `log`
// records for the host application to route.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod parallel_scanner;
pub mod session;

pub use config::RecoConfig;
pub use core_modules::chunk::chunk::Chunk;
pub use core_modules::color_class::{BACKGROUND_INDEX, ClassRegistry, ColorClass};
pub use core_modules::color_distribution::{ColorDistribution, Distance};
pub use core_modules::distance_search::distance_search::{min_distance, nearest_class};
pub use core_modules::pixel::pixel::Pixel;
pub use core_modules::region_scanner::{LabelMap, RegionScanner};
pub use error::{RecoError, Result};
pub use parallel_scanner::ParallelScanner;
pub use session::{Command, Event, RecognitionSession};
