pub mod chunk;
pub mod color_class;
pub mod color_distribution;
pub mod distance_search;
pub mod pixel;
pub mod region_scanner;
