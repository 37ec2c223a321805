pub mod color_histogram_checker;
pub mod panorama_group_checker;
