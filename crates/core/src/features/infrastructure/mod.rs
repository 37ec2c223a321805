pub mod brief;
pub mod fast;
pub mod harris;
pub mod orb_extractor;
