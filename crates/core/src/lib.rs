//! Sequential panorama grouping.
//!
//! Images arrive in shooting order; each one either continues the open
//! group (it overlaps a retained member, judged by ORB features and a
//! RANSAC homography) or starts the next one.

pub mod features {
    pub mod domain {
        pub mod feature_extractor;
        pub mod feature_set;
    }
    pub mod infrastructure;
}

pub mod matching {
    pub mod domain {
        pub mod correspondence;
        pub mod descriptor_matcher;
    }
    pub mod infrastructure;
}

pub mod verification {
    pub mod domain {
        pub mod overlap_verifier;
    }
    pub mod infrastructure;
}

pub mod grouping {
    pub mod domain {
        pub mod group_assigner;
        pub mod group_checker;
    }
    pub mod infrastructure;
}

pub mod images {
    pub mod domain {
        pub mod group_sink;
        pub mod image_loader;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod group_images_use_case;
    pub mod grouping_logger;
}

pub mod shared {
    pub mod config;
    pub mod constants;
    pub mod frame;
}
