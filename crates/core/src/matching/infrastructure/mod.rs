pub mod cross_check_matcher;
