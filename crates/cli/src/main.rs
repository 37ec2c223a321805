use std::fs::File;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use panogroup_core::grouping::infrastructure::panorama_group_checker::PanoramaGroupChecker;
use panogroup_core::images::infrastructure::group_table_writer::GroupTableWriter;
use panogroup_core::images::infrastructure::image_file_loader::ImageFileLoader;
use panogroup_core::images::infrastructure::image_list_reader::read_image_list;
use panogroup_core::pipeline::group_images_use_case::GroupImagesUseCase;
use panogroup_core::pipeline::grouping_logger::LogGroupingLogger;
use panogroup_core::shared::config::GroupingConfig;
use panogroup_core::shared::constants::DEFAULT_LOG_FILE;

/// Group a shooting-order list of photos into panoramas.
///
/// Each line of the output is `<image>  <group>`; consecutive images that
/// overlap share a group id.
#[derive(Parser)]
#[command(name = "panogroup")]
struct Cli {
    /// Text file with one image path per line, in shooting order.
    input_list: PathBuf,

    /// Output file; lines are appended.
    output: PathBuf,

    /// JSON file with grouping settings. Flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Append the log to this file instead of stderr. Given without a
    /// value, logs to `image_grouping.log`.
    #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_LOG_FILE)]
    log_file: Option<PathBuf>,

    /// Linear downscale applied before feature extraction (0-1].
    #[arg(long)]
    scale: Option<f64>,

    /// Maximum ORB keypoints kept per image.
    #[arg(long)]
    max_keypoints: Option<usize>,

    /// FAST threshold as a fraction of full intensity.
    #[arg(long)]
    fast_threshold: Option<f32>,

    /// Pyramid levels for feature extraction.
    #[arg(long)]
    n_scales: Option<usize>,

    /// Discard descriptor matches farther apart than this Hamming distance.
    #[arg(long)]
    max_distance: Option<u32>,

    /// Inlier count a pair must exceed to share a group.
    #[arg(long)]
    overlap_threshold: Option<usize>,

    /// RANSAC trials per comparison.
    #[arg(long)]
    max_trials: Option<usize>,

    /// RANSAC inlier distance in pixels.
    #[arg(long)]
    residual_threshold: Option<f64>,

    /// Seed for RANSAC sampling.
    #[arg(long)]
    seed: Option<u64>,

    /// Only compare against the N most recent members of the open group.
    #[arg(long)]
    history_limit: Option<usize>,

    /// Images to load ahead on a worker thread (0 = none).
    #[arg(long)]
    read_ahead: Option<usize>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&cli)?;

    let config = build_config(&cli)?;
    let references = read_image_list(&cli.input_list)?;
    log::debug!("Configuration: {config:?}");

    let sink = GroupTableWriter::open(&cli.output)
        .map_err(|e| format!("Cannot open output {}: {e}", cli.output.display()))?;

    let mut use_case = GroupImagesUseCase::new(
        Box::new(ImageFileLoader::new()),
        Box::new(sink),
        PanoramaGroupChecker::from_config(&config),
        Box::new(LogGroupingLogger::new()),
    )
    .with_read_ahead(config.read_ahead)
    .with_history_limit(config.history_limit);

    let summary = use_case.execute(&references)?;
    log::info!(
        "Done: {} images in {} groups -> {}",
        summary.images,
        summary.groups,
        cli.output.display()
    );
    Ok(())
}

fn init_logging(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(path) = &cli.log_file {
        let file = File::options()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| format!("Cannot open log file {}: {e}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn build_config(cli: &Cli) -> Result<GroupingConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => GroupingConfig::load(path)?,
        None => GroupingConfig::default(),
    };
    apply_overrides(cli, &mut config);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(cli: &Cli, config: &mut GroupingConfig) {
    if let Some(v) = cli.scale {
        config.scale = v;
    }
    if let Some(v) = cli.max_keypoints {
        config.max_keypoints = v;
    }
    if let Some(v) = cli.fast_threshold {
        config.fast_threshold = v;
    }
    if let Some(v) = cli.n_scales {
        config.n_scales = v;
    }
    if cli.max_distance.is_some() {
        config.max_distance = cli.max_distance;
    }
    if let Some(v) = cli.overlap_threshold {
        config.overlap_threshold = v;
    }
    if let Some(v) = cli.max_trials {
        config.max_trials = v;
    }
    if let Some(v) = cli.residual_threshold {
        config.residual_threshold = v;
    }
    if let Some(v) = cli.seed {
        config.seed = v;
    }
    if cli.history_limit.is_some() {
        config.history_limit = cli.history_limit;
    }
    if let Some(v) = cli.read_ahead {
        config.read_ahead = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["panogroup", "list.txt", "out.txt"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_without_flags() {
        let config = build_config(&parse(&[])).unwrap();
        assert_eq!(config, GroupingConfig::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = parse(&[
            "--scale",
            "0.5",
            "--overlap-threshold",
            "60",
            "--history-limit",
            "3",
            "--max-distance",
            "48",
        ]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.scale, 0.5);
        assert_eq!(config.max_distance, Some(48));
        assert_eq!(config.overlap_threshold, 60);
        assert_eq!(config.history_limit, Some(3));
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_trials": 50, "seed": 9}}"#).unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = parse(&["--config", path.as_str(), "--seed", "4"]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.max_trials, 50);
        assert_eq!(config.seed, 4);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        assert!(build_config(&parse(&["--scale", "2.0"])).is_err());
        assert!(build_config(&parse(&["--history-limit", "0"])).is_err());
    }

    #[test]
    fn test_bare_log_file_flag_uses_default_name() {
        let cli = parse(&["--log-file"]);
        assert_eq!(cli.log_file, Some(PathBuf::from(DEFAULT_LOG_FILE)));
        assert!(parse(&[]).log_file.is_none());
    }

    #[test]
    fn test_missing_positional_arguments_fail() {
        assert!(Cli::try_parse_from(["panogroup", "list.txt"]).is_err());
    }
}
