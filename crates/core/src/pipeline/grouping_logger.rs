use std::collections::HashMap;
use std::time::Instant;

use crate::grouping::domain::group_assigner::{GroupId, MatchAttempt};

/// Cross-cutting observer for grouping runs.
///
/// Keeps the use case free of any particular output mechanism; the CLI
/// routes events to the `log` facade, tests discard them.
pub trait GroupingLogger: Send {
    fn run_started(&mut self, total: usize);

    fn image_loaded(&mut self, index: usize, reference: &str, width: u32, height: u32);

    /// One comparison of image `index` against a retained image.
    fn match_attempt(&mut self, index: usize, reference: &str, attempt: &MatchAttempt);

    fn group_started(&mut self, index: usize, reference: &str, group: GroupId);

    /// Image `index` (0-based) of `total` received `group`.
    fn assigned(&mut self, index: usize, total: usize, reference: &str, group: GroupId);

    /// Record how long a named stage took for one image.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    fn load_failed(&mut self, reference: &str, error: &dyn std::error::Error);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

pub struct NullGroupingLogger;

impl GroupingLogger for NullGroupingLogger {
    fn run_started(&mut self, _total: usize) {}
    fn image_loaded(&mut self, _index: usize, _reference: &str, _width: u32, _height: u32) {}
    fn match_attempt(&mut self, _index: usize, _reference: &str, _attempt: &MatchAttempt) {}
    fn group_started(&mut self, _index: usize, _reference: &str, _group: GroupId) {}
    fn assigned(&mut self, _index: usize, _total: usize, _reference: &str, _group: GroupId) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn load_failed(&mut self, _reference: &str, _error: &dyn std::error::Error) {}
}

/// Logger backed by the `log` facade.
///
/// Run-level events and every comparison go to `info`, per-image load
/// detail to `debug`, load failures to `error`. Stage timings are accumulated for the summary.
pub struct LogGroupingLogger {
    timings: HashMap<String, Vec<f64>>,
    start_time: Instant,
    total_images: usize,
    images_done: usize,
    groups: usize,
    comparisons: usize,
}

impl LogGroupingLogger {
    pub fn new() -> Self {
        Self {
            timings: HashMap::new(),
            start_time: Instant::now(),
            total_images: 0,
            images_done: 0,
            groups: 0,
            comparisons: 0,
        }
    }

    /// Returns the formatted summary string, or `None` if nothing was grouped.
    pub fn summary_string(&self) -> Option<String> {
        if self.images_done == 0 {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Grouping summary ({}/{} images, {} groups, {} comparisons, {:.1}s total):",
            self.images_done,
            self.total_images,
            self.groups,
            self.comparisons,
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len().max(1) as f64;
            lines.push(format!(
                "  {stage:10}: avg {avg_ms:7.1}ms  total {total_ms:8.0}ms"
            ));
        }

        if elapsed_ms > 0.0 {
            let rate = self.images_done as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {rate:.2} images/s"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }
}

impl Default for LogGroupingLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupingLogger for LogGroupingLogger {
    fn run_started(&mut self, total: usize) {
        self.start_time = Instant::now();
        self.total_images = total;
        log::info!("Grouping started: {total} images");
    }

    fn image_loaded(&mut self, index: usize, reference: &str, width: u32, height: u32) {
        log::debug!("[{index}] loaded {reference} ({width}x{height})");
    }

    fn match_attempt(&mut self, index: usize, reference: &str, attempt: &MatchAttempt) {
        self.comparisons += 1;
        log::info!(
            "[{index}] {reference} vs retained #{}: score {} -> {}",
            attempt.rank,
            attempt.outcome.score,
            if attempt.outcome.is_match { "match" } else { "no match" }
        );
    }

    fn group_started(&mut self, index: usize, reference: &str, group: GroupId) {
        self.groups += 1;
        log::info!("[{index}] {reference} starts group {group}");
    }

    fn assigned(&mut self, index: usize, total: usize, reference: &str, group: GroupId) {
        self.images_done = index + 1;
        self.total_images = total;
        log::info!("Grouped {}/{total}: {reference} -> {group}", index + 1);
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn load_failed(&mut self, reference: &str, error: &dyn std::error::Error) {
        log::error!("Failed to load {reference}: {error}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
