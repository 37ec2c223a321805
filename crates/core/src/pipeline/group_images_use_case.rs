use std::sync::Arc;
use std::thread;
use std::time::Instant;

use thiserror::Error;

use crate::grouping::domain::group_assigner::{GroupAssigner, GroupId};
use crate::grouping::domain::group_checker::{CheckerError, GroupChecker};
use crate::images::domain::group_sink::GroupSink;
use crate::images::domain::image_loader::{ImageLoader, LoadError};
use crate::pipeline::grouping_logger::GroupingLogger;
use crate::shared::constants::DEFAULT_READ_AHEAD;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("{reference}: {source}")]
    Checker {
        reference: String,
        #[source]
        source: CheckerError,
    },
    #[error("failed to record group: {0}")]
    Sink(#[from] std::io::Error),
    #[error("feature worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub images: usize,
    pub groups: usize,
}

/// An image that has been loaded and reduced to features, ready for the
/// assigner.
struct Prepared<F> {
    features: F,
    width: u32,
    height: u32,
    load_ms: f64,
    features_ms: f64,
}

/// Groups an ordered list of images into runs of overlapping shots.
///
/// Layout: `[worker: load → features] → main [assign → record]`
///
/// With `read_ahead > 0` the worker runs on its own thread and stays at
/// most `read_ahead` images ahead; otherwise everything runs inline. The
/// assignment order, and so the output, is the same either way.
pub struct GroupImagesUseCase<C: GroupChecker> {
    loader: Box<dyn ImageLoader>,
    sink: Box<dyn GroupSink>,
    checker: Arc<C>,
    assigner: GroupAssigner<Arc<C>>,
    logger: Box<dyn GroupingLogger>,
    read_ahead: usize,
}

impl<C: GroupChecker> GroupImagesUseCase<C> {
    pub fn new(
        loader: Box<dyn ImageLoader>,
        sink: Box<dyn GroupSink>,
        checker: C,
        logger: Box<dyn GroupingLogger>,
    ) -> Self {
        let checker = Arc::new(checker);
        Self {
            loader,
            sink,
            assigner: GroupAssigner::new(Arc::clone(&checker)),
            checker,
            logger,
            read_ahead: DEFAULT_READ_AHEAD,
        }
    }

    pub fn with_read_ahead(mut self, read_ahead: usize) -> Self {
        self.read_ahead = read_ahead;
        self
    }

    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.assigner = self.assigner.with_history_limit(limit);
        self
    }

    /// Assigns a group to every reference in order, recording each one as
    /// soon as it is known. The first load or feature failure aborts the run;
    /// records already made are kept.
    pub fn execute(&mut self, references: &[String]) -> Result<RunSummary, PipelineError> {
        self.logger.run_started(references.len());

        let result = if self.read_ahead == 0 {
            self.run_sequential(references)
        } else {
            self.run_read_ahead(references)
        };

        self.logger.summary();
        result?;

        Ok(RunSummary {
            images: references.len(),
            groups: self.assigner.current_group().map_or(0, |g| g as usize + 1),
        })
    }

    fn run_sequential(&mut self, references: &[String]) -> Result<(), PipelineError> {
        let total = references.len();
        for (index, reference) in references.iter().enumerate() {
            let prepared = prepare(&*self.loader, &*self.checker, index, reference);
            let prepared = self.check_prepared(reference, prepared)?;
            commit(
                &mut self.assigner,
                &mut *self.sink,
                &mut *self.logger,
                index,
                total,
                reference,
                prepared,
            )?;
        }
        Ok(())
    }

    fn run_read_ahead(&mut self, references: &[String]) -> Result<(), PipelineError> {
        let capacity = self.read_ahead;
        let loader: &dyn ImageLoader = &*self.loader;
        let checker: &C = &self.checker;
        let assigner = &mut self.assigner;
        let sink = &mut *self.sink;
        let logger = &mut *self.logger;

        thread::scope(|scope| {
            let (tx, rx) = crossbeam_channel::bounded(capacity);

            let worker = scope.spawn(move || {
                for (index, reference) in references.iter().enumerate() {
                    let item = prepare(loader, checker, index, reference);
                    let failed = item.is_err();
                    if tx.send(item).is_err() || failed {
                        break;
                    }
                }
            });

            let main_result = consume(rx, references, assigner, sink, logger);

            let joined = worker
                .join()
                .map_err(|_| PipelineError::Worker("feature worker panicked".into()));
            main_result.and(joined)
        })
    }

    fn check_prepared(
        &mut self,
        reference: &str,
        prepared: Result<Prepared<C::Features>, PipelineError>,
    ) -> Result<Prepared<C::Features>, PipelineError> {
        if let Err(PipelineError::Load(ref load)) = prepared {
            self.logger.load_failed(reference, load);
        }
        prepared
    }
}

fn prepare<C: GroupChecker + ?Sized>(
    loader: &dyn ImageLoader,
    checker: &C,
    index: usize,
    reference: &str,
) -> Result<Prepared<C::Features>, PipelineError> {
    let start = Instant::now();
    let frame = loader.load(reference, checker.load_options())?.with_index(index);
    let load_ms = start.elapsed().as_secs_f64() * 1000.0;

    let start = Instant::now();
    let features = checker
        .compute_features(&frame)
        .map_err(|source| PipelineError::Checker {
            reference: reference.to_string(),
            source,
        })?;
    let features_ms = start.elapsed().as_secs_f64() * 1000.0;

    Ok(Prepared {
        features,
        width: frame.width(),
        height: frame.height(),
        load_ms,
        features_ms,
    })
}

/// Main-thread half of the read-ahead pipeline. Takes `rx` by value so that
/// an early return disconnects the worker.
fn consume<C: GroupChecker>(
    rx: crossbeam_channel::Receiver<Result<Prepared<C::Features>, PipelineError>>,
    references: &[String],
    assigner: &mut GroupAssigner<C>,
    sink: &mut dyn GroupSink,
    logger: &mut dyn GroupingLogger,
) -> Result<(), PipelineError> {
    let total = references.len();
    for (index, reference) in references.iter().enumerate() {
        let item = rx
            .recv()
            .map_err(|_| PipelineError::Worker("feature worker stopped early".into()))?;
        let prepared = match item {
            Ok(prepared) => prepared,
            Err(e) => {
                if let PipelineError::Load(ref load) = e {
                    logger.load_failed(reference, load);
                }
                return Err(e);
            }
        };
        commit(assigner, sink, logger, index, total, reference, prepared)?;
    }
    Ok(())
}

fn commit<C: GroupChecker>(
    assigner: &mut GroupAssigner<C>,
    sink: &mut dyn GroupSink,
    logger: &mut dyn GroupingLogger,
    index: usize,
    total: usize,
    reference: &str,
    prepared: Prepared<C::Features>,
) -> Result<GroupId, PipelineError> {
    logger.image_loaded(index, reference, prepared.width, prepared.height);
    logger.timing("load", prepared.load_ms);
    logger.timing("features", prepared.features_ms);

    let start = Instant::now();
    let assignment = assigner
        .assign(prepared.features)
        .map_err(|source| PipelineError::Checker {
            reference: reference.to_string(),
            source,
        })?;
    logger.timing("assign", start.elapsed().as_secs_f64() * 1000.0);

    for attempt in &assignment.attempts {
        logger.match_attempt(index, reference, attempt);
    }
    if assignment.new_group {
        logger.group_started(index, reference, assignment.group_id);
    }

    sink.record(reference, assignment.group_id)?;
    logger.assigned(index, total, reference, assignment.group_id);
    Ok(assignment.group_id)
}
