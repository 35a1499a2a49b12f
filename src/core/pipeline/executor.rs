//! Pipeline execution implementation.

use crate::config::PipelineConfig;
use crate::core::comparator::{
    build_adjacency_with_events, ComparisonStrategy, ThresholdStrategy, TransitiveGrouper,
};
use crate::core::hasher::{
    FastDecoder, Fingerprint, HashAlgorithm, HashAlgorithmKind, HasherConfig, ResampleFilter,
};
use crate::core::reporter::{materialize, BatchSummary, DedupOutcome, DedupRun, ImageFailure};
use crate::core::source::{
    load_record, BatchRequest, HttpFetcher, ImageFetcher, ImageRecord, LoadedImage, ScratchSpace,
};
use crate::error::{ConfigError, DedupError, FetchError, HashError, ImageError};
use crate::events::{
    null_sender, Event, EventSender, HashEvent, HashProgress, PipelineEvent, PipelinePhase,
    PipelineSummary,
};
use image::DynamicImage;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Shared flag for stopping a run from another thread
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. No new image starts, and remote fetches stop
    /// before their next attempt or during a retry backoff. An HTTP request
    /// already on the wire still runs until it answers or times out.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
    fetcher: Option<Box<dyn ImageFetcher>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            fetcher: None,
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the comparison threshold (lower = stricter)
    pub fn threshold(mut self, threshold: u32) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Set the hash algorithm
    pub fn algorithm(mut self, algorithm: HashAlgorithmKind) -> Self {
        self.config.algorithm = algorithm;
        self
    }

    /// Set the resampling filter
    pub fn filter(mut self, filter: ResampleFilter) -> Self {
        self.config.filter = filter;
        self
    }

    /// Set the number of worker threads
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Stage loaded bytes in a request-scoped scratch directory
    pub fn stage_to_disk(mut self, stage: bool) -> Self {
        self.config.stage_to_disk = stage;
        self
    }

    /// Parent directory for scratch spaces
    pub fn scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.scratch_root = Some(root.into());
        self
    }

    /// Use a custom fetcher for remote sources
    pub fn fetcher(mut self, fetcher: Box<dyn ImageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Result<Pipeline, DedupError> {
        self.config.validate()?;
        let strategy = ThresholdStrategy::new(self.config.threshold)?;

        let hasher = HasherConfig::new()
            .algorithm(self.config.algorithm)
            .filter(self.config.filter)
            .build();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .thread_name(|i| format!("dedup-worker-{}", i))
            .build()
            .map_err(|e| ConfigError::WorkerPool(e.to_string()))?;

        let fetcher: Box<dyn ImageFetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Box::new(HttpFetcher::new(self.config.fetch.clone())?),
        };

        Ok(Pipeline {
            config: self.config,
            hasher,
            strategy,
            fetcher,
            pool,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-image result of the fingerprinting phase
enum ImageOutcome {
    Hashed {
        loaded: LoadedImage,
        fingerprint: Fingerprint,
    },
    Failed(ImageFailure),
    /// Not started because the run was cancelled
    Skipped,
}

/// Shared state for one fingerprinting phase
struct HashContext<'a> {
    scratch: Option<&'a ScratchSpace>,
    events: &'a EventSender,
    cancel: &'a CancellationToken,
    completed: AtomicUsize,
    total: usize,
}

/// The duplicate detection pipeline.
///
/// A pipeline holds no per-request state, so one instance can serve
/// concurrent requests.
pub struct Pipeline {
    config: PipelineConfig,
    hasher: Box<dyn HashAlgorithm>,
    strategy: ThresholdStrategy,
    fetcher: Box<dyn ImageFetcher>,
    pool: rayon::ThreadPool,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self, request: BatchRequest) -> Result<DedupRun, DedupError> {
        self.run_with_events(request, &null_sender(), &CancellationToken::new())
    }

    /// Run the pipeline with event reporting and cancellation
    pub fn run_with_events(
        &self,
        request: BatchRequest,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<DedupRun, DedupError> {
        let result = self.execute(request, events, cancel);

        match &result {
            Err(DedupError::Cancelled) => events.send(Event::Pipeline(PipelineEvent::Cancelled)),
            Err(error) => events.send(Event::Pipeline(PipelineEvent::Error {
                message: error.to_string(),
            })),
            Ok(_) => {}
        }

        result
    }

    fn execute(
        &self,
        request: BatchRequest,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<DedupRun, DedupError> {
        let start_time = Instant::now();
        let batch = request.validate(self.config.max_batch_size)?;
        let total = batch.len();

        let span = tracing::info_span!("dedup", request_id = %batch.request_id, photos = total);
        let _guard = span.enter();

        events.send(Event::Pipeline(PipelineEvent::Started {
            request_id: batch.request_id,
            total_photos: total,
        }));

        // Dropped on every exit path, so cancelled and failed runs are reclaimed too
        let scratch = if self.config.stage_to_disk {
            Some(ScratchSpace::create(
                self.config.scratch_root.as_deref(),
                batch.request_id,
            )?)
        } else {
            None
        };

        // Phase 1: Hashing
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Hashing,
        }));
        events.send(Event::Hash(HashEvent::Started {
            total_photos: total,
        }));

        let context = HashContext {
            scratch: scratch.as_ref(),
            events,
            cancel,
            completed: AtomicUsize::new(0),
            total,
        };

        let outcomes = if total >= self.config.parallel_min_batch {
            self.pool.install(|| {
                batch
                    .records
                    .par_iter()
                    .map(|record| self.process_record(record, &context))
                    .collect::<Result<Vec<_>, HashError>>()
            })?
        } else {
            batch
                .records
                .iter()
                .map(|record| self.process_record(record, &context))
                .collect::<Result<Vec<_>, HashError>>()?
        };

        if cancel.is_cancelled() {
            tracing::info!("run cancelled during hashing");
            return Err(DedupError::Cancelled);
        }

        let mut images = HashMap::with_capacity(outcomes.len());
        let mut fingerprints = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();

        for outcome in outcomes {
            match outcome {
                ImageOutcome::Hashed {
                    loaded,
                    fingerprint,
                } => {
                    fingerprints.push((loaded.record.index, fingerprint));
                    images.insert(loaded.record.index, loaded);
                }
                ImageOutcome::Failed(failure) => failures.push(failure),
                ImageOutcome::Skipped => {}
            }
        }

        events.send(Event::Hash(HashEvent::Completed {
            total_hashed: fingerprints.len(),
            failed: failures.len(),
        }));

        if fingerprints.is_empty() {
            return Err(DedupError::NoValidImages {
                total,
                failed: failures.len(),
            });
        }

        // Phase 2: Comparing
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Comparing,
        }));
        tracing::debug!(strategy = %self.strategy.description(), "comparing fingerprints");
        let edges = build_adjacency_with_events(&fingerprints, &self.strategy, events);
        tracing::debug!(edges = edges.len(), "adjacency built");

        if cancel.is_cancelled() {
            return Err(DedupError::Cancelled);
        }

        // Phase 3: Grouping
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Grouping,
        }));
        let indices: Vec<usize> = fingerprints.iter().map(|(index, _)| *index).collect();
        let clustering = TransitiveGrouper::new().assemble(&indices, &edges);

        // Phase 4: Reporting
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Reporting,
        }));
        let report = materialize(&clustering, &images)?;

        if let Some(scratch) = scratch {
            if let Err(e) = scratch.close() {
                tracing::warn!("Failed to remove scratch space: {}", e);
            }
        }

        let duration_ms = start_time.elapsed().as_millis() as u64;
        let summary = BatchSummary {
            total,
            hashed: fingerprints.len(),
            failures,
            duration_ms,
        };

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_photos: total,
                hashed_photos: summary.hashed,
                failed_photos: summary.failures.len(),
                duplicate_groups: report.groups.len(),
                unmatched_photos: report.others.len(),
                duration_ms,
            },
        }));

        tracing::info!(
            groups = report.groups.len(),
            failed = summary.failures.len(),
            duration_ms,
            "dedup run finished"
        );

        Ok(DedupRun {
            request_id: batch.request_id,
            outcome: DedupOutcome::from_report(report),
            summary,
        })
    }

    /// Load, decode and fingerprint one record.
    ///
    /// Load and decode failures are recorded on the outcome. Only a fault in
    /// the hasher itself is returned as an error.
    fn process_record(
        &self,
        record: &ImageRecord,
        context: &HashContext<'_>,
    ) -> Result<ImageOutcome, HashError> {
        if context.cancel.is_cancelled() {
            return Ok(ImageOutcome::Skipped);
        }

        let outcome = match self.load_and_decode(record, context.scratch, context.cancel) {
            Ok((loaded, image)) => {
                let fingerprint = self.hasher.hash_image(&image)?;
                ImageOutcome::Hashed {
                    loaded,
                    fingerprint,
                }
            }
            Err(ImageError::Fetch(FetchError::Cancelled { .. })) => {
                return Ok(ImageOutcome::Skipped);
            }
            Err(error) => {
                tracing::warn!(
                    index = record.index,
                    name = %record.display_name,
                    "Skipping photo: {}",
                    error
                );
                context.events.send(Event::Hash(HashEvent::Error {
                    index: record.index,
                    name: record.display_name.clone(),
                    message: error.to_string(),
                }));
                ImageOutcome::Failed(ImageFailure {
                    index: record.index,
                    name: record.display_name.clone(),
                    reason: error.to_string(),
                })
            }
        };

        let completed = context.completed.fetch_add(1, Ordering::SeqCst) + 1;
        context
            .events
            .send(Event::Hash(HashEvent::Progress(HashProgress {
                completed,
                total: context.total,
                index: record.index,
            })));

        Ok(outcome)
    }

    fn load_and_decode(
        &self,
        record: &ImageRecord,
        scratch: Option<&ScratchSpace>,
        cancel: &CancellationToken,
    ) -> Result<(LoadedImage, DynamicImage), ImageError> {
        let (loaded, bytes) = load_record(record, self.fetcher.as_ref(), scratch, cancel)?;
        let image = FastDecoder::decode_bytes(&bytes)?;
        Ok((loaded, image))
    }
}
