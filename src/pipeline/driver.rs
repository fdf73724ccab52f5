use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::{
    config::OutputConfig,
    error::{FailureAction, PipelineError, Result},
    overlay::{Compositor, EdgeExtractor},
    video::{
        sink::{FfmpegSink, VideoSink},
        source::PairSource,
        types::{Frame, FrameMaskPair, OutputSpec, RunSummary},
    },
};

/// Shared flag a caller may set to request cooperative cancellation.
///
/// Consulted once per pair, at the top of the streaming loop, before any
/// decoding starts for that pair. A cancelled run finalizes the sink and
/// aborts with [`PipelineError::Cancelled`].
pub type CancelFlag = Arc<AtomicBool>;

/// Synchronous notification sink for per-pair progress.
///
/// Invoked exactly once per pair visited while streaming (written or
/// skipped), in order, with the 1-based cumulative count of pairs
/// processed so far. The call blocks the pipeline, so implementations
/// should return quickly.
pub trait ProgressSink {
    fn pair_processed(&mut self, processed: usize);
}

impl<F: FnMut(usize)> ProgressSink for F {
    fn pair_processed(&mut self, processed: usize) {
        self(processed)
    }
}

/// Counters scoped to one run; discarded on completion.
#[derive(Debug, Default)]
struct RunState {
    written: usize,
    skipped: usize,
}

/// Drives one frame/mask sequence through edge extraction, compositing and
/// encoding into a single output video
///
/// A run moves through validation (non-empty input), opening (first-frame
/// decode fixes the output geometry and opens the sink), streaming (one
/// pair at a time, in order), and finalization (the sink is closed on
/// every exit path). Per-pair decode failures are skipped and counted;
/// structural failures abort the run. One driver run exclusively owns its
/// destination file; concurrent runs against the same destination must be
/// serialized by the caller.
pub struct PipelineDriver {
    config: OutputConfig,
    cancel: Option<CancelFlag>,
}

impl PipelineDriver {
    /// Create a new driver with the given output settings
    pub fn new(config: OutputConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Attach a cancellation flag checked before each pair is decoded
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Run the pipeline against `source`, encoding into `destination`.
    ///
    /// Returns the final written/skipped counts on completion. On abort the
    /// cause is returned with any partially written container left on disk;
    /// callers wanting transactional cleanup must delete it themselves.
    pub fn run<P: AsRef<Path>>(
        &self,
        source: &PairSource,
        destination: P,
        progress: &mut dyn ProgressSink,
    ) -> Result<RunSummary> {
        let codec = self.config.codec.clone();
        let quality = self.config.quality;
        self.run_with_sink(source, destination, progress, |spec| {
            FfmpegSink::open(spec.clone(), &codec, quality)
                .map(|sink| Box::new(sink) as Box<dyn VideoSink>)
        })
    }

    /// Run the pipeline with a caller-supplied sink.
    ///
    /// `open_sink` is invoked once, after the first frame has been decoded
    /// and the output geometry is known. Validation failures abort before
    /// it is called, so no output file is created for an empty or
    /// undecodable-first-frame input.
    pub fn run_with_sink<P, F>(
        &self,
        source: &PairSource,
        destination: P,
        progress: &mut dyn ProgressSink,
        open_sink: F,
    ) -> Result<RunSummary>
    where
        P: AsRef<Path>,
        F: FnOnce(&OutputSpec) -> Result<Box<dyn VideoSink>>,
    {
        let destination = destination.as_ref();

        // Validating: an empty frame list aborts before any I/O side effect.
        if source.is_empty() {
            return Err(PipelineError::EmptyInput.into());
        }

        // Opening: the first frame fixes the geometry for the whole run.
        let first = Frame::decode(&source.frames()[0])?;
        let spec = OutputSpec {
            destination: destination.to_path_buf(),
            fps: self.config.fps,
            width: first.width(),
            height: first.height(),
        };

        info!(
            "Processing {} pairs into {} ({}x{} @ {} fps)",
            source.len(),
            spec.destination.display(),
            spec.width,
            spec.height,
            spec.fps
        );

        let mut sink = open_sink(&spec)?;

        // Streaming, then Finalizing: the sink is closed whether streaming
        // completed or aborted, so no encoder resource dangles.
        let outcome = self.stream(source, &spec, sink.as_mut(), progress);
        let close_result = sink.close();

        match outcome {
            Ok(summary) => {
                close_result?;
                info!(
                    "Run complete: {} written, {} skipped",
                    summary.written, summary.skipped
                );
                Ok(summary)
            }
            Err(abort) => {
                if let Err(close_err) = close_result {
                    warn!("Sink close after abort also failed: {}", close_err);
                }
                Err(abort)
            }
        }
    }

    /// Streaming phase: one pair fully through decode, extract, composite
    /// and encode before advancing to the next.
    fn stream(
        &self,
        source: &PairSource,
        spec: &OutputSpec,
        sink: &mut dyn VideoSink,
        progress: &mut dyn ProgressSink,
    ) -> Result<RunSummary> {
        let mut state = RunState::default();
        let frame_count = source.frames().len();

        for index in 0..frame_count {
            if self.is_cancelled() {
                warn!("Cancellation requested; aborting before pair {}", index);
                return Err(PipelineError::Cancelled { index }.into());
            }

            // Indexing the mask list past its end is an alignment fault,
            // not a skip: the sequences no longer describe the same video.
            let pair = source.pair(index).ok_or(PipelineError::Alignment {
                index,
                frames: frame_count,
                masks: source.masks().len(),
            })?;

            match self.process_pair(&pair, spec, sink) {
                Ok(()) => {
                    state.written += 1;
                    debug!("Encoded pair {}", index);
                }
                Err(err) => match err.failure_action() {
                    FailureAction::SkipPair => {
                        state.skipped += 1;
                        warn!(
                            "Skipping pair {} ({} / {}): {}",
                            index,
                            pair.frame.display(),
                            pair.mask.display(),
                            err
                        );
                    }
                    FailureAction::Abort => {
                        error!("Aborting at pair {}: {}", index, err);
                        return Err(err);
                    }
                },
            }

            progress.pair_processed(index + 1);
        }

        Ok(RunSummary {
            written: state.written,
            skipped: state.skipped,
        })
    }

    /// Process a single pair end to end. Any error is classified by the
    /// caller through [`FailureAction`].
    fn process_pair(
        &self,
        pair: &FrameMaskPair,
        spec: &OutputSpec,
        sink: &mut dyn VideoSink,
    ) -> Result<()> {
        // Decode both independently so either side's corruption is caught.
        let frame = Frame::decode(&pair.frame);
        let mask = Frame::decode(&pair.mask);
        let (frame, mask) = (frame?, mask?);

        if frame.width() != spec.width || frame.height() != spec.height {
            return Err(PipelineError::DimensionMismatch {
                expected_width: spec.width,
                expected_height: spec.height,
                actual_width: frame.width(),
                actual_height: frame.height(),
            }
            .into());
        }

        let edges = EdgeExtractor::extract(&mask);
        let composed = Compositor::composite(&frame, &edges)?;
        sink.write(&composed)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }
}
