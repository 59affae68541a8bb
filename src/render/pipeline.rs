//! Background rendering with sequence-numbered results.
//!
//! Every render request gets a sequence number from [`RenderState::issue`].
//! Results come back through [`RenderPipeline::drain`] and are applied with
//! [`RenderState::apply`], which drops any result that is not for the most
//! recently issued request. A slow render of old text can therefore never
//! overwrite the output of a newer one.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::{DIAGRAM_ELEMENT_ID, DiagramRenderer, RenderConfig, RenderError};

/// Failure records kept for the diagnostics view.
const MAX_FAILURE_RECORDS: usize = 64;

/// Layout recursion depth grows with subgraph nesting.
const RENDER_STACK_SIZE: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub seq: u64,
    pub source: String,
    pub config: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    pub seq: u64,
    pub result: Result<String, RenderError>,
    pub elapsed: Duration,
}

/// One entry in the render diagnostics channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFailure {
    pub seq: u64,
    pub error: RenderError,
}

/// What [`RenderState::apply`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The SVG was replaced.
    Rendered,
    /// The render failed; the previous SVG stays.
    Failed,
    /// A newer request exists; the outcome was dropped.
    Stale,
}

/// The displayed render result and its bookkeeping.
#[derive(Debug, Default, Clone)]
pub struct RenderState {
    latest_issued: u64,
    last_resolved: u64,
    svg: Option<String>,
    svg_seq: u64,
    last_error: Option<RenderError>,
    failures: VecDeque<RenderFailure>,
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next sequence number; it becomes the only one whose
    /// outcome will be accepted.
    pub const fn issue(&mut self) -> u64 {
        self.latest_issued += 1;
        self.latest_issued
    }

    pub const fn latest_issued(&self) -> u64 {
        self.latest_issued
    }

    /// True while the latest request has not resolved.
    pub const fn is_pending(&self) -> bool {
        self.last_resolved < self.latest_issued
    }

    pub fn apply(&mut self, outcome: RenderOutcome) -> Applied {
        if outcome.seq != self.latest_issued {
            tracing::debug!(
                seq = outcome.seq,
                latest = self.latest_issued,
                "dropping stale render result"
            );
            crate::debug_log::log_event(
                "render.stale",
                format!("seq={} latest={}", outcome.seq, self.latest_issued),
            );
            return Applied::Stale;
        }
        self.last_resolved = outcome.seq;
        match outcome.result {
            Ok(svg) => {
                crate::debug_log::log_event(
                    "render.ok",
                    format!(
                        "seq={} bytes={} ms={:.3}",
                        outcome.seq,
                        svg.len(),
                        outcome.elapsed.as_secs_f64() * 1000.0
                    ),
                );
                self.svg = Some(svg);
                self.svg_seq = outcome.seq;
                self.last_error = None;
                Applied::Rendered
            }
            Err(error) => {
                tracing::warn!(seq = outcome.seq, %error, "failed to render diagram");
                crate::debug_log::log_event(
                    "render.error",
                    format!("seq={} err={error}", outcome.seq),
                );
                if self.failures.len() == MAX_FAILURE_RECORDS {
                    self.failures.pop_front();
                }
                self.failures.push_back(RenderFailure {
                    seq: outcome.seq,
                    error: error.clone(),
                });
                self.last_error = Some(error);
                Applied::Failed
            }
        }
    }

    /// Markup of the last successful render.
    pub fn svg(&self) -> Option<&str> {
        self.svg.as_deref()
    }

    /// Sequence number of the request that produced [`Self::svg`].
    pub const fn svg_seq(&self) -> u64 {
        self.svg_seq
    }

    /// Error from the latest resolved request, if it failed.
    pub const fn last_error(&self) -> Option<&RenderError> {
        self.last_error.as_ref()
    }

    /// Recorded failures, oldest first.
    pub const fn failures(&self) -> &VecDeque<RenderFailure> {
        &self.failures
    }
}

/// Runs a [`DiagramRenderer`] on a dedicated thread.
///
/// Requests queued behind a running render are coalesced: only the newest
/// one is rendered, since older results would be dropped as stale anyway.
pub struct RenderPipeline {
    requests: Sender<RenderRequest>,
    outcomes: Receiver<RenderOutcome>,
    _worker: JoinHandle<()>,
}

impl RenderPipeline {
    /// Start the worker thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn(renderer: Arc<dyn DiagramRenderer>) -> std::io::Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<RenderRequest>();
        let (outcome_tx, outcome_rx) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("render".to_string())
            .stack_size(RENDER_STACK_SIZE)
            .spawn(move || {
                while let Ok(mut request) = request_rx.recv() {
                    while let Ok(newer) = request_rx.try_recv() {
                        request = newer;
                    }
                    let started = Instant::now();
                    let result = render_guarded(renderer.as_ref(), &request);
                    let outcome = RenderOutcome {
                        seq: request.seq,
                        result,
                        elapsed: started.elapsed(),
                    };
                    if outcome_tx.send(outcome).is_err() {
                        break;
                    }
                }
            })?;
        Ok(Self {
            requests: request_tx,
            outcomes: outcome_rx,
            _worker: worker,
        })
    }

    /// Queue a request.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::WorkerUnavailable`] when the worker has stopped.
    pub fn submit(&self, request: RenderRequest) -> Result<(), RenderError> {
        crate::debug_log::log_event(
            "render.submit",
            format!("seq={} bytes={}", request.seq, request.source.len()),
        );
        self.requests
            .send(request)
            .map_err(|_| RenderError::WorkerUnavailable)
    }

    /// All outcomes that have completed so far, without blocking.
    pub fn drain(&self) -> Vec<RenderOutcome> {
        self.outcomes.try_iter().collect()
    }

    /// Block until the next outcome or the timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<RenderOutcome> {
        match self.outcomes.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// Run one render, turning a renderer panic into a failed result so the
/// worker keeps serving requests.
fn render_guarded(
    renderer: &dyn DiagramRenderer,
    request: &RenderRequest,
) -> Result<String, RenderError> {
    // The terminal restore hook must not run for a panic we recover from.
    let prev_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        renderer.render(DIAGRAM_ELEMENT_ID, &request.source, &request.config)
    }));
    panic::set_hook(prev_hook);

    result.unwrap_or_else(|payload| {
        let message = panic_message(payload.as_ref());
        tracing::error!(seq = request.seq, %message, "renderer panicked");
        Err(RenderError::Panicked(message))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

impl std::fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipeline").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn ok(seq: u64, svg: &str) -> RenderOutcome {
        RenderOutcome {
            seq,
            result: Ok(svg.to_string()),
            elapsed: Duration::ZERO,
        }
    }

    fn failed(seq: u64) -> RenderOutcome {
        RenderOutcome {
            seq,
            result: Err(RenderError::Syntax("bad arrow".to_string())),
            elapsed: Duration::ZERO,
        }
    }

    /// Echoes the source back wrapped in an svg tag; "!" sources fail.
    struct EchoRenderer {
        calls: Mutex<Vec<String>>,
    }

    impl DiagramRenderer for EchoRenderer {
        fn render(
            &self,
            element_id: &str,
            source: &str,
            _config: &RenderConfig,
        ) -> Result<String, RenderError> {
            self.calls.lock().unwrap().push(source.to_string());
            if source.starts_with('!') {
                return Err(RenderError::Syntax(source.to_string()));
            }
            Ok(format!("<svg id=\"{element_id}\">{source}</svg>"))
        }
    }

    #[test]
    fn test_new_state_is_empty() {
        let state = RenderState::new();
        assert!(state.svg().is_none());
        assert!(!state.is_pending());
        assert!(state.failures().is_empty());
    }

    #[test]
    fn test_issue_is_monotonic() {
        let mut state = RenderState::new();
        assert_eq!(state.issue(), 1);
        assert_eq!(state.issue(), 2);
        assert_eq!(state.latest_issued(), 2);
        assert!(state.is_pending());
    }

    #[test]
    fn test_successful_outcome_replaces_svg() {
        let mut state = RenderState::new();
        let seq = state.issue();
        assert_eq!(state.apply(ok(seq, "<svg>a</svg>")), Applied::Rendered);
        assert_eq!(state.svg(), Some("<svg>a</svg>"));
        assert!(!state.is_pending());
    }

    #[test]
    fn test_failure_keeps_previous_svg_and_records_once() {
        let mut state = RenderState::new();
        let first = state.issue();
        state.apply(ok(first, "<svg>good</svg>"));

        let second = state.issue();
        assert_eq!(state.apply(failed(second)), Applied::Failed);
        assert_eq!(state.svg(), Some("<svg>good</svg>"));
        assert_eq!(state.failures().len(), 1);
        assert_eq!(state.failures()[0].seq, second);
        assert!(state.last_error().is_some());
    }

    #[test]
    fn test_stale_outcome_is_dropped() {
        let mut state = RenderState::new();
        let old = state.issue();
        let new = state.issue();
        assert_eq!(state.apply(ok(new, "<svg>new</svg>")), Applied::Rendered);
        assert_eq!(state.apply(ok(old, "<svg>old</svg>")), Applied::Stale);
        assert_eq!(state.svg(), Some("<svg>new</svg>"));
    }

    #[test]
    fn test_stale_failure_is_not_recorded() {
        let mut state = RenderState::new();
        let old = state.issue();
        state.issue();
        assert_eq!(state.apply(failed(old)), Applied::Stale);
        assert!(state.failures().is_empty());
    }

    #[test]
    fn test_success_clears_last_error() {
        let mut state = RenderState::new();
        let seq = state.issue();
        state.apply(failed(seq));
        let seq = state.issue();
        state.apply(ok(seq, "<svg/>"));
        assert!(state.last_error().is_none());
        assert_eq!(state.failures().len(), 1);
    }

    #[test]
    fn test_failure_records_are_bounded() {
        let mut state = RenderState::new();
        for _ in 0..(MAX_FAILURE_RECORDS + 10) {
            let seq = state.issue();
            state.apply(failed(seq));
        }
        assert_eq!(state.failures().len(), MAX_FAILURE_RECORDS);
        assert_eq!(state.failures()[0].seq, 11);
    }

    #[test]
    fn test_pipeline_renders_on_worker() {
        let renderer = Arc::new(EchoRenderer {
            calls: Mutex::new(Vec::new()),
        });
        let pipeline = RenderPipeline::spawn(renderer).unwrap();
        let mut state = RenderState::new();
        let seq = state.issue();
        pipeline.submit(RenderRequest {
            seq,
            source: "graph TD".to_string(),
            config: RenderConfig::default(),
        })
        .unwrap();

        let outcome = pipeline.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(state.apply(outcome), Applied::Rendered);
        assert_eq!(
            state.svg(),
            Some("<svg id=\"mermaid-diagram\">graph TD</svg>")
        );
    }

    #[test]
    fn test_pipeline_last_submitted_wins() {
        let renderer = Arc::new(EchoRenderer {
            calls: Mutex::new(Vec::new()),
        });
        let pipeline = RenderPipeline::spawn(renderer).unwrap();
        let mut state = RenderState::new();
        for text in ["a", "ab", "abc"] {
            let seq = state.issue();
            pipeline.submit(RenderRequest {
                seq,
                source: text.to_string(),
                config: RenderConfig::default(),
            })
            .unwrap();
        }

        let deadline = Instant::now() + Duration::from_secs(5);
        while state.is_pending() && Instant::now() < deadline {
            if let Some(outcome) = pipeline.recv_timeout(Duration::from_millis(50)) {
                state.apply(outcome);
            }
        }
        assert_eq!(state.svg(), Some("<svg id=\"mermaid-diagram\">abc</svg>"));
    }

    /// Panics on sources starting with "!", echoes everything else.
    struct PanickingRenderer;

    impl DiagramRenderer for PanickingRenderer {
        fn render(
            &self,
            _element_id: &str,
            source: &str,
            _config: &RenderConfig,
        ) -> Result<String, RenderError> {
            assert!(!source.starts_with('!'), "layout overflow");
            Ok(format!("<svg>{source}</svg>"))
        }
    }

    #[test]
    fn test_renderer_panic_is_recorded_and_worker_survives() {
        let pipeline = RenderPipeline::spawn(Arc::new(PanickingRenderer)).unwrap();
        let mut state = RenderState::new();

        let seq = state.issue();
        pipeline.submit(RenderRequest {
            seq,
            source: "!bad".to_string(),
            config: RenderConfig::default(),
        })
        .unwrap();
        let outcome = pipeline.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(
            outcome.result,
            Err(RenderError::Panicked(ref msg)) if msg.contains("layout overflow")
        ));
        assert_eq!(state.apply(outcome), Applied::Failed);
        assert_eq!(state.failures().len(), 1);

        let seq = state.issue();
        pipeline.submit(RenderRequest {
            seq,
            source: "graph".to_string(),
            config: RenderConfig::default(),
        })
        .unwrap();
        let outcome = pipeline.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(state.apply(outcome), Applied::Rendered);
        assert_eq!(state.svg(), Some("<svg>graph</svg>"));
        assert_eq!(state.failures().len(), 1);
    }

    #[test]
    fn test_submit_to_stopped_worker_is_unavailable() {
        let (requests, request_rx) = mpsc::channel();
        let (_outcome_tx, outcomes) = mpsc::channel();
        drop(request_rx);
        let pipeline = RenderPipeline {
            requests,
            outcomes,
            _worker: thread::spawn(|| {}),
        };
        let err = pipeline
            .submit(RenderRequest {
                seq: 1,
                source: "graph TD".to_string(),
                config: RenderConfig::default(),
            })
            .unwrap_err();
        assert_eq!(err, RenderError::WorkerUnavailable);
    }
}
