//! The acquisition loop: fixed-cadence capture, inference, classification,
//! and label publication.
//!
//! One spawned task owns the camera and the landmark source for its whole
//! life. Every interval tick runs at most one cycle; a cycle that outlives
//! its tick simply causes the missed ticks to be skipped, so cycles never
//! overlap and a slow backend cannot queue up work. Results go out over
//! `watch` channels: observers always see the latest label and state, never
//! a backlog.
//!
//! Teardown preempts everything through the shutdown channel. A cycle still
//! in flight is dropped where it stands, which cancels any pending remote
//! request, and its result is never published.

use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::camera::FrameSource;
use crate::classifier::{classify_hand, ClassifierConfig, Gesture};
use crate::config::PipelineConfig;
use crate::source::{LandmarkSource, Observation};

/// Lifecycle states of the acquisition loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Constructed but not yet started
    Idle,
    /// Warming up the landmark source
    Initializing,
    /// Ticking at the configured cadence
    Running,
    /// The last cycle failed; the loop keeps ticking
    Degraded,
    /// Torn down; terminal
    Stopped,
}

impl PipelineState {
    /// Whether the loop has finished for good
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped)
    }
}

/// The assembled acquisition loop, ready to start
pub struct Pipeline<F, S> {
    camera: F,
    source: S,
    classifier: ClassifierConfig,
    timing: PipelineConfig,
}

/// Observer and teardown handle for a started pipeline
pub struct PipelineHandle {
    label_rx: watch::Receiver<Gesture>,
    state_rx: watch::Receiver<PipelineState>,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PipelineHandle {
    /// Subscribe to published gesture labels
    #[must_use]
    pub fn labels(&self) -> watch::Receiver<Gesture> {
        self.label_rx.clone()
    }

    /// Subscribe to pipeline state transitions
    #[must_use]
    pub fn state(&self) -> watch::Receiver<PipelineState> {
        self.state_rx.clone()
    }

    /// Stop the loop and wait for it to release its resources.
    ///
    /// Safe at any point in the lifecycle: a cycle still in flight is
    /// abandoned and its late result discarded.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }
}

impl<F, S> Pipeline<F, S>
where
    F: FrameSource + 'static,
    S: LandmarkSource + 'static,
{
    /// Assemble a pipeline from an opened camera and a landmark source
    pub fn new(camera: F, source: S, classifier: ClassifierConfig, timing: PipelineConfig) -> Self {
        Self {
            camera,
            source,
            classifier,
            timing,
        }
    }

    /// Spawn the acquisition loop task and return its handle
    #[must_use]
    pub fn start(self) -> PipelineHandle {
        let (label_tx, label_rx) = watch::channel(Gesture::NoHand);
        let (state_tx, state_rx) = watch::channel(PipelineState::Idle);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(self.run(label_tx, state_tx, shutdown_rx));

        PipelineHandle {
            label_rx,
            state_rx,
            shutdown_tx,
            task,
        }
    }

    async fn run(
        mut self,
        label_tx: watch::Sender<Gesture>,
        state_tx: watch::Sender<PipelineState>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        let _ = state_tx.send(PipelineState::Initializing);
        info!("Warming up {} landmark source", self.source.name());

        tokio::select! {
            biased;
            _ = shutdown_rx.changed() => {
                info!("Shutdown requested during initialization");
                let _ = state_tx.send(PipelineState::Stopped);
                return;
            }
            result = self.source.warm_up() => {
                if let Err(e) = result {
                    // Persistent degradation: cycles will report no hand
                    warn!("Landmark source warm-up failed: {e}; continuing without it");
                }
            }
        }

        let mut ticker = interval(Duration::from_millis(self.timing.interval_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let _ = state_tx.send(PipelineState::Running);
        info!(
            "Acquisition loop running, one cycle every {} ms",
            self.timing.interval_ms
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => break,
                _ = ticker.tick() => {
                    // Shutdown also preempts the cycle itself; a dropped
                    // cycle abandons its in-flight inference call.
                    let label = tokio::select! {
                        biased;
                        _ = shutdown_rx.changed() => break,
                        label = self.run_cycle() => label,
                    };

                    let failed = matches!(label, Gesture::Error(_));
                    let previous = *state_tx.borrow();
                    if failed && previous != PipelineState::Degraded {
                        warn!("Cycle failed ({label}), pipeline degraded");
                        let _ = state_tx.send(PipelineState::Degraded);
                    } else if !failed && previous == PipelineState::Degraded {
                        info!("Pipeline recovered");
                        let _ = state_tx.send(PipelineState::Running);
                    }

                    debug!("Cycle result: {label}");
                    let _ = label_tx.send(label);
                }
            }
        }

        let _ = state_tx.send(PipelineState::Stopped);
        info!("Acquisition loop stopped");
        // Dropping self releases the camera
    }

    /// One capture-to-label cycle. Failures fold into an error label so the
    /// loop itself never has to handle a cycle error.
    async fn run_cycle(&mut self) -> Gesture {
        let frame = match self.camera.grab_frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Frame capture failed: {e}");
                return Gesture::Error(e.to_string());
            }
        };

        let budget = Duration::from_millis(self.timing.inference_timeout_ms);
        let observation = match timeout(budget, self.source.process_frame(frame)).await {
            Ok(Ok(observation)) => observation,
            Ok(Err(e)) => {
                warn!("Inference failed: {e}");
                return Gesture::Error(e.to_string());
            }
            Err(_) => {
                warn!(
                    "Inference timed out after {} ms",
                    self.timing.inference_timeout_ms
                );
                return Gesture::Error("Inference timed out".to_string());
            }
        };

        match observation {
            Observation::Hand(hand) => classify_hand(&hand, &self.classifier),
            Observation::Label(label) => label,
            Observation::NoHand => Gesture::NoHand,
        }
    }
}
