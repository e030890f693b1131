//! Landmark source backends.
//!
//! A landmark source turns one captured frame into an [`Observation`]: hand
//! keypoints to classify locally, an already-classified label from a remote
//! service, or nothing. The acquisition loop drives whichever backend the
//! configuration selected through the single [`LandmarkSource`] seam and
//! never branches on the backend itself.

pub mod local;
pub mod remote;

pub use local::LocalSource;
pub use remote::RemoteSource;

use std::future::Future;

use opencv::core::Mat;

use crate::classifier::Gesture;
use crate::landmarks::HandLandmarks;
use crate::Result;

/// What one acquisition cycle obtained from the backend
#[derive(Debug, Clone)]
pub enum Observation {
    /// Keypoints for one detected hand, in frame-normalized coordinates
    Hand(HandLandmarks),
    /// A label classified on the remote side; the loop skips extraction
    Label(Gesture),
    /// No hand was found in the frame
    NoHand,
}

/// A provider of per-frame hand observations.
///
/// `warm_up` runs once before the loop starts ticking; a failure there is a
/// persistent degraded condition, not a reason to stop the loop. Each
/// `process_frame` call owns its frame for the duration of one cycle.
pub trait LandmarkSource: Send {
    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// One-time asynchronous initialization (model load for the local
    /// backend)
    fn warm_up(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Turn one captured frame into an observation
    fn process_frame(&mut self, frame: Mat) -> impl Future<Output = Result<Observation>> + Send;
}

/// The configured backend, built by [`crate::config::Config::create_source`]
pub enum GestureSource {
    /// On-device ONNX detector pair
    Local(LocalSource),
    /// HTTP inference service client
    Remote(RemoteSource),
}

impl LandmarkSource for GestureSource {
    fn name(&self) -> &'static str {
        match self {
            Self::Local(source) => source.name(),
            Self::Remote(source) => source.name(),
        }
    }

    fn warm_up(&mut self) -> impl Future<Output = Result<()>> + Send {
        async move {
            match self {
                Self::Local(source) => source.warm_up().await,
                Self::Remote(source) => source.warm_up().await,
            }
        }
    }

    fn process_frame(&mut self, frame: Mat) -> impl Future<Output = Result<Observation>> + Send {
        async move {
            match self {
                Self::Local(source) => source.process_frame(frame).await,
                Self::Remote(source) => source.process_frame(frame).await,
            }
        }
    }
}
