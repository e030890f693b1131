//! Remote landmark source: ships JPEG frames to an HTTP inference service.
//!
//! The service runs detection and classification itself and replies with a
//! finished label, so this backend returns [`Observation::Label`] and the
//! acquisition loop skips local feature extraction entirely.

use std::future::Future;

use log::{debug, info, warn};
use opencv::core::Mat;
use serde::Deserialize;

use crate::classifier::Gesture;
use crate::constants::JPEG_QUALITY;
use crate::source::{LandmarkSource, Observation};
use crate::utils::image_conversion::encode_jpeg_base64;
use crate::{Error, Result};

/// Response shape of the gesture recognition service.
///
/// Failures come back as `{ "error": ..., "gesture": "Error" }` with a 200
/// status, so errors are part of the body, not the HTTP status.
#[derive(Debug, Deserialize)]
struct RemoteResponse {
    gesture: String,
    meaning: Option<String>,
    error: Option<String>,
}

/// HTTP client for a remote gesture recognition endpoint
pub struct RemoteSource {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteSource {
    /// Create a client for the given endpoint URL
    #[must_use]
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

impl LandmarkSource for RemoteSource {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn warm_up(&mut self) -> impl Future<Output = Result<()>> + Send {
        async move {
            // No model to load; the first request finds out whether the
            // service is reachable
            info!("Remote inference endpoint: {}", self.endpoint);
            Ok(())
        }
    }

    fn process_frame(&mut self, frame: Mat) -> impl Future<Output = Result<Observation>> + Send {
        async move {
            let payload = encode_jpeg_base64(&frame, JPEG_QUALITY)?;
            drop(frame);

            let response = self
                .client
                .post(&self.endpoint)
                .json(&serde_json::json!({ "image": payload }))
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(Error::RemoteError(format!(
                    "Inference endpoint returned {status}"
                )));
            }

            let parsed: RemoteResponse = response.json().await?;
            Ok(Observation::Label(label_from_response(parsed)))
        }
    }
}

/// Map a service response onto a gesture label
fn label_from_response(response: RemoteResponse) -> Gesture {
    if let Some(message) = response.error {
        warn!("Inference service reported an error: {message}");
        return Gesture::Error(message);
    }
    if response.gesture == "Error" {
        return Gesture::Error("Failed to process image".to_string());
    }

    let gesture = Gesture::from_label(&response.gesture);
    if let Some(meaning) = response.meaning {
        debug!("{gesture}: {meaning}");
    }
    gesture
}
