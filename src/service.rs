//! Caller-facing request surface.
//!
//! [`MaskService`] wraps a [`MaskingEngine`] with the response shape a UI
//! layer consumes: a success/failure envelope with a user-facing message.
//! It also hosts the optional [`FaultInjection`] hook used to exercise a
//! caller's error and loading states. The engine itself never retries,
//! sleeps or fails on purpose.

use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

use crate::engine::{MaskingEngine, MaskingStyle};
use crate::error::Error;
use crate::region::DetectionSummary;
use crate::synth::RegionSynthesizer;

/// Message returned with every successful response.
pub const SUCCESS_MESSAGE: &str = "Image processed successfully";
/// Message for input that could not be decoded.
pub const UPLOAD_FAILED_MESSAGE: &str =
    "Failed to upload image. Please check your file and try again.";
/// Message for any other processing failure.
pub const PROCESSING_FAILED_MESSAGE: &str = "Failed to process image. Please try again.";
/// Message for an injected fault.
pub const UNAVAILABLE_MESSAGE: &str = "API service temporarily unavailable. Please try again.";

/// Simulated latency and failure for exercising callers.
#[derive(Debug, Clone, PartialEq)]
pub struct FaultInjection {
    /// Probability in `[0, 1]` that a request fails outright.
    pub failure_rate: f64,
    /// Shortest artificial delay.
    pub min_delay: Duration,
    /// Longest artificial delay.
    pub max_delay: Duration,
}

impl FaultInjection {
    /// No delay, no failures.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            failure_rate: 0.0,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// 10% failures and 1.5-3.5 s of latency per request.
    #[must_use]
    pub fn simulated() -> Self {
        Self {
            failure_rate: 0.1,
            min_delay: Duration::from_millis(1500),
            max_delay: Duration::from_millis(3500),
        }
    }

    fn delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        let span = self.max_delay - self.min_delay;
        self.min_delay + span.mul_f64(rng.random::<f64>())
    }
}

impl Default for FaultInjection {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Outcome of [`MaskService::mask_image`].
#[derive(Debug, Clone, PartialEq)]
pub enum MaskResponse {
    /// The image was masked.
    Success {
        /// Encoded masked image.
        masked_image: Vec<u8>,
        /// Per-category count of masked regions.
        detected_pii: DetectionSummary,
        /// User-facing status message.
        message: String,
        /// Style that was applied.
        style: MaskingStyle,
    },
    /// The request failed.
    Failure {
        /// User-facing error message.
        message: String,
    },
}

impl MaskResponse {
    /// Whether the request succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// User-facing message of either variant.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Failure { message } => message,
        }
    }
}

/// Liveness probe payload.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Always `"healthy"`.
    pub status: &'static str,
    /// When the probe ran.
    pub timestamp: DateTime<Utc>,
}

/// Report that the service is alive.
#[must_use]
pub fn check_health() -> HealthStatus {
    HealthStatus {
        status: "healthy",
        timestamp: Utc::now(),
    }
}

/// Request-level wrapper around [`MaskingEngine`].
///
/// The random source drives both region synthesis and fault injection.
pub struct MaskService<R> {
    engine: MaskingEngine,
    rng: R,
    faults: FaultInjection,
}

impl<R: Rng> MaskService<R> {
    /// Service without fault injection.
    pub fn new(engine: MaskingEngine, rng: R) -> Self {
        Self {
            engine,
            rng,
            faults: FaultInjection::disabled(),
        }
    }

    /// Enable simulated latency and failures.
    #[must_use]
    pub fn with_faults(mut self, faults: FaultInjection) -> Self {
        self.faults = faults;
        self
    }

    /// Mask an uploaded image with the named style.
    ///
    /// Unknown style names fall back to `blackbar`.
    pub fn mask_image(&mut self, image: &[u8], style: &str) -> MaskResponse {
        let style = MaskingStyle::from_name_or_default(style);

        let delay = self.faults.delay(&mut self.rng);
        let fail = self.faults.failure_rate > 0.0
            && self.rng.random::<f64>() < self.faults.failure_rate;
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        if fail {
            warn!("injected service failure");
            return MaskResponse::Failure {
                message: UNAVAILABLE_MESSAGE.to_string(),
            };
        }

        let mut detector = RegionSynthesizer::new(&mut self.rng);
        match self.engine.process(image, style, &mut detector) {
            Ok(result) => {
                info!(regions = result.summary.total(), %style, "request served");
                MaskResponse::Success {
                    masked_image: result.data,
                    detected_pii: result.summary,
                    message: SUCCESS_MESSAGE.to_string(),
                    style,
                }
            }
            Err(e) => {
                warn!(error = %e, "request failed");
                let message = match e {
                    Error::Decode(_) => UPLOAD_FAILED_MESSAGE,
                    _ => PROCESSING_FAILED_MESSAGE,
                };
                MaskResponse::Failure {
                    message: message.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Codec, ImageCodec};
    use image::{Rgba, RgbaImage};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn png(w: u32, h: u32) -> Vec<u8> {
        ImageCodec::default()
            .encode(&RgbaImage::from_pixel(w, h, Rgba([240, 240, 240, 255])))
            .unwrap()
    }

    #[test]
    fn successful_request_reports_summary_and_style() {
        let mut service = MaskService::new(MaskingEngine::new(), StdRng::seed_from_u64(5));
        let response = service.mask_image(&png(64, 48), "pixelate");
        match response {
            MaskResponse::Success {
                masked_image,
                detected_pii,
                message,
                style,
            } => {
                assert!(!masked_image.is_empty());
                assert!((1..=3).contains(&detected_pii.faces));
                assert_eq!(message, SUCCESS_MESSAGE);
                assert_eq!(style, MaskingStyle::Pixelate);
            }
            MaskResponse::Failure { message } => panic!("unexpected failure: {message}"),
        }
    }

    #[test]
    fn unknown_style_uses_black_bar() {
        let mut service = MaskService::new(MaskingEngine::new(), StdRng::seed_from_u64(5));
        let response = service.mask_image(&png(32, 32), "sepia");
        assert!(matches!(
            response,
            MaskResponse::Success {
                style: MaskingStyle::BlackBar,
                ..
            }
        ));
    }

    #[test]
    fn corrupt_upload_maps_to_upload_message() {
        let mut service = MaskService::new(MaskingEngine::new(), StdRng::seed_from_u64(1));
        let response = service.mask_image(b"not an image", "blur");
        assert!(!response.is_success());
        assert_eq!(response.message(), UPLOAD_FAILED_MESSAGE);
    }

    #[test]
    fn certain_failure_is_injected_without_delay() {
        let faults = FaultInjection {
            failure_rate: 1.0,
            ..FaultInjection::disabled()
        };
        let mut service =
            MaskService::new(MaskingEngine::new(), StdRng::seed_from_u64(1)).with_faults(faults);
        let response = service.mask_image(&png(8, 8), "blur");
        assert_eq!(
            response,
            MaskResponse::Failure {
                message: UNAVAILABLE_MESSAGE.to_string()
            }
        );
    }

    #[test]
    fn simulated_delay_stays_in_range() {
        let faults = FaultInjection::simulated();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let d = faults.delay(&mut rng);
            assert!(d >= faults.min_delay && d <= faults.max_delay);
        }
        assert_eq!(FaultInjection::disabled().delay(&mut rng), Duration::ZERO);
    }

    #[test]
    fn health_probe_is_healthy() {
        let health = check_health();
        assert_eq!(health.status, "healthy");
        let json = serde_json::to_value(&health).unwrap();
        assert_eq!(json["status"], "healthy");
        assert!(json["timestamp"].is_string());
    }
}
