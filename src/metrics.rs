//! Metric helpers for `framegate`.
//!
//! This module defines metric names and helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. All functions become no-ops
//! if the optional `metrics` Cargo feature is disabled.

#[cfg(feature = "metrics")]
use metrics::counter;

/// Name of the counter tracking messages produced by decoders.
pub const MESSAGES_DECODED: &str = "framegate_messages_decoded_total";
/// Name of the counter tracking payloads produced by encoders.
pub const MESSAGES_ENCODED: &str = "framegate_messages_encoded_total";
/// Name of the counter tracking codec errors by type.
pub const CODEC_ERRORS: &str = "framegate_codec_errors_total";
/// Name of the counter tracking decode/flush loops yielded to a new worker.
pub const REALIGNMENT_YIELDS: &str = "framegate_realignment_yields_total";

/// Increment the decoded-message counter.
pub fn message_decoded() {
    #[cfg(feature = "metrics")]
    counter!(MESSAGES_DECODED).increment(1);
}

/// Increment the encoded-payload counter.
pub fn message_encoded() {
    #[cfg(feature = "metrics")]
    counter!(MESSAGES_ENCODED).increment(1);
}

/// Increment the codec-error counter, labelled by error type.
pub fn codec_error(error_type: &'static str) {
    #[cfg(feature = "metrics")]
    counter!(CODEC_ERRORS, "error_type" => error_type).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = error_type;
}

/// Increment the realignment-yield counter.
pub fn realignment_yield() {
    #[cfg(feature = "metrics")]
    counter!(REALIGNMENT_YIELDS).increment(1);
}
