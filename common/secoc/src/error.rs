// Copyright 2026 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use crate::key::EndpointId;
use thiserror::Error;

/// Failures of the authentication layer.
///
/// Routine verification rejections (tamper, replay) are deliberately *not*
/// part of this enum; they are reported as
/// [`VerificationOutcome`](crate::VerificationOutcome) values since rejecting
/// a message is an expected protocol outcome, not a fault.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SecOcError {
    #[error("the provided authentication key had invalid size. Got: {received}, but expected: {expected}")]
    InvalidKeySize { received: usize, expected: usize },

    #[error("truncated tag length {requested} is outside the valid range (1..={full})")]
    InvalidTruncationLength { requested: usize, full: usize },

    #[error("the freshness acceptance window must not be empty")]
    InvalidWindowSize,

    #[error("payload of {length} bytes exceeds the configured maximum of {max}")]
    PayloadTooLong { length: usize, max: usize },

    #[error("pdu buffer of {length} bytes is shorter than the minimum secured layout of {min}")]
    MalformedPdu { length: usize, min: usize },

    #[error("payload length hint of {hint} bytes disagrees with the {remaining} payload bytes on the wire")]
    PayloadLengthMismatch { hint: usize, remaining: usize },

    #[error("endpoint {0} has no provisioned key material")]
    UnknownEndpoint(EndpointId),

    #[error("freshness counter space exhausted for endpoint {0}; the session must be re-keyed")]
    FreshnessExhausted(EndpointId),
}
