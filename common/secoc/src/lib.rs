// Copyright 2026 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

//! Freshness-bound, truncated-MAC message authentication for short,
//! bandwidth-constrained payloads (onboard bus frames).
//!
//! Every secured PDU carries the cleartext payload, a per-endpoint freshness
//! counter and a truncated authentication tag computed over
//! `payload || freshness`. Verification recomputes the tag, compares it in
//! constant time and only then consults the receive-side freshness state, so
//! a forged message can never probe or advance counters.
//!
//! The cryptographic primitive itself lives behind `secoc-crypto`; transport,
//! key provisioning and session re-keying are the caller's concern.

pub mod codec;
pub mod engine;
pub mod error;
pub mod key;
pub mod packet;
pub mod replay;
pub mod truncation;

pub use codec::PduCodec;
pub use engine::{AuthenticationEngine, DefaultSecOcDigest, SecOcConfig, VerificationOutcome};
pub use error::SecOcError;
pub use key::{AuthenticationKey, EndpointId, AUTHENTICATION_KEY_SIZE};
pub use packet::{SecuredPdu, DEFAULT_MAX_PAYLOAD_LEN, DEFAULT_TRUNCATED_TAG_LEN, FRESHNESS_LEN};
pub use replay::{FreshnessPolicy, FreshnessStore};
pub use truncation::TruncationPolicy;
