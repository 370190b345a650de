// Copyright 2026 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use crate::codec::PduCodec;
use crate::error::SecOcError;
use crate::key::{AuthenticationKey, EndpointId};
use crate::packet::{SecuredPdu, DEFAULT_MAX_PAYLOAD_LEN, DEFAULT_TRUNCATED_TAG_LEN};
use crate::replay::{FreshnessPolicy, FreshnessStore};
use crate::truncation::TruncationPolicy;
use bytes::BytesMut;
use parking_lot::RwLock;
use secoc_crypto::digest::core_api::BlockSizeUser;
use secoc_crypto::hmac::{compute_keyed_hmac, verify_truncated_tag};
use secoc_crypto::Digest;
use sha2::Sha256;
use std::collections::HashMap;
use std::marker::PhantomData;
use tracing::{debug, trace};
use zeroize::Zeroizing;

/// Digest used for PDU authentication unless a deployment picks its own.
pub type DefaultSecOcDigest = Sha256;

/// Result of verifying one secured PDU. Produced once per verification call;
/// a rejection is a routine protocol decision, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a verification outcome decides whether the message may be processed"]
pub enum VerificationOutcome {
    /// Tag matched a fresh counter; receive state advanced.
    Accepted,
    /// The recomputed tag did not match the received one. Takes precedence
    /// over freshness: a forged counter under a forged tag is still a tamper
    /// event.
    RejectedTamper,
    /// The tag matched but the counter was already consumed or stale; receive
    /// state is unchanged.
    RejectedReplay,
}

impl VerificationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, VerificationOutcome::Accepted)
    }
}

/// Deployment parameters agreed out-of-band by both ends of every secured
/// channel. Validated once when the engine is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecOcConfig {
    /// Transmitted tag length in bytes; must not exceed the digest output.
    pub truncated_tag_len: usize,
    /// Upper bound on payload size, e.g. 8 bytes for a classic bus frame.
    pub max_payload_len: usize,
    /// Receive-side freshness policy applied to every endpoint.
    pub freshness_policy: FreshnessPolicy,
}

impl Default for SecOcConfig {
    fn default() -> Self {
        SecOcConfig {
            truncated_tag_len: DEFAULT_TRUNCATED_TAG_LEN,
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
            freshness_policy: FreshnessPolicy::Strict,
        }
    }
}

/// Builds outgoing secured PDUs and validates incoming ones.
///
/// The engine owns one authentication key and one freshness counter pair per
/// registered endpoint and orchestrates the mac primitive, truncation policy
/// and codec around them. It has no internal concurrency: callers may share
/// it freely across threads, and counter updates for any single endpoint are
/// serialised by the freshness store. The mac itself is computed outside all
/// locks.
pub struct AuthenticationEngine<D = DefaultSecOcDigest> {
    config: SecOcConfig,
    truncation: TruncationPolicy,
    codec: PduCodec,
    freshness: FreshnessStore,
    keys: RwLock<HashMap<EndpointId, AuthenticationKey>>,
    _digest: PhantomData<D>,
}

impl<D> AuthenticationEngine<D>
where
    D: Digest + BlockSizeUser,
{
    pub fn new(config: SecOcConfig) -> Result<Self, SecOcError> {
        let truncation =
            TruncationPolicy::new(config.truncated_tag_len, <D as Digest>::output_size())?;
        if let FreshnessPolicy::Window { size: 0 } = config.freshness_policy {
            return Err(SecOcError::InvalidWindowSize);
        }

        Ok(AuthenticationEngine {
            codec: PduCodec::new(config.truncated_tag_len, config.max_payload_len),
            truncation,
            config,
            freshness: FreshnessStore::new(),
            keys: RwLock::new(HashMap::new()),
            _digest: PhantomData,
        })
    }

    pub fn config(&self) -> &SecOcConfig {
        &self.config
    }

    pub fn codec(&self) -> &PduCodec {
        &self.codec
    }

    /// Provisions key material and counter state for an endpoint, both sides
    /// starting at the agreed initial freshness value. Registering an already
    /// known endpoint replaces its state; that is the external re-keying /
    /// session-reset event.
    pub fn register_endpoint(
        &self,
        endpoint: EndpointId,
        key: AuthenticationKey,
        initial_freshness: u32,
    ) -> Result<(), SecOcError> {
        self.freshness
            .register(endpoint, self.config.freshness_policy, initial_freshness)?;
        self.keys.write().insert(endpoint, key);
        trace!("provisioned endpoint {endpoint} starting at freshness {initial_freshness}");
        Ok(())
    }

    /// Send path: consumes the next transmit counter and builds a secured PDU
    /// over `payload || freshness`.
    ///
    /// Has no per-message failure modes beyond an unknown endpoint, an
    /// overlong payload or an exhausted counter space.
    pub fn authenticate(
        &self,
        endpoint: EndpointId,
        payload: &[u8],
    ) -> Result<SecuredPdu, SecOcError> {
        if payload.len() > self.config.max_payload_len {
            return Err(SecOcError::PayloadTooLong {
                length: payload.len(),
                max: self.config.max_payload_len,
            });
        }

        let key = self.key_for(endpoint)?;
        let freshness = self.freshness.next_tx(endpoint)?;

        let auth_input = SecuredPdu::authenticated_input(payload, freshness);
        let full_tag = compute_keyed_hmac::<D>(key.as_bytes(), &auth_input).into_bytes();
        let truncated_tag = self.truncation.truncate(&full_tag).to_vec();

        trace!("issued freshness {freshness} for endpoint {endpoint}");

        Ok(SecuredPdu {
            payload: payload.to_vec(),
            freshness,
            truncated_tag,
        })
    }

    /// Send path convenience that emits the already-serialized PDU.
    pub fn authenticate_encoded(
        &self,
        endpoint: EndpointId,
        payload: &[u8],
    ) -> Result<BytesMut, SecOcError> {
        let pdu = self.authenticate(endpoint, payload)?;
        let mut dst = BytesMut::new();
        self.codec.serialize(&pdu, &mut dst);
        Ok(dst)
    }

    /// Receive path: recomputes and truncates the tag independently, compares
    /// it in constant time and only consults the freshness state once the tag
    /// matched.
    ///
    /// The ordering is load-bearing: a mismatched tag never advances receive
    /// state, so an attacker cannot probe counter acceptance without first
    /// forging a valid tag.
    pub fn verify(
        &self,
        endpoint: EndpointId,
        pdu: &SecuredPdu,
    ) -> Result<VerificationOutcome, SecOcError> {
        let key = self.key_for(endpoint)?;

        let auth_input = SecuredPdu::authenticated_input(&pdu.payload, pdu.freshness);
        let recomputed = compute_keyed_hmac::<D>(key.as_bytes(), &auth_input);

        // a tag of the wrong length can never match the configured truncation
        let tag_matches = pdu.truncated_tag.len() == self.truncation.transmitted_len()
            && verify_truncated_tag::<D>(&pdu.truncated_tag, recomputed);

        if !tag_matches {
            debug!("tag mismatch on endpoint {endpoint}; rejecting as tampered");
            return Ok(VerificationOutcome::RejectedTamper);
        }

        if self.freshness.check_and_advance_rx(endpoint, pdu.freshness)? {
            Ok(VerificationOutcome::Accepted)
        } else {
            debug!(
                "stale freshness {} on endpoint {endpoint}; rejecting as replayed",
                pdu.freshness
            );
            Ok(VerificationOutcome::RejectedReplay)
        }
    }

    /// Receive path for raw transport buffers. Decode failures surface as
    /// errors (the message is dropped without touching any state), while
    /// tamper and replay remain routine outcomes.
    pub fn verify_encoded(
        &self,
        endpoint: EndpointId,
        raw: &[u8],
        payload_len_hint: Option<usize>,
    ) -> Result<VerificationOutcome, SecOcError> {
        let pdu = self.codec.parse(raw, payload_len_hint)?;
        self.verify(endpoint, &pdu)
    }

    fn key_for(&self, endpoint: EndpointId) -> Result<Zeroizing<AuthenticationKey>, SecOcError> {
        self.keys
            .read()
            .get(&endpoint)
            .map(AuthenticationKey::zeroizing_clone)
            .ok_or(SecOcError::UnknownEndpoint(endpoint))
    }
}
