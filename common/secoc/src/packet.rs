// Copyright 2026 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use bytes::{BufMut, BytesMut};

/// Wire size of the freshness counter.
pub const FRESHNESS_LEN: usize = 4;

/// Transmitted tag length used unless a deployment configures its own.
pub const DEFAULT_TRUNCATED_TAG_LEN: usize = 4;

/// Classic bus frames carry at most 8 payload bytes.
pub const DEFAULT_MAX_PAYLOAD_LEN: usize = 8;

// PAYLOAD [L bytes] || FRESHNESS [4B, big-endian] || TRUNCATED_TAG [n bytes]
//
// `L` and `n` are fixed per deployment and agreed out-of-band; the layout
// carries no lengths or version of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecuredPdu {
    pub payload: Vec<u8>,
    pub freshness: u32,
    pub truncated_tag: Vec<u8>,
}

impl SecuredPdu {
    pub fn encoded_len(&self) -> usize {
        self.payload.len() + FRESHNESS_LEN + self.truncated_tag.len()
    }

    pub fn encode(&self, dst: &mut BytesMut) {
        dst.put_slice(&self.payload);

        // freshness counter, big-endian on the wire and in the mac input
        dst.put_u32(self.freshness);

        dst.put_slice(&self.truncated_tag);
    }

    /// The exact bytes the authentication tag covers:
    /// `payload || freshness` with the counter in big-endian byte order.
    pub fn authenticated_input(payload: &[u8], freshness: u32) -> Vec<u8> {
        let mut input = Vec::with_capacity(payload.len() + FRESHNESS_LEN);
        input.extend_from_slice(payload);
        input.extend_from_slice(&freshness.to_be_bytes());
        input
    }
}
