// Copyright 2026 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use crate::error::SecOcError;
use crate::packet::{SecuredPdu, FRESHNESS_LEN};
use bytes::BytesMut;

/// Fixed-layout serializer for secured PDUs.
///
/// Assumes datagram framing: the input of [`parse`](Self::parse) contains
/// exactly one complete PDU, with the payload length either implied by the
/// buffer or supplied out-of-band by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PduCodec {
    truncated_tag_len: usize,
    max_payload_len: usize,
}

impl PduCodec {
    /// Length parameters come from the validated engine configuration;
    /// the codec itself performs no further validation of them.
    pub fn new(truncated_tag_len: usize, max_payload_len: usize) -> Self {
        PduCodec {
            truncated_tag_len,
            max_payload_len,
        }
    }

    /// Smallest possible secured buffer: freshness plus tag, empty payload.
    pub fn min_pdu_len(&self) -> usize {
        FRESHNESS_LEN + self.truncated_tag_len
    }

    pub fn serialize(&self, pdu: &SecuredPdu, dst: &mut BytesMut) {
        dst.reserve(pdu.encoded_len());
        pdu.encode(dst);
    }

    /// Parses one complete secured PDU from `src`.
    ///
    /// The payload length is whatever precedes the fixed freshness and tag
    /// fields; when the transport supplies its own length hint the two must
    /// agree exactly.
    pub fn parse(
        &self,
        src: &[u8],
        payload_len_hint: Option<usize>,
    ) -> Result<SecuredPdu, SecOcError> {
        let min = self.min_pdu_len();
        if src.len() < min {
            return Err(SecOcError::MalformedPdu {
                length: src.len(),
                min,
            });
        }

        let payload_len = src.len() - min;
        if let Some(hint) = payload_len_hint {
            if hint != payload_len {
                return Err(SecOcError::PayloadLengthMismatch {
                    hint,
                    remaining: payload_len,
                });
            }
        }
        if payload_len > self.max_payload_len {
            return Err(SecOcError::PayloadTooLong {
                length: payload_len,
                max: self.max_payload_len,
            });
        }

        let tag_start = payload_len + FRESHNESS_LEN;

        // SAFETY: we checked for valid byte lengths
        #[allow(clippy::unwrap_used)]
        let freshness = u32::from_be_bytes(src[payload_len..tag_start].try_into().unwrap());

        Ok(SecuredPdu {
            payload: src[..payload_len].to_vec(),
            freshness,
            truncated_tag: src[tag_start..].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    fn codec() -> PduCodec {
        PduCodec::new(4, 8)
    }

    #[test]
    fn serialize_parse_roundtrip() {
        let pdu = SecuredPdu {
            payload: vec![0x12, 0x34],
            freshness: 1000,
            truncated_tag: vec![1, 2, 3, 4],
        };

        let mut dst = BytesMut::new();
        codec().serialize(&pdu, &mut dst);
        let decoded = codec().parse(&dst, None).unwrap();

        assert_eq!(decoded, pdu);
    }

    #[test]
    fn roundtrip_with_random_payloads_and_hint() {
        let mut rng = rand::thread_rng();
        for payload_len in 0..=8 {
            let mut payload = vec![0u8; payload_len];
            rng.fill_bytes(&mut payload);

            let pdu = SecuredPdu {
                payload,
                freshness: rng.next_u32(),
                truncated_tag: vec![0xCD; 4],
            };

            let mut dst = BytesMut::new();
            codec().serialize(&pdu, &mut dst);
            let decoded = codec().parse(&dst, Some(payload_len)).unwrap();
            assert_eq!(decoded, pdu);
        }
    }

    #[test]
    fn parse_rejects_buffer_smaller_than_minimum() {
        // one byte short of freshness + tag
        let buf = [0u8; 7];
        assert_eq!(
            codec().parse(&buf, None).unwrap_err(),
            SecOcError::MalformedPdu { length: 7, min: 8 }
        );

        assert_eq!(
            codec().parse(&[], None).unwrap_err(),
            SecOcError::MalformedPdu { length: 0, min: 8 }
        );
    }

    #[test]
    fn parse_rejects_disagreeing_length_hint() {
        let pdu = SecuredPdu {
            payload: vec![1, 2, 3],
            freshness: 7,
            truncated_tag: vec![9; 4],
        };
        let mut dst = BytesMut::new();
        codec().serialize(&pdu, &mut dst);

        assert_eq!(
            codec().parse(&dst, Some(2)).unwrap_err(),
            SecOcError::PayloadLengthMismatch {
                hint: 2,
                remaining: 3
            }
        );
    }

    #[test]
    fn parse_rejects_overlong_payload() {
        let pdu = SecuredPdu {
            payload: vec![0; 9],
            freshness: 7,
            truncated_tag: vec![9; 4],
        };
        let mut dst = BytesMut::new();
        codec().serialize(&pdu, &mut dst);

        assert_eq!(
            codec().parse(&dst, None).unwrap_err(),
            SecOcError::PayloadTooLong { length: 9, max: 8 }
        );
    }

    #[test]
    fn empty_payload_is_valid() {
        let pdu = SecuredPdu {
            payload: vec![],
            freshness: 42,
            truncated_tag: vec![5; 4],
        };
        let mut dst = BytesMut::new();
        codec().serialize(&pdu, &mut dst);

        let decoded = codec().parse(&dst, None).unwrap();
        assert_eq!(decoded, pdu);
    }
}
