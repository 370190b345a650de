// Copyright 2026 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use crate::error::SecOcError;

/// Deterministic mapping from a full authentication tag to the shorter
/// transmitted tag.
///
/// Truncation trades wire overhead against forgery resistance: an `n`-byte
/// transmitted tag leaves a per-attempt forgery probability of roughly
/// `2^-8n`. The transmitted length is a deployment parameter fixed at setup,
/// never a per-message decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncationPolicy {
    transmitted_len: usize,
}

impl TruncationPolicy {
    /// Validates the transmitted tag length against the full tag length of
    /// the chosen algorithm. A zero-length or overlong transmitted tag is a
    /// configuration error, not a runtime failure.
    pub fn new(transmitted_len: usize, full_tag_len: usize) -> Result<Self, SecOcError> {
        if transmitted_len == 0 || transmitted_len > full_tag_len {
            return Err(SecOcError::InvalidTruncationLength {
                requested: transmitted_len,
                full: full_tag_len,
            });
        }

        Ok(TruncationPolicy { transmitted_len })
    }

    pub fn transmitted_len(&self) -> usize {
        self.transmitted_len
    }

    /// Truncates a full tag to its transmitted prefix.
    pub fn truncate<'a>(&self, full_tag: &'a [u8]) -> &'a [u8] {
        debug_assert!(full_tag.len() >= self.transmitted_len);
        &full_tag[..self.transmitted_len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_lengths_at_construction() {
        assert_eq!(
            TruncationPolicy::new(0, 32).unwrap_err(),
            SecOcError::InvalidTruncationLength {
                requested: 0,
                full: 32
            }
        );
        assert_eq!(
            TruncationPolicy::new(33, 32).unwrap_err(),
            SecOcError::InvalidTruncationLength {
                requested: 33,
                full: 32
            }
        );
    }

    #[test]
    fn truncates_to_prefix() {
        let tag: Vec<u8> = (0u8..32).collect();
        for n in 1..=32 {
            let policy = TruncationPolicy::new(n, 32).unwrap();
            assert_eq!(policy.truncate(&tag), &tag[..n]);
        }
    }

    #[test]
    fn full_length_tag_is_permitted() {
        let policy = TruncationPolicy::new(32, 32).unwrap();
        assert_eq!(policy.transmitted_len(), 32);
    }
}
