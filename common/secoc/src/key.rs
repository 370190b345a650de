// Copyright 2026 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use crate::error::SecOcError;
use std::fmt::{self, Debug, Display, Formatter};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Size of a pre-shared authentication key.
pub const AUTHENTICATION_KEY_SIZE: usize = 16;

/// Identity of a secured communication relationship, i.e. a sender/receiver
/// pair or a bus message identifier. Selects the authentication key and the
/// freshness counter pair used for a given message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndpointId(pub u32);

impl Display for EndpointId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl From<u32> for EndpointId {
    fn from(id: u32) -> Self {
        EndpointId(id)
    }
}

/// Pre-shared symmetric key bound to a single endpoint identity.
///
/// The key never leaves the authentication boundary: it is zeroized on drop
/// and its `Debug` representation is redacted.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AuthenticationKey([u8; AUTHENTICATION_KEY_SIZE]);

impl AuthenticationKey {
    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, SecOcError> {
        if bytes.len() != AUTHENTICATION_KEY_SIZE {
            return Err(SecOcError::InvalidKeySize {
                received: bytes.len(),
                expected: AUTHENTICATION_KEY_SIZE,
            });
        }

        let mut key = [0u8; AUTHENTICATION_KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(AuthenticationKey(key))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn zeroizing_clone(&self) -> Zeroizing<Self> {
        Zeroizing::new(AuthenticationKey(self.0))
    }
}

impl Debug for AuthenticationKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticationKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_construction_validates_length() {
        assert!(AuthenticationKey::try_from_bytes(&[0u8; AUTHENTICATION_KEY_SIZE]).is_ok());

        for bad_len in [0, 1, AUTHENTICATION_KEY_SIZE - 1, AUTHENTICATION_KEY_SIZE + 1, 32] {
            let res = AuthenticationKey::try_from_bytes(&vec![0u8; bad_len]);
            assert_eq!(
                res.unwrap_err(),
                SecOcError::InvalidKeySize {
                    received: bad_len,
                    expected: AUTHENTICATION_KEY_SIZE
                }
            );
        }
    }

    #[test]
    fn debug_output_is_redacted() {
        let key = AuthenticationKey::try_from_bytes(&[0xAB; AUTHENTICATION_KEY_SIZE]).unwrap();
        let debug = format!("{key:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("AB"));
        assert!(!debug.contains("171"));
    }
}
