// Copyright 2026 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use digest::core_api::BlockSizeUser;
use digest::{CtOutput, Digest};
use generic_array::GenericArray;
use subtle::ConstantTimeEq;

use hmac::{Mac, SimpleHmac};

pub use hmac;

// Type alias for ease of use so that it would not require explicit import of CtOutput or SimpleHmac
pub type HmacOutput<D> = CtOutput<SimpleHmac<D>>;

/// Compute keyed hmac
#[allow(clippy::expect_used)]
pub fn compute_keyed_hmac<D>(key: &[u8], data: &[u8]) -> HmacOutput<D>
where
    D: Digest + BlockSizeUser,
{
    let mut hmac =
        SimpleHmac::<D>::new_from_slice(key).expect("HMAC should be able to take key of any size!");
    hmac.update(data);
    hmac.finalize()
}

/// Compute keyed hmac and performs constant time equality check with the provided tag value.
#[allow(clippy::expect_used)]
pub fn recompute_keyed_hmac_and_verify_tag<D>(key: &[u8], data: &[u8], tag: &[u8]) -> bool
where
    D: Digest + BlockSizeUser,
{
    let mut hmac =
        SimpleHmac::<D>::new_from_slice(key).expect("HMAC should be able to take key of any size!");
    hmac.update(data);
    // note, under the hood ct_eq is called
    hmac.verify_slice(tag).is_ok()
}

/// Verifies tag of an hmac output.
pub fn verify_tag<D>(tag: &[u8], out: HmacOutput<D>) -> bool
where
    D: Digest + BlockSizeUser,
{
    if tag.len() != <D as Digest>::output_size() {
        return false;
    }

    let tag_bytes = GenericArray::clone_from_slice(tag);
    let tag_out = HmacOutput::<D>::new(tag_bytes);
    // note, under the hood ct_eq is called
    out == tag_out
}

/// Verifies a truncated tag against the prefix of an hmac output in constant time.
///
/// `CtOutput` can only compare full-length tags, so the prefix comparison goes
/// through `subtle` directly. Tag lengths are public information; only the tag
/// contents are compared in constant time.
pub fn verify_truncated_tag<D>(truncated_tag: &[u8], out: HmacOutput<D>) -> bool
where
    D: Digest + BlockSizeUser,
{
    let full = out.into_bytes();
    if truncated_tag.is_empty() || truncated_tag.len() > full.len() {
        return false;
    }

    full[..truncated_tag.len()].ct_eq(truncated_tag).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use sha2::Sha256;

    #[test]
    fn verifying_tags_work_using_both_methods_with_sha256() {
        let key = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16];
        let msg = b"Lorem ipsum dolor sit amet, consectetur adipiscing elit. Nam sodales ultricies scelerisque.";

        // expected
        let output = compute_keyed_hmac::<Sha256>(&key, msg);
        let output_tag = output.into_bytes().to_vec();

        assert!(recompute_keyed_hmac_and_verify_tag::<Sha256>(
            &key,
            msg,
            &output_tag
        ));

        assert!(verify_tag::<Sha256>(
            &output_tag,
            compute_keyed_hmac::<Sha256>(&key, msg)
        ));
    }

    #[test]
    fn compute_is_deterministic() {
        let key = b"some arbitrary key material";
        let msg = b"some arbitrary message";

        let first = compute_keyed_hmac::<Sha256>(key, msg).into_bytes();
        let second = compute_keyed_hmac::<Sha256>(key, msg).into_bytes();
        assert_eq!(first, second);
    }

    #[test]
    fn matches_rfc4231_test_vector() {
        // RFC 4231 test case 2
        let key = b"Jefe";
        let data = b"what do ya want for nothing?";
        let expected =
            hex!("5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843");

        let out = compute_keyed_hmac::<Sha256>(key, data);
        assert_eq!(out.into_bytes().as_slice(), expected);

        assert!(recompute_keyed_hmac_and_verify_tag::<Sha256>(
            key, data, &expected
        ));
    }

    #[test]
    fn truncated_tag_verification() {
        let key = b"Jefe";
        let data = b"what do ya want for nothing?";
        let full = hex!("5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843");

        for n in 1..=full.len() {
            assert!(verify_truncated_tag::<Sha256>(
                &full[..n],
                compute_keyed_hmac::<Sha256>(key, data)
            ));
        }

        // flipped first bit
        let mut tampered = full[..4].to_vec();
        tampered[0] ^= 0x01;
        assert!(!verify_truncated_tag::<Sha256>(
            &tampered,
            compute_keyed_hmac::<Sha256>(key, data)
        ));

        // empty and overlong tags are rejected outright
        assert!(!verify_truncated_tag::<Sha256>(
            &[],
            compute_keyed_hmac::<Sha256>(key, data)
        ));
        let mut overlong = full.to_vec();
        overlong.push(0);
        assert!(!verify_truncated_tag::<Sha256>(
            &overlong,
            compute_keyed_hmac::<Sha256>(key, data)
        ));
    }
}
