// Copyright 2026 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

pub mod hmac;

pub use digest::{Digest, OutputSizeUser};
pub use generic_array;

// single place of importing the mac/hashing algorithms so that downstream
// crates pull them via secoc-crypto rather than pinning their own versions
pub use digest;
pub use subtle;
