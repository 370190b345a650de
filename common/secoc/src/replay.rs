// Copyright 2026 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

//! Per-endpoint freshness counter state.
//!
//! The counter pair held here is the only durable state crossing messages:
//! `tx_next` anchors replay resistance on the send side (the MAC covers
//! `payload || freshness`, and a value is never issued twice), while the
//! receive side tracks which counters have already been consumed.
//!
//! Counters are 32 bits wide and never wrap. Exhausting the counter space
//! poisons the endpoint until it is re-registered with fresh key material.

use crate::error::SecOcError;
use crate::key::EndpointId;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

const WORD_BITS: usize = u64::BITS as usize;

/// Policy deciding which received freshness values count as fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FreshnessPolicy {
    /// Accept only counters strictly greater than the last accepted one.
    /// Out-of-order delivery is rejected even when it is not a replay; this
    /// is the reference behaviour and the default.
    #[default]
    Strict,
    /// Accept counters within `size` of the highest accepted one, each
    /// exactly once. Tolerates bounded reordering on lossy transports.
    Window { size: u32 },
}

/// Receive-side acceptance state for a single endpoint.
#[derive(Debug)]
enum RxValidator {
    Strict {
        floor: u32,
        last_accepted: Option<u32>,
    },
    Window(WindowValidator),
}

impl RxValidator {
    fn new(policy: FreshnessPolicy, initial: u32) -> Self {
        match policy {
            FreshnessPolicy::Strict => RxValidator::Strict {
                floor: initial,
                last_accepted: None,
            },
            FreshnessPolicy::Window { size } => {
                RxValidator::Window(WindowValidator::new(size, initial))
            }
        }
    }

    /// The receive side accepted `u32::MAX`; no further counter can ever be
    /// fresh, so the endpoint must be re-keyed rather than quietly rejecting
    /// everything as replayed.
    fn exhausted(&self) -> bool {
        match self {
            RxValidator::Strict { last_accepted, .. } => *last_accepted == Some(u32::MAX),
            RxValidator::Window(validator) => validator.top == Some(u32::MAX),
        }
    }

    fn check_and_advance(&mut self, received: u32) -> bool {
        match self {
            RxValidator::Strict {
                floor,
                last_accepted,
            } => {
                let fresh = match *last_accepted {
                    // nothing accepted yet: the agreed starting value itself is fresh
                    None => received >= *floor,
                    Some(last) => received > last,
                };
                if fresh {
                    *last_accepted = Some(received);
                }
                fresh
            }
            RxValidator::Window(validator) => validator.check_and_advance(received),
        }
    }
}

/// Sliding-window duplicate tracker over the most recent counters.
///
/// Counters ahead of the highest accepted one always advance the window;
/// counters behind it are accepted at most once while they remain within the
/// window, tracked by one bit each.
#[derive(Debug)]
struct WindowValidator {
    floor: u32,
    top: Option<u32>,
    window: u32,
    bitmap: Vec<u64>,
}

impl WindowValidator {
    fn new(window: u32, floor: u32) -> Self {
        // an extra word keeps the advancing edge from colliding with bits
        // that are still inside the window
        let words = (window as usize).div_ceil(WORD_BITS) + 1;
        WindowValidator {
            floor,
            top: None,
            window,
            bitmap: vec![0; words],
        }
    }

    fn bitmap_bits(&self) -> usize {
        self.bitmap.len() * WORD_BITS
    }

    fn bit_index(&self, counter: u32) -> usize {
        counter as usize % self.bitmap_bits()
    }

    fn set_bit(&mut self, counter: u32) {
        let idx = self.bit_index(counter);
        self.bitmap[idx / WORD_BITS] |= 1 << (idx % WORD_BITS);
    }

    fn clear_bit(&mut self, counter: u32) {
        let idx = self.bit_index(counter);
        self.bitmap[idx / WORD_BITS] &= !(1 << (idx % WORD_BITS));
    }

    fn check_bit(&self, counter: u32) -> bool {
        let idx = self.bit_index(counter);
        self.bitmap[idx / WORD_BITS] & (1 << (idx % WORD_BITS)) != 0
    }

    fn check_and_advance(&mut self, received: u32) -> bool {
        if received < self.floor {
            return false;
        }

        let Some(top) = self.top else {
            self.top = Some(received);
            self.set_bit(received);
            return true;
        };

        if received > top {
            // advance the window, clearing the bits the edge moves over
            let diff = received - top;
            if diff as usize >= self.bitmap_bits() {
                self.bitmap.fill(0);
            } else {
                for stale in 1..=diff {
                    self.clear_bit(top.wrapping_add(stale));
                }
            }
            self.top = Some(received);
            self.set_bit(received);
            return true;
        }

        let age = top - received;
        if age >= self.window {
            // too old to track; indistinguishable from a replay
            return false;
        }
        if self.check_bit(received) {
            return false;
        }
        self.set_bit(received);
        true
    }
}

/// Transmit and receive counter state for a single endpoint.
#[derive(Debug)]
struct EndpointCounters {
    tx_next: u32,
    tx_exhausted: bool,
    rx: RxValidator,
}

/// Mapping from endpoint identity to its freshness counter pair.
///
/// Each endpoint's counters sit behind their own mutex: `next_tx` and
/// `check_and_advance_rx` are increment-then-observe sequences that must be
/// serialised per endpoint, while distinct endpoints stay fully independent.
#[derive(Debug, Default)]
pub struct FreshnessStore {
    endpoints: RwLock<HashMap<EndpointId, Arc<Mutex<EndpointCounters>>>>,
}

impl FreshnessStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs (or replaces) counter state for an endpoint, starting both
    /// sides at the agreed initial value. Replacing existing state is the
    /// session-reset path and is only expected alongside re-keying.
    pub fn register(
        &self,
        endpoint: EndpointId,
        policy: FreshnessPolicy,
        initial: u32,
    ) -> Result<(), SecOcError> {
        if let FreshnessPolicy::Window { size: 0 } = policy {
            return Err(SecOcError::InvalidWindowSize);
        }

        let counters = EndpointCounters {
            tx_next: initial,
            tx_exhausted: false,
            rx: RxValidator::new(policy, initial),
        };
        self.endpoints
            .write()
            .insert(endpoint, Arc::new(Mutex::new(counters)));
        Ok(())
    }

    pub fn is_registered(&self, endpoint: EndpointId) -> bool {
        self.endpoints.read().contains_key(&endpoint)
    }

    fn entry(&self, endpoint: EndpointId) -> Result<Arc<Mutex<EndpointCounters>>, SecOcError> {
        self.endpoints
            .read()
            .get(&endpoint)
            .cloned()
            .ok_or(SecOcError::UnknownEndpoint(endpoint))
    }

    /// Returns the next transmit counter value and advances the state.
    ///
    /// A value is never returned twice for the same endpoint. Once the 32-bit
    /// space is used up every further call fails with
    /// [`SecOcError::FreshnessExhausted`]; counters never wrap, since a wrap
    /// would let an old authenticated message become fresh again.
    pub fn next_tx(&self, endpoint: EndpointId) -> Result<u32, SecOcError> {
        let entry = self.entry(endpoint)?;
        let mut counters = entry.lock();

        if counters.tx_exhausted {
            return Err(SecOcError::FreshnessExhausted(endpoint));
        }

        let issued = counters.tx_next;
        match issued.checked_add(1) {
            Some(next) => counters.tx_next = next,
            None => counters.tx_exhausted = true,
        }
        Ok(issued)
    }

    /// Checks a received counter against the endpoint's freshness policy and
    /// consumes it when fresh. Returns `Ok(false)` without touching any state
    /// for stale or duplicate counters.
    pub fn check_and_advance_rx(
        &self,
        endpoint: EndpointId,
        received: u32,
    ) -> Result<bool, SecOcError> {
        let entry = self.entry(endpoint)?;
        let mut counters = entry.lock();

        if counters.rx.exhausted() {
            return Err(SecOcError::FreshnessExhausted(endpoint));
        }

        Ok(counters.rx.check_and_advance(received))
    }
}
