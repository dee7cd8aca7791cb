//! Outgoing time-broadcast frames and the ping-pong buffer pair.
//!
//! Two wire formats exist:
//!
//! - the primary broadcast: `[0xAA][0xAF][u32 LE seconds]` (6 bytes), the
//!   tag marking the frame as a Harp time broadcast;
//! - the auxiliary broadcast: the bare 4-byte little-endian seconds value.
//!
//! Each dispatch channel owns a [`FramePair`]: two fixed slots plus an
//! atomic active index. The hardware transmitter only ever reads the
//! active ("dispatch") slot; the interrupt handler writes the next second
//! into the inactive ("load") slot and flips the index only after the
//! transfer for the active slot has been issued, so a load-side write can
//! never race a DMA read of the same memory.

use core::sync::atomic::{AtomicU8, Ordering};

/// Tag prefix identifying a primary Harp time broadcast.
pub const TIME_TAG: [u8; 2] = [0xAA, 0xAF];

/// Size of the largest frame variant (the tagged primary broadcast).
pub const MAX_FRAME_LEN: usize = 6;

/// Wire format of one dispatch channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameKind {
    /// 6-byte tagged broadcast: `0xAA 0xAF` + LE seconds.
    TaggedBroadcast,
    /// 4-byte bare LE seconds (auxiliary channel).
    BareSeconds,
}

impl FrameKind {
    /// Bytes on the wire per frame.
    pub const fn wire_len(self) -> usize {
        match self {
            Self::TaggedBroadcast => 6,
            Self::BareSeconds => 4,
        }
    }

    /// Byte offset of the LE seconds field inside the frame.
    const fn seconds_offset(self) -> usize {
        match self {
            Self::TaggedBroadcast => 2,
            Self::BareSeconds => 0,
        }
    }

    #[allow(clippy::indexing_slicing)] // fixed indices inside MAX_FRAME_LEN
    fn init(self, slot: &mut [u8; MAX_FRAME_LEN]) {
        *slot = [0; MAX_FRAME_LEN];
        if matches!(self, Self::TaggedBroadcast) {
            slot[0] = TIME_TAG[0];
            slot[1] = TIME_TAG[1];
        }
    }

    fn write_seconds(self, slot: &mut [u8; MAX_FRAME_LEN], seconds: u32) {
        let at = self.seconds_offset();
        // at+4 <= 6 for both variants
        #[allow(clippy::indexing_slicing)]
        slot[at..at + 4].copy_from_slice(&seconds.to_le_bytes());
    }

    /// Decode the seconds field of an encoded frame (diagnostics, tests).
    pub fn read_seconds(self, frame: &[u8]) -> Option<u32> {
        let at = self.seconds_offset();
        let bytes = frame.get(at..at + 4)?;
        bytes.try_into().ok().map(u32::from_le_bytes)
    }
}

/// Ping-pong pair of frame slots with an atomic active index.
///
/// The index is plain load/store (the RP2040 core has no CAS, and none is
/// needed: only the owning channel's interrupt handler flips it).
pub struct FramePair {
    kind: FrameKind,
    slots: [[u8; MAX_FRAME_LEN]; 2],
    /// Index (0/1) of the dispatch slot.
    active: AtomicU8,
}

impl FramePair {
    /// A fresh pair: both slots carry the frame header and a zeroed
    /// seconds field; slot 0 is the dispatch slot.
    pub fn new(kind: FrameKind) -> Self {
        let mut slots = [[0u8; MAX_FRAME_LEN]; 2];
        for slot in &mut slots {
            kind.init(slot);
        }
        Self {
            kind,
            slots,
            active: AtomicU8::new(0),
        }
    }

    /// Wire format of this pair.
    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    fn active_index(&self) -> usize {
        usize::from(self.active.load(Ordering::Relaxed) & 1)
    }

    /// The frame currently owned by the transmitter.
    #[allow(clippy::indexing_slicing)] // index masked to 0/1, len <= MAX_FRAME_LEN
    pub fn dispatch_frame(&self) -> &[u8] {
        &self.slots[self.active_index()][..self.kind.wire_len()]
    }

    /// Write `seconds` into the *load* slot (the one not being
    /// transmitted).
    pub fn load_seconds(&mut self, seconds: u32) {
        let load = self.active_index() ^ 1;
        // index masked to 0/1
        #[allow(clippy::indexing_slicing)]
        self.kind.write_seconds(&mut self.slots[load], seconds);
    }

    /// Write `seconds` into the *dispatch* slot. Only valid before the
    /// channel is armed, while no transfer can be in flight.
    pub fn prime_seconds(&mut self, seconds: u32) {
        let active = self.active_index();
        // index masked to 0/1
        #[allow(clippy::indexing_slicing)]
        self.kind.write_seconds(&mut self.slots[active], seconds);
    }

    /// Swap dispatch/load roles. Called by the interrupt handler after the
    /// dispatch-slot transfer has been issued.
    pub fn swap(&mut self) {
        let next = (self.active.load(Ordering::Relaxed) ^ 1) & 1;
        self.active.store(next, Ordering::Relaxed);
    }
}
