//! The shared pool of unused pieces. All bank mutation is pure: every
//! operation returns a new `Bank` (or mutates `&mut self` in place and
//! returns a `Result`), never sharing mutable state with a prior value —
//! callers that need undo simply keep the old `Bank` around.

use serde::{Deserialize, Serialize};

use crate::piece::{Color, PieceId, Size};

/// Per-(color, size) bucket capacity. A production bug here (more than 3
/// copies of a piece in play) is a conservation-invariant violation, not a
/// user-facing error — see `Bank::return_piece`.
const BUCKET_CAP: usize = 3;

/// The multiset of pieces not currently on any board. Buckets are kept
/// sorted by ordinal so `take_smallest` and iteration are deterministic
/// across replays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    buckets: [[Vec<u8>; 3]; 4],
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BankError {
    #[error("piece {0} not found in bank")]
    NotFound(PieceId),
    #[error("no pieces of color {0} remain in bank")]
    Exhausted(Color),
    #[error("cannot return {0}: bank bucket is already full")]
    BucketFull(PieceId),
    #[error("piece {0} already present in bank")]
    AlreadyPresent(PieceId),
}

fn color_index(color: Color) -> usize {
    match color {
        Color::Yellow => 0,
        Color::Green => 1,
        Color::Blue => 2,
        Color::Red => 3,
    }
}

fn size_index(size: Size) -> usize {
    size.value() as usize - 1
}

impl Bank {
    /// The full 36-piece bank: every identity present, one bucket per
    /// (color, size), three ordinals each.
    pub fn full() -> Self {
        let mut buckets: [[Vec<u8>; 3]; 4] = Default::default();
        for ci in 0..4 {
            for si in 0..3 {
                buckets[ci][si] = vec![0, 1, 2];
            }
        }
        Self { buckets }
    }

    fn bucket(&self, color: Color, size: Size) -> &Vec<u8> {
        &self.buckets[color_index(color)][size_index(size)]
    }

    fn bucket_mut(&mut self, color: Color, size: Size) -> &mut Vec<u8> {
        &mut self.buckets[color_index(color)][size_index(size)]
    }

    /// Remove a specific piece by identity.
    pub fn take(&mut self, id: PieceId) -> Result<PieceId, BankError> {
        let bucket = self.bucket_mut(id.color, id.size);
        let pos = bucket
            .iter()
            .position(|&o| o == id.ordinal)
            .ok_or(BankError::NotFound(id))?;
        bucket.remove(pos);
        Ok(id)
    }

    /// Remove the smallest-size piece of `color`; ties resolved by first
    /// ordinal in the bucket (buckets are kept sorted ascending).
    pub fn take_smallest(&mut self, color: Color) -> Result<PieceId, BankError> {
        for size in Size::ALL {
            let bucket = self.bucket_mut(color, size);
            if !bucket.is_empty() {
                let ordinal = bucket.remove(0);
                return Ok(PieceId::new(color, size, ordinal));
            }
        }
        Err(BankError::Exhausted(color))
    }

    /// Reinsert a piece. Must not exceed the bucket cap of 3.
    pub fn return_piece(&mut self, id: PieceId) -> Result<(), BankError> {
        let bucket = self.bucket_mut(id.color, id.size);
        if bucket.contains(&id.ordinal) {
            return Err(BankError::AlreadyPresent(id));
        }
        if bucket.len() >= BUCKET_CAP {
            return Err(BankError::BucketFull(id));
        }
        let pos = bucket.iter().position(|&o| o > id.ordinal).unwrap_or(bucket.len());
        bucket.insert(pos, id.ordinal);
        Ok(())
    }

    pub fn contains(&self, id: PieceId) -> bool {
        self.bucket(id.color, id.size).contains(&id.ordinal)
    }

    pub fn inventory(&self, color: Color, size: Size) -> usize {
        self.bucket(color, size).len()
    }

    /// All pieces currently in the bank, in deterministic (color, size,
    /// ordinal) order.
    pub fn pieces(&self) -> impl Iterator<Item = PieceId> + '_ {
        Color::ALL.into_iter().flat_map(move |color| {
            Size::ALL.into_iter().flat_map(move |size| {
                self.bucket(color, size)
                    .iter()
                    .map(move |&ordinal| PieceId::new(color, size, ordinal))
            })
        })
    }

    pub fn total(&self) -> usize {
        self.buckets
            .iter()
            .flat_map(|sizes| sizes.iter())
            .map(Vec::len)
            .sum()
    }
}

impl Default for Bank {
    fn default() -> Self {
        Self::full()
    }
}
