//! Seedable pseudo-random draws.
//!
//! Each draw hashes the pool seed, a running nonce, a caller-chosen subject
//! and the current block position. The result is reproducible for a given
//! seed and block, which keeps tests deterministic, and it is *not*
//! unpredictable to block producers. Good enough for odds rolls and faucet
//! amounts, nothing more.

use ink::env::hash::Keccak256;
use ink::prelude::vec::Vec;

/// Keccak-256 of `input`.
pub fn keccak(input: &[u8]) -> [u8; 32] {
    let mut output = [0u8; 32];
    ink::env::hash_bytes::<Keccak256>(input, &mut output);
    output
}

#[derive(Debug, Clone, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct EntropyPool {
    seed: [u8; 32],
    nonce: u64,
}

impl EntropyPool {
    pub fn new(seed: [u8; 32]) -> Self {
        Self { seed, nonce: 0 }
    }

    /// Derive a seed from whatever the deployer cannot easily choose after
    /// the fact: its own account, the deployment timestamp and block.
    pub fn seed_from(deployer: &[u8], timestamp: u64, block: u32) -> [u8; 32] {
        let mut preimage = Vec::with_capacity(deployer.len() + 12);
        preimage.extend_from_slice(deployer);
        preimage.extend_from_slice(&timestamp.to_be_bytes());
        preimage.extend_from_slice(&block.to_be_bytes());
        keccak(&preimage)
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Uniform-ish value in `[0, range)`. A zero range yields zero.
    pub fn draw(&mut self, subject: &[u8], timestamp: u64, block: u32, range: u64) -> u64 {
        let word = self.next_word(subject, timestamp, block);
        if range == 0 {
            return 0;
        }
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&word[0..8]);
        u64::from_be_bytes(buf) % range
    }

    /// Value in the inclusive range `[low, high]`.
    pub fn draw_between(
        &mut self,
        subject: &[u8],
        timestamp: u64,
        block: u32,
        low: u64,
        high: u64,
    ) -> u64 {
        if high <= low {
            // Still advance so consecutive draws never repeat a word.
            self.next_word(subject, timestamp, block);
            return low;
        }
        let span = (high - low).saturating_add(1);
        low + self.draw(subject, timestamp, block, span)
    }

    fn next_word(&mut self, subject: &[u8], timestamp: u64, block: u32) -> [u8; 32] {
        let mut preimage = Vec::with_capacity(32 + 8 + subject.len() + 12);
        preimage.extend_from_slice(&self.seed);
        preimage.extend_from_slice(&self.nonce.to_be_bytes());
        preimage.extend_from_slice(subject);
        preimage.extend_from_slice(&timestamp.to_be_bytes());
        preimage.extend_from_slice(&block.to_be_bytes());
        self.nonce = self.nonce.wrapping_add(1);
        keccak(&preimage)
    }
}
