//! Seeded randomness for item selection.
//!
//! Selection only needs reproducibility, so the default source is a
//! Park-Miller multiplicative congruential generator. Anything implementing
//! [`SelectionRng`] can be injected instead, including any `rand` generator
//! through [`RandSource`].

use rand::Rng;

const MODULUS: u64 = 2_147_483_647;
const MULTIPLIER: u64 = 48_271;

pub trait SelectionRng {
    /// Uniform value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        let idx = (self.next_unit() * len as f64).floor() as usize;
        idx.min(len.saturating_sub(1))
    }
}

impl<R: SelectionRng + ?Sized> SelectionRng for &mut R {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LehmerRng {
    state: u64,
}

impl LehmerRng {
    pub fn new(seed: u64) -> Self {
        let mut state = seed % MODULUS;
        if state == 0 {
            state = 1;
        }
        Self { state }
    }

    pub fn next_raw(&mut self) -> u64 {
        self.state = self.state * MULTIPLIER % MODULUS;
        self.state
    }
}

impl SelectionRng for LehmerRng {
    fn next_unit(&mut self) -> f64 {
        // state is in [1, MODULUS - 1]
        (self.next_raw() - 1) as f64 / (MODULUS - 1) as f64
    }
}

/// Adapter for generators from the `rand` ecosystem.
#[derive(Debug, Clone)]
pub struct RandSource<R>(pub R);

impl<R: rand::RngCore> SelectionRng for RandSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}
