//! # Poseidon — Field-Native Sponge Hash
//!
//! A width-3, rate-2 Poseidon sponge over the library's prime field. It is
//! the compression function of the Ginger Merkle tree and the digest used
//! for certificate data and sidechain identifiers.
//!
//! ## Algorithm
//!
//! Parameters are the 128-bit-security `P128Pow5T3` instance: 8 full
//! rounds split around 56 partial rounds, S-box `x^5`, and the round
//! constants and MDS matrix generated for that instance. Every round adds
//! the round constants, applies the S-box (to the whole state in full
//! rounds, to `state[0]` in partial rounds), then multiplies by the MDS
//! matrix.
//!
//! The sponge starts from the all-zero state. Inputs fill a rate block of
//! two elements; a full block is added into `state[0..2]` and the state is
//! permuted. The digest is `state[0]` after the last block.
//!
//! ## Modes
//!
//! - **Constant length `n`**: finalizes only after exactly `n` absorbs. A
//!   partial last block is zero-padded.
//! - **Variable length, mod rate**: finalizes only on a nonzero multiple of
//!   the rate, so no padding block is ever added. A constant-length digest
//!   and a mod-rate digest over the same two inputs therefore agree.
//! - **Variable length**: always finalizes. The stream is padded with a
//!   single one followed by zeros up to the block boundary; the padding
//!   block is added even when the stream already ends on a boundary.
//!
//! Finalization works on a copy of the sponge, so it is a query: it can be
//! repeated and followed by further absorbs.

use ff::Field;
use halo2_gadgets::poseidon::primitives::{P128Pow5T3, Spec};
use once_cell::sync::Lazy;
use pasta_curves::Fp;

use cctp_core::FieldElement;

use crate::error::HashError;

/// Number of field elements in the permutation state.
pub const POSEIDON_WIDTH: usize = 3;

/// Number of field elements absorbed per permutation.
pub const POSEIDON_RATE: usize = 2;

// ---------------------------------------------------------------------------
// Permutation
// ---------------------------------------------------------------------------

struct PoseidonParameters {
    round_constants: Vec<[Fp; POSEIDON_WIDTH]>,
    mds: [[Fp; POSEIDON_WIDTH]; POSEIDON_WIDTH],
    full_rounds: usize,
    partial_rounds: usize,
}

static PARAMETERS: Lazy<PoseidonParameters> = Lazy::new(|| {
    let (round_constants, mds, _) =
        <P128Pow5T3 as Spec<Fp, POSEIDON_WIDTH, POSEIDON_RATE>>::constants();
    PoseidonParameters {
        round_constants,
        mds,
        full_rounds: <P128Pow5T3 as Spec<Fp, POSEIDON_WIDTH, POSEIDON_RATE>>::full_rounds(),
        partial_rounds: <P128Pow5T3 as Spec<Fp, POSEIDON_WIDTH, POSEIDON_RATE>>::partial_rounds(),
    }
});

fn sbox(x: Fp) -> Fp {
    <P128Pow5T3 as Spec<Fp, POSEIDON_WIDTH, POSEIDON_RATE>>::sbox(x)
}

/// Apply the Poseidon permutation to `state` in place.
pub(crate) fn permute(state: &mut [Fp; POSEIDON_WIDTH]) {
    let params = &*PARAMETERS;
    let first_partial = params.full_rounds / 2;
    let last_partial = first_partial + params.partial_rounds;

    for (round, constants) in params.round_constants.iter().enumerate() {
        for (word, c) in state.iter_mut().zip(constants.iter()) {
            *word += c;
        }
        if (first_partial..last_partial).contains(&round) {
            state[0] = sbox(state[0]);
        } else {
            for word in state.iter_mut() {
                *word = sbox(*word);
            }
        }

        let mut mixed = [Fp::ZERO; POSEIDON_WIDTH];
        for (out, row) in mixed.iter_mut().zip(params.mds.iter()) {
            for (m, word) in row.iter().zip(state.iter()) {
                *out += *m * word;
            }
        }
        *state = mixed;
    }
}

// ---------------------------------------------------------------------------
// Sponge
// ---------------------------------------------------------------------------

/// Finalization rule of a [`PoseidonDigest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestMode {
    /// Exactly this many inputs must be absorbed.
    ConstantLength(usize),
    /// Any number of inputs; `mod_rate` demands a nonzero multiple of the
    /// rate and disables padding.
    VariableLength {
        /// Whether the input count must be a multiple of the rate.
        mod_rate: bool,
    },
}

/// A stateful Poseidon sponge over [`FieldElement`]s.
#[derive(Debug, Clone)]
pub struct PoseidonDigest {
    mode: DigestMode,
    state: [Fp; POSEIDON_WIDTH],
    pending: Vec<Fp>,
    absorbed: usize,
}

impl PoseidonDigest {
    /// A digest that finalizes after exactly `input_size` inputs.
    pub fn constant_length(input_size: usize) -> Result<Self, HashError> {
        if input_size == 0 {
            return Err(HashError::ZeroArity);
        }
        Ok(Self::with_mode(DigestMode::ConstantLength(input_size)))
    }

    /// A digest over an input stream of any length.
    pub fn variable_length(mod_rate: bool) -> Self {
        Self::with_mode(DigestMode::VariableLength { mod_rate })
    }

    fn with_mode(mode: DigestMode) -> Self {
        Self {
            mode,
            state: [Fp::ZERO; POSEIDON_WIDTH],
            pending: Vec::with_capacity(POSEIDON_RATE),
            absorbed: 0,
        }
    }

    pub fn mode(&self) -> DigestMode {
        self.mode
    }

    /// Number of inputs absorbed since construction or the last reset.
    pub fn absorbed(&self) -> usize {
        self.absorbed
    }

    /// Absorb one input. Arity violations surface at [`Self::finalize`].
    pub fn update(&mut self, input: &FieldElement) -> &mut Self {
        self.pending.push(input.inner());
        self.absorbed += 1;
        if self.pending.len() == POSEIDON_RATE {
            self.absorb_pending();
        }
        self
    }

    /// Whether [`Self::finalize`] would succeed now.
    pub fn is_finalizable(&self) -> bool {
        self.check_finalizable().is_ok()
    }

    fn check_finalizable(&self) -> Result<(), HashError> {
        match self.mode {
            DigestMode::ConstantLength(expected) if self.absorbed != expected => {
                Err(HashError::ArityMismatch {
                    expected,
                    absorbed: self.absorbed,
                })
            }
            DigestMode::VariableLength { mod_rate: true }
                if self.absorbed == 0 || self.absorbed % POSEIDON_RATE != 0 =>
            {
                Err(HashError::NotModRate {
                    absorbed: self.absorbed,
                    rate: POSEIDON_RATE,
                })
            }
            _ => Ok(()),
        }
    }

    /// Compute the digest of everything absorbed so far.
    ///
    /// Does not consume or alter the sponge: calling it again without an
    /// intervening [`Self::update`] returns the same value.
    pub fn finalize(&self) -> Result<FieldElement, HashError> {
        self.check_finalizable()?;

        let mut sponge = self.clone();
        match sponge.mode {
            DigestMode::VariableLength { mod_rate: false } => {
                sponge.pending.push(Fp::ONE);
                sponge.pad_and_absorb();
            }
            _ if !sponge.pending.is_empty() => sponge.pad_and_absorb(),
            _ => {}
        }
        Ok(FieldElement::from(sponge.state[0]))
    }

    /// Return to the freshly constructed state, keeping the mode.
    pub fn reset(&mut self) {
        *self = Self::with_mode(self.mode);
    }

    fn pad_and_absorb(&mut self) {
        self.pending.resize(POSEIDON_RATE, Fp::ZERO);
        self.absorb_pending();
    }

    fn absorb_pending(&mut self) {
        for (word, input) in self.state.iter_mut().zip(self.pending.drain(..)) {
            *word += input;
        }
        permute(&mut self.state);
    }
}

// ---------------------------------------------------------------------------
// One-shot helpers
// ---------------------------------------------------------------------------

/// Constant-length digest of `inputs`, with arity `inputs.len()`.
pub fn hash_constant_length(inputs: &[FieldElement]) -> Result<FieldElement, HashError> {
    let mut digest = PoseidonDigest::constant_length(inputs.len())?;
    for input in inputs {
        digest.update(input);
    }
    digest.finalize()
}

/// Two-to-one compression, identical to a constant-length digest of arity 2.
pub fn hash_two(left: &FieldElement, right: &FieldElement) -> FieldElement {
    let mut state = [left.inner(), right.inner(), Fp::ZERO];
    permute(&mut state);
    FieldElement::from(state[0])
}

/// A domain-separated constant: the arity-1 digest of `tag` read as a
/// big-endian integer.
///
/// Tags are short ASCII labels; anything longer than 31 bytes wraps
/// modulo the field, which is still deterministic.
pub fn domain_constant(tag: &[u8]) -> FieldElement {
    let base = Fp::from(256u64);
    let packed = tag
        .iter()
        .fold(Fp::ZERO, |acc, byte| acc * base + Fp::from(u64::from(*byte)));
    let mut state = [packed, Fp::ZERO, Fp::ZERO];
    permute(&mut state);
    FieldElement::from(state[0])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
