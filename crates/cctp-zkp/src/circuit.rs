//! # Test Circuits
//!
//! The circuits behind test proofs. A certificate or CSW test circuit
//! exposes its public inputs on one instance column and binds each to a
//! private witness through the gate `input * witness = product`, so the
//! prover must know the assignment and the verifier sees only the
//! inputs. Changing any public input after proving breaks the copy
//! constraint between the instance column and the `input` advice cell.
//!
//! Key material for a circuit is a pure function of the dlog parameters
//! and the circuit shape (its type and public-input count); that is what
//! lets serialized keys be re-derived on load.

use ff::Field;
use halo2_proofs::circuit::{Layouter, SimpleFloorPlanner, Value};
use halo2_proofs::plonk::{Advice, Circuit, Column, ConstraintSystem, Error, Instance, Selector};
use halo2_proofs::poly::Rotation;
use pasta_curves::Fp;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::ZkpError;

/// Public inputs of a certificate circuit before the custom fields.
pub const CERT_FIXED_PUBLIC_INPUTS: usize = 7;

/// Public inputs of a CSW circuit.
pub const CSW_PUBLIC_INPUTS: usize = 5;

/// Which statement a key or proof is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CircuitType {
    /// Sidechain certificate.
    Certificate,
    /// Ceased sidechain withdrawal.
    Csw,
}

impl CircuitType {
    pub fn tag(&self) -> u8 {
        match self {
            Self::Certificate => 0,
            Self::Csw => 1,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self, ZkpError> {
        match tag {
            0 => Ok(Self::Certificate),
            1 => Ok(Self::Csw),
            other => Err(ZkpError::invalid_value(
                "circuit type tag",
                format!("unknown tag {other}"),
            )),
        }
    }

    /// Public-input count of this circuit with `num_custom_fields` extra
    /// certificate fields. CSW circuits take none.
    pub fn num_public_inputs(&self, num_custom_fields: usize) -> Result<usize, ZkpError> {
        match self {
            Self::Certificate => Ok(CERT_FIXED_PUBLIC_INPUTS + num_custom_fields),
            Self::Csw if num_custom_fields == 0 => Ok(CSW_PUBLIC_INPUTS),
            Self::Csw => Err(ZkpError::invalid_value(
                "circuit shape",
                "CSW circuits take no custom fields",
            )),
        }
    }

    /// Fail unless a circuit of this type can have `num_public_inputs`.
    pub fn check_public_inputs(&self, num_public_inputs: usize) -> Result<(), ZkpError> {
        let valid = match self {
            Self::Certificate => num_public_inputs >= CERT_FIXED_PUBLIC_INPUTS,
            Self::Csw => num_public_inputs == CSW_PUBLIC_INPUTS,
        };
        if !valid {
            return Err(ZkpError::invalid_value(
                "circuit shape",
                format!("{self} circuit cannot have {num_public_inputs} public inputs"),
            ));
        }
        Ok(())
    }
}

/// Largest public-input count a test circuit fits in `2^k` rows.
pub fn max_public_inputs(k: u32) -> usize {
    let mut cs = ConstraintSystem::<Fp>::default();
    TestCircuit::configure(&mut cs);
    1usize
        .checked_shl(k)
        .unwrap_or(usize::MAX)
        .saturating_sub(cs.blinding_factors() + 1)
}

/// Fail unless `num_public_inputs` fit in `2^k` rows.
pub(crate) fn check_fits(num_public_inputs: usize, k: u32) -> Result<(), ZkpError> {
    let max = max_public_inputs(k);
    if num_public_inputs > max {
        return Err(ZkpError::invalid_value(
            "circuit shape",
            format!("{num_public_inputs} public inputs exceed the {max} usable rows at k = {k}"),
        ));
    }
    Ok(())
}

impl std::fmt::Display for CircuitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Certificate => f.write_str("certificate"),
            Self::Csw => f.write_str("csw"),
        }
    }
}

// ---------------------------------------------------------------------------
// Circuit
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct TestCircuitConfig {
    input: Column<Advice>,
    witness: Column<Advice>,
    product: Column<Advice>,
    instance: Column<Instance>,
    selector: Selector,
}

/// Public-input binding circuit used for test keys and proofs.
#[derive(Clone, Debug)]
pub struct TestCircuit {
    public_inputs: Vec<Value<Fp>>,
    witnesses: Vec<Value<Fp>>,
}

impl TestCircuit {
    /// The circuit with no assignment, for key generation.
    pub fn shape(num_public_inputs: usize) -> Self {
        Self {
            public_inputs: vec![Value::unknown(); num_public_inputs],
            witnesses: vec![Value::unknown(); num_public_inputs],
        }
    }

    /// The circuit assigned to `public_inputs` with a fresh random witness.
    pub fn with_witness(public_inputs: &[Fp], mut rng: impl RngCore) -> Self {
        Self {
            public_inputs: public_inputs.iter().copied().map(Value::known).collect(),
            witnesses: public_inputs
                .iter()
                .map(|_| Value::known(Fp::random(&mut rng)))
                .collect(),
        }
    }

    pub fn num_public_inputs(&self) -> usize {
        self.public_inputs.len()
    }
}

impl Circuit<Fp> for TestCircuit {
    type Config = TestCircuitConfig;
    type FloorPlanner = SimpleFloorPlanner;

    fn without_witnesses(&self) -> Self {
        Self::shape(self.public_inputs.len())
    }

    fn configure(meta: &mut ConstraintSystem<Fp>) -> Self::Config {
        let input = meta.advice_column();
        let witness = meta.advice_column();
        let product = meta.advice_column();
        let instance = meta.instance_column();
        let selector = meta.selector();

        meta.enable_equality(input);
        meta.enable_equality(instance);

        meta.create_gate("public input binding", |meta| {
            let s = meta.query_selector(selector);
            let x = meta.query_advice(input, Rotation::cur());
            let w = meta.query_advice(witness, Rotation::cur());
            let p = meta.query_advice(product, Rotation::cur());
            vec![s * (x * w - p)]
        });

        TestCircuitConfig {
            input,
            witness,
            product,
            instance,
            selector,
        }
    }

    fn synthesize(&self, config: Self::Config, mut layouter: impl Layouter<Fp>) -> Result<(), Error> {
        let cells = layouter.assign_region(
            || "public inputs",
            |mut region| {
                let mut cells = Vec::with_capacity(self.public_inputs.len());
                for (row, (x, w)) in self.public_inputs.iter().zip(&self.witnesses).enumerate() {
                    config.selector.enable(&mut region, row)?;
                    let cell = region.assign_advice(|| "input", config.input, row, || *x)?;
                    region.assign_advice(|| "witness", config.witness, row, || *w)?;
                    region.assign_advice(|| "product", config.product, row, || *x * *w)?;
                    cells.push(cell);
                }
                Ok(cells)
            },
        )?;

        for (row, cell) in cells.iter().enumerate() {
            layouter.constrain_instance(cell.cell(), config.instance, row)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
