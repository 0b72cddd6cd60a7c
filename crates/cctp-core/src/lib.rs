//! # cctp-core — Foundational Types
//!
//! The leaf of the crate graph. Defines the prime-field element every
//! other crate hashes, accumulates and feeds to circuits, together with
//! the flat error-code taxonomy shared across the workspace.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cctp-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Field decoding never reduces: non-canonical encodings are errors.

pub mod error;
pub mod field;

pub use error::{result_code, CodedError, ErrorCode, FieldError};
pub use field::{FieldElement, FIELD_SIZE};
