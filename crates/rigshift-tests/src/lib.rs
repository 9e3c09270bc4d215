//! rigshift integration test infrastructure
//!
//! This crate holds the skeleton fixtures and determinism helpers used by the
//! integration tests of the retargeting flow:
//!
//! - **Identity**: retargeting a skeleton onto itself is a no-op
//! - **Pipeline**: setup, rest-in/rest-out, unmapped slots, recalibration
//! - **Runtime gaps**: stream gaps and partial frames
//! - **Properties**: proptest coverage of the rotation algebra
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p rigshift-tests
//! ```

pub mod determinism;
pub mod fixtures;

pub use determinism::{
    compute_hash, table_bytes, table_fingerprint, verify_determinism, DeterminismResult, DiffInfo,
};
pub use fixtures::CapturingSink;
