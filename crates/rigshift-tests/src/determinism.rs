//! Determinism checks for retargeting tables.
//!
//! Rebuilding a table from the same two skeletons must produce bit-identical
//! components. Tables are flattened to bytes in canonical slot order and
//! compared run by run; the BLAKE3 hash of the bytes is the table's
//! fingerprint.
//!
//! # Example
//!
//! ```rust,ignore
//! use rigshift_tests::determinism::{table_fingerprint, verify_determinism, table_bytes};
//!
//! let result = verify_determinism(|| table_bytes(&build()), 3);
//! result.assert_deterministic();
//! println!("table {}", table_fingerprint(&build()));
//! ```

use std::fmt;

use rigshift_core::{CanonicalSlot, RetargetTable};

/// Bytes written per slot: mapped flag plus three quaternions.
pub const SLOT_RECORD_SIZE: usize = 1 + 3 * 16;

/// Result of a determinism verification.
#[derive(Debug, Clone)]
pub struct DeterminismResult {
    /// Whether all runs produced identical output.
    pub is_deterministic: bool,
    /// Number of runs performed.
    pub runs: usize,
    /// Size of the output in bytes.
    pub output_size: usize,
    /// BLAKE3 hash of the first run.
    pub hash: String,
    /// First difference found, if any.
    pub diff_info: Option<DiffInfo>,
}

/// Location of the first differing byte between two runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffInfo {
    /// Byte offset where the difference was found.
    pub offset: usize,
    /// Run (0-indexed) that differed from run 0.
    pub run_index: usize,
    /// Slot owning the byte, when the output is a flattened table.
    pub slot: Option<CanonicalSlot>,
}

impl fmt::Display for DiffInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "difference at byte {} (run {})", self.offset, self.run_index)?;
        if let Some(slot) = self.slot {
            write!(f, " in slot {}", slot)?;
        }
        Ok(())
    }
}

impl DeterminismResult {
    /// Panics with a detailed message if not deterministic.
    pub fn assert_deterministic(&self) {
        if let Some(diff) = &self.diff_info {
            panic!(
                "Non-deterministic output detected!\n\
                 Runs: {}\n\
                 Output size: {} bytes\n\
                 Hash: {}\n\
                 {}",
                self.runs, self.output_size, self.hash, diff
            );
        }
    }
}

/// Flattens a table to bytes in canonical slot order.
pub fn table_bytes(table: &RetargetTable) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(rigshift_core::SLOT_COUNT * SLOT_RECORD_SIZE);
    for (_, component, mapped) in table.iter() {
        bytes.push(mapped as u8);
        for q in [
            component.source_rest_local,
            component.dest_rest_local,
            component.frame_change,
        ] {
            for value in q.to_array() {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
        }
    }
    bytes
}

/// BLAKE3 fingerprint of a table.
pub fn table_fingerprint(table: &RetargetTable) -> String {
    compute_hash(&table_bytes(table))
}

/// Computes the BLAKE3 hash of data as a hex string.
pub fn compute_hash(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Runs `generate_fn` `runs` times and compares every output to the first.
pub fn verify_determinism<F, O>(generate_fn: F, runs: usize) -> DeterminismResult
where
    F: Fn() -> O,
    O: AsRef<[u8]>,
{
    assert!(runs >= 2, "Must run at least 2 times to verify determinism");

    let reference = generate_fn();
    let reference = reference.as_ref();
    let hash = compute_hash(reference);

    for run_index in 1..runs {
        let output = generate_fn();
        let output = output.as_ref();
        let offset = reference
            .iter()
            .zip(output.iter())
            .position(|(a, b)| a != b)
            .or_else(|| (reference.len() != output.len()).then(|| reference.len().min(output.len())));

        if let Some(offset) = offset {
            let slot = if reference.len() == rigshift_core::SLOT_COUNT * SLOT_RECORD_SIZE {
                CanonicalSlot::from_index(offset / SLOT_RECORD_SIZE)
            } else {
                None
            };
            return DeterminismResult {
                is_deterministic: false,
                runs,
                output_size: reference.len(),
                hash,
                diff_info: Some(DiffInfo {
                    offset,
                    run_index,
                    slot,
                }),
            };
        }
    }

    DeterminismResult {
        is_deterministic: true,
        runs,
        output_size: reference.len(),
        hash,
        diff_info: None,
    }
}
