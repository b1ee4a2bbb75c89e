//! Convergence verification for sync protocol.
//!
//! After syncing, two nodes can check whether they ended up knowing the
//! same entries, either from their state vectors alone or by walking the
//! stored logs.

use svs_core::{compare, StateVector, WriterId};
use svs_store::{Store, StoreExt};

use crate::error::Result;

/// Result of convergence verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvergenceResult {
    /// Both sides know exactly the same entries.
    Converged,
    /// The local side lacks `missing` entries the remote has, and nothing more.
    Behind { missing: u64 },
    /// The remote lacks entries we have, and nothing more.
    Ahead,
    /// Each side knows entries the other does not.
    Diverged { missing: u64 },
    /// Both logs hold different payloads at the same position.
    Forked { writer: WriterId, seq: u64 },
}

impl ConvergenceResult {
    /// Check if nodes have converged.
    pub fn is_converged(&self) -> bool {
        matches!(self, ConvergenceResult::Converged)
    }
}

/// Compare two state vectors.
pub fn vector_convergence(local: &StateVector, remote: &StateVector) -> ConvergenceResult {
    let comparison = compare(local, remote);
    let missing = comparison.missing_count();

    match (missing > 0, comparison.remote_outdated) {
        (false, false) => ConvergenceResult::Converged,
        (true, false) => ConvergenceResult::Behind { missing },
        (false, true) => ConvergenceResult::Ahead,
        (true, true) => ConvergenceResult::Diverged { missing },
    }
}

/// Compare two stores entry by entry.
///
/// The stored vectors must match and, for every writer, both logs must hold
/// the same seqs with identical payloads.
pub async fn verify_convergence<A, B>(local: &A, remote: &B) -> Result<ConvergenceResult>
where
    A: Store + ?Sized,
    B: Store + ?Sized,
{
    let local_vector = local.load_state_vector().await?;
    let remote_vector = remote.load_state_vector().await?;

    let by_vector = vector_convergence(&local_vector, &remote_vector);
    if !by_vector.is_converged() {
        return Ok(by_vector);
    }

    for entry in local_vector.iter() {
        let ours = local.get_entries_range(&entry.writer, 1, entry.seq).await?;
        let theirs = remote.get_entries_range(&entry.writer, 1, entry.seq).await?;

        for ((seq, a), (other_seq, b)) in ours.iter().zip(theirs.iter()) {
            if seq != other_seq {
                // Gap on one side: the lower seq exists only there
                return Ok(ConvergenceResult::Diverged { missing: 1 });
            }
            if a != b {
                return Ok(ConvergenceResult::Forked {
                    writer: entry.writer.clone(),
                    seq: *seq,
                });
            }
        }
        if ours.len() != theirs.len() {
            return Ok(ConvergenceResult::Diverged {
                missing: ours.len().abs_diff(theirs.len()) as u64,
            });
        }
    }

    Ok(ConvergenceResult::Converged)
}
