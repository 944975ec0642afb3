use crate::pow::valid_proof;
use rayon::prelude::*;
use tracing::info;

/// Searches proofs in parallel, `window` candidates at a time, and returns the
/// smallest proof that satisfies `valid_proof(last_proof, _)`.
///
/// Each window is scanned with `find_first`, so the answer matches
/// [`crate::pow::proof_of_work`] exactly; windows are visited in ascending order.
pub fn proof_of_work_parallel(last_proof: u64, window: u64) -> u64 {
    let window = window.max(1);
    let mut start = 0u64;
    loop {
        let end = start.saturating_add(window);
        let found = (start..end)
            .into_par_iter()
            .find_first(|proof| valid_proof(last_proof, *proof));
        if let Some(proof) = found {
            info!(last_proof, proof, "mined proof");
            return proof;
        }
        start = end;
    }
}
