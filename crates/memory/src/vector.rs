//! Vector similarity utilities.
//!
//! Pure-Rust cosine similarity and ranking over memory records. Ranking is
//! deterministic: a stable sort on similarity means equal scores keep their
//! insertion order, so identical queries over identical records always
//! produce the same result.

use memoclaw_core::memory::MemoryRecord;

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if either vector is zero-length or empty.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Rank records by cosine similarity to a query embedding.
///
/// Returns up to `k` records sorted most-similar first. Ties keep the
/// records' original order (stable sort), which for append-only partitions
/// means insertion order.
pub fn rank_by_similarity<'a>(
    records: &'a [MemoryRecord],
    query_embedding: &[f32],
    k: usize,
) -> Vec<&'a MemoryRecord> {
    let mut scored: Vec<(f32, &MemoryRecord)> = records
        .iter()
        .map(|r| (cosine_similarity(&r.embedding, query_embedding), r))
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);
    scored.into_iter().map(|(_, r)| r).collect()
}
