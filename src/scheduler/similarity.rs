//! Cosine similarity between supplied embedding vectors.

/// Cosine similarity of two vectors.
///
/// Returns None for empty or mismatched vectors and for zero-norm input.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let x64 = f64::from(x);
        let y64 = f64::from(y);
        dot += x64 * y64;
        norm_a += x64 * x64;
        norm_b += y64 * y64;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f64::EPSILON {
        return None;
    }
    Some(dot / denom)
}

/// True when the two vectors are at least `threshold` similar.
pub fn is_near_duplicate(a: &[f32], b: &[f32], threshold: f64) -> bool {
    cosine_similarity(a, b).is_some_and(|sim| sim >= threshold)
}
