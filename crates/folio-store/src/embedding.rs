//! Embedding vector helpers
//!
//! Vectors are stored as JSON arrays so the schema does not fix a
//! dimensionality; whatever the embedding provider returns is kept as-is.

use crate::StoreError;

/// Serialize an embedding for storage
pub fn encode_embedding(embedding: &[f32]) -> Result<String, StoreError> {
    serde_json::to_string(embedding)
        .map_err(|e| StoreError::InvalidData(format!("Failed to encode embedding: {}", e)))
}

/// Deserialize a stored embedding
pub fn decode_embedding(raw: &str) -> Result<Vec<f32>, StoreError> {
    serde_json::from_str(raw)
        .map_err(|e| StoreError::InvalidData(format!("Failed to decode embedding: {}", e)))
}

/// Calculate cosine similarity between two embedding vectors
///
/// Returns a value in [-1, 1]. Vectors of different length, or zero-length
/// vectors, are not comparable and score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}
