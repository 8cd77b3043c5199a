use bytes::Bytes;

/// Deterministic pseudo-random test data; the same seed yields the same bytes.
pub fn seeded_bytes(seed: u64, len: usize) -> Bytes {
    let mut data = vec![0u8; len];
    let mut state = seed;

    // Simple LCG (Linear Congruential Generator)
    for chunk in data.chunks_mut(8) {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let bytes = state.to_le_bytes();
        chunk.copy_from_slice(&bytes[..chunk.len()]);
    }

    Bytes::from(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_bytes_deterministic() {
        assert_eq!(seeded_bytes(1, 100), seeded_bytes(1, 100));
        assert_ne!(seeded_bytes(1, 100), seeded_bytes(2, 100));
        assert_eq!(seeded_bytes(3, 13).len(), 13);
    }
}
