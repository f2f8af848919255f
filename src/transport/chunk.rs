//! # Chunked Writes
//!
//! A BLE write carries at most one ATT payload. With the default MTU of 23
//! that is 20 bytes, so a receipt goes out as a run of small writes:
//!
//! ```text
//! [0..20) [20..40) [40..60) ... [n-k..n)
//! ```
//!
//! Chunks cover the payload left to right with no gaps or overlap; every
//! chunk but the last is exactly the chunk size.

/// Default bytes per write. Safe for any ATT MTU; larger negotiated MTUs
/// allow more, see [`TransportConfig`](super::TransportConfig).
pub const MAX_CHUNK_BYTES: usize = 20;

/// Largest value a single ATT attribute write can carry.
pub const MAX_ATT_VALUE_BYTES: usize = 512;

/// Split `data` into consecutive chunks of at most `max` bytes.
///
/// An empty payload yields no chunks.
///
/// # Panics
///
/// Panics if `max` is zero. [`TransportConfig::validate`](super::TransportConfig::validate)
/// rejects that value before it reaches here.
pub fn split(data: &[u8], max: usize) -> Vec<&[u8]> {
    data.chunks(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(len: usize, max: usize) {
        let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        let chunks = split(&data, max);

        assert_eq!(chunks.concat(), data, "len={} max={}", len, max);
        assert_eq!(chunks.len(), len.div_ceil(max));
        if let Some((last, full)) = chunks.split_last() {
            assert!(full.iter().all(|c| c.len() == max));
            assert!(!last.is_empty() && last.len() <= max);
        }
    }

    #[test]
    fn test_chunks_reassemble() {
        for len in [1, 19, 20, 21, 40, 41, 613] {
            check(len, MAX_CHUNK_BYTES);
        }
        check(613, 1);
        check(613, 182);
        check(10, 512);
    }

    #[test]
    fn test_empty_payload() {
        assert!(split(&[], MAX_CHUNK_BYTES).is_empty());
    }

    #[test]
    fn test_exact_multiple() {
        let data = [7u8; 60];
        let chunks = split(&data, 20);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() == 20));
    }
}
