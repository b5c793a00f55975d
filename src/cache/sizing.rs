//! Size Estimator Module
//!
//! Approximates the memory footprint of a value so the store can do capacity
//! accounting without heap introspection.

use serde::Serialize;

/// Bytes charged per serialized character.
///
/// Matches UTF-16 string storage, which is what the cached payloads cost in
/// the runtimes producing them; the estimate only needs to scale with real
/// size, not equal allocator bytes.
const BYTES_PER_CHAR: u64 = 2;

// == Estimated Size ==
/// Returns an approximate byte footprint for `value`.
///
/// The footprint is the serialized length times [`BYTES_PER_CHAR`]. Values
/// that refuse to serialize are charged the `fallback` size instead; this
/// function never fails.
pub fn estimated_size<T: Serialize + ?Sized>(value: &T, fallback: u64) -> u64 {
    match serde_json::to_string(value) {
        Ok(serialized) => serialized.len() as u64 * BYTES_PER_CHAR,
        Err(_) => fallback,
    }
}
