use crate::error::OverlayError;

/// Searches the next smaller index to `value` in a monotonically increasing
/// sequence.
///
/// If `value == sequence[i]` the result is `i - 1`; values at or below the
/// first element map to `0`. The last index is only returned for values
/// strictly larger than every element.
pub fn next_smaller_index(sequence: &[f64], value: f64) -> Result<usize, OverlayError> {
    if sequence.len() < 2 {
        return Err(OverlayError::InvalidArgument(format!(
            "sequence needs at least 2 elements, got {}",
            sequence.len()
        )));
    }
    // First index whose element is not below `value`.
    let mut low = 0;
    let mut high = sequence.len();
    while low < high {
        let mid = (low + high) / 2;
        if sequence[mid] < value {
            low = mid + 1;
        } else {
            high = mid;
        }
    }
    Ok(low.saturating_sub(1))
}
