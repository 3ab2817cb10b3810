/// Floor of the arithmetic mean of busy levels. Returns 0 for empty input.
///
/// Levels are non-negative so integer division is the floor.
pub fn floor_mean(values: &[u8]) -> u8 {
    if values.is_empty() {
        return 0;
    }
    let sum: u64 = values.iter().map(|&v| u64::from(v)).sum();
    (sum / values.len() as u64) as u8
}
