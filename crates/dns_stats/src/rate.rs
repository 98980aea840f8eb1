/// Difference each bucket against the one after it: `out[k] = input[k] -
/// input[k + 1]`. With newest-first buckets of cumulative counters this is
/// the amount added during bucket `k`.
///
/// Inputs with fewer than two buckets have no adjacent pairs and produce an
/// empty series.
pub fn compute_rate(input: &[f64]) -> Vec<f64> {
    input.windows(2).map(|pair| pair[0] - pair[1]).collect()
}
