/// Trailing simple moving average, aligned with `prices`.
///
/// The first `window - 1` slots are `None` (not enough history). Each defined
/// slot `i` is the plain mean of `prices[i + 1 - window ..= i]`, summed left to
/// right so it matches a naive recomputation bit for bit. A window of 0 or one
/// longer than the series gives all `None`.
pub fn simple_moving_average(prices: &[f64], window: usize) -> Vec<Option<f64>> {
    let len = prices.len();
    if window == 0 || window > len {
        return vec![None; len];
    }

    let mut out = Vec::with_capacity(len);
    out.extend(std::iter::repeat_n(None, window - 1));
    out.extend(
        prices
            .windows(window)
            .map(|w| Some(w.iter().sum::<f64>() / window as f64)),
    );
    out
}
