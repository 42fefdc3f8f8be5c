/// Rounds to one decimal place.
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Rounds to two decimal places.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Converts pixel counts into percentages with one decimal that add up to
/// exactly 100.0.
///
/// Each share is first truncated to tenths of a percent; the missing tenths
/// go to the largest remainders, earlier entries winning ties. Entries with
/// a zero count always stay at 0.0. Returns all zeros when `total` is 0.
pub fn apportion_percentages(counts: &[u64], total: u64) -> Vec<f64> {
    if total == 0 {
        return vec![0.0; counts.len()];
    }
    let total = total as u128;
    let mut tenths: Vec<u128> = Vec::with_capacity(counts.len());
    let mut remainders: Vec<(usize, u128)> = Vec::with_capacity(counts.len());
    for (i, &c) in counts.iter().enumerate() {
        let scaled = c as u128 * 1000;
        tenths.push(scaled / total);
        remainders.push((i, scaled % total));
    }

    let assigned: u128 = tenths.iter().sum();
    let missing = 1000u128.saturating_sub(assigned) as usize;
    // Stable sort keeps declaration order among equal remainders.
    remainders.sort_by(|a, b| b.1.cmp(&a.1));
    for &(i, rem) in remainders.iter().take(missing) {
        if rem > 0 {
            tenths[i] += 1;
        }
    }

    tenths.into_iter().map(|t| t as f64 / 10.0).collect()
}
