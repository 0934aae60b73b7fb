//! Trailing-window arithmetic over columns with gaps.
//!
//! Every function returns one output per input, aligned by index. A `None`
//! input is a missing value: any window that contains one yields `None`, and
//! so does every window that is not yet full.

use std::num::NonZeroUsize;

/// Simple percentage change between consecutive values.
///
/// The first element has no predecessor and is `None`. A zero predecessor
/// also yields `None` instead of an infinity.
pub fn pct_change(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(values.windows(2).map(|pair| match (pair[0], pair[1]) {
        (Some(prev), Some(cur)) if prev != 0.0 => {
            Some((cur - prev) / prev).filter(|r| r.is_finite())
        }
        _ => None,
    }));
    out
}

/// Arithmetic mean over the trailing `window` values ending at each index.
pub fn trailing_mean(values: &[Option<f64>], window: NonZeroUsize) -> Vec<Option<f64>> {
    rolling(values, window, |xs| Some(xs.iter().sum::<f64>() / xs.len() as f64))
}

/// Sample standard deviation (N−1 denominator) over the trailing `window`
/// values ending at each index.
///
/// A window of one has a zero denominator, so every output is `None`.
pub fn trailing_sample_std(values: &[Option<f64>], window: NonZeroUsize) -> Vec<Option<f64>> {
    rolling(values, window, sample_std)
}

fn sample_std(xs: &[f64]) -> Option<f64> {
    let n = xs.len();
    if n < 2 {
        return None;
    }
    let mean = xs.iter().sum::<f64>() / n as f64;
    let sum_sq: f64 = xs.iter().map(|x| (x - mean).powi(2)).sum();
    Some((sum_sq / (n - 1) as f64).max(0.0).sqrt())
}

fn rolling<F>(values: &[Option<f64>], window: NonZeroUsize, stat: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let w = window.get();
    if w > values.len() {
        return vec![None; values.len()];
    }
    let mut buf = Vec::with_capacity(w);

    (0..values.len())
        .map(|t| {
            if t + 1 < w {
                return None;
            }
            buf.clear();
            for v in &values[t + 1 - w..=t] {
                buf.push((*v)?);
            }
            stat(&buf).filter(|x| x.is_finite())
        })
        .collect()
}
