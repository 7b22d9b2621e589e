//! Trailing window functions.
//!
//! Every value at position `i` is computed from positions `<= i` only, so
//! these functions never look ahead. All run in a single pass.

use std::collections::VecDeque;

/// Shift a series by `k` positions: `out[i] = series[i - k]`, `None` for
/// the first `k` positions. A lag of zero returns the series itself.
pub fn lag(series: &[f64], k: usize) -> Vec<Option<f64>> {
    (0..series.len())
        .map(|i| i.checked_sub(k).map(|j| series[j]))
        .collect()
}

/// Trailing mean over the last `window` values up to and including `i`.
///
/// The window shrinks at the start of the series (minimum one value), so
/// `out[0] == series[0]` for any window. Returns all-NaN for a zero window.
pub fn rolling_mean(series: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return vec![f64::NAN; series.len()];
    }
    let mut state = RollingMean::new(window);
    series.iter().map(|&x| state.push(x)).collect()
}

/// Streaming trailing mean backed by a bounded deque and a compensated
/// running sum.
///
/// Eviction subtracts from the sum, so rounding error from large values
/// would otherwise linger after they leave the window. The sum carries a
/// Neumaier compensation term, and a window whose values are all equal
/// (for example a run of zero-sales days) returns that value exactly.
#[derive(Debug, Clone)]
pub struct RollingMean {
    window: usize,
    buffer: VecDeque<f64>,
    sum: f64,
    compensation: f64,
    last: f64,
    run: usize,
}

impl RollingMean {
    /// `window` must be at least 1.
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            buffer: VecDeque::with_capacity(window),
            sum: 0.0,
            compensation: 0.0,
            last: f64::NAN,
            run: 0,
        }
    }

    /// Add the next value and return the mean of the current window.
    pub fn push(&mut self, value: f64) -> f64 {
        if self.buffer.len() == self.window {
            if let Some(old) = self.buffer.pop_front() {
                self.add(-old);
            }
        }
        self.buffer.push_back(value);
        self.add(value);

        if value == self.last {
            self.run += 1;
        } else {
            self.last = value;
            self.run = 1;
        }
        if self.run >= self.buffer.len() {
            return value;
        }
        (self.sum + self.compensation) / self.buffer.len() as f64
    }

    fn add(&mut self, x: f64) {
        let t = self.sum + x;
        if self.sum.abs() >= x.abs() {
            self.compensation += (self.sum - t) + x;
        } else {
            self.compensation += (x - t) + self.sum;
        }
        self.sum = t;
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
