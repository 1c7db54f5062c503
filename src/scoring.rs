//! Sliding-window PWM scoring.
//!
//! Every window of motif length `L` is scored by the product of the weights
//! its symbols select, rescaled between the product of per-position minima and
//! the product of per-position maxima. Windows scoring strictly above the
//! threshold are reported as [`Hit`]s.

use crate::types::{Hit, Pwm};
use std::borrow::Cow;

/// Lazy iterator over the hits of one sequence against one PWM.
///
/// Created by [`score`] or [`score_symbols`]. Hits come out in increasing
/// order of window start.
#[derive(Debug, Clone)]
pub struct Hits<'a> {
    symbols: Cow<'a, [char]>,
    pwm: &'a Pwm,
    threshold: f64,
    next_start: usize,
}

impl Iterator for Hits<'_> {
    type Item = Hit;

    fn next(&mut self) -> Option<Hit> {
        let motif_len = self.pwm.len();
        while self.next_start + motif_len <= self.symbols.len() {
            let start = self.next_start;
            self.next_start += 1;

            let window = &self.symbols[start..start + motif_len];
            if let Some(score) = score_window(window, self.pwm) {
                if score > self.threshold {
                    return Some(Hit {
                        start,
                        end: start + motif_len,
                        score,
                    });
                }
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.symbols.len() + 1).saturating_sub(self.next_start + self.pwm.len());
        (0, Some(remaining))
    }
}

/// Scores every window of `sequence` against `pwm`.
///
/// Windows are `[i, i + L)` for `i` in `0..=N - L`; a sequence shorter than
/// the motif yields nothing. Only windows whose normalized score is strictly
/// greater than `threshold` are returned.
///
/// # Example
/// ```
/// use ndarray::array;
/// use pwm_score::scoring::score;
/// use pwm_score::types::{Alphabet, Pwm};
///
/// let alphabet = Alphabet::new("ACGU".chars()).unwrap();
/// let pwm = Pwm::new(
///     "motif",
///     alphabet,
///     array![[0.7, 0.1, 0.1, 0.1], [0.1, 0.1, 0.1, 0.7]],
/// )
/// .unwrap();
///
/// let starts: Vec<usize> = score("ACGU", &pwm, 0.01).map(|hit| hit.start).collect();
/// assert_eq!(starts, vec![0, 2]);
/// ```
pub fn score<'a>(sequence: &str, pwm: &'a Pwm, threshold: f64) -> Hits<'a> {
    Hits {
        symbols: Cow::Owned(sequence.chars().collect()),
        pwm,
        threshold,
        next_start: 0,
    }
}

/// Same as [`score`], over a sequence already split into symbols.
///
/// Lets one decoded sequence be scored against many PWMs.
pub fn score_symbols<'a>(symbols: &'a [char], pwm: &'a Pwm, threshold: f64) -> Hits<'a> {
    Hits {
        symbols: Cow::Borrowed(symbols),
        pwm,
        threshold,
        next_start: 0,
    }
}

/// Normalized match score of a single window, or `None` if the window is excluded.
///
/// `window` must hold exactly `pwm.len()` symbols. A symbol outside the PWM
/// alphabet zeroes all three running products, which makes the window
/// degenerate; a degenerate window (`max == min`) is excluded.
pub fn score_window(window: &[char], pwm: &Pwm) -> Option<f64> {
    debug_assert_eq!(window.len(), pwm.len());

    let alphabet = pwm.alphabet();
    let mut observed = 1.0_f64;
    let mut min_possible = 1.0_f64;
    let mut max_possible = 1.0_f64;

    for (position, &symbol) in window.iter().enumerate() {
        let Some(column) = alphabet.column(symbol) else {
            observed = 0.0;
            min_possible = 0.0;
            max_possible = 0.0;
            break;
        };
        observed *= pwm.matrix()[[position, column]];
        min_possible *= pwm.row_min()[position];
        max_possible *= pwm.row_max()[position];
    }

    if max_possible == min_possible {
        return None;
    }

    Some((observed - min_possible) / (max_possible - min_possible))
}
