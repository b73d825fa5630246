//! History Down-sampling
//!
//! Full histories can be long; exporters thin them before persisting.

use serde::{Deserialize, Serialize};

/// How to thin a history before export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Downsample {
    /// Keep everything
    Full,
    /// Keep every `n`th record starting at the first
    Stride { every: usize },
    /// Keep the first `head`, `middle` evenly spaced interior records, and the last `tail`
    HeadMiddleTail { head: usize, middle: usize, tail: usize },
}

impl Default for Downsample {
    fn default() -> Self {
        Downsample::Stride { every: 5 }
    }
}

impl Downsample {
    /// Apply the policy, preserving order.
    pub fn apply<T: Clone>(&self, items: &[T]) -> Vec<T> {
        match *self {
            Downsample::Full => items.to_vec(),
            Downsample::Stride { every } => items.iter().step_by(every.max(1)).cloned().collect(),
            Downsample::HeadMiddleTail { head, middle, tail } => {
                let len = items.len();
                if head + middle + tail >= len {
                    return items.to_vec();
                }
                let mut picked: Vec<usize> = (0..head).collect();

                let interior_start = head;
                let interior_len = len - head - tail;
                for k in 0..middle {
                    // Centre of the k-th of `middle` equal slices
                    picked.push(interior_start + (2 * k + 1) * interior_len / (2 * middle));
                }

                picked.extend(len - tail..len);
                picked.dedup();
                picked.into_iter().map(|i| items[i].clone()).collect()
            }
        }
    }
}
