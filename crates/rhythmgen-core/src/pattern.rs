//! Euclidean onset patterns (Bjorklund's algorithm)

use serde::{Deserialize, Serialize};

/// A fixed-length sequence of onset flags
///
/// Immutable once generated; regenerating with the same `(pulses, steps)`
/// always yields the same sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    onsets: Vec<bool>,
}

impl Pattern {
    /// Pattern length in steps
    pub fn len(&self) -> usize {
        self.onsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.onsets.is_empty()
    }

    /// Number of onset (true) steps
    pub fn onset_count(&self) -> usize {
        self.onsets.iter().filter(|&&o| o).count()
    }

    /// Whether the given step is an onset (false when out of range)
    pub fn is_onset(&self, step: usize) -> bool {
        self.onsets.get(step).copied().unwrap_or(false)
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.onsets
    }
}

/// Generate a Euclidean rhythm pattern
///
/// Distributes `pulses` onsets as evenly as possible across `steps` slots.
/// `pulses` is clamped to `steps`. No rotation is applied: the raw Bjorklund
/// concatenation order is the canonical form, so any pattern with at least
/// one pulse starts with an onset at step 0 (e.g. `euclidean(3, 8)` is
/// `10010010`).
///
/// # Example
/// ```
/// use rhythmgen_core::euclidean;
/// let pattern = euclidean(3, 8);
/// assert_eq!(
///     pattern.as_slice(),
///     &[true, false, false, true, false, false, true, false],
/// );
/// ```
pub fn euclidean(pulses: u8, steps: u8) -> Pattern {
    if steps == 0 {
        return Pattern::default();
    }

    let pulses = pulses.min(steps);

    if pulses == 0 {
        return Pattern { onsets: vec![false; steps as usize] };
    }

    if pulses == steps {
        return Pattern { onsets: vec![true; steps as usize] };
    }

    // Bjorklund bracketing: repeatedly fold the remainder group into the
    // count group until at most one remainder string is left.
    let mut counts = vec![vec![true]; pulses as usize];
    let mut remainders = vec![vec![false]; (steps - pulses) as usize];

    loop {
        let mut new_counts = Vec::new();

        let pairs = counts.len().min(remainders.len());
        for i in 0..pairs {
            let mut combined = counts[i].clone();
            combined.extend(remainders[i].clone());
            new_counts.push(combined);
        }

        if counts.len() > pairs {
            remainders = counts[pairs..].to_vec();
        } else {
            remainders = remainders[pairs..].to_vec();
        }

        counts = new_counts;

        if remainders.len() <= 1 {
            break;
        }
    }

    let mut onsets = Vec::with_capacity(steps as usize);
    for seq in &counts {
        onsets.extend(seq);
    }
    for seq in &remainders {
        onsets.extend(seq);
    }

    Pattern { onsets }
}
