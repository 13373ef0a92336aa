use tracing::debug;

use crate::scale::{Note, Scale};
use crate::theory::MusicTheory;

/// Notes between `start` and `end` in `order`, inclusive, always beginning
/// with `start`. Empty when either endpoint is missing from `order`.
pub fn resolve_chain(start: &Note, end: &Note, order: &[Note]) -> Vec<Note> {
    let position = |target: &Note| order.iter().position(|n| n.name == target.name);
    let (Some(from), Some(to)) = (position(start), position(end)) else {
        return Vec::new();
    };

    if from <= to {
        order[from..=to].to_vec()
    } else {
        order[to..=from].iter().rev().cloned().collect()
    }
}

/// Tones of `chord` rooted at the first scale degree whose chord fits inside
/// the two-octave window. Empty when no degree qualifies.
pub fn chord_chain(theory: &impl MusicTheory, chord: &str, scale: &Scale) -> Vec<Note> {
    for root in scale.octave(1) {
        let Some(tones) = theory.chord_tones(chord, &root.name) else { continue };
        if tones.is_empty() || !tones.iter().all(|t| scale.contains(t)) { continue; }
        return tones.iter().filter_map(|t| scale.find(t).cloned()).collect();
    }
    debug!("[chain] no {chord:?} chord fits {:?}", scale.key);
    Vec::new()
}
