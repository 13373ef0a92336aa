use tracing::warn;

use crate::theory::MusicTheory;

pub const SEMITONES_PER_OCTAVE: i32 = 12;

// ── Note ──────────────────────────────────────────────────────────────────────

/// A rendered scale position. `semitone` counts half-steps from the tonic of
/// octave 1 (0..24); octave-2 notes repeat octave 1 shifted by twelve.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Note {
    pub name:     String,
    pub octave:   u8,
    pub semitone: i32,
}

impl Note {
    pub fn new(name: impl Into<String>, octave: u8, semitone: i32) -> Self {
        Self { name: name.into(), octave, semitone }
    }

    /// Name without the octave number: `"F#2"` → `"F#"`.
    pub fn pitch_class(&self) -> &str {
        self.name.trim_end_matches(|c: char| c.is_ascii_digit() || c == '-')
    }

    pub fn semitone_in_octave(&self) -> i32 {
        self.semitone.rem_euclid(SEMITONES_PER_OCTAVE)
    }
}

// ── Scale ─────────────────────────────────────────────────────────────────────

/// Two octaves of a key, tonic first. `semitones[i]` belongs to `notes[i]`.
/// Empty when the key cannot be resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scale {
    pub key:       String,
    pub notes:     Vec<Note>,
    pub semitones: Vec<i32>,
}

impl Scale {
    pub fn build(theory: &impl MusicTheory, key: &str) -> Self {
        let Some(spelling) = theory.scale(key) else {
            warn!("[scale] unknown key {key:?}");
            return Self { key: key.to_string(), ..Self::default() };
        };
        if spelling.notes.len() != spelling.semitones.len() {
            warn!("[scale] {key:?}: provider returned mismatched notes/semitones");
            return Self { key: key.to_string(), ..Self::default() };
        }

        let lower = spelling.notes.iter()
            .zip(&spelling.semitones)
            .map(|(name, &semi)| Note::new(name.clone(), 1, semi));
        let upper = spelling.notes.iter()
            .zip(&spelling.semitones)
            .filter_map(|(name, &semi)| {
                theory.transpose_octave(name)
                    .map(|up| Note::new(up, 2, semi + SEMITONES_PER_OCTAVE))
            });
        let notes: Vec<Note> = lower.chain(upper).collect();
        let semitones = notes.iter().map(|n| n.semitone).collect();

        Self { key: key.to_string(), notes, semitones }
    }

    pub fn octave(&self, octave: u8) -> impl Iterator<Item = &Note> {
        self.notes.iter().filter(move |n| n.octave == octave)
    }

    /// Zero-based scale degree within octave 1 or 2.
    pub fn degree(&self, octave: u8, index: usize) -> Option<&Note> {
        self.octave(octave).nth(index)
    }

    /// Semitone steps between neighbouring degrees across one octave,
    /// `[2, 2, 1, 2, 2, 2, 1]` for a major key.
    pub fn step_pattern(&self) -> Vec<i32> {
        self.semitones.windows(2)
            .take(7)
            .map(|w| w[1] - w[0])
            .collect()
    }

    pub fn find(&self, name: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::{BuiltinTheory, ALL_KEYS};

    #[test]
    fn two_octaves_with_shifted_semitones() {
        let scale = Scale::build(&BuiltinTheory, "C1 major");
        assert_eq!(scale.notes.len(), 14);
        assert_eq!(scale.semitones.len(), scale.notes.len());
        assert_eq!(scale.semitones[..8], [0, 2, 4, 5, 7, 9, 11, 12]);

        let upper: Vec<_> = scale.octave(2).map(|n| (n.name.as_str(), n.semitone)).collect();
        assert_eq!(upper[0], ("C2", 12));
        assert_eq!(upper[6], ("B2", 23));
        assert!(scale.octave(1).all(|n| n.semitone < 12));
    }

    #[test]
    fn semitones_run_parallel_to_notes_in_every_key() {
        for key in ALL_KEYS {
            let scale = Scale::build(&BuiltinTheory, key);
            assert_eq!(scale.notes.len(), scale.semitones.len(), "{key}");
            for (note, &semi) in scale.notes.iter().zip(&scale.semitones) {
                assert_eq!(note.semitone, semi, "{key} {}", note.name);
            }
            assert!(scale.semitones.windows(2).all(|w| w[0] < w[1]), "{key}");
        }
    }

    #[test]
    fn pitch_class_strips_the_octave() {
        let scale = Scale::build(&BuiltinTheory, "A1 major");
        let classes: Vec<_> = scale.octave(2).map(Note::pitch_class).collect();
        assert_eq!(classes, ["A", "B", "C#", "D", "E", "F#", "G#"]);
        assert_eq!(scale.degree(2, 2).map(Note::semitone_in_octave), Some(4));
    }

    #[test]
    fn unknown_key_builds_an_empty_scale() {
        let scale = Scale::build(&BuiltinTheory, "nope");
        assert!(scale.notes.is_empty());
        assert_eq!(scale.key, "nope");
        assert!(scale.degree(1, 0).is_none());
        assert!(scale.step_pattern().is_empty());
    }

    #[test]
    fn step_patterns() {
        assert_eq!(Scale::build(&BuiltinTheory, "C1 major").step_pattern(), [2, 2, 1, 2, 2, 2, 1]);
        assert_eq!(Scale::build(&BuiltinTheory, "A1 minor").step_pattern(), [2, 1, 2, 2, 1, 2, 2]);
    }
}
