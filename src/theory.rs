use std::fmt;

// ── Provider seam ─────────────────────────────────────────────────────────────

/// One octave of a scale as spelled by a theory provider: note names with
/// octave numbers (`"C1"`, `"F#1"`, …) and cumulative semitones from the tonic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleSpelling {
    pub notes:     Vec<String>,
    pub semitones: Vec<i32>,
}

/// Music-theory primitives the visualizer consumes as a black box.
pub trait MusicTheory {
    /// Resolve a key such as `"C1 major"` to its spelled scale.
    fn scale(&self, key: &str) -> Option<ScaleSpelling>;

    /// The same note one octave higher.
    fn transpose_octave(&self, note: &str) -> Option<String>;

    /// Tones of `chord` rooted at `root`, or `None` when it cannot be built.
    fn chord_tones(&self, chord: &str, root: &str) -> Option<Vec<String>>;

    /// Shorthand interval name between two notes (`"5P"`, `"-3m"`, …).
    fn interval(&self, from: &str, to: &str) -> Option<String>;
}

// ── Static tables ─────────────────────────────────────────────────────────────

/// Every key offered to the user: 7 letters × 3 accidentals × 2 modes.
pub const ALL_KEYS: [&str; 42] = [
    "C1 major",  "C1 minor",  "C#1 major", "C#1 minor", "Cb1 major", "Cb1 minor",
    "D1 major",  "D1 minor",  "D#1 major", "D#1 minor", "Db1 major", "Db1 minor",
    "E1 major",  "E1 minor",  "E#1 major", "E#1 minor", "Eb1 major", "Eb1 minor",
    "F1 major",  "F1 minor",  "F#1 major", "F#1 minor", "Fb1 major", "Fb1 minor",
    "G1 major",  "G1 minor",  "G#1 major", "G#1 minor", "Gb1 major", "Gb1 minor",
    "A1 major",  "A1 minor",  "A#1 major", "A#1 minor", "Ab1 major", "Ab1 minor",
    "H1 major",  "H1 minor",  "H#1 major", "H#1 minor", "Hb1 major", "Hb1 minor",
];

pub const DEFAULT_KEY: &str = "C1 major";

/// Display name → provider chord token.
pub const CHORD_TYPES: [(&str, &str); 4] = [
    ("major triad",      "major"),
    ("minor triad",      "minor"),
    ("dominant seventh", "7"),
    ("major seventh",    "maj7"),
];

pub fn chord_token(display_name: &str) -> Option<&'static str> {
    CHORD_TYPES.iter()
        .find(|(name, _)| *name == display_name)
        .map(|(_, token)| *token)
}

// ── Pitch spelling ────────────────────────────────────────────────────────────

const LETTERS: [char; 7] = ['C', 'D', 'E', 'F', 'G', 'A', 'B'];
const LETTER_SEMITONES: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

/// (letter steps, semitones) above the tonic.
const MAJOR_STEPS: [(i32, i32); 7] = [(0,0), (1,2), (2,4), (3,5), (4,7), (5,9), (6,11)];
const MINOR_STEPS: [(i32, i32); 7] = [(0,0), (1,2), (2,3), (3,5), (4,7), (5,8), (6,10)];

const CHORD_MAJOR: [(i32, i32); 3] = [(0,0), (2,4), (4,7)];
const CHORD_MINOR: [(i32, i32); 3] = [(0,0), (2,3), (4,7)];
const CHORD_DOM7:  [(i32, i32); 4] = [(0,0), (2,4), (4,7), (6,10)];
const CHORD_MAJ7:  [(i32, i32); 4] = [(0,0), (2,4), (4,7), (6,11)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pitch {
    letter: usize,
    alter:  i32,
    octave: i32,
}

impl Pitch {
    /// Parses `<letter><#|b>*<octave>?`. `H` is read as the German `B`;
    /// a missing octave means octave 1.
    fn parse(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let letter = match chars.next()?.to_ascii_uppercase() {
            'C' => 0, 'D' => 1, 'E' => 2, 'F' => 3,
            'G' => 4, 'A' => 5, 'B' | 'H' => 6,
            _ => return None,
        };
        let rest = chars.as_str();
        let acc_len = rest.chars().take_while(|c| *c == '#' || *c == 'b').count();
        let (accidentals, octave) = rest.split_at(acc_len);
        let alter = accidentals.chars().map(|c| if c == '#' { 1 } else { -1 }).sum();
        let octave = if octave.is_empty() { 1 } else { octave.parse().ok()? };
        Some(Self { letter, alter, octave })
    }

    /// Diatonic position counted in letters.
    fn steps(self) -> i32 { self.octave * 7 + self.letter as i32 }

    /// Absolute pitch in semitones.
    fn height(self) -> i32 { self.octave * 12 + LETTER_SEMITONES[self.letter] + self.alter }

    fn transpose(self, steps: i32, semitones: i32) -> Self {
        let total  = self.steps() + steps;
        let octave = total.div_euclid(7);
        let letter = total.rem_euclid(7) as usize;
        let natural = octave * 12 + LETTER_SEMITONES[letter];
        Self { letter, alter: self.height() + semitones - natural, octave }
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let accidental = if self.alter >= 0 { "#" } else { "b" };
        write!(f, "{}{}{}", LETTERS[self.letter],
            accidental.repeat(self.alter.unsigned_abs() as usize), self.octave)
    }
}

fn interval_name(from: Pitch, to: Pitch) -> String {
    let steps = to.steps() - from.steps();
    let semis = to.height() - from.height();
    if steps < 0 || (steps == 0 && semis < 0) {
        return format!("-{}", interval_name(to, from));
    }

    let simple   = (steps % 7) as usize;
    let diff     = semis - (LETTER_SEMITONES[simple] + 12 * (steps / 7));
    let perfect  = matches!(simple, 0 | 3 | 4);
    let quality = match (perfect, diff) {
        (true,  0)          => "P".to_string(),
        (false, 0)          => "M".to_string(),
        (false, -1)         => "m".to_string(),
        (_, d) if d > 0     => "A".repeat(d as usize),
        (true,  d)          => "d".repeat(d.unsigned_abs() as usize),
        (false, d)          => "d".repeat((d.unsigned_abs() - 1) as usize),
    };
    format!("{}{}", steps + 1, quality)
}

// ── Built-in provider ─────────────────────────────────────────────────────────

/// Letter-correct major/natural-minor spelling with a small chord vocabulary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTheory;

impl MusicTheory for BuiltinTheory {
    fn scale(&self, key: &str) -> Option<ScaleSpelling> {
        let mut parts = key.split_whitespace();
        let tonic = Pitch::parse(parts.next()?)?;
        let steps: &[(i32, i32)] = match parts.next()? {
            "major" => &MAJOR_STEPS,
            "minor" => &MINOR_STEPS,
            _ => return None,
        };
        if parts.next().is_some() { return None; }

        Some(ScaleSpelling {
            notes: steps.iter()
                .map(|&(st, semi)| tonic.transpose(st, semi).to_string())
                .collect(),
            semitones: steps.iter().map(|&(_, semi)| semi).collect(),
        })
    }

    fn transpose_octave(&self, note: &str) -> Option<String> {
        Pitch::parse(note).map(|p| p.transpose(7, 12).to_string())
    }

    fn chord_tones(&self, chord: &str, root: &str) -> Option<Vec<String>> {
        let shape: &[(i32, i32)] = match chord {
            "major" => &CHORD_MAJOR,
            "minor" => &CHORD_MINOR,
            "7"     => &CHORD_DOM7,
            "maj7"  => &CHORD_MAJ7,
            _ => return None,
        };
        let root = Pitch::parse(root)?;
        Some(shape.iter().map(|&(st, semi)| root.transpose(st, semi).to_string()).collect())
    }

    fn interval(&self, from: &str, to: &str) -> Option<String> {
        Some(interval_name(Pitch::parse(from)?, Pitch::parse(to)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(spelling: &ScaleSpelling) -> Vec<&str> {
        spelling.notes.iter().map(String::as_str).collect()
    }

    #[test]
    fn c_major_is_spelled_with_octave_numbers() {
        let s = BuiltinTheory.scale("C1 major").unwrap();
        assert_eq!(names(&s), ["C1", "D1", "E1", "F1", "G1", "A1", "B1"]);
        assert_eq!(s.semitones, [0, 2, 4, 5, 7, 9, 11]);
    }

    #[test]
    fn sharp_keys_cross_into_the_next_octave_at_c() {
        let s = BuiltinTheory.scale("D1 major").unwrap();
        assert_eq!(names(&s), ["D1", "E1", "F#1", "G1", "A1", "B1", "C#2"]);
    }

    #[test]
    fn minor_and_german_h() {
        let s = BuiltinTheory.scale("H1 minor").unwrap();
        assert_eq!(names(&s), ["B1", "C#2", "D2", "E2", "F#2", "G2", "A2"]);
        assert_eq!(s.semitones, [0, 2, 3, 5, 7, 8, 10]);

        let s = BuiltinTheory.scale("Eb1 minor").unwrap();
        assert_eq!(names(&s), ["Eb1", "F1", "Gb1", "Ab1", "Bb1", "Cb2", "Db2"]);
    }

    #[test]
    fn every_enumerated_key_resolves() {
        for key in ALL_KEYS {
            let s = BuiltinTheory.scale(key).unwrap_or_else(|| panic!("{key} unresolved"));
            assert_eq!(s.notes.len(), s.semitones.len());
            assert_eq!(s.semitones[0], 0);
            assert!(s.semitones.windows(2).all(|w| w[0] < w[1]), "{key}");
        }
    }

    #[test]
    fn malformed_keys_are_rejected() {
        assert!(BuiltinTheory.scale("X1 major").is_none());
        assert!(BuiltinTheory.scale("C1 lydian").is_none());
        assert!(BuiltinTheory.scale("C1").is_none());
        assert!(BuiltinTheory.scale("").is_none());
    }

    #[test]
    fn octave_transposition() {
        assert_eq!(BuiltinTheory.transpose_octave("F#1").as_deref(), Some("F#2"));
        assert_eq!(BuiltinTheory.transpose_octave("Cb2").as_deref(), Some("Cb3"));
    }

    #[test]
    fn chord_tones_are_spelled_upwards_from_the_root() {
        let t = BuiltinTheory.chord_tones("7", "G1").unwrap();
        assert_eq!(t, ["G1", "B1", "D2", "F2"]);
        let t = BuiltinTheory.chord_tones("minor", "A1").unwrap();
        assert_eq!(t, ["A1", "C2", "E2"]);
        assert!(BuiltinTheory.chord_tones("sus9", "C1").is_none());
    }

    #[test]
    fn interval_names() {
        let i = |a: &str, b: &str| BuiltinTheory.interval(a, b).unwrap();
        assert_eq!(i("C1", "G1"), "5P");
        assert_eq!(i("C1", "E1"), "3M");
        assert_eq!(i("D1", "F1"), "3m");
        assert_eq!(i("F1", "B1"), "4A");
        assert_eq!(i("B1", "F2"), "5d");
        assert_eq!(i("C1", "C2"), "8P");
        assert_eq!(i("C1", "E2"), "10M");
        assert_eq!(i("G1", "C1"), "-5P");
        assert_eq!(i("A1", "A1"), "1P");
    }

    #[test]
    fn chord_table_lookup() {
        assert_eq!(chord_token("major triad"), Some("major"));
        assert_eq!(chord_token("dominant seventh"), Some("7"));
        assert_eq!(chord_token("power chord"), None);
    }
}
