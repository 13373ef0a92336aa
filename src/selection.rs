use crate::scale::Note;

/// What currently drives the chain. A chord wins over a note pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveSelection<'a> {
    Empty,
    Notes(&'a Note, &'a Note),
    Chord(&'a str),
}

/// Up to two clicked notes, or a chord name. Never both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    notes: Vec<Note>,
    chord: Option<String>,
}

impl Selection {
    pub fn notes(&self) -> &[Note] { &self.notes }

    pub fn chord(&self) -> Option<&str> { self.chord.as_deref() }

    /// 0 for the first clicked note, 1 for the second.
    pub fn rank_of(&self, name: &str) -> Option<usize> {
        self.notes.iter().position(|n| n.name == name)
    }

    /// A third click starts over with the clicked note; clicking a selected
    /// note deselects it. Always drops the chord.
    pub fn click_note(&mut self, note: Note) {
        self.chord = None;
        if self.notes.len() >= 2 {
            self.notes = vec![note];
        } else if let Some(i) = self.rank_of(&note.name) {
            self.notes.remove(i);
        } else {
            self.notes.push(note);
        }
    }

    /// Choosing a chord clears the notes; choosing none touches nothing else.
    pub fn set_chord(&mut self, chord: Option<String>) {
        if chord.is_some() {
            self.notes.clear();
        }
        self.chord = chord;
    }

    pub fn clear(&mut self) {
        self.notes.clear();
        self.chord = None;
    }

    pub fn active(&self) -> ActiveSelection<'_> {
        match (self.chord.as_deref(), self.notes.as_slice()) {
            (Some(chord), _) => ActiveSelection::Chord(chord),
            (None, [a, b])   => ActiveSelection::Notes(a, b),
            _                => ActiveSelection::Empty,
        }
    }
}
