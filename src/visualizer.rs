use std::fmt;

use tracing::{debug, info};

use crate::chain::{chord_chain, resolve_chain};
use crate::config::Config;
use crate::drag::{DragController, DragState};
use crate::geometry::{
    arc_path, circle_position, line_path, linear_position, ArcPath, CircleGeometry, LinePath,
    LinearGeometry, Position, Surface, ViewMode,
};
use crate::scale::{Note, Scale};
use crate::selection::{ActiveSelection, Selection};
use crate::theory::{chord_token, MusicTheory, ALL_KEYS, CHORD_TYPES};

/// Pointer travel (canvas units) below which a press still counts as a click.
const CLICK_SLOP: f64 = 0.75;

// ── Derived render model ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverTarget {
    Chain,
    Note(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTarget {
    Note(Note),
    Chain,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedNote<'a> {
    pub note:     &'a Note,
    pub position: Position,
    pub in_chain: bool,
    pub endpoint: bool,
    /// Click order among the selected notes.
    pub rank:     Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChainPath {
    Arc(ArcPath),
    Line(LinePath),
}

impl ChainPath {
    pub fn sample(&self) -> Vec<Position> {
        match self {
            Self::Arc(arc)   => arc.sample(),
            Self::Line(line) => line.points.clone(),
        }
    }

    pub fn distance_to(&self, p: Position) -> f64 {
        match self {
            Self::Arc(arc)   => arc.distance_to(p),
            Self::Line(line) => line.distance_to(p),
        }
    }
}

impl fmt::Display for ChainPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arc(arc)   => arc.fmt(f),
            Self::Line(line) => line.fmt(f),
        }
    }
}

struct Press {
    note:  Option<String>,
    at:    Position,
    moved: bool,
}

// ── Composition root ──────────────────────────────────────────────────────────

/// All state of one visualizer instance. Every mutation that can change the
/// chain re-derives the chain and label before returning.
pub struct VisualizerState<T: MusicTheory> {
    theory:    T,
    scale:     Scale,
    mode:      ViewMode,
    selection: Selection,
    drag:      DragController,
    hover:     Option<HoverTarget>,
    press:     Option<Press>,

    surface:       Option<Surface>,
    circle:        CircleGeometry,
    linear:        LinearGeometry,
    circle_margin: f64,
    linear_margin: f64,
    note_radius:   f64,
    hit_width:     f64,

    chain:             Vec<Note>,
    label:             Option<String>,
    chord_unavailable: bool,
}

impl<T: MusicTheory> VisualizerState<T> {
    pub fn new(theory: T, config: &Config) -> Self {
        let scale = Scale::build(&theory, &config.key);
        let mut state = Self {
            theory,
            scale,
            mode:      config.mode,
            selection: Selection::default(),
            drag:      DragController::default(),
            hover:     None,
            press:     None,

            surface:       None,
            circle:        CircleGeometry::default(),
            linear:        LinearGeometry::default(),
            circle_margin: config.circle_margin,
            linear_margin: config.linear_margin,
            note_radius:   config.note_radius,
            hit_width:     config.hit_width,

            chain:             Vec::new(),
            label:             None,
            chord_unavailable: false,
        };
        state.refresh();
        state
    }

    // ── Read access ───────────────────────────────────────────────────────

    pub fn key(&self) -> &str { &self.scale.key }
    pub fn mode(&self) -> ViewMode { self.mode }
    pub fn selection(&self) -> &Selection { &self.selection }
    pub fn drag_state(&self) -> DragState { self.drag.state() }
    pub fn hover(&self) -> Option<&HoverTarget> { self.hover.as_ref() }
    pub fn chain(&self) -> &[Note] { &self.chain }
    pub fn label(&self) -> Option<&str> { self.label.as_deref() }
    pub fn chord_unavailable(&self) -> bool { self.chord_unavailable }
    pub fn circle(&self) -> &CircleGeometry { &self.circle }
    pub fn linear(&self) -> &LinearGeometry { &self.linear }
    pub fn note_radius(&self) -> f64 { self.note_radius }
    pub fn step_pattern(&self) -> Vec<i32> { self.scale.step_pattern() }

    /// Live drag offset: radians in the circle view, pixels in the linear one.
    pub fn offset(&self) -> f64 { self.drag.offset() }

    // ── Key / mode / chord ────────────────────────────────────────────────

    pub fn set_key(&mut self, key: &str) {
        if key == self.scale.key { return; }
        info!("[visualizer] key {:?} -> {key:?}", self.scale.key);
        self.drag.end();
        self.scale = Scale::build(&self.theory, key);
        self.refresh();
    }

    /// Step through the key list; `step` may be negative.
    pub fn cycle_key(&mut self, step: isize) {
        let len = ALL_KEYS.len() as isize;
        let current = ALL_KEYS.iter().position(|k| *k == self.key()).unwrap_or(0) as isize;
        let next = (current + step).rem_euclid(len) as usize;
        self.set_key(ALL_KEYS[next]);
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        if mode == self.mode { return; }
        info!("[visualizer] mode -> {}", mode.name());
        self.drag.end();
        self.hover = None;
        self.mode = mode;
        self.refresh();
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(self.mode.toggled());
    }

    pub fn set_chord(&mut self, chord: Option<&str>) {
        self.drag.end();
        self.selection.set_chord(chord.map(str::to_string));
        self.refresh();
        if self.chord_unavailable {
            info!("[visualizer] {:?} cannot be built in {:?}", chord, self.scale.key);
        }
    }

    /// None → each chord type in table order → None.
    pub fn cycle_chord(&mut self) {
        let next = match self.selection.chord() {
            None => CHORD_TYPES.first().map(|(name, _)| *name),
            Some(current) => CHORD_TYPES.iter()
                .position(|(name, _)| *name == current)
                .and_then(|i| CHORD_TYPES.get(i + 1))
                .map(|(name, _)| *name),
        };
        self.set_chord(next);
    }

    // ── Note selection ────────────────────────────────────────────────────

    /// Unknown names are ignored.
    pub fn click_note(&mut self, name: &str) {
        let Some(note) = self.scale.find(name).cloned() else { return };
        self.drag.end();
        self.selection.click_note(note);
        self.refresh();
    }

    pub fn click_degree(&mut self, octave: u8, index: usize) {
        if let Some(name) = self.scale.degree(octave, index).map(|n| n.name.clone()) {
            self.click_note(&name);
        }
    }

    pub fn clear_selection(&mut self) {
        self.drag.end();
        self.selection.clear();
        self.refresh();
    }

    // ── Surface & pointer ─────────────────────────────────────────────────

    /// Adopt the latest bounding box of the interactive surface.
    pub fn set_surface(&mut self, surface: Surface) {
        if self.surface == Some(surface) { return; }
        self.surface = Some(surface);
        self.circle = CircleGeometry::fit(surface.width, surface.height, self.circle_margin);
        self.linear = LinearGeometry {
            width:  surface.width,
            height: surface.height,
            margin: self.linear_margin,
        };
    }

    pub fn pointer_down(&mut self, client: Position) {
        let Some(local) = self.surface.map(|s| s.to_local(client)) else { return };
        let hit = self.hit_test(local);

        let starts_drag = match &hit {
            Some(HitTarget::Chain)   => true,
            Some(HitTarget::Note(n)) => self.note_in_chain(n),
            None                     => false,
        };
        if starts_drag
            && self.drag.start(self.mode, self.chain.len(), client, self.surface.as_ref(), self.circle.center)
        {
            self.hover = None;
        }

        self.press = Some(Press {
            note:  match hit { Some(HitTarget::Note(n)) => Some(n.name), _ => None },
            at:    client,
            moved: false,
        });
    }

    /// Drag update while pressed on the chain, hover tracking otherwise.
    pub fn pointer_move(&mut self, client: Position) {
        if let Some(press) = &mut self.press {
            if press.at.distance(client) > CLICK_SLOP { press.moved = true; }
        }
        if self.drag.update(client, self.surface.as_ref(), self.circle.center) {
            self.refresh();
            return;
        }
        if self.drag.is_dragging() { return; }

        let Some(local) = self.surface.map(|s| s.to_local(client)) else { return };
        self.hover = match self.hit_test(local) {
            Some(HitTarget::Chain) => Some(HoverTarget::Chain),
            Some(HitTarget::Note(n)) if self.note_in_chain(&n) => Some(HoverTarget::Note(n.name)),
            _ => None,
        };
    }

    /// Release. A press and release on the same note without travel is a click.
    pub fn pointer_up(&mut self, client: Position) {
        let press = self.press.take();
        if self.drag.is_dragging() {
            if let Some(path) = self.chain_path() {
                debug!("[visualizer] chain released at {path}");
            }
            self.drag.end();
        }

        let released_on = self.surface
            .map(|s| s.to_local(client))
            .and_then(|local| self.hit_test(local));
        match (press, released_on) {
            (Some(Press { note: Some(pressed), moved: false, .. }), Some(HitTarget::Note(n)))
                if pressed == n.name => self.click_note(&pressed),
            _ => self.refresh(),
        }
    }

    /// Pointer left the surface (or focus was lost): never leave a drag hanging.
    pub fn pointer_leave(&mut self) {
        self.press = None;
        self.hover = None;
        if self.drag.end() {
            self.refresh();
        }
    }

    // ── Projection ────────────────────────────────────────────────────────

    fn project(&self, note: &Note, offset: f64) -> Position {
        match self.mode {
            ViewMode::Circle => circle_position(note, &self.circle, offset),
            ViewMode::Linear => linear_position(note, &self.linear, offset),
        }
    }

    /// Whether a drawn note takes part in the chain. The circle view draws only
    /// octave 1, so an octave-2 chain member lights up its octave-1 slot.
    fn note_in_chain(&self, note: &Note) -> bool {
        self.chain.iter().any(|c| match self.mode {
            ViewMode::Circle => c.pitch_class() == note.pitch_class(),
            ViewMode::Linear => c.name == note.name,
        })
    }

    /// Notes drawn for the current mode at their resting positions.
    pub fn visible_notes(&self) -> Vec<ProjectedNote<'_>> {
        let octave_limit = match self.mode {
            ViewMode::Circle => 1,
            ViewMode::Linear => 2,
        };
        let endpoints = [self.chain.first(), self.chain.last()];

        self.scale.notes.iter()
            .filter(|n| n.octave <= octave_limit)
            .map(|note| ProjectedNote {
                note,
                position: self.project(note, 0.0),
                in_chain: self.note_in_chain(note),
                endpoint: endpoints.iter().flatten().any(|e| match self.mode {
                    ViewMode::Circle => e.pitch_class() == note.pitch_class(),
                    ViewMode::Linear => e.name == note.name,
                }),
                rank: self.visible_rank(note),
            })
            .collect()
    }

    /// Click rank of a drawn note. Octave-2 picks rank their octave-1 slot
    /// in the circle view.
    fn visible_rank(&self, note: &Note) -> Option<usize> {
        match self.mode {
            ViewMode::Circle => self.selection.notes().iter()
                .position(|n| n.pitch_class() == note.pitch_class()),
            ViewMode::Linear => self.selection.rank_of(&note.name),
        }
    }

    /// Chain members at their live (dragged) positions.
    pub fn chain_positions(&self) -> Vec<ProjectedNote<'_>> {
        let offset = self.offset();
        let last = self.chain.len().saturating_sub(1);
        self.chain.iter().enumerate()
            .map(|(i, note)| ProjectedNote {
                note,
                position: self.project(note, offset),
                in_chain: true,
                endpoint: i == 0 || i == last,
                rank: self.selection.rank_of(&note.name),
            })
            .collect()
    }

    pub fn chain_path(&self) -> Option<ChainPath> {
        let offset = self.offset();
        match self.mode {
            ViewMode::Circle => arc_path(&self.chain, &self.circle, offset).map(ChainPath::Arc),
            ViewMode::Linear => line_path(&self.chain, &self.linear, offset).map(ChainPath::Line),
        }
    }

    /// Visible notes first, then the live chain markers and path.
    pub fn hit_test(&self, local: Position) -> Option<HitTarget> {
        if let Some(hit) = self.visible_notes().into_iter()
            .find(|p| p.position.distance(local) <= self.note_radius)
        {
            return Some(HitTarget::Note(hit.note.clone()));
        }
        let on_marker = self.chain_positions().iter()
            .any(|p| p.position.distance(local) <= self.note_radius);
        let on_path = self.chain_path()
            .is_some_and(|path| path.distance_to(local) <= self.hit_width / 2.0);
        (on_marker || on_path).then_some(HitTarget::Chain)
    }

    // ── Derivation ────────────────────────────────────────────────────────

    fn refresh(&mut self) {
        let chain = match self.selection.active() {
            ActiveSelection::Chord(name) => {
                let token = chord_token(name).unwrap_or(name);
                chord_chain(&self.theory, token, &self.scale)
            }
            ActiveSelection::Notes(a, b) => resolve_chain(a, b, &self.scale.notes),
            ActiveSelection::Empty => Vec::new(),
        };
        self.chord_unavailable = self.selection.chord().is_some() && chain.is_empty();
        self.label = describe_chain(&self.theory, &chain, self.selection.chord().is_some());
        self.chain = chain;
        debug!("[visualizer] chain {:?}", self.chain.iter().map(|n| &n.name).collect::<Vec<_>>());
    }
}

/// `"<first> to <last>: <interval>"` for note pairs, tone list for chords.
fn describe_chain(theory: &impl MusicTheory, chain: &[Note], chord: bool) -> Option<String> {
    let [first, .., last] = chain else { return None };
    let tones = || chain.iter().map(Note::pitch_class).collect::<Vec<_>>().join(" ");
    let description = if chord {
        tones()
    } else {
        theory.interval(&first.name, &last.name).unwrap_or_else(tones)
    };
    Some(format!("{} to {}: {description}", first.pitch_class(), last.pitch_class()))
}
