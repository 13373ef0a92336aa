use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::config::Config;
use crate::geometry::{Position, Surface};
use crate::theory::BuiltinTheory;
use crate::visualizer::VisualizerState;

/// Canvas units per terminal row. Cells are about twice as tall as wide, so
/// doubling the vertical scale keeps the circle round.
pub const ROW_UNITS: f64 = 2.0;

// ── Key → scale degree mapping ────────────────────────────────────────────────

/// `1`–`7` pick a degree in octave 1, the shifted row `!`–`&` in octave 2.
pub fn key_to_degree(key: char) -> Option<(u8, usize)> {
    let (octave, index) = match key {
        '1' => (1,0), '2' => (1,1), '3' => (1,2), '4' => (1,3),
        '5' => (1,4), '6' => (1,5), '7' => (1,6),
        '!' => (2,0), '@' => (2,1), '#' => (2,2), '$' => (2,3),
        '%' => (2,4), '^' => (2,5), '&' => (2,6),
        _ => return None,
    };
    Some((octave, index))
}

// ── Terminal cells ↔ canvas units ─────────────────────────────────────────────

pub fn surface_for(area: Rect) -> Surface {
    Surface {
        left:   area.x as f64,
        top:    area.y as f64 * ROW_UNITS,
        width:  area.width as f64,
        height: area.height as f64 * ROW_UNITS,
    }
}

/// Client-space position of the centre of a terminal cell.
pub fn cell_center(column: u16, row: u16) -> Position {
    Position::new(column as f64 + 0.5, (row as f64 + 0.5) * ROW_UNITS)
}

// ── App state ─────────────────────────────────────────────────────────────────

pub struct App {
    pub visualizer:  VisualizerState<BuiltinTheory>,
    pub should_quit: bool,
    pub status_msg:  String,
    canvas:          Option<Surface>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self {
            visualizer:  VisualizerState::new(BuiltinTheory, config),
            should_quit: false,
            status_msg:  String::new(),
            canvas:      None,
        }
    }

    /// Called on every layout pass with the inner area of the canvas block.
    pub fn set_canvas(&mut self, area: Rect) {
        let surface = surface_for(area);
        self.canvas = Some(surface);
        self.visualizer.set_surface(surface);
    }

    // ── Pointer ───────────────────────────────────────────────────────────

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let pos = cell_center(mouse.column, mouse.row);
        let inside = self.canvas.is_some_and(|surface| surface.contains(pos));

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if inside => self.visualizer.pointer_down(pos),
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved if inside => {
                self.visualizer.pointer_move(pos)
            }
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                self.visualizer.pointer_leave()
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.visualizer.pointer_up(pos);
                self.refresh_status();
            }
            _ => {}
        }
    }

    pub fn focus_lost(&mut self) {
        self.visualizer.pointer_leave();
    }

    // ── Global controls ───────────────────────────────────────────────────

    pub fn next_key(&mut self) {
        self.visualizer.cycle_key(1);
        self.status_msg = format!("Key: {}", self.visualizer.key());
    }

    pub fn prev_key(&mut self) {
        self.visualizer.cycle_key(-1);
        self.status_msg = format!("Key: {}", self.visualizer.key());
    }

    pub fn toggle_mode(&mut self) {
        self.visualizer.toggle_mode();
        self.status_msg = format!("View: {}", self.visualizer.mode().name());
    }

    pub fn cycle_chord(&mut self) {
        self.visualizer.cycle_chord();
        self.status_msg = match self.visualizer.selection().chord() {
            Some(chord) => format!("Chord: {chord}"),
            None        => "Chord: none".to_string(),
        };
    }

    pub fn select_degree(&mut self, key: char) {
        let Some((octave, index)) = key_to_degree(key) else { return };
        self.visualizer.click_degree(octave, index);
        self.refresh_status();
    }

    pub fn clear_selection(&mut self) {
        self.visualizer.clear_selection();
        self.status_msg = "Selection cleared".to_string();
    }

    fn refresh_status(&mut self) {
        let names: Vec<&str> = self.visualizer.selection().notes().iter()
            .map(|n| n.name.as_str())
            .collect();
        if !names.is_empty() {
            self.status_msg = format!("Selected: {}", names.join(", "));
        }
    }
}
