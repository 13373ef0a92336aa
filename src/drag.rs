use tracing::debug;

use crate::geometry::{angle_from_pointer, Position, Surface, ViewMode};

// ── Drag state ────────────────────────────────────────────────────────────────

/// Rotation (circle view, radians) or slide (linear view, pixels) in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Rotating { start_angle: f64, current_angle: f64 },
    Sliding  { start_x: f64, current_x: f64 },
}

#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn state(&self) -> DragState { self.state }

    pub fn is_dragging(&self) -> bool { self.state != DragState::Idle }

    /// Begin a drag. Ignored when the chain has nothing to move, or when the
    /// circle view has no surface to measure the pointer angle against.
    pub fn start(
        &mut self,
        mode: ViewMode,
        chain_len: usize,
        pointer: Position,
        surface: Option<&Surface>,
        center: Position,
    ) -> bool {
        if chain_len < 2 { return false; }

        self.state = match mode {
            ViewMode::Linear => DragState::Sliding { start_x: pointer.x, current_x: pointer.x },
            ViewMode::Circle => {
                let Some(surface) = surface else { return false };
                let angle = angle_from_pointer(surface, center, pointer);
                DragState::Rotating { start_angle: angle, current_angle: angle }
            }
        };
        debug!("[drag] start {:?}", self.state);
        true
    }

    /// Track the pointer. A no-op unless a drag is in progress; keeps the
    /// previous angle when no surface is available.
    pub fn update(&mut self, pointer: Position, surface: Option<&Surface>, center: Position) -> bool {
        match &mut self.state {
            DragState::Idle => false,
            DragState::Sliding { current_x, .. } => {
                *current_x = pointer.x;
                true
            }
            DragState::Rotating { current_angle, .. } => {
                let Some(surface) = surface else { return false };
                *current_angle = angle_from_pointer(surface, center, pointer);
                true
            }
        }
    }

    /// Returns whether a drag was actually ended.
    pub fn end(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        if was_dragging {
            debug!("[drag] end, offset {:.3}", self.offset());
        }
        self.state = DragState::Idle;
        was_dragging
    }

    /// `current − start`; zero when idle.
    pub fn offset(&self) -> f64 {
        match self.state {
            DragState::Idle => 0.0,
            DragState::Rotating { start_angle, current_angle } => current_angle - start_angle,
            DragState::Sliding { start_x, current_x } => current_x - start_x,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const SURFACE: Surface = Surface { left: 0.0, top: 0.0, width: 300.0, height: 300.0 };
    const CENTER: Position = Position::new(150.0, 150.0);

    #[test]
    fn short_chains_cannot_be_dragged() {
        let mut drag = DragController::default();
        assert!(!drag.start(ViewMode::Linear, 1, Position::new(10.0, 10.0), Some(&SURFACE), CENTER));
        assert_eq!(drag.state(), DragState::Idle);
    }

    #[test]
    fn sliding_offset_is_pixel_delta() {
        let mut drag = DragController::default();
        assert!(drag.start(ViewMode::Linear, 3, Position::new(100.0, 40.0), None, CENTER));
        drag.update(Position::new(130.0, 90.0), None, CENTER);
        assert_eq!(drag.offset(), 30.0);
        assert_eq!(drag.state(), DragState::Sliding { start_x: 100.0, current_x: 130.0 });
    }

    #[test]
    fn rotating_offset_is_angle_delta() {
        let mut drag = DragController::default();
        assert!(drag.start(ViewMode::Circle, 2, Position::new(250.0, 150.0), Some(&SURFACE), CENTER));
        drag.update(Position::new(150.0, 250.0), Some(&SURFACE), CENTER);
        assert!((drag.offset() - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn rotation_without_a_surface_is_aborted() {
        let mut drag = DragController::default();
        assert!(!drag.start(ViewMode::Circle, 2, Position::new(250.0, 150.0), None, CENTER));

        assert!(drag.start(ViewMode::Circle, 2, Position::new(250.0, 150.0), Some(&SURFACE), CENTER));
        drag.update(Position::new(150.0, 250.0), Some(&SURFACE), CENTER);
        let before = drag.offset();
        assert!(!drag.update(Position::new(50.0, 150.0), None, CENTER));
        assert_eq!(drag.offset(), before);
    }

    #[test]
    fn moves_while_idle_are_ignored_and_end_resets() {
        let mut drag = DragController::default();
        assert!(!drag.update(Position::new(5.0, 5.0), Some(&SURFACE), CENTER));
        assert_eq!(drag.offset(), 0.0);
        assert!(!drag.end());

        drag.start(ViewMode::Linear, 2, Position::new(0.0, 0.0), None, CENTER);
        drag.update(Position::new(12.0, 0.0), None, CENTER);
        assert!(drag.end());
        assert!(!drag.is_dragging());
        assert_eq!(drag.offset(), 0.0);
    }
}
