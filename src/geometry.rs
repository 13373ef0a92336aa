// Analytic note layout for the circular and linear views.

use std::f64::consts::{PI, TAU};
use std::fmt;

use serde::Deserialize;

use crate::scale::Note;

pub const DEGREES_PER_SEMITONE: f64 = 30.0;
pub const TOTAL_SEMITONES_TWO_OCTAVES: f64 = 24.0;
/// Puts the tonic at twelve o'clock.
pub const ANGLE_OFFSET_DEGREES: f64 = -90.0;

const ARC_SAMPLES_PER_TURN: usize = 96;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Circle,
    Linear,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Circle => Self::Linear,
            Self::Linear => Self::Circle,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Circle => "Circle",
            Self::Linear => "Linear",
        }
    }
}

// ── Primitives ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }

    pub fn distance(self, other: Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Bounding box of the interactive surface in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Surface {
    pub left:   f64,
    pub top:    f64,
    pub width:  f64,
    pub height: f64,
}

impl Surface {
    pub fn to_local(&self, client: Position) -> Position {
        Position::new(client.x - self.left, client.y - self.top)
    }

    pub fn contains(&self, client: Position) -> bool {
        let p = self.to_local(client);
        (0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleGeometry {
    pub radius: f64,
    pub center: Position,
}

impl Default for CircleGeometry {
    fn default() -> Self {
        Self { radius: 120.0, center: Position::new(150.0, 150.0) }
    }
}

impl CircleGeometry {
    /// Largest circle centred in a `width` × `height` surface, inset by `margin`.
    pub fn fit(width: f64, height: f64, margin: f64) -> Self {
        Self {
            radius: (width.min(height) / 2.0 - margin).max(0.0),
            center: Position::new(width / 2.0, height / 2.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearGeometry {
    pub width:  f64,
    pub height: f64,
    pub margin: f64,
}

impl Default for LinearGeometry {
    fn default() -> Self {
        Self { width: 300.0, height: 96.0, margin: 40.0 }
    }
}

// ── Projection ────────────────────────────────────────────────────────────────

/// Angle of `note` in radians. Octave-2 notes share their octave-1 slot.
pub fn note_angle(note: &Note, offset: f64) -> f64 {
    (DEGREES_PER_SEMITONE * note.semitone_in_octave() as f64 + ANGLE_OFFSET_DEGREES).to_radians()
        + offset
}

pub fn circle_position(note: &Note, geometry: &CircleGeometry, offset: f64) -> Position {
    point_on_circle(geometry, note_angle(note, offset))
}

/// Horizontal spacing follows semitone distance, not list index.
pub fn linear_position(note: &Note, geometry: &LinearGeometry, offset: f64) -> Position {
    let span = geometry.width - 2.0 * geometry.margin;
    Position::new(
        geometry.margin + note.semitone as f64 / TOTAL_SEMITONES_TWO_OCTAVES * span + offset,
        geometry.height / 2.0,
    )
}

fn point_on_circle(geometry: &CircleGeometry, angle: f64) -> Position {
    Position::new(
        geometry.center.x + geometry.radius * angle.cos(),
        geometry.center.y + geometry.radius * angle.sin(),
    )
}

/// Angle from the circle centre to a client-space pointer.
pub fn angle_from_pointer(surface: &Surface, center: Position, pointer: Position) -> f64 {
    let local = surface.to_local(pointer);
    (local.y - center.y).atan2(local.x - center.x)
}

// ── Chain paths ───────────────────────────────────────────────────────────────

/// One continuous arc across a circular chain, swept in the positive direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcPath {
    pub center:      Position,
    pub radius:      f64,
    pub start_angle: f64,
    pub end_angle:   f64,
    pub large_arc:   bool,
}

impl ArcPath {
    pub fn start(&self) -> Position { self.point_at(self.start_angle) }
    pub fn end(&self) -> Position { self.point_at(self.end_angle) }
    pub fn span(&self) -> f64 { self.end_angle - self.start_angle }

    fn point_at(&self, angle: f64) -> Position {
        point_on_circle(&CircleGeometry { radius: self.radius, center: self.center }, angle)
    }

    /// Points along the arc for raster backends.
    pub fn sample(&self) -> Vec<Position> {
        let steps = ((self.span() / TAU) * ARC_SAMPLES_PER_TURN as f64).ceil().max(1.0) as usize;
        (0..=steps)
            .map(|i| self.point_at(self.start_angle + self.span() * i as f64 / steps as f64))
            .collect()
    }

    pub fn distance_to(&self, p: Position) -> f64 {
        let angle = (p.y - self.center.y).atan2(p.x - self.center.x);
        let rel = (angle - self.start_angle).rem_euclid(TAU);
        if self.span() >= TAU || rel <= self.span() {
            (p.distance(self.center) - self.radius).abs()
        } else {
            p.distance(self.start()).min(p.distance(self.end()))
        }
    }
}

/// SVG path data. A sweep of a full turn or more is split at its midpoint,
/// since a single arc command with coincident endpoints draws nothing.
impl fmt::Display for ArcPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (a, b) = (self.start(), self.end());
        let r = self.radius;
        if self.span() < TAU - 1e-9 {
            return write!(f, "M {} {} A {r} {r} 0 {} 1 {} {}",
                a.x, a.y, u8::from(self.large_arc), b.x, b.y);
        }
        let half  = self.span() / 2.0;
        let mid   = self.point_at(self.start_angle + half);
        let large = u8::from(half > PI);
        write!(f, "M {} {} A {r} {r} 0 {large} 1 {} {} A {r} {r} 0 {large} 1 {} {}",
            a.x, a.y, mid.x, mid.y, b.x, b.y)
    }
}

/// Arc joining the first and last chain notes. Octave-2 endpoints sit one
/// full turn ahead so the arc sweeps forward through the wrap.
pub fn arc_path(chain: &[Note], geometry: &CircleGeometry, offset: f64) -> Option<ArcPath> {
    let [first, .., last] = chain else { return None };
    let unwrapped = |n: &Note| note_angle(n, offset) + if n.octave >= 2 { TAU } else { 0.0 };

    let (mut start_angle, mut end_angle) = (unwrapped(first), unwrapped(last));
    if end_angle < start_angle {
        std::mem::swap(&mut start_angle, &mut end_angle);
    }

    Some(ArcPath {
        center: geometry.center,
        radius: geometry.radius,
        start_angle,
        end_angle,
        large_arc: (end_angle - start_angle).abs() > PI,
    })
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinePath {
    pub points: Vec<Position>,
}

impl LinePath {
    pub fn distance_to(&self, p: Position) -> f64 {
        self.points.windows(2)
            .map(|w| distance_to_segment(p, w[0], w[1]))
            .fold(f64::INFINITY, f64::min)
    }
}

impl fmt::Display for LinePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.points.iter().enumerate() {
            let cmd = if i == 0 { "M" } else { " L" };
            write!(f, "{cmd} {} {}", p.x, p.y)?;
        }
        Ok(())
    }
}

/// Polyline through every chain note.
pub fn line_path(chain: &[Note], geometry: &LinearGeometry, offset: f64) -> Option<LinePath> {
    if chain.len() < 2 { return None; }
    Some(LinePath {
        points: chain.iter().map(|n| linear_position(n, geometry, offset)).collect(),
    })
}

fn distance_to_segment(p: Position, a: Position, b: Position) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq < 1e-12 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Position::new(a.x + t * dx, a.y + t * dy))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool { (a - b).abs() < EPS }

    #[test]
    fn tonic_sits_at_the_top_of_the_circle() {
        let geo = CircleGeometry::default();
        let p = circle_position(&Note::new("C1", 1, 0), &geo, 0.0);
        assert!(close(p.x, 150.0) && close(p.y, 30.0), "{p:?}");

        let fifth = circle_position(&Note::new("G1", 1, 7), &geo, 0.0);
        let angle = (7.0 * 30.0 - 90.0_f64).to_radians();
        assert!(close(fifth.x, 150.0 + 120.0 * angle.cos()));
        assert!(close(fifth.y, 150.0 + 120.0 * angle.sin()));
    }

    #[test]
    fn octave_two_shares_the_octave_one_slot() {
        let geo = CircleGeometry::default();
        let low  = circle_position(&Note::new("E1", 1, 4), &geo, 0.3);
        let high = circle_position(&Note::new("E2", 2, 16), &geo, 0.3);
        assert!(close(low.x, high.x) && close(low.y, high.y));
    }

    #[test]
    fn circle_projection_is_deterministic() {
        let geo = CircleGeometry::default();
        let n = Note::new("A1", 1, 9);
        assert_eq!(circle_position(&n, &geo, 1.25), circle_position(&n, &geo, 1.25));
    }

    #[test]
    fn linear_spacing_is_semitone_proportional() {
        let geo = LinearGeometry { width: 280.0, height: 96.0, margin: 20.0 };
        let c = linear_position(&Note::new("C1", 1, 0), &geo, 0.0);
        let e = linear_position(&Note::new("E1", 1, 4), &geo, 0.0);
        let f = linear_position(&Note::new("F1", 1, 5), &geo, 0.0);
        assert!(close(c.x, 20.0));
        assert!(close(c.y, 48.0));
        assert!(close(e.x - c.x, 40.0));
        assert!(close(f.x - e.x, 10.0));

        let top = linear_position(&Note::new("C3", 2, 24), &geo, 5.0);
        assert!(close(top.x, 265.0));
    }

    #[test]
    fn octave_two_end_wraps_a_full_turn() {
        let geo = CircleGeometry::default();
        let chain = [Note::new("G1", 1, 7), Note::new("C2", 2, 12)];
        let arc = arc_path(&chain, &geo, 0.0).unwrap();
        let base = note_angle(&Note::new("C1", 1, 0), 0.0);
        assert!(close(arc.end_angle, base + TAU));
        assert!(close(arc.span(), 150_f64.to_radians()));
        assert!(!arc.large_arc);
    }

    #[test]
    fn large_arc_flag_follows_the_span() {
        let geo = CircleGeometry::default();
        let c = Note::new("C1", 1, 0);
        let g = Note::new("G1", 1, 7);
        let d = Note::new("D1", 1, 2);
        assert!(arc_path(&[c.clone(), g.clone()], &geo, 0.0).unwrap().large_arc);
        assert!(!arc_path(&[c.clone(), d], &geo, 0.0).unwrap().large_arc);

        // Descending chains cover the same span as their ascending twin.
        let down = arc_path(&[g.clone(), c.clone()], &geo, 0.0).unwrap();
        let up   = arc_path(&[c, g], &geo, 0.0).unwrap();
        assert_eq!(down, up);
    }

    #[test]
    fn arc_needs_two_notes() {
        let geo = CircleGeometry::default();
        assert!(arc_path(&[], &geo, 0.0).is_none());
        assert!(arc_path(&[Note::new("C1", 1, 0)], &geo, 0.0).is_none());
        assert!(line_path(&[Note::new("C1", 1, 0)], &LinearGeometry::default(), 0.0).is_none());
    }

    #[test]
    fn arc_renders_as_svg_path_data() {
        let geo = CircleGeometry { radius: 10.0, center: Position::new(0.0, 0.0) };
        let arc = ArcPath {
            center: geo.center,
            radius: 10.0,
            start_angle: 0.0,
            end_angle: PI / 2.0,
            large_arc: false,
        };
        let s = arc.to_string();
        assert!(s.starts_with("M 10 0 A 10 10 0 0 1 "), "{s}");
        assert_eq!(s.matches(" A ").count(), 1);
    }

    #[test]
    fn full_turn_arcs_are_split_in_two() {
        let geo = CircleGeometry::default();
        let octave = arc_path(&[Note::new("C1", 1, 0), Note::new("C2", 2, 12)], &geo, 0.0).unwrap();
        assert!(close(octave.span(), TAU));
        let s = octave.to_string();
        assert_eq!(s.matches(" A ").count(), 2, "{s}");
        // Midway through the turn is six o'clock.
        assert!(s.contains(" 150 270 A "), "{s}");

        let tenth = arc_path(&[Note::new("C1", 1, 0), Note::new("E2", 2, 16)], &geo, 0.0).unwrap();
        let s = tenth.to_string();
        assert_eq!(s.matches(" A 120 120 0 1 1 ").count(), 2, "{s}");
    }

    #[test]
    fn arc_sampling_follows_the_sweep() {
        let geo = CircleGeometry::default();
        let arc = arc_path(&[Note::new("C1", 1, 0), Note::new("F#1", 1, 6)], &geo, 0.0).unwrap();
        let pts = arc.sample();
        assert!(pts.len() > 2);
        assert!(pts[0].distance(arc.start()) < 1e-6);
        assert!(pts[pts.len() - 1].distance(arc.end()) < 1e-6);
        // C → F# clockwise passes three o'clock.
        assert!(pts.iter().any(|p| p.x > 265.0));
    }

    #[test]
    fn arc_distance_is_zero_on_the_arc_and_large_off_it() {
        let geo = CircleGeometry::default();
        let arc = arc_path(&[Note::new("C1", 1, 0), Note::new("F#1", 1, 6)], &geo, 0.0).unwrap();
        assert!(arc.distance_to(Position::new(270.0, 150.0)) < 1e-9);
        // Nine o'clock lies on the circle but outside the swept span.
        assert!(arc.distance_to(Position::new(30.0, 150.0)) > 100.0);
    }

    #[test]
    fn line_path_and_distance() {
        let geo = LinearGeometry { width: 280.0, height: 96.0, margin: 20.0 };
        let chain = [Note::new("C1", 1, 0), Note::new("D1", 1, 2), Note::new("E1", 1, 4)];
        let line = line_path(&chain, &geo, 0.0).unwrap();
        assert_eq!(line.to_string(), "M 20 48 L 40 48 L 60 48");
        assert!(close(line.distance_to(Position::new(30.0, 50.0)), 2.0));
        assert!(close(line.distance_to(Position::new(10.0, 48.0)), 10.0));
    }

    #[test]
    fn pointer_angle_is_measured_in_surface_space() {
        let surface = Surface { left: 100.0, top: 50.0, width: 300.0, height: 300.0 };
        let center = Position::new(150.0, 150.0);
        let right = angle_from_pointer(&surface, center, Position::new(400.0, 200.0));
        let below = angle_from_pointer(&surface, center, Position::new(250.0, 300.0));
        assert!(close(right, 0.0));
        assert!(close(below, PI / 2.0));
        assert!(surface.contains(Position::new(250.0, 200.0)));
        assert!(!surface.contains(Position::new(50.0, 200.0)));
    }

    #[test]
    fn fit_centres_the_circle() {
        let geo = CircleGeometry::fit(80.0, 40.0, 4.0);
        assert_eq!(geo.center, Position::new(40.0, 20.0));
        assert!(close(geo.radius, 16.0));
    }
}
