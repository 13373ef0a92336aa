use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Line as CanvasLine},
        Block, Borders, Paragraph, Wrap,
    },
    Frame,
};

use crate::app::{App, ROW_UNITS};
use crate::drag::DragState;
use crate::geometry::{Position, ViewMode};
use crate::visualizer::{HoverTarget, ProjectedNote};

// ── Top-level routing ─────────────────────────────────────────────────────────

/// Lays out all panels and hands the canvas area back to the app so pointer
/// events can be mapped onto it.
pub fn draw(f: &mut Frame, app: &mut App) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // title bar
            Constraint::Length(3),  // key / chord / view
            Constraint::Length(3),  // interval label
            Constraint::Min(10),    // canvas
            Constraint::Length(3),  // status
            Constraint::Length(4),  // help
        ])
        .split(area);

    draw_title(f, chunks[0]);
    draw_controls(f, chunks[1], app);
    draw_label(f, chunks[2], app);
    draw_canvas(f, chunks[3], app);
    draw_status(f, chunks[4], app);
    draw_help(f, chunks[5]);
}

// ── Title bar ─────────────────────────────────────────────────────────────────

fn draw_title(f: &mut Frame, area: Rect) {
    let text = "  Octave Visualizer  ─  click two notes or pick a chord, drag the chain to turn it";
    f.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

// ── Controls row ──────────────────────────────────────────────────────────────

fn draw_controls(f: &mut Frame, area: Rect, app: &App) {
    let vis   = &app.visualizer;
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let chord = vis.selection().chord().unwrap_or("none");
    let steps = vis.step_pattern().iter()
        .map(|&s| match s {
            1 => "H".to_string(),
            2 => "W".to_string(),
            n => n.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ");

    let line = Line::from(vec![
        Span::styled("Key: ",   label), Span::styled(vis.key(), value),
        Span::styled(" [←→]  ", label), Span::styled(steps, label),
        Span::styled("  │  ", label),
        Span::styled("Chord: ", label), Span::styled(chord, value),
        Span::styled(" [c]  │  ", label),
        Span::styled("View: ",  label), Span::styled(vis.mode().name(), value),
        Span::styled(" [Tab]", label),
    ]);
    f.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

// ── Interval label ────────────────────────────────────────────────────────────

fn draw_label(f: &mut Frame, area: Rect, app: &App) {
    let line = match app.visualizer.label() {
        Some(label) => Line::from(vec![
            Span::styled("Interval: ", Style::default().fg(Color::DarkGray)),
            Span::styled(label.to_string(),
                         Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD)),
        ]),
        None => Line::from(Span::styled("—", Style::default().fg(Color::DarkGray))),
    };
    f.render_widget(
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

// ── Canvas ────────────────────────────────────────────────────────────────────

fn note_style(p: &ProjectedNote<'_>) -> Style {
    match p.rank {
        Some(0) => Style::default().fg(Color::LightGreen).add_modifier(Modifier::BOLD),
        Some(_) => Style::default().bg(Color::Green).fg(Color::White).add_modifier(Modifier::BOLD),
        None if p.in_chain => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        None => Style::default().fg(Color::Gray),
    }
}

fn draw_canvas(f: &mut Frame, area: Rect, app: &mut App) {
    let title = match app.visualizer.mode() {
        ViewMode::Circle => " Circle — drag the arc to rotate ",
        ViewMode::Linear => " Linear — drag the line to slide ",
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    app.set_canvas(inner);

    let vis    = &app.visualizer;
    let width  = inner.width as f64;
    let height = inner.height as f64 * ROW_UNITS;
    // Canvas y grows upwards; layout y grows downwards.
    let flip = |p: Position| (p.x, height - p.y);

    let path_hovered = vis.hover() == Some(&HoverTarget::Chain);
    let path_color = if path_hovered { Color::LightGreen } else { Color::Green };
    let path: Vec<(f64, f64)> = vis.chain_path()
        .map(|p| p.sample().into_iter().map(flip).collect())
        .unwrap_or_default();

    let markers: Vec<(f64, f64, Color)> = vis.chain_positions().iter()
        .map(|p| {
            let hovered = vis.hover() == Some(&HoverTarget::Note(p.note.name.clone()));
            let color = match (hovered, p.endpoint) {
                (true, _)      => Color::LightGreen,
                (false, true)  => Color::Green,
                (false, false) => Color::Gray,
            };
            let (x, y) = flip(p.position);
            (x, y, color)
        })
        .collect();

    let labels: Vec<(f64, f64, String, Style)> = vis.visible_notes().iter()
        .map(|p| {
            let name = match vis.mode() {
                ViewMode::Circle => p.note.pitch_class().to_string(),
                ViewMode::Linear => p.note.name.clone(),
            };
            let (x, y) = flip(p.position);
            (x - name.chars().count() as f64 / 2.0, y, name, note_style(p))
        })
        .collect();

    let circle = *vis.circle();
    let linear = *vis.linear();
    let mode   = vis.mode();
    let radius = vis.note_radius();

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(move |ctx| {
            match mode {
                ViewMode::Circle => {
                    let (x, y) = flip(circle.center);
                    ctx.draw(&Circle { x, y, radius: circle.radius, color: Color::DarkGray });
                }
                ViewMode::Linear => {
                    let y = height - linear.height / 2.0;
                    ctx.draw(&CanvasLine {
                        x1: linear.margin, y1: y,
                        x2: linear.width - linear.margin, y2: y,
                        color: Color::DarkGray,
                    });
                }
            }
            ctx.layer();

            for seg in path.windows(2) {
                let ((x1, y1), (x2, y2)) = (seg[0], seg[1]);
                ctx.draw(&CanvasLine { x1, y1, x2, y2, color: path_color });
            }
            for &(x, y, color) in &markers {
                ctx.draw(&Circle { x, y, radius, color });
            }
            ctx.layer();

            for (x, y, name, style) in &labels {
                ctx.print(*x, *y, Span::styled(name.clone(), *style));
            }
        });
    f.render_widget(canvas, area);
}

// ── Status ────────────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let vis = &app.visualizer;
    let drag = match vis.drag_state() {
        DragState::Idle => String::new(),
        DragState::Rotating { .. } => format!("Rotating {:+.0}°  │  ", vis.offset().to_degrees()),
        DragState::Sliding { .. }  => format!("Sliding {:+.1}  │  ", vis.offset()),
    };
    let unavailable = match (vis.chord_unavailable(), vis.selection().chord()) {
        (true, Some(chord)) => format!("No {chord} in {}", vis.key()),
        _ => String::new(),
    };

    let chain: Vec<&str> = vis.chain().iter().map(|n| n.name.as_str()).collect();
    let chain_s = if chain.is_empty() { "—".to_string() } else { chain.join(" ") };

    let line = Line::from(vec![
        Span::styled("Chain: ", Style::default().fg(Color::DarkGray)),
        Span::styled(chain_s, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::raw("  │  "),
        Span::styled(drag, Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::styled(unavailable, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(app.status_msg.as_str(), Style::default().fg(Color::Yellow)),
    ]);
    f.render_widget(
        Paragraph::new(line)
            .block(Block::default().title(" Status ").borders(Borders::ALL))
            .wrap(Wrap { trim: false }),
        area,
    );
}

// ── Help panel ────────────────────────────────────────────────────────────────

fn draw_help(f: &mut Frame, area: Rect) {
    let w = Style::default().fg(Color::White);
    let d = Style::default().fg(Color::DarkGray);

    let keys = Line::from(vec![
        Span::styled("[Tab/F2] ", w), Span::raw("View  │  "),
        Span::styled("[←→] ",     w), Span::raw("Key  │  "),
        Span::styled("[c] ",      w), Span::raw("Chord  │  "),
        Span::styled("[1-7] ",    w), Span::raw("Degree  "),
        Span::styled("[!-&] ",    w), Span::raw("Upper octave  │  "),
        Span::styled("[Bksp] ",   w), Span::raw("Clear  │  "),
        Span::styled("[Esc/q] ",  w), Span::raw("Quit"),
    ]);
    let mouse = Line::from(vec![
        Span::styled("Mouse: ", d),
        Span::raw("click a note to select  │  press on the green chain and drag to turn it"),
    ]);

    f.render_widget(
        Paragraph::new(vec![keys, mouse])
            .block(Block::default().title(" Help ").borders(Borders::ALL))
            .style(Style::default().fg(Color::DarkGray)),
        area,
    );
}
