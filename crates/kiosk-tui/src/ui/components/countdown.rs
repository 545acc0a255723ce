//! Circular OTP countdown indicator

use ratatui::prelude::*;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Points};
use ratatui::widgets::{Block, Borders};

use crate::surface::CountdownFrame;
use crate::ui::Theme;

const RING_RADIUS: f64 = 0.9;
const RING_SAMPLES: usize = 240;

/// Points on the ring from 12 o'clock, clockwise, covering `sweep_degrees`
pub fn arc_points(sweep_degrees: f64) -> Vec<(f64, f64)> {
    let sweep = sweep_degrees.clamp(0.0, 360.0);
    let samples = ((RING_SAMPLES as f64) * sweep / 360.0).round() as usize;
    (0..samples)
        .map(|i| {
            let angle = (i as f64 * 360.0 / RING_SAMPLES as f64).to_radians();
            (RING_RADIUS * angle.sin(), RING_RADIUS * angle.cos())
        })
        .collect()
}

/// Render the ring with the remaining time in the middle
pub fn render(frame: &mut Frame, area: Rect, countdown: CountdownFrame, theme: &Theme) {
    let track = arc_points(360.0);
    let arc = arc_points(countdown.sweep_degrees);
    let color = theme.countdown(countdown.sweep_degrees / 360.0);
    let label = countdown.formatted();
    let track_color = theme.ring_track;

    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::NONE))
        .marker(Marker::Braille)
        .x_bounds([-1.0, 1.0])
        .y_bounds([-1.0, 1.0])
        .paint(move |ctx| {
            ctx.draw(&Points {
                coords: &track,
                color: track_color,
            });
            ctx.draw(&Points {
                coords: &arc,
                color,
            });
            ctx.print(
                -0.15,
                0.0,
                Line::styled(label.clone(), Style::default().fg(color).add_modifier(Modifier::BOLD)),
            );
        });

    frame.render_widget(canvas, area);
}
