//! Wireframe surface of a grid frame
//!
//! Cells are projected isometrically: columns run down-right, rows run
//! down-left and the value lifts the point. The value axis is pinned to a
//! fixed range so successive frames are comparable.

use super::heatmap::viridis;
use crate::protocol::{GridFrame, GridShape};
use ratatui::prelude::*;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine};
use ratatui::widgets::Block;

const COS30: f64 = 0.866_025_403_784_438_6;
const SIN30: f64 = 0.5;
const PAD: f64 = 0.6;

/// One projected wireframe edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub color: Color,
}

/// Value-axis limits and axis titles
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceAxes {
    pub z_limits: (f64, f64),
    pub labels: [&'static str; 3],
}

/// Surface plot rebuilt from scratch on every frame
#[derive(Debug, Clone)]
pub struct SurfaceView {
    shape: GridShape,
    z_range: (f64, f64),
    heights: Vec<i32>,
    segments: Vec<Segment>,
    axes: Option<SurfaceAxes>,
}

impl SurfaceView {
    pub fn new(shape: GridShape, z_range: (f64, f64)) -> Self {
        Self {
            shape,
            z_range,
            heights: Vec::new(),
            segments: Vec::new(),
            axes: None,
        }
    }

    /// Clear the plot, draw the new frame, then restore limits and labels.
    pub fn update(&mut self, frame: &GridFrame) {
        self.clear();
        self.plot(frame);
        self.axes = Some(SurfaceAxes {
            z_limits: self.z_range,
            labels: ["row", "col", "value"],
        });
    }

    fn clear(&mut self) {
        self.heights.clear();
        self.segments.clear();
        self.axes = None;
    }

    fn plot(&mut self, frame: &GridFrame) {
        let GridShape { rows, cols } = self.shape;
        self.heights.extend_from_slice(frame.cells());

        for r in 0..rows {
            for c in 0..cols {
                let Some(z) = frame.get(r, c) else { continue };
                if c + 1 < cols {
                    if let Some(z2) = frame.get(r, c + 1) {
                        self.push_edge((r, c, z), (r, c + 1, z2));
                    }
                }
                if r + 1 < rows {
                    if let Some(z2) = frame.get(r + 1, c) {
                        self.push_edge((r, c, z), (r + 1, c, z2));
                    }
                }
            }
        }
    }

    fn push_edge(&mut self, a: (usize, usize, i32), b: (usize, usize, i32)) {
        let mean = (a.2 as f64 + b.2 as f64) / 2.0;
        self.segments.push(Segment {
            from: self.project(a.0, a.1, a.2 as f64),
            to: self.project(b.0, b.1, b.2 as f64),
            color: viridis(self.normalize(mean)),
        });
    }

    fn normalize(&self, z: f64) -> f64 {
        let (lo, hi) = self.z_range;
        if hi > lo {
            (z - lo) / (hi - lo)
        } else {
            0.0
        }
    }

    fn lift(&self) -> f64 {
        (self.shape.rows + self.shape.cols) as f64 * 0.5
    }

    /// Screen position of cell (row, col) at height z
    pub fn project(&self, row: usize, col: usize, z: f64) -> (f64, f64) {
        let (r, c) = (row as f64, col as f64);
        ((c - r) * COS30, -(c + r) * SIN30 + self.normalize(z) * self.lift())
    }

    pub fn x_bounds(&self) -> [f64; 2] {
        let rows = self.shape.rows.saturating_sub(1) as f64;
        let cols = self.shape.cols.saturating_sub(1) as f64;
        [-rows * COS30 - PAD, cols * COS30 + PAD]
    }

    pub fn y_bounds(&self) -> [f64; 2] {
        let depth = (self.shape.rows + self.shape.cols).saturating_sub(2) as f64;
        [-depth * SIN30 - PAD, self.lift() + PAD]
    }

    #[cfg(test)]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Cell values behind the current plot, row-major
    #[cfg(test)]
    pub fn heights(&self) -> &[i32] {
        &self.heights
    }

    #[cfg(test)]
    pub fn axes(&self) -> Option<&SurfaceAxes> {
        self.axes.as_ref()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let (last_row, last_col) = (
            self.shape.rows.saturating_sub(1),
            self.shape.cols.saturating_sub(1),
        );

        let canvas = Canvas::default()
            .block(Block::bordered().title(" Surface "))
            .marker(Marker::Braille)
            .x_bounds(self.x_bounds())
            .y_bounds(self.y_bounds())
            .paint(|ctx| {
                let Some(axes) = &self.axes else {
                    ctx.print(-1.0, 0.0, "Waiting for data...".dark_gray());
                    return;
                };
                let (z_lo, z_hi) = axes.z_limits;

                // Floor outline and the value axis at the far corner
                let corners = [
                    self.project(0, 0, z_lo),
                    self.project(0, last_col, z_lo),
                    self.project(last_row, last_col, z_lo),
                    self.project(last_row, 0, z_lo),
                ];
                for i in 0..corners.len() {
                    let (a, b) = (corners[i], corners[(i + 1) % corners.len()]);
                    ctx.draw(&CanvasLine {
                        x1: a.0,
                        y1: a.1,
                        x2: b.0,
                        y2: b.1,
                        color: Color::DarkGray,
                    });
                }
                let top = self.project(0, 0, z_hi);
                ctx.draw(&CanvasLine {
                    x1: corners[0].0,
                    y1: corners[0].1,
                    x2: top.0,
                    y2: top.1,
                    color: Color::DarkGray,
                });

                ctx.layer();
                for s in &self.segments {
                    ctx.draw(&CanvasLine {
                        x1: s.from.0,
                        y1: s.from.1,
                        x2: s.to.0,
                        y2: s.to.1,
                        color: s.color,
                    });
                }

                let [row_label, col_label, value_label] = axes.labels;
                let row_end = self.project(last_row, 0, z_lo);
                let col_end = self.project(0, last_col, z_lo);
                ctx.print(row_end.0, row_end.1 - PAD / 2.0, row_label.dark_gray());
                ctx.print(col_end.0, col_end.1 - PAD / 2.0, col_label.dark_gray());
                ctx.print(top.0, top.1, dim(format!("{value_label} {z_hi:.0}")));
                ctx.print(corners[0].0, corners[0].1, dim(format!("{z_lo:.0}")));
                if let Some(peak) = self.heights.iter().max() {
                    ctx.print(row_end.0, top.1, dim(format!("peak {peak}")));
                }
            });

        frame.render_widget(canvas, area);
    }
}

fn dim(text: String) -> Span<'static> {
    Span::styled(text, Style::default().fg(Color::DarkGray))
}
