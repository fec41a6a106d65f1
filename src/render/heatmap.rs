//! Colour-mapped grid view

use crate::protocol::{GridFrame, GridShape};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph};

/// Viridis control points, low to high
const VIRIDIS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

/// Sample the colour map at `t` in [0, 1]
pub fn viridis(t: f64) -> Color {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = scaled - i as f64;
    let (a, b) = (VIRIDIS[i], VIRIDIS[i + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    Color::Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Heatmap whose colour range follows the frame on screen
#[derive(Debug, Clone)]
pub struct HeatmapView {
    shape: GridShape,
    frame: Option<GridFrame>,
    color_range: Option<(i32, i32)>,
}

impl HeatmapView {
    pub fn new(shape: GridShape) -> Self {
        Self {
            shape,
            frame: None,
            color_range: None,
        }
    }

    /// Show a new frame and rescale the colour range to its extremes
    pub fn update(&mut self, frame: &GridFrame) {
        self.color_range = Some(frame.min_max());
        self.frame = Some(frame.clone());
    }

    /// Values currently displayed
    #[cfg(test)]
    pub fn frame(&self) -> Option<&GridFrame> {
        self.frame.as_ref()
    }

    /// Colour range (min, max) of the displayed frame
    #[cfg(test)]
    pub fn color_range(&self) -> Option<(i32, i32)> {
        self.color_range
    }

    /// Colour for a value under the current range. A flat frame maps to the
    /// low end.
    pub fn color_of(&self, value: i32) -> Color {
        match self.color_range {
            Some((lo, hi)) if hi > lo => {
                viridis((value as f64 - lo as f64) / (hi as f64 - lo as f64))
            }
            _ => viridis(0.0),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let title = match self.color_range {
            Some((lo, hi)) => format!(" Heatmap  min {lo}  max {hi} "),
            None => " Heatmap ".to_string(),
        };
        let block = Block::bordered().title(title);
        let inner = block.inner(area);

        let Some(grid) = &self.frame else {
            let waiting = Paragraph::new("Waiting for data...".dark_gray())
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(waiting, area);
            return;
        };

        let cell_w = (inner.width as usize / self.shape.cols).max(1);
        let cell_h = (inner.height as usize / self.shape.rows).max(1);
        let label_row = cell_h / 2;

        let mut lines = Vec::with_capacity(self.shape.rows * cell_h);
        for row in grid.rows() {
            for k in 0..cell_h {
                let spans: Vec<Span> = row
                    .iter()
                    .map(|&v| {
                        let bg = self.color_of(v);
                        let text = if k == label_row {
                            let label = v.to_string();
                            if label.len() <= cell_w {
                                format!("{label:^cell_w$}")
                            } else {
                                " ".repeat(cell_w)
                            }
                        } else {
                            " ".repeat(cell_w)
                        };
                        Span::styled(text, Style::default().bg(bg).fg(label_color(bg)))
                    })
                    .collect();
                lines.push(Line::from(spans));
            }
        }

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// Dark text on bright cells, light text on dark ones
fn label_color(bg: Color) -> Color {
    match bg {
        Color::Rgb(r, g, b) => {
            let luma = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
            if luma > 128.0 {
                Color::Black
            } else {
                Color::White
            }
        }
        _ => Color::White,
    }
}
