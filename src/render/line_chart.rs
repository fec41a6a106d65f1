//! Rolling single-channel line chart

use crate::buffer::RollingBuffer;
use ratatui::prelude::*;
use ratatui::symbols;
use ratatui::widgets::{Axis, Block, Chart, Dataset, GraphType};

/// Line chart over a fixed vertical range. The y-axis never rescales;
/// readings outside the range are clipped by the chart.
#[derive(Debug, Clone)]
pub struct LineChartView {
    points: Vec<(f64, f64)>,
    x_max: f64,
    y_bounds: [f64; 2],
}

impl LineChartView {
    pub fn new(capacity: usize, y_range: (f64, f64)) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            x_max: capacity.saturating_sub(1).max(1) as f64,
            y_bounds: [y_range.0, y_range.1],
        }
    }

    /// Replace the series with the current window contents
    pub fn update(&mut self, history: &RollingBuffer<u32>) {
        self.points = history.points();
    }

    #[cfg(test)]
    pub fn y_bounds(&self) -> [f64; 2] {
        self.y_bounds
    }

    #[cfg(test)]
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Most recent reading
    pub fn latest(&self) -> Option<f64> {
        self.points.last().map(|&(_, y)| y)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, title: &str) {
        let [y_lo, y_hi] = self.y_bounds;
        let y_mid = (y_lo + y_hi) / 2.0;

        let dataset = Dataset::default()
            .name(match self.latest() {
                Some(v) => format!("{v:.0}"),
                None => "-".to_string(),
            })
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&self.points);

        let chart = Chart::new(vec![dataset])
            .block(Block::bordered().title(title.to_string()))
            .x_axis(
                Axis::default()
                    .title("sample".dark_gray())
                    .bounds([0.0, self.x_max])
                    .labels(vec![
                        Line::from("0"),
                        Line::from(format!("{}", self.x_max as usize)),
                    ]),
            )
            .y_axis(
                Axis::default()
                    .title("value".dark_gray())
                    .bounds(self.y_bounds)
                    .labels(vec![
                        Line::from(format!("{y_lo:.0}")),
                        Line::from(format!("{y_mid:.0}")),
                        Line::from(format!("{y_hi:.0}")),
                    ]),
            );

        frame.render_widget(chart, area);
    }
}
