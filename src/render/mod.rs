//! Terminal views for the two sensor modes

pub mod heatmap;
pub mod line_chart;
pub mod surface;

pub use heatmap::HeatmapView;
pub use line_chart::LineChartView;
pub use surface::SurfaceView;

use crate::buffer::RollingBuffer;
use crate::config::{GridProfile, ScalarProfile};
use crate::ingest::StatsSnapshot;
use crate::protocol::GridFrame;
use crate::queue::FrameReceiver;
use chrono::{DateTime, Local};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Scalar mode display state
#[derive(Debug, Clone)]
pub struct ScalarRenderContext {
    source: String,
    chart: LineChartView,
    last_frame_at: Option<DateTime<Local>>,
}

impl ScalarRenderContext {
    /// Start from the initial window contents
    pub fn new(profile: &ScalarProfile, history: &RollingBuffer<u32>) -> Self {
        let mut chart = LineChartView::new(profile.history_len, profile.y_range);
        chart.update(history);
        Self {
            source: profile.port_path.to_string(),
            chart,
            last_frame_at: None,
        }
    }

    /// Pick up the window after a new reading
    pub fn update(&mut self, history: &RollingBuffer<u32>) {
        self.chart.update(history);
        self.last_frame_at = Some(Local::now());
    }

    #[cfg(test)]
    pub fn chart(&self) -> &LineChartView {
        &self.chart
    }

    pub fn draw(&self, frame: &mut Frame, stats: &StatsSnapshot) {
        let [main, status] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(frame.area());
        self.chart
            .render(frame, main, &format!(" Sensor {} ", self.source));
        render_status(frame, status, &self.source, stats, self.last_frame_at);
    }
}

/// Grid mode display state: heatmap and surface always show the same frame
#[derive(Debug, Clone)]
pub struct GridRenderContext {
    source: String,
    heatmap: HeatmapView,
    surface: SurfaceView,
    frames_rendered: u64,
    frames_skipped: u64,
    last_frame_at: Option<DateTime<Local>>,
}

impl GridRenderContext {
    pub fn new(profile: &GridProfile) -> Self {
        Self {
            source: profile.port_path.to_string(),
            heatmap: HeatmapView::new(profile.shape),
            surface: SurfaceView::new(profile.shape, profile.z_range),
            frames_rendered: 0,
            frames_skipped: 0,
            last_frame_at: None,
        }
    }

    /// Drain the queue and show only the newest frame. Returns whether
    /// anything changed.
    pub fn consume(&mut self, queue: &FrameReceiver<GridFrame>) -> bool {
        let Some(drained) = queue.drain_latest() else {
            return false;
        };
        if drained.count > 1 {
            log::trace!("coalesced {} frames", drained.count);
        }
        self.frames_skipped += drained.count as u64 - 1;
        self.show(&drained.latest);
        true
    }

    /// Update both views from one frame
    pub fn show(&mut self, frame: &GridFrame) {
        self.heatmap.update(frame);
        self.surface.update(frame);
        self.frames_rendered += 1;
        self.last_frame_at = Some(Local::now());
    }

    #[cfg(test)]
    pub fn heatmap(&self) -> &HeatmapView {
        &self.heatmap
    }

    #[cfg(test)]
    pub fn surface(&self) -> &SurfaceView {
        &self.surface
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Frames drained without ever being shown
    pub fn frames_skipped(&self) -> u64 {
        self.frames_skipped
    }

    pub fn draw(&self, frame: &mut Frame, stats: &StatsSnapshot) {
        let [main, status] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(frame.area());
        let [left, right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(main);

        self.heatmap.render(frame, left);
        self.surface.render(frame, right);
        render_status(frame, status, &self.source, stats, self.last_frame_at);
    }
}

fn render_status(
    frame: &mut Frame,
    area: Rect,
    source: &str,
    stats: &StatsSnapshot,
    last_frame_at: Option<DateTime<Local>>,
) {
    let last = match last_frame_at {
        Some(at) => at.format("%H:%M:%S%.3f").to_string(),
        None => "never".to_string(),
    };
    let dropped_color = if stats.dropped() > 0 {
        Color::Yellow
    } else {
        Color::Green
    };

    let line = Line::from(vec![
        Span::styled(format!(" {source} "), Modifier::BOLD),
        " frames ".dark_gray(),
        Span::raw(stats.frames.to_string()),
        " dropped ".dark_gray(),
        Span::styled(stats.dropped().to_string(), dropped_color),
        " last ".dark_gray(),
        Span::raw(last),
        "  q quit".dark_gray(),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
