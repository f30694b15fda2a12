use crate::{monitor::Sample, ui::state::UiState};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    macros::*,
    prelude::*,
    style::Stylize,
    widgets::*,
};
use ratatui::macros::line;

/// One metric of the active run rendered as `sparkline  name:  value unit`.
/// Samples arrive on a fixed one-second grid, so the sparkline consumes the
/// newest values directly, one column per tick.
#[derive(Debug)]
pub struct StatLine<'a> {
    name: &'static str,
    unit: &'static str,
    values: Vec<f32>,
    ui: &'a UiState,
}

pub fn split_series<'a>(ui: &'a UiState, samples: &[Sample]) -> (StatLine<'a>, StatLine<'a>) {
    let cpu = StatLine {
        name: "CPU",
        unit: "%",
        values: samples.iter().map(|s| s.cpu_percent).collect(),
        ui,
    };
    let ram = StatLine {
        name: "RAM",
        unit: "MB",
        values: samples.iter().map(|s| s.memory_mb).collect(),
        ui,
    };
    (cpu, ram)
}

impl<'a> Widget for &StatLine<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [_, history, _, label, current, _] =
            horizontal![==1, *=1, ==1, ==6, ==9, ==2].areas(area);
        Text::from(format!("{}:", self.name)).render(label, buf);
        line![
            span![format!("{:.1}", self.values.last().unwrap_or(&0.0))],
            span![format!("{:<2}", self.unit)].fg(self.ui.theme.primary_background)
        ]
        .alignment(Alignment::Right)
        .render(current, buf);
        let window = self.values.len().saturating_sub(history.width as usize);
        let data: Vec<u64> = self.values[window..]
            .iter()
            .map(|v| v.trunc() as u64)
            .collect();
        let max = self.values.iter().copied().fold(0.0f32, f32::max);
        Sparkline::default()
            .data(data.iter().copied())
            .max(((max * 1.1) as u64).max(1))
            .fg(self.ui.theme.primary)
            .render(history, buf);
    }
}
