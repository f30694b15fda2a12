use crate::{
    monitor::{HistoryStore, Monitor, RunOutcome, RunSnapshot, RunState},
    ui::{stat_line::split_series, state::UiState},
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    macros::*,
    prelude::*,
    style::Stylize,
    widgets::*,
};
use ratatui::macros::line;
use tui_logger::*;

pub struct DashboardWidget<'a> {
    pub ui: &'a UiState,
    pub monitor: &'a Monitor,
    pub history: &'a HistoryStore,
    pub default_duration: u32,
}

impl<'a> Widget for &mut DashboardWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let [window_rect, log_rect] = vertical![>=5, ==10].areas(area);
        let [main_rect, side_rect] = horizontal![*=1, ==46].areas(window_rect);

        let panel_style = Style::default()
            .bg(self.ui.theme.surface)
            .fg(self.ui.theme.foreground);
        TuiLoggerSmartWidget::default()
            .style_error(panel_style.fg(self.ui.theme.error))
            .style_debug(panel_style)
            .style_warn(panel_style.fg(self.ui.theme.warning))
            .style_trace(panel_style)
            .style_info(panel_style)
            .style(panel_style)
            .output_separator(':')
            .output_timestamp(Some("%H:%M:%S".to_string()))
            .output_level(Some(TuiLoggerLevelOutput::Abbreviated))
            .output_target(true)
            .output_file(true)
            .output_line(true)
            .state(&self.ui.logger_state)
            .render(log_rect, buf);

        let main_style = Style::default()
            .bg(self.ui.theme.background)
            .fg(self.ui.theme.foreground);
        Block::new().style(main_style).render(main_rect, buf);

        let snapshot = self.monitor.snapshot();
        let targets_height = (self.monitor.targets().len() as u16).max(1) + 2;
        let [targets_rect, duration_rect, gauge_rect, charts_rect] =
            vertical![==targets_height, ==3, ==3, *=1]
                .areas(main_rect.inner(Margin::new(1, 1)));

        self.render_targets(targets_rect, buf);
        self.render_duration(duration_rect, buf);
        self.render_gauge(&snapshot, gauge_rect, buf);
        self.render_charts(&snapshot, charts_rect, buf);
        self.render_history(side_rect, buf);
    }
}

impl<'a> DashboardWidget<'a> {
    fn render_targets(&self, area: Rect, buf: &mut Buffer) {
        let targets = self.monitor.targets();
        let items: Vec<ListItem> = targets
            .iter()
            .map(|t| ListItem::new(t.label.clone()))
            .collect();
        let mut state = ListState::default().with_selected(if targets.is_empty() {
            None
        } else {
            Some(self.ui.selected)
        });
        let list = List::new(items)
            .block(
                Block::bordered()
                    .title(" Target ")
                    .border_type(BorderType::Rounded),
            )
            .highlight_style(
                Style::default()
                    .fg(self.ui.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        StatefulWidget::render(list, area, buf, &mut state);
    }

    fn render_duration(&self, area: Rect, buf: &mut Buffer) {
        let entry = if self.ui.duration_input.is_empty() {
            line![
                span![format!("{} ", self.default_duration)],
                span!["(default)"].fg(self.ui.theme.primary_background)
            ]
        } else {
            line![
                span![self.ui.duration_input.clone()],
                span!["_"].fg(self.ui.theme.accent)
            ]
        };
        Paragraph::new(entry)
            .block(
                Block::bordered()
                    .title(" Duration (seconds) ")
                    .border_type(BorderType::Rounded),
            )
            .render(area, buf);
    }

    fn render_gauge(&self, snapshot: &Option<RunSnapshot>, area: Rect, buf: &mut Buffer) {
        let status = match snapshot.as_ref().map(|run| run.state) {
            Some(RunState::Running) => {
                Span::from(["◐", "◓", "◑", "◒"][self.ui.throb_step()]).fg(self.ui.theme.success)
            }
            Some(RunState::Finished(RunOutcome::Completed)) => {
                Span::from("● done").fg(self.ui.theme.success)
            }
            Some(RunState::Finished(RunOutcome::Cancelled)) => {
                Span::from("◌ cancelled").fg(self.ui.theme.warning)
            }
            Some(RunState::Finished(RunOutcome::Lost)) => {
                Span::from("○ lost").fg(self.ui.theme.error)
            }
            None => Span::from("idle").fg(self.ui.theme.primary_background),
        };
        let (ratio, label) = match snapshot {
            Some(run) => (
                run.progress(),
                format!("{}/{}s", run.elapsed(), run.duration_secs),
            ),
            None => (0.0, "-".to_string()),
        };
        Gauge::default()
            .block(
                Block::bordered()
                    .title(" Progress ")
                    .title(status)
                    .border_type(BorderType::Rounded),
            )
            .gauge_style(
                Style::default()
                    .fg(self.ui.theme.primary)
                    .bg(self.ui.theme.surface),
            )
            .ratio(ratio)
            .label(label)
            .render(area, buf);
    }

    fn render_charts(&self, snapshot: &Option<RunSnapshot>, area: Rect, buf: &mut Buffer) {
        let mut block = Block::bordered()
            .title(" Usage ")
            .border_type(BorderType::Rounded);
        if let Some(run) = snapshot {
            block = block.title(Span::from(run.label.clone()).fg(self.ui.theme.primary));
        }
        let inner = block.inner(area);
        block.render(area, buf);

        match snapshot {
            Some(run) if !run.samples.is_empty() => {
                let (cpu, ram) = split_series(self.ui, &run.samples);
                let [top, middle, _] = vertical![==1, ==1, *=1].areas(inner);
                cpu.render(top, buf);
                ram.render(middle, buf);
            }
            _ => {
                if inner.height > 0 {
                    let mid = Rect {
                        y: inner.y + inner.height / 2,
                        height: 1,
                        ..inner
                    };
                    Paragraph::new("No Samples Yet")
                        .alignment(Alignment::Center)
                        .render(mid, buf);
                }
            }
        }
    }

    fn render_history(&self, area: Rect, buf: &mut Buffer) {
        let panel_style = Style::default()
            .bg(self.ui.theme.surface)
            .fg(self.ui.theme.foreground);
        let [list_rect, hint_rect] = vertical![*=1, ==1].areas(area);
        let entries = self.history.entries();
        let items: Vec<ListItem> = entries
            .iter()
            .map(|summary| ListItem::new(summary.to_string()))
            .collect();
        let mut state = ListState::default().with_selected(self.ui.history_selected);
        let list = List::new(items)
            .block(
                Block::bordered()
                    .title(format!(" History ({}) ", entries.len()))
                    .border_type(BorderType::Rounded)
                    .style(panel_style),
            )
            .highlight_style(
                Style::default()
                    .fg(self.ui.theme.accent)
                    .add_modifier(Modifier::BOLD),
            );
        StatefulWidget::render(list, list_rect, buf, &mut state);
        Paragraph::new(" s start · x cancel · c clear · r reload · q quit")
            .fg(self.ui.theme.primary_background)
            .render(hint_rect, buf);
    }
}
