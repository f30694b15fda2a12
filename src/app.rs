use std::path::PathBuf;

use crate::{
    config::{ConfigManager, PromonConfig},
    event::{AppEvent, Event, EventHandler},
    monitor::{HistoryStore, Monitor, RunOutcome},
    ui::{DashboardWidget, UiState},
};
use color_eyre::eyre::Result;
use log::*;
use ratatui::{
    DefaultTerminal,
    buffer::Buffer,
    crossterm::event::{KeyCode, KeyEvent, KeyModifiers},
    layout::Rect,
    prelude::*,
};

pub struct App {
    pub running: bool,
    pub events: EventHandler,
    pub config: ConfigManager,
    pub monitor: Monitor,
    pub history: HistoryStore,
    pub ui_state: UiState,
}

impl App {
    pub fn new(config_path: PathBuf) -> Result<Self> {
        let events = EventHandler::new();
        let sender1 = events.clone_sender();
        let sender2 = events.clone_sender();
        let config = ConfigManager::new(config_path, sender1)?;
        let mut monitor = Monitor::new(sender2);
        let mut ui_state = UiState::default();
        let current = config.current();
        ui_state.duration_input = current.default_duration.to_string();
        monitor.set_targets(current.targets);
        Ok(Self {
            running: true,
            events,
            config,
            monitor,
            history: HistoryStore::default(),
            ui_state,
        })
    }

    /// Run the application's main loop.
    pub async fn run(&mut self, mut terminal: DefaultTerminal) -> Result<()> {
        info!(target: "App", "{} targets configured", self.monitor.targets().len());
        while self.running {
            terminal.draw(|frame| self.render(frame.area(), frame.buffer_mut()))?;
            match self.events.next().await? {
                Event::Tick => self.tick(),
                Event::Crossterm(event) => match event {
                    crossterm::event::Event::Key(key_event)
                        if key_event.kind == crossterm::event::KeyEventKind::Press =>
                    {
                        self.handle_key_events(key_event)?
                    }
                    _ => {}
                },
                Event::App(app_event) => self.apply(app_event),
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    pub fn handle_key_events(&mut self, key_event: KeyEvent) -> Result<()> {
        match key_event.code {
            KeyCode::Esc | KeyCode::Char('q') => self.events.send(AppEvent::Quit),
            KeyCode::Char('c' | 'C') if key_event.modifiers == KeyModifiers::CONTROL => {
                self.events.send(AppEvent::Quit)
            }
            KeyCode::Char('r') => self.events.send(AppEvent::Reload),
            KeyCode::Up => self.ui_state.select_prev(self.monitor.targets().len()),
            KeyCode::Down => self.ui_state.select_next(self.monitor.targets().len()),
            KeyCode::Char(digit @ '0'..='9') => self.ui_state.push_digit(digit),
            KeyCode::Backspace => self.ui_state.pop_digit(),
            KeyCode::Enter | KeyCode::Char('s') => self.events.send(AppEvent::StartRun),
            KeyCode::Char('x') => self.events.send(AppEvent::CancelRun),
            KeyCode::Char('c') => self.events.send(AppEvent::ClearHistory),
            KeyCode::PageUp => self.ui_state.history_prev(self.history.len()),
            KeyCode::PageDown => self.ui_state.history_next(self.history.len()),
            _ => {}
        }
        Ok(())
    }

    /// Apply one application event. Everything the sampling task reports
    /// lands here, on the foreground, so the UI is never touched from the
    /// background task.
    fn apply(&mut self, app_event: AppEvent) {
        match app_event {
            AppEvent::Quit => self.quit(),
            AppEvent::Reload => self.reload_config(),
            AppEvent::StartRun => self.start_run(),
            AppEvent::CancelRun => self.monitor.cancel(),
            AppEvent::ClearHistory => {
                self.history.clear();
                info!(target: "History", "History cleared");
                self.events.send(AppEvent::HistoryChanged(0));
            }
            AppEvent::SampleTick {
                elapsed,
                duration_secs,
            } => {
                debug!(target: "App", "Sample {}/{}", elapsed, duration_secs);
            }
            AppEvent::RunFinished {
                id,
                summary,
                outcome,
            } => {
                match outcome {
                    RunOutcome::Lost => {
                        warn!(target: "App", "Run {} target was closed or inaccessible; keeping the partial summary", id)
                    }
                    RunOutcome::Cancelled => info!(target: "App", "Run {} cancelled", id),
                    RunOutcome::Completed => info!(target: "App", "Run {} completed", id),
                }
                self.history.append(summary);
                self.events
                    .send(AppEvent::HistoryChanged(self.history.len()));
            }
            AppEvent::HistoryChanged(len) => self.ui_state.history_changed(len),
        }
    }

    fn start_run(&mut self) {
        let Some(target) = self.monitor.targets().get(self.ui_state.selected).cloned() else {
            error!(target: "App", "No target selected");
            return;
        };
        let duration = self
            .ui_state
            .duration_or_default(self.config.current().default_duration);
        if let Err(err) = self.monitor.start(&target.label, duration) {
            error!(target: "App", "{}", err);
        }
    }

    /// Handles the tick event of the terminal.
    fn tick(&mut self) {
        self.ui_state.tick();
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }

    fn reload_config(&mut self) {
        debug!(target: "App", "Reload!");
        match self.config.reload() {
            Ok(config) => self.apply_config(config),
            Err(e) => error!(target: "App", "{}", e),
        }
    }

    fn apply_config(&mut self, config: PromonConfig) {
        self.monitor.set_targets(config.targets);
        self.ui_state.clamp_selection(self.monitor.targets().len());
        info!(target: "App", "Config applied: {} targets", self.monitor.targets().len());
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut dashboard = DashboardWidget {
            ui: &self.ui_state,
            monitor: &self.monitor,
            history: &self.history,
            default_duration: self.config.current().default_duration,
        };
        dashboard.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::summarize;
    use uuid::Uuid;

    #[tokio::test]
    async fn run_lifecycle_flows_into_history() {
        let mut app = App::new(PathBuf::from("promon-test-missing.toml")).unwrap();
        assert!(app.history.is_empty());

        let summary = summarize("System", 5, &[]);
        app.apply(AppEvent::RunFinished {
            id: Uuid::new_v4(),
            summary,
            outcome: RunOutcome::Completed,
        });
        assert_eq!(app.history.len(), 1);
        assert_eq!(app.history.entries()[0].duration_secs, 5);

        app.apply(AppEvent::HistoryChanged(app.history.len()));
        assert_eq!(app.ui_state.history_selected, Some(0));

        app.apply(AppEvent::ClearHistory);
        assert!(app.history.is_empty());
    }

    #[tokio::test]
    async fn duration_entry_starts_prefilled_with_the_default() {
        let app = App::new(PathBuf::from("promon-test-missing.toml")).unwrap();
        assert_eq!(app.ui_state.duration_input, "30");
    }
}
