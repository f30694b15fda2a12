use std::fmt::Debug;

use crate::{event::TICK_FPS, ui::theme::Theme};
use tui_logger::*;

/// Everything the dashboard needs to draw that is not owned by the core:
/// picker selection, the duration entry, history selection, and the
/// animation tick.
pub struct UiState {
    pub logger_state: TuiWidgetState,
    pub theme: Theme,
    pub selected: usize,
    pub duration_input: String,
    pub history_selected: Option<usize>,
    tick: f64,
}

impl Debug for UiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiState")
            .field("selected", &self.selected)
            .field("duration_input", &self.duration_input)
            .field("history_selected", &self.history_selected)
            .field("tick", &self.tick)
            .finish()
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            logger_state: TuiWidgetState::new(),
            theme: Theme::dark(),
            selected: 0,
            duration_input: String::new(),
            history_selected: None,
            tick: 0.0,
        }
    }
}

impl UiState {
    pub fn tick(&mut self) {
        self.tick += 1.0;
        if self.tick >= TICK_FPS {
            self.tick = 0.0;
        }
    }

    /// 4-phase spinner step, one full cycle per second.
    pub fn throb_step(&self) -> usize {
        (self.tick * 4.0 / TICK_FPS) as usize % 4
    }

    pub fn select_next(&mut self, count: usize) {
        if count > 0 {
            self.selected = (self.selected + 1) % count;
        }
    }

    pub fn select_prev(&mut self, count: usize) {
        if count > 0 {
            self.selected = (self.selected + count - 1) % count;
        }
    }

    pub fn clamp_selection(&mut self, count: usize) {
        if count == 0 {
            self.selected = 0;
        } else if self.selected >= count {
            self.selected = count - 1;
        }
    }

    pub fn push_digit(&mut self, digit: char) {
        if digit.is_ascii_digit() && self.duration_input.len() < 5 {
            self.duration_input.push(digit);
        }
    }

    pub fn pop_digit(&mut self) {
        self.duration_input.pop();
    }

    /// The entered duration, or `default` when the entry is blank or not a
    /// positive integer.
    pub fn duration_or_default(&self, default: u32) -> u32 {
        self.duration_input
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|d| *d > 0)
            .unwrap_or(default)
    }

    pub fn history_changed(&mut self, len: usize) {
        self.history_selected = len.checked_sub(1);
    }

    pub fn history_prev(&mut self, len: usize) {
        if len > 0 {
            self.history_selected = Some(match self.history_selected {
                Some(i) => i.saturating_sub(1),
                None => len - 1,
            });
        }
    }

    pub fn history_next(&mut self, len: usize) {
        if len > 0 {
            self.history_selected = Some(match self.history_selected {
                Some(i) => (i + 1).min(len - 1),
                None => len - 1,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUTS_AND_DURATIONS: [(&str, u32); 6] = [
        ("", 30),
        ("45", 45),
        ("0", 30),
        ("007", 7),
        ("  12  ", 12),
        ("abc", 30),
    ];

    #[test]
    fn duration_entry_falls_back_to_the_default() {
        for (input, expected) in INPUTS_AND_DURATIONS {
            let state = UiState {
                duration_input: input.to_string(),
                ..UiState::default()
            };
            assert_eq!(
                state.duration_or_default(30),
                expected,
                "input {input:?} should give {expected}"
            );
        }
    }

    #[test]
    fn digit_entry_only_accepts_digits() {
        let mut state = UiState::default();
        state.push_digit('1');
        state.push_digit('x');
        state.push_digit('5');
        assert_eq!(state.duration_input, "15");
        state.pop_digit();
        assert_eq!(state.duration_input, "1");
    }

    #[test]
    fn selection_wraps_both_ways() {
        let mut state = UiState::default();
        state.select_prev(3);
        assert_eq!(state.selected, 2);
        state.select_next(3);
        assert_eq!(state.selected, 0);
        state.select_next(0);
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn history_selection_follows_changes() {
        let mut state = UiState::default();
        state.history_changed(3);
        assert_eq!(state.history_selected, Some(2));
        state.history_prev(3);
        assert_eq!(state.history_selected, Some(1));
        state.history_next(3);
        assert_eq!(state.history_selected, Some(2));
        state.history_changed(0);
        assert_eq!(state.history_selected, None);
    }

    #[test]
    fn throb_cycles_within_a_second() {
        let mut state = UiState::default();
        let mut steps = Vec::new();
        for _ in 0..(TICK_FPS as usize) {
            steps.push(state.throb_step());
            state.tick();
        }
        assert_eq!(steps.first(), Some(&0));
        assert!(steps.iter().all(|s| *s < 4));
        assert!(steps.contains(&3));
    }
}
