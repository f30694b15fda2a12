pub mod dashboard;
pub mod stat_line;
pub mod state;
pub mod theme;

pub use dashboard::DashboardWidget;
pub use state::UiState;
