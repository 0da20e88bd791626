// Terminal UI module using ratatui

mod app;
mod dashboard;
mod widgets;

pub use app::{Action, App, Theme};
pub use dashboard::Dashboard;
