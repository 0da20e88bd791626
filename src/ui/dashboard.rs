use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Frame, Terminal,
};
use std::io;
use std::sync::Arc;

use super::app::{Action, App};
use super::widgets;
use crate::api::ApiClient;
use crate::config::Config;
use crate::pages::{StudentsPage, Tab};

/// Dashboard manages the TUI lifecycle
pub struct Dashboard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    api: Arc<ApiClient>,
    app: App,
}

impl Dashboard {
    pub async fn new(api: Arc<ApiClient>) -> Result<Self> {
        let dark_mode = api.config().await.ui.dark_mode;
        let app = App::new(&api, dark_mode);

        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .context("Failed to setup terminal")?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).context("Failed to create terminal")?;

        Ok(Self { terminal, api, app })
    }

    /// Run the dashboard event loop
    pub async fn run(&mut self) -> Result<()> {
        self.draw()?;
        self.refetch().await?;

        loop {
            self.draw()?;

            if event::poll(std::time::Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == event::KeyEventKind::Press {
                        let action = self.app.handle_key(key.code);
                        self.apply(action).await?;
                    }
                }
            }

            if self.app.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        let app = &self.app;
        self.terminal.draw(|f| ui(f, app))?;
        Ok(())
    }

    async fn apply(&mut self, action: Action) -> Result<()> {
        match action {
            Action::None => {}
            Action::Refetch => self.refetch().await?,
            Action::SelectionChanged => {
                let selected = self.app.page.selected_id().to_string();
                self.draw()?;
                // Failures land in the error banner
                let _ = self.app.assessments.set_student(&selected).await;
            }
            Action::ToggleTheme => {
                self.app.dark_mode = self.api.update_config(Config::toggle_dark_mode).await;
                tracing::debug!("Dark mode: {}", self.app.dark_mode);
            }
        }
        self.app.clamp_cursor();
        Ok(())
    }

    async fn refetch(&mut self) -> Result<()> {
        self.app.students.clear_error();
        self.app.exercises.clear_error();
        self.app.assessments.clear_error();

        let _ = self.app.students.refetch().await;
        self.draw()?;
        let _ = self.app.exercises.refetch().await;
        let _ = self.app.assessments.refetch().await;

        // A student deleted elsewhere cannot stay selected
        let selected = self.app.page.selected_id().to_string();
        if !selected.is_empty() && self.app.students.find(&selected).is_none() {
            self.app.page.on_deleted(&selected);
            let _ = self.app.assessments.set_student("").await;
        }
        Ok(())
    }

    /// Cleanup terminal on exit
    pub fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )
        .context("Failed to restore terminal")?;
        self.terminal.show_cursor().context("Failed to show cursor")?;

        Ok(())
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Render the UI
fn ui(f: &mut Frame, app: &App) {
    let size = f.area();
    let theme = app.theme();

    let banner_height = if app.error().is_some() { 3 } else { 0 };

    // Banner + main area + status bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner_height),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(size);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(main_chunks[1]);

    // Right column: student detail (top) + assessments (bottom)
    let right_panels = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(0)])
        .split(columns[1]);

    if let Some(message) = app.error() {
        widgets::render_error_banner(main_chunks[0], f.buffer_mut(), message);
    }

    widgets::render_students(
        columns[0],
        f.buffer_mut(),
        &app.visible_students(),
        app.cursor,
        app.page.selected_id(),
        app.students.is_loading(),
        &theme,
    );

    widgets::render_student_detail(
        right_panels[0],
        f.buffer_mut(),
        app.selected_student(),
        app.today,
        &theme,
    );

    match app.page.active_tab() {
        Tab::Dashboard => widgets::render_overview(
            right_panels[1],
            f.buffer_mut(),
            app.students.len(),
            StudentsPage::plan_counts(app.students.items()),
            &theme,
        ),
        Tab::Exercises => widgets::render_exercises(
            right_panels[1],
            f.buffer_mut(),
            &app.visible_exercises(),
            app.exercises.is_loading(),
            &theme,
        ),
        Tab::Assessments => widgets::render_assessments(
            right_panels[1],
            f.buffer_mut(),
            &app.assessments_view(),
            app.assessments.is_loading(),
            &theme,
        ),
    }

    widgets::render_status_bar(
        main_chunks[2],
        f.buffer_mut(),
        app.page.active_tab(),
        &app.page.search,
        app.search_mode,
        app.dark_mode,
    );

    if app.show_help {
        let help_area = centered_rect(60, 70, size);
        widgets::render_help_overlay(help_area, f.buffer_mut(), &theme);
    }
}

/// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
