use chrono::{Local, NaiveDate};
use crossterm::event::KeyCode;
use ratatui::style::Color;

use std::sync::Arc;

use crate::api::ApiClient;
use crate::cache::EntityCache;
use crate::gateway::{AssessmentGateway, ExerciseGateway, StudentGateway};
use crate::models::{Exercise, Student};
use crate::pages::{AssessmentsView, ExercisesPage, StudentsPage, Tab};

/// Follow-up work for the event loop after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    /// Reload every list (retry after a failure)
    Refetch,
    /// The selected student changed; rescope the assessments
    SelectionChanged,
    ToggleTheme,
}

/// Colors for the light and dark presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub border: Color,
    pub background: Color,
}

impl Theme {
    pub fn new(dark_mode: bool) -> Self {
        if dark_mode {
            Self {
                text: Color::White,
                muted: Color::Gray,
                accent: Color::Cyan,
                border: Color::DarkGray,
                background: Color::Black,
            }
        } else {
            Self {
                text: Color::Black,
                muted: Color::DarkGray,
                accent: Color::Blue,
                border: Color::Gray,
                background: Color::White,
            }
        }
    }
}

/// Application state for the TUI dashboard
pub struct App {
    pub should_quit: bool,
    pub show_help: bool,
    /// Typing goes into the search box
    pub search_mode: bool,
    pub dark_mode: bool,
    /// Cursor row in the filtered student list
    pub cursor: usize,
    pub page: StudentsPage,
    pub exercise_page: ExercisesPage,
    pub students: EntityCache<StudentGateway>,
    pub exercises: EntityCache<ExerciseGateway>,
    pub assessments: EntityCache<AssessmentGateway>,
    pub today: NaiveDate,
}

impl App {
    pub fn new(api: &Arc<ApiClient>, dark_mode: bool) -> Self {
        Self {
            should_quit: false,
            show_help: false,
            search_mode: false,
            dark_mode,
            cursor: 0,
            page: StudentsPage::new(),
            exercise_page: ExercisesPage::new(),
            students: EntityCache::unscoped(StudentGateway::new(api.clone())),
            exercises: EntityCache::unscoped(ExerciseGateway::new(api.clone())),
            assessments: EntityCache::for_student(AssessmentGateway::new(api.clone()), ""),
            today: Local::now().date_naive(),
        }
    }

    pub fn theme(&self) -> Theme {
        Theme::new(self.dark_mode)
    }

    pub fn visible_students(&self) -> Vec<&Student> {
        self.page.filtered(self.students.items())
    }

    pub fn selected_student(&self) -> Option<&Student> {
        self.page.selected(self.students.items())
    }

    pub fn assessments_view(&self) -> AssessmentsView<'_> {
        AssessmentsView::new(self.assessments.items())
    }

    pub fn visible_exercises(&self) -> Vec<&Exercise> {
        self.exercise_page.filtered(self.exercises.items())
    }

    /// First error among the lists, for the banner
    pub fn error(&self) -> Option<&str> {
        self.students
            .error()
            .or_else(|| self.exercises.error())
            .or_else(|| self.assessments.error())
    }

    /// Move to the next tab that is available; the assessments tab is
    /// skipped without a selection
    pub fn next_tab(&mut self) {
        let current = self.page.active_tab();
        let start = Tab::ALL.iter().position(|t| *t == current).unwrap_or(0);

        for offset in 1..=Tab::ALL.len() {
            let tab = Tab::ALL[(start + offset) % Tab::ALL.len()];
            if self.page.set_tab(tab) {
                return;
            }
        }
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyCode) -> Action {
        if self.show_help {
            if matches!(key, KeyCode::Char('?') | KeyCode::Esc) {
                self.show_help = false;
            }
            return Action::None;
        }

        if self.search_mode {
            return self.handle_search_key(key);
        }

        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
                Action::None
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                Action::None
            }
            KeyCode::Char('/') => {
                self.search_mode = true;
                Action::None
            }
            KeyCode::Char('r') | KeyCode::Char('R') => Action::Refetch,
            KeyCode::Char('t') | KeyCode::Char('T') => Action::ToggleTheme,
            KeyCode::Tab => {
                self.next_tab();
                Action::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let last = self.visible_students().len().saturating_sub(1);
                self.cursor = (self.cursor + 1).min(last);
                Action::None
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_at_cursor(),
            _ => Action::None,
        }
    }

    fn handle_search_key(&mut self, key: KeyCode) -> Action {
        match key {
            KeyCode::Esc | KeyCode::Enter => self.search_mode = false,
            KeyCode::Backspace => {
                self.page.search.pop();
                self.cursor = 0;
            }
            KeyCode::Char(c) => {
                self.page.search.push(c);
                self.cursor = 0;
            }
            _ => {}
        }
        Action::None
    }

    fn toggle_at_cursor(&mut self) -> Action {
        let Some(id) = self.visible_students().get(self.cursor).map(|s| s.id.clone()) else {
            return Action::None;
        };
        self.page.toggle_selection(&id);
        Action::SelectionChanged
    }

    /// Keep the cursor inside the (possibly shorter) filtered list
    pub fn clamp_cursor(&mut self) {
        let len = self.visible_students().len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }
}
