use chrono::NaiveDate;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Sparkline, Widget, Wrap},
};

use super::app::Theme;
use crate::metrics::{format_brl, format_date, format_delta};
use crate::models::{Exercise, Plan, Student};
use crate::pages::{AssessmentsView, PlanCounts, Tab};

fn panel<'a>(title: &'a str, theme: &Theme, is_selected: bool) -> Block<'a> {
    let border_style = if is_selected {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.border)
    };

    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style)
        .style(Style::default().bg(theme.background))
}

fn field<'a>(label: &'a str, value: String, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(label, Style::default().fg(theme.muted)),
        Span::styled(
            value,
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ),
    ])
}

/// Retry-capable error banner
pub fn render_error_banner(area: Rect, buf: &mut Buffer, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" ⚠ Error ")
        .border_style(Style::default().fg(Color::Red));

    let inner = block.inner(area);
    block.render(area, buf);

    let line = Line::from(vec![
        Span::styled(message.to_string(), Style::default().fg(Color::Red)),
        Span::styled("  (press R to retry)", Style::default().fg(Color::DarkGray)),
    ]);
    Paragraph::new(line).render(inner, buf);
}

/// Render the student list
pub fn render_students(
    area: Rect,
    buf: &mut Buffer,
    students: &[&Student],
    cursor: usize,
    selected_id: &str,
    loading: bool,
    theme: &Theme,
) {
    let title = if loading {
        format!(" 👥 Students ({}) ⏳ ", students.len())
    } else {
        format!(" 👥 Students ({}) ", students.len())
    };
    let block = panel(&title, theme, true);

    let inner = block.inner(area);
    block.render(area, buf);

    if students.is_empty() {
        let text = if loading {
            "Loading..."
        } else {
            "No students found."
        };
        Paragraph::new(text)
            .style(Style::default().fg(theme.muted))
            .render(inner, buf);
        return;
    }

    let items: Vec<ListItem> = students
        .iter()
        .enumerate()
        .map(|(idx, student)| {
            let marker = if student.id == selected_id { "●" } else { " " };

            let mut style = Style::default().fg(theme.text);
            if student.id == selected_id {
                style = style.fg(theme.accent).add_modifier(Modifier::BOLD);
            }
            if idx == cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }

            let content = format!(
                "{} {:<24} {:<8} {}",
                marker,
                truncate(&student.name, 24),
                student.plan.label(),
                student.email
            );
            ListItem::new(Line::from(Span::styled(content, style)))
        })
        .collect();

    List::new(items).render(inner, buf);
}

/// Render the selected student's profile
pub fn render_student_detail(
    area: Rect,
    buf: &mut Buffer,
    student: Option<&Student>,
    today: NaiveDate,
    theme: &Theme,
) {
    let block = panel(" 🧍 Student ", theme, false);
    let inner = block.inner(area);
    block.render(area, buf);

    let Some(student) = student else {
        Paragraph::new("Select a student with Enter")
            .style(Style::default().fg(theme.muted))
            .render(inner, buf);
        return;
    };

    let bmi = match (student.bmi(), student.bmi_category()) {
        (Some(bmi), Some(category)) => format!("{:.1} ({})", bmi, category),
        _ => "-".to_string(),
    };
    let fee = student
        .monthly_fee
        .map(format_brl)
        .unwrap_or_else(|| "-".to_string());

    let lines = vec![
        Line::from(Span::styled(
            student.name.clone(),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )),
        field("Age: ", format!("{} years", student.age_on(today)), theme),
        field(
            "Height / Weight: ",
            format!("{:.0} cm / {:.1} kg", student.height, student.weight),
            theme,
        ),
        field("BMI: ", bmi, theme),
        field("Plan: ", student.plan.label().to_string(), theme),
        field("Monthly fee: ", fee, theme),
        field("Goal: ", student.goal.clone(), theme),
    ];

    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .render(inner, buf);
}

/// Render latest assessment, progress and the weight trend
pub fn render_assessments(
    area: Rect,
    buf: &mut Buffer,
    view: &AssessmentsView<'_>,
    loading: bool,
    theme: &Theme,
) {
    let title = if loading {
        " 📏 Assessments ⏳ "
    } else {
        " 📏 Assessments "
    };
    let block = panel(title, theme, false);
    let inner = block.inner(area);
    block.render(area, buf);

    let Some(latest) = view.latest() else {
        Paragraph::new("No assessments yet.")
            .style(Style::default().fg(theme.muted))
            .render(inner, buf);
        return;
    };

    let mut lines = vec![
        field("Latest: ", format_date(latest.date), theme),
        field(
            "Weight / Body fat / Muscle: ",
            format!(
                "{:.1} kg / {:.1}% / {:.1} kg",
                latest.weight, latest.body_fat, latest.muscle_mass
            ),
            theme,
        ),
    ];

    if let Some(delta) = view.progress() {
        lines.push(Line::from(vec![
            Span::styled("Progress: ", Style::default().fg(theme.muted)),
            delta_span(delta.weight, " kg", true),
            Span::raw("  "),
            delta_span(delta.body_fat, "%", true),
            Span::raw("  "),
            delta_span(delta.muscle_mass, " kg muscle", false),
        ]));
    }

    let text_height = lines.len() as u16 + 1;
    Paragraph::new(lines).render(
        Rect {
            height: text_height.min(inner.height),
            ..inner
        },
        buf,
    );

    // Weight trend, oldest to newest
    if inner.height > text_height {
        let data: Vec<u64> = view
            .chart_series()
            .iter()
            .map(|point| (point.weight * 10.0).round().max(0.0) as u64)
            .collect();

        let chart_area = Rect {
            y: inner.y + text_height,
            height: inner.height - text_height,
            ..inner
        };
        Sparkline::default()
            .data(&data)
            .bar_set(symbols::bar::NINE_LEVELS)
            .style(Style::default().fg(theme.accent))
            .render(chart_area, buf);
    }
}

/// Student totals per plan
pub fn render_overview(
    area: Rect,
    buf: &mut Buffer,
    total: usize,
    counts: PlanCounts,
    theme: &Theme,
) {
    let block = panel(" 📊 Overview ", theme, false);
    let inner = block.inner(area);
    block.render(area, buf);

    let mut lines = vec![field("Students: ", total.to_string(), theme), Line::from("")];
    for plan in Plan::ALL {
        lines.push(field(
            plan.label(),
            format!(": {}", counts.get(plan)),
            theme,
        ));
    }

    Paragraph::new(lines).render(inner, buf);
}

/// Exercise library
pub fn render_exercises(
    area: Rect,
    buf: &mut Buffer,
    exercises: &[&Exercise],
    loading: bool,
    theme: &Theme,
) {
    let title = if loading {
        format!(" 🏋 Exercises ({}) ⏳ ", exercises.len())
    } else {
        format!(" 🏋 Exercises ({}) ", exercises.len())
    };
    let block = panel(&title, theme, false);
    let inner = block.inner(area);
    block.render(area, buf);

    if exercises.is_empty() {
        Paragraph::new("No exercises found.")
            .style(Style::default().fg(theme.muted))
            .render(inner, buf);
        return;
    }

    let with_video = exercises.iter().filter(|e| e.has_video()).count();

    let mut items: Vec<ListItem> = exercises
        .iter()
        .map(|exercise| {
            let video = if exercise.has_video() { "▶" } else { " " };
            ListItem::new(Line::from(Span::styled(
                format!(
                    "{} {:<24} {:<12} {}",
                    video,
                    truncate(&exercise.name, 24),
                    truncate(&exercise.muscle_group, 12),
                    exercise.difficulty
                ),
                Style::default().fg(theme.text),
            )))
        })
        .collect();
    items.push(ListItem::new(Line::from(Span::styled(
        format!("{} with video", with_video),
        Style::default().fg(theme.muted),
    ))));

    List::new(items).render(inner, buf);
}

/// Losing weight or fat is shown green, gaining muscle likewise
fn delta_span(value: f64, unit: &str, lower_is_better: bool) -> Span<'static> {
    let improved = if lower_is_better { value < 0.0 } else { value > 0.0 };
    let color = if value == 0.0 {
        Color::Gray
    } else if improved {
        Color::Green
    } else {
        Color::Red
    };
    Span::styled(format_delta(value, unit), Style::default().fg(color))
}

/// Render help overlay
pub fn render_help_overlay(area: Rect, buf: &mut Buffer, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" ❓ Help ")
        .border_style(Style::default().fg(theme.accent))
        .style(Style::default().bg(theme.background));

    let inner = block.inner(area);
    block.render(area, buf);

    let heading = Style::default().fg(theme.accent);
    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Students:", heading)),
        Line::from("  ↑/k ↓/j  - Move"),
        Line::from("  Enter    - Select / deselect"),
        Line::from("  /        - Search by name or email"),
        Line::from("  Tab      - Overview / exercises / assessments"),
        Line::from(""),
        Line::from(Span::styled("Other:", heading)),
        Line::from("  R        - Reload"),
        Line::from("  T        - Toggle dark mode"),
        Line::from("  ?        - Toggle this help"),
        Line::from("  q        - Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Press ? or ESC to close",
            Style::default().fg(theme.muted),
        )),
    ];

    Paragraph::new(help_text)
        .style(Style::default().fg(theme.text))
        .render(inner, buf);
}

/// Render status bar at bottom
pub fn render_status_bar(
    area: Rect,
    buf: &mut Buffer,
    tab: Tab,
    search: &str,
    search_mode: bool,
    dark_mode: bool,
) {
    let tab_span = Span::styled(
        format!(" {} ", tab.title()),
        Style::default().fg(Color::Black).bg(Color::Cyan),
    );

    let search_span = if search_mode {
        Span::styled(
            format!(" 🔍 {}▏", search),
            Style::default().fg(Color::Yellow).bg(Color::DarkGray),
        )
    } else if !search.is_empty() {
        Span::styled(
            format!(" 🔍 {} ", search),
            Style::default().fg(Color::White).bg(Color::DarkGray),
        )
    } else {
        Span::styled(" / to search ", Style::default().fg(Color::Gray).bg(Color::DarkGray))
    };

    let theme_span = Span::styled(
        if dark_mode { " 🌙 Dark " } else { " ☀ Light " },
        Style::default().fg(Color::Gray).bg(Color::DarkGray),
    );

    let help_hint = Span::styled(
        " Press ? for help ",
        Style::default().fg(Color::Gray).bg(Color::DarkGray),
    );

    Paragraph::new(Line::from(vec![tab_span, search_span, theme_span, help_hint])).render(area, buf);
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
