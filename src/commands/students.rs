use anyhow::{Context as _, Result};
use chrono::Local;
use clap::Subcommand;
use colored::Colorize;

use super::prompt;
use super::Context;
use crate::cache::EntityCache;
use crate::forms::{FormController, StudentForm};
use crate::gateway::{AssessmentGateway, Repository, StudentGateway};
use crate::metrics::{format_brl, format_delta};
use crate::models::{Plan, Student};
use crate::pages::{AssessmentsView, StudentsPage};

#[derive(Subcommand)]
pub enum StudentSubcommands {
    /// List students, newest first
    List {
        /// Filter by name or email
        #[arg(short, long)]
        search: Option<String>,

        /// Only students on this plan (basic, premium, vip)
        #[arg(long)]
        plan: Option<Plan>,
    },

    /// Show a student's profile and latest progress
    Show {
        /// Student ID
        id: String,
    },

    /// Add a student (prompts for each field unless --set is given)
    Add {
        /// Set a field without prompting, e.g. --set name="Ana Souza"
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
    },

    /// Edit a student
    Edit {
        /// Student ID
        id: String,

        /// Set a field without prompting
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
    },

    /// Delete a student
    Delete {
        /// Student ID
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

impl StudentSubcommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            StudentSubcommands::List { search, plan } => list_students(ctx, search, plan).await,
            StudentSubcommands::Show { id } => show_student(ctx, &id).await,
            StudentSubcommands::Add { set } => add_student(ctx, &set).await,
            StudentSubcommands::Edit { id, set } => edit_student(ctx, &id, &set).await,
            StudentSubcommands::Delete { id, force } => delete_student(ctx, &id, force).await,
        }
    }
}

pub async fn list_students(ctx: &Context, search: Option<String>, plan: Option<Plan>) -> Result<()> {
    let client = ctx.connect()?;
    let mut students = EntityCache::unscoped(StudentGateway::new(client));

    let spinner = prompt::spinner("Loading students...");
    let loaded = students.fetch().await;
    spinner.finish_and_clear();
    loaded.context("Failed to load students")?;

    let mut page = StudentsPage::new();
    page.search = search.unwrap_or_default();

    let rows: Vec<&Student> = page
        .filtered(students.items())
        .into_iter()
        .filter(|s| plan.map_or(true, |p| s.plan == p))
        .collect();

    println!("{}", "Students".bold());
    println!();

    if rows.is_empty() {
        println!("No students found.");
        return Ok(());
    }

    let today = Local::now().date_naive();
    for student in &rows {
        println!(
            "  {}  {:<28} {:>3}y  {:<8} {}",
            student.id.dimmed(),
            student.name,
            student.age_on(today),
            student.plan.label(),
            student.email
        );
    }

    let counts = StudentsPage::plan_counts(students.items());
    println!();
    println!(
        "{} students · Basic {} · Premium {} · VIP {}",
        students.len(),
        counts.basic,
        counts.premium,
        counts.vip
    );

    Ok(())
}

pub async fn show_student(ctx: &Context, id: &str) -> Result<()> {
    let client = ctx.connect()?;
    let date_format = client.config().await.ui.date_format;
    let gateway = StudentGateway::new(client.clone());

    let student = gateway
        .get(id)
        .await?
        .with_context(|| format!("Student {} not found", id))?;

    let mut assessments = EntityCache::for_student(AssessmentGateway::new(client), &student.id);
    assessments.fetch().await.context("Failed to load assessments")?;

    let today = Local::now().date_naive();
    println!("{}", student.name.bold());
    println!("  Email:        {}", student.email);
    println!("  Phone:        {}", student.phone);
    println!(
        "  Born:         {} ({} years)",
        student.birth_date.format(&date_format),
        student.age_on(today)
    );
    println!("  Height:       {:.0} cm", student.height);
    println!("  Weight:       {:.1} kg", student.weight);
    if let (Some(bmi), Some(category)) = (student.bmi(), student.bmi_category()) {
        println!("  BMI:          {:.1} ({})", bmi, category);
    }
    println!("  Goal:         {}", student.goal);
    println!("  Plan:         {}", student.plan.label());
    if let Some(service) = &student.service_type {
        println!("  Service:      {}", service);
    }
    if let Some(fee) = student.monthly_fee {
        println!("  Monthly fee:  {}", format_brl(fee));
    }
    println!(
        "  Portal:       {}",
        if student.portal_access { "enabled" } else { "disabled" }
    );

    let view = AssessmentsView::new(assessments.items());
    if let Some(latest) = view.latest() {
        println!();
        println!("{}", "Latest assessment".bold());
        println!(
            "  {}: {:.1} kg, {:.1}% body fat, {:.1} kg muscle",
            latest.date.format(&date_format),
            latest.weight,
            latest.body_fat,
            latest.muscle_mass
        );
    }
    if let Some(delta) = view.progress() {
        println!(
            "  Progress: {} · {} · {} muscle",
            format_delta(delta.weight, " kg"),
            format_delta(delta.body_fat, "%"),
            format_delta(delta.muscle_mass, " kg")
        );
    }

    Ok(())
}

pub async fn add_student(ctx: &Context, set: &[String]) -> Result<()> {
    let assignments = prompt::parse_assignments(set)?;
    let client = ctx.connect()?;
    let mut students = EntityCache::unscoped(StudentGateway::new(client));

    let mut form = FormController::<StudentForm>::new();
    form.open_new();
    prompt::fill_form(&mut form, &assignments)?;

    let student = form
        .submit(&mut students)
        .await
        .context("Failed to create student")?;

    prompt::success(&format!("Added {} ({})", student.name, student.id));
    Ok(())
}

pub async fn edit_student(ctx: &Context, id: &str, set: &[String]) -> Result<()> {
    let assignments = prompt::parse_assignments(set)?;
    let client = ctx.connect()?;
    let mut students = EntityCache::unscoped(StudentGateway::new(client));

    let current = students
        .repository()
        .get(id)
        .await?
        .with_context(|| format!("Student {} not found", id))?;

    let mut form = FormController::<StudentForm>::new();
    form.open_edit(&current);
    prompt::fill_form(&mut form, &assignments)?;

    let student = form
        .submit(&mut students)
        .await
        .context("Failed to update student")?;

    prompt::success(&format!("Updated {}", student.name));
    Ok(())
}

pub async fn delete_student(ctx: &Context, id: &str, force: bool) -> Result<()> {
    let client = ctx.connect()?;
    let mut students = EntityCache::unscoped(StudentGateway::new(client));

    if !prompt::confirm(&format!("Delete student {}? This cannot be undone", id), force)? {
        println!("Cancelled.");
        return Ok(());
    }

    students
        .delete(id)
        .await
        .context("Failed to delete student")?;

    prompt::success(&format!("Deleted student {}", id));
    Ok(())
}
