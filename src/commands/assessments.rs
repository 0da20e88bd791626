use anyhow::{Context as _, Result};
use clap::Subcommand;
use colored::Colorize;

use super::prompt;
use super::Context;
use crate::cache::EntityCache;
use crate::forms::{AssessmentForm, FormController};
use crate::gateway::{AssessmentGateway, Repository};
use crate::metrics::format_delta;
use crate::pages::AssessmentsView;

#[derive(Subcommand)]
pub enum AssessmentSubcommands {
    /// List a student's assessments, most recent first
    List {
        /// Student ID
        #[arg(short, long)]
        student: String,
    },

    /// Record an assessment (dated today unless --set date=... is given)
    Add {
        /// Student ID
        #[arg(short, long)]
        student: String,

        /// Set a field without prompting, e.g. --set body_fat=24.5
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
    },

    /// Edit an assessment
    Edit {
        /// Assessment ID
        id: String,

        /// Set a field without prompting
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
    },

    /// Delete an assessment
    Delete {
        /// Assessment ID
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Change between the two most recent assessments
    Progress {
        /// Student ID
        #[arg(short, long)]
        student: String,
    },
}

impl AssessmentSubcommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            AssessmentSubcommands::List { student } => list_assessments(ctx, &student).await,
            AssessmentSubcommands::Add { student, set } => add_assessment(ctx, &student, &set).await,
            AssessmentSubcommands::Edit { id, set } => edit_assessment(ctx, &id, &set).await,
            AssessmentSubcommands::Delete { id, force } => delete_assessment(ctx, &id, force).await,
            AssessmentSubcommands::Progress { student } => show_progress(ctx, &student).await,
        }
    }
}

async fn load(ctx: &Context, student_id: &str) -> Result<(EntityCache<AssessmentGateway>, String)> {
    let client = ctx.connect()?;
    let date_format = client.config().await.ui.date_format;
    let mut assessments = EntityCache::for_student(AssessmentGateway::new(client), student_id);

    let spinner = prompt::spinner("Loading assessments...");
    let loaded = assessments.fetch().await;
    spinner.finish_and_clear();
    loaded.context("Failed to load assessments")?;

    Ok((assessments, date_format))
}

pub async fn list_assessments(ctx: &Context, student_id: &str) -> Result<()> {
    let (assessments, date_format) = load(ctx, student_id).await?;

    println!("{}", "Assessments".bold());
    println!();

    if assessments.is_empty() {
        println!("No assessments for this student yet.");
        return Ok(());
    }

    for a in assessments.items() {
        println!(
            "  {}  {}  {:>6.1} kg  {:>5.1}% fat  {:>5.1} kg muscle",
            a.id.dimmed(),
            a.date.format(&date_format),
            a.weight,
            a.body_fat,
            a.muscle_mass
        );
        let m = &a.measurements;
        println!(
            "      chest {:.0} · waist {:.0} · hip {:.0} · arm {:.0} · thigh {:.0} cm",
            m.chest, m.waist, m.hip, m.arm, m.thigh
        );
        if !a.notes.is_empty() {
            println!("      {}", a.notes.dimmed());
        }
    }

    Ok(())
}

pub async fn show_progress(ctx: &Context, student_id: &str) -> Result<()> {
    let (assessments, date_format) = load(ctx, student_id).await?;
    let view = AssessmentsView::new(assessments.items());

    let Some(delta) = view.progress() else {
        println!("At least two assessments are needed to show progress.");
        return Ok(());
    };

    println!("{}", "Progress since the previous assessment".bold());
    println!();
    println!("  Weight:       {}", format_delta(delta.weight, " kg"));
    println!("  Body fat:     {}", format_delta(delta.body_fat, "%"));
    println!("  Muscle mass:  {}", format_delta(delta.muscle_mass, " kg"));

    println!();
    println!("{}", "History (oldest first)".bold());
    for point in view.chart_series() {
        println!(
            "  {}  {:>6.1} kg  {:>5.1}%",
            point.date.format(&date_format),
            point.weight,
            point.body_fat
        );
    }

    Ok(())
}

pub async fn add_assessment(ctx: &Context, student_id: &str, set: &[String]) -> Result<()> {
    let assignments = prompt::parse_assignments(set)?;
    let client = ctx.connect()?;
    let mut assessments = EntityCache::for_student(AssessmentGateway::new(client), student_id);

    let mut form = FormController::<AssessmentForm>::new();
    form.open_new_with(AssessmentForm::for_student(student_id));
    prompt::fill_form(&mut form, &assignments)?;

    let assessment = form
        .submit(&mut assessments)
        .await
        .context("Failed to record assessment")?;

    prompt::success(&format!("Recorded assessment {}", assessment.id));
    Ok(())
}

pub async fn edit_assessment(ctx: &Context, id: &str, set: &[String]) -> Result<()> {
    let assignments = prompt::parse_assignments(set)?;
    let client = ctx.connect()?;
    let gateway = AssessmentGateway::new(client);

    let current = gateway
        .get(id)
        .await?
        .with_context(|| format!("Assessment {} not found", id))?;
    let mut assessments = EntityCache::for_student(gateway, &current.student_id);

    let mut form = FormController::<AssessmentForm>::new();
    form.open_edit(&current);
    prompt::fill_form(&mut form, &assignments)?;

    form.submit(&mut assessments)
        .await
        .context("Failed to update assessment")?;

    prompt::success(&format!("Updated assessment {}", id));
    Ok(())
}

pub async fn delete_assessment(ctx: &Context, id: &str, force: bool) -> Result<()> {
    let client = ctx.connect()?;
    let mut assessments = EntityCache::for_student(AssessmentGateway::new(client), "");

    if !prompt::confirm(&format!("Delete assessment {}?", id), force)? {
        println!("Cancelled.");
        return Ok(());
    }

    assessments
        .delete(id)
        .await
        .context("Failed to delete assessment")?;

    prompt::success(&format!("Deleted assessment {}", id));
    Ok(())
}
