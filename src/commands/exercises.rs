use anyhow::{Context as _, Result};
use clap::Subcommand;
use colored::Colorize;

use super::prompt;
use super::Context;
use crate::cache::EntityCache;
use crate::forms::{ExerciseForm, FormController};
use crate::gateway::{ExerciseGateway, Repository};
use crate::models::Exercise;
use crate::pages::{DifficultyFilter, ExercisesPage};

#[derive(Subcommand)]
pub enum ExerciseSubcommands {
    /// List the exercise library
    List {
        /// Filter by name or muscle group
        #[arg(short, long)]
        search: Option<String>,

        /// all, beginner, intermediate or advanced
        #[arg(short, long, default_value = "all")]
        difficulty: DifficultyFilter,

        /// Only this muscle group (queried server-side)
        #[arg(short, long)]
        muscle_group: Option<String>,
    },

    /// Add an exercise (prompts for each field unless --set is given)
    Add {
        /// Set a field without prompting, e.g. --set muscle_group=Legs
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
    },

    /// Edit an exercise
    Edit {
        /// Exercise ID
        id: String,

        /// Set a field without prompting
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
    },

    /// Delete an exercise
    Delete {
        /// Exercise ID
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

impl ExerciseSubcommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            ExerciseSubcommands::List {
                search,
                difficulty,
                muscle_group,
            } => list_exercises(ctx, search, difficulty, muscle_group).await,
            ExerciseSubcommands::Add { set } => add_exercise(ctx, &set).await,
            ExerciseSubcommands::Edit { id, set } => edit_exercise(ctx, &id, &set).await,
            ExerciseSubcommands::Delete { id, force } => delete_exercise(ctx, &id, force).await,
        }
    }
}

pub async fn list_exercises(
    ctx: &Context,
    search: Option<String>,
    difficulty: DifficultyFilter,
    muscle_group: Option<String>,
) -> Result<()> {
    let client = ctx.connect()?;
    let gateway = ExerciseGateway::new(client);

    let spinner = prompt::spinner("Loading exercises...");
    let loaded = match &muscle_group {
        Some(group) => gateway.list_by_muscle_group(group).await,
        None => gateway.list(&()).await,
    };
    spinner.finish_and_clear();
    let exercises = loaded.context("Failed to load exercises")?;

    let page = ExercisesPage {
        search: search.unwrap_or_default(),
        difficulty,
        muscle_group: None,
    };
    let rows: Vec<&Exercise> = page.filtered(&exercises);

    println!("{}", "Exercise library".bold());
    println!();

    if rows.is_empty() {
        if page.is_filtered() || muscle_group.is_some() {
            println!("No exercises match the filters.");
        } else {
            println!("No exercises yet. Use 'mk-training exercises add' to create one.");
        }
        return Ok(());
    }

    for exercise in &rows {
        let video = if exercise.has_video() { "▶" } else { " " };
        println!(
            "  {}  {} {:<28} {:<14} {:<12} {}",
            exercise.id.dimmed(),
            video.cyan(),
            exercise.name,
            exercise.muscle_group,
            exercise.difficulty,
            exercise.equipment.dimmed()
        );
    }

    println!();
    println!(
        "{} shown · {} total · {} with video · groups: {}",
        rows.len(),
        exercises.len(),
        ExercisesPage::with_video(&exercises),
        ExercisesPage::muscle_groups(&exercises).join(", ")
    );

    Ok(())
}

pub async fn add_exercise(ctx: &Context, set: &[String]) -> Result<()> {
    let assignments = prompt::parse_assignments(set)?;
    let client = ctx.connect()?;
    let mut exercises = EntityCache::unscoped(ExerciseGateway::new(client));

    let mut form = FormController::<ExerciseForm>::new();
    form.open_new();
    prompt::fill_form(&mut form, &assignments)?;

    let exercise = form
        .submit(&mut exercises)
        .await
        .context("Failed to create exercise")?;

    prompt::success(&format!("Added {} ({})", exercise.name, exercise.id));
    Ok(())
}

pub async fn edit_exercise(ctx: &Context, id: &str, set: &[String]) -> Result<()> {
    let assignments = prompt::parse_assignments(set)?;
    let client = ctx.connect()?;
    let mut exercises = EntityCache::unscoped(ExerciseGateway::new(client));

    let current = exercises
        .repository()
        .get(id)
        .await?
        .with_context(|| format!("Exercise {} not found", id))?;

    let mut form = FormController::<ExerciseForm>::new();
    form.open_edit(&current);
    prompt::fill_form(&mut form, &assignments)?;

    let exercise = form
        .submit(&mut exercises)
        .await
        .context("Failed to update exercise")?;

    prompt::success(&format!("Updated {}", exercise.name));
    Ok(())
}

pub async fn delete_exercise(ctx: &Context, id: &str, force: bool) -> Result<()> {
    let client = ctx.connect()?;
    let mut exercises = EntityCache::unscoped(ExerciseGateway::new(client));

    if !prompt::confirm(&format!("Delete exercise {}?", id), force)? {
        println!("Cancelled.");
        return Ok(());
    }

    exercises
        .delete(id)
        .await
        .context("Failed to delete exercise")?;

    prompt::success(&format!("Deleted exercise {}", id));
    Ok(())
}
