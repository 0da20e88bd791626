use anyhow::{bail, Context as _, Result};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::{Confirm, Input, Select};

use super::prompt;
use super::Context;
use crate::cache::EntityCache;
use crate::gateway::{ExerciseGateway, Repository, WorkoutPlanGateway};
use crate::models::{NewWorkoutExercise, NewWorkoutPlan};

#[derive(Subcommand)]
pub enum PlanSubcommands {
    /// List a student's workout plans
    List {
        /// Student ID
        #[arg(short, long)]
        student: String,
    },

    /// Create a workout plan
    Create {
        /// Student ID
        #[arg(short, long)]
        student: String,

        /// Plan name (prompted when omitted)
        #[arg(short, long)]
        name: Option<String>,

        /// Plan description
        #[arg(short, long)]
        description: Option<String>,

        /// Exercise slot as EXERCISE_ID:SETS:REPS[:WEIGHT[:REST_SECONDS]]; repeatable
        #[arg(short, long = "exercise", value_name = "SLOT")]
        exercises: Vec<String>,
    },

    /// Delete a workout plan
    Delete {
        /// Plan ID
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

impl PlanSubcommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            PlanSubcommands::List { student } => list_plans(ctx, &student).await,
            PlanSubcommands::Create {
                student,
                name,
                description,
                exercises,
            } => create_plan(ctx, &student, name, description, &exercises).await,
            PlanSubcommands::Delete { id, force } => delete_plan(ctx, &id, force).await,
        }
    }
}

/// Parse `EXERCISE_ID:SETS:REPS[:WEIGHT[:REST_SECONDS]]`
fn parse_slot(raw: &str, order_index: u32) -> Result<NewWorkoutExercise> {
    let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
    if parts.len() < 3 || parts.len() > 5 || parts[0].is_empty() {
        bail!("Expected EXERCISE_ID:SETS:REPS[:WEIGHT[:REST]], got '{}'", raw);
    }

    let sets: u32 = parts[1]
        .parse()
        .with_context(|| format!("Invalid set count '{}'", parts[1]))?;
    if sets == 0 {
        bail!("Sets must be greater than 0");
    }
    if parts[2].is_empty() {
        bail!("Reps are required");
    }

    let weight = match parts.get(3) {
        Some(w) if !w.is_empty() => w.parse().with_context(|| format!("Invalid weight '{}'", w))?,
        _ => 0.0,
    };
    let rest_time = match parts.get(4) {
        Some(r) if !r.is_empty() => r.parse().with_context(|| format!("Invalid rest time '{}'", r))?,
        _ => 0,
    };

    Ok(NewWorkoutExercise {
        exercise_id: parts[0].to_string(),
        sets,
        reps: parts[2].to_string(),
        weight,
        rest_time,
        notes: String::new(),
        order_index,
    })
}

pub async fn list_plans(ctx: &Context, student_id: &str) -> Result<()> {
    let client = ctx.connect()?;
    let mut plans = EntityCache::for_student(WorkoutPlanGateway::new(client), student_id);

    let spinner = prompt::spinner("Loading workout plans...");
    let loaded = plans.fetch().await;
    spinner.finish_and_clear();
    loaded.context("Failed to load workout plans")?;

    println!("{}", "Workout plans".bold());
    println!();

    if plans.is_empty() {
        println!("No workout plans for this student yet.");
        return Ok(());
    }

    for plan in plans.items() {
        println!("  {}  {}", plan.id.dimmed(), plan.name.bold());
        if !plan.description.is_empty() {
            println!("      {}", plan.description);
        }
        for (i, slot) in plan.exercises.iter().enumerate() {
            let name = slot
                .exercise
                .as_ref()
                .map(|e| e.name.as_str())
                .unwrap_or(slot.exercise_id.as_str());
            let mut line = format!("      {}. {} - {} x {}", i + 1, name, slot.sets, slot.reps);
            if slot.weight > 0.0 {
                line.push_str(&format!(" @ {:.1} kg", slot.weight));
            }
            if slot.rest_time > 0 {
                line.push_str(&format!(", rest {}s", slot.rest_time));
            }
            println!("{}", line);
        }
    }

    Ok(())
}

pub async fn create_plan(
    ctx: &Context,
    student_id: &str,
    name: Option<String>,
    description: Option<String>,
    slots: &[String],
) -> Result<()> {
    let client = ctx.connect()?;
    let interactive = name.is_none();

    let name = match name {
        Some(name) => name,
        None => Input::<String>::new().with_prompt("Plan name").interact_text()?,
    };
    if name.trim().is_empty() {
        bail!("Plan name is required");
    }

    let description = match description {
        Some(description) => description,
        None if interactive => Input::<String>::new()
            .with_prompt("Description")
            .allow_empty(true)
            .interact_text()?,
        None => String::new(),
    };

    let mut exercises = slots
        .iter()
        .enumerate()
        .map(|(i, raw)| parse_slot(raw, i as u32))
        .collect::<Result<Vec<_>>>()?;

    if interactive && exercises.is_empty() {
        exercises = pick_exercises(&ExerciseGateway::new(client.clone())).await?;
    }

    let draft = NewWorkoutPlan {
        student_id: student_id.to_string(),
        name: name.trim().to_string(),
        description: description.trim().to_string(),
        exercises,
    };

    let mut plans = EntityCache::for_student(WorkoutPlanGateway::new(client), student_id);
    let spinner = prompt::spinner("Saving workout plan...");
    let created = plans.create(&draft).await;
    spinner.finish_and_clear();
    let plan = created.context("Failed to create workout plan")?;

    prompt::success(&format!(
        "Created {} with {} exercises ({})",
        plan.name,
        plan.exercises.len(),
        plan.id
    ));
    Ok(())
}

/// Choose exercises from the library one at a time
async fn pick_exercises(gateway: &ExerciseGateway) -> Result<Vec<NewWorkoutExercise>> {
    let library = gateway.list(&()).await.context("Failed to load exercises")?;
    if library.is_empty() {
        println!("The exercise library is empty; the plan will have no exercises.");
        return Ok(Vec::new());
    }

    let labels: Vec<String> = library
        .iter()
        .map(|e| format!("{} ({})", e.name, e.muscle_group))
        .collect();

    let mut slots: Vec<NewWorkoutExercise> = Vec::new();
    while Confirm::new()
        .with_prompt("Add an exercise?")
        .default(slots.is_empty())
        .interact()?
    {
        let choice = Select::new()
            .with_prompt("Exercise")
            .items(&labels)
            .default(0)
            .interact()?;
        let sets: u32 = Input::new().with_prompt("Sets").default(3).interact_text()?;
        let reps: String = Input::new()
            .with_prompt("Reps")
            .default("10".to_string())
            .interact_text()?;
        let weight: f64 = Input::new().with_prompt("Weight (kg)").default(0.0).interact_text()?;
        let rest_time: u32 = Input::new()
            .with_prompt("Rest (seconds)")
            .default(60)
            .interact_text()?;

        slots.push(NewWorkoutExercise {
            exercise_id: library[choice].id.clone(),
            sets,
            reps,
            weight,
            rest_time,
            notes: String::new(),
            order_index: slots.len() as u32,
        });
    }

    Ok(slots)
}

pub async fn delete_plan(ctx: &Context, id: &str, force: bool) -> Result<()> {
    let client = ctx.connect()?;
    let mut plans = EntityCache::for_student(WorkoutPlanGateway::new(client), "");

    if !prompt::confirm(&format!("Delete workout plan {}?", id), force)? {
        println!("Cancelled.");
        return Ok(());
    }

    plans.delete(id).await.context("Failed to delete workout plan")?;

    prompt::success(&format!("Deleted workout plan {}", id));
    Ok(())
}
