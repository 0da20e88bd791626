use super::{FieldErrors, FormErrors, FormField, FormModel};
use crate::models::{Difficulty, Exercise, ExercisePatch, NewExercise};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExerciseField {
    Name,
    MuscleGroup,
    Equipment,
    Difficulty,
    Instructions,
    VideoUrl,
    Tags,
}

impl FormField for ExerciseField {
    const ALL: &'static [Self] = &[
        ExerciseField::Name,
        ExerciseField::MuscleGroup,
        ExerciseField::Equipment,
        ExerciseField::Difficulty,
        ExerciseField::Instructions,
        ExerciseField::VideoUrl,
        ExerciseField::Tags,
    ];

    fn key(&self) -> &'static str {
        match self {
            ExerciseField::Name => "name",
            ExerciseField::MuscleGroup => "muscle_group",
            ExerciseField::Equipment => "equipment",
            ExerciseField::Difficulty => "difficulty",
            ExerciseField::Instructions => "instructions",
            ExerciseField::VideoUrl => "video_url",
            ExerciseField::Tags => "tags",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ExerciseField::Name => "Name",
            ExerciseField::MuscleGroup => "Muscle group",
            ExerciseField::Equipment => "Equipment",
            ExerciseField::Difficulty => "Difficulty",
            ExerciseField::Instructions => "Instructions",
            ExerciseField::VideoUrl => "Video URL",
            ExerciseField::Tags => "Tags (comma separated)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExerciseInput {
    pub name: String,
    pub muscle_group: String,
    pub equipment: String,
    pub difficulty: Difficulty,
    pub instructions: String,
    pub video_url: String,
    /// Comma-separated, as typed
    pub tags: String,
}

/// Split a comma-separated tag list, dropping blanks
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExerciseForm;

impl FormModel for ExerciseForm {
    type Field = ExerciseField;
    type Record = Exercise;
    type Input = ExerciseInput;
    type Draft = NewExercise;
    type Patch = ExercisePatch;
    type Errors = FieldErrors<ExerciseField>;

    fn defaults() -> ExerciseInput {
        ExerciseInput::default()
    }

    fn from_record(exercise: &Exercise) -> ExerciseInput {
        ExerciseInput {
            name: exercise.name.clone(),
            muscle_group: exercise.muscle_group.clone(),
            equipment: exercise.equipment.clone(),
            difficulty: exercise.difficulty,
            instructions: exercise.instructions.clone(),
            video_url: exercise.video_url.clone().unwrap_or_default(),
            tags: exercise.tags.join(", "),
        }
    }

    fn set_field(input: &mut ExerciseInput, field: ExerciseField, raw: &str) {
        match field {
            ExerciseField::Name => input.name = raw.to_string(),
            ExerciseField::MuscleGroup => input.muscle_group = raw.to_string(),
            ExerciseField::Equipment => input.equipment = raw.to_string(),
            ExerciseField::Difficulty => {
                if let Ok(difficulty) = raw.parse() {
                    input.difficulty = difficulty;
                }
            }
            ExerciseField::Instructions => input.instructions = raw.to_string(),
            ExerciseField::VideoUrl => input.video_url = raw.to_string(),
            ExerciseField::Tags => input.tags = raw.to_string(),
        }
    }

    fn field_text(input: &ExerciseInput, field: ExerciseField) -> String {
        match field {
            ExerciseField::Name => input.name.clone(),
            ExerciseField::MuscleGroup => input.muscle_group.clone(),
            ExerciseField::Equipment => input.equipment.clone(),
            ExerciseField::Difficulty => input.difficulty.to_string().to_lowercase(),
            ExerciseField::Instructions => input.instructions.clone(),
            ExerciseField::VideoUrl => input.video_url.clone(),
            ExerciseField::Tags => input.tags.clone(),
        }
    }

    fn validate(input: &ExerciseInput) -> Result<NewExercise, FieldErrors<ExerciseField>> {
        let mut errors = FieldErrors::default();

        if input.name.trim().is_empty() {
            errors.insert(ExerciseField::Name, "Name is required");
        }
        if input.muscle_group.trim().is_empty() {
            errors.insert(ExerciseField::MuscleGroup, "Muscle group is required");
        }
        if input.equipment.trim().is_empty() {
            errors.insert(ExerciseField::Equipment, "Equipment is required");
        }
        if input.instructions.trim().is_empty() {
            errors.insert(ExerciseField::Instructions, "Instructions are required");
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let video_url = input.video_url.trim();
        Ok(NewExercise {
            name: input.name.trim().to_string(),
            muscle_group: input.muscle_group.trim().to_string(),
            equipment: input.equipment.trim().to_string(),
            difficulty: input.difficulty,
            instructions: input.instructions.trim().to_string(),
            video_url: (!video_url.is_empty()).then(|| video_url.to_string()),
            tags: split_tags(&input.tags),
        })
    }

    fn patch(draft: &NewExercise) -> ExercisePatch {
        ExercisePatch::from(draft)
    }
}
