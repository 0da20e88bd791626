use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::Entity;

/// Exercise library entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub name: String,
    pub muscle_group: String,
    #[serde(default)]
    pub equipment: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "Beginner"),
            Difficulty::Intermediate => write!(f, "Intermediate"),
            Difficulty::Advanced => write!(f, "Advanced"),
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            _ => Err(anyhow::anyhow!("Invalid difficulty: {}", s)),
        }
    }
}

impl Exercise {
    pub fn has_video(&self) -> bool {
        self.video_url.as_deref().is_some_and(|url| !url.trim().is_empty())
    }
}

impl Entity for Exercise {
    fn id(&self) -> &str {
        &self.id
    }

    /// Alphabetical by name, ignoring case and accents the way the
    /// database collation does; ties fall back to the raw name
    fn list_order(&self, other: &Self) -> Ordering {
        collation_key(&self.name)
            .cmp(&collation_key(&other.name))
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// Lower-cased name with Latin diacritics folded to their base letter
pub fn collation_key(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            'ý' | 'ÿ' => 'y',
            other => other,
        })
        .collect()
}

/// Fields supplied when creating an exercise
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewExercise {
    pub name: String,
    pub muscle_group: String,
    pub equipment: String,
    pub difficulty: Difficulty,
    pub instructions: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub tags: Vec<String>,
}

/// Partial update; absent fields are left untouched server-side.
/// `Some(None)` on an optional column clears it (sent as `null`).
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ExercisePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muscle_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl From<&NewExercise> for ExercisePatch {
    fn from(fields: &NewExercise) -> Self {
        Self {
            name: Some(fields.name.clone()),
            muscle_group: Some(fields.muscle_group.clone()),
            equipment: Some(fields.equipment.clone()),
            difficulty: Some(fields.difficulty),
            instructions: Some(fields.instructions.clone()),
            video_url: Some(fields.video_url.clone()),
            tags: Some(fields.tags.clone()),
        }
    }
}
