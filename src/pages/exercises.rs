use std::collections::BTreeSet;

use super::matches;
use crate::models::{Difficulty, Exercise};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DifficultyFilter {
    #[default]
    All,
    Only(Difficulty),
}

impl DifficultyFilter {
    fn accepts(&self, difficulty: Difficulty) -> bool {
        match self {
            DifficultyFilter::All => true,
            DifficultyFilter::Only(wanted) => *wanted == difficulty,
        }
    }
}

impl std::str::FromStr for DifficultyFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(DifficultyFilter::All);
        }
        Ok(DifficultyFilter::Only(s.parse()?))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExercisesPage {
    pub search: String,
    pub difficulty: DifficultyFilter,
    /// `None` shows every muscle group
    pub muscle_group: Option<String>,
}

impl ExercisesPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filtered<'a>(&self, exercises: &'a [Exercise]) -> Vec<&'a Exercise> {
        let needle = self.search.trim();
        exercises
            .iter()
            .filter(|e| matches(&e.name, needle) || matches(&e.muscle_group, needle))
            .filter(|e| self.difficulty.accepts(e.difficulty))
            .filter(|e| {
                self.muscle_group
                    .as_deref()
                    .map_or(true, |group| e.muscle_group.eq_ignore_ascii_case(group))
            })
            .collect()
    }

    /// Whether any filter narrows the list
    pub fn is_filtered(&self) -> bool {
        !self.search.trim().is_empty()
            || self.difficulty != DifficultyFilter::All
            || self.muscle_group.is_some()
    }

    /// Distinct muscle groups, sorted
    pub fn muscle_groups(exercises: &[Exercise]) -> Vec<String> {
        exercises
            .iter()
            .map(|e| e.muscle_group.trim())
            .filter(|group| !group.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn with_video(exercises: &[Exercise]) -> usize {
        exercises.iter().filter(|e| e.has_video()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn exercise(name: &str, group: &str, difficulty: Difficulty, video: Option<&str>) -> Exercise {
        Exercise {
            id: name.to_lowercase(),
            user_id: None,
            name: name.to_string(),
            muscle_group: group.to_string(),
            equipment: String::new(),
            difficulty,
            instructions: String::new(),
            video_url: video.map(str::to_string),
            tags: vec![],
            created_at: Utc::now(),
        }
    }

    fn library() -> Vec<Exercise> {
        vec![
            exercise("Back Squat", "Legs", Difficulty::Intermediate, Some("https://v/1")),
            exercise("Bench Press", "Chest", Difficulty::Beginner, None),
            exercise("Leg Press", "Legs", Difficulty::Beginner, Some("")),
        ]
    }

    #[test]
    fn test_search_and_filters_combine() {
        let exercises = library();
        let mut page = ExercisesPage::new();

        page.search = "leg".to_string();
        assert_eq!(page.filtered(&exercises).len(), 2);

        page.difficulty = DifficultyFilter::Only(Difficulty::Beginner);
        let hits = page.filtered(&exercises);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Leg Press");

        page.search.clear();
        page.muscle_group = Some("chest".to_string());
        assert_eq!(page.filtered(&exercises)[0].name, "Bench Press");
        assert!(page.is_filtered());
    }

    #[test]
    fn test_muscle_groups_and_video_count() {
        let exercises = library();
        assert_eq!(ExercisesPage::muscle_groups(&exercises), vec!["Chest", "Legs"]);
        assert_eq!(ExercisesPage::with_video(&exercises), 1);
    }

    #[test]
    fn test_difficulty_filter_parse() {
        assert_eq!("all".parse::<DifficultyFilter>().unwrap(), DifficultyFilter::All);
        assert_eq!(
            "advanced".parse::<DifficultyFilter>().unwrap(),
            DifficultyFilter::Only(Difficulty::Advanced)
        );
        assert!("expert".parse::<DifficultyFilter>().is_err());
    }
}
