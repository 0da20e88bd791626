#![allow(dead_code)]

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use std::sync::{Arc, Mutex};

use mk_training::api::{ApiError, ApiResult};
use mk_training::gateway::{Repository, StudentId};
use mk_training::models::{
    Assessment, AssessmentPatch, Difficulty, Exercise, ExercisePatch, Measurements, NewAssessment,
    NewExercise, NewStudent, Plan, Student, StudentPatch,
};

/// Shared state behind an in-memory repository
#[derive(Debug)]
pub struct Store<T> {
    pub rows: Vec<T>,
    pub next_id: u32,
    /// When set, every call fails with this error
    pub fail_with: Option<ApiError>,
    pub calls: u32,
}

impl<T> Default for Store<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 1,
            fail_with: None,
            calls: 0,
        }
    }
}

impl<T: Clone> Store<T> {
    fn begin(&mut self) -> ApiResult<()> {
        self.calls += 1;
        match &self.fail_with {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        let id = format!("{}{}", prefix, self.next_id);
        self.next_id += 1;
        id
    }
}

pub fn student(id: &str, name: &str, created_minutes: i64) -> Student {
    let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(created_minutes);
    Student {
        id: id.to_string(),
        user_id: Some("trainer-1".to_string()),
        name: name.to_string(),
        email: format!("{}@example.com", id),
        phone: "11 99999-0000".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1995, 5, 10).unwrap(),
        height: 170.0,
        weight: 70.0,
        goal: "Hypertrophy".to_string(),
        plan: Plan::Basic,
        service_type: None,
        monthly_fee: None,
        portal_access: false,
        created_at,
        updated_at: created_at,
    }
}

pub fn new_student(name: &str) -> NewStudent {
    NewStudent {
        name: name.to_string(),
        email: "new@example.com".to_string(),
        phone: "11 98888-0000".to_string(),
        birth_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        height: 165.0,
        weight: 60.0,
        goal: "Conditioning".to_string(),
        plan: Plan::Premium,
        service_type: None,
        monthly_fee: None,
        portal_access: false,
    }
}

/// Students held in memory, newest first
#[derive(Clone, Default)]
pub struct FakeStudents {
    pub store: Arc<Mutex<Store<Student>>>,
}

impl FakeStudents {
    pub fn with(rows: Vec<Student>) -> Self {
        let fake = Self::default();
        fake.store.lock().unwrap().rows = rows;
        fake
    }

    pub fn fail_with(&self, error: ApiError) {
        self.store.lock().unwrap().fail_with = Some(error);
    }

    pub fn recover(&self) {
        self.store.lock().unwrap().fail_with = None;
    }

    pub fn calls(&self) -> u32 {
        self.store.lock().unwrap().calls
    }

    pub fn ids(&self) -> Vec<String> {
        self.store.lock().unwrap().rows.iter().map(|s| s.id.clone()).collect()
    }
}

impl Repository for FakeStudents {
    type Record = Student;
    type Draft = NewStudent;
    type Patch = StudentPatch;
    type Scope = ();

    async fn list(&self, _scope: &()) -> ApiResult<Vec<Student>> {
        let mut store = self.store.lock().unwrap();
        store.begin()?;
        let mut rows = store.rows.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get(&self, id: &str) -> ApiResult<Option<Student>> {
        let mut store = self.store.lock().unwrap();
        store.begin()?;
        Ok(store.rows.iter().find(|s| s.id == id).cloned())
    }

    async fn create(&self, draft: &NewStudent) -> ApiResult<Student> {
        let mut store = self.store.lock().unwrap();
        store.begin()?;
        let id = store.next_id("s");
        let newest = store.rows.iter().map(|s| s.created_at).max();

        let mut created = student(&id, &draft.name, 0);
        if let Some(newest) = newest {
            created.created_at = newest + Duration::minutes(1);
            created.updated_at = created.created_at;
        }
        created.email = draft.email.clone();
        created.plan = draft.plan;
        store.rows.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, patch: &StudentPatch) -> ApiResult<Student> {
        let mut store = self.store.lock().unwrap();
        store.begin()?;
        let row = store
            .rows
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("students {}", id)))?;

        if let Some(name) = &patch.name {
            row.name = name.clone();
        }
        if let Some(plan) = patch.plan {
            row.plan = plan;
        }
        if let Some(service_type) = &patch.service_type {
            row.service_type = service_type.clone();
        }
        if let Some(monthly_fee) = patch.monthly_fee {
            row.monthly_fee = monthly_fee;
        }
        Ok(row.clone())
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        let mut store = self.store.lock().unwrap();
        store.begin()?;
        let before = store.rows.len();
        store.rows.retain(|s| s.id != id);
        if store.rows.len() == before {
            return Err(ApiError::NotFound(format!("students {}", id)));
        }
        Ok(())
    }
}

pub fn assessment(id: &str, student_id: &str, date: &str, weight: f64) -> Assessment {
    Assessment {
        id: id.to_string(),
        student_id: student_id.to_string(),
        date: date.parse().unwrap(),
        weight,
        body_fat: 20.0,
        muscle_mass: 30.0,
        measurements: Measurements::default(),
        notes: String::new(),
        created_at: Utc::now(),
    }
}

/// Assessments held in memory, scoped by student
#[derive(Clone, Default)]
pub struct FakeAssessments {
    pub store: Arc<Mutex<Store<Assessment>>>,
}

impl FakeAssessments {
    pub fn with(rows: Vec<Assessment>) -> Self {
        let fake = Self::default();
        fake.store.lock().unwrap().rows = rows;
        fake
    }

    pub fn calls(&self) -> u32 {
        self.store.lock().unwrap().calls
    }
}

impl Repository for FakeAssessments {
    type Record = Assessment;
    type Draft = NewAssessment;
    type Patch = AssessmentPatch;
    type Scope = StudentId;

    async fn list(&self, student_id: &StudentId) -> ApiResult<Vec<Assessment>> {
        let mut store = self.store.lock().unwrap();
        store.begin()?;
        let mut rows: Vec<Assessment> = store
            .rows
            .iter()
            .filter(|a| &a.student_id == student_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }

    async fn get(&self, id: &str) -> ApiResult<Option<Assessment>> {
        let mut store = self.store.lock().unwrap();
        store.begin()?;
        Ok(store.rows.iter().find(|a| a.id == id).cloned())
    }

    async fn create(&self, draft: &NewAssessment) -> ApiResult<Assessment> {
        let mut store = self.store.lock().unwrap();
        store.begin()?;
        let id = store.next_id("a");
        let created = Assessment {
            id,
            student_id: draft.student_id.clone(),
            date: draft.date,
            weight: draft.weight,
            body_fat: draft.body_fat,
            muscle_mass: draft.muscle_mass,
            measurements: draft.measurements,
            notes: draft.notes.clone(),
            created_at: Utc::now(),
        };
        store.rows.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, patch: &AssessmentPatch) -> ApiResult<Assessment> {
        let mut store = self.store.lock().unwrap();
        store.begin()?;
        let row = store
            .rows
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("assessments {}", id)))?;
        if let Some(weight) = patch.weight {
            row.weight = weight;
        }
        if let Some(date) = patch.date {
            row.date = date;
        }
        Ok(row.clone())
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        let mut store = self.store.lock().unwrap();
        store.begin()?;
        store.rows.retain(|a| a.id != id);
        Ok(())
    }

    fn in_scope(student_id: &StudentId, record: &Assessment) -> bool {
        &record.student_id == student_id
    }
}

pub fn exercise(id: &str, name: &str) -> Exercise {
    Exercise {
        id: id.to_string(),
        user_id: Some("trainer-1".to_string()),
        name: name.to_string(),
        muscle_group: "Back".to_string(),
        equipment: "Barbell".to_string(),
        difficulty: Difficulty::Intermediate,
        instructions: "Keep the core tight".to_string(),
        video_url: Some("https://videos.example.com/1".to_string()),
        tags: Vec::new(),
        created_at: Utc::now(),
    }
}

pub fn new_exercise(name: &str) -> NewExercise {
    NewExercise {
        name: name.to_string(),
        muscle_group: "Back".to_string(),
        equipment: "Cable".to_string(),
        difficulty: Difficulty::Beginner,
        instructions: "Pull to the chest".to_string(),
        video_url: None,
        tags: Vec::new(),
    }
}

/// Exercises held in memory, listed by a case-insensitive collation like
/// the database's
#[derive(Clone, Default)]
pub struct FakeExercises {
    pub store: Arc<Mutex<Store<Exercise>>>,
}

impl FakeExercises {
    pub fn with(rows: Vec<Exercise>) -> Self {
        let fake = Self::default();
        fake.store.lock().unwrap().rows = rows;
        fake
    }

    pub fn names(&self) -> Vec<String> {
        self.store.lock().unwrap().rows.iter().map(|e| e.name.clone()).collect()
    }
}

impl Repository for FakeExercises {
    type Record = Exercise;
    type Draft = NewExercise;
    type Patch = ExercisePatch;
    type Scope = ();

    async fn list(&self, _scope: &()) -> ApiResult<Vec<Exercise>> {
        let mut store = self.store.lock().unwrap();
        store.begin()?;
        let mut rows = store.rows.clone();
        rows.sort_by_key(|e| e.name.to_lowercase());
        Ok(rows)
    }

    async fn get(&self, id: &str) -> ApiResult<Option<Exercise>> {
        let mut store = self.store.lock().unwrap();
        store.begin()?;
        Ok(store.rows.iter().find(|e| e.id == id).cloned())
    }

    async fn create(&self, draft: &NewExercise) -> ApiResult<Exercise> {
        let mut store = self.store.lock().unwrap();
        store.begin()?;
        let id = store.next_id("e");
        let mut created = exercise(&id, &draft.name);
        created.video_url = draft.video_url.clone();
        store.rows.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, patch: &ExercisePatch) -> ApiResult<Exercise> {
        let mut store = self.store.lock().unwrap();
        store.begin()?;
        let row = store
            .rows
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("exercises {}", id)))?;
        if let Some(name) = &patch.name {
            row.name = name.clone();
        }
        if let Some(video_url) = &patch.video_url {
            row.video_url = video_url.clone();
        }
        Ok(row.clone())
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        let mut store = self.store.lock().unwrap();
        store.begin()?;
        store.rows.retain(|e| e.id != id);
        Ok(())
    }
}
