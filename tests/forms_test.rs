mod common;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use common::{exercise, student, FakeExercises, FakeStudents};
use mk_training::api::ApiError;
use mk_training::cache::EntityCache;
use mk_training::forms::{
    AssessmentField, AssessmentForm, ExerciseField, ExerciseForm, FormController, FormErrors,
    FormModel, MeasurementField, StudentField, StudentForm, StudentInput, SubmitError,
};

fn valid_student() -> StudentInput {
    StudentInput {
        name: "Ana Souza".to_string(),
        email: "ana@example.com".to_string(),
        phone: "(11) 99999-9999".to_string(),
        birth_date: "20/06/2000".to_string(),
        height: 165.0,
        weight: 65.5,
        goal: "Hypertrophy".to_string(),
        ..Default::default()
    }
}

/// Break exactly one required field
fn break_field(input: &mut StudentInput, field: StudentField) {
    match field {
        StudentField::Name => input.name = "   ".to_string(),
        StudentField::Email => input.email = "not-an-email".to_string(),
        StudentField::Phone => input.phone.clear(),
        StudentField::BirthDate => input.birth_date = "31/02/2000".to_string(),
        StudentField::Height => input.height = 0.0,
        StudentField::Weight => input.weight = -1.0,
        StudentField::Goal => input.goal.clear(),
        _ => unreachable!("optional field"),
    }
}

const REQUIRED: [StudentField; 7] = [
    StudentField::Name,
    StudentField::Email,
    StudentField::Phone,
    StudentField::BirthDate,
    StudentField::Height,
    StudentField::Weight,
    StudentField::Goal,
];

proptest! {
    #[test]
    fn test_single_violation_is_reported_alone(index in 0usize..REQUIRED.len()) {
        let field = REQUIRED[index];
        let mut input = valid_student();
        break_field(&mut input, field);

        let errors = StudentForm::validate(&input).unwrap_err();
        prop_assert_eq!(errors.len(), 1);
        prop_assert!(errors.contains(field));
    }

    #[test]
    fn test_positive_measures_always_pass(height in 0.1f64..300.0, weight in 0.1f64..500.0) {
        let mut input = valid_student();
        input.height = height;
        input.weight = weight;

        let draft = StudentForm::validate(&input).unwrap();
        prop_assert_eq!(draft.height, height);
        prop_assert_eq!(draft.weight, weight);
    }

    #[test]
    fn test_body_fat_range(body_fat in -50.0f64..150.0) {
        let mut input = AssessmentForm::for_student("s1");
        input.weight = 70.0;
        input.body_fat = body_fat;

        let result = AssessmentForm::validate(&input);
        if (0.0..=100.0).contains(&body_fat) {
            prop_assert!(result.is_ok());
        } else {
            let errors = result.unwrap_err();
            prop_assert_eq!(
                errors.message(AssessmentField::BodyFat),
                Some("Body fat must be between 0 and 100")
            );
        }
    }
}

#[test]
fn test_all_violations_reported_together() {
    let errors = StudentForm::validate(&StudentInput::default()).unwrap_err();

    for field in REQUIRED {
        assert!(errors.contains(field), "missing error for {:?}", field);
    }
    assert_eq!(errors.message(StudentField::Email), Some("Email is required"));
}

#[test]
fn test_body_fat_bounds_are_inclusive() {
    for body_fat in [0.0, 100.0] {
        let mut input = AssessmentForm::for_student("s1");
        input.weight = 70.0;
        input.body_fat = body_fat;
        assert!(AssessmentForm::validate(&input).is_ok());
    }
}

#[test]
fn test_measurement_errors_are_nested() {
    let mut form = FormController::<AssessmentForm>::new();
    form.open_new_with(AssessmentForm::for_student("s1"));
    form.set_field(AssessmentField::Weight, "70");
    form.set_field(AssessmentField::Measurement(MeasurementField::Waist), "-2");

    assert!(!form.validate());

    let entries = form.errors().entries();
    assert_eq!(
        entries,
        vec![(
            "measurements.waist".to_string(),
            "Measurement must be 0 or more".to_string()
        )]
    );

    // Fixing the field clears only its message
    form.set_field(AssessmentField::Measurement(MeasurementField::Waist), "80");
    assert!(form.errors().is_empty());
}

#[tokio::test]
async fn test_invalid_submit_makes_no_call() {
    let repo = FakeStudents::default();
    let mut cache = EntityCache::unscoped(repo.clone());
    let mut form = FormController::<StudentForm>::new();
    form.open_new();

    let result = form.submit(&mut cache).await;

    assert_matches!(result, Err(SubmitError::Invalid));
    assert_eq!(repo.calls(), 0);
    assert!(form.is_open());
    assert!(!form.errors().is_empty());
}

#[tokio::test]
async fn test_closed_form_cannot_submit() {
    let mut cache = EntityCache::unscoped(FakeStudents::default());
    let mut form = FormController::<StudentForm>::new();

    assert_matches!(form.submit(&mut cache).await, Err(SubmitError::Closed));
}

#[test]
fn test_second_submit_while_saving_is_busy() {
    let mut form = FormController::<StudentForm>::new();
    form.open_new_with(valid_student());

    let draft = form.begin_submit().unwrap();
    assert_eq!(draft.name, "Ana Souza");
    assert!(form.is_submitting());

    assert_matches!(form.begin_submit(), Err(SubmitError::Busy));
}

#[tokio::test]
async fn test_remote_failure_keeps_draft_open() {
    let repo = FakeStudents::default();
    repo.fail_with(ApiError::Conflict("duplicate email".to_string()));
    let mut cache = EntityCache::unscoped(repo.clone());
    cache.fetch().await.ok();

    let mut form = FormController::<StudentForm>::new();
    form.open_new_with(valid_student());

    let result = form.submit(&mut cache).await;

    assert_matches!(result, Err(SubmitError::Remote(ApiError::Conflict(_))));
    assert!(form.is_open());
    assert!(!form.is_submitting());
    assert_eq!(form.input(), &valid_student());

    // Retry once the backend recovers
    repo.recover();
    let created = form.submit(&mut cache).await.unwrap();
    assert_eq!(created.name, "Ana Souza");
    assert!(!form.is_open());
}

#[tokio::test]
async fn test_successful_create_closes_and_resets() {
    let repo = FakeStudents::default();
    let mut cache = EntityCache::unscoped(repo.clone());
    cache.fetch().await.unwrap();

    let mut form = FormController::<StudentForm>::new();
    form.open_new_with(valid_student());
    let created = form.submit(&mut cache).await.unwrap();

    assert!(!form.is_open());
    assert_eq!(form.input(), &StudentInput::default());
    assert_eq!(cache.items(), &[created]);
}

#[tokio::test]
async fn test_edit_submits_patch_for_record() {
    let repo = FakeStudents::with(vec![student("s1", "Ana", 0)]);
    let mut cache = EntityCache::unscoped(repo.clone());
    cache.fetch().await.unwrap();

    let mut form = FormController::<StudentForm>::new();
    form.open_edit(&cache.items()[0].clone());
    assert_eq!(form.editing(), Some("s1"));
    assert_eq!(form.field_text(StudentField::BirthDate), "1995-05-10");

    form.set_field(StudentField::Name, "Ana Paula");
    let updated = form.submit(&mut cache).await.unwrap();

    assert_eq!(updated.id, "s1");
    assert_eq!(cache.find("s1").map(|s| s.name.as_str()), Some("Ana Paula"));
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_clearing_video_on_edit_sends_null() {
    let repo = FakeExercises::with(vec![exercise("e1", "Agachamento")]);
    let mut cache = EntityCache::unscoped(repo);
    cache.fetch().await.unwrap();

    let mut form = FormController::<ExerciseForm>::new();
    form.open_edit(&cache.items()[0].clone());
    assert_eq!(form.field_text(ExerciseField::VideoUrl), "https://videos.example.com/1");
    form.set_field(ExerciseField::VideoUrl, "");

    let draft = ExerciseForm::validate(form.input()).unwrap();
    let body = serde_json::to_value(ExerciseForm::patch(&draft)).unwrap();
    assert_eq!(body.get("video_url"), Some(&serde_json::Value::Null));

    let updated = form.submit(&mut cache).await.unwrap();
    assert_eq!(updated.video_url, None);
    assert!(!cache.items()[0].has_video());
}

#[tokio::test]
async fn test_clearing_optional_student_fields_on_edit() {
    let mut existing = student("s1", "Ana", 0);
    existing.service_type = Some("Online".to_string());
    existing.monthly_fee = Some(250.0);
    let mut cache = EntityCache::unscoped(FakeStudents::with(vec![existing]));
    cache.fetch().await.unwrap();

    let mut form = FormController::<StudentForm>::new();
    form.open_edit(&cache.items()[0].clone());
    form.set_field(StudentField::ServiceType, " ");
    form.set_field(StudentField::MonthlyFee, "");

    let draft = StudentForm::validate(form.input()).unwrap();
    let body = serde_json::to_value(StudentForm::patch(&draft)).unwrap();
    assert_eq!(body["service_type"], serde_json::Value::Null);
    assert_eq!(body["monthly_fee"], serde_json::Value::Null);
    assert!(body.as_object().unwrap().contains_key("monthly_fee"));

    form.submit(&mut cache).await.unwrap();
    let saved = cache.find("s1").unwrap();
    assert_eq!(saved.service_type, None);
    assert_eq!(saved.monthly_fee, None);
}
