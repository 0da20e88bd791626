mod common;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use common::{
    assessment, exercise, new_exercise, new_student, student, FakeAssessments, FakeExercises,
    FakeStudents,
};
use mk_training::api::ApiError;
use mk_training::cache::{EntityCache, LoadState};
use mk_training::models::{NewAssessment, Measurements, StudentPatch};

fn ids<T: mk_training::models::Entity>(items: &[T]) -> Vec<String> {
    items.iter().map(|item| item.id().to_string()).collect()
}

fn seeded_students() -> FakeStudents {
    FakeStudents::with(vec![
        student("s1", "Ana", 0),
        student("s2", "Bruno", 10),
        student("s3", "Carla", 20),
    ])
}

#[tokio::test]
async fn test_fetch_lists_newest_first() {
    let mut cache = EntityCache::unscoped(seeded_students());
    assert_eq!(cache.state(), LoadState::Idle);

    cache.fetch().await.unwrap();

    assert_eq!(cache.state(), LoadState::Ready);
    assert_eq!(ids(cache.items()), vec!["s3", "s2", "s1"]);
    assert!(cache.error().is_none());
}

#[tokio::test]
async fn test_create_inserts_at_natural_position_without_refetch() {
    let repo = seeded_students();
    let mut cache = EntityCache::unscoped(repo.clone());
    cache.fetch().await.unwrap();
    let calls_after_fetch = repo.calls();

    let created = cache.create(&new_student("Diego")).await.unwrap();

    // One gateway call, no reload
    assert_eq!(repo.calls(), calls_after_fetch + 1);
    assert_eq!(cache.items()[0], created);
    assert_eq!(cache.len(), 4);

    // A fresh fetch shows the same list
    let mut fresh = EntityCache::unscoped(repo.clone());
    fresh.fetch().await.unwrap();
    assert_eq!(ids(cache.items()), ids(fresh.items()));
}

#[tokio::test]
async fn test_update_replaces_in_place() {
    let mut cache = EntityCache::unscoped(seeded_students());
    cache.fetch().await.unwrap();

    let patch = StudentPatch {
        name: Some("Bruno Lima".to_string()),
        ..Default::default()
    };
    cache.update("s2", &patch).await.unwrap();

    assert_eq!(ids(cache.items()), vec!["s3", "s2", "s1"]);
    assert_eq!(cache.find("s2").map(|s| s.name.as_str()), Some("Bruno Lima"));
}

#[tokio::test]
async fn test_delete_removes_record() {
    let repo = seeded_students();
    let mut cache = EntityCache::unscoped(repo.clone());
    cache.fetch().await.unwrap();

    cache.delete("s2").await.unwrap();

    assert_eq!(ids(cache.items()), vec!["s3", "s1"]);
    assert_eq!(repo.ids(), vec!["s1", "s3"]);
}

#[tokio::test]
async fn test_failed_mutation_leaves_list_unchanged() {
    let repo = seeded_students();
    let mut cache = EntityCache::unscoped(repo.clone());
    cache.fetch().await.unwrap();
    let before = cache.items().to_vec();

    repo.fail_with(ApiError::ServerError("boom".to_string()));

    let created = cache.create(&new_student("Diego")).await;
    assert_matches!(created, Err(ApiError::ServerError(_)));
    assert_eq!(cache.items(), before.as_slice());

    let deleted = cache.delete("s1").await;
    assert_matches!(deleted, Err(ApiError::ServerError(_)));
    assert_eq!(cache.items(), before.as_slice());
    assert!(cache.error().is_some());

    repo.recover();
    cache.delete("s1").await.unwrap();
    assert!(cache.error().is_none());
}

#[tokio::test]
async fn test_failed_fetch_keeps_previous_items() {
    let repo = seeded_students();
    let mut cache = EntityCache::unscoped(repo.clone());
    cache.fetch().await.unwrap();

    repo.fail_with(ApiError::Network("connection refused".to_string()));
    let result = cache.refetch().await;

    assert_matches!(result, Err(ApiError::Network(_)));
    assert_eq!(cache.state(), LoadState::Failed);
    assert_eq!(cache.len(), 3);
    assert!(cache.error().unwrap().contains("connection refused"));

    cache.clear_error();
    assert!(cache.error().is_none());
}

#[tokio::test]
async fn test_fetch_failure_survives_later_mutation() {
    let repo = seeded_students();
    let mut cache = EntityCache::unscoped(repo.clone());

    repo.fail_with(ApiError::Network("connection refused".to_string()));
    cache.fetch().await.unwrap_err();
    repo.recover();

    cache.create(&new_student("Diego")).await.unwrap();

    // The list was never loaded, so the retry banner stays up
    assert_eq!(cache.state(), LoadState::Failed);
    assert!(cache.error().unwrap().contains("connection refused"));

    cache.refetch().await.unwrap();
    assert_eq!(cache.state(), LoadState::Ready);
    assert!(cache.error().is_none());
}

#[tokio::test]
async fn test_create_places_exercise_by_collated_name() {
    let repo = FakeExercises::with(vec![exercise("e1", "Supino"), exercise("e2", "abdominal")]);
    let mut cache = EntityCache::unscoped(repo.clone());
    cache.fetch().await.unwrap();

    cache.create(&new_exercise("Remada")).await.unwrap();
    cache.create(&new_exercise("Levantamento terra")).await.unwrap();

    let local: Vec<&str> = cache.items().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(local, vec!["abdominal", "Levantamento terra", "Remada", "Supino"]);

    let mut fresh = EntityCache::unscoped(repo.clone());
    fresh.fetch().await.unwrap();
    assert_eq!(ids(cache.items()), ids(fresh.items()));
    assert_eq!(repo.names().len(), 4);
}

#[tokio::test]
async fn test_missing_student_leaves_cache_idle() {
    let repo = FakeAssessments::with(vec![assessment("a1", "s1", "2024-03-15", 65.0)]);
    let mut cache = EntityCache::for_student(repo.clone(), "  ");

    cache.fetch().await.unwrap();

    assert_eq!(cache.state(), LoadState::Idle);
    assert!(cache.is_empty());
    assert!(cache.error().is_none());
    assert_eq!(repo.calls(), 0);
}

#[tokio::test]
async fn test_scoped_list_only_holds_that_student() {
    let repo = FakeAssessments::with(vec![
        assessment("a1", "s1", "2024-02-15", 67.2),
        assessment("a2", "s2", "2024-02-20", 80.0),
        assessment("a3", "s1", "2024-03-15", 65.8),
    ]);
    let mut cache = EntityCache::for_student(repo.clone(), "s1");
    cache.fetch().await.unwrap();
    assert_eq!(ids(cache.items()), vec!["a3", "a1"]);

    cache.set_student("s2").await.unwrap();
    assert_eq!(ids(cache.items()), vec!["a2"]);

    // Same student again does not reload
    let calls = repo.calls();
    cache.set_student("s2").await.unwrap();
    assert_eq!(repo.calls(), calls);

    cache.set_student("").await.unwrap();
    assert_eq!(cache.state(), LoadState::Idle);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_create_for_other_student_is_not_listed() {
    let repo = FakeAssessments::with(vec![assessment("a1", "s1", "2024-02-15", 67.2)]);
    let mut cache = EntityCache::for_student(repo, "s1");
    cache.fetch().await.unwrap();

    let draft = NewAssessment {
        student_id: "s2".to_string(),
        date: "2024-03-01".parse().unwrap(),
        weight: 70.0,
        body_fat: 18.0,
        muscle_mass: 32.0,
        measurements: Measurements::default(),
        notes: String::new(),
    };
    let created = cache.create(&draft).await.unwrap();

    assert_eq!(created.student_id, "s2");
    assert_eq!(ids(cache.items()), vec!["a1"]);
}

#[tokio::test]
async fn test_create_places_assessment_by_date() {
    let repo = FakeAssessments::with(vec![
        assessment("a1", "s1", "2024-01-15", 68.0),
        assessment("a2", "s1", "2024-03-15", 65.8),
    ]);
    let mut cache = EntityCache::for_student(repo, "s1");
    cache.fetch().await.unwrap();

    let draft = NewAssessment {
        student_id: "s1".to_string(),
        date: "2024-02-15".parse().unwrap(),
        weight: 67.2,
        body_fat: 25.5,
        muscle_mass: 28.0,
        measurements: Measurements::default(),
        notes: String::new(),
    };
    let created = cache.create(&draft).await.unwrap();

    assert_eq!(ids(cache.items()), vec!["a2".to_string(), created.id, "a1".to_string()]);
}

#[tokio::test]
async fn test_stale_load_is_discarded() {
    let repo = FakeAssessments::with(vec![
        assessment("a1", "s1", "2024-02-15", 67.2),
        assessment("a2", "s2", "2024-02-20", 80.0),
    ]);
    let mut cache = EntityCache::for_student(repo, "s1");

    // A fetch for s1 is in flight when the selection moves to s2
    let slow = cache.begin_load().unwrap();
    assert!(cache.assign_scope(Some("s2".to_string())));
    let fast = cache.begin_load().unwrap();

    assert!(cache.finish_load(fast, Ok(vec![assessment("a2", "s2", "2024-02-20", 80.0)])));
    assert!(!cache.finish_load(slow, Ok(vec![assessment("a1", "s1", "2024-02-15", 67.2)])));

    assert_eq!(ids(cache.items()), vec!["a2"]);
    assert_eq!(cache.scope().map(String::as_str), Some("s2"));
    assert_eq!(cache.state(), LoadState::Ready);
}

#[tokio::test]
async fn test_stale_failure_does_not_surface() {
    let repo = FakeAssessments::default();
    let mut cache = EntityCache::for_student(repo, "s1");

    let slow = cache.begin_load().unwrap();
    cache.assign_scope(Some("s2".to_string()));
    let fast = cache.begin_load().unwrap();
    cache.finish_load(fast, Ok(vec![]));

    assert!(!cache.finish_load(slow, Err(ApiError::Network("timeout".to_string()))));
    assert!(cache.error().is_none());
    assert_eq!(cache.state(), LoadState::Ready);
}
