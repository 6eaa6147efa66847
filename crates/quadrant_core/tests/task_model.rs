use quadrant_core::{
    Category, IssueKind, NewTask, Task, TaskField, TaskPatch, TaskValidationError,
};
use uuid::Uuid;

fn fixed_id() -> Uuid {
    Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap()
}

#[test]
fn create_classifies_and_trims_name() {
    let task = Task::create(fixed_id(), &NewTask::new("  Ship release  ", 9, 3)).unwrap();

    assert_eq!(task.id(), fixed_id());
    assert_eq!(task.name(), "Ship release");
    assert_eq!(task.description(), None);
    assert_eq!(task.category(), Category::C);
}

#[test]
fn create_rejects_nil_id() {
    let err = Task::create(Uuid::nil(), &NewTask::new("x", 5, 5)).unwrap_err();
    assert_eq!(
        err,
        TaskValidationError::single(TaskField::Id, IssueKind::NilId)
    );
}

#[test]
fn create_reports_all_invalid_fields() {
    let err = Task::create(fixed_id(), &NewTask::new("", 0, 11)).unwrap_err();

    assert_eq!(err.issues().len(), 3);
    assert!(err.has_issue_for(TaskField::Name));
    assert!(err.has_issue_for(TaskField::TimeRating));
    assert!(err.has_issue_for(TaskField::ValueRating));
    assert_eq!(
        err.to_string(),
        "invalid task data: name must not be empty; \
         timeRating must be between 1 and 10, got 0; \
         valueRating must be between 1 and 10, got 11"
    );
}

#[test]
fn patch_recomputes_category_from_merged_pair() {
    let task = Task::create(fixed_id(), &NewTask::new("x", 2, 9)).unwrap();
    assert_eq!(task.category(), Category::B);

    let quicker = task
        .apply_patch(&TaskPatch::default().with_time_rating(8))
        .unwrap();
    assert_eq!(quicker.value_rating(), 9);
    assert_eq!(quicker.category(), Category::A);

    let cheaper = quicker
        .apply_patch(&TaskPatch::default().with_value_rating(1))
        .unwrap();
    assert_eq!(cheaper.time_rating(), 8);
    assert_eq!(cheaper.category(), Category::C);
}

#[test]
fn patch_failure_returns_no_partial_merge() {
    let task = Task::create(fixed_id(), &NewTask::new("keep", 5, 5)).unwrap();
    let patch = TaskPatch::default()
        .with_name("renamed")
        .with_value_rating(42);

    let err = task.apply_patch(&patch).unwrap_err();
    assert_eq!(
        err.issues()[0].kind,
        IssueKind::OutOfRange { value: 42 }
    );
    assert_eq!(task.name(), "keep");
}

#[test]
fn patch_sets_and_clears_description() {
    let task = Task::create(fixed_id(), &NewTask::new("x", 5, 5)).unwrap();

    let described = task
        .apply_patch(&TaskPatch::default().with_description("details"))
        .unwrap();
    assert_eq!(described.description(), Some("details"));

    let cleared = described
        .apply_patch(&TaskPatch::default().without_description())
        .unwrap();
    assert_eq!(cleared.description(), None);
}

#[test]
fn serialization_uses_expected_wire_fields() {
    let task = Task::create(
        fixed_id(),
        &NewTask::new("Write docs", 8, 10).with_description("API section"),
    )
    .unwrap();

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "id": "11111111-2222-4333-8444-555555555555",
            "name": "Write docs",
            "description": "API section",
            "timeRating": 8,
            "valueRating": 10,
            "category": "A"
        })
    );

    let decoded: Task = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, task);
}

#[test]
fn deserialize_rejects_category_that_disagrees_with_ratings() {
    let value = serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "name": "stale",
        "description": null,
        "timeRating": 1,
        "valueRating": 1,
        "category": "A"
    });

    let err = serde_json::from_value::<Task>(value).unwrap_err();
    assert!(err.to_string().contains("does not match ratings"));
}

#[test]
fn restore_reports_category_mismatch() {
    let err = Task::restore(fixed_id(), "x", None, 9, 9, Category::D).unwrap_err();
    assert_eq!(
        err.issues()[0].kind,
        IssueKind::CategoryMismatch {
            stored: Category::D,
            expected: Category::A,
        }
    );
}

#[test]
fn patch_helpers_describe_scope() {
    assert!(TaskPatch::default().is_empty());
    assert!(!TaskPatch::default().with_name("x").touches_ratings());
    assert!(TaskPatch::default().with_value_rating(3).touches_ratings());
    assert!(TaskPatch::default().with_time_rating(0).validate().is_err());
    assert!(TaskPatch::default().with_name("ok").validate().is_ok());
}
