//! Task domain model and quadrant classification.
//!
//! # Responsibility
//! - Define the canonical task record shared by store, reports and callers.
//! - Own the quadrant rule that derives `Category` from the two ratings.
//! - Provide field-level validation used by create, update and read paths.
//!
//! # Invariants
//! - `Task::category` always equals `classify(time_rating, value_rating)`.
//! - Ratings stay within `MIN_RATING..=MAX_RATING`.
//! - `Task::name` is trimmed and never empty.
//! - `id` is never nil and never changes after creation.
//!
//! # See also
//! - `crate::service::task_store` for the serialized write path.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier assigned by the store on creation.
pub type TaskId = Uuid;

/// Lowest accepted rating on both scales.
pub const MIN_RATING: u8 = 1;
/// Highest accepted rating on both scales.
pub const MAX_RATING: u8 = 10;
/// Inclusive lower bound of the "quick" time band.
pub const QUICK_THRESHOLD: u8 = 8;
/// Inclusive lower bound of the "high value" band.
pub const HIGH_VALUE_THRESHOLD: u8 = 8;

const LOW_BAND_CEILING: u8 = 3;
const HIGH_BAND_FLOOR: u8 = 8;

/// Priority quadrant derived from `(time_rating, value_rating)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Quick and high value.
    A,
    /// Time-consuming and high value.
    B,
    /// Quick and low value.
    C,
    /// Time-consuming and low value.
    D,
}

impl Category {
    /// All categories in priority order.
    pub const ALL: [Category; 4] = [Self::A, Self::B, Self::C, Self::D];

    /// Stable single-letter label used for storage and wire output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }

    /// Parses a stored single-letter label.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            _ => None,
        }
    }

    /// Position in `Category::ALL`.
    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
        }
    }

    /// Heading used by grouped listings and reports.
    pub fn title(self) -> &'static str {
        match self {
            Self::A => "A - Quick with high value",
            Self::B => "B - Time-consuming with high value",
            Self::C => "C - Quick with low value",
            Self::D => "D - Time-consuming with low value",
        }
    }

    /// Short recommendation shown under the heading.
    pub fn advice(self) -> &'static str {
        match self {
            Self::A => "Do these first. Quick wins.",
            Self::B => "Plan time for these and look for ways to raise their impact.",
            Self::C => "Do these when there is time to spare.",
            Self::D => "Automate or consider dropping.",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a rating pair to its quadrant.
///
/// Total over the rating grid; callers are expected to pass values inside
/// `MIN_RATING..=MAX_RATING`, range checks live in validation.
pub fn classify(time_rating: u8, value_rating: u8) -> Category {
    let is_quick = time_rating >= QUICK_THRESHOLD;
    let is_high_value = value_rating >= HIGH_VALUE_THRESHOLD;

    match (is_quick, is_high_value) {
        (true, true) => Category::A,
        (false, true) => Category::B,
        (true, false) => Category::C,
        (false, false) => Category::D,
    }
}

/// Coarse three-step band of a rating, used for human-readable labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingBand {
    Low,
    Medium,
    High,
}

impl RatingBand {
    pub fn of(rating: u8) -> Self {
        if rating <= LOW_BAND_CEILING {
            Self::Low
        } else if rating >= HIGH_BAND_FLOOR {
            Self::High
        } else {
            Self::Medium
        }
    }

    /// Label for the time scale (higher rating means quicker).
    pub fn time_label(self) -> &'static str {
        match self {
            Self::Low => "time-consuming",
            Self::Medium => "medium",
            Self::High => "quick",
        }
    }

    /// Label for the value scale.
    pub fn value_label(self) -> &'static str {
        match self {
            Self::Low => "low value",
            Self::Medium => "medium value",
            Self::High => "high value",
        }
    }
}

/// Task field referenced by validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskField {
    Id,
    Name,
    Description,
    TimeRating,
    ValueRating,
    Category,
    /// The payload as a whole (e.g. not a JSON object).
    Payload,
}

impl TaskField {
    /// Wire name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Description => "description",
            Self::TimeRating => "timeRating",
            Self::ValueRating => "valueRating",
            Self::Category => "category",
            Self::Payload => "payload",
        }
    }
}

/// What is wrong with one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    Missing,
    Empty,
    OutOfRange { value: i64 },
    /// Integral input too large for `i64`, kept as the caller wrote it.
    OutOfRangeLiteral { literal: String },
    NotAnInteger,
    WrongType { expected: &'static str },
    Malformed,
    NilId,
    CategoryMismatch { stored: Category, expected: Category },
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: TaskField,
    pub kind: IssueKind,
}

impl FieldIssue {
    pub fn new(field: TaskField, kind: IssueKind) -> Self {
        Self { field, kind }
    }
}

impl Display for FieldIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let field = self.field.as_str();
        match &self.kind {
            IssueKind::Missing => write!(f, "{field} is required"),
            IssueKind::Empty => write!(f, "{field} must not be empty"),
            IssueKind::OutOfRange { value } => write!(
                f,
                "{field} must be between {MIN_RATING} and {MAX_RATING}, got {value}"
            ),
            IssueKind::OutOfRangeLiteral { literal } => write!(
                f,
                "{field} must be between {MIN_RATING} and {MAX_RATING}, got {literal}"
            ),
            IssueKind::NotAnInteger => write!(f, "{field} must be an integer"),
            IssueKind::WrongType { expected } => write!(f, "{field} must be {expected}"),
            IssueKind::Malformed => write!(f, "{field} is malformed"),
            IssueKind::NilId => write!(f, "{field} must not be the nil uuid"),
            IssueKind::CategoryMismatch { stored, expected } => write!(
                f,
                "{field} `{stored}` does not match ratings (expected `{expected}`)"
            ),
        }
    }
}

/// Structured validation failure listing every offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskValidationError {
    issues: Vec<FieldIssue>,
}

impl TaskValidationError {
    pub fn new(issues: Vec<FieldIssue>) -> Self {
        Self { issues }
    }

    pub fn single(field: TaskField, kind: IssueKind) -> Self {
        Self::new(vec![FieldIssue::new(field, kind)])
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    /// Returns whether any issue refers to `field`.
    pub fn has_issue_for(&self, field: TaskField) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }

    fn check(issues: Vec<FieldIssue>) -> Result<(), Self> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Self::new(issues))
        }
    }
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("invalid task data: ")?;
        for (index, issue) in self.issues.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl Error for TaskValidationError {}

/// Parses a task id from user input.
///
/// # Errors
/// - `Malformed` when the text is not a UUID.
/// - `NilId` for the all-zero UUID, which is never assigned.
pub fn parse_task_id(value: &str) -> Result<TaskId, TaskValidationError> {
    let id = Uuid::parse_str(value.trim())
        .map_err(|_| TaskValidationError::single(TaskField::Id, IssueKind::Malformed))?;
    if id.is_nil() {
        return Err(TaskValidationError::single(TaskField::Id, IssueKind::NilId));
    }
    Ok(id)
}

pub(crate) fn check_name(value: &str) -> Result<String, FieldIssue> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldIssue::new(TaskField::Name, IssueKind::Empty));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn check_rating(field: TaskField, value: i64) -> Result<u8, FieldIssue> {
    u8::try_from(value)
        .ok()
        .filter(|rating| (MIN_RATING..=MAX_RATING).contains(rating))
        .ok_or(FieldIssue::new(field, IssueKind::OutOfRange { value }))
}

fn collect<T>(issues: &mut Vec<FieldIssue>, result: Result<T, FieldIssue>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(issue) => {
            issues.push(issue);
            None
        }
    }
}

/// Input for creating a task.
///
/// Ratings are wide integers so out-of-range input is representable and
/// rejected by validation instead of being truncated by the type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub name: String,
    pub description: Option<String>,
    pub time_rating: i64,
    pub value_rating: i64,
}

struct CheckedFields {
    name: String,
    description: Option<String>,
    time_rating: u8,
    value_rating: u8,
}

impl NewTask {
    pub fn new(name: impl Into<String>, time_rating: i64, value_rating: i64) -> Self {
        Self {
            name: name.into(),
            description: None,
            time_rating,
            value_rating,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Checks every field and reports all offending ones at once.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        self.checked().map(|_| ())
    }

    fn checked(&self) -> Result<CheckedFields, TaskValidationError> {
        let mut issues = Vec::new();
        let name = collect(&mut issues, check_name(&self.name));
        let time_rating = collect(
            &mut issues,
            check_rating(TaskField::TimeRating, self.time_rating),
        );
        let value_rating = collect(
            &mut issues,
            check_rating(TaskField::ValueRating, self.value_rating),
        );

        match (name, time_rating, value_rating) {
            (Some(name), Some(time_rating), Some(value_rating)) => Ok(CheckedFields {
                name,
                description: self.description.clone(),
                time_rating,
                value_rating,
            }),
            _ => Err(TaskValidationError::new(issues)),
        }
    }
}

/// Partial update input. `None` leaves a field unchanged.
///
/// `description: Some(None)` clears the description.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub time_rating: Option<i64>,
    pub value_rating: Option<i64>,
}

impl TaskPatch {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    pub fn without_description(mut self) -> Self {
        self.description = Some(None);
        self
    }

    pub fn with_time_rating(mut self, rating: i64) -> Self {
        self.time_rating = Some(rating);
        self
    }

    pub fn with_value_rating(mut self, rating: i64) -> Self {
        self.value_rating = Some(rating);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.time_rating.is_none()
            && self.value_rating.is_none()
    }

    pub fn touches_ratings(&self) -> bool {
        self.time_rating.is_some() || self.value_rating.is_some()
    }

    /// Checks only the supplied fields.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        let mut issues = Vec::new();
        if let Some(name) = &self.name {
            collect(&mut issues, check_name(name));
        }
        if let Some(rating) = self.time_rating {
            collect(&mut issues, check_rating(TaskField::TimeRating, rating));
        }
        if let Some(rating) = self.value_rating {
            collect(&mut issues, check_rating(TaskField::ValueRating, rating));
        }
        TaskValidationError::check(issues)
    }
}

/// Canonical task record.
///
/// Fields are private so the derived `category` cannot drift from the
/// ratings; every constructor classifies or verifies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TaskRecord")]
pub struct Task {
    id: TaskId,
    name: String,
    description: Option<String>,
    time_rating: u8,
    value_rating: u8,
    category: Category,
}

impl Task {
    /// Builds a new record from validated input and classifies it.
    ///
    /// # Errors
    /// - `NilId` when `id` is nil.
    /// - Any field issue reported by `NewTask::validate`.
    pub fn create(id: TaskId, input: &NewTask) -> Result<Self, TaskValidationError> {
        if id.is_nil() {
            return Err(TaskValidationError::single(TaskField::Id, IssueKind::NilId));
        }
        let fields = input.checked()?;
        Ok(Self {
            id,
            name: fields.name,
            description: fields.description,
            time_rating: fields.time_rating,
            value_rating: fields.value_rating,
            category: classify(fields.time_rating, fields.value_rating),
        })
    }

    /// Rebuilds a record from persisted or serialized parts.
    ///
    /// Unlike `create`, the category is supplied and must agree with the
    /// ratings; a mismatch is reported rather than silently corrected.
    pub fn restore(
        id: TaskId,
        name: &str,
        description: Option<&str>,
        time_rating: i64,
        value_rating: i64,
        category: Category,
    ) -> Result<Self, TaskValidationError> {
        let mut issues = Vec::new();
        if id.is_nil() {
            issues.push(FieldIssue::new(TaskField::Id, IssueKind::NilId));
        }
        let name = collect(&mut issues, check_name(name));
        let time = collect(
            &mut issues,
            check_rating(TaskField::TimeRating, time_rating),
        );
        let value = collect(
            &mut issues,
            check_rating(TaskField::ValueRating, value_rating),
        );

        if let (Some(time), Some(value)) = (time, value) {
            let expected = classify(time, value);
            if expected != category {
                issues.push(FieldIssue::new(
                    TaskField::Category,
                    IssueKind::CategoryMismatch {
                        stored: category,
                        expected,
                    },
                ));
            }
        }

        match (name, time, value) {
            (Some(name), Some(time_rating), Some(value_rating)) if issues.is_empty() => {
                Ok(Self {
                    id,
                    name,
                    description: description.map(str::to_string),
                    time_rating,
                    value_rating,
                    category,
                })
            }
            _ => Err(TaskValidationError::new(issues)),
        }
    }

    /// Returns a copy with `patch` merged in and the category re-derived
    /// from the merged rating pair.
    ///
    /// On error `self` is untouched and no partial merge is returned.
    pub fn apply_patch(&self, patch: &TaskPatch) -> Result<Self, TaskValidationError> {
        let mut issues = Vec::new();
        let name = match &patch.name {
            Some(name) => collect(&mut issues, check_name(name)),
            None => Some(self.name.clone()),
        };
        let time = match patch.time_rating {
            Some(rating) => collect(&mut issues, check_rating(TaskField::TimeRating, rating)),
            None => Some(self.time_rating),
        };
        let value = match patch.value_rating {
            Some(rating) => collect(&mut issues, check_rating(TaskField::ValueRating, rating)),
            None => Some(self.value_rating),
        };
        let description = match &patch.description {
            Some(description) => description.clone(),
            None => self.description.clone(),
        };

        match (name, time, value) {
            (Some(name), Some(time_rating), Some(value_rating)) => Ok(Self {
                id: self.id,
                name,
                description,
                time_rating,
                value_rating,
                category: classify(time_rating, value_rating),
            }),
            _ => Err(TaskValidationError::new(issues)),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn time_rating(&self) -> u8 {
        self.time_rating
    }

    pub fn value_rating(&self) -> u8 {
        self.value_rating
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn time_band(&self) -> RatingBand {
        RatingBand::of(self.time_rating)
    }

    pub fn value_band(&self) -> RatingBand {
        RatingBand::of(self.value_rating)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: TaskId,
    name: String,
    #[serde(default)]
    description: Option<String>,
    time_rating: i64,
    value_rating: i64,
    category: Category,
}

impl TryFrom<TaskRecord> for Task {
    type Error = TaskValidationError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        Task::restore(
            record.id,
            &record.name,
            record.description.as_deref(),
            record.time_rating,
            record.value_rating,
            record.category,
        )
    }
}
