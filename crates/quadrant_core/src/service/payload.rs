//! JSON payload decoding for create/update requests.
//!
//! # Responsibility
//! - Turn `{ name, description?, timeRating, valueRating }` objects into
//!   typed `NewTask`/`TaskPatch` values.
//! - Report type errors per field instead of failing on the first one.
//!
//! # Invariants
//! - Unknown keys (`id`, `category`, ...) are ignored, never applied.
//! - Integral floats such as `5.0` count as integers; `5.5` does not.
//! - Range and emptiness rules are the same ones the store enforces.

use crate::model::task::{
    check_name, check_rating, FieldIssue, IssueKind, NewTask, TaskField, TaskPatch,
    TaskValidationError,
};
use serde_json::{Map, Number, Value};

const NAME_KEY: &str = "name";
const DESCRIPTION_KEY: &str = "description";
const TIME_RATING_KEY: &str = "timeRating";
const VALUE_RATING_KEY: &str = "valueRating";

/// Decodes a full create payload.
///
/// # Errors
/// Returns every offending field: missing keys, wrong JSON types,
/// non-integral ratings, out-of-range ratings and blank names.
pub fn parse_new_task(payload: &Value) -> Result<NewTask, TaskValidationError> {
    let object = as_object(payload)?;
    let mut issues = Vec::new();

    let name = required(object, NAME_KEY, TaskField::Name, &mut issues, read_name);
    let description = optional(
        object,
        DESCRIPTION_KEY,
        TaskField::Description,
        &mut issues,
        read_description,
    )
    .flatten();
    let time_rating = required(
        object,
        TIME_RATING_KEY,
        TaskField::TimeRating,
        &mut issues,
        read_rating,
    );
    let value_rating = required(
        object,
        VALUE_RATING_KEY,
        TaskField::ValueRating,
        &mut issues,
        read_rating,
    );

    match (name, time_rating, value_rating) {
        (Some(name), Some(time_rating), Some(value_rating)) if issues.is_empty() => Ok(NewTask {
            name,
            description,
            time_rating,
            value_rating,
        }),
        _ => Err(TaskValidationError::new(issues)),
    }
}

/// Decodes a partial update payload. Absent keys stay unchanged;
/// `"description": null` clears the description.
pub fn parse_task_patch(payload: &Value) -> Result<TaskPatch, TaskValidationError> {
    let object = as_object(payload)?;
    let mut issues = Vec::new();

    let patch = TaskPatch {
        name: optional(object, NAME_KEY, TaskField::Name, &mut issues, read_name),
        description: optional(
            object,
            DESCRIPTION_KEY,
            TaskField::Description,
            &mut issues,
            read_description,
        ),
        time_rating: optional(
            object,
            TIME_RATING_KEY,
            TaskField::TimeRating,
            &mut issues,
            read_rating,
        ),
        value_rating: optional(
            object,
            VALUE_RATING_KEY,
            TaskField::ValueRating,
            &mut issues,
            read_rating,
        ),
    };

    if issues.is_empty() {
        Ok(patch)
    } else {
        Err(TaskValidationError::new(issues))
    }
}

fn as_object(payload: &Value) -> Result<&Map<String, Value>, TaskValidationError> {
    payload.as_object().ok_or_else(|| {
        TaskValidationError::single(
            TaskField::Payload,
            IssueKind::WrongType {
                expected: "an object",
            },
        )
    })
}

type Reader<T> = fn(TaskField, &Value) -> Result<T, FieldIssue>;

fn required<T>(
    object: &Map<String, Value>,
    key: &str,
    field: TaskField,
    issues: &mut Vec<FieldIssue>,
    read: Reader<T>,
) -> Option<T> {
    match object.get(key) {
        Some(value) => record(issues, read(field, value)),
        None => {
            issues.push(FieldIssue::new(field, IssueKind::Missing));
            None
        }
    }
}

fn optional<T>(
    object: &Map<String, Value>,
    key: &str,
    field: TaskField,
    issues: &mut Vec<FieldIssue>,
    read: Reader<T>,
) -> Option<T> {
    object
        .get(key)
        .and_then(|value| record(issues, read(field, value)))
}

fn record<T>(issues: &mut Vec<FieldIssue>, result: Result<T, FieldIssue>) -> Option<T> {
    result.map_err(|issue| issues.push(issue)).ok()
}

fn read_name(field: TaskField, value: &Value) -> Result<String, FieldIssue> {
    let text = value.as_str().ok_or_else(|| wrong_type(field, "a string"))?;
    // Trimming happens again in the model; the check here only surfaces the
    // issue alongside type errors from other fields.
    check_name(text)?;
    Ok(text.to_string())
}

fn read_description(field: TaskField, value: &Value) -> Result<Option<String>, FieldIssue> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text.clone())),
        _ => Err(wrong_type(field, "a string or null")),
    }
}

fn read_rating(field: TaskField, value: &Value) -> Result<i64, FieldIssue> {
    let Value::Number(number) = value else {
        return Err(wrong_type(field, "an integer"));
    };

    let rating = match (number.as_i64(), number.as_u64()) {
        (Some(integer), _) => integer,
        (None, Some(_)) => return Err(out_of_range_literal(field, number)),
        (None, None) => {
            let float = number
                .as_f64()
                .filter(|float| float.is_finite() && float.fract() == 0.0)
                .ok_or_else(|| FieldIssue::new(field, IssueKind::NotAnInteger))?;
            integral_float(float).ok_or_else(|| out_of_range_literal(field, number))?
        }
    };
    check_rating(field, rating)?;
    Ok(rating)
}

/// Converts an integral float when it fits `i64` exactly.
fn integral_float(value: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    if value >= i64::MIN as f64 && value < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

fn out_of_range_literal(field: TaskField, number: &Number) -> FieldIssue {
    FieldIssue::new(
        field,
        IssueKind::OutOfRangeLiteral {
            literal: number.to_string(),
        },
    )
}

fn wrong_type(field: TaskField, expected: &'static str) -> FieldIssue {
    FieldIssue::new(field, IssueKind::WrongType { expected })
}
