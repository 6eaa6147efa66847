//! Read-only projections over task snapshots.
//!
//! # Responsibility
//! - Count tasks per quadrant.
//! - Group tasks by quadrant in priority order for lists and exports.
//! - Render a plain-text report of the grouped list.
//!
//! # Invariants
//! - Inputs are snapshots fetched from the store; nothing here mutates.
//! - Groups follow `Category::ALL` order; empty groups are skipped.
//! - Within a group, tasks keep the order they were given in.

use crate::model::task::{Category, Task, MAX_RATING};
use std::fmt::Write;

const REPORT_TITLE: &str = "Task prioritization";

/// Number of tasks per quadrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategorySummary {
    counts: [usize; 4],
}

impl CategorySummary {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut counts = [0; 4];
        for task in tasks {
            counts[task.category().index()] += 1;
        }
        Self { counts }
    }

    /// Builds a summary from counts in `Category::ALL` order, as returned by
    /// `TaskStore::category_counts`.
    pub fn from_counts(counts: [usize; 4]) -> Self {
        Self { counts }
    }

    pub fn count(&self, category: Category) -> usize {
        self.counts[category.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Tasks of one quadrant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup<'a> {
    pub category: Category,
    pub tasks: Vec<&'a Task>,
}

/// Groups tasks by quadrant, highest priority first.
pub fn group_by_category(tasks: &[Task]) -> Vec<CategoryGroup<'_>> {
    Category::ALL
        .iter()
        .map(|&category| CategoryGroup {
            category,
            tasks: tasks
                .iter()
                .filter(|task| task.category() == category)
                .collect(),
        })
        .filter(|group| !group.tasks.is_empty())
        .collect()
}

/// Renders the grouped task list as plain text.
///
/// Returns an empty string for an empty task list, there is nothing to
/// export.
pub fn render_text_report(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return String::new();
    }

    let summary = CategorySummary::from_tasks(tasks);
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{REPORT_TITLE}");
    let _ = writeln!(out, "{}", summary_line(&summary));

    for group in group_by_category(tasks) {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", group.category.title());
        let _ = writeln!(out, "  {}", group.category.advice());
        for task in group.tasks {
            let _ = writeln!(out, "  - {}", task.name());
            if let Some(description) = task.description() {
                for line in description.lines() {
                    let _ = writeln!(out, "      {line}");
                }
            }
            let _ = writeln!(
                out,
                "      time: {}/{MAX_RATING} ({}), value: {}/{MAX_RATING} ({})",
                task.time_rating(),
                task.time_band().time_label(),
                task.value_rating(),
                task.value_band().value_label()
            );
        }
    }

    out
}

/// One-line count overview, e.g. `Total: 3 (A: 1, B: 0, C: 2, D: 0)`.
pub fn summary_line(summary: &CategorySummary) -> String {
    let parts = Category::ALL
        .iter()
        .map(|&category| format!("{category}: {}", summary.count(category)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("Total: {} ({parts})", summary.total())
}

#[cfg(test)]
mod tests {
    use super::{group_by_category, render_text_report, summary_line, CategorySummary};
    use crate::model::task::{Category, NewTask, Task};
    use uuid::Uuid;

    fn task(name: &str, time: i64, value: i64) -> Task {
        Task::create(Uuid::new_v4(), &NewTask::new(name, time, value)).unwrap()
    }

    #[test]
    fn summary_counts_each_category() {
        let tasks = vec![task("a1", 9, 9), task("d1", 1, 1), task("d2", 2, 2)];
        let summary = CategorySummary::from_tasks(&tasks);

        assert_eq!(summary.count(Category::A), 1);
        assert_eq!(summary.count(Category::B), 0);
        assert_eq!(summary.count(Category::D), 2);
        assert_eq!(summary.total(), 3);
        assert_eq!(summary_line(&summary), "Total: 3 (A: 1, B: 0, C: 0, D: 2)");
    }

    #[test]
    fn groups_follow_priority_and_skip_empty() {
        let tasks = vec![
            task("d1", 1, 1),
            task("a1", 10, 10),
            task("c1", 9, 2),
            task("a2", 8, 8),
        ];
        let groups = group_by_category(&tasks);

        let categories: Vec<_> = groups.iter().map(|group| group.category).collect();
        assert_eq!(categories, vec![Category::A, Category::C, Category::D]);
        let a_names: Vec<_> = groups[0].tasks.iter().map(|task| task.name()).collect();
        assert_eq!(a_names, vec!["a1", "a2"]);
    }

    #[test]
    fn text_report_lists_groups_and_ratings() {
        let described = Task::create(
            Uuid::new_v4(),
            &NewTask::new("Plan roadmap", 3, 9).with_description("Q3 themes"),
        )
        .unwrap();
        let tasks = vec![task("Reply to email", 9, 2), described];

        let report = render_text_report(&tasks);

        assert!(report.starts_with("Task prioritization\nTotal: 2 (A: 0, B: 1, C: 1, D: 0)\n"));
        let b_at = report.find("B - Time-consuming with high value").unwrap();
        let c_at = report.find("C - Quick with low value").unwrap();
        assert!(b_at < c_at);
        assert!(report.contains("  - Plan roadmap\n      Q3 themes\n"));
        assert!(report.contains("time: 3/10 (time-consuming), value: 9/10 (high value)"));
        assert!(report.contains("time: 9/10 (quick), value: 2/10 (low value)"));
    }

    #[test]
    fn empty_report_is_empty() {
        assert!(render_text_report(&[]).is_empty());
    }
}
