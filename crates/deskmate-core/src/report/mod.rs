//! Hierarchical work-report merging: daily → weekly → monthly.
//!
//! Daily [`ReportItem`]s are produced upstream, one set per calendar day.
//! [`weekly::aggregate_weekly`] folds a week of them into one
//! [`MergedItem`] per project, and [`monthly::aggregate_monthly`] folds
//! weekly [`MergedReport`]s (or raw daily sets) into a month.
//!
//! Both aggregators keep projects in first-seen order and derive the
//! output category through [`ProjectStatus`], so a project that reports
//! `completed` once stays completed for the rest of the pass.

pub mod monthly;
pub mod weekly;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

pub use monthly::{aggregate_monthly, aggregate_monthly_from_daily};
pub use weekly::aggregate_weekly;

/// Separator between merged content fragments.
pub(crate) const CONTENT_SEPARATOR: &str = "；";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Progress,
    Completed,
    Issue,
    Plan,
}

/// One line of a daily report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportItem {
    pub project: String,
    pub content: String,
    /// Percent complete, `0..=100`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    pub category: Category,
}

impl ReportItem {
    /// Reject progress values above 100.
    pub fn validate(&self) -> Result<()> {
        check_progress(&self.project, self.progress)
    }
}

fn check_progress(project: &str, progress: Option<u8>) -> Result<()> {
    if let Some(p) = progress {
        if p > 100 {
            bail!(
                "progress for project '{}' must be within 0..=100, got {}",
                project,
                p
            );
        }
    }
    Ok(())
}

/// One project's line in a weekly or monthly report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedItem {
    pub project: String,
    /// Synthesised narrative.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    pub category: Category,
}

/// The result of an aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedReport {
    pub items: Vec<MergedItem>,
    pub summary: String,
}

impl MergedItem {
    /// Reject progress values above 100.
    pub fn validate(&self) -> Result<()> {
        check_progress(&self.project, self.progress)
    }
}

impl MergedReport {
    /// Validate every item.
    pub fn validate(&self) -> Result<()> {
        self.items.iter().try_for_each(MergedItem::validate)
    }

    pub fn completed_count(&self) -> usize {
        self.count(Category::Completed)
    }

    pub fn count(&self, category: Category) -> usize {
        self.items.iter().filter(|i| i.category == category).count()
    }
}

impl From<ReportItem> for MergedItem {
    fn from(item: ReportItem) -> Self {
        Self {
            project: item.project,
            content: item.content,
            progress: item.progress,
            category: item.category,
        }
    }
}

/// Per-project category over one aggregation pass.
///
/// `Open` carries the category the project was first seen with. Any
/// `completed` observation moves to `Completed`, which is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    Open(Category),
    Completed,
}

impl ProjectStatus {
    pub fn new(first: Category) -> Self {
        match first {
            Category::Completed => ProjectStatus::Completed,
            other => ProjectStatus::Open(other),
        }
    }

    pub fn observe(self, category: Category) -> Self {
        match (self, category) {
            (ProjectStatus::Completed, _) => ProjectStatus::Completed,
            (_, Category::Completed) => ProjectStatus::Completed,
            (open, _) => open,
        }
    }

    pub fn is_completed(self) -> bool {
        self == ProjectStatus::Completed
    }

    pub fn category(self) -> Category {
        match self {
            ProjectStatus::Open(c) => c,
            ProjectStatus::Completed => Category::Completed,
        }
    }
}
