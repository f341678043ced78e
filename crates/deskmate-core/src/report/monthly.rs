//! Weekly (or daily) → monthly merge.
//!
//! Unlike the weekly pass there is no start/end split: each project keeps
//! a running `final_progress` (last write wins) and every contributing
//! content fragment.
//!
//! The summary's in-progress count only includes items whose category is
//! exactly `progress`; `issue` and `plan` items are counted in the total
//! but in neither bucket.

use indexmap::IndexMap;

use super::{
    Category, MergedItem, MergedReport, ProjectStatus, ReportItem, CONTENT_SEPARATOR,
};

struct MonthlyTally {
    contents: Vec<String>,
    final_progress: u8,
    status: ProjectStatus,
}

impl MonthlyTally {
    fn seed(progress: Option<u8>, category: Category) -> Self {
        Self {
            contents: Vec::new(),
            final_progress: progress.unwrap_or(0),
            status: ProjectStatus::new(category),
        }
    }

    fn record(&mut self, content: &str, progress: Option<u8>, category: Category) {
        self.contents.push(content.to_string());
        if let Some(p) = progress {
            self.final_progress = p;
        }
        self.status = self.status.observe(category);
    }

    fn narrate(&self) -> String {
        let joined = self.contents.join(CONTENT_SEPARATOR);
        if self.status.is_completed() {
            format!("本月已完成。累计工作：{}", joined)
        } else {
            format!("当前进度{}%。本月工作：{}", self.final_progress, joined)
        }
    }
}

#[derive(Default)]
struct MonthlyMerge {
    projects: IndexMap<String, MonthlyTally>,
}

impl MonthlyMerge {
    fn add(&mut self, project: &str, content: &str, progress: Option<u8>, category: Category) {
        self.projects
            .entry(project.to_string())
            .or_insert_with(|| MonthlyTally::seed(progress, category))
            .record(content, progress, category);
    }

    fn finish(self) -> MergedReport {
        let items: Vec<MergedItem> = self
            .projects
            .into_iter()
            .map(|(project, tally)| MergedItem {
                content: tally.narrate(),
                progress: Some(tally.final_progress),
                category: tally.status.category(),
                project,
            })
            .collect();

        let total = items.len();
        let completed = items
            .iter()
            .filter(|i| i.category == Category::Completed)
            .count();
        let in_progress = items
            .iter()
            .filter(|i| i.category == Category::Progress)
            .count();
        let summary = format!(
            "本月共涉及{}个项目：已完成{}个，进行中{}个。整体工作进展顺利，各项目按计划推进。",
            total, completed, in_progress
        );

        MergedReport { items, summary }
    }
}

/// Merge weekly reports, given in chronological order.
pub fn aggregate_monthly(weeks: &[MergedReport]) -> MergedReport {
    let mut merge = MonthlyMerge::default();
    for item in weeks.iter().flat_map(|w| w.items.iter()) {
        merge.add(&item.project, &item.content, item.progress, item.category);
    }
    merge.finish()
}

/// Merge raw daily item sets straight into a month, skipping the weekly
/// pass. Each daily item contributes like a one-line weekly item.
pub fn aggregate_monthly_from_daily(days: &[Vec<ReportItem>]) -> MergedReport {
    let mut merge = MonthlyMerge::default();
    for item in days.iter().flatten() {
        merge.add(&item.project, &item.content, item.progress, item.category);
    }
    merge.finish()
}
