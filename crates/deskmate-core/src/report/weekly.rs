//! Daily → weekly merge.
//!
//! Each project keeps the progress it was first seen with (`start`) and
//! the last progress reported during the week (`end`). The merged content
//! narrates the delta:
//!
//! | Status | Content |
//! |--------|---------|
//! | completed | `本周完成。主要工作：` + last two contents joined by `；` |
//! | delta > 0 | `本周推进{delta}%（当前进度{end}%）。` + last content |
//! | otherwise | last content |

use indexmap::IndexMap;

use super::{Category, MergedItem, MergedReport, ProjectStatus, ReportItem, CONTENT_SEPARATOR};

struct WeeklyTally {
    contents: Vec<String>,
    start_progress: u8,
    end_progress: u8,
    status: ProjectStatus,
}

impl WeeklyTally {
    fn seed(item: &ReportItem) -> Self {
        let progress = item.progress.unwrap_or(0);
        Self {
            contents: Vec::new(),
            start_progress: progress,
            end_progress: progress,
            status: ProjectStatus::new(item.category),
        }
    }

    fn record(&mut self, item: &ReportItem) {
        self.contents.push(item.content.clone());
        if let Some(p) = item.progress {
            self.end_progress = p;
        }
        self.status = self.status.observe(item.category);
    }

    fn narrate(&self) -> String {
        let latest = self.contents.last().cloned().unwrap_or_default();
        let delta = i32::from(self.end_progress) - i32::from(self.start_progress);

        if self.status.is_completed() {
            let recent = &self.contents[self.contents.len().saturating_sub(2)..];
            format!("本周完成。主要工作：{}", recent.join(CONTENT_SEPARATOR))
        } else if delta > 0 {
            format!(
                "本周推进{}%（当前进度{}%）。{}",
                delta, self.end_progress, latest
            )
        } else {
            latest
        }
    }
}

/// Merge a week of daily item sets, given in chronological order.
pub fn aggregate_weekly(days: &[Vec<ReportItem>]) -> MergedReport {
    let mut projects: IndexMap<String, WeeklyTally> = IndexMap::new();

    for item in days.iter().flatten() {
        projects
            .entry(item.project.clone())
            .or_insert_with(|| WeeklyTally::seed(item))
            .record(item);
    }

    let items: Vec<MergedItem> = projects
        .iter()
        .map(|(project, tally)| MergedItem {
            project: project.clone(),
            content: tally.narrate(),
            progress: Some(tally.end_progress),
            category: tally.status.category(),
        })
        .collect();

    let completed = items.iter().filter(|i| i.category == Category::Completed).count();
    let summary = format!(
        "本周共推进{}个项目，完成{}个，其余项目按计划推进中。",
        items.len(),
        completed
    );

    MergedReport { items, summary }
}
