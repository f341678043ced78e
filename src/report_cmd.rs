//! `dm report weekly|monthly`: merge report files.
//!
//! Input files are JSON:
//!
//! | Command | File shape |
//! |---------|------------|
//! | `weekly` | `[[ReportItem, ...], ...]`, one inner array per day |
//! | `monthly` | `[MergedReport, ...]`, one per week |
//! | `monthly --from-daily` | same as `weekly` |

use anyhow::{Context, Result};
use std::path::Path;

use deskmate_core::report::{
    aggregate_monthly, aggregate_monthly_from_daily, aggregate_weekly, Category, MergedReport,
    ReportItem,
};

pub fn run_report_weekly(path: &Path, json: bool) -> Result<()> {
    let days = load_daily_sets(path)?;
    print_report(&aggregate_weekly(&days), json)
}

pub fn run_report_monthly(path: &Path, from_daily: bool, json: bool) -> Result<()> {
    let report = if from_daily {
        aggregate_monthly_from_daily(&load_daily_sets(path)?)
    } else {
        aggregate_monthly(&load_weekly_reports(path)?)
    };
    print_report(&report, json)
}

/// Read and validate a file of daily item sets.
pub fn load_daily_sets(path: &Path) -> Result<Vec<Vec<ReportItem>>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read report file: {}", path.display()))?;
    let days: Vec<Vec<ReportItem>> = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid daily report file: {}", path.display()))?;
    for item in days.iter().flatten() {
        item.validate()?;
    }
    Ok(days)
}

pub fn load_weekly_reports(path: &Path) -> Result<Vec<MergedReport>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read report file: {}", path.display()))?;
    let weeks: Vec<MergedReport> = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid weekly report file: {}", path.display()))?;
    for week in &weeks {
        week.validate()?;
    }
    Ok(weeks)
}

fn print_report(report: &MergedReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", render_report(report));
    }
    Ok(())
}

/// Plain-text rendering: the summary, then one numbered entry per project.
pub fn render_report(report: &MergedReport) -> String {
    let mut out = format!("{}\n", report.summary);
    for (i, item) in report.items.iter().enumerate() {
        out.push('\n');
        let progress = item
            .progress
            .map(|p| format!("，进度 {}%", p))
            .unwrap_or_default();
        out.push_str(&format!(
            "{}. {}（{}{}）\n",
            i + 1,
            item.project,
            category_label(item.category),
            progress
        ));
        out.push_str(&format!("   {}\n", item.content));
    }
    out
}

fn category_label(category: Category) -> &'static str {
    match category {
        Category::Progress => "进行中",
        Category::Completed => "已完成",
        Category::Issue => "问题",
        Category::Plan => "计划",
    }
}
