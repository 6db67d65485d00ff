//! Read-only reports: dashboard, insights, history, patterns, suggestions
//! and storage status.

use anyhow::{Context, Result};
use chrono::{Duration, Utc, Weekday};
use serde::Serialize;
use tidylist_core::analytics::dashboard::format_minutes;
use tidylist_core::analytics::{
    EstimateComparison, HistoryRecord, PageRequest, RecommendationKey, SuggestionKey,
};
use tidylist_core::db::StorageStats;
use tidylist_core::Config;

use crate::render::{
    bar, human_bytes, local_date, local_time, print_json, short_id, OutputFormat,
};
use crate::App;

const BAR_WIDTH: usize = 24;

pub fn dashboard(app: &App) -> Result<()> {
    let snapshot = app.db.load_snapshot(&app.user_id)?;
    let result = app.engine.compute(&snapshot, Utc::now());
    let stats = &result.dashboard;

    if app.format == OutputFormat::Json {
        return print_json(stats);
    }

    let offset = app.engine.offset();
    println!("Dashboard");
    println!("  Total tasks:      {}", stats.total_tasks);
    println!("  Completed:        {}", stats.completed_tasks);
    println!("  Pending:          {}", stats.pending_tasks);
    println!();
    println!(
        "This week ({} to {})",
        local_date(stats.week.start, offset),
        local_date(stats.week.end - Duration::seconds(1), offset)
    );
    println!("  Time spent:       {}", format_minutes(stats.total_minutes));
    for share in &stats.weekly_breakdown {
        println!(
            "  {:<18} {:>7} {:>4}%  {}",
            share.name,
            format_minutes(share.minutes),
            share.percentage,
            bar(share.percentage as u64, 100, BAR_WIDTH)
        );
    }
    if result.skipped_records > 0 {
        println!();
        println!("  ({} invalid task record(s) ignored)", result.skipped_records);
    }
    Ok(())
}

/// Insights as printed in JSON: engine output plus rendered text.
#[derive(Serialize)]
struct InsightsReport<'a> {
    #[serde(flatten)]
    insights: &'a tidylist_core::analytics::Insights,
    recommendation_text: Vec<&'static str>,
}

pub fn insights(app: &App) -> Result<()> {
    let snapshot = app.db.load_snapshot(&app.user_id)?;
    let result = app.engine.compute(&snapshot, Utc::now());
    let insights = &result.insights;
    let locale = app.config.profile.locale;

    let recommendation_text: Vec<&'static str> = insights
        .recommendations
        .iter()
        .map(|key: &RecommendationKey| locale.recommendation(*key))
        .collect();

    if app.format == OutputFormat::Json {
        return print_json(&InsightsReport {
            insights,
            recommendation_text,
        });
    }

    let trend = &insights.trend;
    println!("Insights (last {} days)", app.engine.policy().trend_window_days);
    println!(
        "  Completion rate:  {}% ({:+} vs previous {}%)",
        trend.current_rate, trend.weekly_change, trend.previous_rate
    );
    println!(
        "  Avg task time:    {} ({:+}m)",
        format_minutes(trend.average_task_minutes as u64),
        trend.time_change
    );
    println!("  Overdue:          {}", insights.overdue_count);
    println!("  High priority:    {}", insights.high_priority_count);
    println!(
        "  Burnout risk:     {} ({} tasks, {} over {} days)",
        locale.burnout(insights.burnout.risk),
        insights.burnout.signals.completed_tasks,
        format_minutes(insights.burnout.signals.total_minutes),
        insights.burnout.window.days()
    );
    println!();
    println!("Recommendations");
    for text in recommendation_text {
        println!("  - {text}");
    }
    Ok(())
}

/// One history row as printed in JSON.
#[derive(Serialize)]
struct HistoryRow<'a> {
    #[serde(flatten)]
    record: &'a HistoryRecord,
    comparison: Option<EstimateComparison>,
}

pub fn history(app: &App, page: u32, limit: u32) -> Result<()> {
    let request = PageRequest::new(page, limit).context("invalid page request")?;
    let history = app.db.list_history(&app.user_id, request)?;

    if app.format == OutputFormat::Json {
        let rows: Vec<_> = history
            .records
            .iter()
            .map(|record| HistoryRow {
                record,
                comparison: record.comparison(),
            })
            .collect();
        return print_json(&serde_json::json!({
            "records": rows,
            "pagination": history.pagination,
        }));
    }

    let offset = app.engine.offset();
    let locale = app.config.profile.locale;
    if history.records.is_empty() {
        println!("No history yet. Complete a task with --actual to record one.");
    }
    for record in &history.records {
        let task = &record.task;
        println!(
            "{}  {} {} ({})",
            local_time(record.entry.ended_at, offset),
            record.category.icon,
            task.title,
            short_id(&task.id)
        );
        let actual = task.actual_minutes.unwrap_or(0).max(0) as u64;
        let mut detail = format!("    took {}", format_minutes(actual));
        if let Some(comparison) = record.comparison() {
            detail.push_str(&format!(", {}", locale.estimate_comparison(comparison)));
        }
        println!("{detail}");
        if let Some(note) = &record.entry.note {
            println!("    note: {note}");
        }
    }
    let p = history.pagination;
    println!();
    println!(
        "Page {} of {} ({} entries)",
        p.page,
        p.total_pages.max(1),
        p.total
    );
    Ok(())
}

fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sun",
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
    }
}

pub fn patterns(app: &App) -> Result<()> {
    let snapshot = app.db.load_snapshot(&app.user_id)?;
    let patterns = app.engine.patterns(&snapshot, Utc::now());

    if app.format == OutputFormat::Json {
        return print_json(&patterns);
    }

    println!("Productivity patterns (last {} days)", patterns.window.days());
    match patterns.peak_hour {
        Some(hour) => println!("  Peak hour:    {hour:02}:00"),
        None => println!("  Peak hour:    -"),
    }
    match patterns.busiest_day {
        Some(day) => println!("  Busiest day:  {}", weekday_label(day)),
        None => println!("  Busiest day:  -"),
    }

    let max_hour = patterns.hourly.iter().map(|s| s.count).max().unwrap_or(0) as u64;
    if max_hour > 0 {
        println!();
        println!("By hour started");
        for (hour, slot) in patterns.hourly.iter().enumerate() {
            if slot.count > 0 {
                println!(
                    "  {hour:02}:00 {:>3}  {}",
                    slot.count,
                    bar(slot.count as u64, max_hour, BAR_WIDTH)
                );
            }
        }
    }

    let max_day = patterns.daily.iter().map(|s| s.count).max().unwrap_or(0) as u64;
    if max_day > 0 {
        println!();
        println!("By weekday completed");
        let week = [
            Weekday::Sun,
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
        ];
        for (slot, day) in patterns.daily.iter().zip(week) {
            println!(
                "  {} {:>3}  {}",
                weekday_label(day),
                slot.count,
                bar(slot.count as u64, max_day, BAR_WIDTH)
            );
        }
    }

    if !patterns.categories.is_empty() {
        println!();
        println!("By category");
        for c in &patterns.categories {
            println!(
                "  {:<18} {:>3} task(s)  total {:>7}  avg {:>6}  {:.1}/day",
                c.name,
                c.count,
                format_minutes(c.total_minutes),
                format_minutes(c.average_minutes as u64),
                c.per_day
            );
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct SuggestionRow {
    key: SuggestionKey,
    count: u64,
    title: String,
    prompt: String,
}

pub fn suggestions(app: &App) -> Result<()> {
    let snapshot = app.db.load_snapshot(&app.user_id)?;
    let locale = app.config.profile.locale;
    let rows: Vec<SuggestionRow> = app
        .engine
        .suggestions(&snapshot, Utc::now())
        .iter()
        .map(|s| SuggestionRow {
            key: s.key,
            count: s.count,
            title: locale.suggestion_title(s),
            prompt: locale.suggestion_prompt(s),
        })
        .collect();

    if app.format == OutputFormat::Json {
        return print_json(&rows);
    }

    println!("Suggestions");
    for row in &rows {
        println!("  * {}", row.title);
        println!("    tidylist ask \"{}\"", row.prompt);
    }
    Ok(())
}

#[derive(Serialize)]
struct StatusReport {
    user_id: String,
    config_path: String,
    database_path: String,
    log_path: String,
    #[serde(flatten)]
    storage: StorageStats,
}

pub fn status(app: &App) -> Result<()> {
    let storage = app
        .db
        .get_storage_stats(&app.user_id)
        .context("failed to read storage stats")?;
    let report = StatusReport {
        user_id: app.user_id.clone(),
        config_path: Config::config_path().display().to_string(),
        database_path: Config::database_path().display().to_string(),
        log_path: tidylist_core::logging::log_file_path()
            .display()
            .to_string(),
        storage,
    };

    if app.format == OutputFormat::Json {
        return print_json(&report);
    }

    let s = &report.storage;
    println!("User:      {}", report.user_id);
    println!("Config:    {}", report.config_path);
    println!(
        "Database:  {} ({})",
        report.database_path,
        human_bytes(s.database_size_bytes)
    );
    println!("Logs:      {}", report.log_path);
    println!();
    println!("  Categories:       {}", s.categories);
    println!("  Tasks:            {}", s.tasks);
    println!("  History entries:  {}", s.history_entries);
    println!("  TidyBot answers:  {}", s.tidybot_exchanges);
    Ok(())
}
