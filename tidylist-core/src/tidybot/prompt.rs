//! Prompt construction
//!
//! Prompts are plain English built only from the context, so the same
//! context always yields the same prompt (and prompt hash). The answer
//! language is requested explicitly at the end.

use chrono::{DateTime, FixedOffset, Utc, Weekday};

use super::context::TidyBotContext;
use super::{InsightKind, TidyBotRequest};
use crate::analytics::TaskMetric;
use crate::locale::Locale;

const PREAMBLE: &str =
    "You are TidyBot, the productivity assistant built into the TidyList task manager.";

/// Build the prompt for `request`.
pub fn build_prompt(request: &TidyBotRequest, ctx: &TidyBotContext, locale: Locale) -> String {
    let mut lines = vec![PREAMBLE.to_string(), String::new()];

    let body = match request.kind {
        InsightKind::Chat => chat(ctx, request.message.as_deref().unwrap_or_default()),
        InsightKind::WeeklyInsight => weekly_insight(ctx),
        InsightKind::ScheduleSuggestion => schedule_suggestion(ctx),
        InsightKind::BalanceAnalysis => balance_analysis(ctx),
        InsightKind::ProductivityTips => productivity_tips(ctx, request.message.as_deref()),
        InsightKind::SmartPriority => smart_priority(ctx),
        InsightKind::TimePrediction => time_prediction(ctx),
        InsightKind::BurnoutDetection => burnout_detection(ctx),
        InsightKind::EnergyOptimization => energy_optimization(ctx),
        InsightKind::HabitFormation => habit_formation(ctx),
    };
    lines.extend(body);

    lines.push(String::new());
    lines.push(format!(
        "Respond in {}. Be friendly, practical and encouraging.",
        locale.language_name()
    ));
    lines.join("\n")
}

// ============================================
// Shared blocks
// ============================================

fn summary(ctx: &TidyBotContext) -> Vec<String> {
    let trend = &ctx.analytics.insights.trend;
    vec![
        format!("- Tasks created this week: {}", ctx.weekly_status.total()),
        format!(
            "- Completed this week: {} of {} ({}%)",
            ctx.weekly_status.completed,
            ctx.weekly_status.total(),
            trend.current_rate
        ),
        format!("- Overdue tasks: {}", ctx.overdue.len()),
        format!("- Categories: {}", category_list(ctx)),
    ]
}

fn category_list(ctx: &TidyBotContext) -> String {
    if ctx.categories.is_empty() {
        "none yet".to_string()
    } else {
        ctx.categories.join(", ")
    }
}

fn date(ts: Option<DateTime<Utc>>, offset: &FixedOffset) -> String {
    ts.map(|t| t.with_timezone(offset).format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "none".to_string())
}

fn minutes(m: Option<u32>) -> String {
    m.map(|m| format!("{m} min"))
        .unwrap_or_else(|| "unknown".to_string())
}

fn numbered(items: &[&str]) -> Vec<String> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect()
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn completed_in<'a>(
    ctx: &'a TidyBotContext,
    category: &'a str,
) -> impl Iterator<Item = &'a TaskMetric> {
    ctx.completed.iter().filter(move |m| m.category_name == category)
}

// ============================================
// Request kinds
// ============================================

fn chat(ctx: &TidyBotContext, message: &str) -> Vec<String> {
    let mut lines = vec![
        format!("Answer the user's question helpfully: \"{}\"", message.trim()),
        String::new(),
        "User context:".to_string(),
    ];
    lines.extend(summary(ctx));
    lines.push(String::new());
    lines.push("Unfinished tasks:".to_string());
    lines.extend(
        ctx.recent
            .iter()
            .filter(|m| !m.is_completed())
            .take(3)
            .map(|m| format!("- {} ({})", m.title, m.category_name)),
    );
    lines.push(String::new());
    lines.push("Keep the answer relevant to productivity and task management.".to_string());
    lines
}

fn weekly_insight(ctx: &TidyBotContext) -> Vec<String> {
    let insights = &ctx.analytics.insights;
    let mut lines = vec!["Give a weekly insight based on this data.".to_string(), String::new()];
    lines.push("This week:".to_string());
    lines.extend(summary(ctx));
    lines.push(format!(
        "- Change in completion rate vs last week: {:+} points",
        insights.trend.weekly_change
    ));
    lines.push(format!(
        "- Average task duration: {} min ({:+} min vs last week)",
        insights.trend.average_task_minutes, insights.trend.time_change
    ));
    lines.push(String::new());
    lines.push("Recently completed:".to_string());
    lines.extend(ctx.completed.iter().take(5).map(|m| {
        format!(
            "- {} ({}) - {}",
            m.title,
            m.category_name,
            minutes(m.actual_minutes)
        )
    }));
    lines.push(String::new());
    lines.push("Observations from TidyList:".to_string());
    lines.extend(
        insights
            .recommendations
            .iter()
            .map(|key| format!("- {}", Locale::English.recommendation(*key))),
    );
    lines.push(String::new());
    lines.push("Cover:".to_string());
    lines.extend(numbered(&[
        "This week's performance",
        "Productivity patterns",
        "Areas to improve",
        "Recommendations for next week",
    ]));
    lines
}

fn schedule_suggestion(ctx: &TidyBotContext) -> Vec<String> {
    let mut lines = vec![
        "Suggest a schedule for these tasks:".to_string(),
        String::new(),
    ];
    lines.extend(ctx.open_recent().map(|m| {
        format!(
            "- {} ({}) - Priority: {} - Estimate: {} - Deadline: {}",
            m.title,
            m.category_name,
            m.priority.as_str(),
            minutes(m.estimated_minutes),
            date(m.deadline, &ctx.offset)
        )
    }));
    lines.push(String::new());
    lines.push("Take into account:".to_string());
    lines.extend(numbered(&[
        "Task priority",
        "Deadlines",
        "Estimated durations",
        "A balanced workload",
    ]));
    lines.push(String::new());
    lines.push("Format the answer as a practical day-by-day plan.".to_string());
    lines
}

fn balance_analysis(ctx: &TidyBotContext) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Analyse how time is balanced across categories over the last {} days:",
            ctx.patterns.window.days()
        ),
        String::new(),
    ];
    lines.extend(ctx.patterns.categories.iter().map(|c| {
        format!(
            "- {}: {} tasks, {} min total",
            c.name, c.count, c.total_minutes
        )
    }));
    lines.push(String::new());
    lines.push("Cover:".to_string());
    lines.extend(numbered(&[
        "Whether time allocation is unbalanced",
        "Which categories dominate",
        "How to create a better balance",
        "Time blocking recommendations",
    ]));
    lines
}

fn productivity_tips(ctx: &TidyBotContext, message: Option<&str>) -> Vec<String> {
    let topic = message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(|m| format!("Give productivity tips for this question: \"{m}\""))
        .unwrap_or_else(|| "Give general productivity tips.".to_string());
    let mut lines = vec![topic, String::new(), "User context:".to_string()];
    lines.extend(summary(ctx));
    lines.push(String::new());
    lines.push("Make the tips specific, practical and immediately applicable.".to_string());
    lines
}

fn smart_priority(ctx: &TidyBotContext) -> Vec<String> {
    let mut lines = vec![
        "Analyse these tasks and recommend an optimal priority order:".to_string(),
        String::new(),
    ];
    for m in ctx.open_recent() {
        lines.push(format!("- {} ({})", m.title, m.category_name));
        lines.push(format!("  - Current priority: {}", m.priority.as_str()));
        lines.push(format!("  - Deadline: {}", date(m.deadline, &ctx.offset)));
        lines.push(format!("  - Estimate: {}", minutes(m.estimated_minutes)));
        lines.push(format!("  - Created: {}", date(Some(m.created_at), &ctx.offset)));
    }
    lines.push(String::new());
    lines.push("Consider:".to_string());
    lines.extend(numbered(&[
        "Urgency (approaching deadlines)",
        "Impact on overall goals",
        "Complexity and time required",
        "Dependencies between tasks",
        "Consequences of not finishing",
    ]));
    lines.push(String::new());
    lines.push(
        "List the recommended priorities with a reason for every change.".to_string(),
    );
    lines
}

fn time_prediction(ctx: &TidyBotContext) -> Vec<String> {
    let mut lines = vec![
        "Predict realistic durations from the user's track record.".to_string(),
        String::new(),
        "Completed tasks:".to_string(),
    ];
    lines.extend(
        ctx.completed
            .iter()
            .filter(|m| m.actual_minutes.is_some())
            .take(10)
            .map(|m| {
                format!(
                    "- {} ({}): {} (estimate: {})",
                    m.title,
                    m.category_name,
                    minutes(m.actual_minutes),
                    minutes(m.estimated_minutes)
                )
            }),
    );
    lines.push(String::new());
    lines.push("Tasks to predict:".to_string());
    lines.extend(ctx.open_recent().map(|m| {
        format!(
            "- {} ({}) - current estimate: {}",
            m.title,
            m.category_name,
            minutes(m.estimated_minutes)
        )
    }));
    lines.push(String::new());
    lines.push("Base the prediction on:".to_string());
    lines.extend(numbered(&[
        "History of similar tasks",
        "Task complexity",
        "Task category",
        "The user's tendency to over- or underestimate",
    ]));
    lines.push(String::new());
    lines.push(
        "Include a confidence level and tips for estimating more accurately.".to_string(),
    );
    lines
}

fn burnout_detection(ctx: &TidyBotContext) -> Vec<String> {
    let burnout = &ctx.analytics.insights.burnout;
    let signals = &burnout.signals;
    let mut lines = vec![
        "Assess the user's workload for signs of burnout.".to_string(),
        String::new(),
        format!("Activity over the last {} days:", burnout.window.days()),
        format!("- Tasks completed: {}", signals.completed_tasks),
        format!("- Total work time: {} h", (signals.total_minutes + 30) / 60),
        format!("- Average per task: {} min", signals.average_minutes),
        format!("- Overdue tasks: {}", signals.overdue),
        format!(
            "- Completed this week: {} of {}",
            ctx.weekly_status.completed,
            ctx.weekly_status.total()
        ),
        format!("- Risk level computed by TidyList: {}", burnout.risk.as_str()),
        String::new(),
        "Completed tasks per category:".to_string(),
    ];
    lines.extend(
        ctx.categories
            .iter()
            .map(|name| format!("- {}: {} tasks", name, completed_in(ctx, name).count())),
    );
    lines.push(String::new());
    lines.push("Provide:".to_string());
    lines.extend(numbered(&[
        "Burnout risk level (low, medium or high)",
        "Indicators of fatigue",
        "How to keep a healthy balance",
        "A healthier scheduling approach",
        "Recovery tips if needed",
    ]));
    lines.push(String::new());
    lines.push("Be empathetic and supportive.".to_string());
    lines
}

fn energy_optimization(ctx: &TidyBotContext) -> Vec<String> {
    let mut lines = vec![
        "Recommend a daily schedule that follows the user's natural energy rhythm.".to_string(),
        String::new(),
        "Completed tasks by starting hour:".to_string(),
    ];
    lines.extend(
        ctx.patterns
            .hourly
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.count > 0)
            .map(|(hour, slot)| {
                format!(
                    "- {:02}:00: {} tasks (average {} min)",
                    hour,
                    slot.count,
                    (slot.minutes + slot.count as u64 / 2) / slot.count as u64
                )
            }),
    );
    lines.push(String::new());
    lines.push("Categories:".to_string());
    lines.extend(ctx.patterns.categories.iter().map(|c| {
        format!(
            "- {}: {} tasks, average {} min",
            c.name, c.count, c.average_minutes
        )
    }));
    lines.push(String::new());
    lines.push("Cover:".to_string());
    lines.extend(numbered(&[
        "Hours of peak productivity",
        "Where to place tasks by complexity",
        "Best times for breaks",
        "A daily energy management strategy",
        "How to make the most of peak hours",
    ]));
    lines.push(String::new());
    lines.push("Include an optimal daily schedule.".to_string());
    lines
}

fn habit_formation(ctx: &TidyBotContext) -> Vec<String> {
    const WEEK: [Weekday; 7] = [
        Weekday::Sun,
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ];

    let mut lines = vec![
        "Help the user build sustainable productive habits.".to_string(),
        String::new(),
        "Completed tasks by weekday:".to_string(),
    ];
    lines.extend(
        ctx.patterns
            .daily
            .iter()
            .zip(WEEK)
            .filter(|(slot, _)| slot.count > 0)
            .map(|(slot, day)| format!("- {}: {} tasks", weekday_name(day), slot.count)),
    );
    lines.push(String::new());
    lines.push("Categories:".to_string());
    lines.extend(ctx.patterns.categories.iter().map(|c| {
        format!("- {}: {} tasks ({:.1} per day)", c.name, c.count, c.per_day)
    }));
    lines.push(String::new());
    lines.push(format!(
        "Completed this week: {} of {}",
        ctx.weekly_status.completed,
        ctx.weekly_status.total()
    ));
    lines.push(String::new());
    lines.push("Cover:".to_string());
    lines.extend(numbered(&[
        "Productive habits already in place",
        "Where consistency needs work",
        "Habit stacking strategies",
        "Milestones and rewards",
        "Staying motivated long term",
        "A realistic daily or weekly routine",
    ]));
    lines
}
