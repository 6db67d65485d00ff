//! `tidylist task ...`

use anyhow::{bail, Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use clap::{Args, Subcommand};
use tidylist_core::db::{NewTask, TaskUpdate};
use tidylist_core::{Priority, Task, TaskFilter, TaskStatus};

use crate::render::{
    local_date, local_time, optional_minutes, print_json, short_id, status_marker, OutputFormat,
};
use crate::App;

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Create a task
    Add {
        title: String,
        /// Category ID (unique prefix accepted)
        #[arg(short, long)]
        category: String,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// List tasks, open work first
    List {
        /// Only tasks with this status (pending, in-progress, completed, cancelled)
        #[arg(short, long)]
        status: Option<TaskStatus>,
        /// Only tasks in this category (unique prefix accepted)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Change a task's details
    Edit {
        /// Task ID (unique prefix accepted)
        id: String,
        #[arg(long)]
        title: Option<String>,
        /// Move to another category (unique prefix accepted)
        #[arg(short, long)]
        category: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Mark a task as in progress
    Start {
        /// Task ID (unique prefix accepted)
        id: String,
    },
    /// Mark a task as completed
    Done {
        /// Task ID (unique prefix accepted)
        id: String,
        /// Minutes actually spent; recorded in history
        #[arg(short, long)]
        actual: Option<i64>,
        /// Note for the history entry
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Cancel a task
    Cancel {
        /// Task ID (unique prefix accepted)
        id: String,
    },
    /// Move a task back to pending
    Reopen {
        /// Task ID (unique prefix accepted)
        id: String,
    },
    /// Delete a task and its history entry
    Delete {
        /// Task ID (unique prefix accepted)
        id: String,
    },
}

/// Optional fields shared by `add` and `edit`.
#[derive(Args)]
pub struct TaskFields {
    #[arg(short, long)]
    description: Option<String>,
    /// low, medium, high or urgent
    #[arg(short, long)]
    priority: Option<Priority>,
    /// Estimated minutes
    #[arg(short, long)]
    estimate: Option<i64>,
    /// YYYY-MM-DD, "YYYY-MM-DD HH:MM" or RFC 3339
    #[arg(long)]
    deadline: Option<String>,
}

/// Parse a deadline in the configured offset. A bare date means the end of
/// that day.
pub fn parse_deadline(input: &str, offset: &FixedOffset) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = if let Ok(dt) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M") {
        dt
    } else if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).context("invalid time of day")?;
        date.and_time(end_of_day)
    } else {
        bail!("invalid deadline '{input}' (expected YYYY-MM-DD, \"YYYY-MM-DD HH:MM\" or RFC 3339)");
    };

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("ambiguous deadline '{input}'"))
}

pub fn run(app: &App, command: TaskCommand) -> Result<()> {
    let offset = *app.engine.offset();
    match command {
        TaskCommand::Add {
            title,
            category,
            fields,
        } => {
            let category_id = app.db.resolve_category_id(&app.user_id, &category)?;
            let new = NewTask {
                title,
                description: fields.description,
                category_id,
                priority: fields.priority,
                estimated_minutes: fields.estimate,
                deadline: fields
                    .deadline
                    .as_deref()
                    .map(|d| parse_deadline(d, &offset))
                    .transpose()?,
            };
            let task = app
                .db
                .create_task(&app.user_id, &new)
                .context("failed to create task")?;
            print_task(app, &task, "Created")?;
        }
        TaskCommand::List { status, category } => {
            let category_id = category
                .map(|c| app.db.resolve_category_id(&app.user_id, &c))
                .transpose()?;
            let rows = app.db.list_tasks(
                &app.user_id,
                &TaskFilter {
                    status,
                    category_id,
                },
            )?;
            match app.format {
                OutputFormat::Json => print_json(&rows)?,
                OutputFormat::Text => {
                    if rows.is_empty() {
                        println!("No tasks found.");
                    }
                    let now = Utc::now();
                    for row in &rows {
                        let t = &row.task;
                        let deadline = t
                            .deadline
                            .map(|d| {
                                let flag = if t.is_overdue(now) { " OVERDUE" } else { "" };
                                format!("  due {}{}", local_date(d, &offset), flag)
                            })
                            .unwrap_or_default();
                        println!(
                            "{} {}  {:<7} {} {:<32} est {:<5} act {:<5}{}",
                            status_marker(t.status),
                            short_id(&t.id),
                            t.priority.as_str(),
                            row.category.icon,
                            t.title,
                            optional_minutes(t.estimated_minutes),
                            optional_minutes(t.actual_minutes),
                            deadline
                        );
                    }
                }
            }
        }
        TaskCommand::Edit {
            id,
            title,
            category,
            fields,
        } => {
            let id = app.db.resolve_task_id(&app.user_id, &id)?;
            let category_id = category
                .map(|c| app.db.resolve_category_id(&app.user_id, &c))
                .transpose()?;
            let update = TaskUpdate {
                title,
                description: fields.description,
                category_id,
                priority: fields.priority,
                estimated_minutes: fields.estimate,
                deadline: fields
                    .deadline
                    .as_deref()
                    .map(|d| parse_deadline(d, &offset))
                    .transpose()?,
                ..Default::default()
            };
            let task = app.db.update_task(&app.user_id, &id, &update)?;
            print_task(app, &task, "Updated")?;
        }
        TaskCommand::Start { id } => set_status(app, &id, TaskStatus::InProgress, "Started")?,
        TaskCommand::Done { id, actual, note } => {
            let id = app.db.resolve_task_id(&app.user_id, &id)?;
            let update = TaskUpdate {
                status: Some(TaskStatus::Completed),
                actual_minutes: actual,
                note,
                ..Default::default()
            };
            let task = app.db.update_task(&app.user_id, &id, &update)?;
            print_task(app, &task, "Completed")?;
        }
        TaskCommand::Cancel { id } => set_status(app, &id, TaskStatus::Cancelled, "Cancelled")?,
        TaskCommand::Reopen { id } => set_status(app, &id, TaskStatus::Pending, "Reopened")?,
        TaskCommand::Delete { id } => {
            let id = app.db.resolve_task_id(&app.user_id, &id)?;
            app.db.delete_task(&app.user_id, &id)?;
            match app.format {
                OutputFormat::Json => print_json(&serde_json::json!({ "deleted": id }))?,
                OutputFormat::Text => println!("Deleted task {}", short_id(&id)),
            }
        }
    }
    Ok(())
}

fn set_status(app: &App, id: &str, status: TaskStatus, verb: &str) -> Result<()> {
    let id = app.db.resolve_task_id(&app.user_id, id)?;
    let update = TaskUpdate {
        status: Some(status),
        ..Default::default()
    };
    let task = app.db.update_task(&app.user_id, &id, &update)?;
    print_task(app, &task, verb)
}

fn print_task(app: &App, task: &Task, verb: &str) -> Result<()> {
    match app.format {
        OutputFormat::Json => print_json(task),
        OutputFormat::Text => {
            println!("{} task {} ({})", verb, task.title, short_id(&task.id));
            if let Some(completed_at) = task.completed_at {
                println!("  completed {}", local_time(completed_at, app.engine.offset()));
            }
            Ok(())
        }
    }
}
