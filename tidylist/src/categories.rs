//! `tidylist category ...`

use anyhow::{Context, Result};
use clap::Subcommand;
use tidylist_core::db::{CategoryUpdate, NewCategory};

use crate::render::{print_json, short_id, OutputFormat};
use crate::App;

#[derive(Subcommand)]
pub enum CategoryCommand {
    /// Create a category
    Add {
        name: String,
        /// Display color, e.g. "#10B981"
        #[arg(long)]
        color: Option<String>,
        /// Display icon
        #[arg(long)]
        icon: Option<String>,
    },
    /// List categories with task counts
    List,
    /// Rename or restyle a category
    Edit {
        /// Category ID (unique prefix accepted)
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Delete a category that has no tasks
    Delete {
        /// Category ID (unique prefix accepted)
        id: String,
    },
}

pub fn run(app: &App, command: CategoryCommand) -> Result<()> {
    match command {
        CategoryCommand::Add { name, color, icon } => {
            let category = app
                .db
                .create_category(&app.user_id, &NewCategory { name, color, icon })
                .context("failed to create category")?;
            match app.format {
                OutputFormat::Json => print_json(&category)?,
                OutputFormat::Text => println!(
                    "Created category {} {} ({})",
                    category.icon,
                    category.name,
                    short_id(&category.id)
                ),
            }
        }
        CategoryCommand::List => {
            let categories = app.db.list_categories(&app.user_id)?;
            match app.format {
                OutputFormat::Json => print_json(&categories)?,
                OutputFormat::Text => {
                    if categories.is_empty() {
                        println!("No categories yet. Create one with 'tidylist category add <NAME>'.");
                    }
                    for summary in &categories {
                        let c = &summary.category;
                        println!(
                            "{}  {} {:<20} {:<8} {} task(s)",
                            short_id(&c.id),
                            c.icon,
                            c.name,
                            c.color,
                            summary.task_count
                        );
                    }
                }
            }
        }
        CategoryCommand::Edit {
            id,
            name,
            color,
            icon,
        } => {
            let id = app.db.resolve_category_id(&app.user_id, &id)?;
            let category = app
                .db
                .update_category(&app.user_id, &id, &CategoryUpdate { name, color, icon })
                .context("failed to update category")?;
            match app.format {
                OutputFormat::Json => print_json(&category)?,
                OutputFormat::Text => println!("Updated category {}", category.name),
            }
        }
        CategoryCommand::Delete { id } => {
            let id = app.db.resolve_category_id(&app.user_id, &id)?;
            app.db.delete_category(&app.user_id, &id)?;
            match app.format {
                OutputFormat::Json => print_json(&serde_json::json!({ "deleted": id }))?,
                OutputFormat::Text => println!("Deleted category {}", short_id(&id)),
            }
        }
    }
    Ok(())
}
