//! `tidylist ask ...`

use anyhow::{Context, Result};
use chrono::Utc;
use tidylist_core::tidybot::{create_provider, InsightKind, TidyBot, TidyBotRequest};

use crate::render::{local_time, print_json, OutputFormat};
use crate::App;

pub fn ask(app: &App, kind: InsightKind, message: Vec<String>) -> Result<()> {
    let message = Some(message.join(" ")).filter(|m| !m.trim().is_empty());
    let request = TidyBotRequest { kind, message };
    request.validate()?;

    let provider = create_provider(&app.config.tidybot_or_default())
        .context("failed to set up the TidyBot text provider")?;
    let bot = TidyBot::new(app.engine.clone(), app.config.profile.locale, provider);

    let reply = bot
        .ask(&app.db, &app.user_id, &request, Utc::now())
        .with_context(|| format!("TidyBot could not answer the {} request", kind))?;

    match app.format {
        OutputFormat::Json => print_json(&reply)?,
        OutputFormat::Text => println!("{}", reply.response),
    }
    Ok(())
}

/// Print the most recent exchanges without contacting the provider.
pub fn recent(app: &App, limit: usize) -> Result<()> {
    let exchanges = app.db.list_tidybot_exchanges(&app.user_id, limit)?;

    if app.format == OutputFormat::Json {
        return print_json(&exchanges);
    }

    if exchanges.is_empty() {
        println!("No TidyBot conversations yet.");
    }
    for exchange in &exchanges {
        println!(
            "{}  {} via {} ({}ms)",
            local_time(exchange.created_at, app.engine.offset()),
            exchange.kind,
            exchange.provider,
            exchange.duration_ms
        );
        if let Some(message) = &exchange.message {
            println!("  > {message}");
        }
        let preview: String = exchange.response.chars().take(200).collect();
        println!("  {}", preview.replace('\n', "\n  "));
        println!();
    }
    Ok(())
}
