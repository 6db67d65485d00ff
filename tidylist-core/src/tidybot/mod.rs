//! TidyBot: AI productivity assistant
//!
//! Builds a prompt from the user's task context and analytics, hands it to
//! an [`InsightTextProvider`], and records the exchange.
//!
//! ```text
//! Database ─► UserSnapshot ─► TidyBotContext ─► build_prompt ─► provider ─► TidyBotReply
//!                                  ▲                                  │
//!                           AnalyticsEngine                 tidybot_exchanges log
//! ```

pub mod context;
pub mod prompt;
pub mod provider;

pub use context::{StatusCounts, TidyBotContext};
pub use prompt::build_prompt;
pub use provider::{create_provider, InsightTextProvider};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::time::Instant;

use crate::analytics::AnalyticsEngine;
use crate::locale::Locale;
use crate::types::TidyBotExchange;
use crate::{Database, Error, Result};

/// What the user is asking TidyBot for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsightKind {
    Chat,
    WeeklyInsight,
    ScheduleSuggestion,
    BalanceAnalysis,
    ProductivityTips,
    SmartPriority,
    TimePrediction,
    BurnoutDetection,
    EnergyOptimization,
    HabitFormation,
}

impl InsightKind {
    pub const ALL: [InsightKind; 10] = [
        InsightKind::Chat,
        InsightKind::WeeklyInsight,
        InsightKind::ScheduleSuggestion,
        InsightKind::BalanceAnalysis,
        InsightKind::ProductivityTips,
        InsightKind::SmartPriority,
        InsightKind::TimePrediction,
        InsightKind::BurnoutDetection,
        InsightKind::EnergyOptimization,
        InsightKind::HabitFormation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::Chat => "chat",
            InsightKind::WeeklyInsight => "weekly-insight",
            InsightKind::ScheduleSuggestion => "schedule-suggestion",
            InsightKind::BalanceAnalysis => "balance-analysis",
            InsightKind::ProductivityTips => "productivity-tips",
            InsightKind::SmartPriority => "smart-priority",
            InsightKind::TimePrediction => "time-prediction",
            InsightKind::BurnoutDetection => "burnout-detection",
            InsightKind::EnergyOptimization => "energy-optimization",
            InsightKind::HabitFormation => "habit-formation",
        }
    }
}

impl std::fmt::Display for InsightKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InsightKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| format!("unknown TidyBot request kind: {}", s))
    }
}

/// A single question for TidyBot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TidyBotRequest {
    pub kind: InsightKind,
    /// Required for chat, optional context for productivity tips
    pub message: Option<String>,
}

impl TidyBotRequest {
    pub fn chat(message: impl Into<String>) -> Self {
        Self {
            kind: InsightKind::Chat,
            message: Some(message.into()),
        }
    }

    pub fn of_kind(kind: InsightKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let has_message = self
            .message
            .as_deref()
            .is_some_and(|m| !m.trim().is_empty());
        if self.kind == InsightKind::Chat && !has_message {
            return Err(Error::InvalidRequest(
                "a message is required for chat".to_string(),
            ));
        }
        Ok(())
    }
}

/// TidyBot's answer plus what is needed to log it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TidyBotReply {
    pub kind: InsightKind,
    pub response: String,
    pub provider: String,
    pub model: Option<String>,
    /// SHA-256 of the prompt, hex encoded
    pub prompt_hash: String,
    pub duration_ms: i64,
    pub created_at: DateTime<Utc>,
}

impl TidyBotReply {
    fn to_exchange(&self, user_id: &str, request: &TidyBotRequest) -> TidyBotExchange {
        TidyBotExchange {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind: self.kind.as_str().to_string(),
            provider: self.provider.clone(),
            model: self.model.clone(),
            message: request.message.clone(),
            prompt_hash: self.prompt_hash.clone(),
            response: self.response.clone(),
            duration_ms: self.duration_ms,
            created_at: self.created_at,
        }
    }
}

/// Hex SHA-256 of a prompt.
pub fn prompt_hash(prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    hex::encode(hasher.finalize())
}

/// The assistant: analytics policy, answer language, and a text provider.
pub struct TidyBot {
    engine: AnalyticsEngine,
    locale: Locale,
    provider: Box<dyn InsightTextProvider>,
}

impl TidyBot {
    pub fn new(
        engine: AnalyticsEngine,
        locale: Locale,
        provider: Box<dyn InsightTextProvider>,
    ) -> Self {
        Self {
            engine,
            locale,
            provider,
        }
    }

    /// Answer `request` for `user_id` and record the exchange.
    pub fn ask(
        &self,
        db: &Database,
        user_id: &str,
        request: &TidyBotRequest,
        now: DateTime<Utc>,
    ) -> Result<TidyBotReply> {
        request.validate()?;

        let snapshot = db.load_snapshot(user_id)?;
        let context = TidyBotContext::build(&snapshot, &self.engine, now);
        let reply = self.answer(&context, request)?;

        db.insert_tidybot_exchange(&reply.to_exchange(user_id, request))?;
        Ok(reply)
    }

    /// Answer `request` from an already-built context without touching
    /// storage.
    pub fn answer(
        &self,
        context: &TidyBotContext,
        request: &TidyBotRequest,
    ) -> Result<TidyBotReply> {
        request.validate()?;

        let prompt = build_prompt(request, context, self.locale);
        let prompt_hash = prompt_hash(&prompt);

        let start = Instant::now();
        let response = self.provider.generate(&prompt).map_err(|e| {
            tracing::warn!(
                kind = request.kind.as_str(),
                provider = self.provider.name(),
                error = %e,
                "TidyBot request failed"
            );
            e
        })?;
        let duration_ms = start.elapsed().as_millis() as i64;

        tracing::info!(
            kind = request.kind.as_str(),
            provider = self.provider.name(),
            duration_ms,
            prompt_hash = %prompt_hash,
            "TidyBot answered"
        );

        Ok(TidyBotReply {
            kind: request.kind,
            response: response.trim().to_string(),
            provider: self.provider.name().to_string(),
            model: self.provider.model().map(str::to_string),
            prompt_hash,
            duration_ms,
            created_at: Utc::now(),
        })
    }
}
