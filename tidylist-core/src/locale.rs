//! Display text for analytics keys
//!
//! The analytics engine only emits keys. This module is the caller-side
//! table that turns them into English or Indonesian sentences.

use serde::{Deserialize, Serialize};

use crate::analytics::{BurnoutRisk, EstimateComparison, RecommendationKey, Suggestion, SuggestionKey};

/// Supported display languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "id")]
    Indonesian,
}

impl Locale {
    /// Language name as it should appear in an instruction to a text model.
    pub fn language_name(&self) -> &'static str {
        match self {
            Locale::English => "English",
            Locale::Indonesian => "Indonesian (Bahasa Indonesia)",
        }
    }

    pub fn recommendation(&self, key: RecommendationKey) -> &'static str {
        use RecommendationKey::*;
        match (self, key) {
            (Locale::English, LowCompletion) => {
                "Focus on high-priority tasks to raise your completion rate"
            }
            (Locale::English, ProductivityDrop) => {
                "Productivity dropped this week. Review your workload and get enough rest"
            }
            (Locale::English, ManyOverdue) => {
                "Many tasks are overdue. Consider setting more realistic deadlines"
            }
            (Locale::English, TooManyHighPriority) => {
                "Too many high-priority tasks. Try delegating or splitting them into subtasks"
            }
            (Locale::English, LongAverageTask) => {
                "Your average task takes a long time. Try time blocking"
            }
            (Locale::English, MaintainConsistency) => "Keep up the consistency in managing your tasks!",
            (Locale::Indonesian, LowCompletion) => {
                "Fokus pada tugas dengan prioritas tinggi untuk meningkatkan produktivitas"
            }
            (Locale::Indonesian, ProductivityDrop) => {
                "Produktivitas menurun minggu ini. Coba evaluasi beban kerja dan istirahat yang cukup"
            }
            (Locale::Indonesian, ManyOverdue) => {
                "Banyak tugas terlambat. Pertimbangkan untuk mengatur ulang deadline yang lebih realistis"
            }
            (Locale::Indonesian, TooManyHighPriority) => {
                "Terlalu banyak tugas prioritas tinggi. Coba delegasikan atau pecah menjadi sub-tugas"
            }
            (Locale::Indonesian, LongAverageTask) => {
                "Rata-rata waktu tugas cukup tinggi. Coba terapkan teknik time blocking"
            }
            (Locale::Indonesian, MaintainConsistency) => {
                "Terus pertahankan konsistensi dalam mengelola tugas!"
            }
        }
    }

    /// Short title for a suggestion.
    pub fn suggestion_title(&self, suggestion: &Suggestion) -> String {
        let n = suggestion.count;
        match (self, suggestion.key) {
            (Locale::English, SuggestionKey::OverdueCatchUp) => format!("{n} overdue tasks"),
            (Locale::English, SuggestionKey::BusyDay) => "Lots of tasks today".to_string(),
            (Locale::English, SuggestionKey::HighPriorityUpcoming) => {
                format!("{n} high-priority tasks coming up")
            }
            (Locale::English, SuggestionKey::ImproveProductivity) => {
                "Improve your productivity".to_string()
            }
            (Locale::English, SuggestionKey::DailyTips) => "Daily productivity tips".to_string(),
            (Locale::Indonesian, SuggestionKey::OverdueCatchUp) => format!("{n} tugas terlambat"),
            (Locale::Indonesian, SuggestionKey::BusyDay) => "Banyak tugas hari ini".to_string(),
            (Locale::Indonesian, SuggestionKey::HighPriorityUpcoming) => {
                format!("{n} tugas prioritas tinggi mendekat")
            }
            (Locale::Indonesian, SuggestionKey::ImproveProductivity) => {
                "Tingkatkan produktivitas".to_string()
            }
            (Locale::Indonesian, SuggestionKey::DailyTips) => {
                "Tips produktivitas harian".to_string()
            }
        }
    }

    /// A question the user can hand straight to TidyBot.
    pub fn suggestion_prompt(&self, suggestion: &Suggestion) -> String {
        let n = suggestion.count;
        match (self, suggestion.key) {
            (Locale::English, SuggestionKey::OverdueCatchUp) => {
                format!("I have {n} overdue tasks. How can I catch up?")
            }
            (Locale::English, SuggestionKey::BusyDay) => {
                format!("I have {n} tasks today. How do I manage my time well?")
            }
            (Locale::English, SuggestionKey::HighPriorityUpcoming) => {
                "Help me prepare a plan for my upcoming high-priority tasks".to_string()
            }
            (Locale::English, SuggestionKey::ImproveProductivity) => {
                "My productivity is slipping. Give me tips to improve it".to_string()
            }
            (Locale::English, SuggestionKey::DailyTips) => {
                "Give me productivity tips to make the most of today".to_string()
            }
            (Locale::Indonesian, SuggestionKey::OverdueCatchUp) => format!(
                "Saya memiliki {n} tugas yang terlambat. Bagaimana cara mengejar keterlambatan ini?"
            ),
            (Locale::Indonesian, SuggestionKey::BusyDay) => format!(
                "Saya memiliki {n} tugas hari ini. Bagaimana cara mengelola waktu yang efektif?"
            ),
            (Locale::Indonesian, SuggestionKey::HighPriorityUpcoming) => {
                "Bantu saya mempersiapkan strategi untuk tugas prioritas tinggi yang akan datang"
                    .to_string()
            }
            (Locale::Indonesian, SuggestionKey::ImproveProductivity) => {
                "Produktivitas saya sedang menurun. Berikan tips untuk meningkatkannya".to_string()
            }
            (Locale::Indonesian, SuggestionKey::DailyTips) => {
                "Berikan tips produktivitas untuk mengoptimalkan hari ini".to_string()
            }
        }
    }

    pub fn burnout(&self, risk: BurnoutRisk) -> &'static str {
        match (self, risk) {
            (Locale::English, BurnoutRisk::Low) => "low",
            (Locale::English, BurnoutRisk::Medium) => "medium",
            (Locale::English, BurnoutRisk::High) => "high",
            (Locale::Indonesian, BurnoutRisk::Low) => "rendah",
            (Locale::Indonesian, BurnoutRisk::Medium) => "sedang",
            (Locale::Indonesian, BurnoutRisk::High) => "tinggi",
        }
    }

    pub fn estimate_comparison(&self, comparison: EstimateComparison) -> String {
        match (self, comparison) {
            (Locale::English, EstimateComparison::Faster(m)) => {
                format!("{m} min faster than estimated")
            }
            (Locale::English, EstimateComparison::Slower(m)) => {
                format!("{m} min slower than estimated")
            }
            (Locale::Indonesian, EstimateComparison::Faster(m)) => {
                format!("{m} menit lebih cepat dari estimasi")
            }
            (Locale::Indonesian, EstimateComparison::Slower(m)) => {
                format!("{m} menit lebih lambat dari estimasi")
            }
        }
    }
}
