//! Health assistant replies: keyword topic routing with templated answers,
//! and an optional LLM backend that falls back to the templates on failure.
//!
//! No network client lives here. Callers plug a backend in through
//! [`ChatGenerator`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::enums::ChatTopic;

pub const DISCLAIMER: &str = "This information is for educational purposes only. Always consult healthcare providers for medical advice.";

const DEFAULT_NAME: &str = "there";

/// Ordered routing table. The first topic with a matching keyword wins.
const TOPIC_KEYWORDS: &[(ChatTopic, &[&str])] = &[
    (ChatTopic::Pregnancy, &["pregnancy", "pregnant", "baby", "trimester"]),
    (ChatTopic::Vaccination, &["vaccination", "vaccine", "immunization"]),
    (
        ChatTopic::Growth,
        &["growth", "development", "milestone", "weight", "height"],
    ),
    (
        ChatTopic::Nutrition,
        &["nutrition", "food", "eating", "diet", "breastfeeding"],
    ),
    (
        ChatTopic::GeneralHealth,
        &["fever", "cough", "sick", "illness", "symptoms"],
    ),
    (
        ChatTopic::MentalHealth,
        &["stress", "anxiety", "depression", "mood", "mental"],
    ),
];

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Chat backend unavailable: {0}")]
    Unavailable(String),

    #[error("Chat backend returned an empty response")]
    EmptyResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildAge {
    pub name: String,
    pub age_months: i64,
}

/// What the assistant knows about the user, copied out of stored records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatContext {
    pub user_name: Option<String>,
    /// Set only while a pregnancy is active.
    pub pregnancy_week: Option<u32>,
    pub children: Vec<ChildAge>,
}

impl ChatContext {
    pub fn display_name(&self) -> &str {
        self.user_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_NAME)
    }

    pub fn has_active_pregnancy(&self) -> bool {
        self.pregnancy_week.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub query: String,
    pub topic: ChatTopic,
    pub response: String,
    pub disclaimer: String,
    pub generated: bool,
}

/// LLM seam. `system` carries the user context; `query` is the raw question.
pub trait ChatGenerator {
    fn generate(&self, system: &str, query: &str) -> Result<String, ChatError>;
}

pub fn classify_topic(query: &str) -> ChatTopic {
    let lower = query.to_lowercase();
    TOPIC_KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(topic, _)| *topic)
        .unwrap_or(ChatTopic::Other)
}

pub fn fallback_response(topic: ChatTopic, ctx: &ChatContext) -> String {
    let name = ctx.display_name();
    match topic {
        ChatTopic::Pregnancy => match ctx.pregnancy_week {
            Some(week) => format!(
                "Hi {name}! You're currently at week {week} of pregnancy. For pregnancy-related questions, I recommend discussing with your healthcare provider during your regular check-ups. Make sure to take your prenatal vitamins, stay hydrated, and attend all scheduled appointments."
            ),
            None => format!(
                "Hi {name}! For pregnancy-related questions, it's always best to consult with a qualified healthcare provider who can give you personalized advice based on your specific situation."
            ),
        },
        ChatTopic::Vaccination => format!(
            "Hi {name}! Vaccinations are crucial for protecting your children's health. Please ensure all scheduled vaccines are up to date according to the Kenya immunization schedule. Check your vaccination tracker for due dates and consult your pediatrician if you have concerns."
        ),
        ChatTopic::Growth => format!(
            "Hi {name}! Monitoring your child's growth and development is important. Regular check-ups with your pediatrician, tracking milestones, and maintaining a healthy diet all contribute to proper development. If you have specific concerns about your child's growth, please consult your healthcare provider."
        ),
        ChatTopic::Nutrition => format!(
            "Hi {name}! Good nutrition is essential for both mothers and children. For pregnant mothers, focus on a balanced diet with prenatal vitamins. For children, age-appropriate nutrition supports healthy growth. Consult your healthcare provider for personalized dietary advice."
        ),
        ChatTopic::GeneralHealth => format!(
            "Hi {name}! For any health concerns or symptoms, especially in children, it's important to consult with a healthcare provider promptly. They can properly assess symptoms and provide appropriate treatment. Keep track of symptoms and don't hesitate to seek medical attention when needed."
        ),
        ChatTopic::MentalHealth => format!(
            "Hi {name}! Mental health is just as important as physical health, especially during pregnancy and early parenthood. If you're experiencing persistent stress, anxiety, or mood changes, please reach out to a healthcare provider or mental health professional. Support is available and seeking help is a sign of strength."
        ),
        ChatTopic::Other => format!(
            "Hi {name}! I'm here to help with maternal and child health questions. You can ask me about pregnancy care, child development, vaccinations, nutrition, or general health concerns. For specific medical advice, always consult with qualified healthcare providers."
        ),
    }
}

/// System message for an LLM backend, embedding the user's context.
pub fn build_system_prompt(ctx: &ChatContext) -> String {
    let mut prompt = String::from("You are a helpful maternal and child health assistant.\n\nUser context:\n");

    if ctx.has_active_pregnancy() {
        prompt.push_str("- User has an active pregnancy\n");
    } else {
        prompt.push_str("- User has no active pregnancy\n");
    }
    if let Some(week) = ctx.pregnancy_week {
        prompt.push_str(&format!("- Currently at week {week} of pregnancy\n"));
    }

    let children = if ctx.children.is_empty() {
        "none".to_string()
    } else {
        ctx.children
            .iter()
            .map(|c| format!("{} ({} months)", c.name, c.age_months))
            .collect::<Vec<_>>()
            .join(", ")
    };
    prompt.push_str(&format!("- Has {} children: {children}\n\n", ctx.children.len()));

    prompt.push_str(
        "Provide helpful, accurate health information while always recommending professional medical consultation for serious concerns.\n\
         Be supportive and culturally sensitive. Keep responses concise but informative.",
    );
    prompt
}

/// Answer a query, preferring the generator when one is supplied.
pub fn respond(query: &str, ctx: &ChatContext, generator: Option<&dyn ChatGenerator>) -> ChatReply {
    let topic = classify_topic(query);

    let generated = generator.and_then(|g| {
        match g.generate(&build_system_prompt(ctx), query) {
            Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(_) => {
                tracing::warn!(error = %ChatError::EmptyResponse, "Falling back to rule-based reply");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Falling back to rule-based reply");
                None
            }
        }
    });

    let (response, generated) = match generated {
        Some(text) => (text, true),
        None => (fallback_response(topic, ctx), false),
    };

    ChatReply {
        query: query.to_string(),
        topic,
        response,
        disclaimer: DISCLAIMER.to_string(),
        generated,
    }
}
