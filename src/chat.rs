//! Chat assistant orchestration.
//!
//! `ChatService` is built once at startup and shared through the app
//! state. Every message is classified by keyword first; the hosted model
//! (when configured) only writes the reply text.

use crate::intent::classify_message;
use crate::knowledge::{format_context, KnowledgeBase};
use crate::llm_client::ChatModelClient;
use crate::models::{ChatTurn, IntentResult, NextAction};

/// Most recent history turns forwarded to the model.
pub const MAX_HISTORY_TURNS: usize = 10;

/// Longest accepted visitor message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Classification plus the reply to show the visitor.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub intent: IntentResult,
    pub message: String,
    pub ai_generated: bool,
}

pub struct ChatService {
    llm: Option<ChatModelClient>,
    knowledge: Option<KnowledgeBase>,
    business_name: String,
    match_threshold: f32,
    match_count: i32,
}

impl ChatService {
    pub fn new(
        llm: Option<ChatModelClient>,
        knowledge: Option<KnowledgeBase>,
        business_name: String,
        match_threshold: f32,
        match_count: i32,
    ) -> Self {
        Self {
            llm,
            knowledge,
            business_name,
            match_threshold,
            match_count,
        }
    }

    /// Classifies `message` and produces a reply.
    ///
    /// Model and retrieval failures never fail the call; the canned reply
    /// for the classified action is used instead.
    pub async fn respond(&self, message: &str, history: &[ChatTurn]) -> ChatReply {
        let intent = classify_message(message);

        tracing::info!(
            "Chat message classified: action={}, score={}, hot={}",
            intent.next_action,
            intent.lead_score,
            intent.is_hot_lead
        );

        let Some(ref llm) = self.llm else {
            return ChatReply {
                message: fallback_reply(intent.next_action, &self.business_name),
                intent,
                ai_generated: false,
            };
        };

        let context = self.retrieve_context(llm, message).await;
        let system_prompt = build_system_prompt(&self.business_name, &intent, context.as_deref());
        let history = recent_history(history);

        match llm.complete(&system_prompt, &history, message).await {
            Ok(reply) => ChatReply {
                message: reply,
                intent,
                ai_generated: true,
            },
            Err(e) => {
                tracing::warn!("⚠️  Chat model failed, using canned reply: {}", e);
                ChatReply {
                    message: fallback_reply(intent.next_action, &self.business_name),
                    intent,
                    ai_generated: false,
                }
            }
        }
    }

    async fn retrieve_context(&self, llm: &ChatModelClient, message: &str) -> Option<String> {
        let knowledge = self.knowledge.as_ref()?;

        let embedding = match llm.embed(message).await {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::warn!("⚠️  Embedding failed, answering without context: {}", e);
                return None;
            }
        };

        match knowledge
            .match_documents(&embedding, self.match_threshold, self.match_count)
            .await
        {
            Ok(matches) => format_context(&matches),
            Err(e) => {
                tracing::warn!("⚠️  Knowledge search failed: {}", e);
                None
            }
        }
    }
}

/// Last `MAX_HISTORY_TURNS` user/assistant turns with non-blank content.
pub fn recent_history(history: &[ChatTurn]) -> Vec<ChatTurn> {
    let valid: Vec<ChatTurn> = history
        .iter()
        .filter(|turn| matches!(turn.role.as_str(), "user" | "assistant"))
        .filter(|turn| !turn.content.trim().is_empty())
        .cloned()
        .collect();

    let skip = valid.len().saturating_sub(MAX_HISTORY_TURNS);
    valid.into_iter().skip(skip).collect()
}

pub fn build_system_prompt(
    business_name: &str,
    intent: &IntentResult,
    context: Option<&str>,
) -> String {
    let mut prompt = format!(
        "You are the friendly assistant for {business_name}, a local roofing contractor. \
         Answer questions about roofing services, materials, inspections and estimates. \
         Keep replies under 120 words, never invent prices, and encourage the visitor to \
         book a free inspection when it fits.\n"
    );

    let guidance = match intent.next_action {
        NextAction::ScheduleEstimate => {
            "The visitor wants pricing. Explain that estimates follow a free on-site inspection and ask for their address and a good time."
        }
        NextAction::EmergencyResponse => {
            "The visitor has an urgent problem. Give brief safety advice (move valuables, catch water) and ask for a phone number so the emergency crew can call back."
        }
        NextAction::ScheduleInspection => {
            "The visitor wants an appointment. Ask for their preferred day, address and phone number."
        }
        NextAction::ProvideInfo => {
            "The visitor is researching. Answer clearly and mention that warranties depend on the material chosen."
        }
        NextAction::ContinueConversation => {
            "Keep the conversation going and find out what roofing help they need."
        }
    };
    prompt.push_str(guidance);
    prompt.push('\n');

    if let Some(context) = context {
        prompt.push_str("\nUse this company information when relevant:\n");
        prompt.push_str(context);
        prompt.push('\n');
    }

    prompt
}

/// Reply used when no model is configured or the model call fails.
pub fn fallback_reply(action: NextAction, business_name: &str) -> String {
    match action {
        NextAction::ScheduleEstimate => format!(
            "{business_name} offers free, no-obligation estimates. Share your address and a good time and we'll set up an inspection so we can give you an accurate quote."
        ),
        NextAction::EmergencyResponse => format!(
            "Sorry to hear that! {business_name} handles emergency roof repairs. Move valuables away from the leak and leave your phone number so our emergency crew can call you right away."
        ),
        NextAction::ScheduleInspection => format!(
            "Happy to help you book a free roof inspection with {business_name}. What day works best, and what's the property address?"
        ),
        NextAction::ProvideInfo => format!(
            "{business_name} installs asphalt shingles, metal and tile roofing, each with manufacturer warranties. Which material are you considering?"
        ),
        NextAction::ContinueConversation => format!(
            "Thanks for reaching out to {business_name}! Are you looking for a repair, a replacement, or a free inspection?"
        ),
    }
}
