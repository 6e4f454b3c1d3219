//! Healthcare chatbot.

use super::metrics;
use super::providers::{GenerationParams, TextProvider};
use crate::models::chat::ChatMessage;
use std::sync::Arc;
use tokio::sync::Mutex;

/// First message of every transcript.
pub const GREETING: &str = "Hello! How can I help you with your health questions today?";

/// Shown in place of an answer when the provider fails.
pub const FALLBACK_REPLY: &str =
    "Sorry, I'm having trouble connecting right now. Please try again later.";

const CHAT_INSTRUCTION: &str = "You are a friendly healthcare information assistant. \
Answer general health questions in plain language, in a few short paragraphs. \
You are not a doctor: do not diagnose, and recommend seeing a qualified \
professional for anything serious or urgent.";

/// Wraps a [`TextProvider`] behind a call that always yields display text.
pub struct ChatService {
    provider: Arc<dyn TextProvider>,
    params: GenerationParams,
}

impl ChatService {
    pub fn new(provider: Arc<dyn TextProvider>) -> Self {
        Self {
            provider,
            params: GenerationParams {
                system_instruction: Some(CHAT_INSTRUCTION.to_string()),
                temperature: Some(0.7),
                max_tokens: Some(1024),
            },
        }
    }

    /// Answer one user message. Provider failures become [`FALLBACK_REPLY`].
    pub async fn get_chatbot_response(&self, user_text: &str) -> String {
        match self.provider.generate(user_text, &self.params).await {
            Ok(response) => {
                tracing::debug!(
                    input_tokens = response.input_tokens,
                    output_tokens = response.output_tokens,
                    "Chatbot response generated"
                );
                metrics::record_chat_message("answered");
                response.text
            }
            Err(e) => {
                tracing::warn!(error = %e, "Chatbot provider failed");
                metrics::record_chat_message("fallback");
                FALLBACK_REPLY.to_string()
            }
        }
    }
}

/// One visitor's in-memory conversation.
pub struct ChatTranscript {
    messages: Mutex<Vec<ChatMessage>>,
    /// Held for a whole exchange so replies follow their own question.
    turn: Mutex<()>,
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(vec![ChatMessage::ai(GREETING)]),
            turn: Mutex::new(()),
        }
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.messages.lock().await.clone()
    }

    /// Append the user's message, await the reply, append it.
    ///
    /// Blank input is ignored and leaves the transcript untouched. Exchanges
    /// run one at a time: a second message waits until the first has its
    /// reply. Only the turn is held across the provider call, so a page
    /// refresh still shows the pending user message.
    pub async fn send(&self, chat: &ChatService, input: &str) -> Vec<ChatMessage> {
        let text = input.trim();
        if text.is_empty() {
            return self.messages().await;
        }

        let _turn = self.turn.lock().await;
        self.messages.lock().await.push(ChatMessage::user(input));

        let reply = chat.get_chatbot_response(text).await;

        let mut messages = self.messages.lock().await;
        messages.push(ChatMessage::ai(reply));
        messages.clone()
    }
}
