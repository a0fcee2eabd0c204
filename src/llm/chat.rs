use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use super::client::{ChatCompletionClient, ChatMessage};
use crate::models::ChatSource;

pub const CHAT_MAX_TOKENS: u32 = 150;

/// Conversations kept in memory; the least recently used is evicted beyond this.
pub const MAX_CONVERSATIONS: usize = 1000;

/// Exchanges (user plus assistant message) kept per conversation, besides
/// the system prompt.
pub const MAX_HISTORY_TURNS: usize = 20;

pub const FALLBACK_REPLY: &str =
    "Sorry, I'm having trouble reaching the assistant right now. Please try again in a moment.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub conversation_id: String,
    pub reply: String,
    pub source: ChatSource,
}

struct Conversation {
    /// Assigned at creation; a reset followed by a new turn yields a new one.
    epoch: u64,
    last_active: u64,
    /// Exchanges after the system prompt, oldest first.
    turns: Vec<ChatMessage>,
}

#[derive(Default)]
struct ConversationStore {
    entries: HashMap<String, Conversation>,
    clock: u64,
}

impl ConversationStore {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, c)| c.last_active)
            .map(|(id, _)| id.clone());
        if let Some(id) = oldest {
            self.entries.remove(&id);
            tracing::debug!(conversation = %id, "Evicted idle conversation");
        }
    }
}

/// Multi-turn cardiovascular assistant.
///
/// Each conversation starts with the system prompt. A turn is only recorded
/// once the provider has answered, so a failed exchange can be retried
/// without duplicating the user message. The store is bounded both in
/// conversations and in turns per conversation.
pub struct ChatService {
    client: Option<ChatCompletionClient>,
    system_prompt: String,
    max_conversations: usize,
    max_turns: usize,
    store: Mutex<ConversationStore>,
}

impl ChatService {
    /// `client` is `None` when no provider key is configured; every turn then
    /// gets the fallback reply.
    pub fn new(client: Option<ChatCompletionClient>, system_prompt: &str) -> Self {
        Self::with_limits(client, system_prompt, MAX_CONVERSATIONS, MAX_HISTORY_TURNS)
    }

    pub fn with_limits(
        client: Option<ChatCompletionClient>,
        system_prompt: &str,
        max_conversations: usize,
        max_turns: usize,
    ) -> Self {
        Self {
            client,
            system_prompt: system_prompt.to_string(),
            max_conversations: max_conversations.max(1),
            max_turns,
            store: Mutex::new(ConversationStore::default()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    fn store(&self) -> MutexGuard<'_, ConversationStore> {
        self.store
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub async fn ask(&self, conversation_id: Option<String>, message: &str) -> ChatReply {
        let conversation_id =
            conversation_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let Some(client) = &self.client else {
            tracing::warn!(conversation = %conversation_id, "Chat provider not configured");
            return fallback(conversation_id);
        };

        // Snapshot the history so the lock is not held across the request.
        let (started_epoch, mut messages) = {
            let store = self.store();
            let existing = store.entries.get(&conversation_id);
            let mut messages = vec![ChatMessage::system(&self.system_prompt)];
            if let Some(conversation) = existing {
                messages.extend(conversation.turns.iter().cloned());
            }
            (existing.map(|c| c.epoch), messages)
        };
        messages.push(ChatMessage::user(message));

        match client.complete(&messages, CHAT_MAX_TOKENS, None).await {
            Ok(Some(content)) => {
                let reply = content.trim().to_string();
                self.record_turn(&conversation_id, started_epoch, message, &reply);
                ChatReply {
                    conversation_id,
                    reply,
                    source: ChatSource::Model,
                }
            }
            Ok(None) => {
                tracing::warn!(conversation = %conversation_id, "Chat provider returned no content");
                fallback(conversation_id)
            }
            Err(e) => {
                tracing::warn!(conversation = %conversation_id, error = %e, "Chat request failed");
                fallback(conversation_id)
            }
        }
    }

    /// Append one exchange to the stored conversation. Turns that raced with
    /// others on the same id are all kept; a turn whose conversation was
    /// reset while it was in flight is dropped.
    fn record_turn(&self, id: &str, started_epoch: Option<u64>, message: &str, reply: &str) {
        let mut store = self.store();
        let now = store.tick();

        let stale = match (store.entries.get(id), started_epoch) {
            (Some(current), Some(epoch)) => current.epoch != epoch,
            (None, Some(_)) => true,
            (_, None) => false,
        };
        if stale {
            tracing::info!(conversation = %id, "Conversation reset during request, reply not recorded");
            return;
        }

        if !store.entries.contains_key(id) && store.entries.len() >= self.max_conversations {
            store.evict_least_recent();
        }

        let conversation = store
            .entries
            .entry(id.to_string())
            .or_insert_with(|| Conversation {
                epoch: now,
                last_active: now,
                turns: Vec::new(),
            });
        conversation.last_active = now;
        conversation.turns.push(ChatMessage::user(message));
        conversation.turns.push(ChatMessage::assistant(reply));

        let keep = self.max_turns * 2;
        if conversation.turns.len() > keep {
            let excess = conversation.turns.len() - keep;
            conversation.turns.drain(..excess);
        }

        tracing::info!(conversation = %id, turns = conversation.turns.len() / 2, "Chat reply");
    }

    /// Forget a conversation. Returns whether it existed.
    pub fn reset(&self, conversation_id: &str) -> bool {
        self.store().entries.remove(conversation_id).is_some()
    }

    #[cfg(test)]
    fn history(&self, conversation_id: &str) -> Option<Vec<ChatMessage>> {
        self.store().entries.get(conversation_id).map(|c| {
            let mut messages = vec![ChatMessage::system(&self.system_prompt)];
            messages.extend(c.turns.iter().cloned());
            messages
        })
    }

    #[cfg(test)]
    fn conversation_count(&self) -> usize {
        self.store().entries.len()
    }
}

fn fallback(conversation_id: String) -> ChatReply {
    ChatReply {
        conversation_id,
        reply: FALLBACK_REPLY.to_string(),
        source: ChatSource::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{closed_port_url, spawn_upstream};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::time::Duration;

    /// Upstream that replies with the number of messages it was sent, after
    /// `delay`.
    async fn counting_client(delay: Duration) -> ChatCompletionClient {
        let app = Router::new().route(
            "/chat",
            post(move |Json(body): Json<serde_json::Value>| async move {
                let count = body["messages"].as_array().map(Vec::len).unwrap_or(0);
                assert_eq!(body["max_tokens"], 150);
                tokio::time::sleep(delay).await;
                Json(serde_json::json!({
                    "choices": [{"message": {"content": format!("  seen {count}  ")}}]
                }))
            }),
        );
        let base = spawn_upstream(app).await;
        ChatCompletionClient::new(
            &format!("{base}/chat"),
            "gsk-test",
            "llama",
            Duration::from_secs(2),
        )
        .unwrap()
    }

    async fn counting_service() -> ChatService {
        let client = counting_client(Duration::ZERO).await;
        ChatService::new(Some(client), "You are a helpful cardiovascular health assistant.")
    }

    #[tokio::test]
    async fn new_conversation_gets_an_id_and_system_prompt() {
        let service = counting_service().await;
        let reply = service.ask(None, "hello").await;

        assert!(uuid::Uuid::parse_str(&reply.conversation_id).is_ok());
        assert_eq!(reply.reply, "seen 2");
        assert_eq!(reply.source, ChatSource::Model);

        let history = service.history(&reply.conversation_id).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, "system");
        assert_eq!(history[2], ChatMessage::assistant("seen 2"));
    }

    #[tokio::test]
    async fn turns_accumulate_per_conversation() {
        let service = counting_service().await;
        let first = service.ask(Some("a".into()), "one").await;
        let second = service.ask(Some("a".into()), "two").await;
        let other = service.ask(Some("b".into()), "one").await;

        assert_eq!(first.reply, "seen 2");
        assert_eq!(second.reply, "seen 4");
        assert_eq!(other.reply, "seen 2");
    }

    #[tokio::test]
    async fn reset_drops_history() {
        let service = counting_service().await;
        service.ask(Some("a".into()), "one").await;
        assert!(service.reset("a"));
        assert!(!service.reset("a"));
        let again = service.ask(Some("a".into()), "one").await;
        assert_eq!(again.reply, "seen 2");
    }

    #[tokio::test]
    async fn failed_exchange_is_not_recorded() {
        let base = closed_port_url().await;
        let client = ChatCompletionClient::new(
            &format!("{base}/chat"),
            "k",
            "m",
            Duration::from_secs(2),
        )
        .unwrap();
        let service = ChatService::new(Some(client), "prompt");

        let reply = service.ask(Some("a".into()), "hello").await;
        assert_eq!(reply.source, ChatSource::Fallback);
        assert_eq!(reply.reply, FALLBACK_REPLY);
        assert_eq!(reply.conversation_id, "a");
        assert!(service.history("a").is_none());
    }

    #[tokio::test]
    async fn unconfigured_service_always_falls_back() {
        let service = ChatService::new(None, "prompt");
        assert!(!service.is_configured());
        let reply = service.ask(None, "hello").await;
        assert_eq!(reply.source, ChatSource::Fallback);
    }

    #[tokio::test]
    async fn history_keeps_only_recent_turns() {
        let client = counting_client(Duration::ZERO).await;
        let service = ChatService::with_limits(Some(client), "prompt", 10, 2);

        let replies = [
            service.ask(Some("a".into()), "1").await.reply,
            service.ask(Some("a".into()), "2").await.reply,
            service.ask(Some("a".into()), "3").await.reply,
            service.ask(Some("a".into()), "4").await.reply,
        ];
        // system + two kept exchanges + the new user message
        assert_eq!(replies, ["seen 2", "seen 4", "seen 6", "seen 6"]);

        let history = service.history("a").unwrap();
        assert_eq!(history.len(), 5);
        assert_eq!(history[0], ChatMessage::system("prompt"));
        assert_eq!(history[1], ChatMessage::user("3"));
        assert_eq!(history[3], ChatMessage::user("4"));
    }

    #[tokio::test]
    async fn least_recent_conversation_is_evicted() {
        let client = counting_client(Duration::ZERO).await;
        let service = ChatService::with_limits(Some(client), "prompt", 2, 20);

        service.ask(Some("a".into()), "hi").await;
        service.ask(Some("b".into()), "hi").await;
        service.ask(Some("a".into()), "again").await;
        service.ask(Some("c".into()), "hi").await;

        assert_eq!(service.conversation_count(), 2);
        assert!(service.history("a").is_some());
        assert!(service.history("b").is_none());
        assert!(service.history("c").is_some());
    }

    #[tokio::test]
    async fn concurrent_turns_are_both_recorded() {
        let client = counting_client(Duration::from_millis(100)).await;
        let service = ChatService::new(Some(client), "prompt");
        service.ask(Some("a".into()), "first").await;

        let (left, right) = tokio::join!(
            service.ask(Some("a".into()), "left"),
            service.ask(Some("a".into()), "right"),
        );
        assert_eq!(left.reply, "seen 4");
        assert_eq!(right.reply, "seen 4");

        let history = service.history("a").unwrap();
        assert_eq!(history.len(), 7);
        let users: Vec<&str> = history
            .iter()
            .filter(|m| m.role == "user")
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(users.len(), 3);
        assert!(users.contains(&"left"));
        assert!(users.contains(&"right"));
    }

    #[tokio::test]
    async fn reset_during_a_turn_is_not_undone() {
        let client = counting_client(Duration::from_millis(200)).await;
        let service = ChatService::new(Some(client), "prompt");
        service.ask(Some("a".into()), "first").await;

        let (reply, existed) = tokio::join!(service.ask(Some("a".into()), "second"), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            service.reset("a")
        });
        assert!(existed);
        assert_eq!(reply.source, ChatSource::Model);
        assert!(service.history("a").is_none());
    }
}
