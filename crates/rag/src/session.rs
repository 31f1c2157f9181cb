//! Conversation history per session.

use dashmap::DashMap;
use std::collections::VecDeque;

/// History collaborator used by the answer assembler.
pub trait ConversationHistory: Send + Sync {
    /// Recent exchanges rendered for the system directive, if any.
    fn get_formatted(&self, session_id: &str) -> Option<String>;

    /// Record one question and its answer.
    fn append(&self, session_id: &str, query: &str, answer: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Exchange {
    query: String,
    answer: String,
}

/// In-memory sessions keeping the last `max_history` exchanges each.
#[derive(Debug)]
pub struct SessionManager {
    sessions: DashMap<String, VecDeque<Exchange>>,
    max_history: usize,
}

impl SessionManager {
    pub fn new(max_history: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            max_history,
        }
    }

    /// Start a new, empty session and return its id.
    pub fn create_session(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.sessions.insert(id.clone(), VecDeque::new());
        tracing::debug!(session = %id, "Created session");
        id
    }

    /// Forget a session's history.
    pub fn clear_session(&self, session_id: &str) {
        if let Some(mut exchanges) = self.sessions.get_mut(session_id) {
            exchanges.clear();
        }
    }
}

impl ConversationHistory for SessionManager {
    fn get_formatted(&self, session_id: &str) -> Option<String> {
        let exchanges = self.sessions.get(session_id)?;
        if exchanges.is_empty() {
            return None;
        }

        let lines: Vec<String> = exchanges
            .iter()
            .map(|e| format!("User: {}\nAssistant: {}", e.query, e.answer))
            .collect();
        Some(lines.join("\n"))
    }

    fn append(&self, session_id: &str, query: &str, answer: &str) {
        if self.max_history == 0 {
            return;
        }

        let mut exchanges = self.sessions.entry(session_id.to_string()).or_default();
        exchanges.push_back(Exchange {
            query: query.to_string(),
            answer: answer.to_string(),
        });
        while exchanges.len() > self.max_history {
            exchanges.pop_front();
        }
    }
}
