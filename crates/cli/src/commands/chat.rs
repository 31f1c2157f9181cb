//! Chat command handler.
//!
//! Interactive question loop on stdin sharing one session.

use super::{load_system, print_response};
use clap::Args;
use std::io::Write;
use syllabus_core::{config::AppConfig, AppResult};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Ask follow-up questions in one conversation
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Reuse an existing session id instead of starting a new one
    #[arg(short, long)]
    pub session: Option<String>,
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let system = load_system(config)?;
        let session = match &self.session {
            Some(id) => id.clone(),
            None => system.create_session(),
        };
        tracing::debug!(session = %session, "Chat session ready");

        let analytics = system.course_analytics();
        println!(
            "{} courses loaded. Type a question, 'clear' to forget the conversation, or 'exit' to quit.",
            analytics.total_courses
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let query = line.trim();
            if query.is_empty() {
                continue;
            }
            if matches!(query, "exit" | "quit") {
                break;
            }
            if query == "clear" {
                system.clear_session(&session);
                println!("Conversation cleared.");
                continue;
            }

            let response = system.query_with_timeout(query, Some(&session)).await;
            print_response(&response);
            println!();
        }

        Ok(())
    }
}
