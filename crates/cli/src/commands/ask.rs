//! Ask command handler.
//!
//! Answers a single course question.

use super::{load_system, print_response};
use clap::Args;
use syllabus_core::{config::AppConfig, AppError, AppResult};

/// Ask a question about the loaded courses
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Session id to read and extend conversation history
    #[arg(short, long)]
    pub session: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        if self.query.trim().is_empty() {
            return Err(AppError::Config("No question provided".to_string()));
        }

        let system = load_system(config)?;
        let response = system
            .query_with_timeout(&self.query, self.session.as_deref())
            .await;

        if self.json {
            let output = serde_json::json!({
                "answer": response.answer,
                "sources": response.sources,
                "sessionId": self.session,
            });
            let json = serde_json::to_string_pretty(&output)
                ?;
            println!("{}", json);
        } else {
            print_response(&response);
        }

        Ok(())
    }
}
