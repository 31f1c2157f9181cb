//! Command handlers for the Syllabus CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod chat;
pub mod courses;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use courses::CoursesCommand;

use syllabus_core::{config::AppConfig, AppResult};
use syllabus_rag::{QueryResponse, RagSystem};

/// Build the assistant and load the configured course folder.
pub(crate) fn load_system(config: &AppConfig) -> AppResult<RagSystem> {
    let system = RagSystem::from_config(config)?;

    let docs = config.resolved_docs_path();
    let stats = system.add_course_folder(&docs, false)?;
    tracing::info!(
        "Loaded {} courses with {} chunks from {:?}",
        stats.courses_added,
        stats.chunks_added,
        docs
    );

    Ok(system)
}

/// Print an answer followed by its sources.
pub(crate) fn print_response(response: &QueryResponse) {
    println!("{}", response.answer);

    if !response.sources.is_empty() {
        println!();
        println!("Sources:");
        for source in &response.sources {
            match &source.link {
                Some(link) => println!("  - {} ({})", source.display, link),
                None => println!("  - {}", source.display),
            }
        }
    }
}
