//! Courses command handler.

use super::load_system;
use clap::Args;
use syllabus_core::{config::AppConfig, AppResult};

/// List the loaded courses
#[derive(Args, Debug)]
pub struct CoursesCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CoursesCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing courses command");

        let system = load_system(config)?;
        let analytics = system.course_analytics();

        if self.json {
            let json = serde_json::to_string_pretty(&analytics)
                ?;
            println!("{}", json);
            return Ok(());
        }

        println!("Courses: {}", analytics.total_courses);
        for title in &analytics.course_titles {
            println!("  - {}", title);
        }

        Ok(())
    }
}
