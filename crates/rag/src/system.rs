//! Answer assembler: history, query framing, generation and sources.

use crate::generator::{AiGenerator, GeneratorSettings, Outcome};
use crate::session::{ConversationHistory, SessionManager};
use crate::tools::{CourseOutlineTool, CourseSearchTool, Source, ToolRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use syllabus_core::{config::RagSettings, AppConfig, AppError, AppResult};
use syllabus_knowledge::{
    add_course_document, ingest_folder, ChunkingOptions, CourseIndex, IngestStats, MemoryIndex,
};
use syllabus_llm::{create_client, LlmClient};
use syllabus_prompt::PromptSet;

/// Answer and provenance for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub sources: Vec<Source>,
}

/// Catalog summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseAnalytics {
    pub total_courses: usize,
    pub course_titles: Vec<String>,
}

/// Course question answering over an index, a completion endpoint and tools.
pub struct RagSystem {
    settings: RagSettings,
    index: Arc<dyn CourseIndex>,
    registry: ToolRegistry,
    generator: AiGenerator,
    prompts: Arc<PromptSet>,
    sessions: Arc<SessionManager>,
}

impl RagSystem {
    /// Assemble a system; registers the search tool, then the outline tool.
    pub fn new(
        config: &AppConfig,
        index: Arc<dyn CourseIndex>,
        client: Arc<dyn LlmClient>,
        prompts: Arc<PromptSet>,
    ) -> AppResult<Self> {
        let mut registry = ToolRegistry::new();
        registry.register(CourseSearchTool::new(index.clone()))?;
        registry.register(CourseOutlineTool::new(index.clone()))?;

        let generator = AiGenerator::new(
            client,
            prompts.clone(),
            GeneratorSettings {
                model: config.model.clone(),
                max_tokens: config.rag.max_tokens,
                temperature: config.rag.temperature,
            },
        );

        Ok(Self {
            settings: config.rag.clone(),
            index,
            registry,
            generator,
            prompts,
            sessions: Arc::new(SessionManager::new(config.rag.max_history)),
        })
    }

    /// Build a system from configuration: provider client, workspace prompts
    /// and an empty in-memory index.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;

        let provider = config.provider_config(&config.provider);
        let endpoint = provider.and_then(|p| p.endpoint());
        let api_version = provider.and_then(|p| p.api_version());
        let api_key = config.resolve_api_key(&config.provider);
        let client = create_client(
            &config.provider,
            endpoint,
            api_key.as_deref(),
            api_version,
        )
        .map_err(AppError::Config)?;

        let prompts = Arc::new(PromptSet::load(&config.workspace)?);
        let index: Arc<dyn CourseIndex> = Arc::new(MemoryIndex::new(config.rag.max_results));

        tracing::info!(
            provider = client.provider_name(),
            model = %config.model,
            "Initialized course assistant"
        );

        Self::new(config, index, client, prompts)
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Forget a session's history; the id stays usable.
    pub fn clear_session(&self, session_id: &str) {
        self.sessions.clear_session(session_id);
        tracing::info!(session = %session_id, "Cleared session history");
    }

    /// Start a conversation and return its id.
    pub fn create_session(&self) -> String {
        self.sessions.create_session()
    }

    /// Answer a course question.
    ///
    /// Never fails; degraded outcomes are apologetic answers. History is
    /// written unless the first completion call failed.
    pub async fn query(&self, query: &str, session_id: Option<&str>) -> QueryResponse {
        let history = session_id.and_then(|id| self.sessions.get_formatted(id));
        let framed = self.prompts.render_query(query);
        let tools = self.registry.definitions();

        let generation = self
            .generator
            .generate_response(&framed, history.as_deref(), &tools, Some(&self.registry))
            .await;

        let mut ledger = generation.ledger;
        let sources = ledger.collect();
        ledger.clear();

        if let Some(id) = session_id {
            if generation.outcome == Outcome::Failed {
                tracing::debug!(session = %id, "Skipping history for failed query");
            } else {
                self.sessions.append(id, query, &generation.answer);
            }
        }

        tracing::info!(
            sources = sources.len(),
            dispatches = generation.dispatches,
            "Answered query"
        );

        QueryResponse {
            answer: generation.answer,
            sources,
        }
    }

    /// [`query`](Self::query) bounded by the configured timeout.
    pub async fn query_with_timeout(&self, query: &str, session_id: Option<&str>) -> QueryResponse {
        let limit = Duration::from_secs(self.settings.query_timeout_secs);
        self.query_within(query, session_id, limit).await
    }

    /// [`query`](Self::query) bounded by `limit`.
    ///
    /// An expired query is abandoned: no history is written and no sources
    /// are returned.
    pub async fn query_within(
        &self,
        query: &str,
        session_id: Option<&str>,
        limit: Duration,
    ) -> QueryResponse {
        match tokio::time::timeout(limit, self.query(query, session_id)).await {
            Ok(response) => response,
            Err(_) => {
                tracing::warn!("Query timed out after {:?}", limit);
                QueryResponse {
                    answer: format!(
                        "I'm sorry, the request timed out after {} seconds.",
                        limit.as_secs()
                    ),
                    sources: Vec::new(),
                }
            }
        }
    }

    fn chunking(&self) -> ChunkingOptions {
        ChunkingOptions {
            chunk_size: self.settings.chunk_size,
            chunk_overlap: self.settings.chunk_overlap,
        }
    }

    /// Load every course document in a folder.
    pub fn add_course_folder(&self, folder: &Path, clear_existing: bool) -> AppResult<IngestStats> {
        ingest_folder(self.index.as_ref(), folder, self.chunking(), clear_existing)
    }

    /// Load a single course document.
    pub fn add_course_document(&self, path: &Path) -> AppResult<IngestStats> {
        add_course_document(self.index.as_ref(), path, self.chunking())
    }

    pub fn course_analytics(&self) -> CourseAnalytics {
        let course_titles = self.index.course_titles();
        CourseAnalytics {
            total_courses: course_titles.len(),
            course_titles,
        }
    }
}
