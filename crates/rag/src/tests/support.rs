//! Test doubles for the completion endpoint and the course index.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use syllabus_core::{AppError, AppResult};
use syllabus_knowledge::{Course, CourseChunk, CourseIndex, CourseMetadata, SearchResults};
use syllabus_llm::{ContentBlock, LlmClient, LlmRequest, LlmResponse, LlmUsage, StopReason};

/// Completion client that replays scripted responses and records requests.
#[derive(Default)]
pub struct ScriptedClient {
    responses: Mutex<VecDeque<AppResult<LlmResponse>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedClient {
    pub fn new(responses: Vec<AppResult<LlmResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedClient {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Llm("script exhausted".to_string())))
    }
}

pub fn text_response(text: &str) -> AppResult<LlmResponse> {
    Ok(LlmResponse::text_only(text, "test-model"))
}

/// A tool-use turn requesting `(id, name, input)` calls in order.
pub fn tool_response(calls: &[(&str, &str, serde_json::Value)]) -> AppResult<LlmResponse> {
    Ok(LlmResponse {
        content: calls
            .iter()
            .map(|(id, name, input)| ContentBlock::ToolUse {
                id: id.to_string(),
                name: name.to_string(),
                input: input.clone(),
            })
            .collect(),
        stop_reason: StopReason::ToolUse,
        model: "test-model".to_string(),
        usage: LlmUsage::default(),
    })
}

type SearchCall = (String, Option<String>, Option<u32>);

/// Course index with canned answers.
#[derive(Default)]
pub struct StubIndex {
    search: Option<SearchResults>,
    names: HashMap<String, String>,
    metadata: HashMap<String, CourseMetadata>,
    metadata_error: Option<String>,
    links: HashMap<(String, u32), String>,
    calls: Mutex<Vec<SearchCall>>,
}

impl StubIndex {
    pub fn with_search(mut self, results: SearchResults) -> Self {
        self.search = Some(results);
        self
    }

    /// Resolve `partial` to `canonical`.
    pub fn with_course(mut self, partial: &str, canonical: &str) -> Self {
        self.names.insert(partial.to_string(), canonical.to_string());
        self
    }

    pub fn with_metadata(mut self, metadata: CourseMetadata) -> Self {
        self.metadata.insert(metadata.title.clone(), metadata);
        self
    }

    pub fn with_metadata_error(mut self, error: &str) -> Self {
        self.metadata_error = Some(error.to_string());
        self
    }

    pub fn with_lesson_link(mut self, course: &str, lesson: u32, link: &str) -> Self {
        self.links
            .insert((course.to_string(), lesson), link.to_string());
        self
    }

    pub fn search_calls(&self) -> Vec<SearchCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl CourseIndex for StubIndex {
    fn search(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
    ) -> SearchResults {
        self.calls.lock().unwrap().push((
            query.to_string(),
            course_name.map(str::to_string),
            lesson_number,
        ));
        self.search.clone().unwrap_or_default()
    }

    fn resolve_course_name(&self, partial: &str) -> Option<String> {
        self.names.get(partial).cloned()
    }

    fn course_metadata(&self, title: &str) -> AppResult<Option<CourseMetadata>> {
        if let Some(error) = &self.metadata_error {
            return Err(AppError::Knowledge(error.clone()));
        }
        Ok(self.metadata.get(title).cloned())
    }

    fn lesson_link(&self, course_title: &str, lesson_number: u32) -> Option<String> {
        self.links
            .get(&(course_title.to_string(), lesson_number))
            .cloned()
    }

    fn course_titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = self.metadata.keys().cloned().collect();
        titles.sort();
        titles
    }

    fn add_course(&self, _course: &Course) -> AppResult<()> {
        Ok(())
    }

    fn add_chunks(&self, _chunks: &[CourseChunk]) -> AppResult<()> {
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        Ok(())
    }
}
