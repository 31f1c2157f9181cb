//! Answer assembler scenarios over a real in-memory index.

use super::support::{text_response, tool_response, ScriptedClient};
use crate::session::ConversationHistory;
use crate::system::RagSystem;
use crate::tools::Source;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use syllabus_core::{AppConfig, AppError, AppResult};
use syllabus_knowledge::{CourseIndex, MemoryIndex};
use syllabus_llm::{LlmClient, LlmRequest, LlmResponse, MessageContent};
use syllabus_prompt::PromptSet;
use tempfile::TempDir;

const TEST_COURSE: &str = "Course Title: Test Course
Course Link: https://example.com/test-course
Course Instructor: Test Instructor

Lesson 1: Getting Started
Lesson Link: https://example.com/test-course/1
This lesson introduces retrieval augmented generation and vector search.

Lesson 2: Going Further
This lesson covers evaluation of answers.
";

fn course_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("test_course.txt"), TEST_COURSE).unwrap();
    dir
}

fn system(client: Arc<dyn LlmClient>) -> (RagSystem, TempDir) {
    let dir = course_dir();
    let index: Arc<dyn CourseIndex> = Arc::new(MemoryIndex::new(5));
    let system = RagSystem::new(
        &AppConfig::default(),
        index,
        client,
        Arc::new(PromptSet::builtin().unwrap()),
    )
    .unwrap();
    system.add_course_folder(dir.path(), false).unwrap();
    (system, dir)
}

fn lesson_one_search() -> AppResult<LlmResponse> {
    tool_response(&[(
        "t1",
        "search_course_content",
        json!({"query": "lesson 1", "course_name": "Test Course", "lesson_number": 1}),
    )])
}

#[tokio::test]
async fn lesson_question_cites_lesson_source() {
    let client = Arc::new(ScriptedClient::new(vec![
        lesson_one_search(),
        text_response("Lesson 1 introduces retrieval augmented generation."),
    ]));
    let (rag, _dir) = system(client.clone());

    let response = rag.query("What is in lesson 1 of Test Course?", None).await;

    assert_eq!(
        response.answer,
        "Lesson 1 introduces retrieval augmented generation."
    );
    assert_eq!(
        response.sources,
        vec![Source::new(
            "Test Course - Lesson 1",
            Some("https://example.com/test-course/1".to_string())
        )]
    );

    let first = &client.requests()[0];
    assert_eq!(
        first.messages[0].content,
        MessageContent::Text(
            "Answer this question about course materials: What is in lesson 1 of Test Course?"
                .to_string()
        )
    );
    let tool_names: Vec<_> = first.tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tool_names, vec!["search_course_content", "get_course_outline"]);
}

#[tokio::test]
async fn sources_do_not_leak_into_the_next_query() {
    let client = Arc::new(ScriptedClient::new(vec![
        lesson_one_search(),
        text_response("first"),
        text_response("general knowledge answer"),
    ]));
    let (rag, _dir) = system(client);

    let first = rag.query("What is in lesson 1 of Test Course?", None).await;
    assert_eq!(first.sources.len(), 1);

    let second = rag.query("What is 2 + 2?", None).await;
    assert_eq!(second.answer, "general knowledge answer");
    assert!(second.sources.is_empty());
}

#[tokio::test]
async fn outline_question_cites_course() {
    let client = Arc::new(ScriptedClient::new(vec![
        tool_response(&[("t1", "get_course_outline", json!({"course_name": "test course"}))]),
        text_response("Two lessons."),
    ]));
    let (rag, _dir) = system(client.clone());

    let response = rag.query("Outline the Test Course", None).await;
    assert_eq!(
        response.sources,
        vec![Source::new(
            "Test Course",
            Some("https://example.com/test-course".to_string())
        )]
    );

    let MessageContent::Blocks(blocks) = &client.requests()[1].messages[2].content else {
        panic!("tool results should be blocks");
    };
    let folded = serde_json::to_value(&blocks[0]).unwrap();
    let outline = folded["content"].as_str().unwrap();
    assert!(outline.contains("Lessons (2 total):"));
    assert!(outline.contains("Lesson 2: Going Further"));
}

#[tokio::test]
async fn history_is_written_and_replayed() {
    let client = Arc::new(ScriptedClient::new(vec![
        text_response("MCP is a protocol."),
        text_response("It has lessons."),
    ]));
    let (rag, _dir) = system(client.clone());
    let session = rag.create_session();

    rag.query("What is MCP?", Some(&session)).await;
    rag.query("Tell me more", Some(&session)).await;

    assert_eq!(
        rag.sessions().get_formatted(&session).unwrap(),
        "User: What is MCP?\nAssistant: MCP is a protocol.\nUser: Tell me more\nAssistant: It has lessons."
    );

    let second_system = client.requests()[1].system.clone().unwrap();
    assert!(second_system.contains("Previous conversation:\nUser: What is MCP?\nAssistant: MCP is a protocol."));
}

#[tokio::test]
async fn failed_first_call_writes_no_history() {
    let client = Arc::new(ScriptedClient::new(vec![Err(AppError::Llm(
        "connection refused".to_string(),
    ))]));
    let (rag, _dir) = system(client);
    let session = rag.create_session();

    let response = rag.query("What is MCP?", Some(&session)).await;

    assert!(response.answer.contains("connection refused"));
    assert!(response.sources.is_empty());
    assert_eq!(rag.sessions().get_formatted(&session), None);
}

struct SlowClient;

#[async_trait::async_trait]
impl LlmClient for SlowClient {
    fn provider_name(&self) -> &str {
        "slow"
    }

    async fn complete(&self, _request: &LlmRequest) -> AppResult<LlmResponse> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(LlmResponse::text_only("too late", "slow"))
    }
}

#[tokio::test]
async fn timed_out_query_is_abandoned() {
    let (rag, _dir) = system(Arc::new(SlowClient));
    let session = rag.create_session();

    let response = rag
        .query_within("What is MCP?", Some(&session), Duration::from_millis(20))
        .await;

    assert!(response.answer.contains("timed out"));
    assert!(response.sources.is_empty());
    assert_eq!(rag.sessions().get_formatted(&session), None);
}

#[tokio::test]
async fn analytics_and_ingestion() {
    let (rag, dir) = system(Arc::new(ScriptedClient::default()));

    let analytics = rag.course_analytics();
    assert_eq!(analytics.total_courses, 1);
    assert_eq!(analytics.course_titles, vec!["Test Course"]);

    let again = rag.add_course_folder(dir.path(), false).unwrap();
    assert_eq!(again.courses_added, 0);

    let extra = dir.path().join("second.md");
    std::fs::write(&extra, "Course Title: Second Course\nLesson 1: Only\nBody text.\n").unwrap();
    let added = rag.add_course_document(&extra).unwrap();
    assert_eq!(added.courses_added, 1);
    assert_eq!(rag.course_analytics().total_courses, 2);
}

#[tokio::test]
async fn missing_course_folder_adds_nothing() {
    let (rag, dir) = system(Arc::new(ScriptedClient::default()));

    let stats = rag
        .add_course_folder(&dir.path().join("nowhere"), false)
        .unwrap();

    assert_eq!(stats.courses_added, 0);
    assert_eq!(stats.chunks_added, 0);
    assert_eq!(rag.course_analytics().total_courses, 1);
}

#[tokio::test]
async fn degraded_answer_is_still_recorded() {
    let client = Arc::new(ScriptedClient::new(vec![
        lesson_one_search(),
        Err(AppError::Llm("overloaded".to_string())),
    ]));
    let (rag, _dir) = system(client);
    let session = rag.create_session();

    let response = rag.query("What is in lesson 1?", Some(&session)).await;

    assert!(response.answer.contains("follow-up analysis"));
    let history = rag.sessions().get_formatted(&session).unwrap();
    assert!(history.starts_with("User: What is in lesson 1?\nAssistant: I gathered some information"));
}

#[tokio::test]
async fn cleared_session_starts_over() {
    let client = Arc::new(ScriptedClient::new(vec![
        text_response("MCP is a protocol."),
        text_response("Hello again."),
    ]));
    let (rag, _dir) = system(client.clone());
    let session = rag.create_session();

    rag.query("What is MCP?", Some(&session)).await;
    rag.clear_session(&session);
    assert_eq!(rag.sessions().get_formatted(&session), None);

    rag.query("Hi", Some(&session)).await;
    assert!(!client.requests()[1]
        .system
        .clone()
        .unwrap()
        .contains("Previous conversation:"));
    assert_eq!(
        rag.sessions().get_formatted(&session).unwrap(),
        "User: Hi\nAssistant: Hello again."
    );
}

/// Answers outline questions with the outline tool and everything else with
/// a lesson search, pausing so that concurrent queries interleave.
struct RoutingClient;

fn question(request: &LlmRequest) -> String {
    match &request.messages[0].content {
        MessageContent::Text(text) => text.clone(),
        MessageContent::Blocks(_) => String::new(),
    }
}

#[async_trait::async_trait]
impl LlmClient for RoutingClient {
    fn provider_name(&self) -> &str {
        "routing"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let outline = question(request).contains("Outline");
        let first_round = request.messages.len() == 1;

        let pause = match (outline, first_round) {
            (true, true) => 10,
            (false, true) => 20,
            (true, false) => 40,
            (false, false) => 0,
        };
        tokio::time::sleep(Duration::from_millis(pause)).await;

        match (outline, first_round) {
            (true, true) => tool_response(&[(
                "a1",
                "get_course_outline",
                json!({"course_name": "Test Course"}),
            )]),
            (false, true) => lesson_one_search(),
            (true, false) => text_response("outline answer"),
            (false, false) => text_response("lesson answer"),
        }
    }
}

#[tokio::test]
async fn concurrent_queries_keep_their_own_sources() {
    let (rag, _dir) = system(Arc::new(RoutingClient));

    let (outline, lesson) = tokio::join!(
        rag.query("Outline the Test Course", None),
        rag.query("What is in lesson 1 of Test Course?", None)
    );

    assert_eq!(outline.answer, "outline answer");
    assert_eq!(
        outline.sources,
        vec![Source::new(
            "Test Course",
            Some("https://example.com/test-course".to_string())
        )]
    );

    assert_eq!(lesson.answer, "lesson answer");
    assert_eq!(
        lesson.sources,
        vec![Source::new(
            "Test Course - Lesson 1",
            Some("https://example.com/test-course/1".to_string())
        )]
    );
}
