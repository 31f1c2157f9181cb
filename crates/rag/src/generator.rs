//! Tool-mediated answer generation.
//!
//! The model gets at most [`MAX_ROUNDS`] tool-enabled calls. If it is still
//! asking for tools after the last round, one more call is made with tools
//! disabled, so every run ends in plain text.

use crate::tools::{SourceLedger, ToolRegistry};
use futures::future::join_all;
use std::sync::Arc;
use syllabus_llm::{
    LlmClient, LlmRequest, LlmResponse, Message, ToolChoice, ToolDefinition, ToolInvocation,
    ToolResult,
};
use syllabus_prompt::PromptSet;

/// Tool-enabled rounds per query.
pub const MAX_ROUNDS: usize = 2;

const NO_REGISTRY_MESSAGE: &str = "I was unable to complete the request within the allowed rounds.";
const FOLLOW_UP_FAILURE_MESSAGE: &str = "I gathered some information but encountered an error in follow-up analysis. Please try rephrasing your question.";
const FINAL_FAILURE_MESSAGE: &str =
    "I gathered some information but encountered an error in final processing.";

/// Where the generation loop is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Round1,
    Round2,
    /// Tools exhausted; one last call without them
    FinalForced,
    Done(Finish),
}

impl Phase {
    fn round(&self) -> usize {
        match self {
            Phase::Round1 => 1,
            _ => MAX_ROUNDS,
        }
    }

    fn after_tools(&self) -> Phase {
        match self {
            Phase::Round1 => Phase::Round2,
            _ => Phase::FinalForced,
        }
    }
}

/// What produced the final answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Model output
    Answered,
    /// A fallback message after the model had already responded
    Degraded,
    /// The first completion call failed; nothing was answered
    Failed,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finish {
    pub answer: String,
    pub outcome: Outcome,
}

impl Finish {
    fn answered(answer: String) -> Self {
        Self {
            answer,
            outcome: Outcome::Answered,
        }
    }

    fn degraded(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            outcome: Outcome::Degraded,
        }
    }

    fn failed(answer: String) -> Self {
        Self {
            answer,
            outcome: Outcome::Failed,
        }
    }
}

/// Outcome of [`AiGenerator::generate_response`].
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub answer: String,
    pub outcome: Outcome,

    /// Sources captured by tool calls during this run
    pub ledger: SourceLedger,

    /// Number of tool dispatches performed
    pub dispatches: usize,
}

/// Completion parameters shared by every call of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

struct Run<'a> {
    history: Option<&'a str>,
    tools: &'a [ToolDefinition],
    registry: Option<&'a ToolRegistry>,
    messages: Vec<Message>,
    ledger: SourceLedger,
    dispatches: usize,
}

/// Drives the bounded tool-use loop against a completion endpoint.
pub struct AiGenerator {
    client: Arc<dyn LlmClient>,
    prompts: Arc<PromptSet>,
    settings: GeneratorSettings,
}

impl AiGenerator {
    pub fn new(
        client: Arc<dyn LlmClient>,
        prompts: Arc<PromptSet>,
        settings: GeneratorSettings,
    ) -> Self {
        Self {
            client,
            prompts,
            settings,
        }
    }

    /// Answer `query`, calling tools from `registry` when the model asks.
    ///
    /// Never fails: endpoint errors become apology text in the answer.
    pub async fn generate_response(
        &self,
        query: &str,
        history: Option<&str>,
        tools: &[ToolDefinition],
        registry: Option<&ToolRegistry>,
    ) -> Generation {
        let mut run = Run {
            history,
            tools,
            registry,
            messages: vec![Message::user(query)],
            ledger: registry.map(ToolRegistry::ledger).unwrap_or_default(),
            dispatches: 0,
        };

        let mut phase = Phase::Round1;
        let finish = loop {
            phase = match phase {
                Phase::Round1 | Phase::Round2 => self.tool_round(&mut run, phase).await,
                Phase::FinalForced => Phase::Done(self.final_call(&run).await),
                Phase::Done(finish) => break finish,
            };
        };

        tracing::debug!(
            outcome = ?finish.outcome,
            dispatches = run.dispatches,
            "Generation finished"
        );

        Generation {
            answer: finish.answer,
            outcome: finish.outcome,
            ledger: run.ledger,
            dispatches: run.dispatches,
        }
    }

    async fn tool_round(&self, run: &mut Run<'_>, phase: Phase) -> Phase {
        let round = phase.round();
        let request = self.request(run, round, true);

        tracing::debug!(
            round,
            tools = !run.tools.is_empty(),
            messages = run.messages.len(),
            "Requesting completion"
        );

        let response = match self.client.complete(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(round, "Completion failed: {}", e);
                return Phase::Done(if phase == Phase::Round1 {
                    Finish::failed(format!(
                        "I'm sorry, I encountered an error while processing your request: {}",
                        e
                    ))
                } else {
                    Finish::degraded(FOLLOW_UP_FAILURE_MESSAGE)
                });
            }
        };

        let invocations = response.tool_invocations();
        if !response.requests_tools() || invocations.is_empty() {
            return Phase::Done(Finish::answered(response.text()));
        }

        let Some(registry) = run.registry else {
            tracing::warn!("Model requested tools but no registry is configured");
            return Phase::Done(Finish::degraded(NO_REGISTRY_MESSAGE));
        };

        let results = self
            .run_tools(registry, &invocations, &mut run.ledger)
            .await;
        run.dispatches += invocations.len();
        run.messages
            .push(Message::assistant_blocks(response.replayable_content()));
        run.messages.push(Message::tool_results(results));

        phase.after_tools()
    }

    async fn final_call(&self, run: &Run<'_>) -> Finish {
        let request = self.request(run, MAX_ROUNDS, false);

        tracing::debug!("Requesting final completion without tools");

        match self.client.complete(&request).await {
            Ok(response) => Finish::answered(final_text(&response)),
            Err(e) => {
                tracing::warn!("Final completion failed: {}", e);
                Finish::degraded(FINAL_FAILURE_MESSAGE)
            }
        }
    }

    /// Dispatch one round's invocations concurrently, results in request order.
    async fn run_tools(
        &self,
        registry: &ToolRegistry,
        invocations: &[ToolInvocation],
        ledger: &mut SourceLedger,
    ) -> Vec<ToolResult> {
        let outcomes = join_all(
            invocations
                .iter()
                .map(|call| {
                    tracing::debug!(tool = %call.name, invocation_id = %call.id, "Dispatching tool");
                    registry.dispatch(&call.name, call.arguments.clone())
                }),
        )
        .await;

        invocations
            .iter()
            .zip(outcomes)
            .map(|(call, outcome)| match outcome {
                Ok(dispatch) => {
                    ledger.record(&dispatch);
                    ToolResult::ok(&call.id, dispatch.content)
                }
                Err(e) => ToolResult::error(&call.id, format!("Error executing tool: {}", e)),
            })
            .collect()
    }

    fn request(&self, run: &Run<'_>, round: usize, with_tools: bool) -> LlmRequest {
        let system = self.prompts.render_system(run.history, round, MAX_ROUNDS);
        let request = LlmRequest::new(&self.settings.model, run.messages.clone())
            .with_system(system)
            .with_max_tokens(self.settings.max_tokens)
            .with_temperature(self.settings.temperature);

        if with_tools {
            request.with_tools(run.tools.to_vec(), ToolChoice::Auto)
        } else {
            request
        }
    }
}

fn final_text(response: &LlmResponse) -> String {
    if response.requests_tools() {
        tracing::warn!("Model asked for tools after they were disabled; using its text");
    }
    response.text()
}
