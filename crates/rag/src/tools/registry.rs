//! Tool registry and per-query source ledger.

use super::{Source, Tool, ToolError, ToolOutput};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use syllabus_core::{AppError, AppResult};
use syllabus_llm::ToolDefinition;

/// Object-safe view of a typed tool.
#[async_trait]
trait ErasedTool: Send + Sync {
    fn definition(&self) -> &ToolDefinition;

    async fn call(&self, arguments: Value) -> Result<ToolOutput, ToolError>;
}

struct TypedTool<T> {
    tool: T,
    definition: ToolDefinition,
}

#[async_trait]
impl<T> ErasedTool for TypedTool<T>
where
    T: Tool + 'static,
{
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn call(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let input: T::Input =
            serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments {
                tool: self.definition.name.clone(),
                reason: e.to_string(),
            })?;
        self.tool.execute(input).await
    }
}

/// Result of one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    /// Name the model asked for
    pub tool: String,
    pub content: String,
    pub sources: Vec<Source>,
}

/// Tools available to the model, in registration order.
///
/// Built once and then shared read-only across queries.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn ErasedTool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under the name in its definition.
    ///
    /// Fails on a blank name or a name that is already taken.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> AppResult<()> {
        let entry = Self::erase(tool)?;
        let name = entry.definition().name.clone();

        if self.position(&name).is_some() {
            return Err(AppError::Tool(format!(
                "Tool '{}' is already registered",
                name
            )));
        }

        tracing::info!(target: "tool_registry", tool = %name, "Registering tool");
        self.tools.push(entry);
        Ok(())
    }

    /// Register a tool, replacing any tool with the same name in place.
    ///
    /// Returns `true` when an existing tool was replaced.
    pub fn replace<T: Tool + 'static>(&mut self, tool: T) -> AppResult<bool> {
        let entry = Self::erase(tool)?;
        let name = entry.definition().name.clone();

        match self.position(&name) {
            Some(i) => {
                tracing::warn!(target: "tool_registry", tool = %name, "Replacing registered tool");
                self.tools[i] = entry;
                Ok(true)
            }
            None => {
                tracing::info!(target: "tool_registry", tool = %name, "Registering tool");
                self.tools.push(entry);
                Ok(false)
            }
        }
    }

    fn erase<T: Tool + 'static>(tool: T) -> AppResult<Arc<dyn ErasedTool>> {
        let definition = tool.definition();
        if definition.name.trim().is_empty() {
            return Err(AppError::Tool(
                "Tool definition is missing a name".to_string(),
            ));
        }
        Ok(Arc::new(TypedTool { tool, definition }))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.tools.iter().position(|t| t.definition().name == name)
    }

    /// Definitions in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition().clone()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools
            .iter()
            .map(|t| t.definition().name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Empty ledger with one slot per registered tool.
    pub fn ledger(&self) -> SourceLedger {
        SourceLedger {
            slots: self
                .tools
                .iter()
                .map(|t| (t.definition().name.clone(), Vec::new()))
                .collect(),
        }
    }

    /// Run a tool by name.
    ///
    /// An unknown name is not an error: the model sometimes invents tools,
    /// and it is told so in the returned content. Tool failures are returned
    /// as `Err` for the caller to render.
    pub async fn dispatch(&self, name: &str, arguments: Value) -> Result<Dispatch, ToolError> {
        let Some(i) = self.position(name) else {
            tracing::warn!(target: "tool_registry", tool = %name, "Unknown tool requested");
            return Ok(Dispatch {
                tool: name.to_string(),
                content: format!("Tool '{}' not found", name),
                sources: Vec::new(),
            });
        };

        tracing::debug!(target: "tool_registry", tool = %name, "Invoking tool");

        let output = self.tools[i].call(arguments).await.map_err(|e| {
            tracing::warn!(target: "tool_registry", tool = %name, error = %e, "Tool execution failed");
            e
        })?;

        Ok(Dispatch {
            tool: name.to_string(),
            content: output.content,
            sources: output.sources,
        })
    }
}

/// Sources captured during one query.
///
/// Holds one slot per registered tool; each dispatch overwrites its tool's
/// slot, so the latest call of each tool wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceLedger {
    slots: Vec<(String, Vec<Source>)>,
}

impl SourceLedger {
    /// Store a dispatch's sources in its tool's slot. Unknown tools are ignored.
    pub fn record(&mut self, dispatch: &Dispatch) {
        if let Some((_, sources)) = self.slots.iter_mut().find(|(name, _)| *name == dispatch.tool) {
            *sources = dispatch.sources.clone();
        }
    }

    /// All captured sources, concatenated in registration order.
    pub fn collect(&self) -> Vec<Source> {
        self.slots
            .iter()
            .flat_map(|(_, sources)| sources.iter().cloned())
            .collect()
    }

    /// Empty every slot.
    pub fn clear(&mut self) {
        for (_, sources) in &mut self.slots {
            sources.clear();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|(_, sources)| sources.is_empty())
    }
}
