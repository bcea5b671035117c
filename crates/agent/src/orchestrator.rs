//! Bounded tool-calling loop
//!
//! States: awaiting model turn -> dispatching tools -> awaiting model turn
//! -> ... -> done. The loop ends on a plain-text answer, on a turn where
//! every invocation was a duplicate, or at the round ceiling.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use shop_assist_config::OrchestratorConfig;
use shop_assist_core::{CatalogItem, ToolDefinition, ToolResultPayload};
use shop_assist_llm::{canned_reply, CallerContext, ChatBackend, PromptBuilder};
use shop_assist_retrieval::CandidateSet;
use shop_assist_tools::{call_signature, tool_definitions, ToolInvocation};
use uuid::Uuid;

use crate::router::ToolRouter;
use crate::session::ConversationState;

/// Shown when the round ceiling is hit before the model produced a final
/// answer. Deliberately generic, never blank.
const ROUND_LIMIT_MESSAGE: &str =
    "I found some options for you, but I couldn't narrow things down further in this \
     conversation. Here's what I have so far: tell me more about what you're looking \
     for and I'll refine it.";

/// Shown when the model repeated only already-answered tool calls without
/// giving a text answer.
const NO_PROGRESS_MESSAGE: &str =
    "Here's what I found. Let me know if you'd like me to refine the search with a \
     brand, category, or price range.";

/// One conversational request into the orchestrator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    /// Advisory context folded into the system prompt
    #[serde(default)]
    pub context: Option<CallerContext>,
}

impl ChatRequest {
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }
}

/// The orchestrator's answer to one request.
#[derive(Debug, Clone, Serialize)]
pub struct AssistantResponse {
    pub text: String,
    /// Accumulated ordered item list across all tool dispatches
    pub items: Vec<CatalogItem>,
    pub session_id: String,
    /// Tool-calling rounds actually dispatched
    pub rounds: u32,
    pub elapsed_ms: u64,
    pub model: String,
}

/// Drives the bounded tool-calling session.
pub struct ShoppingAgent {
    backend: Arc<dyn ChatBackend>,
    router: ToolRouter,
    prompt: PromptBuilder,
    tools: Vec<ToolDefinition>,
    config: OrchestratorConfig,
}

impl ShoppingAgent {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        router: ToolRouter,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            backend,
            router,
            prompt: PromptBuilder::default(),
            tools: tool_definitions(),
            config,
        }
    }

    pub fn with_prompt(mut self, prompt: PromptBuilder) -> Self {
        self.prompt = prompt;
        self
    }

    /// Handle one user message to completion. Never errors: the model
    /// collaborator failing mid-session degrades to a canned answer plus
    /// whatever items already accumulated.
    pub async fn handle_message(&self, request: ChatRequest) -> AssistantResponse {
        let started = Instant::now();
        let session_id = request
            .session_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut prompt = self.prompt.clone();
        if let Some(context) = request.context.clone() {
            prompt = prompt.with_caller_context(context);
        }
        let system = prompt.build();

        let mut state = ConversationState::new(&session_id);
        state.push_user(&request.message);

        let mut accumulated = CandidateSet::new();

        let text = loop {
            if state.rounds() >= self.config.max_tool_rounds {
                tracing::warn!(
                    session = session_id.as_str(),
                    rounds = state.rounds(),
                    "Round ceiling reached, returning fallback"
                );
                break ROUND_LIMIT_MESSAGE.to_string();
            }

            let turn = match self
                .backend
                .complete(&system, state.messages(), &self.tools)
                .await
            {
                Ok(turn) => turn,
                Err(err) => {
                    tracing::warn!(
                        session = session_id.as_str(),
                        error = %err,
                        "Chat backend failed, returning canned answer"
                    );
                    break canned_reply(&request.message);
                }
            };

            if !turn.has_tool_calls() {
                // terminal state: a plain text answer
                break if turn.text.is_empty() {
                    NO_PROGRESS_MESSAGE.to_string()
                } else {
                    turn.text
                };
            }

            let round = state.begin_round();
            tracing::debug!(
                session = session_id.as_str(),
                round,
                calls = turn.tool_calls.len(),
                "Dispatching tool round"
            );

            state.push_assistant(turn.text.clone(), turn.tool_calls.clone());

            let mut results = Vec::with_capacity(turn.tool_calls.len());
            let mut executed_new = false;

            for call in &turn.tool_calls {
                let signature = call_signature(call);

                if let Some(prior) = state.replay(&signature) {
                    // idempotence: replay the earlier result instead of
                    // re-executing, so the model cannot loop on one query
                    tracing::debug!(
                        session = session_id.as_str(),
                        tool = call.name.as_str(),
                        "Replaying duplicate tool call"
                    );
                    results.push(ToolResultPayload {
                        call_id: call.id.clone(),
                        content: prior.to_string(),
                        is_error: false,
                    });
                    continue;
                }

                match ToolInvocation::parse(call) {
                    Ok(invocation) => match self.router.dispatch(&invocation).await {
                        Ok(outcome) => {
                            accumulated.extend(outcome.items);
                            state.record_execution(signature, outcome.payload.clone());
                            results.push(ToolResultPayload {
                                call_id: call.id.clone(),
                                content: outcome.payload.to_string(),
                                is_error: false,
                            });
                            executed_new = true;
                        }
                        Err(err) => {
                            tracing::warn!(
                                session = session_id.as_str(),
                                tool = call.name.as_str(),
                                error = %err,
                                "Tool execution failed"
                            );
                            results.push(ToolResultPayload {
                                call_id: call.id.clone(),
                                content: err.to_payload().to_string(),
                                is_error: true,
                            });
                            // the model gets a chance to correct course
                            executed_new = true;
                        }
                    },
                    Err(err) => {
                        // malformed arguments go back to the model as a
                        // structured error, never to the end user
                        results.push(ToolResultPayload {
                            call_id: call.id.clone(),
                            content: err.to_payload().to_string(),
                            is_error: true,
                        });
                        executed_new = true;
                    }
                }
            }

            state.push_tool_results(results);

            if !executed_new {
                // every invocation this turn was a duplicate; resubmitting
                // an unchanged conversation would loop
                tracing::debug!(
                    session = session_id.as_str(),
                    "All tool calls were duplicates, terminating"
                );
                break if turn.text.is_empty() {
                    NO_PROGRESS_MESSAGE.to_string()
                } else {
                    turn.text
                };
            }
        };

        AssistantResponse {
            text,
            items: accumulated.into_items(),
            session_id,
            rounds: state.rounds(),
            elapsed_ms: started.elapsed().as_millis() as u64,
            model: self.backend.model_name().to_string(),
        }
    }
}
