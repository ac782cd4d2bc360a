//! Command compilation and execution pipeline
//!
//! Operator text -> {plan compiler, fallback to single-step resolver}
//! -> Plan -> ExecutionEngine -> per-step Observations -> sink.

pub mod args;
pub mod compiler;
pub mod executor;
pub mod index;
pub mod registry;
pub mod resolver;

pub use compiler::Plan;
pub use executor::ExecutionEngine;
pub use index::SampleDomain;
pub use registry::{ToolCall, ToolRegistry};

use crate::core::error::Result;
use crate::llm::client::LlmClient;

/// Compile one operator command, preferring the multi-step planner.
///
/// The planner's grammar is strictly harder to satisfy than the
/// single-step router's, so any compilation failure falls back to the
/// router on the same text - failing open maximizes the chance that
/// some valid action is still taken.
pub async fn interpret(
    client: &LlmClient,
    registry: &ToolRegistry,
    domain: SampleDomain,
    text: &str,
) -> Result<Plan> {
    match compiler::compile(client, registry, domain, text).await {
        Ok(plan) => Ok(plan),
        Err(err) => {
            tracing::debug!(error = %err, "plan compilation failed, trying single-step router");
            resolver::resolve(client, registry, domain, text)
                .await
                .map(Plan::from)
        }
    }
}
