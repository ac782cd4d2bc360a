//! Multi-step plan compilation
//!
//! The planner path: the inference service is asked for an ordered list
//! of candidate steps, which is then validated against the registry and
//! lowered into one concrete tool call per sample index. Natural
//! commands batch several samples into one utterance ("ocp for 1 and 2
//! then cv"); this module deterministically decompresses that batching
//! so the executor never interprets anything.

use serde_json::Value;

use crate::command::args::resolve_indices;
use crate::command::index::SampleDomain;
use crate::command::registry::{ToolCall, ToolRegistry};
use crate::command::resolver::extract_first_json;
use crate::core::error::{LabError, Result};
use crate::llm::client::LlmClient;

/// Ordered sequence of resolved steps; insertion order is execution
/// order. Valid plans are non-empty by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    steps: Vec<ToolCall>,
}

impl Plan {
    pub fn steps(&self) -> &[ToolCall] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl From<ToolCall> for Plan {
    fn from(call: ToolCall) -> Self {
        Plan { steps: vec![call] }
    }
}

/// Compile one operator command into an execution-ready plan
pub async fn compile(
    client: &LlmClient,
    registry: &ToolRegistry,
    domain: SampleDomain,
    text: &str,
) -> Result<Plan> {
    let system = planner_system(registry, domain);
    let user = format!("{}\nUser: {}\nAssistant:", PLANNER_FEW_SHOT, text);
    let response = client.complete(&system, &user).await?;
    let plan = compile_response(&response, registry, domain)?;
    tracing::debug!(steps = plan.len(), "compiled plan");
    Ok(plan)
}

/// Validate and expand a raw planner response into a plan.
///
/// Every candidate step with a multi-index expression becomes one step
/// per index; a step that omits its index reuses the last successfully
/// resolved index, carried across the whole plan, or the domain minimum
/// when no index has been resolved yet.
pub fn compile_response(raw: &str, registry: &ToolRegistry, domain: SampleDomain) -> Result<Plan> {
    let json = extract_first_json(raw)?;
    let obj: Value = serde_json::from_str(json)?;

    let candidates = match obj.get("plan").and_then(Value::as_array) {
        Some(steps) if !steps.is_empty() => steps,
        _ => return Err(LabError::MalformedPlan(obj.to_string())),
    };

    let mut steps = Vec::new();
    let mut last_index: Option<u8> = None;

    for candidate in candidates {
        let name = candidate
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| LabError::MalformedPlan(format!("step without name: {}", candidate)))?;
        let desc = registry
            .lookup(name)
            .ok_or_else(|| LabError::UnknownTool(name.to_string()))?;

        if !desc.needs_sample {
            steps.push(ToolCall::with_sample(desc.id, domain.min));
            continue;
        }

        let args = candidate.get("arguments").cloned().unwrap_or(Value::Null);
        let mut indices = resolve_indices(desc, &args, domain);
        if indices.is_empty() {
            indices.push(last_index.unwrap_or(domain.min));
        }
        for sample in indices {
            steps.push(ToolCall::with_sample(desc.id, sample));
            last_index = Some(sample);
        }
    }

    if steps.is_empty() {
        return Err(LabError::EmptyPlan);
    }
    Ok(Plan { steps })
}

fn planner_system(registry: &ToolRegistry, domain: SampleDomain) -> String {
    let allowed = registry
        .allowed_names()
        .iter()
        .map(|name| format!("'{}'", name))
        .collect::<Vec<_>>()
        .join(", ");
    let (min, max) = (domain.min, domain.max);
    format!(
        r#"You are a planner. Output EXACTLY ONE JSON object:
{{"plan":[{{"name":"...","arguments":{{...}}}}, ...]}}
Rules:
- Use ONLY these tools: [{allowed}].
- Interpret multi-commands in order: words like "then", "after", "and".
- Map ordinals/cardinals (first/1st/one/five/5th) to i in [{min},{max}].
- If the user says "1 and 2", "1,2", "1-3", "1..3", or "all samples", represent it with "i" as a list (e.g., "i":[1,2]) or a compact range string "i":"1-3". The executor will expand.
- If a later step omits the sample but clearly refers to the last one, reuse the last i.
- Arguments must be under "arguments". For tools that do not require a sample, use an empty object {{}}.
- No prose. No code fences. One JSON only.
"#
    )
}

const PLANNER_FEW_SHOT: &str = r#"User: do ocp for sample 1 then cv for sample 1
Assistant: {"plan":[
  {"name":"ocp_measurement","arguments":{"i":1}},
  {"name":"cv_measurement","arguments":{"i":1}}
]}
User: bring me the 5th, then go home
Assistant: {"plan":[
  {"name":"bring_sample_to_user","arguments":{"i":5}},
  {"name":"go_home","arguments":{}}
]}
User: do ocp for the 1st and 2nd sample then do cv for the 1st sample and ca for the 3rd
Assistant: {"plan":[
  {"name":"ocp_measurement","arguments":{"i":[1,2]}},
  {"name":"cv_measurement","arguments":{"i":1}},
  {"name":"ca_measurement","arguments":{"i":3}}
]}
User: do ocp for all samples then go home
Assistant: {"plan":[
  {"name":"ocp_measurement","arguments":{"i":"all"}},
  {"name":"go_home","arguments":{}}
]}
"#;
