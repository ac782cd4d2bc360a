//! Single-step intent resolution
//!
//! The router path: the operator's text goes to the inference service
//! with a strict one-tool-call prompt, and the one JSON object in the
//! response is extracted, validated against the registry and
//! normalized. Used as the fallback when plan compilation fails.

use serde_json::Value;

use crate::command::args::normalize_single;
use crate::command::index::SampleDomain;
use crate::command::registry::{ToolCall, ToolRegistry};
use crate::core::error::{LabError, Result};
use crate::llm::client::LlmClient;

/// Resolve one operator command to a single validated tool call
pub async fn resolve(
    client: &LlmClient,
    registry: &ToolRegistry,
    domain: SampleDomain,
    text: &str,
) -> Result<ToolCall> {
    let system = router_system(registry, domain);
    let user = format!("{}\nUser: {}\nAssistant:", ROUTER_FEW_SHOT, text);
    let response = client.complete(&system, &user).await?;
    let call = resolve_response(&response, registry, domain)?;
    tracing::debug!(tool = call.name(), "resolved single-step command");
    Ok(call)
}

/// Validate and normalize a raw router response into a tool call
pub fn resolve_response(
    raw: &str,
    registry: &ToolRegistry,
    domain: SampleDomain,
) -> Result<ToolCall> {
    let json = extract_first_json(raw)?;
    let obj: Value = serde_json::from_str(json)?;

    let name = obj.get("name").and_then(Value::as_str);
    let args = obj.get("arguments");
    let (name, args) = match (name, args) {
        (Some(name), Some(args)) => (name, args),
        _ => {
            return Err(LabError::Schema(format!(
                "expected name and arguments fields, got {}",
                obj
            )))
        }
    };

    let desc = registry
        .lookup(name)
        .ok_or_else(|| LabError::UnknownTool(name.to_string()))?;

    Ok(normalize_single(desc, args, domain))
}

/// Extract the first balanced top-level JSON object from `s`.
///
/// Depth-counts braces while skipping quoted strings and escape
/// sequences, so braces inside string values do not affect the depth.
/// The model is asked for bare JSON but routinely wraps it in prose.
pub fn extract_first_json(s: &str) -> Result<&str> {
    let start = s
        .find('{')
        .ok_or_else(|| LabError::Extraction(format!("no object in {:?}", s)))?;

    let mut depth = 0usize;
    let mut in_str = false;
    let mut esc = false;
    for (i, ch) in s[start..].char_indices() {
        if in_str {
            if esc {
                esc = false;
            } else if ch == '\\' {
                esc = true;
            } else if ch == '"' {
                in_str = false;
            }
            continue;
        }
        match ch {
            '"' => in_str = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&s[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    Err(LabError::Extraction(format!("unbalanced object in {:?}", s)))
}

fn router_system(registry: &ToolRegistry, domain: SampleDomain) -> String {
    let allowed = registry
        .allowed_names()
        .iter()
        .map(|name| format!("'{}'", name))
        .collect::<Vec<_>>()
        .join(",");
    let (min, max) = (domain.min, domain.max);
    format!(
        r#"You are a router that outputs EXACTLY ONE JSON object per turn.
Output ONLY:
{{"name":"<one of [{allowed}]>","arguments":{{...}}}}
No extra text. No code fences. No multiple JSON objects.

Choose ONE tool based on intent:
- "OCP" / "open circuit" / "potential" / "measure ocp" => "ocp_measurement" with i in [{min},{max}]
- "CV" / "cyclic voltammetry" => "cv_measurement" with i in [{min},{max}]
- "CA" / "chronoamperometry" / "chrono" => "ca_measurement" with i in [{min},{max}]
- Bring/give/hand/pass/deliver TO me/user/operator/user area => "bring_sample_to_user" with i in [{min},{max}]
- Take/get/receive/collect FROM me/user/hand/user area => "collect_sample_from_user" with i in [{min},{max}]
- Home/reset/base => "go_home" (no args)

Numbers: map ordinals/cardinals ("first/1st/one/5th/five") to i in [{min},{max}].
If i is omitted but required, default i={min}.
Spelling tolerance allowed.
CRITICAL: "name" MUST be exactly one of the allowed strings above; do not invent new names.
"#
    )
}

const ROUTER_FEW_SHOT: &str = r#"User: measure OCP of sample 3
Assistant: {"name":"ocp_measurement","arguments":{"i":3}}

User: run cyclic voltammetry on five
Assistant: {"name":"cv_measurement","arguments":{"i":5}}

User: do CA for the 2nd sample
Assistant: {"name":"ca_measurement","arguments":{"i":2}}

User: bring me the first sample
Assistant: {"name":"bring_sample_to_user","arguments":{"i":1}}

User: take sample 3 from me
Assistant: {"name":"collect_sample_from_user","arguments":{"i":3}}

User: back to home
Assistant: {"name":"go_home","arguments":{}}

# NEGATIVE (do NOT emulate):
User: bring me sample 2
Assistant: {"name":"place_sample_to_userarea","arguments":{"i":2}}  # INVALID (mid-level)
User: Correct that.
Assistant: {"name":"bring_sample_to_user","arguments":{"i":2}}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::registry::ToolCall;

    fn registry() -> ToolRegistry {
        ToolRegistry::new()
    }

    fn domain() -> SampleDomain {
        SampleDomain::default()
    }

    #[test]
    fn test_extract_bare_object() {
        let raw = r#"{"name":"go_home","arguments":{}}"#;
        assert_eq!(extract_first_json(raw).unwrap(), raw);
    }

    #[test]
    fn test_extract_skips_surrounding_text() {
        let raw = "Sure, here you go:\n{\"name\":\"go_home\",\"arguments\":{}}\nAnything else?";
        assert_eq!(
            extract_first_json(raw).unwrap(),
            r#"{"name":"go_home","arguments":{}}"#
        );
    }

    #[test]
    fn test_extract_handles_nested_objects() {
        let raw = r#"{"a":{"b":{"c":1}},"d":2} trailing {"x":1}"#;
        assert_eq!(
            extract_first_json(raw).unwrap(),
            r#"{"a":{"b":{"c":1}},"d":2}"#
        );
    }

    #[test]
    fn test_extract_ignores_braces_inside_strings() {
        let raw = r#"{"note":"a } and a { and \" too","n":1}"#;
        assert_eq!(extract_first_json(raw).unwrap(), raw);
    }

    #[test]
    fn test_extract_fails_without_object() {
        assert!(matches!(
            extract_first_json("I don't understand that command"),
            Err(LabError::Extraction(_))
        ));
    }

    #[test]
    fn test_extract_fails_on_unclosed_object() {
        assert!(matches!(
            extract_first_json(r#"{"name":"go_home","arguments":{}"#),
            Err(LabError::Extraction(_))
        ));
    }

    #[test]
    fn test_resolve_valid_call() {
        let raw = r#"{"name":"ocp_measurement","arguments":{"i":3}}"#;
        let call = resolve_response(raw, &registry(), domain()).unwrap();
        assert_eq!(call, ToolCall::OcpMeasurement { sample: 3 });
    }

    #[test]
    fn test_resolve_normalizes_word_index() {
        let raw = r#"{"name":"bring_sample_to_user","arguments":{"i":"fifth"}}"#;
        let call = resolve_response(raw, &registry(), domain()).unwrap();
        assert_eq!(call, ToolCall::BringSampleToUser { sample: 5 });
    }

    #[test]
    fn test_resolve_rejects_unknown_tool() {
        let raw = r#"{"name":"place_sample_to_userarea","arguments":{"i":2}}"#;
        assert!(matches!(
            resolve_response(raw, &registry(), domain()),
            Err(LabError::UnknownTool(name)) if name == "place_sample_to_userarea"
        ));
    }

    #[test]
    fn test_resolve_rejects_missing_fields() {
        assert!(matches!(
            resolve_response(r#"{"name":"go_home"}"#, &registry(), domain()),
            Err(LabError::Schema(_))
        ));
        assert!(matches!(
            resolve_response(r#"{"arguments":{"i":1}}"#, &registry(), domain()),
            Err(LabError::Schema(_))
        ));
    }

    #[test]
    fn test_resolve_drops_arguments_for_no_arg_tool() {
        let raw = r#"{"name":"go_home","arguments":{"i":4}}"#;
        let call = resolve_response(raw, &registry(), domain()).unwrap();
        assert_eq!(call, ToolCall::GoHome);
    }

    #[test]
    fn test_router_prompt_names_every_tool() {
        let system = router_system(&registry(), domain());
        for name in registry().allowed_names() {
            assert!(system.contains(name), "prompt missing {}", name);
        }
    }
}
