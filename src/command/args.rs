//! Schema-driven argument normalization
//!
//! Candidate arguments arrive untrusted from the inference service.
//! Normalization coerces them against the tool's schema: sample-index
//! tools get a concrete clamped slot, everything else drops whatever
//! was supplied.

use serde_json::Value;

use crate::command::index::{parse_index_tokens, SampleDomain};
use crate::command::registry::{ToolCall, ToolDescriptor};

/// Normalize a candidate step's arguments in single-index context.
///
/// A missing index defaults to `1` before parsing; the first resolved
/// index wins; an unresolvable expression falls back to the domain
/// minimum. Normalizing an already-concrete call again is a no-op.
pub fn normalize_single(desc: &ToolDescriptor, args: &Value, domain: SampleDomain) -> ToolCall {
    if !desc.needs_sample {
        return ToolCall::with_sample(desc.id, domain.min);
    }
    let raw = args.get("i").cloned().unwrap_or_else(|| Value::from(1));
    let indices = parse_index_tokens(&raw, domain);
    let sample = indices.first().copied().unwrap_or(domain.min);
    ToolCall::with_sample(desc.id, sample)
}

/// Resolve the full index set for plan expansion.
///
/// Unlike the single-index path, a missing or unresolvable expression
/// yields an empty sequence here - the plan compiler applies its own
/// fallback (last-index propagation).
pub fn resolve_indices(desc: &ToolDescriptor, args: &Value, domain: SampleDomain) -> Vec<u8> {
    if !desc.needs_sample {
        return Vec::new();
    }
    match args.get("i") {
        Some(raw) => parse_index_tokens(raw, domain),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::registry::{ToolCall, ToolRegistry};
    use serde_json::json;

    fn domain() -> SampleDomain {
        SampleDomain::default()
    }

    #[test]
    fn test_single_takes_first_resolved_index() {
        let registry = ToolRegistry::new();
        let ocp = registry.lookup("ocp_measurement").unwrap();

        let call = normalize_single(ocp, &json!({"i": [3, 4]}), domain());
        assert_eq!(call, ToolCall::OcpMeasurement { sample: 3 });

        let call = normalize_single(ocp, &json!({"i": "2nd"}), domain());
        assert_eq!(call, ToolCall::OcpMeasurement { sample: 2 });
    }

    #[test]
    fn test_single_defaults_when_index_missing() {
        let registry = ToolRegistry::new();
        let cv = registry.lookup("cv_measurement").unwrap();

        let call = normalize_single(cv, &json!({}), domain());
        assert_eq!(call, ToolCall::CvMeasurement { sample: 1 });
    }

    #[test]
    fn test_single_falls_back_on_garbage() {
        let registry = ToolRegistry::new();
        let bring = registry.lookup("bring_sample_to_user").unwrap();

        let call = normalize_single(bring, &json!({"i": "the shiny one"}), domain());
        assert_eq!(call, ToolCall::BringSampleToUser { sample: 1 });
    }

    #[test]
    fn test_no_arg_tools_drop_excess_arguments() {
        let registry = ToolRegistry::new();
        let home = registry.lookup("go_home").unwrap();

        let call = normalize_single(home, &json!({"i": 4, "speed": "fast"}), domain());
        assert_eq!(call, ToolCall::GoHome);
        assert_eq!(call.args_value(), json!({}));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let registry = ToolRegistry::new();
        let ca = registry.lookup("ca_measurement").unwrap();

        let first = normalize_single(ca, &json!({"i": "1-2"}), domain());
        let second = normalize_single(ca, &first.args_value(), domain());
        assert_eq!(first, second);
    }

    #[test]
    fn test_plan_context_reports_empty_for_missing_index() {
        let registry = ToolRegistry::new();
        let ocp = registry.lookup("ocp_measurement").unwrap();

        assert!(resolve_indices(ocp, &json!({}), domain()).is_empty());
        assert_eq!(
            resolve_indices(ocp, &json!({"i": "1-3"}), domain()),
            vec![1, 2, 3]
        );
    }
}
