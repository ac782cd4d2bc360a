//! Closed tool set for the workbench
//!
//! Every invocable the compiler may emit is declared here. Lookup by
//! name is the hard validation boundary: a name outside this set is
//! never dispatched, no matter how plausible the model made it look.

use ahash::AHashMap;
use serde_json::Value;

/// Unique tool identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolId {
    OcpMeasurement,
    CvMeasurement,
    CaMeasurement,
    BringSampleToUser,
    CollectSampleFromUser,
    GoHome,
}

/// Static description of one invocable tool
#[derive(Debug, Clone, Copy)]
pub struct ToolDescriptor {
    pub id: ToolId,
    /// Wire name the inference service must use
    pub name: &'static str,
    /// Whether the tool's schema declares a sample-index argument
    pub needs_sample: bool,
}

const TOOLS: &[ToolDescriptor] = &[
    ToolDescriptor {
        id: ToolId::GoHome,
        name: "go_home",
        needs_sample: false,
    },
    ToolDescriptor {
        id: ToolId::OcpMeasurement,
        name: "ocp_measurement",
        needs_sample: true,
    },
    ToolDescriptor {
        id: ToolId::CvMeasurement,
        name: "cv_measurement",
        needs_sample: true,
    },
    ToolDescriptor {
        id: ToolId::CaMeasurement,
        name: "ca_measurement",
        needs_sample: true,
    },
    ToolDescriptor {
        id: ToolId::BringSampleToUser,
        name: "bring_sample_to_user",
        needs_sample: true,
    },
    ToolDescriptor {
        id: ToolId::CollectSampleFromUser,
        name: "collect_sample_from_user",
        needs_sample: true,
    },
];

/// Registry of every tool the compiler may reference, fixed at startup
pub struct ToolRegistry {
    by_name: AHashMap<&'static str, ToolDescriptor>,
    names: Vec<&'static str>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        let mut by_name = AHashMap::new();
        let mut names = Vec::new();
        for desc in TOOLS {
            by_name.insert(desc.name, *desc);
            names.push(desc.name);
        }
        Self { by_name, names }
    }

    /// Look up a tool by wire name. `None` means the name is outside
    /// the declared set and must not be dispatched.
    pub fn lookup(&self, name: &str) -> Option<&ToolDescriptor> {
        self.by_name.get(name)
    }

    /// Tool names in declaration order, for prompt construction
    pub fn allowed_names(&self) -> &[&'static str] {
        &self.names
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A validated, schema-conformant step ready for dispatch.
///
/// Sample-bearing variants carry one concrete clamped slot number, so
/// the executor matches exhaustively and an unknown name cannot reach
/// dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCall {
    OcpMeasurement { sample: u8 },
    CvMeasurement { sample: u8 },
    CaMeasurement { sample: u8 },
    BringSampleToUser { sample: u8 },
    CollectSampleFromUser { sample: u8 },
    GoHome,
}

impl ToolCall {
    /// Build a call from a tool id and a resolved slot number. The
    /// sample is ignored for tools whose schema has no index argument.
    pub fn with_sample(id: ToolId, sample: u8) -> Self {
        match id {
            ToolId::OcpMeasurement => ToolCall::OcpMeasurement { sample },
            ToolId::CvMeasurement => ToolCall::CvMeasurement { sample },
            ToolId::CaMeasurement => ToolCall::CaMeasurement { sample },
            ToolId::BringSampleToUser => ToolCall::BringSampleToUser { sample },
            ToolId::CollectSampleFromUser => ToolCall::CollectSampleFromUser { sample },
            ToolId::GoHome => ToolCall::GoHome,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::OcpMeasurement { .. } => "ocp_measurement",
            ToolCall::CvMeasurement { .. } => "cv_measurement",
            ToolCall::CaMeasurement { .. } => "ca_measurement",
            ToolCall::BringSampleToUser { .. } => "bring_sample_to_user",
            ToolCall::CollectSampleFromUser { .. } => "collect_sample_from_user",
            ToolCall::GoHome => "go_home",
        }
    }

    pub fn sample(&self) -> Option<u8> {
        match self {
            ToolCall::OcpMeasurement { sample }
            | ToolCall::CvMeasurement { sample }
            | ToolCall::CaMeasurement { sample }
            | ToolCall::BringSampleToUser { sample }
            | ToolCall::CollectSampleFromUser { sample } => Some(*sample),
            ToolCall::GoHome => None,
        }
    }

    /// Phase label used in the observation trace
    pub fn step_label(&self) -> &'static str {
        match self {
            ToolCall::OcpMeasurement { .. }
            | ToolCall::CvMeasurement { .. }
            | ToolCall::CaMeasurement { .. } => "measurement",
            ToolCall::BringSampleToUser { .. } | ToolCall::CollectSampleFromUser { .. } => {
                "interaction"
            }
            ToolCall::GoHome => "home",
        }
    }

    /// Concrete arguments as they appear in the trace
    pub fn args_value(&self) -> Value {
        match self.sample() {
            Some(i) => serde_json::json!({ "i": i }),
            None => serde_json::json!({}),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_names() {
        let registry = ToolRegistry::new();
        let desc = registry.lookup("ocp_measurement").unwrap();
        assert_eq!(desc.id, ToolId::OcpMeasurement);
        assert!(desc.needs_sample);

        let home = registry.lookup("go_home").unwrap();
        assert!(!home.needs_sample);
    }

    #[test]
    fn test_lookup_rejects_outside_names() {
        let registry = ToolRegistry::new();
        assert!(registry.lookup("place_sample_to_userarea").is_none());
        assert!(registry.lookup("").is_none());
        assert!(registry.lookup("OCP_MEASUREMENT").is_none());
    }

    #[test]
    fn test_allowed_names_cover_every_tool() {
        let registry = ToolRegistry::new();
        let names = registry.allowed_names();
        assert_eq!(names.len(), 6);
        for name in names {
            assert!(registry.lookup(name).is_some());
        }
    }

    #[test]
    fn test_call_accessors() {
        let call = ToolCall::with_sample(ToolId::CvMeasurement, 3);
        assert_eq!(call.name(), "cv_measurement");
        assert_eq!(call.sample(), Some(3));
        assert_eq!(call.step_label(), "measurement");
        assert_eq!(call.args_value(), serde_json::json!({"i": 3}));

        let home = ToolCall::with_sample(ToolId::GoHome, 4);
        assert_eq!(home, ToolCall::GoHome);
        assert_eq!(home.sample(), None);
        assert_eq!(home.args_value(), serde_json::json!({}));
    }
}
