use serde::{Deserialize, Serialize};

macro_rules! impl_json_config {
    ($($config:ty),*) => {
        $(
            impl $config {
                /// Serialize parameters to JSON string
                pub fn to_json(&self) -> Result<String, serde_json::Error> {
                    serde_json::to_string(self)
                }
                /// Deserialize parameters from JSON string (missing fields take their defaults)
                pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
                    serde_json::from_str(json)
                }
            }
        )*
    };
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
/// Parameters for [`net_to_activity_diagram`](super::net_to_activity_diagram)
pub struct NetToDiagramConfig {
    /// Make the net free-choice before translating (otherwise non-free-choice nets are rejected)
    pub normalize_free_choice: bool,
    /// Simplify the resulting diagram
    pub simplify: bool,
}

impl Default for NetToDiagramConfig {
    fn default() -> Self {
        Self {
            normalize_free_choice: true,
            simplify: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(default)]
/// Parameters for [`activity_diagram_to_net`](super::activity_diagram_to_net)
pub struct DiagramToNetConfig {
    /// Inline the contents of subprocesses (otherwise a subprocess becomes one transition)
    pub expand_subprocesses: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
/// Parameters for [`causal_net_to_activity_diagram`](super::causal_net_to_activity_diagram)
pub struct CausalNetToDiagramConfig {
    /// Simplify the resulting diagram
    pub simplify: bool,
}

impl Default for CausalNetToDiagramConfig {
    fn default() -> Self {
        Self { simplify: true }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
/// Parameters for [`process_tree_to_activity_diagram`](super::process_tree_to_activity_diagram)
pub struct ProcessTreeToDiagramConfig {
    /// Simplify the resulting diagram
    pub simplify: bool,
}

impl Default for ProcessTreeToDiagramConfig {
    fn default() -> Self {
        Self { simplify: true }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
/// Parameters for [`group_into_subprocesses`](super::group_into_subprocesses)
pub struct SubprocessConfig {
    /// Label prefix of created subprocess containers (followed by a running number)
    pub label_prefix: String,
}

impl Default for SubprocessConfig {
    fn default() -> Self {
        Self {
            label_prefix: "Subprocess".to_string(),
        }
    }
}

impl_json_config!(
    NetToDiagramConfig,
    DiagramToNetConfig,
    CausalNetToDiagramConfig,
    ProcessTreeToDiagramConfig,
    SubprocessConfig
);
