//! Screen manifests: the structured description of one screen.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One screen to migrate, as produced by the extraction step.
///
/// Immutable for the duration of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenManifest {
    pub screen_id: String,
    pub route: String,
    pub complexity: Complexity,
    #[serde(default)]
    pub interactive_contracts: Vec<InteractiveContract>,
    #[serde(default)]
    pub ui_states: Vec<serde_json::Value>,
    pub render_model: RenderModel,
    #[serde(default)]
    pub data_sources: Vec<serde_json::Value>,
}

impl ScreenManifest {
    /// Navigation targets declared by this screen's contracts, in declaration order.
    pub fn navigation_targets(&self) -> impl Iterator<Item = &str> {
        self.interactive_contracts
            .iter()
            .filter_map(|c| c.navigation_target.as_deref())
    }
}

/// How hard a screen is expected to be to migrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    /// Sort rank: low < medium < high.
    pub fn rank(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// A declared interaction: something the user does and where it leads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveContract {
    pub trigger: String,

    /// Route this interaction navigates to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation_target: Option<String>,

    #[serde(default)]
    pub confidence: Confidence,
}

/// How sure the extraction step was about a contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Confidence {
    High,
    #[default]
    Medium,
    Low,
}

/// The component structure of a screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderModel {
    /// Component id → component spec. Must not be empty.
    pub components: BTreeMap<String, serde_json::Value>,
}
