//! Manifest validation: raw records in, typed manifests and issues out.
//!
//! Each record is checked structurally against the manifest shape before it
//! is decoded, so one malformed record yields every problem with it rather
//! than the first serde complaint. Batch-wide rules (unique ids, route
//! collisions, unresolved navigation targets) run after every record has
//! been decoded.
//!
//! Validation fails closed: a single error-severity issue rejects the batch.

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;

use crate::model::{Complexity, Issue, IssueKind, ScreenManifest};
use crate::plan::route_matches;

/// A raw manifest record: where it came from, and its text.
#[derive(Debug, Clone)]
pub struct ManifestSource {
    /// File name or other label, used when the record has no readable id.
    pub origin: String,
    pub contents: String,
}

/// The outcome of validating a batch of manifest records.
#[derive(Debug, Clone, Default)]
pub struct ManifestLoad {
    /// Every record that decoded, in source order.
    pub manifests: Vec<ScreenManifest>,
    pub issues: Vec<Issue>,
}

/// The batch had at least one blocking issue.
#[derive(Debug, thiserror::Error)]
#[error("manifest batch rejected: {errors} error(s) across {screens} screen(s)")]
pub struct BatchRejected {
    pub errors: usize,
    pub screens: usize,
}

impl ManifestLoad {
    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_error()).count()
    }

    pub fn is_blocked(&self) -> bool {
        self.error_count() > 0
    }

    /// The manifests, only if no issue blocks the batch.
    pub fn accepted(&self) -> Result<&[ScreenManifest], BatchRejected> {
        if self.is_blocked() {
            let screens: HashSet<&str> = self
                .issues
                .iter()
                .filter(|i| i.is_error())
                .map(|i| i.screen_id.as_str())
                .collect();
            return Err(BatchRejected {
                errors: self.error_count(),
                screens: screens.len(),
            });
        }
        Ok(&self.manifests)
    }
}

/// Validate a batch of raw records.
pub fn validate(sources: &[ManifestSource]) -> ManifestLoad {
    let mut load = ManifestLoad::default();

    for source in sources {
        let value: Value = match serde_json::from_str(&source.contents) {
            Ok(v) => v,
            Err(e) => {
                load.issues.push(Issue::error(
                    &source.origin,
                    IssueKind::Schema,
                    format!("invalid JSON: {e}"),
                ));
                continue;
            }
        };

        let owner = value
            .get("screenId")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(&source.origin)
            .to_string();

        let structural = check_structure(&owner, &value);
        let blocked = structural.iter().any(Issue::is_error);
        load.issues.extend(structural);
        if blocked {
            continue;
        }

        match serde_json::from_value::<ScreenManifest>(value) {
            Ok(manifest) => {
                load.issues.extend(check_semantics(&manifest));
                load.manifests.push(manifest);
            }
            Err(e) => load.issues.push(Issue::error(
                owner,
                IssueKind::Schema,
                format!("does not match the manifest shape: {e}"),
            )),
        }
    }

    load.issues.extend(check_batch(&load.manifests));

    tracing::debug!(
        records = sources.len(),
        manifests = load.manifests.len(),
        issues = load.issues.len(),
        "validated manifest batch"
    );
    load
}

/// Required fields and their types.
fn check_structure(owner: &str, value: &Value) -> Vec<Issue> {
    let schema = |message: String| Issue::error(owner, IssueKind::Schema, message);

    let Some(obj) = value.as_object() else {
        return vec![schema("manifest must be a JSON object".into())];
    };

    let mut issues = Vec::new();

    match obj.get("screenId") {
        Some(Value::String(s)) if !s.is_empty() => {}
        Some(Value::String(_)) => issues.push(schema("screenId must not be empty".into())),
        Some(_) => issues.push(schema("screenId must be a string".into())),
        None => issues.push(schema("missing required field screenId".into())),
    }

    match obj.get("route") {
        Some(Value::String(s)) if !s.trim().is_empty() => {}
        Some(Value::String(_)) => issues.push(schema("route must not be empty".into())),
        Some(_) => issues.push(schema("route must be a string".into())),
        None => issues.push(schema("missing required field route".into())),
    }

    match obj.get("complexity") {
        Some(Value::String(s)) if Complexity::parse(s).is_some() => {}
        Some(other) => issues.push(schema(format!(
            "complexity must be one of low, medium, high (got {other})"
        ))),
        None => issues.push(schema("missing required field complexity".into())),
    }

    for field in ["interactiveContracts", "uiStates", "dataSources"] {
        if let Some(v) = obj.get(field)
            && !v.is_array()
        {
            issues.push(schema(format!("{field} must be an array")));
        }
    }

    if let Some(Value::Array(contracts)) = obj.get("interactiveContracts") {
        for (i, contract) in contracts.iter().enumerate() {
            if !contract.get("trigger").is_some_and(Value::is_string) {
                issues.push(schema(format!(
                    "interactiveContracts[{i}] must be an object with a string trigger"
                )));
            }
            if let Some(target) = contract.get("navigationTarget")
                && !(target.is_string() || target.is_null())
            {
                issues.push(schema(format!(
                    "interactiveContracts[{i}].navigationTarget must be a string"
                )));
            }
        }
    }

    match obj.get("renderModel") {
        Some(Value::Object(render)) => match render.get("components") {
            Some(Value::Object(_)) => {}
            Some(_) => issues.push(schema("renderModel.components must be an object".into())),
            None => issues.push(schema("missing required field renderModel.components".into())),
        },
        Some(_) => issues.push(schema("renderModel must be an object".into())),
        None => issues.push(schema("missing required field renderModel".into())),
    }

    issues
}

/// Content rules for one decoded manifest.
fn check_semantics(manifest: &ScreenManifest) -> Vec<Issue> {
    let id = manifest.screen_id.as_str();
    let mut issues = Vec::new();

    if manifest.render_model.components.is_empty() {
        issues.push(Issue::error(
            id,
            IssueKind::Semantic,
            "renderModel.components must not be empty",
        ));
    }
    if manifest.interactive_contracts.is_empty() {
        issues.push(Issue::warn(id, "no interactive contracts declared"));
    }
    if manifest.ui_states.is_empty() {
        issues.push(Issue::warn(id, "no UI states declared"));
    }
    if !manifest.route.starts_with('/') {
        issues.push(Issue::warn(
            id,
            format!("route '{}' does not start with '/'", manifest.route),
        ));
    }

    issues
}

/// Rules that need the whole batch.
fn check_batch(manifests: &[ScreenManifest]) -> Vec<Issue> {
    let mut issues = Vec::new();

    let mut seen = HashSet::new();
    for m in manifests {
        if !seen.insert(m.screen_id.as_str()) {
            issues.push(Issue::error(
                &m.screen_id,
                IssueKind::Semantic,
                "duplicate screenId in batch",
            ));
        }
    }

    let mut by_route: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for m in manifests {
        by_route.entry(&m.route).or_default().push(&m.screen_id);
    }
    for (route, ids) in by_route.iter().filter(|(_, ids)| ids.len() > 1) {
        for id in ids {
            issues.push(Issue::warn(
                *id,
                format!("route '{route}' is shared with {} screen(s)", ids.len() - 1),
            ));
        }
    }

    for m in manifests {
        for target in m.navigation_targets() {
            if !manifests.iter().any(|other| route_matches(&other.route, target)) {
                issues.push(Issue::warn(
                    &m.screen_id,
                    format!("navigation target '{target}' matches no screen in the batch"),
                ));
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::model::Severity;

    fn source(origin: &str, value: &Value) -> ManifestSource {
        ManifestSource {
            origin: origin.into(),
            contents: value.to_string(),
        }
    }

    fn manifest_json(id: &str, route: &str) -> Value {
        json!({
            "screenId": id,
            "route": route,
            "complexity": "low",
            "interactiveContracts": [{"trigger": "click", "confidence": "high"}],
            "uiStates": ["default"],
            "renderModel": {"components": {"root": {"type": "div"}}},
            "dataSources": []
        })
    }

    #[test]
    fn valid_batch_has_no_issues() {
        let load = validate(&[
            source("home.json", &manifest_json("home", "/")),
            source("about.json", &manifest_json("about", "/about")),
        ]);
        assert!(load.issues.is_empty(), "{:?}", load.issues);
        assert_eq!(load.manifests.len(), 2);
        assert!(load.accepted().is_ok());
    }

    #[test]
    fn invalid_json_is_attributed_to_origin() {
        let load = validate(&[ManifestSource {
            origin: "broken.json".into(),
            contents: "{ not json".into(),
        }]);
        assert_eq!(load.issues.len(), 1);
        assert_eq!(load.issues[0].screen_id, "broken.json");
        assert_eq!(load.issues[0].kind, IssueKind::Schema);
        assert!(load.is_blocked());
    }

    #[test]
    fn collects_every_structural_problem() {
        let load = validate(&[source(
            "bad.json",
            &json!({"screenId": "bad", "complexity": "extreme", "uiStates": {}}),
        )]);
        let messages: Vec<&str> = load.issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(load.error_count(), 4, "{messages:?}");
        assert!(load.issues.iter().all(|i| i.screen_id == "bad"));
        assert!(load.manifests.is_empty());
    }

    #[test]
    fn empty_components_is_an_error() {
        let mut value = manifest_json("empty", "/empty");
        value["renderModel"]["components"] = json!({});
        let load = validate(&[source("empty.json", &value)]);

        assert_eq!(load.error_count(), 1);
        assert_eq!(load.issues[0].kind, IssueKind::Semantic);
        let rejected = load.accepted().unwrap_err();
        assert_eq!((rejected.errors, rejected.screens), (1, 1));
    }

    #[test]
    fn missing_contracts_and_states_only_warn() {
        let mut value = manifest_json("bare", "/bare");
        value["interactiveContracts"] = json!([]);
        value.as_object_mut().unwrap().remove("uiStates");
        let load = validate(&[source("bare.json", &value)]);

        assert_eq!(load.issues.len(), 2);
        assert!(load.issues.iter().all(|i| i.severity == Severity::Warn));
        assert!(!load.is_blocked());
    }

    #[test]
    fn duplicate_screen_id_blocks_batch() {
        let load = validate(&[
            source("a.json", &manifest_json("dup", "/a")),
            source("b.json", &manifest_json("dup", "/b")),
        ]);
        assert_eq!(load.error_count(), 1);
        let rejected = load.accepted().unwrap_err();
        assert_eq!(rejected.errors, 1);
        assert_eq!(rejected.screens, 1);
    }

    #[test]
    fn unresolved_navigation_target_warns() {
        let mut value = manifest_json("list", "/items");
        value["interactiveContracts"] =
            json!([{"trigger": "click", "navigationTarget": "/items/42"}]);
        let detail = manifest_json("detail", "/items/:id");
        let load = validate(&[source("list.json", &value), source("detail.json", &detail)]);
        assert!(load.issues.is_empty(), "{:?}", load.issues);

        let load = validate(&[source("list.json", &value)]);
        assert_eq!(load.issues.len(), 1);
        assert_eq!(load.issues[0].severity, Severity::Warn);
    }

    #[test]
    fn shared_route_warns_for_each_screen() {
        let load = validate(&[
            source("a.json", &manifest_json("a", "/same")),
            source("b.json", &manifest_json("b", "/same")),
        ]);
        assert_eq!(load.issues.len(), 2);
        assert!(!load.is_blocked());
    }
}
