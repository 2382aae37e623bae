use std::fmt;

use similar::TextDiff;

use crate::chart::Chart;
use crate::error::ManifestError;
use crate::object::ObjectId;
use crate::state::AppliedState;

/// Lines of context around each change in the rendered diff.
const DIFF_CONTEXT_RADIUS: usize = 3;

const APPLIED_HEADER: &str = "applied";
const COMPILED_HEADER: &str = "compiled";

/// How an object changed relative to the previously applied state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeStatus {
    Added,
    Removed,
    Changed,
    Unchanged,
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeStatus::Added => write!(f, "added"),
            ChangeStatus::Removed => write!(f, "removed"),
            ChangeStatus::Changed => write!(f, "changed"),
            ChangeStatus::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// The change of a single object, with both renderings when they exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectChange {
    pub id: ObjectId,
    pub status: ChangeStatus,
    pub applied: Option<String>,
    pub compiled: Option<String>,
}

impl ObjectChange {
    fn unified_diff(&self) -> String {
        let applied = self.applied.as_deref().unwrap_or_default();
        let compiled = self.compiled.as_deref().unwrap_or_default();

        TextDiff::from_lines(applied, compiled)
            .unified_diff()
            .context_radius(DIFF_CONTEXT_RADIUS)
            .header(APPLIED_HEADER, COMPILED_HEADER)
            .to_string()
    }
}

/// Changes of every object of one group.
///
/// Compiled objects come first, in chart order, followed by the removed objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDiff {
    pub group: String,
    pub changes: Vec<ObjectChange>,
}

impl GroupDiff {
    pub fn compute(
        group: &str,
        chart: &Chart,
        applied: &AppliedState,
    ) -> Result<GroupDiff, ManifestError> {
        let mut changes = Vec::with_capacity(chart.objects().len());

        for object in chart.objects() {
            let compiled = serde_yaml::to_string(object.body())?;
            let change = match applied.get(object.id()) {
                None => ObjectChange {
                    id: object.id().clone(),
                    status: ChangeStatus::Added,
                    applied: None,
                    compiled: Some(compiled),
                },
                Some(previous) => ObjectChange {
                    id: object.id().clone(),
                    status: if previous == object.body() {
                        ChangeStatus::Unchanged
                    } else {
                        ChangeStatus::Changed
                    },
                    applied: Some(serde_yaml::to_string(previous)?),
                    compiled: Some(compiled),
                },
            };
            changes.push(change);
        }

        for (id, previous) in applied {
            if chart.get(id).is_none() {
                changes.push(ObjectChange {
                    id: id.clone(),
                    status: ChangeStatus::Removed,
                    applied: Some(serde_yaml::to_string(previous)?),
                    compiled: None,
                });
            }
        }

        Ok(GroupDiff {
            group: group.to_string(),
            changes,
        })
    }

    pub fn status_of(&self, id: &ObjectId) -> Option<ChangeStatus> {
        self.changes
            .iter()
            .find(|change| &change.id == id)
            .map(|change| change.status)
    }

    pub fn count(&self, status: ChangeStatus) -> usize {
        self.changes
            .iter()
            .filter(|change| change.status == status)
            .count()
    }

    pub fn has_changes(&self) -> bool {
        self.changes
            .iter()
            .any(|change| change.status != ChangeStatus::Unchanged)
    }

    /// Renders a summary line followed by a unified diff of every changed object.
    pub fn render(&self) -> String {
        let mut output = format!(
            "# {}: {} added, {} removed, {} changed, {} unchanged\n",
            self.group,
            self.count(ChangeStatus::Added),
            self.count(ChangeStatus::Removed),
            self.count(ChangeStatus::Changed),
            self.count(ChangeStatus::Unchanged),
        );

        for change in &self.changes {
            if change.status == ChangeStatus::Unchanged {
                continue;
            }

            output.push_str(&format!("{}: {}\n", change.id, change.status));
            output.push_str(&change.unified_diff());
        }

        output
    }
}

/// Renders the diffs of all groups into one document.
pub fn render_diff(diffs: &[GroupDiff]) -> String {
    diffs
        .iter()
        .map(GroupDiff::render)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use k8s_openapi::api::core::v1::ConfigMap;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use std::collections::BTreeMap;

    use super::*;

    fn config_map(name: &str, value: &str) -> ConfigMap {
        ConfigMap {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..ObjectMeta::default()
            },
            data: Some(BTreeMap::from([("key".to_string(), value.to_string())])),
            ..ConfigMap::default()
        }
    }

    fn chart(objects: Vec<ConfigMap>) -> Chart {
        let mut chart = Chart::new("monitoring");
        for object in objects {
            chart.add(object, vec![]).unwrap();
        }
        chart
    }

    fn applied(chart: &Chart) -> AppliedState {
        chart
            .objects()
            .iter()
            .map(|object| (object.id().clone(), object.body().clone()))
            .collect()
    }

    #[test]
    fn everything_is_added_against_empty_state() {
        let chart = chart(vec![config_map("a", "1"), config_map("b", "1")]);

        let diff = GroupDiff::compute("monitoring", &chart, &AppliedState::new()).unwrap();

        assert_eq!(diff.count(ChangeStatus::Added), 2);
        assert!(diff.has_changes());
        let rendered = diff.render();
        assert!(rendered.starts_with("# monitoring: 2 added, 0 removed, 0 changed, 0 unchanged\n"));
        assert!(rendered.contains("monitoring/ConfigMap/a: added\n"));
        assert!(rendered.contains("+++ compiled"));
        assert!(rendered.contains("+  key: '1'") || rendered.contains("+  key: \"1\""));
    }

    #[test]
    fn identical_state_has_no_changes() {
        let chart = chart(vec![config_map("a", "1")]);

        let diff = GroupDiff::compute("monitoring", &chart, &applied(&chart)).unwrap();

        assert_eq!(diff.count(ChangeStatus::Unchanged), 1);
        assert!(!diff.has_changes());
        assert_eq!(
            diff.render(),
            "# monitoring: 0 added, 0 removed, 0 changed, 1 unchanged\n"
        );
    }

    #[test]
    fn detects_changed_and_removed_objects() {
        let previous = chart(vec![config_map("a", "1"), config_map("b", "1")]);
        let current = chart(vec![config_map("a", "2")]);

        let diff = GroupDiff::compute("monitoring", &current, &applied(&previous)).unwrap();

        let a = ObjectId::new("ConfigMap", Some("monitoring".to_string()), "a");
        let b = ObjectId::new("ConfigMap", Some("monitoring".to_string()), "b");
        assert_eq!(diff.status_of(&a), Some(ChangeStatus::Changed));
        assert_eq!(diff.status_of(&b), Some(ChangeStatus::Removed));

        let rendered = diff.render();
        assert!(rendered.contains("monitoring/ConfigMap/a: changed\n"));
        assert!(rendered.contains("monitoring/ConfigMap/b: removed\n"));
        assert!(rendered.contains("--- applied"));
    }

    #[test]
    fn render_diff_joins_groups() {
        let chart = chart(vec![config_map("a", "1")]);
        let first = GroupDiff::compute("monitoring", &chart, &AppliedState::new()).unwrap();
        let mut second = first.clone();
        second.group = "other".to_string();

        let rendered = render_diff(&[first, second]);

        assert!(rendered.contains("# monitoring:"));
        assert!(rendered.contains("# other:"));
    }
}
