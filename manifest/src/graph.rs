use std::collections::BTreeSet;

use crate::chart::Chart;
use crate::diff::{ChangeStatus, GroupDiff};
use crate::object::ObjectId;

const GRAPH_HEADER: &str = "%%{init: {'theme': 'neutral'}}%%\ngraph LR\n";

const CLASS_DEFS: &[(&str, &str)] = &[
    ("added", "fill:#c8e6c9,stroke:#2e7d32"),
    ("removed", "fill:#ffcdd2,stroke:#c62828,stroke-dasharray: 5 5"),
    ("changed", "fill:#fff9c4,stroke:#f9a825"),
    ("external", "fill:#eeeeee,stroke:#9e9e9e,stroke-dasharray: 3 3"),
];

fn status_class(status: Option<ChangeStatus>) -> Option<&'static str> {
    match status {
        Some(ChangeStatus::Added) => Some("added"),
        Some(ChangeStatus::Removed) => Some("removed"),
        Some(ChangeStatus::Changed) => Some("changed"),
        Some(ChangeStatus::Unchanged) | None => None,
    }
}

fn node(output: &mut String, id: &ObjectId, class: Option<&str>) {
    output.push_str(&format!(
        "        {}[\"{}<br/>{}\"]",
        id.node_id(),
        id.kind,
        id.name
    ));
    if let Some(class) = class {
        output.push_str(&format!(":::{class}"));
    }
    output.push('\n');
}

/// Renders the dependency graph of all charts as a mermaid flowchart.
///
/// Each chart becomes a subgraph. Nodes are classed by how they changed relative to the
/// previously applied state, removed objects included. Dependencies that no chart
/// defines, such as secrets managed elsewhere, are drawn as external nodes.
pub fn render_graph(charts: &[Chart], diffs: &[GroupDiff]) -> String {
    let mut output = String::from(GRAPH_HEADER);
    for (name, style) in CLASS_DEFS {
        output.push_str(&format!("    classDef {name} {style}\n"));
    }

    let mut edges = Vec::new();

    for chart in charts {
        let diff = diffs.iter().find(|diff| diff.group == chart.namespace());
        let status_of = |id: &ObjectId| diff.and_then(|diff| diff.status_of(id));

        output.push_str(&format!("\n    subgraph {}\n", chart.namespace()));

        let mut external = BTreeSet::new();
        for object in chart.objects() {
            node(&mut output, object.id(), status_class(status_of(object.id())));

            for dependency in object.depends_on() {
                if chart.get(dependency).is_none() {
                    external.insert(dependency.clone());
                }
                edges.push((object.id().node_id(), dependency.node_id()));
            }
        }

        if let Some(diff) = diff {
            for change in &diff.changes {
                if change.status == ChangeStatus::Removed {
                    node(&mut output, &change.id, status_class(Some(change.status)));
                }
            }
        }

        for id in &external {
            node(&mut output, id, Some("external"));
        }

        output.push_str("    end\n");
    }

    if !edges.is_empty() {
        output.push('\n');
    }
    for (from, to) in edges {
        output.push_str(&format!("    {from} --> {to}\n"));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerBuilder;
    use crate::deployment::DeploymentBuilder;
    use crate::env::EnvBuilder;
    use crate::state::AppliedState;

    fn chart() -> Chart {
        let container = ContainerBuilder::new("app", "image", ["/app"])
            .with_env(EnvBuilder::default().with_secrets_from("creds"))
            .with_ports([1234]);
        let mut chart = Chart::new("monitoring");
        DeploymentBuilder::new("app")
            .with_containers([container])
            .with_service()
            .build(&mut chart)
            .unwrap();
        chart
    }

    #[test]
    fn renders_nodes_edges_and_external_dependencies() {
        let chart = chart();
        let diff = GroupDiff::compute("monitoring", &chart, &AppliedState::new()).unwrap();

        let graph = render_graph(&[chart], &[diff]);

        assert!(graph.starts_with(GRAPH_HEADER));
        assert!(graph.contains("    subgraph monitoring\n"));
        assert!(graph.contains(
            "        monitoring_deployment_app[\"Deployment<br/>app\"]:::added\n"
        ));
        assert!(graph.contains("        monitoring_service_app[\"Service<br/>app\"]:::added\n"));
        assert!(graph.contains(
            "        monitoring_secret_creds[\"Secret<br/>creds\"]:::external\n"
        ));
        assert!(graph.contains("    monitoring_service_app --> monitoring_deployment_app\n"));
        assert!(graph.contains("    monitoring_deployment_app --> monitoring_secret_creds\n"));
    }

    #[test]
    fn unchanged_nodes_have_no_class_and_removed_nodes_are_kept() {
        let chart = chart();
        let mut applied: AppliedState = chart
            .objects()
            .iter()
            .map(|object| (object.id().clone(), object.body().clone()))
            .collect();
        let stale = ObjectId::new("ConfigMap", Some("monitoring".to_string()), "stale");
        applied.insert(stale, serde_yaml::Value::Null);
        let diff = GroupDiff::compute("monitoring", &chart, &applied).unwrap();

        let graph = render_graph(&[chart], &[diff]);

        assert!(graph.contains("        monitoring_deployment_app[\"Deployment<br/>app\"]\n"));
        assert!(graph.contains(
            "        monitoring_configmap_stale[\"ConfigMap<br/>stale\"]:::removed\n"
        ));
    }
}
