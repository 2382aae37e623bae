use std::fmt;

use serde_yaml::Value;

/// Identity of a rendered Kubernetes object.
///
/// Two objects with equal ids describe the same cluster resource, which is how compiled
/// objects are matched against the previously applied state.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId {
    pub kind: String,
    pub namespace: Option<String>,
    pub name: String,
}

impl ObjectId {
    pub fn new(
        kind: impl Into<String>,
        namespace: Option<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            namespace,
            name: name.into(),
        }
    }

    /// Extracts the identity of a parsed manifest document.
    ///
    /// Returns `None` when `kind` or `metadata.name` is missing.
    pub fn from_value(value: &Value) -> Option<Self> {
        let kind = value.get("kind")?.as_str()?;
        let metadata = value.get("metadata")?;
        let name = metadata.get("name")?.as_str()?;
        let namespace = metadata
            .get("namespace")
            .and_then(Value::as_str)
            .map(str::to_owned);

        Some(Self::new(kind, namespace, name))
    }

    /// Returns an identifier usable as a mermaid node id.
    pub fn node_id(&self) -> String {
        let raw = match &self.namespace {
            Some(namespace) => format!("{namespace}_{}_{}", self.kind, self.name),
            None => format!("{}_{}", self.kind, self.name),
        };

        raw.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{namespace}/{}/{}", self.kind, self.name),
            None => write!(f, "{}/{}", self.kind, self.name),
        }
    }
}

/// An object registered in a [`crate::Chart`], already rendered to a YAML value.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiObject {
    pub(crate) id: ObjectId,
    pub(crate) body: Value,
    pub(crate) depends_on: Vec<ObjectId>,
}

impl ApiObject {
    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Objects this object references and which must exist for it to work.
    pub fn depends_on(&self) -> &[ObjectId] {
        &self.depends_on
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_identity_from_manifest_document() {
        let value: Value = serde_yaml::from_str(
            "apiVersion: v1\nkind: Service\nmetadata:\n  name: prom2parquet\n  namespace: monitoring\n",
        )
        .unwrap();

        let id = ObjectId::from_value(&value).unwrap();

        assert_eq!(
            id,
            ObjectId::new("Service", Some("monitoring".to_string()), "prom2parquet")
        );
        assert_eq!(id.to_string(), "monitoring/Service/prom2parquet");
    }

    #[test]
    fn document_without_name_has_no_identity() {
        let value: Value = serde_yaml::from_str("kind: Service\nmetadata: {}\n").unwrap();

        assert!(ObjectId::from_value(&value).is_none());
    }

    #[test]
    fn node_id_is_mermaid_safe() {
        let id = ObjectId::new("Deployment", Some("monitoring".to_string()), "prom-2.parquet");

        assert_eq!(id.node_id(), "monitoring_deployment_prom_2_parquet");
    }
}
