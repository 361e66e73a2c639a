use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A learning resource attached to a concept.
///
/// The service output is not validated upstream, so every field tolerates
/// absence or `null`, and fields this client does not know are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    #[serde(default, deserialize_with = "null_as_default")]
    pub prerequisites: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resources: Vec<Resource>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Concepts keyed by name, in the order the service produced them.
///
/// Prerequisite names are expected to reference other keys of the same graph but
/// nothing here checks that; lookups of unknown names simply come back empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnowledgeGraph(IndexMap<String, Concept>);

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, name: &str) -> Option<&Concept> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, concept: Concept) {
        self.0.insert(name.into(), concept);
    }

    pub fn concepts(&self) -> impl Iterator<Item = (&str, &Concept)> {
        self.0.iter().map(|(name, concept)| (name.as_str(), concept))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn resources_for(&self, name: &str) -> &[Resource] {
        self.get(name)
            .map(|concept| concept.resources.as_slice())
            .unwrap_or_default()
    }
}

impl FromIterator<(String, Concept)> for KnowledgeGraph {
    fn from_iter<T: IntoIterator<Item = (String, Concept)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Ordered concept names recommended by the service.
pub type LearningPath = Vec<String>;

/// Concept names in first-marked order.
pub type ConceptSet = IndexSet<String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concept_fields_default_when_absent() {
        let graph: KnowledgeGraph =
            serde_json::from_str(r#"{"Limits":{},"Derivatives":{"prerequisites":["Limits"]}}"#)
                .expect("graph");

        assert_eq!(graph.len(), 2);
        assert!(graph.resources_for("Limits").is_empty());
        assert_eq!(
            graph.get("Derivatives").expect("concept").prerequisites,
            vec!["Limits".to_string()]
        );
    }

    #[test]
    fn preserves_service_key_order() {
        let graph: KnowledgeGraph =
            serde_json::from_str(r#"{"Zeta":{},"Alpha":{},"Mu":{}}"#).expect("graph");
        assert_eq!(graph.names().collect::<Vec<_>>(), ["Zeta", "Alpha", "Mu"]);
    }

    #[test]
    fn resource_type_uses_wire_name() {
        let resource = Resource {
            title: "Intro".into(),
            url: "https://x".into(),
            kind: "video".into(),
            ..Resource::default()
        };
        let value = serde_json::to_value(&resource).expect("serialize");
        assert_eq!(value["type"], "video");
    }

    #[test]
    fn null_and_missing_fields_fall_back_to_empty() {
        let graph: KnowledgeGraph = serde_json::from_str(
            r#"{"Limits":{"prerequisites":null,"resources":[{"title":"Notes","url":null}]},
                "Series":{"resources":null}}"#,
        )
        .expect("graph");

        let limits = graph.get("Limits").expect("concept");
        assert!(limits.prerequisites.is_empty());
        assert_eq!(limits.resources[0].title, "Notes");
        assert_eq!(limits.resources[0].url, "");
        assert_eq!(limits.resources[0].kind, "");
        assert!(graph.resources_for("Series").is_empty());
    }

    #[test]
    fn unknown_fields_survive_reserialization() {
        let raw = serde_json::json!({
            "Limits": {
                "prerequisites": [],
                "resources": [{"title": "Intro", "url": "https://x", "type": "video", "minutes": 12}],
                "description": "approach"
            }
        });
        let graph: KnowledgeGraph = serde_json::from_value(raw.clone()).expect("graph");

        assert_eq!(
            graph.get("Limits").expect("concept").extra["description"],
            "approach"
        );
        assert_eq!(serde_json::to_value(&graph).expect("serialize"), raw);
    }

    #[test]
    fn resources_for_unknown_concept_is_empty() {
        assert!(KnowledgeGraph::new().resources_for("Missing").is_empty());
    }
}
