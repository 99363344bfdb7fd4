use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::utils::error::Result;

/// Attribute members of a resource object, in document order.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Resolved relationships keyed by relationship name, in document order.
pub type Relationships<M> = IndexMap<String, Relation<M>>;

/// A JSON:API resource id. Documents use strings, but numbers show up often
/// enough in the wild that both are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Str(String),
    Num(serde_json::Number),
}

impl ResourceId {
    /// Key form used for included lookups; `"9"` and `9` share a key.
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            ResourceId::Str(s) => Cow::Borrowed(s),
            ResourceId::Num(n) => Cow::Owned(n.to_string()),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Str(s) => f.write_str(s),
            ResourceId::Num(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        ResourceId::Str(value.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(value: String) -> Self {
        ResourceId::Str(value)
    }
}

impl From<u64> for ResourceId {
    fn from(value: u64) -> Self {
        ResourceId::Num(value.into())
    }
}

impl From<i64> for ResourceId {
    fn from(value: i64) -> Self {
        ResourceId::Num(value.into())
    }
}

impl From<ResourceId> for serde_json::Value {
    fn from(id: ResourceId) -> Self {
        match id {
            ResourceId::Str(s) => serde_json::Value::String(s),
            ResourceId::Num(n) => serde_json::Value::Number(n),
        }
    }
}

/// `{ "id", "type" }` linkage inside a relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    pub id: ResourceId,
    pub r#type: String,
}

impl ResourceIdentifier {
    pub fn new(r#type: impl Into<String>, id: impl Into<ResourceId>) -> Self {
        Self {
            id: id.into(),
            r#type: r#type.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Linkage {
    ToMany(Vec<ResourceIdentifier>),
    ToOne(ResourceIdentifier),
}

/// A relationship member. `data` absent or `null` means "no linkage".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Linkage>,
}

impl Relationship {
    pub fn to_one(identifier: ResourceIdentifier) -> Self {
        Self {
            data: Some(Linkage::ToOne(identifier)),
        }
    }

    pub fn to_many(identifiers: Vec<ResourceIdentifier>) -> Self {
        Self {
            data: Some(Linkage::ToMany(identifiers)),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceObject {
    pub id: ResourceId,
    pub r#type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<IndexMap<String, Relationship>>,
}

impl ResourceObject {
    pub fn new(r#type: impl Into<String>, id: impl Into<ResourceId>) -> Self {
        Self {
            id: id.into(),
            r#type: r#type.into(),
            attributes: None,
            relationships: None,
        }
    }

    /// Degenerate resource carrying only its identity, used when a linkage
    /// points at something that is not in `included`.
    pub fn stub(id: &ResourceId, r#type: &str) -> Self {
        Self::new(r#type, id.clone())
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    pub fn with_relationship(
        mut self,
        name: impl Into<String>,
        relationship: Relationship,
    ) -> Self {
        self.relationships
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), relationship);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryData {
    Collection(Vec<ResourceObject>),
    Single(Option<ResourceObject>),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JsonApiDocument {
    /// `None` only when the `data` member is absent; `"data": null` is
    /// `Some(PrimaryData::Single(None))`.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<PrimaryData>,
    #[serde(
        default,
        deserialize_with = "deserialize_null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub included: Vec<ResourceObject>,
}

fn deserialize_present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn deserialize_null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl JsonApiDocument {
    pub fn single(resource: ResourceObject) -> Self {
        Self {
            data: Some(PrimaryData::Single(Some(resource))),
            included: Vec::new(),
        }
    }

    pub fn collection(resources: Vec<ResourceObject>) -> Self {
        Self {
            data: Some(PrimaryData::Collection(resources)),
            included: Vec::new(),
        }
    }

    pub fn with_included(mut self, included: Vec<ResourceObject>) -> Self {
        self.included = included;
        self
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

impl FromStr for JsonApiDocument {
    type Err = crate::utils::error::JsonApiError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

/// A resolved relationship value handed to the properties mapper.
#[derive(Debug, Clone, PartialEq)]
pub enum Relation<M> {
    One(M),
    Many(Vec<M>),
}

impl<M> Relation<M> {
    pub fn as_one(&self) -> Option<&M> {
        match self {
            Relation::One(model) => Some(model),
            Relation::Many(_) => None,
        }
    }

    pub fn as_many(&self) -> Option<&[M]> {
        match self {
            Relation::One(_) => None,
            Relation::Many(models) => Some(models),
        }
    }
}

/// Output of a build. The shape mirrors the document's primary data.
#[derive(Debug, Clone, PartialEq)]
pub enum Built<M> {
    Single(Option<M>),
    Collection(Vec<M>),
}

impl<M> Built<M> {
    pub fn is_collection(&self) -> bool {
        matches!(self, Built::Collection(_))
    }

    pub fn len(&self) -> usize {
        match self {
            Built::Single(model) => usize::from(model.is_some()),
            Built::Collection(models) => models.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_single(self) -> Option<M> {
        match self {
            Built::Single(model) => model,
            Built::Collection(_) => None,
        }
    }

    pub fn into_collection(self) -> Option<Vec<M>> {
        match self {
            Built::Single(_) => None,
            Built::Collection(models) => Some(models),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_single_document() {
        let doc = JsonApiDocument::from_value(json!({
            "data": {
                "id": "1",
                "type": "article",
                "attributes": {"title": "A"},
                "relationships": {
                    "author": {"data": {"id": 9, "type": "people"}},
                    "tags": {"data": []},
                    "editor": {"data": null},
                    "comments": {"links": {"related": "/articles/1/comments"}}
                },
                "links": {"self": "/articles/1"}
            },
            "meta": {"total": 1}
        }))
        .unwrap();

        let Some(PrimaryData::Single(Some(article))) = &doc.data else {
            panic!("expected single primary data, got {:?}", doc.data);
        };
        assert_eq!(article.r#type, "article");
        assert_eq!(article.id, ResourceId::from("1"));
        assert!(doc.included.is_empty());

        let relationships = article.relationships.as_ref().unwrap();
        let names: Vec<&str> = relationships.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["author", "tags", "editor", "comments"]);
        assert_eq!(
            relationships["author"].data,
            Some(Linkage::ToOne(ResourceIdentifier::new("people", 9u64)))
        );
        assert_eq!(relationships["tags"].data, Some(Linkage::ToMany(vec![])));
        assert_eq!(relationships["editor"].data, None);
        assert_eq!(relationships["comments"].data, None);
    }

    #[test]
    fn test_null_and_missing_data_are_distinct() {
        let null_data: JsonApiDocument = r#"{"data": null, "included": null}"#.parse().unwrap();
        assert_eq!(null_data.data, Some(PrimaryData::Single(None)));
        assert!(null_data.included.is_empty());

        let missing: JsonApiDocument = r#"{"meta": {}}"#.parse().unwrap();
        assert_eq!(missing.data, None);
    }

    #[test]
    fn test_collection_data() {
        let doc: JsonApiDocument =
            r#"{"data": [{"id": "1", "type": "a"}, {"id": "2", "type": "a"}]}"#.parse().unwrap();
        match doc.data {
            Some(PrimaryData::Collection(items)) => assert_eq!(items.len(), 2),
            other => panic!("expected collection, got {:?}", other),
        }
    }

    #[test]
    fn test_resource_id_key_form() {
        assert_eq!(ResourceId::from("9").as_key(), "9");
        assert_eq!(ResourceId::from(9u64).as_key(), "9");
        assert_eq!(ResourceId::from(-3i64).to_string(), "-3");
    }

    #[test]
    fn test_built_shape_helpers() {
        let single: Built<u8> = Built::Single(Some(1));
        assert!(!single.is_collection());
        assert_eq!(single.len(), 1);
        assert_eq!(single.into_single(), Some(1));

        let many: Built<u8> = Built::Collection(vec![]);
        assert!(many.is_collection());
        assert!(many.is_empty());
        assert_eq!(many.into_collection(), Some(vec![]));
    }
}
