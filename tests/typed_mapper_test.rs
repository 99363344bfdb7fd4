use anyhow::Result;
use jsonapi_deserializer::{
    Attributes, Built, Deserializer, JsonApiDocument, JsonApiError, PropertiesMapper, Relation,
    Relationships, ResourceId,
};
use serde_json::json;
use std::cell::Cell;

/// A small typed domain: articles written by people.
#[derive(Debug, Clone, PartialEq)]
enum Model {
    Article(Article),
    Person(Person),
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Article {
    id: String,
    title: Option<String>,
    author: Option<Box<Model>>,
    comments: Vec<Model>,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Person {
    id: String,
    name: Option<String>,
}

#[derive(Default)]
struct BlogMapper {
    relationship_calls: Cell<usize>,
}

impl PropertiesMapper for BlogMapper {
    type Model = Model;

    fn create_model(&self, r#type: &str) -> jsonapi_deserializer::Result<Option<Model>> {
        match r#type {
            "article" => Ok(Some(Model::Article(Article::default()))),
            "people" => Ok(Some(Model::Person(Person::default()))),
            // drafts are deliberately not modelled
            "draft" => Ok(None),
            other => Err(JsonApiError::UnknownType(other.to_string())),
        }
    }

    fn set_id(&self, model: &mut Model, id: &ResourceId) -> jsonapi_deserializer::Result<()> {
        match model {
            Model::Article(article) => article.id = id.to_string(),
            Model::Person(person) => person.id = id.to_string(),
        }
        Ok(())
    }

    fn set_attributes(
        &self,
        model: &mut Model,
        attributes: Option<&Attributes>,
    ) -> jsonapi_deserializer::Result<()> {
        let text = |name: &str| {
            attributes
                .and_then(|attrs| attrs.get(name))
                .and_then(|value| value.as_str())
                .map(str::to_string)
        };
        match model {
            Model::Article(article) => article.title = text("title"),
            Model::Person(person) => person.name = text("name"),
        }
        Ok(())
    }

    fn set_relationships(
        &self,
        model: &mut Model,
        relationships: Relationships<Model>,
    ) -> jsonapi_deserializer::Result<()> {
        self.relationship_calls.set(self.relationship_calls.get() + 1);
        let Model::Article(article) = model else {
            return Ok(());
        };
        for (name, relation) in relationships {
            match (name.as_str(), relation) {
                ("author", Relation::One(author)) => article.author = Some(Box::new(author)),
                ("comments", Relation::Many(comments)) => article.comments = comments,
                _ => {}
            }
        }
        Ok(())
    }
}

fn document(value: serde_json::Value) -> JsonApiDocument {
    JsonApiDocument::from_value(value).expect("valid JSON:API document")
}

#[test]
fn test_typed_models_are_built() -> Result<()> {
    let mut deserializer = Deserializer::new(BlogMapper::default());
    deserializer.load(document(json!({
        "data": {
            "id": "1",
            "type": "article",
            "attributes": {"title": "A"},
            "relationships": {"author": {"data": {"id": "9", "type": "people"}}}
        },
        "included": [{"id": "9", "type": "people", "attributes": {"name": "Bob"}}]
    })));

    let built = deserializer.build()?;
    let expected = Model::Article(Article {
        id: "1".to_string(),
        title: Some("A".to_string()),
        author: Some(Box::new(Model::Person(Person {
            id: "9".to_string(),
            name: Some("Bob".to_string()),
        }))),
        comments: vec![],
    });
    assert_eq!(built, Built::Single(Some(expected)));
    assert_eq!(deserializer.mapper().relationship_calls.get(), 1);
    Ok(())
}

#[test]
fn test_declined_models_are_skipped() -> Result<()> {
    let mut deserializer = Deserializer::new(BlogMapper::default());
    deserializer.load(document(json!({
        "data": [
            {"id": "1", "type": "article"},
            {"id": "2", "type": "draft"},
            {"id": "3", "type": "article"}
        ]
    })));

    let models = deserializer.build()?.into_collection().expect("collection");
    assert_eq!(models.len(), 2);
    assert_eq!(deserializer.mapper().relationship_calls.get(), 0);

    deserializer.load(document(json!({"data": {"id": "2", "type": "draft"}})));
    assert_eq!(deserializer.build()?, Built::Single(None));
    Ok(())
}

#[test]
fn test_mapper_errors_propagate() {
    let mut deserializer = Deserializer::new(BlogMapper::default());
    deserializer.load(document(json!({
        "data": {
            "id": "1",
            "type": "article",
            "relationships": {"tags": {"data": [{"id": "t1", "type": "tag"}]}}
        }
    })));

    match deserializer.build() {
        Err(JsonApiError::UnknownType(name)) => assert_eq!(name, "tag"),
        other => panic!("expected unknown type error, got {:?}", other),
    }
}

#[test]
fn test_borrowed_mapper_can_be_reused() -> Result<()> {
    let mapper = BlogMapper::default();
    for id in ["1", "2"] {
        let mut deserializer = Deserializer::new(&mapper);
        deserializer.load(document(json!({
            "data": {
                "id": id,
                "type": "article",
                "relationships": {"comments": {"data": [{"id": "9", "type": "people"}]}}
            }
        })));
        let Some(Model::Article(article)) = deserializer.build()?.into_single() else {
            panic!("expected an article");
        };
        assert_eq!(article.id, id);
        assert_eq!(article.comments.len(), 1);
    }
    assert_eq!(mapper.relationship_calls.get(), 2);
    Ok(())
}
