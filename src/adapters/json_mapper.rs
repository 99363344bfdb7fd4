use crate::domain::model::{Attributes, Relation, Relationships, ResourceId};
use crate::domain::ports::PropertiesMapper;
use crate::utils::error::{JsonApiError, Result};
use serde_json::{Map, Value};

pub const RELATIONSHIP_NAMES_PROP: &str = "relationshipNames";

/// Default mapper: every model is a plain JSON object.
///
/// `{"type": ..., "id": ..., <attributes>..., <relationships>..., "relationshipNames": [...]}`
#[derive(Debug, Clone)]
pub struct JsonPropertiesMapper {
    relationship_names_prop: String,
}

impl JsonPropertiesMapper {
    pub fn new() -> Self {
        Self::with_relationship_names_prop(RELATIONSHIP_NAMES_PROP)
    }

    pub fn with_relationship_names_prop(prop: impl Into<String>) -> Self {
        Self {
            relationship_names_prop: prop.into(),
        }
    }

    pub fn relationship_names_prop(&self) -> &str {
        &self.relationship_names_prop
    }

    fn object<'a>(&self, model: &'a mut Value) -> Result<&'a mut Map<String, Value>> {
        model
            .as_object_mut()
            .ok_or_else(|| JsonApiError::Mapper("JSON model is not an object".into()))
    }
}

impl Default for JsonPropertiesMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertiesMapper for JsonPropertiesMapper {
    type Model = Value;

    fn create_model(&self, r#type: &str) -> Result<Option<Value>> {
        let mut model = Map::new();
        model.insert("type".to_string(), Value::String(r#type.to_string()));
        Ok(Some(Value::Object(model)))
    }

    fn set_id(&self, model: &mut Value, id: &ResourceId) -> Result<()> {
        self.object(model)?
            .insert("id".to_string(), Value::from(id.clone()));
        Ok(())
    }

    fn set_attributes(&self, model: &mut Value, attributes: Option<&Attributes>) -> Result<()> {
        let Some(attributes) = attributes else {
            return Ok(());
        };
        let object = self.object(model)?;
        for (name, value) in attributes {
            object.insert(name.clone(), value.clone());
        }
        Ok(())
    }

    fn set_relationships(
        &self,
        model: &mut Value,
        relationships: Relationships<Value>,
    ) -> Result<()> {
        let names_prop = self.relationship_names_prop.clone();
        let object = self.object(model)?;

        let mut names: Vec<Value> = match object.remove(&names_prop) {
            Some(Value::Array(existing)) => existing,
            _ => Vec::new(),
        };

        for (name, relation) in relationships {
            let value = match relation {
                Relation::One(related) => related,
                Relation::Many(related) => Value::Array(related),
            };
            let name_value = Value::String(name.clone());
            if !names.contains(&name_value) {
                names.push(name_value);
            }
            object.insert(name, value);
        }

        object.insert(names_prop, Value::Array(names));
        Ok(())
    }
}
