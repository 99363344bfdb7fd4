use crate::domain::model::{Attributes, Relationships, ResourceId};
use crate::utils::error::Result;

/// Builds and fills domain models on behalf of the deserializer.
///
/// The deserializer never looks inside a model; everything it knows about
/// one goes through these four calls. Any model system plugs in by
/// implementing this trait.
pub trait PropertiesMapper {
    type Model;

    /// Returns a fresh model for `type`, or `None` to skip the resource.
    fn create_model(&self, r#type: &str) -> Result<Option<Self::Model>>;

    fn set_id(&self, model: &mut Self::Model, id: &ResourceId) -> Result<()>;

    /// Called for every resource, with `None` when `attributes` is absent.
    fn set_attributes(
        &self,
        model: &mut Self::Model,
        attributes: Option<&Attributes>,
    ) -> Result<()>;

    /// Only called when at least one relationship resolved to data.
    fn set_relationships(
        &self,
        model: &mut Self::Model,
        relationships: Relationships<Self::Model>,
    ) -> Result<()>;
}

impl<P: PropertiesMapper + ?Sized> PropertiesMapper for &P {
    type Model = P::Model;

    fn create_model(&self, r#type: &str) -> Result<Option<Self::Model>> {
        (**self).create_model(r#type)
    }

    fn set_id(&self, model: &mut Self::Model, id: &ResourceId) -> Result<()> {
        (**self).set_id(model, id)
    }

    fn set_attributes(
        &self,
        model: &mut Self::Model,
        attributes: Option<&Attributes>,
    ) -> Result<()> {
        (**self).set_attributes(model, attributes)
    }

    fn set_relationships(
        &self,
        model: &mut Self::Model,
        relationships: Relationships<Self::Model>,
    ) -> Result<()> {
        (**self).set_relationships(model, relationships)
    }
}

pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}
