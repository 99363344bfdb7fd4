pub mod deserializer;

pub use crate::domain::model::{Built, JsonApiDocument, Relation, Relationships, ResourceObject};
pub use crate::domain::ports::{PropertiesMapper, Storage};
pub use crate::utils::error::Result;
pub use deserializer::{deserialize, CyclePolicy, Deserializer, IncludedIndex, LoadedDocument};
