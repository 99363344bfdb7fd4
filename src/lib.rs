pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{json_mapper::JsonPropertiesMapper, storage::LocalStorage};
pub use core::{deserialize, CyclePolicy, Deserializer, IncludedIndex, LoadedDocument};
pub use domain::model::{
    Attributes, Built, JsonApiDocument, Linkage, PrimaryData, Relation, Relationship,
    Relationships, ResourceId, ResourceIdentifier, ResourceObject,
};
pub use domain::ports::{PropertiesMapper, Storage};
pub use utils::error::{JsonApiError, Result};
