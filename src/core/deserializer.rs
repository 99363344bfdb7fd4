use crate::domain::model::{
    Built, JsonApiDocument, Linkage, PrimaryData, Relation, Relationships, ResourceId,
    ResourceObject,
};
use crate::domain::ports::PropertiesMapper;
use crate::utils::error::{JsonApiError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cell::OnceCell;
use std::collections::{HashMap, HashSet};

/// What to do when a relationship leads back to a resource that is still
/// being built further up the same path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePolicy {
    /// Abort the build with [`JsonApiError::CycleDetected`].
    #[default]
    Fail,
    /// Build the re-entered resource with id and attributes, but stop
    /// expanding its relationships.
    Shallow,
}

/// Lookup of `included` resources by `(type, id)`.
#[derive(Debug, Default)]
pub struct IncludedIndex {
    positions: HashMap<String, HashMap<String, usize>>,
}

impl IncludedIndex {
    pub fn build(included: &[ResourceObject]) -> Self {
        let mut positions: HashMap<String, HashMap<String, usize>> = HashMap::new();
        for (position, item) in included.iter().enumerate() {
            // last duplicate wins
            positions
                .entry(item.r#type.clone())
                .or_default()
                .insert(item.id.as_key().into_owned(), position);
        }
        Self { positions }
    }

    pub fn position(&self, r#type: &str, id: &str) -> Option<usize> {
        self.positions.get(r#type)?.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// A loaded document together with its included index.
///
/// The index is built on first lookup and lives exactly as long as the
/// document it was built from, so loading another document always starts
/// from a fresh, unbuilt index.
#[derive(Debug)]
pub struct LoadedDocument {
    document: JsonApiDocument,
    index: OnceCell<IncludedIndex>,
}

impl LoadedDocument {
    pub fn new(document: JsonApiDocument) -> Self {
        Self {
            document,
            index: OnceCell::new(),
        }
    }

    pub fn document(&self) -> &JsonApiDocument {
        &self.document
    }

    pub fn is_indexed(&self) -> bool {
        self.index.get().is_some()
    }

    pub fn included_index(&self) -> &IncludedIndex {
        self.index.get_or_init(|| {
            let index = IncludedIndex::build(&self.document.included);
            tracing::debug!("Indexed {} included resources", index.len());
            index
        })
    }

    /// Returns the included resource for `(type, id)`, or an identity-only
    /// stub when `included` does not carry it.
    pub fn resolve(&self, id: &ResourceId, r#type: &str) -> Cow<'_, ResourceObject> {
        self.resolve_entry(id, r#type).1
    }

    /// Like [`resolve`](Self::resolve), also returning the position in
    /// `included` when the resource was found there.
    fn resolve_entry(
        &self,
        id: &ResourceId,
        r#type: &str,
    ) -> (Option<usize>, Cow<'_, ResourceObject>) {
        match self.included_index().position(r#type, &id.as_key()) {
            Some(position) => (
                Some(position),
                Cow::Borrowed(&self.document.included[position]),
            ),
            None => {
                tracing::trace!("{}:{} not in included, using identifier only", r#type, id);
                (None, Cow::Owned(ResourceObject::stub(id, r#type)))
            }
        }
    }
}

/// Included resources under construction on the current recursion path,
/// by position in `included`. Primary data and identifier-only stubs are
/// never tracked: re-reaching them yields a stub, which cannot recurse.
#[derive(Default)]
struct BuildContext {
    in_progress: HashSet<usize>,
}

pub struct Deserializer<P: PropertiesMapper> {
    mapper: P,
    loaded: Option<LoadedDocument>,
    cycle_policy: CyclePolicy,
}

impl<P: PropertiesMapper> Deserializer<P> {
    pub fn new(mapper: P) -> Self {
        Self {
            mapper,
            loaded: None,
            cycle_policy: CyclePolicy::default(),
        }
    }

    pub fn with_cycle_policy(mut self, cycle_policy: CyclePolicy) -> Self {
        self.cycle_policy = cycle_policy;
        self
    }

    pub fn cycle_policy(&self) -> CyclePolicy {
        self.cycle_policy
    }

    pub fn mapper(&self) -> &P {
        &self.mapper
    }

    pub fn set_properties_mapper(&mut self, mapper: P) {
        self.mapper = mapper;
    }

    /// Replaces the loaded document. The previous document's index goes
    /// with it.
    pub fn load(&mut self, document: JsonApiDocument) {
        tracing::debug!(
            "Loaded JSON:API document with {} included resources",
            document.included.len()
        );
        self.loaded = Some(LoadedDocument::new(document));
    }

    pub fn loaded(&self) -> Option<&LoadedDocument> {
        self.loaded.as_ref()
    }

    fn loaded_document(&self) -> Result<&LoadedDocument> {
        self.loaded.as_ref().ok_or(JsonApiError::NotLoaded)
    }

    /// Builds the loaded document's primary data.
    ///
    /// A collection yields [`Built::Collection`] with resources the mapper
    /// declined left out; a single resource (or `null`) yields
    /// [`Built::Single`].
    pub fn build(&self) -> Result<Built<P::Model>> {
        let loaded = self.loaded_document()?;
        let data = loaded
            .document()
            .data
            .as_ref()
            .ok_or(JsonApiError::MissingData)?;
        let mut ctx = BuildContext::default();

        match data {
            PrimaryData::Collection(resources) => {
                let mut models = Vec::with_capacity(resources.len());
                for resource in resources {
                    if let Some(model) = self.build_model(loaded, resource, None, &mut ctx)? {
                        models.push(model);
                    }
                }
                tracing::debug!(
                    "Built {} of {} primary resources",
                    models.len(),
                    resources.len()
                );
                Ok(Built::Collection(models))
            }
            PrimaryData::Single(Some(resource)) => {
                Ok(Built::Single(self.build_model(loaded, resource, None, &mut ctx)?))
            }
            PrimaryData::Single(None) => Ok(Built::Single(None)),
        }
    }

    pub fn build_model_by_data(&self, resource: &ResourceObject) -> Result<Option<P::Model>> {
        let loaded = self.loaded_document()?;
        self.build_model(loaded, resource, None, &mut BuildContext::default())
    }

    pub fn build_relations_by_data(
        &self,
        resource: &ResourceObject,
    ) -> Result<Option<Relationships<P::Model>>> {
        let loaded = self.loaded_document()?;
        self.build_relations(loaded, resource, &mut BuildContext::default())
    }

    pub fn resolve(&self, id: &ResourceId, r#type: &str) -> Result<Cow<'_, ResourceObject>> {
        Ok(self.loaded_document()?.resolve(id, r#type))
    }

    pub fn ensure_included_index(&self) -> Result<&IncludedIndex> {
        Ok(self.loaded_document()?.included_index())
    }

    fn build_model(
        &self,
        loaded: &LoadedDocument,
        resource: &ResourceObject,
        position: Option<usize>,
        ctx: &mut BuildContext,
    ) -> Result<Option<P::Model>> {
        let reentered = position.is_some_and(|p| ctx.in_progress.contains(&p));
        if reentered && self.cycle_policy == CyclePolicy::Fail {
            return Err(JsonApiError::CycleDetected {
                resource_type: resource.r#type.clone(),
                id: resource.id.as_key().into_owned(),
            });
        }

        let Some(mut model) = self.mapper.create_model(&resource.r#type)? else {
            tracing::trace!("Mapper skipped {}:{}", resource.r#type, resource.id);
            return Ok(None);
        };
        self.mapper.set_id(&mut model, &resource.id)?;
        self.mapper
            .set_attributes(&mut model, resource.attributes.as_ref())?;

        if reentered {
            tracing::debug!(
                "Relationship cycle at {}:{}, not expanding further",
                resource.r#type,
                resource.id
            );
            return Ok(Some(model));
        }

        if let Some(position) = position {
            ctx.in_progress.insert(position);
        }
        let relationships = self.build_relations(loaded, resource, ctx);
        if let Some(position) = position {
            ctx.in_progress.remove(&position);
        }

        if let Some(relationships) = relationships? {
            self.mapper.set_relationships(&mut model, relationships)?;
        }

        Ok(Some(model))
    }

    fn build_relations(
        &self,
        loaded: &LoadedDocument,
        resource: &ResourceObject,
        ctx: &mut BuildContext,
    ) -> Result<Option<Relationships<P::Model>>> {
        let mut ready = Relationships::new();

        if let Some(relationships) = &resource.relationships {
            for (name, relationship) in relationships {
                match &relationship.data {
                    Some(Linkage::ToMany(identifiers)) => {
                        let mut models = Vec::with_capacity(identifiers.len());
                        for identifier in identifiers {
                            let (position, related) =
                                loaded.resolve_entry(&identifier.id, &identifier.r#type);
                            if let Some(model) =
                                self.build_model(loaded, &related, position, ctx)?
                            {
                                models.push(model);
                            }
                        }
                        ready.insert(name.clone(), Relation::Many(models));
                    }
                    Some(Linkage::ToOne(identifier)) => {
                        let (position, related) =
                            loaded.resolve_entry(&identifier.id, &identifier.r#type);
                        if let Some(model) = self.build_model(loaded, &related, position, ctx)? {
                            ready.insert(name.clone(), Relation::One(model));
                        }
                    }
                    None => {}
                }
            }
        }

        if ready.is_empty() {
            Ok(None)
        } else {
            Ok(Some(ready))
        }
    }
}

impl<P: PropertiesMapper + Default> Default for Deserializer<P> {
    fn default() -> Self {
        Self::new(P::default())
    }
}

/// Loads `document` into a fresh deserializer and builds it.
pub fn deserialize<P: PropertiesMapper>(
    mapper: P,
    document: JsonApiDocument,
) -> Result<Built<P::Model>> {
    let mut deserializer = Deserializer::new(mapper);
    deserializer.load(document);
    deserializer.build()
}
