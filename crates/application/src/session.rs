//! The editing session.
//!
//! One [`EditorSession`] owns everything an editing flow needs: the full tree
//! of the loaded collection, its display list, and the generation workbench
//! (template request, response sample, attributes, conditions, mappings).
//! Every backend call takes `&mut self`, so two loads or saves of the same
//! session cannot overlap.

use postgen_domain::collection::{
    DisplayList, LeafAddress, RequestEdit, address_of, locate,
};
use postgen_domain::generation::{
    AttributeSet, AttributeType, BodyFieldMapping, BodyMappingTable, ConditionCatalog,
    ConditionKey, ConditionMode, ConditionSelection, CustomConditions, ExtractedAttribute,
    GenerationOutcome, GenerationPlan, GenerationPlanner, PlanInput,
};
use postgen_domain::{CollectionTree, DomainError, Request};
use serde_json::{Map, Value};

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{CollectionStore, GenerationService};
use crate::use_cases::{
    ExtractAttributes, GenerateRequests, LoadCollection, LoadState, ResolveConditions,
    SaveCollection,
};

/// The request that generated requests are modelled on.
#[derive(Debug, Clone)]
struct Template {
    address: LeafAddress,
    sample: Option<Value>,
    mappings: BodyMappingTable,
}

/// Session-scoped editing state over a store and a generation service.
pub struct EditorSession<S: CollectionStore, G: GenerationService> {
    store: S,
    service: G,
    collection_id: Option<String>,
    tree: CollectionTree,
    display: DisplayList,
    state: LoadState,
    catalog: ConditionCatalog,
    attributes: AttributeSet,
    custom_conditions: CustomConditions,
    selection: ConditionSelection,
    mode: ConditionMode,
    template: Option<Template>,
    object_type: String,
}

impl<S: CollectionStore, G: GenerationService> EditorSession<S, G> {
    /// Creates an idle session.
    #[must_use]
    pub fn new(store: S, service: G) -> Self {
        Self {
            store,
            service,
            collection_id: None,
            tree: CollectionTree::default(),
            display: DisplayList::default(),
            state: LoadState::Idle,
            catalog: ConditionCatalog::new(),
            attributes: AttributeSet::default(),
            custom_conditions: CustomConditions::new(),
            selection: ConditionSelection::new(),
            mode: ConditionMode::All,
            template: None,
            object_type: String::new(),
        }
    }

    /// Id of the loaded collection.
    #[must_use]
    pub fn collection_id(&self) -> Option<&str> {
        self.collection_id.as_deref()
    }

    /// Outcome of the last load.
    #[must_use]
    pub const fn state(&self) -> LoadState {
        self.state
    }

    /// The full tree.
    #[must_use]
    pub const fn tree(&self) -> &CollectionTree {
        &self.tree
    }

    /// The display list.
    #[must_use]
    pub const fn display(&self) -> &DisplayList {
        &self.display
    }

    /// The merged attribute set.
    #[must_use]
    pub const fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    /// The condition catalog resolved so far.
    #[must_use]
    pub const fn catalog(&self) -> &ConditionCatalog {
        &self.catalog
    }

    /// Current condition selection.
    #[must_use]
    pub const fn selection(&self) -> &ConditionSelection {
        &self.selection
    }

    /// Body mappings of the template request, once one is selected.
    #[must_use]
    pub fn body_mappings(&self) -> Option<&BodyMappingTable> {
        self.template.as_ref().map(|t| &t.mappings)
    }

    fn loaded_id(&self) -> ApplicationResult<String> {
        self.collection_id.clone().ok_or(ApplicationError::NotLoaded)
    }

    fn template(&self) -> ApplicationResult<&Template> {
        self.template
            .as_ref()
            .ok_or_else(|| ApplicationError::Validation("select a template request first".into()))
    }

    fn require_attribute(&self, path: &str) -> ApplicationResult<&ExtractedAttribute> {
        self.attributes
            .get(path)
            .ok_or_else(|| ApplicationError::Validation(format!("unknown attribute `{path}`")))
    }

    /// Loads a collection, replacing the whole session state.
    ///
    /// The previous state is kept when either fetch fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot serve either view.
    pub async fn load_collection(&mut self, collection_id: &str) -> ApplicationResult<LoadState> {
        let output = LoadCollection::new(&self.store).execute(collection_id).await?;

        self.collection_id = Some(collection_id.to_string());
        self.tree = output.tree;
        self.display = output.display;
        self.state = output.state;
        self.attributes = AttributeSet::default();
        self.custom_conditions = CustomConditions::new();
        self.selection.clear();
        self.mode = ConditionMode::All;
        self.template = None;
        self.object_type.clear();
        Ok(self.state)
    }

    /// Looks up a request in the full tree.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::NotFound`] if the address does not resolve.
    pub fn request(&self, address: &LeafAddress) -> ApplicationResult<&Request> {
        locate(&self.tree, address)
            .map(|located| located.request)
            .ok_or_else(|| DomainError::RequestNotFound(address.to_string()).into())
    }

    /// Applies a form edit to the addressed request.
    ///
    /// # Errors
    ///
    /// - [`ApplicationError::NotFound`] if the address does not resolve
    /// - [`ApplicationError::Validation`] if the header text is malformed
    pub fn edit_request(
        &mut self,
        address: &LeafAddress,
        edit: RequestEdit,
    ) -> ApplicationResult<LeafAddress> {
        self.loaded_id()?;
        let edited = self.tree.edit_request(address, edit)?;
        if let Some(located) = locate(&self.tree, &edited) {
            self.display.patch_edited(address, located.request);
        }
        if let Some(template) = self.template.as_mut()
            && &template.address == address
        {
            template.address = edited.clone();
        }
        tracing::info!(from = %address, to = %edited, "request edited");
        Ok(edited)
    }

    /// Clones the addressed request next to itself.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::NotFound`] if the address does not resolve.
    pub fn clone_request(&mut self, address: &LeafAddress) -> ApplicationResult<LeafAddress> {
        self.loaded_id()?;
        let cloned = self.tree.clone_request(address)?;
        self.display.patch_cloned(address, &cloned.request);
        tracing::info!(source = %address, copy = %cloned.address, "request cloned");
        Ok(cloned.address)
    }

    /// Deletes the addressed request.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::NotFound`] if the address does not resolve.
    pub fn delete_request(&mut self, address: &LeafAddress) -> ApplicationResult<Request> {
        self.loaded_id()?;
        let removed = self.tree.delete_request(address)?;
        self.display.patch_removed(address);
        if self.template.as_ref().is_some_and(|t| &t.address == address) {
            self.template = None;
        }
        tracing::info!(%address, "request deleted");
        Ok(removed)
    }

    /// Writes the full tree back to the store.
    ///
    /// Local edits stay applied when the write fails and are sent again on
    /// the next save.
    ///
    /// # Errors
    ///
    /// Returns an error if no collection is loaded or the store rejects the write.
    pub async fn save(&mut self) -> ApplicationResult<()> {
        let collection_id = self.loaded_id()?;
        SaveCollection::new(&self.store)
            .execute(&collection_id, &self.tree)
            .await
    }

    /// Picks the request generated requests are modelled on.
    ///
    /// Resets attributes, custom conditions and the selection; the body
    /// mapping table is rebuilt from the request's JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::NotFound`] if the address does not resolve.
    pub fn select_template(&mut self, address: &LeafAddress) -> ApplicationResult<()> {
        let located = locate(&self.tree, address)
            .ok_or_else(|| DomainError::RequestNotFound(address.to_string()))?;
        let request = located.request;
        let body = request
            .body
            .as_ref()
            .and_then(|body| body.json_template())
            .unwrap_or_else(|| Value::Object(Map::new()));

        self.template = Some(Template {
            address: address_of(request, located.parent.map(|f| f.name.as_str())),
            sample: request.sample_body(),
            mappings: BodyMappingTable::from_template(&body),
        });
        self.attributes = AttributeSet::default();
        self.custom_conditions = CustomConditions::new();
        self.selection.clear();
        Ok(())
    }

    /// Extracts attributes from `sample`, or from the template's saved
    /// response when `sample` is `None`. Custom attributes are kept.
    ///
    /// # Errors
    ///
    /// - [`ApplicationError::Validation`] without a template or a sample
    /// - [`ApplicationError::ExternalService`] if extraction fails
    pub async fn extract_attributes(&mut self, sample: Option<Value>) -> ApplicationResult<usize> {
        let sample = match sample {
            Some(sample) => sample,
            None => self.template()?.sample.clone().ok_or_else(|| {
                ApplicationError::Validation("the template request has no JSON response sample".into())
            })?,
        };
        let extracted = ExtractAttributes::new(&self.service).execute(&sample).await?;

        if let Some(template) = self.template.as_mut() {
            template.sample = Some(sample);
        }
        self.attributes.set_extracted(extracted);
        Ok(self.attributes.len())
    }

    /// Resolves the condition keys of every attribute type not cached yet.
    ///
    /// Custom conditions that the resolved catalog now lists are dropped; a
    /// selection of them stays valid.
    pub async fn resolve_conditions(&mut self) -> usize {
        let resolved = ResolveConditions::new(&self.service)
            .execute(&mut self.catalog, &self.attributes)
            .await;
        let (catalog, attributes) = (&self.catalog, &self.attributes);
        let dropped = self.custom_conditions.drop_catalogued(|path, key| {
            attributes.get(path).is_some_and(|attribute| {
                catalog.contains(attribute.attr_type.as_str(), key.as_str())
            })
        });
        if dropped > 0 {
            tracing::debug!(dropped, "custom conditions now in the catalog");
        }
        resolved
    }

    /// Adds (or replaces) a user-defined attribute.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::Validation`] for a blank path.
    pub fn add_custom_attribute(
        &mut self,
        path: &str,
        attr_type: AttributeType,
        nullable: bool,
    ) -> ApplicationResult<()> {
        let path = path.trim();
        if path.is_empty() {
            return Err(ApplicationError::Validation("attribute name is required".into()));
        }
        self.attributes
            .add_custom(ExtractedAttribute::custom(path, attr_type, nullable));
        Ok(())
    }

    /// Adds a condition token for an attribute and selects it.
    ///
    /// Returns whether the token became a new custom condition; tokens already
    /// in the catalog are only selected.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::Validation`] for an unknown attribute or a
    /// blank token.
    pub fn add_custom_condition(&mut self, attribute: &str, token: &str) -> ApplicationResult<bool> {
        let attr_type = self.require_attribute(attribute)?.attr_type;
        let catalog = self.catalog.conditions_for(attr_type.as_str());
        let added = self.custom_conditions.add(attribute, token, &catalog)?;
        self.selection
            .select(attribute, ConditionKey::from(token.trim()));
        Ok(added)
    }

    /// Switches between generating every condition and the explicit selection.
    pub const fn set_condition_mode(&mut self, mode: ConditionMode) {
        self.mode = mode;
    }

    /// Replaces the selected conditions of one attribute.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::Validation`] for an unknown attribute or a
    /// key that is neither in the catalog nor a custom condition.
    pub fn select_conditions(
        &mut self,
        attribute: &str,
        keys: Vec<ConditionKey>,
    ) -> ApplicationResult<()> {
        let attr_type = self.require_attribute(attribute)?.attr_type;
        let catalog = self.catalog.conditions_for(attr_type.as_str());
        let custom = self.custom_conditions.for_attribute(attribute);
        if let Some(unknown) = keys
            .iter()
            .find(|key| !catalog.contains(key) && !custom.contains(key))
        {
            return Err(ApplicationError::Validation(format!(
                "condition `{unknown}` is not available for `{attribute}`"
            )));
        }
        self.selection.set(attribute, keys);
        Ok(())
    }

    /// Sets the mapping of one body field of the template request.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::Validation`] without a template or for a
    /// field that is not in the template body.
    pub fn set_body_mapping(
        &mut self,
        field: &str,
        mapping: BodyFieldMapping,
    ) -> ApplicationResult<()> {
        let template = self
            .template
            .as_mut()
            .ok_or_else(|| ApplicationError::Validation("select a template request first".into()))?;
        template.mappings.set(field, mapping)?;
        Ok(())
    }

    /// Sets the object type label.
    pub fn set_object_type(&mut self, label: impl Into<String>) {
        self.object_type = label.into();
    }

    /// Computes the request count and the generation payload.
    ///
    /// # Errors
    ///
    /// - [`ApplicationError::NotLoaded`] without a collection
    /// - [`ApplicationError::NotFound`] if the template request is gone
    /// - [`ApplicationError::Validation`] for a missing object type, an empty
    ///   selection or an incomplete mapping
    pub fn compute_plan(&self) -> ApplicationResult<GenerationPlan> {
        let collection_id = self.loaded_id()?;
        let template = self.template()?;
        self.request(&template.address)?;

        let empty = Value::Object(Map::new());
        let input = PlanInput {
            collection_id: &collection_id,
            template: &template.address,
            response_body: template.sample.as_ref().unwrap_or(&empty),
            object_type: &self.object_type,
            collection_name: Some(self.tree.info.name.as_str()).filter(|n| !n.is_empty()),
            attributes: &self.attributes,
            mode: self.mode,
            selection: &self.selection,
            custom_conditions: &self.custom_conditions,
            body_mappings: &template.mappings,
        };
        Ok(GenerationPlanner::new(&self.catalog).plan(&input)?)
    }

    /// Computes the plan and hands it to the generation service, then
    /// refreshes the tree so a later save keeps the generated requests.
    ///
    /// # Errors
    ///
    /// Returns the plan's validation errors, or an error if the service
    /// rejects the request.
    pub async fn generate(&mut self) -> ApplicationResult<GenerationOutcome> {
        let plan = self.compute_plan()?;
        tracing::info!(
            expected = plan.total_request_count,
            object_type = %plan.payload.object_type,
            "generating filtered requests"
        );
        let outcome = GenerateRequests::new(&self.service)
            .execute(&plan.payload)
            .await?;

        let collection_id = plan.payload.collection_id;
        match LoadCollection::new(&self.store).execute(&collection_id).await {
            Ok(output) => {
                self.tree = output.tree;
                self.display = output.display;
                self.state = output.state;
            }
            Err(err) => {
                tracing::warn!(
                    collection_id = %collection_id,
                    error = %err,
                    "generated requests were stored but the tree could not be refreshed"
                );
            }
        }
        Ok(outcome)
    }
}
