//! Attribute extraction, condition catalog and generation planning.

mod attribute;
mod condition;
mod mapping;
mod plan;

pub use attribute::{
    AttributeSet, AttributeType, ExtractedAttribute, extract_attributes, extract_paths,
};
pub use condition::{
    ConditionCatalog, ConditionKey, CustomConditions, fallback_conditions, normalize_type,
};
pub use mapping::{BodyFieldMapping, BodyMappingTable, MappingSource, SpecialToken, WireMapping};
pub use plan::{
    ConditionMode, ConditionSelection, CustomAttributeSpec, GenerationOutcome, GenerationPlan,
    GenerationPlanner, GenerationRequest, PlanInput,
};
