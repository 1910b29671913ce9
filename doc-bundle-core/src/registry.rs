//! Static catalog of the document types the workspace can generate.

use crate::model::Template;
use serde::Serialize;
use std::collections::BTreeMap;
use strum::{AsRefStr, Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PriorityClass {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentTypeDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub priority: PriorityClass,
    pub default_template: Template,
}

const fn descriptor(
    id: &'static str,
    title: &'static str,
    description: &'static str,
    category: &'static str,
    priority: PriorityClass,
    default_template: Template,
) -> DocumentTypeDescriptor {
    DocumentTypeDescriptor {
        id,
        title,
        description,
        category,
        priority,
        default_template,
    }
}

static DOCUMENT_TYPES: &[DocumentTypeDescriptor] = &[
    descriptor(
        "swppp",
        "Stormwater Pollution Prevention Plan",
        "Controls for sediment and pollutant discharge during construction",
        "environmental",
        PriorityClass::High,
        Template::Report,
    ),
    descriptor(
        "jsa",
        "Job Safety Analysis",
        "Task-by-task hazard breakdown with controls for field crews",
        "safety",
        PriorityClass::High,
        Template::Analysis,
    ),
    descriptor(
        "site_safety_plan",
        "Site Safety Plan",
        "Site-wide safety responsibilities, emergency procedures and PPE requirements",
        "safety",
        PriorityClass::High,
        Template::Report,
    ),
    descriptor(
        "erosion_control_plan",
        "Erosion and Sediment Control Plan",
        "Best management practices for soil stabilization and sediment capture",
        "environmental",
        PriorityClass::High,
        Template::Recommendations,
    ),
    descriptor(
        "permit_application",
        "Permit Application Package",
        "Narrative and supporting findings for permit submittals",
        "permits",
        PriorityClass::High,
        Template::Report,
    ),
    descriptor(
        "spcc_plan",
        "Spill Prevention, Control and Countermeasure Plan",
        "Storage, containment and response measures for oil and fuel",
        "environmental",
        PriorityClass::Medium,
        Template::Recommendations,
    ),
    descriptor(
        "inspection_checklist",
        "Site Inspection Checklist",
        "Recurring inspection items derived from the site analysis",
        "compliance",
        PriorityClass::Medium,
        Template::Recommendations,
    ),
    descriptor(
        "traffic_control_plan",
        "Traffic Control Plan",
        "Work zone layout, signage and flagging requirements",
        "safety",
        PriorityClass::Medium,
        Template::Recommendations,
    ),
    descriptor(
        "waste_management_plan",
        "Waste Management Plan",
        "Handling, segregation and disposal of construction waste",
        "environmental",
        PriorityClass::Medium,
        Template::Report,
    ),
    descriptor(
        "noise_control_plan",
        "Noise Control Plan",
        "Work hour limits and noise mitigation measures",
        "compliance",
        PriorityClass::Low,
        Template::Recommendations,
    ),
    descriptor(
        "executive_summary",
        "Executive Summary",
        "Short overview of the analysis for stakeholders",
        "report",
        PriorityClass::Low,
        Template::Summary,
    ),
    descriptor(
        "analysis_report",
        "Site Analysis Report",
        "Full findings from every analyzed source document",
        "report",
        PriorityClass::Low,
        Template::Analysis,
    ),
];

/// Read-only view over the built-in catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeRegistry;

impl TypeRegistry {
    pub fn new() -> Self {
        Self
    }

    pub fn list_types(&self) -> &'static [DocumentTypeDescriptor] {
        DOCUMENT_TYPES
    }

    pub fn get(&self, id: &str) -> Option<&'static DocumentTypeDescriptor> {
        DOCUMENT_TYPES.iter().find(|d| d.id == id)
    }

    pub fn filter_by_priority(&self, priority: PriorityClass) -> Vec<&'static DocumentTypeDescriptor> {
        DOCUMENT_TYPES
            .iter()
            .filter(|d| d.priority == priority)
            .collect()
    }

    /// Descriptors grouped by category, categories in alphabetical order and
    /// catalog order kept inside each group.
    pub fn group_by_category(&self) -> BTreeMap<&'static str, Vec<&'static DocumentTypeDescriptor>> {
        let mut groups: BTreeMap<&'static str, Vec<&'static DocumentTypeDescriptor>> = BTreeMap::new();
        for d in DOCUMENT_TYPES {
            groups.entry(d.category).or_default().push(d);
        }
        groups
    }
}
