#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use doc_bundle_core::index::{IndexSnapshot, SessionFileIndex};
use doc_bundle_core::model::{
    AnalysisRecord, AnalysisSummary, Recommendation, SessionFile, SourceData,
};
use doc_bundle_core::render::RenderInput;
use std::sync::Arc;

pub fn generated_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
}

pub fn source_data() -> SourceData {
    SourceData {
        project_description: Some("Two-storey warehouse on a 3 acre parcel".to_string()),
        site_data: Some("Clay soils sloping toward the north creek".to_string()),
        analysis: Some(AnalysisSummary {
            summary: "Runoff and excavation are the dominant site risks.".to_string(),
            insights: vec![
                "Silt fence is missing along the north boundary".to_string(),
                "Trench work exceeds 5 ft depth".to_string(),
                "Fuel storage lacks secondary containment".to_string(),
                "Haul road crosses the drainage swale".to_string(),
            ],
            records: vec![AnalysisRecord {
                document_id: "1".into(),
                title: "Geotechnical report".to_string(),
                findings: vec!["Groundwater encountered at 8 ft".to_string()],
            }],
        }),
        recommendations: vec![
            Recommendation {
                title: "Install silt fence".to_string(),
                description: "Place silt fence along the north boundary before grading."
                    .to_string(),
                category: "environmental".to_string(),
                subcategory: Some("erosion".to_string()),
                citation: Some("EPA CGP 2.2.3".to_string()),
                priority: Some("high".to_string()),
            },
            Recommendation {
                title: "Shore trenches".to_string(),
                description: "Use trench boxes for every excavation deeper than 5 ft."
                    .to_string(),
                category: "safety".to_string(),
                subcategory: None,
                citation: Some("29 CFR 1926.652".to_string()),
                priority: None,
            },
        ],
    }
}

pub fn render_input() -> RenderInput {
    let mut input = RenderInput::new("Site Plan", Arc::new(source_data()), generated_at());
    input.source_document_ids = vec!["1".into(), "2".into()];
    input
}

pub fn upload(id: &str, name: &str) -> SessionFile {
    SessionFile::uploaded(id, name, "pdf", 128, generated_at())
}

pub fn snapshot_with(files: &[(&str, &str)]) -> IndexSnapshot {
    let mut index = SessionFileIndex::new();
    for (id, name) in files {
        index.add(upload(id, name)).unwrap();
    }
    index.snapshot()
}
