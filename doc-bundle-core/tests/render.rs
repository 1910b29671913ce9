mod common;

use common::{generated_at, render_input};
use doc_bundle_core::model::{OutputFormat, SourceData, Template};
use doc_bundle_core::render::{self, list_templates, metrics, preview, RenderInput};
use std::io::Read;
use std::sync::Arc;

fn render_text(template: Template, format: OutputFormat, input: &RenderInput) -> String {
    let bytes = render::render(template, format, input).expect("render should succeed");
    String::from_utf8(bytes).expect("textual formats are utf-8")
}

#[test]
fn test_rendering_is_deterministic_for_same_input_and_timestamp() {
    let input = render_input();
    for format in [
        OutputFormat::Txt,
        OutputFormat::Md,
        OutputFormat::Html,
        OutputFormat::Docx,
        OutputFormat::Pdf,
        OutputFormat::Json,
    ] {
        for template in list_templates() {
            let first = render::render(template, format, &input).unwrap();
            let second = render::render(template, format, &input).unwrap();
            assert_eq!(first, second, "{template}/{format} output differs between calls");
        }
    }
}

#[test]
fn test_txt_enumerates_insights_and_recommendation_details() {
    let text = render_text(Template::Report, OutputFormat::Txt, &render_input());

    assert!(text.starts_with("Site Plan\n=========\n"), "got:\n{text}");
    assert!(text.contains("Generated: 2026-03-14 09:30 UTC"));
    assert!(text.contains("1. Silt fence is missing along the north boundary\n"));
    assert!(text.contains("4. Haul road crosses the drainage swale\n"));
    assert!(text.contains("Category: environmental / erosion (priority: high)"));
    assert!(text.contains("Citation: 29 CFR 1926.652"));
}

#[test]
fn test_markdown_separates_recommendations_with_rules() {
    let md = render_text(Template::Report, OutputFormat::Md, &render_input());

    assert!(md.starts_with("# Site Plan\n"));
    assert!(md.contains("\n## Recommendations\n"));
    assert!(md.contains("### 1. Install silt fence"));
    assert!(md.contains("### 2. Shore trenches"));
    assert_eq!(md.matches("\n---\n").count(), 1);
    assert!(md.contains("> Citation: EPA CGP 2.2.3"));
}

fn hostile_input() -> RenderInput {
    let mut data = common::source_data();
    data.project_description = Some("#3 priority site\n## not a section\nPhase two\n====".to_string());
    data.recommendations[0].description = "Check daily\n---\n# weekly audit".to_string();
    let mut input = RenderInput::new("Site Plan", Arc::new(data), generated_at());
    input.source_document_ids = vec!["1".into(), "2".into()];
    input
}

#[test]
fn test_source_text_cannot_add_markdown_sections() {
    let md = render_text(Template::Report, OutputFormat::Md, &hostile_input());
    let expected = metrics::markdown_headings(&render_text(
        Template::Report,
        OutputFormat::Md,
        &render_input(),
    ));

    assert_eq!(metrics::markdown_headings(&md), expected);
    assert!(md.contains("\\#3 priority site\n\\## not a section\n"), "got:\n{md}");
    assert!(md.contains("Check daily\n\\---\n\\# weekly audit"));
}

#[test]
fn test_source_text_cannot_add_plain_text_sections() {
    let txt = render_text(Template::Report, OutputFormat::Txt, &hostile_input());
    let expected = metrics::plain_text_headings(&render_text(
        Template::Report,
        OutputFormat::Txt,
        &render_input(),
    ));

    assert_eq!(metrics::plain_text_headings(&txt), expected);
    assert!(!txt.contains("\n====\n"));
    assert!(txt.contains("Phase two\n ====\n"));
}

#[test]
fn test_html_wraps_each_recommendation_in_a_styled_div() {
    let html = render_text(Template::Report, OutputFormat::Html, &render_input());

    assert!(html.contains("<style>"));
    assert_eq!(html.matches("<div class=\"recommendation\">").count(), 2);
    assert!(!html.contains("<script"));
}

#[test]
fn test_recommendations_in_the_type_category_come_first() {
    let mut input = render_input();
    input.category = Some("safety".to_string());
    let md = render_text(Template::Recommendations, OutputFormat::Md, &input);

    let shore = md.find("Shore trenches").unwrap();
    let silt = md.find("Install silt fence").unwrap();
    assert!(shore < silt);
    assert!(md.contains("### 1. Shore trenches"));
}

#[test]
fn test_flags_gate_optional_sections() {
    let mut input = render_input();
    input.include_recommendations = false;
    input.include_analyses = false;
    let md = render_text(Template::Report, OutputFormat::Md, &input);
    assert!(!md.contains("## Recommendations"));
    assert!(!md.contains("## Key Insights"));
    assert!(md.contains("## Analysis Summary"));

    let mut input = render_input();
    input.include_analyses = true;
    let summary = render_text(Template::Summary, OutputFormat::Md, &input);
    assert!(summary.contains("3. Fuel storage lacks secondary containment"));
    assert!(!summary.contains("Haul road"), "summary keeps only the top insights");
}

#[test]
fn test_empty_source_data_still_renders_a_section() {
    let input = RenderInput::new("Empty", Arc::new(SourceData::default()), generated_at());
    let md = render_text(Template::Analysis, OutputFormat::Md, &input);
    assert!(md.contains("No analysis data was available for this document."));
}

#[test]
fn test_docx_package_carries_the_text_content() {
    let bytes = render::render(Template::Report, OutputFormat::Docx, &render_input()).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();

    for part in [
        "[Content_Types].xml",
        "_rels/.rels",
        "word/document.xml",
        "word/styles.xml",
        "docProps/core.xml",
    ] {
        assert!(archive.by_name(part).is_ok(), "missing part {part}");
    }

    let mut document = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut document)
        .unwrap();
    assert!(document.contains("Install silt fence"));
    assert!(document.contains("Citation: EPA CGP 2.2.3"));

    let mut core = String::new();
    archive
        .by_name("docProps/core.xml")
        .unwrap()
        .read_to_string(&mut core)
        .unwrap();
    assert!(core.contains("2026-03-14T09:30:00Z"));
}

#[test]
fn test_pdf_output_is_a_pdf_document() {
    let bytes = render::render(Template::Summary, OutputFormat::Pdf, &render_input()).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert!(bytes.len() > 500);
}

#[test]
fn test_pdf_info_dates_come_from_the_generation_timestamp() {
    let bytes = render::render(Template::Report, OutputFormat::Pdf, &render_input()).unwrap();
    let text = String::from_utf8_lossy(&bytes);

    assert!(text.contains("/CreationDate(D:20260314093000+00'00')"), "got:\n{text}");
    assert!(text.contains("/ModDate(D:20260314093000+00'00')"));
    assert!(!text.contains("D:1970"));
}

#[test]
fn test_pdf_differs_only_when_the_input_differs() {
    let input = render_input();
    let mut later = render_input();
    later.generated_at = generated_at() + chrono::Duration::minutes(1);

    let first = render::render(Template::Report, OutputFormat::Pdf, &input).unwrap();
    let again = render::render(Template::Report, OutputFormat::Pdf, &input).unwrap();
    let other = render::render(Template::Report, OutputFormat::Pdf, &later).unwrap();

    assert_eq!(first, again);
    assert_ne!(first, other);
}

#[test]
fn test_json_output_is_the_serialized_outline() {
    let bytes = render::render(Template::Analysis, OutputFormat::Json, &render_input()).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(value["title"], "Site Plan");
    let headings: Vec<&str> = value["sections"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["heading"].as_str().unwrap())
        .collect();
    assert!(headings.contains(&"Insights"));
    assert!(headings.contains(&"Findings: Geotechnical report"));
}

#[test]
fn test_preview_is_truncated_to_1000_characters() {
    let mut data = common::source_data();
    data.project_description = Some("word ".repeat(400));
    let input = RenderInput::new("Long", Arc::new(data), generated_at());

    let preview = preview(Template::Report, &input);
    assert!(preview.ends_with("..."));
    assert_eq!(preview.chars().count(), 1003);

    let short = preview_of_short();
    assert!(!short.ends_with("..."));
}

fn preview_of_short() -> String {
    let input = RenderInput::new("Short", Arc::new(SourceData::default()), generated_at());
    preview(Template::Summary, &input)
}

#[test]
fn test_list_templates_returns_all_four() {
    let names: Vec<String> = list_templates().iter().map(|t| t.to_string()).collect();
    assert_eq!(names, vec!["report", "summary", "analysis", "recommendations"]);
}
