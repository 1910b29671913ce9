//! Format-independent content model built by the templates.
//!
//! A template decides *which* sections exist and in what order; the format modules only
//! decide how an [`Outline`] is encoded.

use super::RenderInput;
use crate::model::{Recommendation, Template};
use chrono::{DateTime, Utc};
use serde::Serialize;

const SUMMARY_INSIGHT_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outline {
    pub title: String,
    pub subtitle: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub heading: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Block {
    Paragraph(String),
    Ordered(Vec<String>),
    Bullets(Vec<String>),
    Recommendations(Vec<Recommendation>),
}

impl Outline {
    pub fn generated_line(&self) -> String {
        format!("Generated: {}", self.generated_at.format("%Y-%m-%d %H:%M UTC"))
    }
}

impl Section {
    fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            blocks: Vec::new(),
        }
    }

    fn push(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }
}

pub fn build(template: Template, input: &RenderInput) -> Outline {
    let mut sections = match template {
        Template::Report => report(input),
        Template::Summary => summary(input),
        Template::Analysis => analysis(input),
        Template::Recommendations => recommendations(input),
    };
    sections.retain(|s| !s.blocks.is_empty());
    if sections.is_empty() {
        sections.push(Section::new("Summary").push(Block::Paragraph(
            "No analysis data was available for this document.".to_string(),
        )));
    }

    let subtitle = input
        .type_title
        .as_ref()
        .filter(|t| **t != input.title)
        .cloned();

    Outline {
        title: input.title.clone(),
        subtitle,
        generated_at: input.generated_at,
        sections,
    }
}

fn overview(input: &RenderInput) -> Section {
    let mut section = Section::new("Overview");
    if let Some(desc) = non_empty(input.source.project_description.as_deref()) {
        section = section.push(Block::Paragraph(desc.to_string()));
    }
    if let Some(site) = non_empty(input.source.site_data.as_deref()) {
        section = section.push(Block::Paragraph(format!("Site data: {site}")));
    }
    if let Some(query) = non_empty(input.query.as_deref()) {
        section = section.push(Block::Paragraph(format!("Focus: {query}")));
    }
    section
}

fn analysis_summary(input: &RenderInput, heading: &str) -> Section {
    let mut section = Section::new(heading);
    if let Some(summary) = input
        .source
        .analysis
        .as_ref()
        .and_then(|a| non_empty(Some(a.summary.as_str())))
    {
        section = section.push(Block::Paragraph(summary.to_string()));
    }
    section
}

fn insights(input: &RenderInput, heading: &str, limit: Option<usize>) -> Section {
    let items: Vec<String> = input
        .source
        .analysis
        .iter()
        .flat_map(|a| a.insights.iter())
        .take(limit.unwrap_or(usize::MAX))
        .cloned()
        .collect();
    let section = Section::new(heading);
    if items.is_empty() {
        section
    } else {
        section.push(Block::Ordered(items))
    }
}

fn findings(input: &RenderInput) -> Vec<Section> {
    input
        .source
        .analysis
        .iter()
        .flat_map(|a| a.records.iter())
        .filter(|r| !r.findings.is_empty())
        .map(|r| {
            Section::new(format!("Findings: {}", r.title)).push(Block::Bullets(r.findings.clone()))
        })
        .collect()
}

fn recommendation_block(input: &RenderInput) -> Section {
    let recs = ordered_recommendations(input);
    let section = Section::new("Recommendations");
    if recs.is_empty() {
        section
    } else {
        section.push(Block::Recommendations(recs))
    }
}

fn sources(input: &RenderInput) -> Section {
    let section = Section::new("Source Documents");
    if input.source_document_ids.is_empty() {
        return section;
    }
    section.push(Block::Bullets(
        input
            .source_document_ids
            .iter()
            .map(|id| id.to_string())
            .collect(),
    ))
}

fn report(input: &RenderInput) -> Vec<Section> {
    let mut sections = vec![overview(input), analysis_summary(input, "Analysis Summary")];
    if input.include_analyses {
        sections.push(insights(input, "Key Insights", None));
        sections.extend(findings(input));
    }
    if input.include_recommendations {
        sections.push(recommendation_block(input));
    }
    sections.push(sources(input));
    sections
}

fn summary(input: &RenderInput) -> Vec<Section> {
    let mut lead = analysis_summary(input, "Summary");
    if lead.blocks.is_empty() {
        if let Some(desc) = non_empty(input.source.project_description.as_deref()) {
            lead = lead.push(Block::Paragraph(desc.to_string()));
        }
    }
    let mut sections = vec![lead];
    if input.include_analyses {
        sections.push(insights(input, "Key Insights", Some(SUMMARY_INSIGHT_LIMIT)));
    }
    if input.include_recommendations {
        let titles: Vec<String> = ordered_recommendations(input)
            .into_iter()
            .map(|r| r.title)
            .collect();
        let section = Section::new("Recommended Actions");
        sections.push(if titles.is_empty() {
            section
        } else {
            section.push(Block::Bullets(titles))
        });
    }
    sections
}

// The analysis template always carries insights and findings; the flag only adds
// recommendations on top.
fn analysis(input: &RenderInput) -> Vec<Section> {
    let mut sections = vec![
        overview(input),
        analysis_summary(input, "Analysis Summary"),
        insights(input, "Insights", None),
    ];
    sections.extend(findings(input));
    if input.include_recommendations {
        sections.push(recommendation_block(input));
    }
    sections
}

fn recommendations(input: &RenderInput) -> Vec<Section> {
    let mut sections = vec![analysis_summary(input, "Overview"), recommendation_block(input)];
    if input.include_analyses {
        sections.push(insights(input, "Supporting Insights", None));
    }
    sections
}

/// Recommendations in the type's own category first, original order otherwise.
fn ordered_recommendations(input: &RenderInput) -> Vec<Recommendation> {
    let mut recs = input.source.recommendations.clone();
    if let Some(category) = input.category.as_deref() {
        recs.sort_by_key(|r| !r.category.eq_ignore_ascii_case(category));
    }
    recs
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Paragraph style of a flattened line, shared by the docx and pdf encoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    Subtitle,
    Heading,
    SubHeading,
    Body,
    ListItem,
    Quote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub style: LineStyle,
    pub text: String,
}

impl Line {
    fn new(style: LineStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }
}

/// Flattens the outline into styled lines for paragraph-oriented containers.
pub fn flatten(outline: &Outline) -> Vec<Line> {
    let mut lines = vec![Line::new(LineStyle::Title, outline.title.as_str())];
    if let Some(subtitle) = &outline.subtitle {
        lines.push(Line::new(LineStyle::Subtitle, subtitle.as_str()));
    }
    lines.push(Line::new(LineStyle::Subtitle, outline.generated_line()));

    for section in &outline.sections {
        lines.push(Line::new(LineStyle::Heading, section.heading.as_str()));
        for block in &section.blocks {
            match block {
                Block::Paragraph(text) => lines.push(Line::new(LineStyle::Body, text.as_str())),
                Block::Ordered(items) => lines.extend(
                    items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| Line::new(LineStyle::ListItem, format!("{}. {}", i + 1, item))),
                ),
                Block::Bullets(items) => lines.extend(
                    items
                        .iter()
                        .map(|item| Line::new(LineStyle::ListItem, format!("- {item}"))),
                ),
                Block::Recommendations(recs) => {
                    for (i, rec) in recs.iter().enumerate() {
                        lines.push(Line::new(
                            LineStyle::SubHeading,
                            format!("{}. {}", i + 1, rec.title),
                        ));
                        lines.push(Line::new(LineStyle::Body, category_line(rec)));
                        lines.push(Line::new(LineStyle::Body, rec.description.as_str()));
                        if let Some(citation) = &rec.citation {
                            lines.push(Line::new(LineStyle::Quote, format!("Citation: {citation}")));
                        }
                    }
                }
            }
        }
    }
    lines
}

pub(crate) fn category_line(rec: &Recommendation) -> String {
    let mut line = format!("Category: {}", rec.category);
    if let Some(sub) = &rec.subcategory {
        line.push_str(" / ");
        line.push_str(sub);
    }
    if let Some(priority) = &rec.priority {
        line.push_str(&format!(" (priority: {priority})"));
    }
    line
}
