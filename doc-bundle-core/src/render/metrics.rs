//! User-visible counters derived from rendered text.
//!
//! Word count is the number of whitespace-delimited tokens. Sections are found by their
//! heading markers: ATX `#` to `######` prefixes in Markdown, `=`/`-` underlines in plain
//! text.
//! Formats without a readable text body (html, json, docx, pdf) are measured on the
//! Markdown rendition of the same outline.

use super::{render_markdown, RenderInput};
use crate::model::{OutputFormat, Template};
use once_cell::sync::Lazy;
use regex::Regex;

static ATX_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#{1,6} (.*)$").expect("static regex compiles"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetrics {
    pub word_count: usize,
    pub sections: Vec<String>,
}

pub fn measure(
    template: Template,
    format: OutputFormat,
    input: &RenderInput,
    rendered: &[u8],
) -> DocumentMetrics {
    match format {
        OutputFormat::Txt => {
            let text = String::from_utf8_lossy(rendered);
            DocumentMetrics {
                word_count: word_count(&text),
                sections: plain_text_headings(&text),
            }
        }
        OutputFormat::Md => {
            let text = String::from_utf8_lossy(rendered);
            DocumentMetrics {
                word_count: word_count(&text),
                sections: markdown_headings(&text),
            }
        }
        _ => {
            let text = render_markdown(template, input);
            DocumentMetrics {
                word_count: word_count(&text),
                sections: markdown_headings(&text),
            }
        }
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn markdown_headings(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| ATX_HEADING.captures(line))
        .map(|caps| caps[1].trim().to_string())
        .collect()
}

/// A heading is a non-empty line followed by a line of at least three `=` or `-`.
pub fn plain_text_headings(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    lines
        .windows(2)
        .filter(|pair| !pair[0].trim().is_empty() && is_underline(pair[1]))
        .map(|pair| pair[0].trim().to_string())
        .collect()
}

pub(crate) fn is_underline(line: &str) -> bool {
    let line = line.trim_end();
    line.len() >= 3 && (line.chars().all(|c| c == '=') || line.chars().all(|c| c == '-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_whitespace_delimited_tokens() {
        assert_eq!(word_count("  one two\tthree\n\nfour "), 4);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn finds_markdown_heading_markers() {
        let md = "# Title\n\ntext\n## Overview\n### 1. Fix silt fence\nnot # a heading\n";
        assert_eq!(
            markdown_headings(md),
            vec!["Title", "Overview", "1. Fix silt fence"]
        );
    }

    #[test]
    fn ignores_lines_that_only_look_like_markers() {
        let md = "# Title\n#3 priority site\n\\## escaped\n####### seven\n ## indented\n";
        assert_eq!(markdown_headings(md), vec!["Title"]);
    }

    #[test]
    fn finds_underlined_plain_text_headings() {
        let txt = "Site Plan\n=========\nGenerated: x\n\nOverview\n--------\nbody\n\n--\n";
        assert_eq!(plain_text_headings(txt), vec!["Site Plan", "Overview"]);
    }
}
