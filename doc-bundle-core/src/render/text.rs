//! Plain text and Markdown encoders.
//!
//! Only the encoder writes heading markers. Text taken from the source data is escaped so
//! that a line of it never reads as a heading: Markdown gets a backslash before a leading
//! `#` or a `---`/`===` rule, plain text gets a leading space before a rule line. Headings
//! and one-line fields are folded onto a single line.

use super::metrics::is_underline;
use super::outline::{category_line, Block, Outline};

pub fn to_plain_text(outline: &Outline) -> String {
    let mut out = String::new();
    underline(&mut out, &outline.title, '=');
    if let Some(subtitle) = &outline.subtitle {
        out.push_str(&one_line(subtitle));
        out.push('\n');
    }
    out.push_str(&outline.generated_line());
    out.push('\n');

    for section in &outline.sections {
        out.push('\n');
        underline(&mut out, &section.heading, '-');
        for block in &section.blocks {
            match block {
                Block::Paragraph(text) => {
                    out.push_str(&plain(text, ""));
                    out.push('\n');
                }
                Block::Ordered(items) => {
                    for (i, item) in items.iter().enumerate() {
                        out.push_str(&format!("{}. {}\n", i + 1, plain(item, "   ")));
                    }
                }
                Block::Bullets(items) => {
                    for item in items {
                        out.push_str(&format!("- {}\n", plain(item, "  ")));
                    }
                }
                Block::Recommendations(recs) => {
                    for (i, rec) in recs.iter().enumerate() {
                        out.push_str(&format!("{}. {}\n", i + 1, one_line(&rec.title)));
                        out.push_str(&format!("   {}\n", one_line(&category_line(rec))));
                        out.push_str(&format!("   {}\n", plain(&rec.description, "   ")));
                        if let Some(citation) = &rec.citation {
                            out.push_str(&format!("   Citation: {}\n", one_line(citation)));
                        }
                    }
                }
            }
        }
    }
    out
}

fn underline(out: &mut String, heading: &str, marker: char) {
    let heading = one_line(heading);
    out.push_str(&heading);
    out.push('\n');
    let width = heading.chars().count().max(3);
    out.extend(std::iter::repeat(marker).take(width));
    out.push('\n');
}

pub fn to_markdown(outline: &Outline) -> String {
    let mut out = format!("# {}\n\n", one_line(&outline.title));
    if let Some(subtitle) = &outline.subtitle {
        out.push_str(&format!("_{}_\n\n", one_line(subtitle)));
    }
    out.push_str(&outline.generated_line());
    out.push('\n');

    for section in &outline.sections {
        out.push_str(&format!("\n## {}\n", one_line(&section.heading)));
        for block in &section.blocks {
            out.push('\n');
            match block {
                Block::Paragraph(text) => {
                    out.push_str(&markdown(text, ""));
                    out.push('\n');
                }
                Block::Ordered(items) => {
                    for (i, item) in items.iter().enumerate() {
                        out.push_str(&format!("{}. {}\n", i + 1, markdown(item, "   ")));
                    }
                }
                Block::Bullets(items) => {
                    for item in items {
                        out.push_str(&format!("- {}\n", markdown(item, "  ")));
                    }
                }
                Block::Recommendations(recs) => {
                    for (i, rec) in recs.iter().enumerate() {
                        if i > 0 {
                            out.push_str("\n---\n\n");
                        }
                        out.push_str(&format!("### {}. {}\n\n", i + 1, one_line(&rec.title)));
                        out.push_str(&format!("**{}**\n\n", one_line(&category_line(rec))));
                        out.push_str(&markdown(&rec.description, ""));
                        out.push('\n');
                        if let Some(citation) = &rec.citation {
                            out.push_str(&format!("\n> Citation: {}\n", one_line(citation)));
                        }
                    }
                }
            }
        }
    }
    out
}

/// Folds a multi-line value onto one line.
fn one_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Source text for a plain text body. Continuation lines get `indent`.
fn plain(text: &str, indent: &str) -> String {
    join_lines(text, indent, |line| {
        if is_underline(line) {
            format!(" {line}")
        } else {
            line.to_string()
        }
    })
}

/// Source text for a Markdown body. Continuation lines get `indent`.
fn markdown(text: &str, indent: &str) -> String {
    join_lines(text, indent, |line| {
        let body = line.trim_start();
        let lead = &line[..line.len() - body.len()];
        if body.starts_with('#') || is_underline(body) {
            format!("{lead}\\{body}")
        } else {
            line.to_string()
        }
    })
}

fn join_lines(text: &str, indent: &str, escape: impl Fn(&str) -> String) -> String {
    text.lines()
        .enumerate()
        .map(|(i, line)| {
            let escaped = escape(line);
            if i == 0 {
                escaped
            } else {
                format!("{indent}{escaped}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::{markdown, one_line, plain};

    #[test]
    fn markdown_escapes_heading_and_rule_lines() {
        assert_eq!(
            markdown("#3 priority site\n  ## not a section\n---\nplain", ""),
            "\\#3 priority site\n  \\## not a section\n\\---\nplain"
        );
    }

    #[test]
    fn plain_text_breaks_rule_lines() {
        assert_eq!(plain("Intro\n=====\nmore", ""), "Intro\n =====\nmore");
        assert_eq!(plain("a\n---", "   "), "a\n    ---");
    }

    #[test]
    fn one_line_folds_line_breaks() {
        assert_eq!(one_line("Shore\n  trenches \n"), "Shore trenches");
    }
}
