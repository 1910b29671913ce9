//! Paginated A4 output using the PDF builtin fonts.
//!
//! Lines come from the same flattened outline as docx, so a text extractor yields the
//! same content as the other formats. Long lines are wrapped on word boundaries.
//!
//! Output is a pure function of the outline: the Info dates come from
//! `outline.generated_at` and the trailer `/ID` pair is derived from the document body.

use super::outline::{flatten, LineStyle, Outline};
use crate::error::RenderError;
use crate::model::OutputFormat;
use chrono::{DateTime, Datelike, Timelike, Utc};
use printpdf::{BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, Point, Pt, TextItem};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const BODY_SIZE_PT: f32 = 10.5;
/// Vertical space available for text, in points.
const USABLE_HEIGHT_PT: f32 = (PAGE_HEIGHT_MM - 2.0 * MARGIN_MM) * 2.834_646;
/// Length of each trailer `/ID` string printpdf writes.
const TRAILER_ID_LEN: usize = 32;

struct Styled {
    font: BuiltinFont,
    size: f32,
    wrap: usize,
}

fn styled(style: LineStyle) -> Styled {
    match style {
        LineStyle::Title => Styled { font: BuiltinFont::HelveticaBold, size: 18.0, wrap: 48 },
        LineStyle::Subtitle => Styled { font: BuiltinFont::HelveticaOblique, size: 10.0, wrap: 95 },
        LineStyle::Heading => Styled { font: BuiltinFont::HelveticaBold, size: 13.5, wrap: 68 },
        LineStyle::SubHeading => Styled { font: BuiltinFont::HelveticaBold, size: 11.5, wrap: 80 },
        LineStyle::Body | LineStyle::ListItem => Styled {
            font: BuiltinFont::Helvetica,
            size: BODY_SIZE_PT,
            wrap: 92,
        },
        LineStyle::Quote => Styled { font: BuiltinFont::HelveticaOblique, size: 9.5, wrap: 100 },
    }
}

pub fn to_pdf(outline: &Outline) -> Result<Vec<u8>, RenderError> {
    let lines = flatten(outline);
    if lines.is_empty() {
        return Err(RenderError::Format {
            format: OutputFormat::Pdf,
            message: "empty input".to_string(),
        });
    }

    let mut pages: Vec<Vec<Op>> = Vec::new();
    let mut ops = start_page();
    let mut used = 0.0_f32;

    for line in &lines {
        let style = styled(line.style);
        let leading = style.size * 1.35;
        let gap = match line.style {
            LineStyle::Heading | LineStyle::SubHeading => style.size * 0.6,
            _ => 0.0,
        };
        for chunk in wrap(&line.text, style.wrap) {
            if used + leading + gap > USABLE_HEIGHT_PT {
                ops.push(Op::EndTextSection);
                pages.push(std::mem::replace(&mut ops, start_page()));
                used = 0.0;
            }
            ops.push(Op::SetLineHeight { lh: Pt(leading + gap) });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(style.size),
                font: style.font.clone(),
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(to_win_ansi(&chunk))],
                font: style.font.clone(),
            });
            ops.push(Op::AddLineBreak);
            used += leading + gap;
        }
    }
    ops.push(Op::EndTextSection);
    pages.push(ops);

    debug!(pages = pages.len(), lines = lines.len(), "Laid out PDF pages");

    let pdf_pages: Vec<PdfPage> = pages
        .into_iter()
        .map(|ops| PdfPage::new(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), ops))
        .collect();

    let mut document = PdfDocument::new(&outline.title);
    let stamp = pdf_date(outline.generated_at);
    document.metadata.info.creation_date = stamp;
    document.metadata.info.modification_date = stamp;
    document.metadata.info.metadata_date = stamp;

    let mut warnings = Vec::new();
    let mut bytes = document
        .with_pages(pdf_pages)
        .save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        warn!(count = warnings.len(), "PDF writer reported warnings");
    }
    stamp_trailer_id(&mut bytes)?;
    Ok(bytes)
}

fn pdf_date(at: DateTime<Utc>) -> printpdf::DateTime {
    printpdf::DateTime {
        date: printpdf::Date {
            year: at.year(),
            month: at.month() as u8,
            day: at.day() as u8,
        },
        time: printpdf::Time {
            hour: at.hour() as u8,
            minute: at.minute() as u8,
            second: at.second() as u8,
            millisecond: 0,
        },
        offset: printpdf::Offset {
            hours: 0,
            minutes: 0,
            seconds: 0,
            milliseconds: 0,
        },
    }
}

/// Replaces the random trailer `/ID` pair with a SHA-256 of everything before it.
///
/// Each replacement has the same length as the original string, so the xref offsets
/// stay valid.
fn stamp_trailer_id(bytes: &mut [u8]) -> Result<(), RenderError> {
    let missing = |message: &str| RenderError::Format {
        format: OutputFormat::Pdf,
        message: message.to_string(),
    };
    let marker = find_last(bytes, b"/ID[").ok_or_else(|| missing("trailer has no /ID"))?;

    let digest = {
        let mut hasher = Sha256::new();
        hasher.update(&bytes[..marker]);
        format!("{:x}", hasher.finalize())
    };
    let halves = [
        &digest.as_bytes()[..TRAILER_ID_LEN],
        &digest.as_bytes()[TRAILER_ID_LEN..2 * TRAILER_ID_LEN],
    ];

    let mut cursor = marker + b"/ID[".len();
    for half in halves {
        let open = cursor;
        let close = open + 1 + TRAILER_ID_LEN;
        if bytes.get(open) != Some(&b'(') || bytes.get(close) != Some(&b')') {
            return Err(missing("unexpected trailer /ID layout"));
        }
        bytes[open + 1..close].copy_from_slice(half);
        cursor = close + 1;
    }
    Ok(())
}

fn find_last(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .rposition(|window| window == needle)
}

fn start_page() -> Vec<Op> {
    vec![
        Op::StartTextSection,
        Op::SetTextCursor {
            pos: Point::new(Mm(MARGIN_MM), Mm(PAGE_HEIGHT_MM - MARGIN_MM)),
        },
    ]
}

/// Greedy word wrap; a single word longer than `width` is hard-split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > width {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(width).collect();
            word = word.chars().skip(width).collect();
            out.push(head);
        }
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() || out.is_empty() {
        out.push(current);
    }
    out
}

/// Builtin fonts only cover Latin-1; anything else is replaced.
fn to_win_ansi(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            c if (c as u32) < 0x100 => c,
            _ => '?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{stamp_trailer_id, wrap};

    #[test]
    fn wraps_on_word_boundaries() {
        let lines = wrap("alpha beta gamma delta", 11);
        assert_eq!(lines, vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn splits_words_longer_than_width() {
        let lines = wrap("abcdefghij xy", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij", "xy"]);
    }

    #[test]
    fn trailer_id_is_replaced_in_place_from_the_body() {
        let body = b"%PDF-1.3\nbody\ntrailer\n<</Root 1 0 R/ID[(".to_vec();
        let mut a = body.clone();
        a.extend_from_slice(b"JCIABBBHEADIHCEBFGEIAAIHJCDBDJFC)(AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA)]>>");
        let mut b = body;
        b.extend_from_slice(b"IIDAAGCHAGFIIGEGGFHDBAJJJDBEDHGA)(BBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB)]>>");
        let len = a.len();

        stamp_trailer_id(&mut a).unwrap();
        stamp_trailer_id(&mut b).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.len(), len);
        assert!(!a.windows(4).any(|w| w == b"JCIA"));
    }

    #[test]
    fn missing_trailer_id_is_a_render_error() {
        let mut bytes = b"%PDF-1.3\ntrailer\n<</Root 1 0 R>>".to_vec();
        assert!(stamp_trailer_id(&mut bytes).is_err());
    }
}
