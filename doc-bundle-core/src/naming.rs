//! Download file names derived from document titles.

use once_cell::sync::Lazy;
use regex::Regex;

static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s]").expect("static regex compiles"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex compiles"));

const FALLBACK_NAME: &str = "document";

/// Keeps ASCII letters, digits and whitespace, then joins the remaining words with `_`.
///
/// Underscores survive the first step so that an already sanitized title maps to itself.
pub fn sanitize_title(title: &str) -> String {
    let kept = DISALLOWED.replace_all(title, "");
    let joined = WHITESPACE.replace_all(kept.trim(), "_");
    if joined.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        joined.into_owned()
    }
}

/// `"{sanitized title}.{extension}"`
pub fn file_name(title: &str, extension: &str) -> String {
    format!("{}.{extension}", sanitize_title(title))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_joins_words() {
        assert_eq!(
            sanitize_title("Site Plan - Job Safety Analysis"),
            "Site_Plan_Job_Safety_Analysis"
        );
        assert_eq!(sanitize_title("  Q3: Report (draft)  "), "Q3_Report_draft");
    }

    #[test]
    fn non_ascii_letters_are_removed() {
        assert_eq!(sanitize_title("Café Übersicht"), "Caf_bersicht");
    }

    #[test]
    fn sanitized_names_are_fixed_points() {
        let once = sanitize_title("Site Plan - SWPPP");
        assert_eq!(sanitize_title(&once), once);
    }

    #[test]
    fn empty_result_falls_back() {
        assert_eq!(sanitize_title("!!!"), "document");
        assert_eq!(file_name("", "md"), "document.md");
    }
}
