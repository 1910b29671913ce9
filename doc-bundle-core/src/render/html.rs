use super::outline::{category_line, Block, Outline};
use quick_xml::escape::escape;

const STYLE: &str = "\
body { font-family: Helvetica, Arial, sans-serif; margin: 2.5em auto; max-width: 48em; color: #1f2933; line-height: 1.5; }
h1 { font-size: 1.8em; border-bottom: 2px solid #2f6f4e; padding-bottom: 0.2em; }
h2 { font-size: 1.3em; color: #2f6f4e; margin-top: 1.6em; }
.subtitle { font-style: italic; color: #52606d; }
.generated { font-size: 0.85em; color: #7b8794; }
.recommendation { border-left: 4px solid #2f6f4e; background: #f5f7f5; padding: 0.6em 1em; margin: 1em 0; }
.recommendation h3 { margin: 0 0 0.3em 0; font-size: 1.05em; }
.category { font-size: 0.85em; color: #52606d; }
.citation { font-size: 0.85em; font-style: italic; color: #616e7c; }
";

pub fn to_html(outline: &Outline) -> String {
    let mut out = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape(&outline.title)));
    out.push_str("<style>\n");
    out.push_str(STYLE);
    out.push_str("</style>\n</head>\n<body>\n");
    out.push_str(&format!("<h1>{}</h1>\n", escape(&outline.title)));
    if let Some(subtitle) = &outline.subtitle {
        out.push_str(&format!("<p class=\"subtitle\">{}</p>\n", escape(subtitle)));
    }
    out.push_str(&format!(
        "<p class=\"generated\">{}</p>\n",
        escape(&outline.generated_line())
    ));

    for section in &outline.sections {
        out.push_str(&format!("<h2>{}</h2>\n", escape(&section.heading)));
        for block in &section.blocks {
            match block {
                Block::Paragraph(text) => out.push_str(&format!("<p>{}</p>\n", escape(text))),
                Block::Ordered(items) => list(&mut out, "ol", items),
                Block::Bullets(items) => list(&mut out, "ul", items),
                Block::Recommendations(recs) => {
                    for (i, rec) in recs.iter().enumerate() {
                        out.push_str("<div class=\"recommendation\">\n");
                        out.push_str(&format!("<h3>{}. {}</h3>\n", i + 1, escape(&rec.title)));
                        out.push_str(&format!(
                            "<p class=\"category\">{}</p>\n",
                            escape(&category_line(rec))
                        ));
                        out.push_str(&format!("<p>{}</p>\n", escape(&rec.description)));
                        if let Some(citation) = &rec.citation {
                            out.push_str(&format!(
                                "<p class=\"citation\">Citation: {}</p>\n",
                                escape(citation)
                            ));
                        }
                        out.push_str("</div>\n");
                    }
                }
            }
        }
    }
    out.push_str("</body>\n</html>\n");
    out
}

fn list(out: &mut String, tag: &str, items: &[String]) {
    out.push_str(&format!("<{tag}>\n"));
    for item in items {
        out.push_str(&format!("<li>{}</li>\n", escape(item)));
    }
    out.push_str(&format!("</{tag}>\n"));
}
