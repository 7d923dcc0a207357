//! Text formatting and record views.

use crate::labels::Labels;
use crate::record::{non_empty, Record};

/// Format an optional text field for display.
///
/// The text is HTML-escaped and its line breaks become `<br>`. Absent or
/// empty text yields the placeholder instead of an empty element.
pub fn format_text(text: Option<&str>, placeholder: &str) -> String {
    match text.filter(|t| !t.is_empty()) {
        Some(t) => escape_html(t).replace("\r\n", "<br>").replace('\n', "<br>"),
        None => escape_html(placeholder),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Selector entry for a record: `"<compare> <id1> <and> <id2>"`.
pub fn selector_label(record: &Record, labels: &Labels) -> String {
    let first = non_empty(&record.section_1_id).unwrap_or(&labels.default_section_1);
    let second = non_empty(&record.section_2_id).unwrap_or(&labels.default_section_2);
    format!("{} {} {} {}", labels.compare, first, labels.and, second)
}

/// One headed block of a record view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSection {
    pub heading: String,
    /// Formatted body (escaped, `<br>` line breaks).
    pub body_html: String,
    /// Raw body for terminals; `None` when the placeholder is shown.
    pub body_text: Option<String>,
    pub placeholder: String,
}

/// Display of one record: two sections, their rules, and the relation note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordView {
    pub label: String,
    pub sections: Vec<RenderedSection>,
}

impl RecordView {
    pub fn new(record: &Record, labels: &Labels) -> Self {
        let parts: [(&str, Option<&str>, &str); 5] = [
            (
                labels.heading_section_1.as_str(),
                non_empty(&record.section_1_content),
                labels.missing_section_1.as_str(),
            ),
            (
                labels.heading_section_1_rules.as_str(),
                non_empty(&record.section_1_rules),
                labels.missing_section_1_rules.as_str(),
            ),
            (
                labels.heading_section_2.as_str(),
                non_empty(&record.section_2_content),
                labels.missing_section_2.as_str(),
            ),
            (
                labels.heading_section_2_rules.as_str(),
                non_empty(&record.section_2_rules),
                labels.missing_section_2_rules.as_str(),
            ),
            (
                labels.heading_relation.as_str(),
                record.relation_note(),
                labels.missing_relation.as_str(),
            ),
        ];

        let sections = parts
            .into_iter()
            .map(|(heading, body, placeholder)| RenderedSection {
                heading: heading.to_string(),
                body_html: format_text(body, placeholder),
                body_text: body.map(String::from),
                placeholder: placeholder.to_string(),
            })
            .collect();

        Self {
            label: selector_label(record, labels),
            sections,
        }
    }

    /// Markup for the record display area.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<div class=\"section-content\">\n");
        for section in &self.sections {
            html.push_str(&format!(
                "    <h3>{}</h3>\n    <p>{}</p>\n",
                escape_html(&section.heading),
                section.body_html
            ));
        }
        html.push_str("</div>");
        html
    }

    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            out.push_str(&section.heading);
            out.push('\n');
            let body = section.body_text.as_deref().unwrap_or(&section.placeholder);
            for line in body.lines() {
                out.push_str("  ");
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_text_line_breaks() {
        assert_eq!(format_text(Some("a\nb\r\nc"), "-"), "a<br>b<br>c");
    }

    #[test]
    fn test_format_text_placeholder() {
        assert_eq!(format_text(None, "(none)"), "(none)");
        assert_eq!(format_text(Some(""), "(none)"), "(none)");
    }

    #[test]
    fn test_format_text_escapes_markup() {
        assert_eq!(
            format_text(Some("<b>x</b> & y"), "-"),
            "&lt;b&gt;x&lt;/b&gt; &amp; y"
        );
    }

    #[test]
    fn test_selector_label_default_for_missing_side() {
        let labels = Labels::persian();
        let record = Record {
            section_1_id: Some("A".into()),
            ..Record::default()
        };
        let label = selector_label(&record, &labels);
        assert_eq!(label, "مقایسه A و بخش ۲");
    }

    #[test]
    fn test_selector_label_english() {
        let record = Record {
            section_2_id: Some("7".into()),
            ..Record::default()
        };
        assert_eq!(
            selector_label(&record, &Labels::english()),
            "Compare Section 1 and 7"
        );
    }

    #[test]
    fn test_view_uses_placeholders_and_relation_note() {
        let labels = Labels::english();
        let record = Record {
            section_1_content: Some("line one\nline two".into()),
            explanation: Some("related".into()),
            ..Record::default()
        };
        let view = RecordView::new(&record, &labels);
        assert_eq!(view.sections.len(), 5);
        assert_eq!(view.sections[0].body_html, "line one<br>line two");
        assert_eq!(view.sections[1].body_html, labels.missing_section_1_rules);
        assert_eq!(view.sections[4].body_html, "related");

        let html = view.to_html();
        assert!(html.starts_with("<div class=\"section-content\">"));
        assert!(html.contains("<h3>Relation analysis</h3>"));

        let text = view.to_plain_text();
        assert!(text.contains("  line two\n"));
        assert!(text.contains(&labels.missing_section_2));
    }
}
