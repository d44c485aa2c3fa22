// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! WordprocessingML fragments for the document export.
//!
//! The exported `.docx` is a zip container: a template skeleton
//! (`[Content_Types].xml`, `_rels`, styles) plus a generated
//! `word/document.xml` assembled from these fragments.

/// Relative path of the generated document part inside the container.
pub const MAIN_DOCUMENT_FILE: &str = "word/document.xml";

const DOCUMENT_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:w14="http://schemas.microsoft.com/office/word/2010/wordml" mc:Ignorable="w14"><w:body>"#;

const DOCUMENT_FOOTER: &str = "</w:body></w:document>";

/// A Heading1 paragraph used for contract titles.
pub fn title(text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:pStyle w:val="Heading1" /></w:pPr><w:r><w:t>{}</w:t></w:r></w:p>"#,
        xml_escape(text)
    )
}

/// A plain body paragraph.
pub fn paragraph(text: &str) -> String {
    format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", xml_escape(text))
}

pub fn document_header() -> &'static str {
    DOCUMENT_HEADER
}

pub fn document_footer() -> &'static str {
    DOCUMENT_FOOTER
}

/// Escape the five XML special characters.
pub fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Normalize extracted contract text for the document export: collapse
/// double newlines, strip the `&nbsp;` placeholder, split into paragraphs.
pub fn text_paragraphs(text: &str) -> Vec<String> {
    text.replace("\n\n", "\n")
        .replace("&nbsp;", " ")
        .split('\n')
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_escape() {
        assert_eq!(
            xml_escape(r#"royalty < 5% & "stability""#),
            "royalty &lt; 5% &amp; &quot;stability&quot;"
        );
    }

    #[test]
    fn test_title_is_heading_styled_and_escaped() {
        let xml = title("Oyu Tolgoi <draft>");
        assert!(xml.contains(r#"<w:pStyle w:val="Heading1" />"#));
        assert!(xml.contains("Oyu Tolgoi &lt;draft&gt;"));
    }

    #[test]
    fn test_text_paragraphs_collapse_and_strip() {
        let paragraphs = text_paragraphs("ARTICLE 1\n\nScope&nbsp;of work\nARTICLE 2");
        assert_eq!(paragraphs, vec!["ARTICLE 1", "Scope of work", "ARTICLE 2"]);
    }

    #[test]
    fn test_document_wrapping() {
        assert!(document_header().starts_with("<?xml"));
        assert!(document_header().ends_with("<w:body>"));
        assert_eq!(document_footer(), "</w:body></w:document>");
    }
}
