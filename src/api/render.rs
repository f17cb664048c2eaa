//! HTML page rendering.
//!
//! The page template is loaded once at startup. It contains exactly one
//! repeated section:
//!
//! ```text
//! {{#items}} ... {{id}} ... {{description}} ... {{/items}}
//! ```
//!
//! The section is emitted once per item with both placeholders HTML-escaped.
//! Everything outside the section is emitted verbatim.

use std::path::Path;

use thiserror::Error;

use crate::domain::Item;

const SECTION_OPEN: &str = "{{#items}}";
const SECTION_CLOSE: &str = "{{/items}}";
const ID_PLACEHOLDER: &str = "{{id}}";
const DESCRIPTION_PLACEHOLDER: &str = "{{description}}";

/// Template compiled into the binary, used when no template path is configured.
pub const DEFAULT_TEMPLATE: &str = include_str!("../../templates/index.html");

/// Errors raised while loading a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template file could not be read.
    #[error("Failed to read template {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The template lacks a well-formed `{{#items}}` section.
    #[error("Template is missing the {{{{#items}}}} ... {{{{/items}}}} section")]
    MissingSection,
}

/// One piece of the repeated section.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Id,
    Description,
}

/// A parsed page template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlTemplate {
    header: String,
    item: Vec<Segment>,
    footer: String,
}

impl HtmlTemplate {
    /// Parses a template from source text.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::MissingSection` if the section markers are
    /// absent or out of order.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let open = source
            .find(SECTION_OPEN)
            .ok_or(TemplateError::MissingSection)?;
        let body_start = open + SECTION_OPEN.len();
        let close = source[body_start..]
            .find(SECTION_CLOSE)
            .map(|offset| body_start + offset)
            .ok_or(TemplateError::MissingSection)?;

        Ok(Self {
            header: source[..open].to_string(),
            item: parse_segments(&source[body_start..close]),
            footer: source[close + SECTION_CLOSE.len()..].to_string(),
        })
    }

    /// Reads and parses a template file.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::Io` if the file cannot be read, or
    /// `TemplateError::MissingSection` if it is malformed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&source)
    }

    /// Renders the page for `items`.
    #[must_use]
    pub fn render(&self, items: &[Item]) -> String {
        let mut page = String::with_capacity(self.header.len() + self.footer.len() + items.len() * 64);
        page.push_str(&self.header);
        for item in items {
            for segment in &self.item {
                match segment {
                    Segment::Text(text) => page.push_str(text),
                    Segment::Id => page.push_str(&item.id.to_string()),
                    Segment::Description => push_escaped(&mut page, item.description.as_str()),
                }
            }
        }
        page.push_str(&self.footer);
        page
    }
}

impl Default for HtmlTemplate {
    fn default() -> Self {
        Self::parse(DEFAULT_TEMPLATE).unwrap_or_else(|_| Self {
            header: String::new(),
            item: vec![Segment::Description],
            footer: String::new(),
        })
    }
}

fn parse_segments(mut body: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    loop {
        let next = [
            (body.find(ID_PLACEHOLDER), ID_PLACEHOLDER, Segment::Id),
            (
                body.find(DESCRIPTION_PLACEHOLDER),
                DESCRIPTION_PLACEHOLDER,
                Segment::Description,
            ),
        ]
        .into_iter()
        .filter_map(|(position, marker, segment)| position.map(|at| (at, marker, segment)))
        .min_by_key(|(position, _, _)| *position);

        let Some((position, marker, segment)) = next else {
            if !body.is_empty() {
                segments.push(Segment::Text(body.to_string()));
            }
            return segments;
        };
        if position > 0 {
            segments.push(Segment::Text(body[..position].to_string()));
        }
        segments.push(segment);
        body = &body[position + marker.len()..];
    }
}

fn push_escaped(output: &mut String, text: &str) {
    for character in text.chars() {
        match character {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#39;"),
            other => output.push(other),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Description, ItemId};
    use rstest::rstest;

    fn item(id: i64, text: &str) -> Item {
        Item::new(ItemId::new(id), Description::parse(text).unwrap())
    }

    #[rstest]
    fn test_default_template_parses() {
        assert!(HtmlTemplate::parse(DEFAULT_TEMPLATE).is_ok());
    }

    #[rstest]
    fn test_render_repeats_section() {
        let template = HtmlTemplate::parse("<ul>{{#items}}<li>{{id}}:{{description}}</li>{{/items}}</ul>").unwrap();
        let page = template.render(&[item(0, "a"), item(1, "b")]);
        assert_eq!(page, "<ul><li>0:a</li><li>1:b</li></ul>");
    }

    #[rstest]
    fn test_render_empty_list() {
        let template = HtmlTemplate::parse("<ul>{{#items}}<li>{{description}}</li>{{/items}}</ul>").unwrap();
        assert_eq!(template.render(&[]), "<ul></ul>");
    }

    #[rstest]
    fn test_render_escapes_description() {
        let template = HtmlTemplate::parse("{{#items}}{{description}}{{/items}}").unwrap();
        let page = template.render(&[item(0, "<script>alert('x') & \"y\"</script>")]);
        assert_eq!(
            page,
            "&lt;script&gt;alert(&#39;x&#39;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
    }

    #[rstest]
    fn test_render_large_and_negative_ids() {
        let template = HtmlTemplate::parse("{{#items}}<{{id}}>{{/items}}").unwrap();
        let page = template.render(&[item(i64::MAX, "x"), item(-3, "y")]);
        assert_eq!(page, format!("<{}><-3>", i64::MAX));
    }

    #[rstest]
    fn test_default_renders_compiled_template() {
        let page = HtmlTemplate::default().render(&[item(7, "first todo.")]);
        assert!(page.contains("first todo."));
        assert!(page.contains(r#"value="7""#));
    }

    #[rstest]
    fn test_render_placeholder_used_twice() {
        let template =
            HtmlTemplate::parse("{{#items}}[{{id}}|{{id}}|{{description}}]{{/items}}").unwrap();
        assert_eq!(template.render(&[item(4, "x")]), "[4|4|x]");
    }

    #[rstest]
    #[case("<ul></ul>")]
    #[case("{{#items}}<li></li>")]
    #[case("{{/items}}{{#items}}")]
    fn test_parse_rejects_missing_section(#[case] source: &str) {
        assert!(matches!(
            HtmlTemplate::parse(source),
            Err(TemplateError::MissingSection)
        ));
    }

    #[rstest]
    fn test_from_file_missing() {
        let directory = tempfile::tempdir().unwrap();
        let result = HtmlTemplate::from_file(directory.path().join("absent.html"));
        assert!(matches!(result, Err(TemplateError::Io { .. })));
    }

    #[rstest]
    fn test_from_file_reads_template() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("index.html");
        std::fs::write(&path, "<p>{{#items}}{{description}};{{/items}}</p>").unwrap();

        let template = HtmlTemplate::from_file(&path).unwrap();

        assert_eq!(template.render(&[item(1, "x")]), "<p>x;</p>");
    }

    #[rstest]
    fn test_template_error_display() {
        let message = TemplateError::MissingSection.to_string();
        assert!(message.contains("{{#items}}"));
    }
}
