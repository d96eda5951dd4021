//! Prompt templates with named fields.
//!
//! A [`PromptTemplate`] is a static text containing `{field}` placeholders.
//! [`PromptTemplate::render`] substitutes them from a field table in a
//! single left-to-right pass: substituted values are copied verbatim and
//! never re-scanned, so a product description containing `{brand}` stays
//! literal. `{{` and `}}` produce literal braces.
//!
//! # Example
//!
//! ```rust
//! use smartcart_core::prompt::PromptTemplate;
//!
//! let t = PromptTemplate::new("Name: {name} ({category})");
//! let out = t.render(&[("name", "iPhone 15"), ("category", "{brand}")]).unwrap();
//! assert_eq!(out, "Name: iPhone 15 ({brand})");
//! ```

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    #[error("prompt template references unknown field '{0}'")]
    MissingField(String),

    #[error("unterminated placeholder at byte {0}")]
    Unterminated(usize),
}

#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    text: &'static str,
}

impl PromptTemplate {
    pub const fn new(text: &'static str) -> Self {
        Self { text }
    }

    pub fn text(&self) -> &'static str {
        self.text
    }

    /// Render the template with values from `fields`.
    ///
    /// Extra fields are ignored. The first entry wins when a name repeats.
    pub fn render(&self, fields: &[(&str, &str)]) -> Result<String, PromptError> {
        let src = self.text;
        let mut out = String::with_capacity(src.len() + 64);
        let mut rest = src;

        while let Some(pos) = rest.find(['{', '}']) {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];

            if tail.starts_with("{{") {
                out.push('{');
                rest = &tail[2..];
            } else if tail.starts_with("}}") {
                out.push('}');
                rest = &tail[2..];
            } else if tail.starts_with('}') {
                out.push('}');
                rest = &tail[1..];
            } else {
                let offset = src.len() - tail.len();
                let close = tail.find('}').ok_or(PromptError::Unterminated(offset))?;
                let name = &tail[1..close];
                let value = fields
                    .iter()
                    .find(|(k, _)| *k == name)
                    .map(|(_, v)| *v)
                    .ok_or_else(|| PromptError::MissingField(name.to_string()))?;
                out.push_str(value);
                rest = &tail[close + 1..];
            }
        }
        out.push_str(rest);
        Ok(out)
    }
}
