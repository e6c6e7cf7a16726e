//! Minimal named templates for generated Go code.
//!
//! A template is plain text with `{{slot}}` placeholders. Every slot must be
//! bound when rendering; there is no escaping, looping or conditional logic,
//! those decisions belong to the generator.

use crate::error::{GenError, GenResult};

/// A named template with `{{slot}}` placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub name: &'static str,
    pub source: &'static str,
}

/// Ordered slot bindings for one render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    values: Vec<(&'static str, String)>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `slot` to `value`, replacing an earlier binding of the same slot.
    pub fn set(mut self, slot: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.values.iter_mut().find(|(s, _)| *s == slot) {
            Some(entry) => entry.1 = value,
            None => self.values.push((slot, value)),
        }
        self
    }

    pub fn get(&self, slot: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, v)| v.as_str())
    }
}

impl Template {
    pub const fn new(name: &'static str, source: &'static str) -> Self {
        Self { name, source }
    }

    /// Substitute every `{{slot}}` with its binding.
    ///
    /// ```
    /// use sql2godb::template::{Bindings, Template};
    ///
    /// const GREETING: Template = Template::new("greeting", "hello {{who}}");
    /// let out = GREETING.render(&Bindings::new().set("who", "gopher")).unwrap();
    /// assert_eq!(out, "hello gopher");
    /// ```
    pub fn render(&self, bindings: &Bindings) -> GenResult<String> {
        let mut out = String::with_capacity(self.source.len());
        let mut rest = self.source;

        while let Some(start) = rest.find("{{") {
            let after_open = &rest[start + 2..];
            let Some(end) = after_open.find("}}") else {
                break;
            };

            let slot = &after_open[..end];
            let value = bindings.get(slot).ok_or_else(|| GenError::Template {
                template: self.name,
                slot: slot.to_string(),
            })?;

            out.push_str(&rest[..start]);
            out.push_str(value);
            rest = &after_open[end + 2..];
        }

        out.push_str(rest);
        Ok(out)
    }
}
