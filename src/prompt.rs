//! The instruction template wrapped around every content brief.

/// Placeholder that marks where the brief goes.
pub const SLOT: &str = "{content_brief}";

/// Preambles the built-in template tells the model never to produce.
pub const FORBIDDEN_PREAMBLES: &[&str] = &["Here is the content you requested"];

/// A prompt template with exactly one [`SLOT`].
///
/// The text is split around the slot once, when the template is built, so
/// rendering is plain concatenation: the brief is inserted verbatim and any
/// slot-like text inside it is left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    raw: String,
    slot_at: usize,
}

impl PromptTemplate {
    /// Build a template from custom text.
    pub fn parse(text: impl Into<String>) -> Result<Self, Error> {
        let raw = text.into();
        let Some(slot_at) = raw.find(SLOT) else {
            return Err(Error::MissingSlot);
        };
        if raw[slot_at + SLOT.len()..].contains(SLOT) {
            return Err(Error::DuplicateSlot);
        }
        Ok(Self { raw, slot_at })
    }

    /// Fill the slot with `brief`.
    #[must_use]
    pub fn render(&self, brief: &str) -> String {
        let (head, tail) = self.raw.split_at(self.slot_at);
        let tail = &tail[SLOT.len()..];

        let mut prompt = String::with_capacity(head.len() + brief.len() + tail.len());
        prompt.push_str(head);
        prompt.push_str(brief);
        prompt.push_str(tail);
        prompt
    }

    /// The template text, slot included.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        let raw = include_str!("prompt.md");
        Self {
            raw: raw.to_string(),
            slot_at: raw.find(SLOT).unwrap_or(raw.len()),
        }
    }
}

/// Errors from building a template.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("prompt template has no `{{content_brief}}` slot")]
    MissingSlot,

    #[error("prompt template has more than one `{{content_brief}}` slot")]
    DuplicateSlot,
}
