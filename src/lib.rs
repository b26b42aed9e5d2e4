//! Longform: turn a content brief into long-form copy and a Word document.
//!
//! A brief goes into a fixed instruction template, the filled prompt goes to
//! Gemini, and the text that comes back can be exported as a `.docx`.
//!
//! # Architecture
//!
//! - **Prompt**: The instruction template and its single `{content_brief}` slot
//! - **Config**: API key and generation settings, resolved once at startup
//! - **Client**: The one `generateContent` call
//! - **Export**: Plain text to a one-paragraph Word document
//! - **Shell**: Session state machine and the terminal form around it

pub mod client;
pub mod config;
pub mod export;
pub mod prompt;
pub mod shell;

pub use client::{GeminiClient, TextGenerator};
pub use config::Config;
pub use export::Download;
pub use prompt::PromptTemplate;
pub use shell::{Phase, Session, Shell};
