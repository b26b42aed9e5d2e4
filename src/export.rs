//! Serialize generated text into a minimal Word document.
//!
//! The package holds the three parts Word needs to open a file and nothing
//! else: content types, the package relationship, and `word/document.xml`
//! with a single paragraph.

use std::io::{Cursor, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Filename offered for every download.
pub const FILE_NAME: &str = "generated_content.docx";

pub const MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"</Types>"#,
);

const PACKAGE_RELS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"</Relationships>"#,
);

/// A file ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Build a `.docx` whose body is one paragraph containing `text`.
///
/// Output is byte-for-byte reproducible: every archive entry carries the DOS
/// epoch as its timestamp.
pub fn document(text: &str) -> Result<Download, Error> {
    let document_xml = document_xml(text)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    for (name, body) in [
        ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
        ("_rels/.rels", PACKAGE_RELS_XML.as_bytes()),
        ("word/document.xml", document_xml.as_bytes()),
    ] {
        zip.start_file(name, options)?;
        zip.write_all(body)?;
    }

    let bytes = zip.finish()?.into_inner();
    Ok(Download {
        file_name: FILE_NAME,
        mime_type: MIME_TYPE,
        bytes,
    })
}

/// Render `word/document.xml` for a single paragraph.
///
/// Tabs become `<w:tab/>`; every `\n` and every `\r` becomes a `<w:br/>`.
/// Empty text gives an empty paragraph with no run.
fn document_xml(text: &str) -> Result<String, Error> {
    if let Some((offset, ch)) = text.char_indices().find(|&(_, c)| !is_xml_char(c)) {
        return Err(Error::InvalidCharacter {
            ch: ch as u32,
            offset,
        });
    }

    let mut writer = Writer::new(Vec::new());
    put(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))),
    )?;
    put(
        &mut writer,
        Event::Start(BytesStart::new("w:document").with_attributes([("xmlns:w", WORDML_NS)])),
    )?;
    put(&mut writer, Event::Start(BytesStart::new("w:body")))?;

    if text.is_empty() {
        put(&mut writer, Event::Empty(BytesStart::new("w:p")))?;
    } else {
        put(&mut writer, Event::Start(BytesStart::new("w:p")))?;
        put(&mut writer, Event::Start(BytesStart::new("w:r")))?;
        write_run_content(&mut writer, text)?;
        put(&mut writer, Event::End(BytesEnd::new("w:r")))?;
        put(&mut writer, Event::End(BytesEnd::new("w:p")))?;
    }

    put(&mut writer, Event::End(BytesEnd::new("w:body")))?;
    put(&mut writer, Event::End(BytesEnd::new("w:document")))?;

    String::from_utf8(writer.into_inner()).map_err(|e| Error::Xml(e.to_string()))
}

fn write_run_content(writer: &mut Writer<Vec<u8>>, text: &str) -> Result<(), Error> {
    let mut pending = String::new();

    // Every `\r` and `\n` is its own break, so `\r\n` yields two
    for c in text.chars() {
        let element = match c {
            '\t' => "w:tab",
            '\n' | '\r' => "w:br",
            _ => {
                pending.push(c);
                continue;
            }
        };
        flush_text(writer, &mut pending)?;
        put(writer, Event::Empty(BytesStart::new(element)))?;
    }
    flush_text(writer, &mut pending)
}

fn flush_text(writer: &mut Writer<Vec<u8>>, pending: &mut String) -> Result<(), Error> {
    if pending.is_empty() {
        return Ok(());
    }
    let mut start = BytesStart::new("w:t");
    start.push_attribute(("xml:space", "preserve"));
    put(writer, Event::Start(start))?;
    put(writer, Event::Text(BytesText::new(pending.as_str())))?;
    put(writer, Event::End(BytesEnd::new("w:t")))?;
    pending.clear();
    Ok(())
}

fn put(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), Error> {
    writer
        .write_event(event)
        .map_err(|e| Error::Xml(e.to_string()))
}

/// Characters allowed in XML 1.0 documents.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// Errors from building a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("text contains U+{ch:04X} at byte {offset}, which Word documents cannot hold")]
    InvalidCharacter { ch: u32, offset: usize },

    #[error("failed to write document XML: {0}")]
    Xml(String),

    #[error("failed to build document archive")]
    Archive(#[from] zip::result::ZipError),

    #[error("failed to write document archive")]
    Io(#[from] std::io::Error),
}
