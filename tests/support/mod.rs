//! Helpers shared by the integration tests.
#![allow(dead_code)]

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;

/// Read back the paragraph texts of a `.docx`, turning breaks into `\n` and
/// tabs into `\t`.
pub fn paragraphs(docx: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(docx)).expect("docx is a zip archive");
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .expect("document part present")
        .read_to_string(&mut xml)
        .expect("document part is UTF-8");

    let mut reader = Reader::from_str(&xml);
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;

    loop {
        match reader.read_event().expect("well-formed XML") {
            Event::Start(e) if e.name().as_ref() == b"w:p" => current = Some(String::new()),
            Event::End(e) if e.name().as_ref() == b"w:p" => paragraphs.extend(current.take()),
            Event::Empty(e) if e.name().as_ref() == b"w:p" => paragraphs.push(String::new()),
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) if e.name().as_ref() == b"w:t" => in_text = false,
            Event::Empty(e) if e.name().as_ref() == b"w:br" => push(&mut current, "\n"),
            Event::Empty(e) if e.name().as_ref() == b"w:tab" => push(&mut current, "\t"),
            Event::Text(t) if in_text => push(&mut current, &t.unescape().expect("valid escapes")),
            Event::Eof => break,
            _ => {}
        }
    }
    paragraphs
}

/// Names of all entries in the archive.
pub fn entries(docx: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(docx)).expect("docx is a zip archive");
    archive.file_names().map(str::to_string).collect()
}

fn push(current: &mut Option<String>, s: &str) {
    if let Some(p) = current.as_mut() {
        p.push_str(s);
    }
}
