//! Best-effort guess at what kind of file a decoded payload is
//!
//! Rules run in a fixed order and the first match wins. The result is advisory
//! and will misclassify plenty of inputs.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeLabel {
    HtmlXml,
    Json,
    Zip,
    Python,
    Bash,
    Ruby,
    PlainText,
    Binary,
}

impl TypeLabel {
    pub fn name(self) -> &'static str {
        match self {
            TypeLabel::HtmlXml => "HTML/XML",
            TypeLabel::Json => "JSON",
            TypeLabel::Zip => "ZIP",
            TypeLabel::Python => "Python",
            TypeLabel::Bash => "Bash script",
            TypeLabel::Ruby => "Ruby",
            TypeLabel::PlainText => "plain text",
            TypeLabel::Binary => "binary/unknown",
        }
    }

    /// Suggested file extension(s) for saving the payload
    pub fn extension(self) -> Option<&'static str> {
        match self {
            TypeLabel::HtmlXml => Some(".html or .xml"),
            TypeLabel::Json => Some(".json"),
            TypeLabel::Zip => Some(".zip"),
            TypeLabel::Python => Some(".py"),
            TypeLabel::Bash => Some(".sh"),
            TypeLabel::Ruby => Some(".rb"),
            TypeLabel::PlainText => Some(".txt"),
            TypeLabel::Binary => None,
        }
    }
}

impl fmt::Display for TypeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.extension() {
            Some(ext) => write!(f, "{} ({})", self.name(), ext),
            None => f.write_str(self.name()),
        }
    }
}

/// Classify decoded text
///
/// The Ruby rule shares its `def ` trigger with the Python rule checked before
/// it, so only `class ` can still select Ruby.
pub fn guess_type(text: &str) -> TypeLabel {
    let lower = text.to_lowercase();

    if lower.contains("<html>") || lower.contains("<!doctype html>") || lower.contains("<body>") {
        TypeLabel::HtmlXml
    } else if text.starts_with('{') || text.starts_with('[') {
        TypeLabel::Json
    } else if text.starts_with("PK") {
        TypeLabel::Zip
    } else if text.contains("def ") || text.contains("import ") {
        TypeLabel::Python
    } else if text.starts_with("#!/bin/bash") {
        TypeLabel::Bash
    } else if text.contains("def ") || text.contains("class ") {
        TypeLabel::Ruby
    } else {
        TypeLabel::PlainText
    }
}

/// Classify raw decoded bytes; anything that is not valid UTF-8 is binary
pub fn guess_type_bytes(data: &[u8]) -> TypeLabel {
    match std::str::from_utf8(data) {
        Ok(text) => guess_type(text),
        Err(_) => TypeLabel::Binary,
    }
}
