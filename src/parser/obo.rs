//! Assembling classified lines into stanzas
//!
//! A document is a header (all `key: value` lines before the first
//! stanza) followed by any number of `[Term]`, `[Typedef]` and
//! `[Instance]` stanzas.
use std::fs;
use std::path::Path;

use tracing::trace;

use crate::parser::entry::StanzaEntry;
use crate::parser::lexer::{self, Line};
use crate::parser::{parse, StanzaKind};
use crate::{OntographError, OntographResult};

/// One `[Term]`, `[Typedef]` or `[Instance]` block
#[derive(Debug, Clone)]
pub struct Stanza {
    kind: StanzaKind,
    line: usize,
    entries: Vec<StanzaEntry>,
}

impl Stanza {
    fn new(kind: StanzaKind, line: usize) -> Self {
        Stanza {
            kind,
            line,
            entries: Vec::new(),
        }
    }

    pub fn kind(&self) -> StanzaKind {
        self.kind
    }

    /// 1-based line number of the stanza header
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn entries(&self) -> &[StanzaEntry] {
        &self.entries
    }
}

/// A fully parsed stanza document
#[derive(Debug, Clone, Default)]
pub struct OboDocument {
    header: Vec<StanzaEntry>,
    stanzas: Vec<Stanza>,
}

impl OboDocument {
    /// The `key: value` entries before the first stanza
    pub fn header(&self) -> &[StanzaEntry] {
        &self.header
    }

    pub fn stanzas(&self) -> &[Stanza] {
        &self.stanzas
    }
}

/// Parses a full stanza document in one pass
///
/// # Errors
///
/// The first line that fails to lex or parse aborts the whole document:
/// [`crate::OntographError::Lex`], [`crate::OntographError::UnknownKey`],
/// [`crate::OntographError::IllegalKeyForMode`] or
/// [`crate::OntographError::ValueFormat`], each carrying the offending
/// line number.
pub fn parse_obo_document(text: &str) -> OntographResult<OboDocument> {
    let mut document = OboDocument::default();
    let mut mode = StanzaKind::Header;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        match lexer::classify(raw, line)? {
            None => {}
            Some(Line::StanzaHeader(kind)) => {
                trace!("line {}: opening [{}] stanza", line, kind);
                mode = kind;
                document.stanzas.push(Stanza::new(kind, line));
            }
            Some(Line::KeyValue { key, value }) => {
                let entry = parse::parse_entry(key, value, mode, line)?;
                match document.stanzas.last_mut() {
                    Some(stanza) => stanza.entries.push(entry),
                    None => document.header.push(entry),
                }
            }
        }
    }

    Ok(document)
}

/// Reads and parses a stanza file
///
/// The file handle is released before this function returns, on success
/// and on failure alike.
pub fn read_obo_file<P: AsRef<Path>>(filename: P) -> OntographResult<OboDocument> {
    let content = fs::read_to_string(&filename)
        .map_err(|_| OntographError::CannotOpenFile(filename.as_ref().display().to_string()))?;
    parse_obo_document(&content)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::EntryType;
    use crate::OntographError;

    #[test]
    fn header_and_stanzas_are_separated() {
        let document = parse_obo_document(
            "format-version: 1.2\n\
             data-version: releases/2017-06-05\n\
             \n\
             [Term]\n\
             id: HP:0000001\n\
             name: All\n\
             \n\
             [Typedef]\n\
             id: part_of\n\
             name: part of\n",
        )
        .unwrap();

        assert_eq!(document.header().len(), 2);
        assert_eq!(document.header()[0].entry_type(), EntryType::FormatVersion);
        assert_eq!(
            document.header()[1].value().as_str(),
            Some("releases/2017-06-05")
        );

        assert_eq!(document.stanzas().len(), 2);
        assert_eq!(document.stanzas()[0].kind(), StanzaKind::Term);
        assert_eq!(document.stanzas()[0].line(), 4);
        assert_eq!(document.stanzas()[0].entries().len(), 2);
        assert_eq!(document.stanzas()[1].kind(), StanzaKind::Typedef);
    }

    #[test]
    fn mode_switches_back_on_new_stanza() {
        // domain is only legal while the Typedef stanza is open
        let result = parse_obo_document(
            "[Typedef]\n\
             id: part_of\n\
             domain: HP:1\n\
             \n\
             [Term]\n\
             id: HP:0000001\n\
             domain: HP:1\n",
        );
        match result.unwrap_err() {
            OntographError::IllegalKeyForMode { line, key, mode } => {
                assert_eq!(line, 7);
                assert_eq!(key, "domain");
                assert_eq!(mode, StanzaKind::Term);
            }
            err => panic!("expected illegal-key error, got {:?}", err),
        }
    }

    #[test]
    fn term_keys_are_rejected_in_header() {
        let result = parse_obo_document("id: HP:0000001\n");
        assert!(matches!(
            result.unwrap_err(),
            OntographError::IllegalKeyForMode { line: 1, .. }
        ));
    }

    #[test]
    fn comment_lines_between_stanzas() {
        let document = parse_obo_document(
            "! top comment\n\
             [Term]\n\
             id: HP:0000001\n\
             ! interior comment\n\
             name: All\n",
        )
        .unwrap();
        assert_eq!(document.stanzas().len(), 1);
        assert_eq!(document.stanzas()[0].entries().len(), 2);
    }

    #[test]
    fn small_fixture_file() {
        let document = read_obo_file("tests/small.obo").unwrap();
        assert_eq!(
            document
                .header()
                .iter()
                .find(|entry| entry.entry_type() == EntryType::DataVersion)
                .and_then(|entry| entry.value().as_str()),
            Some("releases/2017-06-05")
        );
        assert_eq!(
            document
                .stanzas()
                .iter()
                .filter(|stanza| stanza.kind() == StanzaKind::Term)
                .count(),
            5
        );
        assert_eq!(
            document
                .stanzas()
                .iter()
                .filter(|stanza| stanza.kind() == StanzaKind::Typedef)
                .count(),
            1
        );
    }

    #[test]
    fn missing_file_is_reported() {
        let err = read_obo_file("tests/no_such_file.obo").unwrap_err();
        assert!(matches!(err, OntographError::CannotOpenFile(_)));
    }
}
