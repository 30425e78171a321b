use std::fmt::Display;

use crate::{OntographError, OntographResult};

const EXCERPT_LEN: usize = 60;

/// The stanza a line belongs to, deciding which keys are legal
///
/// `Header` is the implicit mode before the first stanza opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StanzaKind {
    Header,
    Term,
    Typedef,
    Instance,
}

impl Display for StanzaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StanzaKind::Header => "header",
            StanzaKind::Term => "Term",
            StanzaKind::Typedef => "Typedef",
            StanzaKind::Instance => "Instance",
        };
        write!(f, "{}", name)
    }
}

/// One classified line of source text
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Line<'a> {
    StanzaHeader(StanzaKind),
    KeyValue { key: &'a str, value: &'a str },
}

/// Classifies a single raw line
///
/// Blank lines and pure `!` comment lines yield `None`. A line that is
/// neither a stanza header nor `key: value` fails with a lex error
/// carrying the 1-based line number. Classification is a pure function
/// of the line; the caller tracks the current stanza mode.
pub(crate) fn classify(raw: &str, line: usize) -> OntographResult<Option<Line<'_>>> {
    let text = raw.strip_suffix('\r').unwrap_or(raw);
    let trimmed = text.trim();

    if trimmed.is_empty() || trimmed.starts_with('!') {
        return Ok(None);
    }

    if trimmed.starts_with('[') {
        return match trimmed {
            "[Term]" => Ok(Some(Line::StanzaHeader(StanzaKind::Term))),
            "[Typedef]" => Ok(Some(Line::StanzaHeader(StanzaKind::Typedef))),
            "[Instance]" => Ok(Some(Line::StanzaHeader(StanzaKind::Instance))),
            _ => Err(lex_error(text, line)),
        };
    }

    if let Some((key, value)) = text.split_once(':') {
        let key = key.trim();
        if !key.is_empty() && !key.contains(char::is_whitespace) {
            return Ok(Some(Line::KeyValue {
                key,
                value: value.trim(),
            }));
        }
    }

    Err(lex_error(text, line))
}

fn lex_error(text: &str, line: usize) -> OntographError {
    let excerpt = if text.len() > EXCERPT_LEN {
        let mut end = EXCERPT_LEN;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    } else {
        text.to_string()
    };
    OntographError::Lex { line, excerpt }
}
