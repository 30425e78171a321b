//! Per-line entry parsing
//!
//! A body line has the shape
//!
//! ```text
//! key: value [ {modkey=modval, modkey2=modval2} ] [ ! comment text ]
//! ```
//!
//! The value payload is parsed first with the grammar of its key, so a
//! `!` or `{` inside a quoted payload never terminates the value.
use crate::parser::entry::{EntryType, EntryValue, StanzaEntry, TrailingModifier};
use crate::parser::StanzaKind;
use crate::term::{SubsetDef, Synonym, SynonymScope, SynonymTypeDef, Xref};
use crate::TermId;
use crate::{OntographError, OntographResult};

/// Parses the value side of one `key: value` line into a [`StanzaEntry`]
///
/// `mode` is the stanza kind the line appears in; keys unknown to the
/// registry or illegal in that kind fail before any value parsing.
pub(crate) fn parse_entry(
    key: &str,
    raw: &str,
    mode: StanzaKind,
    line: usize,
) -> OntographResult<StanzaEntry> {
    let Some(entry_type) = EntryType::from_key(key) else {
        return Err(OntographError::UnknownKey {
            line,
            key: key.to_string(),
            mode,
        });
    };
    if !entry_type.allowed_in(mode) {
        return Err(OntographError::IllegalKeyForMode {
            line,
            key: key.to_string(),
            mode,
        });
    }

    let ctx = Context {
        line,
        key: entry_type.key(),
    };
    let (value, rest) = parse_value(entry_type, raw, &ctx)?;
    let (modifiers, rest) = parse_modifiers(rest, &ctx)?;
    let (comment, rest) = parse_comment(rest);

    let rest = rest.trim();
    if !rest.is_empty() {
        return Err(ctx.error(format!("unexpected trailing input `{}`", rest)));
    }

    Ok(StanzaEntry::new(entry_type, value, modifiers, comment))
}

struct Context<'a> {
    line: usize,
    key: &'a str,
}

impl Context<'_> {
    fn error(&self, reason: impl Into<String>) -> OntographError {
        OntographError::ValueFormat {
            line: self.line,
            key: self.key.to_string(),
            reason: reason.into(),
        }
    }
}

fn parse_value<'a>(
    entry_type: EntryType,
    raw: &'a str,
    ctx: &Context,
) -> OntographResult<(EntryValue, &'a str)> {
    match entry_type {
        EntryType::IsAnonymous
        | EntryType::IsObsolete
        | EntryType::IsCyclic
        | EntryType::IsReflexive
        | EntryType::IsSymmetric
        | EntryType::IsAntisymmetric
        | EntryType::IsTransitive
        | EntryType::IsMetadataTag => {
            let (word, rest) = take_word(raw);
            let value = match word {
                "true" => true,
                "false" => false,
                other => {
                    return Err(ctx.error(format!("expected `true` or `false`, found `{}`", other)))
                }
            };
            Ok((EntryValue::Bool(value), rest))
        }
        EntryType::IsA
        | EntryType::AltId
        | EntryType::ReplacedBy
        | EntryType::Consider
        | EntryType::Domain
        | EntryType::Range
        | EntryType::UnionOf
        | EntryType::IntersectionOf
        | EntryType::DisjointFrom
        | EntryType::InstanceOf => {
            let (id, rest) = take_id(raw, ctx)?;
            Ok((EntryValue::Id(id), rest))
        }
        // inverse_of and transitive_over name another typedef, which may
        // be a bare word like `part_of`
        EntryType::InverseOf | EntryType::TransitiveOver => {
            let (word, rest) = take_word_required(raw, ctx, "relation name")?;
            Ok((EntryValue::Str(word.to_string()), rest))
        }
        EntryType::Def => {
            let (text, rest) = take_quoted(raw, ctx)?;
            let rest = skip_xref_list(rest, ctx)?;
            Ok((EntryValue::Str(text), rest))
        }
        EntryType::Synonym => {
            let (synonym, rest) = parse_synonym(raw, ctx)?;
            Ok((EntryValue::Synonym(synonym), rest))
        }
        EntryType::Synonymtypedef => {
            let (def, rest) = parse_synonymtypedef(raw, ctx)?;
            Ok((EntryValue::SynonymTypeDef(def), rest))
        }
        EntryType::Subsetdef => {
            let (name, rest) = take_word_required(raw, ctx, "subset name")?;
            let (description, rest) = take_quoted(rest, ctx)?;
            Ok((
                EntryValue::SubsetDef(SubsetDef::new(name.to_string(), description)),
                rest,
            ))
        }
        EntryType::Xref => {
            let (target, rest) = take_word_required(raw, ctx, "xref target")?;
            let rest_trimmed = rest.trim_start();
            if rest_trimmed.starts_with('"') {
                let (description, rest) = take_quoted(rest_trimmed, ctx)?;
                Ok((
                    EntryValue::Xref(Xref::new(target.to_string(), Some(description))),
                    rest,
                ))
            } else {
                Ok((EntryValue::Xref(Xref::new(target.to_string(), None)), rest))
            }
        }
        EntryType::Relationship => {
            let (relation, rest) = take_word_required(raw, ctx, "relation name")?;
            let (target, rest) = take_id(rest, ctx)?;
            Ok((
                EntryValue::Relationship {
                    relation: relation.to_string(),
                    target,
                },
                rest,
            ))
        }
        // everything else is free text running to the modifier block,
        // comment or end of line
        _ => {
            let (text, rest) = take_free_text(raw);
            Ok((EntryValue::Str(text.to_string()), rest))
        }
    }
}

/// `synonym: "text" SCOPE [synonym_type] [xref, ...]`
fn parse_synonym<'a>(raw: &'a str, ctx: &Context) -> OntographResult<(Synonym, &'a str)> {
    let (text, rest) = take_quoted(raw, ctx)?;
    let (scope_word, rest) = take_word(rest);
    let Some(scope) = SynonymScope::from_token(scope_word) else {
        return Err(ctx.error(format!(
            "expected synonym scope (EXACT, BROAD, NARROW or RELATED), found `{}`",
            scope_word
        )));
    };

    // an optional synonym type name may precede the xref list
    let mut synonym_type = None;
    let mut rest = rest;
    let peek = rest.trim_start();
    if !peek.is_empty() && !peek.starts_with(['[', '{', '!']) {
        let (word, after) = take_word(rest);
        synonym_type = Some(word.to_string());
        rest = after;
    }
    let rest = skip_xref_list(rest, ctx)?;

    Ok((Synonym::new(text, scope, synonym_type), rest))
}

/// `synonymtypedef: NAME "description" [SCOPE]`
fn parse_synonymtypedef<'a>(
    raw: &'a str,
    ctx: &Context,
) -> OntographResult<(SynonymTypeDef, &'a str)> {
    let (name, rest) = take_word_required(raw, ctx, "synonym type name")?;
    let (description, rest) = take_quoted(rest, ctx)?;

    let peek = rest.trim_start();
    if peek.is_empty() || peek.starts_with(['{', '!']) {
        return Ok((
            SynonymTypeDef::new(name.to_string(), description, None),
            rest,
        ));
    }
    let (scope_word, rest) = take_word(rest);
    let Some(scope) = SynonymScope::from_token(scope_word) else {
        return Err(ctx.error(format!(
            "expected synonym scope, found `{}`",
            scope_word
        )));
    };
    Ok((
        SynonymTypeDef::new(name.to_string(), description, Some(scope)),
        rest,
    ))
}

/// Consumes a leading `[xref, ...]` list, which this crate accepts but
/// does not retain
fn skip_xref_list<'a>(raw: &'a str, ctx: &Context) -> OntographResult<&'a str> {
    let trimmed = raw.trim_start();
    let Some(inner) = trimmed.strip_prefix('[') else {
        return Ok(raw);
    };
    match inner.find(']') {
        Some(end) => Ok(&inner[end + 1..]),
        None => Err(ctx.error("unterminated `[` cross-reference list")),
    }
}

/// `{key=value, key2=value2}`; order and duplicate keys are preserved
fn parse_modifiers<'a>(
    raw: &'a str,
    ctx: &Context,
) -> OntographResult<(Option<TrailingModifier>, &'a str)> {
    let trimmed = raw.trim_start();
    let Some(mut rest) = trimmed.strip_prefix('{') else {
        return Ok((None, raw));
    };

    let mut modifier = TrailingModifier::new();
    loop {
        let Some(eq) = rest.find('=') else {
            return Err(ctx.error("expected `key=value` inside trailing modifier block"));
        };
        let key = rest[..eq].trim();
        if key.is_empty() {
            return Err(ctx.error("empty key inside trailing modifier block"));
        }
        rest = &rest[eq + 1..];

        let after = rest.trim_start();
        let (value, after_value) = if after.starts_with('"') {
            let (value, after_value) = take_quoted(after, ctx)?;
            (value, after_value)
        } else {
            match after.find([',', '}']) {
                Some(end) => (after[..end].trim().to_string(), &after[end..]),
                None => return Err(ctx.error("unterminated trailing modifier block")),
            }
        };
        modifier.push(key.to_string(), value);

        let after_value = after_value.trim_start();
        if let Some(next) = after_value.strip_prefix(',') {
            rest = next;
        } else if let Some(next) = after_value.strip_prefix('}') {
            return Ok((Some(modifier), next));
        } else {
            return Err(ctx.error("expected `,` or `}` inside trailing modifier block"));
        }
    }
}

/// `! comment text` running to the end of the line
fn parse_comment(raw: &str) -> (Option<String>, &str) {
    let trimmed = raw.trim_start();
    match trimmed.strip_prefix('!') {
        Some(comment) => (Some(comment.trim().to_string()), ""),
        None => (None, raw),
    }
}

/// Text running up to an unescaped `{` or `!`, trimmed
fn take_free_text(raw: &str) -> (&str, &str) {
    let mut escaped = false;
    for (idx, c) in raw.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' | '!' => return (raw[..idx].trim(), &raw[idx..]),
            _ => {}
        }
    }
    (raw.trim(), "")
}

/// A single whitespace-delimited token
fn take_word(raw: &str) -> (&str, &str) {
    let trimmed = raw.trim_start();
    let end = trimmed
        .find(|c: char| c.is_whitespace() || c == '{' || c == '!')
        .unwrap_or(trimmed.len());
    (&trimmed[..end], &trimmed[end..])
}

fn take_word_required<'a>(
    raw: &'a str,
    ctx: &Context,
    what: &str,
) -> OntographResult<(&'a str, &'a str)> {
    let (word, rest) = take_word(raw);
    if word.is_empty() {
        return Err(ctx.error(format!("expected {}", what)));
    }
    Ok((word, rest))
}

fn take_id<'a>(raw: &'a str, ctx: &Context) -> OntographResult<(TermId, &'a str)> {
    let (word, rest) = take_word_required(raw, ctx, "identifier")?;
    match TermId::try_from(word) {
        Ok(id) => Ok((id, rest)),
        Err(_) => Err(ctx.error(format!("`{}` is not a PREFIX:code identifier", word))),
    }
}

/// A double-quoted string with `\"` escapes; returns the unquoted content
fn take_quoted<'a>(raw: &'a str, ctx: &Context) -> OntographResult<(String, &'a str)> {
    let trimmed = raw.trim_start();
    let Some(inner) = trimmed.strip_prefix('"') else {
        return Err(ctx.error("expected quoted string"));
    };

    let mut content = String::new();
    let mut escaped = false;
    for (idx, c) in inner.char_indices() {
        if escaped {
            content.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => return Ok((content, &inner[idx + 1..])),
            _ => content.push(c),
        }
    }
    Err(ctx.error("unterminated quoted string"))
}
