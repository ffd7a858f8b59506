//! Tokenizer for the ditch-stripped source.
//!
//! Produces one [`Token`] per tag, variable or stray tag opener, in source
//! order. Text between tokens is not represented; the parser slices it out of
//! the source by span.

use std::ops::Range;

use regex::Captures;

use crate::syntax::{Syntax, BEGIN_KEYWORD, END_KEYWORD, INCLUDE_KEYWORD};

/// What a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind<'a> {
    /// `begin:name`
    Begin(&'a str),
    /// `end:name`
    End(&'a str),
    /// `include:[name:]path`
    Include(&'a str),
    /// `[esc:]name` between the variable delimiters.
    Variable(&'a str),
    /// A well-formed tag with a keyword we do not know.
    UnknownTag(&'a str),
    /// A tag opener that does not start a well-formed tag.
    Stray,
}

/// A token and where it sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    pub kind: TokenKind<'a>,
    /// Full extent, including a hiding comment wrapper.
    pub span: Range<usize>,
    /// Start of the tag or variable itself; errors point here.
    pub at: usize,
}

/// Splits `text` into tokens.
pub(crate) fn tokenize<'a>(text: &'a str, syntax: &Syntax) -> Vec<Token<'a>> {
    let mut tokens: Vec<Token<'a>> = syntax
        .scanner()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(Token {
                kind: classify(&caps),
                span: whole.range(),
                at: whole.start(),
            })
        })
        .collect();

    let config = syntax.config();
    let mut lower = 0;
    for i in 0..tokens.len() {
        let upper = tokens.get(i + 1).map_or(text.len(), |next| next.span.start);
        let span = &tokens[i].span;
        if let Some(wrapped) = unhide(
            text,
            span.clone(),
            lower..upper,
            &config.comment_start,
            &config.comment_end,
        ) {
            tokens[i].span = wrapped;
        }
        lower = tokens[i].span.end;
    }
    tokens
}

fn classify<'a>(caps: &Captures<'a>) -> TokenKind<'a> {
    if caps.name("tag").is_some() {
        let keyword = caps.name("keyword").map_or("", |m| m.as_str());
        let arg = caps.name("arg").map_or("", |m| m.as_str());
        match keyword {
            BEGIN_KEYWORD => TokenKind::Begin(arg),
            END_KEYWORD => TokenKind::End(arg),
            INCLUDE_KEYWORD => TokenKind::Include(arg),
            other => TokenKind::UnknownTag(other),
        }
    } else if let Some(body) = caps.name("body") {
        TokenKind::Variable(body.as_str())
    } else {
        TokenKind::Stray
    }
}

/// Widens `span` over a surrounding comment wrapper, if there is one.
///
/// Only whitespace may sit between the wrapper and the token, and the
/// wrapper must stay inside `bounds`.
fn unhide(
    text: &str,
    span: Range<usize>,
    bounds: Range<usize>,
    comment_start: &str,
    comment_end: &str,
) -> Option<Range<usize>> {
    if bounds.start > span.start || span.end > bounds.end {
        return None;
    }
    let before = text[bounds.start..span.start].trim_end_matches(char::is_whitespace);
    let opened = before.strip_suffix(comment_start)?;
    let after = text[span.end..bounds.end].trim_start_matches(char::is_whitespace);
    let rest = after.strip_prefix(comment_end)?;
    Some(bounds.start + opened.len()..bounds.end - rest.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind<'_>> {
        tokenize(input, &Syntax::standard())
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn spans(input: &str) -> Vec<&str> {
        tokenize(input, &Syntax::standard())
            .into_iter()
            .map(|t| &input[t.span])
            .collect()
    }

    #[test]
    fn tokenize_plain_text() {
        assert!(kinds("no markup here").is_empty());
    }

    #[test]
    fn tokenize_mixed() {
        assert_eq!(
            kinds("~%%begin:rows%<li>~%html:title%</li>~%%end:rows%~%%include:f:foot.html%"),
            vec![
                TokenKind::Begin("rows"),
                TokenKind::Variable("html:title"),
                TokenKind::End("rows"),
                TokenKind::Include("f:foot.html"),
            ]
        );
    }

    #[test]
    fn tokenize_unknown_and_stray() {
        assert_eq!(
            kinds("~%%loop:x% ~%%oops"),
            vec![TokenKind::UnknownTag("loop"), TokenKind::Stray]
        );
    }

    #[test]
    fn adjacent_variables_stay_separate() {
        assert_eq!(
            kinds("~%var1%~%var2%"),
            vec![TokenKind::Variable("var1"), TokenKind::Variable("var2")]
        );
    }

    #[test]
    fn hidden_forms_include_wrapper() {
        assert_eq!(
            spans("a <!-- ~%name% --> b <!--~%%begin:x%--> c"),
            vec!["<!-- ~%name% -->", "<!--~%%begin:x%-->"]
        );
    }

    #[test]
    fn wrapper_may_sit_on_its_own_lines() {
        assert_eq!(
            spans("<ul>\n<!--\n~%%begin:rows%\n-->\n<li>"),
            vec!["<!--\n~%%begin:rows%\n-->"]
        );
    }

    #[test]
    fn half_wrapped_token_is_not_hidden() {
        assert_eq!(spans("<!-- ~%name% and more -->"), vec!["~%name%"]);
        assert_eq!(spans("~%name% -->"), vec!["~%name%"]);
    }

    #[test]
    fn wrapper_is_not_shared_between_tokens() {
        assert_eq!(spans("<!-- ~%a% ~%b% -->"), vec!["~%a%", "~%b%"]);
    }

    #[test]
    fn error_position_ignores_wrapper() {
        let tokens = tokenize("xx<!-- ~%%end:a% -->", &Syntax::standard());
        assert_eq!(tokens[0].span, 2..20);
        assert_eq!(tokens[0].at, 7);
    }
}
