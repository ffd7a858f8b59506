//! Template syntax tokens.
//!
//! [`SyntaxConfig`] holds the token strings, [`Syntax`] is the validated,
//! compiled form the parser works with. The defaults are:
//!
//! | Construct | Syntax |
//! |-----------|--------|
//! | Variable | `~%[esc:]name%` |
//! | Inline template | `~%%begin:name% ... ~%%end:name%` |
//! | Included template | `~%%include:[name:]path%` |
//! | Ditch block | `<!--%%--> ... <!--%%-->` |
//! | Hiding comment | `<!-- ... -->` around any tag |

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Keyword opening an inline template.
pub const BEGIN_KEYWORD: &str = "begin";
/// Keyword closing an inline template.
pub const END_KEYWORD: &str = "end";
/// Keyword including another template.
pub const INCLUDE_KEYWORD: &str = "include";

/// Token strings of the template syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyntaxConfig {
    /// Opens a variable.
    pub var_start: String,
    /// Closes a variable.
    pub var_end: String,
    /// Opens a `begin`, `end` or `include` tag.
    pub tag_start: String,
    /// Closes a `begin`, `end` or `include` tag.
    pub tag_end: String,
    /// Delimits ditch blocks, which are removed before parsing.
    pub ditch: String,
    /// Opens a comment that hides a tag.
    pub comment_start: String,
    /// Closes a comment that hides a tag.
    pub comment_end: String,
}

impl Default for SyntaxConfig {
    fn default() -> Self {
        Self {
            var_start: "~%".into(),
            var_end: "%".into(),
            tag_start: "~%%".into(),
            tag_end: "%".into(),
            ditch: "<!--%%-->".into(),
            comment_start: "<!--".into(),
            comment_end: "-->".into(),
        }
    }
}

impl SyntaxConfig {
    /// Checks that every token is usable and that openers cannot be confused.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tokens: [(&'static str, &str); 7] = [
            ("var_start", &self.var_start),
            ("var_end", &self.var_end),
            ("tag_start", &self.tag_start),
            ("tag_end", &self.tag_end),
            ("ditch", &self.ditch),
            ("comment_start", &self.comment_start),
            ("comment_end", &self.comment_end),
        ];

        for (name, token) in tokens {
            if token.is_empty() {
                return Err(ConfigError::InvalidToken {
                    name,
                    reason: "token is empty".into(),
                });
            }
            if token.contains(['\r', '\n']) {
                return Err(ConfigError::InvalidToken {
                    name,
                    reason: "token contains a line break".into(),
                });
            }
        }

        // Openers and delimiters must be pairwise distinct; the closing tokens
        // of variables and tags may share a value.
        let distinct = [tokens[0], tokens[2], tokens[4], tokens[5], tokens[6]];
        for (i, &(first, a)) in distinct.iter().enumerate() {
            for &(second, b) in &distinct[i + 1..] {
                if a == b {
                    return Err(ConfigError::TokenClash { first, second });
                }
            }
        }

        // A ditch token containing an opener would be half-recognised as a tag.
        for (name, opener) in [tokens[0], tokens[2]] {
            if self.ditch.contains(opener) {
                return Err(ConfigError::TokenClash {
                    first: "ditch",
                    second: name,
                });
            }
        }

        Ok(())
    }
}

/// Validated syntax with its compiled scanner.
#[derive(Debug, Clone)]
pub struct Syntax {
    config: SyntaxConfig,
    scanner: Regex,
}

static STANDARD: Lazy<Syntax> = Lazy::new(|| {
    // The default tokens are covered by tests; compiling them cannot fail.
    Syntax::new(SyntaxConfig::default()).expect("default syntax is valid")
});

impl Syntax {
    /// Validates the tokens and compiles the scanner.
    pub fn new(config: SyntaxConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let scanner = Regex::new(&scanner_pattern(&config))?;
        Ok(Self { config, scanner })
    }

    /// The default syntax.
    pub fn standard() -> Self {
        STANDARD.clone()
    }

    /// The token strings.
    pub fn config(&self) -> &SyntaxConfig {
        &self.config
    }

    /// Regex matching one tag, one stray tag opener, or one variable.
    ///
    /// Groups: `tag` with `keyword` and `arg`; `junk`; `var` with `body`.
    pub(crate) fn scanner(&self) -> &Regex {
        &self.scanner
    }
}

impl Default for Syntax {
    fn default() -> Self {
        Self::standard()
    }
}

fn scanner_pattern(config: &SyntaxConfig) -> String {
    let tag_start = regex::escape(&config.tag_start);
    let tag_end = regex::escape(&config.tag_end);
    let var_start = regex::escape(&config.var_start);
    let var_end = regex::escape(&config.var_end);

    let tag = format!(
        r"(?P<tag>{}(?P<keyword>[A-Za-z_]+):(?P<arg>[^\r\n]*?){})",
        tag_start, tag_end
    );
    let junk = format!(r"(?P<junk>{})", tag_start);
    let var = format!(r"(?P<var>{}(?P<body>[^\r\n]*?){})", var_start, var_end);

    // Alternation is leftmost-first: the longer of two nested openers must be
    // tried first, or `~%%` would scan as a variable with an empty name.
    if config.var_start.starts_with(&config.tag_start) {
        format!("{}|{}|{}", tag, var, junk)
    } else {
        format!("{}|{}|{}", tag, junk, var)
    }
}
