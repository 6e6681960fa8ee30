//! Post-processing of raw model output.
//!
//! Backends sometimes echo the question back, prefix the answer with a role
//! label or open with filler. [`normalize`] runs [`PIPELINE`], an ordered list
//! of pure rewrite rules, over the raw text. A rule that does not match leaves
//! the text untouched. Order matters: later rules assume the earlier ones ran.
//!
//! Known limitation: artifacts that only become leading after a later rule ran
//! (e.g. a question stem hidden behind a filler opener) survive a single pass.
//!
//! The echoed-question and worry rules cut at the *first* `?` on the line, not
//! the last, so a reply that itself ends in a question is kept: "User: a?b? c"
//! becomes "b? c".

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::trace;

/// A named, independent rewrite step.
pub struct Rule {
    pub name: &'static str,
    rewrite: fn(&str) -> Cow<'_, str>,
}

impl Rule {
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        (self.rewrite)(text)
    }
}

pub static PIPELINE: [Rule; 11] = [
    Rule {
        name: "echoed_user_question",
        rewrite: strip_echoed_user_question,
    },
    Rule {
        name: "leading_role_label",
        rewrite: strip_leading_role_labels,
    },
    Rule {
        name: "inline_role_label",
        rewrite: strip_inline_role_labels,
    },
    Rule {
        name: "question_stem",
        rewrite: strip_question_stem,
    },
    Rule {
        name: "leading_colon",
        rewrite: strip_leading_colon,
    },
    Rule {
        name: "filler_opener",
        rewrite: strip_filler_opener,
    },
    Rule {
        name: "leading_question_mark",
        rewrite: strip_leading_question_mark,
    },
    Rule {
        name: "worry_acknowledgement",
        rewrite: strip_worry_acknowledgement,
    },
    Rule {
        name: "confidence_score",
        rewrite: strip_confidence_score,
    },
    // Dropping the worry acknowledgement can expose another opener.
    Rule {
        name: "filler_opener_again",
        rewrite: strip_filler_opener,
    },
    Rule {
        name: "trim",
        rewrite: trim,
    },
];

/// Cleans raw backend text for display. Pure and total: never fails, and an
/// empty input yields an empty output.
pub fn normalize(text: &str) -> String {
    PIPELINE.iter().fold(text.to_string(), |acc, rule| {
        let rewritten = rule.apply(&acc);
        if rewritten != acc.as_str() {
            trace!(rule = rule.name, "Normalizer rule matched");
        }
        rewritten.into_owned()
    })
}

static ECHOED_USER_QUESTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*User\b:?[^\n?]*\?\s*").expect("valid regex"));

static LEADING_ROLE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:AI|Assistant|Bot|User|Human|Q)\s*:\s*").expect("valid regex")
});

// Case-sensitive: lowercase "ai:" in prose is left alone.
static INLINE_ROLE_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\??[ \t]*\b(?:AI|User):[ \t]*").expect("valid regex"));

static QUESTION_STEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:what is|what are|what['’]s|how do i|how to|tell me about|explain)\s+")
        .expect("valid regex")
});

static LEADING_COLON: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*:\s*").expect("valid regex"));

static FILLER_OPENER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:well|so|okay|alright|now|don['’]t worry),\s+").expect("valid regex")
});

static LEADING_QUESTION_MARK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\?\s*").expect("valid regex"));

static WORRY_ACKNOWLEDGEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*I['’]m worried[^\n?]*\?\s*").expect("valid regex"));

static CONFIDENCE_SCORE: Lazy<Regex> = Lazy::new(|| {
    // A parenthesised score only loses its parentheses as a pair.
    Regex::new(
        r"(?i)\s*(?:\(\s*Confidence:\s*\d{1,3}(?:\.\d+)?\s*%\s*\)|Confidence:\s*\d{1,3}(?:\.\d+)?\s*%)",
    )
    .expect("valid regex")
});

/// "User: what is a wallet? It's ..." keeps only what follows the first `?`.
fn strip_echoed_user_question(text: &str) -> Cow<'_, str> {
    ECHOED_USER_QUESTION.replace(text, "")
}

/// Removes any number of stacked leading labels ("AI: User: ...").
fn strip_leading_role_labels(text: &str) -> Cow<'_, str> {
    let mut rest = text;
    while let Some(m) = LEADING_ROLE_LABEL.find(rest) {
        rest = &rest[m.end()..];
    }
    Cow::Borrowed(rest)
}

fn strip_inline_role_labels(text: &str) -> Cow<'_, str> {
    INLINE_ROLE_LABEL.replace_all(text, |caps: &Captures| {
        let Some(m) = caps.get(0) else {
            return "";
        };
        let before = &text[..m.start()];
        let at_edge = before.is_empty() || m.end() == text.len();
        if at_edge || before.ends_with(char::is_whitespace) {
            ""
        } else {
            // keep the surrounding words apart
            " "
        }
    })
}

fn strip_question_stem(text: &str) -> Cow<'_, str> {
    QUESTION_STEM.replace(text, "")
}

fn strip_leading_colon(text: &str) -> Cow<'_, str> {
    LEADING_COLON.replace(text, "")
}

fn strip_filler_opener(text: &str) -> Cow<'_, str> {
    FILLER_OPENER.replace(text, "")
}

fn strip_leading_question_mark(text: &str) -> Cow<'_, str> {
    LEADING_QUESTION_MARK.replace(text, "")
}

fn strip_worry_acknowledgement(text: &str) -> Cow<'_, str> {
    WORRY_ACKNOWLEDGEMENT.replace(text, "")
}

fn strip_confidence_score(text: &str) -> Cow<'_, str> {
    CONFIDENCE_SCORE.replace_all(text, "")
}

fn trim(text: &str) -> Cow<'_, str> {
    Cow::Borrowed(text.trim())
}
