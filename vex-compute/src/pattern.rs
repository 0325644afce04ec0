//! `LIKE`/`ILIKE`/`RLIKE` matching with a process-wide compiled-pattern
//! cache.
//!
//! `LIKE` patterns are translated to anchored regexes (`%` to `.*`, `_`
//! to a single codepoint); `RLIKE` compiles the operand as-is and uses
//! search semantics, so an unanchored pattern may match anywhere in the
//! subject. Compiled regexes for literal patterns are cached by their
//! final regex text, which lets a `LIKE` and an `ILIKE` of the same
//! pattern coexist; per-row patterns read from a column compile
//! transiently and never enter the cache.

use std::borrow::Cow;
use std::sync::{Arc, OnceLock, RwLock};

use regex::Regex;
use rustc_hash::FxHashMap;
use vex_expr::PatternOp;
use vex_result::{Error, Result};
use vex_types::Value;

static REGEX_CACHE: OnceLock<RwLock<FxHashMap<String, Arc<Regex>>>> = OnceLock::new();

/// Match one subject against one pattern operand.
///
/// `NOT LIKE` is the negation of `LIKE` for non-null operands; null
/// handling happens before the kernel is reached. `cache` retains the
/// compiled regex process-wide and must only be set when the pattern is
/// the same for the whole batch.
pub fn match_pattern(op: PatternOp, subject: &Value, pattern: &Value, cache: bool) -> Result<bool> {
    let subject = sequence_text(subject)?;
    let pattern = sequence_text(pattern)?;
    match op {
        PatternOp::Like => like_match(&subject, &pattern, false, cache),
        PatternOp::NotLike => Ok(!like_match(&subject, &pattern, false, cache)?),
        PatternOp::ILike => like_match(&subject, &pattern, true, cache),
        PatternOp::RLike => {
            let regex = compile_regex(&pattern, cache)?;
            Ok(regex.is_match(&subject))
        }
    }
}

fn like_match(subject: &str, pattern: &str, case_insensitive: bool, cache: bool) -> Result<bool> {
    let regex = compile_regex(&like_to_regex(pattern, case_insensitive), cache)?;
    Ok(regex.is_match(subject))
}

/// Translate a `LIKE` pattern into anchored regex text.
pub fn like_to_regex(pattern: &str, case_insensitive: bool) -> String {
    let mut out = String::with_capacity(pattern.len() + 12);
    if case_insensitive {
        out.push_str("(?i)");
    }
    // (?s) lets both wildcards cross newlines.
    out.push_str("^(?s:");
    for ch in pattern.chars() {
        match ch {
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            _ => {
                if regex_syntax_char(ch) {
                    out.push('\\');
                }
                out.push(ch);
            }
        }
    }
    out.push_str(")$");
    out
}

fn compile_regex(pattern: &str, cache: bool) -> Result<Arc<Regex>> {
    if cache {
        return cached_regex(pattern);
    }
    Ok(Arc::new(Regex::new(pattern).map_err(Error::pattern)?))
}

/// Fetch a compiled regex from the cache, compiling on first use.
pub fn cached_regex(pattern: &str) -> Result<Arc<Regex>> {
    let cache = REGEX_CACHE.get_or_init(|| RwLock::new(FxHashMap::default()));
    if let Ok(guard) = cache.read() {
        if let Some(regex) = guard.get(pattern) {
            return Ok(Arc::clone(regex));
        }
    }
    let compiled = Arc::new(Regex::new(pattern).map_err(Error::pattern)?);
    if let Ok(mut guard) = cache.write() {
        // A racing writer may have inserted the same pattern; keep the
        // first one so callers share a single compiled instance.
        let entry = guard
            .entry(pattern.to_owned())
            .or_insert_with(|| Arc::clone(&compiled));
        return Ok(Arc::clone(entry));
    }
    Ok(compiled)
}

/// View a sequence operand as text: `Text` directly, `Binary` decoded as
/// UTF-8 with a byte-per-codepoint fallback for non-UTF-8 payloads.
fn sequence_text(value: &Value) -> Result<Cow<'_, str>> {
    match value {
        Value::Text(s) => Ok(Cow::Borrowed(s.as_str())),
        Value::Binary(bytes) => match std::str::from_utf8(bytes) {
            Ok(s) => Ok(Cow::Borrowed(s)),
            Err(_) => Ok(Cow::Owned(bytes.iter().map(|&b| b as char).collect())),
        },
        other => Err(Error::Internal(format!(
            "pattern kernel received a {} operand",
            other.kind()
        ))),
    }
}

fn regex_syntax_char(ch: char) -> bool {
    matches!(
        ch,
        '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '|' | '-'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Text(s.to_owned())
    }

    #[test]
    fn like_wildcards() {
        assert!(match_pattern(PatternOp::Like, &text("apple"), &text("a%e"), true).unwrap());
        assert!(match_pattern(PatternOp::Like, &text("apple"), &text("appl_"), true).unwrap());
        assert!(!match_pattern(PatternOp::Like, &text("apple"), &text("appl"), true).unwrap());
        // % matches the empty sequence.
        assert!(match_pattern(PatternOp::Like, &text("ab"), &text("a%b"), true).unwrap());
        assert!(match_pattern(PatternOp::Like, &text(""), &text("%"), true).unwrap());
    }

    #[test]
    fn like_is_anchored_and_case_sensitive() {
        assert!(!match_pattern(PatternOp::Like, &text("apple pie"), &text("pie"), true).unwrap());
        assert!(!match_pattern(PatternOp::Like, &text("Apple"), &text("apple"), true).unwrap());
        assert!(match_pattern(PatternOp::ILike, &text("Apple"), &text("apple"), true).unwrap());
    }

    #[test]
    fn underscore_matches_one_codepoint() {
        assert!(match_pattern(PatternOp::Like, &text("café"), &text("caf_"), true).unwrap());
        assert!(!match_pattern(PatternOp::Like, &text("café"), &text("ca_"), true).unwrap());
    }

    #[test]
    fn regex_metacharacters_in_like_are_literal() {
        assert!(match_pattern(PatternOp::Like, &text("a.b"), &text("a.b"), true).unwrap());
        assert!(!match_pattern(PatternOp::Like, &text("axb"), &text("a.b"), true).unwrap());
        assert!(match_pattern(PatternOp::Like, &text("50%"), &text("50\\%"), true).is_ok());
    }

    #[test]
    fn not_like_negates() {
        assert!(!match_pattern(PatternOp::NotLike, &text("apple"), &text("a%"), true).unwrap());
        assert!(match_pattern(PatternOp::NotLike, &text("pear"), &text("a%"), true).unwrap());
    }

    #[test]
    fn rlike_searches_instead_of_anchoring() {
        assert!(match_pattern(PatternOp::RLike, &text("apple pie"), &text("pie"), true).unwrap());
        assert!(match_pattern(PatternOp::RLike, &text("apple"), &text("^a.*e$"), true).unwrap());
        assert!(!match_pattern(PatternOp::RLike, &text("apple"), &text("^p"), true).unwrap());
    }

    #[test]
    fn invalid_regex_is_a_pattern_error() {
        let err = match_pattern(PatternOp::RLike, &text("x"), &text("(unclosed"), true).unwrap_err();
        assert!(matches!(err, Error::PatternError(_)));
    }

    #[test]
    fn binary_subjects_match_bytewise() {
        let subject = Value::Binary(b"apple".to_vec());
        assert!(match_pattern(PatternOp::Like, &subject, &text("a%e"), true).unwrap());
        let non_utf8 = Value::Binary(vec![0xFF, b'a', b'b']);
        assert!(match_pattern(PatternOp::Like, &non_utf8, &text("_ab"), true).unwrap());
    }

    #[test]
    fn cache_returns_shared_instances() {
        let a = cached_regex("^abc$").unwrap();
        let b = cached_regex("^abc$").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn uncached_patterns_stay_out_of_the_cache() {
        let pattern = text("appl_ uncached suffix");
        assert!(!match_pattern(PatternOp::Like, &text("apple"), &pattern, false).unwrap());
        let key = like_to_regex("appl_ uncached suffix", false);
        let cache = REGEX_CACHE.get_or_init(|| RwLock::new(FxHashMap::default()));
        assert!(!cache.read().unwrap().contains_key(&key));
    }
}
