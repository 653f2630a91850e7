//! Text passes that remove ButterKnife syntax before code generation.

pub mod bind_call;
pub mod click_binding;
pub mod field_binding;

use regex::{Captures, Regex};
use std::ops::Range;

use crate::error::Result;
use crate::java::lexer::mask_non_code;
use crate::models::AnnotationRecord;

pub use bind_call::BindCallRemover;
pub use click_binding::ClickAnnotationStripper;
pub use field_binding::FieldBindingStripper;

/// One rewrite over a whole file.
pub trait TransformPass {
    fn name(&self) -> &'static str;

    /// Whether the record gives this pass anything to do.
    fn applies_to(&self, record: &AnnotationRecord) -> bool;

    fn apply(&self, source: &str, record: &AnnotationRecord) -> Result<String>;
}

/// The passes in the order they must run.
pub fn default_passes() -> Result<Vec<Box<dyn TransformPass>>> {
    Ok(vec![
        Box::new(FieldBindingStripper),
        Box::new(ClickAnnotationStripper::new()?),
        Box::new(BindCallRemover::new()?),
    ])
}

/// Replace every code-only match of `regex` in `source`. Matching runs over a
/// copy with comments and literals blanked, so offsets line up with `source`.
pub(crate) fn replace_in_code(
    source: &str,
    regex: &Regex,
    mut replacement: impl FnMut(&Captures<'_>) -> String,
) -> String {
    let masked = mask_non_code(source);
    let mut out = String::with_capacity(source.len());
    let mut last = 0;

    for caps in regex.captures_iter(&masked) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&source[last..whole.start()]);
        out.push_str(&replacement(&caps));
        last = whole.end();
    }
    out.push_str(&source[last..]);
    out
}

/// Remove the given (sorted, non-overlapping) byte ranges.
pub(crate) fn delete_ranges(source: &str, ranges: &[Range<usize>]) -> String {
    let mut out = String::with_capacity(source.len());
    let mut last = 0;
    for range in ranges {
        if range.start < last {
            continue;
        }
        out.push_str(&source[last..range.start]);
        last = range.end;
    }
    out.push_str(&source[last..]);
    out
}

/// Collapse runs of blank lines to one and trim blank lines at both ends,
/// keeping a final newline if the input had one.
pub(crate) fn normalize_blank_lines(source: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut previous_blank = true;

    for line in source.lines() {
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        lines.push(if blank { "" } else { line });
        previous_blank = blank;
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    let newline = if source.contains("\r\n") { "\r\n" } else { "\n" };
    let mut out = lines.join(newline);
    if source.ends_with('\n') && !out.is_empty() {
        out.push_str(newline);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_in_code_skips_strings_and_comments() {
        let re = Regex::new(r"foo").unwrap();
        let src = "foo(\"foo\"); // foo\nfoo";
        let out = replace_in_code(src, &re, |_| "bar".to_string());
        assert_eq!(out, "bar(\"foo\"); // foo\nbar");
    }

    #[test]
    fn test_delete_ranges() {
        assert_eq!(delete_ranges("abcdef", &[1..2, 4..5]), "acdf");
        assert_eq!(delete_ranges("abcdef", &[]), "abcdef");
    }

    #[test]
    fn test_normalize_blank_lines() {
        let src = "\n\npackage a;\n\n\n\nclass A {\n  \n\n}\n\n";
        assert_eq!(normalize_blank_lines(src), "package a;\n\nclass A {\n\n}\n");
    }

    #[test]
    fn test_normalize_keeps_missing_trailing_newline() {
        assert_eq!(normalize_blank_lines("a\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_default_pass_order() {
        let names: Vec<_> = default_passes()
            .unwrap()
            .iter()
            .map(|p| p.name())
            .collect();
        assert_eq!(names, vec!["field-binding", "click-binding", "bind-call"]);
    }
}
