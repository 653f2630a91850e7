use regex::Regex;
use std::ops::Range;
use tracing::debug;

use super::{TransformPass, delete_ranges, normalize_blank_lines, replace_in_code};
use crate::error::Result;
use crate::java::lexer::{find_matching_paren, mask_non_code};
use crate::java::structure::{line_end, line_start, statement_end};
use crate::models::AnnotationRecord;

/// Deletes `ButterKnife.bind(...)` calls, `Unbinder` bookkeeping and the
/// library imports, then tidies blank lines.
pub struct BindCallRemover {
    bind_call: Regex,
    unbinder_field: Regex,
    imports: Regex,
}

impl BindCallRemover {
    pub fn new() -> Result<Self> {
        Ok(Self {
            bind_call: Regex::new(r"\bButterKnife\s*\.\s*bind\s*\(")?,
            unbinder_field: Regex::new(
                r"(?m)^[ \t]*(?:(?:private|public|protected|static|final)\s+)*(?:butterknife\.)?Unbinder\s+(\w+)\s*(?:=[^;]*)?;[ \t]*\r?\n?",
            )?,
            imports: Regex::new(
                r"(?m)^[ \t]*import\s+(?:static\s+)?butterknife\.[\w.*]+\s*;[ \t]*\r?\n?",
            )?,
        })
    }

    /// Ranges of the bind-call statements; whole lines when the statement is
    /// alone on its line.
    fn bind_statement_ranges(&self, source: &str) -> Vec<Range<usize>> {
        let masked = mask_non_code(source);
        let mut ranges = Vec::new();

        for m in self.bind_call.find_iter(&masked) {
            let paren = m.end() - 1;
            let Some(close) = find_matching_paren(source, paren) else {
                continue;
            };
            let Some(end) = statement_end(&masked, close + 1) else {
                continue;
            };

            let line = line_start(source, m.start());
            let start = masked[line..m.start()]
                .rfind([';', '{', '}'])
                .map_or(line, |i| line + i + 1);
            let line_stop = line_end(source, end);

            let alone = masked[line..start].trim().is_empty()
                && masked[end..line_stop].trim().is_empty();
            if alone {
                ranges.push(line..line_stop);
            } else {
                ranges.push(start..end);
            }
        }
        ranges
    }

    fn remove_unbinders(&self, source: &str) -> Result<String> {
        let masked = mask_non_code(source);
        let names: Vec<String> = self
            .unbinder_field
            .captures_iter(&masked)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
            .collect();

        let mut out = replace_in_code(source, &self.unbinder_field, |_| String::new());
        for name in names {
            let name = regex::escape(&name);
            let guarded = Regex::new(&format!(
                r"(?m)^[ \t]*if\s*\(\s*(?:this\.)?{name}\s*!=\s*null\s*\)\s*\{{\s*(?:this\.)?{name}\s*\.\s*unbind\s*\(\s*\)\s*;\s*(?:(?:this\.)?{name}\s*=\s*null\s*;\s*)?\}}[ \t]*\r?\n?"
            ))?;
            let single = Regex::new(&format!(
                r"(?m)^[ \t]*(?:if\s*\(\s*(?:this\.)?{name}\s*!=\s*null\s*\)\s*)?(?:this\.)?{name}\s*\.\s*unbind\s*\(\s*\)\s*;[ \t]*\r?\n?"
            ))?;
            let reset = Regex::new(&format!(
                r"(?m)^[ \t]*(?:this\.)?{name}\s*=\s*null\s*;[ \t]*\r?\n?"
            ))?;
            for regex in [&guarded, &single, &reset] {
                out = replace_in_code(&out, regex, |_| String::new());
            }
            debug!("Removed Unbinder bookkeeping for {}", name);
        }
        Ok(out)
    }
}

impl TransformPass for BindCallRemover {
    fn name(&self) -> &'static str {
        "bind-call"
    }

    fn applies_to(&self, record: &AnnotationRecord) -> bool {
        record.bind_call_present || record.imports.any()
    }

    fn apply(&self, source: &str, _record: &AnnotationRecord) -> Result<String> {
        let ranges = self.bind_statement_ranges(source);
        let without_calls = delete_ranges(source, &ranges);
        let without_unbinders = self.remove_unbinders(&without_calls)?;
        let without_imports = replace_in_code(&without_unbinders, &self.imports, |_| String::new());
        Ok(normalize_blank_lines(&without_imports))
    }
}
