use regex::Regex;

use super::{TransformPass, replace_in_code};
use crate::error::Result;
use crate::models::AnnotationRecord;

const ANNOTATION: &str = r"@(?:OnClick|OnLongClick)\s*\(\s*(?:\{[^}]*\}|[^)]*)\)";

/// Removes `@OnClick(...)` / `@OnLongClick(...)` and keeps the handler.
pub struct ClickAnnotationStripper {
    own_line: Regex,
    inline: Regex,
}

impl ClickAnnotationStripper {
    pub fn new() -> Result<Self> {
        Ok(Self {
            own_line: Regex::new(&format!(r"(?m)^[ \t]*{ANNOTATION}[ \t]*\r?\n"))?,
            inline: Regex::new(&format!(r"{ANNOTATION}[ \t]*"))?,
        })
    }
}

impl TransformPass for ClickAnnotationStripper {
    fn name(&self) -> &'static str {
        "click-binding"
    }

    fn applies_to(&self, record: &AnnotationRecord) -> bool {
        !record.click_bindings.is_empty() || !record.long_click_bindings.is_empty()
    }

    fn apply(&self, source: &str, _record: &AnnotationRecord) -> Result<String> {
        let without_lines = replace_in_code(source, &self.own_line, |_| String::new());
        Ok(replace_in_code(&without_lines, &self.inline, |_| String::new()))
    }
}
