use regex::Regex;
use tracing::debug;

use super::{TransformPass, replace_in_code};
use crate::error::Result;
use crate::models::{AnnotationRecord, resource_ref_pattern};

/// Turns `@BindView(R.id.foo) TextView bar;` into `TextView bar;`.
pub struct FieldBindingStripper;

impl TransformPass for FieldBindingStripper {
    fn name(&self) -> &'static str {
        "field-binding"
    }

    fn applies_to(&self, record: &AnnotationRecord) -> bool {
        !record.field_bindings.is_empty()
    }

    fn apply(&self, source: &str, record: &AnnotationRecord) -> Result<String> {
        let mut out = source.to_string();

        for binding in &record.field_bindings {
            let regex = Regex::new(&format!(
                r"@BindView\s*\(\s*(?:android\s*\.\s*)?{}\s*\)\s*((?:@\w+(?:\([^)]*\))?\s+)*)(?:(?:public|private|protected|static|final|transient|volatile)\s+)*[\w.]+(?:\s*<[^;=(){{}}]*>)?(?:\[\])*\s+{}\s*;",
                resource_ref_pattern(&binding.resource_ref),
                regex::escape(&binding.field_name),
            ))?;

            let mut replaced = 0;
            out = replace_in_code(&out, &regex, |caps| {
                replaced += 1;
                let other_annotations: String = caps
                    .get(1)
                    .map(|m| {
                        m.as_str()
                            .split_whitespace()
                            .map(|a| format!("{a} "))
                            .collect()
                    })
                    .unwrap_or_default();
                format!(
                    "{other_annotations}{} {};",
                    binding.field_type, binding.field_name
                )
            });

            if replaced == 0 {
                debug!("No annotated declaration found for field {}", binding.field_name);
            }
        }

        Ok(out)
    }
}
