//! Places generated view lookups and listener registrations into the class
//! shapes the classifier recognizes.

pub mod classify;
mod codegen;
mod holder;
mod inner;
mod lifecycle;
mod methods;
pub mod tables;

use regex::Regex;
use tracing::{debug, instrument, warn};

pub use classify::ShapeClassifier;
pub use tables::{HeuristicTables, MethodConventions};

use crate::error::{MigrationError, Result};
use crate::java::lexer::mask_non_code;
use crate::java::structure::{
    self, ClassDecl, MethodSpan, find_member_field, find_member_method, indent_unit,
    indentation_at, line_end, line_start,
};
use crate::models::{AnnotationRecord, ClassShape, FieldBinding};
use codegen::Scope;

/// Rewrites a transformed source file so every binding is initialized
/// explicitly. Total: failures are logged and the best text so far returned;
/// `uninitialized_fields` reports what it could not place.
pub struct CodeInjector {
    pub(crate) tables: HeuristicTables,
    pub(crate) conventions: MethodConventions,
    pub(crate) classifier: ShapeClassifier,
    content_view_callee: String,
    library_imports: Regex,
    residual_own_line: Regex,
    residual_inline: Regex,
}

impl CodeInjector {
    pub fn new(tables: HeuristicTables, conventions: MethodConventions) -> Result<Self> {
        Ok(Self {
            classifier: ShapeClassifier::new(tables.clone())?,
            content_view_callee: tables.content_view_pattern(),
            library_imports: Regex::new(
                r"(?m)^[ \t]*import\s+(?:static\s+)?(?:butterknife\.[\w.*]+|[\w.]+\.(?:BindView|OnClick|OnLongClick|ButterKnife|Unbinder))\s*;[ \t]*\r?\n?",
            )?,
            residual_own_line: Regex::new(
                r"(?m)^[ \t]*@(?:BindView|OnClick|OnLongClick)\s*\(\s*(?:\{[^}]*\}|[^)]*)\)[ \t]*\r?\n",
            )?,
            residual_inline: Regex::new(
                r"@(?:BindView|OnClick|OnLongClick)\s*\(\s*(?:\{[^}]*\}|[^)]*)\)\s*",
            )?,
            tables,
            conventions,
        })
    }

    /// Shape of the top-level class of `source`, if it has one.
    pub fn classify(&self, source: &str) -> Result<Option<ClassShape>> {
        match structure::top_level_class(source)? {
            Some(class) => Ok(Some(self.classifier.classify(source, &class)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip_all, fields(class = record.class_info.as_ref().map(|c| c.name.as_str()).unwrap_or("")))]
    pub fn inject(&self, source: &str, record: &AnnotationRecord) -> String {
        if !record.has_bindings {
            return source.to_string();
        }

        let text = self.strip_library_imports(source);
        let text = self.step("top-level injection", text, |t| self.inject_top_level(t, record));
        self.step("nested class sweep", text, |t| inner::sweep(self, t, record))
    }

    /// Names of bound fields that `source` never assigns from `findViewById`.
    /// Non-empty after `inject` when some class offered no anchor.
    pub fn uninitialized_fields<'r>(
        &self,
        source: &str,
        record: &'r AnnotationRecord,
    ) -> Result<Vec<&'r str>> {
        let masked = mask_non_code(source);
        let fields: Vec<&FieldBinding> = record.field_bindings.iter().collect();
        Ok(codegen::uninitialized(&masked, &fields)?
            .into_iter()
            .map(|f| f.field_name.as_str())
            .collect())
    }

    /// Run one stage; on failure keep the text from before it.
    fn step(&self, stage: &str, text: String, f: impl FnOnce(&str) -> Result<String>) -> String {
        match f(&text) {
            Ok(next) => next,
            Err(e) => {
                warn!("Skipping {}: {}", stage, e);
                text
            }
        }
    }

    fn inject_top_level(&self, source: &str, record: &AnnotationRecord) -> Result<String> {
        let Some(outer) = structure::top_level_class(source)? else {
            debug!("No class declaration; nothing to inject");
            return Ok(source.to_string());
        };
        let scope = scope_for(source, record, &outer, true)?;
        if scope.is_empty() {
            debug!("No bindings owned by {}", outer.name);
            return Ok(source.to_string());
        }

        match self.classifier.classify(source, &outer)? {
            ClassShape::HolderClass => holder::inject(self, source, &outer, &scope),
            ClassShape::GeneralActivity => methods::inject(self, source, &scope, false),
            ClassShape::FrameworkBaseSubclass => methods::inject(self, source, &scope, true),
            ClassShape::Unclassified => lifecycle::inject(self, source, &scope),
        }
    }

    fn strip_library_imports(&self, source: &str) -> String {
        crate::transform::replace_in_code(source, &self.library_imports, |_| String::new())
    }

    /// Remove ButterKnife annotations the text passes left behind.
    pub(crate) fn strip_residual_annotations(&self, source: &str) -> String {
        let without_lines =
            crate::transform::replace_in_code(source, &self.residual_own_line, |_| String::new());
        crate::transform::replace_in_code(&without_lines, &self.residual_inline, |_| String::new())
    }

    pub(crate) fn content_view_callee(&self) -> &str {
        &self.content_view_callee
    }
}

/// Bindings declared directly in `class`. With `claim_unlocated`, bindings
/// whose declaration cannot be found anywhere are attributed to it too.
pub(crate) fn scope_for<'r>(
    source: &str,
    record: &'r AnnotationRecord,
    class: &ClassDecl,
    claim_unlocated: bool,
) -> Result<Scope<'r>> {
    let all_classes = structure::find_class_declarations(source)?;
    let mut scope = Scope::default();

    for field in &record.field_bindings {
        let owned = match find_member_field(source, class, &field.field_name)? {
            Some(_) => true,
            None => claim_unlocated && !located_anywhere(&all_classes, |c| {
                find_member_field(source, c, &field.field_name).map(|p| p.is_some())
            })?,
        };
        if owned {
            scope.fields.push(field);
        }
    }

    for (bindings, target) in [
        (&record.click_bindings, &mut scope.clicks),
        (&record.long_click_bindings, &mut scope.long_clicks),
    ] {
        for binding in bindings {
            let owned = match find_member_method(source, class, &binding.method_name)? {
                Some(_) => true,
                None => claim_unlocated && !located_anywhere(&all_classes, |c| {
                    find_member_method(source, c, &binding.method_name).map(|m| m.is_some())
                })?,
            };
            if owned {
                target.push(binding);
            }
        }
    }

    Ok(scope)
}

fn located_anywhere(
    classes: &[ClassDecl],
    mut check: impl FnMut(&ClassDecl) -> Result<bool>,
) -> Result<bool> {
    for class in classes {
        if check(class)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Insert `block` (whole indented lines) after the statement ending at `end`.
/// Code sharing the line after `end` is pushed onto its own line.
pub(crate) fn insert_after(source: &str, end: usize, block: &str) -> String {
    if block.is_empty() {
        return source.to_string();
    }
    let stop = line_end(source, end);
    let rest_of_line = &source[end..stop];

    if rest_of_line.trim().is_empty() {
        let mut out = String::with_capacity(source.len() + block.len() + 1);
        out.push_str(&source[..stop]);
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(block);
        out.push_str(&source[stop..]);
        out
    } else {
        let indent = indentation_at(source, end).to_string();
        format!(
            "{}\n{block}{indent}{}",
            &source[..end],
            source[end..].trim_start_matches([' ', '\t'])
        )
    }
}

/// Insert `block` right before the closing brace at `close`; `close_indent`
/// is used when the brace has to move onto its own line.
pub(crate) fn insert_before_close(
    source: &str,
    close: usize,
    block: &str,
    close_indent: &str,
) -> String {
    if block.is_empty() {
        return source.to_string();
    }
    let start = line_start(source, close);
    if source[start..close].trim().is_empty() {
        format!("{}{block}{}", &source[..start], &source[start..])
    } else {
        format!(
            "{}\n{block}{close_indent}{}",
            source[..close].trim_end_matches([' ', '\t']),
            &source[close..]
        )
    }
}

/// Indentation of statements inside `span`, taken from its first statement
/// or one level deeper than the line holding the opening brace.
pub(crate) fn body_indent(source: &str, span: &MethodSpan) -> String {
    let outer = indentation_at(source, span.open_brace).to_string();
    source[span.body()]
        .lines()
        .skip(1)
        .find(|line| !line.trim().is_empty())
        .map(|line| line[..line.len() - line.trim_start().len()].to_string())
        .filter(|indent| indent.len() > outer.len())
        .unwrap_or_else(|| format!("{outer}{}", indent_unit(&outer)))
}

pub(crate) fn missing_class(name: &str) -> MigrationError {
    MigrationError::Internal(format!("class {name} disappeared during injection"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::AnnotationExtractor;

    #[test]
    fn test_insert_after_own_line() {
        let src = "a();\nb();\n";
        assert_eq!(insert_after(src, 4, "    x();\n"), "a();\n    x();\nb();\n");
    }

    #[test]
    fn test_insert_after_shared_line() {
        let src = "    void f() { super(v); }\n";
        let end = src.find(';').unwrap() + 1;
        assert_eq!(
            insert_after(src, end, "        x();\n"),
            "    void f() { super(v);\n        x();\n    }\n"
        );
    }

    #[test]
    fn test_insert_before_close() {
        let src = "class A {\n    int a;\n}\n";
        let close = src.rfind('}').unwrap();
        assert_eq!(
            insert_before_close(src, close, "    int b;\n", ""),
            "class A {\n    int a;\n    int b;\n}\n"
        );
        let inline = "void f() { a(); }";
        let close = inline.rfind('}').unwrap();
        assert_eq!(
            insert_before_close(inline, close, "    b();\n", ""),
            "void f() { a();\n    b();\n}"
        );
    }

    #[test]
    fn test_scope_splits_nested_class_bindings() {
        let src = r#"public class ListAdapter extends RecyclerView.Adapter<ListAdapter.Holder> {
    @BindView(R.id.header) TextView header;

    static class Holder extends RecyclerView.ViewHolder {
        @BindView(R.id.name) TextView name;

        Holder(View itemView) {
            super(itemView);
        }

        @OnClick(R.id.name)
        void onName() {
        }
    }
}
"#;
        let record = AnnotationExtractor::new().unwrap().extract(src);
        let outer = structure::top_level_class(src).unwrap().unwrap();
        let holder = structure::find_class_by_name(src, "Holder").unwrap().unwrap();

        let top = scope_for(src, &record, &outer, true).unwrap();
        assert_eq!(top.field_names(), vec!["header"]);
        assert!(top.clicks.is_empty());

        let nested = scope_for(src, &record, &holder, false).unwrap();
        assert_eq!(nested.field_names(), vec!["name"]);
        assert_eq!(nested.handler_names(), vec!["onName"]);
    }

    #[test]
    fn test_inject_without_bindings_is_identity() {
        let injector =
            CodeInjector::new(HeuristicTables::default(), MethodConventions::default()).unwrap();
        let src = "import butterknife.BindView;\nclass A {}\n";
        assert_eq!(injector.inject(src, &AnnotationRecord::default()), src);
    }
}
