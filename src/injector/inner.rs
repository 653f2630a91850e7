use tracing::{debug, warn};

use super::{CodeInjector, holder, scope_for};
use crate::error::Result;
use crate::java::structure::{nested_classes, top_level_class};
use crate::models::AnnotationRecord;

/// Give every nested class that declares bindings its own constructor
/// injection, scoped to the view its constructor receives. Row holders are
/// the usual case; any nested class with a view-typed constructor qualifies.
pub(super) fn sweep(
    injector: &CodeInjector,
    source: &str,
    record: &AnnotationRecord,
) -> Result<String> {
    let Some(outer) = top_level_class(source)? else {
        return Ok(source.to_string());
    };
    let names: Vec<String> = nested_classes(source, &outer)?
        .into_iter()
        .map(|class| class.name)
        .collect();

    let mut text = source.to_string();
    for name in names {
        // Offsets shift after each injection, so locate the class afresh.
        let Some(outer) = top_level_class(&text)? else {
            break;
        };
        let Some(class) = nested_classes(&text, &outer)?
            .into_iter()
            .find(|class| class.name == name)
        else {
            continue;
        };

        let scope = scope_for(&text, record, &class, false)?;
        if scope.is_empty() {
            continue;
        }
        let kind = if injector.classifier.is_holder(&class) {
            "holder"
        } else {
            "class"
        };
        debug!("Injecting into nested {} {}", kind, name);
        match holder::inject(injector, &text, &class, &scope) {
            Ok(next) => text = next,
            Err(e) => warn!("Skipping nested {} {}: {}", kind, name, e),
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::super::{HeuristicTables, MethodConventions};
    use super::*;
    use crate::extractor::AnnotationExtractor;

    fn injector() -> CodeInjector {
        CodeInjector::new(HeuristicTables::default(), MethodConventions::default()).unwrap()
    }

    #[test]
    fn test_nested_view_wrapper_gets_constructor_lookups() {
        let src = "public class HomeActivity extends AppCompatActivity {\n    class Header {\n        @BindView(R.id.sub) TextView sub;\n\n        Header(View root) {\n        }\n    }\n}\n";
        let record = AnnotationExtractor::new().unwrap().extract(src);
        let out = sweep(&injector(), src, &record).unwrap();
        assert!(out.contains(
            "        Header(View root) {\n            // View lookups\n            sub = root.findViewById(R.id.sub);\n        }\n"
        ));
        assert_eq!(sweep(&injector(), &out, &record).unwrap(), out);
    }

    #[test]
    fn test_nested_class_without_view_constructor_is_left_alone() {
        let src = "public class HomeActivity extends AppCompatActivity {\n    class Header {\n        @BindView(R.id.sub) TextView sub;\n\n        Header(String title) {\n        }\n    }\n}\n";
        let record = AnnotationExtractor::new().unwrap().extract(src);
        let out = sweep(&injector(), src, &record).unwrap();
        assert_eq!(out, src);
        assert_eq!(injector().uninitialized_fields(&out, &record).unwrap(), vec!["sub"]);
    }
}
