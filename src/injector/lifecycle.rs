use regex::Regex;
use tracing::debug;

use super::codegen::{self, Scope};
use super::{CodeInjector, body_indent, insert_after, insert_before_close, missing_class};
use crate::error::Result;
use crate::java::lexer::{find_matching_paren, mask_non_code};
use crate::java::structure::{
    self, ClassDecl, MethodSpan, find_call_statement, find_member_method, indentation_at,
    statement_end,
};

/// The creation method to anchor on: the first configured lifecycle method
/// that sets the content view, else the first one present.
pub(super) fn creation_method(
    injector: &CodeInjector,
    source: &str,
    class: &ClassDecl,
    skip_activity_create: bool,
) -> Result<Option<MethodSpan>> {
    let mut first = None;
    for name in &injector.tables.lifecycle_methods {
        if skip_activity_create && name == "onCreate" {
            continue;
        }
        let Some(span) = find_member_method(source, class, name)? else {
            continue;
        };
        if find_call_statement(source, span.body(), injector.content_view_callee())?.is_some() {
            return Ok(Some(span));
        }
        first.get_or_insert(span);
    }
    Ok(first)
}

/// End of `View x = inflater.inflate(...);` inside `span`, with the variable.
fn inflated_view(source: &str, span: &MethodSpan) -> Result<Option<(String, usize)>> {
    let masked = mask_non_code(source);
    let re = Regex::new(r"(?:[\w.<>]+\s+)?(\w+)\s*=\s*[\w.]+\s*\.\s*inflate\s*\(")?;
    let body = span.body();

    for caps in re.captures_iter(&masked[body.clone()]) {
        let (Some(whole), Some(var)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let open = body.start + whole.end() - 1;
        let Some(close) = find_matching_paren(source, open) else {
            continue;
        };
        if let Some(end) = statement_end(&masked, close + 1) {
            return Ok(Some((var.as_str().to_string(), end)));
        }
    }
    Ok(None)
}

/// Place both blocks straight into the creation method of a class that fits
/// no other shape.
pub(super) fn inject(injector: &CodeInjector, source: &str, scope: &Scope<'_>) -> Result<String> {
    let class = structure::top_level_class(source)?.ok_or_else(|| missing_class("top-level"))?;
    let is_fragment = class
        .superclass
        .as_deref()
        .is_some_and(|s| s.contains("Fragment"));

    let Some(span) = creation_method(injector, source, &class, is_fragment)? else {
        debug!("{} has no creation method; bindings left uninitialized", class.name);
        return Ok(source.to_string());
    };

    let params = span.parameters();
    let view_param = params
        .iter()
        .find(|(ty, _)| injector.tables.is_view_type(ty))
        .map(|(_, name)| name.clone());

    let (receiver, anchor) = match view_param {
        Some(param) => (Some(param), None),
        None => match inflated_view(source, &span)? {
            Some((var, end)) => (Some(var), Some(end)),
            None => {
                let content_view =
                    find_call_statement(source, span.body(), injector.content_view_callee())?;
                (None, content_view.map(|s| s.end))
            }
        },
    };

    if receiver.is_none() && is_fragment {
        debug!("{}.{} exposes no view to look up from", class.name, span.name);
        return Ok(source.to_string());
    }

    let mut taken: Vec<&str> = params.iter().map(|(_, name)| name.as_str()).collect();
    if let Some(r) = receiver.as_deref() {
        taken.push(r);
    }
    let blocks = codegen::generate(scope, receiver.as_deref(), codegen::lambda_param(&taken));

    let masked = mask_non_code(source);
    let body = &masked[span.body()];
    let views = codegen::missing(body, &blocks.views)?;
    let listeners = codegen::missing(body, &blocks.listeners)?;
    if views.is_empty() && listeners.is_empty() {
        debug!("{}.{} already initializes every binding", class.name, span.name);
        return Ok(source.to_string());
    }

    let block = codegen::render_both(&views, &listeners, &body_indent(source, &span));
    Ok(match anchor {
        Some(end) => insert_after(source, end, &block),
        None => {
            let close_indent = indentation_at(source, span.close_brace).to_string();
            insert_before_close(source, span.close_brace, &block, &close_indent)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::super::{HeuristicTables, MethodConventions};
    use super::*;
    use crate::extractor::AnnotationExtractor;
    use crate::injector::scope_for;

    fn run(src: &str) -> String {
        let injector =
            CodeInjector::new(HeuristicTables::default(), MethodConventions::default()).unwrap();
        let record = AnnotationExtractor::new().unwrap().extract(src);
        let class = structure::top_level_class(src).unwrap().unwrap();
        let scope = scope_for(src, &record, &class, true).unwrap();
        inject(&injector, src, &scope).unwrap()
    }

    #[test]
    fn test_activity_without_content_view_appends_to_on_create() {
        let src = "public class Plain extends Activity {\n    @BindView(R.id.a) TextView a;\n\n    protected void onCreate(Bundle state) {\n        super.onCreate(state);\n    }\n}\n";
        let out = run(src);
        assert!(out.contains(
            "        super.onCreate(state);\n        // View lookups\n        a = findViewById(R.id.a);\n    }\n"
        ));
    }

    #[test]
    fn test_fragment_uses_view_created_parameter() {
        let src = "public class Detail extends Fragment {\n    @BindView(R.id.a) TextView a;\n\n    @OnClick(R.id.a)\n    void onA(View v) {}\n\n    public void onViewCreated(View v, Bundle state) {\n        super.onViewCreated(v, state);\n    }\n}\n";
        let out = run(src);
        assert!(out.contains("        a = v.findViewById(R.id.a);\n"));
        // `v` is taken by the parameter, so the lambda uses another name
        assert!(out.contains("        a.setOnClickListener(view -> onA(view));\n"));
    }

    #[test]
    fn test_fragment_inflated_view_anchor() {
        let src = "public class Detail extends Fragment {\n    @BindView(R.id.a) TextView a;\n\n    public View onCreateView(LayoutInflater inflater, ViewGroup c, Bundle s) {\n        View root = inflater.inflate(R.layout.detail, c, false);\n        return root;\n    }\n}\n";
        let out = run(src);
        assert!(out.contains(
            "        View root = inflater.inflate(R.layout.detail, c, false);\n        // View lookups\n        a = root.findViewById(R.id.a);\n        return root;\n"
        ));
    }

    #[test]
    fn test_no_creation_method_is_noop() {
        let src = "public class Widget {\n    @BindView(R.id.a) TextView a;\n}\n";
        assert_eq!(run(src), src);
    }

    #[test]
    fn test_reinjection_is_stable() {
        let on_create = "public class Plain extends Activity {\n    @BindView(R.id.a) TextView a;\n\n    protected void onCreate(Bundle state) {\n        super.onCreate(state);\n    }\n}\n";
        let view_created = "public class Detail extends Fragment {\n    @BindView(R.id.a) TextView a;\n\n    @OnClick(R.id.a)\n    void onA(View v) {}\n\n    public void onViewCreated(View v, Bundle state) {\n        super.onViewCreated(v, state);\n    }\n}\n";
        for src in [on_create, view_created] {
            let once = run(src);
            assert_ne!(once, src);
            assert_eq!(run(&once), once);
        }
    }
}
