//! Dedicated view/listener methods for activity-like classes.

use regex::Regex;
use std::ops::Range;
use tracing::debug;

use super::codegen::{self, GeneratedStatement, LISTENER_HEADER, Scope, VIEW_HEADER};
use super::lifecycle::creation_method;
use super::{CodeInjector, body_indent, insert_after, insert_before_close, missing_class};
use crate::error::Result;
use crate::java::lexer::{find_matching_paren, mask_non_code};
use crate::java::structure::{
    self, ClassDecl, MethodSpan, find_call_statement, find_member_method, indent_unit,
    indentation_at, line_end, line_start, member_indent, statement_end,
};
use crate::models::resource_ref_pattern;
use crate::transform::delete_ranges;

struct MethodPlan<'a> {
    name: &'a str,
    visibility: &'a str,
    header: &'a str,
    statements: &'a [GeneratedStatement],
    is_override: bool,
    calls_super: bool,
}

/// Materialize the view and listener methods. Framework subclasses get
/// `@Override` hooks (the base calls them); other activities get plain
/// methods called from their creation method.
pub(super) fn inject(
    injector: &CodeInjector,
    source: &str,
    scope: &Scope<'_>,
    framework: bool,
) -> Result<String> {
    let mut text = injector.strip_residual_annotations(source);
    let blocks = codegen::generate(scope, None, codegen::lambda_param(&[]));
    let conventions = &injector.conventions;
    let mut hooks = Vec::new();

    if !blocks.views.is_empty() {
        text = ensure_method(
            &text,
            &MethodPlan {
                name: &conventions.view_method,
                visibility: &conventions.view_visibility,
                header: VIEW_HEADER,
                statements: &blocks.views,
                is_override: framework,
                calls_super: framework,
            },
        )?;
        hooks.push(conventions.view_method.as_str());
    }

    if !blocks.listeners.is_empty() {
        text = ensure_method(
            &text,
            &MethodPlan {
                name: &conventions.listener_method,
                visibility: &conventions.listener_visibility,
                header: LISTENER_HEADER,
                statements: &blocks.listeners,
                is_override: framework,
                calls_super: false,
            },
        )?;
        hooks.push(conventions.listener_method.as_str());
    }

    if !framework {
        text = wire_creation_calls(injector, &text, &hooks)?;
        text = sweep_redundant(injector, &text, scope)?;
    }
    Ok(text)
}

fn top_level(source: &str) -> Result<ClassDecl> {
    structure::top_level_class(source)?.ok_or_else(|| missing_class("top-level"))
}

/// Create the method, or append only the statements it lacks.
fn ensure_method(source: &str, plan: &MethodPlan<'_>) -> Result<String> {
    let class = top_level(source)?;
    match find_member_method(source, &class, plan.name)? {
        Some(span) if span.params.is_empty() => update_method(source, &span, plan),
        _ => Ok(create_method(source, &class, plan)),
    }
}

fn update_method(source: &str, span: &MethodSpan, plan: &MethodPlan<'_>) -> Result<String> {
    let masked = mask_non_code(source);
    let body = &masked[span.body()];
    let indent = body_indent(source, span);
    let missing = codegen::missing(body, plan.statements)?;

    let mut out = source.to_string();
    if !missing.is_empty() {
        debug!("Appending {} statement(s) to {}", missing.len(), plan.name);
        let close_indent = indentation_at(source, span.close_brace).to_string();
        out = insert_before_close(
            &out,
            span.close_brace,
            &codegen::render(plan.header, &missing, &indent),
            &close_indent,
        );
    }

    if plan.calls_super {
        let super_call = Regex::new(&format!(
            r"\bsuper\s*\.\s*{}\s*\(\s*\)",
            regex::escape(plan.name)
        ))?;
        if !super_call.is_match(body) {
            out = insert_after(
                &out,
                span.open_brace + 1,
                &format!("{indent}super.{}();\n", plan.name),
            );
        }
    }
    Ok(out)
}

fn create_method(source: &str, class: &ClassDecl, plan: &MethodPlan<'_>) -> String {
    let member = member_indent(source, class);
    let body = format!("{member}{}", indent_unit(&member));

    let mut method = String::new();
    if plan.is_override {
        method.push_str(&format!("{member}@Override\n"));
    }
    method.push_str(&format!("{member}{} void {}() {{\n", plan.visibility, plan.name));
    if plan.calls_super {
        method.push_str(&format!("{body}super.{}();\n", plan.name));
    }
    let statements: Vec<&GeneratedStatement> = plan.statements.iter().collect();
    method.push_str(&codegen::render(plan.header, &statements, &body));
    method.push_str(&format!("{member}}}\n"));

    let start = line_start(source, class.close_brace);
    let before = source[..start].trim_end_matches([' ', '\t']);
    let separator = if before.ends_with("\n\n") || before.trim_end().ends_with('{') {
        ""
    } else {
        "\n"
    };

    debug!("Creating {} in {}", plan.name, class.name);
    let close_indent = indentation_at(source, class.start).to_string();
    insert_before_close(
        source,
        class.close_brace,
        &format!("{separator}{method}"),
        &close_indent,
    )
}

/// Make the creation method call each hook once: after an existing hook
/// call, else after the content-view call, else at the end of the method.
fn wire_creation_calls(injector: &CodeInjector, source: &str, hooks: &[&str]) -> Result<String> {
    let class = top_level(source)?;
    let Some(span) = creation_method(injector, source, &class, false)? else {
        debug!("{} has no creation method; hooks not wired", class.name);
        return Ok(source.to_string());
    };

    let mut anchor = None;
    let mut missing = Vec::new();
    for hook in hooks {
        match find_call_statement(source, span.body(), &regex::escape(hook))? {
            Some(stmt) => anchor = anchor.max(Some(stmt.end)),
            None => missing.push(*hook),
        }
    }
    if missing.is_empty() {
        return Ok(source.to_string());
    }
    if anchor.is_none() {
        anchor = find_call_statement(source, span.body(), injector.content_view_callee())?
            .map(|s| s.end);
    }

    let indent = match anchor {
        Some(end) => indentation_at(source, end).to_string(),
        None => body_indent(source, &span),
    };
    let calls: String = missing
        .iter()
        .map(|hook| format!("{indent}{hook}();\n"))
        .collect();

    Ok(match anchor {
        Some(end) => insert_after(source, end, &calls),
        None => {
            let close_indent = indentation_at(source, span.close_brace).to_string();
            insert_before_close(source, span.close_brace, &calls, &close_indent)
        }
    })
}

/// Delete lookups and listener registrations in the creation method that the
/// new methods now cover.
fn sweep_redundant(injector: &CodeInjector, source: &str, scope: &Scope<'_>) -> Result<String> {
    let class = top_level(source)?;
    let Some(span) = creation_method(injector, source, &class, false)? else {
        return Ok(source.to_string());
    };

    let masked = mask_non_code(source);
    let body = span.body();
    let fields: Vec<String> = scope.field_names().iter().map(|f| regex::escape(f)).collect();
    let mut ranges: Vec<Range<usize>> = Vec::new();

    if !fields.is_empty() {
        let lookups = Regex::new(&format!(
            r"(?m)^[ \t]*(?:this\s*\.\s*)?(?:{})\s*=\s*(?:\(\s*[\w.<>]+\s*\)\s*)?(?:[\w.]+\s*\.\s*)?findViewById\s*\([^;]*\)\s*;[ \t]*\r?\n?",
            fields.join("|")
        ))?;
        for m in lookups.find_iter(&masked[body.clone()]) {
            ranges.push(body.start + m.start()..body.start + m.end());
        }
    }

    let handlers: Vec<String> = scope.handler_names().iter().map(|h| regex::escape(h)).collect();
    if !handlers.is_empty() {
        let mut targets = Vec::new();
        if !fields.is_empty() {
            targets.push(format!(r"(?:this\s*\.\s*)?(?:{})", fields.join("|")));
        }
        let refs: Vec<String> = scope
            .listener_refs()
            .iter()
            .map(|r| resource_ref_pattern(r))
            .collect();
        if !refs.is_empty() {
            targets.push(format!(
                r"(?:[\w.]+\s*\.\s*)?findViewById\s*\(\s*(?:{})\s*\)",
                refs.join("|")
            ));
        }
        let registration = Regex::new(&format!(
            r"(?m)^[ \t]*(?:{})\s*\.\s*setOn(?:Long)?ClickListener\s*\(",
            targets.join("|")
        ))?;
        let handler = Regex::new(&format!(r"\b(?:{})\s*\(", handlers.join("|")))?;

        for m in registration.find_iter(&masked[body.clone()]) {
            let open = body.start + m.end() - 1;
            let Some(close) = find_matching_paren(source, open) else {
                continue;
            };
            if !handler.is_match(&masked[open..close]) {
                continue;
            }
            if let Some(end) = statement_end(&masked, close + 1) {
                let start = body.start + m.start();
                ranges.push(line_start(source, start)..line_end(source, end));
            }
        }
    }

    if ranges.is_empty() {
        return Ok(source.to_string());
    }
    debug!("Removing {} redundant statement(s) from {}", ranges.len(), span.name);
    ranges.sort_by_key(|r| r.start);
    Ok(delete_ranges(source, &ranges))
}

#[cfg(test)]
mod tests {
    use super::super::{HeuristicTables, MethodConventions};
    use super::*;
    use crate::extractor::AnnotationExtractor;
    use crate::injector::scope_for;

    fn run(src: &str, framework: bool) -> String {
        let injector =
            CodeInjector::new(HeuristicTables::default(), MethodConventions::default()).unwrap();
        let record = AnnotationExtractor::new().unwrap().extract(src);
        let class = structure::top_level_class(src).unwrap().unwrap();
        let scope = scope_for(src, &record, &class, true).unwrap();
        inject(&injector, src, &scope, framework).unwrap()
    }

    #[test]
    fn test_general_activity_creates_and_wires_methods() {
        let src = "public class Main extends AppCompatActivity {\n    TextView title;\n\n    protected void onCreate(Bundle state) {\n        super.onCreate(state);\n        setContentView(R.layout.main);\n        title.setText(\"hi\");\n    }\n\n    @OnClick(R.id.title)\n    void onTitle() {\n    }\n}\n";
        let src = src.replace("    TextView title;", "    @BindView(R.id.title) TextView title;");
        let out = run(&src, false);

        assert!(out.contains(
            "        setContentView(R.layout.main);\n        initViews();\n        initListener();\n        title.setText(\"hi\");\n"
        ));
        assert!(out.contains(
            "\n    protected void initViews() {\n        // View lookups\n        title = findViewById(R.id.title);\n    }\n"
        ));
        assert!(out.contains(
            "\n    public void initListener() {\n        // Click listeners\n        title.setOnClickListener(v -> onTitle());\n    }\n}\n"
        ));
        assert!(!out.contains("@BindView"));
        assert!(!out.contains("@OnClick"));
    }

    #[test]
    fn test_framework_subclass_overrides_and_calls_super() {
        let src = "public class About extends NewBaseActivity {\n    @BindView(R.id.version) TextView version;\n\n    @Override\n    public int getLayoutId() {\n        return R.layout.about;\n    }\n}\n";
        let out = run(src, true);
        assert!(out.contains(
            "    @Override\n    protected void initViews() {\n        super.initViews();\n        // View lookups\n        version = findViewById(R.id.version);\n    }\n"
        ));
        assert!(!out.contains("initViews();\n        initViews"));
    }

    #[test]
    fn test_existing_method_is_extended_once() {
        let src = "public class About extends NewBaseActivity {\n    @BindView(R.id.a) TextView a;\n    @BindView(R.id.b) TextView b;\n\n    @Override\n    protected void initViews() {\n        a = findViewById(R.id.a);\n    }\n}\n";
        let out = run(src, true);
        assert!(out.contains(
            "    protected void initViews() {\n        super.initViews();\n        a = findViewById(R.id.a);\n        // View lookups\n        b = findViewById(R.id.b);\n    }\n"
        ));
        assert_eq!(run(&out, true), out);
    }

    #[test]
    fn test_sweep_removes_legacy_statements_from_creation_method() {
        let src = "public class Main extends Activity {\n    @BindView(R.id.a) Button a;\n\n    protected void onCreate(Bundle state) {\n        setContentView(R.layout.main);\n        a = (Button) findViewById(R.id.a);\n        a.setOnClickListener(new View.OnClickListener() {\n            public void onClick(View v) {\n                onA(v);\n            }\n        });\n        a.setOnLongClickListener(other);\n    }\n\n    @OnClick(R.id.a)\n    void onA(View v) {\n    }\n}\n";
        let out = run(src, false);
        assert!(out.contains(
            "    protected void onCreate(Bundle state) {\n        setContentView(R.layout.main);\n        initViews();\n        initListener();\n        a.setOnLongClickListener(other);\n    }\n"
        ));
    }
}
