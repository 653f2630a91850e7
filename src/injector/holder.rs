use tracing::debug;

use super::codegen::{self, Scope};
use super::{CodeInjector, body_indent, insert_after};
use crate::error::Result;
use crate::java::lexer::mask_non_code;
use crate::java::structure::{ClassDecl, MethodSpan, find_call_statement, find_constructors};

/// Row view field every `RecyclerView.ViewHolder` inherits.
const ITEM_VIEW: &str = "itemView";

/// The view lookups go through: a view parameter, or `itemView` when a holder
/// constructor only receives the parent container and inflates its own row.
fn view_receiver(injector: &CodeInjector, class: &ClassDecl, ctor: &MethodSpan) -> Option<String> {
    let params = ctor.parameters();
    if let Some((_, name)) = params.iter().find(|(ty, _)| injector.tables.is_view_type(ty)) {
        return Some(name.clone());
    }
    let takes_container = params.iter().any(|(ty, _)| injector.tables.is_container_type(ty));
    (takes_container && injector.classifier.is_holder(class)).then(|| ITEM_VIEW.to_string())
}

/// Inject lookups into the holder constructor that receives the row view,
/// right after its `super(...)`/`this(...)` call.
pub(super) fn inject(
    injector: &CodeInjector,
    source: &str,
    class: &ClassDecl,
    scope: &Scope<'_>,
) -> Result<String> {
    let constructors = find_constructors(source, class)?;
    let Some((ctor, receiver)) = constructors
        .iter()
        .find_map(|ctor| view_receiver(injector, class, ctor).map(|r| (ctor, r)))
    else {
        debug!("{} has no constructor taking a view", class.name);
        return Ok(source.to_string());
    };

    let params = ctor.parameters();
    let mut taken: Vec<&str> = params.iter().map(|(_, name)| name.as_str()).collect();
    taken.push(receiver.as_str());
    let blocks = codegen::generate(scope, Some(receiver.as_str()), codegen::lambda_param(&taken));

    let masked = mask_non_code(source);
    let body = &masked[ctor.body()];
    let views = codegen::missing(body, &blocks.views)?;
    let listeners = codegen::missing(body, &blocks.listeners)?;
    if views.is_empty() && listeners.is_empty() {
        debug!("{} constructor already initializes every binding", class.name);
        return Ok(source.to_string());
    }

    let block = codegen::render_both(&views, &listeners, &body_indent(source, ctor));
    let anchor = match find_call_statement(source, ctor.body(), "super|this")? {
        Some(statement) => statement.end,
        None => ctor.open_brace + 1,
    };
    Ok(insert_after(source, anchor, &block))
}

#[cfg(test)]
mod tests {
    use super::super::{HeuristicTables, MethodConventions, scope_for};
    use super::*;
    use crate::extractor::AnnotationExtractor;
    use crate::java::structure::top_level_class;

    fn run(src: &str) -> String {
        let injector =
            CodeInjector::new(HeuristicTables::default(), MethodConventions::default()).unwrap();
        let record = AnnotationExtractor::new().unwrap().extract(src);
        let class = top_level_class(src).unwrap().unwrap();
        let scope = scope_for(src, &record, &class, true).unwrap();
        inject(&injector, src, &class, &scope).unwrap()
    }

    #[test]
    fn test_lookups_follow_super_call() {
        let src = "public class ItemHolder extends RecyclerView.ViewHolder {\n    @BindView(R.id.name) TextView name;\n\n    public ItemHolder(View itemView) {\n        super(itemView);\n    }\n\n    @OnClick(R.id.name)\n    void onName(View v) {\n    }\n}\n";
        let out = run(src);
        assert!(out.contains(
            "        super(itemView);\n        // View lookups\n        name = itemView.findViewById(R.id.name);\n        // Click listeners\n        name.setOnClickListener(v -> onName(v));\n    }\n"
        ));
        assert_eq!(run(&out), out);
    }

    #[test]
    fn test_constructor_param_named_v_renames_lambda() {
        let src = "class RowHolder extends BaseHolder {\n    @BindView(R.id.a) TextView a;\n    RowHolder(View v) { super(v); }\n    @OnClick(R.id.a) void onA(View x) {}\n}\n";
        let out = run(src);
        assert!(out.contains("a = v.findViewById(R.id.a);"));
        assert!(out.contains("a.setOnClickListener(view -> onA(view));"));
    }

    #[test]
    fn test_no_view_constructor_is_noop() {
        let src = "class DataHolder {\n    @BindView(R.id.a) TextView a;\n    DataHolder(String s) {}\n}\n";
        assert_eq!(run(src), src);
    }

    #[test]
    fn test_parent_container_constructor_uses_item_view() {
        let src = "class RowHolder extends RecyclerView.ViewHolder {\n    @BindView(R.id.a) TextView a;\n\n    RowHolder(ViewGroup parent) {\n        super(LayoutInflater.from(parent.getContext()).inflate(R.layout.row, parent, false));\n    }\n}\n";
        let out = run(src);
        assert!(out.contains(
            "        super(LayoutInflater.from(parent.getContext()).inflate(R.layout.row, parent, false));\n        // View lookups\n        a = itemView.findViewById(R.id.a);\n    }\n"
        ));
        assert_eq!(run(&out), out);
    }

    #[test]
    fn test_parent_container_outside_holder_is_noop() {
        let src = "class Panel {\n    @BindView(R.id.a) TextView a;\n    Panel(ViewGroup parent) {}\n}\n";
        assert_eq!(run(src), src);
    }
}
