//! Java statements that replace the annotations, plus presence checks that
//! keep repeated injection from duplicating them.

use regex::Regex;

use crate::error::Result;
use crate::java::lexer::find_matching_paren;
use crate::models::{ClickBinding, FieldBinding, resource_ref_pattern};

pub(crate) const VIEW_HEADER: &str = "// View lookups";
pub(crate) const LISTENER_HEADER: &str = "// Click listeners";

/// The bindings that belong to one class body.
#[derive(Debug, Default)]
pub(crate) struct Scope<'r> {
    pub fields: Vec<&'r FieldBinding>,
    pub clicks: Vec<&'r ClickBinding>,
    pub long_clicks: Vec<&'r ClickBinding>,
}

impl Scope<'_> {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.clicks.is_empty() && self.long_clicks.is_empty()
    }

    fn field_for_ref(&self, resource_ref: &str) -> Option<&FieldBinding> {
        self.fields
            .iter()
            .copied()
            .find(|f| f.resource_ref == resource_ref)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.field_name.as_str()).collect()
    }

    pub fn handler_names(&self) -> Vec<&str> {
        self.clicks
            .iter()
            .chain(&self.long_clicks)
            .map(|b| b.method_name.as_str())
            .collect()
    }

    pub fn listener_refs(&self) -> Vec<&str> {
        self.clicks
            .iter()
            .chain(&self.long_clicks)
            .flat_map(|b| b.resource_refs.iter().map(String::as_str))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Field(String),
    Lookup(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    Lookup { field: String, resource_ref: String },
    Listener { target: Target, setter: &'static str, method: String },
}

/// One generated line of Java, without indentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GeneratedStatement {
    pub code: String,
    kind: Kind,
}

#[derive(Debug, Default)]
pub(crate) struct Blocks {
    pub views: Vec<GeneratedStatement>,
    pub listeners: Vec<GeneratedStatement>,
}

/// Pick a lambda parameter name that does not shadow a local.
pub(crate) fn lambda_param(taken: &[&str]) -> &'static str {
    ["v", "view", "clicked", "target"]
        .into_iter()
        .find(|name| !taken.contains(name))
        .unwrap_or("clickedView")
}

/// Generate lookups and listener registrations for `scope`. `receiver` is the
/// view lookups are scoped to (`itemView`), `None` for the host itself.
pub(crate) fn generate(scope: &Scope<'_>, receiver: Option<&str>, param: &str) -> Blocks {
    let prefix = receiver.map(|r| format!("{r}.")).unwrap_or_default();

    let views = scope.fields.iter().map(|f| lookup(f, &prefix)).collect();

    let mut listeners = Vec::new();
    for (bindings, setter) in [
        (&scope.clicks, "setOnClickListener"),
        (&scope.long_clicks, "setOnLongClickListener"),
    ] {
        for binding in bindings.iter() {
            for resource_ref in &binding.resource_refs {
                let target = match scope.field_for_ref(resource_ref) {
                    Some(field) => Target::Field(field.field_name.clone()),
                    None => Target::Lookup(resource_ref.clone()),
                };
                let target_code = match &target {
                    Target::Field(name) => name.clone(),
                    Target::Lookup(r) => format!("{prefix}findViewById({r})"),
                };
                let call = handler_call(binding, param);
                let body = if setter == "setOnLongClickListener" && !binding.returns_value {
                    format!("{{ {call}; return true; }}")
                } else {
                    call
                };
                listeners.push(GeneratedStatement {
                    code: format!("{target_code}.{setter}({param} -> {body});"),
                    kind: Kind::Listener {
                        target,
                        setter,
                        method: binding.method_name.clone(),
                    },
                });
            }
        }
    }

    Blocks { views, listeners }
}

fn lookup(field: &FieldBinding, prefix: &str) -> GeneratedStatement {
    GeneratedStatement {
        code: format!("{} = {prefix}findViewById({});", field.field_name, field.resource_ref),
        kind: Kind::Lookup {
            field: field.field_name.clone(),
            resource_ref: field.resource_ref.clone(),
        },
    }
}

fn handler_call(binding: &ClickBinding, param: &str) -> String {
    let arg = match (binding.has_view_param, binding.param_type.as_str()) {
        (false, _) => String::new(),
        (true, "View") => param.to_string(),
        (true, ty) => format!("({ty}) {param}"),
    };
    format!("{}({arg})", binding.method_name)
}

/// Indented block: a header comment followed by the statements.
pub(crate) fn render(header: &str, statements: &[&GeneratedStatement], indent: &str) -> String {
    if statements.is_empty() {
        return String::new();
    }
    let mut out = format!("{indent}{header}\n");
    for statement in statements {
        out.push_str(indent);
        out.push_str(&statement.code);
        out.push('\n');
    }
    out
}

/// Views block followed by listeners block, each with its header.
pub(crate) fn render_both(
    views: &[&GeneratedStatement],
    listeners: &[&GeneratedStatement],
    indent: &str,
) -> String {
    let mut out = render(VIEW_HEADER, views, indent);
    out.push_str(&render(LISTENER_HEADER, listeners, indent));
    out
}

/// Statements not already present in `region`, which must be masked text
/// (comments and literals blanked) so commented-out code does not count.
pub(crate) fn missing<'a>(
    region: &str,
    statements: &'a [GeneratedStatement],
) -> Result<Vec<&'a GeneratedStatement>> {
    let mut out = Vec::new();
    for statement in statements {
        if !is_present(region, statement)? {
            out.push(statement);
        }
    }
    Ok(out)
}

/// Fields that `masked` never assigns from `findViewById`, on any receiver.
pub(crate) fn uninitialized<'r>(
    masked: &str,
    fields: &[&'r FieldBinding],
) -> Result<Vec<&'r FieldBinding>> {
    let mut out = Vec::new();
    for field in fields {
        if !is_present(masked, &lookup(field, ""))? {
            out.push(*field);
        }
    }
    Ok(out)
}

fn is_present(region: &str, statement: &GeneratedStatement) -> Result<bool> {
    if region.lines().any(|line| line.trim() == statement.code) {
        return Ok(true);
    }

    match &statement.kind {
        Kind::Lookup {
            field,
            resource_ref,
        } => {
            let re = Regex::new(&format!(
                r"\b(?:this\s*\.\s*)?{}\s*=\s*(?:\(\s*[\w.<>]+\s*\)\s*)?(?:[\w.]+\s*\.\s*)?findViewById\s*\(\s*{}\s*\)",
                regex::escape(field),
                resource_ref_pattern(resource_ref),
            ))?;
            Ok(re.is_match(region))
        }
        Kind::Listener {
            target,
            setter,
            method,
        } => {
            let target_pattern = match target {
                Target::Field(name) => format!(r"\b(?:this\s*\.\s*)?{}", regex::escape(name)),
                Target::Lookup(r) => format!(
                    r"(?:[\w.]+\s*\.\s*)?findViewById\s*\(\s*{}\s*\)",
                    resource_ref_pattern(r)
                ),
            };
            let registration = Regex::new(&format!(r"{target_pattern}\s*\.\s*{setter}\s*\("))?;
            let handler = Regex::new(&format!(r"\b{}\s*\(", regex::escape(method)))?;

            for m in registration.find_iter(region) {
                let open = m.end() - 1;
                if let Some(close) = find_matching_paren(region, open) {
                    if handler.is_match(&region[open..close]) {
                        return Ok(true);
                    }
                }
            }
            Ok(false)
        }
    }
}
