use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::lexer::{
    brace_depth, find_matching_brace, find_matching_paren, find_outer_class_end, mask_non_code,
};
use crate::error::{MigrationError, Result};

static CLASS_DECL: LazyLock<std::result::Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:class|interface|enum)\s+(\w+)(?:\s*<[^{]*?>)?(?:\s+extends\s+([\w.]+(?:\s*<[^{]*?>)?(?:\s*,\s*[\w.]+(?:\s*<[^{]*?>)?)*))?(?:\s+implements\s+([^{]+?))?\s*\{",
    )
});

fn class_decl_regex() -> Result<&'static Regex> {
    CLASS_DECL.as_ref().map_err(|e| MigrationError::Pattern(e.clone()))
}

/// A type declaration with the offsets of its body braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub name: String,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    /// Offset of the declaration keyword.
    pub start: usize,
    pub open_brace: usize,
    pub close_brace: usize,
}

impl ClassDecl {
    /// Body text range, braces excluded.
    pub fn body(&self) -> Range<usize> {
        self.open_brace + 1..self.close_brace
    }

    pub fn contains(&self, pos: usize) -> bool {
        pos > self.open_brace && pos < self.close_brace
    }
}

/// A method or constructor with a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpan {
    pub name: String,
    /// Raw text between the parentheses of the signature.
    pub params: String,
    /// Start of the line holding the signature.
    pub line_start: usize,
    pub open_brace: usize,
    pub close_brace: usize,
}

impl MethodSpan {
    pub fn body(&self) -> Range<usize> {
        self.open_brace + 1..self.close_brace
    }

    /// `(type, name)` pairs of the declared parameters.
    pub fn parameters(&self) -> Vec<(String, String)> {
        parse_parameters(&self.params)
    }
}

/// Split a parameter list into `(type, name)` pairs, dropping annotations and
/// `final`.
pub fn parse_parameters(params: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    let mut pieces = Vec::new();

    for c in params.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => {
                pieces.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    pieces.push(current);

    for piece in pieces {
        let words: Vec<&str> = piece
            .split_whitespace()
            .filter(|w| !w.starts_with('@') && *w != "final")
            .collect();
        if let [ty @ .., name] = words.as_slice() {
            if !ty.is_empty() {
                out.push((ty.join(" "), name.to_string()));
            }
        }
    }
    out
}

/// Every type declaration in the file, in source order.
pub fn find_class_declarations(source: &str) -> Result<Vec<ClassDecl>> {
    let masked = mask_non_code(source);
    let re = class_decl_regex()?;
    let mut decls = Vec::new();

    for caps in re.captures_iter(&masked) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let open_brace = whole.end() - 1;
        let Some(close_brace) = find_matching_brace(source, open_brace) else {
            continue;
        };
        let start = whole.start();

        // `new Foo() { ... }` never reaches here; guard against `.class {` oddities.
        if start > 0 && masked.as_bytes()[start - 1] == b'.' {
            continue;
        }

        decls.push(ClassDecl {
            name: name.as_str().to_string(),
            superclass: caps.get(2).map(|m| collapse_whitespace(m.as_str())),
            interfaces: caps
                .get(3)
                .map(|m| split_type_list(m.as_str()))
                .unwrap_or_default(),
            start,
            open_brace,
            close_brace,
        });
    }

    Ok(decls)
}

/// The first top-level declaration, with its end found by the outer-class scan.
pub fn top_level_class(source: &str) -> Result<Option<ClassDecl>> {
    let Some(mut decl) = find_class_declarations(source)?.into_iter().next() else {
        return Ok(None);
    };
    if let Some(end) = find_outer_class_end(source, decl.open_brace) {
        decl.close_brace = end;
    }
    Ok(Some(decl))
}

/// Declarations nested anywhere inside `outer`.
pub fn nested_classes(source: &str, outer: &ClassDecl) -> Result<Vec<ClassDecl>> {
    Ok(find_class_declarations(source)?
        .into_iter()
        .filter(|decl| outer.contains(decl.start))
        .collect())
}

/// Find a declaration by simple name.
pub fn find_class_by_name(source: &str, name: &str) -> Result<Option<ClassDecl>> {
    Ok(find_class_declarations(source)?
        .into_iter()
        .find(|decl| decl.name == name))
}

fn is_member_level(source: &str, class: &ClassDecl, pos: usize) -> bool {
    class.contains(pos) && brace_depth(source, class.open_brace + 1, pos) == 0
}

/// Resolve a signature whose name ends right before `paren` into a span,
/// requiring a body (`{`) after the parameter list and optional `throws`.
fn span_from_signature(
    source: &str,
    masked: &str,
    name: &str,
    line_start: usize,
    paren: usize,
) -> Option<MethodSpan> {
    let close_paren = find_matching_paren(source, paren)?;
    let after = &masked[close_paren + 1..];
    let trimmed = after.trim_start();
    let mut cursor = close_paren + 1 + (after.len() - trimmed.len());

    if trimmed.starts_with("throws") {
        let brace = masked[cursor..].find(['{', ';'])?;
        cursor += brace;
    }
    if masked.as_bytes().get(cursor) != Some(&b'{') {
        return None;
    }
    let close_brace = find_matching_brace(source, cursor)?;

    Some(MethodSpan {
        name: name.to_string(),
        params: source[paren + 1..close_paren].trim().to_string(),
        line_start,
        open_brace: cursor,
        close_brace,
    })
}

/// Find a method with a body declared directly in `class` (not in a nested or
/// anonymous class).
pub fn find_member_method(
    source: &str,
    class: &ClassDecl,
    name: &str,
) -> Result<Option<MethodSpan>> {
    let masked = mask_non_code(source);
    let re = Regex::new(&format!(
        r"(?m)^[ \t]*(?:@\w+(?:\([^)]*\))?\s+)*(?:(?:public|protected|private|static|final|synchronized|native)\s+)*(?:<[^>]*>\s+)?[\w.\[\]<>?,]+\s+({})\s*\(",
        regex::escape(name)
    ))?;

    for caps in re.captures_iter(&masked[..class.close_brace]) {
        let (Some(whole), Some(name_match)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if !is_member_level(source, class, name_match.start()) {
            continue;
        }
        let paren = whole.end() - 1;
        if let Some(span) = span_from_signature(source, &masked, name, whole.start(), paren) {
            return Ok(Some(span));
        }
    }
    Ok(None)
}

/// Offset of the declaration of field `name` directly in `class`.
pub fn find_member_field(source: &str, class: &ClassDecl, name: &str) -> Result<Option<usize>> {
    let masked = mask_non_code(source);
    let re = Regex::new(&format!(
        r"(?m)^[ \t]*(?:@\w+(?:\([^)]*\))?\s+)*(?:(?:public|private|protected|static|final|transient|volatile)\s+)*[\w.]+(?:\s*<[^;=(){{}}]*>)?(?:\[\])*\s+({})\s*[;=]",
        regex::escape(name)
    ))?;
    Ok(re
        .captures_iter(&masked[..class.close_brace])
        .filter_map(|caps| caps.get(1))
        .map(|m| m.start())
        .find(|&pos| is_member_level(source, class, pos)))
}

/// Whether `class` declares `name` as an abstract, body-less member.
pub fn declares_abstract_method(source: &str, class: &ClassDecl, name: &str) -> Result<bool> {
    let masked = mask_non_code(source);
    let re = Regex::new(&format!(
        r"\babstract\s+(?:(?:public|protected)\s+)?[\w.<>\[\]]+\s+{}\s*\(\s*\)\s*;",
        regex::escape(name)
    ))?;
    Ok(re
        .find_iter(&masked[..class.close_brace])
        .any(|m| is_member_level(source, class, m.start())))
}

/// Constructors of `class`, in source order.
pub fn find_constructors(source: &str, class: &ClassDecl) -> Result<Vec<MethodSpan>> {
    let masked = mask_non_code(source);
    let re = Regex::new(&format!(
        r"(?m)^[ \t]*(?:@\w+(?:\([^)]*\))?\s+)*(?:(?:public|protected|private)\s+)?({})\s*\(",
        regex::escape(&class.name)
    ))?;

    let mut ctors = Vec::new();
    for caps in re.captures_iter(&masked[..class.close_brace]) {
        let (Some(whole), Some(name_match)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if !is_member_level(source, class, name_match.start()) {
            continue;
        }
        let paren = whole.end() - 1;
        if let Some(span) = span_from_signature(source, &masked, &class.name, whole.start(), paren)
        {
            ctors.push(span);
        }
    }
    Ok(ctors)
}

/// A located statement: `line` covers whole lines, `end` is just past `;`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub line: Range<usize>,
    pub end: usize,
}

/// Find the first statement in `range` that calls something matching `callee`
/// (a regex fragment such as `setContentView` or `super`).
pub fn find_call_statement(
    source: &str,
    range: Range<usize>,
    callee: &str,
) -> Result<Option<Statement>> {
    let masked = mask_non_code(source);
    let re = Regex::new(&format!(r"\b(?:{})\s*\(", callee))?;

    for m in re.find_iter(&masked[range.clone()]) {
        let paren = range.start + m.end() - 1;
        let Some(close) = find_matching_paren(source, paren) else {
            continue;
        };
        if let Some(end) = statement_end(&masked, close + 1) {
            let start = range.start + m.start();
            return Ok(Some(Statement {
                line: line_start(source, start)..line_end(source, end),
                end,
            }));
        }
    }
    Ok(None)
}

/// Offset just past the `;` that ends the statement continuing at `from`.
pub fn statement_end(masked: &str, from: usize) -> Option<usize> {
    let bytes = masked.as_bytes();
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate().skip(from) {
        match b {
            b'(' | b'{' => depth += 1,
            b')' | b'}' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            b';' if depth == 0 => return Some(i + 1),
            _ => {}
        }
    }
    None
}

pub fn line_start(source: &str, pos: usize) -> usize {
    source[..pos].rfind('\n').map_or(0, |i| i + 1)
}

/// Offset just past the newline ending the line that holds `pos`.
pub fn line_end(source: &str, pos: usize) -> usize {
    source[pos..].find('\n').map_or(source.len(), |i| pos + i + 1)
}

/// Leading whitespace of the line that holds `pos`.
pub fn indentation_at(source: &str, pos: usize) -> &str {
    let start = line_start(source, pos);
    let line = &source[start..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

/// Indentation used for members of `class`, falling back to one level deeper
/// than the declaration line.
pub fn member_indent(source: &str, class: &ClassDecl) -> String {
    let body = &source[class.body()];
    let declared = indentation_at(source, class.start).to_string();

    body.lines()
        .skip(1)
        .find(|line| !line.trim().is_empty() && !line.trim_start().starts_with('}'))
        .map(|line| line[..line.len() - line.trim_start().len()].to_string())
        .filter(|indent| indent.len() > declared.len())
        .unwrap_or_else(|| format!("{declared}{}", indent_unit(&declared)))
}

/// One indentation step, matching the file's use of tabs or spaces.
pub fn indent_unit(sample: &str) -> &'static str {
    if sample.starts_with('\t') { "\t" } else { "    " }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn split_type_list(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for c in text.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => {
                out.push(collapse_whitespace(&current));
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    out.push(collapse_whitespace(&current));
    out.retain(|s| !s.is_empty());
    out
}

/// Drop generic arguments: `RecyclerView.Adapter<Foo.Holder>` → `RecyclerView.Adapter`.
pub fn erase_generics(type_name: &str) -> &str {
    type_name.split('<').next().unwrap_or(type_name).trim()
}
