use regex::{Captures, Regex};
use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::injector::HeuristicTables;
use crate::java::lexer::mask_comments;
use crate::java::structure::{self, ClassDecl, parse_parameters};
use crate::models::{
    AnnotationRecord, ClassInfo, ClickBinding, FieldBinding, ImportFlags, canonical_resource_ref,
};

const MARKERS: &[&str] = &["@BindView", "@OnClick", "@OnLongClick", "ButterKnife.bind"];

/// Reads ButterKnife usage out of a Java source file.
pub struct AnnotationExtractor {
    tables: HeuristicTables,
    field_regex: Regex,
    click_regex: Regex,
    long_click_regex: Regex,
    bind_call_regex: Regex,
    import_regex: Regex,
    resource_ref_regex: Regex,
}

fn handler_pattern(annotation: &str) -> String {
    format!(
        r"@{annotation}\s*\(\s*(\{{[^}}]*\}}|[^)]*?)\s*\)\s*(?:@\w+(?:\([^)]*\))?\s+)*(?:(?:public|private|protected|static|final|synchronized)\s+)*(?:(void|boolean)\s+)?(\w+)\s*\(([^)]*)\)"
    )
}

impl AnnotationExtractor {
    pub fn new() -> Result<Self> {
        Self::with_tables(HeuristicTables::default())
    }

    pub fn with_tables(tables: HeuristicTables) -> Result<Self> {
        Ok(Self {
            tables,
            field_regex: Regex::new(
                r"@BindView\s*\(\s*((?:android\s*\.\s*)?R2?\s*\.\s*id\s*\.\s*\w+)\s*\)\s*(?:@\w+(?:\([^)]*\))?\s+)*(?:(?:public|private|protected|static|final|transient|volatile)\s+)*([\w.]+(?:\s*<[^;=(){}]*>)?(?:\[\])*)\s+(\w+)\s*;",
            )?,
            click_regex: Regex::new(&handler_pattern("OnClick"))?,
            long_click_regex: Regex::new(&handler_pattern("OnLongClick"))?,
            bind_call_regex: Regex::new(r"\bButterKnife\s*\.\s*bind\s*\(")?,
            import_regex: Regex::new(r"(?m)^\s*import\s+butterknife\.(\w+|\*)\s*;")?,
            resource_ref_regex: Regex::new(r"^(?:android\.)?R2?\.id\.\w+$")?,
        })
    }

    /// Cheap gate: does the file mention any ButterKnife marker in code?
    pub fn has_bindings(&self, source: &str) -> bool {
        if !MARKERS.iter().any(|m| source.contains(m)) {
            return false;
        }
        let masked = mask_comments(source);
        MARKERS.iter().any(|m| masked.contains(m))
    }

    /// Build the annotation record for `source`. Never fails: a problem in
    /// one part is logged and the rest of the record is still returned.
    #[instrument(skip_all, fields(len = source.len()))]
    pub fn extract(&self, source: &str) -> AnnotationRecord {
        if !self.has_bindings(source) {
            return AnnotationRecord::default();
        }

        let masked = mask_comments(source);
        let top_level = match structure::top_level_class(source) {
            Ok(decl) => decl,
            Err(e) => {
                warn!("Failed to locate class declaration: {}", e);
                None
            }
        };

        let record = AnnotationRecord {
            has_bindings: true,
            field_bindings: self.extract_fields(source, &masked),
            click_bindings: self.extract_handlers(source, &masked, &self.click_regex, top_level.as_ref()),
            long_click_bindings: self.extract_handlers(
                source,
                &masked,
                &self.long_click_regex,
                top_level.as_ref(),
            ),
            bind_call_present: self.bind_call_regex.is_match(&masked),
            imports: self.extract_imports(&masked),
            class_info: top_level.map(|decl| ClassInfo {
                name: decl.name,
                superclass: decl.superclass,
                interfaces: decl.interfaces,
            }),
        };

        debug!(
            fields = record.field_bindings.len(),
            clicks = record.click_bindings.len(),
            long_clicks = record.long_click_bindings.len(),
            "Extracted annotation record"
        );
        record
    }

    fn extract_fields(&self, source: &str, masked: &str) -> Vec<FieldBinding> {
        let mut fields: Vec<FieldBinding> = Vec::new();

        for caps in self.field_regex.captures_iter(masked) {
            let (Some(whole), Some(reference), Some(ty), Some(name)) =
                (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
            else {
                continue;
            };
            if fields.iter().any(|f| f.field_name == name.as_str()) {
                debug!("Skipping duplicate binding for field {}", name.as_str());
                continue;
            }
            fields.push(FieldBinding {
                resource_ref: canonical_resource_ref(reference.as_str()),
                field_type: ty.as_str().split_whitespace().collect(),
                field_name: name.as_str().to_string(),
                source_line: line_text(source, whole.start()),
            });
        }

        fields
    }

    fn extract_handlers(
        &self,
        source: &str,
        masked: &str,
        regex: &Regex,
        top_level: Option<&ClassDecl>,
    ) -> Vec<ClickBinding> {
        regex
            .captures_iter(masked)
            .filter_map(|caps| self.handler_from_captures(source, &caps, top_level))
            .collect()
    }

    fn handler_from_captures(
        &self,
        source: &str,
        caps: &Captures<'_>,
        top_level: Option<&ClassDecl>,
    ) -> Option<ClickBinding> {
        let whole = caps.get(0)?;
        let method_name = caps.get(3)?.as_str().to_string();
        let refs = self.parse_refs(caps.get(1).map_or("", |m| m.as_str()));
        if refs.is_empty() {
            debug!("Handler {} has no resource references", method_name);
            return None;
        }

        let inline_params = caps.get(4).map_or("", |m| m.as_str()).trim().to_string();
        let params = top_level
            .and_then(|class| self.member_params(source, class, &method_name))
            .unwrap_or(inline_params);
        let (has_view_param, param_type) = self.classify_params(&params);

        Some(ClickBinding {
            resource_refs: refs,
            has_view_param,
            param_type,
            returns_value: caps.get(2).is_some_and(|m| m.as_str() == "boolean"),
            source_line: line_text(source, whole.start()),
            method_name,
        })
    }

    /// Parameter list of the handler as declared directly in the outer class.
    fn member_params(&self, source: &str, class: &ClassDecl, name: &str) -> Option<String> {
        match structure::find_member_method(source, class, name) {
            Ok(span) => span.map(|s| s.params),
            Err(e) => {
                warn!("Failed to resolve signature of {}: {}", name, e);
                None
            }
        }
    }

    fn parse_refs(&self, raw: &str) -> Vec<String> {
        raw.trim_matches(|c: char| c == '{' || c == '}' || c.is_whitespace())
            .split(',')
            .map(canonical_resource_ref)
            .filter(|r| self.resource_ref_regex.is_match(r))
            .collect()
    }

    fn classify_params(&self, params: &str) -> (bool, String) {
        match parse_parameters(params).into_iter().next() {
            None => (false, "View".to_string()),
            Some((ty, _)) if self.tables.is_view_type(&ty) => (true, ty),
            Some(_) => (true, "View".to_string()),
        }
    }

    fn extract_imports(&self, masked: &str) -> ImportFlags {
        let mut flags = ImportFlags::default();
        for caps in self.import_regex.captures_iter(masked) {
            match caps.get(1).map(|m| m.as_str()) {
                Some("BindView") => flags.bind_view = true,
                Some("OnClick") => flags.on_click = true,
                Some("OnLongClick") => flags.on_long_click = true,
                Some("ButterKnife") | Some("*") => flags.butterknife = true,
                _ => {}
            }
        }
        flags
    }
}

fn line_text(source: &str, pos: usize) -> String {
    let start = structure::line_start(source, pos);
    let end = structure::line_end(source, pos);
    source[start..end].trim().to_string()
}
