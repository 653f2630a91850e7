use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A view field bound through `@BindView`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldBinding {
    /// Canonical `R.id.*` reference.
    pub resource_ref: String,
    pub field_type: String,
    pub field_name: String,
    pub source_line: String,
}

/// A handler bound through `@OnClick` or `@OnLongClick`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickBinding {
    /// Canonical references, in annotation order.
    pub resource_refs: Vec<String>,
    pub method_name: String,
    pub has_view_param: bool,
    /// Declared type of the first parameter when it is a recognized widget,
    /// otherwise `View`.
    pub param_type: String,
    /// The handler returns a value (long-click handlers returning `boolean`).
    pub returns_value: bool,
    pub source_line: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFlags {
    pub bind_view: bool,
    pub on_click: bool,
    pub on_long_click: bool,
    pub butterknife: bool,
}

impl ImportFlags {
    pub fn any(&self) -> bool {
        self.bind_view || self.on_click || self.on_long_click || self.butterknife
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassInfo {
    pub name: String,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
}

/// Everything the extractor learned about one source file. Produced once per
/// file and read by every later stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    pub has_bindings: bool,
    pub field_bindings: Vec<FieldBinding>,
    pub click_bindings: Vec<ClickBinding>,
    pub long_click_bindings: Vec<ClickBinding>,
    pub bind_call_present: bool,
    pub imports: ImportFlags,
    pub class_info: Option<ClassInfo>,
}

impl AnnotationRecord {
    pub fn binding_count(&self) -> usize {
        self.field_bindings.len() + self.click_bindings.len() + self.long_click_bindings.len()
    }
}

/// Structural category that decides where generated code goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassShape {
    HolderClass,
    GeneralActivity,
    FrameworkBaseSubclass,
    Unclassified,
}

impl fmt::Display for ClassShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ClassShape::HolderClass => "holder",
            ClassShape::GeneralActivity => "general-activity",
            ClassShape::FrameworkBaseSubclass => "framework-subclass",
            ClassShape::Unclassified => "unclassified",
        };
        f.write_str(label)
    }
}

/// Normalize a resource reference: whitespace removed, `R2.id.` → `R.id.`.
/// `android.R.id.*` is left alone.
pub fn canonical_resource_ref(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    match compact.strip_prefix("R2.") {
        Some(rest) => format!("R.{rest}"),
        None => compact,
    }
}

/// Regex fragment matching a canonical reference as written in source, in
/// either of the equivalent prefixes.
pub fn resource_ref_pattern(canonical: &str) -> String {
    match canonical.strip_prefix("R.id.") {
        Some(name) => format!(r"R2?\s*\.\s*id\s*\.\s*{}\b", regex::escape(name)),
        None => format!(r"{}\b", regex::escape(canonical).replace(r"\.", r"\s*\.\s*")),
    }
}

/// One line of the writer's append-only migration log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationEntry {
    pub file: PathBuf,
    pub success: bool,
    pub message: String,
    /// RFC 3339.
    pub timestamp: String,
}

/// End-of-run summary, persisted as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub total_files: usize,
    pub butterknife_files: usize,
    pub successful_migrations: usize,
    pub failed_migrations: usize,
    pub per_file_detail: Vec<MigrationEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_canonical_resource_ref() {
        assert_eq!(canonical_resource_ref("R2.id.title"), "R.id.title");
        assert_eq!(canonical_resource_ref("R.id. title"), "R.id.title");
        assert_eq!(canonical_resource_ref("android.R.id.list"), "android.R.id.list");
    }

    #[test]
    fn test_resource_ref_pattern_matches_both_prefixes() {
        let re = Regex::new(&resource_ref_pattern("R.id.title")).unwrap();
        assert!(re.is_match("R.id.title"));
        assert!(re.is_match("R2.id.title"));
        assert!(!re.is_match("R.id.title_bar"));

        let platform = Regex::new(&resource_ref_pattern("android.R.id.list")).unwrap();
        assert!(platform.is_match("android.R.id.list"));
        assert!(!platform.is_match("android.R.id.list2"));
    }

    #[test]
    fn test_record_binding_count() {
        let record = AnnotationRecord {
            has_bindings: true,
            field_bindings: vec![FieldBinding {
                resource_ref: "R.id.ok".to_string(),
                field_type: "Button".to_string(),
                field_name: "okButton".to_string(),
                source_line: String::new(),
            }],
            click_bindings: vec![ClickBinding {
                resource_refs: vec!["R.id.ok".to_string()],
                method_name: "onOk".to_string(),
                has_view_param: false,
                param_type: "View".to_string(),
                returns_value: false,
                source_line: String::new(),
            }],
            ..Default::default()
        };
        assert_eq!(record.binding_count(), 2);
    }

    #[test]
    fn test_shape_display() {
        assert_eq!(ClassShape::FrameworkBaseSubclass.to_string(), "framework-subclass");
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = MigrationReport {
            total_files: 3,
            butterknife_files: 2,
            successful_migrations: 1,
            failed_migrations: 1,
            per_file_detail: vec![],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["totalFiles"], 3);
        assert_eq!(json["butterknifeFiles"], 2);
        assert_eq!(json["failedMigrations"], 1);
        assert!(json["perFileDetail"].as_array().unwrap().is_empty());
    }
}
