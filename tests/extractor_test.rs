use butterknife_migrator::AnnotationExtractor;

const LIBRARY_FRAGMENT: &str = r#"package com.example.feature;

import butterknife.BindView;
import butterknife.OnClick;

public class ProfileFragment extends Fragment {

    @BindView(R2.id.avatar)
    ImageView avatar;

    @BindView(R2.id.display_name) @Nullable
    protected TextView displayName;

    /*
    @BindView(R2.id.removed) TextView removed;
    */

    @OnClick({R2.id.avatar,
              R2.id.display_name})
    public void onProfileTapped(TextView tapped) {
    }

    static class Row {
        void onProfileTapped() {}
    }
}
"#;

#[test]
fn test_library_module_references_are_canonical() {
    let record = AnnotationExtractor::new().unwrap().extract(LIBRARY_FRAGMENT);

    let refs: Vec<&str> = record
        .field_bindings
        .iter()
        .map(|f| f.resource_ref.as_str())
        .collect();
    assert_eq!(refs, vec!["R.id.avatar", "R.id.display_name"]);
    assert_eq!(
        record.click_bindings[0].resource_refs,
        vec!["R.id.avatar", "R.id.display_name"]
    );
}

#[test]
fn test_next_line_declarations_and_block_comments() {
    let record = AnnotationExtractor::new().unwrap().extract(LIBRARY_FRAGMENT);

    let names: Vec<&str> = record
        .field_bindings
        .iter()
        .map(|f| f.field_name.as_str())
        .collect();
    assert_eq!(names, vec!["avatar", "displayName"]);
    assert_eq!(record.field_bindings[1].field_type, "TextView");
}

#[test]
fn test_handler_signature_comes_from_outer_class() {
    let record = AnnotationExtractor::new().unwrap().extract(LIBRARY_FRAGMENT);
    let handler = &record.click_bindings[0];
    assert_eq!(handler.method_name, "onProfileTapped");
    // the nested Row.onProfileTapped() must not shadow the real handler
    assert!(handler.has_view_param);
    assert_eq!(handler.param_type, "TextView");
}

#[test]
fn test_record_serializes_camel_case() {
    let record = AnnotationExtractor::new().unwrap().extract(LIBRARY_FRAGMENT);
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["hasBindings"], true);
    assert_eq!(json["fieldBindings"][0]["resourceRef"], "R.id.avatar");
    assert_eq!(json["clickBindings"][0]["hasViewParam"], true);
    assert_eq!(json["imports"]["bindView"], true);
    assert_eq!(json["imports"]["butterknife"], false);
    assert_eq!(json["classInfo"]["superclass"], "Fragment");
}

#[test]
fn test_plain_file_yields_empty_record() {
    let extractor = AnnotationExtractor::new().unwrap();
    assert!(!extractor.has_bindings("public class Plain {}\n"));
    let record = extractor.extract("public class Plain {}\n");
    assert!(!record.has_bindings);
    assert_eq!(record.binding_count(), 0);
}
