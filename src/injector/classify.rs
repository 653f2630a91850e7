use regex::Regex;
use tracing::debug;

use super::tables::{HeuristicTables, alternation};
use crate::error::Result;
use crate::java::lexer::mask_non_code;
use crate::java::structure::{
    ClassDecl, declares_abstract_method, erase_generics, find_class_by_name, find_member_method,
};
use crate::models::ClassShape;

/// How many same-file `extends` hops are followed looking for a framework base.
const MAX_CHAIN_HOPS: usize = 3;

/// Decides which [`ClassShape`] a class has. Probes run in priority order and
/// the first match wins, so the result is always exactly one shape.
pub struct ShapeClassifier {
    tables: HeuristicTables,
    content_view_call: Regex,
}

impl ShapeClassifier {
    pub fn new(tables: HeuristicTables) -> Result<Self> {
        let content_view_call = Regex::new(&format!(
            r"\b(?:{})\s*\(",
            alternation(&tables.content_view_calls)
        ))?;
        Ok(Self {
            tables,
            content_view_call,
        })
    }

    pub fn classify(&self, source: &str, class: &ClassDecl) -> Result<ClassShape> {
        let shape = if self.is_holder(class) {
            ClassShape::HolderClass
        } else if self.is_general_activity(source, class)? {
            ClassShape::GeneralActivity
        } else if self.is_framework_subclass(source, class)? {
            ClassShape::FrameworkBaseSubclass
        } else {
            ClassShape::Unclassified
        };
        debug!(class = %class.name, %shape, "Classified class");
        Ok(shape)
    }

    /// Row-holder fingerprint: the name says `Holder` (and not Activity or
    /// Fragment), or a supertype is a known holder base.
    pub fn is_holder(&self, class: &ClassDecl) -> bool {
        let by_name = class.name.contains("Holder")
            && !class.name.contains("Activity")
            && !class.name.contains("Fragment");
        let by_supertype = class
            .superclass
            .iter()
            .chain(&class.interfaces)
            .any(|t| self.tables.is_holder_base(t));
        by_name || by_supertype
    }

    fn is_general_activity(&self, source: &str, class: &ClassDecl) -> Result<bool> {
        let masked = mask_non_code(source);
        if self.content_view_call.is_match(&masked[class.body()]) {
            return Ok(true);
        }
        if let Some(superclass) = &class.superclass {
            let erased = erase_generics(superclass);
            if self.tables.content_view_base_classes.iter().any(|b| b == erased) {
                return Ok(true);
            }
        }
        for accessor in &self.tables.layout_accessors {
            if declares_abstract_method(source, class, accessor)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn is_framework_subclass(&self, source: &str, class: &ClassDecl) -> Result<bool> {
        if self.extends_framework_base(source, class)? {
            return Ok(true);
        }
        for accessor in &self.tables.layout_accessors {
            if let Some(span) = find_member_method(source, class, accessor)? {
                if span.params.is_empty() {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Walk the superclass chain through the base tables and same-file
    /// declarations.
    fn extends_framework_base(&self, source: &str, class: &ClassDecl) -> Result<bool> {
        let mut current = class.superclass.clone();
        for _ in 0..=MAX_CHAIN_HOPS {
            let Some(superclass) = current else {
                return Ok(false);
            };
            if self.tables.is_framework_base(&superclass)
                || self.tables.is_intermediate_base(&superclass)
            {
                return Ok(true);
            }
            let name = erase_generics(&superclass);
            let simple = name.rsplit('.').next().unwrap_or(name);
            current = find_class_by_name(source, simple)?
                .filter(|decl| decl.name != class.name)
                .and_then(|decl| decl.superclass);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::java::structure::top_level_class;

    fn classify(src: &str) -> ClassShape {
        let classifier = ShapeClassifier::new(HeuristicTables::default()).unwrap();
        let class = top_level_class(src).unwrap().unwrap();
        classifier.classify(src, &class).unwrap()
    }

    #[test]
    fn test_holder_by_name_beats_layout_accessor() {
        let src = "public class ItemHolder {\n    public int getLayoutId() { return 1; }\n}\n";
        assert_eq!(classify(src), ClassShape::HolderClass);
    }

    #[test]
    fn test_holder_by_supertype() {
        let src = "class Row extends RecyclerView.ViewHolder {\n}\n";
        assert_eq!(classify(src), ClassShape::HolderClass);
    }

    #[test]
    fn test_activity_named_holder_is_not_holder() {
        let src = "class HolderActivity extends Activity {\n    void onCreate(Bundle b) { setContentView(R.layout.a); }\n}\n";
        assert_eq!(classify(src), ClassShape::GeneralActivity);
    }

    #[test]
    fn test_adapter_with_holder_generic_is_not_holder() {
        let src = "class ListAdapter extends RecyclerView.Adapter<ListAdapter.ViewHolder> {\n}\n";
        assert_eq!(classify(src), ClassShape::Unclassified);
    }

    #[test]
    fn test_content_view_in_comment_ignored() {
        let src = "class Plain {\n    // setContentView(R.layout.a);\n}\n";
        assert_eq!(classify(src), ClassShape::Unclassified);
    }

    #[test]
    fn test_abstract_layout_accessor_is_general() {
        let src = "public abstract class NewBaseActivity extends AppCompatActivity {\n    protected abstract int getLayoutId();\n}\n";
        assert_eq!(classify(src), ClassShape::GeneralActivity);
    }

    #[test]
    fn test_framework_subclass_by_base_and_accessor() {
        let direct = "public class AboutActivity extends NewBaseActivity {\n}\n";
        assert_eq!(classify(direct), ClassShape::FrameworkBaseSubclass);

        let accessor = "public class AboutActivity extends SomethingElse {\n    @Override\n    public int getLayoutId() {\n        return R.layout.about;\n    }\n}\n";
        assert_eq!(classify(accessor), ClassShape::FrameworkBaseSubclass);

        let intermediate = "public class ClockFragment extends TabBaseFragment {\n}\n";
        assert_eq!(classify(intermediate), ClassShape::FrameworkBaseSubclass);
    }

    #[test]
    fn test_framework_chain_through_same_file_declarations() {
        let src = "public class Leaf extends Middle {\n}\nclass Middle extends Top {\n}\nclass Top extends NewBaseFragment {\n}\n";
        assert_eq!(classify(src), ClassShape::FrameworkBaseSubclass);
    }
}
