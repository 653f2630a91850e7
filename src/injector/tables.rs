//! Allowlists behind the classifier and code generator. They are plain data
//! so a project can extend them from its configuration file.

use serde::{Deserialize, Serialize};

use crate::java::structure::erase_generics;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicTables {
    /// Superclasses or interfaces that mark a list-row holder.
    pub holder_base_types: Vec<String>,
    /// Project base classes that call the view and listener hooks themselves.
    pub framework_base_classes: Vec<String>,
    /// Known subclasses of the framework bases.
    pub intermediate_base_classes: Vec<String>,
    /// Widget types forwarded to handlers with a cast.
    pub view_types: Vec<String>,
    /// Parent containers a row holder constructor may receive instead of
    /// its own view; lookups then go through `itemView`.
    pub container_types: Vec<String>,
    /// Project bases that set the content view from their own creation
    /// method, leaving subclasses to wire their views in `onCreate`.
    pub content_view_base_classes: Vec<String>,
    /// Zero-argument accessors returning the layout resource id.
    pub layout_accessors: Vec<String>,
    pub content_view_calls: Vec<String>,
    /// Creation methods tried, in order, for classes with no better anchor.
    pub lifecycle_methods: Vec<String>,
}

impl Default for HeuristicTables {
    fn default() -> Self {
        Self {
            holder_base_types: strings(&[
                "RecyclerView.ViewHolder",
                "ViewHolder",
                "BaseViewHolder",
                "BaseHolder",
            ]),
            framework_base_classes: strings(&["NewBaseActivity", "NewBaseFragment"]),
            intermediate_base_classes: strings(&[
                "TabBaseFragment",
                "HomeBaseFragment",
                "BaseClockDialActivity",
                "BaseMvpActivity",
                "BaseMvpFragment",
            ]),
            view_types: strings(&[
                "TextView",
                "Button",
                "ImageView",
                "EditText",
                "CheckBox",
                "RadioButton",
                "Switch",
                "SeekBar",
                "ProgressBar",
                "Spinner",
                "ListView",
                "RecyclerView",
                "LinearLayout",
                "RelativeLayout",
                "FrameLayout",
                "ConstraintLayout",
                "CardView",
                "ScrollView",
                "NestedScrollView",
                "ViewPager",
                "TabLayout",
                "Toolbar",
                "AppBarLayout",
                "CoordinatorLayout",
                "DrawerLayout",
                "NavigationView",
                "BottomNavigationView",
                "FloatingActionButton",
            ]),
            container_types: strings(&["ViewGroup"]),
            content_view_base_classes: Vec::new(),
            layout_accessors: strings(&["getLayoutId", "getLayoutResId", "getContentViewId"]),
            content_view_calls: strings(&["setContentView"]),
            lifecycle_methods: strings(&["onCreate", "onViewCreated", "onCreateView"]),
        }
    }
}

impl HeuristicTables {
    pub fn is_view_type(&self, type_name: &str) -> bool {
        let simple = erase_generics(type_name);
        let simple = simple.rsplit('.').next().unwrap_or(simple);
        simple == "View" || self.view_types.iter().any(|t| t == simple)
    }

    pub fn is_container_type(&self, type_name: &str) -> bool {
        let simple = erase_generics(type_name);
        let simple = simple.rsplit('.').next().unwrap_or(simple);
        self.container_types.iter().any(|t| t == simple)
    }

    /// `type_name` (generics erased) names a holder base, either exactly or
    /// as the qualified tail of one (`androidx...RecyclerView.ViewHolder`).
    pub fn is_holder_base(&self, type_name: &str) -> bool {
        let erased = erase_generics(type_name);
        self.holder_base_types
            .iter()
            .any(|base| erased == base || erased.ends_with(&format!(".{base}")))
    }

    pub fn is_framework_base(&self, type_name: &str) -> bool {
        let erased = erase_generics(type_name);
        self.framework_base_classes.iter().any(|b| b == erased)
    }

    pub fn is_intermediate_base(&self, type_name: &str) -> bool {
        let erased = erase_generics(type_name);
        self.intermediate_base_classes.iter().any(|b| b == erased)
    }

    /// Regex alternation of the content-view setters.
    pub fn content_view_pattern(&self) -> String {
        alternation(&self.content_view_calls)
    }
}

pub(crate) fn alternation(items: &[String]) -> String {
    items
        .iter()
        .map(|s| regex::escape(s))
        .collect::<Vec<_>>()
        .join("|")
}

/// Names and visibility of the two generated methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodConventions {
    pub view_method: String,
    pub view_visibility: String,
    pub listener_method: String,
    pub listener_visibility: String,
}

impl Default for MethodConventions {
    fn default() -> Self {
        Self {
            view_method: "initViews".to_string(),
            view_visibility: "protected".to_string(),
            listener_method: "initListener".to_string(),
            listener_visibility: "public".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holder_base_matching_erases_generics() {
        let tables = HeuristicTables::default();
        assert!(tables.is_holder_base("RecyclerView.ViewHolder"));
        assert!(tables.is_holder_base("androidx.recyclerview.widget.RecyclerView.ViewHolder"));
        assert!(tables.is_holder_base("BaseViewHolder<Item>"));
        assert!(!tables.is_holder_base("RecyclerView.Adapter<Foo.MyViewHolder>"));
    }

    #[test]
    fn test_view_types() {
        let tables = HeuristicTables::default();
        assert!(tables.is_view_type("Button"));
        assert!(tables.is_view_type("android.widget.Button"));
        assert!(tables.is_view_type("View"));
        assert!(!tables.is_view_type("String"));
    }

    #[test]
    fn test_tables_deserialize_partial() {
        let tables: HeuristicTables =
            serde_json::from_str(r#"{"framework_base_classes": ["MyBase"]}"#).unwrap();
        assert!(tables.is_framework_base("MyBase"));
        assert!(!tables.is_framework_base("NewBaseActivity"));
        assert!(tables.is_holder_base("ViewHolder"));
    }
}
