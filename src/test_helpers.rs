//! Test helpers for building throwaway Android project trees
//!
//! # Usage
//!
//! ```rust,ignore
//! use butterknife_migrator::test_helpers::{TestProject, activity_source};
//!
//! let project = TestProject::with_source_root()?;
//! project.add_java("com/example/MainActivity.java", &activity_source("MainActivity", &[("title", "TextView")]))?;
//! // Run the migrator against project.root()
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::{MigrationError, Result};

/// Standard Gradle source root inside a test project.
pub const SOURCE_ROOT: &str = "app/src/main/java";

/// Hermetic project directory, removed when dropped.
pub struct TestProject {
    temp_dir: TempDir,
    project_root: PathBuf,
}

impl TestProject {
    /// Create a new empty test project in a temporary directory
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()
            .map_err(|e| MigrationError::Internal(format!("Failed to create temp directory: {}", e)))?;
        let project_root = temp_dir.path().to_path_buf();

        Ok(Self {
            temp_dir,
            project_root,
        })
    }

    /// Create a test project with an `app/src/main/java` tree
    pub fn with_source_root() -> Result<Self> {
        let project = Self::new()?;
        fs::create_dir_all(project.project_root.join(SOURCE_ROOT))?;
        Ok(project)
    }

    /// Add a file at `relative_path`, creating parent directories.
    /// Returns the absolute path.
    pub fn add_file(&self, relative_path: &str, content: &str) -> Result<PathBuf> {
        let file_path = self.project_root.join(relative_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file_path, content)?;
        Ok(file_path)
    }

    /// Add a Java file under the standard source root
    pub fn add_java(&self, package_path: &str, content: &str) -> Result<PathBuf> {
        self.add_file(&format!("{SOURCE_ROOT}/{package_path}"), content)
    }

    pub fn read(&self, relative_path: &str) -> Result<String> {
        Ok(fs::read_to_string(self.project_root.join(relative_path))?)
    }

    pub fn root(&self) -> &Path {
        &self.project_root
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.project_root.join(relative)
    }

    /// Most tests should use `root()` instead.
    pub fn temp_dir(&self) -> &TempDir {
        &self.temp_dir
    }
}

/// An activity binding `fields` (name, widget type) to `R.id.<name>` and
/// calling `ButterKnife.bind(this)` after `setContentView`.
pub fn activity_source(class_name: &str, fields: &[(&str, &str)]) -> String {
    let mut out = String::from(
        "package com.example;\n\nimport android.os.Bundle;\nimport butterknife.BindView;\nimport butterknife.ButterKnife;\n\n",
    );
    out.push_str(&format!("public class {class_name} extends AppCompatActivity {{\n"));
    for (name, ty) in fields {
        out.push_str(&format!("    @BindView(R.id.{name})\n    {ty} {name};\n"));
    }
    out.push_str(
        "\n    @Override\n    protected void onCreate(Bundle savedInstanceState) {\n        super.onCreate(savedInstanceState);\n        setContentView(R.layout.main);\n        ButterKnife.bind(this);\n    }\n}\n",
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_layout() {
        let project = TestProject::with_source_root().unwrap();
        assert!(project.path(SOURCE_ROOT).is_dir());

        let file = project.add_java("com/x/A.java", "class A {}").unwrap();
        assert!(file.starts_with(project.root()));
        assert_eq!(project.read("app/src/main/java/com/x/A.java").unwrap(), "class A {}");
    }

    #[test]
    fn test_activity_source_shape() {
        let src = activity_source("Main", &[("title", "TextView")]);
        assert!(src.contains("public class Main extends AppCompatActivity {"));
        assert!(src.contains("    @BindView(R.id.title)\n    TextView title;\n"));
        assert!(src.contains("ButterKnife.bind(this);"));
    }
}
