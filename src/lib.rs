pub mod config;
pub mod error;
pub mod extractor;
pub mod injector;
pub mod java;
pub mod models;
pub mod pipeline;
pub mod scanner;
pub mod transform;
pub mod writer;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use config::{BindingMode, Config};
pub use error::{MigrationError, Result};
pub use extractor::AnnotationExtractor;
pub use injector::{CodeInjector, HeuristicTables, MethodConventions, ShapeClassifier};
pub use models::{
    AnnotationRecord, ClassShape, ClickBinding, FieldBinding, MigrationEntry, MigrationReport,
};
pub use pipeline::{FileOutcome, Migrator};
pub use scanner::FileScanner;
pub use writer::FileWriter;
