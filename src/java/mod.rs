//! Comment- and literal-aware scans over Java source text.

pub mod lexer;
pub mod structure;

pub use lexer::{
    ScanState, brace_depth, find_matching_brace, find_matching_paren, find_outer_class_end,
    mask_comments, mask_non_code,
};
pub use structure::{ClassDecl, MethodSpan, Statement};
