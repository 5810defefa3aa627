//! Version string tokenizing and release classification.

pub mod kind;
pub mod tokenizer;

pub use kind::ReleaseKind;
pub use tokenizer::{major_token, StructuralVersion};
