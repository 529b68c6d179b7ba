//! Core domain types, decision-tree induction, and style/layout prediction
//! for slide presentations.
//!
//! The prediction pipeline: [`extract::extract_records`] turns the slides
//! before a selection into flat [`record::AttributeRecord`]s,
//! [`tree::DecisionTree::train`] builds a transient classifier over them,
//! and the entry points in [`predict`] query it for one missing attribute
//! of the selection.

pub mod error;
pub mod extract;
pub mod ops;
pub mod predict;
pub mod record;
pub mod tree;
pub mod types;

pub use error::{Error, Result};
pub use extract::{extract_records, Granularity, MIN_RUN_LEN};
pub use predict::{
    fix_position, predict_bold, predict_font_size, predict_font_size_runs, predict_italic,
    predict_left, predict_top, predict_underline, SelectionContext,
};
pub use record::{AttrValue, Attribute, AttributeRecord};
pub use tree::{DecisionTree, TreeConfig, TreeInfo};
pub use types::{
    ElementType, Master, ParagraphAlignment, Placeholder, Presentation, Shape, Slide, TextRun,
    TextStyle, TriState,
};
