//! Report assembly and parsing.
//!
//! Stage outputs are laid out under fixed `==== HEADER ====` markers by the
//! [`assembler`], rendered to one linear document, and decomposed back into a
//! [`ParsedReport`](prelytics_shared::ParsedReport) by [`compose`]. Nothing in
//! this crate performs I/O or can fail: missing or malformed input degrades
//! to placeholders and empty values.

pub mod assembler;
pub mod compose;
pub mod document;
pub mod extract;
pub mod parse;

pub use assembler::{StageOutput, StageOutputs, assemble, assemble_sections};
pub use compose::compose;
pub use document::{
    AssembledDocument, DELIMITER, Section, SectionHeader, marker_for, render_nested,
};
pub use extract::{extract, extract_label};
pub use parse::{BulletRule, is_value_token, parse_bullets, parse_metrics, parse_swot};
