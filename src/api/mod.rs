//! Purpose: Define the stable public Rust API boundary for cfgparser.
//! Exports: Parser, section view, value types, evaluation helpers and errors.
//! Role: Public, additive-only surface over the `core` modules.
//! Invariants: Callers and the CLI import from here rather than from `core` paths.

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::category::CategoryIndex;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::evaluate::{evaluate, keyword_bool};
pub use crate::core::ini::DEFAULT_SECTION;
pub use crate::core::list::{split, split_evaluated};
pub use crate::core::literal::{LiteralError, parse_literal};
pub use crate::core::parser::{CfgParser, SectionKey};
pub use crate::core::section::SectionView;
pub use crate::core::store::{OptionTransform, Options, RawStore, lowercase};
pub use crate::core::value::Value;
