// src/process/mod.rs
//! Text → rows, and the cell-level helpers shared by every sheet mapper.

pub mod tokenize;
pub mod utils;

pub use tokenize::{is_blank, parse_csv, split_line, RawRow, TokenizerMode};
pub use utils::{clean_str, coerce_number, normalize_key, parse_days, parse_number};
