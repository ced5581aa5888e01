pub mod ansi;
pub mod format;
pub mod parse;
