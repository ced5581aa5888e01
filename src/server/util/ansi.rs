//! Terminal escape codes for command line output.

pub const RESET: &str = "\x1B[0m";
pub const BOLD: &str = "\x1B[1m";

pub const RED: &str = "\x1B[31m";
pub const GREEN: &str = "\x1B[32m";
pub const YELLOW: &str = "\x1B[33m";
pub const CYAN: &str = "\x1B[36m";
