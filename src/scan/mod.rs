//! Component A: the Lexical Scanner.

mod scanner;

pub use scanner::{scan_file, scan_str};
