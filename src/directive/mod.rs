// ABOUTME: Directive module - finds tool-call blocks embedded in generated text.
// ABOUTME: Accepts both `tool:NAME` and `tool NAME` fence headers.

mod parser;

pub use parser::*;
