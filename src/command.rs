// src/command.rs
//! Whitespace tokenizer for pre-joined compiler commands.

/// Splits a pre-joined compiler command on single spaces.
///
/// Runs of spaces never yield empty tokens. Quoting, escaping and other
/// whitespace are not interpreted. The returned iterator is `Clone`, so callers
/// can walk the same command more than once without re-splitting by hand.
pub fn tokenize_command(cmd: &str) -> impl Iterator<Item = &str> + Clone {
    cmd.split(' ').filter(|token| !token.is_empty())
}
