// src/flags.rs
//! Classification of compiler arguments that clangd needs for semantic analysis.
//!
//! Anything that does not start with one of [`STEMS`] is dropped: optimization,
//! warning, debug and codegen flags only add noise to the language server.

/// Flag prefixes kept in the merged database. Must stay sorted.
pub const STEMS: [&str; 16] = [
    "--sysroot",    // Cross-compile root
    "--target",     // Target triple
    "-D",           // Macros
    "-I",           // Include paths
    "-U",           // Undefine macros
    "-imacros",     // Macro includes
    "-include",     // Force includes
    "-iquote",      // Quote headers
    "-isystem",     // System headers
    "-mabi=",       // Architecture
    "-march=",      // Architecture
    "-mcpu=",       // Architecture
    "-mfloat-abi=", // Architecture
    "-mfpu=",       // Architecture
    "-mthumb",      // Architecture
    "-std=",        // Language standard
];

/// Flags whose value may arrive as the following argv entry. Must stay sorted.
pub const FLAGS_WITH_VALUES: [&str; 4] = ["--sysroot", "-I", "-include", "-isystem"];

/// Returns true if `token` starts with any recognized stem.
///
/// Every stem that prefixes `token` sorts at or before it, so the search only
/// needs the slice up to the partition point.
#[must_use]
pub fn is_essential(token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    let upper = STEMS.partition_point(|stem| *stem <= token);
    STEMS[..upper]
        .iter()
        .rev()
        .any(|stem| token.starts_with(stem))
}

/// Returns true if `token` is exactly a flag that takes a separate value.
#[must_use]
pub fn expects_value(token: &str) -> bool {
    FLAGS_WITH_VALUES.binary_search(&token).is_ok()
}
