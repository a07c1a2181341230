// src/filter.rs
//! Reduces a compiler invocation to the flags clangd needs.

use crate::command::tokenize_command;
use crate::flags::{expects_value, is_essential};
use crate::types::CompileCommand;

/// Keeps the essential flags of one invocation, in order.
///
/// The first token is the compiler executable and is always skipped. A flag
/// that takes a separate value keeps its following token, unless that token
/// looks like another flag.
pub fn filter_tokens<I, S>(tokens: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut iter = tokens.into_iter().skip(1).peekable();
    let mut filtered = Vec::new();

    while let Some(token) = iter.next() {
        let arg = token.as_ref();
        if !is_essential(arg) {
            continue;
        }
        filtered.push(arg.to_string());

        if expects_value(arg) {
            if let Some(value) = iter.next_if(|next| !next.as_ref().starts_with('-')) {
                filtered.push(value.as_ref().to_string());
            }
        }
    }
    filtered
}

/// Builds the filtered form of `cmd`.
///
/// The argument list is authoritative when present; otherwise the raw command
/// string is tokenized. The result never carries a command string.
#[must_use]
pub fn filter_command(cmd: &CompileCommand) -> CompileCommand {
    let arguments = if !cmd.arguments.is_empty() {
        filter_tokens(&cmd.arguments)
    } else if !cmd.command.is_empty() {
        filter_tokens(tokenize_command(&cmd.command))
    } else {
        Vec::new()
    };

    CompileCommand {
        directory: cmd.directory.clone(),
        file: cmd.file.clone(),
        command: String::new(),
        arguments,
        output: cmd.output.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_essential_flags_in_order() {
        let args = [
            "arm-none-eabi-g++",
            "-DARDUINO=10819",
            "-I/path/to/include",
            "-O2",
            "-Wall",
            "-std=c++17",
            "-march=armv7-m",
            "-g",
        ];
        assert_eq!(
            filter_tokens(args),
            ["-DARDUINO=10819", "-I/path/to/include", "-std=c++17", "-march=armv7-m"]
        );
    }

    #[test]
    fn separate_values_stay_adjacent() {
        let args = [
            "g++",
            "-I",
            "/usr/include",
            "-isystem",
            "/usr/local/include",
            "-DDEBUG",
            "-o",
            "output.o",
        ];
        assert_eq!(
            filter_tokens(args),
            ["-I", "/usr/include", "-isystem", "/usr/local/include", "-DDEBUG"]
        );
    }

    #[test]
    fn mixed_formats() {
        let args = ["gcc", "-I/combined", "-I", "/separate", "-DFOO", "-DBAR=1", "-std=c++20"];
        assert_eq!(
            filter_tokens(args),
            ["-I/combined", "-I", "/separate", "-DFOO", "-DBAR=1", "-std=c++20"]
        );
    }

    #[test]
    fn value_that_looks_like_a_flag_is_not_consumed() {
        let args = ["gcc", "-include", "-DFOO", "-O2"];
        assert_eq!(filter_tokens(args), ["-include", "-DFOO"]);
    }

    #[test]
    fn sysroot_with_separate_value() {
        let args = ["arm-none-eabi-gcc", "--sysroot", "/opt/cross/sysroot", "-DTEST"];
        assert_eq!(filter_tokens(args), ["--sysroot", "/opt/cross/sysroot", "-DTEST"]);
    }

    #[test]
    fn back_to_back_value_flags() {
        let args = ["gcc", "-I", "-isystem", "/x", "inc"];
        assert_eq!(filter_tokens(args), ["-I", "-isystem", "/x"]);
    }

    #[test]
    fn trailing_flag_without_value() {
        assert_eq!(filter_tokens(["gcc", "-DFOO", "-I"]), ["-DFOO", "-I"]);
    }

    #[test]
    fn empty_and_executable_only() {
        assert!(filter_tokens(Vec::<String>::new()).is_empty());
        assert!(filter_tokens(["gcc"]).is_empty());
        assert!(filter_tokens(["gcc", "-O3", "-Wall", "-Wextra", "-fPIC", "-c"]).is_empty());
    }

    #[test]
    fn executable_is_skipped_even_if_it_looks_essential() {
        assert_eq!(filter_tokens(["-DFOO", "-DBAR"]), ["-DBAR"]);
    }

    #[test]
    fn command_string_fallback() {
        let cmd = CompileCommand::new("/p", "main.cpp")
            .with_command("gcc -I/path -DFOO -O2 -Wall -std=c++17 -march=native -g")
            .with_output("main.o");
        let filtered = filter_command(&cmd);
        assert_eq!(filtered.arguments, ["-I/path", "-DFOO", "-std=c++17", "-march=native"]);
        assert!(filtered.command.is_empty());
        assert_eq!(filtered.output.as_deref(), Some("main.o"));
        assert_eq!(filtered.file, "main.cpp");
    }

    #[test]
    fn arguments_win_over_command_string() {
        let cmd = CompileCommand::new("/p", "a.c")
            .with_arguments(["gcc", "-DFROM_ARGS"])
            .with_command("gcc -DFROM_COMMAND");
        assert_eq!(filter_command(&cmd).arguments, ["-DFROM_ARGS"]);
    }

    #[test]
    fn no_flag_source() {
        let cmd = CompileCommand::new("/p", "a.c");
        let filtered = filter_command(&cmd);
        assert!(filtered.arguments.is_empty());
        assert!(filtered.command.is_empty());
    }

    #[test]
    fn input_is_untouched() {
        let cmd = CompileCommand::new("/p", "a.c").with_arguments(["gcc", "-O2", "-DX"]);
        let before = cmd.clone();
        let _ = filter_command(&cmd);
        assert_eq!(cmd, before);
    }
}
