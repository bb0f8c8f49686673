//! Declarative test generators for command-line parsing and output formats.
//!
//! Each command's `cli_tests.rs` and `output_tests.rs` declare cases with
//! these macros; the caller must have `Args`, `Parser` and `rstest` in scope.

/// Parse `netex_loader <args>` and bind the subcommand `$variant` to `$cmd`.
#[macro_export]
macro_rules! parse_command {
    ($variant:ident, [$($arg:expr),+ $(,)?]) => {{
        let args = Args::try_parse_from(["netex_loader", $($arg),+])
            .unwrap_or_else(|e| panic!("arguments should parse: {}", e));
        match args.command {
            $crate::commands::Command::$variant(cmd) => cmd,
            other => panic!("parsed {:?} instead of {}", other, stringify!($variant)),
        }
    }};
}

/// Field values of a command invoked with only its required arguments.
///
/// ```ignore
/// cli_defaults_test! {
///     command: "load",
///     variant: Load,
///     required_args: ["stops.xml"],
///     defaults: { dry_run: false, batch_size: None },
/// }
/// ```
#[macro_export]
macro_rules! cli_defaults_test {
    (
        command: $cmd:literal,
        variant: $variant:ident,
        required_args: [$($req_arg:literal),*],
        defaults: {
            $($field:ident : $expected:expr),* $(,)?
        } $(,)?
    ) => {
        #[rstest]
        fn test_defaults() {
            let cmd = $crate::parse_command!($variant, [$cmd $(, $req_arg)*]);
            $(
                assert_eq!(cmd.$field, $expected, "default of {}", stringify!($field));
            )*
        }
    };
}

/// One option (plus any required arguments before it) sets one field.
#[macro_export]
macro_rules! cli_option_test {
    (
        command: $cmd:literal,
        variant: $variant:ident,
        test_name: $test_name:ident,
        args: [$($arg:literal),+],
        field: $field:ident,
        expected: $expected:expr $(,)?
    ) => {
        #[rstest]
        fn $test_name() {
            let cmd = $crate::parse_command!($variant, [$cmd, $($arg),+]);
            assert_eq!(cmd.$field, $expected, "value of {}", stringify!($field));
        }
    };
}

/// The bare command is rejected and the error names the missing argument.
///
/// ```ignore
/// cli_required_arg_test! {
///     command: "flatten",
///     test_name: test_requires_file,
///     required_arg: "<FILE>",
/// }
/// ```
#[macro_export]
macro_rules! cli_required_arg_test {
    (
        command: $cmd:literal,
        test_name: $test_name:ident,
        required_arg: $arg:literal $(,)?
    ) => {
        #[rstest]
        fn $test_name() {
            let message = match Args::try_parse_from(["netex_loader", $cmd]) {
                Ok(_) => panic!("{} parsed without {}", $cmd, $arg),
                Err(e) => e.to_string(),
            };
            assert!(message.contains($arg), "error does not mention {}: {}", $arg, message);
        }
    };
}

/// The given arguments are rejected.
#[macro_export]
macro_rules! cli_error_test {
    (
        command: $cmd:literal,
        test_name: $test_name:ident,
        args: [$($arg:literal),+] $(,)?
    ) => {
        #[rstest]
        fn $test_name() {
            let result = Args::try_parse_from(["netex_loader", $cmd, $($arg),+]);
            assert!(result.is_err(), "accepted {:?}", [$($arg),+]);
        }
    };
}

/// Exact rendering of an rstest fixture, as a table unless `format` is given.
///
/// ```ignore
/// output_table_test! {
///     test_name: test_to_table_reset,
///     fixture: reset_result,
///     fixture_type: SetupResult,
///     expected: RESET_TABLE_OUTPUT,
/// }
/// ```
#[macro_export]
macro_rules! output_table_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        expected: $expected:expr,
        format: $format:ident $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: $fixture_type) {
            use $crate::output::{OutputFormat, Outputable};
            assert_eq!($fixture.format(OutputFormat::$format), $expected);
        }
    };
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        expected: $expected:expr $(,)?
    ) => {
        $crate::output_table_test! {
            test_name: $test_name,
            fixture: $fixture,
            fixture_type: $fixture_type,
            expected: $expected,
            format: Table,
        }
    };
}

/// JSON rendering parses and carries the given top-level fields.
///
/// ```ignore
/// output_json_test! {
///     test_name: test_format_json,
///     fixture: load_result,
///     fixture_type: LoadResult,
///     assertions: { "backend": "Memory", "total_rows": 6 },
/// }
/// ```
#[macro_export]
macro_rules! output_json_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        assertions: { $($field:literal : $expected:expr),* $(,)? } $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: $fixture_type) {
            use $crate::output::{OutputFormat, Outputable};
            let parsed: serde_json::Value =
                serde_json::from_str(&$fixture.format(OutputFormat::Json)).unwrap();
            $(
                assert_eq!(parsed[$field], $expected, "JSON field {}", $field);
            )*
        }
    };
}

/// Toon rendering contains every needle.
#[macro_export]
macro_rules! output_toon_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        contains: [$($needle:literal),* $(,)?] $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: $fixture_type) {
            use $crate::output::{OutputFormat, Outputable};
            let output = $fixture.format(OutputFormat::Toon);
            $(
                assert!(output.contains($needle), "toon output lacks {:?}:\n{}", $needle, output);
            )*
        }
    };
}
