//! CLI parsing tests for record command using the test DSL.

#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use clap::Parser;
    use rstest::rstest;
    use std::path::PathBuf;

    crate::cli_required_arg_test! {
        command: "record",
        test_name: test_record_requires_output,
        args: ["SELECT 1"],
        required_arg: "--output",
    }

    crate::cli_defaults_test! {
        command: "record",
        variant: Record,
        required_args: ["SELECT 1", "--output", "out.csv"],
        defaults: {
            output: PathBuf::from("out.csv"),
            limit: None,
            no_header: false,
            enable: "true",
        },
    }

    crate::cli_option_test! {
        command: "record",
        variant: Record,
        test_name: test_record_with_limit,
        args: ["SELECT 1", "-o", "out.csv", "--limit", "10"],
        field: limit,
        expected: Some(10),
    }

    crate::cli_option_test! {
        command: "record",
        variant: Record,
        test_name: test_record_no_header,
        args: ["SELECT 1", "-o", "out.csv", "--no-header"],
        field: no_header,
        expected: true,
    }

    crate::cli_option_test! {
        command: "record",
        variant: Record,
        test_name: test_record_enable_text,
        args: ["SELECT 1", "-o", "out.csv", "--enable", "FALSE"],
        field: enable,
        expected: "FALSE",
    }

    crate::cli_error_test! {
        command: "record",
        test_name: test_record_rejects_negative_limit,
        args: ["SELECT 1", "-o", "out.csv", "--limit", "-1"],
    }
}
