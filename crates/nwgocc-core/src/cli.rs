//! Text helpers for the CLI label shown at the top of the panel.

/// Longest line kept before it is cut and marked with an ellipsis.
pub const CLI_LINE_MAX_CHARS: usize = 38;

/// Commands to run from the raw `cli_commands` file contents.
pub fn parse_cli_commands(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with("//"))
        .map(str::to_string)
        .collect()
}

/// Label text for one command: its output, or the error text when it failed.
pub fn format_cli_line(result: Result<&str, &str>) -> String {
    let text = match result {
        Ok(output) => output,
        Err(err) => err,
    };
    let shortened = match text.char_indices().nth(CLI_LINE_MAX_CHARS) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    };
    shortened.trim().to_string()
}

pub fn join_cli_lines(lines: &[String]) -> String {
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let text = "  uname -r \n\n# comment\n// another\n   \nuptime -p\n";
        assert_eq!(parse_cli_commands(text), vec!["uname -r", "uptime -p"]);
    }

    #[test]
    fn long_output_is_cut_at_38_chars() {
        let output = "a".repeat(50);
        let line = format_cli_line(Ok(&output));
        assert_eq!(line, format!("{}…", "a".repeat(38)));
        assert_eq!(line.chars().count(), 39);
    }

    #[test]
    fn short_output_is_trimmed() {
        assert_eq!(format_cli_line(Ok("5.15.0-arch\n")), "5.15.0-arch");
        assert_eq!(format_cli_line(Ok(&"x".repeat(38))), "x".repeat(38));
    }

    #[test]
    fn errors_replace_output() {
        assert_eq!(format_cli_line(Err("exit status: 127")), "exit status: 127");
    }

    #[test]
    fn multibyte_output_is_cut_on_char_boundaries() {
        let output = "ż".repeat(40);
        assert_eq!(format_cli_line(Ok(&output)), format!("{}…", "ż".repeat(38)));
    }

    #[test]
    fn lines_are_joined_with_newlines() {
        let lines = vec!["one".to_string(), "two".to_string()];
        assert_eq!(join_cli_lines(&lines), "one\ntwo");
    }
}
