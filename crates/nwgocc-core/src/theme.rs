//! Embedded default files written on first start or with `--restore-defaults`.

pub const DEFAULT_STYLE_CSS: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/style.css"));

pub const DEFAULT_TEMPLATES_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/config.json"));

pub const DEFAULT_CLI_COMMANDS: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/cli_commands"));
