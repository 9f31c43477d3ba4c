//! Multi-line label filled from the `cli_commands` file.

use std::rc::Rc;

use gtk::glib;
use gtk::prelude::*;
use nwgocc_core::cli::{format_cli_line, join_cli_lines};

use super::refresh::RefreshGuard;
use super::widgets::command_utils::{run_cli_command_async, CommandResult};

pub struct CliLabel {
    label: gtk::Label,
    commands: Rc<[String]>,
    refresh: Rc<RefreshGuard>,
}

impl CliLabel {
    pub fn new(commands: Vec<String>) -> Self {
        let label = gtk::Label::new(None);
        label.set_widget_name("cli-label");
        label.set_justify(gtk::Justification::Center);
        label.set_visible(!commands.is_empty());
        Self {
            label,
            commands: commands.into(),
            refresh: Rc::new(RefreshGuard::default()),
        }
    }

    pub fn root(&self) -> &gtk::Label {
        &self.label
    }

    /// Run every command in order and replace the label text once all finished.
    ///
    /// A tick that lands while the previous pass is still running is skipped.
    pub fn refresh(&self) {
        if self.commands.is_empty() {
            return;
        }
        let Some(gen) = self.refresh.begin() else {
            return;
        };
        let commands = self.commands.clone();
        let refresh = self.refresh.clone();
        let label = self.label.downgrade();
        glib::MainContext::default().spawn_local(async move {
            let mut lines = Vec::with_capacity(commands.len());
            for cmd in commands.iter() {
                let line = match run_cli_command_async(cmd).recv().await {
                    Ok(result) => cli_line_from_result(&result),
                    Err(_) => String::new(),
                };
                lines.push(line);
            }
            if !refresh.finish(gen) {
                return;
            }
            if let Some(label) = label.upgrade() {
                label.set_text(&join_cli_lines(&lines));
            }
        });
    }
}

/// Label line for one command: stdout on success, the failure otherwise.
fn cli_line_from_result(result: &CommandResult) -> String {
    match result {
        Ok(output) if output.status.success() => {
            format_cli_line(Ok(&String::from_utf8_lossy(&output.stdout)))
        }
        Ok(output) => format_cli_line(Err(&output.status.to_string())),
        Err(err) => format_cli_line(Err(&err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;
    use std::process::{ExitStatus, Output};

    fn output(code: i32, stdout: &str) -> CommandResult {
        Ok(Output {
            status: ExitStatus::from_raw(code << 8),
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
        })
    }

    #[test]
    fn successful_output_is_trimmed() {
        assert_eq!(cli_line_from_result(&output(0, "6.9.1-arch1\n")), "6.9.1-arch1");
    }

    #[test]
    fn failed_command_shows_exit_status() {
        assert_eq!(cli_line_from_result(&output(1, "ignored")), "exit status: 1");
    }

    #[test]
    fn spawn_error_shows_error_text() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such tool");
        assert_eq!(cli_line_from_result(&Err(err)), "no such tool");
    }
}
