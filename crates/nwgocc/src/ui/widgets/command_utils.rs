//! Command execution for panel widgets.
//!
//! Captured commands run on a small worker pool with per-kind timeouts so a
//! hanging tool never blocks the GTK main loop. CLI label commands get their
//! own single-thread lane and a long budget, so a slow user command never
//! holds up status probes.

use std::io;
use std::process::{Command, Output, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use std::os::unix::process::CommandExt;

use crossbeam_channel as channel;
use glib::shell_parse_argv;
use nwgocc_core::util;
use nwgocc_core::DebugLevel;
use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio::runtime::Runtime;
use tracing::warn;

use crate::debug;

const COMMAND_WORKERS: usize = 2;
const CLI_WORKERS: usize = 1;
const FAST_TIMEOUT_MS: u64 = 350;
const SLOW_TIMEOUT_MS: u64 = 800;
const ACTION_TIMEOUT_MS: u64 = 1200;
const CLI_TIMEOUT_MS: u64 = 60_000;
const SLOW_JITTER_MS: u64 = 200;

pub(crate) type CommandResult = Result<Output, io::Error>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum CommandKind {
    Fast,
    Slow,
    Action,
    Cli,
}

impl CommandKind {
    fn timeout(self) -> Duration {
        match self {
            CommandKind::Fast => Duration::from_millis(FAST_TIMEOUT_MS),
            CommandKind::Slow => Duration::from_millis(SLOW_TIMEOUT_MS),
            CommandKind::Action => Duration::from_millis(ACTION_TIMEOUT_MS),
            CommandKind::Cli => Duration::from_millis(CLI_TIMEOUT_MS),
        }
    }

    fn jitter(self) -> Duration {
        if self != CommandKind::Slow {
            return Duration::ZERO;
        }
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .subsec_nanos() as u64;
        Duration::from_millis((nanos / 1_000_000) % SLOW_JITTER_MS)
    }

    fn resolve(cmd: &str, requested: CommandKind) -> CommandKind {
        if requested == CommandKind::Fast && is_probably_slow(cmd) {
            CommandKind::Slow
        } else {
            requested
        }
    }
}

/// Fire-and-forget command with the action timeout, e.g. `set_volume`.
pub(crate) fn run_command(cmd: &str) {
    let cmd = cmd.trim();
    if cmd.is_empty() {
        warn!("command was empty");
        return;
    }
    enqueue_command(cmd, CommandKind::Action, None);
}

/// Capture output of a CLI label command on its own lane.
pub(crate) fn run_cli_command_async(cmd: &str) -> async_channel::Receiver<CommandResult> {
    capture(cmd, CommandKind::Cli)
}

/// Capture output of a command that may take a while, e.g. the battery probe.
pub(crate) fn run_command_capture_async(cmd: &str) -> async_channel::Receiver<CommandResult> {
    capture(cmd, CommandKind::Slow)
}

/// Capture output of a quick status probe; known slow tools get the slow budget.
pub(crate) fn run_command_capture_status_async(
    cmd: &str,
) -> async_channel::Receiver<CommandResult> {
    capture(cmd, CommandKind::Fast)
}

fn capture(cmd: &str, kind: CommandKind) -> async_channel::Receiver<CommandResult> {
    let (tx, rx) = async_channel::bounded(1);
    let cmd = cmd.trim();
    if cmd.is_empty() {
        let _ = tx.send_blocking(Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "command was empty",
        )));
        return rx;
    }
    enqueue_command(cmd, CommandKind::resolve(cmd, kind), Some(tx));
    rx
}

/// Start a user command without a timeout; the child is reaped on a helper thread.
pub(crate) fn launch_detached(cmd: &str) -> io::Result<()> {
    let cmd = cmd.trim();
    if cmd.is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "command was empty"));
    }
    let mut command = build_command(cmd);
    command.stdout(Stdio::null()).stderr(Stdio::null());
    let mut child = command.spawn()?;
    debug::log(DebugLevel::Info, || {
        format!("launched pid={} cmd={}", child.id(), util::log_snippet(cmd))
    });
    std::thread::Builder::new()
        .name("nwgocc-reaper".to_string())
        .spawn(move || {
            let _ = child.wait();
        })?;
    Ok(())
}

/// Trimmed stdout of a successful command, empty otherwise.
pub(crate) fn command_output_text(result: &CommandResult) -> String {
    match result {
        Ok(output) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        }
        _ => String::new(),
    }
}

struct CommandJob {
    cmd: String,
    kind: CommandKind,
    respond: Option<async_channel::Sender<CommandResult>>,
}

struct CommandWorker {
    tx: channel::Sender<CommandJob>,
}

impl CommandWorker {
    fn for_kind(kind: CommandKind) -> &'static CommandWorker {
        static POOL: OnceLock<CommandWorker> = OnceLock::new();
        static CLI_LANE: OnceLock<CommandWorker> = OnceLock::new();
        if kind == CommandKind::Cli {
            CLI_LANE.get_or_init(|| CommandWorker::new("cli", CLI_WORKERS))
        } else {
            POOL.get_or_init(|| CommandWorker::new("command", COMMAND_WORKERS))
        }
    }

    fn new(lane: &str, worker_count: usize) -> Self {
        let (tx, rx) = channel::unbounded();
        for idx in 0..worker_count.max(1) {
            let rx = rx.clone();
            if let Err(err) = std::thread::Builder::new()
                .name(format!("nwgocc-{lane}-worker-{idx}"))
                .spawn(move || run_worker(rx))
            {
                warn!(?err, "failed to spawn command worker thread");
            }
        }
        Self { tx }
    }
}

fn enqueue_command(
    cmd: &str,
    kind: CommandKind,
    respond: Option<async_channel::Sender<CommandResult>>,
) {
    debug::log(DebugLevel::Verbose, || {
        format!("enqueue {kind:?} command: {}", util::log_snippet(cmd))
    });
    let job = CommandJob {
        cmd: cmd.to_string(),
        kind,
        respond,
    };
    if let Err(channel::SendError(job)) = CommandWorker::for_kind(kind).tx.send(job) {
        warn!("command worker channel closed");
        if let Some(tx) = job.respond {
            let _ = tx.send_blocking(Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "command worker unavailable",
            )));
        }
    }
}

fn run_worker(rx: channel::Receiver<CommandJob>) {
    // One current-thread runtime per worker drives pipe reads and timeouts.
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .enable_time()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            warn!(?err, "failed to build command runtime");
            for job in rx.iter() {
                if let Some(tx) = job.respond {
                    let _ = tx.send_blocking(Err(io::Error::other("command runtime unavailable")));
                }
            }
            return;
        }
    };
    for job in rx.iter() {
        handle_job(job, &runtime);
    }
}

fn handle_job(job: CommandJob, runtime: &Runtime) {
    let cmd_snip = util::log_snippet(&job.cmd);
    let jitter = job.kind.jitter();
    if !jitter.is_zero() {
        std::thread::sleep(jitter);
    }
    let started = Instant::now();
    let result = runtime.block_on(run_with_timeout(&job.cmd, job.kind.timeout()));
    let elapsed_ms = started.elapsed().as_millis();

    match &result {
        Ok(output) if output.status.success() => {
            debug::log(DebugLevel::Verbose, || {
                format!("command ok kind={:?} elapsed_ms={elapsed_ms} cmd={cmd_snip}", job.kind)
            });
        }
        Ok(output) => {
            debug::log(DebugLevel::Warn, || {
                format!(
                    "command failed kind={:?} status={:?} elapsed_ms={elapsed_ms} cmd={cmd_snip}",
                    job.kind,
                    output.status.code()
                )
            });
            if job.respond.is_none() {
                warn!(command = %cmd_snip, "command returned non-zero status");
            }
        }
        Err(err) => {
            warn!(command = %cmd_snip, ?err, elapsed_ms, "command failed");
        }
    }

    if let Some(tx) = job.respond {
        let _ = tx.send_blocking(result);
    }
}

async fn run_with_timeout(cmd: &str, timeout: Duration) -> CommandResult {
    let mut command = build_tokio_command(cmd);
    command.stdout(Stdio::piped()).stderr(Stdio::piped());
    let mut child = command.spawn()?;
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let stdout_handle = tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut stdout) = stdout {
            let _ = stdout.read_to_end(&mut buf).await;
        }
        buf
    });
    let stderr_handle = tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut stderr) = stderr {
            let _ = stderr.read_to_end(&mut buf).await;
        }
        buf
    });

    let status = match tokio::time::timeout(timeout, child.wait()).await {
        Ok(status) => status?,
        Err(_) => {
            if let Some(pid) = child.id() {
                kill_process_group(pid as i32);
            }
            let _ = child.kill().await;
            let _ = child.wait().await;
            stdout_handle.abort();
            stderr_handle.abort();
            return Err(io::Error::new(io::ErrorKind::TimedOut, "command timed out"));
        }
    };

    Ok(Output {
        status,
        stdout: stdout_handle.await.unwrap_or_default(),
        stderr: stderr_handle.await.unwrap_or_default(),
    })
}

fn build_command(cmd: &str) -> Command {
    let mut command = match parse_simple_command(cmd) {
        Some((program, args)) => {
            let mut command = Command::new(program);
            command.args(args);
            command
        }
        None => {
            let mut command = Command::new("sh");
            command.arg("-c").arg(cmd);
            command
        }
    };
    command.stdin(Stdio::null());
    // SAFETY: setpgid is async-signal-safe and runs before exec in the child.
    unsafe {
        command.pre_exec(new_process_group);
    }
    command
}

fn build_tokio_command(cmd: &str) -> TokioCommand {
    let mut command = match parse_simple_command(cmd) {
        Some((program, args)) => {
            let mut command = TokioCommand::new(program);
            command.args(args);
            command
        }
        None => {
            let mut command = TokioCommand::new("sh");
            command.arg("-c").arg(cmd);
            command
        }
    };
    command.stdin(Stdio::null());
    // A dedicated process group lets a timeout kill the whole pipeline.
    // SAFETY: see `build_command`.
    unsafe {
        command.pre_exec(new_process_group);
    }
    command
}

fn new_process_group() -> io::Result<()> {
    // SAFETY: plain syscall in the forked child.
    if unsafe { libc::setpgid(0, 0) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn parse_simple_command(cmd: &str) -> Option<(String, Vec<String>)> {
    let cmd = cmd.trim();
    if cmd.is_empty() || !is_simple_command(cmd) {
        return None;
    }
    // GLib parsing honors quoted arguments without a shell.
    let mut parts = shell_parse_argv(cmd).ok()?.into_iter();
    let program = parts.next()?.into_string().ok()?;
    let args = parts
        .map(|arg| arg.into_string().ok())
        .collect::<Option<Vec<_>>>()?;
    Some((program, args))
}

fn is_simple_command(cmd: &str) -> bool {
    const META: [char; 18] = [
        '|', '&', ';', '<', '>', '$', '`', '(', ')', '{', '}', '[', ']', '*', '?', '~', '\n', '\r',
    ];
    if cmd.chars().any(|ch| META.contains(&ch)) {
        return false;
    }
    // `VAR=value cmd` needs a shell.
    let first = cmd.split_whitespace().next().unwrap_or_default();
    !(first.contains('=') && !first.starts_with('/') && !first.starts_with("./"))
}

fn kill_process_group(pid: i32) {
    if pid <= 0 {
        return;
    }
    // SAFETY: signals the process group created by `new_process_group`.
    unsafe {
        libc::kill(-pid, libc::SIGKILL);
    }
}

fn is_probably_slow(cmd: &str) -> bool {
    let lower = cmd.to_ascii_lowercase();
    if lower.contains('|') || lower.contains("&&") || lower.contains(';') {
        return true;
    }
    ["bluetoothctl", "upower", "acpi", "playerctl", "pactl", "systemctl", "iwgetid"]
        .iter()
        .any(|token| lower.contains(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;

    fn output(code: i32, stdout: &str) -> Output {
        Output {
            status: ExitStatus::from_raw(code << 8),
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
        }
    }

    #[test]
    fn parse_simple_command_honors_quotes() {
        let (program, args) =
            parse_simple_command("notify-send \"Hello World\"").expect("parsed command");
        assert_eq!(program, "notify-send");
        assert_eq!(args, vec!["Hello World"]);
    }

    #[test]
    fn shell_syntax_goes_through_sh() {
        assert!(parse_simple_command("echo hi | wc -l").is_none());
        assert!(parse_simple_command("echo $USER").is_none());
        assert!(parse_simple_command("LANG=C date").is_none());
        assert!(parse_simple_command("light -S 40").is_some());
    }

    #[test]
    fn pipelines_and_known_tools_get_the_slow_budget() {
        assert_eq!(
            CommandKind::resolve("bluetoothctl show | awk '/Powered/{print $2}'", CommandKind::Fast),
            CommandKind::Slow
        );
        assert_eq!(CommandKind::resolve("light -G", CommandKind::Fast), CommandKind::Fast);
        assert_eq!(CommandKind::resolve("pactl x", CommandKind::Action), CommandKind::Action);
        assert_eq!(
            CommandKind::resolve("checkupdates | wc -l", CommandKind::Cli),
            CommandKind::Cli
        );
    }

    #[test]
    fn cli_commands_get_a_long_budget_without_jitter() {
        assert!(CommandKind::Cli.timeout() >= Duration::from_secs(60));
        assert!(CommandKind::Cli.timeout() > CommandKind::Slow.timeout());
        assert!(CommandKind::Cli.jitter().is_zero());
    }

    #[test]
    fn slow_jitter_stays_below_cap() {
        assert!(CommandKind::Slow.jitter() < Duration::from_millis(SLOW_JITTER_MS));
        assert!(CommandKind::Fast.jitter().is_zero());
    }

    #[test]
    fn output_text_requires_success() {
        assert_eq!(command_output_text(&Ok(output(0, " home\n"))), "home");
        assert_eq!(command_output_text(&Ok(output(1, "partial"))), "");
        assert_eq!(
            command_output_text(&Err(io::Error::new(io::ErrorKind::TimedOut, "x"))),
            ""
        );
    }
}
