//! Small async command runner built on `tokio::process`. The only caller
//! is `transformer::Minify`, which needs to feed bytes on stdin and read
//! the result back from stdout.
use std::process::Stdio;

use tokio::io::{AsyncWriteExt, AsyncReadExt};
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct CmdOutput {
    pub status_success: bool,
    pub stdout: Vec<u8>,
    pub stderr: String,
}

/// Runs `program args...`, writing `stdin` to the child's stdin and
/// collecting stdout/stderr. Returns `Err` only if the process could not be
/// spawned at all (e.g. binary missing from `PATH`); a non-zero exit is
/// reported through `CmdOutput::status_success`, not as an `Err`.
pub async fn run_piped(program: &str, args: &[&str], stdin: &[u8]) -> std::io::Result<CmdOutput> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let mut child_stdin = child.stdin.take().expect("stdin was piped");
    let input = stdin.to_vec();
    let writer = tokio::spawn(async move {
        let _ = child_stdin.write_all(&input).await;
        drop(child_stdin);
    });

    let mut stdout_buf = Vec::new();
    let mut stderr_buf = Vec::new();
    if let Some(mut out) = child.stdout.take() {
        out.read_to_end(&mut stdout_buf).await?;
    }
    if let Some(mut err) = child.stderr.take() {
        err.read_to_end(&mut stderr_buf).await?;
    }

    let _ = writer.await;
    let status = child.wait().await?;

    Ok(CmdOutput {
        status_success: status.success(),
        stdout: stdout_buf,
        stderr: String::from_utf8_lossy(&stderr_buf).into_owned(),
    })
}
