//! Tokio process adapter for ffmpeg/ffprobe
//!
//! Streams stderr line by line into the log (lossily decoded), keeps its tail for error
//! messages and kills the child when the job is cancelled or dropped.

use std::collections::VecDeque;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::engine::command::{MediaCommand, MediaTool};
use crate::error::{SegmentError, SegmentResult};
use crate::ports::{ProcessOutput, ProcessPort};

/// Stderr lines kept for error reports
const STDERR_TAIL_LINES: usize = 20;

/// Runs media tools as child processes
pub struct TokioProcessAdapter {
    ffmpeg: String,
    ffprobe: String,
}

impl TokioProcessAdapter {
    /// Create an adapter using the given executable paths
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    fn program(&self, tool: MediaTool) -> &str {
        match tool {
            MediaTool::Ffmpeg => &self.ffmpeg,
            MediaTool::Ffprobe => &self.ffprobe,
        }
    }
}

#[async_trait]
impl ProcessPort for TokioProcessAdapter {
    async fn run(
        &self,
        command: &MediaCommand,
        cancel: &CancellationToken,
    ) -> SegmentResult<ProcessOutput> {
        let program = self.program(command.tool).to_string();
        debug!(program = %program, args = ?command.args, "Spawning media tool");

        let mut child = Command::new(&program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SegmentError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let stdout_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Some(mut out) = stdout {
                out.read_to_end(&mut buf).await?;
            }
            Ok::<_, std::io::Error>(buf)
        });

        // Tool stderr carries container metadata in any encoding; decode lossily
        // and keep draining so the child never blocks on a full pipe
        let tool = command.tool;
        let stderr_task = tokio::spawn(async move {
            let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
            if let Some(err) = stderr {
                let mut lines = BufReader::new(err).split(b'\n');
                loop {
                    let raw = match lines.next_segment().await {
                        Ok(Some(raw)) => raw,
                        Ok(None) => break,
                        Err(e) => {
                            warn!(tool = %tool, error = %e, "Failed to read media tool stderr");
                            break;
                        }
                    };
                    let line = String::from_utf8_lossy(&raw).trim_end().to_string();
                    debug!(target: "media_tool", tool = %tool, "{}", line);
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
            }
            Vec::from(tail).join("\n")
        });

        let waited = tokio::select! {
            status = child.wait() => Some(status),
            _ = cancel.cancelled() => None,
        };

        let status = match waited {
            Some(status) => status?,
            None => {
                warn!(program = %program, "Cancelling media tool");
                if let Err(e) = child.kill().await {
                    warn!(program = %program, error = %e, "Failed to kill media tool");
                }
                return Err(SegmentError::Cancelled);
            }
        };

        let stdout = stdout_task
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))??;
        let stderr_tail = stderr_task.await.unwrap_or_else(|e| {
            warn!(program = %program, error = %e, "Stderr reader task failed");
            String::new()
        });

        debug!(program = %program, code = ?status.code(), "Media tool exited");
        if !status.success() {
            return Err(SegmentError::ProcessFailed {
                program,
                exit_code: status.code(),
                stderr: stderr_tail,
            });
        }

        let stdout = String::from_utf8(stdout).map_err(|e| SegmentError::ProbeParse {
            message: format!("{} wrote non UTF-8 output: {}", program, e),
        })?;
        Ok(ProcessOutput {
            stdout,
            stderr_tail,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn shell(script: &str) -> MediaCommand {
        MediaCommand {
            tool: MediaTool::Ffmpeg,
            args: vec!["-c".to_string(), script.to_string()],
        }
    }

    #[tokio::test]
    async fn test_captures_stdout_on_success() {
        let adapter = TokioProcessAdapter::new("sh", "sh");
        let output = adapter
            .run(&shell("echo '{\"frames\":[]}'; echo progress >&2"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(output.stdout.trim(), "{\"frames\":[]}");
        assert_eq!(output.stderr_tail, "progress");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_an_error() {
        let adapter = TokioProcessAdapter::new("sh", "sh");
        let err = adapter
            .run(&shell("echo 'Invalid data' >&2; exit 3"), &CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            SegmentError::ProcessFailed { exit_code, stderr, .. } => {
                assert_eq!(exit_code, Some(3));
                assert_eq!(stderr, "Invalid data");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_latin1_stderr_does_not_fail_run() {
        let adapter = TokioProcessAdapter::new("sh", "sh");
        let output = adapter
            .run(
                &shell("printf 'title: caf\\351\\n' >&2; printf 'done\\n' >&2; exit 0"),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert!(output.stderr_tail.starts_with("title: caf"));
        assert!(output.stderr_tail.ends_with("done"));
    }

    #[tokio::test]
    async fn test_latin1_stderr_kept_in_failure_report() {
        let adapter = TokioProcessAdapter::new("sh", "sh");
        let err = adapter
            .run(&shell("printf 'Input \\377 invalid\\n' >&2; exit 1"), &CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            SegmentError::ProcessFailed { exit_code, stderr, .. } => {
                assert_eq!(exit_code, Some(1));
                assert!(stderr.starts_with("Input "));
                assert!(stderr.ends_with(" invalid"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_non_utf8_stdout_is_a_parse_error() {
        let adapter = TokioProcessAdapter::new("sh", "sh");
        let err = adapter
            .run(&shell("printf '\\377\\n'"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SegmentError::ProbeParse { .. }));
    }

    #[tokio::test]
    async fn test_missing_binary_is_a_spawn_error() {
        let adapter = TokioProcessAdapter::new("/nonexistent/ffmpeg", "/nonexistent/ffprobe");
        let err = adapter
            .run(&shell("true"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SegmentError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_cancel_kills_child() {
        let adapter = TokioProcessAdapter::new("sh", "sh");
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let err = adapter.run(&shell("exec sleep 30"), &cancel).await.unwrap_err();
        assert!(matches!(err, SegmentError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
