use std::{
    ffi::OsString,
    io,
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use tokio::{
    io::AsyncWriteExt,
    process::{Child, Command},
    time::timeout,
};

/// How long ffmpeg gets to finalize the output file after a Ctrl-C before it
/// is killed outright.
const STOP_GRACE: Duration = Duration::from_secs(10);

#[derive(thiserror::Error, Debug)]
pub enum FfmpegError {
    #[error("I/O error")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The capture process exited on its own (stream ended).
    Completed,
    /// Ctrl-C; the capture process was asked to finish the file and stopped.
    Interrupted,
    /// The capture executable could not be launched.
    ToolMissing,
}

/// Records a resolved stream URL to disk by invoking ffmpeg.
pub struct Recorder {
    program: PathBuf,
}

impl Recorder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Copies the stream to `output` until the source ends or Ctrl-C.
    ///
    /// A missing executable is reported and collapsed to
    /// [`RecordOutcome::ToolMissing`] rather than an error, so one bad path
    /// does not crash the caller after a long wait for the stream.
    pub async fn record(
        &self,
        stream_url: &str,
        output: &Path,
    ) -> Result<RecordOutcome, FfmpegError> {
        let mut cmd = Command::new(&self.program);
        // stdin stays open so a graceful "q" can be sent on interrupt
        cmd.args(capture_args(stream_url, output))
            .stdin(Stdio::piped());

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                error!("capture tool not found at {}", self.program.display());
                return Ok(RecordOutcome::ToolMissing);
            }
            Err(e) => return Err(e.into()),
        };

        let status = tokio::select! {
            status = child.wait() => Some(status?),
            _ = tokio::signal::ctrl_c() => None,
        };

        match status {
            Some(status) => {
                if !status.success() {
                    warn!("capture tool exited with {}", status);
                }
                Ok(RecordOutcome::Completed)
            }
            None => {
                println!("\nRecording interrupted by user. Stopping...");
                self.stop(&mut child).await?;
                Ok(RecordOutcome::Interrupted)
            }
        }
    }

    /// Asks ffmpeg to finish the output file before giving up on it.
    async fn stop(&self, child: &mut Child) -> io::Result<()> {
        if let Some(mut stdin) = child.stdin.take() {
            // "q" is ffmpeg's graceful quit; dropping stdin closes the pipe
            let _ = stdin.write_all(b"q").await;
            let _ = stdin.flush().await;
        }
        if timeout(STOP_GRACE, child.wait()).await.is_err() {
            child.start_kill()?;
            child.wait().await?;
        }
        Ok(())
    }
}

fn capture_args(stream_url: &str, output: &Path) -> Vec<OsString> {
    vec![
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        // overwrite the output file without prompting
        "-y".into(),
        "-i".into(),
        stream_url.into(),
        // copy codecs, no re-encoding
        "-c".into(),
        "copy".into(),
        output.into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_args_are_exact() {
        let args = capture_args("http://example/stream", Path::new("out.mp4"));
        let expected: Vec<OsString> = [
            "-hide_banner",
            "-loglevel",
            "error",
            "-y",
            "-i",
            "http://example/stream",
            "-c",
            "copy",
            "out.mp4",
        ]
        .iter()
        .map(OsString::from)
        .collect();
        assert_eq!(args, expected);
    }

    #[tokio::test]
    async fn missing_tool_is_reported_not_raised() {
        let recorder = Recorder::new("/nonexistent/bin/ffmpeg");
        let outcome = recorder
            .record("http://example/stream", Path::new("out.mp4"))
            .await
            .expect("missing tool must not raise");
        assert_eq!(outcome, RecordOutcome::ToolMissing);
    }

    #[cfg(unix)]
    fn write_script(name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let dir = std::env::temp_dir().join(format!("livecap-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("could not create temp dir");
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("could not write script");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("could not chmod script");
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stop_requests_graceful_quit_first() {
        let stdin_file = std::env::temp_dir().join(format!(
            "livecap-test-{}-capture-stdin.txt",
            std::process::id()
        ));
        // exits once stdin is consumed, like ffmpeg reacting to "q"
        let script = write_script(
            "ffmpeg-quits.sh",
            &format!(r#"cat > "{}""#, stdin_file.display()),
        );

        let mut child = Command::new(&script)
            .stdin(Stdio::piped())
            .spawn()
            .expect("could not spawn capture stand-in");
        Recorder::new(script)
            .stop(&mut child)
            .await
            .expect("stop should not raise");

        assert!(
            child.try_wait().expect("child state is known").is_some(),
            "child was not reaped"
        );
        let received = std::fs::read_to_string(&stdin_file).expect("child saw its stdin");
        assert_eq!(received, "q");
        let _ = std::fs::remove_file(&stdin_file);
    }

    #[cfg(unix)]
    #[tokio::test(start_paused = true)]
    async fn unresponsive_capture_tool_is_killed_after_grace() {
        // never reads stdin, never exits on its own
        let script = write_script("ffmpeg-stuck.sh", "sleep 1000");

        let mut child = Command::new(&script)
            .stdin(Stdio::piped())
            .spawn()
            .expect("could not spawn capture stand-in");
        let start = tokio::time::Instant::now();
        Recorder::new(script)
            .stop(&mut child)
            .await
            .expect("stop should not raise");

        assert!(start.elapsed() >= STOP_GRACE, "grace period was skipped");
        assert!(
            child.try_wait().expect("child state is known").is_some(),
            "child was not reaped"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn capture_tool_gets_exact_handle_and_path() {
        let args_file = std::env::temp_dir().join(format!(
            "livecap-test-{}-capture-args.txt",
            std::process::id()
        ));
        let script = write_script(
            "ffmpeg-argv.sh",
            &format!(r#"printf '%s\n' "$@" > "{}""#, args_file.display()),
        );

        let recorder = Recorder::new(script);
        let outcome = recorder
            .record(
                "http://example/stream",
                Path::new("/tmp/recorded_stream.mp4"),
            )
            .await
            .expect("capture should run");
        assert_eq!(outcome, RecordOutcome::Completed);

        let argv = std::fs::read_to_string(&args_file).expect("capture tool wrote its argv");
        let lines: Vec<&str> = argv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "-hide_banner",
                "-loglevel",
                "error",
                "-y",
                "-i",
                "http://example/stream",
                "-c",
                "copy",
                "/tmp/recorded_stream.mp4",
            ]
        );
        let _ = std::fs::remove_file(&args_file);
    }
}
