use std::{io, path::PathBuf, process::Stdio, time::Duration};

use tokio::time::timeout;

/// Schemes accepted as a resolved stream URL.
const ACCEPTED_SCHEMES: [&str; 2] = ["http://", "https://"];

#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    #[error("extraction tool not found at {0}")]
    ToolNotFound(PathBuf),
    #[error("could not run extraction tool: {0}")]
    Spawn(#[from] io::Error),
    #[error("extraction tool exited with {0}")]
    ExitStatus(std::process::ExitStatus),
    #[error("extraction tool did not finish within {0:?}")]
    TimedOut(Duration),
    #[error("extraction tool printed no stream URL")]
    NoStreamUrl,
}

/// Seam the poller resolves through, so tests can substitute a stub.
#[async_trait::async_trait]
pub trait ResolveStream {
    /// `None` means "no stream currently available". Failures never escape
    /// this method; they are logged and collapse to `None`.
    async fn resolve(&self) -> Option<String>;
}

/// Resolves a page URL into a direct stream URL by invoking yt-dlp.
pub struct Resolver {
    program: PathBuf,
    page_url: String,
    extra_args: Vec<String>,
    timeout: Duration,
}

impl Resolver {
    pub fn new(
        program: impl Into<PathBuf>,
        page_url: impl Into<String>,
        extra_args: Vec<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            page_url: page_url.into(),
            extra_args,
            timeout,
        }
    }

    fn args(&self) -> Vec<String> {
        // -g prints the direct media URL instead of downloading
        let mut args = vec![
            "--no-warnings".to_string(),
            "--no-playlist".to_string(),
            "-g".to_string(),
        ];
        args.extend(self.extra_args.iter().cloned());
        args.push(self.page_url.clone());
        args
    }

    pub async fn try_resolve(&self) -> Result<String, ResolveError> {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let run = async {
            cmd.output().await.map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    ResolveError::ToolNotFound(self.program.clone())
                } else {
                    ResolveError::Spawn(e)
                }
            })
        };

        // kill_on_drop reaps the child if the timeout wins
        let output = match timeout(self.timeout, run).await {
            Ok(result) => result?,
            Err(_) => return Err(ResolveError::TimedOut(self.timeout)),
        };

        if !output.status.success() {
            return Err(ResolveError::ExitStatus(output.status));
        }

        parse_stream_url(&String::from_utf8_lossy(&output.stdout))
            .ok_or(ResolveError::NoStreamUrl)
    }
}

#[async_trait::async_trait]
impl ResolveStream for Resolver {
    async fn resolve(&self) -> Option<String> {
        match self.try_resolve().await {
            Ok(url) => Some(url),
            // A non-zero exit is the routine "not currently live" case
            Err(ResolveError::ExitStatus(status)) => {
                debug!("extraction tool exited with {}", status);
                None
            }
            Err(e @ ResolveError::ToolNotFound(_)) => {
                error!("{}", e);
                None
            }
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }
}

/// yt-dlp may print one URL per stream; the first non-empty line wins.
fn parse_stream_url(stdout: &str) -> Option<String> {
    let line = stdout.lines().map(str::trim).find(|l| !l.is_empty())?;
    ACCEPTED_SCHEMES
        .iter()
        .any(|scheme| line.starts_with(scheme))
        .then(|| line.to_string())
}
