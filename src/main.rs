use std::{path::PathBuf, process, time::Duration};

use clap::Parser;
use livecap::{
    config::Config,
    ffmpeg::{RecordOutcome, Recorder},
    poll::{self, PollPolicy},
    ytdlp::Resolver,
};

#[derive(Parser, Debug)]
#[command(version, about = "Wait for a livestream to go live and record it with ffmpeg")]
struct Args {
    /// URL of the page to watch (for YouTube, use the channel's /live page)
    page_url: String,

    /// Seconds between livestream checks
    #[arg(short, long, default_value_t = 30)]
    interval: u64,

    /// Give up after this many checks (default: poll forever)
    #[arg(long, value_name = "N")]
    max_attempts: Option<u32>,

    /// Double the wait after every missed check instead of a fixed interval
    #[arg(long)]
    backoff: bool,

    /// File to record the stream into
    #[arg(short, long, default_value = "recorded_stream.mp4")]
    output: PathBuf,

    /// Path to the ffmpeg executable
    #[arg(long, default_value = "ffmpeg", value_name = "PATH")]
    ffmpeg: PathBuf,

    /// Path to the yt-dlp executable
    #[arg(long, default_value = "yt-dlp", value_name = "PATH")]
    ytdlp: PathBuf,

    /// Extra argument passed through to yt-dlp, repeatable
    /// (e.g. --ytdlp-arg=--cookies --ytdlp-arg=cookies.txt)
    #[arg(long = "ytdlp-arg", value_name = "ARG")]
    ytdlp_args: Vec<String>,

    /// Seconds a single yt-dlp invocation may run before it is killed
    #[arg(long, default_value_t = 60, value_name = "SECS")]
    resolve_timeout: u64,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            page_url: args.page_url,
            poll_interval: Duration::from_secs(args.interval),
            max_attempts: args.max_attempts,
            backoff: args.backoff,
            output: args.output,
            ffmpeg_path: args.ffmpeg,
            ytdlp_path: args.ytdlp,
            ytdlp_args: args.ytdlp_args,
            resolve_timeout: Duration::from_secs(args.resolve_timeout),
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from(Args::parse());
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let resolver = Resolver::new(
        config.ytdlp_path.clone(),
        config.page_url.clone(),
        config.ytdlp_args.clone(),
        config.resolve_timeout,
    );
    let policy = PollPolicy {
        interval: config.poll_interval,
        max_attempts: config.max_attempts,
        backoff: config.backoff,
    };

    println!("Watching page: {}", config.page_url);
    let stream_url = match poll::wait_for_stream(&resolver, &policy).await {
        Ok(url) => url,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    println!("Livestream detected! URL: {}", stream_url);

    println!("Starting recording to {}...", config.output.display());
    let recorder = Recorder::new(config.ffmpeg_path.clone());
    match recorder.record(&stream_url, &config.output).await {
        // diagnostic already printed; nothing was recorded
        Ok(RecordOutcome::ToolMissing) => {}
        Ok(_) => println!("Recording ended. File saved as {}", config.output.display()),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
