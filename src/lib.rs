//! # livecap
//!
//! Watch a livestream page until a broadcast goes live, then record it to a
//! local file. The real work is delegated to two external tools: yt-dlp
//! resolves the page into a direct stream URL once a broadcast is active,
//! and ffmpeg copies the stream to disk without re-encoding.
//!
//! ```no_run
//! use livecap::{ffmpeg::Recorder, poll::{self, PollPolicy}, ytdlp::Resolver};
//! use std::{path::Path, time::Duration};
//!
//! #[tokio::main]
//! async fn main() {
//!     // Resolver invokes `yt-dlp -g` against the page; extra arguments
//!     // (cookies, user agent, ...) are passed through verbatim
//!     let resolver = Resolver::new(
//!         "yt-dlp",
//!         "https://www.youtube.com/@NASA/live",
//!         Vec::new(),
//!         Duration::from_secs(60),
//!     );
//!
//!     // Check every 30 seconds until the stream goes live
//!     let url = poll::wait_for_stream(&resolver, &PollPolicy::default())
//!         .await
//!         .unwrap();
//!
//!     // Copy the stream to disk until it ends or Ctrl-C
//!     let recorder = Recorder::new("ffmpeg");
//!     recorder
//!         .record(&url, Path::new("recorded_stream.mp4"))
//!         .await
//!         .unwrap();
//! }
//! ```

#[forbid(unsafe_code)]
#[macro_use]
extern crate log;

pub mod config;
pub mod ffmpeg;
pub mod poll;
pub mod ytdlp;
