// vidgrab - queued YouTube media extraction core
//
// Five per-kind queues (video, mp3, wav, thumbnail, tags) dispatched
// with bounded concurrency against an external yt-dlp binary. The GUI,
// settings store, clipboard and call logging are collaborators behind
// ports; this crate owns the queue state machine, the concurrency
// engine, and the per-kind job contracts.

pub mod errors;
pub mod executors;
pub mod info;
pub mod link;
pub mod logging;
pub mod models;
pub mod paths;
pub mod process;
pub mod progress;
pub mod queue;
pub mod runner;
pub mod traits;

pub use errors::DownloadError;
pub use info::{VideoDetails, VideoProbe};
pub use link::LinkNormalizer;
pub use models::{
    AudioFormat, DownloadJob, DownloadProgress, JobParams, Quality, QueueItem, QueueKind,
    ToolConfig, VideoQueueEntry,
};
pub use paths::{PathResolver, SettingsPathResolver};
pub use queue::DownloadQueue;
pub use runner::QueueRunner;
pub use traits::{CallLog, Clipboard, MediaJobExecutor, ProgressSink};
