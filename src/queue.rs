// Per-kind download queues and batch dispatch

use std::collections::HashMap;
use std::mem;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::executors::{AudioDownloader, TagExtractor, ThumbnailDownloader, VideoDownloader};
use crate::link::LinkNormalizer;
use crate::models::{
    DownloadJob, JobParams, QueueItem, QueueKind, Quality, ToolConfig, VideoQueueEntry,
};
use crate::paths::{PathResolver, SettingsPathResolver};
use crate::runner::QueueRunner;
use crate::traits::{CallLog, Clipboard, LogProgress, MediaJobExecutor, NoClipboard, ProgressSink, TracingCallLog};

/// Holds up to five pending entries per media kind and turns each
/// batch into a bounded-parallel run. Every public method returns a
/// plain message string; nothing here returns `Err` or panics for
/// documented input.
///
/// Each kind's collection goes `EMPTY → PENDING(n) → EMPTY`: entries
/// exist from a successful `add_*` until `start_queue` drains them,
/// and draining happens whether or not the individual jobs succeed.
/// The queue itself is long-lived and reusable across batches.
pub struct DownloadQueue {
    max_downloads: usize,
    videos: Vec<VideoQueueEntry>,
    mp3_queue: Vec<QueueItem>,
    wav_queue: Vec<QueueItem>,
    thumbnail_queue: Vec<QueueItem>,
    tags_queue: Vec<QueueItem>,
    executors: HashMap<QueueKind, Arc<dyn MediaJobExecutor>>,
    runner: QueueRunner,
    calls: Arc<dyn CallLog>,
}

/// Shared add path for the four single-valued collections: dedup by
/// link, then capacity, then append.
fn add_single(
    items: &mut Vec<QueueItem>,
    max: usize,
    label: &str,
    link: &Value,
    title: &str,
) -> String {
    let Some(link) = LinkNormalizer::canonicalize(link) else {
        return "Invalid link provided.".to_string();
    };
    if items.iter().any(|item| item.link == link) {
        return format!("{} already in queue.", label);
    }
    if items.len() >= max {
        return "Queue limit reached.".to_string();
    }
    items.push(QueueItem { link, title: title.to_string() });
    format!("{} added to queue.", label)
}

impl DownloadQueue {
    /// Queue with the default collaborators: settings-file path
    /// resolution, tracing-backed progress and call logging, no
    /// clipboard.
    pub fn new(tools: ToolConfig) -> Self {
        Self::with_collaborators(
            tools,
            Arc::new(SettingsPathResolver::new()),
            Arc::new(LogProgress),
            Arc::new(NoClipboard),
            Arc::new(TracingCallLog),
        )
    }

    /// Queue with every collaborator supplied by the embedder.
    pub fn with_collaborators(
        tools: ToolConfig,
        paths: Arc<dyn PathResolver>,
        progress: Arc<dyn ProgressSink>,
        clipboard: Arc<dyn Clipboard>,
        calls: Arc<dyn CallLog>,
    ) -> Self {
        let video = Arc::new(VideoDownloader::new(tools.clone(), paths.clone(), progress.clone()));
        let audio = Arc::new(AudioDownloader::new(tools.clone(), paths.clone(), progress.clone()));
        let thumbnail =
            Arc::new(ThumbnailDownloader::new(tools.clone(), paths.clone(), progress));
        let tags = Arc::new(TagExtractor::new(tools, paths, clipboard));

        let mut executors: HashMap<QueueKind, Arc<dyn MediaJobExecutor>> = HashMap::new();
        executors.insert(QueueKind::Video, video);
        executors.insert(QueueKind::Mp3Audio, audio.clone());
        executors.insert(QueueKind::WavAudio, audio);
        executors.insert(QueueKind::Thumbnail, thumbnail);
        executors.insert(QueueKind::Tags, tags);

        Self {
            max_downloads: QueueRunner::DEFAULT_LIMIT,
            videos: Vec::new(),
            mp3_queue: Vec::new(),
            wav_queue: Vec::new(),
            thumbnail_queue: Vec::new(),
            tags_queue: Vec::new(),
            executors,
            runner: QueueRunner::default(),
            calls,
        }
    }

    /// Swap the executor for one kind (test doubles, alternative tools).
    pub fn set_executor(&mut self, kind: QueueKind, executor: Arc<dyn MediaJobExecutor>) {
        self.executors.insert(kind, executor);
    }

    /// Number of pending entries for a kind. For video this counts
    /// `(link, quality)` pairs, not distinct links.
    pub fn pending(&self, kind: QueueKind) -> usize {
        match kind {
            QueueKind::Video => self.videos.len(),
            QueueKind::Mp3Audio => self.mp3_queue.len(),
            QueueKind::WavAudio => self.wav_queue.len(),
            QueueKind::Thumbnail => self.thumbnail_queue.len(),
            QueueKind::Tags => self.tags_queue.len(),
        }
    }

    /// Queue a video at one exact quality. The same link may be queued
    /// again with a different quality; the exact pair may not.
    pub fn add_video(&mut self, link: &Value, quality: &Value, title: &str) -> String {
        let result = self.try_add_video(link, quality, title);
        self.calls
            .record("add_video", &format!("{}, {}, {:?}", link, quality, title), &result);
        result
    }

    fn try_add_video(&mut self, link: &Value, quality: &Value, title: &str) -> String {
        let Some(link) = LinkNormalizer::canonicalize(link) else {
            return "Invalid link provided.".to_string();
        };
        let Some(quality) = Quality::parse(quality) else {
            return "Incorrect video quality.".to_string();
        };
        if self.videos.len() >= self.max_downloads {
            return "Queue limit reached.".to_string();
        }
        if self
            .videos
            .iter()
            .any(|entry| entry.link == link && entry.quality == quality)
        {
            return "Video with this quality already in queue.".to_string();
        }
        self.videos.push(VideoQueueEntry { link, quality, title: title.to_string() });
        "Video added to queue.".to_string()
    }

    pub fn add_mp3_audio(&mut self, link: &Value, title: &str) -> String {
        let result = add_single(&mut self.mp3_queue, self.max_downloads, "Audio", link, title);
        self.calls
            .record("add_mp3_audio", &format!("{}, {:?}", link, title), &result);
        result
    }

    pub fn add_wav_audio(&mut self, link: &Value, title: &str) -> String {
        let result = add_single(&mut self.wav_queue, self.max_downloads, "Audio", link, title);
        self.calls
            .record("add_wav_audio", &format!("{}, {:?}", link, title), &result);
        result
    }

    pub fn add_thumbnail(&mut self, link: &Value, title: &str) -> String {
        let result = add_single(
            &mut self.thumbnail_queue,
            self.max_downloads,
            "Thumbnail",
            link,
            title,
        );
        self.calls
            .record("add_thumbnail", &format!("{}, {:?}", link, title), &result);
        result
    }

    pub fn add_tags(&mut self, link: &Value, title: &str) -> String {
        let result = add_single(&mut self.tags_queue, self.max_downloads, "Tags", link, title);
        self.calls
            .record("add_tags", &format!("{}, {:?}", link, title), &result);
        result
    }

    /// Dispatch one kind's batch. Recognized tokens: `mp4`, `mp3`,
    /// `wav`, `jpg`, `csv`. The collection is drained up front, so it
    /// is empty afterwards regardless of per-job outcomes and can be
    /// refilled while the batch is still running.
    pub async fn start_queue(&mut self, queue_type: &str) -> String {
        let result = self.run_queue(queue_type).await;
        self.calls.record("start_queue", queue_type, &result);
        result
    }

    async fn run_queue(&mut self, queue_type: &str) -> String {
        let Some(kind) = QueueKind::parse(queue_type) else {
            return "Invalid queue type.".to_string();
        };

        let jobs: Vec<DownloadJob> = match kind {
            QueueKind::Video => mem::take(&mut self.videos)
                .into_iter()
                .map(|entry| DownloadJob {
                    link: Value::String(entry.link),
                    title: entry.title,
                    params: JobParams::Video { quality: json!(entry.quality.height()) },
                })
                .collect(),
            _ => {
                let params = match kind {
                    QueueKind::Mp3Audio => JobParams::Audio { format: "mp3".to_string() },
                    QueueKind::WavAudio => JobParams::Audio { format: "wav".to_string() },
                    QueueKind::Thumbnail => JobParams::Thumbnail,
                    // Batch runs never touch the clipboard; direct
                    // extract calls may opt in.
                    _ => JobParams::Tags { copy: false },
                };
                let items = match kind {
                    QueueKind::Mp3Audio => &mut self.mp3_queue,
                    QueueKind::WavAudio => &mut self.wav_queue,
                    QueueKind::Thumbnail => &mut self.thumbnail_queue,
                    _ => &mut self.tags_queue,
                };
                mem::take(items)
                    .into_iter()
                    .map(|item| DownloadJob {
                        link: Value::String(item.link),
                        title: item.title,
                        params: params.clone(),
                    })
                    .collect()
            }
        };

        if jobs.is_empty() {
            return "Nothing to download, queue is empty.".to_string();
        }

        let Some(executor) = self.executors.get(&kind).cloned() else {
            return "Invalid queue type.".to_string();
        };
        self.runner.run(executor, jobs).await;

        format!("All {} downloads have been finished.", kind.token())
    }
}
