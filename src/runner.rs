// Bounded-parallel batch execution

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::models::DownloadJob;
use crate::traits::MediaJobExecutor;

/// Fans a batch of jobs out to one executor under a concurrency cap.
///
/// The batch contract: N independent tasks, one per unit of work, all
/// spawned up front; a counting semaphore keeps at most `limit`
/// external processes alive at once; partial failure is tolerated — a
/// failed or panicked task settles its own slot and never cancels a
/// sibling. The call completes once every task has.
pub struct QueueRunner {
    limit: usize,
}

impl QueueRunner {
    pub const DEFAULT_LIMIT: usize = 5;

    pub fn new(limit: usize) -> Self {
        Self { limit: limit.max(1) }
    }

    /// Run the whole batch to completion and return one outcome string
    /// per job, in job order. Outcomes are logged here; callers that
    /// only care about aggregate completion can ignore the return value.
    pub async fn run(&self, executor: Arc<dyn MediaJobExecutor>, jobs: Vec<DownloadJob>) -> Vec<String> {
        let gate = Arc::new(Semaphore::new(self.limit));
        let mut tasks: JoinSet<(usize, String)> = JoinSet::new();

        let count = jobs.len();
        for (index, job) in jobs.into_iter().enumerate() {
            let gate = Arc::clone(&gate);
            let executor = Arc::clone(&executor);
            tasks.spawn(async move {
                // Hold a permit for the executor's whole lifetime so the
                // external process count stays under the cap.
                let _permit = match gate.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (index, "Download failed: runner shut down".to_string()),
                };
                (index, executor.execute(&job).await)
            });
        }

        let mut outcomes: Vec<Option<String>> = vec![None; count];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    info!(job = index, "{}", outcome);
                    outcomes[index] = Some(outcome);
                }
                Err(e) => {
                    // A panicked task loses its slot but not the batch.
                    error!("download task aborted: {}", e);
                }
            }
        }

        outcomes
            .into_iter()
            .map(|o| o.unwrap_or_else(|| "Download failed: task aborted".to_string()))
            .collect()
    }
}

impl Default for QueueRunner {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobParams;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Executor double that tracks how many executions overlap.
    struct Recording {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl Recording {
        fn new() -> Self {
            Self { in_flight: AtomicUsize::new(0), peak: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl MediaJobExecutor for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn execute(&self, job: &DownloadJob) -> String {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(25)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            format!("done {}", job.title)
        }
    }

    fn jobs(n: usize) -> Vec<DownloadJob> {
        (0..n)
            .map(|i| {
                DownloadJob::new(
                    format!("https://youtu.be/test{}", i),
                    format!("{}", i),
                    JobParams::Thumbnail,
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn never_exceeds_the_concurrency_cap() {
        let executor = Arc::new(Recording::new());
        let runner = QueueRunner::new(5);
        let outcomes = runner.run(executor.clone(), jobs(8)).await;
        assert_eq!(outcomes.len(), 8);
        assert!(
            executor.peak.load(Ordering::SeqCst) <= 5,
            "peak concurrency was {}",
            executor.peak.load(Ordering::SeqCst)
        );
    }

    #[tokio::test]
    async fn outcomes_come_back_in_job_order() {
        let executor = Arc::new(Recording::new());
        let outcomes = QueueRunner::new(3).run(executor, jobs(6)).await;
        let expected: Vec<String> = (0..6).map(|i| format!("done {}", i)).collect();
        assert_eq!(outcomes, expected);
    }

    /// Executor double that fails every other job.
    struct FlakyExecutor;

    #[async_trait]
    impl MediaJobExecutor for FlakyExecutor {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn execute(&self, job: &DownloadJob) -> String {
            let index: usize = job.title.parse().unwrap();
            if index % 2 == 0 {
                "Download failed: simulated".to_string()
            } else {
                "Download completed!".to_string()
            }
        }
    }

    #[tokio::test]
    async fn failures_do_not_cancel_siblings() {
        let outcomes = QueueRunner::default().run(Arc::new(FlakyExecutor), jobs(7)).await;
        assert_eq!(outcomes.len(), 7);
        assert_eq!(outcomes.iter().filter(|o| o.starts_with("Download failed")).count(), 4);
        assert_eq!(outcomes.iter().filter(|o| *o == "Download completed!").count(), 3);
    }

    #[tokio::test]
    async fn empty_batch_completes_immediately() {
        let outcomes = QueueRunner::default().run(Arc::new(FlakyExecutor), Vec::new()).await;
        assert!(outcomes.is_empty());
    }
}
