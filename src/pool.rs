use std::sync::Arc;

use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
};
use tracing::{debug, error};

use crate::source::TileSource;
use crate::task::FetchTask;

/// A fixed set of workers fetching tiles from a shared queue.
///
/// Submitting never blocks, the queue is unbounded. [`WorkerPool::join`]
/// closes the queue and waits until every queued task has been executed.
pub struct WorkerPool {
    queue: mpsc::UnboundedSender<FetchTask>,
    workers: Vec<JoinHandle<usize>>,
}

impl WorkerPool {
    /// Spawns `size` workers on the current runtime. At least one worker is
    /// always spawned.
    pub fn new<S: TileSource>(size: usize, source: Arc<S>) -> Self {
        let (queue, receiver) = mpsc::unbounded_channel::<FetchTask>();
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..size.max(1))
            .map(|id| {
                let receiver = Arc::clone(&receiver);
                let source = Arc::clone(&source);

                tokio::spawn(async move {
                    let mut failed = 0;
                    loop {
                        // the lock is only held while waiting for the next task
                        let task = receiver.lock().await.recv().await;
                        let task = match task {
                            Some(task) => task,
                            None => break,
                        };

                        if task.execute(source.as_ref()).await.is_failed() {
                            failed += 1;
                        }
                    }

                    debug!("worker {} finished, {} failed tiles", id, failed);
                    failed
                })
            })
            .collect();

        Self { queue, workers }
    }

    /// Queues `task` for the next free worker.
    pub fn submit(&self, task: FetchTask) {
        // workers only stop once the queue is closed in `join`
        if let Err(rejected) = self.queue.send(task) {
            error!("worker pool is gone, dropping tile {}", rejected.0.tile);
        }
    }

    /// Closes the queue and waits for all queued and running tasks.
    ///
    /// Returns the number of tasks that failed.
    pub async fn join(self) -> usize {
        drop(self.queue);

        let mut failed = 0;
        for worker in self.workers {
            match worker.await {
                Ok(n) => failed += n,
                Err(e) => error!("tile worker panicked: {}", e),
            }
        }

        failed
    }
}
