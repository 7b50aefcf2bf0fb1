//! Bounded download pool
//!
//! Every download runs as a task on the client runtime and holds one permit of
//! a shared semaphore while transferring, so at most `max_concurrent_downloads`
//! transfers are active at once. Bytes go to `<destination>.part` and the file
//! is renamed into place once complete.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::drivers::Fetcher;
use crate::errors::{DiscoError, Result};
use crate::events::{Event, EventBus};

/// Handle to a submitted download
#[derive(Debug)]
pub struct DownloadHandle {
    id: Uuid,
    destination: PathBuf,
    task: JoinHandle<Result<u64>>,
}

impl DownloadHandle {
    /// Id carried by every event of this download
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Abort the transfer
    ///
    /// The `.part` file is removed and `DownloadFailed` is announced once the
    /// task has been torn down, so `wait` observes both.
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for completion and return the number of bytes written
    pub async fn wait(self) -> Result<u64> {
        match self.task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(DiscoError::Cancelled(self.id.to_string())),
            Err(e) => Err(DiscoError::Download(format!("download task failed: {}", e))),
        }
    }
}

/// Shared pool of download workers
#[derive(Clone)]
pub struct DownloadPool {
    fetcher: Arc<dyn Fetcher>,
    events: EventBus,
    permits: Arc<Semaphore>,
    handle: Handle,
}

impl std::fmt::Debug for DownloadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadPool")
            .field("available_slots", &self.available_slots())
            .finish()
    }
}

impl DownloadPool {
    /// Create a pool with `max_concurrent` worker slots on the given runtime
    pub fn new(fetcher: Arc<dyn Fetcher>, events: EventBus, max_concurrent: usize, handle: Handle) -> Self {
        Self {
            fetcher,
            events,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            handle,
        }
    }

    /// Worker slots not currently in use
    pub fn available_slots(&self) -> usize {
        self.permits.available_permits()
    }

    /// Queue a download of `url` into `destination`
    ///
    /// Returns immediately. Progress is reported through the event bus as
    /// `DownloadStarted`, `DownloadProgress`, then `DownloadFinished` or
    /// `DownloadFailed`.
    pub fn submit(&self, url: impl Into<String>, destination: impl Into<PathBuf>) -> DownloadHandle {
        let id = Uuid::new_v4();
        let url = url.into();
        let destination = destination.into();

        let fetcher = Arc::clone(&self.fetcher);
        let events = self.events.clone();
        let permits = Arc::clone(&self.permits);
        let target = destination.clone();

        let mut pending = PendingDownload {
            id,
            part: part_path(&destination),
            events: events.clone(),
            settled: false,
        };

        debug!("Queued download {} of {}", id, url);
        let task = self.handle.spawn(async move {
            let result = match permits.acquire_owned().await {
                Ok(_permit) => transfer(fetcher.as_ref(), &events, id, &url, &target).await,
                Err(_) => Err(DiscoError::Download("download pool closed".to_string())),
            };
            pending.settled = true;

            match result {
                Ok(bytes) => {
                    info!("Downloaded {} bytes from {} to {}", bytes, url, target.display());
                    events.announce(&Event::DownloadFinished {
                        id,
                        path: target,
                        bytes,
                    });
                    Ok(bytes)
                }
                Err(e) => {
                    warn!("Download of {} failed: {}", url, e);
                    let _ = tokio::fs::remove_file(part_path(&target)).await;
                    events.announce(&Event::DownloadFailed {
                        id,
                        reason: e.to_string(),
                    });
                    Err(e)
                }
            }
        });

        DownloadHandle {
            id,
            destination,
            task,
        }
    }
}

/// Settles a download whose task is dropped before it finishes
struct PendingDownload {
    id: Uuid,
    part: PathBuf,
    events: EventBus,
    settled: bool,
}

impl Drop for PendingDownload {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        debug!("Download {} cancelled", self.id);
        if let Err(e) = std::fs::remove_file(&self.part) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Could not remove {}: {}", self.part.display(), e);
            }
        }
        self.events.announce(&Event::DownloadFailed {
            id: self.id,
            reason: DiscoError::Cancelled(self.id.to_string()).to_string(),
        });
    }
}

fn part_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

async fn transfer(
    fetcher: &dyn Fetcher,
    events: &EventBus,
    id: Uuid,
    url: &str,
    destination: &Path,
) -> Result<u64> {
    let mut stream = fetcher.open(url).await?;
    let size = stream.content_length();
    events.announce(&Event::DownloadStarted {
        id,
        url: url.to_string(),
        size,
    });

    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let part = part_path(destination);
    let mut file = tokio::fs::File::create(&part).await?;
    let mut bytes_read = 0u64;

    while let Some(chunk) = stream.next_chunk().await? {
        file.write_all(&chunk).await?;
        bytes_read += chunk.len() as u64;
        events.announce(&Event::DownloadProgress {
            id,
            bytes_read,
            size,
        });
    }

    file.flush().await?;
    drop(file);
    tokio::fs::rename(&part, destination).await?;
    Ok(bytes_read)
}
