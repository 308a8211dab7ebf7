//! Background metadata refresh. Fetches until the project is ready to watch,
//! delivering each result to the UI thread over a channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, Sender};

use crate::services::dubbing::ProjectClient;
use crate::types::project::ProjectMetadata;

const STOP_CHECK_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq)]
pub enum MetadataUpdate {
    Fetched(ProjectMetadata),
    Failed(String),
}

pub struct MetadataPoller {
    receiver: Receiver<MetadataUpdate>,
    stop: Arc<AtomicBool>,
}

impl MetadataPoller {
    pub fn spawn(
        client: Box<dyn ProjectClient>,
        project_id: String,
        interval: Duration,
    ) -> std::io::Result<Self> {
        let (sender, receiver) = channel::unbounded();
        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = stop.clone();

        thread::Builder::new()
            .name("metadata-poller".to_string())
            .spawn(move || poll_loop(client, &project_id, interval, &sender, &worker_stop))?;

        Ok(Self { receiver, stop })
    }

    /// Updates received since the last call, oldest first.
    pub fn drain(&self) -> Vec<MetadataUpdate> {
        self.receiver.try_iter().collect()
    }
}

impl Drop for MetadataPoller {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

fn poll_loop(
    client: Box<dyn ProjectClient>,
    project_id: &str,
    interval: Duration,
    sender: &Sender<MetadataUpdate>,
    stop: &AtomicBool,
) {
    log::info!("Polling metadata for project {}", project_id);
    while !stop.load(Ordering::Relaxed) {
        let keep_polling = match client.fetch_project(project_id) {
            Ok(metadata) => {
                let ready = metadata.status.is_ready();
                log::debug!("Project {} status {:?}", project_id, metadata.status);
                sender.send(MetadataUpdate::Fetched(metadata)).is_ok() && !ready
            }
            Err(err) => {
                log::warn!("Metadata fetch for {} failed: {}", project_id, err);
                sender.send(MetadataUpdate::Failed(err.to_string())).is_ok() && err.is_retryable()
            }
        };
        if !keep_polling {
            break;
        }

        let wake_at = Instant::now() + interval;
        while Instant::now() < wake_at {
            if stop.load(Ordering::Relaxed) {
                return;
            }
            thread::sleep(STOP_CHECK_INTERVAL.min(interval));
        }
    }
    log::debug!("Metadata poller for {} finished", project_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ServiceError, ServiceResult};
    use crate::types::project::ProjectStatus;
    use std::sync::Mutex;

    struct ScriptedClient {
        responses: Mutex<Vec<ServiceResult<ProjectMetadata>>>,
    }

    impl ProjectClient for ScriptedClient {
        fn fetch_project(&self, _id: &str) -> ServiceResult<ProjectMetadata> {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Err(ServiceError::NotFound("exhausted".into()))
            } else {
                responses.remove(0)
            }
        }
    }

    fn meta(status: ProjectStatus) -> ProjectMetadata {
        ProjectMetadata {
            id: "p1".into(),
            status,
            target_languages: vec!["fr".into()],
        }
    }

    fn collect(poller: &MetadataPoller, count: usize) -> Vec<MetadataUpdate> {
        let mut updates = Vec::new();
        while updates.len() < count {
            match poller.receiver.recv_timeout(Duration::from_secs(2)) {
                Ok(update) => updates.push(update),
                Err(_) => break,
            }
        }
        updates
    }

    #[test]
    fn test_polls_until_dubbed() {
        let client = ScriptedClient {
            responses: Mutex::new(vec![
                Ok(meta(ProjectStatus::Dubbing)),
                Err(ServiceError::Http("timeout".into())),
                Ok(meta(ProjectStatus::Dubbed)),
                Ok(meta(ProjectStatus::Dubbed)),
            ]),
        };
        let poller =
            MetadataPoller::spawn(Box::new(client), "p1".into(), Duration::from_millis(5)).unwrap();

        let updates = collect(&poller, 3);
        assert_eq!(updates.len(), 3);
        assert_eq!(updates[0], MetadataUpdate::Fetched(meta(ProjectStatus::Dubbing)));
        assert!(matches!(updates[1], MetadataUpdate::Failed(_)));
        assert_eq!(updates[2], MetadataUpdate::Fetched(meta(ProjectStatus::Dubbed)));

        // Stops after the ready status: nothing further arrives.
        assert!(poller.receiver.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn test_stops_on_missing_project() {
        let client = ScriptedClient {
            responses: Mutex::new(vec![Err(ServiceError::NotFound("p1".into()))]),
        };
        let poller =
            MetadataPoller::spawn(Box::new(client), "p1".into(), Duration::from_millis(5)).unwrap();

        let updates = collect(&poller, 1);
        assert!(matches!(&updates[..], [MetadataUpdate::Failed(msg)] if msg.contains("not found")));
        assert!(poller.receiver.recv_timeout(Duration::from_millis(100)).is_err());
    }
}
