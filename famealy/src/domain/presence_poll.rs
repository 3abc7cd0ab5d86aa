//! Periodic refresh of family member statuses.
//!
//! Stands in for real-time sync: while the dashboard is visible a task
//! re-reads the family roster on a fixed interval. The task belongs to the
//! [`PresencePoll`] handle and stops when the handle is stopped or dropped.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::family::FamilyId;
use super::family_directory::FamilyDirectoryService;
use super::user::User;

/// Default time between roster refreshes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Starts member polls for a family.
#[derive(Clone)]
pub struct PresencePoller {
    directory: FamilyDirectoryService,
    interval: Duration,
}

impl PresencePoller {
    /// Poll through `directory` every `interval`.
    ///
    /// A zero interval is replaced with [`DEFAULT_POLL_INTERVAL`].
    pub fn new(directory: FamilyDirectoryService, interval: Duration) -> Self {
        let period = if interval.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            interval
        };
        Self {
            directory,
            interval: period,
        }
    }

    /// Time between refreshes.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn a poll of `family_id`'s members.
    ///
    /// The first fetch happens immediately. Failed fetches are logged and
    /// the last good member list is kept. Must be called inside a tokio
    /// runtime.
    pub fn start(&self, family_id: FamilyId) -> PresencePoll {
        let (sender, members) = watch::channel(Vec::new());
        let directory = self.directory.clone();
        let period = self.interval;
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match directory.members_of(&family_id).await {
                    Ok(latest) => {
                        debug!(%family_id, members = latest.len(), "refreshed family members");
                        sender.send_replace(latest);
                    }
                    Err(error) => {
                        warn!(%family_id, %error, "family member refresh failed");
                    }
                }
            }
        });
        PresencePoll { members, task }
    }
}

/// Handle to a running member poll.
///
/// Dropping the handle stops the poll.
#[derive(Debug)]
pub struct PresencePoll {
    members: watch::Receiver<Vec<User>>,
    task: JoinHandle<()>,
}

impl PresencePoll {
    /// Members from the latest successful refresh.
    pub fn members(&self) -> Vec<User> {
        self.members.borrow().clone()
    }

    /// Follow refreshes.
    pub fn subscribe(&self) -> watch::Receiver<Vec<User>> {
        self.members.clone()
    }

    /// Whether the polling task has ended.
    pub fn is_stopped(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop polling; no further reads are scheduled.
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for PresencePoll {
    fn drop(&mut self) {
        self.task.abort();
    }
}
