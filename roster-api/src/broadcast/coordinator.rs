//! Broadcast coordinator
//!
//! After every successful mutation the coordinator re-reads the full roster
//! and pushes it to every subscriber as one [`RosterSnapshot`]. Nothing is
//! coalesced: each trigger produces its own snapshot.
//!
//! The re-read and the send happen under one async lock, and the sequence is
//! assigned under the same lock, so snapshots reach subscribers in the order
//! they were read from the store.

use roster_common::events::RosterSnapshot;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

use crate::db::students;

/// Fan-out of roster snapshots, created once at startup
#[derive(Clone)]
pub struct BroadcastCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    db: SqlitePool,
    tx: broadcast::Sender<RosterSnapshot>,
    /// Last sequence sent; also serializes re-read + send
    sequence: Mutex<u64>,
    shutdown: CancellationToken,
    tasks: TaskTracker,
}

impl BroadcastCoordinator {
    /// Create a coordinator buffering `capacity` snapshots per subscriber
    pub fn new(db: SqlitePool, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        info!("Broadcast coordinator initialized with capacity {}", capacity);
        Self {
            inner: Arc::new(Inner {
                db,
                tx,
                sequence: Mutex::new(0),
                shutdown: CancellationToken::new(),
                tasks: TaskTracker::new(),
            }),
        }
    }

    /// Schedule a broadcast of the current roster
    ///
    /// Returns immediately; the caller never waits for delivery. Ignored
    /// once shutdown has begun.
    pub fn trigger(&self) {
        if self.inner.shutdown.is_cancelled() {
            debug!("Broadcast trigger ignored: coordinator shut down");
            return;
        }

        let coordinator = self.clone();
        self.inner.tasks.spawn(async move {
            coordinator.broadcast_now().await;
        });
    }

    /// Re-read the roster and send it, returning the snapshot sequence
    ///
    /// `None` when the re-read failed; the failure is logged and not retried.
    pub async fn broadcast_now(&self) -> Option<u64> {
        let mut sequence = self.inner.sequence.lock().await;

        let roster = match students::list_all(&self.inner.db).await {
            Ok(roster) => roster,
            Err(e) => {
                error!("Broadcast skipped, failed to re-read roster: {}", e);
                return None;
            }
        };

        *sequence += 1;
        let snapshot = RosterSnapshot::new(*sequence, roster);
        let len = snapshot.len();

        match self.inner.tx.send(snapshot) {
            Ok(receivers) => debug!(
                "Broadcast snapshot {} ({} students) to {} subscribers",
                *sequence, len, receivers
            ),
            Err(_) => debug!("Snapshot {} not sent: no subscribers", *sequence),
        }

        Some(*sequence)
    }

    /// Receive every snapshot sent from now on
    pub fn subscribe(&self) -> broadcast::Receiver<RosterSnapshot> {
        self.inner.tx.subscribe()
    }

    /// Number of currently connected subscribers
    pub fn subscriber_count(&self) -> usize {
        self.inner.tx.receiver_count()
    }

    /// Token cancelled when shutdown begins; subscriber streams end on it
    pub fn shutdown_token(&self) -> CancellationToken {
        self.inner.shutdown.clone()
    }

    /// Stop accepting triggers, wait for in-flight broadcasts and close
    /// subscriber streams. Safe to call more than once.
    pub async fn shutdown(&self) {
        if !self.inner.shutdown.is_cancelled() {
            info!("Shutting down broadcast coordinator");
        }
        self.inner.shutdown.cancel();
        self.inner.tasks.close();
        self.inner.tasks.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_common::db::init_memory_database;
    use roster_common::models::GradeInput;
    use roster_common::StudentInput;
    use std::time::Duration;
    use tokio::time::timeout;

    fn student(name: &str, grade: &str) -> StudentInput {
        StudentInput {
            full_name: Some(name.to_string()),
            date_of_birth: Some("2011-03-04".to_string()),
            grade: Some(GradeInput::Label(grade.to_string())),
            father_name: Some("F".to_string()),
            mother_name: Some("M".to_string()),
            contact: Some("0700000000".to_string()),
            photo_url: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_broadcast_now_sends_full_ordered_roster() {
        let db = init_memory_database().await.unwrap();
        students::insert(&db, &student("Zed", "6")).await.unwrap();
        students::insert(&db, &student("Amy", "6")).await.unwrap();
        let coordinator = BroadcastCoordinator::new(db, 8);
        let mut rx = coordinator.subscribe();

        assert_eq!(coordinator.broadcast_now().await, Some(1));

        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.sequence, 1);
        let names: Vec<_> = snapshot.students.iter().map(|s| s.full_name.as_str()).collect();
        assert_eq!(names, vec!["Amy", "Zed"]);
    }

    #[tokio::test]
    async fn test_sequence_increases_per_broadcast() {
        let db = init_memory_database().await.unwrap();
        let coordinator = BroadcastCoordinator::new(db, 8);
        let mut rx = coordinator.subscribe();

        for _ in 0..3 {
            coordinator.trigger();
        }

        let mut seen = Vec::new();
        for _ in 0..3 {
            let snapshot = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
            seen.push(snapshot.sequence);
        }
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_broadcast_without_subscribers_still_succeeds() {
        let db = init_memory_database().await.unwrap();
        let coordinator = BroadcastCoordinator::new(db, 8);
        assert_eq!(coordinator.subscriber_count(), 0);
        assert_eq!(coordinator.broadcast_now().await, Some(1));
    }

    #[tokio::test]
    async fn test_reread_failure_skips_broadcast() {
        let db = init_memory_database().await.unwrap();
        let coordinator = BroadcastCoordinator::new(db.clone(), 8);
        let mut rx = coordinator.subscribe();

        db.close().await;

        assert_eq!(coordinator.broadcast_now().await, None);
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_subscriber_count_tracks_receivers() {
        let db = init_memory_database().await.unwrap();
        let coordinator = BroadcastCoordinator::new(db, 8);

        let first = coordinator.subscribe();
        let second = coordinator.subscribe();
        assert_eq!(coordinator.subscriber_count(), 2);

        drop(first);
        assert_eq!(coordinator.subscriber_count(), 1);
        drop(second);
        assert_eq!(coordinator.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent_and_stops_triggers() {
        let db = init_memory_database().await.unwrap();
        let coordinator = BroadcastCoordinator::new(db, 8);
        let mut rx = coordinator.subscribe();

        coordinator.shutdown().await;
        coordinator.shutdown().await;
        assert!(coordinator.shutdown_token().is_cancelled());

        coordinator.trigger();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_in_flight_broadcast() {
        let db = init_memory_database().await.unwrap();
        let coordinator = BroadcastCoordinator::new(db, 8);
        let mut rx = coordinator.subscribe();

        coordinator.trigger();
        coordinator.shutdown().await;

        let snapshot = rx.try_recv().expect("in-flight broadcast should complete");
        assert_eq!(snapshot.sequence, 1);
    }
}
