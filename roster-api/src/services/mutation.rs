//! Roster mutations
//!
//! Create, update and delete as request/response operations. A mutation that
//! reaches durable storage triggers exactly one broadcast before the caller
//! gets its response; a mutation that fails triggers none.

use roster_common::{uuid_utils, Error, Result, StudentInput, StudentRecord};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::broadcast::BroadcastCoordinator;
use crate::db::students;

#[derive(Clone)]
pub struct MutationService {
    db: SqlitePool,
    coordinator: BroadcastCoordinator,
}

impl MutationService {
    pub fn new(db: SqlitePool, coordinator: BroadcastCoordinator) -> Self {
        Self { db, coordinator }
    }

    /// Validate and store a new student
    pub async fn create(&self, input: &StudentInput) -> Result<StudentRecord> {
        let record = students::insert(&self.db, input).await?;
        info!(
            "Created student {} ({}, grade {})",
            record.id, record.full_name, record.grade
        );
        self.coordinator.trigger();
        Ok(record)
    }

    /// Apply a partial update to the student named by `id`
    ///
    /// `id` is the raw path segment; anything that is not a UUID cannot name
    /// a stored record and is reported as not found.
    pub async fn update(&self, id: &str, input: &StudentInput) -> Result<StudentRecord> {
        let id = parse_id(id)?;
        let record = students::replace(&self.db, id, input).await?;
        info!("Updated student {} ({})", record.id, record.full_name);
        self.coordinator.trigger();
        Ok(record)
    }

    /// Delete the student named by `id`
    pub async fn delete(&self, id: &str) -> Result<Uuid> {
        let id = parse_id(id)?;
        students::remove(&self.db, id).await?;
        info!("Removed student {}", id);
        self.coordinator.trigger();
        Ok(id)
    }
}

fn parse_id(raw: &str) -> Result<Uuid> {
    uuid_utils::parse(raw).ok_or_else(|| Error::NotFound(format!("student {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_common::db::init_memory_database;
    use roster_common::models::GradeInput;
    use std::time::Duration;
    use tokio::sync::broadcast::error::TryRecvError;
    use tokio::time::timeout;

    async fn setup() -> (MutationService, BroadcastCoordinator) {
        let db = init_memory_database().await.unwrap();
        let coordinator = BroadcastCoordinator::new(db.clone(), 16);
        (MutationService::new(db, coordinator.clone()), coordinator)
    }

    fn student(name: &str) -> StudentInput {
        StudentInput {
            full_name: Some(name.to_string()),
            date_of_birth: Some("2010-05-01".to_string()),
            grade: Some(GradeInput::Label("8".to_string())),
            father_name: Some("F".to_string()),
            mother_name: Some("M".to_string()),
            contact: Some("0711234567".to_string()),
            photo_url: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_triggers_one_broadcast() {
        let (service, coordinator) = setup().await;
        let mut rx = coordinator.subscribe();

        let record = service.create(&student("A B")).await.unwrap();

        let snapshot = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        assert_eq!(snapshot.students.as_slice(), &[record]);

        coordinator.shutdown().await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_failed_mutations_do_not_broadcast() {
        let (service, coordinator) = setup().await;
        let mut rx = coordinator.subscribe();

        assert!(service.create(&StudentInput::default()).await.is_err());
        assert!(service.update(&Uuid::new_v4().to_string(), &student("X")).await.is_err());
        assert!(service.delete("not-a-uuid").await.is_err());

        coordinator.shutdown().await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_update_and_delete_broadcast_each() {
        let (service, coordinator) = setup().await;
        let created = service.create(&student("A B")).await.unwrap();
        coordinator.shutdown().await;

        // Fresh coordinator so the create broadcast is out of the picture
        let db = service.db.clone();
        let coordinator = BroadcastCoordinator::new(db.clone(), 16);
        let service = MutationService::new(db, coordinator.clone());
        let mut rx = coordinator.subscribe();

        let patch = StudentInput {
            contact: Some("0777654321".to_string()),
            ..Default::default()
        };
        service.update(&created.id.to_string(), &patch).await.unwrap();
        let after_update = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        assert_eq!(after_update.students[0].contact, "0777654321");

        let removed = service.delete(&created.id.to_string()).await.unwrap();
        assert_eq!(removed, created.id);
        let after_delete = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        assert!(after_delete.is_empty());
        assert!(after_delete.sequence > after_update.sequence);
    }

    #[tokio::test]
    async fn test_non_uuid_id_is_not_found() {
        let (service, _coordinator) = setup().await;
        let err = service.update("123", &student("X")).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        let err = service.delete("123").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
