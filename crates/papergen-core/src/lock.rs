//! Per-course mutual exclusion for paper generation.
//!
//! The used-question snapshot is read once at the start of a generation, so
//! two generations for the same course must not overlap between that read
//! and the final commit.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::model::CourseId;

/// One async lock per course, created on first use.
#[derive(Debug, Default)]
pub struct CourseLocks {
    locks: Mutex<HashMap<CourseId, Arc<AsyncMutex<()>>>>,
}

impl CourseLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other holder has `course_id`, then hold it until the
    /// guard is dropped.
    pub async fn acquire(&self, course_id: CourseId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(locks.entry(course_id).or_default())
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use uuid::Uuid;

    #[tokio::test]
    async fn same_course_is_exclusive() {
        let locks = CourseLocks::new();
        let course = Uuid::new_v4();

        let guard = locks.acquire(course).await;
        let second = tokio::time::timeout(Duration::from_millis(50), locks.acquire(course)).await;
        assert!(second.is_err(), "second holder must wait");

        drop(guard);
        let third = tokio::time::timeout(Duration::from_millis(50), locks.acquire(course)).await;
        assert!(third.is_ok());
    }

    #[tokio::test]
    async fn different_courses_do_not_block() {
        let locks = CourseLocks::new();
        let _a = locks.acquire(Uuid::new_v4()).await;
        let b =
            tokio::time::timeout(Duration::from_millis(50), locks.acquire(Uuid::new_v4())).await;
        assert!(b.is_ok());
    }
}
