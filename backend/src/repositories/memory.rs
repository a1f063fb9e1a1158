//! In-memory user store for unit tests
//!
//! Mirrors the PostgreSQL semantics the upsert relies on: `telegram_id` is
//! unique and a conflicting insert fails with `UniqueViolation`.

use super::user::{TelegramProfile, TelegramUserStore, UserRecord};
use super::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<i64, UserRecord>>,
    /// When set, every lookup waits here after reading, so concurrent
    /// callers all observe the table before any of them inserts.
    lookup_barrier: Option<Arc<Barrier>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose lookups rendezvous in groups of `callers`
    pub fn with_lookup_barrier(callers: usize) -> Self {
        Self {
            users: Mutex::default(),
            lookup_barrier: Some(Arc::new(Barrier::new(callers))),
        }
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn get(&self, telegram_id: i64) -> Option<UserRecord> {
        self.users.lock().unwrap().get(&telegram_id).cloned()
    }
}

#[async_trait]
impl TelegramUserStore for MemoryUserStore {
    async fn find_by_telegram_id(&self, telegram_id: i64) -> RepositoryResult<Option<UserRecord>> {
        let found = self.get(telegram_id);
        if let Some(barrier) = &self.lookup_barrier {
            barrier.wait().await;
        }
        Ok(found)
    }

    async fn insert_telegram_user(&self, profile: &TelegramProfile) -> RepositoryResult<UserRecord> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&profile.telegram_id) {
            return Err(RepositoryError::UniqueViolation);
        }

        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            telegram_id: profile.telegram_id,
            display_name: profile.display_name.clone(),
            username: profile.username.clone(),
            avatar_url: profile.avatar_url.clone(),
            bio: None,
            email: None,
            phone: None,
            age: None,
            language: profile.language_code.clone().unwrap_or_else(|| "en".to_string()),
            theme: "system".to_string(),
            is_premium: profile.is_premium,
            created_at: now,
            updated_at: now,
            last_login_at: Some(now),
        };
        users.insert(profile.telegram_id, record.clone());
        Ok(record)
    }

    async fn update_telegram_profile(&self, profile: &TelegramProfile) -> RepositoryResult<UserRecord> {
        let mut users = self.users.lock().unwrap();
        let record = users
            .get_mut(&profile.telegram_id)
            .ok_or(RepositoryError::NotFound)?;

        let now = Utc::now();
        record.display_name = profile.display_name.clone();
        record.username = profile.username.clone();
        record.avatar_url = profile.avatar_url.clone();
        record.is_premium = profile.is_premium;
        record.last_login_at = Some(now);
        record.updated_at = now;
        Ok(record.clone())
    }
}
