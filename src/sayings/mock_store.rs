//! Mock implementation of SayingStorage trait for testing

use crate::sayings::{saying_not_found, KeyFn, Saying, SayingId, SayingStorage};
use actix_web::Error;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct MockData {
    sayings: Vec<Saying>,
    next_id: SayingId,
}

/// Mock implementation of SayingStorage for testing
pub struct MockSayingStore {
    data: Mutex<MockData>,
    fail_writes: bool,
}

impl MockSayingStore {
    /// Create a new mock saying store
    pub fn new() -> Self {
        Self {
            data: Mutex::new(MockData { sayings: Vec::new(), next_id: 1 }),
            fail_writes: false,
        }
    }

    /// A store whose inserts always fail, for exercising error propagation
    pub fn failing_writes() -> Self {
        Self { fail_writes: true, ..Self::new() }
    }

    /// Clear all data from the store (useful for test cleanup)
    pub fn clear(&self) {
        if let Ok(mut data) = self.data.lock() {
            data.sayings.clear();
        }
    }

    /// Get the number of stored sayings
    pub fn saying_count(&self) -> usize {
        self.data.lock().map(|data| data.sayings.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, MockData>, Error> {
        self.data.lock().map_err(|_| actix_web::error::ErrorInternalServerError("Mock store lock poisoned"))
    }

    fn push(&self, data: &mut MockData, date: &str, text: &str) -> Result<SayingId, Error> {
        if self.fail_writes {
            return Err(actix_web::error::ErrorInternalServerError("Mock store refuses writes"));
        }
        let id = data.next_id;
        data.next_id += 1;
        data.sayings.push(Saying { id, date: date.to_string(), saying: text.to_string() });
        Ok(id)
    }
}

impl Default for MockSayingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SayingStorage for MockSayingStore {
    fn ids(&self) -> Result<Vec<SayingId>, Error> {
        Ok(self.lock()?.sayings.iter().map(|s| s.id).collect())
    }

    fn get_saying(&self, id: SayingId) -> Result<Saying, Error> {
        self.lock()?
            .sayings
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| saying_not_found(id))
    }

    fn list_sayings(&self) -> Result<Vec<Saying>, Error> {
        Ok(self.lock()?.sayings.clone())
    }

    fn insert_saying(&self, date: &str, text: &str) -> Result<SayingId, Error> {
        let mut data = self.lock()?;
        self.push(&mut data, date, text)
    }

    fn insert_if_absent(&self, date: &str, text: &str, key: KeyFn) -> Result<Option<SayingId>, Error> {
        let mut data = self.lock()?;
        let candidate = key(text);
        if data.sayings.iter().any(|s| key(&s.saying) == candidate) {
            return Ok(None);
        }
        self.push(&mut data, date, text).map(Some)
    }
}
