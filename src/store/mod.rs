//! Alarm collection with lifecycle operations.
//!
//! `AlarmStore` keeps alarms in insertion order. Users refer to alarms by
//! the 1-based ordinal shown in listings, but every ordinal is resolved to
//! a stable [`AlarmId`] at the display boundary; the background engine only
//! ever addresses alarms by id.
//!
//! The store has no locking of its own. It is shared between the menu and
//! the background scanner as [`SharedStore`], and every critical section is
//! short and free of await points.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::types::{Alarm, AlarmId};

/// Store shared between the interactive layer and the background engine.
pub type SharedStore = Arc<Mutex<AlarmStore>>;

// ============================================================================
// StoreError
// ============================================================================

/// Errors for ordinal-based store operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The requested position does not exist.
    #[error("alarm number {index} is out of range (have {len} alarms)")]
    OutOfRange {
        /// Zero-based index that was requested.
        index: usize,
        /// Number of alarms currently stored.
        len: usize,
    },
}

// ============================================================================
// AlarmStore
// ============================================================================

/// Insertion-ordered collection of alarms.
#[derive(Debug, Default)]
pub struct AlarmStore {
    alarms: Vec<Alarm>,
}

impl AlarmStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an alarm and returns its id. Duplicates are allowed.
    pub fn add(&mut self, alarm: Alarm) -> AlarmId {
        let id = alarm.id;
        self.alarms.push(alarm);
        id
    }

    /// Number of stored alarms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    /// Returns true if no alarms are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }

    /// Number of enabled alarms, shown in the menu header.
    #[must_use]
    pub fn enabled_count(&self) -> usize {
        self.alarms.iter().filter(|a| a.enabled).count()
    }

    /// Iterates alarms as `(ordinal, alarm)` pairs in insertion order.
    ///
    /// Ordinals are 1-based to match what listings display. Each call
    /// starts a fresh iteration.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Alarm)> {
        self.alarms.iter().enumerate().map(|(i, a)| (i + 1, a))
    }

    /// Looks up an alarm by id.
    #[must_use]
    pub fn get(&self, id: &AlarmId) -> Option<&Alarm> {
        self.alarms.iter().find(|a| a.id == *id)
    }

    /// Looks up an alarm by id for mutation.
    pub fn get_mut(&mut self, id: &AlarmId) -> Option<&mut Alarm> {
        self.alarms.iter_mut().find(|a| a.id == *id)
    }

    /// Resolves a zero-based index to the stable id at that position.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::OutOfRange` if no alarm exists at `index`.
    pub fn id_at(&self, index: usize) -> Result<AlarmId, StoreError> {
        self.alarms
            .get(index)
            .map(|a| a.id)
            .ok_or(StoreError::OutOfRange {
                index,
                len: self.alarms.len(),
            })
    }

    /// Flips the enabled flag of the alarm at `index`.
    ///
    /// Returns the alarm after the flip so callers can report its new
    /// state.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::OutOfRange` if no alarm exists at `index`.
    pub fn toggle_at(&mut self, index: usize) -> Result<&Alarm, StoreError> {
        let len = self.alarms.len();
        let alarm = self
            .alarms
            .get_mut(index)
            .ok_or(StoreError::OutOfRange { index, len })?;
        alarm.enabled = !alarm.enabled;
        Ok(alarm)
    }

    /// Removes and returns the alarm at `index`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::OutOfRange` if no alarm exists at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<Alarm, StoreError> {
        if index >= self.alarms.len() {
            return Err(StoreError::OutOfRange {
                index,
                len: self.alarms.len(),
            });
        }
        Ok(self.alarms.remove(index))
    }
}

/// Creates a shared, lockable store.
#[must_use]
pub fn shared_store() -> SharedStore {
    Arc::new(Mutex::new(AlarmStore::new()))
}

// ============================================================================
// Tests
// ============================================================================
