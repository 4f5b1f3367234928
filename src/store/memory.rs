//! In-memory occurrence store

use std::collections::HashMap;
use std::sync::RwLock;

use super::{check_update, prepare_insert, OccurrenceStore, StoreError};
use crate::core::identity::Protocolo;
use crate::entities::occurrence::Occurrence;

/// Thread-safe store backed by a hash map
///
/// Intended for tests and embedding; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<Protocolo, Occurrence>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OccurrenceStore for MemoryStore {
    fn load(&self, protocolo: &Protocolo) -> Result<Occurrence, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        records
            .get(protocolo)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                protocolo: protocolo.clone(),
            })
    }

    fn insert(&self, occurrence: Occurrence) -> Result<Occurrence, StoreError> {
        let occurrence = prepare_insert(occurrence);
        let protocolo = occurrence.protocolo.clone().ok_or(StoreError::Unsaved)?;

        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        if records.contains_key(&protocolo) {
            return Err(StoreError::AlreadyExists { protocolo });
        }
        records.insert(protocolo, occurrence.clone());
        Ok(occurrence)
    }

    fn save(&self, mut occurrence: Occurrence) -> Result<Occurrence, StoreError> {
        let protocolo = occurrence.protocolo.clone().ok_or(StoreError::Unsaved)?;

        // Hold the write lock across compare and swap
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        let stored = records
            .get(&protocolo)
            .ok_or_else(|| StoreError::NotFound {
                protocolo: protocolo.clone(),
            })?;
        check_update(stored, &occurrence)?;

        occurrence.versao += 1;
        records.insert(protocolo, occurrence.clone());
        Ok(occurrence)
    }

    fn list(&self) -> Result<Vec<Occurrence>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        let mut all: Vec<Occurrence> = records.values().cloned().collect();
        all.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.protocolo.cmp(&b.protocolo))
        });
        Ok(all)
    }
}
