//! Directory of JSON documents, one per collection.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fleetrent_core::ports::Persistence;
use fleetrent_core::rental::Rental;
use fleetrent_core::ticket::Ticket;
use fleetrent_core::vehicle::Vehicle;
use fleetrent_shared::AppResult;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::StoreError;

const VEHICLES: &str = "vehicles.json";
const RENTALS: &str = "rentals.json";
const TICKETS: &str = "tickets.json";

/// Stores `vehicles.json`, `rentals.json` and `tickets.json` under one directory.
///
/// Writes go to a `.tmp` sibling that is renamed over the target, so a crash
/// never leaves a half-written collection behind.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Opens the store, creating `dir` if needed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            })?;
        info!(dir = %dir.display(), "JSON store opened");
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Directory holding the collections.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, StoreError> {
        let path = self.dir.join(name);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Collection missing, starting empty");
                return Ok(Vec::new());
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Serialization { path, source })
    }

    async fn write<T: Serialize>(&self, name: &str, items: &[T]) -> Result<(), StoreError> {
        let path = self.dir.join(name);
        let tmp = self.dir.join(format!("{name}.tmp"));
        let json = serde_json::to_vec_pretty(items).map_err(|source| StoreError::Serialization {
            path: path.clone(),
            source,
        })?;

        let _guard = self.write_lock.lock().await;
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), count = items.len(), "Collection saved");
        Ok(())
    }
}

#[async_trait::async_trait]
impl Persistence for JsonFileStore {
    async fn load_vehicles(&self) -> AppResult<Vec<Vehicle>> {
        Ok(self.read(VEHICLES).await?)
    }

    async fn save_vehicles(&self, vehicles: &[Vehicle]) -> AppResult<()> {
        Ok(self.write(VEHICLES, vehicles).await?)
    }

    async fn load_rentals(&self) -> AppResult<Vec<Rental>> {
        Ok(self.read(RENTALS).await?)
    }

    async fn save_rentals(&self, rentals: &[Rental]) -> AppResult<()> {
        Ok(self.write(RENTALS, rentals).await?)
    }

    async fn load_tickets(&self) -> AppResult<Vec<Ticket>> {
        Ok(self.read(TICKETS).await?)
    }

    async fn save_tickets(&self, tickets: &[Ticket]) -> AppResult<()> {
        Ok(self.write(TICKETS, tickets).await?)
    }
}
