//! In-process store.

use std::sync::atomic::{AtomicUsize, Ordering};

use fleetrent_core::CatalogSnapshot;
use fleetrent_core::ports::Persistence;
use fleetrent_core::rental::Rental;
use fleetrent_core::ticket::Ticket;
use fleetrent_core::vehicle::Vehicle;
use fleetrent_shared::AppResult;
use tokio::sync::RwLock;

/// Keeps the collections in memory and counts saves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<CatalogSnapshot>,
    saves: AtomicUsize,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with `snapshot`.
    #[must_use]
    pub fn with_snapshot(snapshot: CatalogSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
            saves: AtomicUsize::new(0),
        }
    }

    /// Current contents.
    pub async fn snapshot(&self) -> CatalogSnapshot {
        self.state.read().await.clone()
    }

    /// Number of collection saves so far.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn saved(&self) {
        self.saves.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl Persistence for MemoryStore {
    async fn load_vehicles(&self) -> AppResult<Vec<Vehicle>> {
        Ok(self.state.read().await.vehicles.clone())
    }

    async fn save_vehicles(&self, vehicles: &[Vehicle]) -> AppResult<()> {
        self.state.write().await.vehicles = vehicles.to_vec();
        self.saved();
        Ok(())
    }

    async fn load_rentals(&self) -> AppResult<Vec<Rental>> {
        Ok(self.state.read().await.rentals.clone())
    }

    async fn save_rentals(&self, rentals: &[Rental]) -> AppResult<()> {
        self.state.write().await.rentals = rentals.to_vec();
        self.saved();
        Ok(())
    }

    async fn load_tickets(&self) -> AppResult<Vec<Ticket>> {
        Ok(self.state.read().await.tickets.clone())
    }

    async fn save_tickets(&self, tickets: &[Ticket]) -> AppResult<()> {
        self.state.write().await.tickets = tickets.to_vec();
        self.saved();
        Ok(())
    }
}
