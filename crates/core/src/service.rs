//! Serialized access to the catalog and side-effect dispatch.
//!
//! Every operation runs under one async mutex, which makes availability
//! checks and reservations atomic. After a successful mutation the service
//! snapshots the catalog and queues the snapshot with the emitted events,
//! still under the lock, so the dispatcher sees changes in commit order.
//! The dispatcher task persists and notifies outside the lock. Its failures
//! are logged and never roll a transition back.
//!
//! The queue is bounded. A mutation reserves its slot before taking the
//! catalog lock, so a slow store holds writers back without blocking
//! queries, and a caller dropped while waiting has changed nothing.

use std::sync::Arc;

use chrono::NaiveDate;
use fleetrent_shared::AppResult;
use fleetrent_shared::types::{IssueId, RentalId, VehicleId};
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::catalog::{CatalogSnapshot, CreateRental, RentalCatalog, Transition, VehicleUpdate};
use crate::events::DomainEvent;
use crate::policy::RentalPolicy;
use crate::ports::{Clock, Notifier, Persistence};
use crate::rental::{Rental, RentalError};
use crate::ticket::Ticket;
use crate::vehicle::{BookingConflict, NewIssue, NewVehicle, Vehicle};

/// Changes that may wait for the dispatcher before writers are held back.
pub const DISPATCH_QUEUE_CAPACITY: usize = 64;

enum Dispatch {
    Apply {
        snapshot: CatalogSnapshot,
        events: Vec<DomainEvent>,
    },
    Flush(oneshot::Sender<()>),
}

/// The rental engine as used by the API: catalog, clock and dispatcher.
pub struct RentalService {
    catalog: Mutex<RentalCatalog>,
    dispatch: mpsc::Sender<Dispatch>,
    clock: Arc<dyn Clock>,
}

impl RentalService {
    /// Loads the catalog from `persistence` and starts the dispatcher.
    ///
    /// Must be called inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the initial load fails.
    pub async fn open(
        policy: RentalPolicy,
        persistence: Arc<dyn Persistence>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let snapshot = CatalogSnapshot {
            vehicles: persistence.load_vehicles().await?,
            rentals: persistence.load_rentals().await?,
            tickets: persistence.load_tickets().await?,
        };
        info!(
            vehicles = snapshot.vehicles.len(),
            rentals = snapshot.rentals.len(),
            tickets = snapshot.tickets.len(),
            "Rental catalog loaded"
        );

        let (tx, rx) = mpsc::channel(DISPATCH_QUEUE_CAPACITY);
        tokio::spawn(run_dispatcher(rx, persistence, notifier));

        Ok(Self {
            catalog: Mutex::new(RentalCatalog::from_snapshot(policy, snapshot)),
            dispatch: tx,
            clock,
        })
    }

    /// The day the service considers "today".
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Waits until everything queued so far has been persisted and notified.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.dispatch.send(Dispatch::Flush(tx)).await.is_ok() {
            let _ = rx.await;
        }
    }

    // ------------------------------------------------------------------
    // Fleet
    // ------------------------------------------------------------------

    /// Adds a vehicle to the fleet.
    ///
    /// # Errors
    ///
    /// See [`RentalCatalog::register_vehicle`].
    pub async fn register_vehicle(&self, input: NewVehicle) -> Result<Vehicle, RentalError> {
        let slot = self.slot().await;
        let mut catalog = self.catalog.lock().await;
        let vehicle = catalog.register_vehicle(input)?;
        Self::commit(slot, &catalog, Vec::new());
        Ok(vehicle)
    }

    /// Logs a maintenance issue reported today.
    ///
    /// # Errors
    ///
    /// See [`RentalCatalog::report_issue`].
    pub async fn report_issue(
        &self,
        vehicle_id: VehicleId,
        input: NewIssue,
    ) -> Result<VehicleUpdate, RentalError> {
        let today = self.today();
        let slot = self.slot().await;
        let mut catalog = self.catalog.lock().await;
        let update = catalog.report_issue(vehicle_id, input, today)?;
        Self::commit(slot, &catalog, update.events.clone());
        Ok(update)
    }

    /// Closes a maintenance issue.
    ///
    /// # Errors
    ///
    /// See [`RentalCatalog::resolve_issue`].
    pub async fn resolve_issue(
        &self,
        vehicle_id: VehicleId,
        issue_id: IssueId,
    ) -> Result<VehicleUpdate, RentalError> {
        let slot = self.slot().await;
        let mut catalog = self.catalog.lock().await;
        let update = catalog.resolve_issue(vehicle_id, issue_id)?;
        Self::commit(slot, &catalog, update.events.clone());
        Ok(update)
    }

    /// Withdraws a vehicle from, or returns it to, the fleet.
    ///
    /// # Errors
    ///
    /// See [`RentalCatalog::set_out_of_service`].
    pub async fn set_out_of_service(
        &self,
        vehicle_id: VehicleId,
        out_of_service: bool,
    ) -> Result<VehicleUpdate, RentalError> {
        let slot = self.slot().await;
        let mut catalog = self.catalog.lock().await;
        let update = catalog.set_out_of_service(vehicle_id, out_of_service)?;
        Self::commit(slot, &catalog, update.events.clone());
        Ok(update)
    }

    // ------------------------------------------------------------------
    // Rental lifecycle
    // ------------------------------------------------------------------

    /// Requests a rental.
    ///
    /// # Errors
    ///
    /// See [`RentalCatalog::create`].
    pub async fn create(&self, request: CreateRental) -> Result<Rental, RentalError> {
        let slot = self.slot().await;
        let mut catalog = self.catalog.lock().await;
        let transition = catalog.create(request)?;
        Ok(Self::finish(slot, &catalog, transition))
    }

    /// Approves a pending rental.
    ///
    /// # Errors
    ///
    /// See [`RentalCatalog::approve`].
    pub async fn approve(&self, rental_id: RentalId) -> Result<Rental, RentalError> {
        let today = self.today();
        let slot = self.slot().await;
        let mut catalog = self.catalog.lock().await;
        let transition = catalog.approve(rental_id, today)?;
        Ok(Self::finish(slot, &catalog, transition))
    }

    /// Cancels a pending rental.
    ///
    /// # Errors
    ///
    /// See [`RentalCatalog::cancel`].
    pub async fn cancel(&self, rental_id: RentalId, reason: String) -> Result<Rental, RentalError> {
        let slot = self.slot().await;
        let mut catalog = self.catalog.lock().await;
        let transition = catalog.cancel(rental_id, reason)?;
        Ok(Self::finish(slot, &catalog, transition))
    }

    /// Validates a pickup ticket and returns it marked used.
    ///
    /// # Errors
    ///
    /// See [`RentalCatalog::validate_ticket`].
    pub async fn validate_ticket(
        &self,
        code: &str,
        presented_name: &str,
    ) -> Result<Ticket, RentalError> {
        let today = self.today();
        let slot = self.slot().await;
        let mut catalog = self.catalog.lock().await;
        let transition = catalog.validate_ticket(code, presented_name, today)?;
        let rental_id = transition.rental.id;
        Self::finish(slot, &catalog, transition);
        catalog
            .ticket_for_rental(rental_id)?
            .cloned()
            .ok_or_else(|| RentalError::not_found("Ticket", rental_id))
    }

    /// Returns a vehicle today.
    ///
    /// # Errors
    ///
    /// See [`RentalCatalog::return_rental`].
    pub async fn return_rental(
        &self,
        rental_id: RentalId,
        damages: &[String],
    ) -> Result<Rental, RentalError> {
        let today = self.today();
        let slot = self.slot().await;
        let mut catalog = self.catalog.lock().await;
        let transition = catalog.return_rental(rental_id, damages, today)?;
        Ok(Self::finish(slot, &catalog, transition))
    }

    /// Extends an active rental.
    ///
    /// # Errors
    ///
    /// See [`RentalCatalog::extend`].
    pub async fn extend(
        &self,
        rental_id: RentalId,
        new_end: NaiveDate,
        insurance: bool,
    ) -> Result<Rental, RentalError> {
        let today = self.today();
        let slot = self.slot().await;
        let mut catalog = self.catalog.lock().await;
        let transition = catalog.extend(rental_id, new_end, insurance, today)?;
        Ok(Self::finish(slot, &catalog, transition))
    }

    /// Sends due-soon and overdue reminders that have not gone out yet.
    ///
    /// Returns the number of reminders queued.
    pub async fn run_reminder_sweep(&self) -> usize {
        let today = self.today();
        let slot = self.slot().await;
        let mut catalog = self.catalog.lock().await;
        let events = catalog.collect_reminders(today);
        let count = events.len();
        if count > 0 {
            Self::commit(slot, &catalog, events);
        }
        count
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// See [`RentalCatalog::conflicts`].
    ///
    /// # Errors
    ///
    /// `NotFound` or `Validation`.
    pub async fn conflicts(
        &self,
        vehicle_id: VehicleId,
        start: NaiveDate,
        end: NaiveDate,
        user: &str,
    ) -> Result<Option<BookingConflict>, RentalError> {
        self.catalog
            .lock()
            .await
            .conflicts(vehicle_id, start, end, user)
    }

    /// See [`RentalCatalog::available_vehicles`].
    ///
    /// # Errors
    ///
    /// `Validation` for an inverted range.
    pub async fn available_vehicles(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        user: &str,
    ) -> Result<Vec<Vehicle>, RentalError> {
        let catalog = self.catalog.lock().await;
        Ok(catalog
            .available_vehicles(start, end, user)?
            .into_iter()
            .cloned()
            .collect())
    }

    /// A vehicle by id.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown vehicle.
    pub async fn vehicle(&self, vehicle_id: VehicleId) -> Result<Vehicle, RentalError> {
        self.catalog.lock().await.vehicle(vehicle_id).cloned()
    }

    /// The fleet, ordered by plate.
    pub async fn vehicles(&self) -> Vec<Vehicle> {
        self.catalog
            .lock()
            .await
            .vehicles()
            .into_iter()
            .cloned()
            .collect()
    }

    /// A rental by id.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown rental.
    pub async fn rental(&self, rental_id: RentalId) -> Result<Rental, RentalError> {
        self.catalog.lock().await.rental(rental_id).cloned()
    }

    /// All rentals, or those of one user.
    pub async fn rentals(&self, username: Option<&str>) -> Vec<Rental> {
        let catalog = self.catalog.lock().await;
        let rentals = match username {
            Some(user) => catalog.rentals_for_user(user),
            None => catalog.rentals(),
        };
        rentals.into_iter().cloned().collect()
    }

    /// The current ticket of a rental.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown rental or one without a ticket.
    pub async fn ticket_for_rental(&self, rental_id: RentalId) -> Result<Ticket, RentalError> {
        self.catalog
            .lock()
            .await
            .ticket_for_rental(rental_id)?
            .cloned()
            .ok_or_else(|| RentalError::not_found("Ticket for rental", rental_id))
    }

    /// Waits for room in the dispatch queue.
    async fn slot(&self) -> Option<mpsc::Permit<'_, Dispatch>> {
        let slot = self.dispatch.reserve().await.ok();
        if slot.is_none() {
            error!("Dispatcher stopped, changes will not be persisted");
        }
        slot
    }

    fn finish(
        slot: Option<mpsc::Permit<'_, Dispatch>>,
        catalog: &RentalCatalog,
        transition: Transition,
    ) -> Rental {
        Self::commit(slot, catalog, transition.events);
        transition.rental
    }

    fn commit(
        slot: Option<mpsc::Permit<'_, Dispatch>>,
        catalog: &RentalCatalog,
        events: Vec<DomainEvent>,
    ) {
        if let Some(slot) = slot {
            slot.send(Dispatch::Apply {
                snapshot: catalog.snapshot(),
                events,
            });
        }
    }
}

async fn run_dispatcher(
    mut rx: mpsc::Receiver<Dispatch>,
    persistence: Arc<dyn Persistence>,
    notifier: Arc<dyn Notifier>,
) {
    while let Some(message) = rx.recv().await {
        match message {
            Dispatch::Apply { snapshot, events } => {
                persist(persistence.as_ref(), &snapshot).await;
                for event in &events {
                    deliver(notifier.as_ref(), event).await;
                }
            }
            Dispatch::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("Dispatcher stopped");
}

async fn persist(persistence: &dyn Persistence, snapshot: &CatalogSnapshot) {
    if let Err(e) = persistence.save_vehicles(&snapshot.vehicles).await {
        error!(error = %e, "Failed to save vehicles");
    }
    if let Err(e) = persistence.save_rentals(&snapshot.rentals).await {
        error!(error = %e, "Failed to save rentals");
    }
    if let Err(e) = persistence.save_tickets(&snapshot.tickets).await {
        error!(error = %e, "Failed to save tickets");
    }
}

async fn deliver(notifier: &dyn Notifier, event: &DomainEvent) {
    let result = match event {
        DomainEvent::RentalApproved { rental, ticket } => {
            notifier.notify_approval(rental, ticket).await
        }
        DomainEvent::RentalRejected { rental, reason } => {
            notifier.notify_rejection(rental, reason).await
        }
        DomainEvent::RentalReturned { rental } => notifier.notify_return(rental).await,
        DomainEvent::CriticalMaintenance { vehicle, issue } => {
            notifier.notify_critical_maintenance(vehicle, issue).await
        }
        DomainEvent::DueSoon { rental } => notifier.notify_due_soon(rental).await,
        DomainEvent::Overdue { rental } => notifier.notify_overdue(rental).await,
        DomainEvent::RentalRequested { .. }
        | DomainEvent::PickupConfirmed { .. }
        | DomainEvent::RentalExtended { .. } => {
            debug!(event = event.name(), "No notification for event");
            return;
        }
    };

    if let Err(e) = result {
        warn!(event = event.name(), error = %e, "Notification failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{DiscountTiers, PricingTerms};
    use crate::ports::FixedClock;
    use crate::rental::{CustomerRef, RentalStatus};
    use crate::vehicle::MaintenanceIssue;
    use fleetrent_shared::AppError;
    use fleetrent_shared::types::CustomerId;
    use rust_decimal_macros::dec;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingStore {
        state: StdMutex<CatalogSnapshot>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl Persistence for RecordingStore {
        async fn load_vehicles(&self) -> AppResult<Vec<Vehicle>> {
            Ok(self.state.lock().unwrap().vehicles.clone())
        }
        async fn save_vehicles(&self, vehicles: &[Vehicle]) -> AppResult<()> {
            if self.fail {
                return Err(AppError::Storage("disk full".into()));
            }
            self.state.lock().unwrap().vehicles = vehicles.to_vec();
            Ok(())
        }
        async fn load_rentals(&self) -> AppResult<Vec<Rental>> {
            Ok(self.state.lock().unwrap().rentals.clone())
        }
        async fn save_rentals(&self, rentals: &[Rental]) -> AppResult<()> {
            if self.fail {
                return Err(AppError::Storage("disk full".into()));
            }
            self.state.lock().unwrap().rentals = rentals.to_vec();
            Ok(())
        }
        async fn load_tickets(&self) -> AppResult<Vec<Ticket>> {
            Ok(self.state.lock().unwrap().tickets.clone())
        }
        async fn save_tickets(&self, tickets: &[Ticket]) -> AppResult<()> {
            if self.fail {
                return Err(AppError::Storage("disk full".into()));
            }
            self.state.lock().unwrap().tickets = tickets.to_vec();
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: StdMutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn record(&self, what: String) -> AppResult<()> {
            self.sent.lock().unwrap().push(what);
            Ok(())
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify_approval(&self, rental: &Rental, ticket: &Ticket) -> AppResult<()> {
            self.record(format!("approval {} {}", rental.username, ticket.code))
        }
        async fn notify_rejection(&self, rental: &Rental, reason: &str) -> AppResult<()> {
            self.record(format!("rejection {} {reason}", rental.username))
        }
        async fn notify_return(&self, rental: &Rental) -> AppResult<()> {
            self.record(format!("return {} {}", rental.username, rental.actual_fee))
        }
        async fn notify_critical_maintenance(
            &self,
            vehicle: &Vehicle,
            issue: &MaintenanceIssue,
        ) -> AppResult<()> {
            self.record(format!("critical {} {}", vehicle.plate, issue.severity))
        }
        async fn notify_due_soon(&self, rental: &Rental) -> AppResult<()> {
            self.record(format!("due_soon {}", rental.username))
        }
        async fn notify_overdue(&self, rental: &Rental) -> AppResult<()> {
            self.record(format!("overdue {}", rental.username))
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn new_vehicle() -> NewVehicle {
        NewVehicle {
            make: "Mitsubishi".into(),
            model: "Xpander".into(),
            plate: "L 500 XP".into(),
            pricing: PricingTerms {
                base_price: dec!(100),
                insurance_rate: dec!(0.10),
                discounts: DiscountTiers::new(),
            },
        }
    }

    fn request(vehicle_id: VehicleId, user: &str, start: u32, end: u32) -> CreateRental {
        CreateRental {
            customer: CustomerRef {
                id: CustomerId::new(),
                name: user.into(),
                email: format!("{user}@example.com"),
            },
            vehicle_id,
            start_date: date(start),
            end_date: date(end),
            insurance: false,
            username: user.into(),
        }
    }

    async fn open(
        store: Arc<RecordingStore>,
        notifier: Arc<RecordingNotifier>,
        today: u32,
    ) -> RentalService {
        RentalService::open(
            RentalPolicy::default(),
            store,
            notifier,
            Arc::new(FixedClock(date(today))),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_transitions_are_persisted_and_notified() {
        let store = Arc::new(RecordingStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let service = open(store.clone(), notifier.clone(), 1).await;

        let vehicle = service.register_vehicle(new_vehicle()).await.unwrap();
        let rental = service
            .create(request(vehicle.id, "alice", 1, 5))
            .await
            .unwrap();
        let approved = service.approve(rental.id).await.unwrap();
        service.flush().await;

        assert_eq!(approved.status, RentalStatus::Active);
        let saved = store.state.lock().unwrap().clone();
        assert_eq!(saved.vehicles.len(), 1);
        assert_eq!(saved.rentals[0].status, RentalStatus::Active);
        assert_eq!(saved.tickets.len(), 1);

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with("approval alice TKT-"));
    }

    #[tokio::test]
    async fn test_open_restores_saved_state() {
        let store = Arc::new(RecordingStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let first = open(store.clone(), notifier.clone(), 1).await;
        let vehicle = first.register_vehicle(new_vehicle()).await.unwrap();
        first
            .create(request(vehicle.id, "alice", 1, 5))
            .await
            .unwrap();
        first.flush().await;

        let second = open(store, notifier, 1).await;
        assert_eq!(second.rentals(Some("alice")).await.len(), 1);
        assert!(matches!(
            second.create(request(vehicle.id, "bob", 6, 7)).await,
            Err(RentalError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_storage_failure_does_not_roll_back() {
        let store = Arc::new(RecordingStore {
            fail: true,
            ..RecordingStore::default()
        });
        let notifier = Arc::new(RecordingNotifier::default());
        let service = open(store, notifier.clone(), 1).await;

        let vehicle = service.register_vehicle(new_vehicle()).await.unwrap();
        let rental = service
            .create(request(vehicle.id, "alice", 1, 5))
            .await
            .unwrap();
        service
            .cancel(rental.id, "no longer needed".into())
            .await
            .unwrap();
        service.flush().await;

        assert_eq!(
            service.rental(rental.id).await.unwrap().status,
            RentalStatus::Cancelled
        );
        assert_eq!(notifier.sent(), vec!["rejection alice no longer needed"]);
    }

    #[tokio::test]
    async fn test_full_rental_with_ticket() {
        let store = Arc::new(RecordingStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let service = open(store, notifier.clone(), 1).await;

        let vehicle = service.register_vehicle(new_vehicle()).await.unwrap();
        let rental = service
            .create(request(vehicle.id, "alice", 1, 3))
            .await
            .unwrap();
        service.approve(rental.id).await.unwrap();
        let ticket = service.ticket_for_rental(rental.id).await.unwrap();

        let used = service.validate_ticket(&ticket.code, "ALICE").await.unwrap();
        assert!(used.used);
        let returned = service.return_rental(rental.id, &[]).await.unwrap();
        service.flush().await;

        assert_eq!(returned.actual_fee, dec!(300));
        assert!(notifier.sent().last().unwrap().starts_with("return alice"));
    }

    #[tokio::test]
    async fn test_reminder_sweep_notifies_once() {
        let store = Arc::new(RecordingStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let service = open(store, notifier.clone(), 5).await;

        let vehicle = service.register_vehicle(new_vehicle()).await.unwrap();
        let rental = service
            .create(request(vehicle.id, "alice", 5, 6))
            .await
            .unwrap();
        service.approve(rental.id).await.unwrap();

        assert_eq!(service.run_reminder_sweep().await, 1);
        assert_eq!(service.run_reminder_sweep().await, 0);
        service.flush().await;
        assert_eq!(notifier.sent().last().unwrap(), "due_soon alice");
    }

    #[tokio::test]
    async fn test_concurrent_requests_book_once() {
        let store = Arc::new(RecordingStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let service = Arc::new(open(store, notifier, 1).await);
        let vehicle_id = service.register_vehicle(new_vehicle()).await.unwrap().id;

        let mut handles = Vec::new();
        for i in 0..8 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .create(request(vehicle_id, &format!("user{i}"), 10, 12))
                    .await
                    .is_ok()
            }));
        }

        let mut booked = 0;
        for handle in handles {
            if handle.await.unwrap() {
                booked += 1;
            }
        }
        assert_eq!(booked, 1);
        assert_eq!(service.vehicle(vehicle_id).await.unwrap().schedule.len(), 1);
    }

    /// Store whose vehicle saves wait until permits are added.
    struct StalledStore {
        release: tokio::sync::Semaphore,
    }

    #[async_trait::async_trait]
    impl Persistence for StalledStore {
        async fn load_vehicles(&self) -> AppResult<Vec<Vehicle>> {
            Ok(Vec::new())
        }
        async fn save_vehicles(&self, _vehicles: &[Vehicle]) -> AppResult<()> {
            self.release.acquire().await.unwrap().forget();
            Ok(())
        }
        async fn load_rentals(&self) -> AppResult<Vec<Rental>> {
            Ok(Vec::new())
        }
        async fn save_rentals(&self, _rentals: &[Rental]) -> AppResult<()> {
            Ok(())
        }
        async fn load_tickets(&self) -> AppResult<Vec<Ticket>> {
            Ok(Vec::new())
        }
        async fn save_tickets(&self, _tickets: &[Ticket]) -> AppResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_slow_store_holds_writers_back() {
        let store = Arc::new(StalledStore {
            release: tokio::sync::Semaphore::new(0),
        });
        let service = RentalService::open(
            RentalPolicy::default(),
            store.clone(),
            Arc::new(RecordingNotifier::default()),
            Arc::new(FixedClock(date(1))),
        )
        .await
        .unwrap();
        let with_plate = |plate: String| NewVehicle {
            plate,
            ..new_vehicle()
        };

        // one change is stuck in the store, the rest fill the queue
        for i in 0..=DISPATCH_QUEUE_CAPACITY {
            service
                .register_vehicle(with_plate(format!("Q {i}")))
                .await
                .unwrap();
        }
        let waiting = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            service.register_vehicle(with_plate("Q LATE".into())),
        )
        .await;
        assert!(waiting.is_err());

        // the abandoned write never reached the catalog, and reads still work
        assert_eq!(service.vehicles().await.len(), DISPATCH_QUEUE_CAPACITY + 1);

        store.release.add_permits(DISPATCH_QUEUE_CAPACITY * 4);
        service
            .register_vehicle(with_plate("Q LATE".into()))
            .await
            .unwrap();
        service.flush().await;
        assert_eq!(service.vehicles().await.len(), DISPATCH_QUEUE_CAPACITY + 2);
    }
}
