//! The rental catalog aggregate.
//!
//! Owns the fleet, every rental and the ticket gate. Each mutating operation
//! validates first and only then changes state, so an `Err` leaves the
//! catalog untouched. Side effects are described by the returned events.

use std::collections::HashMap;

use chrono::NaiveDate;
use fleetrent_shared::types::{IssueId, RentalId, VehicleId};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::types::{CatalogSnapshot, CreateRental, Transition, VehicleUpdate};
use crate::events::DomainEvent;
use crate::policy::RentalPolicy;
use crate::pricing::FeeCalculator;
use crate::rental::{LifecycleService, Rental, RentalAction, RentalError, RentalStatus};
use crate::ticket::{Ticket, TicketGate};
use crate::vehicle::{
    AvailabilityEngine, Booking, BookingConflict, DateRange, NewIssue, NewVehicle, Vehicle,
    VehicleStatus,
};

/// Vehicles, rentals and tickets of one rental business.
#[derive(Debug, Clone)]
pub struct RentalCatalog {
    policy: RentalPolicy,
    engine: AvailabilityEngine,
    vehicles: HashMap<VehicleId, Vehicle>,
    rentals: HashMap<RentalId, Rental>,
    rentals_by_vehicle: HashMap<VehicleId, Vec<RentalId>>,
    rentals_by_user: HashMap<String, Vec<RentalId>>,
    tickets: TicketGate,
}

impl RentalCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new(policy: RentalPolicy) -> Self {
        Self {
            policy,
            engine: AvailabilityEngine::new(&policy),
            vehicles: HashMap::new(),
            rentals: HashMap::new(),
            rentals_by_vehicle: HashMap::new(),
            rentals_by_user: HashMap::new(),
            tickets: TicketGate::new(),
        }
    }

    /// Rebuilds a catalog from persisted state.
    #[must_use]
    pub fn from_snapshot(policy: RentalPolicy, snapshot: CatalogSnapshot) -> Self {
        let mut catalog = Self::new(policy);
        catalog.vehicles = snapshot
            .vehicles
            .into_iter()
            .map(|v| (v.id, v))
            .collect();

        let mut rentals = snapshot.rentals;
        rentals.sort_by_key(|r| r.id);
        for rental in rentals {
            catalog.index(&rental);
            catalog.rentals.insert(rental.id, rental);
        }

        catalog.tickets = TicketGate::from_tickets(snapshot.tickets);
        debug!(
            vehicles = catalog.vehicles.len(),
            rentals = catalog.rentals.len(),
            "Catalog restored"
        );
        catalog
    }

    /// Copies the persistent state, sorted by id.
    #[must_use]
    pub fn snapshot(&self) -> CatalogSnapshot {
        let mut vehicles: Vec<Vehicle> = self.vehicles.values().cloned().collect();
        vehicles.sort_by_key(|v| v.id);
        let mut rentals: Vec<Rental> = self.rentals.values().cloned().collect();
        rentals.sort_by_key(|r| r.id);
        let mut tickets: Vec<Ticket> = self.tickets.tickets().cloned().collect();
        tickets.sort_by_key(|t| t.rental_id);

        CatalogSnapshot {
            vehicles,
            rentals,
            tickets,
        }
    }

    /// The rules this catalog applies.
    #[must_use]
    pub fn policy(&self) -> &RentalPolicy {
        &self.policy
    }

    // ------------------------------------------------------------------
    // Fleet
    // ------------------------------------------------------------------

    /// Adds a vehicle to the fleet.
    ///
    /// # Errors
    ///
    /// `Validation` for blank fields or a plate already in the fleet,
    /// `Pricing` for invalid pricing terms.
    pub fn register_vehicle(&mut self, input: NewVehicle) -> Result<Vehicle, RentalError> {
        let make = input.make.trim();
        let model = input.model.trim();
        let plate = input.plate.trim().to_uppercase();
        if make.is_empty() || model.is_empty() || plate.is_empty() {
            return Err(RentalError::Validation(
                "Make, model and plate are required".to_string(),
            ));
        }
        if self.vehicles.values().any(|v| v.plate == plate) {
            return Err(RentalError::Validation(format!(
                "Plate {plate} is already registered"
            )));
        }
        input.pricing.validate()?;

        let vehicle = Vehicle {
            id: VehicleId::new(),
            make: make.to_string(),
            model: model.to_string(),
            plate,
            pricing: input.pricing,
            status: VehicleStatus::Available,
            schedule: Default::default(),
            issues: Vec::new(),
        };
        info!(vehicle_id = %vehicle.id, plate = %vehicle.plate, "Vehicle registered");
        self.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(vehicle)
    }

    /// Logs a maintenance issue. A critical one grounds the vehicle.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown vehicle, `Validation` for a bad issue.
    pub fn report_issue(
        &mut self,
        vehicle_id: VehicleId,
        input: NewIssue,
        today: NaiveDate,
    ) -> Result<VehicleUpdate, RentalError> {
        let threshold = self.policy.critical_severity;
        let issue = self.vehicle_mut(vehicle_id)?.add_issue(input, today)?;
        self.settle_vehicle_status(vehicle_id);

        let vehicle = self.vehicle(vehicle_id)?.clone();
        let mut events = Vec::new();
        if issue.is_critical(threshold) {
            warn!(
                vehicle_id = %vehicle_id,
                issue_id = %issue.id,
                severity = issue.severity,
                "Critical maintenance issue reported"
            );
            events.push(DomainEvent::CriticalMaintenance {
                vehicle: vehicle.clone(),
                issue,
            });
        } else {
            info!(vehicle_id = %vehicle_id, issue_id = %issue.id, "Maintenance issue reported");
        }

        Ok(VehicleUpdate { vehicle, events })
    }

    /// Closes a maintenance issue and re-derives the vehicle status.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown vehicle or issue.
    pub fn resolve_issue(
        &mut self,
        vehicle_id: VehicleId,
        issue_id: IssueId,
    ) -> Result<VehicleUpdate, RentalError> {
        self.vehicle_mut(vehicle_id)?.resolve_issue(issue_id)?;
        self.settle_vehicle_status(vehicle_id);
        info!(vehicle_id = %vehicle_id, issue_id = %issue_id, "Maintenance issue resolved");

        Ok(VehicleUpdate {
            vehicle: self.vehicle(vehicle_id)?.clone(),
            events: Vec::new(),
        })
    }

    /// Withdraws a vehicle from, or returns it to, the fleet.
    ///
    /// Existing bookings are kept; the vehicle just stops taking new ones.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown vehicle.
    pub fn set_out_of_service(
        &mut self,
        vehicle_id: VehicleId,
        out_of_service: bool,
    ) -> Result<VehicleUpdate, RentalError> {
        let vehicle = self.vehicle_mut(vehicle_id)?;
        if out_of_service {
            vehicle.status = VehicleStatus::OutOfService;
        } else if vehicle.status == VehicleStatus::OutOfService {
            vehicle.status = VehicleStatus::Available;
        }
        self.settle_vehicle_status(vehicle_id);
        info!(vehicle_id = %vehicle_id, out_of_service, "Vehicle service state changed");

        Ok(VehicleUpdate {
            vehicle: self.vehicle(vehicle_id)?.clone(),
            events: Vec::new(),
        })
    }

    // ------------------------------------------------------------------
    // Rental lifecycle
    // ------------------------------------------------------------------

    /// Requests a rental. The booking is held while the rental is Pending.
    ///
    /// # Errors
    ///
    /// `Validation` for blank customer data or an inverted range,
    /// `NotFound` for an unknown vehicle, `Conflict` when the vehicle cannot
    /// take the dates, `Pricing` when the fee overflows.
    pub fn create(&mut self, request: CreateRental) -> Result<Transition, RentalError> {
        let username = request.username.trim().to_string();
        if username.is_empty() {
            return Err(RentalError::Validation("Username is required".to_string()));
        }
        if request.customer.name.trim().is_empty() {
            return Err(RentalError::Validation(
                "Customer name is required".to_string(),
            ));
        }
        let range = DateRange::new(request.start_date, request.end_date)?;

        let rentals = &self.rentals;
        let vehicle = self
            .vehicles
            .get_mut(&request.vehicle_id)
            .ok_or_else(|| RentalError::not_found("Vehicle", request.vehicle_id))?;
        self.engine
            .can_book(vehicle, range, &username, |id| {
                rentals.get(&id).map(|r| r.status)
            })
            .map_err(RentalError::Conflict)?;
        let total_fee = FeeCalculator::estimate(&vehicle.pricing, range, request.insurance)?;

        let rental = Rental {
            id: RentalId::new(),
            customer: request.customer,
            vehicle_id: vehicle.id,
            start_date: range.start,
            end_date: range.end,
            status: RentalStatus::Pending,
            total_fee,
            actual_fee: Decimal::ZERO,
            insurance: request.insurance,
            username: username.clone(),
            due_soon_sent: false,
            overdue_sent: false,
            cancel_reason: None,
            returned_on: None,
        };
        AvailabilityEngine::reserve(
            vehicle,
            Booking {
                rental_id: rental.id,
                renter: username,
                range,
            },
        );

        self.index(&rental);
        self.rentals.insert(rental.id, rental.clone());
        self.settle_vehicle_status(rental.vehicle_id);

        info!(
            rental_id = %rental.id,
            vehicle_id = %rental.vehicle_id,
            user = %rental.username,
            total_fee = %rental.total_fee,
            "Rental requested"
        );
        Ok(Transition {
            events: vec![DomainEvent::RentalRequested {
                rental: rental.clone(),
            }],
            rental,
        })
    }

    /// Approves a pending rental and issues its pickup ticket.
    ///
    /// # Errors
    ///
    /// `NotFound` or `InvalidState` when the rental is not Pending.
    pub fn approve(
        &mut self,
        rental_id: RentalId,
        today: NaiveDate,
    ) -> Result<Transition, RentalError> {
        let mut rental = self.rental(rental_id)?.clone();
        let action = LifecycleService::approve(rental.status)?;
        let vehicle = self
            .vehicles
            .get(&rental.vehicle_id)
            .ok_or_else(|| RentalError::not_found("Vehicle", rental.vehicle_id))?;

        // the ticket exists before anyone can observe the rental as Active
        let ticket = self.tickets.issue(&rental, vehicle, today);
        rental.apply(&action);
        self.rentals.insert(rental.id, rental.clone());
        self.settle_vehicle_status(rental.vehicle_id);

        info!(rental_id = %rental.id, ticket = %ticket.code, "Rental approved");
        Ok(Transition {
            events: vec![DomainEvent::RentalApproved {
                rental: rental.clone(),
                ticket,
            }],
            rental,
        })
    }

    /// Cancels a pending rental and frees its dates.
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidState` unless Pending, `Validation` for a blank reason.
    pub fn cancel(&mut self, rental_id: RentalId, reason: String) -> Result<Transition, RentalError> {
        let mut rental = self.rental(rental_id)?.clone();
        let action = LifecycleService::cancel(rental.status, reason)?;

        if let Some(vehicle) = self.vehicles.get_mut(&rental.vehicle_id) {
            AvailabilityEngine::release(vehicle, rental.id, rental.range());
        }
        self.tickets.revoke(rental.id);
        rental.apply(&action);
        self.rentals.insert(rental.id, rental.clone());
        self.settle_vehicle_status(rental.vehicle_id);

        let reason = rental.cancel_reason.clone().unwrap_or_default();
        info!(rental_id = %rental.id, reason = %reason, "Rental cancelled");
        Ok(Transition {
            events: vec![DomainEvent::RentalRejected {
                rental: rental.clone(),
                reason,
            }],
            rental,
        })
    }

    /// Validates a pickup ticket at the counter.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown code, `InvalidState` when the rental is not
    /// Active, `TicketRejected` when the gate refuses the ticket.
    pub fn validate_ticket(
        &mut self,
        code: &str,
        presented_name: &str,
        today: NaiveDate,
    ) -> Result<Transition, RentalError> {
        let rental_id = self
            .tickets
            .rental_for_code(code)
            .ok_or_else(|| RentalError::not_found("Ticket", code.trim().to_uppercase()))?;
        let rental = self.rental(rental_id)?;
        if rental.status != RentalStatus::Active {
            return Err(RentalError::InvalidState {
                from: rental.status,
                action: RentalAction::Pickup,
            });
        }
        let rental = rental.clone();

        let ticket = self.tickets.validate(code, presented_name, today)?;
        info!(rental_id = %rental.id, ticket = %ticket.code, "Pickup confirmed");
        Ok(Transition {
            events: vec![DomainEvent::PickupConfirmed {
                rental: rental.clone(),
                ticket,
            }],
            rental,
        })
    }

    /// Takes a vehicle back, bills the rental and logs reported damage.
    ///
    /// Each non-blank damage note becomes a maintenance issue at the policy's
    /// default severity.
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidState` unless Active, `TicketNotUsed` when the
    /// vehicle was never picked up.
    pub fn return_rental(
        &mut self,
        rental_id: RentalId,
        damages: &[String],
        today: NaiveDate,
    ) -> Result<Transition, RentalError> {
        let mut rental = self.rental(rental_id)?.clone();
        let action = LifecycleService::return_rental(rental.status, today)?;
        if !self
            .tickets
            .get_by_rental_id(rental_id)
            .is_some_and(|t| t.used)
        {
            return Err(RentalError::TicketNotUsed(rental_id));
        }

        let threshold = self.policy.critical_severity;
        let severity = self.policy.default_damage_severity.clamp(1, 5);
        let vehicle = self.vehicle_mut(rental.vehicle_id)?;

        rental.actual_fee =
            FeeCalculator::actual_fee(&vehicle.pricing, rental.range(), today, rental.insurance)?;
        AvailabilityEngine::release(vehicle, rental.id, rental.range());

        let mut critical = Vec::new();
        for note in damages.iter().filter(|d| !d.trim().is_empty()) {
            let issue = vehicle.add_issue(
                NewIssue {
                    kind: "damage".to_string(),
                    description: note.clone(),
                    reported_by: rental.username.clone(),
                    severity,
                },
                today,
            )?;
            if issue.is_critical(threshold) {
                critical.push(issue);
            }
        }

        rental.apply(&action);
        self.rentals.insert(rental.id, rental.clone());
        self.settle_vehicle_status(rental.vehicle_id);

        info!(
            rental_id = %rental.id,
            actual_fee = %rental.actual_fee,
            damages = damages.len(),
            "Rental returned"
        );

        let mut events = vec![DomainEvent::RentalReturned {
            rental: rental.clone(),
        }];
        if !critical.is_empty() {
            let vehicle = self.vehicle(rental.vehicle_id)?;
            warn!(vehicle_id = %vehicle.id, status = %vehicle.status, "Vehicle returned with critical damage");
            events.extend(critical.into_iter().map(|issue| {
                DomainEvent::CriticalMaintenance {
                    vehicle: vehicle.clone(),
                    issue,
                }
            }));
        }

        Ok(Transition { rental, events })
    }

    /// Moves an active rental's end date later.
    ///
    /// Only other renters' booked days block an extension; the buffer does
    /// not apply.
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidState` unless Active, `Validation` when `new_end`
    /// does not lengthen the rental, `Conflict` when the new days are taken.
    pub fn extend(
        &mut self,
        rental_id: RentalId,
        new_end: NaiveDate,
        insurance: bool,
        today: NaiveDate,
    ) -> Result<Transition, RentalError> {
        let mut rental = self.rental(rental_id)?.clone();
        let action = LifecycleService::extend(rental.status, rental.end_date, new_end)?;
        let old_range = rental.range();
        let new_range = DateRange::new(rental.start_date, new_end)?;

        let rentals = &self.rentals;
        let vehicle = self
            .vehicles
            .get_mut(&rental.vehicle_id)
            .ok_or_else(|| RentalError::not_found("Vehicle", rental.vehicle_id))?;
        self.engine
            .can_extend(vehicle, new_range, &rental.username, |id| {
                rentals.get(&id).map(|r| r.status)
            })
            .map_err(RentalError::Conflict)?;
        let total_fee = FeeCalculator::estimate(&vehicle.pricing, new_range, insurance)?;

        AvailabilityEngine::release(vehicle, rental.id, old_range);
        AvailabilityEngine::reserve(
            vehicle,
            Booking {
                rental_id: rental.id,
                renter: rental.username.clone(),
                range: new_range,
            },
        );

        rental.apply(&action);
        rental.insurance = insurance;
        rental.total_fee = total_fee;
        let ticket = self.tickets.reissue(&rental, vehicle, today);
        self.rentals.insert(rental.id, rental.clone());

        info!(
            rental_id = %rental.id,
            new_end = %new_end,
            total_fee = %rental.total_fee,
            "Rental extended"
        );
        Ok(Transition {
            events: vec![DomainEvent::RentalExtended {
                rental: rental.clone(),
                ticket,
            }],
            rental,
        })
    }

    /// Flags active rentals that end soon or are overdue, once each.
    pub fn collect_reminders(&mut self, today: NaiveDate) -> Vec<DomainEvent> {
        let due_soon_days = i64::from(self.policy.due_soon_days);
        let mut active: Vec<&mut Rental> = self
            .rentals
            .values_mut()
            .filter(|r| r.status == RentalStatus::Active)
            .collect();
        active.sort_by_key(|r| r.id);

        let mut events = Vec::new();
        for rental in active {
            let days_left = (rental.end_date - today).num_days();
            if days_left < 0 {
                if !rental.overdue_sent {
                    rental.overdue_sent = true;
                    events.push(DomainEvent::Overdue {
                        rental: rental.clone(),
                    });
                }
            } else if days_left <= due_soon_days && !rental.due_soon_sent {
                rental.due_soon_sent = true;
                events.push(DomainEvent::DueSoon {
                    rental: rental.clone(),
                });
            }
        }

        if !events.is_empty() {
            debug!(count = events.len(), %today, "Reminders collected");
        }
        events
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Why `user` could not book `vehicle_id` for the dates, if anything.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown vehicle, `Validation` for an inverted range.
    pub fn conflicts(
        &self,
        vehicle_id: VehicleId,
        start: NaiveDate,
        end: NaiveDate,
        user: &str,
    ) -> Result<Option<BookingConflict>, RentalError> {
        let range = DateRange::new(start, end)?;
        let vehicle = self.vehicle(vehicle_id)?;
        Ok(self
            .engine
            .can_book(vehicle, range, user.trim(), |id| self.rental_status(id))
            .err())
    }

    /// Vehicles `user` could book for the dates, ordered by plate.
    ///
    /// # Errors
    ///
    /// `Validation` for an inverted range.
    pub fn available_vehicles(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        user: &str,
    ) -> Result<Vec<&Vehicle>, RentalError> {
        let range = DateRange::new(start, end)?;
        let threshold = self.policy.critical_severity;
        let user = user.trim();

        let mut found: Vec<&Vehicle> = self
            .vehicles
            .values()
            .filter(|v| {
                matches!(v.status, VehicleStatus::Available | VehicleStatus::Reserved)
                    && !v.has_critical_issue(threshold)
            })
            .filter(|v| {
                self.engine
                    .can_book(v, range, user, |id| self.rental_status(id))
                    .is_ok()
            })
            .collect();
        found.sort_by(|a, b| a.plate.cmp(&b.plate));
        Ok(found)
    }

    /// A vehicle by id.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown vehicle.
    pub fn vehicle(&self, vehicle_id: VehicleId) -> Result<&Vehicle, RentalError> {
        self.vehicles
            .get(&vehicle_id)
            .ok_or_else(|| RentalError::not_found("Vehicle", vehicle_id))
    }

    /// A rental by id.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown rental.
    pub fn rental(&self, rental_id: RentalId) -> Result<&Rental, RentalError> {
        self.rentals
            .get(&rental_id)
            .ok_or_else(|| RentalError::not_found("Rental", rental_id))
    }

    /// The fleet, ordered by plate.
    #[must_use]
    pub fn vehicles(&self) -> Vec<&Vehicle> {
        let mut vehicles: Vec<&Vehicle> = self.vehicles.values().collect();
        vehicles.sort_by(|a, b| a.plate.cmp(&b.plate));
        vehicles
    }

    /// All rentals, oldest first.
    #[must_use]
    pub fn rentals(&self) -> Vec<&Rental> {
        let mut rentals: Vec<&Rental> = self.rentals.values().collect();
        rentals.sort_by_key(|r| r.id);
        rentals
    }

    /// Rentals owned by `username`, oldest first.
    #[must_use]
    pub fn rentals_for_user(&self, username: &str) -> Vec<&Rental> {
        self.rentals_by_user
            .get(username.trim())
            .into_iter()
            .flatten()
            .filter_map(|id| self.rentals.get(id))
            .collect()
    }

    /// Rentals of one vehicle, oldest first.
    #[must_use]
    pub fn rentals_for_vehicle(&self, vehicle_id: VehicleId) -> Vec<&Rental> {
        self.rentals_by_vehicle
            .get(&vehicle_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.rentals.get(id))
            .collect()
    }

    /// The current ticket of a rental, if one was issued.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown rental.
    pub fn ticket_for_rental(&self, rental_id: RentalId) -> Result<Option<&Ticket>, RentalError> {
        self.rental(rental_id)?;
        Ok(self.tickets.get_by_rental_id(rental_id))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn vehicle_mut(&mut self, vehicle_id: VehicleId) -> Result<&mut Vehicle, RentalError> {
        self.vehicles
            .get_mut(&vehicle_id)
            .ok_or_else(|| RentalError::not_found("Vehicle", vehicle_id))
    }

    fn rental_status(&self, rental_id: RentalId) -> Option<RentalStatus> {
        self.rentals.get(&rental_id).map(|r| r.status)
    }

    fn index(&mut self, rental: &Rental) {
        self.rentals_by_vehicle
            .entry(rental.vehicle_id)
            .or_default()
            .push(rental.id);
        self.rentals_by_user
            .entry(rental.username.clone())
            .or_default()
            .push(rental.id);
    }

    /// Derives the vehicle status from its maintenance log and live bookings.
    ///
    /// Out of service is sticky until cleared explicitly.
    fn settle_vehicle_status(&mut self, vehicle_id: VehicleId) {
        let threshold = self.policy.critical_severity;
        let rentals = &self.rentals;
        let Some(vehicle) = self.vehicles.get_mut(&vehicle_id) else {
            return;
        };
        if vehicle.status == VehicleStatus::OutOfService {
            return;
        }

        let live: Vec<RentalStatus> = vehicle
            .schedule
            .iter()
            .filter_map(|b| rentals.get(&b.rental_id).map(|r| r.status))
            .filter(RentalStatus::is_live)
            .collect();

        let status = if vehicle.has_critical_issue(threshold) {
            VehicleStatus::UnderMaintenance
        } else if live.contains(&RentalStatus::Active) {
            VehicleStatus::Rented
        } else if live.contains(&RentalStatus::Pending) {
            VehicleStatus::Reserved
        } else {
            VehicleStatus::Available
        };

        if vehicle.status != status {
            debug!(vehicle_id = %vehicle_id, from = %vehicle.status, to = %status, "Vehicle status changed");
            vehicle.status = status;
        }
    }
}
