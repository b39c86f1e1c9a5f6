use chrono::NaiveDate;
use tracing::{debug, info};

use super::{logged, or_empty, AppointmentRef};
use crate::error::{DataError, Result};
use crate::models::{Appointment, AppointmentStatus, SlotIndex, TimeRange};
use crate::store::CollectionStore;
use crate::storage::Collection;
use crate::utils::format_display_date;

/// CRUD over appointments. Every add/cancel keeps the slot index in step:
/// a slot is booked exactly while a confirmed appointment holds it.
#[derive(Clone)]
pub struct AppointmentRegistry {
    store: CollectionStore,
}

fn resolve(appointments: &[Appointment], reference: &AppointmentRef) -> Option<usize> {
    match reference {
        AppointmentRef::Id(id) => appointments.iter().position(|a| &a.id == id),
        AppointmentRef::Position(pos) => (*pos < appointments.len()).then_some(*pos),
        AppointmentRef::Identity { name, phone } => appointments
            .iter()
            .position(|a| a.has_identity(name, phone) && a.is_active()),
    }
}

impl AppointmentRegistry {
    pub fn new(store: CollectionStore) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> Vec<Appointment> {
        or_empty("appointments.get_all", self.store.read().await)
    }

    /// Book an appointment.
    ///
    /// Fails with `DuplicateActiveBooking` if the phone already holds an
    /// active appointment; nothing is written in that case.
    pub async fn add(&self, appointment: Appointment) -> Result<Appointment> {
        logged("appointments.add", self.try_add(appointment).await)
    }

    async fn try_add(&self, mut appointment: Appointment) -> Result<Appointment> {
        let mut appointments: Vec<Appointment> = self.store.read().await?;

        if appointments
            .iter()
            .any(|a| a.phone == appointment.phone && a.is_active())
        {
            return Err(DataError::DuplicateActiveBooking {
                phone: appointment.phone,
            });
        }

        if appointment.display_date.is_empty() {
            appointment.display_date = format_display_date(appointment.date);
        }

        appointments.push(appointment.clone());
        self.store.write(&appointments).await?;

        if appointment.status == AppointmentStatus::Confirmed {
            self.add_slot(appointment.date, appointment.time.clone()).await?;
        }

        info!(id = %appointment.id, date = %appointment.date, time = %appointment.time, "Appointment booked");
        Ok(appointment)
    }

    /// Cancel an appointment, freeing its slot. The record stays in the
    /// collection with status `cancelled`.
    pub async fn cancel(&self, reference: impl Into<AppointmentRef>) -> Result<Appointment> {
        let reference = reference.into();
        logged("appointments.cancel", self.try_cancel(&reference).await)
    }

    async fn try_cancel(&self, reference: &AppointmentRef) -> Result<Appointment> {
        let mut appointments: Vec<Appointment> = self.store.read().await?;
        let pos = resolve(&appointments, reference).ok_or_else(|| DataError::not_found(reference))?;

        if !appointments[pos].is_active() {
            debug!(id = %appointments[pos].id, "Appointment already cancelled");
            return Ok(appointments[pos].clone());
        }

        appointments[pos].status = AppointmentStatus::Cancelled;
        let date = appointments[pos].date;
        let time = appointments[pos].time.clone();

        // Several phones may share a slot; free it only when nobody else holds it.
        if !appointments.iter().any(|a| a.occupies(date, &time)) {
            self.remove_slot(date, &time).await?;
        }

        self.store.write(&appointments).await?;

        info!(id = %appointments[pos].id, date = %date, time = %time, "Appointment cancelled");
        Ok(appointments[pos].clone())
    }

    /// The active appointment booked under `name` and `phone`, if any.
    pub async fn find_active_by_identity(&self, name: &str, phone: &str) -> Option<Appointment> {
        logged(
            "appointments.find_active_by_identity",
            self.try_find_active(name, phone).await,
        )
        .ok()
        .flatten()
    }

    pub(crate) async fn try_find_active(&self, name: &str, phone: &str) -> Result<Option<Appointment>> {
        let appointments: Vec<Appointment> = self.store.read().await?;
        Ok(appointments
            .into_iter()
            .find(|a| a.has_identity(name, phone) && a.is_active()))
    }

    pub async fn booked_slots(&self) -> SlotIndex {
        or_empty("appointments.booked_slots", self.store.read().await)
    }

    pub async fn booked_slots_for(&self, date: NaiveDate) -> Vec<TimeRange> {
        self.booked_slots().await.booked_on(date).to_vec()
    }

    pub async fn is_slot_booked(&self, date: NaiveDate, time: &TimeRange) -> bool {
        self.booked_slots().await.is_booked(date, time)
    }

    /// Recompute the slot index from confirmed appointments.
    ///
    /// The stored index is replaced when its bookings differ from the
    /// derived ones or when it was never written.
    pub async fn rebuild_slot_index(&self) -> Result<SlotIndex> {
        logged("appointments.rebuild_slot_index", self.try_rebuild().await)
    }

    async fn try_rebuild(&self) -> Result<SlotIndex> {
        let appointments: Vec<Appointment> = self.store.read().await?;
        let derived = SlotIndex::from_appointments(&appointments);

        let stored = if self.store.exists(Collection::BookedSlots).await? {
            match self.store.read::<SlotIndex>().await {
                Ok(stored) => Some(stored),
                Err(e) => {
                    debug!(error = %e, "Stored slot index unreadable, replacing");
                    None
                }
            }
        } else {
            None
        };

        match stored {
            Some(stored) if stored.same_bookings(&derived) => Ok(stored),
            _ => {
                info!(slots = derived.len(), "Rewriting slot index from appointments");
                self.store.write(&derived).await?;
                Ok(derived)
            }
        }
    }

    async fn add_slot(&self, date: NaiveDate, time: TimeRange) -> Result<()> {
        let mut slots: SlotIndex = self.store.read().await?;
        if slots.insert(date, time) {
            self.store.write(&slots).await?;
        }
        Ok(())
    }

    async fn remove_slot(&self, date: NaiveDate, time: &TimeRange) -> Result<()> {
        let mut slots: SlotIndex = self.store.read().await?;
        if slots.remove(date, time) {
            self.store.write(&slots).await?;
        }
        Ok(())
    }
}
