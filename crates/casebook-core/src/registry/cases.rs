use tracing::info;

use super::{logged, or_empty, AppointmentRef, AppointmentRegistry, CaseRef};
use crate::error::{DataError, Result};
use crate::models::{Case, CaseStatus};
use crate::store::CollectionStore;

/// CRUD and search over cases.
#[derive(Clone)]
pub struct CaseRegistry {
    store: CollectionStore,
    appointments: AppointmentRegistry,
}

fn resolve(cases: &[Case], reference: CaseRef) -> Option<usize> {
    match reference {
        CaseRef::Id(id) => cases.iter().position(|c| c.id == id),
        CaseRef::Position(pos) => (pos < cases.len()).then_some(pos),
    }
}

impl CaseRegistry {
    pub fn new(store: CollectionStore, appointments: AppointmentRegistry) -> Self {
        Self { store, appointments }
    }

    pub async fn get_all(&self) -> Vec<Case> {
        or_empty("cases.get_all", self.store.read().await)
    }

    /// Append a case. Duplicates are allowed.
    pub async fn add(&self, case: Case) -> Result<Case> {
        logged("cases.add", self.try_add(case).await)
    }

    async fn try_add(&self, case: Case) -> Result<Case> {
        let mut cases: Vec<Case> = self.store.read().await?;
        cases.push(case.clone());
        self.store.write(&cases).await?;
        info!(id = %case.id, "Case added");
        Ok(case)
    }

    pub async fn update_status(&self, reference: impl Into<CaseRef>, status: CaseStatus) -> Result<Case> {
        logged(
            "cases.update_status",
            self.modify(reference.into(), |case| case.status = status).await,
        )
    }

    pub async fn update_reason(&self, reference: impl Into<CaseRef>, reason: impl Into<String>) -> Result<Case> {
        let reason = reason.into();
        logged(
            "cases.update_reason",
            self.modify(reference.into(), move |case| case.reason = reason).await,
        )
    }

    /// Set status and reason together in one write.
    pub async fn update_status_with_reason(
        &self,
        reference: impl Into<CaseRef>,
        status: CaseStatus,
        reason: impl Into<String>,
    ) -> Result<Case> {
        let reason = reason.into();
        logged(
            "cases.update_status_with_reason",
            self.modify(reference.into(), move |case| {
                case.status = status;
                case.reason = reason;
            })
            .await,
        )
    }

    async fn modify(&self, reference: CaseRef, change: impl FnOnce(&mut Case)) -> Result<Case> {
        let mut cases: Vec<Case> = self.store.read().await?;
        let pos = resolve(&cases, reference).ok_or_else(|| DataError::not_found(reference))?;
        change(&mut cases[pos]);
        self.store.write(&cases).await?;
        Ok(cases[pos].clone())
    }

    /// Remove a case. An active appointment booked under the same name and
    /// phone is cancelled first, freeing its slot.
    pub async fn delete(&self, reference: impl Into<CaseRef>) -> Result<Case> {
        logged("cases.delete", self.try_delete(reference.into()).await)
    }

    async fn try_delete(&self, reference: CaseRef) -> Result<Case> {
        let mut cases: Vec<Case> = self.store.read().await?;
        let pos = resolve(&cases, reference).ok_or_else(|| DataError::not_found(reference))?;
        let removed = cases.remove(pos);

        if !removed.name.is_empty() && !removed.phone.is_empty() {
            if let Some(appointment) = self
                .appointments
                .try_find_active(&removed.name, &removed.phone)
                .await?
            {
                self.appointments
                    .cancel(AppointmentRef::Id(appointment.id))
                    .await?;
                info!(case = %removed.id, appointment = %appointment.id, "Cancelled appointment of deleted case");
            }
        }

        self.store.write(&cases).await?;
        info!(id = %removed.id, "Case deleted");
        Ok(removed)
    }

    pub async fn find_by_identity(&self, name: &str, phone: &str) -> Option<Case> {
        self.get_all()
            .await
            .into_iter()
            .find(|c| c.has_identity(name, phone))
    }

    /// Case-insensitive substring search over name and phone.
    /// An empty or absent term returns every case.
    pub async fn search(&self, term: Option<&str>) -> Vec<Case> {
        let cases = self.get_all().await;
        match term.map(str::trim) {
            None | Some("") => cases,
            Some(term) => cases.into_iter().filter(|c| c.matches_term(term)).collect(),
        }
    }
}
