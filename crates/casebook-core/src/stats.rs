use crate::models::CaseStatus;
use crate::registry::{AppointmentRegistry, CaseRegistry};

/// Dashboard counters over the current collections.
#[derive(Clone)]
pub struct DataStatistics {
    cases: CaseRegistry,
    appointments: AppointmentRegistry,
}

impl DataStatistics {
    pub fn new(cases: CaseRegistry, appointments: AppointmentRegistry) -> Self {
        Self { cases, appointments }
    }

    /// All appointment records, cancelled history included.
    pub async fn total_appointments(&self) -> usize {
        self.appointments.get_all().await.len()
    }

    pub async fn approved_case_count(&self) -> usize {
        self.count_cases(CaseStatus::Approved).await
    }

    pub async fn pending_case_count(&self) -> usize {
        self.count_cases(CaseStatus::Pending).await
    }

    async fn count_cases(&self, status: CaseStatus) -> usize {
        self.cases
            .get_all()
            .await
            .iter()
            .filter(|c| c.status == status)
            .count()
    }
}
