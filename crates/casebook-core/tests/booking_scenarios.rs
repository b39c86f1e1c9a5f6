//! End-to-end booking scenarios through the public `Casebook` API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use casebook_core::{
    Appointment, AppointmentRef, AppointmentStatus, Case, Casebook, Collection, DataError,
    FileStorage, MemoryStorage, RecordId, SlotIndex, Snapshot, StorageAdapter, Subscriber,
};
use chrono::NaiveDate;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

async fn casebook() -> (Casebook, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let casebook = Casebook::new(storage.clone());
    casebook.initialize().await.unwrap();
    (casebook, storage)
}

fn counter(casebook: &Casebook) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let sink = count.clone();
    let subscriber: Subscriber = Arc::new(move |_: &Snapshot| -> anyhow::Result<()> {
        sink.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    for collection in Collection::ALL {
        casebook.subscribe(collection, subscriber.clone());
    }
    count
}

async fn assert_slot_index_matches(casebook: &Casebook) {
    let appointments = casebook.appointments().get_all().await;
    let derived = SlotIndex::from_appointments(&appointments);
    let stored = casebook.appointments().booked_slots().await;
    assert!(
        stored.same_bookings(&derived),
        "slot index {:?} diverged from confirmed appointments {:?}",
        stored,
        derived
    );
}

#[tokio::test]
async fn test_book_then_cancel_frees_slot_and_keeps_history() {
    let (casebook, _) = casebook().await;
    let appointments = casebook.appointments();

    let booked = appointments
        .add(Appointment::new("A", "111", date("2025-09-18"), "09:00-10:00"))
        .await
        .unwrap();
    assert!(appointments
        .booked_slots_for(date("2025-09-18"))
        .await
        .contains(&"09:00-10:00".into()));

    appointments.cancel(booked.id).await.unwrap();

    assert!(!appointments
        .booked_slots_for(date("2025-09-18"))
        .await
        .contains(&"09:00-10:00".into()));
    let all = appointments.get_all().await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, booked.id);
    assert_eq!(all[0].status, AppointmentStatus::Cancelled);
}

#[tokio::test]
async fn test_second_active_booking_for_phone_fails() {
    let (casebook, storage) = casebook().await;
    let appointments = casebook.appointments();

    appointments
        .add(Appointment::new("A", "222", date("2025-09-18"), "09:00-10:00"))
        .await
        .unwrap();
    let before_appointments = storage.raw(Collection::Appointments);
    let before_slots = storage.raw(Collection::BookedSlots);

    let result = appointments
        .add(Appointment::new("A", "222", date("2025-09-20"), "14:00-15:00"))
        .await;

    assert!(matches!(result, Err(DataError::DuplicateActiveBooking { .. })));
    assert_eq!(appointments.get_all().await.len(), 1);
    assert_eq!(storage.raw(Collection::Appointments), before_appointments);
    assert_eq!(storage.raw(Collection::BookedSlots), before_slots);
}

#[tokio::test]
async fn test_slot_index_tracks_confirmed_appointments_through_any_sequence() {
    let (casebook, _) = casebook().await;
    let appointments = casebook.appointments();

    let phones = ["100", "200", "300", "400"];
    let dates = ["2025-09-18", "2025-09-19"];
    let times = ["09:00-10:00", "10:00-11:00"];

    // Small linear congruential generator keeps the sequence reproducible
    let mut seed: u32 = 0x2545_f491;
    let mut next = move |bound: usize| {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        (seed >> 16) as usize % bound
    };

    for _ in 0..60 {
        let phone = phones[next(phones.len())];
        if next(3) == 0 {
            let _ = appointments
                .cancel(AppointmentRef::identity("Applicant", phone))
                .await;
        } else {
            let appointment = Appointment::new(
                "Applicant",
                phone,
                date(dates[next(dates.len())]),
                times[next(times.len())],
            );
            let _ = appointments.add(appointment).await;
        }
        assert_slot_index_matches(&casebook).await;
    }
}

#[tokio::test]
async fn test_cancel_unknown_reference_is_silent_failure() {
    let (casebook, storage) = casebook().await;
    casebook
        .appointments()
        .add(Appointment::new("A", "111", date("2025-09-18"), "09:00-10:00"))
        .await
        .unwrap();
    let before = storage.raw(Collection::Appointments);
    let count = counter(&casebook);

    let by_id = casebook.appointments().cancel(RecordId::generate()).await;
    let by_position = casebook.appointments().cancel(9usize).await;
    let by_identity = casebook
        .appointments()
        .cancel(AppointmentRef::identity("A", "999"))
        .await;

    assert!(by_id.unwrap_err().is_not_found());
    assert!(by_position.unwrap_err().is_not_found());
    assert!(by_identity.unwrap_err().is_not_found());
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert_eq!(storage.raw(Collection::Appointments), before);
}

#[tokio::test]
async fn test_deleting_case_cancels_its_appointment() {
    let (casebook, _) = casebook().await;
    let case = casebook
        .cases()
        .add(Case::new("Zhang San", "13800138001"))
        .await
        .unwrap();
    let booked = casebook
        .appointments()
        .add(Appointment::new("Zhang San", "13800138001", date("2025-10-16"), "10:00-11:00"))
        .await
        .unwrap();

    casebook.cases().delete(case.id).await.unwrap();

    assert!(casebook.cases().get_all().await.is_empty());
    let all = casebook.appointments().get_all().await;
    assert_eq!(all[0].id, booked.id);
    assert_eq!(all[0].status, AppointmentStatus::Cancelled);
    assert!(
        !casebook
            .appointments()
            .is_slot_booked(date("2025-10-16"), &"10:00-11:00".into())
            .await
    );
    assert_slot_index_matches(&casebook).await;
}

#[tokio::test]
async fn test_search_without_term_returns_everything_in_order() {
    let (casebook, _) = casebook().await;
    let mut ids = Vec::new();
    for (name, phone) in [("Wang Wu", "13700137003"), ("Li Si", "13900139002"), ("Zhang San", "13800138001")] {
        ids.push(casebook.cases().add(Case::new(name, phone)).await.unwrap().id);
    }

    let found = |cases: Vec<Case>| cases.into_iter().map(|c| c.id).collect::<Vec<_>>();
    assert_eq!(found(casebook.cases().search(Some("")).await), ids);
    assert_eq!(found(casebook.cases().search(None).await), ids);
}

#[tokio::test]
async fn test_writing_back_read_value_causes_no_drift() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStorage::new(dir.path().to_path_buf()).unwrap());
    let casebook = Casebook::new(storage.clone()).with_demo_data(true);
    casebook.initialize().await.unwrap();

    for collection in Collection::ALL {
        let first = storage.read(collection).await.unwrap().unwrap();
        storage.write(collection, &first).await.unwrap();
        let second = storage.read(collection).await.unwrap().unwrap();
        storage.write(collection, &second).await.unwrap();
        assert_eq!(storage.read(collection).await.unwrap().unwrap(), first);
    }

    // A fresh casebook over the same directory sees identical records
    let reopened = Casebook::new(Arc::new(FileStorage::new(dir.path().to_path_buf()).unwrap()));
    reopened.initialize().await.unwrap();
    assert_eq!(reopened.cases().get_all().await, casebook.cases().get_all().await);
    assert_eq!(
        reopened.appointments().get_all().await,
        casebook.appointments().get_all().await
    );
}
