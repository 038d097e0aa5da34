#![allow(clippy::unwrap_used)]

use chrono::{Duration, Utc};
use flyver_bot::store::reservations::{Reservation, ReservationStore, ReserveError};
use serenity::model::id::{ChannelId, UserId};

fn reservation(label: &str) -> Reservation {
    Reservation::new(label.to_string(), ChannelId::new(100), ChannelId::new(200))
}

fn aged_reservation(label: &str, age: Duration) -> Reservation {
    let mut r = reservation(label);
    r.created_at = Utc::now() - age;
    r
}

#[tokio::test]
async fn test_full_reservation_lifecycle() {
    let store = ReservationStore::new();
    let user = UserId::new(10);

    // Book
    store
        .try_reserve(user, reservation("Vendredi 18h - 19h"))
        .await
        .unwrap();
    assert!(store.is_slot_taken("Vendredi 18h - 19h").await);
    assert_eq!(store.active_count().await, 1);

    // Cancel
    let removed = store.remove(user).await.unwrap();
    assert_eq!(removed.slot_label, "Vendredi 18h - 19h");
    assert_eq!(store.active_count().await, 0);

    // Rebook the same slot after cancelling
    store
        .try_reserve(user, reservation("Vendredi 18h - 19h"))
        .await
        .unwrap();
    assert!(store.is_slot_taken("Vendredi 18h - 19h").await);
}

#[tokio::test]
async fn test_slot_frees_up_when_holder_cancels() {
    let store = ReservationStore::new();
    let alice = UserId::new(1);
    let bob = UserId::new(2);

    store
        .try_reserve(alice, reservation("Lundi 9h - 10h"))
        .await
        .unwrap();
    assert_eq!(
        store.try_reserve(bob, reservation("Lundi 9h - 10h")).await,
        Err(ReserveError::SlotTaken)
    );

    store.remove(alice).await.unwrap();

    // Bob can take the freed slot now
    store
        .try_reserve(bob, reservation("Lundi 9h - 10h"))
        .await
        .unwrap();
    assert_eq!(store.get(bob).await.unwrap().slot_label, "Lundi 9h - 10h");
}

#[tokio::test]
async fn test_concurrent_bookings_of_one_slot_admit_exactly_one() {
    let store = ReservationStore::new();

    let mut handles = Vec::new();
    for id in 1..=20u64 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .try_reserve(UserId::new(id), reservation("Samedi 12h - 13h"))
                .await
        }));
    }

    let mut winners = 0;
    let mut slot_taken = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => winners += 1,
            Err(e) => {
                assert_eq!(e, ReserveError::SlotTaken);
                slot_taken += 1;
            }
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(slot_taken, 19);
    assert_eq!(store.active_count().await, 1);
}

#[tokio::test]
async fn test_concurrent_bookings_by_one_user_admit_exactly_one() {
    let store = ReservationStore::new();
    let user = UserId::new(7);

    let mut handles = Vec::new();
    for hour in 9..=20u32 {
        let store = store.clone();
        let label = format!("Jeudi {}h - {}h", hour, hour + 1);
        handles.push(tokio::spawn(async move {
            store.try_reserve(user, reservation(&label)).await
        }));
    }

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            winners += 1;
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(store.active_count().await, 1);
}

#[tokio::test]
async fn test_concurrent_cancellations_yield_one_owner() {
    let store = ReservationStore::new();
    let user = UserId::new(3);
    store.insert(user, reservation("Lundi 9h - 10h")).await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let store = store.clone();
        handles.push(tokio::spawn(async move { store.remove(user).await }));
    }

    let mut claims = 0;
    for handle in handles {
        if handle.await.unwrap().is_some() {
            claims += 1;
        }
    }

    // Exactly one path wins the record and owns the archival work
    assert_eq!(claims, 1);
    assert_eq!(store.active_count().await, 0);
}

#[tokio::test]
async fn test_sweep_and_cancel_claim_a_record_once() {
    let store = ReservationStore::new();
    let user = UserId::new(4);
    store
        .insert(user, aged_reservation("Mardi 10h - 11h", Duration::hours(30)))
        .await;

    let sweeper = {
        let store = store.clone();
        tokio::spawn(async move { store.pop_expired(Duration::hours(24)).await })
    };
    let canceller = {
        let store = store.clone();
        tokio::spawn(async move { store.remove(user).await })
    };

    let popped = sweeper.await.unwrap();
    let removed = canceller.await.unwrap();

    let total_claims = popped.len() + usize::from(removed.is_some());
    assert_eq!(total_claims, 1);
    assert_eq!(store.active_count().await, 0);
}

#[tokio::test]
async fn test_retention_is_strictly_older_than() {
    let store = ReservationStore::new();
    let fresh = UserId::new(1);
    let near = UserId::new(2);
    let stale = UserId::new(3);

    store.insert(fresh, reservation("Lundi 9h - 10h")).await;
    store
        .insert(
            near,
            aged_reservation(
                "Mardi 9h - 10h",
                Duration::hours(24) - Duration::seconds(30),
            ),
        )
        .await;
    store
        .insert(
            stale,
            aged_reservation("Mercredi 9h - 10h", Duration::hours(24) + Duration::seconds(1)),
        )
        .await;

    let popped = store.pop_expired(Duration::hours(24)).await;

    assert_eq!(popped.len(), 1);
    assert_eq!(popped[0].0, stale);
    assert!(store.get(fresh).await.is_some());
    assert!(store.get(near).await.is_some());
}

#[tokio::test]
async fn test_popped_records_keep_their_channel_ids() {
    let store = ReservationStore::new();
    let user = UserId::new(5);

    let mut r = Reservation::new(
        "Dimanche 20h - 21h".to_string(),
        ChannelId::new(111),
        ChannelId::new(222),
    );
    r.created_at = Utc::now() - Duration::hours(48);
    store.insert(user, r).await;

    let popped = store.pop_expired(Duration::hours(24)).await;
    assert_eq!(popped.len(), 1);

    let (_, record) = &popped[0];
    assert_eq!(record.channel_id, ChannelId::new(111));
    assert_eq!(record.category_id, ChannelId::new(222));
}
