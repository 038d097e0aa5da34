use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serenity::model::id::{ChannelId, UserId};
use tokio::sync::RwLock;

/// One confirmed slot booking. Records are immutable once inserted and
/// leave the book through cancellation or the archival sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    /// Canonical slot label, e.g. "Lundi 9h - 10h".
    pub slot_label: String,
    /// When the booking was confirmed; drives the 24h retention clock.
    pub created_at: DateTime<Utc>,
    /// Private text channel provisioned for this booking.
    pub channel_id: ChannelId,
    /// Category wrapping the private channel.
    pub category_id: ChannelId,
}

impl Reservation {
    /// A record stamped with the current time.
    pub fn new(slot_label: String, channel_id: ChannelId, category_id: ChannelId) -> Self {
        Self {
            slot_label,
            created_at: Utc::now(),
            channel_id,
            category_id,
        }
    }
}

/// Why [`ReservationStore::try_reserve`] refused an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveError {
    /// Another live reservation already holds the same slot label.
    SlotTaken,
    /// The user already holds a live reservation.
    AlreadyReserved,
}

/// In-memory reservation book keyed by Discord user ID, at most one
/// record per user.
///
/// The single `RwLock` is the only synchronization in the system. The
/// compound operations ([`try_reserve`](Self::try_reserve) and
/// [`pop_expired`](Self::pop_expired)) run their check and mutation under
/// one write guard, so racing confirmations, cancellations and sweeps
/// cannot interleave between a guard check and its insert or remove.
#[derive(Debug, Clone, Default)]
pub struct ReservationStore {
    inner: Arc<RwLock<HashMap<UserId, Reservation>>>,
}

impl ReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when any live reservation holds `label`. Linear scan over the
    /// book, which stays small (one entry per user).
    pub async fn is_slot_taken(&self, label: &str) -> bool {
        self.inner
            .read()
            .await
            .values()
            .any(|r| r.slot_label == label)
    }

    pub async fn get(&self, user: UserId) -> Option<Reservation> {
        self.inner.read().await.get(&user).cloned()
    }

    /// Unconditional insert, replacing any record the user already holds.
    /// Booking flows go through [`try_reserve`](Self::try_reserve) instead.
    pub async fn insert(&self, user: UserId, reservation: Reservation) {
        self.inner.write().await.insert(user, reservation);
    }

    /// Removes and returns the user's record. The returned `Option` is the
    /// authoritative outcome when removal paths race: whichever caller
    /// receives `Some` owns the follow-up channel work.
    pub async fn remove(&self, user: UserId) -> Option<Reservation> {
        self.inner.write().await.remove(&user)
    }

    /// Re-checks both booking guards and inserts, atomically.
    ///
    /// The slot guard runs before the duplicate guard, so a user who picked
    /// an already-taken slot hears about the slot, not about themselves.
    pub async fn try_reserve(
        &self,
        user: UserId,
        reservation: Reservation,
    ) -> Result<(), ReserveError> {
        let mut book = self.inner.write().await;

        if book.values().any(|r| r.slot_label == reservation.slot_label) {
            return Err(ReserveError::SlotTaken);
        }
        if book.contains_key(&user) {
            return Err(ReserveError::AlreadyReserved);
        }

        book.insert(user, reservation);
        Ok(())
    }

    /// Detaches and returns every record older than `retention`.
    ///
    /// Records leave the book under the write guard, before any archival
    /// I/O starts, so a concurrent cancellation can no longer observe them.
    pub async fn pop_expired(&self, retention: Duration) -> Vec<(UserId, Reservation)> {
        let now = Utc::now();
        let mut book = self.inner.write().await;

        let due: Vec<UserId> = book
            .iter()
            .filter(|(_, r)| now - r.created_at > retention)
            .map(|(user, _)| *user)
            .collect();

        due.into_iter()
            .filter_map(|user| book.remove(&user).map(|r| (user, r)))
            .collect()
    }

    /// Number of live reservations, for the health endpoint.
    pub async fn active_count(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reservation(label: &str) -> Reservation {
        Reservation::new(label.to_string(), ChannelId::new(100), ChannelId::new(200))
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = ReservationStore::new();
        assert!(!store.is_slot_taken("Lundi 9h - 10h").await);
        assert!(store.get(UserId::new(1)).await.is_none());
        assert_eq!(store.active_count().await, 0);
    }

    #[tokio::test]
    async fn test_insert_get_remove() {
        let store = ReservationStore::new();
        let user = UserId::new(1);

        store.insert(user, reservation("Lundi 9h - 10h")).await;
        assert!(store.is_slot_taken("Lundi 9h - 10h").await);
        assert!(!store.is_slot_taken("Lundi 10h - 11h").await);
        assert_eq!(
            store.get(user).await.map(|r| r.slot_label),
            Some("Lundi 9h - 10h".to_string())
        );

        let removed = store.remove(user).await;
        assert!(removed.is_some());
        assert!(store.remove(user).await.is_none());
        assert!(!store.is_slot_taken("Lundi 9h - 10h").await);
    }

    #[tokio::test]
    async fn test_try_reserve_guard_order() {
        let store = ReservationStore::new();
        let alice = UserId::new(1);
        let bob = UserId::new(2);

        store
            .try_reserve(alice, reservation("Lundi 9h - 10h"))
            .await
            .unwrap();

        // Same slot by someone else: the slot guard fires.
        assert_eq!(
            store.try_reserve(bob, reservation("Lundi 9h - 10h")).await,
            Err(ReserveError::SlotTaken)
        );

        // Different slot by a holder: the duplicate guard fires.
        assert_eq!(
            store
                .try_reserve(alice, reservation("Mardi 9h - 10h"))
                .await,
            Err(ReserveError::AlreadyReserved)
        );

        // A holder picking their own slot again still hears about the slot.
        assert_eq!(
            store
                .try_reserve(alice, reservation("Lundi 9h - 10h"))
                .await,
            Err(ReserveError::SlotTaken)
        );
    }

    #[tokio::test]
    async fn test_pop_expired_pops_only_stale_records() {
        let store = ReservationStore::new();
        let fresh = UserId::new(1);
        let stale = UserId::new(2);

        store.insert(fresh, reservation("Lundi 9h - 10h")).await;

        let mut old = reservation("Mardi 9h - 10h");
        old.created_at = Utc::now() - Duration::hours(25);
        store.insert(stale, old).await;

        let popped = store.pop_expired(Duration::hours(24)).await;
        assert_eq!(popped.len(), 1);
        assert_eq!(popped[0].0, stale);
        assert_eq!(popped[0].1.slot_label, "Mardi 9h - 10h");

        // Popped records are gone; a second sweep finds nothing.
        assert!(store.get(stale).await.is_none());
        assert!(store.pop_expired(Duration::hours(24)).await.is_empty());
        assert_eq!(store.active_count().await, 1);
    }
}
