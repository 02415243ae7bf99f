//! Shared per-user event caches.
//!
//! [`EventStore`] owns one cache slot per `(user, kind)` and is the only
//! place a refreshed snapshot gets written back. A slot is replaced only
//! after its update fully succeeds. Refreshes of the same slot are
//! single-flight: a second refresh started while the first is running
//! fails with [`Error::UpdateInFlight`] instead of racing it.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use alloy::primitives::Address;
use alloy::providers::Provider;

use crate::cache::EventCache;
use crate::client::PrizeVault;
use crate::error::{Error, Result};
use crate::format::{ClaimedPrizeEvent, FlashEvent, TransferEvent};

/// Cache lineage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// Vault share transfers.
    Transfers,
    /// Flash swaps paying out to the user.
    Flashes,
    /// Prizes claimed for the user.
    ClaimedPrizes,
}

impl EventKind {
    /// Stable lowercase name, also used as a file stem by snapshot stores.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transfers => "transfers",
            Self::Flashes => "flashes",
            Self::ClaimedPrizes => "claimed_prizes",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Slots<T>(Mutex<HashMap<Address, EventCache<T>>>);

impl<T: Clone> Slots<T> {
    fn get(&self, user: Address) -> EventCache<T> {
        lock(&self.0).get(&user).cloned().unwrap_or_default()
    }

    fn set(&self, user: Address, cache: EventCache<T>) {
        lock(&self.0).insert(user, cache);
    }
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self(Mutex::new(HashMap::new()))
    }
}

/// Marks a slot busy until dropped.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<(Address, EventKind)>>,
    key: (Address, EventKind),
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.set).remove(&self.key);
    }
}

/// Per-user caches for every event lineage.
#[derive(Default)]
pub struct EventStore {
    transfers: Slots<TransferEvent>,
    flashes: Slots<FlashEvent>,
    claimed_prizes: Slots<ClaimedPrizeEvent>,
    in_flight: Mutex<HashSet<(Address, EventKind)>>,
}

impl fmt::Debug for EventStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStore")
            .field("in_flight", &lock(&self.in_flight).len())
            .finish_non_exhaustive()
    }
}

impl EventStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn begin(&self, user: Address, kind: EventKind) -> Result<InFlight<'_>> {
        let key = (user, kind);
        if !lock(&self.in_flight).insert(key) {
            return Err(Error::UpdateInFlight { user, kind });
        }
        Ok(InFlight {
            set: &self.in_flight,
            key,
        })
    }

    /// Current transfer snapshot for `user` (empty if never set).
    #[must_use]
    pub fn transfers(&self, user: Address) -> EventCache<TransferEvent> {
        self.transfers.get(user)
    }

    /// Current flash event snapshot for `user`.
    #[must_use]
    pub fn flashes(&self, user: Address) -> EventCache<FlashEvent> {
        self.flashes.get(user)
    }

    /// Current claimed prize snapshot for `user`.
    #[must_use]
    pub fn claimed_prizes(&self, user: Address) -> EventCache<ClaimedPrizeEvent> {
        self.claimed_prizes.get(user)
    }

    /// Replace `user`'s transfer snapshot, e.g. with one loaded from disk.
    pub fn seed_transfers(&self, user: Address, cache: EventCache<TransferEvent>) {
        self.transfers.set(user, cache);
    }

    /// Replace `user`'s flash event snapshot.
    pub fn seed_flashes(&self, user: Address, cache: EventCache<FlashEvent>) {
        self.flashes.set(user, cache);
    }

    /// Replace `user`'s claimed prize snapshot.
    pub fn seed_claimed_prizes(&self, user: Address, cache: EventCache<ClaimedPrizeEvent>) {
        self.claimed_prizes.set(user, cache);
    }

    /// Fetch and store `user`'s new transfers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UpdateInFlight`] if a transfer refresh for `user` is
    /// already running, or the updater's error. The slot is unchanged on
    /// error.
    pub async fn refresh_transfers<P: Provider>(
        &self,
        client: &PrizeVault<P>,
        user: Address,
    ) -> Result<EventCache<TransferEvent>> {
        let _guard = self.begin(user, EventKind::Transfers)?;
        let next = client
            .update_user_transfer_events(user, &self.transfers.get(user))
            .await?;
        self.transfers.set(user, next.clone());
        Ok(next)
    }

    /// Fetch and store `user`'s new flash events from `swappers`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::refresh_transfers`].
    pub async fn refresh_flashes<P: Provider>(
        &self,
        client: &PrizeVault<P>,
        user: Address,
        swappers: &[Address],
    ) -> Result<EventCache<FlashEvent>> {
        let _guard = self.begin(user, EventKind::Flashes)?;
        let next = client
            .update_user_flash_events(user, swappers, &self.flashes.get(user))
            .await?;
        self.flashes.set(user, next.clone());
        Ok(next)
    }

    /// Fetch and store `user`'s new claimed prizes.
    ///
    /// # Errors
    ///
    /// Same as [`Self::refresh_transfers`].
    pub async fn refresh_claimed_prizes<P: Provider>(
        &self,
        client: &PrizeVault<P>,
        user: Address,
    ) -> Result<EventCache<ClaimedPrizeEvent>> {
        let _guard = self.begin(user, EventKind::ClaimedPrizes)?;
        let next = client
            .update_user_claimed_prize_events(user, &self.claimed_prizes.get(user))
            .await?;
        self.claimed_prizes.set(user, next.clone());
        Ok(next)
    }
}
