//! Persistent record helpers.
//!
//! Only bounded configuration (admins' settings, counters, delays) lives in
//! `instance()` storage. Records that grow with use, such as role
//! memberships, circuit states, queued transactions, requests and balances,
//! live in `persistent()` storage where each entry carries its own TTL.
//!
//! [`load`] and [`save`] bump the entry's TTL on every access, so a record
//! that is still in use never lapses, while abandoned ones age out.

use core::fmt::Debug;
use soroban_sdk::{Env, IntoVal, TryFromVal, Val};

/// Minimum ledger TTL before a bump is requested (~1 day at 5 s/ledger).
pub const BUMP_THRESHOLD: u32 = 17_280;
/// Target TTL after a bump (~30 days).
pub const BUMP_TARGET: u32 = 518_400;

/// Read a persistent record and bump its TTL if it exists.
pub fn load<K, V>(e: &Env, key: &K) -> Option<V>
where
    K: IntoVal<Env, Val>,
    V: TryFromVal<Env, Val>,
    V::Error: Debug,
{
    let storage = e.storage().persistent();
    let value = storage.get(key)?;
    storage.extend_ttl(key, BUMP_THRESHOLD, BUMP_TARGET);
    Some(value)
}

/// Write a persistent record and bump its TTL.
pub fn save<K, V>(e: &Env, key: &K, value: &V)
where
    K: IntoVal<Env, Val>,
    V: IntoVal<Env, Val>,
{
    let storage = e.storage().persistent();
    storage.set(key, value);
    storage.extend_ttl(key, BUMP_THRESHOLD, BUMP_TARGET);
}

pub fn has<K>(e: &Env, key: &K) -> bool
where
    K: IntoVal<Env, Val>,
{
    e.storage().persistent().has(key)
}

pub fn remove<K>(e: &Env, key: &K)
where
    K: IntoVal<Env, Val>,
{
    e.storage().persistent().remove(key);
}
