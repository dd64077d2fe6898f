//! Circuit breaker core.
//!
//! A circuit is either a guarded function (identified by its selector symbol)
//! or a whole contract. Tripping a circuit records who tripped it and when;
//! restoring clears the flag but keeps the last-break audit fields. When a
//! circuit was tripped with a non-zero `auto_restore_after`, reads report it
//! as closed once that many seconds have passed, with no write.
//!
//! Break and restore are asymmetric: Breakers and Admins may trip, only
//! Admins may restore.

use crate::roles::{self, Role};
use crate::storage;
use guardian_errors::ContractError;
use soroban_sdk::{contracttype, Address, Env, String, Symbol};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Circuit {
    /// A single guarded entry point.
    Function(Symbol),
    /// Every guarded entry point of a contract.
    Contract(Address),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CircuitState {
    /// Explicit broken flag; see [`is_broken`] for the expiry-aware reading.
    pub broken: bool,
    /// Ledger timestamp of the most recent trip.
    pub broken_at: u64,
    /// Principal that performed the most recent trip.
    pub broken_by: Address,
    /// Free-form reason supplied with the most recent trip.
    pub reason: String,
    /// Seconds after `broken_at` at which the trip lapses (0 = never).
    pub auto_restore_after: u64,
}

#[contracttype]
#[derive(Clone)]
enum CircuitKey {
    State(Circuit),
    AutoRestoreAfter,
}

pub fn auto_restore_after(e: &Env) -> u64 {
    e.storage()
        .instance()
        .get(&CircuitKey::AutoRestoreAfter)
        .unwrap_or(0)
}

/// Set the auto-restore duration applied to future trips. No auth check;
/// callers gate this behind their own configuration rules.
pub fn set_auto_restore_after(e: &Env, seconds: u64) {
    let old = auto_restore_after(e);
    e.storage()
        .instance()
        .set(&CircuitKey::AutoRestoreAfter, &seconds);
    e.events()
        .publish((Symbol::new(e, "auto_restore_set"),), (old, seconds));
}

pub fn state(e: &Env, circuit: &Circuit) -> Option<CircuitState> {
    storage::load(e, &CircuitKey::State(circuit.clone()))
}

/// Expiry-aware broken check.
pub fn is_broken(e: &Env, circuit: &Circuit) -> bool {
    match state(e, circuit) {
        Some(s) if s.broken => {
            s.auto_restore_after == 0
                || e.ledger().timestamp() < s.broken_at.saturating_add(s.auto_restore_after)
        }
        _ => false,
    }
}

/// Guard for protected entry points. Call before any state mutation.
pub fn ensure_closed(e: &Env, circuit: &Circuit) -> Result<(), ContractError> {
    if is_broken(e, circuit) {
        return Err(ContractError::CircuitBroken);
    }
    Ok(())
}

/// Trip `circuit`. Breaker or Admin.
///
/// Tripping an already broken circuit refreshes `broken_at`, `broken_by` and
/// `reason`, which re-arms the auto-restore window.
///
/// # Events
/// Emits `circuit_broken` with `(caller, reason)`
pub fn break_circuit(
    e: &Env,
    caller: &Address,
    circuit: Circuit,
    reason: String,
) -> Result<CircuitState, ContractError> {
    roles::require_any_role(e, &[Role::Breaker, Role::Admin], caller)?;

    let record = CircuitState {
        broken: true,
        broken_at: e.ledger().timestamp(),
        broken_by: caller.clone(),
        reason: reason.clone(),
        auto_restore_after: auto_restore_after(e),
    };
    storage::save(e, &CircuitKey::State(circuit.clone()), &record);

    e.events().publish(
        (Symbol::new(e, "circuit_broken"), circuit),
        (caller.clone(), reason),
    );
    Ok(record)
}

/// Restore `circuit` to operational. Admin-only, unconditional.
///
/// # Events
/// Emits `circuit_restored` with the caller
pub fn restore_circuit(e: &Env, caller: &Address, circuit: Circuit) -> Result<(), ContractError> {
    roles::require_role(e, Role::Admin, caller)?;

    if let Some(mut record) = state(e, &circuit) {
        record.broken = false;
        storage::save(e, &CircuitKey::State(circuit.clone()), &record);
    }

    e.events()
        .publish((Symbol::new(e, "circuit_restored"), circuit), caller.clone());
    Ok(())
}
