#![no_std]

//! # Guardian Timelock Contract
//!
//! Enforces a mandatory delay between queueing a transaction and executing
//! it. A transaction is identified by the hash of `(target, value, payload,
//! eta)`; it can be executed once, inside `[eta, eta + GRACE_PERIOD]`, by an
//! Executor, and an Admin may cancel it at any point before that.
//!
//! Executing a transaction optionally transfers `value` of the configured
//! value token from the timelock to `target`, then invokes the payload's
//! call on `target`. If either step fails the whole execution is rolled back
//! and the transaction stays queued.
//!
//! ## Storage Layout
//!
//! | Key                    | Tier           | Lifecycle                 |
//! |------------------------|----------------|---------------------------|
//! | `DataKey::Delay`       | `instance()`   | Entire contract           |
//! | `DataKey::ValueToken`  | `instance()`   | Entire contract           |
//! | `DataKey::Queued(key)` | `persistent()` | Queue until execute/cancel |

mod events;

use guardian_access::call::{self, invoke};
use guardian_access::roles::{self, Role};
use guardian_access::storage;
use guardian_errors::ContractError;
use soroban_sdk::xdr::ToXdr;
use soroban_sdk::{
    contract, contractimpl, contracttype, Address, BytesN, Env, IntoVal, Symbol, Val, Vec,
};

pub use guardian_access::Call;

/// One hour.
pub const MIN_DELAY: u64 = 3_600;
/// Thirty days.
pub const MAX_DELAY: u64 = 2_592_000;
/// Seven days after `eta` during which a ready transaction may still run.
pub const GRACE_PERIOD: u64 = 604_800;

/// What a transaction does on the target once `value` has moved.
#[contracttype]
#[derive(Clone, Debug)]
pub enum Payload {
    /// Value transfer only.
    Transfer,
    /// Invoke the call on the target.
    Invoke(Call),
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct QueuedTransaction {
    pub target: Address,
    pub value: i128,
    pub payload: Payload,
    pub eta: u64,
    pub queued_at: u64,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransactionStatus {
    Unqueued = 0,
    /// Queued, `now < eta`.
    Pending = 1,
    /// Queued and inside the execution window.
    Ready = 2,
    /// Queued but past `eta + GRACE_PERIOD`; it can only be cancelled.
    Expired = 3,
}

#[contracttype]
#[derive(Clone)]
enum DataKey {
    Delay,
    ValueToken,
    Queued(BytesN<32>),
}

#[contract]
pub struct Timelock;

#[contractimpl]
impl Timelock {
    /// Initialize the timelock.
    ///
    /// # Arguments
    /// * `admin` - Receives the Admin role
    /// * `delay` - Seconds between queueing and earliest execution
    /// * `value_token` - Asset moved by non-zero `value` transactions
    ///
    /// # Errors
    /// * `InvalidDelay` if `delay` is outside `[MIN_DELAY, MAX_DELAY]`
    /// * `AlreadyInitialized` on a second call
    pub fn initialize(
        e: Env,
        admin: Address,
        delay: u64,
        value_token: Option<Address>,
    ) -> Result<(), ContractError> {
        admin.require_auth();
        check_delay(delay)?;
        roles::bootstrap(&e, &admin)?;

        e.storage().instance().set(&DataKey::Delay, &delay);
        if let Some(token) = &value_token {
            e.storage().instance().set(&DataKey::ValueToken, token);
        }

        e.events().publish(
            (Symbol::new(&e, "timelock_initialized"),),
            (admin, delay, value_token),
        );
        Ok(())
    }

    /// Queue a transaction for execution at `now + delay`. Proposer-only.
    ///
    /// # Errors
    /// * `Unauthorized` if caller is not a Proposer
    /// * `InvalidOperation` if `value` is negative, or non-zero with no
    ///   value token configured
    /// * `AlreadyQueued` if the identical transaction is already pending
    /// * `Overflow` if `now + delay` overflows
    ///
    /// # Events
    /// Emits `transaction_queued` with `(target, value, eta)`
    pub fn queue_transaction(
        e: Env,
        proposer: Address,
        target: Address,
        value: i128,
        payload: Payload,
    ) -> Result<u64, ContractError> {
        roles::require_role(&e, Role::Proposer, &proposer)?;

        if value < 0 || (value > 0 && Self::get_value_token(e.clone()).is_none()) {
            return Err(ContractError::InvalidOperation);
        }

        let now = e.ledger().timestamp();
        let eta = now
            .checked_add(Self::get_delay(e.clone())?)
            .ok_or(ContractError::Overflow)?;

        let key = tx_key(&e, &target, value, &payload, eta);
        if storage::has(&e, &DataKey::Queued(key.clone())) {
            return Err(ContractError::AlreadyQueued);
        }

        let tx = QueuedTransaction {
            target: target.clone(),
            value,
            payload,
            eta,
            queued_at: now,
        };
        storage::save(&e, &DataKey::Queued(key.clone()), &tx);

        events::emit_transaction_queued(&e, &key, &target, value, eta);
        Ok(eta)
    }

    /// Execute a matured transaction. Executor-only.
    ///
    /// Returns whatever the target call returned (void for
    /// `Payload::Transfer`).
    ///
    /// # Errors
    /// * `Unauthorized` if caller is not an Executor
    /// * `NotQueued` if no such transaction is pending
    /// * `NotReady` if `now < eta`
    /// * `Expired` if `now > eta + GRACE_PERIOD`
    /// * `ExecutionFailed` if the value transfer or the target call fails;
    ///   nothing is changed
    ///
    /// # Events
    /// Emits `transaction_executed` with `(target, value, eta)`
    pub fn execute_transaction(
        e: Env,
        executor: Address,
        target: Address,
        value: i128,
        payload: Payload,
        eta: u64,
    ) -> Result<Val, ContractError> {
        roles::require_role(&e, Role::Executor, &executor)?;

        let key = tx_key(&e, &target, value, &payload, eta);
        if !storage::has(&e, &DataKey::Queued(key.clone())) {
            return Err(ContractError::NotQueued);
        }

        let now = e.ledger().timestamp();
        if now < eta {
            return Err(ContractError::NotReady);
        }
        if now > eta.saturating_add(GRACE_PERIOD) {
            return Err(ContractError::Expired);
        }

        storage::remove(&e, &DataKey::Queued(key.clone()));

        if value > 0 {
            let token_addr = Self::get_value_token(e.clone()).ok_or(ContractError::InvalidOperation)?;
            call::transfer(&e, &token_addr, &target, value)?;
        }

        let result = match &payload {
            Payload::Invoke(target_call) => invoke(&e, &target, target_call)?,
            Payload::Transfer => ().into_val(&e),
        };

        events::emit_transaction_executed(&e, &key, &target, value, eta);
        Ok(result)
    }

    /// Drop a queued transaction. Admin-only.
    ///
    /// # Errors
    /// * `Unauthorized` if caller is not an Admin
    /// * `NotQueued` if no such transaction is pending
    ///
    /// # Events
    /// Emits `transaction_cancelled` with the admin
    pub fn cancel_transaction(
        e: Env,
        admin: Address,
        target: Address,
        value: i128,
        payload: Payload,
        eta: u64,
    ) -> Result<(), ContractError> {
        roles::require_role(&e, Role::Admin, &admin)?;

        let key = tx_key(&e, &target, value, &payload, eta);
        if !storage::has(&e, &DataKey::Queued(key.clone())) {
            return Err(ContractError::NotQueued);
        }
        storage::remove(&e, &DataKey::Queued(key.clone()));

        events::emit_transaction_cancelled(&e, &key, &admin);
        Ok(())
    }

    /// Change the delay applied to transactions queued from now on.
    /// Admin-only. Already queued transactions keep their eta.
    ///
    /// # Errors
    /// * `InvalidDelay` if `new_delay` is outside `[MIN_DELAY, MAX_DELAY]`
    ///
    /// # Events
    /// Emits `delay_changed` with `(old_delay, new_delay)`
    pub fn update_delay(e: Env, admin: Address, new_delay: u64) -> Result<(), ContractError> {
        roles::require_role(&e, Role::Admin, &admin)?;
        check_delay(new_delay)?;

        let old_delay = Self::get_delay(e.clone())?;
        e.storage().instance().set(&DataKey::Delay, &new_delay);

        events::emit_delay_changed(&e, old_delay, new_delay);
        Ok(())
    }

    // ==================== Queries ====================

    pub fn hash_transaction(
        e: Env,
        target: Address,
        value: i128,
        payload: Payload,
        eta: u64,
    ) -> BytesN<32> {
        tx_key(&e, &target, value, &payload, eta)
    }

    pub fn is_queued(e: Env, key: BytesN<32>) -> bool {
        storage::has(&e, &DataKey::Queued(key))
    }

    pub fn get_transaction(e: Env, key: BytesN<32>) -> Option<QueuedTransaction> {
        storage::load(&e, &DataKey::Queued(key))
    }

    pub fn get_status(
        e: Env,
        target: Address,
        value: i128,
        payload: Payload,
        eta: u64,
    ) -> TransactionStatus {
        let key = tx_key(&e, &target, value, &payload, eta);
        if !storage::has(&e, &DataKey::Queued(key)) {
            return TransactionStatus::Unqueued;
        }
        let now = e.ledger().timestamp();
        if now < eta {
            TransactionStatus::Pending
        } else if now > eta.saturating_add(GRACE_PERIOD) {
            TransactionStatus::Expired
        } else {
            TransactionStatus::Ready
        }
    }

    pub fn get_delay(e: Env) -> Result<u64, ContractError> {
        e.storage()
            .instance()
            .get(&DataKey::Delay)
            .ok_or(ContractError::NotInitialized)
    }

    pub fn get_value_token(e: Env) -> Option<Address> {
        e.storage().instance().get(&DataKey::ValueToken)
    }

    pub fn grace_period() -> u64 {
        GRACE_PERIOD
    }

    pub fn min_delay() -> u64 {
        MIN_DELAY
    }

    pub fn max_delay() -> u64 {
        MAX_DELAY
    }

    // ==================== Roles ====================

    pub fn grant_role(e: Env, caller: Address, role: Role, account: Address) -> Result<(), ContractError> {
        roles::grant_role(&e, &caller, role, &account)?;
        Ok(())
    }

    pub fn revoke_role(e: Env, caller: Address, role: Role, account: Address) -> Result<(), ContractError> {
        roles::revoke_role(&e, &caller, role, &account)?;
        Ok(())
    }

    pub fn has_role(e: Env, role: Role, account: Address) -> bool {
        roles::has_role(&e, role, &account)
    }

    pub fn get_role_members(e: Env, role: Role) -> Vec<Address> {
        roles::role_members(&e, role)
    }
}

fn check_delay(delay: u64) -> Result<(), ContractError> {
    if !(MIN_DELAY..=MAX_DELAY).contains(&delay) {
        return Err(ContractError::InvalidDelay);
    }
    Ok(())
}

fn tx_key(e: &Env, target: &Address, value: i128, payload: &Payload, eta: u64) -> BytesN<32> {
    let preimage = (target.clone(), value, payload.clone(), eta).to_xdr(e);
    e.crypto().sha256(&preimage).to_bytes()
}
