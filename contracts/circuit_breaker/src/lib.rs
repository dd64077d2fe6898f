#![no_std]

//! # Guardian Circuit Breaker
//!
//! Standalone kill-switch contract. Protected contracts (or off-chain
//! automation) consult `is_circuit_broken` / `is_contract_broken` before
//! running sensitive logic.
//!
//! ## Features
//! - Per-function circuits keyed by selector symbol
//! - Per-contract circuits keyed by contract address
//! - Authorized breaker allow-list, Admin-only restore
//! - Optional auto-restore applied lazily at read time
//!
//! ## Security
//! - Any Breaker or Admin can trip; only an Admin can restore, so a leaked
//!   breaker key can disable a path but never re-enable it
//! - Roles are read from storage at the top of every entry point

use guardian_access::circuit::{self, Circuit, CircuitState};
use guardian_access::roles::{self, Role};
use guardian_errors::ContractError;
use soroban_sdk::{contract, contractimpl, Address, Env, String, Symbol, Vec};

#[contract]
pub struct CircuitBreaker;

#[contractimpl]
impl CircuitBreaker {
    /// Initialize the breaker with its first admin.
    ///
    /// # Arguments
    /// * `admin` - Address that receives the Admin role
    /// * `auto_restore_after` - Seconds after which a trip lapses (0 = never)
    ///
    /// # Errors
    /// * `AlreadyInitialized` if the contract already has an admin
    ///
    /// # Events
    /// Emits `breaker_initialized` with `(admin, auto_restore_after)`
    pub fn initialize(e: Env, admin: Address, auto_restore_after: u64) -> Result<(), ContractError> {
        admin.require_auth();
        roles::bootstrap(&e, &admin)?;
        circuit::set_auto_restore_after(&e, auto_restore_after);

        e.events().publish(
            (Symbol::new(&e, "breaker_initialized"),),
            (admin, auto_restore_after),
        );
        Ok(())
    }

    // ==================== Breaker Allow-List ====================

    /// Add `breaker` to the allow-list. Admin-only; idempotent.
    pub fn authorize_breaker(e: Env, admin: Address, breaker: Address) -> Result<(), ContractError> {
        roles::grant_role(&e, &admin, Role::Breaker, &breaker)?;
        Ok(())
    }

    /// Remove `breaker` from the allow-list. Admin-only; idempotent.
    pub fn revoke_breaker(e: Env, admin: Address, breaker: Address) -> Result<(), ContractError> {
        roles::revoke_role(&e, &admin, Role::Breaker, &breaker)?;
        Ok(())
    }

    pub fn is_authorized_breaker(e: Env, account: Address) -> bool {
        roles::has_role(&e, Role::Breaker, &account)
    }

    // ==================== Function Circuits ====================

    /// Trip the circuit for `selector`.
    ///
    /// # Arguments
    /// * `caller` - Breaker or Admin (must authenticate)
    /// * `selector` - Guarded function identifier
    /// * `reason` - Free-form reason kept in the circuit record
    ///
    /// # Errors
    /// * `Unauthorized` if caller is neither Breaker nor Admin
    ///
    /// # Events
    /// Emits `circuit_broken` with `(caller, reason)`
    pub fn break_circuit(
        e: Env,
        caller: Address,
        selector: Symbol,
        reason: String,
    ) -> Result<(), ContractError> {
        circuit::break_circuit(&e, &caller, Circuit::Function(selector), reason)?;
        Ok(())
    }

    /// Restore the circuit for `selector`. Admin-only.
    ///
    /// # Errors
    /// * `Unauthorized` if caller is not an Admin, including authorized breakers
    ///
    /// # Events
    /// Emits `circuit_restored` with the caller
    pub fn restore_circuit(e: Env, caller: Address, selector: Symbol) -> Result<(), ContractError> {
        circuit::restore_circuit(&e, &caller, Circuit::Function(selector))
    }

    pub fn is_circuit_broken(e: Env, selector: Symbol) -> bool {
        circuit::is_broken(&e, &Circuit::Function(selector))
    }

    pub fn get_circuit_state(e: Env, selector: Symbol) -> Option<CircuitState> {
        circuit::state(&e, &Circuit::Function(selector))
    }

    // ==================== Contract Circuits ====================

    /// Trip the circuit covering every guarded function of `target`.
    /// Same authorization and events as `break_circuit`.
    pub fn break_contract(
        e: Env,
        caller: Address,
        target: Address,
        reason: String,
    ) -> Result<(), ContractError> {
        circuit::break_circuit(&e, &caller, Circuit::Contract(target), reason)?;
        Ok(())
    }

    /// Restore the contract-wide circuit for `target`. Admin-only.
    pub fn restore_contract(e: Env, caller: Address, target: Address) -> Result<(), ContractError> {
        circuit::restore_circuit(&e, &caller, Circuit::Contract(target))
    }

    pub fn is_contract_broken(e: Env, target: Address) -> bool {
        circuit::is_broken(&e, &Circuit::Contract(target))
    }

    pub fn get_contract_circuit_state(e: Env, target: Address) -> Option<CircuitState> {
        circuit::state(&e, &Circuit::Contract(target))
    }

    // ==================== Configuration ====================

    /// Change the auto-restore duration for future trips. Admin-only.
    /// Existing trips keep the duration they were armed with.
    pub fn set_auto_restore(e: Env, admin: Address, seconds: u64) -> Result<(), ContractError> {
        roles::require_role(&e, Role::Admin, &admin)?;
        circuit::set_auto_restore_after(&e, seconds);
        Ok(())
    }

    pub fn get_auto_restore(e: Env) -> u64 {
        circuit::auto_restore_after(&e)
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
