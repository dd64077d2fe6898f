#![no_std]

//! # Guardian Emergency Manager
//!
//! Keeps a registry of monitored circuit breakers and fans a single break or
//! restore action out over every active entry.
//!
//! The manager calls each target as its own contract address, so a monitored
//! breaker has to grant the manager Breaker (to break) and Admin (to restore).
//! Each target call is made through a fallible cross-contract invocation: a
//! target that rejects the call is reported in the [`FanOutReport`] and the
//! loop moves on, and targets that already succeeded stay changed.
//!
//! Monitored records and the registration index are persistent records; the
//! active count lives in instance storage.

mod events;

use guardian_access::roles::{self, Role};
use guardian_access::storage;
use guardian_errors::ContractError;
use soroban_sdk::{
    contract, contractclient, contractimpl, contracttype, Address, Env, String, Symbol, Vec,
};

/// Breaker surface the manager depends on. Implemented by `circuit_breaker`
/// and by every contract that embeds its own breaker.
#[contractclient(name = "MonitoredBreakerClient")]
pub trait MonitoredBreaker {
    fn break_circuit(
        e: Env,
        caller: Address,
        selector: Symbol,
        reason: String,
    ) -> Result<(), ContractError>;
    fn restore_circuit(e: Env, caller: Address, selector: Symbol) -> Result<(), ContractError>;
    fn is_circuit_broken(e: Env, selector: Symbol) -> bool;
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MonitoredContract {
    pub address: Address,
    pub name: String,
    pub is_active: bool,
    /// Ledger timestamp of the most recent (re)registration.
    pub registered_at: u64,
}

/// A target that rejected a fan-out call.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FanOutFailure {
    pub target: Address,
    /// The target's `ContractError` code, or 0 when it aborted without one.
    pub code: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FanOutReport {
    pub attempted: u32,
    pub succeeded: u32,
    pub failures: Vec<FanOutFailure>,
}

#[contracttype]
#[derive(Clone)]
enum DataKey {
    /// address -> MonitoredContract
    Monitored(Address),
    /// Every address ever registered, in first-registration order.
    MonitoredIndex,
    /// Number of entries with `is_active == true`.
    ActiveCount,
}

#[derive(Clone, Copy)]
enum FanOutAction {
    Break,
    Restore,
}

const EMERGENCY_REASON: &str = "emergency";

#[contract]
pub struct EmergencyManager;

#[contractimpl]
impl EmergencyManager {
    /// Initialize the manager with its first admin.
    ///
    /// # Errors
    /// * `AlreadyInitialized` if the manager already has an admin
    pub fn initialize(e: Env, admin: Address) -> Result<(), ContractError> {
        admin.require_auth();
        roles::bootstrap(&e, &admin)?;
        e.storage().instance().set(&DataKey::ActiveCount, &0_u32);
        storage::save(&e, &DataKey::MonitoredIndex, &Vec::<Address>::new(&e));
        Ok(())
    }

    // ==================== Registry ====================

    /// Add `address` to the monitored registry. Admin-only.
    ///
    /// A previously deregistered address is reactivated in place and keeps
    /// its original index position.
    ///
    /// # Errors
    /// * `Unauthorized` if caller is not an Admin
    /// * `AlreadyRegistered` if the address is already active
    ///
    /// # Events
    /// Emits `contract_registered` with `(name, index)`
    pub fn register_contract(
        e: Env,
        admin: Address,
        address: Address,
        name: String,
    ) -> Result<(), ContractError> {
        roles::require_role(&e, Role::Admin, &admin)?;

        let key = DataKey::Monitored(address.clone());
        let existing: Option<MonitoredContract> = storage::load(&e, &key);
        let mut index = Self::index(&e);

        let position = match existing {
            Some(record) if record.is_active => return Err(ContractError::AlreadyRegistered),
            Some(_) => index
                .first_index_of(&address)
                .ok_or(ContractError::NotFound)?,
            None => {
                index.push_back(address.clone());
                storage::save(&e, &DataKey::MonitoredIndex, &index);
                index.len() - 1
            }
        };

        let record = MonitoredContract {
            address: address.clone(),
            name: name.clone(),
            is_active: true,
            registered_at: e.ledger().timestamp(),
        };
        storage::save(&e, &key, &record);

        let count = Self::get_contract_count(e.clone())
            .checked_add(1)
            .ok_or(ContractError::Overflow)?;
        e.storage().instance().set(&DataKey::ActiveCount, &count);

        events::emit_contract_registered(&e, &address, &name, position);
        Ok(())
    }

    /// Deactivate `address` in the registry. Admin-only.
    ///
    /// # Errors
    /// * `Unauthorized` if caller is not an Admin
    /// * `NotFound` if the address is unknown or already inactive
    pub fn deregister_contract(e: Env, admin: Address, address: Address) -> Result<(), ContractError> {
        roles::require_role(&e, Role::Admin, &admin)?;

        let key = DataKey::Monitored(address.clone());
        let mut record: MonitoredContract =
            storage::load(&e, &key).ok_or(ContractError::NotFound)?;
        if !record.is_active {
            return Err(ContractError::NotFound);
        }

        record.is_active = false;
        storage::save(&e, &key, &record);

        let count = Self::get_contract_count(e.clone()).saturating_sub(1);
        e.storage().instance().set(&DataKey::ActiveCount, &count);

        events::emit_contract_deregistered(&e, &address, &admin);
        Ok(())
    }

    /// Number of active registrations.
    pub fn get_contract_count(e: Env) -> u32 {
        e.storage()
            .instance()
            .get(&DataKey::ActiveCount)
            .unwrap_or(0)
    }

    /// Record at `index` in registration order, active or not.
    pub fn get_contract(e: Env, index: u32) -> Result<MonitoredContract, ContractError> {
        let address = Self::index(&e).get(index).ok_or(ContractError::NotFound)?;
        storage::load(&e, &DataKey::Monitored(address)).ok_or(ContractError::NotFound)
    }

    /// Active records in index order.
    pub fn get_contracts(e: Env) -> Vec<MonitoredContract> {
        let mut out = Vec::new(&e);
        for address in Self::index(&e).iter() {
            let record: Option<MonitoredContract> =
                storage::load(&e, &DataKey::Monitored(address));
            if let Some(record) = record {
                if record.is_active {
                    out.push_back(record);
                }
            }
        }
        out
    }

    pub fn get_contract_info(e: Env, address: Address) -> Option<MonitoredContract> {
        storage::load(&e, &DataKey::Monitored(address))
    }

    // ==================== Operators ====================

    pub fn add_emergency_operator(e: Env, admin: Address, operator: Address) -> Result<(), ContractError> {
        roles::grant_role(&e, &admin, Role::EmergencyOperator, &operator)?;
        Ok(())
    }

    pub fn remove_emergency_operator(
        e: Env,
        admin: Address,
        operator: Address,
    ) -> Result<(), ContractError> {
        roles::revoke_role(&e, &admin, Role::EmergencyOperator, &operator)?;
        Ok(())
    }

    pub fn is_emergency_operator(e: Env, operator: Address) -> bool {
        roles::has_role(&e, Role::EmergencyOperator, &operator)
    }

    // ==================== Fan-out ====================

    /// Break `selector` on every active monitored contract.
    ///
    /// # Arguments
    /// * `caller` - EmergencyOperator or Admin (must authenticate)
    /// * `selector` - Guarded function identifier to break everywhere
    ///
    /// # Errors
    /// * `Unauthorized` if caller is neither EmergencyOperator nor Admin.
    ///   Per-target failures never fail the call; they land in the report.
    ///
    /// # Events
    /// Emits `emergency_break_all` with the caller, then one
    /// `fan_out_failed` per rejecting target
    pub fn emergency_break_all(
        e: Env,
        caller: Address,
        selector: Symbol,
    ) -> Result<FanOutReport, ContractError> {
        roles::require_any_role(&e, &[Role::EmergencyOperator, Role::Admin], &caller)?;
        events::emit_emergency_break_all(&e, &selector, &caller);
        Ok(Self::fan_out(&e, &selector, FanOutAction::Break))
    }

    /// Restore `selector` on every active monitored contract. Admin-only;
    /// an EmergencyOperator without Admin is rejected.
    ///
    /// # Events
    /// Emits `emergency_restore_all` with the caller, then one
    /// `fan_out_failed` per rejecting target
    pub fn emergency_restore_all(
        e: Env,
        caller: Address,
        selector: Symbol,
    ) -> Result<FanOutReport, ContractError> {
        roles::require_role(&e, Role::Admin, &caller)?;
        events::emit_emergency_restore_all(&e, &selector, &caller);
        Ok(Self::fan_out(&e, &selector, FanOutAction::Restore))
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

impl EmergencyManager {
    fn index(e: &Env) -> Vec<Address> {
        storage::load(e, &DataKey::MonitoredIndex).unwrap_or(Vec::new(e))
    }

    fn fan_out(e: &Env, selector: &Symbol, action: FanOutAction) -> FanOutReport {
        // Snapshot before any external call.
        let mut targets: Vec<Address> = Vec::new(e);
        for record in Self::get_contracts(e.clone()).iter() {
            targets.push_back(record.address);
        }

        let manager = e.current_contract_address();
        let reason = String::from_str(e, EMERGENCY_REASON);
        let mut report = FanOutReport {
            attempted: targets.len(),
            succeeded: 0,
            failures: Vec::new(e),
        };

        for target in targets.iter() {
            let client = MonitoredBreakerClient::new(e, &target);
            let outcome = match action {
                FanOutAction::Break => client.try_break_circuit(&manager, selector, &reason),
                FanOutAction::Restore => client.try_restore_circuit(&manager, selector),
            };
            match outcome {
                Ok(Ok(())) => report.succeeded += 1,
                Err(Ok(err)) => Self::record_failure(e, &mut report, target, err as u32),
                _ => Self::record_failure(e, &mut report, target, 0),
            }
        }
        report
    }

    fn record_failure(e: &Env, report: &mut FanOutReport, target: Address, code: u32) {
        events::emit_fan_out_failed(e, &target, code);
        report.failures.push_back(FanOutFailure { target, code });
    }
}

#[cfg(test)]
mod test_emergency_manager;
