#![no_std]

//! # Guardian Guarded Token
//!
//! Minimal fungible ledger protected by an embedded circuit breaker. Each
//! mutating entry point checks the circuit named after itself (`mint`,
//! `transfer`, `approve`, `transfer_from`) before touching any balance, so a
//! breaker can freeze one path while leaving the others open. The token's own
//! contract circuit (`break_contract`) freezes all four at once.
//!
//! The supply cap is governed by a timelock: only the configured timelock
//! contract may change it, which forces every cap change through the queue.
//!
//! The breaker surface matches `circuit_breaker`, so an emergency manager
//! can monitor this token directly.
//!
//! Balances and allowances are persistent records; supply figures and the
//! timelock address sit in instance storage.

mod events;

use guardian_access::circuit::{self, Circuit, CircuitState};
use guardian_access::roles::{self, Role};
use guardian_access::storage;
use guardian_errors::ContractError;
use soroban_sdk::{contract, contractimpl, contracttype, Address, Env, String, Symbol, Vec};

#[contracttype]
#[derive(Clone)]
enum DataKey {
    Timelock,
    SupplyCap,
    TotalSupply,
    Balance(Address),
    /// (owner, spender) -> remaining allowance
    Allowance(Address, Address),
}

#[contract]
pub struct GuardedToken;

#[contractimpl]
impl GuardedToken {
    /// Initialize the token.
    ///
    /// # Arguments
    /// * `admin` - Receives the Admin role; mints and manages breakers
    /// * `timelock` - The only address allowed to change the supply cap
    /// * `auto_restore_after` - Auto-restore for tripped circuits (0 = never)
    /// * `supply_cap` - Upper bound on total supply, must be positive
    ///
    /// # Errors
    /// * `InvalidConfig` if `supply_cap <= 0`
    /// * `AlreadyInitialized` on a second call
    pub fn initialize(
        e: Env,
        admin: Address,
        timelock: Address,
        auto_restore_after: u64,
        supply_cap: i128,
    ) -> Result<(), ContractError> {
        admin.require_auth();
        if supply_cap <= 0 {
            return Err(ContractError::InvalidConfig);
        }
        roles::bootstrap(&e, &admin)?;
        circuit::set_auto_restore_after(&e, auto_restore_after);

        e.storage().instance().set(&DataKey::Timelock, &timelock);
        e.storage().instance().set(&DataKey::SupplyCap, &supply_cap);
        e.storage().instance().set(&DataKey::TotalSupply, &0_i128);
        Ok(())
    }

    // ==================== Ledger ====================

    /// Mint `amount` to `to`. Admin-only.
    ///
    /// # Errors
    /// * `CircuitBroken` if the `mint` circuit is tripped
    /// * `AmountMustBePositive` if `amount <= 0`
    /// * `SupplyCapExceeded` if the mint would pass the cap
    pub fn mint(e: Env, minter: Address, to: Address, amount: i128) -> Result<(), ContractError> {
        guard(&e, "mint")?;
        roles::require_role(&e, Role::Admin, &minter)?;
        require_positive(amount)?;

        let supply = Self::total_supply(e.clone())
            .checked_add(amount)
            .ok_or(ContractError::Overflow)?;
        if supply > Self::supply_cap(e.clone()) {
            return Err(ContractError::SupplyCapExceeded);
        }
        let balance = Self::balance(e.clone(), to.clone())
            .checked_add(amount)
            .ok_or(ContractError::Overflow)?;

        e.storage().instance().set(&DataKey::TotalSupply, &supply);
        set_balance(&e, &to, balance);

        events::emit_mint(&e, &to, amount, supply);
        Ok(())
    }

    /// # Errors
    /// * `CircuitBroken` if the `transfer` circuit is tripped
    /// * `AmountMustBePositive` if `amount <= 0`
    /// * `InsufficientBalance` if `from` holds less than `amount`
    pub fn transfer(e: Env, from: Address, to: Address, amount: i128) -> Result<(), ContractError> {
        guard(&e, "transfer")?;
        from.require_auth();
        require_positive(amount)?;

        move_balance(&e, &from, &to, amount)?;
        events::emit_transfer(&e, &from, &to, amount);
        Ok(())
    }

    /// Set `spender`'s allowance over `from`'s balance. Zero clears it.
    ///
    /// # Errors
    /// * `CircuitBroken` if the `approve` circuit is tripped
    /// * `AmountMustBePositive` if `amount < 0`
    pub fn approve(e: Env, from: Address, spender: Address, amount: i128) -> Result<(), ContractError> {
        guard(&e, "approve")?;
        from.require_auth();
        if amount < 0 {
            return Err(ContractError::AmountMustBePositive);
        }

        storage::save(&e, &DataKey::Allowance(from.clone(), spender.clone()), &amount);
        events::emit_approve(&e, &from, &spender, amount);
        Ok(())
    }

    /// # Errors
    /// * `CircuitBroken` if the `transfer_from` circuit is tripped
    /// * `AmountMustBePositive` if `amount <= 0`
    /// * `InsufficientAllowance` if `spender` may not move `amount`
    /// * `InsufficientBalance` if `from` holds less than `amount`
    pub fn transfer_from(
        e: Env,
        spender: Address,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        guard(&e, "transfer_from")?;
        spender.require_auth();
        require_positive(amount)?;

        let allowance = Self::allowance(e.clone(), from.clone(), spender.clone());
        if allowance < amount {
            return Err(ContractError::InsufficientAllowance);
        }
        move_balance(&e, &from, &to, amount)?;
        storage::save(
            &e,
            &DataKey::Allowance(from.clone(), spender),
            &(allowance - amount),
        );

        events::emit_transfer(&e, &from, &to, amount);
        Ok(())
    }

    /// Change the supply cap. Callable only by the configured timelock.
    ///
    /// # Errors
    /// * `InvalidConfig` if `cap <= 0`
    /// * `SupplyCapExceeded` if `cap` is below the current total supply
    ///
    /// # Events
    /// Emits `supply_cap_changed` with `(old_cap, new_cap)`
    pub fn set_supply_cap(e: Env, cap: i128) -> Result<(), ContractError> {
        Self::get_timelock(e.clone())?.require_auth();
        if cap <= 0 {
            return Err(ContractError::InvalidConfig);
        }
        if cap < Self::total_supply(e.clone()) {
            return Err(ContractError::SupplyCapExceeded);
        }

        let old = Self::supply_cap(e.clone());
        e.storage().instance().set(&DataKey::SupplyCap, &cap);
        events::emit_supply_cap_changed(&e, old, cap);
        Ok(())
    }

    pub fn balance(e: Env, account: Address) -> i128 {
        storage::load(&e, &DataKey::Balance(account)).unwrap_or(0)
    }

    pub fn allowance(e: Env, from: Address, spender: Address) -> i128 {
        storage::load(&e, &DataKey::Allowance(from, spender)).unwrap_or(0)
    }

    pub fn total_supply(e: Env) -> i128 {
        e.storage()
            .instance()
            .get(&DataKey::TotalSupply)
            .unwrap_or(0)
    }

    pub fn supply_cap(e: Env) -> i128 {
        e.storage().instance().get(&DataKey::SupplyCap).unwrap_or(0)
    }

    pub fn get_timelock(e: Env) -> Result<Address, ContractError> {
        e.storage()
            .instance()
            .get(&DataKey::Timelock)
            .ok_or(ContractError::NotInitialized)
    }

    // ==================== Circuit Breaker ====================

    pub fn authorize_breaker(e: Env, admin: Address, breaker: Address) -> Result<(), ContractError> {
        roles::grant_role(&e, &admin, Role::Breaker, &breaker)?;
        Ok(())
    }

    pub fn revoke_breaker(e: Env, admin: Address, breaker: Address) -> Result<(), ContractError> {
        roles::revoke_role(&e, &admin, Role::Breaker, &breaker)?;
        Ok(())
    }

    pub fn is_authorized_breaker(e: Env, account: Address) -> bool {
        roles::has_role(&e, Role::Breaker, &account)
    }

    pub fn break_circuit(
        e: Env,
        caller: Address,
        selector: Symbol,
        reason: String,
    ) -> Result<(), ContractError> {
        circuit::break_circuit(&e, &caller, Circuit::Function(selector), reason)?;
        Ok(())
    }

    pub fn restore_circuit(e: Env, caller: Address, selector: Symbol) -> Result<(), ContractError> {
        circuit::restore_circuit(&e, &caller, Circuit::Function(selector))
    }

    pub fn is_circuit_broken(e: Env, selector: Symbol) -> bool {
        circuit::is_broken(&e, &Circuit::Function(selector))
    }

    pub fn get_circuit_state(e: Env, selector: Symbol) -> Option<CircuitState> {
        circuit::state(&e, &Circuit::Function(selector))
    }

    /// Trip the token's own contract circuit, freezing every guarded path.
    /// Breaker or Admin.
    pub fn break_contract(e: Env, caller: Address, reason: String) -> Result<(), ContractError> {
        let own = Circuit::Contract(e.current_contract_address());
        circuit::break_circuit(&e, &caller, own, reason)?;
        Ok(())
    }

    pub fn restore_contract(e: Env, caller: Address) -> Result<(), ContractError> {
        circuit::restore_circuit(&e, &caller, Circuit::Contract(e.current_contract_address()))
    }

    pub fn is_contract_broken(e: Env) -> bool {
        circuit::is_broken(&e, &Circuit::Contract(e.current_contract_address()))
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

fn guard(e: &Env, selector: &str) -> Result<(), ContractError> {
    circuit::ensure_closed(e, &Circuit::Contract(e.current_contract_address()))?;
    circuit::ensure_closed(e, &Circuit::Function(Symbol::new(e, selector)))
}

fn require_positive(amount: i128) -> Result<(), ContractError> {
    if amount <= 0 {
        return Err(ContractError::AmountMustBePositive);
    }
    Ok(())
}

fn set_balance(e: &Env, account: &Address, amount: i128) {
    storage::save(e, &DataKey::Balance(account.clone()), &amount);
}

fn move_balance(e: &Env, from: &Address, to: &Address, amount: i128) -> Result<(), ContractError> {
    let from_balance = GuardedToken::balance(e.clone(), from.clone());
    if from_balance < amount {
        return Err(ContractError::InsufficientBalance);
    }
    set_balance(e, from, from_balance - amount);
    let to_balance = GuardedToken::balance(e.clone(), to.clone())
        .checked_add(amount)
        .ok_or(ContractError::Overflow)?;
    set_balance(e, to, to_balance);
    Ok(())
}
