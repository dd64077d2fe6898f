//! Minimal contract exposing the access modules so tests can drive them
//! through a real contract context.

#![cfg(test)]

use crate::circuit::{self, Circuit, CircuitState};
use crate::roles::{self, Role};
use guardian_errors::ContractError;
use soroban_sdk::testutils::Address as _;
use soroban_sdk::{contract, contractimpl, Address, Env, String, Symbol, Vec};

#[contract]
pub struct Harness;

#[contractimpl]
impl Harness {
    pub fn init(e: Env, admin: Address) -> Result<(), ContractError> {
        admin.require_auth();
        roles::bootstrap(&e, &admin)
    }

    pub fn grant(e: Env, caller: Address, role: Role, account: Address) -> Result<bool, ContractError> {
        roles::grant_role(&e, &caller, role, &account)
    }

    pub fn revoke(e: Env, caller: Address, role: Role, account: Address) -> Result<bool, ContractError> {
        roles::revoke_role(&e, &caller, role, &account)
    }

    pub fn has(e: Env, role: Role, account: Address) -> bool {
        roles::has_role(&e, role, &account)
    }

    pub fn members(e: Env, role: Role) -> Vec<Address> {
        roles::role_members(&e, role)
    }

    pub fn set_auto(e: Env, seconds: u64) {
        circuit::set_auto_restore_after(&e, seconds);
    }

    pub fn trip(e: Env, caller: Address, selector: Symbol, reason: String) -> Result<CircuitState, ContractError> {
        circuit::break_circuit(&e, &caller, Circuit::Function(selector), reason)
    }

    pub fn reset(e: Env, caller: Address, selector: Symbol) -> Result<(), ContractError> {
        circuit::restore_circuit(&e, &caller, Circuit::Function(selector))
    }

    pub fn broken(e: Env, selector: Symbol) -> bool {
        circuit::is_broken(&e, &Circuit::Function(selector))
    }

    pub fn state(e: Env, selector: Symbol) -> Option<CircuitState> {
        circuit::state(&e, &Circuit::Function(selector))
    }

    /// Bumps a counter unless the `guarded` circuit is broken.
    pub fn guarded(e: Env) -> Result<u32, ContractError> {
        let selector = Symbol::new(&e, "guarded");
        circuit::ensure_closed(&e, &Circuit::Function(selector.clone()))?;
        let count: u32 = e.storage().instance().get(&selector).unwrap_or(0);
        let next = count.checked_add(1).ok_or(ContractError::Overflow)?;
        e.storage().instance().set(&selector, &next);
        Ok(next)
    }
}

/// Registers the harness and bootstraps `admin`.
/// Returns `(client, admin)`.
pub fn setup(e: &Env) -> (HarnessClient<'_>, Address) {
    e.mock_all_auths();
    let contract_id = e.register(Harness, ());
    let client = HarnessClient::new(e, &contract_id);
    let admin = Address::generate(e);
    client.init(&admin);
    (client, admin)
}
