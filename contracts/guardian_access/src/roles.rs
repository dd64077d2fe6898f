//! Role registry shared by every Guardian contract.
//!
//! Each contract that links this module owns its own principal-to-role table
//! in persistent storage. Entry points call [`require_role`] or
//! [`require_any_role`] before touching any other state; both read storage on
//! every call, so a revocation takes effect on the very next invocation.

use crate::storage;
use guardian_errors::ContractError;
use soroban_sdk::{contracttype, Address, Env, Symbol, Vec};

/// Named capabilities a principal may hold.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum Role {
    /// Manages every other role and all configuration.
    Admin = 0,
    /// May queue timelocked transactions.
    Proposer = 1,
    /// May execute matured timelocked transactions.
    Executor = 2,
    /// May trip circuit breakers.
    Breaker = 3,
    /// May trigger emergency fan-out and open recovery requests.
    EmergencyOperator = 4,
    /// May approve recovery requests.
    RecoveryApprover = 5,
}

#[contracttype]
#[derive(Clone)]
enum RoleKey {
    /// (role, account) -> true while the account holds the role
    Member(Role, Address),
    /// role -> holders in grant order
    Members(Role),
}

pub fn has_role(e: &Env, role: Role, account: &Address) -> bool {
    storage::load(e, &RoleKey::Member(role, account.clone())).unwrap_or(false)
}

pub fn role_members(e: &Env, role: Role) -> Vec<Address> {
    storage::load(e, &RoleKey::Members(role)).unwrap_or(Vec::new(e))
}

pub fn role_member_count(e: &Env, role: Role) -> u32 {
    role_members(e, role).len()
}

/// Grant Admin to the initializing principal.
///
/// # Errors
/// * `AlreadyInitialized` if any Admin already exists
pub fn bootstrap(e: &Env, admin: &Address) -> Result<(), ContractError> {
    if role_member_count(e, Role::Admin) > 0 {
        return Err(ContractError::AlreadyInitialized);
    }
    insert(e, Role::Admin, admin);
    e.events().publish(
        (Symbol::new(e, "role_granted"), Role::Admin),
        (admin.clone(), admin.clone()),
    );
    Ok(())
}

/// Authenticate `caller` and require that it holds `role`.
pub fn require_role(e: &Env, role: Role, caller: &Address) -> Result<(), ContractError> {
    caller.require_auth();
    if has_role(e, role, caller) {
        Ok(())
    } else {
        Err(ContractError::Unauthorized)
    }
}

/// Authenticate `caller` and require that it holds at least one of `roles`.
pub fn require_any_role(e: &Env, roles: &[Role], caller: &Address) -> Result<(), ContractError> {
    caller.require_auth();
    if roles.iter().any(|role| has_role(e, *role, caller)) {
        Ok(())
    } else {
        Err(ContractError::Unauthorized)
    }
}

/// Grant `role` to `account`. Admin-only.
///
/// Returns `false` when the account already held the role; nothing is
/// written and no event is emitted in that case.
///
/// # Events
/// Emits `role_granted` with `(account, caller)`
pub fn grant_role(
    e: &Env,
    caller: &Address,
    role: Role,
    account: &Address,
) -> Result<bool, ContractError> {
    require_role(e, Role::Admin, caller)?;

    if has_role(e, role, account) {
        return Ok(false);
    }
    insert(e, role, account);

    e.events().publish(
        (Symbol::new(e, "role_granted"), role),
        (account.clone(), caller.clone()),
    );
    Ok(true)
}

/// Revoke `role` from `account`. Admin-only.
///
/// Returns `false` when the account did not hold the role.
///
/// # Errors
/// * `Unauthorized` if caller is not an Admin
/// * `InvalidOperation` if the call would leave the contract with no Admin
///
/// # Events
/// Emits `role_revoked` with `(account, caller)`
pub fn revoke_role(
    e: &Env,
    caller: &Address,
    role: Role,
    account: &Address,
) -> Result<bool, ContractError> {
    require_role(e, Role::Admin, caller)?;

    if !has_role(e, role, account) {
        return Ok(false);
    }
    if role == Role::Admin && role_member_count(e, Role::Admin) <= 1 {
        return Err(ContractError::InvalidOperation);
    }

    storage::remove(e, &RoleKey::Member(role, account.clone()));

    let members = role_members(e, role);
    let mut remaining = Vec::new(e);
    for member in members.iter() {
        if member != *account {
            remaining.push_back(member);
        }
    }
    storage::save(e, &RoleKey::Members(role), &remaining);

    e.events().publish(
        (Symbol::new(e, "role_revoked"), role),
        (account.clone(), caller.clone()),
    );
    Ok(true)
}

fn insert(e: &Env, role: Role, account: &Address) {
    storage::save(e, &RoleKey::Member(role, account.clone()), &true);
    let mut members = role_members(e, role);
    members.push_back(account.clone());
    storage::save(e, &RoleKey::Members(role), &members);
}
