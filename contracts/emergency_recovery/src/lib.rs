#![no_std]

//! # Guardian Emergency Recovery
//!
//! Privileged recovery calls need both a quorum and a delay. An emergency
//! operator opens a request naming a target and a call; recovery approvers
//! sign it off one by one; once `required_approvals` distinct approvals are
//! in and `recovery_delay` seconds have passed since the request, an operator
//! or approver can execute it, exactly once.
//!
//! Operators can also sweep fungible tokens held by this contract directly
//! with `recover_tokens`.
//!
//! ## Storage Layout
//!
//! | Key                            | Tier           | Lifecycle      |
//! |--------------------------------|----------------|----------------|
//! | `DataKey::RequiredApprovals`   | `instance()`   | Entire contract|
//! | `DataKey::RecoveryDelay`       | `instance()`   | Entire contract|
//! | `DataKey::RequestCount`        | `instance()`   | Entire contract|
//! | `DataKey::Request(id)`         | `persistent()` | Per request    |
//! | `DataKey::Approval(id, addr)`  | `persistent()` | Per approval   |

mod events;

use guardian_access::call::{self, invoke, Call};
use guardian_access::roles::{self, Role};
use guardian_access::storage;
use guardian_errors::ContractError;
use soroban_sdk::{contract, contractimpl, contracttype, Address, Env, Val, Vec};

#[contracttype]
#[derive(Clone, Debug)]
pub struct RecoveryRequest {
    /// Monotonic id, starting at 0.
    pub id: u64,
    pub requester: Address,
    pub target: Address,
    pub call: Call,
    /// Number of distinct approvers so far.
    pub approvals: u32,
    pub requested_at: u64,
    pub executed: bool,
}

#[contracttype]
#[derive(Clone)]
enum DataKey {
    RequiredApprovals,
    RecoveryDelay,
    RequestCount,
    Request(u64),
    /// (request id, approver) -> true
    Approval(u64, Address),
}

#[contract]
pub struct EmergencyRecovery;

#[contractimpl]
impl EmergencyRecovery {
    /// Initialize the recovery manager.
    ///
    /// # Arguments
    /// * `admin` - Receives the Admin role
    /// * `required_approvals` - Distinct approvals needed to execute
    /// * `recovery_delay` - Seconds between request and earliest execution
    ///
    /// # Errors
    /// * `InvalidConfig` if `required_approvals` is 0
    /// * `InvalidDelay` if `recovery_delay` is 0
    /// * `AlreadyInitialized` on a second call
    pub fn initialize(
        e: Env,
        admin: Address,
        required_approvals: u32,
        recovery_delay: u64,
    ) -> Result<(), ContractError> {
        admin.require_auth();
        if required_approvals == 0 {
            return Err(ContractError::InvalidConfig);
        }
        if recovery_delay == 0 {
            return Err(ContractError::InvalidDelay);
        }
        roles::bootstrap(&e, &admin)?;

        e.storage()
            .instance()
            .set(&DataKey::RequiredApprovals, &required_approvals);
        e.storage()
            .instance()
            .set(&DataKey::RecoveryDelay, &recovery_delay);
        e.storage().instance().set(&DataKey::RequestCount, &0_u64);
        Ok(())
    }

    /// Open a recovery request. EmergencyOperator-only.
    ///
    /// # Events
    /// Emits `recovery_requested` with `(caller, target)`
    pub fn request_recovery(
        e: Env,
        caller: Address,
        target: Address,
        call: Call,
    ) -> Result<u64, ContractError> {
        roles::require_role(&e, Role::EmergencyOperator, &caller)?;

        let id = Self::get_request_count(e.clone());
        let next = id.checked_add(1).ok_or(ContractError::Overflow)?;
        e.storage().instance().set(&DataKey::RequestCount, &next);

        let request = RecoveryRequest {
            id,
            requester: caller.clone(),
            target: target.clone(),
            call,
            approvals: 0,
            requested_at: e.ledger().timestamp(),
            executed: false,
        };
        storage::save(&e, &DataKey::Request(id), &request);

        events::emit_recovery_requested(&e, id, &caller, &target);
        Ok(id)
    }

    /// Record `caller`'s approval of request `id`. RecoveryApprover-only.
    ///
    /// # Errors
    /// * `NotFound` if the request does not exist
    /// * `AlreadyExecuted` if the request has run
    /// * `AlreadyApproved` if `caller` approved it before
    ///
    /// # Events
    /// Emits `recovery_approved` with `(caller, approvals)`
    pub fn approve_recovery(e: Env, caller: Address, id: u64) -> Result<(), ContractError> {
        roles::require_role(&e, Role::RecoveryApprover, &caller)?;

        let mut request = load_request(&e, id)?;
        if request.executed {
            return Err(ContractError::AlreadyExecuted);
        }
        let approval = DataKey::Approval(id, caller.clone());
        if storage::has(&e, &approval) {
            return Err(ContractError::AlreadyApproved);
        }

        request.approvals = request
            .approvals
            .checked_add(1)
            .ok_or(ContractError::Overflow)?;
        storage::save(&e, &approval, &true);
        storage::save(&e, &DataKey::Request(id), &request);

        events::emit_recovery_approved(&e, id, &caller, request.approvals);
        Ok(())
    }

    /// Execute request `id`. EmergencyOperator or RecoveryApprover.
    ///
    /// Returns the value returned by the recovery call.
    ///
    /// # Errors
    /// * `NotFound` if the request does not exist
    /// * `AlreadyExecuted` if the request has run
    /// * `InsufficientApprovals` below the approval threshold
    /// * `TimelockNotExpired` before `requested_at + recovery_delay`
    /// * `ExecutionFailed` if the target call fails; nothing is changed
    ///
    /// # Events
    /// Emits `recovery_executed` with the caller
    pub fn execute_recovery(e: Env, caller: Address, id: u64) -> Result<Val, ContractError> {
        roles::require_any_role(&e, &[Role::EmergencyOperator, Role::RecoveryApprover], &caller)?;

        let mut request = load_request(&e, id)?;
        if request.executed {
            return Err(ContractError::AlreadyExecuted);
        }
        if request.approvals < Self::get_required_approvals(e.clone()) {
            return Err(ContractError::InsufficientApprovals);
        }
        let unlock_at = request
            .requested_at
            .saturating_add(Self::get_recovery_delay(e.clone()));
        if e.ledger().timestamp() < unlock_at {
            return Err(ContractError::TimelockNotExpired);
        }

        request.executed = true;
        storage::save(&e, &DataKey::Request(id), &request);

        let result = invoke(&e, &request.target, &request.call)?;

        events::emit_recovery_executed(&e, id, &caller);
        Ok(result)
    }

    /// Move `amount` of `token` held by this contract to `to`.
    /// EmergencyOperator-only.
    ///
    /// # Errors
    /// * `AmountMustBePositive` if `amount <= 0`
    /// * `ExecutionFailed` if the token rejects the transfer
    ///
    /// # Events
    /// Emits `tokens_recovered` with `(to, amount, caller)`
    pub fn recover_tokens(
        e: Env,
        caller: Address,
        token: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        roles::require_role(&e, Role::EmergencyOperator, &caller)?;
        if amount <= 0 {
            return Err(ContractError::AmountMustBePositive);
        }

        call::transfer(&e, &token, &to, amount)?;

        events::emit_tokens_recovered(&e, &token, &to, amount, &caller);
        Ok(())
    }

    // ==================== Queries ====================

    pub fn get_request(e: Env, id: u64) -> Option<RecoveryRequest> {
        storage::load(&e, &DataKey::Request(id))
    }

    pub fn has_approved(e: Env, id: u64, approver: Address) -> bool {
        storage::has(&e, &DataKey::Approval(id, approver))
    }

    pub fn get_request_count(e: Env) -> u64 {
        e.storage()
            .instance()
            .get(&DataKey::RequestCount)
            .unwrap_or(0)
    }

    pub fn get_required_approvals(e: Env) -> u32 {
        e.storage()
            .instance()
            .get(&DataKey::RequiredApprovals)
            .unwrap_or(0)
    }

    pub fn get_recovery_delay(e: Env) -> u64 {
        e.storage()
            .instance()
            .get(&DataKey::RecoveryDelay)
            .unwrap_or(0)
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

fn load_request(e: &Env, id: u64) -> Result<RecoveryRequest, ContractError> {
    storage::load(e, &DataKey::Request(id)).ok_or(ContractError::NotFound)
}
