use soroban_sdk::{Address, Env, Symbol};

/// Emitted when an operator opens a recovery request.
///
/// # Topics
/// * `Symbol` - "recovery_requested"
/// * `u64` - Request id
///
/// # Data
/// * `Address` - Requester
/// * `Address` - Target of the recovery call
pub fn emit_recovery_requested(e: &Env, id: u64, requester: &Address, target: &Address) {
    let topics = (Symbol::new(e, "recovery_requested"), id);
    e.events()
        .publish(topics, (requester.clone(), target.clone()));
}

/// Emitted for each distinct approval.
///
/// # Topics
/// * `Symbol` - "recovery_approved"
/// * `u64` - Request id
///
/// # Data
/// * `Address` - Approver
/// * `u32` - Approval count after this approval
pub fn emit_recovery_approved(e: &Env, id: u64, approver: &Address, approvals: u32) {
    let topics = (Symbol::new(e, "recovery_approved"), id);
    e.events().publish(topics, (approver.clone(), approvals));
}

/// # Topics
/// * `Symbol` - "recovery_executed"
/// * `u64` - Request id
///
/// # Data
/// * `Address` - Executor
pub fn emit_recovery_executed(e: &Env, id: u64, executor: &Address) {
    let topics = (Symbol::new(e, "recovery_executed"), id);
    e.events().publish(topics, executor.clone());
}

/// Emitted when tokens held by the manager are swept out.
///
/// # Topics
/// * `Symbol` - "tokens_recovered"
/// * `Address` - Token contract
///
/// # Data
/// * `Address` - Recipient
/// * `i128` - Amount moved
/// * `Address` - Operator that requested the sweep
pub fn emit_tokens_recovered(e: &Env, token: &Address, to: &Address, amount: i128, caller: &Address) {
    let topics = (Symbol::new(e, "tokens_recovered"), token.clone());
    e.events()
        .publish(topics, (to.clone(), amount, caller.clone()));
}
