use soroban_sdk::{Address, BytesN, Env, Symbol};

/// Emitted when a transaction enters the queue.
///
/// # Topics
/// * `Symbol` - "transaction_queued"
/// * `BytesN<32>` - Transaction key
///
/// # Data
/// * `Address` - Target
/// * `i128` - Value to transfer on execution
/// * `u64` - Earliest execution timestamp
pub fn emit_transaction_queued(e: &Env, key: &BytesN<32>, target: &Address, value: i128, eta: u64) {
    let topics = (Symbol::new(e, "transaction_queued"), key.clone());
    e.events().publish(topics, (target.clone(), value, eta));
}

/// Emitted after a queued transaction ran successfully.
///
/// # Topics
/// * `Symbol` - "transaction_executed"
/// * `BytesN<32>` - Transaction key
///
/// # Data
/// * `Address` - Target
/// * `i128` - Value transferred
/// * `u64` - The transaction's eta
pub fn emit_transaction_executed(e: &Env, key: &BytesN<32>, target: &Address, value: i128, eta: u64) {
    let topics = (Symbol::new(e, "transaction_executed"), key.clone());
    e.events().publish(topics, (target.clone(), value, eta));
}

/// Emitted when an admin drops a queued transaction.
///
/// # Topics
/// * `Symbol` - "transaction_cancelled"
/// * `BytesN<32>` - Transaction key
///
/// # Data
/// * `Address` - The admin that cancelled it
pub fn emit_transaction_cancelled(e: &Env, key: &BytesN<32>, admin: &Address) {
    let topics = (Symbol::new(e, "transaction_cancelled"), key.clone());
    e.events().publish(topics, admin.clone());
}

/// # Topics
/// * `Symbol` - "delay_changed"
///
/// # Data
/// * `u64` - Previous delay
/// * `u64` - New delay
pub fn emit_delay_changed(e: &Env, old_delay: u64, new_delay: u64) {
    e.events()
        .publish((Symbol::new(e, "delay_changed"),), (old_delay, new_delay));
}
