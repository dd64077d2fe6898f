use soroban_sdk::{Address, Env, Symbol};

/// # Topics
/// * `Symbol` - "mint"
/// * `Address` - Recipient
///
/// # Data
/// * `i128` - Amount minted
/// * `i128` - Total supply afterwards
pub fn emit_mint(e: &Env, to: &Address, amount: i128, total_supply: i128) {
    let topics = (Symbol::new(e, "mint"), to.clone());
    e.events().publish(topics, (amount, total_supply));
}

/// # Topics
/// * `Symbol` - "transfer"
/// * `Address` - Sender
/// * `Address` - Recipient
///
/// # Data
/// * `i128` - Amount moved
pub fn emit_transfer(e: &Env, from: &Address, to: &Address, amount: i128) {
    let topics = (Symbol::new(e, "transfer"), from.clone(), to.clone());
    e.events().publish(topics, amount);
}

/// # Topics
/// * `Symbol` - "approve"
/// * `Address` - Owner
/// * `Address` - Spender
///
/// # Data
/// * `i128` - New allowance
pub fn emit_approve(e: &Env, from: &Address, spender: &Address, amount: i128) {
    let topics = (Symbol::new(e, "approve"), from.clone(), spender.clone());
    e.events().publish(topics, amount);
}

/// Emitted when the timelock changes the supply cap.
///
/// # Topics
/// * `Symbol` - "supply_cap_changed"
///
/// # Data
/// * `i128` - Previous cap
/// * `i128` - New cap
pub fn emit_supply_cap_changed(e: &Env, old_cap: i128, new_cap: i128) {
    e.events()
        .publish((Symbol::new(e, "supply_cap_changed"),), (old_cap, new_cap));
}
