use soroban_sdk::{Address, Env, String, Symbol};

/// Emitted when a contract is added to (or reactivated in) the registry.
///
/// # Topics
/// * `Symbol` - "contract_registered"
/// * `Address` - The monitored contract
///
/// # Data
/// * `String` - Display name
/// * `u32` - Position in the registry index
pub fn emit_contract_registered(e: &Env, address: &Address, name: &String, index: u32) {
    let topics = (Symbol::new(e, "contract_registered"), address.clone());
    let data = (name.clone(), index);
    e.events().publish(topics, data);
}

/// Emitted when a contract is deactivated in the registry.
///
/// # Topics
/// * `Symbol` - "contract_deregistered"
/// * `Address` - The monitored contract
///
/// # Data
/// * `Address` - The admin that deregistered it
pub fn emit_contract_deregistered(e: &Env, address: &Address, admin: &Address) {
    let topics = (Symbol::new(e, "contract_deregistered"), address.clone());
    e.events().publish(topics, admin.clone());
}

/// Emitted once per `emergency_break_all` call, before the fan-out.
///
/// # Topics
/// * `Symbol` - "emergency_break_all"
/// * `Symbol` - The selector being broken
///
/// # Data
/// * `Address` - The caller
pub fn emit_emergency_break_all(e: &Env, selector: &Symbol, caller: &Address) {
    let topics = (Symbol::new(e, "emergency_break_all"), selector.clone());
    e.events().publish(topics, caller.clone());
}

/// Emitted once per `emergency_restore_all` call, before the fan-out.
///
/// # Topics
/// * `Symbol` - "emergency_restore_all"
/// * `Symbol` - The selector being restored
///
/// # Data
/// * `Address` - The caller
pub fn emit_emergency_restore_all(e: &Env, selector: &Symbol, caller: &Address) {
    let topics = (Symbol::new(e, "emergency_restore_all"), selector.clone());
    e.events().publish(topics, caller.clone());
}

/// Emitted for every target that rejected a fan-out call.
///
/// # Topics
/// * `Symbol` - "fan_out_failed"
/// * `Address` - The failing target
///
/// # Data
/// * `u32` - Contract error code reported by the target (0 = abort)
pub fn emit_fan_out_failed(e: &Env, target: &Address, code: u32) {
    let topics = (Symbol::new(e, "fan_out_failed"), target.clone());
    e.events().publish(topics, code);
}
