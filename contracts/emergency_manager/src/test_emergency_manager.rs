#![cfg(test)]

use crate::{DataKey, EmergencyManager, EmergencyManagerClient, FanOutFailure};
use circuit_breaker::{CircuitBreaker, CircuitBreakerClient};
use guardian_access::Role;
use guardian_errors::ContractError;
use guardian_access::storage::BUMP_THRESHOLD;
use soroban_sdk::testutils::storage::Persistent as _;
use soroban_sdk::testutils::{Address as _, Events, Ledger};
use soroban_sdk::{Address, Env, String, Symbol, TryFromVal, Val, Vec};

struct Fixture<'a> {
    manager: EmergencyManagerClient<'a>,
    admin: Address,
}

fn setup(e: &Env) -> Fixture<'_> {
    e.mock_all_auths();
    let contract_id = e.register(EmergencyManager, ());
    let manager = EmergencyManagerClient::new(e, &contract_id);
    let admin = Address::generate(e);
    manager.initialize(&admin);
    Fixture { manager, admin }
}

/// Deploys a breaker owned by `owner`. When `trust_manager` is set the
/// manager gets Breaker and Admin on it, which is what fan-out needs.
fn deploy_breaker<'a>(
    e: &'a Env,
    owner: &Address,
    manager: &Address,
    trust_manager: bool,
) -> CircuitBreakerClient<'a> {
    let contract_id = e.register(CircuitBreaker, ());
    let breaker = CircuitBreakerClient::new(e, &contract_id);
    breaker.initialize(owner, &0);
    if trust_manager {
        breaker.authorize_breaker(owner, manager);
        breaker.grant_role(owner, &Role::Admin, manager);
    }
    breaker
}

fn transfer(e: &Env) -> Symbol {
    Symbol::new(e, "transfer")
}

fn name(e: &Env, s: &str) -> String {
    String::from_str(e, s)
}

/// Every event `contract` published under `name`, in order.
fn events_named(e: &Env, contract: &Address, name: &str) -> Vec<(Vec<Val>, Val)> {
    let name = Symbol::new(e, name);
    let mut found = Vec::new(e);
    for (source, topics, data) in e.events().all().iter() {
        if source != *contract {
            continue;
        }
        let head = topics.get(0).and_then(|t| Symbol::try_from_val(e, &t).ok());
        if head == Some(name.clone()) {
            found.push_back((topics, data));
        }
    }
    found
}

// ---------------------------------------------------------------------------
// Initialization
// ---------------------------------------------------------------------------

#[test]
fn test_initialize() {
    let e = Env::default();
    let f = setup(&e);
    assert!(f.manager.has_role(&Role::Admin, &f.admin));
    assert_eq!(f.manager.get_contract_count(), 0);
    assert_eq!(f.manager.get_contracts().len(), 0);
}

#[test]
fn test_initialize_twice_fails() {
    let e = Env::default();
    let f = setup(&e);
    assert_eq!(
        f.manager.try_initialize(&Address::generate(&e)),
        Err(Ok(ContractError::AlreadyInitialized))
    );
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[test]
fn test_register_contract() {
    let e = Env::default();
    e.ledger().with_mut(|li| li.timestamp = 777);
    let f = setup(&e);
    let target = Address::generate(&e);

    f.manager.register_contract(&f.admin, &target, &name(&e, "vault"));

    assert_eq!(f.manager.get_contract_count(), 1);
    let info = f.manager.get_contract_info(&target).unwrap();
    assert_eq!(info.address, target);
    assert_eq!(info.name, name(&e, "vault"));
    assert!(info.is_active);
    assert_eq!(info.registered_at, 777);
    assert_eq!(f.manager.get_contract(&0), info);
}

#[test]
fn test_register_twice_fails() {
    let e = Env::default();
    let f = setup(&e);
    let target = Address::generate(&e);

    f.manager.register_contract(&f.admin, &target, &name(&e, "vault"));
    assert_eq!(
        f.manager.try_register_contract(&f.admin, &target, &name(&e, "again")),
        Err(Ok(ContractError::AlreadyRegistered))
    );
    assert_eq!(f.manager.get_contract_count(), 1);
}

#[test]
fn test_register_requires_admin() {
    let e = Env::default();
    let f = setup(&e);
    let outsider = Address::generate(&e);
    assert_eq!(
        f.manager
            .try_register_contract(&outsider, &Address::generate(&e), &name(&e, "x")),
        Err(Ok(ContractError::Unauthorized))
    );
}

#[test]
fn test_deregister_updates_count() {
    let e = Env::default();
    let f = setup(&e);
    let a = Address::generate(&e);
    let b = Address::generate(&e);

    f.manager.register_contract(&f.admin, &a, &name(&e, "a"));
    f.manager.register_contract(&f.admin, &b, &name(&e, "b"));
    assert_eq!(f.manager.get_contract_count(), 2);

    f.manager.deregister_contract(&f.admin, &a);
    assert_eq!(f.manager.get_contract_count(), 1);

    let active = f.manager.get_contracts();
    assert_eq!(active.len(), 1);
    assert_eq!(active.get(0).unwrap().address, b);

    // The tombstone keeps its index slot.
    assert!(!f.manager.get_contract(&0).is_active);
}

#[test]
fn test_deregister_unknown_or_inactive_fails() {
    let e = Env::default();
    let f = setup(&e);
    let a = Address::generate(&e);

    assert_eq!(
        f.manager.try_deregister_contract(&f.admin, &a),
        Err(Ok(ContractError::NotFound))
    );

    f.manager.register_contract(&f.admin, &a, &name(&e, "a"));
    f.manager.deregister_contract(&f.admin, &a);
    assert_eq!(
        f.manager.try_deregister_contract(&f.admin, &a),
        Err(Ok(ContractError::NotFound))
    );
    assert_eq!(f.manager.get_contract_count(), 0);
}

#[test]
fn test_reregister_reactivates_in_place() {
    let e = Env::default();
    let f = setup(&e);
    let a = Address::generate(&e);
    let b = Address::generate(&e);

    f.manager.register_contract(&f.admin, &a, &name(&e, "a"));
    f.manager.register_contract(&f.admin, &b, &name(&e, "b"));
    f.manager.deregister_contract(&f.admin, &a);
    f.manager.register_contract(&f.admin, &a, &name(&e, "a-v2"));

    assert_eq!(f.manager.get_contract_count(), 2);
    let first = f.manager.get_contract(&0);
    assert_eq!(first.address, a);
    assert_eq!(first.name, name(&e, "a-v2"));
    assert!(first.is_active);
    assert_eq!(
        f.manager.try_get_contract(&2),
        Err(Ok(ContractError::NotFound))
    );
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

#[test]
fn test_add_and_remove_operator() {
    let e = Env::default();
    let f = setup(&e);
    let op = Address::generate(&e);

    f.manager.add_emergency_operator(&f.admin, &op);
    assert!(f.manager.is_emergency_operator(&op));

    f.manager.remove_emergency_operator(&f.admin, &op);
    assert!(!f.manager.is_emergency_operator(&op));
}

#[test]
fn test_operator_cannot_add_operators() {
    let e = Env::default();
    let f = setup(&e);
    let op = Address::generate(&e);
    f.manager.add_emergency_operator(&f.admin, &op);

    assert_eq!(
        f.manager
            .try_add_emergency_operator(&op, &Address::generate(&e)),
        Err(Ok(ContractError::Unauthorized))
    );
}

// ---------------------------------------------------------------------------
// Fan-out
// ---------------------------------------------------------------------------

#[test]
fn test_break_all_by_outsider_fails() {
    let e = Env::default();
    let f = setup(&e);
    let owner = Address::generate(&e);
    let a = deploy_breaker(&e, &owner, &f.manager.address, true);
    f.manager.register_contract(&f.admin, &a.address, &name(&e, "a"));

    let outsider = Address::generate(&e);
    assert_eq!(
        f.manager.try_emergency_break_all(&outsider, &transfer(&e)),
        Err(Ok(ContractError::Unauthorized))
    );
    assert!(!a.is_circuit_broken(&transfer(&e)));
}

#[test]
fn test_operator_breaks_all_admin_restores_all() {
    let e = Env::default();
    let f = setup(&e);
    let owner = Address::generate(&e);
    let a = deploy_breaker(&e, &owner, &f.manager.address, true);
    let b = deploy_breaker(&e, &owner, &f.manager.address, true);
    f.manager.register_contract(&f.admin, &a.address, &name(&e, "a"));
    f.manager.register_contract(&f.admin, &b.address, &name(&e, "b"));

    let x = Address::generate(&e);
    f.manager.add_emergency_operator(&f.admin, &x);

    let report = f.manager.emergency_break_all(&x, &transfer(&e));
    assert_eq!(report.attempted, 2);
    assert_eq!(report.succeeded, 2);
    assert!(report.failures.is_empty());
    assert!(a.is_circuit_broken(&transfer(&e)));
    assert!(b.is_circuit_broken(&transfer(&e)));

    let state = a.get_circuit_state(&transfer(&e)).unwrap();
    assert_eq!(state.broken_by, f.manager.address);
    assert_eq!(state.reason, name(&e, "emergency"));

    assert_eq!(
        f.manager.try_emergency_restore_all(&x, &transfer(&e)),
        Err(Ok(ContractError::Unauthorized))
    );
    assert!(a.is_circuit_broken(&transfer(&e)));

    let report = f.manager.emergency_restore_all(&f.admin, &transfer(&e));
    assert_eq!(report.succeeded, 2);
    assert!(!a.is_circuit_broken(&transfer(&e)));
    assert!(!b.is_circuit_broken(&transfer(&e)));
}

#[test]
fn test_admin_can_break_all() {
    let e = Env::default();
    let f = setup(&e);
    let owner = Address::generate(&e);
    let a = deploy_breaker(&e, &owner, &f.manager.address, true);
    f.manager.register_contract(&f.admin, &a.address, &name(&e, "a"));

    f.manager.emergency_break_all(&f.admin, &transfer(&e));
    assert!(a.is_circuit_broken(&transfer(&e)));
}

#[test]
fn test_break_all_isolates_failing_target() {
    let e = Env::default();
    let f = setup(&e);
    let owner = Address::generate(&e);
    let a = deploy_breaker(&e, &owner, &f.manager.address, true);
    let untrusting = deploy_breaker(&e, &owner, &f.manager.address, false);
    let c = deploy_breaker(&e, &owner, &f.manager.address, true);
    f.manager.register_contract(&f.admin, &a.address, &name(&e, "a"));
    f.manager
        .register_contract(&f.admin, &untrusting.address, &name(&e, "untrusting"));
    f.manager.register_contract(&f.admin, &c.address, &name(&e, "c"));

    let report = f.manager.emergency_break_all(&f.admin, &transfer(&e));

    assert_eq!(report.attempted, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(
        report.failures.get(0).unwrap(),
        FanOutFailure {
            target: untrusting.address.clone(),
            code: ContractError::Unauthorized as u32,
        }
    );
    assert!(a.is_circuit_broken(&transfer(&e)));
    assert!(!untrusting.is_circuit_broken(&transfer(&e)));
    assert!(c.is_circuit_broken(&transfer(&e)));
}

#[test]
fn test_restore_all_needs_admin_on_target() {
    let e = Env::default();
    let f = setup(&e);
    let owner = Address::generate(&e);
    let a = deploy_breaker(&e, &owner, &f.manager.address, false);
    // Breaker only: the manager can trip but not restore.
    a.authorize_breaker(&owner, &f.manager.address);
    f.manager.register_contract(&f.admin, &a.address, &name(&e, "a"));

    f.manager.emergency_break_all(&f.admin, &transfer(&e));
    assert!(a.is_circuit_broken(&transfer(&e)));

    let report = f.manager.emergency_restore_all(&f.admin, &transfer(&e));
    assert_eq!(report.succeeded, 0);
    assert_eq!(report.failures.len(), 1);
    assert!(a.is_circuit_broken(&transfer(&e)));
}

#[test]
fn test_break_all_skips_deregistered() {
    let e = Env::default();
    let f = setup(&e);
    let owner = Address::generate(&e);
    let a = deploy_breaker(&e, &owner, &f.manager.address, true);
    let b = deploy_breaker(&e, &owner, &f.manager.address, true);
    f.manager.register_contract(&f.admin, &a.address, &name(&e, "a"));
    f.manager.register_contract(&f.admin, &b.address, &name(&e, "b"));
    f.manager.deregister_contract(&f.admin, &b.address);

    let report = f.manager.emergency_break_all(&f.admin, &transfer(&e));
    assert_eq!(report.attempted, 1);
    assert!(a.is_circuit_broken(&transfer(&e)));
    assert!(!b.is_circuit_broken(&transfer(&e)));
}

#[test]
fn test_break_all_with_empty_registry() {
    let e = Env::default();
    let f = setup(&e);

    let report = f.manager.emergency_break_all(&f.admin, &transfer(&e));
    assert_eq!(report.attempted, 0);
    assert_eq!(report.succeeded, 0);
    assert!(report.failures.is_empty());
}

#[test]
fn test_removed_operator_loses_access() {
    let e = Env::default();
    let f = setup(&e);
    let op = Address::generate(&e);
    f.manager.add_emergency_operator(&f.admin, &op);
    f.manager.remove_emergency_operator(&f.admin, &op);

    assert_eq!(
        f.manager.try_emergency_break_all(&op, &transfer(&e)),
        Err(Ok(ContractError::Unauthorized))
    );
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[test]
fn test_break_all_emits_caller() {
    let e = Env::default();
    let f = setup(&e);
    let operator = Address::generate(&e);
    f.manager.add_emergency_operator(&f.admin, &operator);

    f.manager.emergency_break_all(&operator, &transfer(&e));

    let emitted = events_named(&e, &f.manager.address, "emergency_break_all");
    assert_eq!(emitted.len(), 1);
    let (topics, data) = emitted.get(0).unwrap();
    assert_eq!(
        Symbol::try_from_val(&e, &topics.get(1).unwrap()).unwrap(),
        transfer(&e)
    );
    assert_eq!(Address::try_from_val(&e, &data).unwrap(), operator);
}

#[test]
fn test_restore_all_emits_caller() {
    let e = Env::default();
    let f = setup(&e);

    f.manager.emergency_restore_all(&f.admin, &transfer(&e));

    let emitted = events_named(&e, &f.manager.address, "emergency_restore_all");
    assert_eq!(emitted.len(), 1);
    let (topics, data) = emitted.get(0).unwrap();
    assert_eq!(
        Symbol::try_from_val(&e, &topics.get(1).unwrap()).unwrap(),
        transfer(&e)
    );
    assert_eq!(Address::try_from_val(&e, &data).unwrap(), f.admin);
}

#[test]
fn test_fan_out_failed_names_target_and_code() {
    let e = Env::default();
    let f = setup(&e);
    let owner = Address::generate(&e);
    let a = deploy_breaker(&e, &owner, &f.manager.address, true);
    let untrusting = deploy_breaker(&e, &owner, &f.manager.address, false);
    f.manager.register_contract(&f.admin, &a.address, &name(&e, "a"));
    f.manager
        .register_contract(&f.admin, &untrusting.address, &name(&e, "untrusting"));

    f.manager.emergency_break_all(&f.admin, &transfer(&e));

    let failed = events_named(&e, &f.manager.address, "fan_out_failed");
    assert_eq!(failed.len(), 1);
    let (topics, data) = failed.get(0).unwrap();
    assert_eq!(
        Address::try_from_val(&e, &topics.get(1).unwrap()).unwrap(),
        untrusting.address
    );
    assert_eq!(
        u32::try_from_val(&e, &data).unwrap(),
        ContractError::Unauthorized as u32
    );
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

#[test]
fn test_monitored_records_are_persistent() {
    let e = Env::default();
    let f = setup(&e);
    let target = Address::generate(&e);
    f.manager.register_contract(&f.admin, &target, &name(&e, "vault"));

    let record = DataKey::Monitored(target);
    e.as_contract(&f.manager.address, || {
        assert!(!e.storage().instance().has(&record));
        assert!(e.storage().persistent().has(&record));
        assert!(e.storage().persistent().get_ttl(&DataKey::MonitoredIndex) >= BUMP_THRESHOLD);
    });
}
