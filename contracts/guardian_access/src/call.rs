//! Cross-contract call payload and value transfer shared by the timelock and
//! recovery manager.

use guardian_errors::ContractError;
use soroban_sdk::{contracttype, token, Address, Env, InvokeError, Symbol, Val, Vec};

#[contracttype]
#[derive(Clone, Debug)]
pub struct Call {
    pub function: Symbol,
    pub args: Vec<Val>,
}

/// Invoke `call` on `target` as the current contract.
///
/// Any failure of the target, whether a contract error or an abort, maps to
/// `ExecutionFailed`. The target's own writes are already rolled back by the
/// host; the caller should return the error so its writes roll back too.
pub fn invoke(e: &Env, target: &Address, call: &Call) -> Result<Val, ContractError> {
    match e.try_invoke_contract::<Val, InvokeError>(target, &call.function, call.args.clone()) {
        Ok(Ok(val)) => Ok(val),
        _ => Err(ContractError::ExecutionFailed),
    }
}

/// Move `amount` of `token` from the current contract to `to`.
///
/// A rejected transfer, such as one the current contract cannot cover, maps
/// to `ExecutionFailed` instead of aborting with the token's own error.
pub fn transfer(e: &Env, token: &Address, to: &Address, amount: i128) -> Result<(), ContractError> {
    match token::Client::new(e, token).try_transfer(&e.current_contract_address(), to, &amount) {
        Ok(Ok(())) => Ok(()),
        _ => Err(ContractError::ExecutionFailed),
    }
}
