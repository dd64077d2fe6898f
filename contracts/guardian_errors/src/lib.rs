#![no_std]

use soroban_sdk::contracterror;

/// @title  ErrorCategory
/// @notice Groups errors by domain for monitoring, alerting, and dashboards.
/// @dev    Off-chain consumers should switch on this value first, then on the
///         specific `ContractError` code for fine-grained handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Contract setup and configuration errors (codes 1-99).
    Initialization,
    /// Caller identity and role errors (codes 100-199).
    Authorization,
    /// Calls that would break a configuration invariant (codes 200-299).
    Invariant,
    /// Monitored-contract and record lookup errors (codes 300-399).
    Registry,
    /// Circuit breaker gate errors (codes 400-499).
    Circuit,
    /// Delayed-execution errors (codes 500-599): timelock queue and window
    /// errors, plus `ExecutionFailed`, which the recovery manager shares.
    Timelock,
    /// Recovery request workflow errors (codes 600-699).
    Recovery,
    /// Safe-math errors (codes 700-799).
    Arithmetic,
    /// Guarded token ledger errors (codes 800-899).
    Token,
}

/// @title  ContractError
/// @notice Canonical error enum shared by all Guardian contracts.
/// @dev    Codes are wire-stable. Never renumber a variant after deployment.
///         Append new variants at the end of their category block only.
///         Use the ErrorExt trait to retrieve the category and description.
///
/// Error Code Layout:
///   1  -  99  : Initialization
///   100 - 199 : Authorization
///   200 - 299 : Invariant
///   300 - 399 : Registry
///   400 - 499 : Circuit
///   500 - 599 : Timelock
///   600 - 699 : Recovery
///   700 - 799 : Arithmetic
///   800 - 899 : Token
#[contracterror]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    // --- Initialization (1-99) ---
    /// Contract has not been initialized yet.
    /// Contracts: all
    NotInitialized = 1,

    /// Contract has already been initialized and cannot be re-initialized.
    /// Contracts: all
    AlreadyInitialized = 2,

    /// An initialization parameter is out of range (e.g. zero approvals).
    /// Contracts: emergency_recovery
    InvalidConfig = 3,

    // --- Authorization (100-199) ---
    /// Caller does not hold any role accepted by the entry point.
    /// Contracts: all
    Unauthorized = 100,

    // --- Invariant (200-299) ---
    /// The call would leave the contract in a forbidden state, such as an
    /// empty admin set or a value transfer without a configured asset.
    /// Contracts: all
    InvalidOperation = 200,

    /// Delay is outside the accepted bounds.
    /// Contracts: timelock, emergency_recovery
    InvalidDelay = 201,

    // --- Registry (300-399) ---
    /// Address is already registered and active.
    /// Contracts: emergency_manager
    AlreadyRegistered = 300,

    /// The referenced record does not exist or is inactive.
    /// Contracts: emergency_manager, emergency_recovery
    NotFound = 301,

    // --- Circuit (400-499) ---
    /// The guarded operation is disabled by a tripped circuit breaker.
    /// Contracts: guarded_token
    CircuitBroken = 400,

    // --- Timelock (500-599) ---
    /// An identical transaction is already pending.
    /// Contracts: timelock
    AlreadyQueued = 500,

    /// No pending transaction matches the given arguments.
    /// Contracts: timelock
    NotQueued = 501,

    /// The transaction's eta has not been reached.
    /// Contracts: timelock
    NotReady = 502,

    /// The transaction's grace period has passed.
    /// Contracts: timelock
    Expired = 503,

    /// The target call or the value transfer failed. Shared by every
    /// delayed-execution path, so it stays in the timelock code block.
    /// Contracts: timelock, emergency_recovery
    ExecutionFailed = 504,

    // --- Recovery (600-699) ---
    /// Caller has already approved this request.
    /// Contracts: emergency_recovery
    AlreadyApproved = 600,

    /// Request does not yet have enough distinct approvals.
    /// Contracts: emergency_recovery
    InsufficientApprovals = 601,

    /// Recovery delay has not elapsed since the request.
    /// Contracts: emergency_recovery
    TimelockNotExpired = 602,

    /// Request has already been executed.
    /// Contracts: emergency_recovery
    AlreadyExecuted = 603,

    // --- Arithmetic (700-799) ---
    /// Integer overflow detected during a checked arithmetic operation.
    /// Contracts: all
    Overflow = 700,

    // --- Token (800-899) ---
    /// Amount argument must be strictly positive (> 0).
    /// Contracts: guarded_token, emergency_recovery
    AmountMustBePositive = 800,

    /// Sender balance is lower than the requested amount.
    /// Contracts: guarded_token
    InsufficientBalance = 801,

    /// Spender allowance is lower than the requested amount.
    /// Contracts: guarded_token
    InsufficientAllowance = 802,

    /// Minting would push total supply above the governed cap.
    /// Contracts: guarded_token
    SupplyCapExceeded = 803,
}

/// @title  ErrorExt
/// @notice Provides category() and description() on every ContractError variant.
/// @dev    Use this for structured logging, monitoring, and off-chain display.
pub trait ErrorExt {
    /// @return The ErrorCategory bucket this error belongs to.
    fn category(&self) -> ErrorCategory;

    /// @return A static string description safe for logging or display.
    fn description(&self) -> &'static str;
}

impl ErrorExt for ContractError {
    fn category(&self) -> ErrorCategory {
        match self {
            ContractError::NotInitialized
            | ContractError::AlreadyInitialized
            | ContractError::InvalidConfig => ErrorCategory::Initialization,

            ContractError::Unauthorized => ErrorCategory::Authorization,

            ContractError::InvalidOperation | ContractError::InvalidDelay => {
                ErrorCategory::Invariant
            }

            ContractError::AlreadyRegistered | ContractError::NotFound => ErrorCategory::Registry,

            ContractError::CircuitBroken => ErrorCategory::Circuit,

            ContractError::AlreadyQueued
            | ContractError::NotQueued
            | ContractError::NotReady
            | ContractError::Expired
            | ContractError::ExecutionFailed => ErrorCategory::Timelock,

            ContractError::AlreadyApproved
            | ContractError::InsufficientApprovals
            | ContractError::TimelockNotExpired
            | ContractError::AlreadyExecuted => ErrorCategory::Recovery,

            ContractError::Overflow => ErrorCategory::Arithmetic,

            ContractError::AmountMustBePositive
            | ContractError::InsufficientBalance
            | ContractError::InsufficientAllowance
            | ContractError::SupplyCapExceeded => ErrorCategory::Token,
        }
    }

    fn description(&self) -> &'static str {
        match self {
            ContractError::NotInitialized => "Contract has not been initialized",
            ContractError::AlreadyInitialized => "Contract has already been initialized",
            ContractError::InvalidConfig => "Initialization parameter is out of range",
            ContractError::Unauthorized => "Caller lacks the required role",
            ContractError::InvalidOperation => "Operation would violate a contract invariant",
            ContractError::InvalidDelay => "Delay is outside the accepted bounds",
            ContractError::AlreadyRegistered => "Address is already registered",
            ContractError::NotFound => "Referenced record does not exist",
            ContractError::CircuitBroken => "Circuit breaker: function disabled",
            ContractError::AlreadyQueued => "Transaction is already queued",
            ContractError::NotQueued => "Transaction is not queued",
            ContractError::NotReady => "Transaction not ready",
            ContractError::Expired => "Transaction expired",
            ContractError::ExecutionFailed => "Target call or value transfer failed",
            ContractError::AlreadyApproved => "Caller already approved this request",
            ContractError::InsufficientApprovals => "Not enough approvals to execute",
            ContractError::TimelockNotExpired => "Timelock not expired",
            ContractError::AlreadyExecuted => "Request has already been executed",
            ContractError::Overflow => "Integer overflow in checked arithmetic",
            ContractError::AmountMustBePositive => "Amount must be strictly positive (> 0)",
            ContractError::InsufficientBalance => "Insufficient balance",
            ContractError::InsufficientAllowance => "Insufficient allowance",
            ContractError::SupplyCapExceeded => "Mint would exceed the supply cap",
        }
    }
}
