use cosmwasm_std::{StdError, Uint128};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("operation not allowed in phase {phase} (expected {expected})")]
    InvalidPhase { phase: String, expected: String },

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("deposit amount {amount} is below minimum {min_deposit}")]
    BelowMinimum {
        amount: Uint128,
        min_deposit: Uint128,
    },

    #[error("exceeds cap: {reason}")]
    ExceedsCap { reason: String },

    #[error("{operation} has already been done")]
    AlreadyDone { operation: String },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("deadline has passed ({deadline})")]
    DeadlineExpired { deadline: u64 },

    #[error("deadline has not been reached yet ({deadline})")]
    DeadlineNotReached { deadline: u64 },

    #[error("funding target not reached: {total_deposited} of {target}")]
    TargetNotReached {
        total_deposited: Uint128,
        target: Uint128,
    },

    #[error("no funds sent")]
    NoFundsSent,

    #[error("must send exactly one coin")]
    InvalidFunds,

    #[error("wrong denom: got {denom}")]
    WrongDenom { denom: String },

    #[error("invalid referrer: {reason}")]
    InvalidReferrer { reason: String },

    #[error("drand beacon not found for round {round}")]
    BeaconNotFound { round: u64 },
}
