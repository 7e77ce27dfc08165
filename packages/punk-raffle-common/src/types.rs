use cosmwasm_schema::cw_serde;
use std::fmt;

/// The pool's position in its one-way lifecycle. No phase is ever revisited.
#[cw_serde]
#[derive(Copy)]
pub enum Phase {
    /// Accepting deposits until the target balance is reached.
    Funding,
    /// Winner selected; owner and winner may each buy a punk until the deadline.
    Drawn,
    /// Non-winning depositors may claim their pro-rata share of the remainder.
    ClaimsOpen,
    /// Residual balance swept to the owner. Terminal.
    Swept,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Funding => "funding",
            Phase::Drawn => "drawn",
            Phase::ClaimsOpen => "claims_open",
            Phase::Swept => "swept",
        };
        write!(f, "{}", s)
    }
}
