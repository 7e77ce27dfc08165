use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Uint128};
use punk_raffle_common::AccrualStrategy;

use crate::state::{Config, Entry, PoolState};

#[cw_serde]
pub struct InstantiateMsg {
    pub denom: String,
    pub randomness_oracle: String,
    pub punks_market: String,
    pub target_balance: Uint128,
    pub min_deposit: Uint128,
    pub purchase_window_seconds: u64,
    pub sweep_cooldown_seconds: u64,
    pub draw_round_offset: u64,
    pub accrual_strategy: AccrualStrategy,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Enter the raffle. Send the pool denom in info.funds. An optional
    /// referrer doubles the depositor's points and earns capped bonuses one
    /// and two hops up the referral graph.
    Deposit { referrer: Option<String> },
    /// Update the funding goal. Owner only, funding phase only.
    SetTargetBalance { target: Uint128 },
    /// Point the pool at a different punks marketplace. Owner only, funding
    /// phase only.
    SetPunksMarket { market: String },
    /// Pin the draw to a future oracle round once the target is reached.
    /// Anyone can call, once.
    CommitDraw {},
    /// Consume the committed round's beacon and draw the winner.
    /// Anyone can call, once.
    SelectWinner {},
    /// Buy a punk with up to half the pool balance. Owner and winner only,
    /// once each, before the purchase deadline.
    BuyPunk { punk_id: u64, price: Uint128 },
    /// Open the claims phase. Owner may abandon during funding; anyone once
    /// both punks are bought or the purchase deadline has passed.
    EnterClaimsMode {},
    /// Withdraw the caller's pro-rata share of the post-purchases balance.
    Claim {},
    /// Send whatever is left to the owner after the claims cooldown.
    /// Anyone can call.
    Sweep {},
}

/// Query message for the drand beacon oracle.
#[cw_serde]
pub enum OracleQueryMsg {
    Beacon { round: u64 },
    LatestRound {},
}

/// Response type for querying a beacon from the randomness oracle.
/// Mirrors the StoredBeacon struct from the oracle contract.
#[cw_serde]
pub struct StoredBeaconResponse {
    pub round: u64,
    pub randomness: Vec<u8>,
    pub signature: Vec<u8>,
    pub verified: bool,
}

/// Execute message sent to the punks marketplace. The payment rides along as
/// funds; the market rejects a payment that does not match its offer.
#[cw_serde]
pub enum MarketExecuteMsg {
    BuyPunk { punk_id: u64 },
}

/// Read interface of the punks marketplace.
#[cw_serde]
pub enum MarketQueryMsg {
    Offer { punk_id: u64 },
}

#[cw_serde]
pub struct OfferResponse {
    pub punk_id: u64,
    pub price: Uint128,
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(Config)]
    Config {},
    #[returns(PoolState)]
    Pool {},
    #[returns(ParticipantResponse)]
    Participant { address: String },
    #[returns(Uint128)]
    AmountDeposited { address: String },
    #[returns(Uint128)]
    Points { address: String },
    #[returns(u64)]
    NumEntries {},
    #[returns(EntriesResponse)]
    Entries {
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(Uint128)]
    ClaimAmount { address: String },
}

#[cw_serde]
pub struct ParticipantResponse {
    pub address: String,
    pub total_deposited: Uint128,
    pub total_points: Uint128,
    pub bonus_points_received: Uint128,
    pub referrer: Option<Addr>,
    pub has_claimed: bool,
}

#[cw_serde]
pub struct EntriesResponse {
    pub entries: Vec<IndexedEntry>,
}

#[cw_serde]
pub struct IndexedEntry {
    pub index: u64,
    pub entry: Entry,
}
