use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp, Uint128};
use cw_storage_plus::{Item, Map};
use punk_raffle_common::{AccrualStrategy, Phase};

pub const CONFIG: Item<Config> = Item::new("config");
pub const POOL: Item<PoolState> = Item::new("pool");
/// One record per depositor, created on first deposit and never deleted.
pub const PARTICIPANTS: Map<&Addr, Participant> = Map::new("participants");
/// Append-only deposit log keyed by insertion index. The entries' point
/// intervals are contiguous and together cover [0, pool.total_points).
pub const ENTRIES: Map<u64, Entry> = Map::new("entries");

#[cw_serde]
pub struct Config {
    pub owner: Addr,
    /// Native denom the pool accepts and pays out.
    pub denom: String,
    /// Drand-style beacon oracle queried for draw randomness.
    pub randomness_oracle: Addr,
    /// Punks marketplace the purchase window buys from.
    pub punks_market: Addr,
    pub min_deposit: Uint128,
    /// How long the owner and winner have to buy punks after the draw.
    pub purchase_window_seconds: u64,
    /// How long claims must stay open before the residual sweep is allowed.
    pub sweep_cooldown_seconds: u64,
    /// A committed draw targets the oracle's latest round plus this margin,
    /// so the beacon cannot exist before the weight table is frozen.
    pub draw_round_offset: u64,
    pub accrual_strategy: AccrualStrategy,
}

#[cw_serde]
pub struct PoolState {
    /// Funding goal. Mutable only while funding, and never below
    /// total_deposited.
    pub target_balance: Uint128,
    pub total_deposited: Uint128,
    /// Pool-wide lottery weight; always >= total_deposited.
    pub total_points: Uint128,
    pub num_entries: u64,
    pub phase: Phase,
    /// Oracle round the draw is pinned to. Set once by CommitDraw.
    pub draw_round: Option<u64>,
    /// Set once by SelectWinner, always a past depositor.
    pub winner: Option<Addr>,
    pub purchase_deadline: Option<Timestamp>,
    pub owner_purchased: bool,
    pub winner_purchased: bool,
    /// Bank balance snapshot taken when claims open; the numerator base for
    /// every pro-rata claim.
    pub post_punk_purchases_balance: Uint128,
    pub claims_opened_at: Option<Timestamp>,
}

#[cw_serde]
pub struct Participant {
    pub total_deposited: Uint128,
    /// Lottery weight: own deposit points plus referral bonuses received.
    pub total_points: Uint128,
    /// Referral bonuses consumed against the cap
    /// (bonus_points_received <= total_deposited at all times).
    pub bonus_points_received: Uint128,
    /// Recorded on first use, immutable afterwards. Never self, never an
    /// address with zero deposits.
    pub referrer: Option<Addr>,
    pub has_claimed: bool,
}

impl Participant {
    pub fn new() -> Self {
        Participant {
            total_deposited: Uint128::zero(),
            total_points: Uint128::zero(),
            bonus_points_received: Uint128::zero(),
            referrer: None,
            has_claimed: false,
        }
    }
}

impl Default for Participant {
    fn default() -> Self {
        Self::new()
    }
}

#[cw_serde]
pub struct Entry {
    pub depositor: Addr,
    /// Half-open interval [points_start, points_end) on the global
    /// cumulative-points axis. Width = every point granted by this deposit,
    /// referral bonuses included (bonuses get no interval of their own).
    pub points_start: Uint128,
    pub points_end: Uint128,
}
