use cosmwasm_std::{to_json_binary, Binary, Deps, Order, StdResult, Uint128};
use cw_storage_plus::Bound;
use punk_raffle_common::Phase;

use crate::execute::compute_claim_amount;
use crate::msg::{EntriesResponse, IndexedEntry, ParticipantResponse};
use crate::state::{CONFIG, ENTRIES, PARTICIPANTS, POOL};

pub fn query_config(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config)
}

pub fn query_pool(deps: Deps) -> StdResult<Binary> {
    let pool = POOL.load(deps.storage)?;
    to_json_binary(&pool)
}

pub fn query_participant(deps: Deps, address: String) -> StdResult<Binary> {
    let addr = deps.api.addr_validate(&address)?;
    let participant = PARTICIPANTS.may_load(deps.storage, &addr)?.unwrap_or_default();
    to_json_binary(&ParticipantResponse {
        address,
        total_deposited: participant.total_deposited,
        total_points: participant.total_points,
        bonus_points_received: participant.bonus_points_received,
        referrer: participant.referrer,
        has_claimed: participant.has_claimed,
    })
}

pub fn query_amount_deposited(deps: Deps, address: String) -> StdResult<Binary> {
    let addr = deps.api.addr_validate(&address)?;
    let amount = PARTICIPANTS
        .may_load(deps.storage, &addr)?
        .map(|p| p.total_deposited)
        .unwrap_or_default();
    to_json_binary(&amount)
}

pub fn query_points(deps: Deps, address: String) -> StdResult<Binary> {
    let addr = deps.api.addr_validate(&address)?;
    let points = PARTICIPANTS
        .may_load(deps.storage, &addr)?
        .map(|p| p.total_points)
        .unwrap_or_default();
    to_json_binary(&points)
}

pub fn query_num_entries(deps: Deps) -> StdResult<Binary> {
    let pool = POOL.load(deps.storage)?;
    to_json_binary(&pool.num_entries)
}

pub fn query_entries(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(20).min(100) as usize;
    let start = start_after.map(Bound::exclusive);

    let entries: Vec<IndexedEntry> = ENTRIES
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .map(|(index, entry)| IndexedEntry { index, entry })
        .collect();

    to_json_binary(&EntriesResponse { entries })
}

/// What the address would receive from claim() right now. Zero for the
/// winner, for non-depositors, for prior claimants, and outside ClaimsOpen.
pub fn query_claim_amount(deps: Deps, address: String) -> StdResult<Binary> {
    let addr = deps.api.addr_validate(&address)?;
    let pool = POOL.load(deps.storage)?;

    if pool.phase != Phase::ClaimsOpen || pool.winner.as_ref() == Some(&addr) {
        return to_json_binary(&Uint128::zero());
    }
    let participant = match PARTICIPANTS.may_load(deps.storage, &addr)? {
        Some(p) if !p.has_claimed => p,
        _ => return to_json_binary(&Uint128::zero()),
    };
    let winner_deposited = match &pool.winner {
        Some(w) => PARTICIPANTS
            .may_load(deps.storage, w)?
            .map(|p| p.total_deposited)
            .unwrap_or_default(),
        None => Uint128::zero(),
    };

    to_json_binary(&compute_claim_amount(
        &pool,
        winner_deposited,
        participant.total_deposited,
    ))
}
