use cosmwasm_std::{
    coins, to_json_binary, BankMsg, DepsMut, Env, Event, MessageInfo, Order, QuerierWrapper,
    QueryRequest, Response, StdResult, Uint128, WasmMsg, WasmQuery,
};
use punk_raffle_common::{CapRoom, Phase};
use sha2::{Digest, Sha256};

use crate::error::ContractError;
use crate::msg::{MarketExecuteMsg, OracleQueryMsg, StoredBeaconResponse};
use crate::state::{Entry, PoolState, CONFIG, ENTRIES, PARTICIPANTS, POOL};

/// Current native balance held by the pool.
pub fn pool_balance(querier: &QuerierWrapper, env: &Env, denom: &str) -> StdResult<Uint128> {
    Ok(querier
        .query_balance(env.contract.address.clone(), denom)?
        .amount)
}

/// Pro-rata share of the post-purchases balance for one claimant, floor
/// division. The winner's deposit is excluded from the denominator; dust lost
/// to rounding stays in the pool for the sweep.
pub fn compute_claim_amount(
    pool: &PoolState,
    winner_deposited: Uint128,
    claimant_deposited: Uint128,
) -> Uint128 {
    let eligible = pool.total_deposited.saturating_sub(winner_deposited);
    if eligible.is_zero() {
        return Uint128::zero();
    }
    claimant_deposited.multiply_ratio(pool.post_punk_purchases_balance, eligible)
}

/// Enter the raffle with the funds attached to the message.
pub fn deposit(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    referrer: Option<String>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    // Validate funds: exactly one coin of the pool denom
    if info.funds.is_empty() {
        return Err(ContractError::NoFundsSent);
    }
    if info.funds.len() != 1 {
        return Err(ContractError::InvalidFunds);
    }
    let sent = &info.funds[0];
    if sent.denom != config.denom {
        return Err(ContractError::WrongDenom {
            denom: sent.denom.clone(),
        });
    }
    let amount = sent.amount;
    if amount.is_zero() {
        return Err(ContractError::NoFundsSent);
    }

    if info.sender == config.owner {
        return Err(ContractError::Unauthorized {
            reason: "the owner cannot enter the raffle".to_string(),
        });
    }
    if amount < config.min_deposit {
        return Err(ContractError::BelowMinimum {
            amount,
            min_deposit: config.min_deposit,
        });
    }

    let mut pool = POOL.load(deps.storage)?;
    if pool.phase != Phase::Funding {
        return Err(ContractError::InvalidPhase {
            phase: pool.phase.to_string(),
            expected: "funding".to_string(),
        });
    }
    // The weight table is frozen once the draw is pinned to a round
    if pool.draw_round.is_some() {
        return Err(ContractError::InvalidPhase {
            phase: pool.phase.to_string(),
            expected: "funding with no committed draw".to_string(),
        });
    }
    if pool.total_deposited + amount > pool.target_balance {
        return Err(ContractError::ExceedsCap {
            reason: format!(
                "deposit of {} would push the pool past its target of {}",
                amount, pool.target_balance
            ),
        });
    }

    let mut participant = PARTICIPANTS
        .may_load(deps.storage, &info.sender)?
        .unwrap_or_default();

    // Validate and record the referrer. Once recorded it can never change; an
    // omitted referrer on a later deposit still counts as referred.
    if let Some(referrer_str) = referrer {
        let referrer_addr = deps.api.addr_validate(&referrer_str)?;
        if referrer_addr == info.sender {
            return Err(ContractError::InvalidReferrer {
                reason: "cannot refer yourself".to_string(),
            });
        }
        match &participant.referrer {
            Some(existing) if *existing != referrer_addr => {
                return Err(ContractError::InvalidReferrer {
                    reason: format!("a different referrer ({}) is already recorded", existing),
                });
            }
            Some(_) => {}
            None => {
                let upstream = PARTICIPANTS.may_load(deps.storage, &referrer_addr)?;
                match upstream {
                    Some(p) if !p.total_deposited.is_zero() => {
                        participant.referrer = Some(referrer_addr);
                    }
                    _ => {
                        return Err(ContractError::NotFound {
                            what: format!("referrer {} with a prior deposit", referrer_addr),
                        });
                    }
                }
            }
        }
    }

    // Snapshot upstream cap headroom before touching any record. The
    // grand-referrer can alias the depositor (two-cycle referral graph), in
    // which case its headroom is read from the pre-deposit record.
    let referrer_addr = participant.referrer.clone();
    let (referrer_cap, grand_addr) = match &referrer_addr {
        Some(r) => {
            let upstream = PARTICIPANTS.load(deps.storage, r)?;
            let cap = CapRoom {
                total_deposited: upstream.total_deposited,
                bonus_points_received: upstream.bonus_points_received,
            };
            (Some(cap), upstream.referrer)
        }
        None => (None, None),
    };
    let grand_cap = match &grand_addr {
        Some(g) => {
            let upstream = if *g == info.sender {
                participant.clone()
            } else {
                PARTICIPANTS.load(deps.storage, g)?
            };
            Some(CapRoom {
                total_deposited: upstream.total_deposited,
                bonus_points_received: upstream.bonus_points_received,
            })
        }
        None => None,
    };

    let accrual = config
        .accrual_strategy
        .accrue(amount, referrer_cap.as_ref(), grand_cap.as_ref());

    participant.total_deposited += amount;
    participant.total_points += accrual.depositor_points;
    PARTICIPANTS.save(deps.storage, &info.sender, &participant)?;

    // Bonuses are applied through sequential read-modify-write so an aliased
    // record (two-cycle) is re-read after the save above.
    if let Some(r) = &referrer_addr {
        if !accrual.referrer_bonus.is_zero() {
            let mut upstream = PARTICIPANTS.load(deps.storage, r)?;
            upstream.total_points += accrual.referrer_bonus;
            upstream.bonus_points_received += accrual.referrer_bonus;
            PARTICIPANTS.save(deps.storage, r, &upstream)?;
        }
    }
    if let Some(g) = &grand_addr {
        if !accrual.grand_referrer_bonus.is_zero() {
            let mut upstream = PARTICIPANTS.load(deps.storage, g)?;
            upstream.total_points += accrual.grand_referrer_bonus;
            upstream.bonus_points_received += accrual.grand_referrer_bonus;
            PARTICIPANTS.save(deps.storage, g, &upstream)?;
        }
    }

    // Append the deposit's interval on the cumulative-points axis. Its width
    // is everything granted in this step, bonuses included, keeping the
    // entries an exact partition of [0, total_points).
    let points_start = pool.total_points;
    let points_end = points_start + accrual.total();
    ENTRIES.save(
        deps.storage,
        pool.num_entries,
        &Entry {
            depositor: info.sender.clone(),
            points_start,
            points_end,
        },
    )?;
    pool.num_entries += 1;
    pool.total_points = points_end;
    pool.total_deposited += amount;
    POOL.save(deps.storage, &pool)?;

    Ok(Response::new()
        .add_attribute("action", "deposit")
        .add_attribute("depositor", info.sender.to_string())
        .add_attribute("amount", amount.to_string())
        .add_event(
            Event::new("punk_raffle_deposit")
                .add_attribute("depositor", info.sender.to_string())
                .add_attribute("amount", amount.to_string())
                .add_attribute("points", accrual.depositor_points.to_string())
                .add_attribute("referrer_bonus", accrual.referrer_bonus.to_string())
                .add_attribute(
                    "grand_referrer_bonus",
                    accrual.grand_referrer_bonus.to_string(),
                )
                .add_attribute("total_deposited", pool.total_deposited.to_string())
                .add_attribute("total_points", pool.total_points.to_string()),
        ))
}

/// Update the funding goal. Owner only, funding phase only, never below what
/// has already been deposited.
pub fn set_target_balance(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    target: Uint128,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.owner {
        return Err(ContractError::Unauthorized {
            reason: "only the owner can set the target balance".to_string(),
        });
    }

    let mut pool = POOL.load(deps.storage)?;
    if pool.phase != Phase::Funding {
        return Err(ContractError::InvalidPhase {
            phase: pool.phase.to_string(),
            expected: "funding".to_string(),
        });
    }
    if pool.draw_round.is_some() {
        return Err(ContractError::AlreadyDone {
            operation: "the draw commit".to_string(),
        });
    }
    if target < pool.total_deposited {
        return Err(ContractError::ExceedsCap {
            reason: format!(
                "target {} is below the {} already deposited",
                target, pool.total_deposited
            ),
        });
    }

    pool.target_balance = target;
    POOL.save(deps.storage, &pool)?;

    Ok(Response::new()
        .add_attribute("action", "set_target_balance")
        .add_attribute("target", target.to_string())
        .add_event(
            Event::new("punk_raffle_target_updated").add_attribute("target", target.to_string()),
        ))
}

/// Point the pool at a different punks marketplace, e.g. after a market
/// migration. Owner only, and only while the pool is still funding.
pub fn set_punks_market(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    market: String,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    if info.sender != config.owner {
        return Err(ContractError::Unauthorized {
            reason: "only the owner can set the punks market".to_string(),
        });
    }

    let pool = POOL.load(deps.storage)?;
    if pool.phase != Phase::Funding {
        return Err(ContractError::InvalidPhase {
            phase: pool.phase.to_string(),
            expected: "funding".to_string(),
        });
    }

    config.punks_market = deps.api.addr_validate(&market)?;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "set_punks_market")
        .add_attribute("market", config.punks_market.to_string())
        .add_event(
            Event::new("punk_raffle_market_updated")
                .add_attribute("market", config.punks_market.to_string()),
        ))
}

/// Pin the draw to a future oracle round. Callable by anyone once the target
/// is reached; freezing the round before its beacon exists keeps the
/// randomness out of every caller's control.
pub fn commit_draw(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut pool = POOL.load(deps.storage)?;

    if pool.phase != Phase::Funding {
        return Err(ContractError::InvalidPhase {
            phase: pool.phase.to_string(),
            expected: "funding".to_string(),
        });
    }
    if pool.draw_round.is_some() {
        return Err(ContractError::AlreadyDone {
            operation: "the draw commit".to_string(),
        });
    }
    if pool.total_deposited < pool.target_balance {
        return Err(ContractError::TargetNotReached {
            total_deposited: pool.total_deposited,
            target: pool.target_balance,
        });
    }
    if pool.total_points.is_zero() {
        return Err(ContractError::NotFound {
            what: "deposits to draw from".to_string(),
        });
    }

    let latest_round: u64 = deps.querier.query(&QueryRequest::Wasm(WasmQuery::Smart {
        contract_addr: config.randomness_oracle.to_string(),
        msg: to_json_binary(&OracleQueryMsg::LatestRound {})?,
    }))?;
    let draw_round = latest_round + config.draw_round_offset;

    pool.draw_round = Some(draw_round);
    POOL.save(deps.storage, &pool)?;

    Ok(Response::new()
        .add_attribute("action", "commit_draw")
        .add_attribute("draw_round", draw_round.to_string())
        .add_event(
            Event::new("punk_raffle_draw_committed")
                .add_attribute("draw_round", draw_round.to_string())
                .add_attribute("latest_round", latest_round.to_string())
                .add_attribute("total_points", pool.total_points.to_string()),
        ))
}

/// Consume the committed round's beacon and draw the winner.
///
/// The winning ticket is sha256(beacon randomness) reduced to u128 modulo
/// total_points; the unique deposit interval containing the ticket names the
/// winner. Callable by anyone, once per pool lifetime.
pub fn select_winner(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut pool = POOL.load(deps.storage)?;

    if pool.phase != Phase::Funding {
        return Err(ContractError::InvalidPhase {
            phase: pool.phase.to_string(),
            expected: "funding".to_string(),
        });
    }
    let draw_round = pool.draw_round.ok_or(ContractError::NotFound {
        what: "a committed draw".to_string(),
    })?;

    let beacon: Option<StoredBeaconResponse> =
        deps.querier.query(&QueryRequest::Wasm(WasmQuery::Smart {
            contract_addr: config.randomness_oracle.to_string(),
            msg: to_json_binary(&OracleQueryMsg::Beacon { round: draw_round })?,
        }))?;
    let beacon = beacon.ok_or(ContractError::BeaconNotFound { round: draw_round })?;
    if beacon.randomness.len() != 32 {
        return Err(ContractError::BeaconNotFound { round: draw_round });
    }

    let digest: [u8; 32] = Sha256::digest(&beacon.randomness).into();
    let mut ticket_bytes = [0u8; 16];
    ticket_bytes.copy_from_slice(&digest[0..16]);
    let winning_ticket = u128::from_be_bytes(ticket_bytes) % pool.total_points.u128();
    let ticket = Uint128::new(winning_ticket);

    // Scan the deposit log for the interval containing the ticket. The
    // entries partition [0, total_points), so exactly one matches.
    let mut winner: Option<Entry> = None;
    for item in ENTRIES.range(deps.storage, None, None, Order::Ascending) {
        let (_, entry) = item?;
        if ticket >= entry.points_start && ticket < entry.points_end {
            winner = Some(entry);
            break;
        }
    }
    let winning_entry = winner.ok_or(ContractError::NotFound {
        what: "an entry containing the winning ticket".to_string(),
    })?;

    let purchase_deadline = env.block.time.plus_seconds(config.purchase_window_seconds);
    pool.winner = Some(winning_entry.depositor.clone());
    pool.purchase_deadline = Some(purchase_deadline);
    pool.phase = Phase::Drawn;
    POOL.save(deps.storage, &pool)?;

    Ok(Response::new()
        .add_attribute("action", "select_winner")
        .add_attribute("winner", winning_entry.depositor.to_string())
        .add_event(
            Event::new("punk_raffle_winner_selected")
                .add_attribute("winner", winning_entry.depositor.to_string())
                .add_attribute("winning_ticket", winning_ticket.to_string())
                .add_attribute("total_points", pool.total_points.to_string())
                .add_attribute("randomness", hex::encode(&beacon.randomness))
                .add_attribute("drand_round", draw_round.to_string())
                .add_attribute("purchase_deadline", purchase_deadline.seconds().to_string()),
        ))
}

/// Buy a punk for the caller with pool funds. Owner and winner only, once
/// each, before the purchase deadline, spending at most half the current
/// balance. The market rejects a price that doesn't match its offer, which
/// aborts the whole call.
pub fn buy_punk(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    punk_id: u64,
    price: Uint128,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut pool = POOL.load(deps.storage)?;

    if pool.phase != Phase::Drawn {
        return Err(ContractError::InvalidPhase {
            phase: pool.phase.to_string(),
            expected: "drawn".to_string(),
        });
    }
    // Both set when the phase advanced to Drawn
    let winner = pool.winner.clone().ok_or(ContractError::NotFound {
        what: "winner".to_string(),
    })?;
    let deadline = pool.purchase_deadline.ok_or(ContractError::NotFound {
        what: "purchase deadline".to_string(),
    })?;

    let is_owner = info.sender == config.owner;
    let is_winner = info.sender == winner;
    if !is_owner && !is_winner {
        return Err(ContractError::Unauthorized {
            reason: "only the owner or the winner can buy a punk".to_string(),
        });
    }
    if env.block.time > deadline {
        return Err(ContractError::DeadlineExpired {
            deadline: deadline.seconds(),
        });
    }
    if (is_owner && pool.owner_purchased) || (is_winner && pool.winner_purchased) {
        return Err(ContractError::AlreadyDone {
            operation: "this party's punk purchase".to_string(),
        });
    }

    let balance = pool_balance(&deps.querier, &env, &config.denom)?;
    if price > balance / Uint128::new(2) {
        return Err(ContractError::ExceedsCap {
            reason: format!(
                "price {} exceeds half of the pool balance {}",
                price, balance
            ),
        });
    }

    if is_owner {
        pool.owner_purchased = true;
    } else {
        pool.winner_purchased = true;
    }
    POOL.save(deps.storage, &pool)?;

    let buy_msg = WasmMsg::Execute {
        contract_addr: config.punks_market.to_string(),
        msg: to_json_binary(&MarketExecuteMsg::BuyPunk { punk_id })?,
        funds: coins(price.u128(), &config.denom),
    };

    let buyer_role = if is_owner { "owner" } else { "winner" };
    Ok(Response::new()
        .add_message(buy_msg)
        .add_attribute("action", "buy_punk")
        .add_attribute("buyer", info.sender.to_string())
        .add_attribute("punk_id", punk_id.to_string())
        .add_attribute("price", price.to_string())
        .add_event(
            Event::new("punk_raffle_punk_purchased")
                .add_attribute("buyer", info.sender.to_string())
                .add_attribute("role", buyer_role)
                .add_attribute("punk_id", punk_id.to_string())
                .add_attribute("price", price.to_string()),
        ))
}

/// Open the claims phase. The owner may abandon a pool that never reached its
/// target; after the draw, anyone may open claims once both punks are bought
/// or the purchase deadline has lapsed.
pub fn enter_claims_mode(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut pool = POOL.load(deps.storage)?;

    match pool.phase {
        Phase::Funding => {
            if info.sender != config.owner {
                return Err(ContractError::Unauthorized {
                    reason: "only the owner can abandon funding".to_string(),
                });
            }
        }
        Phase::Drawn => {
            let deadline = pool.purchase_deadline.ok_or(ContractError::NotFound {
                what: "purchase deadline".to_string(),
            })?;
            let both_purchased = pool.owner_purchased && pool.winner_purchased;
            if !both_purchased && env.block.time <= deadline {
                return Err(ContractError::DeadlineNotReached {
                    deadline: deadline.seconds(),
                });
            }
        }
        Phase::ClaimsOpen => {
            return Err(ContractError::AlreadyDone {
                operation: "entering claims mode".to_string(),
            });
        }
        Phase::Swept => {
            return Err(ContractError::InvalidPhase {
                phase: pool.phase.to_string(),
                expected: "funding or drawn".to_string(),
            });
        }
    }

    let balance = pool_balance(&deps.querier, &env, &config.denom)?;
    pool.post_punk_purchases_balance = balance;
    pool.claims_opened_at = Some(env.block.time);
    pool.phase = Phase::ClaimsOpen;
    POOL.save(deps.storage, &pool)?;

    Ok(Response::new()
        .add_attribute("action", "enter_claims_mode")
        .add_attribute("post_punk_purchases_balance", balance.to_string())
        .add_event(
            Event::new("punk_raffle_claims_opened")
                .add_attribute("post_punk_purchases_balance", balance.to_string())
                .add_attribute("opened_at", env.block.time.seconds().to_string()),
        ))
}

/// Pay out the caller's pro-rata share of the post-purchases balance.
pub fn claim(deps: DepsMut, _env: Env, info: MessageInfo) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let pool = POOL.load(deps.storage)?;

    if pool.phase != Phase::ClaimsOpen {
        return Err(ContractError::InvalidPhase {
            phase: pool.phase.to_string(),
            expected: "claims_open".to_string(),
        });
    }

    let mut participant =
        PARTICIPANTS
            .may_load(deps.storage, &info.sender)?
            .ok_or(ContractError::NotFound {
                what: format!("deposit for {}", info.sender),
            })?;
    if pool.winner.as_ref() == Some(&info.sender) {
        return Err(ContractError::Unauthorized {
            reason: "the winner cannot claim".to_string(),
        });
    }
    if participant.has_claimed {
        return Err(ContractError::AlreadyDone {
            operation: "claim".to_string(),
        });
    }

    let winner_deposited = match &pool.winner {
        Some(w) => PARTICIPANTS.load(deps.storage, w)?.total_deposited,
        None => Uint128::zero(),
    };
    let payout = compute_claim_amount(&pool, winner_deposited, participant.total_deposited);

    participant.has_claimed = true;
    PARTICIPANTS.save(deps.storage, &info.sender, &participant)?;

    let mut response = Response::new()
        .add_attribute("action", "claim")
        .add_attribute("claimant", info.sender.to_string())
        .add_attribute("amount", payout.to_string())
        .add_event(
            Event::new("punk_raffle_claim")
                .add_attribute("claimant", info.sender.to_string())
                .add_attribute("amount", payout.to_string()),
        );
    if !payout.is_zero() {
        response = response.add_message(BankMsg::Send {
            to_address: info.sender.to_string(),
            amount: coins(payout.u128(), &config.denom),
        });
    }
    Ok(response)
}

/// Sweep whatever balance remains to the owner once the claims cooldown has
/// lapsed. Permissionless; the phase check makes it one-shot.
pub fn sweep(deps: DepsMut, env: Env, _info: MessageInfo) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut pool = POOL.load(deps.storage)?;

    if pool.phase != Phase::ClaimsOpen {
        return Err(ContractError::InvalidPhase {
            phase: pool.phase.to_string(),
            expected: "claims_open".to_string(),
        });
    }
    let opened_at = pool.claims_opened_at.ok_or(ContractError::NotFound {
        what: "claims opening time".to_string(),
    })?;
    let unlock = opened_at.plus_seconds(config.sweep_cooldown_seconds);
    if env.block.time <= unlock {
        return Err(ContractError::DeadlineNotReached {
            deadline: unlock.seconds(),
        });
    }

    let balance = pool_balance(&deps.querier, &env, &config.denom)?;
    pool.phase = Phase::Swept;
    POOL.save(deps.storage, &pool)?;

    let mut response = Response::new()
        .add_attribute("action", "sweep")
        .add_attribute("amount", balance.to_string())
        .add_event(
            Event::new("punk_raffle_sweep")
                .add_attribute("recipient", config.owner.to_string())
                .add_attribute("amount", balance.to_string()),
        );
    if !balance.is_zero() {
        response = response.add_message(BankMsg::Send {
            to_address: config.owner.to_string(),
            amount: coins(balance.u128(), &config.denom),
        });
    }
    Ok(response)
}
