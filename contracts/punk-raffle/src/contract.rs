use cosmwasm_std::{
    entry_point, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult, Uint128,
};
use cw2::set_contract_version;
use punk_raffle_common::Phase;

use crate::error::ContractError;
use crate::execute;
use crate::msg::{ExecuteMsg, InstantiateMsg, QueryMsg};
use crate::query;
use crate::state::{Config, PoolState, CONFIG, POOL};

const CONTRACT_NAME: &str = "crates.io:punk-raffle";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let config = Config {
        owner: info.sender.clone(),
        denom: msg.denom,
        randomness_oracle: deps.api.addr_validate(&msg.randomness_oracle)?,
        punks_market: deps.api.addr_validate(&msg.punks_market)?,
        min_deposit: msg.min_deposit,
        purchase_window_seconds: msg.purchase_window_seconds,
        sweep_cooldown_seconds: msg.sweep_cooldown_seconds,
        draw_round_offset: msg.draw_round_offset,
        accrual_strategy: msg.accrual_strategy,
    };
    CONFIG.save(deps.storage, &config)?;

    let pool = PoolState {
        target_balance: msg.target_balance,
        total_deposited: Uint128::zero(),
        total_points: Uint128::zero(),
        num_entries: 0,
        phase: Phase::Funding,
        draw_round: None,
        winner: None,
        purchase_deadline: None,
        owner_purchased: false,
        winner_purchased: false,
        post_punk_purchases_balance: Uint128::zero(),
        claims_opened_at: None,
    };
    POOL.save(deps.storage, &pool)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "punk-raffle")
        .add_attribute("owner", info.sender.to_string())
        .add_attribute("target_balance", msg.target_balance.to_string()))
}

#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Deposit { referrer } => execute::deposit(deps, env, info, referrer),
        ExecuteMsg::SetTargetBalance { target } => {
            execute::set_target_balance(deps, env, info, target)
        }
        ExecuteMsg::SetPunksMarket { market } => {
            execute::set_punks_market(deps, env, info, market)
        }
        ExecuteMsg::CommitDraw {} => execute::commit_draw(deps, env, info),
        ExecuteMsg::SelectWinner {} => execute::select_winner(deps, env, info),
        ExecuteMsg::BuyPunk { punk_id, price } => execute::buy_punk(deps, env, info, punk_id, price),
        ExecuteMsg::EnterClaimsMode {} => execute::enter_claims_mode(deps, env, info),
        ExecuteMsg::Claim {} => execute::claim(deps, env, info),
        ExecuteMsg::Sweep {} => execute::sweep(deps, env, info),
    }
}

#[entry_point]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::Pool {} => query::query_pool(deps),
        QueryMsg::Participant { address } => query::query_participant(deps, address),
        QueryMsg::AmountDeposited { address } => query::query_amount_deposited(deps, address),
        QueryMsg::Points { address } => query::query_points(deps, address),
        QueryMsg::NumEntries {} => query::query_num_entries(deps),
        QueryMsg::Entries { start_after, limit } => query::query_entries(deps, start_after, limit),
        QueryMsg::ClaimAmount { address } => query::query_claim_amount(deps, address),
    }
}
