use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint128;

/// Direct referral bonus: 10% of the referee's deposit.
const REFERRER_BONUS_DIVISOR: u128 = 10;
/// Grand-referral bonus: 2% of the referee's deposit.
const GRAND_REFERRER_BONUS_DIVISOR: u128 = 50;

/// Snapshot of one upstream participant's bonus headroom. A participant can
/// never receive more bonus points than they have deposited themselves.
#[cw_serde]
pub struct CapRoom {
    pub total_deposited: Uint128,
    pub bonus_points_received: Uint128,
}

impl CapRoom {
    pub fn remaining(&self) -> Uint128 {
        self.total_deposited.saturating_sub(self.bonus_points_received)
    }
}

/// Points granted by a single deposit, split by recipient.
/// The sum of all three fields is the width of the deposit's entry interval.
#[cw_serde]
pub struct Accrual {
    pub depositor_points: Uint128,
    pub referrer_bonus: Uint128,
    pub grand_referrer_bonus: Uint128,
}

impl Accrual {
    pub fn total(&self) -> Uint128 {
        self.depositor_points + self.referrer_bonus + self.grand_referrer_bonus
    }
}

/// The points formula applied to every deposit, fixed at instantiation.
#[cw_serde]
pub enum AccrualStrategy {
    /// One point per unit deposited, no referral bonuses.
    Flat,
    /// Double points for referred depositors, 10% / 2% capped bonuses one and
    /// two hops up the referral graph.
    ReferralWeighted,
}

impl AccrualStrategy {
    /// Compute the points for a deposit of `amount`. `referrer` and
    /// `grand_referrer` carry the cap headroom of the one- and two-hop
    /// upstream participants, `None` when that hop does not exist. Bonuses
    /// use integer floor arithmetic and clamp to the recipient's remaining
    /// headroom; an exhausted cap yields zero, never an error.
    pub fn accrue(
        &self,
        amount: Uint128,
        referrer: Option<&CapRoom>,
        grand_referrer: Option<&CapRoom>,
    ) -> Accrual {
        match self {
            AccrualStrategy::Flat => Accrual {
                depositor_points: amount,
                referrer_bonus: Uint128::zero(),
                grand_referrer_bonus: Uint128::zero(),
            },
            AccrualStrategy::ReferralWeighted => {
                let depositor_points = if referrer.is_some() {
                    amount + amount
                } else {
                    amount
                };

                let referrer_bonus = referrer
                    .map(|cap| {
                        let raw = amount / Uint128::new(REFERRER_BONUS_DIVISOR);
                        raw.min(cap.remaining())
                    })
                    .unwrap_or_default();

                let grand_referrer_bonus = grand_referrer
                    .map(|cap| {
                        let raw = amount / Uint128::new(GRAND_REFERRER_BONUS_DIVISOR);
                        raw.min(cap.remaining())
                    })
                    .unwrap_or_default();

                Accrual {
                    depositor_points,
                    referrer_bonus,
                    grand_referrer_bonus,
                }
            }
        }
    }
}
