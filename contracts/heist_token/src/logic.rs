//! Pure arithmetic behind the ledger: odds tiers, payout shares, levies and
//! premiums. Nothing in here touches the environment.

use crate::constants::*;

pub fn bribe_bonus(bribe: u128) -> u8 {
    BRIBE_TIERS
        .iter()
        .find(|(threshold, _)| bribe >= *threshold)
        .map(|(_, bonus)| *bonus)
        .unwrap_or(0)
}

/// Saturates at `MAX_ODDS`.
pub fn heist_odds(conspirators: usize, bribe: u128) -> u8 {
    let crew = (conspirators as u64).saturating_mul(CONSPIRATOR_ODDS as u64);
    let raw = (BASE_ODDS as u64)
        .saturating_add(crew)
        .saturating_add(bribe_bonus(bribe) as u64);
    raw.min(MAX_ODDS as u64) as u8
}

/// `⌊amount × numerator / denominator⌋` split into quotient and remainder so
/// the product never leaves `u128`. Requires `numerator <= denominator`.
fn portion(amount: u128, numerator: u128, denominator: u128) -> u128 {
    let whole = amount / denominator;
    let rest = amount % denominator;
    whole * numerator + rest * numerator / denominator
}

pub fn tax_levy(balance: u128, rate_bps: u128) -> u128 {
    portion(balance, rate_bps.min(BPS), BPS)
}

pub fn share_of(amount: u128, percent: u128) -> u128 {
    portion(amount, percent.min(100), 100)
}

/// Robbery proceeds: `percent`% of the victim's balance, at least one minor
/// unit and never more than the balance itself.
pub fn take_amount(balance: u128, percent: u128) -> u128 {
    share_of(balance, percent).max(1).min(balance)
}

pub fn scale_tokens(whole: u128) -> Option<u128> {
    whole.checked_mul(SCALING_FACTOR)
}

pub fn premium(days: u8, daily_cost: u128) -> Option<u128> {
    daily_cost.checked_mul(days as u128)
}

/// Milliseconds.
pub fn policy_duration(days: u8) -> u64 {
    DAY.saturating_mul(days as u64)
}

pub fn window_elapsed(start: u64, now: u64, length: u64) -> bool {
    now.saturating_sub(start) >= length
}
