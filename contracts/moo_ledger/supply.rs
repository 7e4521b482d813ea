//! Issuance arithmetic. Everything here is computed against a supply value
//! and never touches storage, so a caller can validate a whole batch before
//! writing the first balance.

use ink::primitives::AccountId;

use crate::errors::{Error, Result};
use crate::guards;

/// Upper bound on `batch_mint` entries.
pub const MAX_BATCH_SIZE: usize = 50;

pub fn check_batch_len(entry_count: usize) -> Result<()> {
    if entry_count > MAX_BATCH_SIZE {
        return Err(Error::BatchTooLarge)
    }
    Ok(())
}

/// Supply after issuing `amount_val` to `to_acc`, or the reason it can't be issued.
pub fn checked_issue(
    supply_val: u128,
    to_acc: &AccountId,
    amount_val: u128,
    max_supply: u128,
) -> Result<u128> {
    guards::valid_account(to_acc)?;
    guards::positive(amount_val)?;
    let new_supply = supply_val
        .checked_add(amount_val)
        .ok_or(Error::MaxSupplyReached)?;
    if new_supply > max_supply {
        return Err(Error::MaxSupplyReached)
    }
    Ok(new_supply)
}

/// Runs every entry through `checked_issue` in order against a running
/// supply and returns the batch total. The first failing entry's error is
/// returned as-is. Length is the caller's concern (`check_batch_len`).
pub fn plan_batch(
    entries: &[(AccountId, u128)],
    supply_val: u128,
    max_supply: u128,
) -> Result<u128> {
    let final_supply = entries.iter().try_fold(supply_val, |running, (to_acc, amount_val)| {
        checked_issue(running, to_acc, *amount_val, max_supply)
    })?;
    Ok(final_supply - supply_val)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guards::NULL_ACCOUNT;

    fn acc(byte: u8) -> AccountId {
        AccountId::from([byte; 32])
    }

    #[test]
    fn issue_respects_cap() {
        assert_eq!(checked_issue(90, &acc(1), 10, 100), Ok(100));
        assert_eq!(checked_issue(90, &acc(1), 11, 100), Err(Error::MaxSupplyReached));
        assert_eq!(checked_issue(u128::MAX, &acc(1), 1, u128::MAX), Err(Error::MaxSupplyReached));
    }

    #[test]
    fn issue_checks_recipient_before_amount() {
        let null_acc = AccountId::from(NULL_ACCOUNT);
        assert_eq!(checked_issue(0, &null_acc, 0, 100), Err(Error::ZeroAddress));
        assert_eq!(checked_issue(0, &acc(1), 0, 100), Err(Error::InvalidAmount));
    }

    #[test]
    fn batch_total_accumulates() {
        let entries = [(acc(1), 10), (acc(2), 20), (acc(1), 5)];
        assert_eq!(plan_batch(&entries, 50, 1_000), Ok(35));
        assert_eq!(plan_batch(&[], 50, 1_000), Ok(0));
    }

    #[test]
    fn batch_cap_is_cumulative() {
        // each entry fits on its own, the third pushes the running supply over
        let entries = [(acc(1), 40), (acc(2), 40), (acc(3), 40)];
        assert_eq!(plan_batch(&entries, 0, 100), Err(Error::MaxSupplyReached));
    }

    #[test]
    fn batch_reports_first_failing_entry() {
        let entries = [(acc(1), 10), (acc(2), 0), (AccountId::from(NULL_ACCOUNT), 10)];
        assert_eq!(plan_batch(&entries, 0, 1_000), Err(Error::InvalidAmount));
    }

    #[test]
    fn batch_length_bounded() {
        assert_eq!(check_batch_len(MAX_BATCH_SIZE + 1), Err(Error::BatchTooLarge));
        assert_eq!(check_batch_len(MAX_BATCH_SIZE), Ok(()));
        assert_eq!(check_batch_len(0), Ok(()));
    }
}
