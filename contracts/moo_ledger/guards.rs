//! Stateless preconditions consulted before any storage write.

use ink::primitives::AccountId;

use crate::errors::{Error, Result};

/// Burn/null sentinel: never a valid recipient, spender or admin.
pub const NULL_ACCOUNT: [u8; 32] = [0u8; 32];

pub fn only_admin(caller_acc: &AccountId, admin_acc: &AccountId) -> Result<()> {
    if caller_acc != admin_acc {
        return Err(Error::NotAuthorized)
    }
    Ok(())
}

pub fn when_not_paused(paused_flag: bool) -> Result<()> {
    if paused_flag {
        return Err(Error::Paused)
    }
    Ok(())
}

pub fn valid_account(acc: &AccountId) -> Result<()> {
    if *acc == AccountId::from(NULL_ACCOUNT) {
        return Err(Error::ZeroAddress)
    }
    Ok(())
}

pub fn positive(amount_val: u128) -> Result<()> {
    if amount_val == 0 {
        return Err(Error::InvalidAmount)
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acc(byte: u8) -> AccountId {
        AccountId::from([byte; 32])
    }

    #[test]
    fn admin_check_compares_identity() {
        assert_eq!(only_admin(&acc(1), &acc(1)), Ok(()));
        assert_eq!(only_admin(&acc(2), &acc(1)), Err(Error::NotAuthorized));
    }

    #[test]
    fn pause_flag_blocks() {
        assert_eq!(when_not_paused(false), Ok(()));
        assert_eq!(when_not_paused(true), Err(Error::Paused));
    }

    #[test]
    fn null_account_rejected() {
        assert_eq!(valid_account(&AccountId::from(NULL_ACCOUNT)), Err(Error::ZeroAddress));
        assert_eq!(valid_account(&acc(7)), Ok(()));
    }

    #[test]
    fn zero_amount_rejected() {
        assert_eq!(positive(0), Err(Error::InvalidAmount));
        assert_eq!(positive(1), Ok(()));
    }
}
