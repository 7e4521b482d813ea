pub type Result<T> = core::result::Result<T, Error>;

/// Ledger failures. The discriminant of each variant is its interface code
/// and is also the SCALE index the variant encodes to.
#[derive(scale::Encode, scale::Decode, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum Error {
    /// Caller is not the administrator.
    NotAuthorized = 100,
    /// Spendable balance is lower than the requested amount.
    InsufficientBalance = 101,
    /// Staked balance is lower than the requested amount.
    InsufficientStake = 102,
    /// Mint would push total supply past the cap.
    MaxSupplyReached = 103,
    Paused = 104,
    /// Target is the all-zero account.
    ZeroAddress = 105,
    /// Zero amount, release height not ahead of the chain, or missing vesting record.
    InvalidAmount = 106,
    AllowanceInsufficient = 107,
    /// Release height not reached yet.
    VestingLocked = 108,
    AlreadyVested = 111,
    Overflow = 112,
    /// More than `MAX_BATCH_SIZE` entries in a batch mint.
    BatchTooLarge = 113,
}

impl Error {
    /// Numeric interface code for callers that report failures by number
    /// rather than by the SCALE-encoded variant.
    pub fn code(&self) -> u32 {
        *self as u32
    }
}
