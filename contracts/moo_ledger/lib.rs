#![cfg_attr(not(feature = "std"), no_std, no_main)]

mod errors;
mod guards;
mod supply;

pub use errors::Error;
pub use supply::MAX_BATCH_SIZE;

#[ink::contract]
mod moo_ledger {
    use ink::prelude::string::String;
    use ink::prelude::vec::Vec;
    use ink::storage::Mapping;

    use crate::errors::{Error, Result};
    use crate::{guards, supply};

    /// 1e9 whole tokens at 6 decimals.
    pub const DEFAULT_MAX_SUPPLY: Balance = 1_000_000_000_000_000;

    pub const STORAGE_VERSION: u32 = 1;

    #[ink(event)]
    pub struct Transferred {
        #[ink(topic)]
        from_acc: AccountId,
        #[ink(topic)]
        to_acc: AccountId,
        amount_val: Balance,
        memo: Option<Vec<u8>>,
    }

    #[ink(event)]
    pub struct Minted {
        #[ink(topic)]
        to_acc: AccountId,
        amount_val: Balance,
    }

    #[ink(event)]
    pub struct BatchMinted {
        entry_count: u32,
        total_val: Balance,
    }

    #[ink(event)]
    pub struct Burned {
        #[ink(topic)]
        from_acc: AccountId,
        amount_val: Balance,
    }

    /// Carries the allowance after the change, for approve and both relative updates.
    #[ink(event)]
    pub struct Approved {
        #[ink(topic)]
        owner_acc: AccountId,
        #[ink(topic)]
        spender_acc: AccountId,
        amount_val: Balance,
    }

    #[ink(event)]
    pub struct Staked {
        #[ink(topic)]
        staker_acc: AccountId,
        amount_val: Balance,
    }

    #[ink(event)]
    pub struct Unstaked {
        #[ink(topic)]
        staker_acc: AccountId,
        amount_val: Balance,
    }

    #[ink(event)]
    pub struct VestingSet {
        #[ink(topic)]
        recipient_acc: AccountId,
        amount_val: Balance,
        release_height: BlockNumber,
    }

    #[ink(event)]
    pub struct VestingClaimed {
        #[ink(topic)]
        recipient_acc: AccountId,
        amount_val: Balance,
        release_height: BlockNumber,
    }

    #[ink(event)]
    pub struct PausedSet {
        paused_flag: bool,
    }

    #[ink(event)]
    pub struct AdminTransferred {
        #[ink(topic)]
        previous_acc: AccountId,
        #[ink(topic)]
        new_acc: AccountId,
    }

    #[ink(event)]
    pub struct MetadataUpdated {
        name: String,
        symbol: String,
        token_uri: Option<String>,
    }

    #[ink(storage)]
    pub struct MooLedger {
        // governance / control
        admin_acc: AccountId,
        paused_flag: bool,

        // metadata
        name: String,
        symbol: String,
        decimals: u8,
        token_uri: Option<String>,

        // supply
        max_supply: Balance,
        total_supply: Balance,
        total_staked: Balance,

        // ledger
        balances: Mapping<AccountId, Balance>,
        staked: Mapping<AccountId, Balance>,
        allowances: Mapping<(AccountId, AccountId), Balance>,
        /// (beneficiary, release height) -> amount issued at that height
        vesting: Mapping<(AccountId, BlockNumber), Balance>,

        // versioning (future migrations)
        storage_ver_u32: u32,
    }

    impl MooLedger {
        // -------- constructors --------

        /// The deployer becomes the administrator.
        #[ink(constructor)]
        pub fn new(
            name: String,
            symbol: String,
            decimals: u8,
            token_uri: Option<String>,
            max_supply: Balance,
        ) -> Self {
            Self {
                admin_acc: Self::env().caller(),
                paused_flag: false,
                name,
                symbol,
                decimals,
                token_uri,
                max_supply,
                total_supply: 0,
                total_staked: 0,
                balances: Mapping::default(),
                staked: Mapping::default(),
                allowances: Mapping::default(),
                vesting: Mapping::default(),
                storage_ver_u32: STORAGE_VERSION,
            }
        }

        #[ink(constructor)]
        pub fn new_default() -> Self {
            Self::new(
                String::from("Moo Ledger"),
                String::from("MOOL"),
                6,
                None,
                DEFAULT_MAX_SUPPLY,
            )
        }

        // -------- modifiers (helpers) --------

        fn only_admin(&self) -> Result<AccountId> {
            let caller_acc = self.env().caller();
            guards::only_admin(&caller_acc, &self.admin_acc)?;
            Ok(caller_acc)
        }

        fn when_not_paused(&self) -> Result<()> {
            guards::when_not_paused(self.paused_flag)
        }

        // -------- admin --------

        #[ink(message)]
        pub fn transfer_admin(&mut self, new_acc: AccountId) -> Result<()> {
            let previous_acc = self.only_admin()?;
            guards::valid_account(&new_acc)?;
            self.admin_acc = new_acc;
            self.env().emit_event(AdminTransferred { previous_acc, new_acc });
            Ok(())
        }

        /// Not gated by the pause flag, otherwise the ledger could never be unpaused.
        #[ink(message)]
        pub fn set_paused(&mut self, paused_flag: bool) -> Result<bool> {
            self.only_admin()?;
            self.paused_flag = paused_flag;
            self.env().emit_event(PausedSet { paused_flag });
            Ok(paused_flag)
        }

        #[ink(message)]
        pub fn update_metadata(
            &mut self,
            name: String,
            symbol: String,
            token_uri: Option<String>,
        ) -> Result<()> {
            self.only_admin()?;
            self.name = name.clone();
            self.symbol = symbol.clone();
            self.token_uri = token_uri.clone();
            self.env().emit_event(MetadataUpdated { name, symbol, token_uri });
            Ok(())
        }

        // -------- supply --------

        /// Admin issuance. Allowed while paused.
        #[ink(message)]
        pub fn mint(&mut self, to_acc: AccountId, amount_val: Balance) -> Result<()> {
            self.only_admin()?;
            self.mint_internal(to_acc, amount_val)
        }

        /// Mints every entry in order and returns the total issued.
        ///
        /// The whole batch is validated against a running supply before the
        /// first balance is written, so a failing entry leaves no trace of the
        /// entries before it.
        #[ink(message)]
        pub fn batch_mint(&mut self, entries: Vec<(AccountId, Balance)>) -> Result<Balance> {
            supply::check_batch_len(entries.len())?;
            self.only_admin()?;
            let total_val = supply::plan_batch(&entries, self.total_supply, self.max_supply)?;
            for &(to_acc, amount_val) in entries.iter() {
                self.mint_internal(to_acc, amount_val)?;
            }
            self.env().emit_event(BatchMinted {
                entry_count: entries.len() as u32,
                total_val,
            });
            Ok(total_val)
        }

        #[ink(message)]
        pub fn burn(&mut self, amount_val: Balance) -> Result<()> {
            self.when_not_paused()?;
            guards::positive(amount_val)?;
            let from_acc = self.env().caller();
            let new_from = self
                .balance_of(from_acc)
                .checked_sub(amount_val)
                .ok_or(Error::InsufficientBalance)?;
            let new_total = self
                .total_supply
                .checked_sub(amount_val)
                .ok_or(Error::Overflow)?;
            self.balances.insert(&from_acc, &new_from);
            self.total_supply = new_total;
            self.env().emit_event(Burned { from_acc, amount_val });
            Ok(())
        }

        // -------- transfer & delegation --------

        /// `memo` is carried in the `Transferred` event and nowhere else.
        #[ink(message)]
        pub fn transfer(
            &mut self,
            to_acc: AccountId,
            amount_val: Balance,
            memo: Option<Vec<u8>>,
        ) -> Result<()> {
            self.when_not_paused()?;
            guards::valid_account(&to_acc)?;
            guards::positive(amount_val)?;
            let from_acc = self.env().caller();
            self.move_balance(from_acc, to_acc, amount_val, memo)
        }

        /// Absolute overwrite, zero included.
        #[ink(message)]
        pub fn approve(&mut self, spender_acc: AccountId, amount_val: Balance) -> Result<()> {
            self.when_not_paused()?;
            guards::valid_account(&spender_acc)?;
            let owner_acc = self.env().caller();
            self.set_allowance(owner_acc, spender_acc, amount_val);
            Ok(())
        }

        #[ink(message)]
        pub fn increase_allowance(&mut self, spender_acc: AccountId, add_val: Balance) -> Result<()> {
            self.when_not_paused()?;
            guards::valid_account(&spender_acc)?;
            let owner_acc = self.env().caller();
            let new_val = self
                .allowance(owner_acc, spender_acc)
                .checked_add(add_val)
                .ok_or(Error::Overflow)?;
            self.set_allowance(owner_acc, spender_acc, new_val);
            Ok(())
        }

        #[ink(message)]
        pub fn decrease_allowance(&mut self, spender_acc: AccountId, sub_val: Balance) -> Result<()> {
            self.when_not_paused()?;
            guards::valid_account(&spender_acc)?;
            let owner_acc = self.env().caller();
            let new_val = self
                .allowance(owner_acc, spender_acc)
                .checked_sub(sub_val)
                .ok_or(Error::AllowanceInsufficient)?;
            self.set_allowance(owner_acc, spender_acc, new_val);
            Ok(())
        }

        /// Moves `amount_val` out of `from_acc` on the caller's allowance.
        #[ink(message)]
        pub fn transfer_from(
            &mut self,
            from_acc: AccountId,
            to_acc: AccountId,
            amount_val: Balance,
        ) -> Result<()> {
            self.when_not_paused()?;
            guards::valid_account(&to_acc)?;
            guards::positive(amount_val)?;

            let spender_acc = self.env().caller();
            let new_allow = self
                .allowance(from_acc, spender_acc)
                .checked_sub(amount_val)
                .ok_or(Error::AllowanceInsufficient)?;
            // Precheck balance so a failure can't consume allowance
            if self.balance_of(from_acc) < amount_val {
                return Err(Error::InsufficientBalance)
            }

            self.allowances.insert(&(from_acc, spender_acc), &new_allow);
            self.move_balance(from_acc, to_acc, amount_val, None)
        }

        // -------- staking --------

        #[ink(message)]
        pub fn stake(&mut self, amount_val: Balance) -> Result<()> {
            self.when_not_paused()?;
            guards::positive(amount_val)?;
            let staker_acc = self.env().caller();
            let new_bal = self
                .balance_of(staker_acc)
                .checked_sub(amount_val)
                .ok_or(Error::InsufficientBalance)?;

            // staked amounts are carved out of supply, no overflow possible
            let new_stake = self.staked_balance_of(staker_acc).saturating_add(amount_val);
            self.balances.insert(&staker_acc, &new_bal);
            self.staked.insert(&staker_acc, &new_stake);
            self.total_staked = self.total_staked.saturating_add(amount_val);
            self.env().emit_event(Staked { staker_acc, amount_val });
            Ok(())
        }

        #[ink(message)]
        pub fn unstake(&mut self, amount_val: Balance) -> Result<()> {
            self.when_not_paused()?;
            guards::positive(amount_val)?;
            let staker_acc = self.env().caller();
            let new_stake = self
                .staked_balance_of(staker_acc)
                .checked_sub(amount_val)
                .ok_or(Error::InsufficientStake)?;

            let new_bal = self.balance_of(staker_acc).saturating_add(amount_val);
            self.staked.insert(&staker_acc, &new_stake);
            self.balances.insert(&staker_acc, &new_bal);
            self.total_staked = self.total_staked.saturating_sub(amount_val);
            self.env().emit_event(Unstaked { staker_acc, amount_val });
            Ok(())
        }

        // -------- vesting --------

        /// Mints `amount_val` to `to_acc` right away and records a claim
        /// receipt keyed by `(to_acc, release_height)`.
        ///
        /// The minted tokens are spendable immediately; the receipt does not
        /// lock them.
        #[ink(message)]
        pub fn set_vesting(
            &mut self,
            to_acc: AccountId,
            amount_val: Balance,
            release_height: BlockNumber,
        ) -> Result<()> {
            self.only_admin()?;
            guards::valid_account(&to_acc)?;
            guards::positive(amount_val)?;
            if release_height <= self.env().block_number() {
                return Err(Error::InvalidAmount)
            }
            if self.vesting.contains(&(to_acc, release_height)) {
                return Err(Error::AlreadyVested)
            }

            self.mint_internal(to_acc, amount_val)?;
            self.vesting.insert(&(to_acc, release_height), &amount_val);
            self.env().emit_event(VestingSet {
                recipient_acc: to_acc,
                amount_val,
                release_height,
            });
            Ok(())
        }

        /// Retires the caller's receipt at `release_height` and reports its
        /// amount. No balance moves: it was credited at issuance.
        #[ink(message)]
        pub fn claim_vesting(&mut self, release_height: BlockNumber) -> Result<Balance> {
            self.when_not_paused()?;
            let recipient_acc = self.env().caller();
            let amount_val = self.vesting_amount(recipient_acc, release_height);
            if amount_val == 0 {
                return Err(Error::InvalidAmount)
            }
            if self.env().block_number() < release_height {
                return Err(Error::VestingLocked)
            }

            self.vesting.remove(&(recipient_acc, release_height));
            self.env().emit_event(VestingClaimed {
                recipient_acc,
                amount_val,
                release_height,
            });
            Ok(amount_val)
        }

        // -------- read API --------

        #[ink(message)]
        pub fn balance_of(&self, owner_acc: AccountId) -> Balance {
            self.balances.get(&owner_acc).unwrap_or(0)
        }

        #[ink(message)]
        pub fn my_balance(&self) -> Balance {
            let caller_acc = self.env().caller();
            self.balance_of(caller_acc)
        }

        #[ink(message)]
        pub fn staked_balance_of(&self, owner_acc: AccountId) -> Balance {
            self.staked.get(&owner_acc).unwrap_or(0)
        }

        #[ink(message)]
        pub fn allowance(&self, owner_acc: AccountId, spender_acc: AccountId) -> Balance {
            self.allowances.get(&(owner_acc, spender_acc)).unwrap_or(0)
        }

        #[ink(message)]
        pub fn vesting_amount(&self, owner_acc: AccountId, release_height: BlockNumber) -> Balance {
            self.vesting.get(&(owner_acc, release_height)).unwrap_or(0)
        }

        #[ink(message)]
        pub fn total_supply(&self) -> Balance {
            self.total_supply
        }

        #[ink(message)]
        pub fn max_supply(&self) -> Balance {
            self.max_supply
        }

        #[ink(message)]
        pub fn total_staked(&self) -> Balance {
            self.total_staked
        }

        #[ink(message)]
        pub fn name(&self) -> String {
            self.name.clone()
        }

        #[ink(message)]
        pub fn symbol(&self) -> String {
            self.symbol.clone()
        }

        #[ink(message)]
        pub fn decimals(&self) -> u8 {
            self.decimals
        }

        #[ink(message)]
        pub fn token_uri(&self) -> Option<String> {
            self.token_uri.clone()
        }

        #[ink(message)]
        pub fn admin(&self) -> AccountId {
            self.admin_acc
        }

        #[ink(message)]
        pub fn is_paused(&self) -> bool {
            self.paused_flag
        }

        #[ink(message)]
        pub fn block_height(&self) -> BlockNumber {
            self.env().block_number()
        }

        #[ink(message)]
        pub fn storage_version(&self) -> u32 {
            self.storage_ver_u32
        }

        // ---- internals ----

        fn mint_internal(&mut self, to_acc: AccountId, amount_val: Balance) -> Result<()> {
            let new_total =
                supply::checked_issue(self.total_supply, &to_acc, amount_val, self.max_supply)?;
            // balances never exceed total supply, which was just bounds-checked
            let new_to = self.balance_of(to_acc).saturating_add(amount_val);
            self.balances.insert(&to_acc, &new_to);
            self.total_supply = new_total;

            self.env().emit_event(Minted { to_acc, amount_val });
            Ok(())
        }

        fn move_balance(
            &mut self,
            from_acc: AccountId,
            to_acc: AccountId,
            amount_val: Balance,
            memo: Option<Vec<u8>>,
        ) -> Result<()> {
            let new_from = self
                .balance_of(from_acc)
                .checked_sub(amount_val)
                .ok_or(Error::InsufficientBalance)?;
            self.balances.insert(&from_acc, &new_from);

            // read after the debit so a self-transfer nets to zero
            let new_to = self.balance_of(to_acc).saturating_add(amount_val);
            self.balances.insert(&to_acc, &new_to);

            self.env().emit_event(Transferred { from_acc, to_acc, amount_val, memo });
            Ok(())
        }

        fn set_allowance(&mut self, owner_acc: AccountId, spender_acc: AccountId, amount_val: Balance) {
            self.allowances.insert(&(owner_acc, spender_acc), &amount_val);
            self.env().emit_event(Approved { owner_acc, spender_acc, amount_val });
        }
    }


    #[cfg(all(test, feature = "e2e-tests"))]
    mod e2e_tests {
        use super::*;
        use ink_e2e::ContractsBackend;

        type E2EResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

        #[ink_e2e::test]
        async fn mint_and_transfer_on_chain<Client: E2EBackend>(mut client: Client) -> E2EResult<()> {
            let mut constructor = MooLedgerRef::new_default();
            let contract = client
                .instantiate("moo_ledger", &ink_e2e::alice(), &mut constructor)
                .submit()
                .await
                .expect("instantiate failed");
            let mut call_builder = contract.call_builder::<MooLedger>();

            let bob_acc = ink_e2e::account_id(ink_e2e::AccountKeyring::Bob);
            let charlie_acc = ink_e2e::account_id(ink_e2e::AccountKeyring::Charlie);

            let mint = call_builder.mint(bob_acc, 100);
            client
                .call(&ink_e2e::alice(), &mint)
                .submit()
                .await
                .expect("mint failed");

            let transfer = call_builder.transfer(charlie_acc, 40, None);
            client
                .call(&ink_e2e::bob(), &transfer)
                .submit()
                .await
                .expect("transfer failed");

            let balance = call_builder.balance_of(charlie_acc);
            let balance_res = client.call(&ink_e2e::alice(), &balance).dry_run().await?;
            assert_eq!(balance_res.return_value(), 40);
            Ok(())
        }

        #[ink_e2e::test]
        async fn failed_batch_mint_is_rejected<Client: E2EBackend>(mut client: Client) -> E2EResult<()> {
            let mut constructor = MooLedgerRef::new_default();
            let contract = client
                .instantiate("moo_ledger", &ink_e2e::alice(), &mut constructor)
                .submit()
                .await
                .expect("instantiate failed");
            let mut call_builder = contract.call_builder::<MooLedger>();

            let bob_acc = ink_e2e::account_id(ink_e2e::AccountKeyring::Bob);
            let batch = call_builder.batch_mint(vec![
                (bob_acc, 100),
                (AccountId::from(guards::NULL_ACCOUNT), 5),
            ]);
            let batch_res = client.call(&ink_e2e::alice(), &batch).dry_run().await?;
            assert_eq!(batch_res.return_value(), Err(Error::ZeroAddress));
            // submit stops at the reverted dry run, so no extrinsic lands
            assert!(client.call(&ink_e2e::alice(), &batch).submit().await.is_err());

            let balance = call_builder.balance_of(bob_acc);
            let balance_res = client.call(&ink_e2e::alice(), &balance).dry_run().await?;
            assert_eq!(balance_res.return_value(), 0);

            let supply = call_builder.total_supply();
            let supply_res = client.call(&ink_e2e::alice(), &supply).dry_run().await?;
            assert_eq!(supply_res.return_value(), 0);
            Ok(())
        }
    }
}
