#![cfg_attr(not(feature = "std"), no_std, no_main)]

//! # Heist Token
//!
//! **Role:** One shared ledger carrying a transferable token, a rate-limited
//! faucet, a micro-insurance book and a multi-party "heist" game that can
//! seize balances from a hidden target.
//!
//! ```text
//!   ┌──────────── balances (single Mapping) ────────────┐
//!   │                                                   │
//!   Ledger ◄── tax / mint        Faucet ── claim_tokens ─┤
//!   │                                                   │
//!   InsuranceBook ── premiums ──► insurance_fund ──┐     │
//!   │                                  payout ◄────┘     │
//!   HeistEngine ── rob_target ──► escrow ── claims ──────┘
//! ```
//!
//! Every message validates all of its preconditions before the first
//! storage write, so a rejected call never leaves partial state behind.
//!
//! **Units:** token amounts are minor units with 18 decimals, native value
//! (bribes, mint fees) is the chain's native balance, and every window is in
//! milliseconds because that is what `block_timestamp` returns.

pub mod constants {
    pub const SCALING_FACTOR: u128 = 1_000_000_000_000_000_000u128;
    pub const DECIMALS: u8 = 18;
    pub const TOKEN_NAME: &str = "Heist Token";
    pub const TOKEN_SYMBOL: &str = "HEIST";

    /// One whole unit of the native currency (18 decimals).
    pub const ONE_NATIVE: u128 = 1_000_000_000_000_000_000u128;

    /// Flat native fee a non-owner attaches to `mint` (0.01 native).
    pub const MINT_PRICE: u128 = ONE_NATIVE / 100;

    // ── Time (milliseconds) ───────────────────────────────────────────────
    pub const DAY: u64 = 86_400_000;
    pub const RECRUITMENT_WINDOW: u64 = DAY;
    pub const INITIATION_WINDOW: u64 = 43_200_000; // 12 hours

    // ── Taxation ──────────────────────────────────────────────────────────
    pub const BPS: u128 = 10_000;
    pub const MAX_TAX_BPS: u128 = 1_000; // 10%

    // ── Faucet ────────────────────────────────────────────────────────────
    pub const FAUCET_MIN_TOKENS: u64 = 1;
    pub const FAUCET_MAX_TOKENS: u64 = 100;

    // ── Insurance ─────────────────────────────────────────────────────────
    pub const DEFAULT_INSURANCE_COST: u128 = 100;
    pub const INSURANCE_MULTIPLIER: u128 = SCALING_FACTOR;
    pub const MAX_POLICY_DAYS: u8 = 7;
    pub const FREE_TRIAL_DAYS: u8 = 1;

    // ── Heists ────────────────────────────────────────────────────────────
    pub const MAX_CONSPIRATORS: usize = 10;
    pub const BASE_ODDS: u8 = 40;
    pub const CONSPIRATOR_ODDS: u8 = 11;
    pub const MAX_ODDS: u8 = 100;

    /// `(minimum bribe, bonus points)`, highest tier first. Only the first
    /// matching tier applies.
    pub const BRIBE_TIERS: [(u128, u8); 4] = [
        (ONE_NATIVE, 40),
        (ONE_NATIVE / 10, 30),  // 100 finney
        (ONE_NATIVE / 100, 20), // 10 finney
        (ONE_NATIVE / 1_000, 10), // 1 finney
    ];

    pub const INSTIGATOR_SHARE_PERCENT: u128 = 70;
    pub const CONSPIRATOR_SHARE_PERCENT: u128 = 3;

    /// Bounds of the drawn share of the victim's balance a successful
    /// robbery takes.
    pub const HEIST_MIN_TAKE_PERCENT: u64 = 10;
    pub const HEIST_MAX_TAKE_PERCENT: u64 = 50;
}

pub mod entropy;
pub mod logic;

#[ink::contract]
pub mod heist_token {
    use crate::constants::*;
    use crate::entropy::EntropyPool;
    use crate::logic;
    use ink::prelude::string::String;
    use ink::prelude::vec::Vec;
    use ink::storage::Mapping;

    // =========================================================================
    // RECORDS
    // =========================================================================

    #[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
    #[cfg_attr(
        feature = "std",
        derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
    )]
    pub enum HeistStatus {
        /// Recruiting, or waiting for the instigator to strike.
        Open,
        /// Proceeds are in escrow and claimable.
        Succeeded,
        /// Terminal. The commitment can never be used again.
        Failed,
    }

    #[derive(Debug, Clone, PartialEq, Eq, scale::Encode, scale::Decode)]
    #[cfg_attr(
        feature = "std",
        derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
    )]
    pub struct Heist {
        pub instigator: AccountId,
        pub created_at: Timestamp,
        /// End of recruitment; the robbery window opens here.
        pub deadline: Timestamp,
        /// Native value attached by anyone involved.
        pub bribe: Balance,
        /// Proceeds captured on success. Written once.
        pub amount: Balance,
        /// Part of `amount` not yet claimed.
        pub remaining: Balance,
        pub conspirators: Vec<AccountId>,
        pub status: HeistStatus,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, scale::Encode, scale::Decode)]
    #[cfg_attr(
        feature = "std",
        derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
    )]
    pub struct InsurancePolicy {
        /// Daily premium basis at the time the policy was written.
        pub cost: Balance,
        pub expiry: Timestamp,
        /// Premium paid and not yet reimbursed. Zero for the free trial.
        pub coverage: Balance,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum PolicyKind {
        FreeTrial,
        Purchased,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum FailureReason {
        /// The target had nothing to take.
        Balance,
        /// The roll came in above the odds.
        Odds,
    }

    // =========================================================================
    // STORAGE
    // =========================================================================

    #[ink(storage)]
    pub struct HeistToken {
        owner: AccountId,

        // ── Ledger ────────────────────────────────────────────────────────
        total_supply: Balance,
        balances: Mapping<AccountId, Balance>,
        allowances: Mapping<(AccountId, AccountId), Balance>,
        /// Accounts with a nonzero balance. Taxation walks this list.
        holders: Vec<AccountId>,
        /// Position of each holder in `holders`.
        holder_index: Mapping<AccountId, u32>,

        // ── Faucet ────────────────────────────────────────────────────────
        mint_per_day: Balance,
        mint_count: Balance,
        mint_period_start: Timestamp,

        // ── Insurance ─────────────────────────────────────────────────────
        insurance_cost: Balance,
        insurance_fund: Balance,
        policies: Mapping<AccountId, InsurancePolicy>,
        free_trials: Mapping<AccountId, bool>,

        // ── Heists ────────────────────────────────────────────────────────
        heists: Mapping<Hash, Heist>,
        claims: Mapping<(Hash, AccountId), bool>,

        entropy: EntropyPool,
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    #[ink(event)]
    pub struct Transfer {
        #[ink(topic)]
        from: Option<AccountId>,
        #[ink(topic)]
        to: Option<AccountId>,
        value: Balance,
    }

    #[ink(event)]
    pub struct Approval {
        #[ink(topic)]
        owner: AccountId,
        #[ink(topic)]
        spender: AccountId,
        value: Balance,
    }

    #[ink(event)]
    pub struct Taxed {
        rate_bps: u128,
        collected: Balance,
        accounts: u32,
    }

    #[ink(event)]
    pub struct MintCapChanged {
        cap: Balance,
    }

    #[ink(event)]
    pub struct TokensClaimed {
        #[ink(topic)]
        claimant: AccountId,
        amount: Balance,
        mint_count: Balance,
    }

    #[ink(event)]
    pub struct Insured {
        #[ink(topic)]
        holder: AccountId,
        expiry: Timestamp,
        kind: PolicyKind,
    }

    #[ink(event)]
    pub struct InsuranceCostChanged {
        cost: Balance,
    }

    /// A robbed policy holder was reimbursed from the insurance fund.
    #[ink(event)]
    pub struct InsurancePaid {
        #[ink(topic)]
        holder: AccountId,
        amount: Balance,
    }

    #[ink(event)]
    pub struct NewHeist {
        #[ink(topic)]
        heist: Hash,
        #[ink(topic)]
        instigator: AccountId,
        deadline: Timestamp,
    }

    #[ink(event)]
    pub struct JoinedHeist {
        #[ink(topic)]
        heist: Hash,
        #[ink(topic)]
        conspirator: AccountId,
    }

    #[ink(event)]
    pub struct BribeAdded {
        #[ink(topic)]
        heist: Hash,
        from: AccountId,
        value: Balance,
        total: Balance,
    }

    #[ink(event)]
    pub struct Robbed {
        #[ink(topic)]
        instigator: AccountId,
        #[ink(topic)]
        target: AccountId,
        value: Balance,
    }

    #[ink(event)]
    pub struct RobberyFailed {
        #[ink(topic)]
        instigator: AccountId,
        #[ink(topic)]
        target: AccountId,
        reason: FailureReason,
    }

    #[ink(event)]
    pub struct HeistFundsClaimed {
        #[ink(topic)]
        heist: Hash,
        #[ink(topic)]
        claimant: AccountId,
        amount: Balance,
    }

    #[ink(event)]
    pub struct Withdrawn {
        #[ink(topic)]
        to: AccountId,
        value: Balance,
    }

    // =========================================================================
    // ERRORS
    // =========================================================================

    #[derive(Debug, PartialEq, Eq, scale::Encode, scale::Decode)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum Error {
        /// Caller lacks the owner or instigator capability the message needs.
        Unauthorized,
        /// Zero account or the contract itself as a recipient.
        InvalidRecipient,
        /// Balance, allowance, fee, escrow or treasury too small.
        InsufficientFunds,
        /// Unknown or already resolved heist, commitment mismatch, policy
        /// conflict, repeated claim or allowance not reset.
        InvalidState,
        /// Outside the recruitment or robbery window.
        OutOfWindow,
        /// Crew is full or the faucet cap is reached.
        CapacityExceeded,
        /// Tax rate, policy length or cost outside the accepted range.
        InvalidParameter,
        /// An arithmetic operation overflowed.
        Overflow,
        /// The host refused a native value transfer.
        TransferFailed,
    }

    pub type Result<T> = core::result::Result<T, Error>;

    // =========================================================================
    // IMPLEMENTATION
    // =========================================================================

    impl HeistToken {
        // ---------------------------------------------------------------------
        // Constructors
        // ---------------------------------------------------------------------

        /// Deploy with `initial_supply` whole tokens credited to the deployer
        /// and a faucet cap of `mint_per_day` whole tokens per day.
        ///
        /// The entropy pool is seeded from the deployer and the deployment
        /// block. Fails with `Overflow` if either amount does not fit in
        /// `u128` minor units.
        #[ink(constructor)]
        pub fn new(initial_supply: Balance, mint_per_day: Balance) -> Result<Self> {
            let caller = Self::env().caller();
            let seed = EntropyPool::seed_from(
                caller.as_ref(),
                Self::env().block_timestamp(),
                Self::env().block_number(),
            );
            Self::new_with_seed(initial_supply, mint_per_day, seed)
        }

        /// Same as `new` with an explicit entropy seed.
        #[ink(constructor)]
        pub fn new_with_seed(
            initial_supply: Balance,
            mint_per_day: Balance,
            seed: [u8; 32],
        ) -> Result<Self> {
            let caller = Self::env().caller();
            let supply = logic::scale_tokens(initial_supply).ok_or(Error::Overflow)?;
            let cap = logic::scale_tokens(mint_per_day).ok_or(Error::Overflow)?;

            let mut balances = Mapping::default();
            let mut holder_index = Mapping::default();
            let mut holders = Vec::new();
            if supply > 0 {
                balances.insert(caller, &supply);
                holder_index.insert(caller, &0u32);
                holders.push(caller);
            }

            Self::env().emit_event(Transfer {
                from: None,
                to: Some(caller),
                value: supply,
            });

            Ok(Self {
                owner: caller,
                total_supply: supply,
                balances,
                allowances: Mapping::default(),
                holders,
                holder_index,
                mint_per_day: cap,
                mint_count: 0,
                mint_period_start: Self::env().block_timestamp(),
                insurance_cost: DEFAULT_INSURANCE_COST,
                insurance_fund: 0,
                policies: Mapping::default(),
                free_trials: Mapping::default(),
                heists: Mapping::default(),
                claims: Mapping::default(),
                entropy: EntropyPool::new(seed),
            })
        }

        // =====================================================================
        // LEDGER
        // =====================================================================

        #[ink(message)]
        pub fn name(&self) -> String {
            String::from(TOKEN_NAME)
        }

        #[ink(message)]
        pub fn symbol(&self) -> String {
            String::from(TOKEN_SYMBOL)
        }

        #[ink(message)]
        pub fn decimals(&self) -> u8 {
            DECIMALS
        }

        #[ink(message)]
        pub fn total_supply(&self) -> Balance {
            self.total_supply
        }

        #[ink(message)]
        pub fn balance_of(&self, owner: AccountId) -> Balance {
            self.balances.get(owner).unwrap_or(0)
        }

        #[ink(message)]
        pub fn allowance(&self, owner: AccountId, spender: AccountId) -> Balance {
            self.allowances.get((owner, spender)).unwrap_or(0)
        }

        #[ink(message)]
        pub fn owner(&self) -> AccountId {
            self.owner
        }

        #[ink(message)]
        pub fn transfer(&mut self, to: AccountId, value: Balance) -> Result<()> {
            let from = self.env().caller();
            self.ensure_recipient(to)?;
            self.transfer_impl(from, to, value)
        }

        /// Set `spender`'s allowance over the caller's balance.
        ///
        /// A nonzero allowance can only be replaced by zero (or by itself);
        /// moving it to a different nonzero value takes two calls. This
        /// closes the classic approve/transfer_from front-running window.
        #[ink(message)]
        pub fn approve(&mut self, spender: AccountId, value: Balance) -> Result<()> {
            let owner = self.env().caller();
            let current = self.allowance(owner, spender);
            if current != 0 && value != 0 && current != value {
                return Err(Error::InvalidState);
            }
            self.allowances.insert((owner, spender), &value);
            self.env().emit_event(Approval { owner, spender, value });
            Ok(())
        }

        #[ink(message)]
        pub fn transfer_from(
            &mut self,
            from: AccountId,
            to: AccountId,
            value: Balance,
        ) -> Result<()> {
            let caller = self.env().caller();
            self.ensure_recipient(to)?;
            let allowance = self.allowance(from, caller);
            let left = allowance
                .checked_sub(value)
                .ok_or(Error::InsufficientFunds)?;
            self.transfer_impl(from, to, value)?;
            self.allowances.insert((from, caller), &left);
            Ok(())
        }

        /// Mint `amount` whole tokens to the caller.
        ///
        /// Free for the owner. Everyone else attaches at least `MINT_PRICE`,
        /// which stays in the contract treasury until `withdraw`.
        #[ink(message, payable)]
        pub fn mint(&mut self, amount: Balance) -> Result<()> {
            let caller = self.env().caller();
            if caller != self.owner && self.env().transferred_value() < MINT_PRICE {
                return Err(Error::InsufficientFunds);
            }
            let value = logic::scale_tokens(amount).ok_or(Error::Overflow)?;
            self.mint_to(caller, value)
        }

        /// Levy `rate_bps` basis points on every non-owner holder and credit
        /// the total to the owner. Returns the amount collected.
        ///
        /// ```text
        /// levy_i    = ⌊balance_i × rate_bps / 10_000⌋     (1 ≤ rate_bps ≤ 1_000)
        /// owner    += Σ levy_i
        /// ```
        #[ink(message)]
        pub fn tax(&mut self, rate_bps: u128) -> Result<Balance> {
            self.only_owner()?;
            if rate_bps == 0 || rate_bps > MAX_TAX_BPS {
                return Err(Error::InvalidParameter);
            }

            let mut levies: Vec<(AccountId, Balance)> = Vec::new();
            let mut collected: Balance = 0;
            for holder in self.holders.iter().filter(|h| **h != self.owner) {
                let balance = self.balance_of(*holder);
                let levy = logic::tax_levy(balance, rate_bps);
                if levy == 0 {
                    continue;
                }
                collected = collected.checked_add(levy).ok_or(Error::Overflow)?;
                let after = balance.checked_sub(levy).ok_or(Error::Overflow)?;
                levies.push((*holder, after));
            }
            let owner_balance = self
                .balance_of(self.owner)
                .checked_add(collected)
                .ok_or(Error::Overflow)?;

            let accounts = levies.len() as u32;
            for (holder, after) in levies {
                self.write_balance(holder, after);
            }
            self.write_balance(self.owner, owner_balance);

            self.env().emit_event(Taxed {
                rate_bps,
                collected,
                accounts,
            });
            Ok(collected)
        }

        #[ink(message)]
        pub fn holder_count(&self) -> u32 {
            self.holders.len() as u32
        }

        // =====================================================================
        // FAUCET
        // =====================================================================

        /// Mint a random 1–100 whole tokens to the caller, within the daily
        /// cap. Returns the minted amount in minor units.
        ///
        /// The 24 h window resets lazily: the first claim after it lapses
        /// starts a fresh one. A claim that would cross the cap fails whole.
        #[ink(message)]
        pub fn claim_tokens(&mut self) -> Result<Balance> {
            let caller = self.env().caller();
            let now = self.env().block_timestamp();
            let block = self.env().block_number();

            let (period_start, count) = if logic::window_elapsed(self.mint_period_start, now, DAY)
            {
                (now, 0)
            } else {
                (self.mint_period_start, self.mint_count)
            };

            let mut entropy = self.entropy.clone();
            let drawn = entropy.draw_between(
                caller.as_ref(),
                now,
                block,
                FAUCET_MIN_TOKENS,
                FAUCET_MAX_TOKENS,
            );
            let amount = logic::scale_tokens(drawn as u128).ok_or(Error::Overflow)?;
            let next_count = count.checked_add(amount).ok_or(Error::Overflow)?;
            if next_count > self.mint_per_day {
                return Err(Error::CapacityExceeded);
            }

            self.mint_to(caller, amount)?;
            self.mint_count = next_count;
            self.mint_period_start = period_start;
            self.entropy = entropy;

            self.env().emit_event(TokensClaimed {
                claimant: caller,
                amount,
                mint_count: next_count,
            });
            Ok(amount)
        }

        /// Daily faucet cap in whole tokens.
        #[ink(message)]
        pub fn set_mint_per_day(&mut self, cap: Balance) -> Result<()> {
            self.only_owner()?;
            let cap = logic::scale_tokens(cap).ok_or(Error::Overflow)?;
            self.mint_per_day = cap;
            self.env().emit_event(MintCapChanged { cap });
            Ok(())
        }

        #[ink(message)]
        pub fn mint_per_day(&self) -> Balance {
            self.mint_per_day
        }

        #[ink(message)]
        pub fn mint_count(&self) -> Balance {
            self.mint_count
        }

        // =====================================================================
        // INSURANCE
        // =====================================================================

        /// One lifetime 1-day policy at no cost.
        #[ink(message)]
        pub fn get_free_insurance(&mut self) -> Result<()> {
            let caller = self.env().caller();
            if self.had_free_trial(caller) {
                return Err(Error::InvalidState);
            }
            let expiry = self
                .env()
                .block_timestamp()
                .checked_add(logic::policy_duration(FREE_TRIAL_DAYS))
                .ok_or(Error::Overflow)?;
            let cost = self.daily_premium()?;

            self.free_trials.insert(caller, &true);
            self.policies.insert(
                caller,
                &InsurancePolicy {
                    cost,
                    expiry,
                    coverage: 0,
                },
            );

            self.env().emit_event(Insured {
                holder: caller,
                expiry,
                kind: PolicyKind::FreeTrial,
            });
            Ok(())
        }

        /// Buy a `days`-long policy (1–7) once the previous one has lapsed.
        ///
        /// Purchases are only open to accounts that already used their free
        /// trial.
        #[ink(message)]
        pub fn buy_insurance(&mut self, days: u8) -> Result<()> {
            if days == 0 || days > MAX_POLICY_DAYS {
                return Err(Error::InvalidParameter);
            }
            let caller = self.env().caller();
            if !self.had_free_trial(caller) || self.is_insured(caller) {
                return Err(Error::InvalidState);
            }

            let cost = self.daily_premium()?;
            let premium = logic::premium(days, cost).ok_or(Error::Overflow)?;
            let balance = self
                .balance_of(caller)
                .checked_sub(premium)
                .ok_or(Error::InsufficientFunds)?;
            let fund = self
                .insurance_fund
                .checked_add(premium)
                .ok_or(Error::Overflow)?;
            let expiry = self
                .env()
                .block_timestamp()
                .checked_add(logic::policy_duration(days))
                .ok_or(Error::Overflow)?;

            self.write_balance(caller, balance);
            self.insurance_fund = fund;
            self.policies.insert(
                caller,
                &InsurancePolicy {
                    cost,
                    expiry,
                    coverage: premium,
                },
            );

            self.env().emit_event(Insured {
                holder: caller,
                expiry,
                kind: PolicyKind::Purchased,
            });
            Ok(())
        }

        #[ink(message)]
        pub fn is_insured(&self, account: AccountId) -> bool {
            self.policies
                .get(account)
                .map_or(false, |p| p.expiry > self.env().block_timestamp())
        }

        #[ink(message)]
        pub fn insurance_policy(&self, account: AccountId) -> Option<InsurancePolicy> {
            self.policies.get(account)
        }

        #[ink(message)]
        pub fn had_free_trial(&self, account: AccountId) -> bool {
            self.free_trials.get(account).unwrap_or(false)
        }

        #[ink(message)]
        pub fn insurance_fund(&self) -> Balance {
            self.insurance_fund
        }

        #[ink(message)]
        pub fn insurance_cost(&self) -> Balance {
            self.insurance_cost
        }

        #[ink(message)]
        pub fn insurance_multiplier(&self) -> Balance {
            INSURANCE_MULTIPLIER
        }

        #[ink(message)]
        pub fn max_policy_length(&self) -> u8 {
            MAX_POLICY_DAYS
        }

        /// Daily premium basis for new policies. Live policies keep theirs.
        #[ink(message)]
        pub fn set_insurance_cost(&mut self, cost: Balance) -> Result<()> {
            self.only_owner()?;
            if cost == 0 {
                return Err(Error::InvalidParameter);
            }
            self.insurance_cost = cost;
            self.env().emit_event(InsuranceCostChanged { cost });
            Ok(())
        }

        // =====================================================================
        // HEISTS
        // =====================================================================

        /// Commitment binding `target` to a secret `salt`:
        /// `keccak256(target ++ salt)`.
        #[ink(message)]
        pub fn hash_target(&self, target: AccountId, salt: String) -> Hash {
            Self::commitment(&target, salt.as_bytes())
        }

        /// Open a heist under `hash`. Attached value becomes the first bribe.
        ///
        /// Commitments are single-use: a hash that ever opened a heist,
        /// resolved or not, is rejected.
        #[ink(message, payable)]
        pub fn new_heist(&mut self, hash: Hash) -> Result<()> {
            if self.heists.contains(hash) {
                return Err(Error::InvalidState);
            }
            let instigator = self.env().caller();
            let now = self.env().block_timestamp();
            let deadline = now
                .checked_add(RECRUITMENT_WINDOW)
                .ok_or(Error::Overflow)?;

            let heist = Heist {
                instigator,
                created_at: now,
                deadline,
                bribe: self.env().transferred_value(),
                amount: 0,
                remaining: 0,
                conspirators: Vec::new(),
                status: HeistStatus::Open,
            };
            self.heists.insert(hash, &heist);

            self.env().emit_event(NewHeist {
                heist: hash,
                instigator,
                deadline,
            });
            Ok(())
        }

        /// Join an open heist, or sweeten it.
        ///
        /// With value attached the call only adds to the bribe, whoever the
        /// caller is. Without value the caller takes one of the ten crew
        /// seats; first come, first served.
        #[ink(message, payable)]
        pub fn join_heist(&mut self, hash: Hash) -> Result<()> {
            let mut heist = self.heists.get(hash).ok_or(Error::InvalidState)?;
            if heist.status != HeistStatus::Open {
                return Err(Error::InvalidState);
            }
            if self.env().block_timestamp() >= heist.deadline {
                return Err(Error::OutOfWindow);
            }

            let caller = self.env().caller();
            let value = self.env().transferred_value();
            if value > 0 {
                heist.bribe = heist.bribe.checked_add(value).ok_or(Error::Overflow)?;
                let total = heist.bribe;
                self.heists.insert(hash, &heist);
                self.env().emit_event(BribeAdded {
                    heist: hash,
                    from: caller,
                    value,
                    total,
                });
                return Ok(());
            }

            if caller == heist.instigator || heist.conspirators.contains(&caller) {
                return Err(Error::InvalidState);
            }
            if heist.conspirators.len() >= MAX_CONSPIRATORS {
                return Err(Error::CapacityExceeded);
            }
            heist.conspirators.push(caller);
            self.heists.insert(hash, &heist);

            self.env().emit_event(JoinedHeist {
                heist: hash,
                conspirator: caller,
            });
            Ok(())
        }

        /// Current success odds in percent, capped at 100.
        #[ink(message)]
        pub fn get_heist_odds(&self, hash: Hash) -> Result<u8> {
            let heist = self.heists.get(hash).ok_or(Error::InvalidState)?;
            Ok(logic::heist_odds(heist.conspirators.len(), heist.bribe))
        }

        /// Reveal the target and strike. Instigator only, between the
        /// recruitment deadline and the end of the initiation window.
        ///
        /// ```text
        /// balance(target) == 0        → Failed (Balance)
        /// roll ∈ [0,100) ≥ odds       → Failed (Odds)
        /// otherwise                   → Succeeded, escrow = p% of balance,
        ///                               p ∈ [10, 50]
        /// ```
        ///
        /// A target holding a live purchased policy is reimbursed from the
        /// insurance fund, never beyond the premium it paid. Members of the
        /// crew are not reimbursed for robbing themselves.
        ///
        /// Either way the heist is resolved and cannot be retried.
        #[ink(message)]
        pub fn rob_target(&mut self, target: AccountId, salt: String) -> Result<HeistStatus> {
            let hash = Self::commitment(&target, salt.as_bytes());
            let mut heist = self.heists.get(hash).ok_or(Error::InvalidState)?;
            if heist.status != HeistStatus::Open {
                return Err(Error::InvalidState);
            }
            let caller = self.env().caller();
            if caller != heist.instigator {
                return Err(Error::Unauthorized);
            }
            let now = self.env().block_timestamp();
            let closes = heist
                .deadline
                .checked_add(INITIATION_WINDOW)
                .ok_or(Error::Overflow)?;
            if now < heist.deadline || now > closes {
                return Err(Error::OutOfWindow);
            }

            let balance = self.balance_of(target);
            if balance == 0 {
                return Ok(self.fail_heist(hash, heist, target, FailureReason::Balance));
            }

            let block = self.env().block_number();
            let odds = logic::heist_odds(heist.conspirators.len(), heist.bribe);
            let mut entropy = self.entropy.clone();
            let roll = entropy.draw(hash.as_ref(), now, block, MAX_ODDS as u64);
            if roll >= odds as u64 {
                self.entropy = entropy;
                return Ok(self.fail_heist(hash, heist, target, FailureReason::Odds));
            }

            let percent = entropy.draw_between(
                target.as_ref(),
                now,
                block,
                HEIST_MIN_TAKE_PERCENT,
                HEIST_MAX_TAKE_PERCENT,
            );
            let take = logic::take_amount(balance, percent as u128);
            let mut policy = self.insurance_policy(target).unwrap_or_default();
            let crew_target = target == heist.instigator || heist.conspirators.contains(&target);
            let payout = if self.is_insured(target) && !crew_target {
                take.min(policy.coverage).min(self.insurance_fund)
            } else {
                0
            };
            policy.coverage = policy
                .coverage
                .checked_sub(payout)
                .ok_or(Error::Overflow)?;
            let target_balance = balance
                .checked_sub(take)
                .and_then(|b| b.checked_add(payout))
                .ok_or(Error::Overflow)?;
            let fund = self
                .insurance_fund
                .checked_sub(payout)
                .ok_or(Error::Overflow)?;

            self.entropy = entropy;
            self.write_balance(target, target_balance);
            self.insurance_fund = fund;
            if payout > 0 {
                self.policies.insert(target, &policy);
            }
            heist.amount = take;
            heist.remaining = take;
            heist.status = HeistStatus::Succeeded;
            self.heists.insert(hash, &heist);

            self.env().emit_event(Robbed {
                instigator: caller,
                target,
                value: take,
            });
            if payout > 0 {
                self.env().emit_event(InsurancePaid {
                    holder: target,
                    amount: payout,
                });
            }
            Ok(HeistStatus::Succeeded)
        }

        /// Withdraw the caller's cut of a successful heist: 70% of the
        /// proceeds for the instigator, 3% for each conspirator. Whatever a
        /// short crew leaves unclaimed stays in escrow.
        #[ink(message)]
        pub fn claim_heist_funds(&mut self, hash: Hash) -> Result<Balance> {
            let mut heist = self.heists.get(hash).ok_or(Error::InvalidState)?;
            if heist.status != HeistStatus::Succeeded {
                return Err(Error::InvalidState);
            }
            let caller = self.env().caller();
            let percent = if caller == heist.instigator {
                INSTIGATOR_SHARE_PERCENT
            } else if heist.conspirators.contains(&caller) {
                CONSPIRATOR_SHARE_PERCENT
            } else {
                return Err(Error::Unauthorized);
            };
            if self.has_claimed(hash, caller) {
                return Err(Error::InvalidState);
            }
            if heist.remaining == 0 {
                return Err(Error::InsufficientFunds);
            }

            let share = logic::share_of(heist.amount, percent);
            let remaining = heist
                .remaining
                .checked_sub(share)
                .ok_or(Error::InsufficientFunds)?;
            let balance = self
                .balance_of(caller)
                .checked_add(share)
                .ok_or(Error::Overflow)?;

            heist.remaining = remaining;
            self.heists.insert(hash, &heist);
            self.claims.insert((hash, caller), &true);
            self.write_balance(caller, balance);

            self.env().emit_event(HeistFundsClaimed {
                heist: hash,
                claimant: caller,
                amount: share,
            });
            Ok(share)
        }

        #[ink(message)]
        pub fn get_heist(&self, hash: Hash) -> Option<Heist> {
            self.heists.get(hash)
        }

        #[ink(message)]
        pub fn has_claimed(&self, hash: Hash, account: AccountId) -> bool {
            self.claims.get((hash, account)).unwrap_or(false)
        }

        // =====================================================================
        // TREASURY
        // =====================================================================

        /// Send `value` of the native treasury (bribes, mint fees) to the
        /// owner.
        #[ink(message)]
        pub fn withdraw(&mut self, value: Balance) -> Result<()> {
            self.only_owner()?;
            if self.env().balance() < value {
                return Err(Error::InsufficientFunds);
            }
            self.env()
                .transfer(self.owner, value)
                .map_err(|_| Error::TransferFailed)?;
            self.env().emit_event(Withdrawn {
                to: self.owner,
                value,
            });
            Ok(())
        }

        // =====================================================================
        // INTERNAL HELPERS
        // =====================================================================

        fn commitment(target: &AccountId, salt: &[u8]) -> Hash {
            let bytes: &[u8] = target.as_ref();
            let mut preimage = Vec::with_capacity(bytes.len() + salt.len());
            preimage.extend_from_slice(bytes);
            preimage.extend_from_slice(salt);
            Hash::from(crate::entropy::keccak(&preimage))
        }

        fn fail_heist(
            &mut self,
            hash: Hash,
            mut heist: Heist,
            target: AccountId,
            reason: FailureReason,
        ) -> HeistStatus {
            heist.status = HeistStatus::Failed;
            let instigator = heist.instigator;
            self.heists.insert(hash, &heist);
            self.env().emit_event(RobberyFailed {
                instigator,
                target,
                reason,
            });
            HeistStatus::Failed
        }

        fn daily_premium(&self) -> Result<Balance> {
            self.insurance_cost
                .checked_mul(INSURANCE_MULTIPLIER)
                .ok_or(Error::Overflow)
        }

        fn ensure_recipient(&self, to: AccountId) -> Result<()> {
            if to == AccountId::from([0u8; 32]) || to == self.env().account_id() {
                return Err(Error::InvalidRecipient);
            }
            Ok(())
        }

        fn transfer_impl(&mut self, from: AccountId, to: AccountId, value: Balance) -> Result<()> {
            let from_balance = self
                .balance_of(from)
                .checked_sub(value)
                .ok_or(Error::InsufficientFunds)?;
            if from != to {
                let to_balance = self
                    .balance_of(to)
                    .checked_add(value)
                    .ok_or(Error::Overflow)?;
                self.write_balance(from, from_balance);
                self.write_balance(to, to_balance);
            }
            self.env().emit_event(Transfer {
                from: Some(from),
                to: Some(to),
                value,
            });
            Ok(())
        }

        fn mint_to(&mut self, account: AccountId, value: Balance) -> Result<()> {
            let supply = self
                .total_supply
                .checked_add(value)
                .ok_or(Error::Overflow)?;
            let balance = self
                .balance_of(account)
                .checked_add(value)
                .ok_or(Error::Overflow)?;
            self.total_supply = supply;
            self.write_balance(account, balance);
            self.env().emit_event(Transfer {
                from: None,
                to: Some(account),
                value,
            });
            Ok(())
        }

        /// Store a balance and keep the holder registry in step: an account
        /// joins on its first credit and leaves once emptied.
        fn write_balance(&mut self, account: AccountId, balance: Balance) {
            if balance == 0 {
                self.balances.remove(account);
                self.drop_holder(account);
                return;
            }
            self.balances.insert(account, &balance);
            if !self.holder_index.contains(account) {
                self.holder_index.insert(account, &(self.holders.len() as u32));
                self.holders.push(account);
            }
        }

        /// Swap-remove `account` from the registry.
        fn drop_holder(&mut self, account: AccountId) {
            let Some(index) = self.holder_index.get(account) else {
                return;
            };
            self.holder_index.remove(account);
            let Some(last) = self.holders.pop() else {
                return;
            };
            if last != account {
                if let Some(slot) = self.holders.get_mut(index as usize) {
                    *slot = last;
                    self.holder_index.insert(last, &index);
                }
            }
        }

        fn only_owner(&self) -> Result<()> {
            if self.env().caller() != self.owner {
                return Err(Error::Unauthorized);
            }
            Ok(())
        }
    }

    // =========================================================================
    // UNIT TESTS
    // =========================================================================

}
