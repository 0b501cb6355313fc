//! Ledger snapshots keyed by headerhash.
//!
//! Every stored block carries the post-state of the accounts it
//! touched. The state of an address at a given headerhash is therefore
//! the record from the nearest ancestor (inclusive) that touched it,
//! else the empty account. Competing branches coexist without undo
//! logs; the canonical ledger is just the mainchain tip's view.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{ChainError, TransactionError};
use crate::store::BlockStore;
use crate::types::{AccountState, Address, Hash256, Transaction};

/// A mutable view of account states rooted at some block.
///
/// [`Snapshot::apply`] enforces the contextual transfer rules (exact
/// nonce sequencing, one-time-signature replay, balance coverage) while
/// mutating, so a block's transaction list is validated by applying it
/// in order to a snapshot of its parent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    accounts: BTreeMap<Address, AccountState>,
}

impl Snapshot {
    /// The empty ledger. Parent view of the genesis block.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reconstruct the state of `addresses` as of the block at
    /// `headerhash`, by walking the ancestor chain back to genesis.
    ///
    /// Ancestors missing from the store end the walk; addresses still
    /// unresolved at that point read as empty accounts.
    pub fn at<S: BlockStore + ?Sized>(
        store: &S,
        headerhash: &Hash256,
        addresses: &BTreeSet<Address>,
    ) -> Result<Self, ChainError> {
        let mut snapshot = Self::empty();
        let mut remaining: BTreeSet<Address> = addresses.clone();
        let mut cursor = *headerhash;

        while !cursor.is_zero() && !remaining.is_empty() {
            if let Some(records) = store.get_accounts(&cursor)? {
                remaining.retain(|address| match records.get(address) {
                    Some(state) => {
                        snapshot.accounts.insert(*address, state.clone());
                        false
                    }
                    None => true,
                });
            }
            match store.get_block(&cursor)? {
                Some(block) => cursor = block.header.prev_headerhash,
                None => break,
            }
        }

        Ok(snapshot)
    }

    /// The state of an address in this view. Unknown addresses are
    /// empty accounts.
    pub fn account(&self, address: &Address) -> AccountState {
        self.accounts.get(address).cloned().unwrap_or_default()
    }

    /// Apply one transaction, enforcing the contextual rules.
    ///
    /// On error the snapshot is unchanged.
    pub fn apply(&mut self, tx: &Transaction) -> Result<(), TransactionError> {
        match tx {
            Transaction::Coinbase { to, amount, .. } => {
                let mut account = self.account(to);
                account.balance = account
                    .balance
                    .checked_add(*amount)
                    .ok_or(TransactionError::ValueOverflow)?;
                self.accounts.insert(*to, account);
                Ok(())
            }
            Transaction::Transfer {
                to,
                amount,
                fee,
                nonce,
                ots_index,
                public_key,
                ..
            } => {
                let sender = Address::from_public_key(public_key);
                let total = amount
                    .checked_add(*fee)
                    .ok_or(TransactionError::ValueOverflow)?;

                let mut account = self.account(&sender);
                let expected = account.nonce + 1;
                if *nonce != expected {
                    return Err(TransactionError::InvalidNonce { expected, got: *nonce });
                }
                if account.is_ots_used(*ots_index) {
                    return Err(TransactionError::OtsReused { index: *ots_index });
                }
                if account.balance < total {
                    return Err(TransactionError::InsufficientFunds {
                        have: account.balance,
                        need: total,
                    });
                }

                if sender == *to {
                    // Self-transfer only burns the fee; cannot overflow.
                    account.balance = account.balance - total + amount;
                    account.nonce = expected;
                    account.mark_ots_used(*ots_index);
                    self.accounts.insert(sender, account);
                    return Ok(());
                }

                let credited = self
                    .account(to)
                    .balance
                    .checked_add(*amount)
                    .ok_or(TransactionError::ValueOverflow)?;

                account.balance -= total;
                account.nonce = expected;
                account.mark_ots_used(*ots_index);
                self.accounts.insert(sender, account);
                self.accounts.entry(*to).or_default().balance = credited;
                Ok(())
            }
        }
    }

    /// All accounts this snapshot holds, ownership transferred. The
    /// result is what a block persists as its touched-account record.
    pub fn into_accounts(self) -> BTreeMap<Address, AccountState> {
        self.accounts
    }

    /// All accounts this snapshot holds.
    pub fn accounts(&self) -> &BTreeMap<Address, AccountState> {
        &self.accounts
    }
}
