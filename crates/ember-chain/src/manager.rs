//! The chain manager: block ingestion, fork choice, and queries.
//!
//! Every block enters through [`ChainManager::add_block`]:
//!
//! 1. Structural checks and the dynamic size limit.
//! 2. Parent metadata lookup. An unknown or orphan parent parks the
//!    block as an orphan (linkage recorded, no validation possible yet).
//! 3. A known, connected parent triggers branch validation: header
//!    linkage, difficulty/PoW against the parent's spacing, then the
//!    transaction list applied to a snapshot of the parent's ledger.
//! 4. The block persists with its metadata in a single atomic batch.
//!    If its cumulative difficulty strictly exceeds the current tip's,
//!    the same batch rewrites the diverged height-index suffix and the
//!    block becomes the new tip.
//! 5. Parked children of a newly connected block are promoted
//!    breadth-first; children that fail re-validation are pruned with
//!    their whole subtree.
//!
//! Consensus rejections return `Ok(false)`; only storage failures
//! surface as errors.

use std::collections::{HashSet, VecDeque};
use std::time::{SystemTime, UNIX_EPOCH};

use primitive_types::U256;
use tracing::{debug, info, warn};

use ember_core::constants::{
    HEADERHASH_SYNC_LIMIT, INITIAL_DIFFICULTY, MAX_BLOCK_SIZE_LIMIT, MIN_BLOCK_SIZE_LIMIT,
    SIZE_LIMIT_WINDOW,
};
use ember_core::difficulty::{calc_difficulty, target_from_difficulty};
use ember_core::error::{BlockError, ChainError, EmberError, TransactionError};
use ember_core::genesis::{GENESIS_PARENT_TIMESTAMP, genesis_block};
use ember_core::metadata::BlockMetadata;
use ember_core::pow;
use ember_core::reward::{HalvingSchedule, RewardPolicy};
use ember_core::state::Snapshot;
use ember_core::store::{BlockStore, StoreBatch};
use ember_core::txpool::TxPool;
use ember_core::types::{AccountState, Address, Block, Hash256, Transaction};
use ember_core::validation;

/// Injected time source, seconds since the Unix epoch.
pub type Clock = Box<dyn Fn() -> u64 + Send + Sync>;

fn system_clock() -> Clock {
    Box::new(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    })
}

fn codec_err(e: TransactionError) -> ChainError {
    ChainError::Inconsistent(e.to_string())
}

/// Outcome of one ingestion attempt.
enum Ingest {
    /// Consensus rejection; nothing persisted.
    Rejected,
    /// Parked as an orphan awaiting its parent.
    Orphaned,
    /// Connected to the block tree (mainchain or side branch).
    Connected,
}

/// Blocks and transactions affected by a mainchain switch.
struct AdoptOutcome {
    /// Newly canonical blocks, tip first.
    new_suffix: Vec<Block>,
    /// Transfers from replaced blocks absent from the new chain.
    recycled: Vec<Transaction>,
}

/// Owns the block tree and the mainchain.
///
/// Not thread-safe; the node wraps the manager in a lock.
pub struct ChainManager<S: BlockStore> {
    store: S,
    tx_pool: TxPool,
    last_block: Block,
    current_difficulty: U256,
    current_target: U256,
    reward_policy: Box<dyn RewardPolicy>,
    clock: Clock,
    trigger_miner: bool,
}

impl<S: BlockStore> ChainManager<S> {
    /// Open a chain on the given store with the production reward
    /// policy and the system clock. A fresh store is bootstrapped with
    /// the genesis block.
    pub fn new(store: S) -> Result<Self, ChainError> {
        Self::with_parts(store, Box::new(HalvingSchedule), system_clock())
    }

    /// Open a chain with an explicit reward policy and clock.
    pub fn with_parts(
        mut store: S,
        reward_policy: Box<dyn RewardPolicy>,
        clock: Clock,
    ) -> Result<Self, ChainError> {
        let (last_block, tip_meta) = match store.chain_height()? {
            None => Self::bootstrap_genesis(&mut store)?,
            Some(height) => {
                let hash = store.get_block_hash_by_number(height)?.ok_or_else(|| {
                    ChainError::Inconsistent(format!("height index missing at {height}"))
                })?;
                let block = store
                    .get_block(&hash)?
                    .ok_or_else(|| ChainError::MissingBlock(hash.to_string()))?;
                let meta = store
                    .get_metadata(&hash)?
                    .ok_or_else(|| ChainError::MissingMetadata(hash.to_string()))?;
                debug!(height, tip = %hash, "resumed chain from store");
                (block, meta)
            }
        };

        let current_difficulty = tip_meta.block_difficulty();
        Ok(Self {
            store,
            tx_pool: TxPool::with_defaults(),
            last_block,
            current_difficulty,
            current_target: target_from_difficulty(current_difficulty),
            reward_policy,
            clock,
            trigger_miner: false,
        })
    }

    /// Persist the genesis block into a fresh store.
    fn bootstrap_genesis(store: &mut S) -> Result<(Block, BlockMetadata), ChainError> {
        let genesis = genesis_block().clone();
        let hash = genesis.headerhash();

        let dt = calc_difficulty(
            genesis.header.timestamp,
            GENESIS_PARENT_TIMESTAMP,
            U256::from(INITIAL_DIFFICULTY),
        );
        let meta = BlockMetadata::new(false, dt.difficulty, dt.difficulty);

        let mut snapshot = Snapshot::empty();
        for tx in &genesis.transactions {
            snapshot.apply(tx).map_err(codec_err)?;
        }

        let mut batch = StoreBatch::new();
        batch.put_block(genesis.clone());
        batch.put_metadata(hash, meta.clone());
        batch.put_height_index(0, hash);
        batch.put_chain_height(0);
        batch.put_accounts(hash, snapshot.into_accounts());
        for txhash in genesis.tx_hashes().map_err(codec_err)? {
            batch.put_tx_index(txhash, hash);
        }
        store.commit(batch)?;

        info!(genesis = %hash, "initialized fresh chain");
        Ok((genesis, meta))
    }

    // ------------------------------------------------------------------
    // Ingestion
    // ------------------------------------------------------------------

    /// Ingest a block received from a peer or a local miner.
    ///
    /// Returns `Ok(true)` if the block was stored (as mainchain, side
    /// branch, or parked orphan), `Ok(false)` on any consensus
    /// rejection or duplicate. `Err` only for storage failures, which
    /// the caller treats as fatal.
    pub fn add_block(&mut self, block: Block) -> Result<bool, ChainError> {
        match self.try_add_block(&block, true)? {
            Ingest::Rejected => Ok(false),
            Ingest::Orphaned => Ok(true),
            Ingest::Connected => {
                self.promote_children(block.headerhash())?;
                Ok(true)
            }
        }
    }

    /// One ingestion attempt. `check_duplicate` is false when
    /// re-validating a parked orphan that is already stored.
    fn try_add_block(&mut self, block: &Block, check_duplicate: bool) -> Result<Ingest, ChainError> {
        let headerhash = block.headerhash();

        // Only the hardcoded genesis occupies height 0.
        if block.block_number() == 0 {
            debug!(%headerhash, "rejecting non-bootstrap block at height 0");
            return Ok(Ingest::Rejected);
        }
        if check_duplicate && self.store.contains_block(&headerhash)? {
            debug!(%headerhash, "ignoring duplicate block");
            return Ok(Ingest::Rejected);
        }

        let size = match block.size() {
            Ok(size) => size,
            Err(e) => {
                warn!(%headerhash, error = %e, "rejecting unserializable block");
                return Ok(Ingest::Rejected);
            }
        };
        let limit = self.block_size_limit()?;
        if size > limit {
            let e = BlockError::OversizedBlock { size, max: limit };
            warn!(%headerhash, error = %e, "rejecting oversized block");
            return Ok(Ingest::Rejected);
        }
        if let Err(e) = validation::validate_block_structure(block) {
            warn!(%headerhash, error = %e, "rejecting structurally invalid block");
            return Ok(Ingest::Rejected);
        }

        match self.store.get_metadata(&block.header.prev_headerhash)? {
            None => self.park_orphan(block, headerhash),
            Some(parent_meta) if parent_meta.is_orphan => self.park_orphan(block, headerhash),
            Some(parent_meta) => self.connect_block(block, headerhash, parent_meta),
        }
    }

    /// Store a block whose parent is unknown or itself an orphan.
    ///
    /// The block cannot be validated against a ledger yet; only the
    /// parent/child linkage is recorded. A placeholder metadata record
    /// is created under the parent hash if none exists, so the parent
    /// finds its parked children on arrival.
    fn park_orphan(&mut self, block: &Block, headerhash: Hash256) -> Result<Ingest, ChainError> {
        let parent_hash = block.header.prev_headerhash;
        let mut batch = StoreBatch::new();

        batch.put_block(block.clone());

        let mut meta = self
            .store
            .get_metadata(&headerhash)?
            .unwrap_or_else(BlockMetadata::placeholder);
        meta.is_orphan = true;
        batch.put_metadata(headerhash, meta);

        let mut parent_meta = self
            .store
            .get_metadata(&parent_hash)?
            .unwrap_or_else(BlockMetadata::placeholder);
        parent_meta.add_child(headerhash);
        batch.put_metadata(parent_hash, parent_meta);

        self.store.commit(batch)?;
        self.trigger_miner = false;

        debug!(%headerhash, parent = %parent_hash, "parked orphan block");
        Ok(Ingest::Orphaned)
    }

    /// Validate a block against its connected parent and persist it,
    /// switching the mainchain if it creates a heavier tip.
    fn connect_block(
        &mut self,
        block: &Block,
        headerhash: Hash256,
        mut parent_meta: BlockMetadata,
    ) -> Result<Ingest, ChainError> {
        let parent_hash = block.header.prev_headerhash;
        let parent = self.store.get_block(&parent_hash)?.ok_or_else(|| {
            ChainError::Inconsistent(format!("connected metadata without block: {parent_hash}"))
        })?;

        let now = (self.clock)();
        if let Err(e) = validation::validate_linkage(block, &parent.header, now) {
            warn!(%headerhash, error = %e, "rejecting badly linked block");
            return Ok(Ingest::Rejected);
        }

        // Cheap PoW check before touching the ledger.
        let dt = calc_difficulty(
            block.header.timestamp,
            parent.header.timestamp,
            parent_meta.block_difficulty(),
        );
        if !pow::verify_pow(&block.header.mining_hash(), block.header.mining_nonce, dt.target) {
            let e = BlockError::InvalidPoW;
            warn!(%headerhash, difficulty = %dt.difficulty, error = %e, "rejecting block");
            return Ok(Ingest::Rejected);
        }

        // A pending transfer claiming the same (sender, nonce) or
        // (sender, OTS index) slot makes the block ineligible; the
        // identical transaction confirming is the normal path.
        for (index, tx) in block.transactions.iter().enumerate() {
            if let Some(conflict) = self.tx_pool.conflicting(tx) {
                warn!(
                    %headerhash,
                    index,
                    %conflict,
                    "rejecting block conflicting with a pooled transfer",
                );
                return Ok(Ingest::Rejected);
            }
        }

        let mut snapshot = Snapshot::at(&self.store, &parent_hash, &block.touched_addresses())?;
        if let Err(e) =
            validation::apply_block_transactions(block, &mut snapshot, self.reward_policy.as_ref())
        {
            warn!(%headerhash, error = %e, "rejecting block with invalid transactions");
            return Ok(Ingest::Rejected);
        }

        let cumulative = parent_meta
            .cumulative_difficulty()
            .checked_add(dt.difficulty)
            .unwrap_or(U256::MAX);

        // Children recorded by earlier-arrived orphans survive the
        // metadata rewrite.
        let mut meta = BlockMetadata::new(false, dt.difficulty, cumulative);
        if let Some(existing) = self.store.get_metadata(&headerhash)? {
            for child in existing.child_headerhashes {
                meta.add_child(child);
            }
        }
        parent_meta.add_child(headerhash);

        let mut batch = StoreBatch::new();
        batch.put_block(block.clone());
        batch.put_metadata(headerhash, meta);
        batch.put_metadata(parent_hash, parent_meta);
        batch.put_accounts(headerhash, snapshot.into_accounts());

        let tip_hash = self.last_block.headerhash();
        let tip_meta = self
            .store
            .get_metadata(&tip_hash)?
            .ok_or_else(|| ChainError::MissingMetadata(tip_hash.to_string()))?;

        if cumulative > tip_meta.cumulative_difficulty() {
            let outcome = self.adopt_tip(block, &mut batch)?;
            batch.put_chain_height(block.block_number());
            self.store.commit(batch)?;

            for adopted in &outcome.new_suffix {
                self.tx_pool.remove_confirmed(adopted);
            }
            for tx in outcome.recycled {
                if let Err(e) = self.tx_pool.insert(tx) {
                    debug!(error = %e, "dropped recycled transfer");
                }
            }

            self.last_block = block.clone();
            let next = calc_difficulty(
                now.max(block.header.timestamp + 1),
                block.header.timestamp,
                dt.difficulty,
            );
            self.current_difficulty = next.difficulty;
            self.current_target = next.target;
            self.trigger_miner = true;

            info!(
                %headerhash,
                height = block.block_number(),
                cumulative = %cumulative,
                "new mainchain tip",
            );
        } else {
            self.store.commit(batch)?;
            debug!(%headerhash, height = block.block_number(), "stored side-branch block");
        }

        Ok(Ingest::Connected)
    }

    /// Queue the height-index and tx-index rewrites that make `new_tip`
    /// canonical, walking the new chain down to the fork point.
    ///
    /// Only the diverged suffix is rewritten; heights where the index
    /// already names the new-chain block terminate the walk. Heights
    /// above the new tip left over from a longer replaced chain are
    /// cleared.
    fn adopt_tip(
        &mut self,
        new_tip: &Block,
        batch: &mut StoreBatch,
    ) -> Result<AdoptOutcome, ChainError> {
        let mut new_suffix: Vec<Block> = Vec::new();
        let mut cursor = new_tip.clone();
        loop {
            let number = cursor.block_number();
            if self.store.get_block_hash_by_number(number)? == Some(cursor.headerhash()) {
                break;
            }
            let prev = cursor.header.prev_headerhash;
            new_suffix.push(cursor);
            if number == 0 {
                break;
            }
            cursor = self
                .store
                .get_block(&prev)?
                .ok_or_else(|| ChainError::MissingBlock(prev.to_string()))?;
        }

        if new_suffix.len() > 1 {
            info!(
                depth = new_suffix.len(),
                new_tip = %new_tip.headerhash(),
                "reorganizing mainchain",
            );
        }

        let mut new_txhashes = HashSet::new();
        for adopted in &new_suffix {
            for tx in &adopted.transactions {
                new_txhashes.insert(tx.txhash().map_err(codec_err)?);
            }
        }

        let mut recycled = Vec::new();
        let handle_replaced = |old_block: &Block,
                                   batch: &mut StoreBatch,
                                   recycled: &mut Vec<Transaction>|
         -> Result<(), ChainError> {
            for tx in &old_block.transactions {
                let txhash = tx.txhash().map_err(codec_err)?;
                if new_txhashes.contains(&txhash) {
                    continue;
                }
                batch.delete_tx_index(txhash);
                if !tx.is_coinbase() {
                    recycled.push(tx.clone());
                }
            }
            Ok(())
        };

        for adopted in &new_suffix {
            let number = adopted.block_number();
            if let Some(old_hash) = self.store.get_block_hash_by_number(number)? {
                if let Some(old_block) = self.store.get_block(&old_hash)? {
                    handle_replaced(&old_block, batch, &mut recycled)?;
                }
            }
            batch.put_height_index(number, adopted.headerhash());
            for tx in &adopted.transactions {
                batch.put_tx_index(tx.txhash().map_err(codec_err)?, adopted.headerhash());
            }
        }

        // A heavier chain can still be shorter; drop stale heights.
        if let Some(old_height) = self.store.chain_height()? {
            for number in (new_tip.block_number() + 1)..=old_height {
                if let Some(old_hash) = self.store.get_block_hash_by_number(number)? {
                    if let Some(old_block) = self.store.get_block(&old_hash)? {
                        handle_replaced(&old_block, batch, &mut recycled)?;
                    }
                    batch.delete_height_index(number);
                }
            }
        }

        Ok(AdoptOutcome { new_suffix, recycled })
    }

    /// Breadth-first promotion of parked children after `headerhash`
    /// connected. Children that fail re-validation are pruned together
    /// with their recorded subtrees.
    fn promote_children(&mut self, headerhash: Hash256) -> Result<(), ChainError> {
        let mut queue: VecDeque<Hash256> = VecDeque::new();
        if let Some(meta) = self.store.get_metadata(&headerhash)? {
            queue.extend(meta.child_headerhashes);
        }

        while let Some(child_hash) = queue.pop_front() {
            // Placeholder linkage without a stored block: nothing to do.
            let Some(child) = self.store.get_block(&child_hash)? else {
                continue;
            };
            let Some(child_meta) = self.store.get_metadata(&child_hash)? else {
                continue;
            };
            if !child_meta.is_orphan {
                continue;
            }

            match self.try_add_block(&child, false)? {
                Ingest::Connected => {
                    debug!(%child_hash, "promoted parked block");
                    if let Some(meta) = self.store.get_metadata(&child_hash)? {
                        queue.extend(meta.child_headerhashes);
                    }
                }
                Ingest::Orphaned => {}
                Ingest::Rejected => {
                    warn!(%child_hash, "pruning invalid parked subtree");
                    self.prune_subtree(child_hash)?;
                }
            }
        }
        Ok(())
    }

    /// Delete a parked block and every recorded descendant.
    fn prune_subtree(&mut self, root: Hash256) -> Result<(), ChainError> {
        let mut batch = StoreBatch::new();

        if let Some(block) = self.store.get_block(&root)? {
            let parent_hash = block.header.prev_headerhash;
            if let Some(mut parent_meta) = self.store.get_metadata(&parent_hash)? {
                parent_meta.remove_child(&root);
                batch.put_metadata(parent_hash, parent_meta);
            }
        }

        let mut queue = VecDeque::from([root]);
        while let Some(hash) = queue.pop_front() {
            if let Some(meta) = self.store.get_metadata(&hash)? {
                queue.extend(meta.child_headerhashes);
            }
            batch.delete_block(hash);
            batch.delete_metadata(hash);
            batch.delete_accounts(hash);
        }

        self.store.commit(batch)
    }

    // ------------------------------------------------------------------
    // Pending transactions
    // ------------------------------------------------------------------

    /// Admit a transfer to the pending pool.
    ///
    /// Checks structure, then the sender's confirmed state at the tip
    /// (spent nonces, spent OTS slots, balance), then pool conflicts.
    /// Pool admission is laxer than block inclusion: a nonce ahead of
    /// the confirmed sequence may wait in the pool.
    pub fn add_transaction(&mut self, tx: Transaction) -> Result<Hash256, EmberError> {
        validation::validate_transaction(&tx)?;

        let Transaction::Transfer { amount, fee, nonce, ots_index, .. } = &tx else {
            return Err(ember_core::error::PoolError::CoinbaseNotAllowed.into());
        };
        let sender = tx
            .sender()
            .ok_or(ember_core::error::PoolError::CoinbaseNotAllowed)?;

        let account = self.account_at_tip(&sender)?;
        if *nonce <= account.nonce {
            return Err(TransactionError::InvalidNonce {
                expected: account.nonce + 1,
                got: *nonce,
            }
            .into());
        }
        if account.is_ots_used(*ots_index) {
            return Err(TransactionError::OtsReused { index: *ots_index }.into());
        }
        let total = amount
            .checked_add(*fee)
            .ok_or(TransactionError::ValueOverflow)?;
        if account.balance < total {
            return Err(TransactionError::InsufficientFunds {
                have: account.balance,
                need: total,
            }
            .into());
        }

        let txhash = self.tx_pool.insert(tx)?;
        debug!(%txhash, "accepted transfer into the pool");
        Ok(txhash)
    }

    fn account_at_tip(&self, address: &Address) -> Result<AccountState, ChainError> {
        let wanted = std::iter::once(*address).collect();
        let snapshot = Snapshot::at(&self.store, &self.last_block.headerhash(), &wanted)?;
        Ok(snapshot.account(address))
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Mainchain tip height.
    pub fn height(&self) -> u64 {
        self.last_block.block_number()
    }

    /// The mainchain tip block.
    pub fn last_block(&self) -> &Block {
        &self.last_block
    }

    /// Difficulty expected of the next block, estimated at the last
    /// tip switch.
    pub fn current_difficulty(&self) -> U256 {
        self.current_difficulty
    }

    /// PoW target for [`current_difficulty`](Self::current_difficulty).
    pub fn current_target(&self) -> U256 {
        self.current_target
    }

    /// Cumulative difficulty of the mainchain tip.
    pub fn get_cumulative_difficulty(&self) -> Result<U256, ChainError> {
        let tip_hash = self.last_block.headerhash();
        let meta = self
            .store
            .get_metadata(&tip_hash)?
            .ok_or_else(|| ChainError::MissingMetadata(tip_hash.to_string()))?;
        Ok(meta.cumulative_difficulty())
    }

    /// Any stored block by headerhash, mainchain or not.
    pub fn get_block(&self, headerhash: &Hash256) -> Result<Option<Block>, ChainError> {
        self.store.get_block(headerhash)
    }

    /// The mainchain block at a height.
    pub fn get_block_by_number(&self, block_number: u64) -> Result<Option<Block>, ChainError> {
        self.store.get_block_by_number(block_number)
    }

    /// Metadata for any stored headerhash.
    pub fn get_metadata(&self, headerhash: &Hash256) -> Result<Option<BlockMetadata>, ChainError> {
        self.store.get_metadata(headerhash)
    }

    /// Mainchain headerhashes from `max(0, tip - 10,000)` through the
    /// tip, oldest first.
    pub fn get_headerhashes(&self) -> Result<Vec<Hash256>, ChainError> {
        let tip = self.height();
        let start = tip.saturating_sub(HEADERHASH_SYNC_LIMIT - 1);
        let mut hashes = Vec::with_capacity((tip - start + 1) as usize);
        for number in start..=tip {
            let hash = self.store.get_block_hash_by_number(number)?.ok_or_else(|| {
                ChainError::Inconsistent(format!("height index missing at {number}"))
            })?;
            hashes.push(hash);
        }
        Ok(hashes)
    }

    /// Look up a transaction: the pending pool first, then the
    /// confirmed mainchain. Confirmed transactions come with the
    /// headerhash of their block.
    pub fn get_transaction(
        &self,
        txhash: &Hash256,
    ) -> Result<Option<(Transaction, Option<Hash256>)>, ChainError> {
        if let Some(entry) = self.tx_pool.get(txhash) {
            return Ok(Some((entry.tx.clone(), None)));
        }
        let Some(block_hash) = self.store.get_transaction_block(txhash)? else {
            return Ok(None);
        };
        let block = self
            .store
            .get_block(&block_hash)?
            .ok_or_else(|| ChainError::MissingBlock(block_hash.to_string()))?;
        for tx in block.transactions {
            if tx.txhash().map_err(codec_err)? == *txhash {
                return Ok(Some((tx, Some(block_hash))));
            }
        }
        Err(ChainError::Inconsistent(format!(
            "tx index points at block without tx: {txhash}"
        )))
    }

    /// Account states as of an arbitrary stored block. Addresses never
    /// touched on that branch read as empty accounts.
    pub fn get_state(
        &self,
        headerhash: &Hash256,
        addresses: &[Address],
    ) -> Result<Vec<(Address, AccountState)>, ChainError> {
        if !self.store.contains_block(headerhash)? {
            return Err(ChainError::MissingBlock(headerhash.to_string()));
        }
        let wanted = addresses.iter().copied().collect();
        let snapshot = Snapshot::at(&self.store, headerhash, &wanted)?;
        Ok(addresses
            .iter()
            .map(|address| (*address, snapshot.account(address)))
            .collect())
    }

    /// Dynamic block-size limit: twice the mean size of the last
    /// [`SIZE_LIMIT_WINDOW`] mainchain blocks, clamped to the protocol
    /// bounds.
    pub fn block_size_limit(&self) -> Result<usize, ChainError> {
        let tip = self.height();
        let start = tip.saturating_sub(SIZE_LIMIT_WINDOW - 1);
        let mut sizes = Vec::with_capacity(SIZE_LIMIT_WINDOW as usize);
        for number in start..=tip {
            if let Some(block) = self.store.get_block_by_number(number)? {
                sizes.push(block.size().map_err(codec_err)?);
            }
        }
        if sizes.is_empty() {
            return Ok(MIN_BLOCK_SIZE_LIMIT);
        }
        let mean = sizes.iter().sum::<usize>() / sizes.len();
        Ok((mean * 2).clamp(MIN_BLOCK_SIZE_LIMIT, MAX_BLOCK_SIZE_LIMIT))
    }

    /// Consume the miner restart signal. True once after each tip
    /// switch; parking an orphan clears it.
    pub fn take_miner_trigger(&mut self) -> bool {
        std::mem::take(&mut self.trigger_miner)
    }

    /// The pending transaction pool.
    pub fn tx_pool(&self) -> &TxPool {
        &self.tx_pool
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Tear down the manager and recover the store (node shutdown).
    pub fn into_store(self) -> S {
        self.store
    }
}
