//! The oracle consensus reactor.
//!
//! Owns all vote-set state and drives the gossip protocol from two host
//! hooks: the periodic proposer tick (one long-lived thread, aligned to
//! wall-clock boundaries so all nodes wake in loose lock-step) and
//! [`receive`], invoked by the host P2P layer from arbitrary threads.
//!
//! Every state-mutating path runs under the single state mutex, and
//! persistence happens before the mutex is released, so a restart always
//! observes a state consistent with some serialization of in-flight
//! operations.  Peer misbehaviour (malformed frames, misplaced channels,
//! invalid signatures) is logged and dropped; the host decides on banning.
//!
//! [`receive`]: Reactor::receive

use {
    crate::{
        channel::{
            channel_descriptors, ChannelDescriptor, MAJ23_CHANNEL_ID, VOTE_SET_CHANNEL_ID,
        },
        config::ReactorConfig,
        error::{ReactorError, Result},
        host::HostStateReader,
        message::ReactorMessage,
        peer::Peer,
        state::{load_reactor_state, save_reactor_state, ReactorState},
        store::KvStore,
    },
    crossbeam_channel::{after, bounded, select, Receiver, Sender},
    log::{debug, error, info, warn},
    oraclenet_consensus::{
        copy_signature_slots, message_digest, ConsensusError, FnExecutionRequest,
        FnExecutionResponse, FnIndividualExecutionResponse, FnRegistry, FnVotePayload, FnVoteSet,
        ValidatorSet,
    },
    parking_lot::{Mutex, RwLock},
    solana_pubkey::Pubkey,
    solana_signer::Signer,
    std::{
        collections::HashMap,
        sync::Arc,
        thread::JoinHandle,
        time::{Duration, SystemTime, UNIX_EPOCH},
    },
};

/// Current Unix time in seconds.
fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Multi-signature oracle consensus reactor.
pub struct Reactor {
    config: ReactorConfig,
    registry: Arc<dyn FnRegistry>,
    host: Arc<dyn HostStateReader>,
    signer: Arc<dyn Signer + Send + Sync>,
    store: Arc<dyn KvStore>,
    /// All vote-set mutation and surrounding persistence serializes here.
    state: Mutex<ReactorState>,
    /// Peer map; broadcasts iterate under read, join/leave under write.
    peers: RwLock<HashMap<Pubkey, Arc<dyn Peer>>>,
    quit_tx: Mutex<Option<Sender<()>>>,
    progress_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Reactor {
    /// Assemble a reactor.  Nothing runs until [`on_start`].
    ///
    /// [`on_start`]: Reactor::on_start
    pub fn new(
        config: ReactorConfig,
        registry: Arc<dyn FnRegistry>,
        host: Arc<dyn HostStateReader>,
        signer: Arc<dyn Signer + Send + Sync>,
        store: Arc<dyn KvStore>,
    ) -> Self {
        Self {
            config,
            registry,
            host,
            signer,
            store,
            state: Mutex::new(ReactorState::new()),
            peers: RwLock::new(HashMap::new()),
            quit_tx: Mutex::new(None),
            progress_handle: Mutex::new(None),
        }
    }

    /// The channels to register with the host P2P layer.
    pub fn channels(&self) -> Vec<ChannelDescriptor> {
        channel_descriptors(&self.config)
    }

    /// Load persisted state and start the progress routine.  A corrupted
    /// state record is fatal here; a missing one is a fresh start.
    pub fn on_start(self: &Arc<Self>) -> Result<()> {
        self.config.validate()?;
        let loaded = load_reactor_state(self.store.as_ref())?;
        info!(
            "oracle reactor starting on {} ({} in-flight rounds restored)",
            self.config.chain_id,
            loaded.current_vote_sets.len()
        );
        *self.state.lock() = loaded;

        let (quit_tx, quit_rx) = bounded::<()>(1);
        let reactor = Arc::clone(self);
        let handle = std::thread::Builder::new()
            .name("oracleProgress".to_string())
            .spawn(move || reactor.run_progress_loop(quit_rx))?;
        *self.quit_tx.lock() = Some(quit_tx);
        *self.progress_handle.lock() = Some(handle);
        Ok(())
    }

    /// Signal the progress routine and wait for it to exit.
    pub fn on_stop(&self) {
        if let Some(quit) = self.quit_tx.lock().take() {
            let _ = quit.send(());
        }
        if let Some(handle) = self.progress_handle.lock().take() {
            if handle.join().is_err() {
                error!("progress routine panicked");
            }
        }
    }

    // ── Peer book-keeping ───────────────────────────────────────────────

    /// Track a newly connected peer.
    pub fn add_peer(&self, peer: Arc<dyn Peer>) {
        let id = peer.id();
        debug!("peer {id} connected");
        self.peers.write().insert(id, peer);
    }

    /// Forget a disconnected peer.
    pub fn remove_peer(&self, peer_id: &Pubkey) {
        if self.peers.write().remove(peer_id).is_some() {
            debug!("peer {peer_id} disconnected");
        }
    }

    // ── Receive path ────────────────────────────────────────────────────

    /// Entry point for the host P2P layer.  `msg_bytes` is only borrowed
    /// for the duration of the call; anything relayed onward is copied.
    pub fn receive(&self, channel_id: u8, peer_id: Pubkey, msg_bytes: &[u8]) {
        let message = match ReactorMessage::decode_framed(msg_bytes, self.config.max_message_bytes)
        {
            Ok(message) => message,
            Err(e) => {
                error!("undecodable frame from {peer_id} on channel {channel_id:#04x}: {e}");
                return;
            }
        };
        let ReactorMessage::VoteSet(remote) = message;

        match channel_id {
            VOTE_SET_CHANNEL_ID => self.handle_vote_set(peer_id, remote),
            MAJ23_CHANNEL_ID => self.handle_maj23(peer_id, remote, msg_bytes),
            other => warn!("message from {peer_id} on unknown channel {other:#04x}"),
        }
    }

    /// Regular-channel handler: merge an in-progress vote set, contribute
    /// our own vote, finalize on super-majority.
    fn handle_vote_set(&self, peer_id: Pubkey, remote: FnVoteSet) {
        let now = unix_now();
        let snapshot = self.host.load_state().validators;
        let mut guard = self.state.lock();

        if let Err(e) = remote.is_valid(
            &self.config.chain_id,
            &snapshot,
            self.registry.as_ref(),
            now,
            self.config.vote_set_validity_secs,
        ) {
            error!("dropping invalid vote set from {peer_id}: {e}");
            return;
        }
        // Finalized sets belong on the Maj23 channel.
        if remote.is_maj23(&snapshot) {
            error!("protocol violation by {peer_id}: finalized vote set on the regular channel");
            return;
        }

        let fn_id = remote.fn_id().to_string();
        let mut did_we_contribute = false;
        let mut our_set_changed = false;

        match guard.current_vote_sets.get_mut(&fn_id) {
            Some(local) => match local.merge(&remote, &snapshot) {
                Ok(changed) => {
                    did_we_contribute = changed;
                    our_set_changed = changed;
                }
                Err(e) => {
                    error!("dropping unmergeable vote set from {peer_id} for {fn_id}: {e}");
                    return;
                }
            },
            None => {
                debug!("tracking new round for {fn_id} started by a peer");
                guard.current_vote_sets.insert(fn_id.clone(), remote);
                our_set_changed = true;
            }
        }

        // Contribute our own vote if we are a validator and haven't yet.
        if let Some((our_index, _)) = snapshot.get_by_address(&self.signer.pubkey()) {
            if let Some(local) = guard.current_vote_sets.get_mut(&fn_id) {
                if !local.vote_bitarray.get(our_index) {
                    match self.cast_own_vote(local, &snapshot, our_index) {
                        Ok(()) => {
                            did_we_contribute = true;
                            our_set_changed = true;
                        }
                        Err(e) => error!("abandoning own vote for {fn_id}: {e}"),
                    }
                }
            }
        }

        let finalized = guard
            .current_vote_sets
            .get(&fn_id)
            .map(|set| set.is_maj23(&snapshot))
            .unwrap_or(false);

        let frame = if our_set_changed {
            guard.current_vote_sets.get(&fn_id).and_then(|set| {
                ReactorMessage::VoteSet(set.clone())
                    .encode_framed(self.config.max_message_bytes)
                    .map_err(|e| error!("failed to encode vote set for {fn_id}: {e}"))
                    .ok()
            })
        } else {
            None
        };

        if finalized {
            if let Some(set) = guard.current_vote_sets.remove(&fn_id) {
                self.submit_finalized(&set);
                guard.previous_maj23_vote_sets.insert(fn_id.clone(), set);
            }
        }

        self.persist(&guard);
        drop(guard);

        if let Some(frame) = frame {
            let channel = if finalized {
                MAJ23_CHANNEL_ID
            } else {
                VOTE_SET_CHANNEL_ID
            };
            // A sender we merely merged from already has everything we do.
            let exclude = if did_we_contribute {
                None
            } else {
                Some(peer_id)
            };
            self.broadcast(channel, &frame, exclude.as_ref());
        }
    }

    /// Maj23-channel handler: adopt a finalized set and relay it.
    fn handle_maj23(&self, peer_id: Pubkey, remote: FnVoteSet, msg_bytes: &[u8]) {
        let now = unix_now();
        let snapshot = self.host.load_state().validators;
        let mut guard = self.state.lock();

        if let Err(e) = remote.is_valid(
            &self.config.chain_id,
            &snapshot,
            self.registry.as_ref(),
            now,
            self.config.vote_set_validity_secs,
        ) {
            error!("dropping invalid vote set from {peer_id}: {e}");
            return;
        }
        if !remote.is_maj23(&snapshot) {
            error!("protocol violation by {peer_id}: unfinalized vote set on the Maj23 channel");
            return;
        }

        let fn_id = remote.fn_id().to_string();
        // Our partial set is at best a subset of the finalized one.
        if guard.current_vote_sets.remove(&fn_id).is_some() {
            debug!("dropping local partial set for {fn_id}, superseded by finalized copy");
        }
        guard.previous_maj23_vote_sets.insert(fn_id, remote);
        self.persist(&guard);
        drop(guard);

        // Copy before relaying: the host reuses msg_bytes after we return.
        self.broadcast(MAJ23_CHANNEL_ID, &msg_bytes.to_vec(), Some(&peer_id));
    }

    // ── Proposer tick ───────────────────────────────────────────────────

    /// Long-lived progress routine: sleep to the next interval boundary,
    /// tick, repeat until the quit channel fires.
    fn run_progress_loop(self: Arc<Self>, quit: Receiver<()>) {
        let interval = self.config.progress_interval_secs;
        info!("progress routine started (interval {interval}s)");
        loop {
            let now = unix_now().max(0) as u64;
            let sleep_secs = interval - (now % interval);
            select! {
                recv(quit) -> _ => {
                    info!("progress routine shutting down");
                    return;
                }
                recv(after(Duration::from_secs(sleep_secs))) -> _ => {
                    self.run_progress_tick(unix_now());
                }
            }
        }
    }

    /// One tick: expire stale rounds, then (as proposer) open fresh ones.
    fn run_progress_tick(&self, now: i64) {
        let snapshot = self.host.load_state().validators;
        let our_pubkey = self.signer.pubkey();
        let we_are_proposer = snapshot
            .proposer()
            .map(|v| v.pubkey == our_pubkey)
            .unwrap_or(false);

        let mut fn_ids = self.registry.get_all();
        // Every proposer must walk Fns in the same order.
        fn_ids.sort_unstable();

        let mut eligible: Vec<String> = Vec::new();
        {
            let mut guard = self.state.lock();
            for fn_id in &fn_ids {
                match guard.current_vote_sets.get(fn_id) {
                    Some(set)
                        if set.is_expired(self.config.vote_set_validity_secs, now) =>
                    {
                        info!("round for {fn_id} expired without finalizing");
                        if let Some(set) = guard.current_vote_sets.remove(fn_id) {
                            guard
                                .previous_timed_out_vote_sets
                                .insert(fn_id.clone(), set);
                        }
                        eligible.push(fn_id.clone());
                    }
                    Some(_) => {} // still in flight, leave untouched
                    None => eligible.push(fn_id.clone()),
                }
            }
            self.persist(&guard);
        }

        if !we_are_proposer {
            return;
        }
        let Some((our_index, _)) = snapshot.get_by_address(&our_pubkey) else {
            warn!("elected proposer but absent from the validator roster, skipping proposals");
            return;
        };
        for fn_id in eligible {
            if let Err(e) = self.propose(&fn_id, &snapshot, our_index, now) {
                error!("proposal for {fn_id} failed: {e}");
            }
        }
    }

    /// Open a round for `fn_id`: execute the Fn, build the vote set with
    /// our own vote, install, persist, gossip.
    fn propose(
        &self,
        fn_id: &str,
        snapshot: &ValidatorSet,
        our_index: usize,
        now: i64,
    ) -> Result<()> {
        let f = self
            .registry
            .get(fn_id)
            .ok_or_else(|| ConsensusError::InvalidFnId(fn_id.to_string()))?;

        let ctx = f
            .prepare_context()
            .map_err(|e| ReactorError::FnCallback(e.to_string()))?;
        if ctx.len() > self.config.max_context_bytes {
            return Err(ConsensusError::ContextTooLarge {
                size: ctx.len(),
                max: self.config.max_context_bytes,
            }
            .into());
        }
        let (message, oracle_signature) = f
            .get_message_and_signature(&ctx)
            .map_err(|e| ReactorError::FnCallback(e.to_string()))?;
        let hash = message_digest(&message);
        f.map_message(&ctx, &hash, &message)
            .map_err(|e| ReactorError::FnCallback(e.to_string()))?;

        let mut response = FnExecutionResponse::new(0, "", hash, snapshot.size());
        response.add_signature(our_index, oracle_signature)?;
        let payload = FnVotePayload::new(FnExecutionRequest::new(fn_id), response);
        let vote_set = FnVoteSet::new(
            self.config.chain_id.clone(),
            now,
            our_index,
            ctx,
            payload,
            self.signer.as_ref(),
            snapshot,
        )?;

        // One-of-one roster: our own vote already finalizes the round.
        if vote_set.is_maj23(snapshot) {
            self.submit_finalized(&vote_set);
            return Ok(());
        }

        let frame =
            ReactorMessage::VoteSet(vote_set.clone()).encode_framed(self.config.max_message_bytes)?;
        {
            let mut guard = self.state.lock();
            guard.current_vote_sets.insert(fn_id.to_string(), vote_set);
            self.persist(&guard);
        }
        info!("opened round for {fn_id}, gossiping to peers");
        self.broadcast(VOTE_SET_CHANNEL_ID, &frame, None);
        Ok(())
    }

    // ── Internals ───────────────────────────────────────────────────────

    /// Re-run the Fn over the round's context and cast our vote.
    fn cast_own_vote(
        &self,
        local: &mut FnVoteSet,
        snapshot: &ValidatorSet,
        our_index: usize,
    ) -> Result<()> {
        let f = self
            .registry
            .get(local.fn_id())
            .ok_or_else(|| ConsensusError::InvalidFnId(local.fn_id().to_string()))?;

        let ctx = local.execution_context.clone();
        let (message, oracle_signature) = f
            .get_message_and_signature(&ctx)
            .map_err(|e| ReactorError::FnCallback(e.to_string()))?;
        let hash = message_digest(&message);
        f.map_message(&ctx, &hash, &message)
            .map_err(|e| ReactorError::FnCallback(e.to_string()))?;

        let individual = FnIndividualExecutionResponse {
            status: 0,
            error: String::new(),
            hash,
            oracle_signature,
        };
        local.add_vote(&individual, snapshot, our_index, self.signer.as_ref())?;
        Ok(())
    }

    /// Hand a finalized aggregate back to the application.
    fn submit_finalized(&self, set: &FnVoteSet) {
        let Some(f) = self.registry.get(set.fn_id()) else {
            error!("finalized round for unregistered fn {}", set.fn_id());
            return;
        };
        info!(
            "round for {} finalized with voting power {}",
            set.fn_id(),
            set.total_voting_power
        );
        f.submit_multi_signed_message(
            &set.execution_context,
            &set.payload.response.hash,
            copy_signature_slots(&set.payload.response.oracle_signatures),
        );
    }

    /// Persist under the state mutex; failures are logged, never fatal —
    /// a restart re-derives from the last good snapshot.
    fn persist(&self, state: &ReactorState) {
        if let Err(e) = save_reactor_state(self.store.as_ref(), state) {
            error!("failed to persist reactor state: {e}");
        }
    }

    /// Send `frame` to every connected peer except `exclude`, each send
    /// owning a fresh copy.
    fn broadcast(&self, channel_id: u8, frame: &[u8], exclude: Option<&Pubkey>) {
        let peers = self.peers.read();
        for (id, peer) in peers.iter() {
            if Some(id) == exclude {
                continue;
            }
            if !peer.try_send(channel_id, frame.to_vec()) {
                debug!("send to {id} failed on channel {channel_id:#04x}");
            }
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
