//! Sync protocol state machine.
//!
//! Each node keeps a state vector of the highest seq it knows for every
//! writer. Receiving another node's vector yields the ranges we are
//! missing, which are fetched entry by entry, and tells us whether the
//! sender is behind, in which case we answer with our own vector.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use rand::Rng;
use tracing::{debug, warn};

use svs_core::{compare, MissingRange, StateVector, WriterId};
use svs_store::{InsertResult, Store, StoreExt};

use crate::error::{Result, SyncError};
use crate::messages::SyncInterest;
use crate::transport::{Fetcher, Transport};

/// Configuration for sync behavior.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// How long `sync_once` waits for the next interest before ending the round.
    pub message_timeout: Duration,
    /// Base period between periodic sync rounds.
    pub sync_interval: Duration,
    /// Fraction of `sync_interval` to randomize by, in `0.0..=1.0`.
    pub sync_jitter: f64,
    /// Upper bound on interests handled in one round.
    pub max_interests_per_round: usize,
    /// Whether fetched entries are written to the local store.
    pub store_fetched: bool,
    /// Upper bound on fetches attempted for one interest.
    pub max_fetches_per_interest: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            message_timeout: Duration::from_millis(100),
            sync_interval: Duration::from_secs(30),
            sync_jitter: 0.1,
            max_interests_per_round: 64,
            store_fetched: true,
            max_fetches_per_interest: 4096,
        }
    }
}

/// An entry retrieved from another node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedEntry {
    pub writer: WriterId,
    pub seq: u64,
    pub payload: Bytes,
}

/// What a round of sync did.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Interests taken off the transport (including dropped ones).
    pub interests_received: usize,
    /// Interests whose vector was malformed or oversized.
    pub interests_dropped: usize,
    /// Entries fetched, in fetch order.
    pub fetched: Vec<FetchedEntry>,
    /// Spans no reachable node could provide. Consecutive misses share a range.
    pub unavailable: Vec<MissingRange>,
    /// Number of fetch walks cut short by a fetcher error.
    pub fetch_errors: usize,
    /// Ranges left unfetched because of a fetcher error or the fetch budget.
    pub aborted: Vec<MissingRange>,
    /// Whether we answered an outdated sender with our vector.
    pub replied: bool,
}

impl SyncReport {
    /// Fold another report into this one.
    pub fn absorb(&mut self, other: SyncReport) {
        self.interests_received += other.interests_received;
        self.interests_dropped += other.interests_dropped;
        self.fetched.extend(other.fetched);
        self.unavailable.extend(other.unavailable);
        self.fetch_errors += other.fetch_errors;
        self.aborted.extend(other.aborted);
        self.replied |= other.replied;
    }

    /// Number of entries fetched.
    pub fn fetched_count(&self) -> usize {
        self.fetched.len()
    }

    /// Whether every missing entry was retrieved.
    pub fn is_complete(&self) -> bool {
        self.unavailable.is_empty() && self.aborted.is_empty()
    }
}

/// Sync session state for one writer.
pub struct SyncSession<S: Store, T: Transport, F: Fetcher> {
    /// The local store.
    store: Arc<S>,
    /// The transport layer.
    transport: T,
    /// Where missing entries come from.
    fetcher: F,
    /// Configuration.
    config: SyncConfig,
    /// Our writer id, taken from the transport.
    writer: WriterId,
    /// Highest known seq per writer.
    state: StateVector,
}

impl<S: Store, T: Transport, F: Fetcher> SyncSession<S, T, F> {
    /// Create a new sync session with an empty state vector.
    pub fn new(store: Arc<S>, transport: T, fetcher: F, config: SyncConfig) -> Self {
        let writer = transport.local_writer();
        Self {
            store,
            transport,
            fetcher,
            config,
            writer,
            state: StateVector::new(),
        }
    }

    /// Raise the state vector to what the store already holds.
    pub async fn restore(&mut self) -> Result<()> {
        let stored = self.store.load_state_vector().await?;
        if self.state.merge(&stored) {
            debug!(writers = self.state.len(), "restored state vector from store");
        }
        Ok(())
    }

    /// The current state vector.
    pub fn state_vector(&self) -> &StateVector {
        &self.state
    }

    /// Our writer id.
    pub fn writer(&self) -> &WriterId {
        &self.writer
    }

    /// The local store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The active configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Append `payload` to our own log and announce it.
    ///
    /// Returns the seq assigned to the entry.
    pub async fn publish(&mut self, payload: &[u8]) -> Result<u64> {
        let seq = self
            .state
            .get(&self.writer)
            .checked_add(1)
            .ok_or_else(|| SyncError::SequenceExhausted {
                writer: self.writer.clone(),
            })?;

        if let InsertResult::Conflict { .. } =
            self.store.insert_entry(&self.writer, seq, payload).await?
        {
            return Err(SyncError::SequenceConflict {
                writer: self.writer.clone(),
                seq,
            });
        }

        self.state.set(self.writer.clone(), seq);
        debug!(writer = %self.writer, seq, "published entry");

        self.broadcast_state().await?;
        Ok(seq)
    }

    /// Send our state vector to the group.
    pub async fn broadcast_state(&self) -> Result<()> {
        let interest = SyncInterest::new(self.writer.clone(), &self.state);
        interest
            .validate_limits()
            .map_err(|e| SyncError::InvalidMessage(e.into()))?;
        self.transport.broadcast(interest).await
    }

    /// Process one received interest.
    ///
    /// The local vector is raised to the sender's for every writer it is
    /// ahead on before any fetch happens, so a later interest does not
    /// trigger the same fetches again.
    pub async fn handle_interest(&mut self, interest: &SyncInterest) -> Result<SyncReport> {
        let mut report = SyncReport {
            interests_received: 1,
            ..SyncReport::default()
        };

        if let Err(e) = interest.validate_limits() {
            warn!(sender = %interest.sender, bytes = interest.vector.len(), "dropping oversized state vector");
            return Err(SyncError::InvalidMessage(e.into()));
        }
        let remote = match interest.state_vector() {
            Ok(remote) => remote,
            Err(e) => {
                warn!(sender = %interest.sender, error = %e, "dropping malformed state vector");
                return Err(e.into());
            }
        };

        let comparison = compare(&self.state, &remote);

        for range in &comparison.missing {
            self.state.set(range.writer.clone(), range.high);
        }

        if !comparison.missing.is_empty() {
            debug!(
                sender = %interest.sender,
                entries = comparison.missing_count(),
                "fetching missing entries"
            );
            self.fetch_missing(&comparison.missing, &mut report).await?;
        }

        if comparison.remote_outdated {
            self.broadcast_state().await?;
            report.replied = true;
        }

        Ok(report)
    }

    /// Fetch every seq in `ranges`, in order.
    ///
    /// A fetcher error, or running through `max_fetches_per_interest`,
    /// stops the walk; the rest of the current range and all later ranges
    /// are recorded in `report.aborted`. Store failures are returned.
    pub async fn fetch_missing(
        &self,
        ranges: &[MissingRange],
        report: &mut SyncReport,
    ) -> Result<()> {
        let mut budget = self.config.max_fetches_per_interest;
        for (index, range) in ranges.iter().enumerate() {
            for seq in range.seqs() {
                if budget == 0 {
                    debug!(writer = %range.writer, seq, "fetch budget spent, deferring rest");
                    report
                        .aborted
                        .push(MissingRange::new(range.writer.clone(), seq, range.high));
                    report.aborted.extend(ranges[index + 1..].iter().cloned());
                    return Ok(());
                }
                budget -= 1;

                match self.fetcher.fetch(&range.writer, seq).await {
                    Ok(Some(payload)) => {
                        if self.config.store_fetched {
                            self.store_fetched(&range.writer, seq, &payload).await?;
                        }
                        report.fetched.push(FetchedEntry {
                            writer: range.writer.clone(),
                            seq,
                            payload,
                        });
                    }
                    Ok(None) => {
                        debug!(writer = %range.writer, seq, "entry unavailable");
                        record_unavailable(&mut report.unavailable, &range.writer, seq);
                    }
                    Err(e) => {
                        warn!(writer = %range.writer, seq, error = %e, "fetch failed, stopping");
                        report.fetch_errors += 1;
                        report
                            .aborted
                            .push(MissingRange::new(range.writer.clone(), seq, range.high));
                        report.aborted.extend(ranges[index + 1..].iter().cloned());
                        return Ok(());
                    }
                }
            }
        }
        Ok(())
    }

    async fn store_fetched(&self, writer: &WriterId, seq: u64, payload: &[u8]) -> Result<()> {
        if let InsertResult::Conflict { .. } = self.store.insert_entry(writer, seq, payload).await? {
            warn!(%writer, seq, "fetched entry conflicts with stored one, keeping stored");
        }
        Ok(())
    }

    /// Run one sync round.
    ///
    /// Broadcasts our vector, then handles interests until none arrives
    /// within `message_timeout` or `max_interests_per_round` is reached.
    /// Malformed interests are counted and skipped.
    pub async fn sync_once(&mut self) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        self.broadcast_state().await?;

        while report.interests_received < self.config.max_interests_per_round {
            let Some(interest) = self
                .transport
                .recv_timeout(self.config.message_timeout)
                .await?
            else {
                break;
            };

            if interest.sender == self.writer {
                continue;
            }

            match self.handle_interest(&interest).await {
                Ok(handled) => report.absorb(handled),
                Err(e) if e.is_message_error() => {
                    report.interests_received += 1;
                    report.interests_dropped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        debug!(
            writer = %self.writer,
            received = report.interests_received,
            fetched = report.fetched_count(),
            "sync round complete"
        );
        Ok(report)
    }

    /// Delay until the next periodic round: `sync_interval` randomized by
    /// `sync_jitter` in either direction.
    pub fn next_sync_delay(&self) -> Duration {
        let base = self.config.sync_interval.as_secs_f64();
        let spread = base * self.config.sync_jitter.clamp(0.0, 1.0);
        if spread <= 0.0 {
            return self.config.sync_interval;
        }
        let offset = rand::thread_rng().gen_range(-spread..=spread);
        Duration::from_secs_f64((base + offset).max(0.0))
    }
}

/// Extend the last span when `seq` directly follows it.
fn record_unavailable(spans: &mut Vec<MissingRange>, writer: &WriterId, seq: u64) {
    if let Some(last) = spans.last_mut() {
        if &last.writer == writer && last.high.checked_add(1) == Some(seq) {
            last.high = seq;
            return;
        }
    }
    spans.push(MissingRange::new(writer.clone(), seq, seq));
}
