// In crates/engine/src/lib.rs

pub mod error;
pub mod format;
pub mod ledger;
pub mod recorder;
pub mod resolver;

use crate::ledger::Ledger;
use crate::recorder::OutcomeRecorder;
use anyhow::Result;
use api_client::BybitClient;
use app_config::Settings;
use chrono::Utc;
use core_types::{Symbol, Timeframe, TrackedPosition};
use events::{CycleSummary, WsMessage};
use notifier::Notify;
use rust_decimal::prelude::ToPrimitive;
use signals::DuplicateSuppressor;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use store::Repository;
use tokio::sync::{broadcast, watch};

pub use error::Error;

/// The polling orchestrator: one classify-all then resolve-all sweep per
/// cycle, cycles separated by a fixed wait.
///
/// All ledger and stats mutation happens inside a cycle on this single task;
/// the web server only ever reads the persisted documents.
pub struct Engine {
    settings: Settings,
    client: BybitClient,
    repository: Repository,
    recorder: OutcomeRecorder,
    notifier: Arc<dyn Notify>,
    ws_tx: broadcast::Sender<WsMessage>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Engine {
    pub fn new(
        settings: Settings,
        client: BybitClient,
        repository: Repository,
        notifier: Arc<dyn Notify>,
        ws_tx: broadcast::Sender<WsMessage>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            settings,
            client,
            repository,
            recorder: OutcomeRecorder::new(notifier.clone()),
            notifier,
            ws_tx,
            shutdown_rx,
        }
    }

    /// The main, long-running polling loop.
    ///
    /// A shutdown request aborts the wait between cycles promptly; an
    /// in-flight cycle finishes its current symbol first and stops at the
    /// next safe point.
    pub async fn run(mut self) -> Result<()> {
        tracing::info!("Starting signal engine.");

        // The supported-pair set only changes when the exchange lists or
        // delists, so one fetch at startup is enough. An empty set disables
        // the filter rather than blocking the engine.
        let supported = match self.client.get_supported_pairs().await {
            Ok(pairs) => pairs,
            Err(error) => {
                tracing::warn!(%error, "could not fetch supported pairs, scanning unfiltered");
                HashSet::new()
            }
        };
        tracing::info!(count = supported.len(), "supported pairs loaded");

        loop {
            self.run_cycle(&supported).await;

            if self.stop_requested() {
                break;
            }
            let wait = Duration::from_secs(self.settings.engine.poll_interval_secs);
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = self.shutdown_rx.changed() => {}
            }
            if self.stop_requested() {
                break;
            }
        }

        tracing::info!("Signal engine stopped.");
        Ok(())
    }

    fn stop_requested(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// One full sweep: classify the universe, then resolve every open
    /// position, then persist the resulting state.
    async fn run_cycle(&self, supported: &HashSet<String>) {
        let cycle_started = Instant::now();

        let cooldown = chrono::Duration::hours(self.settings.engine.cooldown_hours);
        let mut suppressor =
            DuplicateSuppressor::from_history(self.repository.load_last_signals(), cooldown);
        let mut ledger = Ledger::load(self.repository.load_positions());
        let mut stats = self.repository.load_stats();

        let universe = match self
            .client
            .get_top_pairs(self.settings.engine.universe_size)
            .await
        {
            Ok(pairs) => pairs,
            Err(error) => {
                tracing::error!(%error, "universe discovery failed, resolving open positions only");
                Vec::new()
            }
        };

        let mut signal_counts: BTreeMap<Timeframe, u32> =
            Timeframe::ALL.iter().map(|tf| (*tf, 0)).collect();
        let mut scanned = 0usize;

        for pair in &universe {
            // Safe point: never start a new symbol once a stop is requested.
            if self.stop_requested() {
                tracing::info!("stop requested, abandoning the rest of the sweep");
                break;
            }
            if !supported.is_empty() && !supported.contains(&pair.symbol) {
                tracing::debug!(symbol = %pair.symbol, "skipping: not tradable in this category");
                continue;
            }

            let symbol = Symbol(pair.symbol.clone());
            self.scan_symbol(&symbol, &mut suppressor, &mut ledger, &mut signal_counts)
                .await;
            scanned += 1;
        }

        // Resolution sweep runs over every open position, including ones
        // opened earlier in this same cycle.
        let mut retained = Vec::with_capacity(ledger.len());
        for position in ledger.snapshot() {
            let latest = match self
                .client
                .get_latest_price(&position.symbol, position.timeframe)
                .await
            {
                Ok(price) => price.to_f64(),
                Err(error) => {
                    tracing::warn!(symbol = %position.symbol, timeframe = %position.timeframe, %error, "latest price unavailable");
                    None
                }
            };

            let now = Utc::now();
            let resolution = resolver::resolve(position, latest, now);
            if resolution.still_open {
                let _ = self.ws_tx.send(WsMessage::PositionUpdate(resolution.position.clone()));
                retained.push(resolution.position);
            } else {
                let mut position = resolution.position;
                if self.recorder.record(&mut position, &mut stats, now).await {
                    if let Err(error) = self.repository.save_stats(&stats) {
                        tracing::error!(%error, "failed to persist win/loss stats");
                    }
                }
                let _ = self.ws_tx.send(WsMessage::PositionResolved(position));
            }
        }
        ledger.replace_all(retained);

        if let Err(error) = self.repository.save_positions(&ledger.snapshot()) {
            tracing::error!(%error, "failed to persist open positions");
        }
        if let Err(error) = self.repository.save_last_signals(suppressor.history()) {
            tracing::error!(%error, "failed to persist signal history");
        }

        let _ = self.ws_tx.send(WsMessage::CycleSummary(CycleSummary {
            finished_at: Utc::now(),
            scanned_symbols: scanned,
            new_signals: signal_counts.clone(),
            open_positions: ledger.len(),
        }));

        tracing::info!(
            elapsed = ?cycle_started.elapsed(),
            scanned,
            open = ledger.len(),
            ?signal_counts,
            "cycle complete"
        );
    }

    /// Classifies one symbol across every timeframe and opens positions for
    /// accepted signals.
    async fn scan_symbol(
        &self,
        symbol: &Symbol,
        suppressor: &mut DuplicateSuppressor,
        ledger: &mut Ledger,
        signal_counts: &mut BTreeMap<Timeframe, u32>,
    ) {
        for timeframe in Timeframe::ALL {
            let bars = match self.client.get_klines(symbol, timeframe).await {
                Ok(bars) => bars,
                Err(error) => {
                    tracing::debug!(symbol = %symbol, timeframe = %timeframe, %error, "no data this cycle");
                    continue;
                }
            };

            let snapshot = match indicators::compute(&bars, &self.settings.indicators) {
                Ok(snapshot) => snapshot,
                Err(error) => {
                    tracing::debug!(symbol = %symbol, timeframe = %timeframe, %error, "snapshot unavailable");
                    continue;
                }
            };

            let decision =
                match signals::classify(&snapshot, timeframe, &self.settings.classifier) {
                    Ok(decision) => decision,
                    Err(error) => {
                        tracing::warn!(symbol = %symbol, timeframe = %timeframe, %error, "classification failed");
                        continue;
                    }
                };

            let (Some(entry), Some(tp), Some(sl)) = (decision.entry, decision.tp, decision.sl)
            else {
                continue;
            };

            // Both guards must pass: cooldown re-fire and one-open-position
            // per key protect different invariants.
            let now = Utc::now();
            if suppressor.is_duplicate(symbol, timeframe, decision.kind, now) {
                tracing::info!(symbol = %symbol, timeframe = %timeframe, kind = %decision.kind, "skipping duplicate signal");
                continue;
            }
            if ledger.contains(symbol, timeframe) {
                tracing::info!(symbol = %symbol, timeframe = %timeframe, "skipping: position already tracked");
                continue;
            }

            let position = TrackedPosition {
                symbol: symbol.clone(),
                timeframe,
                kind: decision.kind,
                entry,
                tp,
                sl,
                current_price: snapshot.close,
                change_pct: 0.0,
                status: core_types::PositionStatus::Tracking,
                opened_at: now,
                notified: false,
                duration: None,
            };

            if let Err(error) = ledger.add(position.clone()) {
                tracing::warn!(%error, "ledger rejected a pre-checked position");
                continue;
            }
            suppressor.record(symbol, timeframe, decision.kind, now);

            if let Err(error) = self.notifier.send(&format::new_signal_message(&position)).await {
                tracing::warn!(sink = self.notifier.name(), %error, "new-signal notification failed");
            }

            tracing::info!(
                symbol = %symbol,
                timeframe = %timeframe,
                kind = %position.kind,
                entry = position.entry,
                tp = position.tp,
                sl = position.sl,
                "new signal accepted"
            );
            let _ = self.ws_tx.send(WsMessage::NewSignal(position));
            *signal_counts.entry(timeframe).or_default() += 1;
        }
    }
}
