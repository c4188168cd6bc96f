//! Round watchdog: warn stalled bettors, then force their losses.
//!
//! One watchdog is spawned per round, immediately after the banker's
//! hand is recorded, carrying the epoch it was armed for. Each wake
//! re-acquires the room lock and compares epochs: a mismatch means the
//! round already settled (or the session closed) and the task simply
//! exits. No watchdog is ever cancelled explicitly.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::config::TimerConfig;
use crate::metrics::EngineMetrics;
use crate::outbound::{self, MentionBuilder};
use crate::room::Room;
use crate::session::SettleReason;
use crate::settlement;
use crate::traits::Notifier;

pub(crate) fn arm_round_watchdog(
    room: Arc<Mutex<Room>>,
    room_id: String,
    epoch: u64,
    config: TimerConfig,
    notifier: Arc<dyn Notifier>,
    metrics: Arc<EngineMetrics>,
) {
    tokio::spawn(async move {
        tracing::debug!(room = %room_id, epoch, "round watchdog armed");
        sleep(Duration::from_millis(config.grace_ms)).await;

        // First wake: warn whoever is still missing, if the round is
        // still the one we were armed for.
        let laggards: Vec<(String, String)> = {
            let guard = room.lock().await;
            if guard.session.round_epoch != epoch || !guard.session.is_open() {
                tracing::debug!(room = %room_id, epoch, "watchdog stale at warning");
                return;
            }
            guard
                .session
                .missing_bettors()
                .into_iter()
                .map(|bet| (bet.player_id.clone(), bet.display_name.clone()))
                .collect()
        };
        if laggards.is_empty() {
            return;
        }

        let mut builder = MentionBuilder::new().say("Still waiting on ");
        for (i, (player_id, name)) in laggards.iter().enumerate() {
            if i > 0 {
                builder = builder.say(", ");
            }
            builder = builder.mention(name, player_id);
        }
        builder = builder.say(". Play now or forfeit your bet.");
        if let Err(e) = notifier.push(&room_id, vec![builder.build()]).await {
            tracing::warn!(room = %room_id, error = %e, "warning push failed");
        }

        sleep(Duration::from_millis(config.final_call_ms)).await;

        // Second wake: charge whoever is still missing and settle.
        let settled = {
            let mut guard = room.lock().await;
            if guard.session.round_epoch != epoch || !guard.session.is_open() {
                tracing::debug!(room = %room_id, epoch, "watchdog stale at final call");
                return;
            }
            let charged =
                settlement::charge_missing(&mut guard.session, SettleReason::TimedOut);
            if charged.is_empty() {
                // Everyone played during the final call but the round
                // has not advanced: nothing to force.
                return;
            }
            let settlement = settlement::settle_round(&mut guard.session);
            metrics.record_timeouts(charged.len() as u64);
            metrics.record_round_settled();
            (charged, settlement)
        };

        let (charged, settlement) = settled;
        let mut entries = charged;
        entries.extend(settlement.entries);
        let announcement = outbound::settlement_message(&entries, &settlement.pushes);
        if let Err(e) = notifier.push(&room_id, vec![announcement]).await {
            tracing::warn!(room = %room_id, error = %e, "settlement push failed");
        }
    });
}
