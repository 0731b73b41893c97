//! The waiting slot and its fallback timer.

use std::time::Duration;

use dropfour_protocol::{ConnectionId, ParticipantId, ServerMessage};
use dropfour_timer::Deferred;
use tokio::sync::mpsc;

/// Channel for pushing server messages to one player's writer task.
pub type OutboundTx = mpsc::UnboundedSender<ServerMessage>;

/// A player waiting for an opponent.
///
/// Tickets exist before any game does, so they carry everything the
/// game layer needs to seat the player: identity, display name, the
/// connection the join arrived on, and the outbound channel.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub id: ParticipantId,
    pub username: String,
    pub conn: ConnectionId,
    pub tx: OutboundTx,
}

/// What happened to a `join`.
#[derive(Debug)]
pub enum Enqueued {
    /// An opponent was already waiting. `first` is the player who
    /// waited and takes the first seat, so waiting is rewarded with the
    /// opening move.
    Matched { first: Ticket, second: Ticket },

    /// No opponent available; the ticket is parked and the fallback
    /// timer armed.
    Waiting,
}

struct QueueEntry {
    ticket: Ticket,
    fallback: Deferred,
}

/// The single-slot matchmaking queue.
///
/// Not internally synchronized: the server wraps it in a mutex taken
/// only for the short, synchronous calls here. Fallback fires arrive on
/// a channel instead of running under that lock.
pub struct MatchQueue {
    slot: Option<QueueEntry>,
    fallback_after: Duration,
    fallback_tx: mpsc::UnboundedSender<ParticipantId>,
}

impl MatchQueue {
    /// Creates the queue and the channel its fallback timers report on.
    ///
    /// The receiver yields the `ParticipantId` of a player whose wait
    /// timed out. Ids on this channel may be stale; always claim via
    /// [`take_if_waiting`](Self::take_if_waiting).
    pub fn new(fallback_after: Duration) -> (Self, mpsc::UnboundedReceiver<ParticipantId>) {
        let (fallback_tx, fallback_rx) = mpsc::unbounded_channel();
        (
            Self {
                slot: None,
                fallback_after,
                fallback_tx,
            },
            fallback_rx,
        )
    }

    /// Admits a player: pairs them with the waiting one, or parks them.
    ///
    /// A second `join` from the connection already waiting replaces its
    /// own ticket and re-arms the timer instead of pairing the player
    /// against themself.
    pub fn enqueue(&mut self, ticket: Ticket) -> Enqueued {
        if let Some(entry) = &self.slot {
            if entry.ticket.conn == ticket.conn {
                tracing::debug!(
                    participant = %ticket.id,
                    "duplicate join from waiting connection, refreshing slot"
                );
                if let Some(stale) = self.slot.take() {
                    stale.fallback.cancel();
                }
                self.park(ticket);
                return Enqueued::Waiting;
            }
        }

        match self.slot.take() {
            Some(entry) => {
                entry.fallback.cancel();
                tracing::info!(
                    first = %entry.ticket.id,
                    second = %ticket.id,
                    "opponents matched"
                );
                Enqueued::Matched {
                    first: entry.ticket,
                    second: ticket,
                }
            }
            None => {
                self.park(ticket);
                Enqueued::Waiting
            }
        }
    }

    /// Claims the waiting ticket, but only if `id` is still the one
    /// waiting. This is the liveness check for fallback fires: a stale
    /// id (already matched, withdrawn, or replaced) yields `None`.
    pub fn take_if_waiting(&mut self, id: ParticipantId) -> Option<Ticket> {
        if self.slot.as_ref().is_some_and(|e| e.ticket.id == id) {
            let entry = self.slot.take()?;
            entry.fallback.cancel();
            return Some(entry.ticket);
        }
        None
    }

    /// Removes the waiting ticket when its connection goes away, so an
    /// abandoned wait can't turn into a ghost bot game later.
    pub fn withdraw(&mut self, conn: ConnectionId) -> Option<Ticket> {
        if self.slot.as_ref().is_some_and(|e| e.ticket.conn == conn) {
            let entry = self.slot.take()?;
            entry.fallback.cancel();
            tracing::info!(participant = %entry.ticket.id, "waiting player withdrew");
            return Some(entry.ticket);
        }
        None
    }

    /// The id of the currently waiting player, if any.
    pub fn waiting(&self) -> Option<ParticipantId> {
        self.slot.as_ref().map(|e| e.ticket.id)
    }

    fn park(&mut self, ticket: Ticket) {
        let id = ticket.id;
        let tx = self.fallback_tx.clone();
        let fallback = Deferred::spawn(self.fallback_after, async move {
            // Receiver gone means the server is shutting down.
            let _ = tx.send(id);
        });
        tracing::info!(
            participant = %id,
            username = %ticket.username,
            fallback_ms = self.fallback_after.as_millis() as u64,
            "waiting for opponent"
        );
        self.slot = Some(QueueEntry { ticket, fallback });
    }
}

// =========================================================================
// Tests
// =========================================================================
