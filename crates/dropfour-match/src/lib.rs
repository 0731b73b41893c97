//! Matchmaking for dropfour.
//!
//! The queue is a single slot: the first `join` parks a [`Ticket`] in
//! it, the next compatible `join` empties it and both players are handed
//! to the game layer as a pair. A player left waiting past the fallback
//! timeout gets paired with the automated opponent instead.
//!
//! # Who decides what
//!
//! The queue never creates games. Pairing outcomes ([`Enqueued`]) and
//! fallback fires (participant ids on the channel returned by
//! [`MatchQueue::new`]) are handed to the server's coordinator, which
//! owns game creation. A fallback fire is a proposal: by the time the
//! consumer sees the id, the player may have been paired or may have
//! hung up, so the consumer must claim the ticket with
//! [`MatchQueue::take_if_waiting`] under the queue lock and treat `None`
//! as "already handled".

mod queue;

pub use queue::{Enqueued, MatchQueue, OutboundTx, Ticket};
