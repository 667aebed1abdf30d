//! ONC RPC version 2 transport layer, RFC 5531.
//!
//! Everything between the TCP socket and the protocol handlers lives here:
//!
//! 1. Record-marked framing and message reassembly ([RecordParser],
//!    [write_fragments])
//! 2. Per-connection dispatch of calls to the NFS, MOUNT and PORTMAP
//!    handlers ([SocketMessageHandler])
//! 3. FIFO command execution so replies leave in call order
//! 4. AUTH_UNIX credential handling
//! 5. Retransmission detection ([TransactionTracker])
//!
//! The layer answers protocol-level refusals itself (unknown programs,
//! version mismatches, rejected credentials); handlers only ever see calls
//! addressed to a program and version this server speaks.

mod command_queue;
mod context;
mod record;
mod transaction_tracker;
mod wire;

pub use context::Context;
pub use record::{write_fragments, RecordParser};
pub use transaction_tracker::TransactionTracker;
pub use wire::{SocketMessageHandler, SocketMessageType};
