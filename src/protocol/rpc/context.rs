//! Per-connection state threaded through every request handler.
//!
//! A [Context] is built when a client connects and cloned into each queued
//! command, so handlers for NFS, MOUNT and PORTMAP all see the same view of
//! the connection: who the caller is, which file system they operate on,
//! and the shared bookkeeping used to spot retransmissions.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::protocol::xdr;
use crate::vfs;

/// Everything a protocol handler needs besides the decoded call itself.
///
/// Cloning is cheap; the heavyweight members sit behind [Arc]. The `auth`
/// field is the one mutable-ish part: the RPC layer overwrites it with the
/// credential decoded from each AUTH_UNIX call before dispatching, so a
/// handler always sees the identity that came with its own call.
#[derive(Clone)]
pub struct Context {
    /// Port the listener bound. PORTMAP reports it for every program
    /// served here.
    pub local_port: u16,

    /// Peer address as `ip:port`. Part of the retransmission key and
    /// present in most log lines about this connection.
    pub client_addr: String,

    /// Identity from the call's AUTH_UNIX credential, or the default when
    /// the call carried none.
    pub auth: xdr::rpc::auth_unix,

    /// File system all NFS and MOUNT operations run against.
    pub vfs: Arc<dyn vfs::NFSFileSystem + Send + Sync>,

    /// Receives `true` on MNT and `false` on UMNT/UMNTALL when the
    /// embedding application asked to observe mount activity.
    pub mount_signal: Option<mpsc::Sender<bool>>,

    /// Export path clients are expected to name in MNT requests.
    pub export_name: Arc<String>,

    /// Shared record of seen transaction ids, used to drop duplicates.
    pub transaction_tracker: Arc<super::TransactionTracker>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("rpc::Context")
            .field("local_port", &self.local_port)
            .field("client_addr", &self.client_addr)
            .field("auth", &self.auth)
            .finish()
    }
}
