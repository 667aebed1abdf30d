//! The NFS program family served on top of the RPC layer.
//!
//! - `v3`: the NFS version 3 procedures from RFC 1813 that a read-only
//!   server answers, one handler per procedure.
//!
//! - `v4`: the NFS version 4.0 COMPOUND engine from RFC 7530. Version 4
//!   has only two procedures; all real work happens inside COMPOUND as a
//!   sequence of operations evaluated against a current filehandle.
//!
//! - `mount`: the MOUNT version 3 protocol. Version 3 clients obtain their
//!   initial file handle here before the first NFS call.
//!
//! - `portmap`: the PORTMAP version 2 protocol, enough for clients that
//!   ask where the NFS program lives before connecting.
//!
//! Version 3 procedures report failure as a status code inside an
//! otherwise successful reply, so their handlers work with
//! [nfsstat](crate::protocol::xdr::nfsstat::nfsstat) directly. The version
//! 4 engine threads [NfsError] through its operation handlers instead; the
//! status travels to the client, the message only to the log.

use std::fmt;

use crate::protocol::xdr::nfsstat::nfsstat;

pub mod mount;
pub mod portmap;
pub mod v3;
pub mod v4;

/// Failure of a single operation, terminating its COMPOUND but not the
/// connection.
#[derive(Clone, Debug)]
pub struct NfsError {
    /// Status code returned to the client.
    pub status: nfsstat,
    /// Operator-facing detail, never sent on the wire.
    pub message: String,
}

impl NfsError {
    pub fn new(status: nfsstat, message: impl Into<String>) -> NfsError {
        NfsError {
            status,
            message: message.into(),
        }
    }
}

impl fmt::Display for NfsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{:?}", self.status)
        } else {
            write!(f, "{:?}: {}", self.status, self.message)
        }
    }
}

impl std::error::Error for NfsError {}

impl From<nfsstat> for NfsError {
    fn from(status: nfsstat) -> NfsError {
        NfsError {
            status,
            message: String::new(),
        }
    }
}
