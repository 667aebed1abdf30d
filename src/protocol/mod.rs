//! The wire side of the server, in three layers:
//!
//! - [xdr]: External Data Representation serialization (RFC 4506) and the
//!   message structures of every protocol spoken here.
//! - [rpc]: ONC RPC version 2 transport (RFC 5531): record framing, call
//!   dispatch, ordered replies, retransmission tracking.
//! - [nfs]: the procedure and operation handlers for NFS versions 3 and 4,
//!   MOUNT, and PORTMAP, all running against [crate::vfs].

pub mod nfs;
pub mod rpc;
pub mod xdr;
