//! An NFS server framework: implement one trait, export it over TCP to
//! stock NFS clients.
//!
//! Two protocol dialects are served from the same socket:
//!
//! - the NFS version 3 read path (RFC 1813), together with the MOUNT and
//!   PORTMAP helpers version 3 clients need to get going
//! - the NFS version 4.0 compound engine (RFC 7530) with the read-side
//!   operation set: PUTROOTFH/PUTFH/LOOKUP navigation, GETFH, GETATTR,
//!   ACCESS, READ, READLINK, and the SAVEFH/RESTOREFH pair
//!
//! ## Components
//!
//! - [vfs]: the backend contract. Implement [vfs::NFSFileSystem] over any
//!   tree-shaped data and the protocol layers do the rest.
//! - [tcp]: the listener. [tcp::NFSTcpListener] binds, accepts, and runs
//!   one task per connection.
//! - [protocol]: XDR structures and the RPC, NFS, MOUNT and PORTMAP
//!   machinery. Mostly internal; the XDR layer is re-exported for tests
//!   and tooling that speak the wire format directly.

pub mod protocol;
mod write_counter;

pub mod tcp;
pub mod vfs;

pub use protocol::xdr;
