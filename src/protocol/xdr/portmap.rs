//! XDR structures of the port mapper protocol, version 2 (RFC 1833).
//!
//! Clients that insist on service discovery ask the port mapper where a
//! program listens. This server answers for itself only; it keeps no
//! registration table.

#![allow(dead_code)]
#![allow(non_camel_case_types)]

use std::io::{Read, Write};

use num_derive::{FromPrimitive, ToPrimitive};

use super::*;

/// RPC program number of the port mapper.
pub const PROGRAM: u32 = 100000;
/// Protocol version this module models.
pub const VERSION: u32 = 2;

/// Protocol number for TCP.
pub const IPPROTO_TCP: u32 = 6;
/// Protocol number for UDP.
pub const IPPROTO_UDP: u32 = 17;

/// One (program, version, transport) to port mapping.
#[derive(Copy, Clone, Debug, Default)]
pub struct mapping {
    pub prog: u32,
    pub vers: u32,
    /// One of the `IPPROTO_*` constants.
    pub prot: u32,
    pub port: u32,
}
DeserializeStruct!(mapping, prog, vers, prot, port);
SerializeStruct!(mapping, prog, vers, prot, port);

/// Procedure numbers of the port mapper program.
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, FromPrimitive, ToPrimitive)]
pub enum PortmapProgram {
    PMAPPROC_NULL = 0,
    PMAPPROC_SET = 1,
    PMAPPROC_UNSET = 2,
    PMAPPROC_GETPORT = 3,
    PMAPPROC_DUMP = 4,
    PMAPPROC_CALLIT = 5,
    INVALID,
}
impl SerializeEnum for PortmapProgram {}
impl DeserializeEnum for PortmapProgram {}
