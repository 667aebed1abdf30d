//! XDR structures of the MOUNT protocol, version 3 (RFC 1813 Appendix I).
//!
//! MOUNT is the doorway into NFS version 3: it turns an export path into the
//! root filehandle that all further version 3 calls build on. Version 4
//! clients never come here; their root is one PUTROOTFH away.

#![allow(dead_code)]
#![allow(non_camel_case_types)]

use std::io::{Read, Write};

use num_derive::{FromPrimitive, ToPrimitive};

use super::*;

/// RPC program number of the MOUNT service.
pub const PROGRAM: u32 = 100005;
/// Protocol version this module models.
pub const VERSION: u32 = 3;

/// Maximum bytes in a path name.
pub const MNTPATHLEN: u32 = 1024;
/// Maximum bytes in a name.
pub const MNTNAMLEN: u32 = 255;
/// Maximum bytes in a version 3 file handle.
pub const FHSIZE3: u32 = 64;

/// Same bytes as an `nfs_fh3`, but MOUNT frames it as a plain opaque.
pub type fhandle3 = Vec<u8>;
/// Directory path on the server.
pub type dirpath = Vec<u8>;
/// Host or group name in an export list.
pub type name = Vec<u8>;

/// Status codes of MOUNT operations. A separate domain from [nfsstat]; the
/// overlap in values is deliberate in the RFC.
///
/// [nfsstat]: super::nfsstat::nfsstat
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum mountstat3 {
    #[default]
    MNT3_OK = 0,
    /// Not owner
    MNT3ERR_PERM = 1,
    /// No such file or directory
    MNT3ERR_NOENT = 2,
    /// I/O error
    MNT3ERR_IO = 5,
    /// Permission denied
    MNT3ERR_ACCES = 13,
    /// Not a directory
    MNT3ERR_NOTDIR = 20,
    /// Invalid argument
    MNT3ERR_INVAL = 22,
    /// Path name too long
    MNT3ERR_NAMETOOLONG = 63,
    /// Operation not supported
    MNT3ERR_NOTSUPP = 10004,
    /// A failure on the server
    MNT3ERR_SERVERFAULT = 10006,
}
impl SerializeEnum for mountstat3 {}
impl DeserializeEnum for mountstat3 {}

/// Success body of MNT: the root filehandle of the export and the
/// authentication flavors the server accepts on it.
#[derive(Clone, Debug, Default)]
pub struct mountres3_ok {
    pub fhandle: fhandle3,
    pub auth_flavors: Vec<u32>,
}
DeserializeStruct!(mountres3_ok, fhandle, auth_flavors);
SerializeStruct!(mountres3_ok, fhandle, auth_flavors);

/// Procedure numbers of the MOUNT version 3 program.
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, FromPrimitive, ToPrimitive)]
pub enum MountProgram {
    MOUNTPROC3_NULL = 0,
    MOUNTPROC3_MNT = 1,
    MOUNTPROC3_DUMP = 2,
    MOUNTPROC3_UMNT = 3,
    MOUNTPROC3_UMNTALL = 4,
    MOUNTPROC3_EXPORT = 5,
    INVALID,
}
impl SerializeEnum for MountProgram {}
impl DeserializeEnum for MountProgram {}
