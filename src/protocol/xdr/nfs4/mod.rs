//! XDR types and constants for NFS version 4.0 (RFC 7530).
//!
//! Version 4 folds the whole protocol into one COMPOUND procedure carrying a
//! sequence of operations. The argument and result unions for the operations
//! this server registers live in [ops]; this module holds the protocol
//! constants, the attribute machinery, and the compound framing itself.

#![allow(dead_code)]
// RFC 7530 type names are kept verbatim, lower case and all.
#![allow(non_camel_case_types)]

use std::io::{Read, Write};

use num_derive::{FromPrimitive, ToPrimitive};

use crate::{DeserializeStruct, SerializeStruct};

use super::nfsstat::nfsstat;
use super::{deserialize, Deserialize, DeserializeEnum, Serialize, SerializeEnum, UsizeAsU32};

pub mod ops;

use ops::nfs_argop4;
use ops::nfs_resop4;

/// Protocol version this module models. The program number is shared with
/// version 3.
pub const VERSION: u32 = 4;

/// Procedure numbers of the version 4 program. COMPOUND is the entire
/// protocol; there is no third procedure.
pub const NFSPROC4_NULL: u32 = 0;
pub const NFSPROC4_COMPOUND: u32 = 1;

/// Maximum size in bytes of a version 4 file handle.
pub const NFS4_FHSIZE: u32 = 128;

/// Size in bytes of a verifier.
pub const NFS4_VERIFIER_SIZE: u32 = 8;

/// Ceiling on operations in one compound. A request announcing more is
/// answered with `NFSERR_RESOURCE` instead of being decoded.
pub const MAX_OPS_PER_COMPOUND: usize = 128;

/// Lease time in seconds advertised through the `lease_time` attribute.
/// Nothing here depends on leases; the value exists because clients ask.
pub const NFS4_LEASE_TIME: u32 = 90;

/// Case-sensitive UTF-8 string, the building block for names.
pub type utf8str_cs = String;
/// One component of a path name.
pub type component4 = utf8str_cs;
/// Symbolic link contents.
pub type linktext4 = utf8str_cs;
/// Attribute bit words; word `n` carries attribute numbers `32n..32n+31`.
pub type bitmap4 = Vec<u32>;
/// Change counter attribute value.
pub type changeid4 = u64;
pub type verifier4 = [u8; NFS4_VERIFIER_SIZE as usize];

/// Operation numbers of NFS version 4.0. The compound decoder recognizes the
/// whole range even though only a subset is registered; a recognized opcode
/// outside the registered set fails its operation with `NFSERR_NOTSUPP`
/// rather than `NFSERR_OP_ILLEGAL`.
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum nfs_opnum4 {
    OP_ACCESS = 3,
    OP_CLOSE = 4,
    OP_COMMIT = 5,
    OP_CREATE = 6,
    OP_DELEGPURGE = 7,
    OP_DELEGRETURN = 8,
    OP_GETATTR = 9,
    OP_GETFH = 10,
    OP_LINK = 11,
    OP_LOCK = 12,
    OP_LOCKT = 13,
    OP_LOCKU = 14,
    OP_LOOKUP = 15,
    OP_LOOKUPP = 16,
    OP_NVERIFY = 17,
    OP_OPEN = 18,
    OP_OPENATTR = 19,
    OP_OPEN_CONFIRM = 20,
    OP_OPEN_DOWNGRADE = 21,
    OP_PUTFH = 22,
    OP_PUTPUBFH = 23,
    OP_PUTROOTFH = 24,
    OP_READ = 25,
    OP_READDIR = 26,
    OP_READLINK = 27,
    OP_REMOVE = 28,
    OP_RENAME = 29,
    OP_RENEW = 30,
    OP_RESTOREFH = 31,
    OP_SAVEFH = 32,
    OP_SECINFO = 33,
    OP_SETATTR = 34,
    OP_SETCLIENTID = 35,
    OP_SETCLIENTID_CONFIRM = 36,
    OP_VERIFY = 37,
    OP_WRITE = 38,
    OP_RELEASE_LOCKOWNER = 39,
    OP_ILLEGAL = 10044,
}
impl SerializeEnum for nfs_opnum4 {}
impl DeserializeEnum for nfs_opnum4 {}

/// Kind of a file system object.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum nfs_ftype4 {
    /// Regular file
    #[default]
    NF4REG = 1,
    /// Directory
    NF4DIR = 2,
    /// Block special device
    NF4BLK = 3,
    /// Character special device
    NF4CHR = 4,
    /// Symbolic link
    NF4LNK = 5,
    /// Socket
    NF4SOCK = 6,
    /// Named pipe
    NF4FIFO = 7,
    /// Attribute directory
    NF4ATTRDIR = 8,
    /// Named attribute
    NF4NAMEDATTR = 9,
}
impl SerializeEnum for nfs_ftype4 {}
impl DeserializeEnum for nfs_ftype4 {}

/// A version 4 file handle, at most [NFS4_FHSIZE] bytes. Opaque to the
/// client.
#[derive(Clone, Debug, Default)]
pub struct nfs_fh4 {
    pub data: Vec<u8>,
}
DeserializeStruct!(nfs_fh4, data);
SerializeStruct!(nfs_fh4, data);

/// Timestamp with nanosecond resolution. Unlike version 3 the seconds field
/// is signed and 64 bits wide.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct nfstime4 {
    pub seconds: i64,
    pub nseconds: u32,
}
DeserializeStruct!(nfstime4, seconds, nseconds);
SerializeStruct!(nfstime4, seconds, nseconds);

/// File system identifier attribute value.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct fsid4 {
    pub major: u64,
    pub minor: u64,
}
DeserializeStruct!(fsid4, major, minor);
SerializeStruct!(fsid4, major, minor);

/// State identifier carried by I/O operations. This server is stateless, so
/// the value is decoded and otherwise ignored.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct stateid4 {
    pub seqid: u32,
    pub other: [u8; 12],
}
DeserializeStruct!(stateid4, seqid, other);
SerializeStruct!(stateid4, seqid, other);

/// Attribute values as they travel inside GETATTR results: the mask naming
/// which attributes are present, then their values packed back to back in
/// ascending attribute order inside one opaque blob.
#[derive(Clone, Debug, Default)]
pub struct fattr4 {
    pub attrmask: bitmap4,
    pub attr_vals: Vec<u8>,
}
DeserializeStruct!(fattr4, attrmask, attr_vals);
SerializeStruct!(fattr4, attrmask, attr_vals);

// Attribute numbers, RFC 7530 section 5. Word 0 of a bitmap4 carries
// numbers 0 through 31, word 1 carries 32 through 63.

pub const FATTR4_SUPPORTED_ATTRS: u32 = 0;
pub const FATTR4_TYPE: u32 = 1;
pub const FATTR4_FH_EXPIRE_TYPE: u32 = 2;
pub const FATTR4_CHANGE: u32 = 3;
pub const FATTR4_SIZE: u32 = 4;
pub const FATTR4_LINK_SUPPORT: u32 = 5;
pub const FATTR4_SYMLINK_SUPPORT: u32 = 6;
pub const FATTR4_NAMED_ATTR: u32 = 7;
pub const FATTR4_FSID: u32 = 8;
pub const FATTR4_UNIQUE_HANDLES: u32 = 9;
pub const FATTR4_LEASE_TIME: u32 = 10;
pub const FATTR4_RDATTR_ERROR: u32 = 11;
pub const FATTR4_FILEHANDLE: u32 = 19;
pub const FATTR4_FILEID: u32 = 20;
pub const FATTR4_MODE: u32 = 33;
pub const FATTR4_NUMLINKS: u32 = 35;
pub const FATTR4_OWNER: u32 = 36;
pub const FATTR4_OWNER_GROUP: u32 = 37;
pub const FATTR4_SPACE_USED: u32 = 45;
pub const FATTR4_TIME_ACCESS: u32 = 47;
pub const FATTR4_TIME_METADATA: u32 = 52;
pub const FATTR4_TIME_MODIFY: u32 = 53;

/// Filehandles here never expire.
pub const FH4_PERSISTENT: u32 = 0;

// ACCESS bits, RFC 7530 section 16.1. Same values as version 3.

pub const ACCESS4_READ: u32 = 0x0001;
pub const ACCESS4_LOOKUP: u32 = 0x0002;
pub const ACCESS4_MODIFY: u32 = 0x0004;
pub const ACCESS4_EXTEND: u32 = 0x0008;
pub const ACCESS4_DELETE: u32 = 0x0010;
pub const ACCESS4_EXECUTE: u32 = 0x0020;

/// The COMPOUND request frame.
///
/// Serialization writes `argarray` behind its element count, so building a
/// request only needs `tag`, `minorversion` and the operations. Decoding
/// stops early when it meets an operation it cannot take further, an
/// unregistered or out-of-range opcode, because the argument bytes of an
/// unknown operation cannot be skipped. `opcount` always holds the count the
/// request announced and can therefore exceed `argarray.len()`.
#[derive(Clone, Debug, Default)]
pub struct COMPOUND4args {
    pub tag: utf8str_cs,
    pub minorversion: u32,
    pub opcount: u32,
    pub argarray: Vec<nfs_argop4>,
}

impl Serialize for COMPOUND4args {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.tag.serialize(dest)?;
        self.minorversion.serialize(dest)?;
        self.argarray.serialize(dest)
    }
}

impl Deserialize for COMPOUND4args {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.tag.deserialize(src)?;
        self.minorversion.deserialize(src)?;
        self.opcount.deserialize(src)?;

        self.argarray.clear();
        if self.opcount as usize > MAX_OPS_PER_COMPOUND {
            // The caller answers this with NFSERR_RESOURCE; nothing past the
            // count is touched.
            return Ok(());
        }
        for _ in 0..self.opcount {
            let op = deserialize::<nfs_argop4>(src)?;
            let stop = op.stops_decoding();
            self.argarray.push(op);
            if stop {
                break;
            }
        }

        Ok(())
    }
}

/// The COMPOUND reply frame: overall status, the request's tag echoed back,
/// and one result per operation that ran.
#[derive(Clone, Debug, Default)]
pub struct COMPOUND4res {
    pub status: nfsstat,
    pub tag: utf8str_cs,
    pub resarray: Vec<nfs_resop4>,
}

impl Serialize for COMPOUND4res {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.status.serialize(dest)?;
        self.tag.serialize(dest)?;
        self.resarray.serialize(dest)
    }
}

impl Deserialize for COMPOUND4res {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.status.deserialize(src)?;
        self.tag.deserialize(src)?;

        let count = deserialize::<UsizeAsU32>(src)?.0;
        self.resarray.clear();
        for _ in 0..count {
            self.resarray.push(deserialize::<nfs_resop4>(src)?);
        }

        Ok(())
    }
}
