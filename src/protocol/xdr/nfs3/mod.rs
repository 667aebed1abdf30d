//! XDR types and constants for NFS version 3 (RFC 1813).
//!
//! Only the read side of the protocol is modeled: attributes, handles, and
//! the argument/result bodies of the procedures this server answers. The
//! write-path structures of RFC 1813 have no decoder here; those procedures
//! are refused at dispatch before argument decoding starts.

#![allow(dead_code)]
// RFC 1813 type names are kept verbatim, lower case and all.
#![allow(non_camel_case_types)]

use std::fmt;
use std::io::{Read, Write};

use num_derive::{FromPrimitive, ToPrimitive};

use crate::{DeserializeStruct, SerializeStruct};

use super::nfsstat::nfsstat;
use super::{deserialize, Deserialize, DeserializeEnum, Serialize, SerializeEnum};

pub mod dir;
pub mod file;
pub mod fs;

/// RPC program number of the NFS service.
pub const PROGRAM: u32 = 100003;
/// Protocol version this module models.
pub const VERSION: u32 = 3;

/// Maximum size in bytes of a version 3 file handle.
pub const NFS3_FHSIZE: u32 = 64;

/// Size in bytes of the opaque cookie verifier used by READDIR.
pub const NFS3_COOKIEVERFSIZE: u32 = 8;

/// A byte string as NFS version 3 uses it for names and paths. The protocol
/// does not promise UTF-8 here, so this stays `Vec<u8>` with a lossy Display
/// for log output.
#[derive(Default, Clone)]
pub struct nfsstring(pub Vec<u8>);

impl nfsstring {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for nfsstring {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl From<&[u8]> for nfsstring {
    fn from(value: &[u8]) -> Self {
        Self(value.into())
    }
}

impl AsRef<[u8]> for nfsstring {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::ops::Deref for nfsstring {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for nfsstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for nfsstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(&self.0))
    }
}

impl Serialize for nfsstring {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        self.0.serialize(dest)
    }
}

impl Deserialize for nfsstring {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.0.deserialize(src)
    }
}

/// Procedure numbers of the version 3 program.
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, FromPrimitive, ToPrimitive)]
pub enum NFSProgram {
    NFSPROC3_NULL = 0,
    NFSPROC3_GETATTR = 1,
    NFSPROC3_SETATTR = 2,
    NFSPROC3_LOOKUP = 3,
    NFSPROC3_ACCESS = 4,
    NFSPROC3_READLINK = 5,
    NFSPROC3_READ = 6,
    NFSPROC3_WRITE = 7,
    NFSPROC3_CREATE = 8,
    NFSPROC3_MKDIR = 9,
    NFSPROC3_SYMLINK = 10,
    NFSPROC3_MKNOD = 11,
    NFSPROC3_REMOVE = 12,
    NFSPROC3_RMDIR = 13,
    NFSPROC3_RENAME = 14,
    NFSPROC3_LINK = 15,
    NFSPROC3_READDIR = 16,
    NFSPROC3_READDIRPLUS = 17,
    NFSPROC3_FSSTAT = 18,
    NFSPROC3_FSINFO = 19,
    NFSPROC3_PATHCONF = 20,
    NFSPROC3_COMMIT = 21,
    INVALID = 22,
}

/// Component of a path name.
pub type filename3 = nfsstring;
/// A whole path, or the contents of a symbolic link.
pub type nfspath3 = nfsstring;
/// Unique file number within a file system.
pub type fileid3 = u64;
/// Directory iteration position.
pub type cookie3 = u64;
/// Verifier that detects a directory changing between READDIR calls.
pub type cookieverf3 = [u8; NFS3_COOKIEVERFSIZE as usize];
pub type uid3 = u32;
pub type gid3 = u32;
pub type size3 = u64;
pub type offset3 = u64;
pub type mode3 = u32;
pub type count3 = u32;

/// Kind of a file system object.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum ftype3 {
    /// Regular file
    #[default]
    NF3REG = 1,
    /// Directory
    NF3DIR = 2,
    /// Block special device
    NF3BLK = 3,
    /// Character special device
    NF3CHR = 4,
    /// Symbolic link
    NF3LNK = 5,
    /// Socket
    NF3SOCK = 6,
    /// Named pipe
    NF3FIFO = 7,
}
impl SerializeEnum for ftype3 {}
impl DeserializeEnum for ftype3 {}

/// Major and minor numbers of a special device.
#[derive(Copy, Clone, Debug, Default)]
pub struct specdata3 {
    pub specdata1: u32,
    pub specdata2: u32,
}
DeserializeStruct!(specdata3, specdata1, specdata2);
SerializeStruct!(specdata3, specdata1, specdata2);

/// A version 3 file handle. Opaque to the client; the server decides the
/// internal layout.
#[derive(Clone, Debug, Default)]
pub struct nfs_fh3 {
    pub data: Vec<u8>,
}
DeserializeStruct!(nfs_fh3, data);
SerializeStruct!(nfs_fh3, data);

/// Timestamp with nanosecond resolution, seconds since the Unix epoch.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct nfstime3 {
    pub seconds: u32,
    pub nseconds: u32,
}
DeserializeStruct!(nfstime3, seconds, nseconds);
SerializeStruct!(nfstime3, seconds, nseconds);

/// The full attribute set of a file system object, RFC 1813 section 2.3.5.
#[derive(Copy, Clone, Debug, Default)]
pub struct fattr3 {
    pub ftype: ftype3,
    /// Unix permission bits.
    pub mode: mode3,
    /// Number of hard links to the object.
    pub nlink: u32,
    pub uid: uid3,
    pub gid: gid3,
    /// Size of the object in bytes.
    pub size: size3,
    /// Bytes the object actually occupies on disk.
    pub used: size3,
    /// Device numbers, meaningful for special files only.
    pub rdev: specdata3,
    /// Identifier of the containing file system.
    pub fsid: u64,
    /// File number, unique within the file system.
    pub fileid: fileid3,
    pub atime: nfstime3,
    pub mtime: nfstime3,
    pub ctime: nfstime3,
}
DeserializeStruct!(
    fattr3, ftype, mode, nlink, uid, gid, size, used, rdev, fsid, fileid, atime, mtime, ctime
);
SerializeStruct!(
    fattr3, ftype, mode, nlink, uid, gid, size, used, rdev, fsid, fileid, atime, mtime, ctime
);

/// Attributes a reply may attach to an object it mentions, RFC 1813
/// section 2.3.8. On the wire this is a bool followed by the attributes
/// when the bool is true.
#[derive(Copy, Clone, Debug, Default)]
pub enum post_op_attr {
    #[default]
    Void,
    attributes(fattr3),
}

impl Serialize for post_op_attr {
    fn serialize<W: Write>(&self, dest: &mut W) -> std::io::Result<()> {
        match self {
            post_op_attr::Void => false.serialize(dest),
            post_op_attr::attributes(v) => {
                true.serialize(dest)?;
                v.serialize(dest)
            }
        }
    }
}

impl Deserialize for post_op_attr {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        if deserialize::<bool>(src)? {
            *self = post_op_attr::attributes(deserialize(src)?);
        } else {
            *self = post_op_attr::Void;
        }

        Ok(())
    }
}

/// Directory handle plus a name within it. The argument body of LOOKUP.
#[derive(Clone, Debug, Default)]
pub struct diropargs3 {
    pub dir: nfs_fh3,
    pub name: filename3,
}
DeserializeStruct!(diropargs3, dir, name);
SerializeStruct!(diropargs3, dir, name);

// ACCESS bits, RFC 1813 section 3.3.4.

/// Read file data or read a directory.
pub const ACCESS3_READ: u32 = 0x0001;
/// Look up a name in a directory.
pub const ACCESS3_LOOKUP: u32 = 0x0002;
/// Rewrite existing file data or modify existing directory entries.
pub const ACCESS3_MODIFY: u32 = 0x0004;
/// Write new data or add directory entries.
pub const ACCESS3_EXTEND: u32 = 0x0008;
/// Delete an existing directory entry.
pub const ACCESS3_DELETE: u32 = 0x0010;
/// Execute a file or traverse a directory.
pub const ACCESS3_EXECUTE: u32 = 0x0020;

/// Serializes the common failure tail of a version 3 reply: the status
/// followed by optional attributes of the object involved.
pub fn serialize_failure<W: Write>(
    stat: nfsstat,
    attributes: &post_op_attr,
    dest: &mut W,
) -> std::io::Result<()> {
    stat.serialize(dest)?;
    attributes.serialize(dest)
}
