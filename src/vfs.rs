//! The interface between the protocol engines and whatever actually stores
//! the files.
//!
//! Both protocol versions speak to the same [NFSFileSystem] trait, so the
//! types here belong to neither wire format: attributes, timestamps and
//! directory entries are plain Rust values that the v3 and v4 handler
//! layers translate into their own representations. Implementations see
//! inode numbers, never file handles; the opaque handle layout and its
//! staleness checking are provided by the trait itself.
//!
//! Design constraints carried by every implementation:
//! - Operation is stateless. A file is identified by a 64-bit inode number
//!   alone; nothing resembles an open file.
//! - `getattr` must be cheap. Clients call it constantly.
//! - Inode number 0 is reserved and must never be handed out.
//! - Directory listings must have a stable order so a client can resume
//!   from a cookie across calls.

use std::cmp::Ordering;

use async_trait::async_trait;

use crate::protocol::xdr::nfsstat::nfsstat;

/// Inode number: the sole identity of a file system object.
pub type InodeId = u64;

/// Opaque file handle layout: 8-byte generation then 8-byte inode number,
/// both little-endian.
const FILE_HANDLE_SIZE: usize = 16;

/// What kind of object an inode names.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum FileKind {
    #[default]
    Regular,
    Directory,
    Symlink,
    BlockDevice,
    CharDevice,
    Socket,
    Fifo,
}

/// Timestamp with nanosecond resolution, seconds since the Unix epoch.
/// Signed seconds cover pre-epoch times the way version 4 requires; the
/// version 3 layer truncates.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct TimeSpec {
    pub seconds: i64,
    pub nseconds: u32,
}

/// Protocol-neutral attribute set. The handler layers project this onto
/// `fattr3` and the version 4 attribute bitmap.
#[derive(Clone, Debug, Default)]
pub struct FileAttributes {
    pub kind: FileKind,
    /// Unix permission bits.
    pub mode: u32,
    /// Number of hard links to the object.
    pub nlink: u32,
    pub uid: u32,
    pub gid: u32,
    /// Size in bytes.
    pub size: u64,
    /// Bytes actually occupied on storage.
    pub used: u64,
    /// The object's own inode number.
    pub fileid: InodeId,
    pub atime: TimeSpec,
    pub mtime: TimeSpec,
    pub ctime: TimeSpec,
}

/// One directory entry. Names are byte strings; the protocols do not
/// promise UTF-8 and neither does this trait.
#[derive(Clone, Debug, Default)]
pub struct DirEntry {
    pub fileid: InodeId,
    pub name: Vec<u8>,
}

/// A page of directory entries plus the end-of-directory flag.
#[derive(Clone, Debug, Default)]
pub struct ReadDirResult {
    pub entries: Vec<DirEntry>,
    /// True when no entries follow the returned page.
    pub end: bool,
}

/// Whether an implementation accepts mutation at all. Read-only backends
/// make the handlers strip write bits from access masks.
pub enum Capabilities {
    ReadOnly,
    ReadWrite,
}

/// Transfer-size and naming limits reported by FSINFO and PATHCONF.
#[derive(Copy, Clone, Debug)]
pub struct FsLimits {
    pub read_max: u32,
    pub read_preferred: u32,
    pub write_max: u32,
    pub write_preferred: u32,
    pub dir_preferred: u32,
    pub max_file_size: u64,
    pub name_max: u32,
    pub link_max: u32,
}

impl Default for FsLimits {
    fn default() -> FsLimits {
        FsLimits {
            read_max: 1024 * 1024,
            read_preferred: 1024 * 1024,
            write_max: 1024 * 1024,
            write_preferred: 1024 * 1024,
            dir_preferred: 1024 * 1024,
            max_file_size: 128 * 1024 * 1024 * 1024,
            name_max: 32768,
            link_max: 0,
        }
    }
}

/// The API a storage backend implements to be served over NFS.
///
/// File handles
/// ------------
/// Clients hold opaque handles, not inode numbers. The provided
/// [id_to_fh]/[fh_to_id] pair builds them as a generation number (derived
/// from server start time) concatenated with the inode number, so handles
/// from a previous server run decode to `NFSERR_STALE` instead of silently
/// naming the wrong file.
///
/// Directory pagination
/// --------------------
/// [readdir] resumes after a given entry's inode number; `0` starts from
/// the beginning. The reply size limit is in bytes, not entries, so the
/// protocol layer may take fewer entries than returned here.
///
/// [id_to_fh]: NFSFileSystem::id_to_fh
/// [fh_to_id]: NFSFileSystem::fh_to_id
/// [readdir]: NFSFileSystem::readdir
#[async_trait]
pub trait NFSFileSystem: Sync {
    /// Server instance number, fixed for the process lifetime. Embedded in
    /// every file handle to detect handles from older instances.
    fn generation(&self) -> u64;

    /// Whether mutation is supported at all.
    fn capabilities(&self) -> Capabilities;

    /// Inode number of the exported root directory.
    fn root_dir(&self) -> InodeId;

    /// Resolves one name inside a directory to its inode number.
    async fn lookup(&self, dirid: InodeId, filename: &[u8]) -> Result<InodeId, nfsstat>;

    /// Attributes of an object. Called on nearly every request; keep it
    /// fast.
    async fn getattr(&self, id: InodeId) -> Result<FileAttributes, nfsstat>;

    /// Reads up to `count` bytes at `offset`. A read past the end returns
    /// the remaining bytes; the flag reports whether the end of the file
    /// was reached.
    async fn read(&self, id: InodeId, offset: u64, count: u32)
        -> Result<(Vec<u8>, bool), nfsstat>;

    /// Target path of a symbolic link. `NFSERR_INVAL` when the object is
    /// not a symlink.
    async fn readlink(&self, id: InodeId) -> Result<Vec<u8>, nfsstat>;

    /// Lists entries in stable order, starting after the entry whose inode
    /// number is `start_after` (0 means from the beginning), returning at
    /// most `max_entries`.
    async fn readdir(
        &self,
        dirid: InodeId,
        start_after: InodeId,
        max_entries: usize,
    ) -> Result<ReadDirResult, nfsstat>;

    /// Transfer-size and naming limits. The default suits most backends.
    fn limits(&self) -> FsLimits {
        FsLimits::default()
    }

    /// Builds the opaque file handle for an inode number.
    fn id_to_fh(&self, id: InodeId) -> Vec<u8> {
        let mut handle = Vec::with_capacity(FILE_HANDLE_SIZE);
        handle.extend_from_slice(&self.generation().to_le_bytes());
        handle.extend_from_slice(&id.to_le_bytes());
        handle
    }

    /// Decodes and validates an opaque file handle. `NFSERR_STALE` marks a
    /// handle from an earlier server instance, `NFSERR_BADHANDLE` one that
    /// is malformed or claims a future instance.
    fn fh_to_id(&self, fh: &[u8]) -> Result<InodeId, nfsstat> {
        if fh.len() != FILE_HANDLE_SIZE {
            return Err(nfsstat::NFSERR_BADHANDLE);
        }
        let mut generation_bytes = [0_u8; 8];
        generation_bytes.copy_from_slice(&fh[0..8]);
        let mut id_bytes = [0_u8; 8];
        id_bytes.copy_from_slice(&fh[8..16]);

        match u64::from_le_bytes(generation_bytes).cmp(&self.generation()) {
            Ordering::Less => Err(nfsstat::NFSERR_STALE),
            Ordering::Greater => Err(nfsstat::NFSERR_BADHANDLE),
            Ordering::Equal => Ok(u64::from_le_bytes(id_bytes)),
        }
    }

    /// Walks a slash-separated path from the root to an inode number.
    /// Empty components are skipped, so leading, trailing and doubled
    /// slashes are harmless.
    async fn path_to_id(&self, path: &[u8]) -> Result<InodeId, nfsstat> {
        let mut fid = self.root_dir();
        for component in path.split(|&b| b == b'/') {
            if component.is_empty() {
                continue;
            }
            fid = self.lookup(fid, component).await?;
        }
        Ok(fid)
    }
}
