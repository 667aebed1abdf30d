#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use nfs_boreal::protocol::rpc::{Context, TransactionTracker};
use nfs_boreal::vfs::{
    self, Capabilities, DirEntry, FileAttributes, FileKind, InodeId, ReadDirResult, TimeSpec,
};
use nfs_boreal::xdr::nfsstat::nfsstat;
use nfs_boreal::xdr::rpc::auth_unix;

/// Server instance number [TestFs] reports. Tests forge handles from the
/// neighboring generations to provoke the staleness errors.
pub const GENERATION: u64 = 7;

pub const ROOT_ID: InodeId = 1;
pub const FILE_ID: InodeId = 2;
pub const SUB_DIR_ID: InodeId = 3;
pub const DEEP_FILE_ID: InodeId = 4;
pub const LINK_ID: InodeId = 5;

pub const FILE_CONTENT: &[u8] = b"Hello from a tiny read-only tree.\n";
pub const DEEP_CONTENT: &[u8] = b"two levels down\n";
pub const LINK_TARGET: &[u8] = b"/etc/passwd";

/// Modification time stamped on every object, fixed so directory cookie
/// verifiers come out predictable.
pub const MTIME_SECONDS: i64 = 1_700_000_000;

const ROOT_ENTRIES: [(InodeId, &[u8]); 3] =
    [(FILE_ID, b"hello.txt"), (SUB_DIR_ID, b"sub"), (LINK_ID, b"passwd")];
const SUB_ENTRIES: [(InodeId, &[u8]); 1] = [(DEEP_FILE_ID, b"deep.txt")];

/// Five inodes, wired statically:
///
/// ```text
/// / (1)
/// |-- hello.txt (2)
/// |-- sub (3)
/// |   `-- deep.txt (4)
/// `-- passwd (5) -> /etc/passwd
/// ```
#[derive(Default)]
pub struct TestFs;

impl TestFs {
    fn children(dirid: InodeId) -> Option<&'static [(InodeId, &'static [u8])]> {
        match dirid {
            ROOT_ID => Some(&ROOT_ENTRIES),
            SUB_DIR_ID => Some(&SUB_ENTRIES),
            _ => None,
        }
    }

    fn attr(id: InodeId) -> Option<FileAttributes> {
        let (kind, size) = match id {
            ROOT_ID | SUB_DIR_ID => (FileKind::Directory, 4096),
            FILE_ID => (FileKind::Regular, FILE_CONTENT.len() as u64),
            DEEP_FILE_ID => (FileKind::Regular, DEEP_CONTENT.len() as u64),
            LINK_ID => (FileKind::Symlink, LINK_TARGET.len() as u64),
            _ => return None,
        };
        let when = TimeSpec { seconds: MTIME_SECONDS, nseconds: 0 };
        Some(FileAttributes {
            kind,
            mode: if kind == FileKind::Directory { 0o555 } else { 0o444 },
            nlink: 1,
            uid: 1000,
            gid: 1000,
            size,
            used: size,
            fileid: id,
            atime: when,
            mtime: when,
            ctime: when,
        })
    }
}

#[async_trait]
impl vfs::NFSFileSystem for TestFs {
    fn generation(&self) -> u64 {
        GENERATION
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::ReadOnly
    }

    fn root_dir(&self) -> InodeId {
        ROOT_ID
    }

    async fn lookup(&self, dirid: InodeId, filename: &[u8]) -> Result<InodeId, nfsstat> {
        let Some(children) = Self::children(dirid) else {
            return Err(if Self::attr(dirid).is_some() {
                nfsstat::NFSERR_NOTDIR
            } else {
                nfsstat::NFSERR_NOENT
            });
        };
        children
            .iter()
            .find(|(_, name)| *name == filename)
            .map(|(id, _)| *id)
            .ok_or(nfsstat::NFSERR_NOENT)
    }

    async fn getattr(&self, id: InodeId) -> Result<FileAttributes, nfsstat> {
        Self::attr(id).ok_or(nfsstat::NFSERR_NOENT)
    }

    async fn read(
        &self,
        id: InodeId,
        offset: u64,
        count: u32,
    ) -> Result<(Vec<u8>, bool), nfsstat> {
        let bytes: &[u8] = match id {
            FILE_ID => FILE_CONTENT,
            DEEP_FILE_ID => DEEP_CONTENT,
            ROOT_ID | SUB_DIR_ID => return Err(nfsstat::NFSERR_ISDIR),
            LINK_ID => return Err(nfsstat::NFSERR_INVAL),
            _ => return Err(nfsstat::NFSERR_NOENT),
        };
        let start = (offset as usize).min(bytes.len());
        let end = (offset as usize).saturating_add(count as usize).min(bytes.len());
        Ok((bytes[start..end].to_vec(), end == bytes.len()))
    }

    async fn readlink(&self, id: InodeId) -> Result<Vec<u8>, nfsstat> {
        match id {
            LINK_ID => Ok(LINK_TARGET.to_vec()),
            _ if Self::attr(id).is_some() => Err(nfsstat::NFSERR_INVAL),
            _ => Err(nfsstat::NFSERR_NOENT),
        }
    }

    async fn readdir(
        &self,
        dirid: InodeId,
        start_after: InodeId,
        max_entries: usize,
    ) -> Result<ReadDirResult, nfsstat> {
        let Some(children) = Self::children(dirid) else {
            return Err(nfsstat::NFSERR_NOTDIR);
        };
        let start = if start_after == 0 {
            0
        } else {
            match children.iter().position(|(id, _)| *id == start_after) {
                Some(position) => position + 1,
                None => return Err(nfsstat::NFSERR_BAD_COOKIE),
            }
        };
        let entries: Vec<DirEntry> = children[start..]
            .iter()
            .take(max_entries)
            .map(|(fileid, name)| DirEntry { fileid: *fileid, name: name.to_vec() })
            .collect();
        let end = start + entries.len() == children.len();
        Ok(ReadDirResult { entries, end })
    }
}

/// A connection context over [TestFs] with the export rooted at `/`.
pub fn test_context() -> Context {
    Context {
        local_port: 2049,
        client_addr: "127.0.0.1:54321".to_string(),
        auth: auth_unix::default(),
        vfs: Arc::new(TestFs),
        mount_signal: None,
        export_name: Arc::new("/".to_string()),
        transaction_tracker: Arc::new(TransactionTracker::new(Duration::from_secs(60))),
    }
}
