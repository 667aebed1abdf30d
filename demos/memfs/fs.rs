use std::time::SystemTime;

use async_trait::async_trait;

use nfs_boreal::vfs;
use nfs_boreal::xdr::nfsstat::nfsstat;

const README: &[u8] = b"This tree lives in the memory of the demo server.\n\
    Nothing here survives a restart, and nothing can be written.\n";
const GUIDE: &[u8] = b"# Guide\n\nLook around. The docs/deep directory shows\n\
    that lookups nest, and /passwd shows a symbolic link.\n";
const NESTED: &[u8] = b"You found the bottom of the tree.\n";

/// What an entry holds. Directory children are kept in insertion order,
/// which gives readdir the stable resume order the backend contract asks
/// for.
#[derive(Debug, Clone)]
enum Content {
    File(Vec<u8>),
    Directory(Vec<vfs::InodeId>),
    Symlink(Vec<u8>),
}

#[derive(Debug, Clone)]
struct Entry {
    name: Vec<u8>,
    parent: vfs::InodeId,
    attr: vfs::FileAttributes,
    content: Content,
}

fn make_attr(
    kind: vfs::FileKind,
    size: u64,
    id: vfs::InodeId,
    when: vfs::TimeSpec,
) -> vfs::FileAttributes {
    let mode = match kind {
        vfs::FileKind::Directory => 0o555,
        _ => 0o444,
    };
    vfs::FileAttributes {
        kind,
        mode,
        nlink: 1,
        uid: 507,
        gid: 507,
        size,
        used: size,
        fileid: id,
        atime: when,
        mtime: when,
        ctime: when,
    }
}

fn make_file(
    name: &str,
    id: vfs::InodeId,
    parent: vfs::InodeId,
    contents: &[u8],
    when: vfs::TimeSpec,
) -> Entry {
    Entry {
        name: name.as_bytes().to_vec(),
        parent,
        attr: make_attr(vfs::FileKind::Regular, contents.len() as u64, id, when),
        content: Content::File(contents.to_vec()),
    }
}

fn make_dir(
    name: &str,
    id: vfs::InodeId,
    parent: vfs::InodeId,
    children: Vec<vfs::InodeId>,
    when: vfs::TimeSpec,
) -> Entry {
    Entry {
        name: name.as_bytes().to_vec(),
        parent,
        attr: make_attr(vfs::FileKind::Directory, 0, id, when),
        content: Content::Directory(children),
    }
}

fn make_symlink(
    name: &str,
    id: vfs::InodeId,
    parent: vfs::InodeId,
    target: &[u8],
    when: vfs::TimeSpec,
) -> Entry {
    Entry {
        name: name.as_bytes().to_vec(),
        parent,
        attr: make_attr(vfs::FileKind::Symlink, target.len() as u64, id, when),
        content: Content::Symlink(target.to_vec()),
    }
}

/// A read-only in-memory file system.
///
/// The whole tree is built in [Default::default] and never changes, so the
/// entries need no locking. An entry's index in the vector is its inode
/// number; index 0 is reserved and holds an unreachable placeholder.
#[derive(Debug)]
pub struct MemFs {
    entries: Vec<Entry>,
    generation: u64,
}

impl Default for MemFs {
    fn default() -> MemFs {
        let now =
            SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
        let when = vfs::TimeSpec { seconds: now.as_secs() as i64, nseconds: now.subsec_nanos() };

        // Ids must match vector positions.
        let entries = vec![
            make_file("", 0, 0, b"", when), // inode 0 is reserved
            make_dir("/", 1, 1, vec![2, 3, 7], when),
            make_file("readme.txt", 2, 1, README, when),
            make_dir("docs", 3, 1, vec![4, 5], when),
            make_file("guide.md", 4, 3, GUIDE, when),
            make_dir("deep", 5, 3, vec![6], when),
            make_file("nested.txt", 6, 5, NESTED, when),
            make_symlink("passwd", 7, 1, b"/etc/passwd", when),
        ];

        MemFs { entries, generation: now.as_millis() as u64 }
    }
}

impl MemFs {
    fn entry(&self, id: vfs::InodeId) -> Result<&Entry, nfsstat> {
        self.entries.get(id as usize).ok_or(nfsstat::NFSERR_NOENT)
    }
}

#[async_trait]
impl vfs::NFSFileSystem for MemFs {
    fn generation(&self) -> u64 {
        self.generation
    }

    fn capabilities(&self) -> vfs::Capabilities {
        vfs::Capabilities::ReadOnly
    }

    fn root_dir(&self) -> vfs::InodeId {
        1
    }

    async fn lookup(
        &self,
        dirid: vfs::InodeId,
        filename: &[u8],
    ) -> Result<vfs::InodeId, nfsstat> {
        let dir = self.entry(dirid)?;
        let Content::Directory(children) = &dir.content else {
            return Err(nfsstat::NFSERR_NOTDIR);
        };
        if filename == b"." {
            return Ok(dirid);
        }
        if filename == b".." {
            return Ok(dir.parent);
        }
        for &child in children {
            if let Some(entry) = self.entries.get(child as usize) {
                if entry.name == filename {
                    return Ok(child);
                }
            }
        }
        Err(nfsstat::NFSERR_NOENT)
    }

    async fn getattr(&self, id: vfs::InodeId) -> Result<vfs::FileAttributes, nfsstat> {
        Ok(self.entry(id)?.attr.clone())
    }

    async fn read(
        &self,
        id: vfs::InodeId,
        offset: u64,
        count: u32,
    ) -> Result<(Vec<u8>, bool), nfsstat> {
        let bytes = match &self.entry(id)?.content {
            Content::File(bytes) => bytes,
            Content::Directory(_) => return Err(nfsstat::NFSERR_ISDIR),
            Content::Symlink(_) => return Err(nfsstat::NFSERR_INVAL),
        };
        let start = (offset as usize).min(bytes.len());
        let end = (offset as usize).saturating_add(count as usize).min(bytes.len());
        let eof = end == bytes.len();
        Ok((bytes[start..end].to_vec(), eof))
    }

    async fn readlink(&self, id: vfs::InodeId) -> Result<Vec<u8>, nfsstat> {
        match &self.entry(id)?.content {
            Content::Symlink(target) => Ok(target.clone()),
            _ => Err(nfsstat::NFSERR_INVAL),
        }
    }

    async fn readdir(
        &self,
        dirid: vfs::InodeId,
        start_after: vfs::InodeId,
        max_entries: usize,
    ) -> Result<vfs::ReadDirResult, nfsstat> {
        let Content::Directory(children) = &self.entry(dirid)?.content else {
            return Err(nfsstat::NFSERR_NOTDIR);
        };
        let start_index = if start_after > 0 {
            match children.iter().position(|&c| c == start_after) {
                Some(pos) => pos + 1,
                None => return Err(nfsstat::NFSERR_BAD_COOKIE),
            }
        } else {
            0
        };

        let mut result = vfs::ReadDirResult::default();
        for &child in &children[start_index..] {
            if result.entries.len() >= max_entries {
                return Ok(result);
            }
            if let Some(entry) = self.entries.get(child as usize) {
                result
                    .entries
                    .push(vfs::DirEntry { fileid: child, name: entry.name.clone() });
            }
        }
        result.end = true;
        Ok(result)
    }
}
