//! The GETATTR operation (operation 9), RFC 7530 section 16.7.
//!
//! The client asks for attributes by bitmap; the reply carries the
//! intersection of that bitmap with the set this server supports, plus the
//! values packed back to back in ascending attribute order. Asking for an
//! unsupported attribute is not an error, the attribute is simply absent
//! from the reply mask.

use crate::protocol::nfs::NfsError;
use crate::protocol::xdr::nfs4::ops::{self, nfs_resop4};
use crate::protocol::xdr::nfs4;
use crate::protocol::xdr::nfsstat::nfsstat;
use crate::protocol::xdr::Serialize;
use crate::vfs;

use super::compound::CompoundContext;

/// Word 0 of the supported set: attributes 0 through 10 and fileid (20).
const SUPPORTED_WORD0: u32 = (1 << nfs4::FATTR4_SUPPORTED_ATTRS)
    | (1 << nfs4::FATTR4_TYPE)
    | (1 << nfs4::FATTR4_FH_EXPIRE_TYPE)
    | (1 << nfs4::FATTR4_CHANGE)
    | (1 << nfs4::FATTR4_SIZE)
    | (1 << nfs4::FATTR4_LINK_SUPPORT)
    | (1 << nfs4::FATTR4_SYMLINK_SUPPORT)
    | (1 << nfs4::FATTR4_NAMED_ATTR)
    | (1 << nfs4::FATTR4_FSID)
    | (1 << nfs4::FATTR4_UNIQUE_HANDLES)
    | (1 << nfs4::FATTR4_LEASE_TIME)
    | (1 << nfs4::FATTR4_FILEID);

/// Word 1 of the supported set: mode, numlinks, space_used and the three
/// timestamps.
const SUPPORTED_WORD1: u32 = (1 << (nfs4::FATTR4_MODE - 32))
    | (1 << (nfs4::FATTR4_NUMLINKS - 32))
    | (1 << (nfs4::FATTR4_SPACE_USED - 32))
    | (1 << (nfs4::FATTR4_TIME_ACCESS - 32))
    | (1 << (nfs4::FATTR4_TIME_METADATA - 32))
    | (1 << (nfs4::FATTR4_TIME_MODIFY - 32));

/// File system identifier attribute. One export per server.
const FSID: nfs4::fsid4 = nfs4::fsid4 { major: 1, minor: 0 };

pub(super) async fn execute(
    ctx: &mut CompoundContext,
    args: &ops::GETATTR4args,
) -> Result<nfs_resop4, NfsError> {
    let id = ctx.current()?;
    let attr = ctx.vfs.getattr(id).await?;

    let obj_attributes = encode_attributes(&attr, &args.attr_request).map_err(|e| {
        NfsError::new(nfsstat::NFSERR_SERVERFAULT, format!("attribute encoding failed: {}", e))
    })?;
    Ok(nfs_resop4::GETATTR(ops::GETATTR4res::ok(ops::GETATTR4resok { obj_attributes })))
}

fn requested(request: &nfs4::bitmap4, attrnum: u32) -> bool {
    let word = (attrnum / 32) as usize;
    let bit = attrnum % 32;
    request.get(word).is_some_and(|w| w & (1 << bit) != 0)
}

fn grant(mask: &mut [u32], attrnum: u32) {
    mask[(attrnum / 32) as usize] |= 1 << (attrnum % 32);
}

fn nfstime4_from(time: vfs::TimeSpec) -> nfs4::nfstime4 {
    nfs4::nfstime4 { seconds: time.seconds, nseconds: time.nseconds }
}

fn ftype4_from(kind: vfs::FileKind) -> nfs4::nfs_ftype4 {
    match kind {
        vfs::FileKind::Regular => nfs4::nfs_ftype4::NF4REG,
        vfs::FileKind::Directory => nfs4::nfs_ftype4::NF4DIR,
        vfs::FileKind::Symlink => nfs4::nfs_ftype4::NF4LNK,
        vfs::FileKind::BlockDevice => nfs4::nfs_ftype4::NF4BLK,
        vfs::FileKind::CharDevice => nfs4::nfs_ftype4::NF4CHR,
        vfs::FileKind::Socket => nfs4::nfs_ftype4::NF4SOCK,
        vfs::FileKind::Fifo => nfs4::nfs_ftype4::NF4FIFO,
    }
}

/// Builds the granted mask and the packed value blob for one object.
/// Values must be written in ascending attribute order; the if-chain below
/// is that order made explicit.
fn encode_attributes(
    attr: &vfs::FileAttributes,
    request: &nfs4::bitmap4,
) -> std::io::Result<nfs4::fattr4> {
    let mut attrmask = vec![0_u32; 2];
    let mut vals: Vec<u8> = Vec::new();

    if requested(request, nfs4::FATTR4_SUPPORTED_ATTRS) {
        grant(&mut attrmask, nfs4::FATTR4_SUPPORTED_ATTRS);
        vec![SUPPORTED_WORD0, SUPPORTED_WORD1].serialize(&mut vals)?;
    }
    if requested(request, nfs4::FATTR4_TYPE) {
        grant(&mut attrmask, nfs4::FATTR4_TYPE);
        ftype4_from(attr.kind).serialize(&mut vals)?;
    }
    if requested(request, nfs4::FATTR4_FH_EXPIRE_TYPE) {
        grant(&mut attrmask, nfs4::FATTR4_FH_EXPIRE_TYPE);
        nfs4::FH4_PERSISTENT.serialize(&mut vals)?;
    }
    if requested(request, nfs4::FATTR4_CHANGE) {
        grant(&mut attrmask, nfs4::FATTR4_CHANGE);
        let change: nfs4::changeid4 =
            ((attr.mtime.seconds as u64) << 32) | (attr.mtime.nseconds as u64);
        change.serialize(&mut vals)?;
    }
    if requested(request, nfs4::FATTR4_SIZE) {
        grant(&mut attrmask, nfs4::FATTR4_SIZE);
        attr.size.serialize(&mut vals)?;
    }
    if requested(request, nfs4::FATTR4_LINK_SUPPORT) {
        grant(&mut attrmask, nfs4::FATTR4_LINK_SUPPORT);
        true.serialize(&mut vals)?;
    }
    if requested(request, nfs4::FATTR4_SYMLINK_SUPPORT) {
        grant(&mut attrmask, nfs4::FATTR4_SYMLINK_SUPPORT);
        true.serialize(&mut vals)?;
    }
    if requested(request, nfs4::FATTR4_NAMED_ATTR) {
        grant(&mut attrmask, nfs4::FATTR4_NAMED_ATTR);
        false.serialize(&mut vals)?;
    }
    if requested(request, nfs4::FATTR4_FSID) {
        grant(&mut attrmask, nfs4::FATTR4_FSID);
        FSID.serialize(&mut vals)?;
    }
    if requested(request, nfs4::FATTR4_UNIQUE_HANDLES) {
        grant(&mut attrmask, nfs4::FATTR4_UNIQUE_HANDLES);
        true.serialize(&mut vals)?;
    }
    if requested(request, nfs4::FATTR4_LEASE_TIME) {
        grant(&mut attrmask, nfs4::FATTR4_LEASE_TIME);
        nfs4::NFS4_LEASE_TIME.serialize(&mut vals)?;
    }
    if requested(request, nfs4::FATTR4_FILEID) {
        grant(&mut attrmask, nfs4::FATTR4_FILEID);
        attr.fileid.serialize(&mut vals)?;
    }
    if requested(request, nfs4::FATTR4_MODE) {
        grant(&mut attrmask, nfs4::FATTR4_MODE);
        attr.mode.serialize(&mut vals)?;
    }
    if requested(request, nfs4::FATTR4_NUMLINKS) {
        grant(&mut attrmask, nfs4::FATTR4_NUMLINKS);
        attr.nlink.serialize(&mut vals)?;
    }
    if requested(request, nfs4::FATTR4_SPACE_USED) {
        grant(&mut attrmask, nfs4::FATTR4_SPACE_USED);
        attr.used.serialize(&mut vals)?;
    }
    if requested(request, nfs4::FATTR4_TIME_ACCESS) {
        grant(&mut attrmask, nfs4::FATTR4_TIME_ACCESS);
        nfstime4_from(attr.atime).serialize(&mut vals)?;
    }
    if requested(request, nfs4::FATTR4_TIME_METADATA) {
        grant(&mut attrmask, nfs4::FATTR4_TIME_METADATA);
        nfstime4_from(attr.ctime).serialize(&mut vals)?;
    }
    if requested(request, nfs4::FATTR4_TIME_MODIFY) {
        grant(&mut attrmask, nfs4::FATTR4_TIME_MODIFY);
        nfstime4_from(attr.mtime).serialize(&mut vals)?;
    }

    Ok(nfs4::fattr4 { attrmask, attr_vals: vals })
}
