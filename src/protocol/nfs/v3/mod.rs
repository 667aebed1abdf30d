//! NFS version 3 procedure handlers (RFC 1813).
//!
//! One module per procedure, all registered with the [handle_nfs]
//! dispatcher. This server exposes the read side of the protocol:
//!
//! - NULL, GETATTR, LOOKUP, ACCESS, READLINK, READ
//! - READDIR, FSSTAT, FSINFO, PATHCONF
//!
//! Every other procedure number, including the whole write path, is
//! answered with `PROC_UNAVAIL` before any argument bytes are decoded.
//! Mutation is refused at the RPC layer rather than with `NFSERR_ROFS`
//! so clients mount read-only instead of retrying writes.
//!
//! Version 3 reports failures as a status inside an accepted reply, so the
//! handlers here never fail the connection over a bad file handle or a
//! missing object; only undecodable arguments and broken output streams
//! surface as errors.

use std::io::{Read, Write};

use num_traits::cast::FromPrimitive;
use tracing::warn;

use crate::protocol::rpc;
use crate::protocol::xdr::{self, nfs3, Serialize};
use crate::vfs;

mod access;
mod fsinfo;
mod fsstat;
mod getattr;
mod lookup;
mod null;
mod pathconf;
mod read;
mod readdir;
mod readlink;

use access::nfsproc3_access;
use fsinfo::nfsproc3_fsinfo;
use fsstat::nfsproc3_fsstat;
use getattr::nfsproc3_getattr;
use lookup::nfsproc3_lookup;
use null::nfsproc3_null;
use pathconf::nfsproc3_pathconf;
use read::nfsproc3_read;
use readdir::nfsproc3_readdir;
use readlink::nfsproc3_readlink;

/// File system identifier reported in `fattr3`. One export per server, so
/// a constant is truthful.
const FSID: u64 = 1;

/// Routes a version 3 call to its procedure handler. The RPC layer has
/// already checked program and version; only the procedure number is
/// interpreted here.
pub async fn handle_nfs(
    xid: u32,
    call: xdr::rpc::call_body,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let prog = nfs3::NFSProgram::from_u32(call.proc).unwrap_or(nfs3::NFSProgram::INVALID);

    match prog {
        nfs3::NFSProgram::NFSPROC3_NULL => nfsproc3_null(xid, output)?,
        nfs3::NFSProgram::NFSPROC3_GETATTR => nfsproc3_getattr(xid, input, output, context).await?,
        nfs3::NFSProgram::NFSPROC3_LOOKUP => nfsproc3_lookup(xid, input, output, context).await?,
        nfs3::NFSProgram::NFSPROC3_ACCESS => nfsproc3_access(xid, input, output, context).await?,
        nfs3::NFSProgram::NFSPROC3_READLINK => {
            nfsproc3_readlink(xid, input, output, context).await?
        }
        nfs3::NFSProgram::NFSPROC3_READ => nfsproc3_read(xid, input, output, context).await?,
        nfs3::NFSProgram::NFSPROC3_READDIR => nfsproc3_readdir(xid, input, output, context).await?,
        nfs3::NFSProgram::NFSPROC3_FSSTAT => nfsproc3_fsstat(xid, input, output, context).await?,
        nfs3::NFSProgram::NFSPROC3_FSINFO => nfsproc3_fsinfo(xid, input, output, context).await?,
        nfs3::NFSProgram::NFSPROC3_PATHCONF => {
            nfsproc3_pathconf(xid, input, output, context).await?
        }
        _ => {
            warn!("Unimplemented procedure {:?} xid:{}", prog, xid);
            xdr::rpc::proc_unavail_reply_message(xid).serialize(output)?;
        }
    }
    Ok(())
}

fn ftype3_from(kind: vfs::FileKind) -> nfs3::ftype3 {
    match kind {
        vfs::FileKind::Regular => nfs3::ftype3::NF3REG,
        vfs::FileKind::Directory => nfs3::ftype3::NF3DIR,
        vfs::FileKind::Symlink => nfs3::ftype3::NF3LNK,
        vfs::FileKind::BlockDevice => nfs3::ftype3::NF3BLK,
        vfs::FileKind::CharDevice => nfs3::ftype3::NF3CHR,
        vfs::FileKind::Socket => nfs3::ftype3::NF3SOCK,
        vfs::FileKind::Fifo => nfs3::ftype3::NF3FIFO,
    }
}

/// Version 3 timestamps carry unsigned 32-bit seconds; pre-epoch and
/// far-future times saturate instead of wrapping.
fn nfstime3_from(time: vfs::TimeSpec) -> nfs3::nfstime3 {
    nfs3::nfstime3 {
        seconds: time.seconds.clamp(0, u32::MAX as i64) as u32,
        nseconds: time.nseconds,
    }
}

/// Projects backend attributes onto the version 3 attribute structure.
fn fattr3_from(attr: &vfs::FileAttributes) -> nfs3::fattr3 {
    nfs3::fattr3 {
        ftype: ftype3_from(attr.kind),
        mode: attr.mode,
        nlink: attr.nlink,
        uid: attr.uid,
        gid: attr.gid,
        size: attr.size,
        used: attr.used,
        rdev: nfs3::specdata3::default(),
        fsid: FSID,
        fileid: attr.fileid,
        atime: nfstime3_from(attr.atime),
        mtime: nfstime3_from(attr.mtime),
        ctime: nfstime3_from(attr.ctime),
    }
}

fn post_op_attr_from(attr: Option<vfs::FileAttributes>) -> nfs3::post_op_attr {
    match attr {
        Some(attr) => nfs3::post_op_attr::attributes(fattr3_from(&attr)),
        None => nfs3::post_op_attr::Void,
    }
}
