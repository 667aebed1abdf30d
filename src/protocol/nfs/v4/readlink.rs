//! The READLINK operation (operation 27), RFC 7530 section 16.25.
//!
//! Only symbolic links may be read this way; anything else fails with
//! `NFSERR_INVAL` before the backend is asked for a target. The target
//! itself travels as a UTF-8 string on the wire, so a backend returning
//! arbitrary bytes is a server fault rather than a client error.

use crate::protocol::nfs::NfsError;
use crate::vfs;
use crate::protocol::xdr::nfs4::ops::{self, nfs_resop4, READLINK4res};
use crate::protocol::xdr::nfsstat::nfsstat;

use super::compound::CompoundContext;

pub(super) async fn execute(ctx: &mut CompoundContext) -> Result<nfs_resop4, NfsError> {
    let id = ctx.current()?;
    let attr = ctx.vfs.getattr(id).await?;
    if attr.kind != vfs::FileKind::Symlink {
        return Err(NfsError::new(
            nfsstat::NFSERR_INVAL,
            format!("object {} is not a symbolic link", id),
        ));
    }
    let target = ctx.vfs.readlink(id).await?;
    let link = String::from_utf8(target).map_err(|_| {
        NfsError::new(nfsstat::NFSERR_SERVERFAULT, "link target is not valid UTF-8")
    })?;
    Ok(nfs_resop4::READLINK(READLINK4res::ok(ops::READLINK4resok {
        link,
    })))
}
