//! The PUTFH operation (operation 22), RFC 7530 section 16.20.
//!
//! Installs a client-supplied filehandle as the current filehandle. This
//! is where handle validation happens: a malformed handle fails the
//! operation with `NFSERR_BADHANDLE`, one from an earlier server instance
//! with `NFSERR_STALE`, and later operations in the compound never run.

use crate::protocol::nfs::NfsError;
use crate::protocol::xdr::nfs4::ops::{self, nfs_resop4};
use crate::protocol::xdr::nfsstat::nfsstat;

use super::compound::CompoundContext;

pub(super) async fn execute(
    ctx: &mut CompoundContext,
    args: &ops::PUTFH4args,
) -> Result<nfs_resop4, NfsError> {
    let id = ctx.vfs.fh_to_id(&args.object.data)?;
    ctx.current_fh = Some(id);
    Ok(nfs_resop4::PUTFH(ops::PUTFH4res { status: nfsstat::NFS_OK }))
}
