//! The SAVEFH operation (operation 32), RFC 7530 section 16.30.

use crate::protocol::nfs::NfsError;
use crate::protocol::xdr::nfs4::ops::{self, nfs_resop4};
use crate::protocol::xdr::nfsstat::nfsstat;

use super::compound::CompoundContext;

pub(super) async fn execute(ctx: &mut CompoundContext) -> Result<nfs_resop4, NfsError> {
    let id = ctx.current()?;
    ctx.saved_fh = Some(id);
    Ok(nfs_resop4::SAVEFH(ops::SAVEFH4res { status: nfsstat::NFS_OK }))
}
