//! The PUTROOTFH operation (operation 24), RFC 7530 section 16.22.
//!
//! Clients start filehandle discovery here. It cannot fail: the export
//! root always exists.

use crate::protocol::nfs::NfsError;
use crate::protocol::xdr::nfs4::ops::{self, nfs_resop4};
use crate::protocol::xdr::nfsstat::nfsstat;

use super::compound::CompoundContext;

pub(super) async fn execute(ctx: &mut CompoundContext) -> Result<nfs_resop4, NfsError> {
    ctx.current_fh = Some(ctx.vfs.root_dir());
    Ok(nfs_resop4::PUTROOTFH(ops::PUTROOTFH4res { status: nfsstat::NFS_OK }))
}
