//! The RESTOREFH operation (operation 31), RFC 7530 section 16.29.
//!
//! The saved slot survives the restore, so SAVEFH / RESTOREFH pairs can
//! fan one directory handle out across several lookups.

use crate::protocol::nfs::NfsError;
use crate::protocol::xdr::nfs4::ops::{self, nfs_resop4};
use crate::protocol::xdr::nfsstat::nfsstat;

use super::compound::CompoundContext;

pub(super) async fn execute(ctx: &mut CompoundContext) -> Result<nfs_resop4, NfsError> {
    match ctx.saved_fh {
        Some(id) => {
            ctx.current_fh = Some(id);
            Ok(nfs_resop4::RESTOREFH(ops::RESTOREFH4res { status: nfsstat::NFS_OK }))
        }
        None => Err(NfsError::new(nfsstat::NFSERR_RESTOREFH, "no saved filehandle")),
    }
}
