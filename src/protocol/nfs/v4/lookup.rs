//! The LOOKUP operation (operation 15), RFC 7530 section 16.13.
//!
//! Resolves one component name against the current filehandle and makes
//! the result the new current filehandle. The result body is status only;
//! clients chain GETFH or GETATTR after it.

use tracing::debug;

use crate::protocol::nfs::NfsError;
use crate::protocol::xdr::nfs4::ops::{self, nfs_resop4};
use crate::protocol::xdr::nfsstat::nfsstat;

use super::compound::CompoundContext;

pub(super) async fn execute(
    ctx: &mut CompoundContext,
    args: &ops::LOOKUP4args,
) -> Result<nfs_resop4, NfsError> {
    let dirid = ctx.current()?;
    if args.objname.is_empty() {
        return Err(NfsError::new(nfsstat::NFSERR_INVAL, "empty component name"));
    }

    let fid = ctx.vfs.lookup(dirid, args.objname.as_bytes()).await?;
    debug!("lookup {:?} in {} --> {}", args.objname, dirid, fid);
    ctx.current_fh = Some(fid);
    Ok(nfs_resop4::LOOKUP(ops::LOOKUP4res { status: nfsstat::NFS_OK }))
}
