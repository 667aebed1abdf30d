//! The GETFH operation (operation 10), RFC 7530 section 16.8.
//!
//! Makes the current filehandle visible to the client. LOOKUP and
//! PUTROOTFH replace the handle without returning it, so a compound that
//! wants the handle ends in GETFH.

use crate::protocol::nfs::NfsError;
use crate::protocol::xdr::nfs4;
use crate::protocol::xdr::nfs4::ops::{self, nfs_resop4};

use super::compound::CompoundContext;

pub(super) async fn execute(ctx: &mut CompoundContext) -> Result<nfs_resop4, NfsError> {
    let id = ctx.current()?;
    let object = nfs4::nfs_fh4 { data: ctx.vfs.id_to_fh(id) };
    Ok(nfs_resop4::GETFH(ops::GETFH4res::ok(ops::GETFH4resok { object })))
}
