//! The ACCESS operation (operation 3), RFC 7530 section 16.1.
//!
//! Same contract as its version 3 namesake: report which of the requested
//! access bits the caller holds on the current filehandle. The `supported`
//! mask additionally reports which requested bits this server evaluates
//! at all.

use crate::protocol::nfs::NfsError;
use crate::protocol::xdr::nfs4::ops::{self, nfs_resop4};
use crate::protocol::xdr::nfs4;
use crate::vfs;

use super::compound::CompoundContext;

/// The bits this server knows how to answer for.
const EVALUATED_BITS: u32 = nfs4::ACCESS4_READ
    | nfs4::ACCESS4_LOOKUP
    | nfs4::ACCESS4_MODIFY
    | nfs4::ACCESS4_EXTEND
    | nfs4::ACCESS4_DELETE
    | nfs4::ACCESS4_EXECUTE;

pub(super) async fn execute(
    ctx: &mut CompoundContext,
    args: &ops::ACCESS4args,
) -> Result<nfs_resop4, NfsError> {
    let id = ctx.current()?;
    let attr = ctx.vfs.getattr(id).await?;

    let writable = matches!(ctx.vfs.capabilities(), vfs::Capabilities::ReadWrite);
    let write_bits = nfs4::ACCESS4_MODIFY | nfs4::ACCESS4_EXTEND | nfs4::ACCESS4_DELETE;

    let mut access = 0;
    match attr.kind {
        vfs::FileKind::Directory => {
            access |=
                args.access & (nfs4::ACCESS4_READ | nfs4::ACCESS4_LOOKUP | nfs4::ACCESS4_EXECUTE);
            if writable {
                access |= args.access & write_bits;
            }
        }
        vfs::FileKind::Regular => {
            access |= args.access & (nfs4::ACCESS4_READ | nfs4::ACCESS4_EXECUTE);
            if writable {
                access |= args.access & (nfs4::ACCESS4_MODIFY | nfs4::ACCESS4_EXTEND);
            }
        }
        _ => {
            access |= args.access & nfs4::ACCESS4_READ;
        }
    }

    let resok = ops::ACCESS4resok { supported: args.access & EVALUATED_BITS, access };
    Ok(nfs_resop4::ACCESS(ops::ACCESS4res::ok(resok)))
}
