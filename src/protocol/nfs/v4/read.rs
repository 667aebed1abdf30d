//! The READ operation (operation 25), RFC 7530 section 16.23.
//!
//! The stateid in the arguments is decoded and ignored. Without OPEN or
//! locking support every read is an anonymous read, which the protocol
//! permits for stateids of all-zeros or all-ones, and enforcing the
//! distinction would reject clients that do the right thing.

use tracing::debug;

use crate::protocol::nfs::NfsError;
use crate::protocol::xdr::nfs4::ops::{self, nfs_resop4, READ4res};

use super::compound::CompoundContext;

pub(super) async fn execute(
    ctx: &mut CompoundContext,
    args: &ops::READ4args,
) -> Result<nfs_resop4, NfsError> {
    let id = ctx.current()?;
    let (data, eof) = ctx.vfs.read(id, args.offset, args.count).await?;
    debug!(
        "read id:{} offset:{} requested:{} returned:{} eof:{}",
        id,
        args.offset,
        args.count,
        data.len(),
        eof
    );
    Ok(nfs_resop4::READ(READ4res::ok(ops::READ4resok { eof, data })))
}
