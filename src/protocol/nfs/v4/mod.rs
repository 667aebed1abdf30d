//! NFS version 4.0 procedure handlers (RFC 7530).
//!
//! Version 4 has exactly two procedures. NULL answers an empty success
//! reply like its version 3 sibling; COMPOUND is the rest of the protocol,
//! a batch of operations evaluated in order against a current filehandle.
//! The batch machinery lives in [compound]; each operation's contract
//! lives in its own module, mirroring how the version 3 procedures are
//! laid out.

use std::io::{Read, Write};

use tracing::{debug, warn};

use crate::protocol::rpc;
use crate::protocol::xdr::{self, nfs4, Serialize};

pub mod compound;

mod access;
mod getattr;
mod getfh;
mod lookup;
mod putfh;
mod putrootfh;
mod read;
mod readlink;
mod restorefh;
mod savefh;

/// Routes a version 4 call to NULL or COMPOUND. The RPC layer has already
/// checked program and version.
pub async fn handle_nfs(
    xid: u32,
    call: xdr::rpc::call_body,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    match call.proc {
        nfs4::NFSPROC4_NULL => nfsproc4_null(xid, output)?,
        nfs4::NFSPROC4_COMPOUND => {
            compound::nfsproc4_compound(xid, input, output, context).await?
        }
        proc => {
            warn!("Unimplemented procedure {} xid:{}", proc, xid);
            xdr::rpc::proc_unavail_reply_message(xid).serialize(output)?;
        }
    }
    Ok(())
}

/// Answers NULL with an empty success reply.
fn nfsproc4_null(xid: u32, output: &mut impl Write) -> Result<(), anyhow::Error> {
    debug!("nfsproc4_null({})", xid);
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    Ok(())
}
