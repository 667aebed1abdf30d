//! The GETATTR procedure (procedure 1), RFC 1813 section 3.3.1.
//!
//! Returns the full attribute set of the object a file handle names.
//! Clients call this constantly to validate their attribute caches, so the
//! handler stays on the cheap path: one handle decode, one `getattr`.

use std::io::{Read, Write};

use tracing::{debug, error};

use crate::protocol::rpc;
use crate::protocol::xdr::nfsstat::nfsstat;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};

use super::fattr3_from;

/// Handles GETATTR. The failure body is void, so an invalid handle or a
/// vanished object reports as a bare status.
pub async fn nfsproc3_getattr(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let handle = deserialize::<nfs3::nfs_fh3>(input)?;
    debug!("nfsproc3_getattr({},{:?})", xid, handle);

    let id = match context.vfs.fh_to_id(&handle.data) {
        Ok(id) => id,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            return Ok(());
        }
    };

    match context.vfs.getattr(id).await {
        Ok(attr) => {
            let attr = fattr3_from(&attr);
            debug!(" {} --> {:?}", xid, attr);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfsstat::NFS_OK.serialize(output)?;
            attr.serialize(output)?;
        }
        Err(stat) => {
            error!("nfsproc3_getattr error {} --> {:?}", xid, stat);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
        }
    }
    Ok(())
}
