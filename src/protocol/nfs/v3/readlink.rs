//! The READLINK procedure (procedure 5), RFC 1813 section 3.3.5.
//!
//! Returns the target path stored in a symbolic link. The backend decides
//! what counts as a symlink; asking for the link text of anything else
//! comes back as `NFSERR_INVAL`.

use std::io::{Read, Write};

use tracing::debug;

use crate::protocol::rpc;
use crate::protocol::xdr::nfsstat::nfsstat;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};

use super::post_op_attr_from;

/// Handles READLINK. Attributes of the link ride along in both the
/// success and the failure body once the handle has resolved.
pub async fn nfsproc3_readlink(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let handle = deserialize::<nfs3::nfs_fh3>(input)?;
    debug!("nfsproc3_readlink({},{:?})", xid, handle);

    let id = match context.vfs.fh_to_id(&handle.data) {
        Ok(id) => id,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            nfs3::post_op_attr::Void.serialize(output)?;
            return Ok(());
        }
    };

    let symlink_attr = match context.vfs.getattr(id).await {
        Ok(attr) => post_op_attr_from(Some(attr)),
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            nfs3::post_op_attr::Void.serialize(output)?;
            return Ok(());
        }
    };

    match context.vfs.readlink(id).await {
        Ok(path) => {
            let path = nfs3::nfspath3::from(path);
            debug!(" {} --> {}", xid, path);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfsstat::NFS_OK.serialize(output)?;
            symlink_attr.serialize(output)?;
            path.serialize(output)?;
        }
        Err(stat) => {
            debug!("nfsproc3_readlink error {} --> {:?}", xid, stat);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            symlink_attr.serialize(output)?;
        }
    }
    Ok(())
}
