//! The LOOKUP procedure (procedure 3), RFC 1813 section 3.3.3.
//!
//! Resolves one name inside a directory to a file handle. Clients walk
//! paths one LOOKUP at a time; the server never sees a multi-component
//! path here.

use std::io::{Read, Write};

use tracing::debug;

use crate::protocol::rpc;
use crate::protocol::xdr::nfsstat::nfsstat;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};

use super::post_op_attr_from;

/// Handles LOOKUP. The success body carries the resolved handle plus
/// attributes of both the object and the directory; the failure body
/// still reports the directory attributes when they are known.
pub async fn nfsproc3_lookup(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let dirops = deserialize::<nfs3::diropargs3>(input)?;
    debug!("nfsproc3_lookup({},{:?})", xid, dirops);

    let dirid = match context.vfs.fh_to_id(&dirops.dir.data) {
        Ok(id) => id,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            nfs3::post_op_attr::Void.serialize(output)?;
            return Ok(());
        }
    };

    let dir_attr = post_op_attr_from(context.vfs.getattr(dirid).await.ok());

    match context.vfs.lookup(dirid, &dirops.name).await {
        Ok(fid) => {
            let obj_attr = post_op_attr_from(context.vfs.getattr(fid).await.ok());
            debug!("nfsproc3_lookup success {} --> {}", xid, fid);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfsstat::NFS_OK.serialize(output)?;
            nfs3::nfs_fh3 { data: context.vfs.id_to_fh(fid) }.serialize(output)?;
            obj_attr.serialize(output)?;
            dir_attr.serialize(output)?;
        }
        Err(stat) => {
            debug!("nfsproc3_lookup error {}({}) --> {:?}", xid, dirops.name, stat);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            dir_attr.serialize(output)?;
        }
    }
    Ok(())
}
