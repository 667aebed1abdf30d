//! The FSSTAT procedure (procedure 18), RFC 1813 section 3.3.18.
//!
//! Reports volatile usage numbers for the file system. The backend trait
//! deliberately has no usage query, so the handler answers with generous
//! synthetic totals; clients only use these to draw `df` output, and a
//! read-only export can never run out of space anyway.

use std::io::{Read, Write};

use tracing::debug;

use crate::protocol::rpc;
use crate::protocol::xdr::nfsstat::nfsstat;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};

use super::post_op_attr_from;

/// Handles FSSTAT with fixed statistics: a terabyte of everything.
pub async fn nfsproc3_fsstat(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let handle = deserialize::<nfs3::nfs_fh3>(input)?;
    debug!("nfsproc3_fsstat({},{:?})", xid, handle);

    let id = match context.vfs.fh_to_id(&handle.data) {
        Ok(id) => id,
        Err(stat) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            stat.serialize(output)?;
            nfs3::post_op_attr::Void.serialize(output)?;
            return Ok(());
        }
    };

    let obj_attr = post_op_attr_from(context.vfs.getattr(id).await.ok());
    let res = nfs3::fs::FSSTAT3resok {
        obj_attributes: obj_attr,
        tbytes: 1024 * 1024 * 1024 * 1024,
        fbytes: 1024 * 1024 * 1024 * 1024,
        abytes: 1024 * 1024 * 1024 * 1024,
        tfiles: 1024 * 1024 * 1024,
        ffiles: 1024 * 1024 * 1024,
        afiles: 1024 * 1024 * 1024,
        invarsec: u32::MAX,
    };
    debug!(" {} --> {:?}", xid, res);
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    nfsstat::NFS_OK.serialize(output)?;
    res.serialize(output)?;
    Ok(())
}
