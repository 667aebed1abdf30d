//! The PATHCONF procedure (procedure 20), RFC 1813 section 3.3.20.
//!
//! Reports the POSIX pathname rules of the file system. Name limits come
//! from the backend; the behavioral flags describe this server and never
//! vary.

use std::io::{Read, Write};

use tracing::debug;

use crate::protocol::rpc;
use crate::protocol::xdr::nfsstat::nfsstat;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};

use super::post_op_attr_from;

/// Handles PATHCONF: case-sensitive, case-preserving, long names refused
/// rather than truncated.
pub async fn nfsproc3_pathconf(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let handle = deserialize::<nfs3::nfs_fh3>(input)?;
    debug!("nfsproc3_pathconf({},{:?})", xid, handle);

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
    let limits = context.vfs.limits();
    let res = nfs3::fs::PATHCONF3resok {
        obj_attributes: obj_attr,
        linkmax: limits.link_max,
        name_max: limits.name_max,
        no_trunc: true,
        chown_restricted: true,
        case_insensitive: false,
        case_preserving: true,
    };
    debug!(" {} --> {:?}", xid, res);
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    nfsstat::NFS_OK.serialize(output)?;
    res.serialize(output)?;
    Ok(())
}
