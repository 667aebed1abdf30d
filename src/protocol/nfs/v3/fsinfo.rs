//! The FSINFO procedure (procedure 19), RFC 1813 section 3.3.19.
//!
//! Reports the static limits and preferences of the file system: transfer
//! sizes, the maximum file size, time precision and the property bits.
//! All of it derives from the backend's [limits](crate::vfs::NFSFileSystem::limits).

use std::io::{Read, Write};

use tracing::debug;

use crate::protocol::rpc;
use crate::protocol::xdr::nfsstat::nfsstat;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};

use super::post_op_attr_from;

/// Handles FSINFO. Clients normally ask once per mount, with the root
/// file handle.
pub async fn nfsproc3_fsinfo(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let handle = deserialize::<nfs3::nfs_fh3>(input)?;
    debug!("nfsproc3_fsinfo({},{:?})", xid, handle);

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
    let res = nfs3::fs::fsinfo3 {
        obj_attributes: obj_attr,
        rtmax: limits.read_max,
        rtpref: limits.read_preferred,
        rtmult: 1,
        wtmax: limits.write_max,
        wtpref: limits.write_preferred,
        wtmult: 1,
        dtpref: limits.dir_preferred,
        maxfilesize: limits.max_file_size,
        time_delta: nfs3::nfstime3 { seconds: 0, nseconds: 1 },
        properties: nfs3::fs::FSF_SYMLINK | nfs3::fs::FSF_HOMOGENEOUS | nfs3::fs::FSF_CANSETTIME,
    };
    debug!(" {} --> {:?}", xid, res);
    xdr::rpc::make_success_reply(xid).serialize(output)?;
    nfsstat::NFS_OK.serialize(output)?;
    res.serialize(output)?;
    Ok(())
}
