//! The MNT procedure (procedure 1), RFC 1813 Appendix I section I.4.2.
//!
//! Exchanges an export path for the root filehandle of that export. Paths
//! are matched against the single configured export name; anything else
//! answers `MNT3ERR_NOENT`, the same status an unknown path inside the
//! export gets. A successful mount is reported on the mount signal channel
//! when one is configured.

use std::io::{Read, Write};

use tracing::debug;

use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, mount, Serialize};

pub async fn mountproc3_mnt(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let path = deserialize::<mount::dirpath>(input)?;
    let utf8path = std::str::from_utf8(&path).unwrap_or_default();
    debug!("mountproc3_mnt({},{:?})", xid, utf8path);

    let Some(subpath) = utf8path.strip_prefix(context.export_name.as_str()) else {
        debug!(" {} --> no export named {:?}", xid, utf8path);
        xdr::rpc::make_success_reply(xid).serialize(output)?;
        mount::mountstat3::MNT3ERR_NOENT.serialize(output)?;
        return Ok(());
    };
    // Rebuild the remainder as an absolute path inside the export.
    let subpath = subpath.trim_matches('/').as_bytes();
    let mut lookup_path = Vec::with_capacity(subpath.len() + 1);
    lookup_path.push(b'/');
    lookup_path.extend_from_slice(subpath);

    match context.vfs.path_to_id(&lookup_path).await {
        Ok(fileid) => {
            let response = mount::mountres3_ok {
                fhandle: context.vfs.id_to_fh(fileid),
                auth_flavors: vec![
                    xdr::rpc::auth_flavor::AUTH_NULL as u32,
                    xdr::rpc::auth_flavor::AUTH_UNIX as u32,
                ],
            };
            debug!(" {} --> {:?}", xid, response);
            if let Some(ref chan) = context.mount_signal {
                let _ = chan.send(true).await;
            }
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            mount::mountstat3::MNT3_OK.serialize(output)?;
            response.serialize(output)?;
        }
        Err(stat) => {
            debug!(" {} --> MNT3ERR_NOENT ({:?})", xid, stat);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            mount::mountstat3::MNT3ERR_NOENT.serialize(output)?;
        }
    }
    Ok(())
}
