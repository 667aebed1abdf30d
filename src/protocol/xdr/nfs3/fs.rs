//! File system wide queries for NFS version 3: FSSTAT (procedure 18),
//! FSINFO (procedure 19) and PATHCONF (procedure 20).

#![allow(dead_code)]
#![allow(non_camel_case_types)]

use std::io::{Read, Write};

use super::*;

// FSINFO property bits, RFC 1813 section 3.3.19.

/// File system supports hard links.
pub const FSF_LINK: u32 = 0x0001;
/// File system supports symbolic links.
pub const FSF_SYMLINK: u32 = 0x0002;
/// PATHCONF answers are the same for every object in the file system.
pub const FSF_HOMOGENEOUS: u32 = 0x0008;
/// SETATTR can set file times.
pub const FSF_CANSETTIME: u32 = 0x0010;

/// Success body of FSINFO: the static limits and preferences of the
/// file system.
#[derive(Debug, Default)]
pub struct fsinfo3 {
    pub obj_attributes: post_op_attr,
    /// Largest READ the server accepts, in bytes.
    pub rtmax: u32,
    /// Preferred READ size.
    pub rtpref: u32,
    /// Suggested multiple for READ sizes.
    pub rtmult: u32,
    /// Largest WRITE the server accepts, in bytes.
    pub wtmax: u32,
    /// Preferred WRITE size.
    pub wtpref: u32,
    /// Suggested multiple for WRITE sizes.
    pub wtmult: u32,
    /// Preferred READDIR size.
    pub dtpref: u32,
    pub maxfilesize: size3,
    /// Granularity of file times the server can store.
    pub time_delta: nfstime3,
    /// Bit mask over the `FSF_*` constants.
    pub properties: u32,
}
DeserializeStruct!(
    fsinfo3,
    obj_attributes,
    rtmax,
    rtpref,
    rtmult,
    wtmax,
    wtpref,
    wtmult,
    dtpref,
    maxfilesize,
    time_delta,
    properties
);
SerializeStruct!(
    fsinfo3,
    obj_attributes,
    rtmax,
    rtpref,
    rtmult,
    wtmax,
    wtpref,
    wtmult,
    dtpref,
    maxfilesize,
    time_delta,
    properties
);

/// Success body of FSSTAT: volatile usage numbers.
#[derive(Debug, Default)]
pub struct FSSTAT3resok {
    pub obj_attributes: post_op_attr,
    /// Total bytes in the file system.
    pub tbytes: size3,
    /// Free bytes.
    pub fbytes: size3,
    /// Free bytes available to the caller.
    pub abytes: size3,
    /// Total file slots.
    pub tfiles: size3,
    /// Free file slots.
    pub ffiles: size3,
    /// Free file slots available to the caller.
    pub afiles: size3,
    /// Seconds this answer can be cached; zero means no guarantee.
    pub invarsec: u32,
}
DeserializeStruct!(
    FSSTAT3resok,
    obj_attributes,
    tbytes,
    fbytes,
    abytes,
    tfiles,
    ffiles,
    afiles,
    invarsec
);
SerializeStruct!(
    FSSTAT3resok,
    obj_attributes,
    tbytes,
    fbytes,
    abytes,
    tfiles,
    ffiles,
    afiles,
    invarsec
);

/// Success body of PATHCONF: POSIX pathname limits.
#[derive(Debug, Default)]
pub struct PATHCONF3resok {
    pub obj_attributes: post_op_attr,
    /// Maximum hard link count.
    pub linkmax: u32,
    /// Maximum file name length.
    pub name_max: u32,
    /// Long names are refused rather than truncated.
    pub no_trunc: bool,
    /// Only privileged callers may change ownership.
    pub chown_restricted: bool,
    /// Names compare case-insensitively.
    pub case_insensitive: bool,
    /// Name case is preserved.
    pub case_preserving: bool,
}
DeserializeStruct!(
    PATHCONF3resok,
    obj_attributes,
    linkmax,
    name_max,
    no_trunc,
    chown_restricted,
    case_insensitive,
    case_preserving
);
SerializeStruct!(
    PATHCONF3resok,
    obj_attributes,
    linkmax,
    name_max,
    no_trunc,
    chown_restricted,
    case_insensitive,
    case_preserving
);
