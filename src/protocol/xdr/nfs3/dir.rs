//! Directory reading structures for NFS version 3 (RFC 1813 section 3.3.16).
//!
//! The READDIR reply body is not modeled as a struct. Its entry list is
//! streamed by the handler against a byte budget, one [entry3] at a time,
//! so only the argument body and the entry shape live here.

#![allow(dead_code)]
#![allow(non_camel_case_types)]

use std::io::{Read, Write};

use super::*;

/// One directory entry. The cookie names the position just past this entry;
/// handing it back in a later READDIR resumes there.
#[derive(Debug, Default)]
pub struct entry3 {
    pub fileid: fileid3,
    pub name: filename3,
    pub cookie: cookie3,
}
DeserializeStruct!(entry3, fileid, name, cookie);
SerializeStruct!(entry3, fileid, name, cookie);

/// Arguments of READDIR (procedure 16). A zero cookie starts at the
/// beginning of the directory.
#[derive(Debug, Default)]
pub struct READDIR3args {
    pub dir: nfs_fh3,
    pub cookie: cookie3,
    /// Verifier from the reply that produced `cookie`, all zeros on the
    /// first call.
    pub cookieverf: cookieverf3,
    /// Ceiling on the size of the reply, in bytes.
    pub dircount: count3,
}
DeserializeStruct!(READDIR3args, dir, cookie, cookieverf, dircount);
SerializeStruct!(READDIR3args, dir, cookie, cookieverf, dircount);
