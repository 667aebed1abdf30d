//! File content structures for NFS version 3: the READ procedure
//! (RFC 1813 section 3.3.6).

#![allow(dead_code)]
#![allow(non_camel_case_types)]

use std::io::{Read, Write};

use super::*;

/// Arguments of READ (procedure 6).
#[derive(Debug, Default)]
pub struct READ3args {
    pub file: nfs_fh3,
    /// Byte position to start reading at.
    pub offset: offset3,
    /// Number of bytes the client wants.
    pub count: count3,
}
DeserializeStruct!(READ3args, file, offset, count);
SerializeStruct!(READ3args, file, offset, count);

/// Success body of READ. `count` always equals `data.len()`; `eof` reports
/// whether the read reached the end of the file.
#[derive(Debug, Default)]
pub struct READ3resok {
    pub file_attributes: post_op_attr,
    pub count: count3,
    pub eof: bool,
    pub data: Vec<u8>,
}
DeserializeStruct!(READ3resok, file_attributes, count, eof, data);
SerializeStruct!(READ3resok, file_attributes, count, eof, data);
