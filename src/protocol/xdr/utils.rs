use std::io::{Read, Write};

/// XDR items always start on a four-byte boundary.
pub const ALIGNMENT: usize = 4;

/// Number of pad bytes that follow `len` bytes of payload.
fn padding_len(len: usize) -> usize {
    (ALIGNMENT - (len % ALIGNMENT)) % ALIGNMENT
}

/// Consumes the pad bytes that follow a `len`-byte item. The sender is
/// required to write zeros here; their value is not checked.
pub fn read_padding(len: usize, src: &mut impl Read) -> std::io::Result<()> {
    let pad_len = padding_len(len);
    if pad_len > 0 {
        let mut pad: [u8; ALIGNMENT] = Default::default();
        src.read_exact(&mut pad[..pad_len])?;
    }
    Ok(())
}

/// Writes the zero pad bytes that follow a `len`-byte item.
pub fn write_padding(len: usize, dest: &mut impl Write) -> std::io::Result<()> {
    let pad_len = padding_len(len);
    if pad_len > 0 {
        let pad: [u8; ALIGNMENT] = Default::default();
        dest.write_all(&pad[..pad_len])?;
    }
    Ok(())
}

pub fn invalid_data(m: &str) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, m)
}
