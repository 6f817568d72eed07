//! Frame codec for the front-end socket.
//!
//! Each direction carries one JSON body per query, prefixed with a 4-byte
//! big-endian length.

use std::io::{Read, Write};

use crate::UiError;

// A connection record or rule is a few hundred bytes; anything near this
// limit is a corrupt stream, not a legitimate reply.
const MAX_FRAME_LEN: u32 = 1 << 20;

pub(crate) fn write_frame<W: Write>(writer: &mut W, body: &[u8]) -> Result<(), UiError> {
    writer.write_all(&(body.len() as u32).to_be_bytes())?;
    writer.write_all(body)?;
    writer.flush()?;
    Ok(())
}

pub(crate) fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>, UiError> {
    let mut len_bytes = [0u8; 4];
    reader.read_exact(&mut len_bytes)?;
    let len = u32::from_be_bytes(len_bytes);
    if len > MAX_FRAME_LEN {
        return Err(UiError::OversizedFrame(len));
    }

    let mut body = vec![0u8; len as usize];
    reader.read_exact(&mut body)?;
    Ok(body)
}
