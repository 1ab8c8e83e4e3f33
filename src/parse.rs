use byteorder::{BigEndian, ByteOrder, LittleEndian};
use indexmap::IndexMap;

use crate::error::QueryError;

/// Every out-of-band datagram starts with this header (`FF FF FF FF`).
pub const OOB_HEADER: i32 = -1;
const OOB_HEADER_LEN: usize = 4;

/// Get the [u8] at index `offset` from `data`.
///
/// Mutates `offset` to the index after the byte.
pub fn get_u8(data: &[u8], offset: &mut usize) -> Result<u8, QueryError> {
    let byte: u8 = *data.get(*offset).ok_or_else(|| truncated(*offset, 1))?;
    *offset += 1;
    Ok(byte)
}

/// Get 2 big-endian bytes (as a [u16]) at index `offset` from `data`.
///
/// Mutates `offset` to the index after the bytes.
pub fn get_u16_be(data: &[u8], offset: &mut usize) -> Result<u16, QueryError> {
    let bytes: &[u8] = data
        .get(*offset..*offset + 2)
        .ok_or_else(|| truncated(*offset, 2))?;
    *offset += 2;
    Ok(BigEndian::read_u16(bytes))
}

/// Get 4 big-endian bytes (as a [u32]) at index `offset` from `data`.
///
/// Mutates `offset` to the index after the bytes.
pub fn get_u32_be(data: &[u8], offset: &mut usize) -> Result<u32, QueryError> {
    let bytes: &[u8] = data
        .get(*offset..*offset + 4)
        .ok_or_else(|| truncated(*offset, 4))?;
    *offset += 4;
    Ok(BigEndian::read_u32(bytes))
}

/// Check the out-of-band header and `marker` at the start of `data`, then
/// skip `separators` bytes. Returns the payload that follows.
pub fn strip_preamble<'a>(
    data: &'a [u8],
    marker: &[u8],
    separators: usize,
) -> Result<&'a [u8], QueryError> {
    let header = data
        .get(..OOB_HEADER_LEN)
        .ok_or_else(|| truncated(0, OOB_HEADER_LEN))?;
    let header = LittleEndian::read_i32(header);
    if header != OOB_HEADER {
        return Err(QueryError::MalformedResponse(format!(
            "unknown packet header {header:#010x}"
        )));
    }

    let marker_end = OOB_HEADER_LEN + marker.len();
    match data.get(OOB_HEADER_LEN..marker_end) {
        Some(found) if found == marker => {}
        _ => {
            return Err(QueryError::MalformedResponse(format!(
                "expected {:?} after header",
                String::from_utf8_lossy(marker)
            )))
        }
    }

    data.get(marker_end + separators..)
        .ok_or_else(|| truncated(marker_end, separators))
}

/// Split `key1\value1\key2\value2...` into ordered pairs.
///
/// An unpaired trailing key is dropped.
pub fn split_pairs(text: &str) -> IndexMap<String, String> {
    let tokens: Vec<&str> = text.split('\\').collect();
    tokens
        .chunks_exact(2)
        .map(|pair| (pair[0].to_owned(), pair[1].to_owned()))
        .collect()
}

fn truncated(offset: usize, wanted: usize) -> QueryError {
    QueryError::MalformedResponse(format!(
        "datagram too short: wanted {wanted} byte(s) at offset {offset}"
    ))
}
