//! Peer Wire Protocol
//!
//! Defines the URL grammar shared by the transport client and server, and the
//! binary encoding of the fetch response.
//!
//! The response record uses the protobuf wire format so that any
//! protobuf-capable peer can decode it: one field per record, tag 1,
//! wire-type 2 (length-delimited), holding the raw value bytes. Implementing
//! the handful of primitives directly keeps the dependency surface flat; the
//! decoder skips unknown fields so the record can grow compatibly.

use anyhow::Result;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::group::peer::FetchResponse;

/// Prefix under which every peer serves cache lookups.
pub const DEFAULT_BASE_PATH: &str = "/_peercache/";

/// Wire type for varint-encoded fields.
const WIRE_TYPE_VARINT: u8 = 0;
/// Wire type for length-delimited fields (bytes, strings, sub-messages).
const WIRE_TYPE_LEN: u8 = 2;

/// Field number of the value payload in the fetch response.
const VALUE_FIELD: u32 = 1;

/// Characters escaped in a URL path component. Everything except unreserved
/// characters is escaped, so group names and keys survive slashes, spaces and
/// arbitrary unicode.
const PATH_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Escapes one path component (a group name or a key).
pub fn escape_component(component: &str) -> String {
    utf8_percent_encode(component, PATH_COMPONENT).to_string()
}

/// Reverses [`escape_component`] on the server side.
pub fn unescape_component(component: &str) -> Result<String> {
    let decoded = percent_decode_str(component)
        .decode_utf8()
        .map_err(|error| anyhow::anyhow!("invalid escape in path component: {error}"))?;
    Ok(decoded.into_owned())
}

/// Serializes the fetch response into its wire form.
pub fn encode_fetch_response(response: &FetchResponse) -> Vec<u8> {
    let mut buf = Vec::with_capacity(response.value.len() + 8);
    encode_bytes(VALUE_FIELD, &response.value, &mut buf);
    buf
}

/// Deserializes a fetch response, skipping unknown fields.
pub fn decode_fetch_response(mut data: &[u8]) -> Result<FetchResponse> {
    let mut response = FetchResponse::default();
    while !data.is_empty() {
        let (field, wire_type) =
            decode_tag(&mut data).ok_or_else(|| anyhow::anyhow!("truncated field tag"))?;
        if field == VALUE_FIELD && wire_type == WIRE_TYPE_LEN {
            let value = decode_length_delimited(&mut data)
                .ok_or_else(|| anyhow::anyhow!("truncated value field"))?;
            response.value = value.to_vec();
        } else {
            skip_field(wire_type, &mut data).ok_or_else(|| {
                anyhow::anyhow!("malformed field {field} with wire type {wire_type}")
            })?;
        }
    }
    Ok(response)
}

fn encode_varint(mut value: u64, buf: &mut Vec<u8>) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

fn decode_varint(buf: &mut &[u8]) -> Option<u64> {
    let mut result: u64 = 0;
    let mut shift = 0;

    loop {
        let (&byte, rest) = buf.split_first()?;
        *buf = rest;

        result |= ((byte & 0x7F) as u64) << shift;
        if byte & 0x80 == 0 {
            return Some(result);
        }
        shift += 7;
        if shift >= 64 {
            return None;
        }
    }
}

fn encode_tag(field: u32, wire_type: u8, buf: &mut Vec<u8>) {
    encode_varint(((field as u64) << 3) | (wire_type as u64), buf);
}

fn decode_tag(buf: &mut &[u8]) -> Option<(u32, u8)> {
    let tag = decode_varint(buf)?;
    Some(((tag >> 3) as u32, (tag & 0x07) as u8))
}

fn encode_bytes(field: u32, data: &[u8], buf: &mut Vec<u8>) {
    encode_tag(field, WIRE_TYPE_LEN, buf);
    encode_varint(data.len() as u64, buf);
    buf.extend_from_slice(data);
}

fn decode_length_delimited<'a>(buf: &mut &'a [u8]) -> Option<&'a [u8]> {
    let len = decode_varint(buf)? as usize;
    if buf.len() < len {
        return None;
    }
    let (data, rest) = buf.split_at(len);
    *buf = rest;
    Some(data)
}

fn skip_field(wire_type: u8, buf: &mut &[u8]) -> Option<()> {
    match wire_type {
        WIRE_TYPE_VARINT => {
            decode_varint(buf)?;
        }
        WIRE_TYPE_LEN => {
            decode_length_delimited(buf)?;
        }
        // 64-bit fixed
        1 => {
            if buf.len() < 8 {
                return None;
            }
            *buf = &buf[8..];
        }
        // 32-bit fixed
        5 => {
            if buf.len() < 4 {
                return None;
            }
            *buf = &buf[4..];
        }
        _ => return None,
    }
    Some(())
}
