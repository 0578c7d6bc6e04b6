//! Terminator-delimited framing.
//!
//! Every message on the wire ends with `\a\b`. Reads may deliver any slice of
//! the stream, so bytes are accumulated in a [`BytesMut`] and [`decode`] is
//! called again after each read until it yields a frame or fails.

use crate::Error;
use bytes::{Buf, BufMut, BytesMut};

pub const TERMINATOR: &[u8; 2] = b"\x07\x08";

/// Splits the first complete frame off the front of `buf`, stripping its
/// terminator. Returns `Ok(None)` when more bytes are needed.
///
/// `limit` counts the terminator. It is only enforced while no terminator is
/// buffered: a buffer of `limit` bytes or more without one can never become a
/// valid frame.
pub fn decode_raw(buf: &mut BytesMut, limit: usize) -> Result<Option<BytesMut>, Error> {
    match find_terminator(buf) {
        Some(at) => {
            let frame = buf.split_to(at);
            buf.advance(TERMINATOR.len());
            Ok(Some(frame))
        }
        None if buf.len() >= limit => Err(Error::Syntax),
        None => Ok(None),
    }
}

/// [`decode_raw`], with the frame read as text.
pub fn decode(buf: &mut BytesMut, limit: usize) -> Result<Option<String>, Error> {
    Ok(decode_raw(buf, limit)?.map(|frame| text(&frame)))
}

/// Invalid UTF-8 becomes U+FFFD.
pub fn text(frame: &[u8]) -> String {
    String::from_utf8_lossy(frame).into_owned()
}

pub fn encode(text: &str, mut buf: impl BufMut) {
    buf.put_slice(text.as_bytes());
    buf.put_slice(TERMINATOR);
}

fn find_terminator(buf: &[u8]) -> Option<usize> {
    buf.windows(TERMINATOR.len())
        .position(|window| window == TERMINATOR)
}
