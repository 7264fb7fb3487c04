use std::fmt::Write;

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

use crate::protocol::{ResponseMessage, SendError};

const INIT_RESPONSE_SIZE: usize = 256;

/// Writes `response` in wire format into `dst`.
///
/// The status line is followed by the headers in insertion order. `Content-Length` always
/// reflects the body; an explicit length is kept only when the body is empty, which lets
/// `HEAD` responses advertise the size of the omitted body.
pub fn encode_response(response: &ResponseMessage, dst: &mut BytesMut) {
    let body = response.body().as_bytes();
    dst.reserve(INIT_RESPONSE_SIZE + body.len());

    // formatting into BytesMut is infallible
    let _ = write!(dst, "{} {} {}\r\n", response.version(), response.status().as_u16(), response.reason());

    let mut length_written = false;
    for (name, value) in response.headers().iter() {
        if name.eq_ignore_ascii_case("content-length") {
            if length_written || !body.is_empty() {
                continue;
            }
            length_written = true;
        }
        let _ = write!(dst, "{name}: {value}\r\n");
    }

    if !length_written {
        let _ = write!(dst, "Content-Length: {}\r\n", body.len());
    }

    dst.put_slice(b"\r\n");
    dst.put_slice(body);
}

/// Response side of the connection codec pair.
#[derive(Debug, Default)]
pub struct ResponseEncoder;

impl ResponseEncoder {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Encoder<ResponseMessage> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: ResponseMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_response(&item, dst);
        Ok(())
    }
}

impl Encoder<&ResponseMessage> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: &ResponseMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_response(item, dst);
        Ok(())
    }
}
