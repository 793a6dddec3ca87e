//! Block framing
//!
//! A packet is a run of length-prefixed blocks closed by an empty line.
//! Requests and replies share the format.
//!
//! ## Wire Format
//! ```text
//! 4\nzset\n      block: decimal length, LF, bytes, LF
//! 5\nscore\n
//! 1\na\n
//! 2\n10\n
//! \n             end of packet
//! ```
//! `\r\n` is accepted wherever `\n` is expected on read.

use std::io::{BufRead, Read, Write};

use bytes::{BufMut, BytesMut};

use crate::error::TransportError;

/// Encode tokens into one packet
pub fn encode_frame<I, S>(tokens: I) -> BytesMut
where
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let mut buf = BytesMut::new();
    for token in tokens {
        let bytes = token.as_ref();
        buf.put_slice(bytes.len().to_string().as_bytes());
        buf.put_u8(b'\n');
        buf.put_slice(bytes);
        buf.put_u8(b'\n');
    }
    buf.put_u8(b'\n');
    buf
}

/// Write a command packet: name block followed by one block per argument
pub fn write_request<W: Write>(
    writer: &mut W,
    command: &str,
    args: &[String],
) -> Result<(), TransportError> {
    let frame = encode_frame(std::iter::once(command).chain(args.iter().map(String::as_str)));
    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}

/// Write a packet of arbitrary tokens
pub fn write_frame<W: Write>(writer: &mut W, tokens: &[String]) -> Result<(), TransportError> {
    let frame = encode_frame(tokens);
    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}

/// Read one packet
///
/// Returns `Ok(None)` on a clean end of stream before any block. Blank lines
/// ahead of the first block are skipped.
pub fn read_frame<R: BufRead>(
    reader: &mut R,
    max_block: usize,
) -> Result<Option<Vec<String>>, TransportError> {
    let mut tokens = Vec::new();
    let mut line = Vec::new();

    loop {
        line.clear();
        let n = reader.read_until(b'\n', &mut line)?;
        if n == 0 {
            if tokens.is_empty() {
                return Ok(None);
            }
            return Err(unexpected_eof());
        }
        if line.last() != Some(&b'\n') {
            return Err(unexpected_eof());
        }

        let header = trim_eol(&line);
        if header.is_empty() {
            if tokens.is_empty() {
                continue;
            }
            return Ok(Some(tokens));
        }

        let len = parse_len(header)?;
        if len > max_block {
            return Err(TransportError::Protocol(format!(
                "Block too large: {} bytes (max {})",
                len, max_block
            )));
        }

        let mut block = vec![0u8; len];
        reader.read_exact(&mut block)?;
        expect_eol(reader)?;

        let token = String::from_utf8(block)
            .map_err(|_| TransportError::Protocol("Block is not valid UTF-8".to_string()))?;
        tokens.push(token);
    }
}

fn trim_eol(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn parse_len(header: &[u8]) -> Result<usize, TransportError> {
    std::str::from_utf8(header)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            TransportError::Protocol(format!(
                "Invalid block length: {:?}",
                String::from_utf8_lossy(header)
            ))
        })
}

fn expect_eol<R: BufRead>(reader: &mut R) -> Result<(), TransportError> {
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte)?;
    if byte[0] == b'\r' {
        reader.read_exact(&mut byte)?;
    }
    if byte[0] != b'\n' {
        return Err(TransportError::Protocol(
            "Block not terminated by newline".to_string(),
        ));
    }
    Ok(())
}

fn unexpected_eof() -> TransportError {
    TransportError::Io(std::io::Error::new(
        std::io::ErrorKind::UnexpectedEof,
        "stream ended inside a packet",
    ))
}
