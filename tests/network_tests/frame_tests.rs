//! Frame Tests
//!
//! Tests for block framing over in-memory streams.

use std::io::{BufReader, Cursor};

use zset_client::network::{encode_frame, read_frame, write_frame, write_request};
use zset_client::TransportError;

const MAX: usize = 1024;

fn tokens(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_encode_layout() {
    let frame = encode_frame(["zget", "s", "a"]);
    assert_eq!(&frame[..], b"4\nzget\n1\ns\n1\na\n\n");
}

#[test]
fn test_encode_empty_token() {
    let frame = encode_frame(["ok", ""]);
    assert_eq!(&frame[..], b"2\nok\n0\n\n\n");
}

#[test]
fn test_write_request_prepends_command() {
    let mut buf = Vec::new();
    write_request(&mut buf, "zsize", &tokens(&["board"])).unwrap();
    assert_eq!(buf, b"5\nzsize\n5\nboard\n\n");
}

// =============================================================================
// Decoding Tests
// =============================================================================

#[test]
fn test_read_written_frame() {
    let sent = tokens(&["ok", "a", "", "line\nbreak"]);
    let mut buf = Vec::new();
    write_frame(&mut buf, &sent).unwrap();

    let mut reader = Cursor::new(buf);
    assert_eq!(read_frame(&mut reader, MAX).unwrap(), Some(sent));
    assert_eq!(read_frame(&mut reader, MAX).unwrap(), None);
}

#[test]
fn test_read_consecutive_frames() {
    let mut reader = Cursor::new(b"2\nok\n\n9\nnot_found\n\n".to_vec());
    assert_eq!(read_frame(&mut reader, MAX).unwrap(), Some(tokens(&["ok"])));
    assert_eq!(
        read_frame(&mut reader, MAX).unwrap(),
        Some(tokens(&["not_found"]))
    );
}

#[test]
fn test_read_accepts_crlf() {
    let mut reader = Cursor::new(b"2\r\nok\r\n1\r\n7\r\n\r\n".to_vec());
    assert_eq!(
        read_frame(&mut reader, MAX).unwrap(),
        Some(tokens(&["ok", "7"]))
    );
}

#[test]
fn test_read_skips_leading_blank_lines() {
    let mut reader = BufReader::new(Cursor::new(b"\n\n2\nok\n\n".to_vec()));
    assert_eq!(read_frame(&mut reader, MAX).unwrap(), Some(tokens(&["ok"])));
}

#[test]
fn test_read_clean_eof() {
    let mut reader = Cursor::new(Vec::new());
    assert_eq!(read_frame(&mut reader, MAX).unwrap(), None);
}

// =============================================================================
// Error Tests
// =============================================================================

#[test]
fn test_eof_inside_packet() {
    let mut reader = Cursor::new(b"2\nok\n".to_vec());
    match read_frame(&mut reader, MAX) {
        Err(TransportError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("Expected EOF error, got {:?}", other),
    }
}

#[test]
fn test_truncated_block() {
    let mut reader = Cursor::new(b"10\nshort".to_vec());
    assert!(matches!(
        read_frame(&mut reader, MAX),
        Err(TransportError::Io(_))
    ));
}

#[test]
fn test_invalid_length_header() {
    let mut reader = Cursor::new(b"abc\nok\n\n".to_vec());
    let err = read_frame(&mut reader, MAX).unwrap_err();
    assert!(matches!(err, TransportError::Protocol(_)));
    assert!(err.to_string().contains("Invalid block length"));
}

#[test]
fn test_block_too_large() {
    let mut reader = Cursor::new(b"2000\n".to_vec());
    let err = read_frame(&mut reader, MAX).unwrap_err();
    assert!(err.to_string().contains("Block too large"));
}

#[test]
fn test_missing_block_terminator() {
    let mut reader = Cursor::new(b"2\nokX\n".to_vec());
    assert!(matches!(
        read_frame(&mut reader, MAX),
        Err(TransportError::Protocol(_))
    ));
}

#[test]
fn test_non_utf8_block() {
    let mut reader = Cursor::new(b"2\n\xff\xfe\n\n".to_vec());
    assert!(matches!(
        read_frame(&mut reader, MAX),
        Err(TransportError::Protocol(_))
    ));
}
