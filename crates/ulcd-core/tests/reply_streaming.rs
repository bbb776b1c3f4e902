//! Integration tests for the ulcd-core reply decoder.
//!
//! A serial line delivers bytes in arbitrary chunks.  These tests feed the
//! decoder one byte at a time, the way a driver does when it only reads what
//! `InsufficientData` asks for, and check that every reply shape completes
//! with exactly the advertised number of bytes.

use ulcd_core::{decode_reply, protocol::ACK, ProtocolError, Reply, SpeCommand};

/// Feeds `stream` into the decoder byte by byte until a reply is produced.
fn decode_incrementally(command: &SpeCommand, stream: &[u8]) -> (Reply, usize) {
    let mut buf = Vec::new();
    for byte in stream {
        buf.push(*byte);
        match decode_reply(command, &buf) {
            Ok(done) => return done,
            Err(ProtocolError::InsufficientData { needed, available }) => {
                assert!(needed > available, "decoder must ask for more bytes");
            }
            Err(e) => panic!("unexpected decode error: {e}"),
        }
    }
    panic!("stream ended before the reply was complete");
}

#[test]
fn test_model_reply_decodes_incrementally() {
    let mut stream = vec![ACK, 0x00, 0x09];
    stream.extend_from_slice(b"uLCD-43PT");

    let (reply, consumed) = decode_incrementally(&SpeCommand::GetModel, &stream);

    assert_eq!(reply, Reply::Text("uLCD-43PT".to_string()));
    assert_eq!(consumed, stream.len());
}

#[test]
fn test_touch_reply_leaves_trailing_bytes_unconsumed() {
    // The next reply's ACK is already in the buffer.
    let stream = [ACK, 0x01, 0x40, ACK];

    let (reply, consumed) =
        decode_reply(&SpeCommand::TouchGet(ulcd_core::protocol::TouchQuery::X), &stream)
            .expect("complete reply");

    assert_eq!(reply, Reply::Word(0x0140));
    assert_eq!(consumed, 3);
}

#[test]
fn test_set_baud_reply_is_single_ack() {
    let cmd = SpeCommand::SetBaud {
        index: ulcd_core::BaudRate::B115200.spe_index(),
    };

    let (reply, consumed) = decode_incrementally(&cmd, &[ACK]);

    assert_eq!(reply, Reply::Ack);
    assert_eq!(consumed, 1);
}
