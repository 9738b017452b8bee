//! Wire messages for the spanning-tree protocol.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Participant identifier within a group, in `[0, N)`.
pub type ParticipantId = usize;

/// Numeric wire tag of each message kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tag {
    Discover = 1,
    Reject = 2,
    Terminate = 3,
}

/// A protocol message between two participants.
///
/// DISCOVER carries the sender's root path with the destination id already
/// appended by the sender. REJECT and TERMINATE carry no payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    Discover(Vec<ParticipantId>),
    Reject,
    Terminate,
}

impl Message {
    /// The wire tag of this message.
    pub fn tag(&self) -> Tag {
        match self {
            Message::Discover(_) => Tag::Discover,
            Message::Reject => Tag::Reject,
            Message::Terminate => Tag::Terminate,
        }
    }

    /// Encode the payload for a frame. Zero-payload kinds encode empty.
    pub(crate) fn encode_payload(&self) -> Result<Bytes> {
        match self {
            Message::Discover(path) => Ok(Bytes::from(bincode::serialize(path)?)),
            Message::Reject | Message::Terminate => Ok(Bytes::new()),
        }
    }

    /// Decode a frame payload under the given tag.
    ///
    /// The DISCOVER path is sized by the frame itself; the zero-payload
    /// kinds reject stray bytes.
    pub(crate) fn decode(tag: Tag, payload: &[u8]) -> Result<Self> {
        match tag {
            Tag::Discover => Ok(Message::Discover(bincode::deserialize(payload)?)),
            Tag::Reject if payload.is_empty() => Ok(Message::Reject),
            Tag::Terminate if payload.is_empty() => Ok(Message::Terminate),
            Tag::Reject | Tag::Terminate => Err(Error::StrayPayload { tag }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_variants() {
        assert_eq!(Message::Discover(vec![0]).tag(), Tag::Discover);
        assert_eq!(Message::Reject.tag(), Tag::Reject);
        assert_eq!(Message::Terminate.tag(), Tag::Terminate);
    }

    #[test]
    fn discover_payload_carries_the_path() {
        let msg = Message::Discover(vec![0, 3, 1]);
        let payload = msg.encode_payload().unwrap();
        assert!(!payload.is_empty());
        assert_eq!(Message::decode(Tag::Discover, &payload).unwrap(), msg);
    }

    #[test]
    fn zero_payload_kinds_encode_empty() {
        assert!(Message::Reject.encode_payload().unwrap().is_empty());
        assert!(Message::Terminate.encode_payload().unwrap().is_empty());
        assert_eq!(Message::decode(Tag::Reject, &[]).unwrap(), Message::Reject);
        assert_eq!(Message::decode(Tag::Terminate, &[]).unwrap(), Message::Terminate);
    }

    #[test]
    fn stray_payload_is_rejected() {
        let err = Message::decode(Tag::Terminate, &[1, 2]).unwrap_err();
        assert!(matches!(err, Error::StrayPayload { tag: Tag::Terminate }));
    }
}
