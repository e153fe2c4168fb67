//! Message Types
//!
//! Messages carry an immutable text payload plus a header filled in partly
//! by the producer (id, timestamp) and partly by the queue (sequence).

use std::fmt;
use std::time::SystemTime;

/// Header information for every message in the queue
#[derive(Debug, Clone)]
pub struct MessageHeader {
    /// Monotonic sequence number assigned by the queue on push (0 until then)
    pub sequence: u64,
    /// Timestamp when the message was created
    pub timestamp: SystemTime,
    /// Identifier of the producer that created this message
    pub producer_id: String,
}

/// A unit of work passed from producer to consumer
///
/// The payload is the message's only identity; the header is metadata.
///
/// # Example
///
/// ```rust
/// use drainq::queue::Message;
///
/// let message = Message::request("producer".to_string(), 7);
/// assert_eq!(message.data, "Request 7");
/// assert_eq!(message.to_string(), "Request 7");
/// ```
#[derive(Debug, Clone)]
pub struct Message {
    pub header: MessageHeader,
    pub data: String,
}

impl Message {
    pub fn new(producer_id: String, data: String) -> Self {
        Self {
            header: MessageHeader {
                sequence: 0,
                timestamp: SystemTime::now(),
                producer_id,
            },
            data,
        }
    }

    /// The labelled request the producer emits for iteration `n`
    pub fn request(producer_id: String, n: usize) -> Self {
        Self::new(producer_id, format!("Request {}", n))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data)
    }
}
