//! NMEA-0183 sentence envelope
//!
//! The output unit of the encoder. A sentence owns its armored payload and
//! framing fields. `render` produces the wire form WITHOUT a trailing CRLF;
//! the controller appends `\r\n` exactly once before any sink write, so no
//! component can double-terminate.

use crate::bits::checksum;

/// Talker and sentence identifier for received AIS reports
pub const TALKER_ID: &str = "AIVDM";

/// Maximum sentence length on the wire, CRLF included
pub const MAX_SENTENCE_LEN: usize = 82;

/// One `!AIVDM` fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NmeaSentence {
    /// Total fragments of the logical message, 1..=9
    pub fragment_count: u8,
    /// This fragment's 1-based index
    pub fragment_number: u8,
    /// Correlates fragments of one logical message; `None` renders empty
    pub message_id: Option<u8>,
    /// Radio channel, `'A'` or `'B'`
    pub channel: char,
    /// 6-bit armored payload
    pub payload: String,
    /// Padding bits in the payload's final 6-bit group, 0..=5
    pub fill_bits: u8,
    /// XOR checksum over the data section
    pub checksum: u8,
}

impl NmeaSentence {
    /// Build a fragment, computing its checksum
    pub fn new(
        fragment_count: u8,
        fragment_number: u8,
        message_id: Option<u8>,
        channel: char,
        payload: String,
        fill_bits: u8,
    ) -> Self {
        let mut sentence = Self {
            fragment_count,
            fragment_number,
            message_id,
            channel,
            payload,
            fill_bits,
            checksum: 0,
        };
        sentence.checksum = checksum(sentence.data_section().as_bytes());
        sentence
    }

    /// The bytes between `!` and `*`, exclusive of both
    pub fn data_section(&self) -> String {
        let message_id = match self.message_id {
            Some(id) => id.to_string(),
            None => String::new(),
        };
        format!(
            "{},{},{},{},{},{},{}",
            TALKER_ID,
            self.fragment_count,
            self.fragment_number,
            message_id,
            self.channel,
            self.payload,
            self.fill_bits,
        )
    }

    /// Wire form without the trailing CRLF
    pub fn render(&self) -> String {
        format!("!{}*{:02X}", self.data_section(), self.checksum)
    }
}

impl std::fmt::Display for NmeaSentence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
#[path = "sentence_test.rs"]
mod sentence_test;
