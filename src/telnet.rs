//! Telnet stream filtering for the console connection.
//!
//! The console speaks RFC 854 telnet and opens every connection by
//! negotiating options (echo, suppress-go-ahead, window size). The adapter is
//! not a terminal, so the filter refuses every option the server offers or
//! requests and hands only data bytes to the text layer.
//!
//! ## Sequences handled
//!
//! - `IAC IAC` - escaped data byte 255
//! - `IAC WILL|WONT|DO|DONT <option>` - negotiation, refused where needed
//! - `IAC SB <option> ... IAC SE` - sub-negotiation, discarded
//! - `IAC <command>` - any other command (NOP, GA, ...), discarded
//!
//! The line-editing console also emits ANSI CSI sequences (`ESC [ ... final`)
//! around echoed input; those are dropped as well.

/// Interpret As Command
pub const IAC: u8 = 255;
pub const DONT: u8 = 254;
pub const DO: u8 = 253;
pub const WONT: u8 = 252;
pub const WILL: u8 = 251;
/// Start of sub-negotiation
pub const SB: u8 = 250;
/// End of sub-negotiation
pub const SE: u8 = 240;

const ESC: u8 = 0x1b;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterState {
    Data,
    Iac,
    Negotiation(u8),
    SubNegotiation,
    SubNegotiationIac,
    Escape,
    Csi,
}

/// Output of one [`TelnetFilter::feed`] call
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Filtered {
    /// Console data with all telnet and terminal control removed
    pub data: Vec<u8>,
    /// Negotiation replies that must be written back to the server
    pub replies: Vec<u8>,
}

/// Stateful IAC filter
///
/// Sequences split across reads are carried over in the filter state, so the
/// filter can be fed straight from successive socket reads.
#[derive(Debug, Clone)]
pub struct TelnetFilter {
    state: FilterState,
}

impl Default for TelnetFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TelnetFilter {
    pub fn new() -> Self {
        Self {
            state: FilterState::Data,
        }
    }

    /// Filter a chunk of inbound bytes.
    ///
    /// # Example
    /// ```rust
    /// use jcli::telnet::{TelnetFilter, IAC, WILL, DONT};
    ///
    /// let mut filter = TelnetFilter::new();
    /// // "jcli" + IAC WILL ECHO + " : "
    /// let out = filter.feed(&[b'j', b'c', b'l', b'i', IAC, WILL, 1, b' ', b':', b' ']);
    ///
    /// assert_eq!(out.data, b"jcli : ");
    /// assert_eq!(out.replies, vec![IAC, DONT, 1]);
    /// ```
    pub fn feed(&mut self, input: &[u8]) -> Filtered {
        let mut out = Filtered::default();

        for &byte in input {
            self.state = match self.state {
                FilterState::Data => match byte {
                    IAC => FilterState::Iac,
                    ESC => FilterState::Escape,
                    _ => {
                        out.data.push(byte);
                        FilterState::Data
                    }
                },
                FilterState::Iac => match byte {
                    IAC => {
                        out.data.push(IAC);
                        FilterState::Data
                    }
                    WILL | WONT | DO | DONT => FilterState::Negotiation(byte),
                    SB => FilterState::SubNegotiation,
                    _ => FilterState::Data,
                },
                FilterState::Negotiation(verb) => {
                    match verb {
                        WILL => out.replies.extend_from_slice(&[IAC, DONT, byte]),
                        DO => out.replies.extend_from_slice(&[IAC, WONT, byte]),
                        // WONT / DONT need no acknowledgement
                        _ => {}
                    }
                    FilterState::Data
                }
                FilterState::SubNegotiation => match byte {
                    IAC => FilterState::SubNegotiationIac,
                    _ => FilterState::SubNegotiation,
                },
                FilterState::SubNegotiationIac => match byte {
                    SE => FilterState::Data,
                    _ => FilterState::SubNegotiation,
                },
                FilterState::Escape => match byte {
                    b'[' => FilterState::Csi,
                    // two-byte escape, drop both
                    _ => FilterState::Data,
                },
                FilterState::Csi => match byte {
                    0x40..=0x7e => FilterState::Data,
                    _ => FilterState::Csi,
                },
            };
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_data_passes_through() {
        let mut filter = TelnetFilter::new();
        let out = filter.feed(b"Username: ");
        assert_eq!(out.data, b"Username: ");
        assert!(out.replies.is_empty());
    }

    #[test]
    fn test_refuses_do_and_will() {
        let mut filter = TelnetFilter::new();
        // IAC DO NAWS, IAC WILL SGA
        let out = filter.feed(&[IAC, DO, 31, IAC, WILL, 3]);
        assert!(out.data.is_empty());
        assert_eq!(out.replies, vec![IAC, WONT, 31, IAC, DONT, 3]);
    }

    #[test]
    fn test_wont_needs_no_reply() {
        let mut filter = TelnetFilter::new();
        let out = filter.feed(&[IAC, WONT, 1, b'o', b'k']);
        assert_eq!(out.data, b"ok");
        assert!(out.replies.is_empty());
    }

    #[test]
    fn test_escaped_iac_is_data() {
        let mut filter = TelnetFilter::new();
        let out = filter.feed(&[b'a', IAC, IAC, b'b']);
        assert_eq!(out.data, vec![b'a', 255, b'b']);
    }

    #[test]
    fn test_sub_negotiation_is_discarded() {
        let mut filter = TelnetFilter::new();
        let out = filter.feed(&[b'x', IAC, SB, 24, 1, 2, 3, IAC, SE, b'y']);
        assert_eq!(out.data, b"xy");
    }

    #[test]
    fn test_sequence_split_across_reads() {
        let mut filter = TelnetFilter::new();
        let first = filter.feed(&[b'a', IAC]);
        let second = filter.feed(&[DO]);
        let third = filter.feed(&[1, b'b']);

        assert_eq!(first.data, b"a");
        assert!(second.replies.is_empty());
        assert_eq!(third.replies, vec![IAC, WONT, 1]);
        assert_eq!(third.data, b"b");
    }

    #[test]
    fn test_ansi_csi_sequences_are_stripped() {
        let mut filter = TelnetFilter::new();
        let out = filter.feed(b"\x1b[2Kgroup -l\x1b[10D\r\n");
        assert_eq!(out.data, b"group -l\r\n");
    }
}
