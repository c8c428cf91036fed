//! Parse the textual output of the `ping` command into structured statistics.
//!
//! Four output dialects are understood: Linux iputils, BusyBox (Alpine),
//! BSD/macOS and Windows.
//!
//! ```
//! use pingparse::PingParser;
//!
//! let output = "\
//! PING 192.168.0.1 (192.168.0.1) 56(84) bytes of data.
//!
//! --- 192.168.0.1 ping statistics ---
//! 1688 packets transmitted, 1553 received, +1 duplicates, 7% packet loss, time 2987ms
//! rtt min/avg/max/mdev = 0.282/0.642/11.699/0.699 ms, pipe 2, ipg/ewma 1.770/0.782 ms
//! ";
//!
//! let mut parser = PingParser::new();
//! parser.parse(output)?;
//! assert_eq!(parser.packet_loss_count(), Some(135));
//! assert_eq!(parser.packet_duplicate_count(), Some(1));
//! assert_eq!(parser.rtt_mdev(), Some(0.699));
//! # Ok::<(), pingparse::PingParseError>(())
//! ```

pub mod dialect;
pub mod error;
pub mod extract;
pub mod output;
pub mod parser;
pub mod reply;
pub mod stats;

pub use dialect::{detect, Detection, Dialect, StatsBlock};
pub use error::{PingParseError, PingParseResult};
pub use extract::{extract, RawFields};
pub use parser::PingParser;
pub use reply::{parse_replies, IcmpReply};
pub use stats::{StatisticsRecord, FIELD_NAMES};
