use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::dialect::{detect, Dialect};
use crate::error::PingParseResult;
use crate::extract::extract;
use crate::reply::{parse_replies, IcmpReply};
use crate::stats::StatisticsRecord;

/// Holds the statistics of the most recently parsed ping output.
///
/// Every call to [`PingParser::parse`] replaces the whole state; nothing from
/// an earlier parse survives a later one, including a failed one. A parser is
/// meant to be owned by a single ping session.
#[derive(Debug, Clone, Default)]
pub struct PingParser {
    stats: StatisticsRecord,
    dialect: Dialect,
    destination: Option<String>,
    icmp_replies: Vec<IcmpReply>,
}

impl PingParser {
    pub fn new() -> Self {
        PingParser::default()
    }

    /// Parses the captured stdout of one `ping` run.
    ///
    /// Input that does not look like ping output is not an error: the parser
    /// is reset and every field reads `None`. A statistics header with no
    /// packet counts after it yields
    /// [`PingParseError::EmptyPingStatistics`](crate::PingParseError::EmptyPingStatistics)
    /// and also resets the parser.
    pub fn parse(&mut self, text: &str) -> PingParseResult<()> {
        match PingParser::parse_fresh(text) {
            Ok(parsed) => {
                *self = parsed;
                Ok(())
            }
            Err(e) => {
                *self = PingParser::default();
                Err(e)
            }
        }
    }

    fn parse_fresh(text: &str) -> PingParseResult<Self> {
        trace!(bytes = text.len(), "parsing ping output");

        let detection = detect(text);
        let Some(block) = detection.block else {
            debug!("no ping statistics found");
            return Ok(PingParser::default());
        };

        debug!(
            dialect = %detection.dialect,
            destination = block.destination,
            "parsing ping statistics"
        );

        let raw = extract(detection.dialect, &block)?;

        Ok(PingParser {
            stats: StatisticsRecord::derive(&raw),
            dialect: detection.dialect,
            destination: Some(block.destination.to_string()),
            icmp_replies: parse_replies(detection.dialect, &detection.preamble),
        })
    }

    /// Snapshot of the ten statistics fields; absent values are `null`.
    pub fn as_dict(&self) -> Map<String, Value> {
        self.stats.to_map()
    }

    pub fn stats(&self) -> &StatisticsRecord {
        &self.stats
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Host named in the statistics header.
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    pub fn icmp_replies(&self) -> &[IcmpReply] {
        &self.icmp_replies
    }

    pub fn packet_transmit(&self) -> Option<u64> {
        self.stats.packet_transmit
    }

    pub fn packet_receive(&self) -> Option<u64> {
        self.stats.packet_receive
    }

    /// Lost packets as a percentage of transmitted ones.
    pub fn packet_loss_rate(&self) -> Option<f64> {
        self.stats.packet_loss_rate
    }

    pub fn packet_loss_count(&self) -> Option<i64> {
        self.stats.packet_loss_count
    }

    pub fn rtt_min(&self) -> Option<f64> {
        self.stats.rtt_min
    }

    pub fn rtt_avg(&self) -> Option<f64> {
        self.stats.rtt_avg
    }

    pub fn rtt_max(&self) -> Option<f64> {
        self.stats.rtt_max
    }

    /// mdev (Linux) or stddev (BSD/macOS) of the round trip times.
    pub fn rtt_mdev(&self) -> Option<f64> {
        self.stats.rtt_mdev
    }

    /// Duplicate replies as a percentage of received packets.
    pub fn packet_duplicate_rate(&self) -> Option<f64> {
        self.stats.packet_duplicate_rate
    }

    pub fn packet_duplicate_count(&self) -> Option<u64> {
        self.stats.packet_duplicate_count
    }
}
