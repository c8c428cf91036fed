use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

use crate::dialect::Dialect;

static ICMP_SEQ_REPLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:\[(?P<timestamp>\d+(?:\.\d+)?)\]\s?)?.* from .*\bicmp_seq=(?P<icmp_seq>\d+)\s+ttl=(?P<ttl>\d+)\s+time=(?P<time>\d+(?:\.\d+)?)",
    )
    .unwrap()
});

static BUSYBOX_REPLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r" from .*\bseq=(?P<icmp_seq>\d+)\s+ttl=(?P<ttl>\d+)\s+time=(?P<time>\d+(?:\.\d+)?)",
    )
    .unwrap()
});

// "time<1ms" is reported as 1 ms.
static WINDOWS_REPLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"Reply from .+: bytes=\d+ time[=<](?P<time>\d+(?:\.\d+)?)\s?ms TTL=(?P<ttl>\d+)",
    )
    .unwrap()
});

/// One echo reply line of a ping log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IcmpReply {
    /// Present when Linux ping ran with `-D`.
    pub timestamp: Option<DateTime<Utc>>,
    pub icmp_seq: Option<u32>,
    pub ttl: Option<u8>,
    /// Round trip time in milliseconds.
    pub time: Option<f64>,
    pub duplicate: bool,
}

impl IcmpReply {
    fn from_captures(caps: &Captures<'_>, line: &str) -> Self {
        IcmpReply {
            timestamp: caps
                .name("timestamp")
                .and_then(|m| parse_timestamp(m.as_str())),
            icmp_seq: caps.name("icmp_seq").and_then(|m| m.as_str().parse().ok()),
            ttl: caps.name("ttl").and_then(|m| m.as_str().parse().ok()),
            time: caps.name("time").and_then(|m| m.as_str().parse().ok()),
            duplicate: line.trim_end().ends_with("(DUP!)"),
        }
    }
}

/// Collects the echo replies among `lines`, skipping timeouts, unreachable
/// notices and anything else that is not a reply.
pub fn parse_replies(dialect: Dialect, lines: &[&str]) -> Vec<IcmpReply> {
    let re: &Regex = match dialect {
        Dialect::LinuxIputils | Dialect::BsdMac => &*ICMP_SEQ_REPLY,
        Dialect::BusyBox => &*BUSYBOX_REPLY,
        Dialect::Windows => &*WINDOWS_REPLY,
        Dialect::Unrecognized => return Vec::new(),
    };

    lines
        .iter()
        .filter_map(|line| {
            re.captures(line)
                .map(|caps| IcmpReply::from_captures(&caps, line))
        })
        .collect()
}

// "[1524930937.003555]" carries seconds and microseconds since the epoch.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let (secs, fraction) = raw.split_once('.').unwrap_or((raw, ""));
    let secs: i64 = secs.parse().ok()?;

    let digits: String = fraction.chars().take(9).collect();
    let nanos = if digits.is_empty() {
        0
    } else {
        let scale = 10u32.pow(9 - digits.len() as u32);
        digits.parse::<u32>().ok()? * scale
    };

    DateTime::<Utc>::from_timestamp(secs, nanos)
}
