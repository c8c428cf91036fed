use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::str::FromStr;
use tracing::warn;

use crate::dialect::{Dialect, StatsBlock, BUSYBOX_DUPLICATES, BUSYBOX_RTT};
use crate::error::{PingParseError, PingParseResult};

static TRANSMITTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?P<transmit>\d+) packets transmitted").unwrap());

static RECEIVED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?P<receive>\d+) (?:packets )?received").unwrap());

static LINUX_DUPLICATES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+(?P<duplicate>\d+) duplicates,").unwrap());

static LINUX_RTT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"rtt min/avg/max/mdev = (?P<min>\d+(?:\.\d+)?)/(?P<avg>\d+(?:\.\d+)?)/(?P<max>\d+(?:\.\d+)?)/(?P<spread>\d+(?:\.\d+)?) ms",
    )
    .unwrap()
});

static BSD_RTT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"round-trip min/avg/max/stddev = (?P<min>\d+(?:\.\d+)?)/(?P<avg>\d+(?:\.\d+)?)/(?P<max>\d+(?:\.\d+)?)/(?P<spread>\d+(?:\.\d+)?) ms",
    )
    .unwrap()
});

static WINDOWS_SENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"Sent = (?P<transmit>\d+)").unwrap());

static WINDOWS_RECEIVED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Received = (?P<receive>\d+)").unwrap());

static WINDOWS_RTT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"Minimum = (?P<min>\d+(?:\.\d+)?)ms, Maximum = (?P<max>\d+(?:\.\d+)?)ms, Average = (?P<avg>\d+(?:\.\d+)?)ms",
    )
    .unwrap()
});

/// Quantities read straight out of a statistics block. `None` means the
/// dialect did not report the value, never that it was zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawFields {
    pub transmit: Option<u64>,
    pub receive: Option<u64>,
    pub duplicate_count: Option<u64>,
    pub rtt_min: Option<f64>,
    pub rtt_avg: Option<f64>,
    pub rtt_max: Option<f64>,
    /// mdev on Linux, stddev on BSD/macOS.
    pub rtt_spread: Option<f64>,
}

/// Reads the raw statistics of `block` using the grammar of `dialect`.
///
/// Fails with [`PingParseError::EmptyPingStatistics`] when neither the
/// transmitted nor the received count can be found.
pub fn extract(dialect: Dialect, block: &StatsBlock<'_>) -> PingParseResult<RawFields> {
    let raw = match dialect {
        Dialect::LinuxIputils => extract_linux(block),
        Dialect::BusyBox => extract_busybox(block),
        Dialect::BsdMac => extract_bsd(block),
        Dialect::Windows => extract_windows(block),
        Dialect::Unrecognized => RawFields::default(),
    };

    if raw.transmit.is_none() && raw.receive.is_none() {
        warn!(%dialect, destination = block.destination, "statistics block has no packet counts");
        return Err(PingParseError::EmptyPingStatistics {
            destination: block.destination.to_string(),
        });
    }

    Ok(raw)
}

fn extract_linux(block: &StatsBlock<'_>) -> RawFields {
    let Some(count_line) = block.count_line() else {
        return RawFields::default();
    };

    let mut raw = unix_counts(count_line);
    raw.duplicate_count = Some(capture_in(&LINUX_DUPLICATES, count_line, "duplicate").unwrap_or(0));
    fill_rtt(&mut raw, find_captures(&LINUX_RTT, &block.body));
    raw
}

fn extract_busybox(block: &StatsBlock<'_>) -> RawFields {
    let Some(count_line) = block.count_line() else {
        return RawFields::default();
    };

    let mut raw = unix_counts(count_line);
    raw.duplicate_count =
        Some(capture_in(&BUSYBOX_DUPLICATES, count_line, "duplicate").unwrap_or(0));
    fill_rtt(&mut raw, find_captures(&BUSYBOX_RTT, &block.body));
    raw
}

fn extract_bsd(block: &StatsBlock<'_>) -> RawFields {
    let Some(count_line) = block.count_line() else {
        return RawFields::default();
    };

    let mut raw = unix_counts(count_line);
    fill_rtt(&mut raw, find_captures(&BSD_RTT, &block.body));
    raw
}

fn extract_windows(block: &StatsBlock<'_>) -> RawFields {
    let Some(count_line) = block.count_line() else {
        return RawFields::default();
    };

    let mut raw = RawFields {
        transmit: capture_in(&WINDOWS_SENT, count_line, "transmit"),
        receive: capture_in(&WINDOWS_RECEIVED, count_line, "receive"),
        ..RawFields::default()
    };
    fill_rtt(&mut raw, find_captures(&WINDOWS_RTT, &block.body));
    raw
}

fn unix_counts(count_line: &str) -> RawFields {
    RawFields {
        transmit: capture_in(&TRANSMITTED, count_line, "transmit"),
        receive: capture_in(&RECEIVED, count_line, "receive"),
        ..RawFields::default()
    }
}

fn fill_rtt(raw: &mut RawFields, caps: Option<Captures<'_>>) {
    if let Some(caps) = caps {
        raw.rtt_min = number(&caps, "min");
        raw.rtt_avg = number(&caps, "avg");
        raw.rtt_max = number(&caps, "max");
        raw.rtt_spread = number(&caps, "spread");
    }
}

fn find_captures<'h>(re: &Regex, lines: &[&'h str]) -> Option<Captures<'h>> {
    lines.iter().find_map(|&line| re.captures(line))
}

fn capture_in<T: FromStr>(re: &Regex, line: &str, name: &str) -> Option<T> {
    re.captures(line).and_then(|caps| number(&caps, name))
}

// Overflowing or otherwise unparsable tokens count as absent.
fn number<T: FromStr>(caps: &Captures<'_>, name: &str) -> Option<T> {
    caps.name(name)?.as_str().parse().ok()
}
