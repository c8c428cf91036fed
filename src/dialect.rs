use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

static UNIX_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"--- (?P<destination>.+?) ping statistics ---").unwrap());

static WINDOWS_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Ping statistics for (?P<destination>.+):$").unwrap());

// "N packets transmitted, M received"
static LINUX_COUNTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+ packets transmitted, \d+ received").unwrap());

// "N packets transmitted, M packets received"
static PACKETS_RECEIVED_COUNTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+ packets transmitted, \d+ packets received").unwrap());

static BARE_SEQ: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bseq=\d+").unwrap());

pub(crate) static BUSYBOX_RTT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"round-trip min/avg/max = (?P<min>\d+(?:\.\d+)?)/(?P<avg>\d+(?:\.\d+)?)/(?P<max>\d+(?:\.\d+)?) ms",
    )
    .unwrap()
});

pub(crate) static BUSYBOX_DUPLICATES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[\s,])(?P<duplicate>\d+) duplicates,").unwrap());

/// The `ping` output grammars this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    LinuxIputils,
    #[serde(rename = "busybox")]
    BusyBox,
    BsdMac,
    Windows,
    #[default]
    Unrecognized,
}

impl Dialect {
    /// Whether the dialect ever reports duplicate replies in its summary.
    pub fn reports_duplicates(self) -> bool {
        matches!(self, Dialect::LinuxIputils | Dialect::BusyBox)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::LinuxIputils => "Linux",
            Dialect::BusyBox => "BusyBox",
            Dialect::BsdMac => "BSD/macOS",
            Dialect::Windows => "Windows",
            Dialect::Unrecognized => "unrecognized",
        };
        f.write_str(name)
    }
}

/// The statistics section of a ping log: the host named in its header and
/// every line after the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsBlock<'a> {
    pub destination: &'a str,
    pub body: Vec<&'a str>,
}

impl<'a> StatsBlock<'a> {
    /// First non-blank line after the header, where every dialect puts its
    /// packet counts.
    pub fn count_line(&self) -> Option<&'a str> {
        self.body.iter().copied().find(|line| !line.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection<'a> {
    pub dialect: Dialect,
    pub block: Option<StatsBlock<'a>>,
    /// Lines before the statistics header. Per-packet replies live here.
    pub preamble: Vec<&'a str>,
}

impl Detection<'_> {
    pub fn unrecognized() -> Self {
        Detection {
            dialect: Dialect::Unrecognized,
            block: None,
            preamble: Vec::new(),
        }
    }

    pub fn is_recognized(&self) -> bool {
        self.block.is_some()
    }
}

/// Classifies captured `ping` output and locates its statistics block.
///
/// The `--- host ping statistics ---` header of the Unix dialects is tried
/// first, then the Windows `Ping statistics for host:` header.
pub fn detect(text: &str) -> Detection<'_> {
    let lines: Vec<&str> = text.lines().collect();

    for (idx, line) in lines.iter().copied().enumerate() {
        if let Some(caps) = UNIX_HEADER.captures(line) {
            let destination = caps.name("destination").map_or("", |m| m.as_str());
            let preamble = lines[..idx].to_vec();
            let block = StatsBlock {
                destination,
                body: lines[idx + 1..].to_vec(),
            };
            return Detection {
                dialect: classify_unix(&preamble, &block),
                block: Some(block),
                preamble,
            };
        }
    }

    for (idx, line) in lines.iter().copied().enumerate() {
        if let Some(caps) = WINDOWS_HEADER.captures(line.trim()) {
            let destination = caps.name("destination").map_or("", |m| m.as_str());
            return Detection {
                dialect: Dialect::Windows,
                block: Some(StatsBlock {
                    destination,
                    body: windows_section(&lines[idx + 1..]),
                }),
                preamble: lines[..idx].to_vec(),
            };
        }
    }

    Detection::unrecognized()
}

fn classify_unix(preamble: &[&str], block: &StatsBlock<'_>) -> Dialect {
    let busybox_rtt = block.body.iter().any(|line| BUSYBOX_RTT.is_match(line));

    match block.count_line() {
        Some(line) if LINUX_COUNTS.is_match(line) => {
            if busybox_rtt {
                Dialect::BusyBox
            } else {
                Dialect::LinuxIputils
            }
        }
        Some(line) if PACKETS_RECEIVED_COUNTS.is_match(line) => {
            let bare_seq = preamble.iter().any(|line| BARE_SEQ.is_match(line));
            if busybox_rtt || bare_seq || BUSYBOX_DUPLICATES.is_match(line) {
                Dialect::BusyBox
            } else {
                Dialect::BsdMac
            }
        }
        // header without a usable count line; extraction reports it
        _ => Dialect::LinuxIputils,
    }
}

// The Windows summary ends at the first blank line after its content.
fn windows_section<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let mut seen_content = false;
    lines
        .iter()
        .copied()
        .take_while(|line| {
            if line.trim().is_empty() {
                !seen_content
            } else {
                seen_content = true;
                true
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_linux_iputils() {
        let text = "PING 192.168.0.1 (192.168.0.1) 56(84) bytes of data.\n\n\
                    --- 192.168.0.1 ping statistics ---\n\
                    1688 packets transmitted, 1553 received, +1 duplicates, 7% packet loss, time 2987ms\n\
                    rtt min/avg/max/mdev = 0.282/0.642/11.699/0.699 ms, pipe 2\n";
        let detection = detect(text);
        assert_eq!(detection.dialect, Dialect::LinuxIputils);
        let block = detection.block.unwrap();
        assert_eq!(block.destination, "192.168.0.1");
        assert_eq!(block.body.len(), 2);
        assert_eq!(detection.preamble.len(), 2);
    }

    #[test]
    fn detects_bsd_without_rtt_line() {
        let text = "PING twitter.com (59.24.3.173): 56 data bytes\n^C\n\
                    --- twitter.com ping statistics ---\n\
                    59 packets transmitted, 0 packets received, 100.0% packet los\n";
        assert_eq!(detect(text).dialect, Dialect::BsdMac);
    }

    #[test]
    fn detects_busybox_by_rtt_line() {
        let text = "PING heise.de (193.99.144.80): 56 data bytes\n\n\
                    --- heise.de ping statistics ---\n\
                    5 packets transmitted, 5 packets received, 0% packet loss\n\
                    round-trip min/avg/max = 0.638/0.683/0.746 ms\n";
        assert_eq!(detect(text).dialect, Dialect::BusyBox);
    }

    #[test]
    fn detects_busybox_by_bare_seq_replies() {
        let text = "PING 10.0.0.1 (10.0.0.1): 56 data bytes\n\
                    64 bytes from 10.0.0.1: seq=0 ttl=64 time=0.936 ms\n\n\
                    --- 10.0.0.1 ping statistics ---\n\
                    3 packets transmitted, 1 packets received, 66% packet loss\n";
        assert_eq!(detect(text).dialect, Dialect::BusyBox);
    }

    #[test]
    fn detects_busybox_on_linux_style_count_line() {
        let text = "--- host ping statistics ---\n\
                    2 packets transmitted, 2 received, 0% packet loss\n\
                    round-trip min/avg/max = 1.000/1.500/2.000 ms\n";
        assert_eq!(detect(text).dialect, Dialect::BusyBox);
    }

    #[test]
    fn windows_block_stops_at_blank_line() {
        let text = "\nPinging 192.168.207.100 with 32 bytes of data:\nRequest timed out.\n\n\
                    Ping statistics for 192.168.207.100:\n    \
                    Packets: Sent = 4, Received = 0, Lost = 4 (100% loss),\n\n\ntrailing noise\n";
        let detection = detect(text);
        assert_eq!(detection.dialect, Dialect::Windows);
        let block = detection.block.unwrap();
        assert_eq!(block.destination, "192.168.207.100");
        assert_eq!(block.body.len(), 1);
        assert!(block.count_line().unwrap().contains("Sent = 4"));
    }

    #[test]
    fn header_without_body_is_still_located() {
        let detection = detect("--- 192.168.0.1 ping statistics ---\n");
        assert_eq!(detection.dialect, Dialect::LinuxIputils);
        assert_eq!(detection.block.unwrap().count_line(), None);
    }

    #[test]
    fn unrecognized_input() {
        assert!(!detect("").is_recognized());
        assert_eq!(detect("hello world\n").dialect, Dialect::Unrecognized);
    }

    #[test]
    fn only_linux_family_reports_duplicates() {
        assert!(Dialect::LinuxIputils.reports_duplicates());
        assert!(Dialect::BusyBox.reports_duplicates());
        assert!(!Dialect::BsdMac.reports_duplicates());
        assert!(!Dialect::Windows.reports_duplicates());
    }
}
