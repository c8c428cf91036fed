use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use std::fmt::{Display, Write};

use crate::dialect::Dialect;
use crate::parser::PingParser;
use crate::reply::IcmpReply;
use crate::stats::{StatisticsRecord, FIELD_NAMES};

const ABSENT: &str = "-";

fn or_absent<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| ABSENT.to_string(), |v| v.to_string())
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| ABSENT.to_string(), |v| format!("{:.3}%", v))
}

fn format_reply(reply: &IcmpReply) -> String {
    let mut line = String::new();
    if let Some(timestamp) = reply.timestamp {
        let _ = write!(line, "[{}] ", timestamp.format("%H:%M:%S%.6f"));
    }
    let _ = write!(
        line,
        "icmp_seq={} ttl={} time={} ms",
        or_absent(reply.icmp_seq),
        or_absent(reply.ttl),
        or_absent(reply.time)
    );
    if reply.duplicate {
        let _ = write!(line, " {}", "(DUP!)".yellow());
    }
    line
}

/// Human readable summary in the spirit of ping's own statistics block.
pub fn text_summary(label: &str, parser: &PingParser, show_replies: bool) -> String {
    let stats = parser.stats();
    let mut out = String::new();

    let _ = writeln!(out, "# {} ({})", label, parser.dialect().to_string().cyan());

    if show_replies {
        for reply in parser.icmp_replies() {
            let _ = writeln!(out, "{}", format_reply(reply));
        }
    }

    let loss = percent(stats.packet_loss_rate);
    let loss = match stats.packet_loss_count {
        Some(0) => loss.green(),
        Some(_) => loss.red(),
        None => loss.normal(),
    };

    let _ = writeln!(
        out,
        "--- {} ping statistics ---",
        parser.destination().unwrap_or(ABSENT)
    );
    let _ = writeln!(
        out,
        "{} packets transmitted, {} received, {} lost, {} packet loss",
        or_absent(stats.packet_transmit),
        or_absent(stats.packet_receive),
        or_absent(stats.packet_loss_count),
        loss
    );
    let _ = writeln!(
        out,
        "rtt min/avg/max/mdev = {}/{}/{}/{} ms",
        or_absent(stats.rtt_min),
        or_absent(stats.rtt_avg),
        or_absent(stats.rtt_max),
        or_absent(stats.rtt_mdev)
    );
    let _ = write!(
        out,
        "{} duplicates, {} duplicate rate",
        or_absent(stats.packet_duplicate_count),
        percent(stats.packet_duplicate_rate)
    );

    out
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    destination: Option<&'a str>,
    dialect: Dialect,
    #[serde(flatten)]
    stats: &'a StatisticsRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    icmp_replies: Option<&'a [IcmpReply]>,
}

pub fn json_summary(parser: &PingParser, show_replies: bool) -> serde_json::Result<String> {
    let summary = JsonSummary {
        destination: parser.destination(),
        dialect: parser.dialect(),
        stats: parser.stats(),
        icmp_replies: show_replies.then(|| parser.icmp_replies()),
    };
    serde_json::to_string_pretty(&summary)
}

/// One CSV row per parsed input, absent values left empty.
pub fn csv_summary<'a, I>(reports: I) -> Result<String, csv::Error>
where
    I: IntoIterator<Item = (&'a str, &'a PingParser)>,
{
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["input", "destination"];
    header.extend(FIELD_NAMES);
    wtr.write_record(&header)?;

    for (label, parser) in reports {
        let dict = parser.as_dict();
        let mut row = vec![
            label.to_string(),
            parser.destination().unwrap_or_default().to_string(),
        ];
        row.extend(FIELD_NAMES.iter().map(|name| match dict.get(*name) {
            None | Some(Value::Null) => String::new(),
            Some(value) => value.to_string(),
        }));
        wtr.write_record(&row)?;
    }

    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BSD_SUCCESS: &str = "PING google.com (172.217.6.238): 56 data bytes
64 bytes from 172.217.6.238: icmp_seq=0 ttl=53 time=20.482 ms
64 bytes from 172.217.6.238: icmp_seq=1 ttl=53 time=32.550 ms

--- google.com ping statistics ---
5 packets transmitted, 5 packets received, 0.0% packet loss
round-trip min/avg/max/stddev = 20.482/31.927/46.093/8.292 ms
";

    fn parsed() -> PingParser {
        let mut parser = PingParser::new();
        parser.parse(BSD_SUCCESS).unwrap();
        parser
    }

    #[test]
    fn text_summary_marks_absent_values() {
        colored::control::set_override(false);
        let text = text_summary("capture.txt", &parsed(), true);
        assert!(text.contains("--- google.com ping statistics ---"));
        assert!(text.contains("5 packets transmitted, 5 received, 0 lost, 0.000% packet loss"));
        assert!(text.contains("rtt min/avg/max/mdev = 20.482/31.927/46.093/8.292 ms"));
        assert!(text.contains("- duplicates, - duplicate rate"));
        assert!(text.contains("icmp_seq=1 ttl=53 time=32.55 ms"));
    }

    #[test]
    fn json_summary_keeps_nulls() {
        let json: Value = serde_json::from_str(&json_summary(&parsed(), false).unwrap()).unwrap();
        assert_eq!(json["destination"], "google.com");
        assert_eq!(json["dialect"], "bsd_mac");
        assert_eq!(json["packet_transmit"], 5);
        assert_eq!(json["packet_duplicate_count"], Value::Null);
        assert!(json.get("icmp_replies").is_none());

        let json: Value = serde_json::from_str(&json_summary(&parsed(), true).unwrap()).unwrap();
        assert_eq!(json["icmp_replies"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn csv_summary_rows() {
        let parser = parsed();
        let idle = PingParser::new();
        let csv = csv_summary([("a.txt", &parser), ("b.txt", &idle)]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("input,destination,packet_transmit,packet_receive"));
        assert!(lines[1].starts_with("a.txt,google.com,5,5,0.0,0,20.482,"));
        assert_eq!(lines[2], "b.txt,,,,,,,,,,,");
    }
}
