use serde::Serialize;
use serde_json::{Map, Value};

use crate::extract::RawFields;

/// Key names of a [`StatisticsRecord`] snapshot, in display order.
pub const FIELD_NAMES: [&str; 10] = [
    "packet_transmit",
    "packet_receive",
    "packet_loss_rate",
    "packet_loss_count",
    "rtt_min",
    "rtt_avg",
    "rtt_max",
    "rtt_mdev",
    "packet_duplicate_rate",
    "packet_duplicate_count",
];

/// Statistics of one ping run. Rates are percentages, RTTs milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatisticsRecord {
    pub packet_transmit: Option<u64>,
    pub packet_receive: Option<u64>,
    pub packet_loss_rate: Option<f64>,
    pub packet_loss_count: Option<i64>,
    pub rtt_min: Option<f64>,
    pub rtt_avg: Option<f64>,
    pub rtt_max: Option<f64>,
    pub rtt_mdev: Option<f64>,
    pub packet_duplicate_rate: Option<f64>,
    pub packet_duplicate_count: Option<u64>,
}

impl StatisticsRecord {
    /// Builds the record from extracted fields, computing loss and duplicate
    /// rates from the integer counts rather than trusting the rounded
    /// percentages ping prints.
    pub fn derive(raw: &RawFields) -> Self {
        let (packet_loss_count, packet_loss_rate) = loss(raw.transmit, raw.receive);

        StatisticsRecord {
            packet_transmit: raw.transmit,
            packet_receive: raw.receive,
            packet_loss_rate,
            packet_loss_count,
            rtt_min: raw.rtt_min,
            rtt_avg: raw.rtt_avg,
            rtt_max: raw.rtt_max,
            rtt_mdev: raw.rtt_spread,
            packet_duplicate_rate: duplicate_rate(raw.duplicate_count, raw.receive),
            packet_duplicate_count: raw.duplicate_count,
        }
    }

    /// True when no field is present.
    pub fn is_idle(&self) -> bool {
        *self == StatisticsRecord::default()
    }

    /// All ten fields keyed by [`FIELD_NAMES`]; absent values map to `null`.
    pub fn to_map(&self) -> Map<String, Value> {
        let values: [Value; 10] = [
            self.packet_transmit.into(),
            self.packet_receive.into(),
            self.packet_loss_rate.into(),
            self.packet_loss_count.into(),
            self.rtt_min.into(),
            self.rtt_avg.into(),
            self.rtt_max.into(),
            self.rtt_mdev.into(),
            self.packet_duplicate_rate.into(),
            self.packet_duplicate_count.into(),
        ];

        FIELD_NAMES
            .iter()
            .zip(values)
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }
}

fn loss(transmit: Option<u64>, receive: Option<u64>) -> (Option<i64>, Option<f64>) {
    match (transmit, receive) {
        (Some(transmit), Some(receive)) if transmit > 0 => {
            let (Ok(sent), Ok(got)) = (i64::try_from(transmit), i64::try_from(receive)) else {
                return (None, None);
            };
            let lost = sent - got;
            (Some(lost), Some(lost as f64 / transmit as f64 * 100.0))
        }
        _ => (None, None),
    }
}

fn duplicate_rate(duplicate_count: Option<u64>, receive: Option<u64>) -> Option<f64> {
    match (duplicate_count, receive) {
        (Some(duplicates), Some(receive)) if receive > 0 => {
            Some(duplicates as f64 / receive as f64 * 100.0)
        }
        _ => None,
    }
}
