//! Timestamps travel as plain text, `2024-03-01 09:30:00` or
//! `2024-03-01 09:30:00.250000` when there is a fractional part.
use chrono::{NaiveDateTime, Timelike};
use serde::{self, Deserialize, Deserializer, Serializer};

const FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const FORMAT_MICROS: &str = "%Y-%m-%d %H:%M:%S%.6f";
const PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub fn to_text(date: &NaiveDateTime) -> String {
    let format = if date.nanosecond() == 0 { FORMAT } else { FORMAT_MICROS };
    date.format(format).to_string()
}

pub fn serialize<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&to_text(date))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&text, PARSE_FORMAT).map_err(serde::de::Error::custom)
}

#[test]
fn date_text() {
    use chrono::NaiveDate;

    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(9, 30, 0).unwrap();
    assert_eq!(to_text(&date), "2024-03-01 09:30:00");

    let date = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_micro_opt(9, 30, 0, 250_000)
        .unwrap();
    assert_eq!(to_text(&date), "2024-03-01 09:30:00.250000");
    assert_eq!(
        NaiveDateTime::parse_from_str("2024-03-01 09:30:00.250000", PARSE_FORMAT).unwrap(),
        date
    );
}
