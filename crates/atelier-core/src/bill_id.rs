//! # Bill Identifiers
//!
//! Human-readable, daily-sequential bill ids: `B-YYYYMMDD-NNNN`.
//!
//! ```text
//!   B-20260214-0001
//!   │ │        │
//!   │ │        └── sequence within the day, 0001..=9999, zero padded
//!   │ └─────────── commit date
//!   └───────────── fixed prefix
//! ```
//!
//! The format is an external contract: receipts and reports parse it, so
//! `Display` and `FromStr` must stay bit-exact. Allocation of the next
//! sequence number happens atomically in the database (see
//! `atelier-db::repository::bill`); this module only formats, parses and
//! bounds-checks.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Highest sequence number a single day can hold.
pub const MAX_DAILY_SEQUENCE: u32 = 9999;

const PREFIX: &str = "B-";
const DATE_FORMAT: &str = "%Y%m%d";

/// A bill identifier.
///
/// Ordering follows (date, sequence), which for ids of the same day is
/// commit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BillId {
    date: NaiveDate,
    sequence: u32,
}

impl BillId {
    /// Creates an id, rejecting sequence 0 and anything past 9999.
    pub fn new(date: NaiveDate, sequence: u32) -> CoreResult<Self> {
        if sequence == 0 || sequence > MAX_DAILY_SEQUENCE {
            return Err(CoreError::BillSequenceExhausted {
                date: date.format(DATE_FORMAT).to_string(),
                requested: sequence,
                max: MAX_DAILY_SEQUENCE,
            });
        }
        Ok(BillId { date, sequence })
    }

    /// The first id of a day (`NNNN = 0001`).
    pub fn first_of_day(date: NaiveDate) -> Self {
        BillId { date, sequence: 1 }
    }

    /// The id after this one on the same day.
    ///
    /// ## Errors
    /// `CoreError::BillSequenceExhausted` after `9999`.
    pub fn next(&self) -> CoreResult<Self> {
        BillId::new(self.date, self.sequence + 1)
    }

    /// The `B-YYYYMMDD-` prefix shared by every id of `date`.
    pub fn date_prefix(date: NaiveDate) -> String {
        format!("{}{}-", PREFIX, date.format(DATE_FORMAT))
    }

    /// The commit date encoded in the id.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The sequence number within the day.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for BillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}-{:04}",
            PREFIX,
            self.date.format(DATE_FORMAT),
            self.sequence
        )
    }
}

impl FromStr for BillId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| CoreError::InvalidBillId {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let rest = s
            .strip_prefix(PREFIX)
            .ok_or_else(|| invalid("must start with 'B-'"))?;
        let (date_part, seq_part) = rest
            .split_once('-')
            .ok_or_else(|| invalid("missing sequence separator"))?;

        if date_part.len() != 8 || !date_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("date must be 8 digits (YYYYMMDD)"));
        }
        if seq_part.len() != 4 || !seq_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("sequence must be 4 digits"));
        }

        let date = NaiveDate::parse_from_str(date_part, DATE_FORMAT)
            .map_err(|_| invalid("not a calendar date"))?;
        let sequence: u32 = seq_part
            .parse()
            .map_err(|_| invalid("sequence is not a number"))?;
        if sequence == 0 {
            return Err(invalid("sequence starts at 0001"));
        }

        Ok(BillId { date, sequence })
    }
}

impl Serialize for BillId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BillId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// SQLite encoding (stored as TEXT)
// =============================================================================

#[cfg(feature = "sqlx")]
mod sqlx_impl {
    use super::BillId;
    use sqlx::encode::IsNull;
    use sqlx::error::BoxDynError;
    use sqlx::sqlite::{Sqlite, SqliteTypeInfo};
    use sqlx::{Database, Decode, Encode, Type};

    impl Type<Sqlite> for BillId {
        fn type_info() -> SqliteTypeInfo {
            <String as Type<Sqlite>>::type_info()
        }

        fn compatible(ty: &SqliteTypeInfo) -> bool {
            <String as Type<Sqlite>>::compatible(ty)
        }
    }

    impl<'q> Encode<'q, Sqlite> for BillId {
        fn encode_by_ref(
            &self,
            buf: &mut <Sqlite as Database>::ArgumentBuffer<'q>,
        ) -> Result<IsNull, BoxDynError> {
            <String as Encode<'q, Sqlite>>::encode(self.to_string(), buf)
        }
    }

    impl<'r> Decode<'r, Sqlite> for BillId {
        fn decode(value: <Sqlite as Database>::ValueRef<'r>) -> Result<Self, BoxDynError> {
            let raw = <&'r str as Decode<'r, Sqlite>>::decode(value)?;
            Ok(raw.parse()?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valentine() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 14).unwrap()
    }

    #[test]
    fn test_format_is_bit_exact() {
        assert_eq!(BillId::first_of_day(valentine()).to_string(), "B-20260214-0001");
        assert_eq!(BillId::new(valentine(), 42).unwrap().to_string(), "B-20260214-0042");
        assert_eq!(BillId::new(valentine(), 9999).unwrap().to_string(), "B-20260214-9999");
        assert_eq!(BillId::date_prefix(valentine()), "B-20260214-");
    }

    #[test]
    fn test_parse() {
        let id: BillId = "B-20260214-0123".parse().unwrap();
        assert_eq!(id.date(), valentine());
        assert_eq!(id.sequence(), 123);
        assert_eq!(id.to_string(), "B-20260214-0123");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "",
            "20260214-0001",
            "B-2026021-0001",
            "B-20260214-001",
            "B-20260214-00001",
            "B-20261314-0001",
            "B-20260214-0000",
            "B-20260214-00a1",
            "b-20260214-0001",
        ] {
            assert!(bad.parse::<BillId>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_next_increments_within_day() {
        let first = BillId::first_of_day(valentine());
        let second = first.next().unwrap();
        assert_eq!(second.to_string(), "B-20260214-0002");
        assert!(second > first);
        assert_eq!(second.date(), first.date());
    }

    #[test]
    fn test_sequence_exhaustion_is_an_error() {
        let last = BillId::new(valentine(), MAX_DAILY_SEQUENCE).unwrap();
        let err = last.next().unwrap_err();
        assert!(matches!(
            err,
            CoreError::BillSequenceExhausted { requested: 10_000, max: 9999, .. }
        ));
        assert!(BillId::new(valentine(), 0).is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let id = BillId::first_of_day(valentine());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"B-20260214-0001\"");
        let back: BillId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
