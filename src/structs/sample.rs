use std::fmt;

use chrono::{DateTime, Utc};
use serde::{
    de::{SeqAccess, Visitor},
    Deserialize, Deserializer, Serialize,
};

/// One observation of an asset price: epoch milliseconds and a USD price.
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub timestamp_ms: i64,
    pub price: f64,
}

impl Sample {
    pub fn new(timestamp_ms: i64, price: f64) -> Self {
        Self {
            timestamp_ms,
            price,
        }
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.timestamp_ms)
    }
}

/*
  Upstream history arrives as `[timestampMs, price]` pairs:
  [[1711843200000, 69702.3087473573], [1711929600000, 71246.9514406015], ...]
*/
impl<'de> Deserialize<'de> for Sample {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SampleVisitor;

        impl<'de> Visitor<'de> for SampleVisitor {
            type Value = Sample;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a [timestamp_ms, price] pair")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let timestamp: f64 = seq
                    .next_element()?
                    .ok_or_else(|| serde::de::Error::invalid_length(0, &self))?;
                let price: f64 = seq
                    .next_element()?
                    .ok_or_else(|| serde::de::Error::invalid_length(1, &self))?;
                if seq.next_element::<serde::de::IgnoredAny>()?.is_some() {
                    return Err(serde::de::Error::invalid_length(3, &self));
                }
                Ok(Sample::new(timestamp.round() as i64, price))
            }
        }

        deserializer.deserialize_seq(SampleVisitor)
    }
}

#[test]
pub fn test_sample_deserializes_from_pair() {
    let samples: Vec<Sample> =
        serde_json::from_str("[[1711843200000, 69702.3087473573], [1711929600000, 71246.95]]")
            .unwrap();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].timestamp_ms, 1_711_843_200_000);
    assert_eq!(samples[1].price, 71246.95);
}

#[test]
pub fn test_sample_rejects_malformed_pair() {
    assert!(serde_json::from_str::<Sample>("[1711843200000]").is_err());
    assert!(serde_json::from_str::<Sample>("[1, 2, 3]").is_err());
    assert!(serde_json::from_str::<Sample>(r#"{"timestamp_ms": 1, "price": 2}"#).is_err());
}

#[test]
pub fn test_sample_time_round_trips_millis() {
    let sample = Sample::new(1_711_843_200_000, 1.0);
    assert_eq!(sample.time().unwrap().timestamp_millis(), 1_711_843_200_000);
}
