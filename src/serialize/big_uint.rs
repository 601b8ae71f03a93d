//! Serde helpers for big integers in the configuration schema, which
//! stores them as decimal strings. Bare JSON integers are accepted too
//! for small hand-written test fixtures.

use num::{BigUint, Num};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

pub fn serialize<S>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    value.to_str_radix(10).serialize(serializer)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DecimalOrUint {
    Decimal(String),
    Uint(u64),
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<BigUint, D::Error>
where
    D: Deserializer<'de>,
{
    match Deserialize::deserialize(deserializer)? {
        DecimalOrUint::Decimal(s) => {
            BigUint::from_str_radix(&s, 10).map_err(de::Error::custom)
        }
        DecimalOrUint::Uint(u) => Ok(BigUint::from(u)),
    }
}
