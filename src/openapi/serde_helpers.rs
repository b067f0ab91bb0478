use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MaybeStringWrapped<T> {
    Str(String),
    Val(T),
}

impl<T: FromStr> MaybeStringWrapped<T> {
    pub fn into_inner(self) -> Result<T, T::Err> {
        match self {
            MaybeStringWrapped::Str(s) => s.trim().parse(),
            MaybeStringWrapped::Val(v) => Ok(v),
        }
    }
}

/// Scalars the open data services put in text columns
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

/// Coordinates come back as numbers from some services and as strings from others.
/// Null, missing and blank all decode to 0.0.
pub fn deserialize_lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<MaybeStringWrapped<f64>> = Deserialize::deserialize(deserializer)?;
    match value {
        None => Ok(0.0),
        Some(MaybeStringWrapped::Str(s)) if s.trim().is_empty() => Ok(0.0),
        Some(wrapped) => wrapped
            .into_inner()
            .map_err(|e| de::Error::custom(format!("invalid number: {}", e))),
    }
}

/// Null and missing decode to an empty string, numbers keep their textual form
pub fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Scalar> = Deserialize::deserialize(deserializer)?;
    Ok(match value {
        None => String::new(),
        Some(Scalar::Str(s)) => s,
        Some(Scalar::Int(i)) => i.to_string(),
        Some(Scalar::Float(f)) => f.to_string(),
        Some(Scalar::Bool(b)) => b.to_string(),
    })
}
