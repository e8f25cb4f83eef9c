//! The transaction record returned by `sui_getTransactionBlock`.
//!
//! The record is kept as the node sent it so that it can be handed to the
//! explanation prompt untouched. The accessors below are read-only views over
//! the handful of fields the presentation layer summarises.

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const MIST_PER_SUI: u64 = 1_000_000_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TransactionRecord(Value);

impl TransactionRecord {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn digest(&self) -> Option<&str> {
        self.0.get("digest")?.as_str()
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let millis = lenient_u64(self.0.get("timestampMs")?)?;
        DateTime::from_timestamp_millis(i64::try_from(millis).ok()?)
    }

    pub fn status(&self) -> Option<ExecutionStatus> {
        ExecutionStatus::deserialize(self.0.pointer("/effects/status")?).ok()
    }

    pub fn gas_used(&self) -> Option<GasCostSummary> {
        GasCostSummary::deserialize(self.0.pointer("/effects/gasUsed")?).ok()
    }

    pub fn epoch(&self) -> Option<u64> {
        lenient_u64(self.0.pointer("/effects/executedEpoch")?)
    }

    /// Balance changes that could be read; malformed entries are left out.
    pub fn balance_changes(&self) -> Vec<BalanceChange> {
        self.0
            .get("balanceChanges")
            .and_then(Value::as_array)
            .map(|changes| changes.iter().filter_map(BalanceChange::from_value).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    Failure {
        #[serde(default)]
        error: Option<String>,
    },
}

impl ExecutionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Failure { .. } => "Failed",
        }
    }
}

/// Gas accounting in MIST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasCostSummary {
    #[serde(deserialize_with = "de_mist")]
    pub computation_cost: u64,
    #[serde(deserialize_with = "de_mist")]
    pub storage_cost: u64,
    #[serde(deserialize_with = "de_mist")]
    pub storage_rebate: u64,
    #[serde(default, deserialize_with = "de_mist")]
    pub non_refundable_storage_fee: u64,
}

impl GasCostSummary {
    /// Computation plus storage minus rebate. Negative when the rebate is larger.
    pub fn net_fee(&self) -> i128 {
        i128::from(self.computation_cost) + i128::from(self.storage_cost)
            - i128::from(self.storage_rebate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceChange {
    pub owner: String,
    pub coin_type: String,
    pub amount: i128,
}

impl BalanceChange {
    fn from_value(value: &Value) -> Option<Self> {
        let owner = match value.get("owner")? {
            Value::String(owner) => owner.clone(),
            Value::Object(map) => match map.values().next() {
                Some(Value::String(inner)) if map.len() == 1 => inner.clone(),
                _ => Value::Object(map.clone()).to_string(),
            },
            other => other.to_string(),
        };
        let amount = match value.get("amount")? {
            Value::String(raw) => raw.parse().ok()?,
            Value::Number(n) => i128::from(n.as_i64()?),
            _ => return None,
        };
        Some(Self {
            owner,
            coin_type: value.get("coinType")?.as_str()?.to_string(),
            amount,
        })
    }
}

/// Renders a MIST amount as SUI rounded to six decimals, e.g. `0.001998`.
pub fn format_sui(mist: i128) -> String {
    const MIST_PER_MICRO_SUI: u128 = 1_000;
    let micros = (mist.unsigned_abs() + MIST_PER_MICRO_SUI / 2) / MIST_PER_MICRO_SUI;
    let sign = if mist < 0 && micros > 0 { "-" } else { "" };
    format!("{sign}{}.{:06}", micros / 1_000_000, micros % 1_000_000)
}

fn lenient_u64(value: &Value) -> Option<u64> {
    match value {
        Value::String(raw) => raw.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

fn de_mist<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    lenient_u64(&value)
        .ok_or_else(|| de::Error::custom(format!("expected a MIST amount, got {value}")))
}
