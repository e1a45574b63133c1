//! Identity cross-check between stored values and vendor-captured data.
//!
//! The vendor delivers captured text fields as `resources.text`, an array of
//! `{attr, value}` entries. Fields are located by their `attr` tag — the
//! array order varies between capture configurations and is never trusted.

use serde_json::Value;

/// Name/DOB pair pulled out of a callback or review payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedIdentity {
    pub name: String,
    pub dob: String,
}

/// What a cross-check concluded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CrosscheckOutcome {
    Match,
    /// Both pairs are echoed so the caller can see exactly what disagreed.
    Mismatch { expected: String, received: String },
    /// The payload carried no usable name/DOB entries.
    FieldsMissing,
}

/// Scan `resources.text` for the entries tagged `name` and `dob`.
pub fn extract_identity(payload: &Value) -> Option<CapturedIdentity> {
    let text = payload.get("resources")?.get("text")?.as_array()?;
    let find = |attr: &str| {
        text.iter()
            .find(|entry| entry.get("attr").and_then(Value::as_str) == Some(attr))
            .and_then(|entry| entry.get("value").and_then(Value::as_str))
            .map(str::to_owned)
    };
    Some(CapturedIdentity {
        name: find("name")?,
        dob: find("dob")?,
    })
}

/// Compare the stored name/DOB against what the vendor captured. Name
/// comparison is case-insensitive; DOB must match exactly.
pub fn crosscheck(
    stored_name: Option<&str>,
    stored_dob: Option<&str>,
    payload: &Value,
) -> CrosscheckOutcome {
    let Some(captured) = extract_identity(payload) else {
        return CrosscheckOutcome::FieldsMissing;
    };
    let (Some(name), Some(dob)) = (stored_name, stored_dob) else {
        return CrosscheckOutcome::FieldsMissing;
    };
    if name.eq_ignore_ascii_case(&captured.name) && dob == captured.dob {
        CrosscheckOutcome::Match
    } else {
        CrosscheckOutcome::Mismatch {
            expected: format!("name={name}, dob={dob}"),
            received: format!("name={}, dob={}", captured.name, captured.dob),
        }
    }
}
