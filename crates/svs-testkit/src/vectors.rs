//! Golden test vectors for vector comparison.
//!
//! Each vector pairs a local and a remote state vector with the remote's
//! exact wire bytes and the comparison every implementation must compute.

use serde::Serialize;

use svs_core::{compare, MissingRange, StateVector, WriterId};

/// A golden test vector.
#[derive(Debug, Clone, Serialize)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Local entries, applied with `set` in order.
    pub local: &'static [(&'static str, u64)],
    /// Remote entries, applied with `set` in order.
    pub remote: &'static [(&'static str, u64)],
    /// Expected encoding of the remote vector (hex).
    pub remote_hex: &'static str,
    /// Expected missing ranges as `(writer, low, high)`.
    pub missing: &'static [(&'static str, u64, u64)],
    /// Whether the remote should be reported as outdated.
    pub remote_outdated: bool,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "in sync",
            local: &[("a", 1)],
            remote: &[("a", 1)],
            remote_hex: "c906ca0161cb0101",
            missing: &[],
            remote_outdated: false,
        },
        GoldenVector {
            name: "both empty",
            local: &[],
            remote: &[],
            remote_hex: "c900",
            missing: &[],
            remote_outdated: false,
        },
        GoldenVector {
            name: "remote ahead and knows a new writer",
            local: &[("A", 2), ("B", 5)],
            remote: &[("A", 4), ("B", 5), ("C", 1)],
            remote_hex: "c912ca0141cb0104ca0142cb0105ca0143cb0101",
            missing: &[("A", 3, 4), ("C", 1, 1)],
            remote_outdated: false,
        },
        GoldenVector {
            name: "remote behind",
            local: &[("a", 3), ("b", 1)],
            remote: &[("a", 3)],
            remote_hex: "c906ca0161cb0103",
            missing: &[],
            remote_outdated: true,
        },
        GoldenVector {
            name: "each side ahead on a different writer",
            local: &[("a", 7), ("b", 1)],
            remote: &[("a", 2), ("b", 300)],
            remote_hex: "c90dca0161cb0102ca0162cb02012c",
            missing: &[("b", 2, 300)],
            remote_outdated: true,
        },
        GoldenVector {
            name: "case differs so writers are distinct",
            local: &[("w", 1)],
            remote: &[("W", 1), ("w", 1)],
            remote_hex: "c90cca0157cb0101ca0177cb0101",
            missing: &[("W", 1, 1)],
            remote_outdated: false,
        },
        GoldenVector {
            name: "remote writer at zero",
            local: &[],
            remote: &[("z", 0)],
            remote_hex: "c906ca017acb0100",
            missing: &[],
            remote_outdated: false,
        },
    ]
}

fn build(entries: &[(&str, u64)]) -> StateVector {
    let mut sv = StateVector::new();
    for (writer, seq) in entries {
        sv.set(*writer, *seq);
    }
    sv
}

/// Local state vector of `vector`.
pub fn local_vector(vector: &GoldenVector) -> StateVector {
    build(vector.local)
}

/// Remote state vector of `vector`.
pub fn remote_vector(vector: &GoldenVector) -> StateVector {
    build(vector.remote)
}

/// Expected missing ranges of `vector`.
pub fn expected_missing(vector: &GoldenVector) -> Vec<MissingRange> {
    vector
        .missing
        .iter()
        .map(|(writer, low, high)| MissingRange::new(WriterId::from(*writer), *low, *high))
        .collect()
}

/// Check one vector: encoding, decoding and comparison.
pub fn verify_vector(vector: &GoldenVector) -> Result<(), String> {
    let remote = remote_vector(vector);

    let encoded = hex::encode(remote.encode());
    if encoded != vector.remote_hex {
        return Err(format!(
            "{}: encoding mismatch: expected {}, got {}",
            vector.name, vector.remote_hex, encoded
        ));
    }

    let bytes = hex::decode(vector.remote_hex).map_err(|e| format!("{}: {}", vector.name, e))?;
    let parsed = StateVector::parse(&bytes).map_err(|e| format!("{}: {}", vector.name, e))?;
    if parsed != remote {
        return Err(format!("{}: decoded vector differs", vector.name));
    }

    let comparison = compare(&local_vector(vector), &parsed);
    if comparison.missing != expected_missing(vector) {
        return Err(format!(
            "{}: missing ranges {:?}, expected {:?}",
            vector.name, comparison.missing, vector.missing
        ));
    }
    if comparison.remote_outdated != vector.remote_outdated {
        return Err(format!(
            "{}: remote_outdated is {}, expected {}",
            vector.name, comparison.remote_outdated, vector.remote_outdated
        ));
    }

    Ok(())
}

/// Verify all golden vectors.
pub fn verify_all_vectors() -> Result<(), Vec<String>> {
    let errors: Vec<String> = all_vectors()
        .iter()
        .filter_map(|v| verify_vector(v).err())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// All vectors as pretty-printed JSON, for other implementations to load.
pub fn vectors_json() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&all_vectors())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_verify() {
        if let Err(errors) = verify_all_vectors() {
            panic!("golden vectors failed:\n{}", errors.join("\n"));
        }
    }

    #[test]
    fn test_vector_names_unique() {
        let vectors = all_vectors();
        let mut names: Vec<&str> = vectors.iter().map(|v| v.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), vectors.len());
    }

    #[test]
    fn test_json_export() {
        let json = vectors_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), all_vectors().len());
        assert_eq!(value[0]["remote_hex"], "c906ca0161cb0101");
    }
}
