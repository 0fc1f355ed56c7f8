//! Byte signatures and the exact-match pattern search.
//!
//! Signatures are versioned configuration, not compiled-in literals: each
//! game build ships its own artifact pattern and field offsets, and the test
//! suite substitutes synthetic ones. The builtin set carries the offsets
//! reverse-engineered from the Heat vehicle physics job block.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::gear::GearField;

/// Find every offset in `buffer` where `pattern` matches exactly, in
/// ascending order.
///
/// Candidate positions are screened with a `memchr` first-byte pass before
/// the full-length comparison runs. The scan reads megabytes of target
/// memory per second; an unfiltered compare at every position is the
/// dominant cost without this.
pub fn find_all(buffer: &[u8], pattern: &[u8]) -> Vec<usize> {
    let mut matches = Vec::new();
    if pattern.is_empty() || buffer.len() < pattern.len() {
        return matches;
    }

    let first = pattern[0];
    let last_start = buffer.len() - pattern.len();
    let mut pos = 0;

    while pos <= last_start {
        let Some(found) = memchr::memchr(first, &buffer[pos..=last_start]) else {
            break;
        };
        let start = pos + found;
        if buffer[start..start + pattern.len()] == *pattern {
            matches.push(start);
        }
        pos = start + 1;
    }

    matches
}

/// Parse a signature pattern string of hex byte tokens ("76 65 68 ...").
/// Wildcards are rejected: the scanner matches exact bytes only.
pub fn parse_pattern(pattern: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    for token in pattern.split_whitespace() {
        if token == "??" || token == "?" {
            return Err(Error::InvalidSignature(
                "wildcard tokens are not supported".to_string(),
            ));
        }
        let value = u8::from_str_radix(token, 16)
            .map_err(|e| Error::InvalidSignature(format!("invalid token '{token}': {e}")))?;
        bytes.push(value);
    }

    if bytes.is_empty() {
        return Err(Error::InvalidSignature("pattern is empty".to_string()));
    }
    Ok(bytes)
}

pub fn format_pattern(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// A window near a matched pattern that the verifier samples over time.
/// Offsets are relative to the match address.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProbeWindow {
    pub offset: i64,
    pub size: usize,
}

/// Everything needed to locate one tracked field: the artifact pattern, the
/// displacement from a match to the gear integer, and the two probe windows
/// the verifier checks (one expected live, one expected static).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSignature {
    pub pattern: String,
    pub field_offset: i64,
    pub live_probe: ProbeWindow,
    pub static_probe: ProbeWindow,
}

impl FieldSignature {
    pub fn pattern_bytes(&self) -> Result<Vec<u8>> {
        parse_pattern(&self.pattern)
    }
}

/// Versioned signature set for one game build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureSet {
    pub version: String,
    /// Temporal sampler rounds per probe. Each round past the first costs
    /// `sample_delay_ms` of wall-clock time, so keep this small.
    pub sample_iterations: u32,
    pub sample_delay_ms: u64,
    pub current_gear: FieldSignature,
    pub last_gear: FieldSignature,
}

impl SignatureSet {
    pub fn field(&self, field: GearField) -> &FieldSignature {
        match field {
            GearField::Current => &self.current_gear,
            GearField::Last => &self.last_gear,
        }
    }

    /// Signatures for the NFS Heat 1.0 build.
    ///
    /// The anchor is the "vehiclePhysicsJob" job-name string embedded in the
    /// transmission owner struct. Field offsets and probe windows were
    /// derived empirically against that build and will not survive a game
    /// update; ship a JSON set for new builds instead of editing these.
    pub fn builtin() -> Self {
        // "vehiclePhysicsJob"
        const ARTIFACT: &str =
            "76 65 68 69 63 6C 65 50 68 79 73 69 63 73 4A 6F 62";
        // Current gear integer relative to the artifact.
        const CURRENT_GEAR_OFFSET: i64 = 0x53D0;
        // Last gear trails the current gear field by a fixed displacement.
        const LAST_GEAR_OFFSET: i64 = CURRENT_GEAR_OFFSET + 0x6A8;

        Self {
            version: "nfs-heat-1.0".to_string(),
            sample_iterations: 3,
            sample_delay_ms: 400,
            current_gear: FieldSignature {
                pattern: ARTIFACT.to_string(),
                field_offset: CURRENT_GEAR_OFFSET,
                // Physics state block just below the gear field; updated
                // every simulation tick regardless of gear.
                live_probe: ProbeWindow {
                    offset: CURRENT_GEAR_OFFSET - 0x30,
                    size: 0x30,
                },
                // Job-table pointer straight after the padded job name;
                // constant for the lifetime of the struct.
                static_probe: ProbeWindow {
                    offset: 0x18,
                    size: 8,
                },
            },
            last_gear: FieldSignature {
                pattern: ARTIFACT.to_string(),
                field_offset: LAST_GEAR_OFFSET,
                live_probe: ProbeWindow {
                    offset: LAST_GEAR_OFFSET - 0x30,
                    size: 0x30,
                },
                static_probe: ProbeWindow {
                    offset: 0x18,
                    size: 8,
                },
            },
        }
    }
}

pub fn load_signatures<P: AsRef<Path>>(path: P) -> Result<SignatureSet> {
    let content = fs::read_to_string(path)?;
    let set = serde_json::from_str(&content)?;
    Ok(set)
}

pub fn save_signatures<P: AsRef<Path>>(path: P, set: &SignatureSet) -> Result<()> {
    let content = serde_json::to_string_pretty(set)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_all_returns_exact_offsets_ascending() {
        let buffer = b"xxABxABxxAB";
        let offsets = find_all(buffer, b"AB");
        assert_eq!(offsets, vec![2, 5, 9]);
    }

    #[test]
    fn test_find_all_no_match() {
        assert!(find_all(b"aaaa", b"ab").is_empty());
        assert!(find_all(b"", b"ab").is_empty());
    }

    #[test]
    fn test_find_all_pattern_longer_than_buffer() {
        assert!(find_all(b"ab", b"abc").is_empty());
    }

    #[test]
    fn test_find_all_match_at_buffer_end() {
        let offsets = find_all(b"zzzzAB", b"AB");
        assert_eq!(offsets, vec![4]);
    }

    #[test]
    fn test_find_all_overlapping_matches() {
        // First-byte filter must not skip a match starting inside a
        // previous match.
        let offsets = find_all(b"aaa", b"aa");
        assert_eq!(offsets, vec![0, 1]);
    }

    #[test]
    fn test_find_all_first_byte_mismatch_everywhere() {
        let buffer = vec![0x11u8; 4096];
        assert!(find_all(&buffer, &[0x22, 0x11]).is_empty());
    }

    #[test]
    fn test_parse_pattern_hex_tokens() {
        let bytes = parse_pattern("76 65 68").unwrap();
        assert_eq!(bytes, vec![0x76, 0x65, 0x68]);
    }

    #[test]
    fn test_parse_pattern_rejects_wildcards() {
        assert!(parse_pattern("76 ?? 68").is_err());
    }

    #[test]
    fn test_parse_pattern_rejects_garbage_and_empty() {
        assert!(parse_pattern("zz").is_err());
        assert!(parse_pattern("   ").is_err());
    }

    #[test]
    fn test_format_pattern_roundtrip() {
        let bytes = vec![0x76, 0x65, 0x0A];
        let formatted = format_pattern(&bytes);
        assert_eq!(formatted, "76 65 0A");
        assert_eq!(parse_pattern(&formatted).unwrap(), bytes);
    }

    #[test]
    fn test_builtin_pattern_decodes_to_artifact_string() {
        let set = SignatureSet::builtin();
        let bytes = set.current_gear.pattern_bytes().unwrap();
        assert_eq!(bytes, b"vehiclePhysicsJob");
        assert_eq!(
            set.last_gear.field_offset - set.current_gear.field_offset,
            0x6A8
        );
    }

    #[test]
    fn test_signature_set_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signatures.json");

        let set = SignatureSet::builtin();
        save_signatures(&path, &set).unwrap();
        let loaded = load_signatures(&path).unwrap();

        assert_eq!(loaded.version, set.version);
        assert_eq!(loaded.sample_iterations, set.sample_iterations);
        assert_eq!(
            loaded.current_gear.field_offset,
            set.current_gear.field_offset
        );
        assert_eq!(loaded.last_gear.pattern, set.last_gear.pattern);
    }
}
