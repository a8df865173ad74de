//! Sidecar configuration: per-sequence, per-bone track suppression.
//!
//! A retarget can be told to drop a bone's rotation or translation channel
//! in a specific sequence. The sidecar is a keyed text format:
//!
//! ```text
//! ; comment
//! [SwimIdle]
//! 0 = 1      ; bone 0: suppress rotation
//! 12 = 3     ; bone 12: suppress both channels
//! ```
//!
//! Section headers name sequences; entries map a bone index to a flag
//! bitmask. A malformed entry is reported and skipped rather than aborting
//! the whole file.

use std::collections::HashMap;

bitflags::bitflags! {
    /// Which channels to omit for a bone in one sequence
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TrackFlags: u32 {
        /// Omit the rotation channel
        const NO_ROTATION = 1 << 0;
        /// Omit the translation channel
        const NO_TRANSLATION = 1 << 1;
    }
}

/// A recoverable problem in one sidecar entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// 1-based line number of the offending entry
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Parsed sidecar configuration, keyed by decoded sequence name
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PsaConfig {
    pub sequence_bone_flags: HashMap<String, HashMap<usize, TrackFlags>>,
}

impl PsaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flags for one bone in one sequence; empty when nothing is configured
    pub fn flags(&self, sequence_name: &str, bone_index: usize) -> TrackFlags {
        self.sequence_bone_flags
            .get(sequence_name)
            .and_then(|bones| bones.get(&bone_index))
            .copied()
            .unwrap_or_default()
    }

    /// Parse the sidecar text format.
    ///
    /// Never fails as a whole: malformed entries are collected as
    /// [`ConfigIssue`]s and skipped, and everything parseable is kept.
    pub fn parse(text: &str) -> (Self, Vec<ConfigIssue>) {
        let mut config = Self::new();
        let mut issues = Vec::new();
        let mut current_section: Option<String> = None;

        for (line_index, raw_line) in text.lines().enumerate() {
            let line_number = line_index + 1;
            let line = match raw_line.find([';', '#']) {
                Some(comment_start) => &raw_line[..comment_start],
                None => raw_line,
            }
            .trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with('[') {
                if line.ends_with(']') && line.len() > 2 {
                    current_section = Some(line[1..line.len() - 1].trim().to_string());
                } else {
                    issues.push(ConfigIssue {
                        line: line_number,
                        message: format!("malformed section header '{line}'"),
                    });
                    current_section = None;
                }
                continue;
            }

            let Some(section) = current_section.as_ref() else {
                issues.push(ConfigIssue {
                    line: line_number,
                    message: "entry before any [sequence] section".to_string(),
                });
                continue;
            };

            let Some((key, value)) = line.split_once('=') else {
                issues.push(ConfigIssue {
                    line: line_number,
                    message: format!("expected 'bone_index = flags', got '{line}'"),
                });
                continue;
            };

            let bone_index = match key.trim().parse::<usize>() {
                Ok(index) => index,
                Err(_) => {
                    issues.push(ConfigIssue {
                        line: line_number,
                        message: format!("invalid bone index '{}'", key.trim()),
                    });
                    continue;
                }
            };
            let bits = match value.trim().parse::<u32>() {
                Ok(bits) => bits,
                Err(_) => {
                    issues.push(ConfigIssue {
                        line: line_number,
                        message: format!("invalid flags value '{}'", value.trim()),
                    });
                    continue;
                }
            };

            config
                .sequence_bone_flags
                .entry(section.clone())
                .or_default()
                .insert(bone_index, TrackFlags::from_bits_truncate(bits));
        }

        (config, issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let text = "\
; per-sequence track removal
[SwimIdle]
0 = 1
12 = 3

[Walk]
4 = 2
";
        let (config, issues) = PsaConfig::parse(text);
        assert!(issues.is_empty());
        assert_eq!(config.flags("SwimIdle", 0), TrackFlags::NO_ROTATION);
        assert_eq!(
            config.flags("SwimIdle", 12),
            TrackFlags::NO_ROTATION | TrackFlags::NO_TRANSLATION
        );
        assert_eq!(config.flags("Walk", 4), TrackFlags::NO_TRANSLATION);
        assert_eq!(config.flags("Walk", 0), TrackFlags::empty());
        assert_eq!(config.flags("Run", 4), TrackFlags::empty());
    }

    #[test]
    fn test_malformed_entries_are_skipped_not_fatal() {
        let text = "\
7 = 1
[Walk]
zero = 1
0 = banana
1 = 2
";
        let (config, issues) = PsaConfig::parse(text);
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].line, 1);
        // The one valid entry survives.
        assert_eq!(config.flags("Walk", 1), TrackFlags::NO_TRANSLATION);
    }

    #[test]
    fn test_unknown_flag_bits_are_dropped() {
        let (config, issues) = PsaConfig::parse("[A]\n0 = 255\n");
        assert!(issues.is_empty());
        assert_eq!(
            config.flags("A", 0),
            TrackFlags::NO_ROTATION | TrackFlags::NO_TRANSLATION
        );
    }
}
