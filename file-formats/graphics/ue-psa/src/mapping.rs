//! Name-keyed bone mapping between an animation file's skeleton and a target
//! skeleton.
//!
//! This is intentionally a name join, not a topology match: callers that
//! need structural correspondence must alias names upstream.

/// How source bone names are matched against target bone names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoneMappingMode {
    /// Names must be byte-for-byte equal
    Exact,
    /// Names are compared case-folded; the legacy tooling default
    #[default]
    CaseInsensitive,
}

impl BoneMappingMode {
    fn matches(&self, a: &str, b: &str) -> bool {
        match self {
            Self::Exact => a == b,
            Self::CaseInsensitive => a.to_lowercase() == b.to_lowercase(),
        }
    }
}

/// A source bone that matched a target bone already claimed by an earlier
/// source bone. Recorded, not fatal; the later bone stays unmapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateMapping {
    pub source_index: usize,
    pub target_index: usize,
    pub prior_source_index: usize,
}

/// The result of joining two bone name lists
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoneMapping {
    /// Per source bone, the target bone it drives
    pub source_to_target: Vec<Option<usize>>,
    /// Per target bone, the source bone driving it
    pub target_to_source: Vec<Option<usize>>,
    /// Per source bone, the target spelling where matched, the source
    /// spelling otherwise
    pub resolved_names: Vec<String>,
    /// Source bones that lost a claim race for an already-mapped target
    pub duplicate_mappings: Vec<DuplicateMapping>,
}

impl BoneMapping {
    /// Number of source bones that found a target
    pub fn mapped_count(&self) -> usize {
        self.source_to_target.iter().flatten().count()
    }
}

/// Greedily match source bones to target bones by name.
///
/// Matching runs in source-bone order and each target bone can be claimed
/// once; later source bones that would match an already-claimed target are
/// recorded as duplicates and left unmapped in both directions. The result
/// is deterministic for a given input and mode.
pub fn map_bones(
    source_names: &[String],
    target_names: &[String],
    mode: BoneMappingMode,
) -> BoneMapping {
    let mut mapping = BoneMapping {
        source_to_target: vec![None; source_names.len()],
        target_to_source: vec![None; target_names.len()],
        resolved_names: Vec::with_capacity(source_names.len()),
        duplicate_mappings: Vec::new(),
    };

    for (source_index, source_name) in source_names.iter().enumerate() {
        let target_index = target_names
            .iter()
            .position(|target_name| mode.matches(target_name, source_name));

        match target_index {
            Some(target_index) => {
                match mapping.target_to_source[target_index] {
                    None => {
                        mapping.source_to_target[source_index] = Some(target_index);
                        mapping.target_to_source[target_index] = Some(source_index);
                    }
                    Some(prior_source_index) => {
                        mapping.duplicate_mappings.push(DuplicateMapping {
                            source_index,
                            target_index,
                            prior_source_index,
                        });
                    }
                }
                mapping
                    .resolved_names
                    .push(target_names[target_index].clone());
            }
            None => mapping.resolved_names.push(source_name.clone()),
        }
    }

    mapping
}
