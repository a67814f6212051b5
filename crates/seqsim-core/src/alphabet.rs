//! The 20-residue amino acid alphabet and the physicochemical groups used by
//! feature extraction.

/// Standard amino acids in canonical feature order.
pub const AMINO_ACIDS: [u8; 20] = *b"ACDEFGHIKLMNPQRSTVWY";

/// A named, possibly overlapping set of residues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResidueGroup {
    pub name: &'static str,
    pub members: &'static [u8],
}

impl ResidueGroup {
    #[must_use]
    pub fn contains(&self, residue: u8) -> bool {
        self.members.contains(&residue)
    }
}

/// Residue groups in feature order. Memberships overlap, so the group
/// fractions of a sequence do not sum to one.
pub const RESIDUE_GROUPS: [ResidueGroup; 6] = [
    ResidueGroup {
        name: "hydrophobic",
        members: b"AILMFVPWG",
    },
    ResidueGroup {
        name: "positive",
        members: b"KRH",
    },
    ResidueGroup {
        name: "negative",
        members: b"DE",
    },
    ResidueGroup {
        name: "polar",
        members: b"STNQCY",
    },
    ResidueGroup {
        name: "aromatic",
        members: b"FWYH",
    },
    ResidueGroup {
        name: "small",
        members: b"AGSCTPD",
    },
];

/// Position of `residue` in [`AMINO_ACIDS`], accepting lowercase.
#[must_use]
pub fn residue_index(residue: u8) -> Option<usize> {
    let upper = residue.to_ascii_uppercase();
    AMINO_ACIDS.iter().position(|&aa| aa == upper)
}

/// Number of alphabet residues in `sequence`; other symbols are not counted.
#[must_use]
pub fn residue_count(sequence: &str) -> usize {
    sequence.bytes().filter(|&b| residue_index(b).is_some()).count()
}

/// Uppercase `raw` and keep only alphabet residues.
///
/// This is the caller-side cleaning step; feature extraction itself only
/// ignores unknown symbols.
#[must_use]
pub fn clean_sequence(raw: &str) -> String {
    raw.bytes()
        .filter_map(|b| residue_index(b).map(|i| char::from(AMINO_ACIDS[i])))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_residue_index() {
        assert_eq!(residue_index(b'A'), Some(0));
        assert_eq!(residue_index(b'y'), Some(19));
        assert_eq!(residue_index(b'X'), None);
        assert_eq!(residue_index(b'*'), None);
    }

    #[test]
    fn test_clean_sequence_strips_noise() {
        assert_eq!(clean_sequence("mk t\nAYIaK*X-Z"), "MKTAYIAK");
        assert_eq!(clean_sequence("12345"), "");
    }

    #[test]
    fn test_residue_count() {
        assert_eq!(residue_count("MKT-AYX"), 5);
        assert_eq!(residue_count(""), 0);
    }

    #[test]
    fn test_groups_overlap() {
        let hydrophobic = &RESIDUE_GROUPS[0];
        let small = &RESIDUE_GROUPS[5];
        assert!(hydrophobic.contains(b'A'));
        assert!(small.contains(b'A'));
    }

    #[test]
    fn test_group_members_are_in_alphabet() {
        for group in &RESIDUE_GROUPS {
            for &residue in group.members {
                assert!(
                    AMINO_ACIDS.contains(&residue),
                    "{} contains non-alphabet residue {}",
                    group.name,
                    char::from(residue)
                );
            }
        }
    }
}
