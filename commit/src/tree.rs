//! Commitments to JSON key paths.
//!
//! A path such as `data.items[0].profile.name` is turned into the stack a
//! streaming JSON parser would hold when it reaches the target value, one
//! [`StackEntry`] per level, and then folded into a single sequence digest.

use field::Fr;
use serde::{Deserialize, Serialize};

use crate::constants::TREE_HASH_STRIDE;
use crate::errors::CommitError;
use crate::polynomial::{polynomial_digest, polynomial_digest_elements};

/// Container kind of an empty stack slot.
pub const KIND_NONE: u64 = 0;
/// Container kind of an object frame.
pub const KIND_OBJECT: u64 = 1;
/// Container kind of an array frame.
pub const KIND_ARRAY: u64 = 2;

/// One step of a key path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum KeyPathElement {
    /// Member of an object, by key.
    Object(String),
    /// Element of an array, by zero-based index.
    ArrayIndex(usize),
}

/// Parser stack slot together with its key hash.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StackEntry {
    pub kind: Fr,
    /// `1` for an object in value position, the element index for an array.
    pub aux: Fr,
    /// Polynomial digest of the object key, zero for arrays.
    pub key_hash: Fr,
}

impl StackEntry {
    pub fn coefficients(&self) -> [Fr; TREE_HASH_STRIDE] {
        [self.kind, self.aux, self.key_hash]
    }
}

/// Builds the parser stack a path corresponds to, padded to
/// `max_stack_height` with empty entries.
///
/// # Errors
///
/// Returns [`CommitError::PathTooDeep`] when the path has more levels than
/// the parser stack.
pub fn json_tree_hasher(
    x: Fr,
    path: &[KeyPathElement],
    max_stack_height: usize,
) -> Result<Vec<StackEntry>, CommitError> {
    if path.len() > max_stack_height {
        return Err(CommitError::PathTooDeep {
            depth: path.len(),
            max: max_stack_height,
        });
    }

    let mut stack: Vec<StackEntry> = path
        .iter()
        .map(|element| match element {
            KeyPathElement::Object(key) => StackEntry {
                kind: Fr::from_canonical_u64(KIND_OBJECT),
                aux: Fr::ONE,
                key_hash: polynomial_digest(key.as_bytes(), x, 0),
            },
            KeyPathElement::ArrayIndex(index) => StackEntry {
                kind: Fr::from_canonical_u64(KIND_ARRAY),
                aux: Fr::from_canonical_u64(*index as u64),
                key_hash: Fr::ZERO,
            },
        })
        .collect();
    stack.resize(max_stack_height, StackEntry::default());
    Ok(stack)
}

/// Folds a stack into one digest: entry `i` contributes its coefficients at
/// powers `3i`, `3i + 1` and `3i + 2` of `x`.
pub fn compress_tree_hash(x: Fr, stack: &[StackEntry]) -> Fr {
    let coefficients: Vec<Fr> = stack.iter().flat_map(StackEntry::coefficients).collect();
    polynomial_digest_elements(&coefficients, x)
}

/// Sequence digest of a key path.
pub fn sequence_digest(
    x: Fr,
    path: &[KeyPathElement],
    max_stack_height: usize,
) -> Result<Fr, CommitError> {
    Ok(compress_tree_hash(x, &json_tree_hasher(x, path, max_stack_height)?))
}

#[cfg(test)]
mod tests {
    use p3_field::PrimeCharacteristicRing;

    use super::*;

    fn path() -> Vec<KeyPathElement> {
        vec![
            KeyPathElement::Object("data".into()),
            KeyPathElement::Object("items".into()),
            KeyPathElement::ArrayIndex(0),
            KeyPathElement::Object("profile".into()),
            KeyPathElement::Object("name".into()),
        ]
    }

    #[test]
    fn test_stack_shape() {
        let x = Fr::from_canonical_u64(1000);
        let stack = json_tree_hasher(x, &path(), 7).expect("fits");
        assert_eq!(stack.len(), 7);
        assert_eq!(stack[0].kind, Fr::ONE);
        assert_eq!(stack[0].aux, Fr::ONE);
        assert_eq!(stack[0].key_hash, polynomial_digest(b"data", x, 0));
        assert_eq!(stack[2].kind, Fr::TWO);
        assert_eq!(stack[2].aux, Fr::ZERO);
        assert_eq!(stack[2].key_hash, Fr::ZERO);
        assert_eq!(stack[5], StackEntry::default());
    }

    #[test]
    fn test_too_deep() {
        let x = Fr::from_canonical_u64(3);
        assert_eq!(
            json_tree_hasher(x, &path(), 4),
            Err(CommitError::PathTooDeep { depth: 5, max: 4 })
        );
    }

    #[test]
    fn test_padding_does_not_change_digest() {
        let x = Fr::from_canonical_u64(77);
        assert_eq!(
            sequence_digest(x, &path(), 5),
            sequence_digest(x, &path(), 12)
        );
    }

    #[test]
    fn test_compress_powers() {
        let x = Fr::from_canonical_u64(10);
        let stack = [
            StackEntry {
                kind: Fr::ONE,
                aux: Fr::ONE,
                key_hash: Fr::from_canonical_u64(4),
            },
            StackEntry {
                kind: Fr::TWO,
                aux: Fr::from_canonical_u64(3),
                key_hash: Fr::ZERO,
            },
        ];
        // 1 + 10 + 4 * 100 + 2 * 1000 + 3 * 10000
        assert_eq!(
            compress_tree_hash(x, &stack),
            Fr::from_canonical_u64(32_411)
        );
    }

    #[test]
    fn test_key_path_serde() {
        let json = r#"[{"type":"Object","value":"data"},{"type":"ArrayIndex","value":0}]"#;
        let parsed: Vec<KeyPathElement> = serde_json::from_str(json).expect("parse");
        assert_eq!(
            parsed,
            vec![
                KeyPathElement::Object("data".into()),
                KeyPathElement::ArrayIndex(0)
            ]
        );
    }
}
