//! A furnishing leaf: a placed item bound to a location's choice menu

use super::{Input, InputRow, LogicalRef, ObjectType, RecoverTarget, ResolveRef};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A placed furniture item committed against a location.
///
/// The first input row carries the furniture kind discriminant; the second
/// is the resolved `ProofInput` of the choice slot the item occupies in its
/// location's menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationFurnishing {
    pub kind: ObjectType,
    pub choice_ref: LogicalRef,
}

impl LocationFurnishing {
    pub fn new(kind: ObjectType, choice_ref: LogicalRef) -> Self {
        LocationFurnishing { kind, choice_ref }
    }

    pub fn inputs<R: ResolveRef + ?Sized>(&self, resolver: &R) -> Result<Vec<InputRow>> {
        Ok(vec![
            vec![Input::Scalar(self.kind.code() as u64)],
            resolver.resolve_ref(&self.choice_ref)?,
        ])
    }

    pub(crate) fn hydrate<R: RecoverTarget + ?Sized>(
        rows: &[InputRow],
        recovery: &R,
    ) -> Result<LocationFurnishing> {
        let (kind_row, ref_row) = match rows {
            [kind, reference] if !reference.is_empty() => (kind, reference),
            _ => {
                return Err(Error::Corruption(
                    "furnishing leaf needs a kind row and a reference row".into(),
                ))
            }
        };
        let kind = match kind_row.as_slice() {
            [Input::Scalar(code)] => ObjectType::try_from(*code as u16)?,
            _ => return Err(Error::Corruption("malformed furnishing kind row".into())),
        };
        let digest = ref_row[0]
            .digest()
            .ok_or_else(|| Error::Corruption("furnishing reference row has no digest".into()))?;
        let (target_type, id) = recovery.recover_target(&digest)?;
        let input = recovery.recover_input(target_type, id, &ref_row[1..])?;
        Ok(LocationFurnishing::new(
            kind,
            LogicalRef::proof_input(target_type, id, input),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Digest;

    struct FixedResolver(InputRow);

    impl ResolveRef for FixedResolver {
        fn resolve_ref(&self, _reference: &LogicalRef) -> Result<InputRow> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_kind_row_leads() {
        let furnishing = LocationFurnishing::new(
            ObjectType::FatalChestTrap,
            LogicalRef::proof_input(ObjectType::LocationChoices, 0, 2),
        );
        let resolved = vec![
            Input::from(Digest::digest(b"menu")),
            Input::Scalar(4),
            Input::Scalar(0),
        ];
        let rows = furnishing.inputs(&FixedResolver(resolved.clone())).unwrap();
        assert_eq!(rows[0], vec![Input::Scalar(5)]);
        assert_eq!(rows[1], resolved);
    }
}
