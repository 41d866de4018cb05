//! A directional link leaf between two exits

use super::{InputRow, LogicalRef, RecoverTarget, ResolveRef};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A directional connection between a pair of exits.
///
/// Each input row is a resolved `Proof` reference: the content hash of one
/// exit leaf. `a` is the egress exit, `b` the ingress exit reached on the
/// other side of the join.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationLink {
    pub exit_a: LogicalRef,
    pub exit_b: LogicalRef,
}

impl LocationLink {
    pub fn new(exit_a: LogicalRef, exit_b: LogicalRef) -> Self {
        LocationLink { exit_a, exit_b }
    }

    pub fn inputs<R: ResolveRef + ?Sized>(&self, resolver: &R) -> Result<Vec<InputRow>> {
        Ok(vec![
            resolver.resolve_ref(&self.exit_a)?,
            resolver.resolve_ref(&self.exit_b)?,
        ])
    }

    pub(crate) fn hydrate<R: RecoverTarget + ?Sized>(
        rows: &[InputRow],
        recovery: &R,
    ) -> Result<LocationLink> {
        let (row_a, row_b) = match rows {
            [a, b] => (a, b),
            _ => {
                return Err(Error::Corruption(
                    "link leaf needs exactly two reference rows".into(),
                ))
            }
        };
        let recover = |row: &InputRow| -> Result<LogicalRef> {
            let digest = match row.as_slice() {
                [input] => input
                    .digest()
                    .ok_or_else(|| Error::Corruption("link reference row has no digest".into()))?,
                _ => return Err(Error::Corruption("malformed link reference row".into())),
            };
            let (target_type, id) = recovery.recover_target(&digest)?;
            Ok(LogicalRef::proof(target_type, id))
        };
        Ok(LocationLink::new(recover(row_a)?, recover(row_b)?))
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Input, ObjectType};
    use super::*;
    use crate::model::Digest;

    struct HashResolver;

    impl ResolveRef for HashResolver {
        fn resolve_ref(&self, reference: &LogicalRef) -> Result<InputRow> {
            Ok(vec![Input::from(Digest::digest(
                &(reference.id as u64).to_le_bytes(),
            ))])
        }
    }

    #[test]
    fn test_inputs_one_row_per_exit() {
        let link = LocationLink::new(
            LogicalRef::proof(ObjectType::Exit, 0),
            LogicalRef::proof(ObjectType::Exit, 1),
        );
        let rows = link.inputs(&HashResolver).unwrap();
        assert_eq!(rows.len(), 2);
        assert_ne!(rows[0], rows[1]);
        assert!(rows.iter().all(|row| row.len() == 1));
    }
}
