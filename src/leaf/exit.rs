//! An exit identity leaf, bound to its slot in a choice menu

use super::{InputRow, LogicalRef, RecoverTarget, ResolveRef};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// One exit at a location.
///
/// The single input row is the resolved `ProofInput` of the owning choice
/// menu: the menu's leaf hash followed by the `(side, exit)` row at the
/// exit's choice slot. Binding the slot into the exit's bytes is what lets
/// a verifier tie a chosen menu entry to a specific committed exit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationExit {
    pub choice_ref: LogicalRef,
}

impl LocationExit {
    pub fn new(choice_ref: LogicalRef) -> Self {
        LocationExit { choice_ref }
    }

    pub fn inputs<R: ResolveRef + ?Sized>(&self, resolver: &R) -> Result<Vec<InputRow>> {
        Ok(vec![resolver.resolve_ref(&self.choice_ref)?])
    }

    pub(crate) fn hydrate<R: RecoverTarget + ?Sized>(
        rows: &[InputRow],
        recovery: &R,
    ) -> Result<LocationExit> {
        let row = match rows {
            [row] if !row.is_empty() => row,
            _ => return Err(Error::Corruption("exit leaf needs one reference row".into())),
        };
        let digest = row[0]
            .digest()
            .ok_or_else(|| Error::Corruption("exit reference row has no digest".into()))?;
        let (target_type, id) = recovery.recover_target(&digest)?;
        let input = recovery.recover_input(target_type, id, &row[1..])?;
        Ok(LocationExit::new(LogicalRef::proof_input(
            target_type,
            id,
            input,
        )))
    }
}
