//! Leaf objects committed into the map trie
//!
//! Every provable fact about a map is a [`LeafObject`]: a type-tagged logical
//! value that prepares to a canonical `(type, payload)` record. Leaves may
//! reference each other through [`LogicalRef`] values which are resolved to
//! concrete digests at encode time.

mod choices;
mod exit;
mod furnishing;
mod link;
mod object;
mod refs;

pub use choices::{Choice, ChoiceType, LocationChoices};
pub use exit::LocationExit;
pub use furnishing::LocationFurnishing;
pub use link::LocationLink;
pub use object::{leaf_hash, Input, InputRow, LeafBody, LeafObject, ObjectType, PreparedLeaf};
pub use refs::{LogicalRef, RecoverTarget, RefKind, ResolveRef};
