//! Arena-backed building blocks for the policies that need O(1) relocation.

pub mod intrusive_list;
pub mod slot_arena;

pub use intrusive_list::{Links, Node};
pub use slot_arena::{SlotArena, SlotId};
