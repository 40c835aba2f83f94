//! SysY Compiler - Type Engine
//!
//! This crate holds the type representation shared by every phase of the
//! SysY compiler and the rules the semantic analyzer checks against it:
//! - Types: the five type shapes behind a shared `TypeRef`, their
//!   constructors and accessors
//! - Relations: structural equality, assignability with array decay, and
//!   operator typing
//! - Layout: storage sizes for lowering declarations
//! - Descriptions: a serde format for writing types down outside the compiler

pub mod desc;
pub mod error;
pub mod layout;
pub mod types;

pub use desc::{Check, CheckOutcome, Description, NamedDesc, Relation, TypeDesc, TypeEnv};
pub use error::TypeError;
pub use layout::{size_of, DataLayout};
pub use types::*;
