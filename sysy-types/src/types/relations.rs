//! Type relations
//!
//! Structural equality, assignability with array-to-pointer decay, and the
//! operand rules for binary operators. Every relation matches on the pair of
//! variants and lists the mismatched pairs explicitly.

use super::{make_int, FunctionType, Type, TypeRef};
use crate::error::contract_violation;

/// Structural type equality.
///
/// Pointer constness is not compared; only the pointed-to types are.
pub fn same_type(a: &Type, b: &Type) -> bool {
    match (a, b) {
        (Type::Void, Type::Void) => true,
        (Type::Int(a), Type::Int(b)) => a.is_const == b.is_const,
        (Type::Array(a), Type::Array(b)) => a.len == b.len && same_type(&a.element, &b.element),
        (Type::Pointer(a), Type::Pointer(b)) => same_type(&a.base, &b.base),
        (Type::Function(a), Type::Function(b)) => same_signature(a, b),
        (Type::Void, _)
        | (Type::Int(_), _)
        | (Type::Array(_), _)
        | (Type::Pointer(_), _)
        | (Type::Function(_), _) => false,
    }
}

/// Whether a value of type `provided` may be used where `required` is
/// expected (argument passing, assignment).
///
/// Ints are rejected only when a const int is required and a non-const one
/// is provided. A pointer accepts an array whose element type it accepts;
/// the reverse never holds. Functions must match exactly.
pub fn can_accept(required: &Type, provided: &Type) -> bool {
    match (required, provided) {
        (Type::Void, Type::Void) => true,
        (Type::Int(req), Type::Int(prov)) => !req.is_const || prov.is_const,
        (Type::Array(req), Type::Array(prov)) => {
            req.len == prov.len && can_accept(&req.element, &prov.element)
        }
        (Type::Pointer(req), Type::Pointer(prov)) => can_accept(&req.base, &prov.base),
        // Decay: `int a[]` accepts `int[5]`, `int a[][3]` accepts `int[2][3]`.
        (Type::Pointer(req), Type::Array(prov)) => can_accept(&req.base, &prov.element),
        (Type::Function(req), Type::Function(prov)) => same_signature(req, prov),
        (Type::Void, _)
        | (Type::Int(_), _)
        | (Type::Array(_), _)
        | (Type::Pointer(_), _)
        | (Type::Function(_), _) => false,
    }
}

fn same_signature(a: &FunctionType, b: &FunctionType) -> bool {
    if !same_type(&a.return_type, &b.return_type) {
        return false;
    }
    let a_args = a.arg_types();
    let b_args = b.arg_types();
    a_args.len() == b_args.len()
        && a_args
            .iter()
            .zip(&b_args)
            .all(|(a_arg, b_arg)| same_type(a_arg, b_arg))
}

/// Binary operators are defined on `int op int` only
pub fn can_operate(a: &Type, b: &Type) -> bool {
    matches!((a, b), (Type::Int(_), Type::Int(_)))
}

/// Result type of `a op b`: an int that is const only if both operands are.
///
/// Panics if either operand is not an int; check [`can_operate`] first.
#[track_caller]
pub fn common_type(a: &Type, b: &Type) -> TypeRef {
    match (a, b) {
        (Type::Int(a), Type::Int(b)) => make_int(a.is_const && b.is_const),
        (Type::Int(_), other) | (other, _) => {
            contract_violation("common_type", "int operands", other.to_string())
        }
    }
}
