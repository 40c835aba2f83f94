//! Type constructors
//!
//! `void`, `int`, `const int` and the plain `int` pointer are interned: every
//! call hands out the same handle. Arrays, functions and all other pointers
//! are allocated fresh and must be compared with [`same_type`], never by
//! handle identity.
//!
//! [`same_type`]: super::same_type

use super::{ArrayType, FunctionType, IntType, PointerType, Type, TypeRef};
use crate::error::contract_violation;
use log::trace;
use std::sync::{Arc, OnceLock};

static VOID: OnceLock<TypeRef> = OnceLock::new();
static INT: OnceLock<TypeRef> = OnceLock::new();
static CONST_INT: OnceLock<TypeRef> = OnceLock::new();
static INT_POINTER: OnceLock<TypeRef> = OnceLock::new();

fn intern(slot: &'static OnceLock<TypeRef>, init: impl FnOnce() -> Type) -> TypeRef {
    slot.get_or_init(|| {
        let ty = init();
        trace!("Interned canonical type {ty}");
        Arc::new(ty)
    })
    .clone()
}

pub fn make_void() -> TypeRef {
    intern(&VOID, || Type::Void)
}

pub fn make_int(is_const: bool) -> TypeRef {
    if is_const {
        intern(&CONST_INT, || Type::Int(IntType { is_const: true }))
    } else {
        intern(&INT, || Type::Int(IntType { is_const: false }))
    }
}

/// One array level of `len` elements.
///
/// `element` is not checked; callers pass an int or array type.
pub fn make_array(element: TypeRef, len: u32) -> TypeRef {
    debug_assert!(len > 0, "array length must be positive");
    let ty = Type::Array(ArrayType { len, element });
    trace!("Allocated array type {ty}");
    Arc::new(ty)
}

/// Nested array for a declarator's dimension list, outermost first.
///
/// `make_array_from_dims(int, &[2, 3])` is `int[2][3]`, an array of two
/// `int[3]`.
#[track_caller]
pub fn make_array_from_dims(base: TypeRef, dims: &[u32]) -> TypeRef {
    if dims.is_empty() {
        contract_violation("make_array_from_dims", "at least one dimension", "none");
    }
    dims.iter()
        .rev()
        .fold(base, |element, &len| make_array(element, len))
}

pub fn make_pointer(base: TypeRef, is_const: bool) -> TypeRef {
    if !is_const && matches!(*base, Type::Int(IntType { is_const: false })) {
        return intern(&INT_POINTER, || {
            Type::Pointer(PointerType {
                base: make_int(false),
                is_const: false,
            })
        });
    }
    let ty = Type::Pointer(PointerType { base, is_const });
    trace!("Allocated pointer type {ty}");
    Arc::new(ty)
}

/// Signature with no arguments yet
pub fn make_function(return_type: TypeRef) -> TypeRef {
    make_function_from_args(return_type, Vec::new())
}

pub fn make_function_from_args<I>(return_type: TypeRef, args: I) -> TypeRef
where
    I: IntoIterator<Item = TypeRef>,
{
    let ty = Type::Function(FunctionType::new(return_type, args.into_iter().collect()));
    trace!("Allocated function type {ty}");
    Arc::new(ty)
}
