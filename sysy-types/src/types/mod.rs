//! Type representation for SysY
//!
//! A type is one of five closed shapes (void, int, array, pointer, function)
//! and is always handled through a shared `TypeRef`. Composite types point at
//! their component handles instead of owning copies, so a symbol table entry,
//! an AST annotation and an enclosing array can all hold the same node.
//!
//! Nodes are immutable once built. The single exception is the argument list
//! of a function type, which may be filled in after the signature has been
//! declared (see [`FunctionType::set_arg_types`]).

pub mod constructors;
pub mod printer;
pub mod relations;

pub use constructors::{
    make_array, make_array_from_dims, make_function, make_function_from_args, make_int,
    make_pointer, make_void,
};
pub use printer::print;
pub use relations::{can_accept, can_operate, common_type, same_type};

use crate::error::{contract_violation, TypeError};
use crate::layout::size_of;
use log::debug;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared handle to a type node
pub type TypeRef = Arc<Type>;

/// SysY type
#[derive(Debug)]
pub enum Type {
    /// Absence of a value, only used as a function return type
    Void,
    /// 32-bit integer, optionally const
    Int(IntType),
    /// Fixed-size array of int or of another array
    Array(ArrayType),
    /// Pointer, produced only by array parameter decay
    Pointer(PointerType),
    /// Function signature
    Function(FunctionType),
}

/// Payload of `Type::Void`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoidType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntType {
    pub(crate) is_const: bool,
}

impl IntType {
    pub fn is_const(&self) -> bool {
        self.is_const
    }
}

#[derive(Debug)]
pub struct ArrayType {
    pub(crate) len: u32,
    pub(crate) element: TypeRef,
}

impl ArrayType {
    /// Number of elements in the outermost dimension
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn element(&self) -> &TypeRef {
        &self.element
    }

    /// Size in bytes of one element under the 32-bit model
    pub fn element_size(&self) -> u64 {
        size_of(&self.element)
    }

    /// All dimension lengths, outermost first: `int[2][3]` gives `[2, 3]`
    pub fn dims(&self) -> Vec<u32> {
        let mut dims = vec![self.len];
        let mut current = &self.element;
        while let Type::Array(inner) = &**current {
            dims.push(inner.len);
            current = &inner.element;
        }
        dims
    }

    /// Innermost non-array element type
    pub fn base(&self) -> &TypeRef {
        let mut current = &self.element;
        while let Type::Array(inner) = &**current {
            current = &inner.element;
        }
        current
    }
}

#[derive(Debug)]
pub struct PointerType {
    pub(crate) base: TypeRef,
    pub(crate) is_const: bool,
}

impl PointerType {
    /// The pointed-to type
    pub fn base(&self) -> &TypeRef {
        &self.base
    }

    pub fn is_const(&self) -> bool {
        self.is_const
    }
}

/// Function signature
///
/// The argument list sits behind a lock so that a signature reachable from
/// several owners can still be completed in place. Readers get snapshots
/// (cloned handles), never a guard, so comparing a signature with itself
/// cannot self-deadlock.
#[derive(Debug)]
pub struct FunctionType {
    pub(crate) return_type: TypeRef,
    pub(crate) args: RwLock<Vec<TypeRef>>,
}

impl FunctionType {
    pub(crate) fn new(return_type: TypeRef, args: Vec<TypeRef>) -> Self {
        Self {
            return_type,
            args: RwLock::new(args),
        }
    }

    pub fn return_type(&self) -> &TypeRef {
        &self.return_type
    }

    pub fn arg_count(&self) -> usize {
        self.read_args().len()
    }

    pub fn arg(&self, idx: usize) -> Option<TypeRef> {
        self.read_args().get(idx).cloned()
    }

    /// Snapshot of the current argument list
    pub fn arg_types(&self) -> Vec<TypeRef> {
        self.read_args().clone()
    }

    /// Replace the whole argument list
    pub fn set_arg_types<I>(&self, args: I)
    where
        I: IntoIterator<Item = TypeRef>,
    {
        let mut guard = self.write_args();
        *guard = args.into_iter().collect();
        debug!("Function signature completed with {} arguments", guard.len());
    }

    /// Replace one argument type in place
    pub fn set_arg_type(&self, idx: usize, ty: TypeRef) -> Result<(), TypeError> {
        let mut guard = self.write_args();
        let count = guard.len();
        match guard.get_mut(idx) {
            Some(slot) => {
                debug!("Function argument {idx} set to a {}", ty.kind_name());
                *slot = ty;
                Ok(())
            }
            None => Err(TypeError::ArgumentIndex { index: idx, count }),
        }
    }

    /// Append one argument while walking a parameter list
    pub fn push_arg(&self, ty: TypeRef) {
        let mut guard = self.write_args();
        guard.push(ty);
        debug!("Function argument {} appended", guard.len() - 1);
    }

    // A panic while holding the lock cannot leave the Vec half-updated, so a
    // poisoned lock is still safe to use.
    fn read_args(&self) -> RwLockReadGuard<'_, Vec<TypeRef>> {
        self.args.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_args(&self) -> RwLockWriteGuard<'_, Vec<TypeRef>> {
        self.args.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Type {
    /// Short name of the active variant, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Type::Void => "void",
            Type::Int(_) => "int",
            Type::Array(_) => "array",
            Type::Pointer(_) => "pointer",
            Type::Function(_) => "function",
        }
    }

    pub fn as_int(&self) -> Option<IntType> {
        match self {
            Type::Int(int) => Some(*int),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayType> {
        match self {
            Type::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_pointer(&self) -> Option<&PointerType> {
        match self {
            Type::Pointer(pointer) => Some(pointer),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            Type::Function(function) => Some(function),
            _ => None,
        }
    }
}

pub fn is_void(ty: &Type) -> bool {
    matches!(ty, Type::Void)
}

pub fn is_int(ty: &Type) -> bool {
    matches!(ty, Type::Int(_))
}

pub fn is_array(ty: &Type) -> bool {
    matches!(ty, Type::Array(_))
}

pub fn is_pointer(ty: &Type) -> bool {
    matches!(ty, Type::Pointer(_))
}

pub fn is_function(ty: &Type) -> bool {
    matches!(ty, Type::Function(_))
}

/// Void payload; panics if `ty` is not void
#[track_caller]
pub fn get_void(ty: &Type) -> VoidType {
    match ty {
        Type::Void => VoidType,
        other => contract_violation("get_void", "void", other.to_string()),
    }
}

/// Int payload; panics if `ty` is not an int
#[track_caller]
pub fn get_int(ty: &Type) -> IntType {
    match ty {
        Type::Int(int) => *int,
        other => contract_violation("get_int", "int", other.to_string()),
    }
}

/// Array payload; panics if `ty` is not an array
#[track_caller]
pub fn get_array(ty: &Type) -> &ArrayType {
    match ty {
        Type::Array(array) => array,
        other => contract_violation("get_array", "array", other.to_string()),
    }
}

/// Pointer payload; panics if `ty` is not a pointer
#[track_caller]
pub fn get_pointer(ty: &Type) -> &PointerType {
    match ty {
        Type::Pointer(pointer) => pointer,
        other => contract_violation("get_pointer", "pointer", other.to_string()),
    }
}

/// Function payload; panics if `ty` is not a function
#[track_caller]
pub fn get_function(ty: &Type) -> &FunctionType {
    match ty {
        Type::Function(function) => function,
        other => contract_violation("get_function", "function", other.to_string()),
    }
}

/// Whether values of this type may not be reassigned.
///
/// An array is const when its elements are.
pub fn is_const_type(ty: &Type) -> bool {
    match ty {
        Type::Int(int) => int.is_const,
        Type::Array(array) => is_const_type(&array.element),
        Type::Pointer(pointer) => pointer.is_const,
        Type::Void | Type::Function(_) => false,
    }
}
