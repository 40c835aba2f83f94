//! Declarator printer
//!
//! Renders a type close to the way it is written in a SysY declaration:
//! `int[2][3]`, `int[][3]` for a decayed array parameter, and
//! `int(*)(int, int[])` for functions.

use super::{ArrayType, Type};
use std::fmt;

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Int(int) if int.is_const => write!(f, "const int"),
            Type::Int(_) => write!(f, "int"),
            Type::Array(array) => {
                write!(f, "{}", array.base())?;
                write_dims(f, array)
            }
            Type::Pointer(pointer) => match &*pointer.base {
                Type::Int(_) => write!(f, "{}[]", pointer.base),
                // Decay drops only the outermost dimension.
                Type::Array(array) => {
                    write!(f, "{}[]", array.base())?;
                    write_dims(f, array)
                }
                // Not produced by SysY declarations.
                Type::Void | Type::Pointer(_) | Type::Function(_) => {
                    write!(f, "pointer of {}", pointer.base)
                }
            },
            Type::Function(function) => {
                write!(f, "{}(*)(", function.return_type)?;
                for (i, arg) in function.arg_types().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

fn write_dims(f: &mut fmt::Formatter<'_>, array: &ArrayType) -> fmt::Result {
    for len in array.dims() {
        write!(f, "[{len}]")?;
    }
    Ok(())
}

/// Declarator string of `ty`
pub fn print(ty: &Type) -> String {
    ty.to_string()
}
