//! Storage size model
//!
//! Sizes are in bytes. The default layout is the 32-bit target SysY programs
//! are lowered for: 4-byte ints and 4-byte pointers.

use crate::types::Type;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataLayout {
    pub int_size: u32,
    pub pointer_size: u32,
}

impl DataLayout {
    /// 32-bit int, 32-bit pointer
    pub const ILP32: DataLayout = DataLayout {
        int_size: 4,
        pointer_size: 4,
    };

    /// Storage size of `ty`.
    ///
    /// Arrays flatten to `len * element size` at every level. Void and
    /// function types have no storage and report 0. A size past `u64::MAX`
    /// saturates; use [`DataLayout::checked_size_of`] to reject it instead.
    pub fn size_of(&self, ty: &Type) -> u64 {
        match ty {
            Type::Void | Type::Function(_) => 0,
            Type::Int(_) => u64::from(self.int_size),
            Type::Pointer(_) => u64::from(self.pointer_size),
            Type::Array(array) => {
                u64::from(array.len()).saturating_mul(self.size_of(array.element()))
            }
        }
    }

    /// Storage size of `ty`, or `None` if it does not fit in a `u64`
    pub fn checked_size_of(&self, ty: &Type) -> Option<u64> {
        match ty {
            Type::Array(array) => {
                u64::from(array.len()).checked_mul(self.checked_size_of(array.element())?)
            }
            Type::Void | Type::Int(_) | Type::Pointer(_) | Type::Function(_) => {
                Some(self.size_of(ty))
            }
        }
    }
}

impl Default for DataLayout {
    fn default() -> Self {
        Self::ILP32
    }
}

/// Storage size of `ty` on the 32-bit target
pub fn size_of(ty: &Type) -> u64 {
    DataLayout::ILP32.size_of(ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        make_array, make_array_from_dims, make_function, make_int, make_pointer, make_void,
    };

    #[test]
    fn test_scalar_sizes() {
        assert_eq!(size_of(&make_int(false)), 4);
        assert_eq!(size_of(&make_int(true)), 4);
        assert_eq!(size_of(&make_pointer(make_int(false), false)), 4);
        assert_eq!(size_of(&make_void()), 0);
        assert_eq!(size_of(&make_function(make_int(false))), 0);
    }

    #[test]
    fn test_array_sizes() {
        assert_eq!(size_of(&make_array(make_int(false), 5)), 20);
        assert_eq!(size_of(&make_array_from_dims(make_int(false), &[2, 3])), 24);
        assert_eq!(size_of(&make_array_from_dims(make_int(true), &[2, 3, 4])), 96);
    }

    #[test]
    fn test_decayed_array_is_pointer_sized() {
        let param = make_pointer(make_array_from_dims(make_int(false), &[100, 100]), false);
        assert_eq!(size_of(&param), 4);
    }

    #[test]
    fn test_custom_layout() {
        let layout = DataLayout {
            int_size: 2,
            pointer_size: 8,
        };
        assert_eq!(layout.size_of(&make_array(make_int(false), 10)), 20);
        assert_eq!(layout.size_of(&make_pointer(make_int(false), false)), 8);
    }

    #[test]
    fn test_largest_int32_dimension_does_not_overflow() {
        let len = i32::MAX as u32;
        assert_eq!(size_of(&make_array(make_int(false), len)), u64::from(len) * 4);
        assert_eq!(
            size_of(&make_array_from_dims(make_int(false), &[65536, 65536])),
            1 << 34
        );
    }

    #[test]
    fn test_size_past_u64_saturates_or_is_rejected() {
        let huge = make_array_from_dims(make_int(false), &[u32::MAX, u32::MAX, u32::MAX]);
        assert_eq!(size_of(&huge), u64::MAX);
        assert_eq!(DataLayout::ILP32.checked_size_of(&huge), None);
        assert_eq!(
            DataLayout::ILP32.checked_size_of(&make_array(make_int(false), 3)),
            Some(12)
        );
    }

    #[test]
    fn test_layout_deserialize_defaults() {
        let layout: DataLayout = serde_json::from_str(r#"{"pointer_size": 8}"#).unwrap();
        assert_eq!(layout.int_size, 4);
        assert_eq!(layout.pointer_size, 8);

        let default: DataLayout = serde_json::from_str("{}").unwrap();
        assert_eq!(default, DataLayout::ILP32);
    }
}
