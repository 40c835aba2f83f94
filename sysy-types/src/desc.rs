//! Serializable type descriptions
//!
//! A `TypeDesc` is the JSON face of a type. Descriptions are turned into
//! handles only through the public constructors, so described types obey the
//! same interning and sharing rules as types built by the semantic analyzer.
//! A `named` description refers to an earlier declaration and reuses its
//! handle.

use crate::error::TypeError;
use crate::layout::DataLayout;
use crate::types::{
    can_accept, can_operate, common_type, is_array, is_int, make_array_from_dims,
    make_function_from_args, make_int, make_pointer, make_void, same_type, Type, TypeRef,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDesc {
    Void,
    Int {
        #[serde(rename = "const", default, skip_serializing_if = "is_false")]
        is_const: bool,
    },
    /// Dimensions are outermost first, as in the declarator
    Array {
        element: Box<TypeDesc>,
        dims: Vec<i64>,
    },
    Pointer {
        base: Box<TypeDesc>,
        #[serde(rename = "const", default, skip_serializing_if = "is_false")]
        is_const: bool,
    },
    Function {
        #[serde(rename = "return")]
        return_type: Box<TypeDesc>,
        #[serde(default)]
        args: Vec<TypeDesc>,
    },
    Named {
        name: String,
    },
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl TypeDesc {
    /// Describe an existing handle. Nested arrays collapse into one
    /// `array` with a dimension list.
    pub fn from_handle(ty: &Type) -> TypeDesc {
        match ty {
            Type::Void => TypeDesc::Void,
            Type::Int(int) => TypeDesc::Int {
                is_const: int.is_const(),
            },
            Type::Array(array) => TypeDesc::Array {
                element: Box::new(Self::from_handle(array.base())),
                dims: array.dims().into_iter().map(i64::from).collect(),
            },
            Type::Pointer(pointer) => TypeDesc::Pointer {
                base: Box::new(Self::from_handle(pointer.base())),
                is_const: pointer.is_const(),
            },
            Type::Function(function) => TypeDesc::Function {
                return_type: Box::new(Self::from_handle(function.return_type())),
                args: function
                    .arg_types()
                    .iter()
                    .map(|arg| Self::from_handle(arg))
                    .collect(),
            },
        }
    }
}

/// Named type handles in declaration order
///
/// Arrays built here must have a size that fits the environment's layout.
#[derive(Debug, Default)]
pub struct TypeEnv {
    entries: Vec<(String, TypeRef)>,
    index: HashMap<String, usize>,
    layout: DataLayout,
}

impl TypeEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(layout: DataLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    pub fn declare(&mut self, name: impl Into<String>, ty: TypeRef) -> Result<(), TypeError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(TypeError::DuplicateType { name });
        }
        debug!("Declared type '{name}': {ty}");
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, ty));
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&TypeRef> {
        self.index.get(name).map(|&idx| &self.entries[idx].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeRef)> {
        self.entries.iter().map(|(name, ty)| (name.as_str(), ty))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a handle for `desc`, resolving `named` references in this
    /// environment.
    pub fn build(&self, desc: &TypeDesc) -> Result<TypeRef, TypeError> {
        match desc {
            TypeDesc::Void => Ok(make_void()),
            TypeDesc::Int { is_const } => Ok(make_int(*is_const)),
            TypeDesc::Array { element, dims } => {
                let element = self.build(element)?;
                if !is_int(&element) && !is_array(&element) {
                    return Err(TypeError::InvalidElement {
                        found: element.to_string(),
                    });
                }
                if dims.is_empty() {
                    return Err(TypeError::EmptyDimensions);
                }
                let dims = dims
                    .iter()
                    .map(|&value| checked_dim(value))
                    .collect::<Result<Vec<_>, _>>()?;
                let array = make_array_from_dims(element, &dims);
                if self.layout.checked_size_of(&array).is_none() {
                    return Err(TypeError::TypeTooLarge {
                        found: array.to_string(),
                    });
                }
                Ok(array)
            }
            TypeDesc::Pointer { base, is_const } => Ok(make_pointer(self.build(base)?, *is_const)),
            TypeDesc::Function { return_type, args } => {
                let return_type = self.build(return_type)?;
                let args = args
                    .iter()
                    .map(|arg| self.build(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(make_function_from_args(return_type, args))
            }
            TypeDesc::Named { name } => self
                .lookup(name)
                .cloned()
                .ok_or_else(|| TypeError::UnknownType { name: name.clone() }),
        }
    }
}

/// Dimension lengths are positive `int` values
fn checked_dim(value: i64) -> Result<u32, TypeError> {
    i32::try_from(value)
        .ok()
        .filter(|&len| len > 0)
        .map(i32::unsigned_abs)
        .ok_or(TypeError::InvalidDimension { value })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedDesc {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDesc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    SameType,
    CanAccept,
    CanOperate,
    CommonType,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Relation::SameType => "same_type",
            Relation::CanAccept => "can_accept",
            Relation::CanOperate => "can_operate",
            Relation::CommonType => "common_type",
        };
        write!(f, "{name}")
    }
}

/// One relation query; for `can_accept`, `left` is the required type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    pub relation: Relation,
    pub left: TypeDesc,
    pub right: TypeDesc,
}

#[derive(Debug, Clone)]
pub enum CheckOutcome {
    Holds(bool),
    Common(TypeRef),
    /// `common_type` asked of operands that cannot be operated on
    NotApplicable,
}

impl CheckOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, CheckOutcome::Holds(false) | CheckOutcome::NotApplicable)
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckOutcome::Holds(holds) => write!(f, "{holds}"),
            CheckOutcome::Common(ty) => write!(f, "{ty}"),
            CheckOutcome::NotApplicable => write!(f, "not applicable"),
        }
    }
}

impl Check {
    /// Build both operands and evaluate the relation.
    ///
    /// `common_type` is only computed when `can_operate` holds, so a bad
    /// query never reaches the engine's contract check.
    pub fn evaluate(&self, env: &TypeEnv) -> Result<(TypeRef, TypeRef, CheckOutcome), TypeError> {
        let left = env.build(&self.left)?;
        let right = env.build(&self.right)?;
        let outcome = match self.relation {
            Relation::SameType => CheckOutcome::Holds(same_type(&left, &right)),
            Relation::CanAccept => CheckOutcome::Holds(can_accept(&left, &right)),
            Relation::CanOperate => CheckOutcome::Holds(can_operate(&left, &right)),
            Relation::CommonType if can_operate(&left, &right) => {
                CheckOutcome::Common(common_type(&left, &right))
            }
            Relation::CommonType => CheckOutcome::NotApplicable,
        };
        Ok((left, right, outcome))
    }
}

/// Contents of a type description file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    #[serde(default)]
    pub layout: DataLayout,
    #[serde(default)]
    pub types: Vec<NamedDesc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<Check>,
}

impl Description {
    pub fn from_json(text: &str) -> Result<Self, TypeError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TypeError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Declare every described type in order
    pub fn build_env(&self) -> Result<TypeEnv, TypeError> {
        let mut env = TypeEnv::with_layout(self.layout);
        for named in &self.types {
            let ty = env.build(&named.ty)?;
            env.declare(named.name.clone(), ty)?;
        }
        Ok(env)
    }

    /// Describe every handle of `env`, keeping `layout`
    pub fn from_env(env: &TypeEnv, layout: DataLayout) -> Self {
        Self {
            layout,
            types: env
                .iter()
                .map(|(name, ty)| NamedDesc {
                    name: name.to_string(),
                    ty: TypeDesc::from_handle(ty),
                })
                .collect(),
            checks: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{get_function, print};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    const SAMPLE: &str = r#"{
        "types": [
            { "name": "n", "type": { "kind": "int", "const": true } },
            { "name": "matrix", "type": { "kind": "array", "element": { "kind": "int" }, "dims": [2, 3] } },
            { "name": "row_param", "type": { "kind": "pointer", "base": { "kind": "array", "element": { "kind": "int" }, "dims": [3] } } },
            { "name": "sum", "type": { "kind": "function", "return": { "kind": "int" },
                "args": [ { "kind": "named", "name": "row_param" }, { "kind": "int" } ] } }
        ],
        "checks": [
            { "relation": "can_accept", "left": { "kind": "named", "name": "row_param" }, "right": { "kind": "named", "name": "matrix" } },
            { "relation": "common_type", "left": { "kind": "named", "name": "n" }, "right": { "kind": "int", "const": true } },
            { "relation": "common_type", "left": { "kind": "named", "name": "matrix" }, "right": { "kind": "int" } }
        ]
    }"#;

    #[test]
    fn test_build_sample() {
        let desc = Description::from_json(SAMPLE).unwrap();
        assert_eq!(desc.layout, DataLayout::ILP32);

        let env = desc.build_env().unwrap();
        assert_eq!(env.len(), 4);
        let printed: Vec<String> = env.iter().map(|(name, ty)| format!("{name}: {ty}")).collect();
        assert_eq!(
            printed,
            vec![
                "n: const int",
                "matrix: int[2][3]",
                "row_param: int[][3]",
                "sum: int(*)(int[][3], int)",
            ]
        );
    }

    #[test]
    fn test_named_references_share_handles() {
        let env = Description::from_json(SAMPLE).unwrap().build_env().unwrap();
        let row_param = env.lookup("row_param").unwrap();
        let sum = env.lookup("sum").unwrap();
        assert!(Arc::ptr_eq(&get_function(sum).arg(0).unwrap(), row_param));
        assert!(Arc::ptr_eq(env.lookup("n").unwrap(), &make_int(true)));
    }

    #[test]
    fn test_evaluate_checks() {
        let desc = Description::from_json(SAMPLE).unwrap();
        let env = desc.build_env().unwrap();
        let outcomes: Vec<String> = desc
            .checks
            .iter()
            .map(|check| check.evaluate(&env).unwrap().2.to_string())
            .collect();
        assert_eq!(outcomes, vec!["true", "const int", "not applicable"]);
        assert!(!CheckOutcome::Holds(true).is_failure());
        assert!(CheckOutcome::NotApplicable.is_failure());
    }

    #[test]
    fn test_build_rejects_bad_dimensions() {
        let env = TypeEnv::new();
        let empty = TypeDesc::Array {
            element: Box::new(TypeDesc::Int { is_const: false }),
            dims: vec![],
        };
        assert!(matches!(env.build(&empty), Err(TypeError::EmptyDimensions)));

        let zero = TypeDesc::Array {
            element: Box::new(TypeDesc::Int { is_const: false }),
            dims: vec![2, 0],
        };
        assert!(matches!(env.build(&zero), Err(TypeError::InvalidDimension { value: 0 })));

        let huge = TypeDesc::Array {
            element: Box::new(TypeDesc::Int { is_const: false }),
            dims: vec![1 << 40],
        };
        assert!(matches!(env.build(&huge), Err(TypeError::InvalidDimension { .. })));
    }

    #[test]
    fn test_dimensions_are_capped_at_int_max() {
        let env = TypeEnv::new();
        let at_max = TypeDesc::Array {
            element: Box::new(TypeDesc::Int { is_const: false }),
            dims: vec![i64::from(i32::MAX)],
        };
        assert_eq!(print(&env.build(&at_max).unwrap()), format!("int[{}]", i32::MAX));

        let past_max = TypeDesc::Array {
            element: Box::new(TypeDesc::Int { is_const: false }),
            dims: vec![i64::from(i32::MAX) + 1],
        };
        assert!(matches!(env.build(&past_max), Err(TypeError::InvalidDimension { .. })));
    }

    #[test]
    fn test_oversized_array_is_rejected() {
        let env = TypeEnv::new();
        let int_max = i64::from(i32::MAX);
        let huge = TypeDesc::Array {
            element: Box::new(TypeDesc::Int { is_const: false }),
            dims: vec![int_max, int_max, int_max],
        };
        match env.build(&huge) {
            Err(TypeError::TypeTooLarge { found }) => assert!(found.starts_with("int[")),
            other => panic!("expected TypeTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn test_build_env_uses_description_layout() {
        let desc = Description::from_json(r#"{ "layout": { "int_size": 2 } }"#).unwrap();
        assert_eq!(desc.build_env().unwrap().layout().int_size, 2);
    }

    #[test]
    fn test_build_rejects_bad_elements() {
        let env = TypeEnv::new();
        let of_pointers = TypeDesc::Array {
            element: Box::new(TypeDesc::Pointer {
                base: Box::new(TypeDesc::Int { is_const: false }),
                is_const: false,
            }),
            dims: vec![4],
        };
        match env.build(&of_pointers) {
            Err(TypeError::InvalidElement { found }) => assert_eq!(found, "int[]"),
            other => panic!("expected InvalidElement, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_and_duplicate_names() {
        let mut env = TypeEnv::new();
        let missing = TypeDesc::Named {
            name: "row".to_string(),
        };
        assert!(matches!(env.build(&missing), Err(TypeError::UnknownType { .. })));

        env.declare("row", make_void()).unwrap();
        assert!(matches!(
            env.declare("row", make_void()),
            Err(TypeError::DuplicateType { .. })
        ));
    }

    #[test]
    fn test_from_handle_collapses_arrays() {
        let env = TypeEnv::new();
        let ty = env
            .build(&TypeDesc::Array {
                element: Box::new(TypeDesc::Int { is_const: true }),
                dims: vec![4, 5],
            })
            .unwrap();
        let json = serde_json::to_string(&TypeDesc::from_handle(&ty)).unwrap();
        assert_eq!(
            json,
            r#"{"kind":"array","element":{"kind":"int","const":true},"dims":[4,5]}"#
        );
    }

    #[test]
    fn test_dump_rebuilds_same_types() {
        let env = Description::from_json(SAMPLE).unwrap().build_env().unwrap();
        let dumped = Description::from_env(&env, DataLayout::ILP32);
        let json = serde_json::to_string(&dumped).unwrap();
        let rebuilt = Description::from_json(&json).unwrap().build_env().unwrap();

        for ((name, original), (rebuilt_name, copy)) in env.iter().zip(rebuilt.iter()) {
            assert_eq!(name, rebuilt_name);
            assert!(same_type(original, copy), "{name}: {}", print(copy));
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Description::from_path("/nonexistent/sysy/types.json").unwrap_err();
        assert!(matches!(err, TypeError::Io(_)));
    }
}
