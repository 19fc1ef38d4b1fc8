//! Call arguments as fingerprint key material

use super::finite::ensure_finite;
use crate::error::{MemoError, MemoResult};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// How a call's arguments were supplied
///
/// Part of the key material, so that values of different JSON shapes never
/// reduce to the same argument lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgsShape {
    /// Built argument by argument, or a tuple/sequence
    #[default]
    List,
    /// A struct or map, all keyword arguments
    Keywords,
    /// Unit or `None`, no arguments
    Unit,
    /// Any other value, one positional argument
    Single,
}

/// Positional and keyword arguments of a single call
///
/// Keyword arguments are kept in a `BTreeMap`, so insertion order never
/// reaches the key material.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    shape: ArgsShape,
    positional: Vec<Value>,
    keyword: BTreeMap<String, Value>,
}

impl Args {
    /// Empty argument list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Serialize) -> MemoResult<Self> {
        self.positional.push(to_value(&value)?);
        Ok(self)
    }

    /// Add a keyword argument, replacing any previous value for `name`
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Serialize) -> MemoResult<Self> {
        self.keyword.insert(name.into(), to_value(&value)?);
        Ok(self)
    }

    /// Derive arguments from a typed value
    ///
    /// | JSON shape | Meaning | [`ArgsShape`] |
    /// |------------|---------|---------------|
    /// | array (tuples, `Vec`) | positional arguments | `List` |
    /// | object (structs, maps) | keyword arguments | `Keywords` |
    /// | `null` (unit, `None`) | no arguments | `Unit` |
    /// | anything else | one positional argument | `Single` |
    ///
    /// The shape is recorded, so `None`, `Some(vec![])` and `Some(vec![x])`
    /// versus `x` all stay distinct.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> MemoResult<Self> {
        let (shape, positional, keyword) = match to_value(value)? {
            Value::Null => (ArgsShape::Unit, Vec::new(), BTreeMap::new()),
            Value::Array(items) => (ArgsShape::List, items, BTreeMap::new()),
            Value::Object(map) => (ArgsShape::Keywords, Vec::new(), map.into_iter().collect()),
            other => (ArgsShape::Single, vec![other], BTreeMap::new()),
        };

        Ok(Self {
            shape,
            positional,
            keyword,
        })
    }

    pub fn shape(&self) -> ArgsShape {
        self.shape
    }

    /// Positional arguments in call order
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// Keyword arguments, sorted by name
    pub fn keyword(&self) -> &BTreeMap<String, Value> {
        &self.keyword
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> MemoResult<Value> {
    // Renamed via MemoError::for_function once the callable is known
    let unserializable = |source| MemoError::UnserializableArgs {
        function: "<args>".to_string(),
        source,
    };

    ensure_finite(value).map_err(unserializable)?;
    serde_json::to_value(value).map_err(unserializable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn tuple_is_positional() {
        let args = Args::from_serialize(&(1, "two")).unwrap();
        assert_eq!(args.positional(), &[json!(1), json!("two")]);
        assert!(args.keyword().is_empty());
    }

    #[test]
    fn struct_is_keyword() {
        #[derive(Serialize)]
        struct Point {
            y: i32,
            x: i32,
        }

        let args = Args::from_serialize(&Point { y: 2, x: 1 }).unwrap();
        assert!(args.positional().is_empty());
        let names: Vec<_> = args.keyword().keys().cloned().collect();
        assert_eq!(names, vec!["x", "y"]);
    }

    #[test]
    fn scalar_is_single_positional() {
        let args = Args::from_serialize(&10).unwrap();
        assert_eq!(args.positional(), &[json!(10)]);
    }

    #[test]
    fn unit_is_empty() {
        let args = Args::from_serialize(&()).unwrap();
        assert!(args.is_empty());
        assert_eq!(args.shape(), ArgsShape::Unit);
    }

    #[test]
    fn empty_shapes_stay_distinct() {
        let none = Args::from_serialize(&None::<Vec<i32>>).unwrap();
        let empty_list = Args::from_serialize(&Some(Vec::<i32>::new())).unwrap();
        let empty_map = Args::from_serialize(&json!({})).unwrap();

        assert_ne!(none, empty_list);
        assert_ne!(empty_list, empty_map);
        assert_ne!(none, empty_map);
    }

    #[test]
    fn single_value_differs_from_one_element_list() {
        let single = Args::from_serialize(&json!(5)).unwrap();
        let list = Args::from_serialize(&json!([5])).unwrap();

        assert_eq!(single.positional(), list.positional());
        assert_ne!(single.shape(), list.shape());
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        for x in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = Args::from_serialize(&x).unwrap_err();
            assert!(matches!(err, MemoError::UnserializableArgs { .. }));
        }
        assert!(Args::new().kwarg("scale", vec![1.0, f64::NAN]).is_err());
    }

    #[test]
    fn builder_matches_from_serialize() {
        let built = Args::new().arg(1).unwrap().arg(2).unwrap();
        assert_eq!(built, Args::from_serialize(&(1, 2)).unwrap());
    }

    #[test]
    fn non_string_map_keys_are_rejected() {
        let mut map = HashMap::new();
        map.insert((1, 2), "pair");
        let err = Args::from_serialize(&map).unwrap_err();
        assert!(matches!(err, MemoError::UnserializableArgs { .. }));
    }
}
