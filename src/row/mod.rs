//! Row shapes and the row mapper.
//!
//! A row type declares its shape once, at compile time, through
//! [`RowType::SHAPE`]. The mapper matches on that shape and runs the
//! matching handler; there is no runtime probing of the target type.
//!
//! Three shapes are recognised:
//! - [`RowShapeKind::Tuple`]: Rust tuples, bound positionally.
//! - [`RowShapeKind::Record`]: structs declared with [`row_record!`], bound
//!   positionally in field declaration order.
//! - [`RowShapeKind::ValidatedModel`]: structs declared with [`row_model!`];
//!   every conversion failure and validator failure is reported as a
//!   [`ValidationError`]. The handler exists only with the `validation`
//!   feature.
//!
//! [`row_record!`]: crate::row_record
//! [`row_model!`]: crate::row_model

mod macros;
mod validation;

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};
use crate::value::{FromValue, RawRow, ToValue, Value, ValueError};

pub use validation::ValidationError;

/// Structural convention a row type uses to receive column values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowShapeKind {
    Tuple,
    Record,
    ValidatedModel,
}

/// Identity of a row type, used as the correlation key in the mock store.
///
/// Equality is type identity; the name is kept for diagnostics only.
#[derive(Clone, Copy)]
pub struct RowTypeId {
    id: TypeId,
    name: &'static str,
}

impl RowTypeId {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for RowTypeId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RowTypeId {}

impl Hash for RowTypeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for RowTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A type that rows can be mapped into.
///
/// Implemented for tuples of convertible values, for [`RawRow`] (the
/// "no row type" case) and, through the declaration macros, for structs.
pub trait RowType: Sized + Send + 'static {
    const SHAPE: RowShapeKind;

    /// Field names in declaration order. Empty for tuple shapes.
    fn field_names() -> &'static [&'static str];

    /// Number of columns the type binds, `None` when any width is accepted.
    fn arity() -> Option<usize> {
        Some(Self::field_names().len())
    }

    /// Bind positional values in order, converting each one.
    fn from_values(values: RawRow) -> Result<Self, ValueError>;

    /// Positional values in field order.
    fn to_values(&self) -> RawRow;

    /// Model-level validation run after construction of validated models.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Descriptor used for mock correlation; `None` for raw rows.
    fn descriptor() -> Option<RowTypeId> {
        Some(RowTypeId::of::<Self>())
    }
}

impl RowType for RawRow {
    const SHAPE: RowShapeKind = RowShapeKind::Tuple;

    fn field_names() -> &'static [&'static str] {
        &[]
    }

    fn arity() -> Option<usize> {
        None
    }

    fn from_values(values: RawRow) -> Result<Self, ValueError> {
        Ok(values)
    }

    fn to_values(&self) -> RawRow {
        self.clone()
    }

    fn descriptor() -> Option<RowTypeId> {
        None
    }
}

/// Convert a positional raw row into `R`.
///
/// Raw rows pass through unchanged. Everything else is checked for arity and
/// then handed to the handler for `R`'s shape.
pub fn map_row<R: RowType>(raw: RawRow) -> Result<R> {
    if R::descriptor().is_none() {
        return Ok(R::from_values(raw)?);
    }

    if let Some(expected) = R::arity() {
        if expected != raw.len() {
            return Err(Error::ColumnCountMismatch {
                name: type_name::<R>(),
                expected,
                found: raw.len(),
            });
        }
    }

    match R::SHAPE {
        RowShapeKind::Tuple => map_tuple(raw),
        RowShapeKind::Record => map_record(raw),
        RowShapeKind::ValidatedModel => map_validated(raw),
    }
}

fn map_tuple<R: RowType>(raw: RawRow) -> Result<R> {
    Ok(R::from_values(raw)?)
}

fn map_record<R: RowType>(raw: RawRow) -> Result<R> {
    Ok(R::from_values(raw)?)
}

#[cfg(feature = "validation")]
fn map_validated<R: RowType>(raw: RawRow) -> Result<R> {
    let row = R::from_values(raw).map_err(|e| ValidationError::from_value_error(type_name::<R>(), e))?;
    row.validate()?;
    Ok(row)
}

#[cfg(not(feature = "validation"))]
fn map_validated<R: RowType>(_raw: RawRow) -> Result<R> {
    Err(Error::RowTypeNotSupported {
        name: type_name::<R>(),
        operation: "row mapping (validated models need the `validation` feature)",
    })
}

/// Field names for a header line, failing for shapes that have none.
pub fn header_names<R: RowType>() -> Result<&'static [&'static str]> {
    match R::SHAPE {
        RowShapeKind::Record | RowShapeKind::ValidatedModel => Ok(R::field_names()),
        RowShapeKind::Tuple => Err(Error::RowTypeNotSupported {
            name: type_name::<R>(),
            operation: "csv header emission",
        }),
    }
}

macro_rules! tuple_row {
    ($len:expr; $($idx:tt $name:ident),+) => {
        impl<$($name),+> RowType for ($($name,)+)
        where
            $($name: FromValue + ToValue + Send + 'static),+
        {
            const SHAPE: RowShapeKind = RowShapeKind::Tuple;

            fn field_names() -> &'static [&'static str] {
                &[]
            }

            fn arity() -> Option<usize> {
                Some($len)
            }

            fn from_values(values: RawRow) -> Result<Self, ValueError> {
                let mut values = values.into_iter();
                Ok(($(<$name as FromValue>::from_value(values.next().unwrap_or(Value::Null))?,)+))
            }

            fn to_values(&self) -> RawRow {
                vec![$(self.$idx.to_value()),+]
            }
        }
    };
}

tuple_row!(1; 0 A);
tuple_row!(2; 0 A, 1 B);
tuple_row!(3; 0 A, 1 B, 2 C);
tuple_row!(4; 0 A, 1 B, 2 C, 3 D);
tuple_row!(5; 0 A, 1 B, 2 C, 3 D, 4 E);
tuple_row!(6; 0 A, 1 B, 2 C, 3 D, 4 E, 5 F);
tuple_row!(7; 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G);
tuple_row!(8; 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{Account, Person};
    use rstest::rstest;

    #[test]
    fn test_raw_rows_pass_through() {
        let raw = vec![Value::Int(1), Value::Text("a".into()), Value::Null];
        let mapped: RawRow = map_row(raw.clone()).unwrap();
        assert_eq!(mapped, raw);
    }

    #[test]
    fn test_tuple_binds_in_order() {
        let row: (i64, String) = map_row(vec![Value::Int(1), Value::Text("a".into())]).unwrap();
        assert_eq!(row, (1, "a".to_string()));
        assert_eq!(row.to_values(), vec![Value::Int(1), Value::Text("a".into())]);
    }

    #[test]
    fn test_record_binds_in_declared_order() {
        let row: Person = map_row(vec![Value::Int(2), Value::Text("b".into())]).unwrap();
        assert_eq!(
            row,
            Person {
                id: 2,
                name: "b".into()
            }
        );
    }

    #[rstest]
    #[case(vec![Value::Int(1)])]
    #[case(vec![Value::Int(1), Value::Null, Value::Null])]
    fn test_column_count_mismatch(#[case] raw: RawRow) {
        let err = map_row::<Person>(raw).unwrap_err();
        assert!(matches!(err, Error::ColumnCountMismatch { expected: 2, .. }));
    }

    #[test]
    fn test_record_conversion_error_names_field() {
        let err = map_row::<Person>(vec![Value::Text("x".into()), Value::Text("b".into())]).unwrap_err();
        match err {
            Error::Value(e) => assert_eq!(e.field, Some("id")),
            other => panic!("expected value error, got {other:?}"),
        }
    }

    #[cfg(feature = "validation")]
    #[test]
    fn test_model_validator_rejects_illegal_value() {
        let err = map_row::<Account>(vec![Value::Int(1), Value::Float(-5.0)]).unwrap_err();
        match err {
            Error::Validation(e) => assert_eq!(e.field, Some("balance")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[cfg(feature = "validation")]
    #[test]
    fn test_model_conversion_failure_is_validation_error() {
        let err = map_row::<Account>(vec![Value::Text("abc".into()), Value::Float(1.0)]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[cfg(feature = "validation")]
    #[test]
    fn test_model_coerces_text() {
        let row: Account = map_row(vec![Value::Text("3".into()), Value::Text("9.5".into())]).unwrap();
        assert_eq!(row.id, 3);
        assert_eq!(row.balance, 9.5);
    }

    #[test]
    fn test_header_names_by_shape() {
        assert_eq!(header_names::<Person>().unwrap(), &["id", "name"]);
        assert!(matches!(
            header_names::<(i64,)>(),
            Err(Error::RowTypeNotSupported { .. })
        ));
        assert!(header_names::<RawRow>().is_err());
    }

    #[test]
    fn test_descriptor_identity() {
        assert_eq!(Person::descriptor(), Some(RowTypeId::of::<Person>()));
        assert_ne!(Person::descriptor(), Account::descriptor());
        assert_eq!(RawRow::descriptor(), None);
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let raw = vec![Value::Int(5), Value::Text("e".into())];
        let first: Person = map_row(raw.clone()).unwrap();
        let second: Person = map_row(raw).unwrap();
        assert_eq!(first, second);
    }
}
