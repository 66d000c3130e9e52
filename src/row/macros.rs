//! Declarative macros that implement [`RowType`](crate::row::RowType) for
//! structs.
//!
//! The struct is declared as usual; the macro lists the fields in the
//! column order of the rows they receive.
//!
//! ```
//! #[derive(Debug, Clone, PartialEq)]
//! pub struct User {
//!     pub id: i64,
//!     pub name: String,
//! }
//!
//! typed_sql::row_record!(User { id, name });
//! ```

/// Implement `RowType` for a plain attribute record.
#[macro_export]
macro_rules! row_record {
    ($ty:ident { $($field:ident),+ $(,)? }) => {
        $crate::__row_type_impl!($ty, $crate::row::RowShapeKind::Record, { $($field),+ }, |_row| Ok(()));
    };
}

/// Implement `RowType` for a validated model.
///
/// Every field conversion failure becomes a
/// [`ValidationError`](crate::row::ValidationError); the optional validator
/// then inspects the constructed value.
///
/// ```
/// use typed_sql::row::ValidationError;
///
/// #[derive(Debug, Clone, PartialEq)]
/// pub struct Order {
///     pub id: i64,
///     pub quantity: i64,
/// }
///
/// impl Order {
///     fn check(&self) -> Result<(), ValidationError> {
///         if self.quantity <= 0 {
///             return Err(ValidationError::field("Order", "quantity", "must be positive"));
///         }
///         Ok(())
///     }
/// }
///
/// typed_sql::row_model!(Order { id, quantity }, validator = Order::check);
/// ```
#[macro_export]
macro_rules! row_model {
    ($ty:ident { $($field:ident),+ $(,)? }) => {
        $crate::__row_type_impl!($ty, $crate::row::RowShapeKind::ValidatedModel, { $($field),+ }, |_row| Ok(()));
    };
    ($ty:ident { $($field:ident),+ $(,)? }, validator = $validator:path) => {
        $crate::__row_type_impl!($ty, $crate::row::RowShapeKind::ValidatedModel, { $($field),+ }, |row| $validator(row));
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __row_type_impl {
    ($ty:ident, $shape:expr, { $($field:ident),+ }, |$row:ident| $validate:expr) => {
        impl $crate::row::RowType for $ty {
            const SHAPE: $crate::row::RowShapeKind = $shape;

            fn field_names() -> &'static [&'static str] {
                &[$(stringify!($field)),+]
            }

            fn from_values(
                values: $crate::value::RawRow,
            ) -> ::std::result::Result<Self, $crate::value::ValueError> {
                let mut values = values.into_iter();
                Ok(Self {
                    $(
                        $field: $crate::value::FromValue::from_value(
                            values.next().unwrap_or($crate::value::Value::Null),
                        )
                        .map_err(|e| e.for_field(stringify!($field)))?,
                    )+
                })
            }

            fn to_values(&self) -> $crate::value::RawRow {
                vec![$($crate::value::ToValue::to_value(&self.$field)),+]
            }

            fn validate(&self) -> ::std::result::Result<(), $crate::row::ValidationError> {
                let $row = self;
                $validate
            }
        }
    };
}
