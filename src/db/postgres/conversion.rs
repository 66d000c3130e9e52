//! Conversion between [`Value`] and PostgreSQL wire types.
//!
//! Parameters adapt to the type the server inferred for each placeholder,
//! so an `Int` can bind to `int2`, `int4`, `int8`, a float column or a text
//! column. Result cells are decoded by column type.

use std::error::Error as StdError;

use bytes::BytesMut;
use postgres::types::{to_sql_checked, IsNull, ToSql, Type};
use postgres::Row;

use crate::error::{Error, Result};
use crate::value::{RawRow, Value};

type BoxError = Box<dyn StdError + Sync + Send>;

fn is_text(ty: &Type) -> bool {
    *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME || *ty == Type::UNKNOWN
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => b.to_sql(ty, out),
            Value::Int(i) => {
                if *ty == Type::INT2 {
                    i16::try_from(*i)?.to_sql(ty, out)
                } else if *ty == Type::INT4 {
                    i32::try_from(*i)?.to_sql(ty, out)
                } else if *ty == Type::FLOAT4 {
                    (*i as f32).to_sql(ty, out)
                } else if *ty == Type::FLOAT8 {
                    (*i as f64).to_sql(ty, out)
                } else if *ty == Type::BOOL {
                    (*i != 0).to_sql(ty, out)
                } else if is_text(ty) {
                    i.to_string().to_sql(ty, out)
                } else {
                    i.to_sql(ty, out)
                }
            }
            Value::Float(f) => {
                if *ty == Type::FLOAT4 {
                    (*f as f32).to_sql(ty, out)
                } else if is_text(ty) {
                    f.to_string().to_sql(ty, out)
                } else {
                    f.to_sql(ty, out)
                }
            }
            Value::Text(s) => s.as_str().to_sql(ty, out),
            Value::Bytes(b) => b.as_slice().to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// Decode every cell of a result row.
pub fn row_values(row: &Row) -> Result<RawRow> {
    (0..row.len()).map(|i| cell(row, i)).collect()
}

fn cell(row: &Row, i: usize) -> Result<Value> {
    let ty = row.columns()[i].type_();
    let value = if *ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(i).map(|v| v.map(Value::Bool))
    } else if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(i).map(|v| v.map(|n| Value::Int(n.into())))
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(i).map(|v| v.map(|n| Value::Int(n.into())))
    } else if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(i).map(|v| v.map(Value::Int))
    } else if *ty == Type::OID {
        row.try_get::<_, Option<u32>>(i).map(|v| v.map(|n| Value::Int(n.into())))
    } else if *ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(i).map(|v| v.map(|n| Value::Float(n.into())))
    } else if *ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(i).map(|v| v.map(Value::Float))
    } else if *ty == Type::BYTEA {
        row.try_get::<_, Option<Vec<u8>>>(i).map(|v| v.map(Value::Bytes))
    } else if is_text(ty) {
        row.try_get::<_, Option<String>>(i).map(|v| v.map(Value::Text))
    } else {
        return Err(Error::driver(format!(
            "unsupported column type `{}` for column `{}`; cast it to text in the query",
            ty.name(),
            row.columns()[i].name()
        )));
    };
    Ok(value.map_err(Error::driver)?.unwrap_or(Value::Null))
}
