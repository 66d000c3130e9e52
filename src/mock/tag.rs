//! Write-operation tags.
//!
//! `Insert<T>`, `Update<T>` and `Delete<T>` never reach a driver; they only
//! serve as correlation keys in the mock store so a test can assert which
//! kind of write ran against which record type.

use std::fmt;
use std::marker::PhantomData;

use crate::row::{RowType, RowTypeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for WriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteKind::Insert => write!(f, "insert"),
            WriteKind::Update => write!(f, "update"),
            WriteKind::Delete => write!(f, "delete"),
        }
    }
}

/// A write kind parameterised by its target record type.
pub trait Tag: 'static {
    type Target: RowType;
    const KIND: WriteKind;

    /// Correlation key: the identity of the tag type itself, so both the kind
    /// and the target take part in the comparison.
    fn descriptor() -> RowTypeId {
        RowTypeId::of::<Self>()
    }
}

macro_rules! write_tag {
    ($($name:ident => $kind:ident),+) => {
        $(
            #[doc = concat!("Marks a ", stringify!($kind), " against `T`.")]
            pub struct $name<T>(PhantomData<fn() -> T>);

            impl<T: RowType> Tag for $name<T> {
                type Target = T;
                const KIND: WriteKind = WriteKind::$kind;
            }
        )+
    };
}

write_tag!(Insert => Insert, Update => Update, Delete => Delete);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{Account, Person};

    #[test]
    fn test_kind_and_target_both_distinguish() {
        assert_eq!(Insert::<Person>::descriptor(), Insert::<Person>::descriptor());
        assert_ne!(Insert::<Person>::descriptor(), Update::<Person>::descriptor());
        assert_ne!(Insert::<Person>::descriptor(), Insert::<Account>::descriptor());
        assert_ne!(Some(Insert::<Person>::descriptor()), Person::descriptor());
    }

    #[test]
    fn test_kind_constant() {
        assert_eq!(Delete::<Person>::KIND, WriteKind::Delete);
        assert_eq!(Update::<Account>::KIND.to_string(), "update");
    }
}
