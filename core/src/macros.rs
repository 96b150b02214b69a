/// Declares a record shape and derives its [`FromRow`](crate::row::FromRow) and
/// [`Record`](crate::row::Record) impls.
///
/// The struct must implement `Default`: columns missing from a row leave the
/// field at its default. Every field type must implement
/// [`FromValue`](crate::value::FromValue), and `Value: From<FieldType>`.
///
/// ```rust,ignore
/// kata::record! {
///     #[derive(Debug, Clone, Default)]
///     pub struct User {
///         pub id: i64,
///         pub name: String,
///         pub email: Option<String>,
///     }
/// }
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::row::FromRow for $name {
            fn from_row(row: $crate::row::Row) -> $crate::error::Result<Self> {
                #[allow(unused_mut)]
                let mut record = <Self as ::core::default::Default>::default();
                $(
                    if let ::core::option::Option::Some(value) = row.get(::core::stringify!($field)) {
                        record.$field = <$ty as $crate::value::FromValue>::from_value(value).map_err(|e| {
                            $crate::row::field_error(
                                ::core::stringify!($name),
                                ::core::stringify!($field),
                                e,
                            )
                        })?;
                    }
                )*
                ::core::result::Result::Ok(record)
            }
        }

        impl $crate::row::Record for $name {
            fn shape(&self) -> &'static str {
                ::core::stringify!($name)
            }

            fn field(&self, name: &str) -> ::core::option::Option<$crate::value::Value> {
                $(
                    if name.eq_ignore_ascii_case(::core::stringify!($field)) {
                        return ::core::option::Option::Some($crate::value::Value::from(
                            ::core::clone::Clone::clone(&self.$field),
                        ));
                    }
                )*
                ::core::option::Option::None
            }

            fn set_field(
                &mut self,
                name: &str,
                value: $crate::value::Value,
            ) -> $crate::error::Result<()> {
                $(
                    if name.eq_ignore_ascii_case(::core::stringify!($field)) {
                        self.$field = <$ty as $crate::value::FromValue>::from_value(&value)?;
                        return ::core::result::Result::Ok(());
                    }
                )*
                ::core::result::Result::Err($crate::error::KataError::MissingField {
                    shape: ::core::stringify!($name),
                    field: name.into(),
                })
            }
        }
    };
}
