/// Declares a model struct whose `Wrapper` fields are classified at compile
/// time.
///
/// ```
/// use wrapfield::{model, Model, Wrapper};
///
/// model! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct Invoice {
///         pub total: Wrapper<i64> = Wrapper::present(0),
///         pub paid: Wrapper<i64>,
///         pub discount: Option<Wrapper<i64>>,
///         pub customer: String,
///         pub issued: Wrapper<String> => required,
///     }
/// }
///
/// let invoice = Invoice::from_json(serde_json::json!({
///     "customer": "acme",
///     "issued": "2024-01-31",
/// }))
/// .unwrap();
/// assert_eq!(invoice.total, Wrapper::present(0));
/// assert!(invoice.paid.is_none());
/// assert_eq!(invoice.discount, Some(Wrapper::absent()));
/// assert!(Invoice::from_json(serde_json::json!({ "customer": "acme" })).is_err());
/// ```
///
/// A field without a default is required unless it is wrapped or optional.
/// Append `=> required` (or `=> optional`) after the type or default to
/// override that.
///
/// Every field type must implement `FieldShape`; use `impl_plain_field!` for
/// your own plain types. The invoking crate needs `serde` as a dependency.
#[macro_export]
macro_rules! model {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty $(= $default:expr)? $(=> $marker:ident)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(::serde::Serialize)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::Model for $name {
            fn schema() -> &'static $crate::ModelSchema {
                static SCHEMA: $crate::__private::Lazy<$crate::ModelSchema> =
                    $crate::__private::Lazy::new(|| {
                        $crate::ModelSchema::new(
                            stringify!($name),
                            ::std::vec![
                                $({
                                    let default: ::std::option::Option<$ty> =
                                        $crate::__model_default!($($default)?);
                                    $crate::domain::shape::field_spec::<$ty>(
                                        stringify!($field),
                                        stringify!($ty),
                                        default,
                                        $crate::__model_required!($($marker)?),
                                    )
                                }),*
                            ],
                        )
                    });
                &SCHEMA
            }

            fn from_fields(
                #[allow(unused_mut)] mut fields: $crate::RawFields,
            ) -> ::std::result::Result<Self, ::std::vec::Vec<$crate::FieldError>> {
                #[allow(unused_mut)]
                let mut errors = ::std::vec::Vec::new();
                $(
                    let $field = match <$ty as $crate::FieldShape>::from_raw(
                        stringify!($field),
                        fields.remove(stringify!($field)),
                    ) {
                        ::std::result::Result::Ok(value) => ::std::option::Option::Some(value),
                        ::std::result::Result::Err(error) => {
                            errors.push(error);
                            ::std::option::Option::None
                        }
                    };
                )*
                #[allow(unreachable_patterns)]
                match ($($field,)*) {
                    ($(::std::option::Option::Some($field),)*) => ::std::result::Result::Ok(Self { $($field),* }),
                    _ => ::std::result::Result::Err(errors),
                }
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __model_default {
    () => {
        ::std::option::Option::None
    };
    ($default:expr) => {
        ::std::option::Option::Some($default)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __model_required {
    () => {
        ::std::option::Option::None
    };
    (required) => {
        ::std::option::Option::Some(true)
    };
    (optional) => {
        ::std::option::Option::Some(false)
    };
    ($other:ident) => {
        ::std::compile_error!(::std::concat!(
            "unknown field marker `",
            ::std::stringify!($other),
            "`, expected `required` or `optional`"
        ))
    };
}
