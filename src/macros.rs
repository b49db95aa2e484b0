/// Provides convenience functions to deconstruct an enum with new-type
/// variants: `is_*`, `as_*`, `into_*`. Adapted from the teacher crate's
/// `inner_enum!`, used here on `FieldValue` and `EvalValue`, the two tagged
/// unions at the heart of the value model (spec.md §3/§9).
#[macro_export]
macro_rules! inner_enum {
    ($ty:ident, $var:ident) => {
        inner_enum!($ty, $var, $var);
    };

    ($ty:ident, $var:ident, $var_ty:ty) => {
        impl $ty {
            ::paste::paste! {
                #[doc = "Gets whether `" $ty "` is the variant `" $var "`."]
                pub fn [<is_ $var:snake>](&self) -> bool {
                    matches!(self, $ty::$var(_))
                }

                #[doc = "Gets a reference to `" $ty "` as the variant `" $var "`'s inner type."]
                pub fn [<as_ $var:snake>](&self) -> $crate::error::Result<&$var_ty> {
                    match self {
                        $ty::$var(inner) => Ok(inner),
                        other => Err($crate::error::Error::codec(format!(
                            "expected variant {}, have: {:?}",
                            stringify!($var),
                            other
                        ))),
                    }
                }

                #[doc = "Converts `" $ty "` into the variant `" $var "`'s inner type."]
                pub fn [<into_ $var:snake>](self) -> $crate::error::Result<$var_ty> {
                    match self {
                        $ty::$var(inner) => Ok(inner),
                        other => Err($crate::error::Error::codec(format!(
                            "expected variant {}, have: {:?}",
                            stringify!($var),
                            other
                        ))),
                    }
                }
            }
        }
    };
}

/// Implements `Default` in terms of an existing `Self::new()` constructor,
/// the way the teacher crate does for every message type.
#[macro_export]
macro_rules! impl_default_new {
    ($name:ident) => {
        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}
