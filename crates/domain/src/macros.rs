//! Macro for implementing Display and FromStr for label enums
//!
//! Environment names and token states travel as lowercase strings in query
//! parameters, config keys and status payloads. This macro keeps both
//! directions of that conversion in one place.
//!
//! # Example
//!
//! ```rust
//! use consinco_domain::impl_domain_label_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Tier {
//!     Gold,
//!     Silver,
//! }
//!
//! impl_domain_label_conversions!(Tier {
//!     Gold => "gold",
//!     Silver => "silver",
//! });
//!
//! assert_eq!(Tier::Gold.to_string(), "gold");
//! assert_eq!("SILVER".parse::<Tier>().unwrap(), Tier::Silver);
//! ```

/// Implements Display, FromStr and `as_str` for label enums
///
/// - Display writes the lowercase label
/// - FromStr parses case-insensitively
/// - `as_str` returns the label as a `&'static str`
#[macro_export]
macro_rules! impl_domain_label_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $enum_name {
            /// Stable lowercase label.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
