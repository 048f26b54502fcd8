//! Declarative helpers shared by the enumeration and resource modules.

/// Declares a FHIR code enumeration.
///
/// Each variant is bound to its FHIR code. The generated type serialises as that code and
/// offers `as_code`, `from_code` and `ALL`.
macro_rules! fhir_codes {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $code:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_code(self) -> &'static str {
                match self {
                    $($name::$variant => $code),+
                }
            }

            /// Exact match on the FHIR code.
            pub fn from_code(code: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|value| value.as_code() == code)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_code())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_code())
            }
        }
    };
}

/// Declares a resource struct.
///
/// Every resource carries its type-qualified `id`, serialised as the bare token. All other
/// fields must implement `Default`; `new` starts a resource with every field unset.
macro_rules! fhir_resource {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $($(#[$fmeta:meta])* pub $field:ident: $ty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            #[serde(serialize_with = "crate::ids::serialize_token")]
            pub id: crate::ids::ResourceId,
            $($(#[$fmeta])* pub $field: $ty),*
        }

        impl $name {
            pub const KIND: crate::ids::ResourceKind = crate::ids::ResourceKind::$name;

            pub fn new(id: crate::ids::ResourceId) -> Self {
                debug_assert_eq!(id.kind(), Self::KIND);
                Self {
                    id,
                    $($field: Default::default()),*
                }
            }

            pub fn id(&self) -> &crate::ids::ResourceId {
                &self.id
            }
        }
    };
}
