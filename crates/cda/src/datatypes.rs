//! CDA R2 data types.
//!
//! Wire representations of the HL7 v3 data types that appear in a C-CDA document. Every type
//! carries an optional `nullFlavor`; when it is set the value is absent and nothing else on it
//! may be interpreted (see [`NullFlavored`]).
//!
//! Field names follow the CDA attribute and element names in camelCase. Repeating elements use
//! plural keys (`translations`, `given`, `streetAddressLines`).
//!
//! Polymorphic values (`xsi:type`) are modelled as internally tagged enums keyed by `type`:
//! - [`AnyValue`] for observation values,
//! - [`SxcmTs`] for the effective times of substance administrations and supplies.
//!
//! Unrecognised tags deserialize to an `Unknown` variant instead of failing the document.

use serde::Deserialize;

// ============================================================================
// Absence marker
// ============================================================================

/// HL7 v3 null flavor.
///
/// Any code outside the known set is kept as [`NullFlavor::Other`]; it still marks the value
/// as absent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum NullFlavor {
    /// No information.
    Ni,
    /// Not applicable.
    Na,
    /// Unknown.
    Unk,
    /// Asked but unknown.
    Asku,
    /// Temporarily unavailable.
    Nav,
    /// Not asked.
    Nask,
    /// Masked.
    Msk,
    /// Other.
    Oth,
    /// Negative infinity.
    Ninf,
    /// Positive infinity.
    Pinf,
    /// Trace.
    Trc,
    /// Sufficient quantity.
    Qs,
    /// Not present.
    Np,
    /// Unrecognised null flavor code.
    Other,
}

impl NullFlavor {
    /// The HL7 v3 code.
    pub fn as_code(self) -> &'static str {
        match self {
            NullFlavor::Ni => "NI",
            NullFlavor::Na => "NA",
            NullFlavor::Unk => "UNK",
            NullFlavor::Asku => "ASKU",
            NullFlavor::Nav => "NAV",
            NullFlavor::Nask => "NASK",
            NullFlavor::Msk => "MSK",
            NullFlavor::Oth => "OTH",
            NullFlavor::Ninf => "NINF",
            NullFlavor::Pinf => "PINF",
            NullFlavor::Trc => "TRC",
            NullFlavor::Qs => "QS",
            NullFlavor::Np => "NP",
            NullFlavor::Other => "OTHER",
        }
    }
}

impl From<String> for NullFlavor {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "NI" => NullFlavor::Ni,
            "NA" => NullFlavor::Na,
            "UNK" => NullFlavor::Unk,
            "ASKU" => NullFlavor::Asku,
            "NAV" => NullFlavor::Nav,
            "NASK" => NullFlavor::Nask,
            "MSK" => NullFlavor::Msk,
            "OTH" => NullFlavor::Oth,
            "NINF" => NullFlavor::Ninf,
            "PINF" => NullFlavor::Pinf,
            "TRC" => NullFlavor::Trc,
            "QS" => NullFlavor::Qs,
            "NP" => NullFlavor::Np,
            _ => NullFlavor::Other,
        }
    }
}

/// A source element that may carry an absence marker.
pub trait NullFlavored {
    fn null_flavor(&self) -> Option<NullFlavor>;

    /// True when the element has no null flavor and may be interpreted.
    fn is_present(&self) -> bool {
        self.null_flavor().is_none()
    }
}

impl<T: NullFlavored> NullFlavored for Box<T> {
    fn null_flavor(&self) -> Option<NullFlavor> {
        (**self).null_flavor()
    }
}

/// Returns the element only when it exists and is not null-flavored.
pub fn present<T: NullFlavored>(value: Option<&T>) -> Option<&T> {
    value.filter(|v| v.is_present())
}

/// Iterates the elements of a repeating field that are not null-flavored.
pub fn present_items<T: NullFlavored>(items: &[T]) -> impl Iterator<Item = &T> {
    items.iter().filter(|v| v.is_present())
}

/// Implements [`NullFlavored`] for structs with a `null_flavor` field.
#[macro_export]
macro_rules! impl_null_flavored {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::NullFlavored for $ty {
                fn null_flavor(&self) -> Option<$crate::NullFlavor> {
                    self.null_flavor
                }
            }
        )+
    };
}

// ============================================================================
// Identifiers and codes
// ============================================================================

/// `II`: instance identifier.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Ii {
    pub root: Option<String>,
    pub extension: Option<String>,
    pub assigning_authority_name: Option<String>,
    pub displayable: Option<bool>,
    pub null_flavor: Option<NullFlavor>,
}

/// `CD` and its restrictions (`CE`, `CV`, `CS`, `CO`).
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Cd {
    pub code: Option<String>,
    pub code_system: Option<String>,
    pub code_system_name: Option<String>,
    pub code_system_version: Option<String>,
    pub display_name: Option<String>,
    pub original_text: Option<Ed>,
    pub translations: Vec<Cd>,
    pub null_flavor: Option<NullFlavor>,
}

impl Cd {
    /// The code value when the concept is present and the code is non-empty.
    pub fn code_value(&self) -> Option<&str> {
        if !self.is_present() {
            return None;
        }
        self.code.as_deref().filter(|c| !c.is_empty())
    }
}

// ============================================================================
// Quantities
// ============================================================================

/// `PQ`: physical quantity.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pq {
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub null_flavor: Option<NullFlavor>,
}

/// `IVL_PQ`: interval of physical quantities.
///
/// Dose quantities use the interval type but usually carry only `value` and `unit`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IvlPq {
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub low: Option<Pq>,
    pub high: Option<Pq>,
    pub null_flavor: Option<NullFlavor>,
}

/// `RTO`: ratio of two quantities.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Rto {
    pub numerator: Option<Pq>,
    pub denominator: Option<Pq>,
    pub null_flavor: Option<NullFlavor>,
}

// ============================================================================
// Text
// ============================================================================

/// `ST`: character string.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct St {
    pub text: Option<String>,
    pub null_flavor: Option<NullFlavor>,
}

impl St {
    pub fn text_value(&self) -> Option<&str> {
        if !self.is_present() {
            return None;
        }
        self.text.as_deref().filter(|t| !t.is_empty())
    }
}

/// `ED`: encapsulated data.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Ed {
    pub media_type: Option<String>,
    pub language: Option<String>,
    /// Inline content.
    pub text: Option<String>,
    /// Reference to externally held content.
    pub reference: Option<String>,
    pub null_flavor: Option<NullFlavor>,
}

/// `BL`: boolean.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Bl {
    pub value: Option<bool>,
    pub null_flavor: Option<NullFlavor>,
}

/// Section narrative block (`StrucDocText`), held as XHTML-like markup.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct StrucDocText(pub String);

// ============================================================================
// Time
// ============================================================================

/// `TS`: point in time in HL7 v3 form, `YYYY[MM[DD[HH[MM[SS[.ffff]]]]]][+/-ZZZZ]`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Ts {
    pub value: Option<String>,
    pub null_flavor: Option<NullFlavor>,
}

impl Ts {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            null_flavor: None,
        }
    }
}

/// `IVL_TS`: interval of time. A bare `value` denotes a single point.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IvlTs {
    pub value: Option<String>,
    pub low: Option<Ts>,
    pub high: Option<Ts>,
    pub null_flavor: Option<NullFlavor>,
}

/// `PIVL_TS`: periodic interval of time, used for dosing frequency.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PivlTs {
    pub period: Option<Pq>,
    pub phase: Option<IvlTs>,
    pub institution_specified: Option<bool>,
    pub null_flavor: Option<NullFlavor>,
}

/// `SXCM_TS` with its concrete subtypes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum SxcmTs {
    #[serde(rename = "TS")]
    Ts(Ts),
    #[serde(rename = "IVL_TS")]
    IvlTs(IvlTs),
    #[serde(rename = "PIVL_TS")]
    PivlTs(PivlTs),
    #[serde(other)]
    Unknown,
}

impl SxcmTs {
    /// The point-in-time `value` attribute, when the subtype has one.
    pub fn value(&self) -> Option<&str> {
        match self {
            SxcmTs::Ts(ts) => ts.value.as_deref(),
            SxcmTs::IvlTs(ivl) => ivl.value.as_deref(),
            SxcmTs::PivlTs(_) | SxcmTs::Unknown => None,
        }
    }
}

impl NullFlavored for SxcmTs {
    fn null_flavor(&self) -> Option<NullFlavor> {
        match self {
            SxcmTs::Ts(ts) => ts.null_flavor,
            SxcmTs::IvlTs(ivl) => ivl.null_flavor,
            SxcmTs::PivlTs(pivl) => pivl.null_flavor,
            SxcmTs::Unknown => None,
        }
    }
}

// ============================================================================
// Names, addresses, telecoms
// ============================================================================

/// `PN` / `EN`: person or entity name.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pn {
    /// Space separated `EntityNameUse` codes (`L`, `P`, `C`, ...).
    #[serde(rename = "use")]
    pub use_code: Option<String>,
    pub prefix: Vec<String>,
    pub given: Vec<String>,
    pub family: Vec<String>,
    pub suffix: Vec<String>,
    /// Unstructured name text.
    pub text: Option<String>,
    pub valid_time: Option<IvlTs>,
    pub null_flavor: Option<NullFlavor>,
}

/// `ON`: organization name.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct On {
    pub text: Option<String>,
    pub null_flavor: Option<NullFlavor>,
}

/// `AD`: postal address.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Ad {
    /// Space separated `PostalAddressUse` codes (`H`, `HP`, `WP`, `TMP`, ...).
    #[serde(rename = "use")]
    pub use_code: Option<String>,
    pub street_address_lines: Vec<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub text: Option<String>,
    pub use_period: Option<IvlTs>,
    pub null_flavor: Option<NullFlavor>,
}

/// `TEL`: telecommunication address as a URL (`tel:`, `mailto:`, `fax:`, `http:`).
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tel {
    pub value: Option<String>,
    #[serde(rename = "use")]
    pub use_code: Option<String>,
    pub null_flavor: Option<NullFlavor>,
}

// ============================================================================
// Polymorphic observation value
// ============================================================================

/// `ANY` as it appears in `observation/value`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum AnyValue {
    #[serde(rename = "CD", alias = "CE", alias = "CV", alias = "CO", alias = "CS")]
    Cd(Cd),
    #[serde(rename = "PQ")]
    Pq(Pq),
    #[serde(rename = "ST")]
    St(St),
    #[serde(rename = "IVL_PQ")]
    IvlPq(IvlPq),
    #[serde(rename = "RTO", alias = "RTO_PQ_PQ")]
    Rto(Rto),
    #[serde(rename = "ED")]
    Ed(Ed),
    #[serde(rename = "TS")]
    Ts(Ts),
    #[serde(other)]
    Unknown,
}

impl AnyValue {
    pub fn as_cd(&self) -> Option<&Cd> {
        match self {
            AnyValue::Cd(cd) => Some(cd),
            _ => None,
        }
    }

    pub fn as_pq(&self) -> Option<&Pq> {
        match self {
            AnyValue::Pq(pq) => Some(pq),
            _ => None,
        }
    }

    pub fn as_ivl_pq(&self) -> Option<&IvlPq> {
        match self {
            AnyValue::IvlPq(ivl) => Some(ivl),
            _ => None,
        }
    }
}

impl NullFlavored for AnyValue {
    fn null_flavor(&self) -> Option<NullFlavor> {
        match self {
            AnyValue::Cd(v) => v.null_flavor,
            AnyValue::Pq(v) => v.null_flavor,
            AnyValue::St(v) => v.null_flavor,
            AnyValue::IvlPq(v) => v.null_flavor,
            AnyValue::Rto(v) => v.null_flavor,
            AnyValue::Ed(v) => v.null_flavor,
            AnyValue::Ts(v) => v.null_flavor,
            AnyValue::Unknown => None,
        }
    }
}

impl_null_flavored!(Ii, Cd, Pq, IvlPq, Rto, St, Ed, Bl, Ts, IvlTs, PivlTs, Pn, On, Ad, Tel);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_flavor_parses_known_and_unknown_codes() {
        let known: NullFlavor = serde_yaml::from_str("UNK").expect("should parse");
        assert_eq!(known, NullFlavor::Unk);

        let lower: NullFlavor = serde_yaml::from_str("asku").expect("should parse");
        assert_eq!(lower, NullFlavor::Asku);

        let other: NullFlavor = serde_yaml::from_str("XYZ").expect("should parse");
        assert_eq!(other, NullFlavor::Other);
    }

    #[test]
    fn present_filters_null_flavored_values() {
        let absent = Cd {
            null_flavor: Some(NullFlavor::Ni),
            ..Default::default()
        };
        let code = Cd {
            code: Some("123".into()),
            ..Default::default()
        };

        assert!(present(Some(&absent)).is_none());
        assert!(present(Some(&code)).is_some());
        assert!(present::<Cd>(None).is_none());

        let items = vec![absent.clone(), code.clone(), absent];
        assert_eq!(present_items(&items).count(), 1);
    }

    #[test]
    fn code_value_ignores_empty_codes() {
        let empty = Cd {
            code: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(empty.code_value(), None);
    }

    #[test]
    fn any_value_dispatches_on_type_tag() {
        let yaml = r#"
- type: CD
  code: "247472004"
  codeSystem: 2.16.840.1.113883.6.96
- type: CE
  code: "1"
- type: PQ
  value: 120
  unit: mm[Hg]
- type: INT
  value: 4
- type: PQ
  nullFlavor: NAV
"#;

        let values: Vec<AnyValue> = serde_yaml::from_str(yaml).expect("should parse values");
        assert_eq!(values.len(), 5);
        assert!(values[0].as_cd().is_some());
        assert!(values[1].as_cd().is_some());
        assert_eq!(values[2].as_pq().and_then(|pq| pq.value), Some(120.0));
        assert_eq!(values[3], AnyValue::Unknown);
        assert!(values[3].is_present());
        assert_eq!(values[4].null_flavor(), Some(NullFlavor::Nav));
    }

    #[test]
    fn sxcm_ts_exposes_point_value() {
        let yaml = r#"
- type: IVL_TS
  value: "20120806"
- type: PIVL_TS
  period:
    value: 6
    unit: h
- type: TS
  value: "201208061030"
"#;

        let times: Vec<SxcmTs> = serde_yaml::from_str(yaml).expect("should parse times");
        assert_eq!(times[0].value(), Some("20120806"));
        assert_eq!(times[1].value(), None);
        assert_eq!(times[2].value(), Some("201208061030"));
    }
}
