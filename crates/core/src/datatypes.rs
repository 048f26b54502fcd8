//! Primitive type converter.
//!
//! Converts single CDA data type values into their FHIR equivalents. Every conversion returns
//! `None` for a null-flavored input or one that carries nothing to convert. Conversions are
//! pure and stateless.

use base64::Engine as _;
use cda::datatypes::{
    Ad, Bl, Cd, Ed, Ii, IvlPq, IvlTs, On, PivlTs, Pn, Pq, Rto, St, StrucDocText, Tel, Ts,
};
use cda::NullFlavored;
use chrono::{DateTime as ChronoDateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use fhir::datatypes::{
    Address, AddressUse, Attachment, CodeableConcept, Coding, ContactPoint, ContactPointSystem,
    ContactPointUse, Date, DateTime, HumanName, Identifier, Instant, NameUse, Narrative,
    NarrativeStatus, Period, Quantity, Range, Ratio, Timing, TimingRepeat, UnitsOfTime,
    UCUM_SYSTEM,
};

use crate::constants::{CODE_SYSTEMS, OID_URN_PREFIX, URI_SYSTEM, UUID_URN_PREFIX, XHTML_NAMESPACE};

/// Converts CDA data types into FHIR data types.
///
/// [`DefaultDataTypes`] is the standard implementation. Callers may substitute their own to
/// change, for example, how identifier systems are derived.
pub trait DataTypesTransformer: Send + Sync {
    fn identifier(&self, ii: &Ii) -> Option<Identifier>;
    fn coding(&self, cd: &Cd) -> Option<Coding>;
    fn codeable_concept(&self, cd: &Cd) -> Option<CodeableConcept>;
    fn codeable_concept_excluding_translations(&self, cd: &Cd) -> Option<CodeableConcept>;
    fn quantity(&self, pq: &Pq) -> Option<Quantity>;
    /// The point value of an `IVL_PQ` (`value`/`unit`), ignoring its bounds.
    fn quantity_from_interval(&self, ivl: &IvlPq) -> Option<Quantity>;
    fn range(&self, ivl: &IvlPq) -> Option<Range>;
    fn ratio(&self, rto: &Rto) -> Option<Ratio>;
    fn period(&self, ivl: &IvlTs) -> Option<Period>;
    fn date_time(&self, ts: &Ts) -> Option<DateTime>;
    fn date_time_from_text(&self, text: &str) -> Option<DateTime>;
    fn date(&self, ts: &Ts) -> Option<Date>;
    fn instant(&self, ts: &Ts) -> Option<Instant>;
    fn string(&self, st: &St) -> Option<String>;
    fn organization_name(&self, on: &On) -> Option<String>;
    fn attachment(&self, ed: &Ed) -> Option<Attachment>;
    fn human_name(&self, pn: &Pn) -> Option<HumanName>;
    fn address(&self, ad: &Ad) -> Option<Address>;
    fn contact_point(&self, tel: &Tel) -> Option<ContactPoint>;
    fn narrative(&self, text: &StrucDocText) -> Option<Narrative>;
    fn timing(&self, pivl: &PivlTs) -> Option<Timing>;
    fn boolean(&self, bl: &Bl) -> Option<bool>;

    /// Converts every present identifier, skipping absent ones.
    fn identifiers(&self, ids: &[Ii]) -> Vec<Identifier> {
        cda::present_items(ids)
            .filter_map(|ii| self.identifier(ii))
            .collect()
    }
}

/// Standard CDA to FHIR data type conversions.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultDataTypes;

// ============================================================================
// Timestamps
// ============================================================================

/// Precision of a CDA `TS` value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimestampPrecision {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

/// A parsed CDA timestamp: `YYYY[MM[DD[HH[MM[SS[.f+]]]]]][+|-ZZZZ]`.
///
/// A time without a zone offset is read as UTC.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CdaTimestamp {
    precision: TimestampPrecision,
    date: NaiveDate,
    time: NaiveTime,
    fraction: Option<String>,
    offset: Option<FixedOffset>,
}

impl CdaTimestamp {
    /// Parses CDA timestamp text; `None` if it is malformed or names an impossible date/time.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.len() < 4 || !text.is_ascii() {
            return None;
        }

        let (body, offset) = match text[4..].find(['+', '-']) {
            Some(at) => {
                let (body, zone) = text.split_at(at + 4);
                (body, Some(parse_offset(zone)?))
            }
            None => (text, None),
        };

        let (digits, fraction) = match body.split_once('.') {
            Some((digits, fraction)) => {
                if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                (digits, Some(fraction.to_string()))
            }
            None => (body, None),
        };
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let precision = match digits.len() {
            4 => TimestampPrecision::Year,
            6 => TimestampPrecision::Month,
            8 => TimestampPrecision::Day,
            10 => TimestampPrecision::Hour,
            12 => TimestampPrecision::Minute,
            14 => TimestampPrecision::Second,
            _ => return None,
        };
        if fraction.is_some() && precision != TimestampPrecision::Second {
            return None;
        }

        let field = |from: usize| -> u32 {
            digits
                .get(from..from + 2)
                .and_then(|s| s.parse().ok())
                .unwrap_or(0)
        };
        let year: i32 = digits[0..4].parse().ok()?;
        let month = if precision >= TimestampPrecision::Month { field(4) } else { 1 };
        let day = if precision >= TimestampPrecision::Day { field(6) } else { 1 };
        let date = NaiveDate::from_ymd_opt(year, month, day)?;

        let nanos = fraction
            .as_deref()
            .map(|f| {
                let mut padded: String = f.chars().take(9).collect();
                while padded.len() < 9 {
                    padded.push('0');
                }
                padded.parse::<u32>().unwrap_or(0)
            })
            .unwrap_or(0);
        let time = NaiveTime::from_hms_nano_opt(field(8), field(10), field(12), nanos)?;

        Some(Self {
            precision,
            date,
            time,
            fraction,
            offset,
        })
    }

    pub fn precision(&self) -> TimestampPrecision {
        self.precision
    }

    /// FHIR `dateTime` text at the source precision.
    ///
    /// Hour and minute precision are widened to seconds because FHIR has no partial-time form.
    pub fn to_fhir_date_time(&self) -> String {
        match self.precision {
            TimestampPrecision::Year | TimestampPrecision::Month | TimestampPrecision::Day => {
                self.to_fhir_date()
            }
            _ => {
                let mut text = format!(
                    "{}T{}",
                    self.date.format("%Y-%m-%d"),
                    self.time.format("%H:%M:%S")
                );
                if let Some(fraction) = &self.fraction {
                    text.push('.');
                    text.push_str(fraction);
                }
                match self.offset {
                    Some(offset) => text.push_str(&format_offset(offset)),
                    None => text.push('Z'),
                }
                text
            }
        }
    }

    /// FHIR `date` text; time components are dropped.
    pub fn to_fhir_date(&self) -> String {
        match self.precision {
            TimestampPrecision::Year => self.date.format("%Y").to_string(),
            TimestampPrecision::Month => self.date.format("%Y-%m").to_string(),
            _ => self.date.format("%Y-%m-%d").to_string(),
        }
    }

    /// Full timestamp, available from day precision upwards.
    pub fn to_date_time(&self) -> Option<ChronoDateTime<FixedOffset>> {
        if self.precision < TimestampPrecision::Day {
            return None;
        }
        let offset = match self.offset {
            Some(offset) => offset,
            None => FixedOffset::east_opt(0)?,
        };
        offset
            .from_local_datetime(&self.date.and_time(self.time))
            .single()
    }
}

fn parse_offset(zone: &str) -> Option<FixedOffset> {
    let (sign, digits) = zone.split_at(1);
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[0..2].parse().ok()?;
    let minutes: i32 = digits[2..4].parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    let seconds = hours * 3600 + minutes * 60;
    match sign {
        "+" => FixedOffset::east_opt(seconds),
        "-" => FixedOffset::west_opt(seconds),
        _ => None,
    }
}

fn format_offset(offset: FixedOffset) -> String {
    let seconds = offset.local_minus_utc();
    let sign = if seconds < 0 { '-' } else { '+' };
    let seconds = seconds.abs();
    format!("{sign}{:02}:{:02}", seconds / 3600, (seconds % 3600) / 60)
}

// ============================================================================
// Helpers
// ============================================================================

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

fn is_oid(value: &str) -> bool {
    value.starts_with(|c: char| c.is_ascii_digit())
        && !value.ends_with('.')
        && value.chars().all(|c| c.is_ascii_digit() || c == '.')
}

fn is_uuid(value: &str) -> bool {
    value.len() == 36 && cda2fhir_uuid::Uuid::parse_str(value).is_ok()
}

/// FHIR system URI for an identifier root.
pub fn identifier_system(root: &str) -> String {
    if is_oid(root) {
        format!("{OID_URN_PREFIX}{root}")
    } else if is_uuid(root) {
        format!("{UUID_URN_PREFIX}{}", root.to_ascii_lowercase())
    } else {
        root.to_owned()
    }
}

/// FHIR system URI for a code system OID. Unknown OIDs become `urn:oid:` URIs.
pub fn code_system_uri(code_system: &str) -> String {
    CODE_SYSTEMS
        .iter()
        .find(|(oid, _)| *oid == code_system)
        .map(|(_, uri)| (*uri).to_owned())
        .unwrap_or_else(|| identifier_system(code_system))
}

fn units_of_time(unit: &str) -> Option<UnitsOfTime> {
    match unit {
        "s" => Some(UnitsOfTime::Second),
        "min" => Some(UnitsOfTime::Minute),
        "h" => Some(UnitsOfTime::Hour),
        "d" => Some(UnitsOfTime::Day),
        "wk" => Some(UnitsOfTime::Week),
        "mo" => Some(UnitsOfTime::Month),
        "a" => Some(UnitsOfTime::Year),
        _ => None,
    }
}

fn name_use(code: &str) -> Option<NameUse> {
    match code {
        "L" | "OR" => Some(NameUse::Official),
        "P" | "A" => Some(NameUse::Nickname),
        "ASGN" => Some(NameUse::Usual),
        "R" => Some(NameUse::Anonymous),
        _ => None,
    }
}

fn address_use(code: &str) -> Option<AddressUse> {
    match code {
        "H" | "HP" | "HV" => Some(AddressUse::Home),
        "WP" | "DIR" | "PUB" => Some(AddressUse::Work),
        "TMP" => Some(AddressUse::Temp),
        "OLD" | "BAD" => Some(AddressUse::Old),
        _ => None,
    }
}

fn contact_point_use(code: &str) -> Option<ContactPointUse> {
    match code {
        "H" | "HP" | "HV" => Some(ContactPointUse::Home),
        "WP" | "DIR" | "PUB" => Some(ContactPointUse::Work),
        "MC" | "PG" => Some(ContactPointUse::Mobile),
        "TMP" => Some(ContactPointUse::Temp),
        "OLD" | "BAD" => Some(ContactPointUse::Old),
        _ => None,
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl DefaultDataTypes {
    /// The concept of `cd` itself: its own coding and original text, possibly empty.
    fn base_concept(&self, cd: &Cd) -> Option<CodeableConcept> {
        if !cd.is_present() {
            return None;
        }
        Some(CodeableConcept {
            coding: self.coding(cd).into_iter().collect(),
            text: cda::present(cd.original_text.as_ref())
                .and_then(|ed| non_empty(ed.text.as_deref())),
        })
    }
}

impl DataTypesTransformer for DefaultDataTypes {
    fn identifier(&self, ii: &Ii) -> Option<Identifier> {
        if !ii.is_present() {
            return None;
        }
        let root = non_empty(ii.root.as_deref());
        let extension = non_empty(ii.extension.as_deref());
        match (root, extension) {
            (Some(root), Some(extension)) => Some(Identifier {
                system: Some(identifier_system(&root)),
                value: Some(extension),
            }),
            (Some(root), None) => Some(Identifier {
                system: Some(URI_SYSTEM.to_owned()),
                value: Some(identifier_system(&root)),
            }),
            (None, Some(extension)) => Some(Identifier {
                system: None,
                value: Some(extension),
            }),
            (None, None) => None,
        }
    }

    fn coding(&self, cd: &Cd) -> Option<Coding> {
        if !cd.is_present() {
            return None;
        }
        let code = non_empty(cd.code.as_deref());
        let display = non_empty(cd.display_name.as_deref());
        if code.is_none() && display.is_none() {
            return None;
        }
        Some(Coding {
            system: non_empty(cd.code_system.as_deref()).map(|s| code_system_uri(&s)),
            version: non_empty(cd.code_system_version.as_deref()),
            code,
            display,
        })
    }

    fn codeable_concept(&self, cd: &Cd) -> Option<CodeableConcept> {
        let mut concept = self.base_concept(cd)?;
        concept.coding.extend(
            cda::present_items(&cd.translations).filter_map(|translation| self.coding(translation)),
        );
        Some(concept).filter(|c| !c.is_empty())
    }

    fn codeable_concept_excluding_translations(&self, cd: &Cd) -> Option<CodeableConcept> {
        self.base_concept(cd).filter(|c| !c.is_empty())
    }

    fn quantity(&self, pq: &Pq) -> Option<Quantity> {
        if !pq.is_present() || (pq.value.is_none() && pq.unit.is_none()) {
            return None;
        }
        let unit = non_empty(pq.unit.as_deref());
        Some(Quantity {
            value: pq.value,
            system: unit.as_ref().map(|_| UCUM_SYSTEM.to_owned()),
            code: unit.clone(),
            unit,
        })
    }

    fn quantity_from_interval(&self, ivl: &IvlPq) -> Option<Quantity> {
        if !ivl.is_present() {
            return None;
        }
        self.quantity(&Pq {
            value: ivl.value,
            unit: ivl.unit.clone(),
            null_flavor: None,
        })
    }

    fn range(&self, ivl: &IvlPq) -> Option<Range> {
        if !ivl.is_present() {
            return None;
        }
        let range = Range {
            low: ivl.low.as_ref().and_then(|pq| self.quantity(pq)),
            high: ivl.high.as_ref().and_then(|pq| self.quantity(pq)),
        };
        if range.low.is_none() && range.high.is_none() {
            return None;
        }
        Some(range)
    }

    fn ratio(&self, rto: &Rto) -> Option<Ratio> {
        if !rto.is_present() {
            return None;
        }
        let ratio = Ratio {
            numerator: rto.numerator.as_ref().and_then(|pq| self.quantity(pq)),
            denominator: rto.denominator.as_ref().and_then(|pq| self.quantity(pq)),
        };
        if ratio.numerator.is_none() && ratio.denominator.is_none() {
            return None;
        }
        Some(ratio)
    }

    fn period(&self, ivl: &IvlTs) -> Option<Period> {
        if !ivl.is_present() {
            return None;
        }
        let mut period = Period {
            start: ivl.low.as_ref().and_then(|ts| self.date_time(ts)),
            end: ivl.high.as_ref().and_then(|ts| self.date_time(ts)),
        };
        if period.start.is_none() {
            period.start = ivl.value.as_deref().and_then(|v| self.date_time_from_text(v));
        }
        Some(period).filter(|p| !p.is_empty())
    }

    fn date_time(&self, ts: &Ts) -> Option<DateTime> {
        if !ts.is_present() {
            return None;
        }
        self.date_time_from_text(ts.value.as_deref()?)
    }

    fn date_time_from_text(&self, text: &str) -> Option<DateTime> {
        CdaTimestamp::parse(text).map(|ts| DateTime::new(ts.to_fhir_date_time()))
    }

    fn date(&self, ts: &Ts) -> Option<Date> {
        if !ts.is_present() {
            return None;
        }
        CdaTimestamp::parse(ts.value.as_deref()?).map(|ts| Date::new(ts.to_fhir_date()))
    }

    fn instant(&self, ts: &Ts) -> Option<Instant> {
        if !ts.is_present() {
            return None;
        }
        CdaTimestamp::parse(ts.value.as_deref()?)
            .and_then(|ts| ts.to_date_time())
            .map(Instant::new)
    }

    fn string(&self, st: &St) -> Option<String> {
        st.text_value().map(str::to_owned)
    }

    fn organization_name(&self, on: &On) -> Option<String> {
        if !on.is_present() {
            return None;
        }
        non_empty(on.text.as_deref())
    }

    fn attachment(&self, ed: &Ed) -> Option<Attachment> {
        if !ed.is_present() {
            return None;
        }
        let attachment = Attachment {
            content_type: non_empty(ed.media_type.as_deref()),
            language: non_empty(ed.language.as_deref()),
            data: ed
                .text
                .as_deref()
                .filter(|t| !t.is_empty())
                .map(|t| base64::engine::general_purpose::STANDARD.encode(t.as_bytes())),
            url: non_empty(ed.reference.as_deref()),
        };
        if attachment == Attachment::default() {
            return None;
        }
        Some(attachment)
    }

    fn human_name(&self, pn: &Pn) -> Option<HumanName> {
        if !pn.is_present() {
            return None;
        }
        let parts = |values: &[String]| -> Vec<String> {
            values
                .iter()
                .filter_map(|v| non_empty(Some(v.as_str())))
                .collect()
        };
        let name = HumanName {
            use_code: pn.use_code.as_deref().and_then(name_use),
            text: non_empty(pn.text.as_deref()),
            family: parts(&pn.family),
            given: parts(&pn.given),
            prefix: parts(&pn.prefix),
            suffix: parts(&pn.suffix),
            period: pn.valid_time.as_ref().and_then(|ivl| self.period(ivl)),
        };
        if name.text.is_none()
            && name.family.is_empty()
            && name.given.is_empty()
            && name.prefix.is_empty()
            && name.suffix.is_empty()
        {
            return None;
        }
        Some(name)
    }

    fn address(&self, ad: &Ad) -> Option<Address> {
        if !ad.is_present() {
            return None;
        }
        let address = Address {
            use_code: ad.use_code.as_deref().and_then(address_use),
            text: non_empty(ad.text.as_deref()),
            line: ad
                .street_address_lines
                .iter()
                .filter_map(|line| non_empty(Some(line.as_str())))
                .collect(),
            city: non_empty(ad.city.as_deref()),
            district: non_empty(ad.county.as_deref()),
            state: non_empty(ad.state.as_deref()),
            postal_code: non_empty(ad.postal_code.as_deref()),
            country: non_empty(ad.country.as_deref()),
            period: ad.use_period.as_ref().and_then(|ivl| self.period(ivl)),
        };
        if address == Address::default() {
            return None;
        }
        Some(address)
    }

    fn contact_point(&self, tel: &Tel) -> Option<ContactPoint> {
        if !tel.is_present() {
            return None;
        }
        let raw = non_empty(tel.value.as_deref())?;
        let (system, value) = match raw.split_once(':') {
            Some((scheme, rest)) => match scheme.to_ascii_lowercase().as_str() {
                "tel" => (Some(ContactPointSystem::Phone), rest.to_owned()),
                "fax" => (Some(ContactPointSystem::Fax), rest.to_owned()),
                "mailto" => (Some(ContactPointSystem::Email), rest.to_owned()),
                "http" | "https" => (Some(ContactPointSystem::Other), raw.clone()),
                _ => (None, raw.clone()),
            },
            None => (None, raw.clone()),
        };
        Some(ContactPoint {
            system,
            value: Some(value),
            use_code: tel.use_code.as_deref().and_then(contact_point_use),
        })
    }

    fn narrative(&self, text: &StrucDocText) -> Option<Narrative> {
        let body = text.0.trim();
        if body.is_empty() {
            return None;
        }
        Some(Narrative {
            status: NarrativeStatus::Generated,
            div: format!("<div xmlns=\"{XHTML_NAMESPACE}\">{body}</div>"),
        })
    }

    fn timing(&self, pivl: &PivlTs) -> Option<Timing> {
        if !pivl.is_present() {
            return None;
        }
        let mut repeat = TimingRepeat {
            bounds_period: pivl.phase.as_ref().and_then(|ivl| self.period(ivl)),
            ..Default::default()
        };
        if let Some(period) = cda::present(pivl.period.as_ref()) {
            repeat.period = period.value;
            repeat.period_units = period.unit.as_deref().and_then(units_of_time);
        }
        if repeat == TimingRepeat::default() {
            return None;
        }
        Some(Timing {
            event: Vec::new(),
            repeat: Some(repeat),
        })
    }

    fn boolean(&self, bl: &Bl) -> Option<bool> {
        if !bl.is_present() {
            return None;
        }
        bl.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cda::NullFlavor;

    fn dtt() -> DefaultDataTypes {
        DefaultDataTypes
    }

    #[test]
    fn timestamp_keeps_source_precision() {
        let cases = [
            ("2012", "2012"),
            ("201208", "2012-08"),
            ("20120806", "2012-08-06"),
            ("20120806101530-0500", "2012-08-06T10:15:30-05:00"),
            ("201208061015+0130", "2012-08-06T10:15:00+01:30"),
            ("20120806101530.25+0000", "2012-08-06T10:15:30.25+00:00"),
            ("20120806101530", "2012-08-06T10:15:30Z"),
        ];
        for (source, expected) in cases {
            let ts = CdaTimestamp::parse(source).unwrap_or_else(|| panic!("parse {source}"));
            assert_eq!(ts.to_fhir_date_time(), expected, "source {source}");
        }
    }

    #[test]
    fn timestamp_rejects_impossible_values() {
        for source in ["20121301", "20120230", "2012080", "20120806256000", "abcd", "2012-08"] {
            assert!(CdaTimestamp::parse(source).is_none(), "accepted {source}");
        }
    }

    #[test]
    fn date_drops_time_and_instant_needs_a_day() {
        let ts = Ts::new("20120806101530-0500");
        assert_eq!(dtt().date(&ts).unwrap().as_str(), "2012-08-06");
        assert_eq!(
            dtt().instant(&ts).unwrap().to_fhir_string(),
            "2012-08-06T10:15:30-05:00"
        );
        assert!(dtt().instant(&Ts::new("201208")).is_none());
    }

    #[test]
    fn null_flavored_timestamp_converts_to_nothing() {
        let ts = Ts {
            value: Some("20120806".into()),
            null_flavor: Some(NullFlavor::Unk),
        };
        assert!(dtt().date_time(&ts).is_none());
    }

    #[test]
    fn identifier_with_extension_uses_root_as_system() {
        let ii = Ii {
            root: Some("2.16.840.1.113883.19.5".into()),
            extension: Some("998991".into()),
            ..Default::default()
        };
        let identifier = dtt().identifier(&ii).unwrap();
        assert_eq!(identifier.system.as_deref(), Some("urn:oid:2.16.840.1.113883.19.5"));
        assert_eq!(identifier.value.as_deref(), Some("998991"));
    }

    #[test]
    fn identifier_without_extension_is_a_uri() {
        let ii = Ii {
            root: Some("DB3D2A8E-A9B6-4A3B-8A8D-2F8A1A0E7A11".into()),
            ..Default::default()
        };
        let identifier = dtt().identifier(&ii).unwrap();
        assert_eq!(identifier.system.as_deref(), Some(URI_SYSTEM));
        assert_eq!(
            identifier.value.as_deref(),
            Some("urn:uuid:db3d2a8e-a9b6-4a3b-8a8d-2f8a1a0e7a11")
        );
    }

    #[test]
    fn identifiers_skip_absent_entries() {
        let ids = vec![
            Ii {
                null_flavor: Some(NullFlavor::Ni),
                ..Default::default()
            },
            Ii {
                root: Some("1.2.3".into()),
                ..Default::default()
            },
        ];
        assert_eq!(dtt().identifiers(&ids).len(), 1);
    }

    #[test]
    fn coded_value_maps_known_systems_and_appends_translations() {
        let cd = Cd {
            code: Some("195967001".into()),
            code_system: Some("2.16.840.1.113883.6.96".into()),
            display_name: Some("Asthma".into()),
            translations: vec![Cd {
                code: Some("J45".into()),
                code_system: Some("2.16.840.1.113883.6.90".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let concept = dtt().codeable_concept(&cd).unwrap();
        assert_eq!(concept.coding.len(), 2);
        assert_eq!(concept.coding[0].system.as_deref(), Some("http://snomed.info/sct"));
        assert_eq!(concept.coding[0].code.as_deref(), Some("195967001"));
        assert_eq!(
            concept.coding[1].system.as_deref(),
            Some("http://hl7.org/fhir/sid/icd-10-cm")
        );

        let bare = dtt().codeable_concept_excluding_translations(&cd).unwrap();
        assert_eq!(bare.coding.len(), 1);
    }

    #[test]
    fn translations_alone_still_form_a_concept() {
        let cd = Cd {
            translations: vec![Cd {
                code: Some("AMB".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(dtt().codeable_concept(&cd).unwrap().first_code(), Some("AMB"));
        assert!(dtt().codeable_concept_excluding_translations(&cd).is_none());
    }

    #[test]
    fn unknown_code_system_passes_through_as_oid() {
        let cd = Cd {
            code: Some("X".into()),
            code_system: Some("1.2.3.4".into()),
            ..Default::default()
        };
        let coding = dtt().coding(&cd).unwrap();
        assert_eq!(coding.system.as_deref(), Some("urn:oid:1.2.3.4"));
        assert_eq!(coding.code.as_deref(), Some("X"));
    }

    #[test]
    fn quantity_passes_value_and_unit_through() {
        let pq = Pq {
            value: Some(0.5),
            unit: Some("mg".into()),
            null_flavor: None,
        };
        let quantity = dtt().quantity(&pq).unwrap();
        assert_eq!(quantity.value, Some(0.5));
        assert_eq!(quantity.unit.as_deref(), Some("mg"));
        assert_eq!(quantity.code.as_deref(), Some("mg"));
        assert_eq!(quantity.system.as_deref(), Some(UCUM_SYSTEM));
    }

    #[test]
    fn contact_point_scheme_selects_system() {
        let tel = |value: &str| Tel {
            value: Some(value.into()),
            use_code: Some("HP".into()),
            null_flavor: None,
        };
        let phone = dtt().contact_point(&tel("tel:+1(555)555-2003")).unwrap();
        assert_eq!(phone.system, Some(ContactPointSystem::Phone));
        assert_eq!(phone.value.as_deref(), Some("+1(555)555-2003"));
        assert_eq!(phone.use_code, Some(ContactPointUse::Home));

        let email = dtt().contact_point(&tel("mailto:a@example.org")).unwrap();
        assert_eq!(email.system, Some(ContactPointSystem::Email));

        let web = dtt().contact_point(&tel("https://example.org")).unwrap();
        assert_eq!(web.system, Some(ContactPointSystem::Other));
        assert_eq!(web.value.as_deref(), Some("https://example.org"));
    }

    #[test]
    fn attachment_text_is_base64_encoded() {
        let ed = Ed {
            media_type: Some("text/plain".into()),
            text: Some("hello".into()),
            ..Default::default()
        };
        let attachment = dtt().attachment(&ed).unwrap();
        assert_eq!(attachment.data.as_deref(), Some("aGVsbG8="));
    }

    #[test]
    fn periodic_interval_becomes_timing_repeat() {
        let pivl = PivlTs {
            period: Some(Pq {
                value: Some(6.0),
                unit: Some("h".into()),
                null_flavor: None,
            }),
            ..Default::default()
        };
        let timing = dtt().timing(&pivl).unwrap();
        let repeat = timing.repeat.unwrap();
        assert_eq!(repeat.period, Some(6.0));
        assert_eq!(repeat.period_units, Some(UnitsOfTime::Hour));
    }

    #[test]
    fn empty_name_converts_to_nothing() {
        assert!(dtt().human_name(&Pn::default()).is_none());
        let pn = Pn {
            given: vec!["Isabella".into()],
            family: vec!["Jones".into()],
            use_code: Some("L".into()),
            ..Default::default()
        };
        let name = dtt().human_name(&pn).unwrap();
        assert_eq!(name.use_code, Some(NameUse::Official));
        assert_eq!(name.family, vec!["Jones".to_string()]);
    }

    #[test]
    fn interval_value_fills_period_start() {
        let ivl = IvlTs {
            value: Some("20120806".into()),
            ..Default::default()
        };
        let period = dtt().period(&ivl).unwrap();
        assert_eq!(period.start.unwrap().as_str(), "2012-08-06");
        assert!(period.end.is_none());
    }

    #[test]
    fn narrative_wraps_text_in_xhtml_div() {
        let narrative = dtt()
            .narrative(&StrucDocText("<p>x</p>".into()))
            .unwrap();
        assert_eq!(
            narrative.div,
            "<div xmlns=\"http://www.w3.org/1999/xhtml\"><p>x</p></div>"
        );
    }
}
