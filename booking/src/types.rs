//! Domain types for the booking flow.
//!
//! The sport drives everything downstream: which packages ("formules") can be
//! booked and which experience levels a rider may declare. Both sets hang off
//! [`Sport`] so no other module needs per-sport conditionals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Sport-keyed enumerations
// ============================================================================

/// Activity offered by the school
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    /// Kitesurfing
    Kitesurf,
    /// Wing foiling
    Wingfoil,
    /// Electric hydrofoil
    Efoil,
}

impl Sport {
    /// Every sport, in landing-page order
    pub const ALL: [Self; 3] = [Self::Kitesurf, Self::Wingfoil, Self::Efoil];

    /// Lowercase identifier used in routes and in the outbound request
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kitesurf => "kitesurf",
            Self::Wingfoil => "wingfoil",
            Self::Efoil => "efoil",
        }
    }

    /// Display title
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Kitesurf => "Kitesurf",
            Self::Wingfoil => "Wingfoil",
            Self::Efoil => "Efoil",
        }
    }

    /// Packages that can be booked for this sport
    #[must_use]
    pub const fn formules(self) -> &'static [Formule] {
        match self {
            Self::Kitesurf | Self::Wingfoil => &[
                Formule::OneDay,
                Formule::ThreeDays,
                Formule::FiveDays,
                Formule::Supervised,
            ],
            Self::Efoil => &[
                Formule::OneDay,
                Formule::ThreeDays,
                Formule::FiveDays,
                Formule::Duo,
                Formule::SunsetForTwo,
                Formule::SunsetForFour,
            ],
        }
    }

    /// Experience levels a rider may declare for this sport
    #[must_use]
    pub const fn levels(self) -> &'static [Level] {
        match self {
            Self::Kitesurf => &[
                Level::Never,
                Level::Piloting,
                Level::BodyDrag,
                Level::FirstGlide,
                Level::BothSides,
                Level::Upwind,
            ],
            Self::Wingfoil => &[
                Level::Never,
                Level::Piloting,
                Level::FirstFlight,
                Level::BothSides,
                Level::Upwind,
            ],
            Self::Efoil => &[Level::Never, Level::FirstFlight, Level::Autonomous],
        }
    }

    /// Whether `formule` can be booked for this sport
    #[must_use]
    pub fn offers(self, formule: Formule) -> bool {
        self.formules().contains(&formule)
    }

    /// Whether `level` is meaningful for this sport
    #[must_use]
    pub fn accepts_level(self, level: Level) -> bool {
        self.levels().contains(&level)
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown identifier in a route or form value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownValue {
    /// What was being parsed
    pub kind: &'static str,
    /// The rejected input
    pub value: String,
}

impl UnknownValue {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl FromStr for Sport {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sport| sport.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownValue::new("sport", s))
    }
}

/// Bookable package ("formule")
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formule {
    /// One-day course
    #[serde(rename = "1jour")]
    OneDay,
    /// Three-day course
    #[serde(rename = "3jours")]
    ThreeDays,
    /// Five-day course
    #[serde(rename = "5jours")]
    FiveDays,
    /// Autonomous session under supervision
    #[serde(rename = "surveillance")]
    Supervised,
    /// Session for two riders
    #[serde(rename = "duo")]
    Duo,
    /// Sunset session for two people
    #[serde(rename = "apero2")]
    SunsetForTwo,
    /// Sunset session for four people
    #[serde(rename = "apero4")]
    SunsetForFour,
}

impl Formule {
    /// Route identifier
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::OneDay => "1jour",
            Self::ThreeDays => "3jours",
            Self::FiveDays => "5jours",
            Self::Supervised => "surveillance",
            Self::Duo => "duo",
            Self::SunsetForTwo => "apero2",
            Self::SunsetForFour => "apero4",
        }
    }

    /// Display title
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::OneDay => "Cours 1 jour",
            Self::ThreeDays => "Cours 3 jours",
            Self::FiveDays => "Cours 5 jours",
            Self::Supervised => "Navigation surveillée",
            Self::Duo => "Session Duo",
            Self::SunsetForTwo => "Apéro/Sunset 2 personnes",
            Self::SunsetForFour => "Apéro/Sunset 4 personnes",
        }
    }

    /// Resolve a route identifier within the packages of `sport`
    ///
    /// # Errors
    ///
    /// Returns [`UnknownValue`] if the id is not one of the sport's packages.
    pub fn from_id(sport: Sport, id: &str) -> Result<Self, UnknownValue> {
        sport
            .formules()
            .iter()
            .copied()
            .find(|formule| formule.id() == id.trim())
            .ok_or_else(|| UnknownValue::new("formule", id))
    }
}

/// Declared rider experience
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Level {
    /// Never practiced
    Never,
    /// Can fly the kite or wing
    Piloting,
    /// Body drag ("nage tractée")
    #[serde(rename = "swimming")]
    BodyDrag,
    /// First glides on the board
    FirstGlide,
    /// First flights on the foil
    FirstFlight,
    /// Rides both directions
    BothSides,
    /// Rides upwind
    Upwind,
    /// Rides autonomously
    Autonomous,
}

impl Level {
    const ALL: [Self; 8] = [
        Self::Never,
        Self::Piloting,
        Self::BodyDrag,
        Self::FirstGlide,
        Self::FirstFlight,
        Self::BothSides,
        Self::Upwind,
        Self::Autonomous,
    ];

    /// Form value
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::Piloting => "piloting",
            Self::BodyDrag => "swimming",
            Self::FirstGlide => "firstGlide",
            Self::FirstFlight => "firstFlight",
            Self::BothSides => "bothSides",
            Self::Upwind => "upwind",
            Self::Autonomous => "autonomous",
        }
    }

    /// Display label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Never => "Jamais pratiqué",
            Self::Piloting => "Pilotage",
            Self::BodyDrag => "Nage tractée",
            Self::FirstGlide => "Première glisse",
            Self::FirstFlight => "Premier vol",
            Self::BothSides => "Tire mes bords des deux côtés",
            Self::Upwind => "Remonte au vent",
            Self::Autonomous => "Autonome",
        }
    }
}

impl FromStr for Level {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.id() == s.trim())
            .ok_or_else(|| UnknownValue::new("level", s))
    }
}

/// Wetsuit size, or "brings their own"
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuitSize {
    /// Rider brings their own suit
    #[serde(rename = "own")]
    OwnSuit,
    /// XS
    #[serde(rename = "XS")]
    Xs,
    /// S
    #[serde(rename = "S")]
    S,
    /// M
    #[serde(rename = "M")]
    M,
    /// L
    #[serde(rename = "L")]
    L,
    /// XL
    #[serde(rename = "XL")]
    Xl,
}

impl SuitSize {
    const ALL: [Self; 6] = [Self::OwnSuit, Self::Xs, Self::S, Self::M, Self::L, Self::Xl];

    /// Display label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OwnSuit => "J'ai ma combinaison",
            Self::Xs => "XS",
            Self::S => "S",
            Self::M => "M",
            Self::L => "L",
            Self::Xl => "XL",
        }
    }
}

impl FromStr for SuitSize {
    type Err = UnknownValue;

    /// Accepts the display label, `own`, or a size case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("own") {
            return Ok(Self::OwnSuit);
        }
        Self::ALL
            .into_iter()
            .find(|size| size.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownValue::new("suit size", s))
    }
}

// ============================================================================
// Form fields
// ============================================================================

/// A user-editable form field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// Customer first name
    FirstName,
    /// Customer last name
    LastName,
    /// Customer email
    Email,
    /// Postal address
    Address,
    /// City
    City,
    /// Phone number
    Phone,
    /// Rider first name
    RiderFirstName,
    /// Rider last name
    RiderLastName,
    /// Rider birth date
    BirthDate,
    /// Rider height in cm
    Height,
    /// Rider weight in kg
    Weight,
    /// Wetsuit size
    SuitSize,
    /// Shoe size
    ShoeSize,
    /// Experience level
    Level,
    /// Chosen booking date
    SelectedDate,
}

impl Field {
    /// Form name of the field
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Address => "address",
            Self::City => "city",
            Self::Phone => "phone",
            Self::RiderFirstName => "riderFirstName",
            Self::RiderLastName => "riderLastName",
            Self::BirthDate => "birthDate",
            Self::Height => "height",
            Self::Weight => "weight",
            Self::SuitSize => "suitSize",
            Self::ShoeSize => "shoeSize",
            Self::Level => "level",
            Self::SelectedDate => "selectedDate",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw text input keyed by field, as typed by the user
pub type FieldValues = BTreeMap<Field, String>;

/// Field-keyed, human-readable validation messages
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    /// Empty error set
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Record a message for `field`, replacing any previous one
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Message for `field`, if any
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Whether `field` has an error
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Number of fields in error
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no errors
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fields in error, in form order
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    /// Keep only the errors whose field satisfies `keep`
    pub fn retain(&mut self, mut keep: impl FnMut(Field) -> bool) {
        self.0.retain(|field, _| keep(*field));
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

// ============================================================================
// Reservation record
// ============================================================================

/// The in-progress reservation
///
/// Every field is optional: the record fills up step by step, and a partial
/// record is also what a step merges into the store. Merging is per field,
/// last writer wins.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRecord {
    /// Customer first name
    pub first_name: Option<String>,
    /// Customer last name
    pub last_name: Option<String>,
    /// Customer email
    pub email: Option<String>,
    /// Postal address
    pub address: Option<String>,
    /// City
    pub city: Option<String>,
    /// Phone number, as entered
    pub phone: Option<String>,
    /// Chosen sport
    pub sport: Option<Sport>,
    /// Chosen package
    pub formule: Option<Formule>,
    /// Rider first name
    pub rider_first_name: Option<String>,
    /// Rider last name
    pub rider_last_name: Option<String>,
    /// Rider birth date
    pub birth_date: Option<NaiveDate>,
    /// Rider height in cm
    pub height_cm: Option<u16>,
    /// Rider weight in kg
    pub weight_kg: Option<u16>,
    /// Wetsuit size
    pub suit_size: Option<SuitSize>,
    /// Shoe size
    pub shoe_size: Option<u8>,
    /// Experience level
    pub level: Option<Level>,
    /// Booking date
    pub selected_date: Option<NaiveDate>,
}

/// A partial record destined for [`ReservationRecord::update`]
pub type ReservationPatch = ReservationRecord;

macro_rules! merge_fields {
    ($target:expr, $patch:expr, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $patch.$field {
                $target.$field = Some(value);
            }
        )+
    };
}

impl ReservationRecord {
    /// Shallow-merge `patch` into this record
    ///
    /// Fields present in `patch` overwrite, absent fields are left alone.
    pub fn update(&mut self, patch: ReservationPatch) {
        merge_fields!(
            self,
            patch,
            first_name,
            last_name,
            email,
            address,
            city,
            phone,
            sport,
            formule,
            rider_first_name,
            rider_last_name,
            birth_date,
            height_cm,
            weight_kg,
            suit_size,
            shoe_size,
            level,
            selected_date,
        );
    }

    /// Combine two patches; `later` wins where both set a field
    #[must_use]
    pub fn merge(mut self, later: ReservationPatch) -> Self {
        self.update(later);
        self
    }

    /// Promote to a complete reservation
    ///
    /// # Errors
    ///
    /// Returns [`IncompleteRecord`] listing every required field still unset.
    pub fn complete(&self) -> Result<CompleteReservation, IncompleteRecord> {
        let mut missing = Vec::new();

        fn take<T: Clone>(value: &Option<T>, name: &'static str, missing: &mut Vec<&'static str>) -> Option<T> {
            if value.is_none() {
                missing.push(name);
            }
            value.clone()
        }

        let first_name = take(&self.first_name, "firstName", &mut missing);
        let last_name = take(&self.last_name, "lastName", &mut missing);
        let email = take(&self.email, "email", &mut missing);
        let address = take(&self.address, "address", &mut missing);
        let city = take(&self.city, "city", &mut missing);
        let phone = take(&self.phone, "phone", &mut missing);
        let sport = take(&self.sport, "sport", &mut missing);
        let rider_first_name = take(&self.rider_first_name, "riderFirstName", &mut missing);
        let rider_last_name = take(&self.rider_last_name, "riderLastName", &mut missing);
        let birth_date = take(&self.birth_date, "birthDate", &mut missing);
        let height_cm = take(&self.height_cm, "height", &mut missing);
        let weight_kg = take(&self.weight_kg, "weight", &mut missing);
        let suit_size = take(&self.suit_size, "suitSize", &mut missing);
        let shoe_size = take(&self.shoe_size, "shoeSize", &mut missing);
        let level = take(&self.level, "level", &mut missing);
        let date = take(&self.selected_date, "selectedDate", &mut missing);

        match (
            first_name,
            last_name,
            email,
            address,
            city,
            phone,
            sport,
            rider_first_name,
            rider_last_name,
            birth_date,
            height_cm,
            weight_kg,
            suit_size,
            shoe_size,
            level,
            date,
        ) {
            (
                Some(first_name),
                Some(last_name),
                Some(email),
                Some(address),
                Some(city),
                Some(phone),
                Some(sport),
                Some(rider_first_name),
                Some(rider_last_name),
                Some(birth_date),
                Some(height_cm),
                Some(weight_kg),
                Some(suit_size),
                Some(shoe_size),
                Some(level),
                Some(date),
            ) => Ok(CompleteReservation {
                contact: Contact {
                    first_name,
                    last_name,
                    email,
                    address,
                    city,
                    phone,
                },
                rider: Rider {
                    first_name: rider_first_name,
                    last_name: rider_last_name,
                    birth_date,
                    height_cm,
                    weight_kg,
                    suit_size,
                    shoe_size,
                    level,
                },
                sport,
                formule: self.formule,
                date,
            }),
            _ => Err(IncompleteRecord { missing }),
        }
    }
}

/// Required fields still missing from a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("reservation is missing: {}", missing.join(", "))]
pub struct IncompleteRecord {
    /// Names of the unset fields
    pub missing: Vec<&'static str>,
}

/// Person making the reservation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Email
    pub email: String,
    /// Postal address
    pub address: String,
    /// City
    pub city: String,
    /// Phone
    pub phone: String,
}

/// Person who will ride
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rider {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Birth date
    pub birth_date: NaiveDate,
    /// Height in cm
    pub height_cm: u16,
    /// Weight in kg
    pub weight_kg: u16,
    /// Wetsuit size
    pub suit_size: SuitSize,
    /// Shoe size
    pub shoe_size: u8,
    /// Experience level
    pub level: Level,
}

/// A reservation with every required field present
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteReservation {
    /// Who books
    pub contact: Contact,
    /// Who rides
    pub rider: Rider,
    /// Activity
    pub sport: Sport,
    /// Package, when one was picked
    pub formule: Option<Formule>,
    /// Booking date
    pub date: NaiveDate,
}
