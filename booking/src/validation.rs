//! Per-step validation of raw form input.
//!
//! Each wizard step owns a [`StepSchema`]. Validating a schema reads only
//! that schema's fields from the input map and produces either a typed patch
//! ready for the reservation store or field-keyed messages.

use crate::calendar::DateWindow;
use crate::types::{Field, FieldErrors, FieldValues, Level, ReservationPatch, Sport, SuitSize};
use chrono::NaiveDate;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

#[allow(clippy::expect_used)] // literal pattern
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

/// `+33`, `0033` or `0`, then nine digits, the first one non-zero, grouped
/// freely with spaces, dots or dashes
#[allow(clippy::expect_used)] // literal pattern
static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:\+|00)33|0)\s*[1-9](?:[\s.-]*\d{2}){4}$").expect("phone pattern")
});

const REQUIRED: &str = "Ce champ est requis";

/// What a step validates against besides its own input
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext {
    /// Sport chosen when the wizard started
    pub sport: Option<Sport>,
    /// Bookable days; its first day is "today"
    pub window: DateWindow,
}

impl ValidationContext {
    /// Today, as seen by the validator
    #[must_use]
    pub const fn today(&self) -> NaiveDate {
        self.window.first()
    }
}

/// Field group validated together by one wizard step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepSchema {
    /// Who books
    Contact,
    /// Who rides
    Rider,
    /// When
    Schedule,
}

impl StepSchema {
    /// Fields owned by this schema, in form order
    #[must_use]
    pub const fn fields(self) -> &'static [Field] {
        match self {
            Self::Contact => &[
                Field::FirstName,
                Field::LastName,
                Field::Email,
                Field::Address,
                Field::City,
                Field::Phone,
            ],
            Self::Rider => &[
                Field::RiderFirstName,
                Field::RiderLastName,
                Field::BirthDate,
                Field::Height,
                Field::Weight,
                Field::SuitSize,
                Field::ShoeSize,
                Field::Level,
            ],
            Self::Schedule => &[Field::SelectedDate],
        }
    }

    /// Whether `field` belongs to this schema
    #[must_use]
    pub fn owns(self, field: Field) -> bool {
        self.fields().contains(&field)
    }

    /// Validate every field of this schema
    ///
    /// Inputs for fields of other schemas are ignored.
    ///
    /// # Errors
    ///
    /// Returns the message of every invalid field of this schema.
    pub fn validate(
        self,
        inputs: &FieldValues,
        ctx: &ValidationContext,
    ) -> Result<ReservationPatch, FieldErrors> {
        let mut form = Form {
            inputs,
            errors: FieldErrors::new(),
        };
        let mut patch = ReservationPatch::default();

        match self {
            Self::Contact => {
                patch.first_name = form.text(Field::FirstName);
                patch.last_name = form.text(Field::LastName);
                patch.email = form.matching(Field::Email, &EMAIL, "Adresse email invalide");
                patch.address = form.text(Field::Address);
                patch.city = form.text(Field::City);
                patch.phone = form.matching(Field::Phone, &PHONE, "Numéro de téléphone invalide");
            },
            Self::Rider => {
                patch.rider_first_name = form.text(Field::RiderFirstName);
                patch.rider_last_name = form.text(Field::RiderLastName);
                patch.birth_date = form.birth_date(ctx.today());
                patch.height_cm = form.positive::<u16>(Field::Height, "Taille invalide (en cm)");
                patch.weight_kg = form.positive::<u16>(Field::Weight, "Poids invalide (en kg)");
                patch.suit_size = form.parsed::<SuitSize>(
                    Field::SuitSize,
                    "Choisissez une taille de combinaison",
                );
                patch.shoe_size = form.positive::<u8>(Field::ShoeSize, "Pointure invalide");
                patch.level = form.level(ctx.sport);
            },
            Self::Schedule => {
                patch.selected_date = form.selected_date(&ctx.window);
            },
        }

        if form.errors.is_empty() {
            Ok(patch)
        } else {
            Err(form.errors)
        }
    }
}

/// Accepted birth date formats
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Parse a date typed as `YYYY-MM-DD` or `DD/MM/YYYY`
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw.trim(), format).ok())
}

struct Form<'a> {
    inputs: &'a FieldValues,
    errors: FieldErrors,
}

impl<'a> Form<'a> {
    /// Trimmed, non-empty input, or a "required" error
    fn required(&mut self, field: Field) -> Option<&'a str> {
        let inputs: &'a FieldValues = self.inputs;
        let value = inputs
            .get(&field)
            .map(|raw| raw.trim())
            .filter(|raw| !raw.is_empty());
        if value.is_none() {
            self.errors.insert(field, REQUIRED);
        }
        value
    }

    fn text(&mut self, field: Field) -> Option<String> {
        self.required(field).map(str::to_string)
    }

    fn matching(&mut self, field: Field, pattern: &Regex, message: &str) -> Option<String> {
        let value = self.required(field)?.to_string();
        if pattern.is_match(&value) {
            Some(value)
        } else {
            self.errors.insert(field, message);
            None
        }
    }

    fn parsed<T: FromStr>(&mut self, field: Field, message: &str) -> Option<T> {
        let parsed = self.required(field)?.parse().ok();
        if parsed.is_none() {
            self.errors.insert(field, message);
        }
        parsed
    }

    fn positive<T>(&mut self, field: Field, message: &str) -> Option<T>
    where
        T: FromStr + Default + PartialOrd,
    {
        let value = self.parsed::<T>(field, message)?;
        if value > T::default() {
            Some(value)
        } else {
            self.errors.insert(field, message);
            None
        }
    }

    fn birth_date(&mut self, today: NaiveDate) -> Option<NaiveDate> {
        let raw = self.required(Field::BirthDate)?;
        match parse_date(raw) {
            None => {
                self.errors.insert(Field::BirthDate, "Date de naissance invalide");
                None
            },
            Some(date) if date > today => {
                self.errors.insert(
                    Field::BirthDate,
                    "La date de naissance ne peut pas être dans le futur",
                );
                None
            },
            Some(date) => Some(date),
        }
    }

    fn level(&mut self, sport: Option<Sport>) -> Option<Level> {
        let raw = self.required(Field::Level)?;
        let Some(sport) = sport else {
            self.errors.insert(Field::Level, "Choisissez d'abord une activité");
            return None;
        };
        match raw.parse::<Level>() {
            Ok(level) if sport.accepts_level(level) => Some(level),
            _ => {
                self.errors.insert(Field::Level, "Choisissez un niveau");
                None
            },
        }
    }

    fn selected_date(&mut self, window: &DateWindow) -> Option<NaiveDate> {
        let inputs: &'a FieldValues = self.inputs;
        let Some(raw) = inputs
            .get(&Field::SelectedDate)
            .filter(|raw| !raw.trim().is_empty())
        else {
            self.errors.insert(Field::SelectedDate, "Veuillez sélectionner une date");
            return None;
        };
        let Some(date) = parse_date(raw) else {
            self.errors.insert(Field::SelectedDate, "Date invalide");
            return None;
        };
        match window.select(date) {
            Ok(date) => Some(date),
            Err(rejected) => {
                self.errors.insert(Field::SelectedDate, rejected.message());
                None
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ctx() -> ValidationContext {
        ValidationContext {
            sport: Some(Sport::Kitesurf),
            window: DateWindow::new(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(), None),
        }
    }

    fn contact() -> FieldValues {
        FieldValues::from([
            (Field::FirstName, "Léa".to_string()),
            (Field::LastName, "Martin".to_string()),
            (Field::Email, "a@b.com".to_string()),
            (Field::Address, "1 quai du Port".to_string()),
            (Field::City, "Hyères".to_string()),
            (Field::Phone, "0612345678".to_string()),
        ])
    }

    fn rider() -> FieldValues {
        FieldValues::from([
            (Field::RiderFirstName, "Tom".to_string()),
            (Field::RiderLastName, "Martin".to_string()),
            (Field::BirthDate, "2010-04-02".to_string()),
            (Field::Height, "150".to_string()),
            (Field::Weight, "42".to_string()),
            (Field::SuitSize, "S".to_string()),
            (Field::ShoeSize, "38".to_string()),
            (Field::Level, "swimming".to_string()),
        ])
    }

    #[test]
    fn valid_contact_produces_patch() {
        let patch = StepSchema::Contact.validate(&contact(), &ctx()).unwrap();
        assert_eq!(patch.email.as_deref(), Some("a@b.com"));
        assert_eq!(patch.city.as_deref(), Some("Hyères"));
        assert_eq!(patch.birth_date, None);
    }

    #[test]
    fn bad_email_fails_on_email_only() {
        let mut inputs = contact();
        inputs.insert(Field::Email, "not-an-email".into());

        let errors = StepSchema::Contact.validate(&inputs, &ctx()).unwrap_err();

        assert_eq!(errors.fields().collect::<Vec<_>>(), vec![Field::Email]);
    }

    #[test]
    fn french_phone_formats() {
        for phone in ["0612345678", "+33612345678", "0033 6 12 34 56 78", "06.12.34.56.78", "06-12-34-56-78"] {
            let mut inputs = contact();
            inputs.insert(Field::Phone, phone.into());
            assert!(StepSchema::Contact.validate(&inputs, &ctx()).is_ok(), "{phone}");
        }
        for phone in ["12345", "0012345678", "+336123456789", "0612"] {
            let mut inputs = contact();
            inputs.insert(Field::Phone, phone.into());
            let errors = StepSchema::Contact.validate(&inputs, &ctx()).unwrap_err();
            assert!(errors.contains(Field::Phone), "{phone}");
        }
    }

    #[test]
    fn blank_fields_are_required() {
        let mut inputs = contact();
        inputs.insert(Field::City, "   ".into());
        inputs.remove(&Field::FirstName);

        let errors = StepSchema::Contact.validate(&inputs, &ctx()).unwrap_err();

        assert_eq!(errors.get(Field::City), Some(REQUIRED));
        assert_eq!(errors.get(Field::FirstName), Some(REQUIRED));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn contact_ignores_rider_inputs() {
        let mut inputs = contact();
        inputs.insert(Field::Height, "-3".into());
        assert!(StepSchema::Contact.validate(&inputs, &ctx()).is_ok());
    }

    #[test]
    fn valid_rider_produces_typed_patch() {
        let patch = StepSchema::Rider.validate(&rider(), &ctx()).unwrap();
        assert_eq!(patch.birth_date, NaiveDate::from_ymd_opt(2010, 4, 2));
        assert_eq!(patch.height_cm, Some(150));
        assert_eq!(patch.suit_size, Some(SuitSize::S));
        assert_eq!(patch.level, Some(Level::BodyDrag));
    }

    #[test]
    fn future_birth_date_is_rejected() {
        let mut inputs = rider();
        inputs.insert(Field::BirthDate, "16/06/2025".into());

        let errors = StepSchema::Rider.validate(&inputs, &ctx()).unwrap_err();

        assert_eq!(errors.fields().collect::<Vec<_>>(), vec![Field::BirthDate]);
    }

    #[test]
    fn birth_date_today_is_accepted() {
        let mut inputs = rider();
        inputs.insert(Field::BirthDate, "15/06/2025".into());
        assert!(StepSchema::Rider.validate(&inputs, &ctx()).is_ok());
    }

    #[test]
    fn non_positive_measurements_are_rejected() {
        let mut inputs = rider();
        inputs.insert(Field::Height, "0".into());
        inputs.insert(Field::Weight, "abc".into());
        inputs.insert(Field::ShoeSize, "-1".into());

        let errors = StepSchema::Rider.validate(&inputs, &ctx()).unwrap_err();

        assert!(errors.contains(Field::Height));
        assert!(errors.contains(Field::Weight));
        assert!(errors.contains(Field::ShoeSize));
    }

    #[test]
    fn level_must_belong_to_the_sport() {
        let mut inputs = rider();
        inputs.insert(Field::Level, "autonomous".into());
        let errors = StepSchema::Rider.validate(&inputs, &ctx()).unwrap_err();
        assert!(errors.contains(Field::Level));

        let efoil = ValidationContext {
            sport: Some(Sport::Efoil),
            ..ctx()
        };
        assert!(StepSchema::Rider.validate(&inputs, &efoil).is_ok());
    }

    #[test]
    fn level_needs_a_sport() {
        let no_sport = ValidationContext { sport: None, ..ctx() };
        let errors = StepSchema::Rider.validate(&rider(), &no_sport).unwrap_err();
        assert!(errors.contains(Field::Level));
    }

    #[test]
    fn schedule_requires_a_date_in_the_window() {
        let missing = StepSchema::Schedule
            .validate(&FieldValues::new(), &ctx())
            .unwrap_err();
        assert!(missing.contains(Field::SelectedDate));

        let past = FieldValues::from([(Field::SelectedDate, "2025-06-14".to_string())]);
        let errors = StepSchema::Schedule.validate(&past, &ctx()).unwrap_err();
        assert_eq!(errors.get(Field::SelectedDate), Some("Cette date est déjà passée"));

        let today = FieldValues::from([(Field::SelectedDate, "2025-06-15".to_string())]);
        let patch = StepSchema::Schedule.validate(&today, &ctx()).unwrap();
        assert_eq!(patch.selected_date, NaiveDate::from_ymd_opt(2025, 6, 15));
    }
}
