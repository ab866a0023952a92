//! Static catalog of activities and packages shown before the wizard starts.

use crate::types::{Formule, Sport};

/// An activity card on the landing page
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Activity {
    /// Display title
    pub title: &'static str,
    /// Sport the card leads to
    pub sport: Sport,
}

/// A package card on the package selection page
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormuleInfo {
    /// Package
    pub formule: Formule,
    /// Display title
    pub title: &'static str,
    /// Short description
    pub description: &'static str,
    /// Course length, for multi-day courses
    pub duration: Option<&'static str>,
}

const ACTIVITIES: [Activity; 3] = [
    Activity {
        title: "Kitesurf",
        sport: Sport::Kitesurf,
    },
    Activity {
        title: "Wingfoil",
        sport: Sport::Wingfoil,
    },
    Activity {
        title: "Efoil",
        sport: Sport::Efoil,
    },
];

/// Activities in landing-page order
#[must_use]
pub const fn activities() -> &'static [Activity] {
    &ACTIVITIES
}

/// Package cards for `sport`, in the order of [`Sport::formules`]
#[must_use]
pub fn formules(sport: Sport) -> Vec<FormuleInfo> {
    sport
        .formules()
        .iter()
        .map(|&formule| FormuleInfo {
            formule,
            title: formule.title(),
            description: description(sport, formule),
            duration: duration(formule),
        })
        .collect()
}

const fn duration(formule: Formule) -> Option<&'static str> {
    match formule {
        Formule::OneDay => Some("1 jour"),
        Formule::ThreeDays => Some("3 jours"),
        Formule::FiveDays => Some("5 jours"),
        Formule::Supervised | Formule::Duo | Formule::SunsetForTwo | Formule::SunsetForFour => None,
    }
}

const fn description(sport: Sport, formule: Formule) -> &'static str {
    match (sport, formule) {
        (Sport::Efoil, Formule::OneDay) => "Initiation à l'eFoil sur une journée",
        (Sport::Efoil, Formule::ThreeDays) => "Programme approfondi sur 3 jours",
        (Sport::Efoil, Formule::FiveDays) => "Maîtrise complète sur 5 jours",
        (_, Formule::OneDay) => "Une journée intensive pour découvrir ou progresser",
        (_, Formule::ThreeDays) => "Programme sur 3 jours pour une meilleure maîtrise",
        (_, Formule::FiveDays) => "Formation complète sur 5 jours",
        (_, Formule::Supervised) => "Navigation en autonomie avec surveillance",
        (_, Formule::Duo) => "Partagez l'expérience à deux",
        (_, Formule::SunsetForTwo) => "Session sunset pour 2 personnes",
        (_, Formule::SunsetForFour) => "Session sunset pour 4 personnes",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_activities_one_per_sport() {
        let sports: Vec<_> = activities().iter().map(|a| a.sport).collect();
        assert_eq!(sports, Sport::ALL.to_vec());
    }

    #[test]
    fn efoil_cards_use_efoil_copy() {
        let cards = formules(Sport::Efoil);
        assert_eq!(cards.len(), 6);
        assert_eq!(cards[0].description, "Initiation à l'eFoil sur une journée");
        assert_eq!(cards[3].formule, Formule::Duo);
        assert_eq!(cards[3].duration, None);
    }

    #[test]
    fn kitesurf_cards_end_with_supervision() {
        let cards = formules(Sport::Kitesurf);
        assert_eq!(cards.len(), 4);
        assert_eq!(cards[2].duration, Some("5 jours"));
        assert_eq!(cards[3].title, "Navigation surveillée");
    }
}
