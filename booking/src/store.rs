//! The reservation store: the single owner of the in-progress record.
//!
//! It lives inside the wizard state, so the runtime `Store` is what makes it
//! observable: every update happens inside a reduction and is republished to
//! `subscribe_state()` receivers before `send` returns.

use crate::types::{ReservationPatch, ReservationRecord};

/// Owner of the session's reservation record
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReservationStore {
    record: ReservationRecord,
    revision: u64,
}

impl ReservationStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current record
    #[must_use]
    pub const fn record(&self) -> &ReservationRecord {
        &self.record
    }

    /// Number of updates applied since the last reset
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Shallow-merge a partial record, last writer wins per field
    ///
    /// No validation happens here; callers merge only validated patches.
    pub fn update(&mut self, patch: ReservationPatch) {
        self.record.update(patch);
        self.revision += 1;
        tracing::debug!(revision = self.revision, "Reservation record updated");
    }

    /// Forget everything
    pub fn reset(&mut self) {
        self.record = ReservationRecord::default();
        self.revision = 0;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Level, Sport, SuitSize};
    use chrono::NaiveDate;
    use proptest::prelude::*;

    #[test]
    fn update_bumps_revision_and_merges() {
        let mut store = ReservationStore::new();

        store.update(ReservationPatch {
            email: Some("a@b.com".into()),
            ..ReservationPatch::default()
        });
        store.update(ReservationPatch {
            phone: Some("0612345678".into()),
            ..ReservationPatch::default()
        });

        assert_eq!(store.revision(), 2);
        assert_eq!(store.record().email.as_deref(), Some("a@b.com"));
        assert_eq!(store.record().phone.as_deref(), Some("0612345678"));
    }

    #[test]
    fn reset_empties_the_record() {
        let mut store = ReservationStore::new();
        store.update(ReservationPatch {
            sport: Some(Sport::Efoil),
            ..ReservationPatch::default()
        });

        store.reset();

        assert_eq!(store, ReservationStore::new());
    }

    fn arb_patch() -> impl Strategy<Value = ReservationPatch> {
        (
            proptest::option::of("[a-z]{1,8}"),
            proptest::option::of("[a-z]{1,8}@[a-z]{1,5}\\.fr"),
            proptest::option::of(prop_oneof![
                Just(Sport::Kitesurf),
                Just(Sport::Wingfoil),
                Just(Sport::Efoil)
            ]),
            proptest::option::of(1u16..250),
            proptest::option::of(prop_oneof![Just(SuitSize::OwnSuit), Just(SuitSize::M)]),
            proptest::option::of(prop_oneof![Just(Level::Never), Just(Level::Upwind)]),
            proptest::option::of(0i64..365),
        )
            .prop_map(|(first_name, email, sport, height_cm, suit_size, level, offset)| {
                ReservationPatch {
                    first_name,
                    email,
                    sport,
                    height_cm,
                    suit_size,
                    level,
                    selected_date: offset.map(|days| {
                        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
                            + chrono::Duration::days(days)
                    }),
                    ..ReservationPatch::default()
                }
            })
    }

    proptest! {
        #[test]
        fn merge_is_associative(base in arb_patch(), a in arb_patch(), b in arb_patch()) {
            let mut stepwise = ReservationStore::new();
            stepwise.update(base.clone());
            stepwise.update(a.clone());
            stepwise.update(b.clone());

            let mut combined = ReservationStore::new();
            combined.update(base);
            combined.update(a.merge(b));

            prop_assert_eq!(stepwise.record(), combined.record());
        }
    }
}
