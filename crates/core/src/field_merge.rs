//! Field-by-field merge rule shared by every incrementally scraped record.

use std::fmt::Display;

use crate::FieldCorrection;

/// Applies the merge rule to one optional field at a time and collects the
/// corrections it makes.
///
/// An absent incoming value keeps the stored one; a present one wins, and
/// replacing a different populated value is recorded.
#[derive(Default)]
pub(crate) struct FieldMerger {
    pub(crate) corrections: Vec<FieldCorrection>,
}

impl FieldMerger {
    pub(crate) fn field<T: Clone + PartialEq + Display>(
        &mut self,
        name: &'static str,
        stored: &Option<T>,
        incoming: &Option<T>,
    ) -> Option<T> {
        match (stored, incoming) {
            (_, None) => stored.clone(),
            (Some(prev), Some(next)) if prev != next => {
                self.corrections.push(FieldCorrection {
                    field: name,
                    previous: prev.to_string(),
                    current: next.to_string(),
                });
                Some(next.clone())
            },
            (_, Some(next)) => Some(next.clone()),
        }
    }
}
