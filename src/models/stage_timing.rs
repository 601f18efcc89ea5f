//! Stage timing schema
//!
//! A timing records acceleration times in seconds for the
//! 0-100, 100-200 and 200-300 km/h intervals.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::form::{number_field, ContentSchema, FormErrors, FormField, Scope};
use super::{ContentType, Item};

pub struct StageTiming;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageTimingForm {
    #[serde(default)]
    pub second1: String,
    #[serde(default)]
    pub second2: String,
    #[serde(default)]
    pub second3: String,
}

impl ContentSchema for StageTiming {
    const KIND: ContentType = ContentType::Timing;
    type Form = StageTimingForm;

    fn form_from_item(item: &Item) -> StageTimingForm {
        StageTimingForm {
            second1: number_field(item, "second1"),
            second2: number_field(item, "second2"),
            second3: number_field(item, "second3"),
        }
    }

    fn fields(form: &StageTimingForm, _options: &[Item]) -> Vec<FormField> {
        vec![
            FormField::number("second1", "0-100 km/h (s)", &form.second1),
            FormField::number("second2", "100-200 km/h (s)", &form.second2),
            FormField::number("second3", "200-300 km/h (s)", &form.second3),
        ]
    }

    fn validate(form: &StageTimingForm, scope: &Scope) -> Result<Map<String, Value>, FormErrors> {
        let mut errors = FormErrors::new();
        let mut seconds = [None; 3];
        for (slot, (field, raw)) in seconds.iter_mut().zip([
            ("second1", &form.second1),
            ("second2", &form.second2),
            ("second3", &form.second3),
        ]) {
            match errors.optional_number::<f64>(field, raw) {
                Some(s) if !s.is_finite() => errors.add(field, "Please enter a number"),
                Some(s) if s <= 0.0 => errors.add(field, "Must be greater than zero"),
                parsed => *slot = parsed,
            }
        }
        if seconds.iter().all(Option::is_none) && errors.is_empty() {
            errors.add("second1", "Enter at least one interval");
        }
        let stage_id = scope.parent_id(ContentType::Stage);
        if stage_id.is_none() {
            errors.add("stageID", "Timing must belong to a stage");
        }
        errors.finish(json!({
            "stageID": stage_id,
            "second1": seconds[0],
            "second2": seconds[1],
            "second3": seconds[2],
        }))
    }
}
