//! Video link schema
//!
//! A link attaches a video either to a video series or to a stage. The
//! attachment point is taken from the route the form is submitted on.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::form::{display_opt, ContentSchema, FormErrors, FormField, Scope};
use super::{ContentType, Item};

pub struct VideoLink;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoLinkForm {
    #[serde(default, rename = "videoID")]
    pub video_id: String,
    #[serde(default, rename = "referenceID")]
    pub reference_id: String,
}

impl ContentSchema for VideoLink {
    const KIND: ContentType = ContentType::VideoSeriesVideoLink;
    const OPTIONS: Option<ContentType> = Some(ContentType::Video);
    type Form = VideoLinkForm;

    fn form_from_item(item: &Item) -> VideoLinkForm {
        VideoLinkForm {
            video_id: display_opt(item.get_i64("videoID")),
            reference_id: display_opt(item.get_i64("referenceID")),
        }
    }

    fn fields(form: &VideoLinkForm, videos: &[Item]) -> Vec<FormField> {
        vec![
            FormField::item_select("videoID", "Video", &form.video_id, videos).required(),
            FormField::number("referenceID", "Position", &form.reference_id),
        ]
    }

    fn validate(form: &VideoLinkForm, scope: &Scope) -> Result<Map<String, Value>, FormErrors> {
        let mut errors = FormErrors::new();
        let video_id = errors.required_id("videoID", &form.video_id);
        let reference_id = errors.optional_number::<i64>("referenceID", &form.reference_id);
        let series_id = scope.parent_id(ContentType::VideoSeries);
        let stage_id = scope.parent_id(ContentType::Stage);
        if series_id.is_none() && stage_id.is_none() {
            errors.add("videoID", "Video must be attached to a series or a stage");
        }
        errors.finish(json!({
            "videoID": video_id,
            "referenceID": reference_id,
            "videoSerieID": series_id,
            "stageID": stage_id,
        }))
    }
}
