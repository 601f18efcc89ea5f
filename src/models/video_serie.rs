//! Video series schema

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::form::{ContentSchema, FormErrors, FormField, Scope};
use super::{ContentType, Item};

pub struct VideoSerie;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSerieForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Checkbox, present when ticked
    #[serde(default)]
    pub is_public: Option<String>,
}

impl ContentSchema for VideoSerie {
    const KIND: ContentType = ContentType::VideoSeries;
    type Form = VideoSerieForm;

    fn form_from_item(item: &Item) -> VideoSerieForm {
        VideoSerieForm {
            title: item.get_str("title").unwrap_or_default().to_string(),
            description: item.get_str("description").unwrap_or_default().to_string(),
            is_public: item.get_bool("isPublic").filter(|b| *b).map(|_| "true".to_string()),
        }
    }

    fn fields(form: &VideoSerieForm, _options: &[Item]) -> Vec<FormField> {
        vec![
            FormField::text("title", "Title", &form.title).required(),
            FormField::textarea("description", "Description", &form.description),
            FormField::checkbox("isPublic", "Public", form.is_public.is_some()),
        ]
    }

    fn validate(form: &VideoSerieForm, _scope: &Scope) -> Result<Map<String, Value>, FormErrors> {
        let mut errors = FormErrors::new();
        let title = errors.required_text("title", &form.title);
        errors.finish(json!({
            "title": title,
            "description": form.description.trim(),
            "isPublic": form.is_public.is_some(),
        }))
    }
}
