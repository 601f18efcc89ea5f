//! Data models
//!
//! This module contains the data structures shared across the admin tool:
//! - Content types and their static capability descriptors
//! - Content items as exchanged with the content service
//! - Form schemas for every editable content type
//! - Account models (users, tokens, devices)

mod account;
mod car_image;
mod car_model;
mod car_stage;
mod content_type;
pub mod form;
mod item;
mod manufacturer;
mod stage_timing;
mod video_link;
mod video_serie;

pub use account::{ChangePasswordForm, Device, EditUser, LoginResult, SigninForm, User, UserForm, UserToken};
pub use car_image::{CarImage, CarImageForm};
pub use car_model::{CarModel, CarModelForm, AXLE_TYPES, TRANSMISSION_TYPES};
pub use car_stage::{CarStage, CarStageForm};
pub use content_type::{ContentType, ContentTypeDescriptor, ParentField, DASHBOARD_TYPES};
pub use form::{ContentSchema, FormErrors, FormField, Scope};
pub use item::Item;
pub use manufacturer::{Manufacturer, ManufacturerForm};
pub use stage_timing::{StageTiming, StageTimingForm};
pub use video_link::{VideoLink, VideoLinkForm};
pub use video_serie::{VideoSerie, VideoSerieForm};
