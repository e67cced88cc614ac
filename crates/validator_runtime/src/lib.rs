pub mod config;
pub mod controller;
pub mod events;
pub mod model;
pub mod reducer;
pub mod report;
pub mod session;
pub mod validators;
pub mod view;

pub use config::{ConfigError, FormConfig, PageConfig, ResultsConfig, PAGE_CONFIG_ELEMENT_ID};
pub use controller::FormController;
pub use events::{FormEvent, FormEvents, Observers, ResultsLoaded, Subscription};
pub use model::*;
pub use reducer::{reduce_form, FormAction, FormContext, FormEffect, FormError};
pub use report::{
    AnnotatorError, AnnotatorServices, ContentLoad, DownloadChoice, DownloadKind, ReportAnnotator,
    ReportFinding,
};
pub use session::SessionState;
pub use validators::{is_submittable, ValidatorRegistry};
pub use view::{apply_view, ColumnWidth, FormView};
