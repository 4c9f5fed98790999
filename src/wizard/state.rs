use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Step {
    Welcome,
    NameInput,
    Questions { index: usize },
    EmailCapture,
    Photo,
    Generating,
    Result,
    ThankYou,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Welcome => "welcome",
            Step::NameInput => "name_input",
            Step::Questions { .. } => "questions",
            Step::EmailCapture => "email_capture",
            Step::Photo => "photo",
            Step::Generating => "generating",
            Step::Result => "result",
            Step::ThankYou => "thank_you",
        }
    }
}

/// User and environment events. Closed set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardEvent {
    Start,
    SubmitName {
        name: String,
    },
    SelectOption {
        option_id: String,
        #[serde(default)]
        intensity: Option<u8>,
    },
    AdjustSlider {
        value: u8,
    },
    Next,
    Previous,
    SubmitEmail {
        email: String,
    },
    /// `photo` is a base64 data URL
    ConfirmPhoto {
        photo: String,
    },
    SkipPhoto,
    Share,
    Print,
    EmailResult {
        #[serde(default)]
        to: Option<String>,
    },
    ConnectivityLost {
        message: String,
    },
    DismissError,
    Restart,
}

impl WizardEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WizardEvent::Start => "start",
            WizardEvent::SubmitName { .. } => "submit_name",
            WizardEvent::SelectOption { .. } => "select_option",
            WizardEvent::AdjustSlider { .. } => "adjust_slider",
            WizardEvent::Next => "next",
            WizardEvent::Previous => "previous",
            WizardEvent::SubmitEmail { .. } => "submit_email",
            WizardEvent::ConfirmPhoto { .. } => "confirm_photo",
            WizardEvent::SkipPhoto => "skip_photo",
            WizardEvent::Share => "share",
            WizardEvent::Print => "print",
            WizardEvent::EmailResult { .. } => "email_result",
            WizardEvent::ConnectivityLost { .. } => "connectivity_lost",
            WizardEvent::DismissError => "dismiss_error",
            WizardEvent::Restart => "restart",
        }
    }
}
