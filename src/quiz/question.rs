//! Question catalog: the fixed set of questions asked by the wizard.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Presentation layout of a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    OptionGrid,
    Slider,
    SingleSelectList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Position on the slider scale (0-100), slider layouts only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_value: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub layout: Layout,
    pub options: Vec<QuestionOption>,
}

impl Question {
    pub fn option(&self, option_id: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    pub fn is_slider(&self) -> bool {
        self.layout == Layout::Slider
    }

    /// Map a slider position to the option with the nearest scale value.
    ///
    /// Ties resolve to the higher option, so with stops at 0/50/100 the
    /// bands are 0-24, 25-74 and 75-100.
    pub fn slider_option(&self, value: u8) -> Result<&QuestionOption, ValidationError> {
        if !self.is_slider() {
            return Err(ValidationError::NotASlider(self.id.clone()));
        }
        if value > 100 {
            return Err(ValidationError::IntensityOutOfRange(value));
        }
        self.options
            .iter()
            .filter_map(|o| o.scale_value.map(|v| (o, v)))
            .min_by_key(|(_, v)| {
                let distance = (i16::from(*v) - i16::from(value)).unsigned_abs();
                // prefer the higher stop on equal distance
                (distance, std::cmp::Reverse(*v))
            })
            .map(|(o, _)| o)
            .ok_or_else(|| ValidationError::NotASlider(self.id.clone()))
    }
}

/// Ordered, immutable list of questions. Declaration order is the ask order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCatalog {
    questions: Vec<Question>,
}

impl QuestionCatalog {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn find(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn find_or_error(&self, question_id: &str) -> Result<&Question, ValidationError> {
        self.find(question_id)
            .ok_or_else(|| ValidationError::UnknownQuestion(question_id.to_string()))
    }

    /// Option label for a (question, option) pair, if both exist.
    pub fn label(&self, question_id: &str, option_id: &str) -> Option<&str> {
        self.find(question_id)
            .and_then(|q| q.option(option_id))
            .map(|o| o.label.as_str())
    }

    /// The built-in investor-profile questionnaire.
    pub fn builtin() -> Self {
        const ICON_BASE: &str = "https://api.builder.io/api/v1/image/assets/TEMP";
        let icon = |hash: &str| Some(format!("{ICON_BASE}/{hash}?width=150"));
        let opt = |id: &str, label: &str| QuestionOption {
            id: id.to_string(),
            label: label.to_string(),
            icon: None,
            scale_value: None,
        };
        let icon_opt = |id: &str, label: &str, hash: &str| QuestionOption {
            icon: icon(hash),
            ..opt(id, label)
        };
        let stop = |id: &str, label: &str, value: u8| QuestionOption {
            scale_value: Some(value),
            ..opt(id, label)
        };

        Self::new(vec![
            Question {
                id: "decision_making".to_string(),
                prompt: "When evaluating a potential investment, how do you typically approach decision-making?".to_string(),
                layout: Layout::OptionGrid,
                options: vec![
                    icon_opt("fully_data_driven", "Analytical", "a401344c9969a5d400f54f55c2592626ea2c0298"),
                    icon_opt("mostly_data_instinct", "Intuitive", "0ac811bd05f6ddc8bf847ddb3489b5c2754116e8"),
                    icon_opt("balanced_mix", "Collaborative", "99cb3257a361ef479d90e8b0e558ef7cf2d532af"),
                    icon_opt("primarily_intuition", "Opportunistic", "e289af3638361847320c030d3370ce41e910bb8d"),
                ],
            },
            Question {
                id: "risk_appetite".to_string(),
                prompt: "When considering a new opportunity, what best describes your risk tolerance?".to_string(),
                layout: Layout::Slider,
                options: vec![
                    stop("low", "Low", 0),
                    stop("medium", "Medium", 50),
                    stop("high", "High", 100),
                ],
            },
            Question {
                id: "tech_adoption".to_string(),
                prompt: "When a new technology emerges in the market, how do you respond?".to_string(),
                layout: Layout::SingleSelectList,
                options: vec![
                    opt("conservative", "Conservative"),
                    opt("experimental", "Experimental"),
                    opt("early_adopter", "Early adopter"),
                    opt("disruptive", "Disruptive"),
                ],
            },
            Question {
                id: "team_dynamics".to_string(),
                prompt: "When working with portfolio company teams, what's your default style?".to_string(),
                layout: Layout::OptionGrid,
                options: vec![
                    icon_opt("independent", "Independent", "07bc8535d78138efef9d77a8db3b62907525c1e7"),
                    icon_opt("team_player", "Team player", "8fb194a4000ebffa552aa2939002a52b3c5b7a93"),
                    icon_opt("networker", "Networker", "d50eed6283dfd5b3aeca7fe04f7541b5a9b40e10"),
                    icon_opt("xfunctional_lead", "Cross-functional leader", "164e51f9e7d3f94218adc5720da7c1485c3c90e4"),
                ],
            },
            Question {
                id: "growth_priorities".to_string(),
                prompt: "When defining a growth plan for a portfolio company, which area do you prioritize first?".to_string(),
                layout: Layout::SingleSelectList,
                options: vec![
                    opt("operational_efficiency", "Operational efficiency and cost optimization"),
                    opt("market_expansion", "Market expansion and revenue growth"),
                    opt("innovation_product", "Innovation and product development"),
                    opt("talent_leadership", "Talent and leadership team strengthening"),
                ],
            },
        ])
    }
}

impl Default for QuestionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
