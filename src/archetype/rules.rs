//! Deterministic, rule-based archetype derivation.
//!
//! Every (question, option) pair awards points to one or more profiles; the
//! highest total wins and ties go to the profile declared first.

use super::{Archetype, ArchetypeSource};
use crate::quiz::{AnswerSet, QuestionCatalog};

/// Static description of one archetype profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub name: &'static str,
    pub descriptor: &'static str,
    pub value_line: &'static str,
    pub color_palette: &'static str,
    pub background_style: &'static str,
    pub character_type: &'static str,
    pub character_pose: &'static str,
}

impl Profile {
    pub fn to_archetype(self) -> Archetype {
        Archetype {
            name: self.name.to_string(),
            descriptor: self.descriptor.to_string(),
            value_line: self.value_line.to_string(),
            color_palette: self.color_palette.to_string(),
            background_style: self.background_style.to_string(),
            character_type: self.character_type.to_string(),
            character_pose: self.character_pose.to_string(),
            source: ArchetypeSource::Local,
        }
    }
}

const VISIONARY: usize = 0;
const STRATEGIST: usize = 1;
const TRAILBLAZER: usize = 2;
const CONNECTOR: usize = 3;
const GUARDIAN: usize = 4;

/// Profiles in tie-break order.
pub const PROFILES: [Profile; 5] = [
    Profile {
        name: "Visionary",
        descriptor: "You see around corners and turn emerging technology into conviction.",
        value_line: "You back tomorrow's category leaders before the market notices them.",
        color_palette: "electric blue, vibrant violet and white",
        background_style: "neon gradient with subtle circuit patterns",
        character_type: "sleek explorer android",
        character_pose: "gazing toward a holographic horizon",
    },
    Profile {
        name: "Strategist",
        descriptor: "You turn data into decisive, well-structured theses.",
        value_line: "You compound value through disciplined, evidence-led moves.",
        color_palette: "deep navy, teal and silver",
        background_style: "clean grid of glowing data charts",
        character_type: "precise analyst robot with a visor display",
        character_pose: "studying a floating chess board",
    },
    Profile {
        name: "Trailblazer",
        descriptor: "You challenge the status quo and move first when others hesitate.",
        value_line: "You ignite industry shifts with bold, high-impact bets.",
        color_palette: "fiery orange, magenta and gold",
        background_style: "dynamic speed lines over a sunrise gradient",
        character_type: "agile jet-powered robot",
        character_pose: "dynamic forward-leaning stance",
    },
    Profile {
        name: "Connector",
        descriptor: "You build the teams and networks that make transformation stick.",
        value_line: "You unlock growth by bringing the right people together.",
        color_palette: "emerald green, aqua and warm white",
        background_style: "soft web of interlinked nodes",
        character_type: "friendly companion robot",
        character_pose: "open-armed welcoming gesture",
    },
    Profile {
        name: "Guardian",
        descriptor: "You protect value with rigor, patience and operational clarity.",
        value_line: "You build resilient portfolios that weather every cycle.",
        color_palette: "forest green, slate grey and bronze",
        background_style: "sturdy geometric shield pattern",
        character_type: "sturdy armored sentinel robot",
        character_pose: "steady, grounded stance with arms crossed",
    },
];

/// Points awarded per (question id, option id)
const WEIGHTS: &[(&str, &str, &[(usize, u32)])] = &[
    ("decision_making", "fully_data_driven", &[(STRATEGIST, 2), (GUARDIAN, 1)]),
    ("decision_making", "mostly_data_instinct", &[(VISIONARY, 2)]),
    ("decision_making", "balanced_mix", &[(CONNECTOR, 2)]),
    ("decision_making", "primarily_intuition", &[(TRAILBLAZER, 2)]),
    ("risk_appetite", "low", &[(GUARDIAN, 2)]),
    ("risk_appetite", "medium", &[(STRATEGIST, 1), (CONNECTOR, 1)]),
    ("risk_appetite", "high", &[(TRAILBLAZER, 2), (VISIONARY, 1)]),
    ("tech_adoption", "conservative", &[(GUARDIAN, 2)]),
    ("tech_adoption", "experimental", &[(VISIONARY, 1), (STRATEGIST, 1)]),
    ("tech_adoption", "early_adopter", &[(VISIONARY, 2)]),
    ("tech_adoption", "disruptive", &[(VISIONARY, 2), (TRAILBLAZER, 1)]),
    ("team_dynamics", "independent", &[(TRAILBLAZER, 1), (STRATEGIST, 1)]),
    ("team_dynamics", "team_player", &[(CONNECTOR, 2)]),
    ("team_dynamics", "networker", &[(CONNECTOR, 2), (VISIONARY, 1)]),
    ("team_dynamics", "xfunctional_lead", &[(STRATEGIST, 1), (CONNECTOR, 1)]),
    ("growth_priorities", "operational_efficiency", &[(GUARDIAN, 2), (STRATEGIST, 1)]),
    ("growth_priorities", "market_expansion", &[(TRAILBLAZER, 2)]),
    ("growth_priorities", "innovation_product", &[(VISIONARY, 2)]),
    ("growth_priorities", "talent_leadership", &[(CONNECTOR, 2)]),
];

/// Per-profile scores for an answer set, in `PROFILES` order.
pub fn score(catalog: &QuestionCatalog, answers: &AnswerSet) -> [u32; PROFILES.len()] {
    let mut scores = [0u32; PROFILES.len()];
    for labeled in answers.labeled(catalog) {
        let awards = WEIGHTS
            .iter()
            .find(|(q, o, _)| *q == labeled.question.id && *o == labeled.option.id)
            .map(|(_, _, awards)| *awards)
            .unwrap_or(&[]);
        for (profile, points) in awards {
            scores[*profile] += points;
        }
    }
    scores
}

/// Derive the archetype for an answer set. Pure: same answers, same archetype.
pub fn derive_local(catalog: &QuestionCatalog, answers: &AnswerSet) -> Archetype {
    let scores = score(catalog, answers);
    let mut best = 0;
    for (index, points) in scores.iter().enumerate() {
        if *points > scores[best] {
            best = index;
        }
    }
    PROFILES[best].to_archetype()
}
