//! Matching domain - scoring user experiences against analyzed postings.

mod experience;
mod scorer;

pub use experience::{Experience, Skill, SkillCategory};
pub use scorer::{GapPriority, MatchParams, MatchRecord, MatchScorer, Relevance, SkillGap};
