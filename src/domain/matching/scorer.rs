//! Deterministic job/experience match scoring.
//!
//! No model calls here: scoring is a pure function of the analyzed
//! requirements, the user's experiences, and the clock, so identical inputs
//! always rank identically.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{ExperienceId, JobPostingId, Timestamp};
use crate::domain::jobs::StructuredRequirements;
use crate::domain::matching::Experience;

/// Tuning knobs for the scorer.
///
/// The category weights are renormalized over the categories a posting
/// actually has, so an experience covering every listed skill reaches the
/// full overlap score even when the posting lists no preferred skills.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchParams {
    pub required_weight: f64,
    pub preferred_weight: f64,
    pub tools_weight: f64,
    /// Discount applied when matching against free text instead of
    /// structured skill tags.
    pub keyword_weight: f64,
    /// Similarity at or above this counts as a skill match.
    pub fuzzy_threshold: f64,
    /// Half-life of the recency decay, in days.
    pub recency_half_life_days: f64,
    /// Recency multiplier never decays below this.
    pub recency_floor: f64,
    pub high_band: f64,
    pub medium_band: f64,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            required_weight: 0.6,
            preferred_weight: 0.3,
            tools_weight: 0.1,
            keyword_weight: 0.5,
            fuzzy_threshold: 0.8,
            recency_half_life_days: 730.0,
            recency_floor: 0.3,
            high_band: 0.7,
            medium_band: 0.4,
        }
    }
}

/// Coarse bucketing of a match score for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relevance {
    Low,
    Medium,
    High,
}

impl fmt::Display for Relevance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relevance::Low => write!(f, "low"),
            Relevance::Medium => write!(f, "medium"),
            Relevance::High => write!(f, "high"),
        }
    }
}

/// One scored pairing of a job posting and an experience.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub job_posting_id: JobPostingId,
    pub experience_id: ExperienceId,
    pub match_score: f64,
    pub relevance: Relevance,
    /// Posting skills this experience matched, deduplicated.
    pub target_skills: Vec<String>,
}

/// Missing-skill priority in the gap report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapPriority {
    Low,
    Medium,
    High,
}

/// A posting skill no experience covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill: String,
    pub priority: GapPriority,
}

/// Weighted-overlap scorer with recency decay.
#[derive(Debug, Clone)]
pub struct MatchScorer {
    params: MatchParams,
}

impl MatchScorer {
    pub fn new(params: MatchParams) -> Self {
        Self { params }
    }

    /// Scores one experience against a posting's requirements.
    ///
    /// The overlap component is the weighted fraction of posting skills the
    /// experience covers; the final score multiplies that by a recency
    /// factor which decays toward a non-zero floor, so old relevant
    /// experience is demoted but never erased.
    pub fn score(
        &self,
        requirements: &StructuredRequirements,
        experience: &Experience,
        now: Timestamp,
    ) -> (f64, Vec<String>) {
        let (overlap, matched) = self.overlap(requirements, experience);
        let score = (overlap * self.recency_factor(experience.occurred_at, now)).clamp(0.0, 1.0);
        (score, matched)
    }

    /// Scores and ranks every experience against one posting.
    ///
    /// Ordering is deterministic: score descending, then more recent
    /// experience first, then more distinct skills matched, then experience
    /// id as the final tiebreak.
    pub fn rank(
        &self,
        job_posting_id: JobPostingId,
        requirements: &StructuredRequirements,
        experiences: &[Experience],
        now: Timestamp,
    ) -> Vec<MatchRecord> {
        let mut scored: Vec<(MatchRecord, Timestamp)> = experiences
            .iter()
            .map(|exp| {
                let (match_score, target_skills) = self.score(requirements, exp, now);
                let record = MatchRecord {
                    job_posting_id,
                    experience_id: exp.id,
                    match_score,
                    relevance: self.relevance(match_score),
                    target_skills,
                };
                (record, exp.occurred_at)
            })
            .collect();

        scored.sort_by(|(a, a_at), (b, b_at)| {
            b.match_score
                .total_cmp(&a.match_score)
                .then_with(|| b_at.cmp(a_at))
                .then_with(|| b.target_skills.len().cmp(&a.target_skills.len()))
                .then_with(|| a.experience_id.as_uuid().cmp(b.experience_id.as_uuid()))
        });

        scored.into_iter().map(|(record, _)| record).collect()
    }

    /// Posting skills no experience covers, required gaps first.
    pub fn gap_report(
        &self,
        requirements: &StructuredRequirements,
        experiences: &[Experience],
    ) -> Vec<SkillGap> {
        let covers = |skill: &str| {
            experiences.iter().any(|exp| {
                if exp.has_structured_skills() {
                    exp.skills
                        .iter()
                        .any(|s| self.names_match(&s.name, skill))
                } else {
                    text_contains_skill(&exp.free_text(), skill)
                }
            })
        };

        let mut gaps = Vec::new();
        for skill in &requirements.required_skills {
            if !covers(skill) {
                gaps.push(SkillGap {
                    skill: skill.clone(),
                    priority: GapPriority::High,
                });
            }
        }
        for skill in &requirements.preferred_skills {
            if !covers(skill) {
                gaps.push(SkillGap {
                    skill: skill.clone(),
                    priority: GapPriority::Medium,
                });
            }
        }
        for skill in &requirements.tools_technologies {
            if !covers(skill) {
                gaps.push(SkillGap {
                    skill: skill.clone(),
                    priority: GapPriority::Low,
                });
            }
        }
        gaps
    }

    /// Buckets a score into its relevance band.
    pub fn relevance(&self, score: f64) -> Relevance {
        if score >= self.params.high_band {
            Relevance::High
        } else if score >= self.params.medium_band {
            Relevance::Medium
        } else {
            Relevance::Low
        }
    }

    /// `floor + (1 - floor) * 2^(-age / half_life)`, so a brand-new
    /// experience gets 1.0 and an ancient one approaches the floor.
    pub fn recency_factor(&self, occurred_at: Timestamp, now: Timestamp) -> f64 {
        let age_days = occurred_at.days_until(now) as f64;
        let decay = (-age_days / self.params.recency_half_life_days).exp2();
        self.params.recency_floor + (1.0 - self.params.recency_floor) * decay
    }

    fn overlap(
        &self,
        requirements: &StructuredRequirements,
        experience: &Experience,
    ) -> (f64, Vec<String>) {
        if experience.has_structured_skills() {
            self.structured_overlap(requirements, experience)
        } else {
            self.keyword_overlap(requirements, experience)
        }
    }

    fn structured_overlap(
        &self,
        requirements: &StructuredRequirements,
        experience: &Experience,
    ) -> (f64, Vec<String>) {
        let mut matched = Vec::new();
        let mut weighted = 0.0;
        let mut weight_total = 0.0;

        let categories = [
            (&requirements.required_skills, self.params.required_weight),
            (&requirements.preferred_skills, self.params.preferred_weight),
            (&requirements.tools_technologies, self.params.tools_weight),
        ];
        for (skills, weight) in categories {
            if skills.is_empty() {
                continue;
            }
            weight_total += weight;
            let mut hits = 0usize;
            for target in skills {
                let hit = experience
                    .skills
                    .iter()
                    .any(|s| self.names_match(&s.name, target));
                if hit {
                    hits += 1;
                    push_unique(&mut matched, target);
                }
            }
            weighted += weight * hits as f64 / skills.len() as f64;
        }

        if weight_total == 0.0 {
            return (0.0, matched);
        }
        (weighted / weight_total, matched)
    }

    fn keyword_overlap(
        &self,
        requirements: &StructuredRequirements,
        experience: &Experience,
    ) -> (f64, Vec<String>) {
        let text = experience.free_text();
        let mut matched = Vec::new();
        // A skill listed under several posting categories counts once.
        let mut targets: Vec<&str> = Vec::new();
        for name in requirements.all_skill_names() {
            if !targets.iter().any(|t| t.eq_ignore_ascii_case(name)) {
                targets.push(name);
            }
        }
        for target in &targets {
            if text_contains_skill(&text, target) {
                push_unique(&mut matched, target);
            }
        }
        if targets.is_empty() {
            return (0.0, matched);
        }
        let fraction = matched.len() as f64 / targets.len() as f64;
        (fraction * self.params.keyword_weight, matched)
    }

    /// Case-insensitive exact match, or normalized edit similarity at or
    /// above the fuzzy threshold.
    fn names_match(&self, a: &str, b: &str) -> bool {
        let a = a.trim().to_lowercase();
        let b = b.trim().to_lowercase();
        if a == b {
            return true;
        }
        strsim::normalized_levenshtein(&a, &b) >= self.params.fuzzy_threshold
    }
}

fn push_unique(matched: &mut Vec<String>, skill: &str) {
    if !matched.iter().any(|m| m.eq_ignore_ascii_case(skill)) {
        matched.push(skill.to_string());
    }
}

/// Case-insensitive occurrence check on word boundaries, using the same
/// word-character rules as the analyzer's keyword fallback ('+' and '#'
/// belong to tokens). A "Java" requirement does not match "JavaScript".
fn text_contains_skill(text: &str, skill: &str) -> bool {
    let skill = skill.trim().to_lowercase();
    if skill.is_empty() {
        return false;
    }
    let text = text.to_lowercase();
    let is_word = |c: char| c.is_alphanumeric() || c == '+' || c == '#';

    let mut from = 0;
    while let Some(pos) = text[from..].find(&skill) {
        let at = from + pos;
        let end = at + skill.len();
        let bounded_left = !text[..at].chars().next_back().map_or(false, is_word);
        let bounded_right = !text[end..].chars().next().map_or(false, is_word);
        if bounded_left && bounded_right {
            return true;
        }
        from = at + text[at..].chars().next().map_or(1, char::len_utf8);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::OwnerId;
    use crate::domain::jobs::AnalysisConfidence;
    use crate::domain::matching::{Skill, SkillCategory};
    use proptest::prelude::*;

    fn owner() -> OwnerId {
        OwnerId::new("user-1").unwrap()
    }

    fn requirements(required: &[&str], preferred: &[&str], tools: &[&str]) -> StructuredRequirements {
        StructuredRequirements {
            required_skills: required.iter().map(|s| s.to_string()).collect(),
            preferred_skills: preferred.iter().map(|s| s.to_string()).collect(),
            tools_technologies: tools.iter().map(|s| s.to_string()).collect(),
            responsibilities: vec![],
            red_flags: vec![],
            confidence: AnalysisConfidence::High,
            analyzed_at: Timestamp::now(),
        }
    }

    fn experience_with(skills: &[&str], occurred_at: Timestamp) -> Experience {
        let tagged = skills
            .iter()
            .map(|s| Skill::new(owner(), *s, SkillCategory::Technical))
            .collect();
        Experience::new(owner(), "an experience", occurred_at).with_skills(tagged)
    }

    #[test]
    fn fresh_superset_reaches_full_score() {
        let scorer = MatchScorer::new(MatchParams::default());
        let reqs = requirements(&["Python", "SQL"], &["Docker"], &["Git"]);
        let exp = experience_with(&["Python", "SQL", "Docker", "Git", "Rust"], Timestamp::now());

        let (score, matched) = scorer.score(&reqs, &exp, Timestamp::now());
        assert!((score - 1.0).abs() < 1e-9, "score was {score}");
        assert_eq!(matched.len(), 4);
    }

    #[test]
    fn weights_renormalize_when_categories_absent() {
        let scorer = MatchScorer::new(MatchParams::default());
        // Only required skills listed; full coverage must still reach 1.0.
        let reqs = requirements(&["Python"], &[], &[]);
        let exp = experience_with(&["Python"], Timestamp::now());

        let (score, _) = scorer.score(&reqs, &exp, Timestamp::now());
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn recent_experience_outscores_old_identical_experience() {
        let scorer = MatchScorer::new(MatchParams::default());
        let now = Timestamp::now();
        let reqs = requirements(&["Python", "SQL"], &[], &["Docker"]);
        let recent = experience_with(&["Python", "SQL", "Docker"], now.minus_days(30));
        let old = experience_with(&["Python", "SQL", "Docker"], now.minus_days(5 * 365));

        let (recent_score, _) = scorer.score(&reqs, &recent, now);
        let (old_score, _) = scorer.score(&reqs, &old, now);
        assert!(recent_score > old_score);
        assert!(old_score > 0.0);
    }

    #[test]
    fn recency_never_decays_below_floor() {
        let scorer = MatchScorer::new(MatchParams::default());
        let now = Timestamp::now();
        let factor = scorer.recency_factor(now.minus_days(100 * 365), now);
        assert!(factor >= 0.3);
        assert!(factor < 0.31);
    }

    #[test]
    fn fuzzy_match_covers_minor_spelling_variants() {
        let scorer = MatchScorer::new(MatchParams::default());
        assert!(scorer.names_match("PostgreSQL", "postgresql"));
        assert!(scorer.names_match("Kubernetes", "Kuberneties"));
        assert!(!scorer.names_match("Java", "JavaScript"));
    }

    #[test]
    fn untagged_experience_scores_from_free_text_at_discount() {
        let scorer = MatchScorer::new(MatchParams::default());
        let now = Timestamp::now();
        let reqs = requirements(&["Python", "SQL"], &[], &[]);
        let exp = Experience::new(owner(), "Wrote Python ETL jobs backed by SQL", now);

        let (score, matched) = scorer.score(&reqs, &exp, now);
        assert_eq!(matched.len(), 2);
        // Full keyword coverage, fresh experience: capped at the discount.
        assert!((score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn skill_listed_in_two_categories_counts_once_for_keyword_coverage() {
        let scorer = MatchScorer::new(MatchParams::default());
        let now = Timestamp::now();
        // "Python" appears as both a required skill and a tool.
        let reqs = requirements(&["Python"], &[], &["Python"]);
        let exp = Experience::new(owner(), "Shipped Python services", now);

        let (score, matched) = scorer.score(&reqs, &exp, now);
        assert_eq!(matched.len(), 1);
        // Full coverage of the posting's one distinct skill reaches the cap.
        assert!((score - 0.5).abs() < 1e-9, "score was {score}");
    }

    #[test]
    fn free_text_matches_whole_words_only() {
        let scorer = MatchScorer::new(MatchParams::default());
        let now = Timestamp::now();
        let reqs = requirements(&["Java"], &[], &[]);

        let frontend = Experience::new(owner(), "Built JavaScript frontends", now);
        let (score, matched) = scorer.score(&reqs, &frontend, now);
        assert_eq!(score, 0.0);
        assert!(matched.is_empty());

        let backend = Experience::new(owner(), "Built Java services, then more.", now);
        let (score, matched) = scorer.score(&reqs, &backend, now);
        assert!(score > 0.0);
        assert_eq!(matched, vec!["Java".to_string()]);
    }

    #[test]
    fn free_text_matching_keeps_symbolic_names_intact() {
        assert!(text_contains_skill("Ported a C++ renderer", "c++"));
        assert!(!text_contains_skill("Wrote plain C bindings", "c++"));
        assert!(text_contains_skill("Moved services to C# last year", "C#"));
    }

    #[test]
    fn no_overlap_scores_zero_regardless_of_recency() {
        let scorer = MatchScorer::new(MatchParams::default());
        let now = Timestamp::now();
        let reqs = requirements(&["Haskell"], &[], &[]);
        let exp = experience_with(&["Python"], now);

        let (score, matched) = scorer.score(&reqs, &exp, now);
        assert_eq!(score, 0.0);
        assert!(matched.is_empty());
    }

    #[test]
    fn ranking_is_deterministic_with_ties() {
        let scorer = MatchScorer::new(MatchParams::default());
        let now = Timestamp::now();
        let reqs = requirements(&["Python"], &[], &[]);
        let a = experience_with(&["Python"], now.minus_days(10));
        let b = experience_with(&["Python"], now.minus_days(10));
        let job = JobPostingId::new();

        let first = scorer.rank(job, &reqs, &[a.clone(), b.clone()], now);
        let second = scorer.rank(job, &reqs, &[b, a], now);
        let ids =
            |records: &[MatchRecord]| records.iter().map(|r| r.experience_id).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn rank_orders_by_score_then_recency() {
        let scorer = MatchScorer::new(MatchParams::default());
        let now = Timestamp::now();
        let reqs = requirements(&["Python", "SQL"], &[], &[]);
        let strong_old = experience_with(&["Python", "SQL"], now.minus_days(3 * 365));
        let weak_recent = experience_with(&["Python"], now.minus_days(1));

        let records = scorer.rank(JobPostingId::new(), &reqs, &[weak_recent, strong_old.clone()], now);
        assert_eq!(records.len(), 2);
        assert!(records[0].match_score >= records[1].match_score);
    }

    #[test]
    fn relevance_bands_partition_scores() {
        let scorer = MatchScorer::new(MatchParams::default());
        assert_eq!(scorer.relevance(0.9), Relevance::High);
        assert_eq!(scorer.relevance(0.7), Relevance::High);
        assert_eq!(scorer.relevance(0.5), Relevance::Medium);
        assert_eq!(scorer.relevance(0.1), Relevance::Low);
    }

    #[test]
    fn gap_report_lists_required_gaps_first() {
        let scorer = MatchScorer::new(MatchParams::default());
        let reqs = requirements(&["Haskell"], &["Docker"], &["Git"]);
        let exp = experience_with(&["Docker"], Timestamp::now());

        let gaps = scorer.gap_report(&reqs, &[exp]);
        assert_eq!(gaps.len(), 2);
        assert_eq!(gaps[0].skill, "Haskell");
        assert_eq!(gaps[0].priority, GapPriority::High);
        assert_eq!(gaps[1].skill, "Git");
        assert_eq!(gaps[1].priority, GapPriority::Low);
    }

    proptest! {
        #[test]
        fn score_always_in_unit_interval(
            skills in proptest::collection::vec("[a-zA-Z+#]{1,12}", 0..8),
            targets in proptest::collection::vec("[a-zA-Z+#]{1,12}", 0..8),
            age_days in 0i64..20_000,
        ) {
            let scorer = MatchScorer::new(MatchParams::default());
            let now = Timestamp::now();
            let reqs = requirements(
                &targets.iter().map(String::as_str).collect::<Vec<_>>(),
                &[],
                &[],
            );
            let skill_refs: Vec<&str> = skills.iter().map(String::as_str).collect();
            let exp = experience_with(&skill_refs, now.minus_days(age_days));

            let (score, _) = scorer.score(&reqs, &exp, now);
            prop_assert!((0.0..=1.0).contains(&score));
        }
    }
}
