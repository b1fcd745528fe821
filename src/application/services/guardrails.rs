use crate::domain::entities::triage::{EMERGENCY_SPECIALTY, GENERAL_PRACTICE};
use crate::domain::entities::{TriageLevel, TriageResult};

/// Escalation: every phrase group must match somewhere in the message.
/// A single group gives plain any-of semantics; two groups express a
/// co-occurring symptom pair.
#[derive(Debug)]
pub struct EscalationRule {
    pub name: &'static str,
    pub all_of: &'static [&'static [&'static str]],
    pub red_flag: &'static str,
}

/// Benign downgrade: fires when a trigger phrase is present and none of the
/// disjoint red-flag phrases are. Any red-flag phrase disables it.
#[derive(Debug)]
pub struct DowngradeRule {
    pub name: &'static str,
    pub any_of: &'static [&'static str],
    pub blocked_by: &'static [&'static str],
    pub follow_ups: [&'static str; 3],
}

#[derive(Debug)]
pub enum GuardrailRule {
    Escalate(EscalationRule),
    Downgrade(DowngradeRule),
}

impl GuardrailRule {
    fn name(&self) -> &'static str {
        match self {
            GuardrailRule::Escalate(rule) => rule.name,
            GuardrailRule::Downgrade(rule) => rule.name,
        }
    }
}

/// Ordered deterministic overrides applied after triage pass 1, whatever the
/// model returned. Escalations precede downgrades; the first firing rule
/// wins. Checks are plain substring containment on the lowercased message,
/// so the set is English-specific and swappable as a unit.
pub struct GuardrailSet {
    rules: Vec<GuardrailRule>,
}

impl Default for GuardrailSet {
    fn default() -> Self {
        Self {
            rules: vec![
                GuardrailRule::Escalate(EscalationRule {
                    name: "chest_pain_with_dyspnea",
                    all_of: &[
                        &["chest pain", "chest tightness", "chest pressure"],
                        &[
                            "shortness of breath",
                            "short of breath",
                            "difficulty breathing",
                            "trouble breathing",
                            "can't breathe",
                            "cannot breathe",
                        ],
                    ],
                    red_flag: "Chest pain with shortness of breath",
                }),
                GuardrailRule::Escalate(EscalationRule {
                    name: "stroke_signs",
                    all_of: &[&[
                        "face drooping",
                        "face droop",
                        "slurred speech",
                        "sudden weakness on one side",
                        "numb on one side",
                    ]],
                    red_flag: "Possible stroke signs",
                }),
                GuardrailRule::Escalate(EscalationRule {
                    name: "severe_injury",
                    all_of: &[&[
                        "severe bleeding",
                        "heavy bleeding",
                        "bleeding that won't stop",
                        "bone sticking out",
                        "open fracture",
                        "deep wound",
                    ]],
                    red_flag: "Severe injury reported",
                }),
                GuardrailRule::Escalate(EscalationRule {
                    name: "loss_of_consciousness",
                    all_of: &[&["unconscious", "unresponsive", "fainted and not waking"]],
                    red_flag: "Loss of consciousness",
                }),
                GuardrailRule::Downgrade(DowngradeRule {
                    name: "mild_headache",
                    any_of: &["mild headache", "slight headache", "light headache"],
                    blocked_by: &[
                        "stiff neck",
                        "confusion",
                        "confused",
                        "head injury",
                        "hit my head",
                        "fever",
                        "worst headache",
                        "vision",
                        "weakness",
                        "numbness",
                        "vomiting",
                    ],
                    follow_ups: [
                        "How long has the headache been present?",
                        "Have you noticed triggers such as stress, skipped meals, or lack of sleep?",
                        "Does rest, hydration, or an over-the-counter pain reliever help?",
                    ],
                }),
                GuardrailRule::Downgrade(DowngradeRule {
                    name: "mild_digestive",
                    any_of: &[
                        "mild stomach pain",
                        "mild stomach ache",
                        "mild abdominal pain",
                        "slight stomach pain",
                        "mild indigestion",
                    ],
                    blocked_by: &[
                        "blood",
                        "black stool",
                        "tarry stool",
                        "severe pain",
                        "persistent vomiting",
                        "can't keep anything down",
                        "high fever",
                        "chest pain",
                    ],
                    follow_ups: [
                        "When did the discomfort start, and is it related to meals?",
                        "Have you had nausea, vomiting, or changes in bowel habits?",
                        "Has anything you tried made it better or worse?",
                    ],
                }),
            ],
        }
    }
}

impl GuardrailSet {
    pub fn new(rules: Vec<GuardrailRule>) -> Self {
        Self { rules }
    }

    /// Applies the first matching rule to `triage` and returns its name.
    /// Escalations only raise urgency; downgrades require a recognized
    /// benign pattern with every red-flag phrase absent, so an
    /// LLM-asserted HIGH is never contradicted outside those patterns.
    pub fn apply(&self, message: &str, triage: &mut TriageResult) -> Option<&'static str> {
        let lowered = message.to_lowercase();

        for rule in &self.rules {
            match rule {
                GuardrailRule::Escalate(esc) => {
                    let all_groups_hit = esc
                        .all_of
                        .iter()
                        .all(|group| group.iter().any(|phrase| lowered.contains(phrase)));
                    if all_groups_hit {
                        triage.triage_level = TriageLevel::High;
                        triage.recommended_specialty = EMERGENCY_SPECIALTY.to_string();
                        if !triage.red_flags.iter().any(|f| f == esc.red_flag) {
                            triage.red_flags.push(esc.red_flag.to_string());
                        }
                        return Some(rule.name());
                    }
                }
                GuardrailRule::Downgrade(down) => {
                    let triggered = down.any_of.iter().any(|phrase| lowered.contains(phrase));
                    let blocked = down.blocked_by.iter().any(|phrase| lowered.contains(phrase));
                    if triggered && !blocked {
                        triage.triage_level = TriageLevel::Low;
                        triage.recommended_specialty = GENERAL_PRACTICE.to_string();
                        triage.red_flags.clear();
                        triage.follow_up_questions =
                            down.follow_ups.iter().map(|q| q.to_string()).collect();
                        return Some(rule.name());
                    }
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triage_with(level: TriageLevel, specialty: &str) -> TriageResult {
        TriageResult {
            triage_level: level,
            recommended_specialty: specialty.to_string(),
            ..TriageResult::default()
        }
    }

    #[test]
    fn test_chest_pain_with_dyspnea_forces_emergency() {
        let rules = GuardrailSet::default();
        let message = "I have chest pain and shortness of breath";

        // Whatever pass 1 said, including an undercall.
        for level in [TriageLevel::Low, TriageLevel::Medium, TriageLevel::High] {
            let mut triage = triage_with(level, "Dermatology");
            let fired = rules.apply(message, &mut triage);

            assert_eq!(fired, Some("chest_pain_with_dyspnea"));
            assert_eq!(triage.triage_level, TriageLevel::High);
            assert_eq!(triage.recommended_specialty, EMERGENCY_SPECIALTY);
            assert!(
                triage
                    .red_flags
                    .contains(&"Chest pain with shortness of breath".to_string())
            );
        }
    }

    #[test]
    fn test_mild_headache_downgrades_deterministically() {
        let rules = GuardrailSet::default();
        let message = "I have a mild headache since this morning";

        for level in [TriageLevel::Low, TriageLevel::Medium, TriageLevel::High] {
            let mut triage = triage_with(level, "Neurology");
            triage.red_flags = vec!["something scary".to_string()];

            let fired = rules.apply(message, &mut triage);

            assert_eq!(fired, Some("mild_headache"));
            assert_eq!(triage.triage_level, TriageLevel::Low);
            assert_eq!(triage.recommended_specialty, GENERAL_PRACTICE);
            assert!(triage.red_flags.is_empty());
            assert_eq!(triage.follow_up_questions.len(), 3);
            assert_eq!(
                triage.follow_up_questions[0],
                "How long has the headache been present?"
            );
        }
    }

    #[test]
    fn test_red_flag_phrase_disables_the_downgrade() {
        let rules = GuardrailSet::default();
        let mut triage = triage_with(TriageLevel::Medium, "Neurology");

        let fired = rules.apply("mild headache but also a stiff neck", &mut triage);

        assert_eq!(fired, None);
        assert_eq!(triage.triage_level, TriageLevel::Medium);
        assert_eq!(triage.recommended_specialty, "Neurology");
    }

    #[test]
    fn test_mild_stomach_pain_downgrades() {
        let rules = GuardrailSet::default();
        let mut triage = triage_with(TriageLevel::Medium, "Gastroenterology");

        let fired = rules.apply("mild stomach pain after lunch, no other symptoms", &mut triage);

        assert_eq!(fired, Some("mild_digestive"));
        assert_eq!(triage.triage_level, TriageLevel::Low);
        assert_eq!(triage.recommended_specialty, GENERAL_PRACTICE);
    }

    #[test]
    fn test_blood_in_stool_blocks_digestive_downgrade() {
        let rules = GuardrailSet::default();
        let mut triage = triage_with(TriageLevel::Medium, "Gastroenterology");

        let fired = rules.apply("mild stomach pain but I noticed blood in my stool", &mut triage);

        assert_eq!(fired, None);
        assert_eq!(triage.triage_level, TriageLevel::Medium);
    }

    #[test]
    fn test_escalation_wins_over_downgrade_order() {
        let rules = GuardrailSet::default();
        let mut triage = triage_with(TriageLevel::Low, GENERAL_PRACTICE);

        let fired = rules.apply(
            "mild headache, chest pain and trouble breathing",
            &mut triage,
        );

        assert_eq!(fired, Some("chest_pain_with_dyspnea"));
        assert_eq!(triage.triage_level, TriageLevel::High);
    }

    #[test]
    fn test_no_rule_leaves_triage_untouched() {
        let rules = GuardrailSet::default();
        let mut triage = triage_with(TriageLevel::High, "Cardiology");

        let fired = rules.apply("my knee hurts when I run", &mut triage);

        assert_eq!(fired, None);
        assert_eq!(triage.triage_level, TriageLevel::High);
        assert_eq!(triage.recommended_specialty, "Cardiology");
    }
}
