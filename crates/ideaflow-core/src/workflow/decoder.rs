//! Display-side view of a serialized workflow log.
//!
//! Consumers only render what agents produced, so these helpers keep the
//! `response` steps and drop everything else. A log that stops on a dangling
//! `received` entry decodes fine; that agent simply has no response step.

use super::codec::{decode, decode_lines, DecodedStep, Direction};

/// Response steps of a serialized log, in log order.
pub fn response_steps(serialized: &str) -> Vec<DecodedStep> {
    only_responses(decode(serialized))
}

/// Response steps of a log in wire form (one encoded entry per element).
pub fn response_steps_from_lines<S: AsRef<str>>(lines: &[S]) -> Vec<DecodedStep> {
    only_responses(decode_lines(lines))
}

fn only_responses(steps: Vec<DecodedStep>) -> Vec<DecodedStep> {
    steps
        .into_iter()
        .filter(|step| step.step_type == Direction::Response)
        .collect()
}

/// Responses grouped per agent, agents in order of first appearance.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPanel {
    pub agent_name: String,
    pub responses: Vec<String>,
}

pub fn responses_by_agent(steps: &[DecodedStep]) -> Vec<AgentPanel> {
    let mut panels: Vec<AgentPanel> = Vec::new();
    for step in steps.iter().filter(|s| s.step_type == Direction::Response) {
        match panels.iter_mut().find(|p| p.agent_name == step.agent_name) {
            Some(panel) => panel.responses.push(step.content.clone()),
            None => panels.push(AgentPanel {
                agent_name: step.agent_name.clone(),
                responses: vec![step.content.clone()],
            }),
        }
    }
    panels
}

/// Map a logged agent name onto one of the display roles.
///
/// Tries an exact match, then a case-insensitive one, then the name with a
/// trailing `Agent` suffix removed (`"DesignAgent"` routes to `"Design"`).
pub fn match_role<'a>(agent_name: &str, roles: &[&'a str]) -> Option<&'a str> {
    if let Some(role) = roles.iter().find(|r| **r == agent_name) {
        return Some(*role);
    }
    if let Some(role) = roles.iter().find(|r| r.eq_ignore_ascii_case(agent_name)) {
        return Some(*role);
    }
    let stem = agent_name
        .strip_suffix("Agent")
        .or_else(|| agent_name.strip_suffix("agent"))
        .map(str::trim_end)?;
    roles.iter().find(|r| r.eq_ignore_ascii_case(stem)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DANGLING: &str = "[Design] received: idea\n\
        [Design] response: concepts\n\
        [Marketing] received: concepts\n\
        [Marketing] response: brand\n\
        [Sales] received: brand";

    #[test]
    fn test_response_steps_skip_dangling_received() {
        let steps = response_steps(DANGLING);
        let agents: Vec<_> = steps.iter().map(|s| s.agent_name.as_str()).collect();
        assert_eq!(agents, vec!["Design", "Marketing"]);
        assert_eq!(steps[1].content, "brand");
    }

    #[test]
    fn test_response_steps_from_lines() {
        let lines = ["[Sales] received: x", "[Sales] response: pricing\ntiers"];
        let steps = response_steps_from_lines(&lines);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].content, "pricing\ntiers");
    }

    #[test]
    fn test_responses_by_agent_keeps_first_appearance_order() {
        let steps = decode(
            "[Sales] response: one\n[Design] response: two\n[Sales] response: three",
        );
        let panels = responses_by_agent(&steps);
        assert_eq!(panels.len(), 2);
        assert_eq!(panels[0].agent_name, "Sales");
        assert_eq!(panels[0].responses, vec!["one", "three"]);
        assert_eq!(panels[1].agent_name, "Design");
    }

    #[test]
    fn test_match_role() {
        let roles = ["Design", "Marketing", "Sales", "Support"];
        assert_eq!(match_role("Sales", &roles), Some("Sales"));
        assert_eq!(match_role("support", &roles), Some("Support"));
        assert_eq!(match_role("DesignAgent", &roles), Some("Design"));
        assert_eq!(match_role("Marketing Agent", &roles), Some("Marketing"));
        assert_eq!(match_role("Legal", &roles), None);
    }
}
