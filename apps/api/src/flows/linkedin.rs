//! LinkedIn skill-gap flow. The model must consult the profile scraper tool; the final list
//! is reconciled against the skills the tool actually reported.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::document::validation::is_http_url;
use crate::flows::prompts::{LINKEDIN_PROMPT_TEMPLATE, LINKEDIN_SYSTEM};
use crate::flows::{Flow, FlowContext, FlowError, Operation};
use crate::llm_client::prompts::{output_contract, render};
use crate::llm_client::CompletionRequest;
use crate::schema::registry::LINKEDIN_OUTPUT;
use crate::tools::linkedin_scraper::{LinkedInScraperTool, TOOL_NAME};
use crate::tools::ToolRegistry;

/// Reference list of in-demand software engineering skills, in the order gaps are reported.
pub const IN_DEMAND_SKILLS: &[&str] = &[
    "TypeScript",
    "JavaScript",
    "React",
    "Node.js",
    "Python",
    "Java",
    "Go",
    "SQL",
    "PostgreSQL",
    "GraphQL",
    "Docker",
    "Kubernetes",
    "AWS",
    "CI/CD",
    "Terraform",
    "Microservices",
    "System Design",
    "Git",
    "Agile",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedInOptimizationRequest {
    pub linkedin_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillGapResult {
    pub missing_skills: Vec<String>,
}

fn normalize(skill: &str) -> String {
    skill.trim().to_lowercase()
}

/// Entries of `reference` absent from `current`, compared case-insensitively.
/// Keeps reference order and drops duplicates.
pub fn skill_gap(reference: &[&str], current: &[String]) -> Vec<String> {
    let present: HashSet<String> = current.iter().map(|s| normalize(s)).collect();
    let mut seen = HashSet::new();
    reference
        .iter()
        .filter(|s| !present.contains(&normalize(s)))
        .filter(|s| seen.insert(normalize(s)))
        .map(|s| s.to_string())
        .collect()
}

fn same_profile(a: &str, b: &str) -> bool {
    a.trim().trim_end_matches('/') == b.trim().trim_end_matches('/')
}

/// Skills reported by the scraper calls made for `profile_url` during the run.
/// `None` when the requested profile was never scraped.
fn scraped_skills(tools: &ToolRegistry, profile_url: &str) -> Option<Vec<String>> {
    let calls: Vec<_> = tools
        .calls()
        .into_iter()
        .filter(|c| c.tool == TOOL_NAME)
        .filter(|c| {
            c.input
                .get("profileUrl")
                .and_then(Value::as_str)
                .is_some_and(|url| same_profile(url, profile_url))
        })
        .collect();
    if calls.is_empty() {
        return None;
    }
    Some(
        calls
            .iter()
            .filter_map(|c| c.output.get("skills").and_then(Value::as_array))
            .flatten()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

pub struct LinkedInFlow;

impl Flow for LinkedInFlow {
    const OPERATION: Operation = Operation::LinkedInProfileOptimization;
    type Input = LinkedInOptimizationRequest;
    type Output = SkillGapResult;

    fn check_input(&self, input: &Self::Input, _ctx: &FlowContext) -> Result<(), FlowError> {
        if !is_http_url(&input.linkedin_url) {
            return Err(FlowError::Validation(
                "Please enter a valid LinkedIn profile URL.".to_string(),
            ));
        }
        Ok(())
    }

    fn tools(&self, ctx: &FlowContext) -> ToolRegistry {
        ToolRegistry::new(vec![Arc::new(LinkedInScraperTool::new(Arc::clone(
            &ctx.scraper,
        )))])
    }

    fn build_request(&self, input: &Self::Input) -> Result<CompletionRequest, FlowError> {
        let contract = output_contract(&LINKEDIN_OUTPUT);
        let reference = IN_DEMAND_SKILLS.join(", ");
        let prompt = render(
            LINKEDIN_PROMPT_TEMPLATE,
            &[
                ("tool_name", TOOL_NAME),
                ("reference_skills", reference.as_str()),
                ("linkedin_url", input.linkedin_url.trim()),
                ("output_contract", contract.as_str()),
            ],
        );
        Ok(CompletionRequest {
            system: LINKEDIN_SYSTEM.to_string(),
            prompt,
            attachment: None,
        })
    }

    fn finish(
        &self,
        input: &Self::Input,
        output: Self::Output,
        tools: &ToolRegistry,
    ) -> Result<Self::Output, FlowError> {
        let current = scraped_skills(tools, &input.linkedin_url).ok_or_else(|| {
            FlowError::SchemaMismatch(format!(
                "model answered without calling {TOOL_NAME} for {}",
                input.linkedin_url.trim()
            ))
        })?;

        let missing_skills = skill_gap(IN_DEMAND_SKILLS, &current);

        let expected: HashSet<String> = missing_skills.iter().map(|s| normalize(s)).collect();
        let answered: HashSet<String> = output.missing_skills.iter().map(|s| normalize(s)).collect();
        if expected != answered {
            warn!(
                model = ?output.missing_skills,
                reconciled = ?missing_skills,
                "Model skill gap differed from scraped profile; using reconciled list"
            );
        }
        info!("{} missing skill(s) for profile", missing_skills.len());

        Ok(SkillGapResult { missing_skills })
    }
}
