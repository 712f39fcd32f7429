//! Named schemas for every operation's input and output, and for the scraper tool.
//!
//! Descriptions are injected into prompts; keep them phrased as guidance to the model.

use crate::schema::{Field, FieldType, Schema, SchemaDefect};

pub const TONES: &[&str] = &["professional", "enthusiastic", "formal", "conversational"];

const SCORE: FieldType = FieldType::Number { min: 0.0, max: 100.0 };
const STRINGS: FieldType = FieldType::Array(&FieldType::String);

const fn required(name: &'static str, ty: FieldType, description: &'static str) -> Field {
    Field { name, ty, description, optional: false }
}

const fn optional(name: &'static str, ty: FieldType, description: &'static str) -> Field {
    Field { name, ty, description, optional: true }
}

// ────────────────────────────────────────────────────────────────────────────
// Document records
// ────────────────────────────────────────────────────────────────────────────

pub const EXPERIENCE: Schema = Schema {
    name: "Experience",
    description: "One position held by the candidate.",
    fields: &[
        required("title", FieldType::String, "The job title."),
        required("company", FieldType::String, "The company name."),
        required("dates", FieldType::String, "The dates of employment."),
        required("description", FieldType::String, "The job description and accomplishments."),
    ],
};

pub const EDUCATION: Schema = Schema {
    name: "Education",
    description: "One degree or course of study.",
    fields: &[
        required("degree", FieldType::String, "The degree obtained."),
        required("school", FieldType::String, "The name of the school or university."),
        required("dates", FieldType::String, "The dates of attendance."),
    ],
};

pub const PROJECT: Schema = Schema {
    name: "Project",
    description: "A project the candidate built or contributed to.",
    fields: &[
        required("name", FieldType::String, "The name of the project."),
        required("description", FieldType::String, "A description of the project."),
        optional("url", FieldType::String, "A URL to the project if available."),
    ],
};

pub const CERTIFICATE: Schema = Schema {
    name: "Certificate",
    description: "A professional certificate.",
    fields: &[
        required("name", FieldType::String, "The name of the certificate."),
        required("issuer", FieldType::String, "The issuing organization."),
        required("date", FieldType::String, "The date the certificate was awarded."),
    ],
};

/// A full resume. Every top-level field is optional so that anything the model could not
/// locate comes back as an empty string or empty list.
pub const RESUME_DRAFT: Schema = Schema {
    name: "Resume",
    description: "A structured resume.",
    fields: &[
        optional("fullName", FieldType::String, "The user's full name."),
        optional("email", FieldType::String, "The user's email address."),
        optional("phone", FieldType::String, "The user's phone number."),
        optional("linkedin", FieldType::String, "A URL to the user's LinkedIn profile."),
        optional("website", FieldType::String, "A URL to the user's personal website or portfolio."),
        optional("summary", FieldType::String, "A professional summary about the user."),
        optional("experience", FieldType::Array(&FieldType::Record(&EXPERIENCE)), "A list of the user's work experiences."),
        optional("education", FieldType::Array(&FieldType::Record(&EDUCATION)), "A list of the user's educational background."),
        optional("projects", FieldType::Array(&FieldType::Record(&PROJECT)), "A list of the user's projects."),
        optional("certificates", FieldType::Array(&FieldType::Record(&CERTIFICATE)), "A list of the user's certificates."),
        optional("skills", FieldType::String, "A comma-separated list of the user's skills."),
    ],
};

pub const ROLE: Schema = Schema {
    name: "Role",
    description: "A position referenced in a cover letter.",
    fields: &[
        required("title", FieldType::String, "The job title."),
        required("company", FieldType::String, "The company name."),
    ],
};

pub const COVER_LETTER_DRAFT: Schema = Schema {
    name: "CoverLetter",
    description: "A structured cover letter.",
    fields: &[
        optional("fullName", FieldType::String, "The applicant's full name."),
        optional("email", FieldType::String, "The applicant's email address."),
        optional("phone", FieldType::String, "The applicant's phone number."),
        optional("linkedin", FieldType::String, "A URL to the applicant's LinkedIn profile."),
        required("summary", FieldType::String, "The full body of the cover letter."),
        optional("experience", FieldType::Array(&FieldType::Record(&ROLE)), "Positions the letter refers to."),
    ],
};

// ────────────────────────────────────────────────────────────────────────────
// Operation inputs and outputs
// ────────────────────────────────────────────────────────────────────────────

pub const ATS_INPUT: Schema = Schema {
    name: "AtsResumeOptimizationInput",
    description: "A resume and the job description to optimize it against.",
    fields: &[
        required("resumeText", FieldType::String, "The text content of the resume to be optimized."),
        required("jobDescription", FieldType::String, "The job description to match the resume against."),
    ],
};

pub const ATS_OUTPUT: Schema = Schema {
    name: "AtsResumeOptimizationOutput",
    description: "The optimized resume with suggestions and an ATS score.",
    fields: &[
        required("optimizedResume", FieldType::Record(&RESUME_DRAFT), "The optimized resume as a JSON object with the same fields as the input resume."),
        required("suggestions", STRINGS, "List of specific suggestions made by the AI."),
        required("atsScore", SCORE, "An estimated ATS score for the optimized resume, 0 to 100."),
    ],
};

pub const COVER_LETTER_OPTIMIZE_INPUT: Schema = Schema {
    name: "CoverLetterOptimizationInput",
    description: "A cover letter draft and the job description to tailor it to.",
    fields: &[
        required("coverLetterText", FieldType::String, "The text content of the cover letter to be optimized."),
        required("jobDescription", FieldType::String, "The job description to match the cover letter against."),
    ],
};

pub const COVER_LETTER_OPTIMIZE_OUTPUT: Schema = Schema {
    name: "CoverLetterOptimizationOutput",
    description: "The optimized cover letter with suggestions and a match score.",
    fields: &[
        required("optimizedCoverLetter", FieldType::Record(&COVER_LETTER_DRAFT), "The full optimized cover letter as a JSON object with the same fields as the draft."),
        required("suggestions", STRINGS, "List of specific suggestions made by the AI."),
        required("matchScore", SCORE, "An estimated match score for the optimized cover letter, 0 to 100."),
    ],
};

pub const COVER_LETTER_GENERATE_INPUT: Schema = Schema {
    name: "CoverLetterGenerationInput",
    description: "The facts needed to write a new cover letter.",
    fields: &[
        required("jobDescription", FieldType::String, "The job description the letter responds to."),
        required("tone", FieldType::Enum(TONES), "The tone of voice for the letter."),
        required("yourName", FieldType::String, "The applicant's name, used in the sign-off."),
        required("companyName", FieldType::String, "The company being applied to."),
        optional("hiringManager", FieldType::String, "The hiring manager's name, if known."),
    ],
};

pub const COVER_LETTER_GENERATE_OUTPUT: Schema = Schema {
    name: "CoverLetterGenerationOutput",
    description: "A newly written cover letter.",
    fields: &[required("coverLetter", FieldType::String, "The complete cover letter text, ready to send.")],
};

pub const LINKEDIN_INPUT: Schema = Schema {
    name: "LinkedInProfileOptimizationInput",
    description: "A public LinkedIn profile to analyze.",
    fields: &[required("linkedinUrl", FieldType::String, "The URL of the LinkedIn profile to optimize.")],
};

pub const LINKEDIN_OUTPUT: Schema = Schema {
    name: "LinkedInProfileOptimizationOutput",
    description: "Skills the profile should add.",
    fields: &[required("missingSkills", STRINGS, "A list of skills that are missing from the LinkedIn profile.")],
};

pub const RESUME_PARSE_INPUT: Schema = Schema {
    name: "ParseResumeInput",
    description: "An uploaded resume file.",
    fields: &[required(
        "resumeDataUri",
        FieldType::String,
        "A resume file, as a data URI that must include a MIME type and use Base64 encoding. Expected format: 'data:<mimetype>;base64,<encoded_data>'.",
    )],
};

pub const RESUME_PARSE_OUTPUT: Schema = RESUME_DRAFT;

// ────────────────────────────────────────────────────────────────────────────
// Tools
// ────────────────────────────────────────────────────────────────────────────

pub const SCRAPER_INPUT: Schema = Schema {
    name: "LinkedInScraperInput",
    description: "The profile to scrape.",
    fields: &[required("profileUrl", FieldType::String, "The URL of the LinkedIn profile to scrape.")],
};

pub const SCRAPER_OUTPUT: Schema = Schema {
    name: "LinkedInScraperOutput",
    description: "Data scraped from a profile.",
    fields: &[required("skills", STRINGS, "A list of skills currently listed on the LinkedIn profile.")],
};

pub const ALL: &[&Schema] = &[
    &RESUME_DRAFT,
    &COVER_LETTER_DRAFT,
    &ATS_INPUT,
    &ATS_OUTPUT,
    &COVER_LETTER_OPTIMIZE_INPUT,
    &COVER_LETTER_OPTIMIZE_OUTPUT,
    &COVER_LETTER_GENERATE_INPUT,
    &COVER_LETTER_GENERATE_OUTPUT,
    &LINKEDIN_INPUT,
    &LINKEDIN_OUTPUT,
    &RESUME_PARSE_INPUT,
    &SCRAPER_INPUT,
    &SCRAPER_OUTPUT,
];

/// Startup check over every registered schema.
pub fn verify_all() -> Result<(), SchemaDefect> {
    ALL.iter().try_for_each(|schema| schema.verify())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::document::{Draft, DocumentDraft};

    #[test]
    fn test_registry_verifies() {
        verify_all().unwrap();
    }

    #[test]
    fn test_parse_output_fills_absent_fields() {
        let v = RESUME_PARSE_OUTPUT
            .validate_and_coerce(json!({
                "fullName": "Ada Lovelace",
                "email": "ada@example.com",
                "experience": [{
                    "title": "Analyst", "company": "Babbage & Co",
                    "dates": "1842", "description": "Notes on the engine"
                }]
            }))
            .unwrap();
        assert_eq!(v["linkedin"], json!(""));
        assert_eq!(v["website"], json!(""));
        assert_eq!(v["projects"], json!([]));
        assert_eq!(v["certificates"], json!([]));
        assert_eq!(v["skills"], json!(""));
    }

    #[test]
    fn test_draft_text_validates_against_resume_schema() {
        let draft = crate::document::tests::sample_draft();
        let value: serde_json::Value = serde_json::from_str(&draft.to_text()).unwrap();
        let coerced = RESUME_DRAFT.validate_and_coerce(value).unwrap();
        let back: DocumentDraft = serde_json::from_value(coerced).unwrap();
        assert_eq!(back, draft);
    }

    #[test]
    fn test_tone_is_declared_as_enum() {
        let field = COVER_LETTER_GENERATE_INPUT
            .fields
            .iter()
            .find(|f| f.name == "tone")
            .unwrap();
        assert!(matches!(field.ty, FieldType::Enum(variants) if variants == TONES));
    }

    #[test]
    fn test_scraper_input_json_schema() {
        let s = SCRAPER_INPUT.json_schema();
        assert_eq!(s["required"], json!(["profileUrl"]));
        assert_eq!(s["properties"]["profileUrl"]["type"], "string");
    }
}
