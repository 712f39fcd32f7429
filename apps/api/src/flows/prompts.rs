// All LLM prompt templates for the flow layer.
// Every template ends with {output_contract}, rendered from the operation's output schema,
// so the shape the model is told to produce is the shape the executor validates.

/// System prompt for ATS resume optimization.
pub const ATS_SYSTEM: &str = "You are an expert resume optimizer, specializing in \
    Applicant Tracking Systems (ATS). \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Replace: {resume_text}, {job_description}, {output_contract}
pub const ATS_PROMPT_TEMPLATE: &str = r#"Given a resume and a job description, analyze the resume for missing keywords, areas for improvement, and overall ATS compatibility.
Provide an optimized resume, a list of specific suggestions, and an estimated ATS score (out of 100).

Resume (JSON):
{resume_text}

Job Description:
{job_description}

Optimize the resume to better match the job description and improve its ATS score.
Follow these instructions:
1. Ensure that all important keywords from the job description are present in the resume.
2. Rephrase bullet points to include keywords naturally and effectively.
3. Provide specific suggestions in the "suggestions" output field. Name every keyword the job description requires that the resume lacks.
4. Calculate the ATS score based on the completeness and relevance of the resume content.
5. Return the full optimized resume in "optimizedResume" with the same fields as the input resume. Do NOT invent employers, dates, or degrees.

{output_contract}"#;

/// System prompt for cover letter optimization.
pub const COVER_LETTER_OPTIMIZE_SYSTEM: &str = "You are an expert cover letter writer, \
    specializing in tailoring applications to job descriptions. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Replace: {cover_letter_text}, {job_description}, {output_contract}
pub const COVER_LETTER_OPTIMIZE_PROMPT_TEMPLATE: &str = r#"Given a cover letter draft and a job description, analyze the draft for missing keywords, areas for improvement, and overall impact.
Provide an optimized cover letter, a list of specific suggestions, and an estimated match score (out of 100).

Cover Letter Draft (JSON):
{cover_letter_text}

Job Description:
{job_description}

Optimize the cover letter to better match the job description and improve its impact.
Follow these instructions:
1. Ensure that all important keywords from the job description are present in the cover letter.
2. Rephrase sentences to be more impactful and align with the company's tone.
3. Provide specific suggestions in the "suggestions" output field.
4. Calculate the match score based on the completeness and relevance of the cover letter content.
5. Return the full optimized cover letter in "optimizedCoverLetter" with the same fields as the draft; the letter body goes in "summary".

{output_contract}"#;

/// System prompt for writing a new cover letter.
pub const COVER_LETTER_GENERATE_SYSTEM: &str = "You are an expert cover letter writer. \
    You write concise, specific letters that connect the applicant to the role. \
    You MUST respond with valid JSON only. \
    Do NOT use markdown code fences.";

/// Replace: {job_description}, {tone}, {tone_guidance}, {your_name}, {company_name},
///          {salutation}, {output_contract}
pub const COVER_LETTER_GENERATE_PROMPT_TEMPLATE: &str = r#"Write a cover letter for {your_name} applying to {company_name}.

Job Description:
{job_description}

Tone: {tone}. {tone_guidance}

Rules:
1. Open with "{salutation}".
2. Three to four paragraphs, under 400 words.
3. Reference the most important requirements of the job description.
4. Close with a sign-off from {your_name}.
5. Put the complete letter text in "coverLetter".

{output_contract}"#;

/// System prompt for LinkedIn profile optimization.
pub const LINKEDIN_SYSTEM: &str = "You are a career advisor specializing in LinkedIn \
    profile optimization. When you give your final answer, respond with valid JSON only, \
    with no text outside the JSON object and no markdown code fences.";

/// Replace: {linkedin_url}, {tool_name}, {reference_skills}, {output_contract}
pub const LINKEDIN_PROMPT_TEMPLATE: &str = r#"The user has provided a LinkedIn profile URL. Your task is to:

1. Use the {tool_name} tool to get the skills listed in the profile. Do NOT guess the profile's skills.
2. Compare the listed skills to this reference list of in-demand skills for software engineering roles:
{reference_skills}
3. Return the skills from the reference list that are missing from the profile and would make it more discoverable to recruiters, in reference-list order, without duplicates.

LinkedIn URL: {linkedin_url}

{output_contract}"#;

/// System prompt for resume parsing.
pub const RESUME_PARSE_SYSTEM: &str = "You are an expert resume parser. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Replace: {no_invention}, {output_contract}
pub const RESUME_PARSE_PROMPT_TEMPLATE: &str = r#"Analyze the attached resume file and extract the user's information into a structured JSON format.

Parse all sections including personal details, summary, work experience, education, projects, certificates, and skills. Be as accurate as possible. For skills, provide a single comma-separated string.

{no_invention}

{output_contract}"#;
