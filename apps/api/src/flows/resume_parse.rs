use serde::{Deserialize, Serialize};

use crate::document::data_uri::DataUri;
use crate::document::DocumentDraft;
use crate::flows::prompts::{RESUME_PARSE_PROMPT_TEMPLATE, RESUME_PARSE_SYSTEM};
use crate::flows::{Flow, FlowContext, FlowError, Operation};
use crate::llm_client::prompts::{output_contract, render, NO_INVENTION_INSTRUCTION};
use crate::llm_client::{Attachment, CompletionRequest};
use crate::schema::registry::RESUME_PARSE_OUTPUT;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResumeRequest {
    /// `data:<mime>;base64,<payload>`; only PDF and plain text are accepted.
    #[serde(alias = "fileDataUri")]
    pub resume_data_uri: String,
}

pub type ParsedDocument = DocumentDraft;

pub struct ResumeParseFlow;

fn attachment_for(upload: DataUri) -> Attachment {
    if upload.is_pdf() {
        Attachment::Pdf {
            base64: upload.payload,
        }
    } else {
        Attachment::PlainText {
            text: upload.text(),
        }
    }
}

impl Flow for ResumeParseFlow {
    const OPERATION: Operation = Operation::ResumeParsing;
    type Input = ParseResumeRequest;
    type Output = ParsedDocument;

    fn check_input(&self, input: &Self::Input, _ctx: &FlowContext) -> Result<(), FlowError> {
        DataUri::parse(&input.resume_data_uri)?;
        Ok(())
    }

    fn build_request(&self, input: &Self::Input) -> Result<CompletionRequest, FlowError> {
        let upload = DataUri::parse(&input.resume_data_uri)?;
        let contract = output_contract(&RESUME_PARSE_OUTPUT);
        let prompt = render(
            RESUME_PARSE_PROMPT_TEMPLATE,
            &[
                ("no_invention", NO_INVENTION_INSTRUCTION),
                ("output_contract", contract.as_str()),
            ],
        );
        Ok(CompletionRequest {
            system: RESUME_PARSE_SYSTEM.to_string(),
            prompt,
            attachment: Some(attachment_for(upload)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::document::data_uri::{MIME_PDF, MIME_TEXT};
    use crate::flows::testing::{executor, Reply, ScriptedLlm};

    fn parsed_answer() -> String {
        json!({
            "fullName": "Jane Doe",
            "email": "jane@example.com",
            "summary": "Backend engineer.",
            "experience": [{
                "title": "Engineer",
                "company": "Acme",
                "dates": "2020 - 2024",
                "description": "Built APIs."
            }],
            "skills": "Rust, Go"
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_png_upload_is_rejected_without_model_call() {
        let llm = ScriptedLlm::new(vec![]);
        let err = executor(&llm)
            .parse_resume(ParseResumeRequest {
                resume_data_uri: DataUri::encode("image/png", b"\x89PNG"),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, FlowError::Validation(ref m) if m.contains("image/png")));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_pdf_is_attached_as_document_and_absent_fields_are_empty() {
        let llm = ScriptedLlm::new(vec![Reply::Text(parsed_answer())]);
        let uri = DataUri::encode(MIME_PDF, b"%PDF-1.4 fake");

        let draft = executor(&llm)
            .parse_resume(ParseResumeRequest {
                resume_data_uri: uri.clone(),
            })
            .await
            .unwrap();

        assert_eq!(draft.full_name, "Jane Doe");
        assert_eq!(draft.linkedin, "");
        assert!(draft.projects.is_empty());
        assert_eq!(draft.experience[0].company, "Acme");

        let request = &llm.requests()[0];
        let payload = uri.split_once(',').unwrap().1.to_string();
        assert_eq!(request.attachment, Some(Attachment::Pdf { base64: payload }));
        assert!(request.prompt.contains("Do NOT invent"));
    }

    #[tokio::test]
    async fn test_text_upload_is_decoded() {
        let llm = ScriptedLlm::new(vec![Reply::Text(parsed_answer())]);
        executor(&llm)
            .parse_resume(ParseResumeRequest {
                resume_data_uri: DataUri::encode(MIME_TEXT, b"Jane Doe\nBackend engineer"),
            })
            .await
            .unwrap();

        assert_eq!(
            llm.requests()[0].attachment,
            Some(Attachment::PlainText {
                text: "Jane Doe\nBackend engineer".into()
            })
        );
    }

    #[tokio::test]
    async fn test_experience_entry_missing_company_is_schema_mismatch() {
        let llm = ScriptedLlm::new(vec![Reply::Text(
            json!({"experience": [{"title": "Engineer", "dates": "2020", "description": "x"}]})
                .to_string(),
        )]);
        let err = executor(&llm)
            .parse_resume(ParseResumeRequest {
                resume_data_uri: DataUri::encode(MIME_TEXT, b"resume"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::SchemaMismatch(ref m) if m.contains("experience[0].company")));
    }

    #[test]
    fn test_request_accepts_file_data_uri_alias() {
        let req: ParseResumeRequest =
            serde_json::from_value(json!({"fileDataUri": "data:text/plain;base64,eA=="})).unwrap();
        assert_eq!(req.resume_data_uri, "data:text/plain;base64,eA==");
    }
}
