// Shared prompt constants and prompt-building utilities.
// Each operation's own templates live in flows/prompts.rs.
// This file contains cross-cutting prompt fragments.

/// Appended to every prompt that expects structured output.
/// Replace: {field_guide}, {example_json}
pub const OUTPUT_CONTRACT: &str = r#"OUTPUT FIELDS:
{field_guide}

Output format: JSON
{example_json}

Nested objects must be returned as JSON objects, never as strings containing JSON."#;

/// Instruction used wherever the model is asked to extract rather than invent.
pub const NO_INVENTION_INSTRUCTION: &str = "\
    Use ONLY information present in the input. Do NOT invent employers, dates, degrees, \
    or metrics. If a section is not present, return an empty array or an empty string for \
    that field; never omit the field.";

/// Single-pass placeholder substitution. `{name}` is replaced when `name` is in `vars`;
/// anything else, including braces inside substituted values, is emitted unchanged.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replaced = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });
        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Renders `OUTPUT_CONTRACT` for an output schema.
pub fn output_contract(schema: &crate::schema::Schema) -> String {
    let field_guide = schema.field_guide();
    let example_json = schema.example_json();
    render(
        OUTPUT_CONTRACT,
        &[
            ("field_guide", field_guide.as_str()),
            ("example_json", example_json.as_str()),
        ],
    )
}
