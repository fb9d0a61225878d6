// ABOUTME: Parser turning free-form model output into structured report content
// ABOUTME: JSON object first, labeled sections as fallback, tagged parse outcome
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Generation Output Parser
//!
//! Model output is untrusted text. Parsing:
//!
//! 1. strips a surrounding code fence
//! 2. takes the outermost `{ ... }` and reads it as a JSON object
//! 3. otherwise reads markdown headings or `Label:` lines as sections
//!
//! Keys and labels match loosely (`emailBody`, `email_body`, `Email Body`).
//! Every field must be present and non-empty; nothing is defaulted. A section
//! label that appears twice makes the output malformed.

use std::collections::HashMap;

use outreach_core::errors::OutreachError;
use outreach_core::models::ReportContent;
use serde_json::{Map, Value};

/// Outcome of parsing one model response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationParse {
    /// Every field was present and non-empty
    Parsed(ReportContent),
    /// The output could not be read as a report
    Malformed {
        /// Verbatim model output
        raw: String,
        /// What failed
        reason: String,
    },
}

impl GenerationParse {
    /// Convert into a result, mapping `Malformed` to `MalformedGenerationOutput`
    ///
    /// # Errors
    ///
    /// Returns `MalformedGenerationOutput` carrying the raw text
    pub fn into_result(self) -> Result<ReportContent, OutreachError> {
        match self {
            Self::Parsed(content) => Ok(content),
            Self::Malformed { raw, reason } => {
                Err(OutreachError::MalformedGenerationOutput { reason, raw })
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Field {
    Insights,
    SubjectLines,
    EmailBody,
    FollowUpSubjectLines,
    FollowUpBody,
    LinkedinConnectionNote,
    LinkedinFollowUp,
    CallScript,
}

impl Field {
    const ALL: [Self; 8] = [
        Self::Insights,
        Self::SubjectLines,
        Self::EmailBody,
        Self::FollowUpSubjectLines,
        Self::FollowUpBody,
        Self::LinkedinConnectionNote,
        Self::LinkedinFollowUp,
        Self::CallScript,
    ];

    const fn key(self) -> &'static str {
        match self {
            Self::Insights => "insights",
            Self::SubjectLines => "subjectLines",
            Self::EmailBody => "emailBody",
            Self::FollowUpSubjectLines => "followUpSubjectLines",
            Self::FollowUpBody => "followUpBody",
            Self::LinkedinConnectionNote => "linkedinConnectionNote",
            Self::LinkedinFollowUp => "linkedinFollowUp",
            Self::CallScript => "callScript",
        }
    }

    const fn is_list(self) -> bool {
        matches!(
            self,
            Self::Insights | Self::SubjectLines | Self::FollowUpSubjectLines
        )
    }

    /// Match a key or label after [`normalize_label`]
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "insights" | "keyinsights" | "researchinsights" => Some(Self::Insights),
            "subjectlines" | "emailsubjectlines" | "subjectlinevariants" => {
                Some(Self::SubjectLines)
            }
            "emailbody" | "email" | "initialemail" | "firstemail" => Some(Self::EmailBody),
            "followupsubjectlines" | "followupsubjects" | "followupemailsubjectlines" => {
                Some(Self::FollowUpSubjectLines)
            }
            "followupbody" | "followupemail" | "followupemailbody" => Some(Self::FollowUpBody),
            "linkedinconnectionnote" | "linkedinnote" | "linkedinconnectionrequest" => {
                Some(Self::LinkedinConnectionNote)
            }
            "linkedinfollowup" | "linkedinfollowupmessage" | "linkedinmessage" => {
                Some(Self::LinkedinFollowUp)
            }
            "callscript" | "coldcallscript" | "phonescript" => Some(Self::CallScript),
            _ => None,
        }
    }

    /// Labels too generic to open a section from an inline `Label: text` line
    ///
    /// `Email: dana@acme.org` in a signature must stay body text.
    fn is_inline_label(label: &str) -> bool {
        !matches!(label, "email" | "linkedinmessage")
    }
}

enum FieldValue {
    Text(String),
    List(Vec<String>),
}

type Fields = HashMap<Field, FieldValue>;

/// Parse a model response into report content
#[must_use]
pub fn parse_generation(raw: &str) -> GenerationParse {
    let malformed = |reason: String| GenerationParse::Malformed {
        raw: raw.to_owned(),
        reason,
    };

    let body = strip_code_fences(raw);
    if body.is_empty() {
        return malformed("model returned no text".to_owned());
    }

    let fields = match extract_json_object(body) {
        Some(Ok(object)) => fields_from_json(&object),
        Some(Err(json_error)) => fields_from_sections(body)
            .map_err(|_| format!("response is not valid JSON: {json_error}")),
        None => fields_from_sections(body),
    };

    match fields.and_then(into_content) {
        Ok(content) => GenerationParse::Parsed(content),
        Err(reason) => malformed(reason),
    }
}

/// Remove a surrounding ```` ``` ```` fence and its info string
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some((_, body)) = rest.split_once('\n') else {
        return strip_inline_fence(rest);
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Body of a fence opened and closed on one line, e.g. ```` ```json{...}``` ````
fn strip_inline_fence(rest: &str) -> &str {
    let body = rest.trim_end();
    let body = body.strip_suffix("```").unwrap_or(body);
    match body.find(['{', '[']) {
        Some(start) if body[..start].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
            body[start..].trim()
        }
        _ => body.trim(),
    }
}

/// Outermost `{ ... }` span; `None` when the text has no braces
fn extract_json_object(text: &str) -> Option<Result<Map<String, Value>, String>> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }

    Some(match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err("expected a JSON object".to_owned()),
        Err(e) => Err(e.to_string()),
    })
}

/// Lowercase alphanumerics only
fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn fields_from_json(object: &Map<String, Value>) -> Result<Fields, String> {
    let recognized = object
        .keys()
        .any(|key| Field::from_label(&normalize_label(key)).is_some());

    // Some models wrap the report in a single named object
    if !recognized {
        if let Some(Value::Object(inner)) = object.values().find(|v| v.is_object()) {
            return fields_from_json(inner);
        }
    }

    let mut fields = Fields::new();
    for (key, value) in object {
        let Some(field) = Field::from_label(&normalize_label(key)) else {
            continue;
        };
        fields.insert(field, json_field_value(field, value)?);
    }
    Ok(fields)
}

fn json_field_value(field: Field, value: &Value) -> Result<FieldValue, String> {
    match (field.is_list(), value) {
        (true, Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(|s| strip_list_marker(s).to_owned())
                    .ok_or_else(|| format!("field `{}` must contain only strings", field.key()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(FieldValue::List),
        (true, Value::String(text)) => Ok(FieldValue::List(split_list(text))),
        (false, Value::String(text)) => Ok(FieldValue::Text(text.clone())),
        (true, _) => Err(format!("field `{}` must be a list of strings", field.key())),
        (false, _) => Err(format!("field `{}` must be a string", field.key())),
    }
}

/// Read `## Heading`, `**Label**`, or `Label: text` sections
fn fields_from_sections(text: &str) -> Result<Fields, String> {
    let mut sections: Vec<(Field, Vec<&str>)> = Vec::new();

    for line in text.lines() {
        let open = sections.last().map(|(field, _)| *field);
        match section_label(line) {
            // A repeated label inside its own section is content
            Some((field, _)) if Some(field) == open => {
                if let Some((_, lines)) = sections.last_mut() {
                    lines.push(line);
                }
            }
            Some((field, _)) if sections.iter().any(|(seen, _)| *seen == field) => {
                return Err(format!("section `{}` appears more than once", field.key()));
            }
            Some((field, rest)) => {
                let mut lines = Vec::new();
                if !rest.is_empty() {
                    lines.push(rest);
                }
                sections.push((field, lines));
            }
            None => {
                if let Some((_, lines)) = sections.last_mut() {
                    lines.push(line);
                }
            }
        }
    }

    if sections.is_empty() {
        return Err("response contains neither a JSON object nor labeled sections".to_owned());
    }

    let mut fields = Fields::new();
    for (field, lines) in sections {
        let joined = lines.join("\n");
        let value = if field.is_list() {
            FieldValue::List(split_list(&joined))
        } else {
            FieldValue::Text(joined.trim().to_owned())
        };
        fields.insert(field, value);
    }
    Ok(fields)
}

/// Recognize a section heading line, returning its field and same-line text
fn section_label(line: &str) -> Option<(Field, &str)> {
    let trimmed = line.trim();
    let decoration = |c: char| c == '*' || c == '_' || c == '#' || c.is_whitespace();

    let (label, rest, inline) = if trimmed.starts_with('#') {
        let heading = trimmed.trim_start_matches('#');
        let (label, rest) = heading.split_once(':').unwrap_or((heading, ""));
        (label, rest, false)
    } else if let Some((label, rest)) = trimmed.split_once(':') {
        let emphasized = label.trim_start().starts_with("**");
        (label, rest, !emphasized)
    } else if trimmed.starts_with("**") && trimmed.ends_with("**") && trimmed.len() > 4 {
        (trimmed, "", false)
    } else {
        return None;
    };

    let label = label.trim_matches(decoration);
    if label.is_empty() || label.len() > 40 {
        return None;
    }
    let normalized = normalize_label(label);
    if inline && !Field::is_inline_label(&normalized) {
        return None;
    }
    let field = Field::from_label(&normalized)?;
    Some((field, rest.trim_matches(decoration)))
}

/// Split a block of text into list entries, dropping bullets and numbering
fn split_list(text: &str) -> Vec<String> {
    text.lines()
        .map(strip_list_marker)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let line = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("• "))
        .unwrap_or(line);

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        if let Some(rest) = line[digits..]
            .strip_prefix(". ")
            .or_else(|| line[digits..].strip_prefix(") "))
        {
            return rest.trim();
        }
    }
    line.trim()
}

fn into_content(mut fields: Fields) -> Result<ReportContent, String> {
    if let Some(missing) = Field::ALL.iter().find(|f| !fields.contains_key(*f)) {
        return Err(format!("missing field `{}`", missing.key()));
    }

    let mut take_list = |field: Field| -> Result<Vec<String>, String> {
        match fields.remove(&field) {
            Some(FieldValue::List(items)) => {
                let items: Vec<String> = items
                    .into_iter()
                    .map(|item| item.trim().to_owned())
                    .filter(|item| !item.is_empty())
                    .collect();
                if items.is_empty() {
                    Err(format!("field `{}` is empty", field.key()))
                } else {
                    Ok(items)
                }
            }
            _ => Err(format!("field `{}` must be a list of strings", field.key())),
        }
    };
    let insights = take_list(Field::Insights)?;
    let subject_lines = take_list(Field::SubjectLines)?;
    let follow_up_subject_lines = take_list(Field::FollowUpSubjectLines)?;

    let mut take_text = |field: Field| -> Result<String, String> {
        match fields.remove(&field) {
            Some(FieldValue::Text(text)) if !text.trim().is_empty() => Ok(text.trim().to_owned()),
            Some(FieldValue::Text(_)) => Err(format!("field `{}` is empty", field.key())),
            _ => Err(format!("field `{}` must be a string", field.key())),
        }
    };

    Ok(ReportContent {
        insights,
        subject_lines,
        email_body: take_text(Field::EmailBody)?,
        follow_up_subject_lines,
        follow_up_body: take_text(Field::FollowUpBody)?,
        linkedin_connection_note: take_text(Field::LinkedinConnectionNote)?,
        linkedin_follow_up: take_text(Field::LinkedinFollowUp)?,
        call_script: take_text(Field::CallScript)?,
    })
}
