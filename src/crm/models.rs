// ABOUTME: Typed request and response shapes of the CRM resource API
// ABOUTME: Contacts, opportunities, pipelines, custom fields, and notes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

/// CRM contact
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    /// Contact id
    pub id: String,
    /// Owning location
    pub location_id: Option<String>,
    /// Given name
    pub first_name: Option<String>,
    /// Family name
    pub last_name: Option<String>,
    /// Display name as stored by the CRM
    #[serde(alias = "name")]
    pub contact_name: Option<String>,
    /// Primary email
    pub email: Option<String>,
    /// Primary phone
    pub phone: Option<String>,
    /// Organization the contact belongs to
    pub company_name: Option<String>,
    /// Organization website
    pub website: Option<String>,
    /// Tags
    pub tags: Vec<String>,
}

impl Contact {
    /// Best available display name
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        if let Some(name) = self.contact_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return Some(name.trim().to_owned());
        }
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

/// Fields for a new contact; the location is injected by the client
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    /// Given name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Primary email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Primary phone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Organization name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    /// Organization website
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Tags
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Partial contact update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactUpdate {
    /// Given name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Primary email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Primary phone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Organization name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    /// Organization website
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Replacement tag set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Stage within a pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineStage {
    /// Stage id
    pub id: String,
    /// Stage name
    pub name: String,
    /// Display position
    pub position: Option<i64>,
}

/// Sales pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pipeline {
    /// Pipeline id
    pub id: String,
    /// Pipeline name
    pub name: String,
    /// Ordered stages
    pub stages: Vec<PipelineStage>,
}

/// Contact summary embedded in an opportunity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OpportunityContact {
    /// Contact id
    pub id: String,
    /// Contact display name
    pub name: Option<String>,
    /// Contact email
    pub email: Option<String>,
}

/// Sales opportunity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Opportunity {
    /// Opportunity id
    pub id: String,
    /// Opportunity name
    pub name: String,
    /// Expected value
    pub monetary_value: Option<f64>,
    /// Owning pipeline
    pub pipeline_id: Option<String>,
    /// Current stage
    pub pipeline_stage_id: Option<String>,
    /// Status (`open`, `won`, `lost`, `abandoned`)
    pub status: Option<String>,
    /// Linked contact id
    pub contact_id: Option<String>,
    /// Linked contact summary
    pub contact: Option<OpportunityContact>,
}

/// Fields for a new opportunity; the location is injected by the client
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOpportunity {
    /// Opportunity name
    pub name: String,
    /// Pipeline to create the opportunity in
    pub pipeline_id: String,
    /// Initial stage
    pub pipeline_stage_id: String,
    /// Linked contact
    pub contact_id: String,
    /// Initial status
    pub status: String,
    /// Expected value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monetary_value: Option<f64>,
}

/// Location-level custom field definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomField {
    /// Field id
    pub id: String,
    /// Display name
    pub name: String,
    /// Merge-field key
    pub field_key: Option<String>,
    /// Value type
    pub data_type: Option<String>,
    /// Object the field applies to
    pub model: Option<String>,
}

/// Note attached to a contact
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Note {
    /// Note id
    pub id: String,
    /// Note text
    pub body: String,
    /// Creation time as reported by the CRM
    pub date_added: Option<String>,
    /// Owning contact
    pub contact_id: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct ContactEnvelope {
    pub contact: Contact,
}

#[derive(Deserialize)]
pub(super) struct ContactsEnvelope {
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

#[derive(Deserialize)]
pub(super) struct PipelinesEnvelope {
    #[serde(default)]
    pub pipelines: Vec<Pipeline>,
}

#[derive(Deserialize)]
pub(super) struct OpportunityEnvelope {
    pub opportunity: Opportunity,
}

#[derive(Deserialize)]
pub(super) struct OpportunitiesEnvelope {
    #[serde(default)]
    pub opportunities: Vec<Opportunity>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CustomFieldsEnvelope {
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

#[derive(Deserialize)]
pub(super) struct NotesEnvelope {
    #[serde(default)]
    pub notes: Vec<Note>,
}

#[derive(Deserialize)]
pub(super) struct NoteEnvelope {
    pub note: Note,
}
