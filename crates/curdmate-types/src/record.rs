//! Contact record types for CurdMate.
//!
//! These types model the entity managed through the record API: the record
//! itself, its hexadecimal identifier, create/update payloads, list queries,
//! and paginated list responses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a record in the backend store.
///
/// A 24-character hexadecimal string (ObjectId-style). The legacy
/// 12-character form is also accepted. Parsed ids are normalized to
/// lower-case.
///
/// Deserialization is transparent and does not validate, so ids returned by
/// the backend are always carried through as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Length of a standard record id.
    pub const LEN: usize = 24;

    /// Length of the legacy short record id.
    pub const LEGACY_LEN: usize = 12;

    /// Parse and normalize a record id, returning `None` when the input is not
    /// a 24- or 12-character hexadecimal string.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let len_ok = trimmed.len() == Self::LEN || trimmed.len() == Self::LEGACY_LEN;
        if len_ok && trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            Some(Self(trimmed.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this id uses the legacy 12-character form.
    pub fn is_legacy(&self) -> bool {
        self.0.len() == Self::LEGACY_LEN
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecordId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid record id: '{s}'"))
    }
}

/// A contact record as returned by the record API.
///
/// Every field except the id is optional on the wire; missing values render
/// as "N/A" in result cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "_id", alias = "id")]
    pub id: RecordId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub address: Option<String>,
}

/// One page of records from the list/search endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordPage {
    #[serde(default)]
    pub data: Vec<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// Payload for the create endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Payload for the update endpoint. Only the populated fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.changes().is_empty()
    }

    /// The populated fields in canonical order, rendered as display strings.
    pub fn changes(&self) -> Vec<(RecordField, String)> {
        let mut out = Vec::new();
        if let Some(ref v) = self.name {
            out.push((RecordField::Name, v.clone()));
        }
        if let Some(ref v) = self.email {
            out.push((RecordField::Email, v.clone()));
        }
        if let Some(ref v) = self.phone {
            out.push((RecordField::Phone, v.clone()));
        }
        if let Some(v) = self.age {
            out.push((RecordField::Age, v.to_string()));
        }
        if let Some(ref v) = self.address {
            out.push((RecordField::Address, v.clone()));
        }
        out
    }
}

/// An editable field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordField {
    Name,
    Email,
    Phone,
    Age,
    Address,
}

impl RecordField {
    /// All editable fields, in form order.
    pub const ALL: [RecordField; 5] = [
        RecordField::Name,
        RecordField::Email,
        RecordField::Phone,
        RecordField::Age,
        RecordField::Address,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordField::Name => "name",
            RecordField::Email => "email",
            RecordField::Phone => "phone",
            RecordField::Age => "age",
            RecordField::Address => "address",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(RecordField::Name),
            "email" => Ok(RecordField::Email),
            "phone" => Ok(RecordField::Phone),
            "age" => Ok(RecordField::Age),
            "address" => Ok(RecordField::Address),
            other => Err(format!("invalid record field: '{other}'")),
        }
    }
}

/// Search term for the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "term", rename_all = "lowercase")]
pub enum SearchTerm {
    Name(String),
    Email(String),
}

impl SearchTerm {
    pub fn as_str(&self) -> &str {
        match self {
            SearchTerm::Name(t) | SearchTerm::Email(t) => t,
        }
    }
}

/// Query parameters for the list/search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchTerm>,
}

impl RecordQuery {
    /// First page of all records.
    pub fn all(limit: u32) -> Self {
        Self {
            page: 1,
            limit,
            search: None,
        }
    }

    /// First page of records matching `term`.
    pub fn search(term: SearchTerm, limit: u32) -> Self {
        Self {
            page: 1,
            limit,
            search: Some(term),
        }
    }
}
