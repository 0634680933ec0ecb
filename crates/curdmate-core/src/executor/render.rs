//! Text rendering for executor results.
//!
//! Single lookups and list results share one card layout.

use std::fmt::Write as _;

use curdmate_types::record::{NewRecord, Record, RecordId, RecordPatch};

const NEXT: &str = "What would you like to do next?";
const ELSE: &str = "What else can I help you with?";

fn or_na(value: Option<&str>) -> &str {
    value.unwrap_or("N/A")
}

/// One contact card.
pub fn card(index: usize, record: &Record) -> String {
    let age = record.age.map(|a| a.to_string());
    format!(
        "——— Contact {index} ———\n\
         ID: {}\n\
         Name: {}\n\
         Email: {}\n\
         Phone: {}\n\
         Age: {}\n\
         Address: {}\n",
        record.id,
        or_na(record.name.as_deref()),
        or_na(record.email.as_deref()),
        or_na(record.phone.as_deref()),
        or_na(age.as_deref()),
        or_na(record.address.as_deref()),
    )
}

/// Cards for `records` under a "Found N contacts" heading.
///
/// `matching` names the search term, if any. Callers handle the empty case.
pub fn record_list(records: &[Record], matching: Option<&str>) -> String {
    let plural = if records.len() == 1 { "" } else { "s" };
    let mut out = match matching {
        Some(term) => format!(
            "**Found {} contact{plural} matching \"{term}\"!**\n\n",
            records.len()
        ),
        None => format!("**Found {} contact{plural}!**\n\n", records.len()),
    };
    for (i, record) in records.iter().enumerate() {
        out.push_str(&card(i + 1, record));
        out.push('\n');
    }
    out.push_str(NEXT);
    out
}

pub fn no_records() -> String {
    "**No Contacts Found**\n\nYou don't have any contacts yet. Would you like to add your first contact?"
        .to_string()
}

pub fn no_matches(term: &str) -> String {
    format!(
        "**No Results Found**\n\nI couldn't find any contacts matching \"{term}\". Try a different search term?"
    )
}

pub fn not_found(id: &RecordId) -> String {
    format!("**No Contact Found**\n\nThere is no contact with ID {id}. Double-check the ID and try again.")
}

pub fn created(record: &NewRecord, id: &RecordId) -> String {
    let mut out = String::from("**Contact Created Successfully!**\n\n");
    let _ = writeln!(out, "• Name: {}", record.name);
    if let Some(ref email) = record.email {
        let _ = writeln!(out, "• Email: {email}");
    }
    if let Some(ref phone) = record.phone {
        let _ = writeln!(out, "• Phone: {phone}");
    }
    if let Some(age) = record.age {
        let _ = writeln!(out, "• Age: {age}");
    }
    if let Some(ref address) = record.address {
        let _ = writeln!(out, "• Address: {address}");
    }
    let _ = write!(out, "\nContact ID: {id}\n\nContact added to your phonebook! {ELSE}");
    out
}

pub fn updated(id: &RecordId, patch: &RecordPatch) -> String {
    let mut out = format!("**Contact Updated Successfully!**\n\nContact {id} updated:\n");
    for (field, value) in patch.changes() {
        let _ = writeln!(out, "• {field}: {value}");
    }
    let _ = write!(out, "\n{ELSE}");
    out
}

pub fn deleted(id: &RecordId) -> String {
    format!("**Contact Deleted Successfully!**\n\nContact {id} has been permanently removed.\n\n{ELSE}")
}

/// Duplicate record, kept distinct from other failures.
pub fn duplicate(message: &str) -> String {
    format!("**Duplicate Contact**\n\n{message}\n\nA contact with these details already exists.")
}

pub fn rejected(operation: &str, message: &str) -> String {
    format!("**Could Not {operation} Contact**\n\n{message}\n\nPlease check the details and try again.")
}
