//! Event form decoding
//!
//! Turns an `application/x-www-form-urlencoded` event form into an
//! `EventDraft`. Field names follow the nested `event[section][field]`
//! convention:
//!
//! ```text
//! event[role]=expense&event[amount]=12.50
//! &event[payment_source][account_id]=1&event[payment_source][bucket_id]=+
//! &event[payment_source][items][0][bucket_id]=4&event[payment_source][items][0][amount]=10
//! &event[payment_source][items][1][bucket_id]=aside&event[payment_source][items][1][amount]=2.50
//! &event[tags][whole]=food, travel
//! ```
//!
//! Empty values count as absent. Keys outside `event[...]` are ignored.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{BucketwiseError, BucketwiseResult};
use crate::models::{
    AccountId, BucketSelection, Coverage, DraftLineItem, DraftSection, DraftTaggedItem,
    EventDraft, EventRole, Money, Section,
};
use crate::services::{AllocationError, AllocationErrors};

#[derive(Default)]
struct PartialTag {
    name: Option<String>,
    amount: Option<Money>,
}

/// Split `event[a][b]` into `["a", "b"]`
fn key_path(key: &str) -> Option<Vec<&str>> {
    let rest = key.strip_prefix("event")?;
    let mut segments = Vec::new();
    let mut remaining = rest;
    while !remaining.is_empty() {
        let inner = remaining.strip_prefix('[')?;
        let end = inner.find(']')?;
        segments.push(&inner[..end]);
        remaining = &inner[end + 1..];
    }
    if segments.is_empty() {
        None
    } else {
        Some(segments)
    }
}

fn form_error(message: impl Into<String>) -> BucketwiseError {
    BucketwiseError::Form(message.into())
}

fn parse_money(field: &str, value: &str) -> BucketwiseResult<Money> {
    Money::parse(value).map_err(|e| form_error(format!("{}: {}", field, e)))
}

fn parse_index(field: &str, value: &str) -> BucketwiseResult<usize> {
    value
        .parse()
        .map_err(|_| form_error(format!("{}: invalid row index '{}'", field, value)))
}

/// Decode an event form body.
///
/// `today` is used when the form leaves the date blank. An unknown section
/// token is reported as an allocation error, every other malformed field as
/// a form error.
pub fn parse_event_form(body: &str, today: NaiveDate) -> BucketwiseResult<EventDraft> {
    let pairs: Vec<(String, String)> =
        serde_urlencoded::from_str(body).map_err(|e| form_error(e.to_string()))?;

    let mut role: Option<EventRole> = None;
    let mut amount: Option<Money> = None;
    let mut occurred_on: Option<NaiveDate> = None;
    let mut memo: Option<String> = None;
    let mut sections: Vec<DraftSection> = Vec::new();
    let mut rows: BTreeMap<(Section, usize), DraftLineItem> = BTreeMap::new();
    let mut whole_tags: Vec<DraftTaggedItem> = Vec::new();
    let mut partial_tags: BTreeMap<usize, PartialTag> = BTreeMap::new();

    for (key, value) in &pairs {
        let Some(path) = key_path(key) else {
            debug!(%key, "ignoring field outside the event form");
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        match path.as_slice() {
            ["role"] => {
                let parsed = value
                    .parse::<EventRole>()
                    .map_err(|e| form_error(e.to_string()))?;
                role = Some(parsed);
            }
            ["amount"] => amount = Some(parse_money(key, value)?),
            ["occurred_on"] => {
                let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .map_err(|_| form_error(format!("{}: invalid date '{}'", key, value)))?;
                occurred_on = Some(date);
            }
            ["memo"] => memo = Some(value.to_string()),
            ["tags", "whole"] => whole_tags.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(DraftTaggedItem::whole),
            ),
            ["tags", "partial", index, field] => {
                let tag = partial_tags.entry(parse_index(key, index)?).or_default();
                match *field {
                    "name" => tag.name = Some(value.to_string()),
                    "amount" => tag.amount = Some(parse_money(key, value)?),
                    _ => return Err(form_error(format!("unrecognized field: {}", key))),
                }
            }
            [token, rest @ ..] => {
                let section = token.parse::<Section>().map_err(|e| {
                    BucketwiseError::Allocation(AllocationErrors::from(AllocationError::from(e)))
                })?;
                if !section.holds_line_items() {
                    return Err(form_error(format!("unrecognized field: {}", key)));
                }

                match rest {
                    ["items", index, field] => {
                        let row = rows.entry((section, parse_index(key, index)?)).or_default();
                        match *field {
                            "bucket_id" => row.selection = BucketSelection::parse(value),
                            "amount" => row.amount = Some(parse_money(key, value)?),
                            _ => return Err(form_error(format!("unrecognized field: {}", key))),
                        }
                    }
                    [field] => {
                        let draft = section_entry(&mut sections, section);
                        match *field {
                            "account_id" => {
                                let id = value.parse::<AccountId>().map_err(|_| {
                                    form_error(format!("{}: invalid account '{}'", key, value))
                                })?;
                                draft.account_id = Some(id);
                            }
                            "bucket_id" => draft.selection = BucketSelection::parse(value),
                            "amount" => draft.amount = Some(parse_money(key, value)?),
                            "new_bucket" => draft.new_bucket_name = Some(value.to_string()),
                            _ => return Err(form_error(format!("unrecognized field: {}", key))),
                        }
                    }
                    _ => return Err(form_error(format!("unrecognized field: {}", key))),
                }
            }
            [] => continue,
        }
    }

    for ((section, _), row) in rows {
        let draft = section_entry(&mut sections, section);
        match draft.selection {
            None => draft.selection = Some(BucketSelection::Split),
            Some(BucketSelection::Split) => {}
            Some(_) => {
                return Err(form_error(format!(
                    "event[{}][items] given without choosing the split option",
                    section
                )))
            }
        }
        draft.items.push(row);
    }

    let role = role.ok_or_else(|| form_error("event[role] is required"))?;
    let amount = amount.ok_or_else(|| form_error("event[amount] is required"))?;

    let mut tagged_items = whole_tags;
    tagged_items.extend(partial_tags.into_values().filter_map(|tag| {
        tag.name.map(|name| DraftTaggedItem {
            name,
            amount: tag.amount,
            coverage: Coverage::Partial,
        })
    }));

    Ok(EventDraft {
        id: None,
        role,
        occurred_on: occurred_on.unwrap_or(today),
        memo,
        amount,
        sections,
        tagged_items,
    })
}

/// The draft section for a token, added in first-seen order
fn section_entry(sections: &mut Vec<DraftSection>, section: Section) -> &mut DraftSection {
    let index = match sections.iter().position(|s| s.section == section) {
        Some(index) => index,
        None => {
            sections.push(DraftSection::new(section));
            sections.len() - 1
        }
    };
    &mut sections[index]
}
