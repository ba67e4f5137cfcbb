//! Event display formatting
//!
//! Formats evaluations, saved events and rejected-event error lists.

use tabled::builder::Builder;

use super::render_table;
use crate::models::{BucketRef, Catalog, Event, LineItem};
use crate::services::{AllocationErrors, BucketRequest, Evaluation};

/// Account and bucket names for a line item
fn line_item_labels(
    item: &LineItem,
    catalog: &Catalog,
    requests: &[BucketRequest],
) -> (String, String) {
    let account = catalog
        .account(item.account_id)
        .map(|a| a.name.clone())
        .unwrap_or_else(|| item.account_id.to_string());

    let bucket = match &item.bucket {
        BucketRef::Pending(placeholder) => requests
            .iter()
            .find(|r| &r.placeholder == placeholder)
            .map(|r| format!("{} (new)", r.name))
            .unwrap_or_else(|| "(new)".to_string()),
        bucket => bucket
            .bucket_id()
            .and_then(|id| catalog.bucket(item.account_id, &id))
            .map(|b| b.name)
            .unwrap_or_else(|| bucket.to_string()),
    };

    (account, bucket)
}

fn line_item_table(
    items: &[LineItem],
    catalog: &Catalog,
    requests: &[BucketRequest],
    symbol: &str,
) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Section", "Account", "Bucket", "Amount"]);
    for item in items {
        let (account, bucket) = line_item_labels(item, catalog, requests);
        builder.push_record([
            item.section.to_string(),
            account,
            bucket,
            item.signed_amount().format_with_symbol(symbol),
        ]);
    }
    render_table(builder, 3..)
}

fn format_event_body(
    event: &Event,
    catalog: &Catalog,
    requests: &[BucketRequest],
    symbol: &str,
) -> String {
    let mut output = String::new();

    if let Some(id) = event.id {
        output.push_str(&format!("Event {}\n", id));
    }
    output.push_str(&format!("  Role:   {}\n", event.role));
    output.push_str(&format!("  Date:   {}\n", event.occurred_on.format("%Y-%m-%d")));
    output.push_str(&format!(
        "  Amount: {}\n",
        event.signed_total().format_with_symbol(symbol)
    ));
    if let Some(memo) = &event.memo {
        output.push_str(&format!("  Memo:   {}\n", memo));
    }
    output.push('\n');
    output.push_str(&line_item_table(&event.line_items, catalog, requests, symbol));

    if !event.tagged_items.is_empty() {
        output.push_str("\nTags:\n");
        for item in &event.tagged_items {
            output.push_str(&format!(
                "  {} ({}) {}\n",
                item.name,
                item.coverage,
                item.amount.format_with_symbol(symbol)
            ));
        }
    }

    output
}

/// Format an evaluation that passed every check, before it is saved
pub fn format_evaluation(evaluation: &Evaluation, catalog: &Catalog, symbol: &str) -> String {
    let prepared = &evaluation.prepared;
    let mut output = String::from("Event is valid.\n");
    output.push_str(&format_event_body(
        &prepared.event,
        catalog,
        &prepared.bucket_requests,
        symbol,
    ));

    if !prepared.bucket_requests.is_empty() {
        output.push_str("\nBuckets to create:\n");
        for request in &prepared.bucket_requests {
            let account = catalog
                .account(request.account_id)
                .map(|a| a.name.as_str())
                .unwrap_or("?");
            output.push_str(&format!("  {} in {}\n", request.name, account));
        }
    }

    output
}

/// Format a saved event
pub fn format_event(event: &Event, catalog: &Catalog, symbol: &str) -> String {
    format_event_body(event, catalog, &[], symbol)
}

/// Format saved events as a table
pub fn format_event_list(events: &[Event], symbol: &str) -> String {
    if events.is_empty() {
        return "No events found.\n".to_string();
    }

    let mut builder = Builder::default();
    builder.push_record(["ID", "Date", "Role", "Memo", "Tags", "Amount"]);
    for event in events {
        builder.push_record([
            event.id.map(|id| id.to_string()).unwrap_or_default(),
            event.occurred_on.format("%Y-%m-%d").to_string(),
            event.role.to_string(),
            event.memo.clone().unwrap_or_default(),
            event.whole_tag_names().join(", "),
            event.signed_total().format_with_symbol(symbol),
        ]);
    }

    render_table(builder, 5..)
}

/// Format the errors of a rejected event, one per line
pub fn format_errors(errors: &AllocationErrors) -> String {
    let mut output = format!(
        "Event rejected ({} error{}):\n",
        errors.len(),
        if errors.len() == 1 { "" } else { "s" }
    );
    for error in errors.iter() {
        output.push_str(&format!("  - {}\n", error));
    }
    output
}
