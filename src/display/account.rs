//! Account and bucket display formatting

use tabled::builder::Builder;

use super::render_table;
use crate::models::{Account, Bucket};

/// Format a list of accounts with balances as a table
pub fn format_account_list(accounts: &[Account], symbol: &str) -> String {
    if accounts.is_empty() {
        return "No accounts found.\n".to_string();
    }

    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "Role", "Buckets", "Balance", "Available"]);
    for account in accounts {
        builder.push_record([
            account.id.to_string(),
            account.name.clone(),
            account.role.to_string(),
            account.buckets.len().to_string(),
            account.balance().format_with_symbol(symbol),
            account.available_balance().format_with_symbol(symbol),
        ]);
    }

    render_table(builder, 4..)
}

/// Balance cell for a bucket: "(real) available" when the two differ
pub fn format_bucket_balance(bucket: &Bucket, symbol: &str) -> String {
    let available = bucket.available();
    if available == bucket.balance {
        available.format_with_symbol(symbol)
    } else {
        format!(
            "({}) {}",
            bucket.balance.format_with_symbol(symbol),
            available.format_with_symbol(symbol)
        )
    }
}

/// Format an account's buckets in the order given
pub fn format_bucket_list(account: &Account, buckets: &[Bucket], symbol: &str) -> String {
    let mut output = format!("Account: {} ({})\n", account.name, account.role);
    if buckets.is_empty() {
        output.push_str("No buckets found.\n");
        return output;
    }

    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "Balance"]);
    for bucket in buckets {
        let name = if bucket.is_virtual() {
            format!("{} (not created yet)", bucket.name)
        } else {
            bucket.name.clone()
        };
        builder.push_record([
            bucket.id.to_string(),
            name,
            format_bucket_balance(bucket, symbol),
        ]);
    }

    output.push_str(&render_table(builder, 2..));
    output
}
