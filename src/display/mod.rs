//! Display formatting for terminal output
//!
//! Turns accounts, bucket lists, section plans, evaluations and error lists
//! into tables and plain text.

pub mod account;
pub mod event;
pub mod plan;

pub use account::{format_account_list, format_bucket_list};
pub use event::{format_errors, format_evaluation, format_event, format_event_list};
pub use plan::format_plan;

use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};

/// Render a table, right-aligning the money columns
fn render_table(builder: Builder, money_columns: std::ops::RangeFrom<usize>) -> String {
    let mut table = builder.build();
    table.with(Style::psql());
    table.modify(Columns::new(money_columns), Alignment::right());
    format!("{}\n", table)
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
