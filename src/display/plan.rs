//! Section plan display formatting

use tabled::builder::Builder;

use super::{render_table, yes_no};
use crate::services::SectionPlan;

/// Format a section plan as a table, one row per section in form order
pub fn format_plan(plan: &SectionPlan) -> String {
    let mut output = match plan.role {
        Some(role) => format!("Event role: {}\n", role),
        None => "Event role: (none)\n".to_string(),
    };

    let mut builder = Builder::default();
    builder.push_record(["Section", "Applicable", "Visible", "Single bucket", "Split"]);
    for (section, verdict) in &plan.sections {
        builder.push_record([
            section.to_string(),
            yes_no(verdict.applicable).to_string(),
            yes_no(verdict.visible).to_string(),
            yes_no(verdict.single_bucket).to_string(),
            yes_no(plan.offers_split(*section)).to_string(),
        ]);
    }

    output.push_str(&render_table(builder, 5..));
    output
}
