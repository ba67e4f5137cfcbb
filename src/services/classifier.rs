//! Event classification
//!
//! Decides, from an event's role and the line items it currently holds,
//! which form sections apply, which are shown, and which are still down to
//! a single bucket. `evaluate` runs a whole draft through the allocators.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::error::{AllocationError, AllocationErrors};
use super::line_item::{BucketRequest, LineItemAllocator, PreparedEvent};
use super::tagging::TaggedItemAllocator;
use crate::models::{Account, Catalog, Event, EventDraft, EventRole, LineItem, Section};

/// How one section is treated for the current event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SectionVerdict {
    /// The section takes part in the event
    pub applicable: bool,
    /// The section should be rendered
    pub visible: bool,
    /// The section holds at most one line item
    pub single_bucket: bool,
}

/// Verdicts for every section of one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionPlan {
    pub role: Option<EventRole>,
    pub sections: BTreeMap<Section, SectionVerdict>,
}

impl SectionPlan {
    /// The plan for a blank form whose role has not been chosen yet
    pub fn unrestricted() -> Self {
        let verdict = SectionVerdict {
            applicable: true,
            visible: true,
            single_bucket: true,
        };
        Self {
            role: None,
            sections: Section::ALL.iter().map(|s| (*s, verdict)).collect(),
        }
    }

    pub fn verdict(&self, section: Section) -> SectionVerdict {
        self.sections.get(&section).copied().unwrap_or_default()
    }

    /// Look up a verdict by form token
    pub fn verdict_for(&self, token: &str) -> Result<SectionVerdict, AllocationError> {
        let section: Section = token.parse()?;
        Ok(self.verdict(section))
    }

    pub fn is_applicable(&self, section: Section) -> bool {
        self.verdict(section).applicable
    }

    pub fn is_visible(&self, section: Section) -> bool {
        self.verdict(section).visible
    }

    pub fn is_single_bucket(&self, section: Section) -> bool {
        self.verdict(section).single_bucket
    }

    /// Whether the split choice belongs in the section's bucket selector
    pub fn offers_split(&self, section: Section) -> bool {
        let verdict = self.verdict(section);
        verdict.applicable && verdict.single_bucket && section.holds_line_items()
    }

    pub fn applicable_sections(&self) -> Vec<Section> {
        self.sections
            .iter()
            .filter(|(_, v)| v.applicable)
            .map(|(s, _)| *s)
            .collect()
    }

    pub fn visible_sections(&self) -> Vec<Section> {
        self.sections
            .iter()
            .filter(|(_, v)| v.visible)
            .map(|(s, _)| *s)
            .collect()
    }
}

/// Result of evaluating a draft that passed every check
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub plan: SectionPlan,
    pub prepared: PreparedEvent,
}

/// Sections an event role can populate
pub fn role_sections(role: EventRole) -> &'static [Section] {
    match role {
        EventRole::Expense => &[Section::PaymentSource, Section::CreditOptions, Section::Tags],
        EventRole::Deposit => &[Section::Deposit, Section::Tags],
        EventRole::Transfer => &[Section::TransferFrom, Section::TransferTo, Section::Tags],
        EventRole::Reallocation => &[Section::ReallocateFrom, Section::ReallocateTo, Section::Tags],
    }
}

/// Sections an event of the role cannot be saved without
pub fn required_sections(role: EventRole) -> &'static [Section] {
    match role {
        EventRole::Expense => &[Section::PaymentSource],
        EventRole::Deposit => &[Section::Deposit],
        EventRole::Transfer => &[Section::TransferFrom, Section::TransferTo],
        EventRole::Reallocation => &[Section::ReallocateFrom, Section::ReallocateTo],
    }
}

/// Classifies events and evaluates drafts against one catalog snapshot
pub struct EventClassifier<'a> {
    catalog: &'a Catalog,
}

impl<'a> EventClassifier<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Build the section plan for a role, given the section of every line
    /// item the event currently holds
    pub fn classify(
        &self,
        role: EventRole,
        line_items: impl IntoIterator<Item = Section>,
    ) -> SectionPlan {
        let mut counts: BTreeMap<Section, usize> = BTreeMap::new();
        for section in line_items {
            *counts.entry(section).or_default() += 1;
        }

        let permitted = role_sections(role);
        let sections: BTreeMap<Section, SectionVerdict> = Section::ALL
            .iter()
            .map(|&section| {
                let count = counts.get(&section).copied().unwrap_or(0);
                let applicable = permitted.contains(&section)
                    && (!section.is_reallocation() || count > 0);
                let visible = match section {
                    Section::GeneralInformation => role != EventRole::Reallocation,
                    Section::CreditOptions => applicable && count > 0,
                    _ => applicable,
                };
                let verdict = SectionVerdict {
                    applicable,
                    visible,
                    single_bucket: count <= 1,
                };
                (section, verdict)
            })
            .collect();

        let plan = SectionPlan {
            role: Some(role),
            sections,
        };
        debug!(%role, applicable = ?plan.applicable_sections(), "classified event");
        plan
    }

    /// Plan for a draft's current line items
    pub fn classify_draft(&self, draft: &EventDraft) -> SectionPlan {
        self.classify(draft.role, draft.line_item_sections())
    }

    /// Whether check number and similar options belong next to the section
    pub fn check_options_visible(&self, draft: &EventDraft, section: Section) -> bool {
        matches!(
            section,
            Section::PaymentSource | Section::TransferFrom | Section::Deposit
        ) && role_sections(draft.role).contains(&section)
            && self
                .section_account(draft, section)
                .is_some_and(Account::is_checking)
    }

    /// Whether an expense paid by credit card should offer to set the
    /// repayment aside from a checking account
    pub fn repayment_options_visible(&self, draft: &EventDraft) -> bool {
        draft.role == EventRole::Expense
            && self
                .section_account(draft, Section::PaymentSource)
                .is_some_and(Account::is_credit_card)
            && draft
                .section(Section::CreditOptions)
                .map_or(true, |s| s.line_item_count() == 0)
    }

    /// Accounts the section's account selector offers
    pub fn eligible_accounts(&self, section: Section) -> Vec<&'a Account> {
        match section {
            Section::CreditOptions => self
                .catalog
                .accounts
                .iter()
                .filter(|a| a.is_checking())
                .collect(),
            s if s.holds_line_items() => self.catalog.accounts.iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Validate and resolve a whole draft.
    ///
    /// All errors are collected. Draft sections the role does not use are
    /// dropped before anything is resolved.
    pub fn evaluate(&self, draft: &EventDraft) -> Result<Evaluation, AllocationErrors> {
        let role = draft.role;
        let permitted = role_sections(role);
        let mut errors = AllocationErrors::new();

        for stray in draft
            .sections
            .iter()
            .filter(|s| !permitted.contains(&s.section) || !s.section.holds_line_items())
        {
            warn!(%role, section = %stray.section, "dropping section the event does not use");
        }

        let total = draft.amount;
        if !total.is_positive() {
            errors.push(AllocationError::NonPositiveTotal { amount: total });
        }

        for &section in required_sections(role) {
            if draft.section(section).map_or(true, |s| s.line_item_count() == 0) {
                errors.push(AllocationError::MissingSection { section });
            }
        }

        let mut line_items: Vec<LineItem> = Vec::new();
        let mut bucket_requests: Vec<BucketRequest> = Vec::new();
        let mut tagged_items = Vec::new();

        if total.is_positive() {
            let allocator = LineItemAllocator::new(self.catalog);
            for &section in permitted.iter().filter(|s| s.holds_line_items()) {
                let Some(part) = draft.section(section).filter(|s| s.line_item_count() > 0)
                else {
                    continue;
                };
                let counterpart = section.opposite().and_then(|other| draft.section(other));

                match allocator.resolve_with_counterpart(part, total, counterpart) {
                    Ok(resolved) => {
                        line_items.extend(resolved.line_items);
                        bucket_requests.extend(resolved.bucket_requests);
                    }
                    Err(err) => errors.push(err),
                }
            }

            match TaggedItemAllocator::new(self.catalog).validate(total, &draft.tagged_items) {
                Ok(items) => tagged_items = items,
                Err(err) => errors.push(err),
            }
        }

        if !errors.is_empty() {
            debug!(%role, errors = errors.len(), "draft rejected");
            return Err(errors);
        }

        let plan = self.classify(role, line_items.iter().map(|item| item.section));
        let event = Event {
            id: draft.id,
            role,
            occurred_on: draft.occurred_on,
            memo: draft.memo.clone(),
            amount: total,
            line_items,
            tagged_items,
        };

        Ok(Evaluation {
            plan,
            prepared: PreparedEvent {
                event,
                bucket_requests,
            },
        })
    }

    fn section_account(&self, draft: &EventDraft, section: Section) -> Option<&'a Account> {
        draft
            .section(section)
            .and_then(|s| s.account_id)
            .and_then(|id| self.catalog.account(id))
    }
}
