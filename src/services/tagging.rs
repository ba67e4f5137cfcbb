//! Tag coverage validation
//!
//! A tag either covers the whole event or a part of it. One event never mixes
//! the two kinds, whole tags always carry the event total, and partial tags
//! never add up to more than the total.

use tracing::debug;

use super::error::AllocationError;
use crate::models::{Catalog, Coverage, DraftTaggedItem, Money, Section, TagRef, TaggedItem};

/// Validates the tagged items of one event against its total
pub struct TaggedItemAllocator<'a> {
    catalog: &'a Catalog,
}

impl<'a> TaggedItemAllocator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Validate tagged items in submission order.
    ///
    /// Blank names are skipped and a repeated whole tag is kept once. A
    /// partial item submitted without an amount covers the whole event.
    pub fn validate(
        &self,
        total: Money,
        items: &[DraftTaggedItem],
    ) -> Result<Vec<TaggedItem>, AllocationError> {
        let mut tagged: Vec<TaggedItem> = Vec::with_capacity(items.len());
        let mut kind: Option<Coverage> = None;
        let mut allocated = Money::zero();

        for item in items {
            let name = item.name.trim();
            if name.is_empty() {
                continue;
            }

            let coverage = match (item.coverage, item.amount) {
                (Coverage::Partial, None) => Coverage::Whole,
                (coverage, _) => coverage,
            };

            match kind {
                Some(existing) if existing != coverage => {
                    return Err(AllocationError::TagCoverageConflict {
                        tag: name.to_string(),
                    });
                }
                _ => kind = Some(coverage),
            }

            let amount = match coverage {
                Coverage::Whole => {
                    let amount = item.amount.unwrap_or(total);
                    if amount != total {
                        return Err(AllocationError::TagAmountMismatch {
                            tag: name.to_string(),
                            expected: total,
                            actual: amount,
                        });
                    }
                    if tagged.iter().any(|t| t.name == name) {
                        debug!(tag = name, "collapsing repeated whole tag");
                        continue;
                    }
                    amount
                }
                Coverage::Partial => {
                    let amount = item.amount.unwrap_or_default();
                    if amount.is_negative() {
                        return Err(AllocationError::NegativeAmount {
                            section: Section::Tags,
                        });
                    }
                    allocated = allocated.checked_add(amount).ok_or(
                        AllocationError::AmountOverflow {
                            section: Section::Tags,
                        },
                    )?;
                    if allocated > total {
                        return Err(AllocationError::TagOverallocation {
                            tag: name.to_string(),
                            total,
                            allocated,
                        });
                    }
                    amount
                }
            };

            tagged.push(TaggedItem {
                tag: self.tag_ref(name),
                name: name.to_string(),
                amount,
                coverage,
            });
        }

        Ok(tagged)
    }

    fn tag_ref(&self, name: &str) -> TagRef {
        self.catalog
            .tag_named(name)
            .map(|tag| TagRef::Existing(tag.id))
            .unwrap_or(TagRef::New)
    }
}
