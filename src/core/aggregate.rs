use crate::core::models::cost::{CostGroup, RawCost};

/// Key of the synthetic group that absorbs everything past the group limit.
pub const OTHER_KEY: &str = "Other";

const DEFAULT_CURRENCY: &str = "USD";

/// Ordered groups plus the total over every input line.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub groups: Vec<CostGroup>,
    pub total: f64,
    pub currency: String,
}

/// Collapse raw cost lines into at most `max_groups` groups.
///
/// Lines are ranked by absolute amount so large credits stay visible. When
/// there are more lines than `max_groups`, the top `max_groups - 1` are kept
/// and the remainder is summed into a single "Other" group. Ranking happens
/// before zero filtering, and kept lines that would print as 0.00 are moved
/// into "Other" too, so the groups still add up to `total`. "Other" is
/// hidden only when every line in it prints as 0.00 and so does their sum.
/// `total` always covers every input line.
pub fn aggregate(raw: &[RawCost], max_groups: usize) -> Aggregation {
    aggregate_with_floor(raw, max_groups, 0.0)
}

/// Like [`aggregate`], but lines whose absolute amount is below `floor` are
/// folded into "Other" regardless of rank. A non-positive floor disables this.
pub fn aggregate_with_floor(raw: &[RawCost], max_groups: usize, floor: f64) -> Aggregation {
    let max_groups = max_groups.max(1);
    let currency = raw
        .iter()
        .map(|c| c.currency.as_str())
        .find(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CURRENCY)
        .to_string();
    let total: f64 = raw.iter().map(|c| c.amount).sum();

    let mut sorted: Vec<&RawCost> = raw.iter().collect();
    sorted.sort_by(|a, b| {
        b.amount
            .abs()
            .total_cmp(&a.amount.abs())
            .then_with(|| a.key.cmp(&b.key))
    });

    let (mut kept, mut rest): (Vec<&RawCost>, Vec<&RawCost>) = if floor > 0.0 {
        sorted.into_iter().partition(|c| c.amount.abs() >= floor)
    } else {
        (sorted, Vec::new())
    };

    let needs_other = !rest.is_empty() || kept.len() > max_groups;
    if needs_other && kept.len() > max_groups - 1 {
        rest.extend(kept.split_off(max_groups - 1));
    }

    let (kept, negligible): (Vec<&RawCost>, Vec<&RawCost>) =
        kept.into_iter().partition(|c| !rounds_to_zero(c.amount));
    rest.extend(negligible);

    let mut groups: Vec<CostGroup> = kept
        .into_iter()
        .map(|c| CostGroup {
            key: c.key.clone(),
            amount: c.amount,
            currency: if c.currency.is_empty() {
                currency.clone()
            } else {
                c.currency.clone()
            },
        })
        .collect();

    if !rest.is_empty() {
        let other: f64 = rest.iter().map(|c| c.amount).sum();
        let all_negligible = rest.iter().all(|c| rounds_to_zero(c.amount));
        if !(all_negligible && rounds_to_zero(other)) {
            groups.push(CostGroup {
                key: OTHER_KEY.to_string(),
                amount: other,
                currency: currency.clone(),
            });
        }
    }

    Aggregation {
        groups,
        total,
        currency,
    }
}

/// True when the amount would print as 0.00.
fn rounds_to_zero(amount: f64) -> bool {
    (amount * 100.0).round() == 0.0
}
