//! Campaign state resolution and discount arithmetic.
//!
//! A product carries an optional denormalized campaign snapshot. Whether
//! that snapshot grants a badge or a discount is a pure function of the
//! snapshot and the current instant; callers re-evaluate it on every read
//! because validity windows are narrow and `now` keeps moving.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::timefmt::parse_timestamp;
use crate::types::{EntityId, Timestamp};

/// Denormalized campaign summary stored on member products.
///
/// `reduction` is a string-encoded percentage and the dates are stored as
/// strings; both quirks come from the wire format and are parsed leniently
/// at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSummary {
    pub id: EntityId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_date: Option<String>,
}

/// What a campaign snapshot means for a product right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignState {
    /// No campaign applies: absent snapshot, missing window fields, or a
    /// window that does not cover the current instant.
    None,
    /// In the validity window with a zero reduction; the badge is shown
    /// but the price is unchanged.
    Active,
    /// In the validity window with a nonzero reduction.
    ActiveWithDiscount,
}

/// Resolve the display state of a product's campaign snapshot.
///
/// Total and lenient: malformed dates or reductions degrade to
/// [`CampaignState::None`] rather than surfacing an error to render code.
pub fn resolve_campaign_state(campaign: Option<&CampaignSummary>, now: Timestamp) -> CampaignState {
    match campaign {
        Some(campaign) => {
            try_resolve_campaign_state(campaign, now).unwrap_or(CampaignState::None)
        }
        None => CampaignState::None,
    }
}

/// Fallible variant of [`resolve_campaign_state`].
///
/// Absent window fields are a legitimate `None`; malformed ones are an
/// error here so non-display callers can tell the difference.
pub fn try_resolve_campaign_state(
    campaign: &CampaignSummary,
    now: Timestamp,
) -> Result<CampaignState, CoreError> {
    // All three window fields must be present (and non-empty) for a
    // discount to ever be considered.
    let (Some(start), Some(finish), Some(reduction)) = (
        campaign.start_date.as_deref().filter(|v| !v.is_empty()),
        campaign.finish_date.as_deref().filter(|v| !v.is_empty()),
        campaign.reduction.as_deref().filter(|v| !v.is_empty()),
    ) else {
        return Ok(CampaignState::None);
    };

    let start = parse_timestamp(start)?;
    let finish = parse_timestamp(finish)?;
    let reduction: f64 = reduction
        .trim()
        .parse()
        .map_err(|_| CoreError::Validation(format!("unparseable reduction '{reduction}'")))?;

    // Inclusive on both ends.
    if now < start || now > finish {
        return Ok(CampaignState::None);
    }

    if reduction == 0.0 {
        Ok(CampaignState::Active)
    } else {
        Ok(CampaignState::ActiveWithDiscount)
    }
}

/// Price after applying a percentage reduction.
///
/// Unparseable reductions leave the price unchanged, consistent with the
/// resolver treating them as "no campaign".
pub fn discounted_price(price: f64, reduction: &str) -> f64 {
    match reduction.trim().parse::<f64>() {
        Ok(percent) => price - price * percent / 100.0,
        Err(_) => price,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{DateTime, Utc};

    use super::*;

    fn at(rfc3339: &str) -> Timestamp {
        DateTime::parse_from_rfc3339(rfc3339)
            .expect("test timestamp")
            .with_timezone(&Utc)
    }

    fn summary(
        reduction: Option<&str>,
        start: Option<&str>,
        finish: Option<&str>,
    ) -> CampaignSummary {
        CampaignSummary {
            id: "c1".to_string(),
            title: "Verão".to_string(),
            reduction: reduction.map(str::to_string),
            start_date: start.map(str::to_string),
            finish_date: finish.map(str::to_string),
        }
    }

    fn january() -> CampaignSummary {
        summary(
            Some("10"),
            Some("2024-01-01T00:00:00Z"),
            Some("2024-01-31T00:00:00Z"),
        )
    }

    #[test]
    fn absent_snapshot_is_none() {
        assert_eq!(
            resolve_campaign_state(None, at("2024-01-15T00:00:00Z")),
            CampaignState::None
        );
    }

    #[test]
    fn inside_window_with_reduction_is_discount() {
        assert_eq!(
            resolve_campaign_state(Some(&january()), at("2024-01-15T00:00:00Z")),
            CampaignState::ActiveWithDiscount
        );
    }

    #[test]
    fn zero_reduction_is_active_without_discount() {
        let campaign = summary(
            Some("0"),
            Some("2024-01-01T00:00:00Z"),
            Some("2024-01-31T00:00:00Z"),
        );
        assert_eq!(
            resolve_campaign_state(Some(&campaign), at("2024-01-15T00:00:00Z")),
            CampaignState::Active
        );
    }

    #[test]
    fn one_second_before_start_is_none() {
        assert_eq!(
            resolve_campaign_state(Some(&january()), at("2023-12-31T23:59:59Z")),
            CampaignState::None
        );
    }

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(
            resolve_campaign_state(Some(&january()), at("2024-01-01T00:00:00Z")),
            CampaignState::ActiveWithDiscount
        );
        assert_eq!(
            resolve_campaign_state(Some(&january()), at("2024-01-31T00:00:00Z")),
            CampaignState::ActiveWithDiscount
        );
    }

    #[test]
    fn after_finish_is_none() {
        assert_eq!(
            resolve_campaign_state(Some(&january()), at("2024-01-31T00:00:01Z")),
            CampaignState::None
        );
    }

    #[test]
    fn any_missing_window_field_is_none() {
        let now = at("2024-01-15T00:00:00Z");
        let missing_reduction = summary(
            None,
            Some("2024-01-01T00:00:00Z"),
            Some("2024-01-31T00:00:00Z"),
        );
        let missing_start = summary(Some("10"), None, Some("2024-01-31T00:00:00Z"));
        let missing_finish = summary(Some("10"), Some("2024-01-01T00:00:00Z"), None);

        for campaign in [&missing_reduction, &missing_start, &missing_finish] {
            assert_eq!(
                resolve_campaign_state(Some(campaign), now),
                CampaignState::None
            );
        }
    }

    #[test]
    fn empty_fields_count_as_absent() {
        let campaign = summary(
            Some(""),
            Some("2024-01-01T00:00:00Z"),
            Some("2024-01-31T00:00:00Z"),
        );
        assert_eq!(
            resolve_campaign_state(Some(&campaign), at("2024-01-15T00:00:00Z")),
            CampaignState::None
        );
        // absence is not an error even for the strict variant
        assert_matches!(
            try_resolve_campaign_state(&campaign, at("2024-01-15T00:00:00Z")),
            Ok(CampaignState::None)
        );
    }

    #[test]
    fn malformed_date_degrades_to_none() {
        let campaign = summary(Some("10"), Some("not a date"), Some("2024-01-31T00:00:00Z"));
        assert_eq!(
            resolve_campaign_state(Some(&campaign), at("2024-01-15T00:00:00Z")),
            CampaignState::None
        );
        assert_matches!(
            try_resolve_campaign_state(&campaign, at("2024-01-15T00:00:00Z")),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn malformed_reduction_degrades_to_none() {
        let campaign = summary(
            Some("ten percent"),
            Some("2024-01-01T00:00:00Z"),
            Some("2024-01-31T00:00:00Z"),
        );
        assert_eq!(
            resolve_campaign_state(Some(&campaign), at("2024-01-15T00:00:00Z")),
            CampaignState::None
        );
    }

    #[test]
    fn datetime_local_windows_resolve() {
        // what the admin form actually submits
        let campaign = summary(Some("25"), Some("2024-01-01T00:00"), Some("2024-01-31T23:59"));
        assert_eq!(
            resolve_campaign_state(Some(&campaign), at("2024-01-15T12:00:00Z")),
            CampaignState::ActiveWithDiscount
        );
    }

    #[test]
    fn discounted_price_applies_percentage() {
        assert_eq!(discounted_price(200.0, "10"), 180.0);
        assert_eq!(discounted_price(200.0, "0"), 200.0);
    }

    #[test]
    fn discounted_price_ignores_garbage_reductions() {
        assert_eq!(discounted_price(200.0, "n/a"), 200.0);
    }
}
