//! # Courier Assignment Rules
//!
//! Decides which delivery person gets a new order.
//!
//! ## Eligibility
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A courier is ELIGIBLE at `now` when ALL of:                           │
//! │                                                                         │
//! │   a. is_available flag is set                                          │
//! │   b. no delivery in the last 30 minutes  (cooldown)                    │
//! │   c. no assigned order that is not DELIVERED  (one active delivery)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Selection
//! ```text
//! prefix known? ──yes──► eligible AND covers prefix ──► lowest id ──► done
//!      │                            │
//!      │                        none found
//!      ▼                            ▼
//!      └──────────────► any eligible ──► lowest id ──► done
//!                                │
//!                            none found
//!                                ▼
//!                        NoEligibleCourier
//! ```
//!
//! The database layer re-checks the same predicate in a conditional
//! `UPDATE` when it claims the courier, so the choice made here is only a
//! candidate until that update succeeds.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::postal::PostalPrefix;
use crate::COURIER_COOLDOWN_MINUTES;

/// Length of the post-delivery cooldown.
#[inline]
pub fn cooldown() -> Duration {
    Duration::minutes(COURIER_COOLDOWN_MINUTES)
}

/// True once a full cooldown has passed since `delivered_at`.
///
/// At the moment of delivery itself the cooldown has not elapsed.
///
/// ```rust
/// use chrono::{Duration, TimeZone, Utc};
/// use pizza_core::courier::cooldown_elapsed;
///
/// let delivered = Utc.with_ymd_and_hms(2026, 10, 16, 18, 0, 0).unwrap();
/// assert!(!cooldown_elapsed(delivered, delivered));
/// assert!(!cooldown_elapsed(delivered, delivered + Duration::minutes(29)));
/// assert!(cooldown_elapsed(delivered, delivered + Duration::minutes(30)));
/// ```
pub fn cooldown_elapsed(delivered_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - delivered_at >= cooldown()
}

/// Everything the eligibility rule needs to know about one courier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourierCandidate {
    pub id: i64,
    pub name: String,
    pub is_available: bool,
    /// Most recent `delivered_at` over all of the courier's orders.
    pub last_delivered_at: Option<DateTime<Utc>>,
    /// Assigned orders not yet DELIVERED.
    pub active_orders: i64,
    pub postal_prefixes: Vec<PostalPrefix>,
}

impl CourierCandidate {
    pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
        self.is_available
            && self.active_orders == 0
            && self
                .last_delivered_at
                .map_or(true, |at| cooldown_elapsed(at, now))
    }

    pub fn covers(&self, prefix: &PostalPrefix) -> bool {
        self.postal_prefixes.iter().any(|p| p == prefix)
    }
}

/// Picks the courier for a new order, or `None` when nobody is eligible.
///
/// Candidates may arrive in any order; ties always resolve to the lowest id.
pub fn select_courier<'a>(
    candidates: &'a [CourierCandidate],
    prefix: Option<&PostalPrefix>,
    now: DateTime<Utc>,
) -> Option<&'a CourierCandidate> {
    rank_couriers(candidates, prefix, now).into_iter().next()
}

/// Eligible candidates in the order they should be tried.
///
/// Area matches come first, then everyone else; within each group the
/// lowest id wins. The head of this list is the selected courier. When
/// claiming, a candidate that loses its claim is skipped for the next one.
pub fn rank_couriers<'a>(
    candidates: &'a [CourierCandidate],
    prefix: Option<&PostalPrefix>,
    now: DateTime<Utc>,
) -> Vec<&'a CourierCandidate> {
    let mut ranked: Vec<&CourierCandidate> =
        candidates.iter().filter(|c| c.is_eligible(now)).collect();
    // Area matches first, then by id
    ranked.sort_by_key(|c| (!prefix.is_some_and(|p| c.covers(p)), c.id));
    ranked
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 19, 0, 0).unwrap()
    }

    fn prefix(s: &str) -> PostalPrefix {
        PostalPrefix::parse(s).unwrap()
    }

    fn courier(id: i64, areas: &[&str]) -> CourierCandidate {
        CourierCandidate {
            id,
            name: format!("Courier {}", id),
            is_available: true,
            last_delivered_at: None,
            active_orders: 0,
            postal_prefixes: areas.iter().map(|a| prefix(a)).collect(),
        }
    }

    #[test]
    fn test_unavailable_is_not_eligible() {
        let mut c = courier(1, &[]);
        c.is_available = false;
        assert!(!c.is_eligible(now()));
    }

    #[test]
    fn test_recent_delivery_blocks() {
        let mut c = courier(1, &[]);
        c.last_delivered_at = Some(now() - Duration::minutes(29));
        assert!(!c.is_eligible(now()));

        c.last_delivered_at = Some(now() - Duration::minutes(30));
        assert!(c.is_eligible(now()));
    }

    #[test]
    fn test_active_order_blocks() {
        let mut c = courier(1, &[]);
        c.active_orders = 1;
        assert!(!c.is_eligible(now()));
    }

    #[test]
    fn test_prefers_area_match_with_lowest_id() {
        let candidates = vec![courier(3, &["6211"]), courier(1, &["6229"]), courier(2, &["6211"])];
        let chosen = select_courier(&candidates, Some(&prefix("6211")), now()).unwrap();
        assert_eq!(chosen.id, 2);
    }

    #[test]
    fn test_falls_back_to_any_eligible() {
        let candidates = vec![courier(5, &["6229"]), courier(4, &["6229"])];
        let chosen = select_courier(&candidates, Some(&prefix("6211")), now()).unwrap();
        assert_eq!(chosen.id, 4);

        let chosen = select_courier(&candidates, None, now()).unwrap();
        assert_eq!(chosen.id, 4);
    }

    #[test]
    fn test_area_match_in_cooldown_falls_back() {
        let mut local = courier(1, &["6211"]);
        local.last_delivered_at = Some(now() - Duration::minutes(5));
        let candidates = vec![local, courier(2, &["6229"])];

        let chosen = select_courier(&candidates, Some(&prefix("6211")), now()).unwrap();
        assert_eq!(chosen.id, 2);
    }

    #[test]
    fn test_none_eligible() {
        let mut busy = courier(1, &["6211"]);
        busy.active_orders = 2;
        assert!(select_courier(&[busy], Some(&prefix("6211")), now()).is_none());
        assert!(select_courier(&[], None, now()).is_none());
    }

    #[test]
    fn test_rank_puts_area_matches_first() {
        let candidates = vec![courier(1, &["6229"]), courier(3, &["6211"]), courier(2, &["6211"])];
        let ids: Vec<i64> = rank_couriers(&candidates, Some(&prefix("6211")), now())
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![2, 3, 1]);

        let ids: Vec<i64> = rank_couriers(&candidates, None, now())
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
