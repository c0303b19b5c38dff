use serde::Serialize;

pub const GUEST_GENERATION_LIMIT: i64 = 2;
pub const FREE_GENERATION_LIMIT: i64 = 5;
pub const PREMIUM_GENERATION_LIMIT: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageTier {
    Guest,
    Free,
    Premium,
}

impl UsageTier {
    pub fn for_session(is_subscribed: bool) -> Self {
        if is_subscribed {
            Self::Premium
        } else {
            Self::Free
        }
    }

    pub fn ceiling(self) -> i64 {
        match self {
            Self::Guest => GUEST_GENERATION_LIMIT,
            Self::Free => FREE_GENERATION_LIMIT,
            Self::Premium => PREMIUM_GENERATION_LIMIT,
        }
    }

    /// Guest counters live only in the client and reset on reload.
    pub fn is_durable(self) -> bool {
        !matches!(self, Self::Guest)
    }
}

/// `max(0, ceiling - used)`.
pub fn remaining_generations(ceiling: i64, used: i64) -> i64 {
    ceiling.saturating_sub(used.max(0)).max(0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageSnapshot {
    pub tier: UsageTier,
    pub limit: i64,
    pub used: Option<i64>,
    pub remaining: i64,
    pub durable: bool,
}

impl UsageSnapshot {
    pub fn guest() -> Self {
        let tier = UsageTier::Guest;
        Self {
            tier,
            limit: tier.ceiling(),
            used: None,
            remaining: tier.ceiling(),
            durable: false,
        }
    }

    pub fn for_tier(tier: UsageTier, used: i64) -> Self {
        let limit = tier.ceiling();
        Self {
            tier,
            limit,
            used: Some(used),
            remaining: remaining_generations(limit, used),
            durable: tier.is_durable(),
        }
    }
}
