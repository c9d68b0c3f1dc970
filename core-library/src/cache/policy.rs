use crate::error::{AppError, Result};
use std::time::Duration;

/// Strictly positive time-to-live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ttl(Duration);

impl Ttl {
    /// Rejects a zero duration with [`AppError::InvalidArgument`].
    pub fn new(duration: Duration) -> Result<Self> {
        if duration.is_zero() {
            return Err(AppError::InvalidArgument(
                "cache ttl must be greater than zero".to_string(),
            ));
        }
        Ok(Self(duration))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl TryFrom<Duration> for Ttl {
    type Error = AppError;

    fn try_from(duration: Duration) -> Result<Self> {
        Ttl::new(duration)
    }
}

/// How a call site wants the cache consulted.
///
/// | Policy | read | write on fetch |
/// |---|---|---|
/// | `Never` | always miss | never |
/// | `RefreshAndCache` | always miss | always |
/// | `CacheFirst(ttl)` | hit while younger than `ttl` | always |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CachePolicy {
    Never,
    RefreshAndCache,
    CacheFirst(Ttl),
}

impl CachePolicy {
    /// Shorthand for `CacheFirst(Ttl::new(ttl)?)`.
    pub fn cache_first(ttl: Duration) -> Result<Self> {
        Ok(CachePolicy::CacheFirst(Ttl::new(ttl)?))
    }

    pub(crate) fn reads(&self) -> Option<Duration> {
        match self {
            CachePolicy::CacheFirst(ttl) => Some(ttl.as_duration()),
            CachePolicy::Never | CachePolicy::RefreshAndCache => None,
        }
    }

    pub(crate) fn writes(&self) -> bool {
        !matches!(self, CachePolicy::Never)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_ttl_is_rejected() {
        assert!(matches!(
            CachePolicy::cache_first(Duration::ZERO),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(Ttl::try_from(Duration::ZERO).is_err());
    }

    #[test]
    fn policy_read_write_matrix() {
        let cache_first = CachePolicy::cache_first(Duration::from_secs(30)).unwrap();

        assert_eq!(cache_first.reads(), Some(Duration::from_secs(30)));
        assert!(cache_first.writes());

        assert_eq!(CachePolicy::RefreshAndCache.reads(), None);
        assert!(CachePolicy::RefreshAndCache.writes());

        assert_eq!(CachePolicy::Never.reads(), None);
        assert!(!CachePolicy::Never.writes());
    }
}
