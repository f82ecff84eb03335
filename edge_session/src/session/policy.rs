use super::types::SessionRecord;

/// Default safety window in seconds.
///
/// The refreshed cookies are only seen by the next request, so the refresh
/// has to happen while the old token still has this much validity left.
pub const DEFAULT_REFRESH_WINDOW_SECS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDecision {
    Skip,
    Refresh,
}

/// Per-request view of the session, re-derived from the cookies every time.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    NoSession,
    Valid(SessionRecord),
    ExpiringSoon(SessionRecord),
}

impl SessionState {
    pub fn decision(&self) -> RefreshDecision {
        match self {
            SessionState::ExpiringSoon(_) => RefreshDecision::Refresh,
            SessionState::NoSession | SessionState::Valid(_) => RefreshDecision::Skip,
        }
    }
}

/// `Skip` while more than `window` seconds remain, `Refresh` otherwise.
pub fn evaluate(expires_at: i64, now: i64, window: i64) -> RefreshDecision {
    if expires_at.saturating_sub(now) > window {
        RefreshDecision::Skip
    } else {
        RefreshDecision::Refresh
    }
}

/// Classifies a decoded session. A missing or undecodable session is
/// indistinguishable from an anonymous visitor.
pub fn classify(session: Option<SessionRecord>, now: i64, window: i64) -> SessionState {
    match session {
        None => SessionState::NoSession,
        Some(session) => match evaluate(session.expires_at, now, window) {
            RefreshDecision::Skip => SessionState::Valid(session),
            RefreshDecision::Refresh => SessionState::ExpiringSoon(session),
        },
    }
}
