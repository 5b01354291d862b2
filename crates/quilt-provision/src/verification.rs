//! Attempt-scoped licensee-verification state.
//!
//! One [`VerificationState`] exists per gateway attempt. The cloud may
//! deliver the challenge and the iteration count in either order, in
//! one notification or two; verification becomes due only once both
//! have arrived, and runs at most once per attempt. Writing the
//! computed hash can itself fire a spurious notification on the watched
//! identity object, and the one-shot guard keeps that from looping.

use quilt_core::PathSet;
use quilt_store::ChangeSet;

/// Phases of a gateway provisioning attempt, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptPhase {
    Idle,
    PopulatingIdentity,
    AwaitingChallenge,
    VerifyingLicensee,
    AwaitingAccessGrant,
    Provisioned,
    TimedOut,
}

impl AttemptPhase {
    pub fn name(&self) -> &'static str {
        match self {
            AttemptPhase::Idle => "IDLE",
            AttemptPhase::PopulatingIdentity => "POPULATING_IDENTITY",
            AttemptPhase::AwaitingChallenge => "AWAITING_CHALLENGE",
            AttemptPhase::VerifyingLicensee => "VERIFYING_LICENSEE",
            AttemptPhase::AwaitingAccessGrant => "AWAITING_ACCESS_GRANT",
            AttemptPhase::Provisioned => "PROVISIONED",
            AttemptPhase::TimedOut => "TIMED_OUT",
        }
    }
}

/// Whether the licensee proof should be computed now.
pub fn verification_due(
    has_challenge: bool,
    has_iterations: bool,
    verified: bool,
    waiting: bool,
) -> bool {
    waiting && has_challenge && has_iterations && !verified
}

/// Whether a change set carries the complete access credential grant:
/// all five resources present with a nonzero token expiry.
pub fn access_grant_complete(change: &ChangeSet, paths: &PathSet) -> bool {
    paths
        .access_resources()
        .iter()
        .all(|path| change.has_value(path))
        && change
            .get(&paths.token_expiry)
            .and_then(|value| value.as_integer())
            .is_some_and(|expiry| expiry != 0)
}

/// Mutable state of one gateway verification exchange.
#[derive(Debug)]
#[must_use]
pub struct VerificationState {
    challenge: Option<Vec<u8>>,
    iterations: Option<i64>,
    waiting: bool,
    verified: bool,
    succeeded: bool,
}

impl VerificationState {
    pub fn new() -> Self {
        Self {
            challenge: None,
            iterations: None,
            waiting: true,
            verified: false,
            succeeded: false,
        }
    }

    /// Still waiting on the cloud.
    pub fn waiting(&self) -> bool {
        self.waiting
    }

    /// The access grant arrived complete.
    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    /// Absorb an identity-object notification, capturing whichever of
    /// the challenge and iteration count it carries.
    pub fn absorb_identity(&mut self, change: &ChangeSet, paths: &PathSet) {
        if let Some(challenge) = change
            .get(&paths.licensee_challenge)
            .and_then(|value| value.as_bytes())
            && !challenge.is_empty()
        {
            self.challenge = Some(challenge.to_vec());
        }
        if let Some(iterations) = change
            .get(&paths.hash_iterations)
            .and_then(|value| value.as_integer())
        {
            self.iterations = Some(iterations);
        }
    }

    /// The challenge and iteration count, once verification is due and
    /// has not yet run this attempt.
    pub fn verification_inputs(&self) -> Option<(&[u8], i64)> {
        if !verification_due(
            self.challenge.is_some(),
            self.iterations.is_some(),
            self.verified,
            self.waiting,
        ) {
            return None;
        }
        Some((self.challenge.as_deref()?, self.iterations?))
    }

    /// Arm the one-shot guard after the hash has been written back.
    pub fn mark_verified(&mut self) {
        self.verified = true;
    }

    /// Absorb an access-object notification. Any access notification
    /// ends the wait; only a complete credential grant counts as
    /// success.
    pub fn absorb_access(&mut self, change: &ChangeSet, paths: &PathSet) {
        if access_grant_complete(change, paths) {
            self.succeeded = true;
        }
        self.waiting = false;
    }
}

impl Default for VerificationState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quilt_core::Value;

    fn paths() -> PathSet {
        PathSet::new()
    }

    fn identity_change(challenge: Option<&[u8]>, iterations: Option<i64>) -> ChangeSet {
        let paths = paths();
        let mut change = ChangeSet::new();
        if let Some(challenge) = challenge {
            change.insert(paths.licensee_challenge, Value::from(challenge.to_vec()));
        }
        if let Some(iterations) = iterations {
            change.insert(paths.hash_iterations, Value::from(iterations));
        }
        change
    }

    fn full_grant() -> ChangeSet {
        let paths = paths();
        let mut change = ChangeSet::new();
        change.insert(paths.url, Value::from("https://cloud.example"));
        change.insert(paths.customer_key, Value::from("key"));
        change.insert(paths.customer_secret, Value::from("secret"));
        change.insert(paths.remember_me_token, Value::from("token"));
        change.insert(paths.token_expiry, Value::from(1_700_000_000i64));
        change
    }

    // -----------------------------------------------------------------------
    // verification_due
    // -----------------------------------------------------------------------

    #[test]
    fn due_requires_both_fields() {
        assert!(!verification_due(false, false, false, true));
        assert!(!verification_due(true, false, false, true));
        assert!(!verification_due(false, true, false, true));
        assert!(verification_due(true, true, false, true));
    }

    #[test]
    fn due_is_one_shot_and_wait_gated() {
        assert!(!verification_due(true, true, true, true));
        assert!(!verification_due(true, true, false, false));
    }

    // -----------------------------------------------------------------------
    // arrival ordering
    // -----------------------------------------------------------------------

    #[test]
    fn challenge_then_iterations() {
        let paths = paths();
        let mut state = VerificationState::new();

        state.absorb_identity(&identity_change(Some(b"nonce"), None), &paths);
        assert!(state.verification_inputs().is_none());

        state.absorb_identity(&identity_change(None, Some(4)), &paths);
        let (challenge, iterations) = state.verification_inputs().unwrap();
        assert_eq!(challenge, b"nonce");
        assert_eq!(iterations, 4);
    }

    #[test]
    fn iterations_then_challenge() {
        let paths = paths();
        let mut state = VerificationState::new();

        state.absorb_identity(&identity_change(None, Some(4)), &paths);
        assert!(state.verification_inputs().is_none());

        state.absorb_identity(&identity_change(Some(b"nonce"), None), &paths);
        assert!(state.verification_inputs().is_some());
    }

    #[test]
    fn both_in_one_notification() {
        let paths = paths();
        let mut state = VerificationState::new();
        state.absorb_identity(&identity_change(Some(b"nonce"), Some(7)), &paths);
        assert_eq!(state.verification_inputs().unwrap().1, 7);
    }

    #[test]
    fn empty_challenge_is_ignored() {
        let paths = paths();
        let mut state = VerificationState::new();
        state.absorb_identity(&identity_change(Some(b""), Some(4)), &paths);
        assert!(state.verification_inputs().is_none());
    }

    #[test]
    fn verification_runs_at_most_once() {
        let paths = paths();
        let mut state = VerificationState::new();
        state.absorb_identity(&identity_change(Some(b"nonce"), Some(4)), &paths);
        assert!(state.verification_inputs().is_some());

        state.mark_verified();
        assert!(state.verification_inputs().is_none());

        // A spurious re-notification of the same fields must not re-arm.
        state.absorb_identity(&identity_change(Some(b"nonce"), Some(4)), &paths);
        assert!(state.verification_inputs().is_none());
    }

    // -----------------------------------------------------------------------
    // access grant
    // -----------------------------------------------------------------------

    #[test]
    fn complete_grant_succeeds_and_ends_wait() {
        let paths = paths();
        let mut state = VerificationState::new();
        state.absorb_access(&full_grant(), &paths);
        assert!(!state.waiting());
        assert!(state.succeeded());
    }

    #[test]
    fn incomplete_grant_ends_wait_without_success() {
        let paths = paths();
        let mut change = full_grant();
        // Rebuild without the token resource.
        let mut partial = ChangeSet::new();
        for (path, value) in change.iter() {
            if *path != paths.remember_me_token {
                partial.insert(*path, value.clone());
            }
        }
        change = partial;

        let mut state = VerificationState::new();
        state.absorb_access(&change, &paths);
        assert!(!state.waiting());
        assert!(!state.succeeded());
    }

    #[test]
    fn zero_expiry_is_not_a_grant() {
        let paths = paths();
        let mut change = full_grant();
        change.insert(paths.token_expiry, Value::from(0i64));
        assert!(!access_grant_complete(&change, &paths));
    }

    #[test]
    fn phase_names_are_distinct() {
        let phases = [
            AttemptPhase::Idle,
            AttemptPhase::PopulatingIdentity,
            AttemptPhase::AwaitingChallenge,
            AttemptPhase::VerifyingLicensee,
            AttemptPhase::AwaitingAccessGrant,
            AttemptPhase::Provisioned,
            AttemptPhase::TimedOut,
        ];
        let mut names: Vec<_> = phases.iter().map(|p| p.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), phases.len());
    }
}
