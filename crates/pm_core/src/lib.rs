//! pm_core — core types, token IDs, deterministic ordering, integer ratio
//! math, seeded RNG, and the run status state machine for the
//! reviewer/paper assignment engine.
//!
//! This crate is **I/O-free**. It defines stable types/APIs used across the
//! engine (`pm_io`, `pm_algo`, `pm_pipeline`, `pm_report`, `pm_cli`).
//!
//! - Registry tokens: `ReviewerId`, `PaperId`
//! - Deterministic ordering helpers
//! - Integer-first numerics & ratio helpers (cost scaling)
//! - Seedable RNG (ChaCha20) for ties and the Randomized solver
//! - The run `Status` state machine
//!
//! Serialization derives are gated behind the `serde` feature.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain validation & parsing.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum CoreError {
        InvalidToken,
        InvalidRatio,
        EmptyChoiceSet,
        IllegalTransition,
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::InvalidToken => write!(f, "invalid token"),
                CoreError::InvalidRatio => write!(f, "invalid ratio"),
                CoreError::EmptyChoiceSet => write!(f, "empty choice set"),
                CoreError::IllegalTransition => write!(f, "illegal status transition"),
            }
        }
    }
}

pub mod ids {
    //! Newtypes for reviewer/paper identifiers.

    use crate::errors::CoreError;
    use alloc::string::{String, ToString};
    use core::fmt;
    use core::str::FromStr;

    #[cfg(feature = "serde")]
    use serde::{Deserialize, Serialize};

    fn is_token(s: &str) -> bool {
        let len = s.len();
        if !(1..=128).contains(&len) {
            return false;
        }
        s.bytes()
            .all(|b| matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b':' | b'.' | b'@'))
    }

    macro_rules! def_token {
        ($(#[$m:meta])* $name:ident) => {
            $(#[$m])*
            #[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
            #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
            #[cfg_attr(feature = "serde", serde(transparent))]
            pub struct $name(String);

            impl $name {
                pub fn as_str(&self) -> &str { &self.0 }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
            }

            impl FromStr for $name {
                type Err = CoreError;
                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    if is_token(s) { Ok(Self(s.to_string())) } else { Err(CoreError::InvalidToken) }
                }
            }

            impl From<&str> for $name {
                /// Construct without validation; callers that already hold a
                /// trusted identifier (e.g. echoed back from a prior run) use
                /// this instead of round-tripping through `FromStr`.
                fn from(s: &str) -> Self { Self(s.to_string()) }
            }
        }
    }

    def_token!(
        /// Opaque reviewer identifier.
        ReviewerId
    );
    def_token!(
        /// Opaque paper identifier.
        PaperId
    );
    def_token!(
        /// Opaque match-group identifier (scope for custom-load edges).
        MatchGroupId
    );
}

pub mod determinism {
    //! Stable ordering helpers shared by the encoder, solvers, and decoder.

    use crate::ids::{PaperId, ReviewerId};
    use core::cmp::Ordering;

    /// Types participating in deterministic selections expose a total order key.
    pub trait StableOrd {
        type Key: Ord;
        fn stable_key(&self) -> Self::Key;
    }

    /// Sort reviewer ids ascending (lexicographic) — the stable ordering used
    /// whenever reviewer iteration order would otherwise be incidental.
    pub fn sort_reviewers_by_id(ids: &mut [ReviewerId]) {
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    }

    /// Sort paper ids ascending (lexicographic).
    pub fn sort_papers_by_id(ids: &mut [PaperId]) {
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    }

    /// Compare two `(score, index)` pairs by score descending, then index
    /// ascending — the rule the decoder and the FairSequence solver both use
    /// to break score ties deterministically on input ordering.
    pub fn cmp_score_desc_index_asc(a: (f64, usize), b: (f64, usize)) -> Ordering {
        match b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal) {
            Ordering::Equal => a.1.cmp(&b.1),
            o => o,
        }
    }
}

pub mod rounding {
    //! Integer cost scaling for solvers that require integer arc costs.

    /// Scale applied to a real affinity value before it is cast to an
    /// integer solver cost. Mirrors the retrieved Python original's
    /// `precision=0.01` convention (`int(score_sum / precision)`),
    /// generalized from a single score to the weighted multi-signal
    /// aggregate used here.
    pub const COST_SCALE: f64 = 10_000.0;

    /// Scale a real affinity into an integer cost, rounding to nearest.
    /// Negated because solvers minimize cost while affinity is maximized.
    #[inline]
    pub fn affinity_to_cost(affinity: f64) -> i64 {
        (-affinity * COST_SCALE).round() as i64
    }

    /// Inverse of [`affinity_to_cost`], used only for diagnostics (the
    /// decoder always works from the original `f64` aggregate, never from
    /// the rescaled integer cost).
    #[inline]
    pub fn cost_to_affinity(cost: i64) -> f64 {
        -(cost as f64) / COST_SCALE
    }
}

pub mod rng {
    //! Seeded RNG for tie-breaking and the Randomized solver's dependent
    //! rounding (no OS entropy — every draw must be reproducible from a
    //! configured seed).

    use rand_chacha::ChaCha20Rng;
    use rand_core::{RngCore, SeedableRng};

    /// Newtype over `ChaCha20Rng` for deterministic ties and rounding.
    pub struct MatchRng(ChaCha20Rng);

    /// Create a `MatchRng` from an integer seed.
    pub fn match_rng_from_seed(seed: u64) -> MatchRng {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&seed.to_le_bytes());
        MatchRng(ChaCha20Rng::from_seed(bytes))
    }

    impl MatchRng {
        /// Choose an index in `[0, n)` uniformly using rejection sampling.
        /// Returns `None` on `n == 0`.
        pub fn choose_index(&mut self, n: usize) -> Option<usize> {
            if n == 0 {
                return None;
            }
            let n_u64 = n as u64;
            let zone = u64::MAX - (u64::MAX % n_u64);
            loop {
                let x = self.0.next_u64();
                if x < zone {
                    return Some((x % n_u64) as usize);
                }
            }
        }

        /// Draw a Bernoulli(`p`) trial, `p` clamped to `[0, 1]`. Used by the
        /// dependent-rounding pass to decide each cycle/path coin flip.
        pub fn sample_bernoulli(&mut self, p: f64) -> bool {
            let p = p.clamp(0.0, 1.0);
            let draw = (self.0.next_u64() as f64) / (u64::MAX as f64 + 1.0);
            draw < p
        }

        /// Choose an index with probability proportional to `weights`
        /// (all non-negative, not necessarily normalized). Returns `None`
        /// if `weights` is empty or sums to zero.
        pub fn choose_weighted(&mut self, weights: &[f64]) -> Option<usize> {
            let total: f64 = weights.iter().sum();
            if weights.is_empty() || total <= 0.0 {
                return None;
            }
            let draw = (self.0.next_u64() as f64) / (u64::MAX as f64 + 1.0) * total;
            let mut acc = 0.0;
            for (i, w) in weights.iter().enumerate() {
                acc += w;
                if draw < acc {
                    return Some(i);
                }
            }
            Some(weights.len() - 1)
        }

        /// Expose the underlying RNG for callers that need raw draws.
        pub fn rng_mut(&mut self) -> &mut ChaCha20Rng {
            &mut self.0
        }
    }

    impl Default for MatchRng {
        fn default() -> Self {
            match_rng_from_seed(0)
        }
    }
}

pub mod status {
    //! The run status state machine (spec §4.7/§7).

    use alloc::string::String;

    #[cfg(feature = "serde")]
    use serde::{Deserialize, Serialize};

    /// Lifecycle of a single match run, plus the deployment lane that
    /// follows a completed run.
    #[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub enum Status {
        Initialized,
        Running,
        Complete,
        NoSolution,
        Error,
        Deploying,
        Deployed,
        DeploymentError,
    }

    impl Status {
        /// `true` if `self` is one of the terminal states of the primary
        /// run lane (`Complete`/`NoSolution`/`Error`) or the deployment
        /// lane (`Deployed`/`DeploymentError`).
        pub fn is_terminal(self) -> bool {
            matches!(
                self,
                Status::Complete
                    | Status::NoSolution
                    | Status::Error
                    | Status::Deployed
                    | Status::DeploymentError
            )
        }
    }

    /// Monotonicity guard: a delayed or duplicated status publish must
    /// never move a configuration's recorded state backwards (spec §5).
    ///
    /// `Complete` additionally permits the deployment lane
    /// (`Complete -> Deploying -> {Deployed, DeploymentError}`).
    pub fn can_transition(from: Status, to: Status) -> bool {
        use Status::*;
        match (from, to) {
            (a, b) if a == b => true,
            (Initialized, Running) => true,
            (Initialized, Error) => true,
            (Running, Complete) => true,
            (Running, NoSolution) => true,
            (Running, Error) => true,
            (Complete, Deploying) => true,
            (Deploying, Deployed) => true,
            (Deploying, DeploymentError) => true,
            _ => false,
        }
    }

    #[derive(Clone, Debug)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct StatusRecord {
        pub status: Status,
        pub error_message: Option<String>,
    }

}

#[cfg(test)]
mod tests {
    use super::determinism::{sort_papers_by_id, sort_reviewers_by_id};
    use super::ids::{PaperId, ReviewerId};
    use super::rng::match_rng_from_seed;
    use super::rounding::{affinity_to_cost, COST_SCALE};
    use core::str::FromStr;

    #[test]
    fn token_parse_roundtrip() {
        let r = ReviewerId::from_str("reviewer~1").err();
        assert!(r.is_some(), "tilde is not a valid token character");
        let r = ReviewerId::from_str("reviewer_1").unwrap();
        assert_eq!(r.as_str(), "reviewer_1");
    }

    #[test]
    fn stable_sort_is_lexicographic() {
        let mut rs: Vec<ReviewerId> = ["r10", "r2", "a1"]
            .iter()
            .map(|s| ReviewerId::from_str(s).unwrap())
            .collect();
        sort_reviewers_by_id(&mut rs);
        let got: Vec<&str> = rs.iter().map(|r| r.as_str()).collect();
        assert_eq!(got, vec!["a1", "r10", "r2"]);

        let mut ps: Vec<PaperId> = ["p2", "p1"].iter().map(|s| PaperId::from_str(s).unwrap()).collect();
        sort_papers_by_id(&mut ps);
        assert_eq!(ps[0].as_str(), "p1");
    }

    #[test]
    fn affinity_to_cost_preserves_ordering() {
        let c_high = affinity_to_cost(0.9);
        let c_low = affinity_to_cost(0.1);
        assert!(c_high < c_low, "higher affinity must map to lower cost");
        assert_eq!(affinity_to_cost(0.0), 0);
        assert_eq!(COST_SCALE, 10_000.0);
    }

    #[test]
    fn match_rng_is_deterministic_given_same_seed() {
        let mut a = match_rng_from_seed(42);
        let mut b = match_rng_from_seed(42);
        let seq_a: Vec<usize> = (0..32).map(|_| a.choose_index(7).unwrap()).collect();
        let seq_b: Vec<usize> = (0..32).map(|_| b.choose_index(7).unwrap()).collect();
        assert_eq!(seq_a, seq_b);
    }
}
