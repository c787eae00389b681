//! Self-play training driver.
//!
//! Plays many matches between an engine-controlled combatant and a uniformly
//! random opponent, in parallel, so a reinforcement engine can fill its table
//! without a live client. Combat arithmetic is supplied by the caller through
//! [`CombatResolver`].

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use super::policy::RandomPolicy;
use super::types::Action;
use crate::combatant::{CombatClass, Combatant};
use crate::engine::DecisionEngine;
use crate::error::DecisionError;

/// Applies one round of combat: both actions resolved against both fighters.
///
/// Implementations own all damage, healing and armor arithmetic; the engine
/// only sees the resulting snapshots.
pub trait CombatResolver: Sync {
    fn resolve(
        &self,
        own: &mut Combatant,
        opponent: &mut Combatant,
        own_action: Action,
        opponent_action: Action,
        rng: &mut dyn RngCore,
    );
}

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error(transparent)]
    Decision(#[from] DecisionError),

    #[error("Failed to build training thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Parameters of a training run.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Matches to play.
    pub matches: usize,
    /// Worker threads; `None` uses rayon's global pool.
    pub jobs: Option<usize>,
    /// Rounds after which an undecided match is abandoned.
    pub max_rounds: u32,
    /// Base seed; match `i` uses `seed + i`.
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            matches: 1_000,
            jobs: None,
            max_rounds: 200,
            seed: 42,
        }
    }
}

/// How a single match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    OwnWin,
    OpponentWin,
    Draw,
    Unfinished,
}

/// Outcome of one match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOutcome {
    pub result: MatchResult,
    pub rounds: u32,
    /// Sum of rewards the engine learned from (0 when not training).
    pub reward: f64,
}

/// Aggregated results of a training run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingReport {
    pub matches: usize,
    pub rounds: u64,
    pub own_wins: usize,
    pub opponent_wins: usize,
    pub draws: usize,
    pub unfinished: usize,
    pub total_reward: f64,
}

impl TrainingReport {
    fn record(&mut self, outcome: &MatchOutcome) {
        self.matches += 1;
        self.rounds += u64::from(outcome.rounds);
        self.total_reward += outcome.reward;
        match outcome.result {
            MatchResult::OwnWin => self.own_wins += 1,
            MatchResult::OpponentWin => self.opponent_wins += 1,
            MatchResult::Draw => self.draws += 1,
            MatchResult::Unfinished => self.unfinished += 1,
        }
    }

    /// Fraction of matches the engine won.
    pub fn win_rate(&self) -> f64 {
        if self.matches == 0 {
            0.0
        } else {
            self.own_wins as f64 / self.matches as f64
        }
    }
}

/// Runs matches against a shared [`DecisionEngine`].
pub struct Trainer<'a, R: CombatResolver> {
    engine: &'a DecisionEngine,
    resolver: &'a R,
    config: TrainingConfig,
}

impl<'a, R: CombatResolver> Trainer<'a, R> {
    pub fn new(engine: &'a DecisionEngine, resolver: &'a R, config: TrainingConfig) -> Self {
        Self {
            engine,
            resolver,
            config,
        }
    }

    /// Plays every configured match and aggregates the outcomes.
    ///
    /// Matches run in parallel and share the engine. The first failing match
    /// aborts the report.
    pub fn run(&self) -> Result<TrainingReport, TrainingError> {
        info!(
            matches = self.config.matches,
            strategy = %self.engine.strategy(),
            "training run started"
        );
        let play = |i: &usize| {
            let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(*i as u64));
            self.play_match(&mut rng)
        };
        let indices: Vec<usize> = (0..self.config.matches).collect();

        let outcomes: Vec<Result<MatchOutcome, DecisionError>> = match self.config.jobs {
            Some(jobs) => {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
                pool.install(|| indices.par_iter().map(play).collect())
            }
            None => indices.par_iter().map(play).collect(),
        };

        let mut report = TrainingReport::default();
        for outcome in outcomes {
            report.record(&outcome?);
        }
        info!(
            matches = report.matches,
            own_wins = report.own_wins,
            rounds = report.rounds,
            "training run finished"
        );
        Ok(report)
    }

    /// Plays one match between freshly spawned fighters of random classes.
    pub fn play_match(&self, rng: &mut dyn RngCore) -> Result<MatchOutcome, DecisionError> {
        let classes = CombatClass::all();
        let mut own = classes[rng.gen_range(0..classes.len())].spawn(rng);
        let mut opponent = classes[rng.gen_range(0..classes.len())].spawn(rng);
        let mut reward = 0.0;

        for round in 1..=self.config.max_rounds {
            let opponent_action = RandomPolicy::sample(rng);
            let own_action = self.engine.decide_with(&own, &opponent, rng)?;

            let before = (own.clone(), opponent.clone());
            self.resolver
                .resolve(&mut own, &mut opponent, own_action, opponent_action, rng);
            if let Some(r) =
                self.engine
                    .observe((&before.0, &before.1), own_action, (&own, &opponent))?
            {
                reward += r;
            }

            let result = match (own.is_defeated(), opponent.is_defeated()) {
                (false, false) => continue,
                (false, true) => MatchResult::OwnWin,
                (true, false) => MatchResult::OpponentWin,
                (true, true) => MatchResult::Draw,
            };
            debug!(?result, round, "match finished");
            return Ok(MatchOutcome {
                result,
                rounds: round,
                reward,
            });
        }

        Ok(MatchOutcome {
            result: MatchResult::Unfinished,
            rounds: self.config.max_rounds,
            reward,
        })
    }
}
