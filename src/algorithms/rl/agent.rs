//! Tabular Q-learning agent shared by every concurrent match.
//!
//! The agent owns the action-value table and the exploration schedule. It is
//! created uninitialized; the first call to [`ReinforcementAgent::select_action`]
//! or [`ReinforcementAgent::update`] either loads the persisted table or
//! populates a zero table, exactly once even when many threads race on it.
//!
//! # Locking
//!
//! - Table: reader/writer lock. Selection and persistence read; the update
//!   rule writes.
//! - Exploration schedule: its own mutex, never held together with the table
//!   lock.
//! - Persistence: a mutex serializing saves so snapshots land in call order.
//!
//! Poisoned locks are recovered rather than propagated: a panic in one match
//! must not disable the agent for every other match.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rand::{Rng, RngCore};
use tracing::{debug, info, warn};

use super::config::EngineConfig;
use super::exploration::ExplorationSchedule;
use super::observation::StateEncoder;
use super::policy::{Policy, RandomPolicy};
use super::q_table::ActionValueTable;
use super::reward::RewardComputer;
use super::types::{Action, ActionValues, StateKey};
use crate::combatant::Combatant;
use crate::error::DecisionError;

/// Where the agent's table came from when it became ready.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    /// No persisted table was configured or found; a zero table was built.
    Fresh,
    /// The table was loaded from this path.
    Loaded(PathBuf),
    /// Loading failed; a zero table was built instead.
    Recovered { reason: String },
    /// The table was supplied by the caller.
    Provided,
}

/// Point-in-time counters describing the agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentStats {
    /// Current explore rate.
    pub explore_rate: f64,
    /// Explore steps taken so far.
    pub explore_steps: u64,
    /// Decisions made by the agent.
    pub decisions: u64,
    /// Temporal-difference updates applied.
    pub updates: u64,
    /// Table initializations performed (0 before first use, then 1).
    pub initializations: u64,
    /// Automatic saves that failed.
    pub persist_failures: u64,
}

#[derive(Debug)]
struct ReadyState {
    table: RwLock<ActionValueTable>,
    source: TableSource,
}

/// Q-learning agent with epsilon-greedy exploration.
#[derive(Debug)]
pub struct ReinforcementAgent {
    learning_rate: f64,
    discount: f64,
    training: bool,
    table_path: Option<PathBuf>,
    persist_every: u64,

    state: OnceLock<ReadyState>,
    exploration: Mutex<ExplorationSchedule>,
    persist_lock: Mutex<()>,

    decisions: AtomicU64,
    updates: AtomicU64,
    initializations: AtomicU64,
    persist_failures: AtomicU64,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(l: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    l.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(l: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    l.write().unwrap_or_else(PoisonError::into_inner)
}

impl ReinforcementAgent {
    /// Creates an uninitialized agent from the engine configuration.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            learning_rate: config.learning_rate,
            discount: config.discount,
            training: config.training,
            table_path: config.table_path.clone(),
            persist_every: config.persist_every,
            state: OnceLock::new(),
            exploration: Mutex::new(ExplorationSchedule::new(config.explore_rate)),
            persist_lock: Mutex::new(()),
            decisions: AtomicU64::new(0),
            updates: AtomicU64::new(0),
            initializations: AtomicU64::new(0),
            persist_failures: AtomicU64::new(0),
        }
    }

    /// Creates an agent that starts ready with the given table.
    pub fn with_table(config: &EngineConfig, table: ActionValueTable) -> Self {
        let agent = Self::new(config);
        agent.initializations.store(1, Ordering::Relaxed);
        let _ = agent.state.set(ReadyState {
            table: RwLock::new(table),
            source: TableSource::Provided,
        });
        agent
    }

    /// Makes the agent ready if it is not yet, and reports the table's origin.
    ///
    /// Only the first caller performs the transition; concurrent callers
    /// block until it completes.
    pub fn initialize(&self) -> &TableSource {
        &self.ready().source
    }

    fn ready(&self) -> &ReadyState {
        self.state.get_or_init(|| {
            self.initializations.fetch_add(1, Ordering::Relaxed);
            let (table, source) = self.load_or_fresh();
            info!(?source, "action-value table initialized");
            ReadyState {
                table: RwLock::new(table),
                source,
            }
        })
    }

    fn load_or_fresh(&self) -> (ActionValueTable, TableSource) {
        let Some(path) = self.table_path.as_deref() else {
            return (ActionValueTable::zeroed(), TableSource::Fresh);
        };
        // Only a missing file means "no table yet"; any other metadata
        // error is reported through the load below.
        if let Err(e) = std::fs::metadata(path) {
            if e.kind() == io::ErrorKind::NotFound {
                return (ActionValueTable::zeroed(), TableSource::Fresh);
            }
        }
        match ActionValueTable::load(path) {
            Ok(table) => (table, TableSource::Loaded(path.to_path_buf())),
            Err(e) => {
                warn!(error = %e, "falling back to a fresh action-value table");
                (
                    ActionValueTable::zeroed(),
                    TableSource::Recovered {
                        reason: e.to_string(),
                    },
                )
            }
        }
    }

    /// Chooses an action for `own` facing `opponent`.
    pub fn select_action(
        &self,
        own: &Combatant,
        opponent: &Combatant,
        rng: &mut dyn RngCore,
    ) -> Result<Action, DecisionError> {
        let key = StateEncoder::encode(own, opponent)?;
        Ok(self.select_for_state(key, rng))
    }

    /// Chooses an action for an already encoded state.
    ///
    /// With probability equal to the explore rate a uniform action is taken
    /// and the schedule decays; otherwise the first action with the highest
    /// value in the table is returned.
    pub fn select_for_state(&self, key: StateKey, rng: &mut dyn RngCore) -> Action {
        let state = self.ready();
        let decision = self.decisions.fetch_add(1, Ordering::Relaxed) + 1;
        if self.persist_due(decision) {
            if let Err(e) = self.save(state) {
                self.persist_failures.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, "failed to persist action-value table");
            }
        }

        let explore = {
            let mut schedule = lock(&self.exploration);
            let u: f64 = rng.gen();
            let explore = schedule.should_explore(u);
            if explore {
                schedule.record_explore();
            }
            explore
        };

        let action = if explore {
            RandomPolicy::sample(rng)
        } else {
            read(&state.table).best_action(key)
        };
        debug!(state = %key, %action, explore, "reinforcement decision");
        action
    }

    /// The first decision only initializes; later ones save on the cadence.
    fn persist_due(&self, decision: u64) -> bool {
        self.table_path.is_some()
            && self.persist_every > 0
            && decision > 1
            && (decision - 1) % self.persist_every == 0
    }

    /// Applies one temporal-difference update for a completed round.
    ///
    /// Returns the reward used, or `None` when training is disabled (in which
    /// case nothing happens).
    pub fn update(&self, prior: StateKey, next: StateKey, action: Action) -> Option<f64> {
        if !self.training {
            return None;
        }
        let state = self.ready();
        let reward = RewardComputer::compute(prior, next);

        let (old, future) = {
            let table = read(&state.table);
            (table.value(prior, action), table.max_value(next))
        };
        let new = old + self.learning_rate * (reward + self.discount * future - old);
        write(&state.table).set(prior, action, new);
        self.updates.fetch_add(1, Ordering::Relaxed);

        debug!(
            state = %prior,
            next = %next,
            %action,
            reward,
            old,
            new,
            "q-value updated"
        );
        Some(reward)
    }

    /// Encodes both snapshot pairs and applies [`ReinforcementAgent::update`].
    pub fn observe(
        &self,
        before: (&Combatant, &Combatant),
        action: Action,
        after: (&Combatant, &Combatant),
    ) -> Result<Option<f64>, DecisionError> {
        let prior = StateEncoder::encode(before.0, before.1)?;
        let next = StateEncoder::encode(after.0, after.1)?;
        Ok(self.update(prior, next, action))
    }

    /// Current value vector of a state.
    pub fn q_values(&self, key: StateKey) -> ActionValues {
        *read(&self.ready().table).values(key)
    }

    /// Saves the table to the configured path now.
    ///
    /// Does nothing when no path is configured. A failure leaves the
    /// in-memory table untouched.
    pub fn persist(&self) -> Result<(), DecisionError> {
        self.save(self.ready())
    }

    fn save(&self, state: &ReadyState) -> Result<(), DecisionError> {
        let Some(path) = self.table_path.as_deref() else {
            return Ok(());
        };
        let _serial = lock(&self.persist_lock);
        read(&state.table).save(path)
    }

    /// Configured table path, if any.
    pub fn table_path(&self) -> Option<&Path> {
        self.table_path.as_deref()
    }

    /// Origin of the table, or `None` before initialization.
    pub fn table_source(&self) -> Option<&TableSource> {
        self.state.get().map(|s| &s.source)
    }

    /// Snapshot of the agent's counters.
    pub fn stats(&self) -> AgentStats {
        let schedule = *lock(&self.exploration);
        AgentStats {
            explore_rate: schedule.rate(),
            explore_steps: schedule.steps(),
            decisions: self.decisions.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            initializations: self.initializations.load(Ordering::Relaxed),
            persist_failures: self.persist_failures.load(Ordering::Relaxed),
        }
    }
}

impl Policy for ReinforcementAgent {
    fn select_action(
        &self,
        own: &Combatant,
        opponent: &Combatant,
        rng: &mut dyn RngCore,
    ) -> Result<Action, DecisionError> {
        ReinforcementAgent::select_action(self, own, opponent, rng)
    }

    fn name(&self) -> &str {
        "reinforcement"
    }
}
