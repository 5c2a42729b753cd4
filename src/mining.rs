// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Assembling and running a mining search.
//!
//! A [`Miner`] turns a validated [`MiningConfig`] into a search program
//!
//! ```text
//! Propagate, Branch (rounds), Count(leaves), Solution, Fail
//! ```
//!
//! over a [`SearchContext`] whose propagators encode the task:
//!
//! | Task | Propagators |
//! |------|-------------|
//! | all | cover size, measure bounds |
//! | closed | cover size, cover or adequate closure |
//! | generators | cover size, generator |
//! | maximal | cover size `[s, ∞)`, infrequent supersets, cover closure |
//! | minimal infrequent | cover size `[0, s)`, frequent subsets, generator |
//! | skyline | cover size, closure for M′, skyline pruner |
//!
//! # Parallel search
//!
//! [`Miner::run_partitioned`] splits the search space by the smallest
//! present item: branch `k` has items `0..k` absent and `k` present, plus one
//! branch for the empty pattern. Branches are independent, so each runs in
//! its own context over the shared store.

use crate::config::{MiningConfig, ResolvedConfig, Task};
use crate::context::SearchContext;
use crate::engine::EngineBuilder;
use crate::error::{ConfigError, MiningError};
use crate::measure::operand::closure_measures;
use crate::measure::{Measure, MeasureComputer, MeasureRegistry};
use crate::monitor::{OverlapMonitor, PatternCollector};
use crate::pattern::Pattern;
use crate::predicates::{BranchPredicate, FailPredicate, PropagatePredicate, SolutionPredicate};
use crate::propagation::{
    AdequateClosure, CoverClosure, CoverSize, FrequentSubsets, Generator, InfrequentSupersets,
    ItemState, MeasureBounds, Overlap, OverlapHistory, PropagationFailure,
};
use crate::rules::{derive_rules, AssociationRule};
use crate::skyline::{SharedSkyline, Skyline, SkylineMember, SkylineMonitor, SkylinePruner};
use crate::state::{Counters, Statistics};
use crate::store::TransactionStore;
use crate::trail::Trail;
use serde::Serialize;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, info};

/// Closedness enforced by a run.
#[derive(Debug, Clone, PartialEq)]
enum Closure {
    None,
    Cover,
    Adequate(Vec<Measure>),
}

impl Closure {
    fn over(measures: Vec<Measure>) -> Self {
        if measures == [Measure::Freq] {
            Closure::Cover
        } else {
            Closure::Adequate(measures)
        }
    }
}

/// One independent part of the search space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    Everything,
    /// Items below this one absent, this one present.
    SmallestItem(usize),
    /// Every item absent.
    Empty,
}

/// What one branch found.
#[derive(Debug)]
struct Partial {
    patterns: Vec<Pattern>,
    skyline: Option<Skyline>,
    statistics: Statistics,
    complete: bool,
}

/// Outcome of a mining run.
#[derive(Debug, Clone, Serialize)]
pub struct MiningResult {
    /// Solutions sorted by items; for skyline mining, the final frontier.
    pub patterns: Vec<Pattern>,
    pub skyline: Option<Vec<SkylineMember>>,
    pub statistics: Statistics,
    pub rules: Vec<AssociationRule>,
    /// False when the search stopped at `max_solutions`.
    pub complete: bool,
}

/// A validated configuration bound to a store.
#[derive(Debug)]
pub struct Miner {
    config: MiningConfig,
    resolved: ResolvedConfig,
    closure: Closure,
    store: Arc<TransactionStore>,
}

impl Miner {
    pub fn new(config: MiningConfig, store: Arc<TransactionStore>) -> Result<Self, MiningError> {
        let resolved = config.validate(&MeasureRegistry::new(&store))?;
        let closure = match config.task {
            Task::Closed if resolved.closed.is_empty() => Closure::Cover,
            Task::Closed => Closure::over(resolved.closed.clone()),
            Task::Maximal => Closure::Cover,
            Task::Skyline => {
                let objectives: Vec<_> = resolved
                    .objectives
                    .iter()
                    .map(|o| (o.measure, o.direction))
                    .collect();
                let measures: Vec<Measure> = closure_measures(&objectives).into_iter().collect();
                if measures.is_empty() || !measures.iter().all(Measure::is_closable) {
                    debug!(?measures, "skyline search without closure");
                    Closure::None
                } else {
                    debug!(?measures, "skyline search closed for measures");
                    Closure::over(measures)
                }
            }
            _ => Closure::None,
        };
        if let Closure::Adequate(measures) = &closure {
            closure_computers(measures, &store, &mut Trail::new())?;
        }
        Ok(Self {
            config,
            resolved,
            closure,
            store,
        })
    }

    pub fn config(&self) -> &MiningConfig {
        &self.config
    }

    pub fn resolved(&self) -> &ResolvedConfig {
        &self.resolved
    }

    pub fn store(&self) -> &Arc<TransactionStore> {
        &self.store
    }

    /// Explore the whole search space in this thread.
    pub fn run(&self) -> MiningResult {
        self.log_start(1);
        let result = self.finish(vec![self.search(Branch::Everything)]);
        self.log_end(&result);
        result
    }

    /// Explore the search space on up to `threads` threads.
    ///
    /// Every branch gets its own solution limit and overlap history, so with
    /// `max_solutions` or `overlap` set the result can differ from [`Self::run`].
    pub fn run_partitioned(&self, threads: usize) -> MiningResult {
        let branches: Vec<Branch> = (0..self.store.nb_items())
            .map(Branch::SmallestItem)
            .chain([Branch::Empty])
            .collect();
        let threads = threads.clamp(1, branches.len());
        self.log_start(threads);

        let partials: Vec<Partial> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..threads)
                .map(|worker| {
                    let mine: Vec<Branch> =
                        branches.iter().copied().skip(worker).step_by(threads).collect();
                    scope.spawn(move || {
                        mine.into_iter()
                            .map(|branch| self.search(branch))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            workers
                .into_iter()
                .flat_map(|worker| {
                    worker
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        });

        let result = self.finish(partials);
        self.log_end(&result);
        result
    }

    fn log_start(&self, threads: usize) {
        info!(
            task = %self.config.task,
            items = self.store.nb_items(),
            transactions = self.store.nb_transactions(),
            threads,
            "mining started"
        );
    }

    fn log_end(&self, result: &MiningResult) {
        info!(
            patterns = result.patterns.len(),
            nodes = result.statistics.get(Counters::Nodes),
            failures = result.statistics.total_failures(),
            complete = result.complete,
            "mining finished"
        );
    }

    fn search(&self, branch: Branch) -> Partial {
        let mut ctx = SearchContext::new(Arc::clone(&self.store));
        if let Err(failure) = enter_branch(&mut ctx, branch) {
            debug!(?branch, %failure, "branch is empty");
            return Partial {
                patterns: Vec::new(),
                skyline: None,
                statistics: ctx.statistics,
                complete: true,
            };
        }

        let collector = PatternCollector::new();
        let collected = collector.patterns();
        ctx.add_monitor(Box::new(collector));
        self.add_task_propagators(&mut ctx);
        let skyline = self.add_skyline(&mut ctx);
        self.add_thresholds(&mut ctx);
        self.add_overlap(&mut ctx);

        let branching =
            BranchPredicate::new(self.config.item_order, self.config.present_first);
        let solution = SolutionPredicate::new(
            self.resolved.thresholds.clone(),
            self.config.allow_empty,
            self.config.max_solutions,
        );
        let engine = EngineBuilder::new()
            .add(Box::new(PropagatePredicate))
            .add(Box::new(branching))
            .add(Statistics::counting_predicate(Counters::Leaves, None))
            .add(Box::new(solution))
            .terminal(Box::new(FailPredicate))
            .build();
        let complete = engine.search(&mut ctx).is_none();

        let patterns = collected.take();
        let skyline = skyline.map(|shared| {
            let objectives = shared.borrow().objectives().to_vec();
            shared.replace(Skyline::new(objectives))
        });
        debug!(?branch, solutions = patterns.len(), complete, "branch done");
        Partial {
            patterns,
            skyline,
            statistics: ctx.statistics,
            complete,
        }
    }

    fn add_task_propagators(&self, ctx: &mut SearchContext) {
        let (min, max) = (self.resolved.min_frequency, self.resolved.max_frequency);
        match self.config.task {
            Task::Maximal => {
                ctx.add_propagator(|_, _| Box::new(CoverSize::new(min, max)));
                ctx.add_propagator(|_, _| Box::new(InfrequentSupersets::new(min)));
            }
            Task::MinimalInfrequent => {
                // min > 0 after validation.
                ctx.add_propagator(|_, _| Box::new(CoverSize::new(0, min - 1)));
                ctx.add_propagator(|_, _| Box::new(FrequentSubsets::new(min)));
                ctx.add_propagator(|_, _| Box::new(Generator::new()));
            }
            task => {
                if min > 0 || max < self.store.nb_transactions() {
                    ctx.add_propagator(|_, _| Box::new(CoverSize::new(min, max)));
                }
                if task == Task::Generators {
                    ctx.add_propagator(|_, _| Box::new(Generator::new()));
                }
            }
        }

        match &self.closure {
            Closure::None => {}
            Closure::Cover => {
                ctx.add_propagator(|_, _| Box::new(CoverClosure::new()));
            }
            Closure::Adequate(measures) => {
                let computers = match closure_computers(measures, &ctx.store, &mut ctx.trail) {
                    Ok(computers) => computers,
                    Err(err) => panic!("closure measures are checked by Miner::new: {err}"),
                };
                let consistency = self.config.closure;
                ctx.add_propagator(|trail, store| {
                    Box::new(
                        AdequateClosure::new(trail, store, computers, consistency)
                            .with_min_frequency(min),
                    )
                });
            }
        }
    }

    fn add_skyline(&self, ctx: &mut SearchContext) -> Option<SharedSkyline> {
        if self.config.task != Task::Skyline {
            return None;
        }
        let skyline = Skyline::shared(self.resolved.objectives.clone());
        let pruned = Rc::clone(&skyline);
        ctx.add_propagator(|_, _| Box::new(SkylinePruner::new(pruned)));
        ctx.add_monitor(Box::new(SkylineMonitor::new(Rc::clone(&skyline))));
        Some(skyline)
    }

    fn add_thresholds(&self, ctx: &mut SearchContext) {
        if self.resolved.thresholds.is_empty() {
            return;
        }
        let thresholds = self.resolved.thresholds.clone();
        ctx.add_propagator(|_, _| Box::new(MeasureBounds::new(thresholds)));
    }

    fn add_overlap(&self, ctx: &mut SearchContext) {
        let Some(max_jaccard) = self.config.overlap else {
            return;
        };
        let history = OverlapHistory::default();
        let min_frequency = self.resolved.min_frequency;
        let shared = Rc::clone(&history);
        ctx.add_propagator(|_, _| Box::new(Overlap::new(shared, max_jaccard, min_frequency)));
        ctx.add_monitor(Box::new(OverlapMonitor::new(history)));
    }

    fn finish(&self, partials: Vec<Partial>) -> MiningResult {
        let mut statistics = Statistics::new();
        let mut patterns = Vec::new();
        let mut complete = true;
        let mut skyline = (self.config.task == Task::Skyline)
            .then(|| Skyline::new(self.resolved.objectives.clone()));
        for partial in partials {
            statistics.merge(&partial.statistics);
            patterns.extend(partial.patterns);
            complete &= partial.complete;
            if let (Some(total), Some(part)) = (skyline.as_mut(), partial.skyline) {
                total.merge(part);
            }
        }

        let skyline = skyline.map(Skyline::into_members);
        if let Some(members) = &skyline {
            patterns = members.iter().map(|m| m.pattern.clone()).collect();
        }
        patterns.sort();
        if let Some(limit) = self.config.max_solutions {
            patterns.truncate(limit);
        }
        let rules = self
            .config
            .rules
            .as_ref()
            .map(|thresholds| derive_rules(&patterns, &self.store, thresholds))
            .unwrap_or_default();
        MiningResult {
            patterns,
            skyline,
            statistics,
            rules,
            complete,
        }
    }
}

/// One computer per closure measure, each allocated on `trail`.
fn closure_computers(
    measures: &[Measure],
    store: &TransactionStore,
    trail: &mut Trail,
) -> Result<Vec<Box<dyn MeasureComputer>>, ConfigError> {
    let registry = MeasureRegistry::new(store);
    measures
        .iter()
        .map(|&measure| registry.computer(measure, trail))
        .collect()
}

fn enter_branch(ctx: &mut SearchContext, branch: Branch) -> Result<(), PropagationFailure> {
    let (absent_below, present) = match branch {
        Branch::Everything => return Ok(()),
        Branch::SmallestItem(item) => (item, Some(item)),
        Branch::Empty => (ctx.domain.nb_items(), None),
    };
    for item in 0..absent_below {
        ctx.fix(item, ItemState::Absent)?;
    }
    if let Some(item) = present {
        ctx.fix(item, ItemState::Present)?;
    }
    Ok(())
}
