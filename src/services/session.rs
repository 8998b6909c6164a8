//! File-backed session: opens a model snapshot, owns the cache, the scope
//! and the changeset, and commits the changeset back to disk.

use crate::cli::{Cli, SwitchKind};
use crate::commands::{self, BatchEditor};
use crate::domain::models::{
    ElementDefinition, ElementUsage, Iid, Iteration, ModelSnapshot, Parameter, ParameterGroup,
    ParameterOverride, ParameterSubscription, ValueSet,
};
use crate::error::SessionError;
use crate::services::cache::{Cache, ThingLookup};
use crate::services::filter::{FilterCriteria, FilterService};
use crate::services::report::CsvReportGenerator;
use crate::services::staging::{ChangeSet, Operation, Thing, ThingTransaction};
use crate::services::storage;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    DryRun,
    NothingToCommit,
    Committed { path: PathBuf },
}

pub struct FileSession {
    path: PathBuf,
    digest: String,
    snapshot: ModelSnapshot,
    cache: Cache,
    filter: FilterService,
    changes: ChangeSet,
}

impl FileSession {
    /// Read the snapshot, index it and compute the run's scope.
    pub fn open(path: &Path, criteria: FilterCriteria) -> Result<Self, SessionError> {
        let (snapshot, digest) =
            storage::load_snapshot(path).map_err(|e| SessionError::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let cache = Cache::build(&snapshot);
        let mut filter = FilterService::new(criteria);
        filter.process_filters(&snapshot.iteration, &snapshot.site_directory.domains);
        info!(
            model = %snapshot.engineering_model,
            elements = snapshot.iteration.elements.len(),
            "session opened"
        );
        Ok(Self {
            path: path.to_path_buf(),
            digest,
            snapshot,
            cache,
            filter,
            changes: ChangeSet::default(),
        })
    }

    pub fn snapshot(&self) -> &ModelSnapshot {
        &self.snapshot
    }

    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    pub fn editor<'a>(&'a mut self, args: &'a Cli) -> BatchEditor<'a> {
        BatchEditor::new(
            args,
            &self.snapshot,
            &self.cache,
            &self.filter,
            &mut self.changes,
        )
    }

    /// Run the selected action against this session, then the report when
    /// asked for. The report reflects the model as opened.
    pub fn dispatch(&mut self, args: &Cli) -> Option<PathBuf> {
        let reporter = CsvReportGenerator::new(&self.snapshot, &self.cache, &args.report_dir);
        let mut editor = BatchEditor::new(
            args,
            &self.snapshot,
            &self.cache,
            &self.filter,
            &mut self.changes,
        );
        commands::dispatch(args.action, args.report, &mut editor, &reporter)
    }

    pub fn save(&mut self, dry_run: bool, output: Option<&Path>) -> Result<SaveOutcome, SessionError> {
        if !dry_run && !self.changes.is_empty() {
            let staged = self.changes.len();
            info!(staged, "persisting changes");
            let committed = apply_changes(&self.snapshot, &self.changes, &self.cache)?;

            let found = storage::digest_file(&self.path).map_err(|e| SessionError::Unreadable {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
            if found != self.digest {
                return Err(SessionError::ModelChanged {
                    path: self.path.clone(),
                    expected: self.digest.clone(),
                    found,
                });
            }

            let target = output
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.path.clone());
            storage::save_snapshot(&target, &committed).map_err(|e| SessionError::Unwritable {
                path: target.clone(),
                reason: e.to_string(),
            })?;
            storage::audit_commit(&storage::CommitRecord {
                model: committed.engineering_model.clone(),
                source: self.path.to_string_lossy().to_string(),
                target: target.to_string_lossy().to_string(),
                transactions: staged,
                digest: self.digest.clone(),
            });
            info!(staged, path = %target.display(), "changes persisted");

            if target == self.path {
                self.digest = storage::digest_file(&target).unwrap_or_default();
            }
            self.cache = Cache::build(&committed);
            self.snapshot = committed;
            self.changes.clear();
            Ok(SaveOutcome::Committed { path: target })
        } else if self.changes.is_empty() {
            info!("no change to persist");
            Ok(SaveOutcome::NothingToCommit)
        } else {
            info!(staged = self.changes.len(), "dry run: changes have not been saved");
            Ok(SaveOutcome::DryRun)
        }
    }
}

/// Replay `changes` in submission order onto a copy of `snapshot`. Either
/// every transaction applies or the error of the first one that does not is
/// returned and `snapshot` is left as it was.
pub fn apply_changes(
    snapshot: &ModelSnapshot,
    changes: &ChangeSet,
    cache: &dyn ThingLookup,
) -> Result<ModelSnapshot, SessionError> {
    let mut working = snapshot.clone();
    let options: Vec<String> = working
        .iteration
        .options
        .iter()
        .map(|o| o.short_name.clone())
        .collect();
    for transaction in changes {
        apply(&mut working.iteration, transaction, &options, cache)?;
    }
    Ok(working)
}

fn apply(
    iteration: &mut Iteration,
    transaction: &ThingTransaction,
    options: &[String],
    cache: &dyn ThingLookup,
) -> Result<(), SessionError> {
    let operation = transaction.operation.name();
    let iid = transaction.clone.iid();
    let states = match &transaction.clone {
        Thing::Parameter(p) => p.state_dependence.and_then(|list| {
            iteration
                .actual_finite_state_lists
                .iter()
                .find(|l| l.iid == list)
                .map(|l| l.states.clone())
        }),
        _ => None,
    };

    let mut path = transaction.context.route.clone();
    path.push(iid);
    let node = locate(iteration, &path).ok_or(SessionError::MissingThing { operation, iid })?;

    match &transaction.operation {
        Operation::Update => {
            if let Some(realignment) = update(node, &transaction.clone, options, states.as_deref(), cache)? {
                realignment.realign_overrides(iteration);
            }
            Ok(())
        }
        Operation::Create { child } => create(node, child),
        Operation::Delete { target, .. } => delete(node, *target),
    }
}

/// Mutable handle on one thing inside the iteration being replayed onto.
enum NodeMut<'m> {
    Element(&'m mut ElementDefinition),
    Usage(&'m mut ElementUsage),
    Parameter(&'m mut Parameter),
    Override(&'m mut ParameterOverride),
    Subscription(&'m mut ParameterSubscription),
    Group(&'m mut ParameterGroup),
    ValueSet(&'m mut ValueSet),
}

impl<'m> NodeMut<'m> {
    fn class_name(&self) -> &'static str {
        match self {
            NodeMut::Element(_) => "element_definition",
            NodeMut::Usage(_) => "element_usage",
            NodeMut::Parameter(_) => "parameter",
            NodeMut::Override(_) => "parameter_override",
            NodeMut::Subscription(_) => "parameter_subscription",
            NodeMut::Group(_) => "parameter_group",
            NodeMut::ValueSet(_) => "value_set",
        }
    }

    fn child(self, iid: Iid) -> Option<NodeMut<'m>> {
        match self {
            NodeMut::Element(e) => {
                if let Some(p) = e.parameters.iter_mut().find(|p| p.iid == iid) {
                    return Some(NodeMut::Parameter(p));
                }
                if let Some(u) = e.contained_elements.iter_mut().find(|u| u.iid == iid) {
                    return Some(NodeMut::Usage(u));
                }
                e.parameter_groups
                    .iter_mut()
                    .find(|g| g.iid == iid)
                    .map(NodeMut::Group)
            }
            NodeMut::Usage(u) => u
                .parameter_overrides
                .iter_mut()
                .find(|o| o.iid == iid)
                .map(NodeMut::Override),
            NodeMut::Parameter(p) => {
                if let Some(v) = p.value_sets.iter_mut().find(|v| v.iid == iid) {
                    return Some(NodeMut::ValueSet(v));
                }
                p.subscriptions
                    .iter_mut()
                    .find(|s| s.iid == iid)
                    .map(NodeMut::Subscription)
            }
            NodeMut::Override(o) => {
                if let Some(v) = o.value_sets.iter_mut().find(|v| v.iid == iid) {
                    return Some(NodeMut::ValueSet(v));
                }
                o.subscriptions
                    .iter_mut()
                    .find(|s| s.iid == iid)
                    .map(NodeMut::Subscription)
            }
            NodeMut::Subscription(s) => s
                .value_sets
                .iter_mut()
                .find(|v| v.iid == iid)
                .map(NodeMut::ValueSet),
            NodeMut::Group(_) | NodeMut::ValueSet(_) => None,
        }
    }
}

fn locate<'m>(iteration: &'m mut Iteration, path: &[Iid]) -> Option<NodeMut<'m>> {
    let (first, rest) = path.split_first()?;
    let element = iteration.elements.iter_mut().find(|e| e.iid == *first)?;
    rest.iter()
        .try_fold(NodeMut::Element(element), |node, iid| node.child(*iid))
}

fn mismatch(node: &NodeMut<'_>, clone: &Thing, operation: &'static str) -> SessionError {
    SessionError::ClassMismatch {
        operation,
        iid: clone.iid(),
        expected: node.class_name(),
    }
}

/// Own attributes only; contained collections stay as they are live, except
/// value sets, which follow a change of option or state dependence.
fn update(
    node: NodeMut<'_>,
    clone: &Thing,
    options: &[String],
    states: Option<&[String]>,
    cache: &dyn ThingLookup,
) -> Result<Option<Realignment>, SessionError> {
    match (node, clone) {
        (NodeMut::Element(live), Thing::ElementDefinition(c)) => {
            live.short_name = c.short_name.clone();
            live.name = c.name.clone();
            live.owner = c.owner;
            live.categories = c.categories.clone();
        }
        (NodeMut::Usage(live), Thing::ElementUsage(c)) => {
            live.short_name = c.short_name.clone();
            live.name = c.name.clone();
            live.owner = c.owner;
            live.element_definition = c.element_definition;
        }
        (NodeMut::Parameter(live), Thing::Parameter(c)) => {
            let dependence_changed = live.is_option_dependent != c.is_option_dependent
                || live.state_dependence != c.state_dependence;
            live.parameter_type = c.parameter_type;
            live.owner = c.owner;
            live.scale = c.scale;
            live.is_option_dependent = c.is_option_dependent;
            live.state_dependence = c.state_dependence;
            live.group = c.group;
            if dependence_changed {
                let number_of_values = cache
                    .parameter_type(live.parameter_type)
                    .map(|pt| pt.number_of_values())
                    .unwrap_or(1);
                let realignment = Realignment::new(live, options, states.unwrap_or_default(), number_of_values);
                realignment.realign_parameter(live);
                return Ok(Some(realignment));
            }
        }
        (NodeMut::Override(live), Thing::ParameterOverride(c)) => live.owner = c.owner,
        (NodeMut::Subscription(live), Thing::ParameterSubscription(c)) => live.owner = c.owner,
        (NodeMut::Group(live), Thing::ParameterGroup(c)) => {
            live.name = c.name.clone();
            live.containing_group = c.containing_group;
        }
        (NodeMut::ValueSet(live), Thing::ValueSet(c)) => {
            live.manual = c.manual.clone();
            live.computed = c.computed.clone();
            live.reference = c.reference.clone();
            live.value_switch = c.value_switch;
        }
        (node, clone) => return Err(mismatch(&node, clone, "update")),
    }
    Ok(None)
}

/// Option/state layout of a parameter whose dependence changed, applied to
/// its own value sets and to those of every subscription and override of it.
struct Realignment {
    parameter: Iid,
    options: Vec<Option<String>>,
    states: Vec<Option<String>>,
    number_of_values: usize,
}

impl Realignment {
    fn new(parameter: &Parameter, options: &[String], states: &[String], number_of_values: usize) -> Self {
        let axis = |dependent: bool, values: &[String]| -> Vec<Option<String>> {
            if dependent && !values.is_empty() {
                values.iter().cloned().map(Some).collect()
            } else {
                vec![None]
            }
        };
        Self {
            parameter: parameter.iid,
            options: axis(parameter.is_option_dependent, options),
            states: axis(parameter.state_dependence.is_some(), states),
            number_of_values,
        }
    }

    /// One value set per option/state combination, keeping the ones that
    /// already exist for a combination.
    fn realign(&self, value_sets: &mut Vec<ValueSet>, default_switch: SwitchKind) {
        let switch = value_sets.first().map(|v| v.value_switch).unwrap_or(default_switch);
        let mut previous = std::mem::take(value_sets);
        for option in &self.options {
            for state in &self.states {
                let kept = previous
                    .iter()
                    .position(|v| v.actual_option == *option && v.actual_state == *state);
                let value_set = match kept {
                    Some(index) => previous.remove(index),
                    None => ValueSet {
                        actual_option: option.clone(),
                        actual_state: state.clone(),
                        ..ValueSet::unset(self.number_of_values, switch)
                    },
                };
                value_sets.push(value_set);
            }
        }
    }

    fn realign_subscriptions(&self, subscriptions: &mut [ParameterSubscription]) {
        for subscription in subscriptions {
            self.realign(&mut subscription.value_sets, SwitchKind::Computed);
        }
    }

    fn realign_parameter(&self, parameter: &mut Parameter) {
        self.realign(&mut parameter.value_sets, SwitchKind::Manual);
        self.realign_subscriptions(&mut parameter.subscriptions);
    }

    fn realign_overrides(&self, iteration: &mut Iteration) {
        let overrides = iteration
            .elements
            .iter_mut()
            .flat_map(|e| e.contained_elements.iter_mut())
            .flat_map(|u| u.parameter_overrides.iter_mut())
            .filter(|o| o.parameter == self.parameter);
        for parameter_override in overrides {
            self.realign(&mut parameter_override.value_sets, SwitchKind::Manual);
            self.realign_subscriptions(&mut parameter_override.subscriptions);
        }
    }
}

fn create(node: NodeMut<'_>, child: &Thing) -> Result<(), SessionError> {
    match (node, child) {
        (NodeMut::Element(e), Thing::Parameter(p)) => e.parameters.push(p.clone()),
        (NodeMut::Element(e), Thing::ParameterGroup(g)) => e.parameter_groups.push(g.clone()),
        (NodeMut::Element(e), Thing::ElementUsage(u)) => e.contained_elements.push(u.clone()),
        (NodeMut::Usage(u), Thing::ParameterOverride(o)) => u.parameter_overrides.push(o.clone()),
        (NodeMut::Parameter(p), Thing::ParameterSubscription(s)) => p.subscriptions.push(s.clone()),
        (NodeMut::Override(o), Thing::ParameterSubscription(s)) => o.subscriptions.push(s.clone()),
        (node, child) => {
            return Err(SessionError::InvalidContainment {
                child: child.class().name(),
                container: node.class_name(),
            })
        }
    }
    Ok(())
}

fn delete(node: NodeMut<'_>, target: Iid) -> Result<(), SessionError> {
    fn remove<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> bool {
        let before = items.len();
        items.retain(|i| !matches(i));
        items.len() != before
    }

    let removed = match node {
        NodeMut::Element(e) => {
            remove(&mut e.parameters, |p| p.iid == target)
                || remove(&mut e.contained_elements, |u| u.iid == target)
                || remove(&mut e.parameter_groups, |g| g.iid == target)
        }
        NodeMut::Usage(u) => remove(&mut u.parameter_overrides, |o| o.iid == target),
        NodeMut::Parameter(p) => remove(&mut p.subscriptions, |s| s.iid == target),
        NodeMut::Override(o) => remove(&mut o.subscriptions, |s| s.iid == target),
        NodeMut::Subscription(_) | NodeMut::Group(_) | NodeMut::ValueSet(_) => false,
    };
    if removed {
        Ok(())
    } else {
        Err(SessionError::MissingThing {
            operation: "delete",
            iid: target,
        })
    }
}
