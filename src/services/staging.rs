//! Clone-and-modify staging of model mutations.
//!
//! Every mutation is staged on a detached copy of the live thing, bound to
//! the write context of that thing's position in the hierarchy, and appended
//! to one ordered changeset. The live snapshot is only ever borrowed
//! immutably here; nothing becomes visible until the session commits.

use crate::domain::models::{
    ElementDefinition, ElementUsage, Iid, Parameter, ParameterGroup, ParameterOverride,
    ParameterSubscription, TransactionSummary, ValueSet,
};
use crate::services::cache::ThingLookup;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThingClass {
    ElementDefinition,
    ElementUsage,
    Parameter,
    ParameterOverride,
    ParameterSubscription,
    ParameterGroup,
    ValueSet,
}

impl ThingClass {
    pub fn name(&self) -> &'static str {
        match self {
            ThingClass::ElementDefinition => "element_definition",
            ThingClass::ElementUsage => "element_usage",
            ThingClass::Parameter => "parameter",
            ThingClass::ParameterOverride => "parameter_override",
            ThingClass::ParameterSubscription => "parameter_subscription",
            ThingClass::ParameterGroup => "parameter_group",
            ThingClass::ValueSet => "value_set",
        }
    }
}

impl fmt::Display for ThingClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A detached copy of any stageable model thing.
#[derive(Debug, Clone, PartialEq)]
pub enum Thing {
    ElementDefinition(ElementDefinition),
    ElementUsage(ElementUsage),
    Parameter(Parameter),
    ParameterOverride(ParameterOverride),
    ParameterSubscription(ParameterSubscription),
    ParameterGroup(ParameterGroup),
    ValueSet(ValueSet),
}

impl Thing {
    pub fn iid(&self) -> Iid {
        match self {
            Thing::ElementDefinition(t) => t.iid,
            Thing::ElementUsage(t) => t.iid,
            Thing::Parameter(t) => t.iid,
            Thing::ParameterOverride(t) => t.iid,
            Thing::ParameterSubscription(t) => t.iid,
            Thing::ParameterGroup(t) => t.iid,
            Thing::ValueSet(t) => t.iid,
        }
    }

    pub fn class(&self) -> ThingClass {
        match self {
            Thing::ElementDefinition(_) => ThingClass::ElementDefinition,
            Thing::ElementUsage(_) => ThingClass::ElementUsage,
            Thing::Parameter(_) => ThingClass::Parameter,
            Thing::ParameterOverride(_) => ThingClass::ParameterOverride,
            Thing::ParameterSubscription(_) => ThingClass::ParameterSubscription,
            Thing::ParameterGroup(_) => ThingClass::ParameterGroup,
            Thing::ValueSet(_) => ThingClass::ValueSet,
        }
    }
}

pub trait Stageable: Clone + Into<Thing> {
    const CLASS: ThingClass;
    fn iid(&self) -> Iid;
}

macro_rules! stageable {
    ($($ty:ident),* $(,)?) => {
        $(
            impl Stageable for $ty {
                const CLASS: ThingClass = ThingClass::$ty;
                fn iid(&self) -> Iid {
                    self.iid
                }
            }

            impl From<$ty> for Thing {
                fn from(value: $ty) -> Self {
                    Thing::$ty(value)
                }
            }
        )*
    };
}

stageable!(
    ElementDefinition,
    ElementUsage,
    Parameter,
    ParameterOverride,
    ParameterSubscription,
    ParameterGroup,
    ValueSet,
);

/// Things with an owning domain.
pub trait OwnedThing: Stageable {
    fn owner(&self) -> Iid;
    fn set_owner(&mut self, owner: Iid);
}

macro_rules! owned {
    ($($ty:ident),* $(,)?) => {
        $(
            impl OwnedThing for $ty {
                fn owner(&self) -> Iid {
                    self.owner
                }
                fn set_owner(&mut self, owner: Iid) {
                    self.owner = owner;
                }
            }
        )*
    };
}

owned!(
    ElementDefinition,
    ElementUsage,
    Parameter,
    ParameterOverride,
    ParameterSubscription,
);

/// Independent, disconnected deep copy of a live thing.
pub fn checkout<T: Stageable>(original: &T) -> T {
    original.clone()
}

/// Write context: the iteration and the containers of the staged thing.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionContext {
    pub iteration: Iid,
    pub route: Vec<Iid>,
}

impl TransactionContext {
    pub fn resolve(cache: &dyn ThingLookup, iid: Iid) -> Self {
        Self {
            iteration: cache.iteration_iid(),
            route: cache
                .location(iid)
                .map(|l| l.route.clone())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Attach `child` to the staged clone.
    Create { child: Thing },
    /// Replace the live thing's own attributes with the clone's.
    Update,
    /// Detach `target` from the staged clone.
    Delete { target: Iid, class: ThingClass },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Create { .. } => "create",
            Operation::Update => "update",
            Operation::Delete { .. } => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThingTransaction {
    pub context: TransactionContext,
    pub clone: Thing,
    pub operation: Operation,
}

impl ThingTransaction {
    /// The thing this transaction finally writes.
    pub fn subject(&self) -> (ThingClass, Iid) {
        match &self.operation {
            Operation::Create { child } => (child.class(), child.iid()),
            Operation::Update => (self.clone.class(), self.clone.iid()),
            Operation::Delete { target, class } => (*class, *target),
        }
    }

    pub fn summary(&self) -> TransactionSummary {
        let (class, iid) = self.subject();
        let mut route: Vec<String> = self.context.route.iter().map(|i| i.to_string()).collect();
        if !matches!(self.operation, Operation::Update) {
            route.push(self.clone.iid().to_string());
        }
        TransactionSummary {
            operation: self.operation.name().to_string(),
            class: class.name().to_string(),
            iid: iid.to_string(),
            route,
        }
    }
}

/// Ordered, append-only list of staged transactions. Submission order is
/// replay order at commit time; nothing here consults earlier entries.
#[derive(Debug, Default, Clone)]
pub struct ChangeSet {
    transactions: Vec<ThingTransaction>,
}

impl ChangeSet {
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ThingTransaction> {
        self.transactions.iter()
    }

    pub fn last(&self) -> Option<&ThingTransaction> {
        self.transactions.last()
    }

    pub fn summaries(&self) -> Vec<TransactionSummary> {
        self.transactions.iter().map(|t| t.summary()).collect()
    }

    pub fn clear(&mut self) {
        self.transactions.clear();
    }

    /// Check out `original`, apply `edit` to the copy and stage it as an update.
    pub fn stage_update<T: Stageable>(
        &mut self,
        cache: &dyn ThingLookup,
        original: &T,
        edit: impl FnOnce(&mut T),
    ) {
        let mut clone = checkout(original);
        edit(&mut clone);
        self.stage_edited(cache, clone);
    }

    /// Stage an already checked-out and edited copy as an update.
    pub fn stage_edited<T: Stageable>(&mut self, cache: &dyn ThingLookup, clone: T) {
        self.transactions.push(ThingTransaction {
            context: TransactionContext::resolve(cache, clone.iid()),
            clone: clone.into(),
            operation: Operation::Update,
        });
    }

    /// Stage creation of `child` inside a copy of `container`.
    pub fn stage_create<T: Stageable, C: Stageable>(
        &mut self,
        cache: &dyn ThingLookup,
        container: &T,
        child: C,
    ) {
        let clone = checkout(container);
        self.transactions.push(ThingTransaction {
            context: TransactionContext::resolve(cache, clone.iid()),
            clone: clone.into(),
            operation: Operation::Create {
                child: child.into(),
            },
        });
    }

    /// Stage removal of `target` from a copy of `container`.
    pub fn stage_delete<T: Stageable, C: Stageable>(
        &mut self,
        cache: &dyn ThingLookup,
        container: &T,
        target: &C,
    ) {
        let clone = checkout(container);
        self.transactions.push(ThingTransaction {
            context: TransactionContext::resolve(cache, clone.iid()),
            clone: clone.into(),
            operation: Operation::Delete {
                target: target.iid(),
                class: C::CLASS,
            },
        });
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a ThingTransaction;
    type IntoIter = std::slice::Iter<'a, ThingTransaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}
