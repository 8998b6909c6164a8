use crate::domain::models::{
    DomainOfExpertise, ElementDefinition, Iid, MeasurementScale, ModelSnapshot, ParameterSubscription,
    ParameterType, ValueSet,
};
use crate::services::staging::ThingClass;
use std::collections::HashMap;

/// Where a thing sits in the containment hierarchy: its class and the
/// identities of its containers from the iteration down (itself excluded).
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub class: ThingClass,
    pub route: Vec<Iid>,
}

/// Identity-keyed read access to the live model. The staging protocol and
/// the commands only ever read through this.
pub trait ThingLookup {
    fn iteration_iid(&self) -> Iid;
    fn domain(&self, iid: Iid) -> Option<&DomainOfExpertise>;
    fn scale(&self, iid: Iid) -> Option<&MeasurementScale>;
    fn parameter_type(&self, iid: Iid) -> Option<&ParameterType>;
    fn location(&self, iid: Iid) -> Option<&Location>;
    /// Parameter type of a parameter, override or subscription.
    fn parameter_type_of(&self, thing: Iid) -> Option<&ParameterType>;

    fn domain_short_name(&self, iid: Iid) -> String {
        self.domain(iid)
            .map(|d| d.short_name.clone())
            .unwrap_or_else(|| iid.to_string())
    }

    fn scale_short_name(&self, iid: Option<Iid>) -> String {
        iid.and_then(|i| self.scale(i))
            .map(|s| s.short_name.clone())
            .unwrap_or_default()
    }

    fn type_short_name_of(&self, thing: Iid) -> String {
        self.parameter_type_of(thing)
            .map(|pt| pt.short_name.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct Cache {
    iteration: Iid,
    domains: HashMap<Iid, DomainOfExpertise>,
    scales: HashMap<Iid, MeasurementScale>,
    parameter_types: HashMap<Iid, ParameterType>,
    locations: HashMap<Iid, Location>,
    typed_things: HashMap<Iid, Iid>,
}

impl Cache {
    pub fn build(snapshot: &ModelSnapshot) -> Self {
        let site = &snapshot.site_directory;
        let mut cache = Cache {
            iteration: snapshot.iteration.iid,
            domains: site.domains.iter().map(|d| (d.iid, d.clone())).collect(),
            scales: site.scales().map(|s| (s.iid, s.clone())).collect(),
            parameter_types: site.parameter_types().map(|pt| (pt.iid, pt.clone())).collect(),
            ..Cache::default()
        };

        for element in &snapshot.iteration.elements {
            for parameter in &element.parameters {
                cache.typed_things.insert(parameter.iid, parameter.parameter_type);
            }
        }
        for element in &snapshot.iteration.elements {
            cache.index_element(element);
        }
        cache
    }

    fn locate(&mut self, iid: Iid, class: ThingClass, route: &[Iid]) {
        self.locations.insert(
            iid,
            Location {
                class,
                route: route.to_vec(),
            },
        );
    }

    fn index_element(&mut self, element: &ElementDefinition) {
        self.locate(element.iid, ThingClass::ElementDefinition, &[]);
        let route = [element.iid];

        for group in &element.parameter_groups {
            self.locate(group.iid, ThingClass::ParameterGroup, &route);
        }

        for parameter in &element.parameters {
            self.locate(parameter.iid, ThingClass::Parameter, &route);
            let inner = [element.iid, parameter.iid];
            self.index_value_sets(&parameter.value_sets, &inner);
            self.index_subscriptions(&parameter.subscriptions, &inner, parameter.parameter_type);
        }

        for usage in &element.contained_elements {
            self.locate(usage.iid, ThingClass::ElementUsage, &route);
            for parameter_override in &usage.parameter_overrides {
                let usage_route = [element.iid, usage.iid];
                self.locate(parameter_override.iid, ThingClass::ParameterOverride, &usage_route);
                let inner = [element.iid, usage.iid, parameter_override.iid];
                self.index_value_sets(&parameter_override.value_sets, &inner);
                if let Some(parameter_type) = self.typed_things.get(&parameter_override.parameter).copied() {
                    self.typed_things.insert(parameter_override.iid, parameter_type);
                    self.index_subscriptions(&parameter_override.subscriptions, &inner, parameter_type);
                } else {
                    self.index_subscriptions(&parameter_override.subscriptions, &inner, Iid::nil());
                }
            }
        }
    }

    fn index_value_sets(&mut self, value_sets: &[ValueSet], route: &[Iid]) {
        for value_set in value_sets {
            self.locate(value_set.iid, ThingClass::ValueSet, route);
        }
    }

    fn index_subscriptions(&mut self, subscriptions: &[ParameterSubscription], route: &[Iid], parameter_type: Iid) {
        for subscription in subscriptions {
            self.locate(subscription.iid, ThingClass::ParameterSubscription, route);
            if !parameter_type.is_nil() {
                self.typed_things.insert(subscription.iid, parameter_type);
            }
            let mut inner = route.to_vec();
            inner.push(subscription.iid);
            self.index_value_sets(&subscription.value_sets, &inner);
        }
    }
}

impl ThingLookup for Cache {
    fn iteration_iid(&self) -> Iid {
        self.iteration
    }

    fn domain(&self, iid: Iid) -> Option<&DomainOfExpertise> {
        self.domains.get(&iid)
    }

    fn scale(&self, iid: Iid) -> Option<&MeasurementScale> {
        self.scales.get(&iid)
    }

    fn parameter_type(&self, iid: Iid) -> Option<&ParameterType> {
        self.parameter_types.get(&iid)
    }

    fn location(&self, iid: Iid) -> Option<&Location> {
        self.locations.get(&iid)
    }

    fn parameter_type_of(&self, thing: Iid) -> Option<&ParameterType> {
        self.typed_things
            .get(&thing)
            .and_then(|pt| self.parameter_types.get(pt))
    }
}
