//! Fixture model shared by the unit tests.
//!
//! Domains SYS, PWR, THE, CONF and AOCS; four element definitions:
//!
//! - `Sat` (SYS, category Systems): mass, color (enumeration) and l, the
//!   latter owned by AOCS. Uses `Bus` through usage `bus`, which overrides
//!   Bus' mass.
//! - `Bus` (PWR, Equipment): l (subscribed by THE) and mass. Uses `Gen`.
//! - `Gen` (PWR, Equipment, "Generic Equipment Battery"): P_mean,
//!   P_duty_cyc, loc and mass.
//! - `Panel` (THE, Thermal): compound position, h (holding a bad value) and
//!   wid, the dimensions grouped in "Dimensions".

use crate::cli::{Cli, SwitchKind};
use crate::commands::BatchEditor;
use crate::domain::models::*;
use crate::services::cache::Cache;
use crate::services::filter::{FilterCriteria, FilterService};
use crate::services::staging::ChangeSet;
use clap::Parser;
use uuid::Uuid;

pub struct ModelFixture {
    pub snapshot: ModelSnapshot,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub fn value_set(computed: &[&str], manual: &[&str], reference: &[&str], switch: SwitchKind) -> ValueSet {
    ValueSet {
        iid: Uuid::new_v4(),
        published: strings(manual),
        manual: strings(manual),
        computed: strings(computed),
        reference: strings(reference),
        value_switch: switch,
        actual_option: None,
        actual_state: None,
    }
}

fn manual(value: &str) -> ValueSet {
    value_set(&["-"], &[value], &["-"], SwitchKind::Manual)
}

fn parameter(parameter_type: &ParameterType, owner: &DomainOfExpertise, scale: Option<&MeasurementScale>, value_sets: Vec<ValueSet>) -> Parameter {
    Parameter {
        iid: Uuid::new_v4(),
        parameter_type: parameter_type.iid,
        owner: owner.iid,
        scale: scale.map(|s| s.iid),
        is_option_dependent: false,
        state_dependence: None,
        group: None,
        value_sets,
        subscriptions: vec![],
    }
}

fn element(short_name: &str, name: &str, owner: &DomainOfExpertise, category: &str) -> ElementDefinition {
    ElementDefinition {
        iid: Uuid::new_v4(),
        short_name: short_name.into(),
        name: name.into(),
        owner: owner.iid,
        categories: vec![category.into()],
        parameters: vec![],
        parameter_groups: vec![],
        contained_elements: vec![],
    }
}

fn usage(short_name: &str, owner: &DomainOfExpertise, definition: &ElementDefinition) -> ElementUsage {
    ElementUsage {
        iid: Uuid::new_v4(),
        short_name: short_name.into(),
        name: short_name.into(),
        owner: owner.iid,
        element_definition: definition.iid,
        parameter_overrides: vec![],
    }
}

impl ModelFixture {
    pub fn new() -> Self {
        let domain = |short: &str| DomainOfExpertise {
            iid: Uuid::new_v4(),
            short_name: short.into(),
            name: short.into(),
        };
        let domains: Vec<DomainOfExpertise> =
            ["SYS", "PWR", "THE", "CONF", "AOCS"].iter().map(|s| domain(*s)).collect();
        let (sys, pwr, the, aocs) = (&domains[0], &domains[1], &domains[2], &domains[4]);

        let scale = |short: &str| MeasurementScale {
            iid: Uuid::new_v4(),
            short_name: short.into(),
            name: short.into(),
        };
        let scales: Vec<MeasurementScale> =
            ["km", "m", "cm", "mm", "kg", "g", "W"].iter().map(|s| scale(*s)).collect();
        let by_scale = |short: &str| scales.iter().find(|s| s.short_name == short).unwrap();
        let lengths: Vec<Iid> = ["km", "m", "cm", "mm"].iter().map(|s| by_scale(*s).iid).collect();

        let quantity = |short: &str, possible: Vec<Iid>, default: Iid| ParameterType {
            iid: Uuid::new_v4(),
            short_name: short.into(),
            name: short.into(),
            kind: ParameterTypeKind::QuantityKind {
                possible_scales: possible,
                default_scale: Some(default),
            },
        };
        let text = |short: &str| ParameterType {
            iid: Uuid::new_v4(),
            short_name: short.into(),
            name: short.into(),
            kind: ParameterTypeKind::Text,
        };

        let mass_type = quantity("mass", vec![by_scale("kg").iid, by_scale("g").iid], by_scale("kg").iid);
        let l_type = quantity("l", lengths.clone(), by_scale("m").iid);
        let h_type = quantity("h", lengths.clone(), by_scale("m").iid);
        let wid_type = quantity("wid", lengths.clone(), by_scale("m").iid);
        let d_type = quantity("d", lengths.clone(), by_scale("m").iid);
        let power_type = quantity("P_mean", vec![by_scale("W").iid], by_scale("W").iid);
        let duty_type = text("P_duty_cyc");
        let loc_type = text("loc");
        let color_type = ParameterType {
            iid: Uuid::new_v4(),
            short_name: "color".into(),
            name: "color".into(),
            kind: ParameterTypeKind::Enumeration {
                literals: strings(&["red", "green", "blue"]),
            },
        };
        let position_type = ParameterType {
            iid: Uuid::new_v4(),
            short_name: "position".into(),
            name: "position".into(),
            kind: ParameterTypeKind::Compound {
                components: ["x", "y", "z"]
                    .iter()
                    .map(|c| ParameterTypeComponent {
                        short_name: c.to_string(),
                        parameter_type: l_type.iid,
                    })
                    .collect(),
            },
        };

        let mut gen = element("Gen", "Generic Equipment Battery", pwr, "Equipment");
        gen.parameters = vec![
            parameter(&power_type, sys, Some(by_scale("W")), vec![manual("12")]),
            parameter(&duty_type, sys, None, vec![manual("0.5")]),
            parameter(&loc_type, the, None, vec![manual("bay 1")]),
            parameter(&mass_type, sys, Some(by_scale("kg")), vec![manual("5")]),
        ];

        let mut bus = element("Bus", "Bus", pwr, "Equipment");
        let mut bus_length = parameter(&l_type, pwr, Some(by_scale("m")), vec![manual("2.5")]);
        bus_length.subscriptions.push(ParameterSubscription {
            iid: Uuid::new_v4(),
            owner: the.iid,
            value_sets: vec![value_set(&["-"], &["3"], &["-"], SwitchKind::Computed)],
        });
        bus.parameters = vec![
            bus_length,
            parameter(&mass_type, pwr, Some(by_scale("kg")), vec![manual("40")]),
        ];
        bus.contained_elements.push(usage("gen", pwr, &gen));

        let mut sat = element("Sat", "Satellite", sys, "Systems");
        sat.parameters = vec![
            parameter(&mass_type, sys, Some(by_scale("kg")), vec![manual("100")]),
            parameter(
                &color_type,
                sys,
                None,
                vec![value_set(&["-"], &["-"], &["red"], SwitchKind::Reference)],
            ),
            parameter(&l_type, aocs, Some(by_scale("m")), vec![manual("1.5")]),
        ];
        let mut bus_usage = usage("bus", pwr, &bus);
        bus_usage.parameter_overrides.push(ParameterOverride {
            iid: Uuid::new_v4(),
            parameter: bus.parameters[1].iid,
            owner: pwr.iid,
            value_sets: vec![manual("41")],
            subscriptions: vec![],
        });
        sat.contained_elements.push(bus_usage);

        let mut panel = element("Panel", "Panel", the, "Thermal");
        let dimensions = ParameterGroup {
            iid: Uuid::new_v4(),
            name: "Dimensions".into(),
            containing_group: None,
        };
        let mut height = parameter(
            &h_type,
            the,
            Some(by_scale("cm")),
            vec![value_set(&["12"], &["abc"], &["-"], SwitchKind::Computed)],
        );
        height.group = Some(dimensions.iid);
        let mut width = parameter(&wid_type, the, Some(by_scale("cm")), vec![manual("25")]);
        width.group = Some(dimensions.iid);
        panel.parameters = vec![
            parameter(
                &position_type,
                the,
                None,
                vec![value_set(
                    &["-", "-", "-"],
                    &["-", "2", "-"],
                    &["1", "-", "-"],
                    SwitchKind::Reference,
                )],
            ),
            height,
            width,
        ];
        panel.parameter_groups.push(dimensions);

        let snapshot = ModelSnapshot {
            engineering_model: "LOFT".into(),
            site_directory: SiteDirectory {
                domains: domains.clone(),
                reference_data_libraries: vec![ReferenceDataLibrary {
                    iid: Uuid::new_v4(),
                    short_name: "GenericRDL".into(),
                    scales: scales.clone(),
                    parameter_types: vec![
                        mass_type, l_type, h_type, wid_type, d_type, power_type, duty_type,
                        loc_type, color_type, position_type,
                    ],
                }],
            },
            iteration: Iteration {
                iid: Uuid::new_v4(),
                elements: vec![sat, bus, gen, panel],
                actual_finite_state_lists: vec![ActualFiniteStateList {
                    iid: Uuid::new_v4(),
                    short_name: "Modes".into(),
                    states: strings(&["on", "off"]),
                }],
                options: vec![
                    ModelOption {
                        iid: Uuid::new_v4(),
                        short_name: "opt1".into(),
                    },
                    ModelOption {
                        iid: Uuid::new_v4(),
                        short_name: "opt2".into(),
                    },
                ],
            },
        };

        Self { snapshot }
    }

    pub fn domain(&self, short_name: &str) -> &DomainOfExpertise {
        self.snapshot
            .site_directory
            .domain_by_short_name(short_name)
            .unwrap_or_else(|| panic!("fixture domain {}", short_name))
    }

    pub fn scale(&self, short_name: &str) -> &MeasurementScale {
        self.snapshot
            .site_directory
            .scale_by_short_name(short_name)
            .unwrap_or_else(|| panic!("fixture scale {}", short_name))
    }

    pub fn parameter_type(&self, short_name: &str) -> &ParameterType {
        self.snapshot
            .site_directory
            .parameter_type_by_short_name(short_name)
            .unwrap_or_else(|| panic!("fixture parameter type {}", short_name))
    }

    pub fn element(&self, short_name: &str) -> &ElementDefinition {
        self.snapshot
            .iteration
            .element_by_short_name(short_name)
            .unwrap_or_else(|| panic!("fixture element {}", short_name))
    }

    pub fn parameter(&self, element: &str, parameter_type: &str) -> &Parameter {
        let type_iid = self.parameter_type(parameter_type).iid;
        self.element(element)
            .parameters
            .iter()
            .find(|p| p.parameter_type == type_iid)
            .unwrap_or_else(|| panic!("fixture parameter {}.{}", element, parameter_type))
    }

    pub fn parameter_mut(&mut self, element: &str, parameter_type: &str) -> &mut Parameter {
        let type_iid = self.parameter_type(parameter_type).iid;
        self.snapshot
            .iteration
            .elements
            .iter_mut()
            .find(|e| e.short_name == element)
            .and_then(|e| e.parameters.iter_mut().find(|p| p.parameter_type == type_iid))
            .unwrap_or_else(|| panic!("fixture parameter {}.{}", element, parameter_type))
    }

    pub fn cli(&self, args: &[&str]) -> Cli {
        let mut argv = vec!["batch-editor", "--model", "fixture.json"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    /// Run `command` against this model with filters processed for `args`
    /// and return what it staged.
    pub fn stage(&self, args: &[&str], command: impl FnOnce(&mut BatchEditor<'_>)) -> ChangeSet {
        let cli = self.cli(args);
        let cache = Cache::build(&self.snapshot);
        let mut filter = FilterService::new(FilterCriteria::from(&cli));
        filter.process_filters(&self.snapshot.iteration, &self.snapshot.site_directory.domains);
        let mut changes = ChangeSet::default();
        {
            let mut editor = BatchEditor::new(&cli, &self.snapshot, &cache, &filter, &mut changes);
            command(&mut editor);
        }
        changes
    }
}
