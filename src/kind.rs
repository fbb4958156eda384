//! Member kinds and the rules the edit engine applies to each of them.

use serde::{Deserialize, Serialize};

use crate::naming::{normalize_event_name, normalize_slot_name};
use crate::reader::OPTIONS_SUFFIX;
use crate::templates::{
    event_code, method_code, prop_code, readable_prop_code, slot_code, MemberCode, MemberSeed,
};

/// What an edit action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Module {
    Info,
    SubComponent,
    Prop,
    Event,
    Slot,
    Method,
    ReadableProp,
}

impl Module {
    pub fn member_kind(self) -> Option<MemberKind> {
        match self {
            Module::Prop => Some(MemberKind::Prop),
            Module::Event => Some(MemberKind::Event),
            Module::Slot => Some(MemberKind::Slot),
            Module::Method => Some(MemberKind::Method),
            Module::ReadableProp => Some(MemberKind::ReadableProp),
            Module::Info | Module::SubComponent => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Prop = 0,
    Event = 1,
    Slot = 2,
    Method = 3,
    ReadableProp = 4,
}

/// Which class holds a member kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// `<Name>Options`
    Options,
    /// `<Name>`
    Instance,
}

impl Scope {
    pub fn class_name(self, component: &str) -> String {
        match self {
            Scope::Options => format!("{}{}", component, OPTIONS_SUFFIX),
            Scope::Instance => component.to_string(),
        }
    }
}

/// Whether the member is a class property or a class method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Property,
    Method,
}

pub struct KindRule {
    pub label: &'static str,
    pub scope: Scope,
    pub decorator: &'static str,
    pub shape: Shape,
    pub normalize: fn(&str) -> String,
    pub template: fn(&MemberSeed) -> Vec<MemberCode>,
}

fn keep(name: &str) -> String {
    name.to_string()
}

static KIND_TABLE: [KindRule; 5] = [
    KindRule {
        label: "prop",
        scope: Scope::Options,
        decorator: "Prop",
        shape: Shape::Property,
        normalize: keep,
        template: prop_code,
    },
    KindRule {
        label: "event",
        scope: Scope::Options,
        decorator: "Event",
        shape: Shape::Property,
        normalize: normalize_event_name,
        template: event_code,
    },
    KindRule {
        label: "slot",
        scope: Scope::Options,
        decorator: "Slot",
        shape: Shape::Property,
        normalize: normalize_slot_name,
        template: slot_code,
    },
    KindRule {
        label: "method",
        scope: Scope::Instance,
        decorator: "Method",
        shape: Shape::Method,
        normalize: keep,
        template: method_code,
    },
    KindRule {
        label: "readable prop",
        scope: Scope::Instance,
        decorator: "Prop",
        shape: Shape::Property,
        normalize: keep,
        template: readable_prop_code,
    },
];

impl MemberKind {
    pub fn rule(self) -> &'static KindRule {
        &KIND_TABLE[self as usize]
    }

    pub fn normalize(self, name: &str) -> String {
        (self.rule().normalize)(name)
    }

    pub fn class_name(self, component: &str) -> String {
        self.rule().scope.class_name(component)
    }

    pub fn template(self, seed: &MemberSeed) -> Vec<MemberCode> {
        (self.rule().template)(seed)
    }
}

impl std::fmt::Display for MemberKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.rule().label)
    }
}
