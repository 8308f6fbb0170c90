//! Native code emission for static data.
//!
//! The runtime declares one member per static symbol, loads it from its
//! exchange file in the constructor initializer list, and exposes it
//! through an accessor. An [`Emitter`] renders those three fragments from
//! an [`ExtensionDescriptor`]; [`StaticData`] collects them for a whole task.

use serde::{Deserialize, Serialize};

use crate::exchange::ExchangeBundle;
use crate::extension::{ExtensionDescriptor, ExtensionKind};

/// Renders the native fragments of one static extension.
pub trait Emitter {
    /// Member declaration.
    fn declaration(&self, descriptor: &ExtensionDescriptor) -> String;

    /// Accessor function definition.
    fn accessor(&self, descriptor: &ExtensionDescriptor) -> String;

    /// Constructor initializer loading the member from `data_file`.
    fn initializer(&self, descriptor: &ExtensionDescriptor, data_file: &str) -> String;
}

/// Emits the C++ fragments the native runtime compiles against.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeEmitter;

const OBJECT_TYPE: &str = "ObjectIdx";

impl NativeEmitter {
    fn parameter_names(arity: usize) -> &'static [&'static str] {
        match arity {
            0 => &[],
            1 => &["x"],
            2 => &["x", "y"],
            3 => &["x", "y", "z"],
            _ => &["o1", "o2", "o3", "o4"],
        }
    }

    /// Lookup key expression for the accessor parameters.
    fn key(arity: usize) -> String {
        let names = Self::parameter_names(arity);
        match arity {
            0 | 1 => names.join(","),
            2 => format!("{{{}}}", names.join(",")),
            _ => format!("std::make_tuple({})", names.join(",")),
        }
    }

    fn signature(arity: usize) -> String {
        Self::parameter_names(arity)
            .iter()
            .map(|p| format!("{OBJECT_TYPE} {p}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Emitter for NativeEmitter {
    fn declaration(&self, d: &ExtensionDescriptor) -> String {
        let name = d.identifier();
        if d.arity() == 0 {
            return format!("const {OBJECT_TYPE} {name};");
        }
        format!("const Serializer::Boost{} {name};", d.declaration.storage)
    }

    fn accessor(&self, d: &ExtensionDescriptor) -> String {
        let name = d.identifier();
        let fn_name = &d.accessor.name;
        let params = Self::signature(d.arity());
        match (d.kind(), d.arity()) {
            (ExtensionKind::Map, 0) => {
                format!("{OBJECT_TYPE} {fn_name}() {{ return {name}; }}")
            }
            (ExtensionKind::Map, arity) => format!(
                "{OBJECT_TYPE} {fn_name}({params}) {{ return {name}.at({}); }}",
                Self::key(arity)
            ),
            (ExtensionKind::Set, arity) => format!(
                "bool {fn_name}({params}) {{ return {name}.find({}) != {name}.end(); }}",
                Self::key(arity)
            ),
        }
    }

    fn initializer(&self, d: &ExtensionDescriptor, data_file: &str) -> String {
        format!(
            "{}(Serializer::{}(data_dir + \"/{data_file}\"))",
            d.identifier(),
            d.loader
        )
    }
}

/// Native fragments for every static extension of a task, in symbol order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticData {
    /// Member declarations.
    pub declarations: Vec<String>,
    /// Accessor definitions.
    pub accessors: Vec<String>,
    /// Constructor initializer entries.
    pub initializations: Vec<String>,
}

impl StaticData {
    /// Renders every extension of `bundle` with `emitter`.
    pub fn render(bundle: &ExchangeBundle, emitter: &dyn Emitter) -> Self {
        let mut data = Self::default();
        for (file, descriptor) in bundle.entries() {
            data.declarations.push(emitter.declaration(descriptor));
            data.accessors.push(emitter.accessor(descriptor));
            data.initializations
                .push(emitter.initializer(descriptor, &file.file_name));
        }
        data
    }
}
