use crate::{
    Error,
    instruction::{Opcode, Operand},
};
use std::{collections::HashMap, fmt, rc::Rc};

const INVALID_NAME_CHARACTERS: [char; 3] = [' ', ';', ':'];

/// A hardware alias. `path` is empty for the alias itself and grows as
/// properties are selected on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// The port or alias the instructions address, e.g. `d0` or `Sensor`
    pub id: String,
    pub name: Option<String>,
    pub path: Vec<String>,
}

impl Device {
    pub fn new(id: impl Into<String>, name: Option<String>) -> Result<Self, Error> {
        if let Some(name) = &name {
            if let Some(c) = name.chars().find(|c| INVALID_NAME_CHARACTERS.contains(c)) {
                return Err(Error::InvalidDevice(
                    name.clone(),
                    format!("`{}` is not allowed in a device name", c),
                ));
            }
        }

        Ok(Self {
            id: id.into(),
            name,
            path: Vec::new(),
        })
    }

    /// A copy of this device with `property` appended to the access path.
    pub fn with_property(&self, property: impl Into<String>) -> Self {
        let mut device = self.clone();
        device.path.push(property.into());
        device
    }

    pub fn operand(&self) -> Operand {
        Operand::Location(self.id.clone())
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Builtin {
    pub opcode: Opcode,
    pub arity: usize,
    /// Side-effect only builtins (`sleep`) produce no value
    pub returns: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callable {
    /// `label(d0, "Name")` / `device(d0, "Name")`
    Alias,
    Builtin(Builtin),
}

impl Callable {
    pub fn arity(&self) -> usize {
        match self {
            Callable::Alias => 2,
            Callable::Builtin(builtin) => builtin.arity,
        }
    }
}

const BUILTINS: [(&str, Opcode, usize, bool); 18] = [
    ("min", Opcode::Min, 2, true),
    ("max", Opcode::Max, 2, true),
    ("mod", Opcode::Mod, 2, true),
    ("abs", Opcode::Abs, 1, true),
    ("asin", Opcode::Asin, 1, true),
    ("acos", Opcode::Acos, 1, true),
    ("sin", Opcode::Sin, 1, true),
    ("cos", Opcode::Cos, 1, true),
    ("tan", Opcode::Tan, 1, true),
    ("exp", Opcode::Exp, 1, true),
    ("floor", Opcode::Floor, 1, true),
    ("ceil", Opcode::Ceil, 1, true),
    ("trunc", Opcode::Trunc, 1, true),
    ("log", Opcode::Log, 1, true),
    ("round", Opcode::Round, 1, true),
    ("sqrt", Opcode::Sqrt, 1, true),
    ("rand", Opcode::Rand, 0, true),
    ("sleep", Opcode::Sleep, 1, false),
];

/// Names known to a compilation: variables bound to registers or ports,
/// device aliases and callables.
#[derive(Debug)]
pub struct SymbolTable {
    variables: HashMap<String, Operand>,
    devices: HashMap<String, Rc<Device>>,
    callables: HashMap<String, Callable>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        let mut variables = HashMap::new();
        variables.insert("out".to_string(), Operand::Location("o".into()));

        let mut devices = HashMap::new();
        devices.insert(
            "db".to_string(),
            Rc::new(Device {
                id: "db".into(),
                name: Some("Socket".into()),
                path: Vec::new(),
            }),
        );

        let mut callables = HashMap::new();
        callables.insert("label".to_string(), Callable::Alias);
        callables.insert("device".to_string(), Callable::Alias);
        for (name, opcode, arity, returns) in BUILTINS {
            callables.insert(
                name.to_string(),
                Callable::Builtin(Builtin {
                    opcode,
                    arity,
                    returns,
                }),
            );
        }

        Self {
            variables,
            devices,
            callables,
        }
    }
}

impl SymbolTable {
    pub fn variable(&self, name: &str) -> Option<&Operand> {
        self.variables.get(name)
    }

    pub fn bind_variable(&mut self, name: impl Into<String>, location: Operand) {
        self.variables.insert(name.into(), location);
    }

    pub fn device(&self, name: &str) -> Option<&Rc<Device>> {
        self.devices.get(name)
    }

    pub fn alias_device(&mut self, name: impl Into<String>, device: Rc<Device>) {
        self.devices.insert(name.into(), device);
    }

    /// Identity check: a derived device with a property path is never a table entry.
    pub fn is_aliased(&self, device: &Rc<Device>) -> bool {
        self.devices.values().any(|entry| Rc::ptr_eq(entry, device))
    }

    pub fn callable(&self, name: &str) -> Option<Callable> {
        self.callables.get(name).copied()
    }
}
