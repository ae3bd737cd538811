use crate::instruction::{Instruction, Label, Operand, Program};
use quick_error::quick_error;
use std::collections::BTreeMap;
use tracing::debug;

quick_error! {
    #[derive(Debug)]
    pub enum Error {
        Unresolved(label: Label) {
            display("label {} was never placed", label)
        }
    }
}

/// Mints labels and records where they land in the instruction stream.
#[derive(Debug, Default)]
pub struct LabelTable {
    counter: usize,
    positions: BTreeMap<Label, Option<usize>>,
}

impl LabelTable {
    /// A fresh label that is not known to the table until it is referenced or inserted.
    pub fn create(&mut self) -> Label {
        self.counter += 1;
        Label(self.counter)
    }

    /// Binds `label` (or a fresh one) to `position`.
    pub fn insert(&mut self, label: Option<Label>, position: usize) -> Label {
        let label = label.unwrap_or_else(|| self.create());
        self.positions.insert(label, Some(position));
        label
    }

    /// Records a forward reference. Labels that were already placed keep their position.
    pub fn reference(&mut self, label: Option<Label>) -> Label {
        let label = label.unwrap_or_else(|| self.create());
        self.positions.entry(label).or_insert(None);
        label
    }

    pub fn position(&self, label: Label) -> Option<usize> {
        self.positions.get(&label).copied().flatten()
    }

    /// Replaces every label operand with its address. A label placed after the
    /// last instruction resolves to the program length, which halts the program.
    pub fn resolve(&self, instructions: Vec<Instruction>) -> Result<Program, Error> {
        let mut resolved = Vec::with_capacity(instructions.len());

        for mut instruction in instructions {
            for operand in instruction.operands.iter_mut() {
                if let Operand::Label(label) = operand {
                    let address = self.position(*label).ok_or(Error::Unresolved(*label))?;
                    debug!("resolved {} to {}", label, address);
                    *operand = Operand::Address(address);
                }
            }
            resolved.push(instruction);
        }

        Ok(Program::new(resolved))
    }
}
