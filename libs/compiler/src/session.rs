use crate::{
    Error,
    instruction::{Instruction, Label, Opcode, Operand, Program},
    labels::LabelTable,
    lookahead::{ReturnType, can_assign, return_type},
    symbols::{Device, SymbolTable},
    variable_manager::{RegisterAllocator, RegisterScope, Reservation},
};
use parser::tree_node::{AssignmentStatement, Node, OperatorChain};
use std::rc::Rc;
use tracing::{debug, trace};

/// What an expression evaluated to.
#[derive(Debug, Clone)]
pub enum Value {
    Operand(Operand),
    Device(Rc<Device>),
}

enum Target {
    Operand(Operand),
    /// A device with the property being written as its last path element
    Property(Device),
}

/// All state of a single compile. Consumed by [`CompilationSession::compile`].
#[derive(Debug, Default)]
pub struct CompilationSession {
    pub(crate) symbols: SymbolTable,
    pub(crate) registers: RegisterAllocator,
    pub(crate) labels: LabelTable,
    pub(crate) program: Vec<Instruction>,
}

impl CompilationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowers `root` and resolves every label.
    pub fn compile(mut self, root: &Node) -> Result<Program, Error> {
        debug!("compiling program");
        self.statement(root)?;
        self.finalize()
    }

    pub fn finalize(self) -> Result<Program, Error> {
        let program = self.labels.resolve(self.program)?;
        debug!("compiled {} instructions", program.len());
        Ok(program)
    }

    pub(crate) fn reserve(&mut self, reservation: Reservation) -> Result<RegisterScope<'_>, Error> {
        Ok(RegisterScope::new(self, reservation)?)
    }

    pub(crate) fn emit(
        &mut self,
        opcode: Opcode,
        operands: Vec<Operand>,
        description: impl Into<String>,
    ) {
        let instruction = Instruction::new(opcode, operands, description);
        trace!("{:>3}: {}", self.program.len(), instruction);
        self.program.push(instruction);
    }

    /// `destination`, or the register under the allocator cursor.
    pub(crate) fn current_destination(&self, destination: Option<Operand>) -> Result<Operand, Error> {
        match destination {
            Some(destination) => Ok(destination),
            None => Ok(self.registers.current()?.into()),
        }
    }

    pub(crate) fn insert_label(&mut self, label: Option<Label>) -> Label {
        self.labels.insert(label, self.program.len())
    }

    pub(crate) fn push_copy(&mut self, source: Operand, destination: Operand) {
        let description = format!("{} -> {}", source, destination);
        self.emit(Opcode::Move, vec![destination, source], description);
    }

    pub(crate) fn push_jump(&mut self, label: Option<Label>) -> Label {
        let label = self.labels.reference(label);
        self.emit(
            Opcode::J,
            vec![Operand::Label(label)],
            format!("Jump to {{{}}}", label),
        );
        label
    }

    /// `beq condition 0 label`: skips ahead when the condition is false.
    pub(crate) fn push_jump_unless(&mut self, condition: Operand, label: Option<Label>) -> Label {
        let label = self.labels.reference(label);
        let description = format!("Jump to {{{}}} if not {}", label, condition);
        self.emit(
            Opcode::Beq,
            vec![condition, Operand::zero(), Operand::Label(label)],
            description,
        );
        label
    }

    pub(crate) fn statement(&mut self, node: &Node) -> Result<(), Error> {
        match node {
            Node::Root(statements) | Node::Suite(statements) => {
                for statement in statements {
                    self.statement(statement)?;
                }
                Ok(())
            }
            Node::Assignment(assignment) => self.assignment(assignment),
            Node::If(statement) => self.if_statement(statement),
            Node::While(statement) => self.while_statement(statement),
            Node::Yield => {
                self.emit(Opcode::Yield, vec![], "yield");
                Ok(())
            }
            expression => {
                self.expression(expression, None)?;
                Ok(())
            }
        }
    }

    /// Reads a name: variables first, then device aliases.
    pub(crate) fn variable(&self, name: &str) -> Result<Value, Error> {
        if let Some(location) = self.symbols.variable(name) {
            return Ok(Value::Operand(location.clone()));
        }
        if let Some(device) = self.symbols.device(name) {
            return Ok(Value::Device(device.clone()));
        }
        Err(Error::UnboundLocal(name.to_string()))
    }

    /// Like [`Self::variable`], but an unknown name is bound to the register
    /// under the cursor for the rest of the compile.
    fn variable_target(&mut self, name: &str) -> Result<Value, Error> {
        match self.variable(name) {
            Err(Error::UnboundLocal(_)) => {
                let register = self.registers.reserve()?;
                debug!("bound `{}` to {}", name, register);
                self.symbols.bind_variable(name, register.into());
                Ok(Value::Operand(register.into()))
            }
            other => other,
        }
    }

    fn assignment(&mut self, statement: &AssignmentStatement) -> Result<(), Error> {
        // `x op= e` is `x = x op e`
        let desugared;
        let value: &Node = match statement.operator.binary_operator() {
            None => &statement.value,
            Some(operator) => {
                desugared = Node::Arithmetic(OperatorChain {
                    first: statement.target.clone(),
                    rest: vec![(operator, (*statement.value).clone())],
                });
                &desugared
            }
        };

        if return_type(&self.symbols, value)? == ReturnType::Device {
            return self.alias_assignment(&statement.target, value);
        }

        match self.assignment_target(&statement.target)? {
            Target::Operand(destination) => {
                let lands_in_place = can_assign(&self.symbols, value);
                let source = {
                    let mut scope = self.reserve(Reservation::Into(destination.clone()))?;
                    let s0 = scope.destination();
                    scope.operand(value, s0)?
                };
                if !lands_in_place {
                    self.push_copy(source, destination);
                }
            }
            Target::Property(device) => {
                let source = {
                    let mut scope = self.reserve(Reservation::Fresh)?;
                    let s0 = scope.destination();
                    scope.operand(value, s0)?
                };
                self.store_property(&device, source)?;
            }
        }

        Ok(())
    }

    fn assignment_target(&mut self, target: &Node) -> Result<Target, Error> {
        match target {
            Node::Variable(name) => match self.variable_target(name)? {
                Value::Operand(operand) => Ok(Target::Operand(operand)),
                Value::Device(_) => Err(Error::Type(format!(
                    "cannot assign a value to device alias `{}`",
                    name
                ))),
            },
            Node::Location(location) => Ok(Target::Operand(Operand::Location(location.clone()))),
            Node::DotAccess(access) => Ok(Target::Property(self.property_target(access)?)),
            Node::SlotAccess(slot) => Err(Error::CannotSet(slot.access.property.clone())),
            other => Err(Error::Code(format!("`{}` is not assignable", other))),
        }
    }

    fn alias_assignment(&mut self, target: &Node, value: &Node) -> Result<(), Error> {
        let Node::Variable(name) = target else {
            return Err(Error::Type(format!("cannot assign a device to `{}`", target)));
        };

        let device = match value {
            Node::Variable(source) => self
                .symbols
                .device(source)
                .cloned()
                .ok_or_else(|| Error::UnboundLocal(source.clone()))?,
            other => match self.expression(other, None)? {
                Value::Device(device) => device,
                Value::Operand(operand) => {
                    return Err(Error::Type(format!("`{}` is not a device", operand)));
                }
            },
        };

        debug!("`{}` now aliases {}", name, device);
        self.symbols.alias_device(name.clone(), device);
        Ok(())
    }
}
