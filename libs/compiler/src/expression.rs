use crate::{
    Error,
    instruction::{Label, Opcode, Operand},
    lookahead::{is_constant, reads},
    session::{CompilationSession, Value},
    symbols::Callable,
    variable_manager::Reservation,
};
use parser::tree_node::{BinaryOperator, CallExpression, Node, OperatorChain};
use tokenizer::token::Number;

/// The left side of a binary operation: either still to be lowered, or the
/// register an earlier step of the chain left its result in.
enum Lhs<'n> {
    Pending(&'n Node),
    Ready(Operand),
}

/// Whether lowering `node` into a destination emits a write to it. Names and
/// literals are referenced where they are.
fn writes(node: &Node) -> bool {
    !is_constant(node) && !matches!(node, Node::Variable(_))
}

fn number(number: &Number) -> Operand {
    Operand::number(number.to_string())
}

impl CompilationSession {
    /// Lowers `node`. When `destination` is given the value is computed into it
    /// wherever the node allows; literals and bound names are returned as-is.
    pub(crate) fn expression(
        &mut self,
        node: &Node,
        destination: Option<Operand>,
    ) -> Result<Value, Error> {
        let operand = match node {
            Node::Variable(name) => return self.variable(name),
            Node::Location(location) => Operand::Location(location.clone()),
            Node::Number(n) => number(n),
            Node::Boolean(true) => Operand::number("1"),
            Node::Boolean(false) => Operand::zero(),
            Node::String(s) => {
                return Err(Error::Type(format!(
                    "string \"{}\" can only name a device",
                    s
                )));
            }
            Node::Negation(inner) => self.negation(inner, destination)?,
            Node::Test(ternary) => self.ternary(ternary, destination)?,
            Node::Or(operands) => self.fold(BinaryOperator::Or, operands, destination)?,
            Node::And(operands) => self.fold(BinaryOperator::And, operands, destination)?,
            Node::Not(inner) => self.not(inner, destination)?,
            Node::Comparison(chain) | Node::Arithmetic(chain) | Node::Term(chain) => {
                self.reduce(chain, destination, None)?
            }
            Node::Call(call) => return self.call(call, destination),
            Node::DotAccess(access) => self.load_property(access, destination)?,
            Node::SlotAccess(slot) => self.load_slot(slot, destination)?,
            Node::Root(_)
            | Node::Suite(_)
            | Node::Assignment(_)
            | Node::If(_)
            | Node::While(_)
            | Node::Yield => {
                return Err(Error::Code(format!("`{}` is not an expression", node)));
            }
        };

        Ok(Value::Operand(operand))
    }

    /// [`Self::expression`] for places that need a number.
    pub(crate) fn operand(
        &mut self,
        node: &Node,
        destination: Option<Operand>,
    ) -> Result<Operand, Error> {
        match self.expression(node, destination)? {
            Value::Operand(operand) => Ok(operand),
            Value::Device(device) => Err(Error::Type(format!(
                "device `{}` cannot be used as a value",
                device.name.as_deref().unwrap_or(&device.id)
            ))),
        }
    }

    /// Lowers an `if` / `while` test. A comparison given a `branch` label is
    /// emitted as the jump itself.
    pub(crate) fn condition(
        &mut self,
        test: &Node,
        destination: Option<Operand>,
        branch: Option<Label>,
    ) -> Result<Operand, Error> {
        match test {
            Node::Comparison(chain) => self.reduce(chain, destination, branch),
            other => self.operand(other, destination),
        }
    }

    /// Folds `a op b op c ...` left to right. Intermediate results share one
    /// temporary, the last step writes straight into `destination`.
    pub(crate) fn reduce(
        &mut self,
        chain: &OperatorChain,
        destination: Option<Operand>,
        branch: Option<Label>,
    ) -> Result<Operand, Error> {
        let steps = chain.rest.len();
        let mut scope = self.reserve(Reservation::into_or_fresh(if steps >= 2 {
            None
        } else {
            destination.clone()
        }))?;
        let accumulator = scope
            .destination()
            .ok_or_else(|| Error::Code("operator chain without an accumulator".into()))?;

        let mut left = Lhs::Pending(&chain.first);
        let mut result = None;
        for (i, (operator, right)) in chain.rest.iter().enumerate() {
            let last = i + 1 == steps;
            let (store, branch) = if last {
                (destination.clone(), branch)
            } else {
                (Some(accumulator.clone()), None)
            };

            result = Some(scope.binary(left, *operator, right, store, branch)?);
            left = Lhs::Ready(accumulator.clone());
        }

        result.ok_or_else(|| Error::Code(format!("empty operator chain `{}`", chain)))
    }

    fn binary(
        &mut self,
        left: Lhs<'_>,
        operator: BinaryOperator,
        right: &Node,
        destination: Option<Operand>,
        branch: Option<Label>,
    ) -> Result<Operand, Error> {
        let (r0, r1) = {
            let left_into = match &left {
                Lhs::Pending(node) if writes(node) => {
                    self.unclobbered(destination.clone(), std::slice::from_ref(right))
                }
                _ => destination.clone(),
            };
            let mut scope = self.reserve(Reservation::into_or_fresh(left_into))?;
            let s0 = scope.destination();
            let r0 = match left {
                Lhs::Pending(node) => scope.operand(node, s0)?,
                Lhs::Ready(operand) => operand,
            };

            let mut scope = scope.reserve(Reservation::constant_or_fresh(is_constant(right)))?;
            let s1 = scope.destination();
            (r0, scope.operand(right, s1)?)
        };

        let destination = self.current_destination(destination)?;

        if let Some(label) = branch {
            // fused tests jump when the comparison is false
            let opcode = match operator {
                BinaryOperator::Equal => Some(Opcode::Bne),
                BinaryOperator::NotEqual => Some(Opcode::Beq),
                _ => None,
            };
            if let Some(opcode) = opcode {
                let label = self.labels.reference(Some(label));
                let inverse = if opcode == Opcode::Bne { "!=" } else { "==" };
                let description = format!("Jump to {{{}}} iff {} {} {}", label, r0, inverse, r1);
                self.emit(opcode, vec![r0, r1, Operand::Label(label)], description);
                return Ok(destination);
            }
        }

        let opcode = match operator {
            BinaryOperator::Add => Opcode::Add,
            BinaryOperator::Subtract => Opcode::Sub,
            BinaryOperator::Multiply => Opcode::Mul,
            BinaryOperator::Divide => Opcode::Div,
            BinaryOperator::Modulo => Opcode::Mod,
            BinaryOperator::And => Opcode::And,
            BinaryOperator::Or => Opcode::Or,
            BinaryOperator::LessThan => Opcode::Slt,
            BinaryOperator::GreaterThan => Opcode::Sgt,
            BinaryOperator::LessThanOrEqual => Opcode::Sle,
            BinaryOperator::GreaterThanOrEqual => Opcode::Sge,
            BinaryOperator::Equal => Opcode::Seq,
            BinaryOperator::NotEqual => Opcode::Sne,
        };
        let description = match operator {
            BinaryOperator::Add
            | BinaryOperator::Subtract
            | BinaryOperator::Multiply
            | BinaryOperator::Divide
            | BinaryOperator::Modulo
            | BinaryOperator::And
            | BinaryOperator::Or => format!("{} {} {} -> {}", r0, opcode, r1, destination),
            comparison => format!("{} {} {} -> {}", r0, comparison, r1, destination),
        };
        self.emit(opcode, vec![destination.clone(), r0, r1], description);

        Ok(destination)
    }

    /// `and` / `or` over any number of operands, accumulated in one register.
    fn fold(
        &mut self,
        operator: BinaryOperator,
        operands: &[Node],
        destination: Option<Operand>,
    ) -> Result<Operand, Error> {
        let Some((first, rest)) = operands.split_first() else {
            return Err(Error::Code(format!("`{}` without operands", operator)));
        };

        // the accumulator must not be the destination while later operands read it
        let later = rest.get(1..).unwrap_or_default();
        let accumulate_into = self.unclobbered(destination.clone(), later);
        let mut scope = self.reserve(Reservation::into_or_fresh(accumulate_into))?;
        let accumulator = scope
            .destination()
            .ok_or_else(|| Error::Code(format!("`{}` without an accumulator", operator)))?;

        let mut left = Lhs::Pending(first);
        let mut result = accumulator.clone();
        for (i, right) in rest.iter().enumerate() {
            let store = match &destination {
                Some(destination) if i + 1 == rest.len() => destination.clone(),
                _ => accumulator.clone(),
            };
            result = scope.binary(left, operator, right, Some(store), None)?;
            left = Lhs::Ready(accumulator.clone());
        }

        Ok(result)
    }

    fn not(&mut self, inner: &Node, destination: Option<Operand>) -> Result<Operand, Error> {
        let mut scope = self.reserve(Reservation::into_or_fresh(destination))?;
        let destination = scope
            .destination()
            .ok_or_else(|| Error::Code("`not` without a destination".into()))?;

        let value = scope.operand(inner, Some(destination.clone()))?;
        let description = format!("not {} -> {}", value, destination);
        scope.emit(
            Opcode::Xor,
            vec![destination.clone(), value, Operand::number("1")],
            description,
        );

        Ok(destination)
    }

    fn negation(&mut self, inner: &Node, destination: Option<Operand>) -> Result<Operand, Error> {
        if let Node::Number(n) = inner {
            return Ok(Operand::number(format!("-{}", n)));
        }

        let value = {
            let mut scope = self.reserve(Reservation::into_or_fresh(destination.clone()))?;
            let s0 = scope.destination();
            scope.operand(inner, s0)?
        };
        let destination = self.current_destination(destination)?;
        let description = format!("-{} -> {}", value, destination);
        self.emit(
            Opcode::Sub,
            vec![destination.clone(), Operand::zero(), value],
            description,
        );

        Ok(destination)
    }

    fn call(&mut self, call: &CallExpression, destination: Option<Operand>) -> Result<Value, Error> {
        let callable = self
            .symbols
            .callable(&call.name)
            .ok_or_else(|| Error::Name(call.name.clone()))?;

        let builtin = match callable {
            Callable::Alias => return self.alias_call(call).map(Value::Device),
            Callable::Builtin(builtin) => builtin,
        };

        let mut container = self.reserve(Reservation::into_or_fresh(destination.clone()))?;
        let result = container
            .destination()
            .ok_or_else(|| Error::Code(format!("`{}` without a destination", call.name)))?;

        check_arity(&call.name, builtin.arity, call.arguments.len())?;

        let first_into = match call.arguments.split_first() {
            Some((first, rest)) if writes(first) => container.unclobbered(destination, rest),
            _ => destination,
        };
        let mut scope = container.reserve(Reservation::into_or_fresh(first_into))?;
        let s0 = scope.destination();
        let opcode = builtin.opcode;

        let arguments = match call.arguments.as_slice() {
            [] if builtin.returns => {
                scope.emit(opcode, vec![result.clone()], format!("{} -> {}", opcode, result));
                return Ok(Value::Operand(result));
            }
            [] => {
                return Err(Error::Code(format!(
                    "`{}` takes no arguments and returns nothing",
                    call.name
                )));
            }
            [left] => vec![scope.operand(left, s0)?],
            [left, right] => {
                let r0 = scope.operand(left, s0)?;
                let mut scope = scope.reserve(Reservation::constant_or_fresh(is_constant(right)))?;
                let s1 = scope.destination();
                vec![r0, scope.operand(right, s1)?]
            }
            _ => {
                return Err(Error::Code(format!(
                    "`{}` has more than two parameters",
                    call.name
                )));
            }
        };

        let listed = arguments
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<String>>()
            .join(", ");

        if builtin.returns {
            let description = format!("{}({}) -> {}", opcode, listed, result);
            let mut operands = vec![result.clone()];
            operands.extend(arguments);
            scope.emit(opcode, operands, description);
            Ok(Value::Operand(result))
        } else {
            scope.emit(opcode, arguments, format!("{}({})", opcode, listed));
            Ok(Value::Operand(Operand::zero()))
        }
    }

    /// `destination`, unless one of `later` reads it. A value written there
    /// early would be seen by that read, so the caller computes into a fresh
    /// register instead.
    fn unclobbered(&self, destination: Option<Operand>, later: &[Node]) -> Option<Operand> {
        destination.filter(|destination| {
            !later
                .iter()
                .any(|node| reads(&self.symbols, node, destination))
        })
    }
}

pub(crate) fn check_arity(name: &str, required: usize, given: usize) -> Result<(), Error> {
    if given < required {
        return Err(Error::MissingArguments(name.to_string(), required - given));
    }
    if given > required {
        return Err(Error::TooManyArguments(name.to_string(), required, given));
    }
    Ok(())
}
