use crate::{
    Error,
    symbols::{Callable, SymbolTable},
};
use parser::tree_node::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    Numeric,
    /// A device alias, assigning it rebinds a name in the alias table
    Device,
    Unclassified,
}

/// Classifies what `node` evaluates to. Walks every call in the expression,
/// so a call to an unknown name fails here before any code is emitted.
pub fn return_type(symbols: &SymbolTable, node: &Node) -> Result<ReturnType, Error> {
    let return_type = match node {
        Node::Call(call) => match symbols.callable(&call.name) {
            Some(Callable::Alias) => ReturnType::Device,
            Some(Callable::Builtin(_)) => ReturnType::Numeric,
            None => return Err(Error::UnboundLocal(call.name.clone())),
        },
        Node::Variable(name) if symbols.device(name).is_some() => ReturnType::Device,
        Node::Location(_) | Node::Number(_) => ReturnType::Numeric,
        Node::DotAccess(access) => match return_type(symbols, &access.target)? {
            // a property of a device is a plain value
            ReturnType::Device => ReturnType::Unclassified,
            other => other,
        },
        Node::SlotAccess(slot) => {
            return_type(symbols, &slot.index)?;
            ReturnType::Unclassified
        }
        Node::Comparison(chain) | Node::Arithmetic(chain) | Node::Term(chain) => {
            return_type(symbols, &chain.first)?;
            for (_, operand) in &chain.rest {
                return_type(symbols, operand)?;
            }
            ReturnType::Unclassified
        }
        Node::And(operands) | Node::Or(operands) => {
            for operand in operands {
                return_type(symbols, operand)?;
            }
            ReturnType::Unclassified
        }
        Node::Not(inner) | Node::Negation(inner) => {
            return_type(symbols, inner)?;
            ReturnType::Unclassified
        }
        Node::Test(ternary) => {
            return_type(symbols, &ternary.value)?;
            return_type(symbols, &ternary.test)?;
            return_type(symbols, &ternary.otherwise)?;
            ReturnType::Unclassified
        }
        _ => ReturnType::Unclassified,
    };

    Ok(return_type)
}
