use crate::{instruction::Operand, symbols::SymbolTable};
use parser::tree_node::Node;

/// Whether evaluating `node` reads `location`, through a bound name or a raw
/// location. A value must not be written there before such a read.
pub fn reads(symbols: &SymbolTable, node: &Node, location: &Operand) -> bool {
    let reads = |node: &Node| self::reads(symbols, node, location);

    match node {
        Node::Variable(name) => symbols.variable(name) == Some(location),
        Node::Location(name) => *name == location.to_string(),
        Node::Or(operands) | Node::And(operands) => operands.iter().any(reads),
        Node::Not(inner) | Node::Negation(inner) => reads(inner),
        Node::Comparison(chain) | Node::Arithmetic(chain) | Node::Term(chain) => {
            reads(&chain.first) || chain.rest.iter().any(|(_, right)| reads(right))
        }
        Node::Test(ternary) => {
            reads(&ternary.test) || reads(&ternary.value) || reads(&ternary.otherwise)
        }
        Node::Call(call) => call.arguments.iter().any(reads),
        Node::SlotAccess(slot) => reads(&slot.index),
        _ => false,
    }
}
