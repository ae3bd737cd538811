use parser::tree_node::Node;

/// Operands that can be written as-is without a register: locations, literals
/// and negated number literals.
pub fn is_constant(node: &Node) -> bool {
    match node {
        Node::Location(_) | Node::Number(_) | Node::Boolean(_) => true,
        Node::Negation(inner) => matches!(**inner, Node::Number(_)),
        _ => false,
    }
}
