use parser::tree_node::Node;

/// A test that is a single `==` / `!=` comparison can be emitted as the
/// conditional branch itself instead of computing a boolean first.
pub fn can_branch(node: &Node) -> bool {
    match node {
        Node::Comparison(chain) => {
            chain.rest.len() == 1 && chain.first_operator().is_some_and(|op| op.is_equality())
        }
        _ => false,
    }
}
