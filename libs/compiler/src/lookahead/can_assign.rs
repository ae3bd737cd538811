use crate::symbols::{Callable, SymbolTable};
use parser::tree_node::Node;

use super::is_constant;

/// Whether lowering `node` with a destination leaves the value in that
/// destination, so no trailing `move` is needed.
pub fn can_assign(symbols: &SymbolTable, node: &Node) -> bool {
    match node {
        Node::Location(_)
        | Node::DotAccess(_)
        | Node::SlotAccess(_)
        | Node::Test(_)
        | Node::Comparison(_)
        | Node::Arithmetic(_)
        | Node::Term(_)
        | Node::And(_)
        | Node::Or(_)
        | Node::Not(_) => true,
        // `-5` is literal text, anything else is computed in place
        Node::Negation(inner) => !is_constant(inner),
        Node::Call(call) => matches!(
            symbols.callable(&call.name),
            Some(Callable::Builtin(builtin)) if builtin.returns
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parser::Parser;
    use tokenizer::Tokenizer;

    fn value_of(source: &str) -> anyhow::Result<Node> {
        let mut parser = Parser::new(Tokenizer::from(source));
        match parser.parse_all()? {
            Node::Root(mut statements) => match statements.pop() {
                Some(Node::Assignment(assignment)) => Ok(*assignment.value),
                other => anyhow::bail!("expected an assignment, found {:?}", other),
            },
            other => anyhow::bail!("expected a root node, found {:?}", other),
        }
    }

    #[test]
    fn test_computed_values_land_in_place() -> anyhow::Result<()> {
        let symbols = SymbolTable::default();

        assert!(can_assign(&symbols, &value_of("a = 1 + 2")?));
        assert!(can_assign(&symbols, &value_of("a = b and c")?));
        assert!(can_assign(&symbols, &value_of("a = 1 if b else 2")?));
        assert!(can_assign(&symbols, &value_of("a = max(1, 2)")?));
        assert!(can_assign(&symbols, &value_of("a = -b")?));
        Ok(())
    }

    #[test]
    fn test_plain_values_need_a_move() -> anyhow::Result<()> {
        let symbols = SymbolTable::default();

        assert!(!can_assign(&symbols, &value_of("a = 1")?));
        assert!(!can_assign(&symbols, &value_of("a = b")?));
        assert!(!can_assign(&symbols, &value_of("a = True")?));
        assert!(!can_assign(&symbols, &value_of("a = -4")?));
        assert!(!can_assign(&symbols, &value_of("a = sleep(1)")?));
        assert!(!can_assign(&symbols, &value_of("a = unknown(1)")?));
        Ok(())
    }
}
