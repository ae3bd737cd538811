#[macro_export]
macro_rules! parser {
    ($input:expr) => {
        Parser::new(Tokenizer::from($input))
    };
}

mod blocks;
use super::Parser;
use super::tree_node::*;
use anyhow::Result;
use pretty_assertions::assert_eq;
use tokenizer::Tokenizer;

fn parse(input: &str) -> Result<String> {
    Ok(parser!(input).parse_all()?.to_string())
}

#[test]
fn test_assignment() -> Result<()> {
    assert_eq!("(a = 5)", parse("a = 5")?);
    assert_eq!("(a += 1); (b %= 2)", parse("a += 1\nb %= 2\n")?);
    assert_eq!("(valve.On = True)", parse("valve.On = True")?);
    assert_eq!("(sorter.Occupant[0] = 1)", parse("sorter.Occupant[0] = 1")?);

    Ok(())
}

#[test]
fn test_invalid_assignment_target() {
    assert!(parser!("1 = a").parse_all().is_err());
    assert!(parser!("min(1, 2) = a").parse_all().is_err());
    assert!(parser!("a + 1 = 2").parse_all().is_err());
}

#[test]
fn test_operator_precedence() -> Result<()> {
    assert_eq!("(a = (1 + (2 * 3) - 4))", parse("a = 1 + 2 * 3 - 4")?);
    assert_eq!("(a = ((1 + 2) * 3))", parse("a = (1 + 2) * 3")?);
    assert_eq!("(a = ((1 + 2) < (3 * 4)))", parse("a = 1 + 2 < 3 * 4")?);

    Ok(())
}

#[test]
fn test_boolean_operators() -> Result<()> {
    assert_eq!(
        "(a = (b or (c and d) or (not e)))",
        parse("a = b or c and d or not e")?
    );
    assert_eq!("(a = (not (not b)))", parse("a = not not b")?);

    Ok(())
}

#[test]
fn test_negation() -> Result<()> {
    assert_eq!("(a = (-20))", parse("a = -20")?);
    assert_eq!("(a = ((-b) * 2))", parse("a = -b * 2")?);
    assert_eq!("(a = 3)", parse("a = +3")?);

    Ok(())
}

#[test]
fn test_ternary() -> Result<()> {
    assert_eq!("(out = (1 if 0 else 2))", parse("out = 1 if 0 else 2")?);
    assert_eq!(
        "(out = (1 if a else (2 if b else 3)))",
        parse("out = 1 if a else 2 if b else 3")?
    );

    Ok(())
}

#[test]
fn test_ternary_requires_else() {
    assert!(parser!("out = 1 if 0").parse_all().is_err());
}

#[test]
fn test_call_arguments() -> Result<()> {
    assert_eq!("(a = rand())", parse("a = rand()")?);
    assert_eq!(
        "(a = max(max((1 + 20), 20), min((1 - 2), (-20))))",
        parse("a = max(max(1 + 20, 20), min(1 - 2, -20))")?
    );
    assert_eq!("sleep(1)", parse("sleep(1)")?);

    Ok(())
}

#[test]
fn test_locations() -> Result<()> {
    let root = parser!(r#"sensor = device(d0, "Sensor")"#).parse_all()?;

    let Node::Root(statements) = root else {
        panic!("expected a root node");
    };
    let Node::Assignment(assignment) = &statements[0] else {
        panic!("expected an assignment");
    };
    let Node::Call(call) = assignment.value.as_ref() else {
        panic!("expected a call");
    };

    assert_eq!(call.arguments[0], Node::Location(String::from("d0")));
    assert_eq!(call.arguments[1], Node::String(String::from("Sensor")));
    assert_eq!(*assignment.target, Node::Variable(String::from("sensor")));

    Ok(())
}

#[test]
fn test_location_names() {
    assert!(Node::is_location("d0"));
    assert!(Node::is_location("d5"));
    assert!(Node::is_location("r15"));
    assert!(!Node::is_location("d6"));
    assert!(!Node::is_location("r16"));
    assert!(!Node::is_location("r01"));
    assert!(!Node::is_location("db"));
    assert!(!Node::is_location("d"));
    assert!(!Node::is_location("data"));
}

#[test]
fn test_slot_access() -> Result<()> {
    assert_eq!(
        "(out = sorter.Occupant[(i + 1)])",
        parse("out = sorter.Occupant[i + 1]")?
    );

    Ok(())
}

#[test]
fn test_only_properties_are_indexable() {
    assert!(parser!("out = a[0]").parse_all().is_err());
}

#[test]
fn test_number_property_is_a_syntax_error() {
    assert!(parser!("out = 1.Pressure").parse_all().is_err());
}

#[test]
fn test_unexpected_eof() {
    assert!(matches!(
        parser!("out = (1 +").parse_all(),
        Err(crate::Error::UnexpectedToken(_)) | Err(crate::Error::UnexpectedEOF)
    ));
}
