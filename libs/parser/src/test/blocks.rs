use crate::Parser;
use indoc::indoc;
use pretty_assertions::assert_eq;
use tokenizer::Tokenizer;

#[test]
fn test_if_elif_else() -> anyhow::Result<()> {
    let mut parser = crate::parser!(indoc! {"
        if a == 1:
            out = 1
        elif a == 2:
            out = 2
        else:
            out = 3
    "});

    let root = parser.parse_all()?;

    assert_eq!(
        "(if (a == 1) { (out = 1) } elif (a == 2) { (out = 2) } else { (out = 3) })",
        root.to_string()
    );

    Ok(())
}

#[test]
fn test_inline_suite() -> anyhow::Result<()> {
    let mut parser = crate::parser!("if 1 == 1: out = 1\n");

    assert_eq!("(if (1 == 1) { (out = 1) })", parser.parse_all()?.to_string());

    Ok(())
}

#[test]
fn test_while_block() -> anyhow::Result<()> {
    let mut parser = crate::parser!(indoc! {r#"
        sensor = device(d0, "Sensor")
        valve = device(d1, "Valve")
        while sensor.Pressure > 1000:
            valve.On = True
            yield
        valve.On = False
    "#});

    let root = parser.parse_all()?;

    assert_eq!(
        concat!(
            r#"(sensor = device(d0, "Sensor")); (valve = device(d1, "Valve")); "#,
            "(while (sensor.Pressure > 1000) { (valve.On = True); yield }); ",
            "(valve.On = False)"
        ),
        root.to_string()
    );

    Ok(())
}

#[test]
fn test_nested_blocks() -> anyhow::Result<()> {
    let mut parser = crate::parser!(indoc! {"
        while True:
            if a:
                b = 1
            # comment between statements

            c = 2
        d = 3
    "});

    assert_eq!(
        "(while True { (if a { (b = 1) }); (c = 2) }); (d = 3)",
        parser.parse_all()?.to_string()
    );

    Ok(())
}

#[test]
fn test_missing_indented_block() {
    let mut parser = crate::parser!("if a:\nb = 1\n");

    assert!(parser.parse_all().is_err());
}

#[test]
fn test_dangling_else() {
    let mut parser = crate::parser!("else:\n    a = 1\n");

    assert!(parser.parse_all().is_err());
}
