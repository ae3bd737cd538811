use crate::compile;
use indoc::indoc;
use pretty_assertions::assert_eq;

#[test]
fn sensor_controls_valve() -> anyhow::Result<()> {
    let compiled = compile! {
        debug
        r#"
        sensor = device(d0, "Sensor")
        valve = device(d1, "Valve")
        while sensor.Pressure > 1000:
            valve.On = 1
            yield
        valve.On = 0
        "#
    };

    assert_eq!(
        compiled,
        indoc! {
            "
            alias Sensor d0 # alias Sensor d0
            alias Valve d1 # alias Valve d1
            l r0 d0 Pressure # load d0 Pressure to r0
            sgt r0 r0 1000 # r0 > 1000 -> r0
            beq r0 0 8 # Jump to {L2} if not r0
            s d1 On 1 # save 1 to d1 On
            yield # yield
            j 2 # Jump to {L1}
            s d1 On 0 # save 0 to d1 On
            "
        }
    );

    Ok(())
}

#[test]
fn label_alias_and_copy() -> anyhow::Result<()> {
    let compiled = compile! {
        r#"
        pump = label(d2, "Pump")
        same = pump
        same.Setting = pump.Setting + 1
        "#
    };

    assert_eq!(
        compiled,
        indoc! {
            "
            alias Pump d2
            l r0 d2 Setting
            add r0 r0 1
            s d2 Setting r0
            "
        }
    );

    Ok(())
}

#[test]
fn reagent_read() -> anyhow::Result<()> {
    let compiled = compile! {
        debug
        r#"
        furnace = device(d0, "Furnace")
        out = furnace.Reagent_Contents_Iron
        "#
    };

    assert_eq!(
        compiled,
        indoc! {
            "
            alias Furnace d0 # alias Furnace d0
            lr o d0 Contents Iron # load reagent d0 Contents Iron to o
            "
        }
    );

    Ok(())
}

#[test]
fn slot_reads() -> anyhow::Result<()> {
    let compiled = compile! {
        debug
        "
        a = 1
        out = db.Occupied[1]
        out = db.Quantity[a + 1]
        "
    };

    assert_eq!(
        compiled,
        indoc! {
            "
            move r0 1 # 1 -> r0
            ls o db 1 Occupied # load db Occupied[1] to o
            add r1 r0 1 # r0 add 1 -> r1
            ls o db r1 Quantity # load db Quantity[r1] to o
            "
        }
    );

    Ok(())
}

#[test]
fn housing_socket_is_predeclared() -> anyhow::Result<()> {
    let compiled = compile! {
        "
        sleep(db.Setting)
        db.Setting = 2
        "
    };

    assert_eq!(
        compiled,
        indoc! {
            "
            l r1 db Setting
            sleep r1
            s db Setting 2
            "
        }
    );

    Ok(())
}
