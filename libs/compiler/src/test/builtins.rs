use crate::compile;
use indoc::indoc;
use pretty_assertions::assert_eq;

#[test]
fn nested_builtin_arguments() -> anyhow::Result<()> {
    let compiled = compile! {
        debug
        "
        a = 2
        sleep(min(a + 1, a))
        "
    };

    assert_eq!(
        compiled,
        indoc! {
            "
            move r0 2 # 2 -> r0
            add r2 r0 1 # r0 add 1 -> r2
            min r2 r2 r0 # min(r2, r0) -> r2
            sleep r2 # sleep(r2)
            "
        }
    );

    Ok(())
}

#[test]
fn zero_argument_builtin() -> anyhow::Result<()> {
    let compiled = compile! {
        debug
        "
        a = rand()
        "
    };

    assert_eq!(compiled, "rand r0 # rand -> r0\n");

    Ok(())
}

#[test]
fn builtins_share_the_destination() -> anyhow::Result<()> {
    let compiled = compile! {
        "
        a = max(max(1 + 20, 20), min(1 - 2, -20))
        b = 100
        "
    };

    assert_eq!(
        compiled,
        indoc! {
            "
            add r0 1 20
            max r0 r0 20
            sub r1 1 2
            min r1 r1 -20
            max r0 r0 r1
            move r1 100
            "
        }
    );

    Ok(())
}

#[test]
fn single_argument_builtins() -> anyhow::Result<()> {
    let compiled = compile! {
        "
        out = abs(-3)
        out = floor(1.5) + sqrt(16)
        "
    };

    assert_eq!(
        compiled,
        indoc! {
            "
            abs o -3
            floor o 1.5
            sqrt r0 16
            add o o r0
            "
        }
    );

    Ok(())
}

#[test]
fn side_effect_builtin_yields_zero() -> anyhow::Result<()> {
    let compiled = compile! {
        "
        a = sleep(1)
        "
    };

    assert_eq!(
        compiled,
        indoc! {
            "
            sleep 1
            move r0 0
            "
        }
    );

    Ok(())
}

#[test]
fn side_effects_keep_source_order() -> anyhow::Result<()> {
    let compiled = compile! {
        "
        a = sleep(1) + sleep(2)
        "
    };

    assert_eq!(
        compiled,
        indoc! {
            "
            sleep 1
            sleep 2
            add r0 0 0
            "
        }
    );

    Ok(())
}
