use anyhow::{Context, anyhow, bail};
use std::collections::HashMap;

const REGISTER_COUNT: usize = 16;
const INSTRUCTION_BUDGET: usize = 128;
const PORTS: [&str; 7] = ["d0", "d1", "d2", "d3", "d4", "d5", "db"];

/// A minimal register machine for compiled listings.
///
/// Device state lives in one map keyed by `device.Property`,
/// `device.Property[slot]` or `device.Reagent.Mode.Reagent`. Reading a key
/// nobody set is an error, so tests have to declare their inputs.
#[derive(Debug)]
pub struct Machine {
    program: Vec<Vec<String>>,
    registers: [f64; REGISTER_COUNT],
    output: f64,
    devices: HashMap<String, f64>,
    aliases: HashMap<String, String>,
    pc: usize,
    executed: usize,
    slept: f64,
    yielded: bool,
    highest_register: Option<usize>,
}

fn python_mod(a: f64, b: f64) -> f64 {
    a - b * (a / b).floor()
}

fn truthy(value: f64) -> bool {
    value != 0.0
}

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

impl Machine {
    pub fn new(listing: &str) -> anyhow::Result<Self> {
        let program = listing
            .lines()
            .map(|line| line.split('#').next().unwrap_or_default().trim())
            .filter(|line| !line.is_empty())
            .map(|line| line.split_whitespace().map(String::from).collect())
            .collect();

        Ok(Self {
            program,
            registers: [0.0; REGISTER_COUNT],
            output: 0.0,
            devices: HashMap::new(),
            aliases: HashMap::new(),
            pc: 0,
            executed: 0,
            slept: 0.0,
            yielded: false,
            highest_register: None,
        })
    }

    /// Presets a device value, e.g. `with_input("d0.Pressure", 1500.0)`.
    pub fn with_input(mut self, key: &str, value: f64) -> Self {
        self.devices.insert(key.to_string(), value);
        self
    }

    pub fn instruction_count(&self) -> usize {
        self.program.len()
    }

    pub fn register(&self, index: usize) -> f64 {
        self.registers[index]
    }

    pub fn output(&self) -> f64 {
        self.output
    }

    pub fn device(&self, key: &str) -> Option<f64> {
        self.devices.get(key).copied()
    }

    pub fn slept(&self) -> f64 {
        self.slept
    }

    pub fn yielded(&self) -> bool {
        self.yielded
    }

    pub fn highest_register(&self) -> Option<usize> {
        self.highest_register
    }

    /// Runs from the start until the program ends or yields.
    pub fn execute(&mut self) -> anyhow::Result<()> {
        self.pc = 0;
        self.yielded = false;

        while self.pc < self.program.len() {
            if self.executed == INSTRUCTION_BUDGET {
                bail!("instruction budget of {} exhausted", INSTRUCTION_BUDGET);
            }
            self.executed += 1;

            let line = self.program[self.pc].clone();
            self.pc += 1;
            self.step(&line)
                .with_context(|| format!("executing `{}`", line.join(" ")))?;

            if self.yielded {
                break;
            }
        }

        Ok(())
    }

    fn register_index(&mut self, token: &str) -> Option<usize> {
        let index = token.strip_prefix('r')?.parse::<usize>().ok()?;
        if index >= REGISTER_COUNT {
            return None;
        }
        self.highest_register = self.highest_register.max(Some(index));
        Some(index)
    }

    fn value(&mut self, token: &str) -> anyhow::Result<f64> {
        if let Some(index) = self.register_index(token) {
            return Ok(self.registers[index]);
        }
        if token == "o" {
            return Ok(self.output);
        }
        token
            .parse::<f64>()
            .map_err(|_| anyhow!("`{}` is not a value", token))
    }

    fn store(&mut self, token: &str, value: f64) -> anyhow::Result<()> {
        if let Some(index) = self.register_index(token) {
            self.registers[index] = value;
        } else if token == "o" {
            self.output = value;
        } else {
            bail!("`{}` is not writable", token);
        }
        Ok(())
    }

    fn port(&self, token: &str) -> anyhow::Result<String> {
        if PORTS.contains(&token) {
            return Ok(token.to_string());
        }
        self.aliases
            .get(token)
            .cloned()
            .ok_or_else(|| anyhow!("`{}` is not a declared device", token))
    }

    fn read_device(&self, key: String) -> anyhow::Result<f64> {
        self.devices
            .get(&key)
            .copied()
            .ok_or_else(|| anyhow!("device value `{}` was never set", key))
    }

    fn jump(&mut self, token: &str) -> anyhow::Result<()> {
        let target = token
            .parse::<usize>()
            .map_err(|_| anyhow!("`{}` is not a jump target", token))?;
        if target > self.program.len() {
            bail!("jump target {} is past the end", target);
        }
        self.pc = target;
        Ok(())
    }

    fn step(&mut self, line: &[String]) -> anyhow::Result<()> {
        let args = line.iter().map(String::as_str).collect::<Vec<&str>>();

        match args.as_slice() {
            ["move", d, s] => {
                let v = self.value(s)?;
                self.store(d, v)?;
            }
            ["alias", name, port] => {
                let port = self.port(port)?;
                self.aliases.insert(name.to_string(), port);
            }
            ["yield"] => self.yielded = true,
            ["rand", d] => self.store(d, 0.5)?,
            ["sleep", s] => self.slept += self.value(s)?,
            ["j", target] => self.jump(target)?,
            [op @ ("beq" | "bne"), a, b, target] => {
                let equal = self.value(a)? == self.value(b)?;
                if equal == (*op == "beq") {
                    self.jump(target)?;
                }
            }
            ["l", d, device, property] => {
                let key = format!("{}.{}", self.port(device)?, property);
                let v = self.read_device(key)?;
                self.store(d, v)?;
            }
            ["ls", d, device, slot, property] => {
                let slot = self.value(slot)?;
                let key = format!("{}.{}[{}]", self.port(device)?, property, slot);
                let v = self.read_device(key)?;
                self.store(d, v)?;
            }
            ["lr", d, device, mode, reagent] => {
                let key = format!("{}.Reagent.{}.{}", self.port(device)?, mode, reagent);
                let v = self.read_device(key)?;
                self.store(d, v)?;
            }
            ["s", device, property, s] => {
                let key = format!("{}.{}", self.port(device)?, property);
                let v = self.value(s)?;
                self.devices.insert(key, v);
            }
            [op, d, a] => {
                let a = self.value(a)?;
                let v = match *op {
                    "abs" => a.abs(),
                    "acos" => a.acos(),
                    "asin" => a.asin(),
                    "sin" => a.sin(),
                    "cos" => a.cos(),
                    "tan" => a.tan(),
                    "exp" => a.exp(),
                    "floor" => a.floor(),
                    "ceil" => a.ceil(),
                    "trunc" => a.trunc(),
                    "log" => a.ln(),
                    "round" => a.round(),
                    "sqrt" => a.sqrt(),
                    other => bail!("unknown unary instruction `{}`", other),
                };
                self.store(d, v)?;
            }
            [op, d, a, b] => {
                let (a, b) = (self.value(a)?, self.value(b)?);
                let v = match *op {
                    "add" => a + b,
                    "sub" => a - b,
                    "mul" => a * b,
                    "div" => a / b,
                    "mod" => python_mod(a, b),
                    "min" => a.min(b),
                    "max" => a.max(b),
                    "and" => {
                        if truthy(a) {
                            b
                        } else {
                            a
                        }
                    }
                    "or" => {
                        if truthy(a) {
                            a
                        } else {
                            b
                        }
                    }
                    "xor" => flag(truthy(a) != truthy(b)),
                    "slt" => flag(a < b),
                    "sgt" => flag(a > b),
                    "sle" => flag(a <= b),
                    "sge" => flag(a >= b),
                    "seq" => flag(a == b),
                    "sne" => flag(a != b),
                    other => bail!("unknown binary instruction `{}`", other),
                };
                self.store(d, v)?;
            }
            other => bail!("malformed instruction `{}`", other.join(" ")),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_comments_and_blank_lines_are_skipped() -> anyhow::Result<()> {
        let mut machine = Machine::new(indoc! {"
            move r0 2 # 2 -> r0

            add o r0 3 # r0 add 3 -> o
        "})?;
        machine.execute()?;

        assert_eq!(machine.instruction_count(), 2);
        assert_eq!(machine.output(), 5.0);
        assert_eq!(machine.highest_register(), Some(0));
        Ok(())
    }

    #[test]
    fn test_python_semantics() -> anyhow::Result<()> {
        let mut machine = Machine::new(indoc! {"
            mod r0 -7 3
            and r1 0 5
            or r2 0 5
            xor r3 2 1
        "})?;
        machine.execute()?;

        assert_eq!(machine.register(0), 2.0);
        assert_eq!(machine.register(1), 0.0);
        assert_eq!(machine.register(2), 5.0);
        assert_eq!(machine.register(3), 0.0);
        Ok(())
    }

    #[test]
    fn test_unset_device_values_fail() -> anyhow::Result<()> {
        let mut machine = Machine::new("l r0 d0 Pressure")?;
        assert!(machine.execute().is_err());

        let mut machine = Machine::new("l r0 d0 Pressure")?.with_input("d0.Pressure", 101.0);
        machine.execute()?;
        assert_eq!(machine.register(0), 101.0);
        Ok(())
    }

    #[test]
    fn test_undeclared_alias_fails() -> anyhow::Result<()> {
        let mut machine = Machine::new("s Valve On 1")?;
        assert!(machine.execute().is_err());
        Ok(())
    }

    #[test]
    fn test_endless_loop_hits_budget() -> anyhow::Result<()> {
        let mut machine = Machine::new("j 0")?;
        assert!(machine.execute().is_err());
        Ok(())
    }
}
