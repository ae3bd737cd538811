use crate::{
    Error,
    expression::check_arity,
    instruction::{Opcode, Operand},
    session::{CompilationSession, Value},
    symbols::{Callable, Device},
    variable_manager::Reservation,
};
use parser::tree_node::{CallExpression, DotAccessExpression, Node, SlotAccessExpression};
use std::rc::Rc;
use tracing::debug;

const REAGENT_PREFIX: &str = "Reagent";

/// `Reagent_<Mode>_<Reagent>` properties are read with `lr`.
fn reagent(property: &str) -> Option<Result<(&str, &str), ()>> {
    if !property.starts_with(REAGENT_PREFIX) {
        return None;
    }

    let mut parts = property.split('_').skip(1);
    Some(match (parts.next(), parts.next(), parts.next()) {
        (Some(mode), Some(reagent), None) if !mode.is_empty() && !reagent.is_empty() => {
            Ok((mode, reagent))
        }
        _ => Err(()),
    })
}

impl CompilationSession {
    /// `device(d0, "Name")`: emits the alias and yields the new device.
    pub(crate) fn alias_call(&mut self, call: &CallExpression) -> Result<Rc<Device>, Error> {
        check_arity(&call.name, Callable::Alias.arity(), call.arguments.len())?;

        let port = match &call.arguments[0] {
            Node::Location(port) | Node::Variable(port) => port,
            other => {
                return Err(Error::InvalidDevice(
                    other.to_string(),
                    "expected a device port".into(),
                ));
            }
        };
        let name = match &call.arguments[1] {
            Node::String(name) | Node::Variable(name) => name,
            other => {
                return Err(Error::InvalidDevice(
                    other.to_string(),
                    "expected a device name".into(),
                ));
            }
        };

        let device = Device::new(port.clone(), Some(name.clone()))?;
        let description = format!("alias {} {}", name, port);
        self.emit(
            Opcode::Alias,
            vec![Operand::identifier(name.clone()), Operand::Location(port.clone())],
            description,
        );
        debug!("aliased {} as `{}`", port, name);

        Ok(Rc::new(device))
    }

    /// The device named by `access.target`, with `access.property` appended to its path.
    pub(crate) fn property_target(&mut self, access: &DotAccessExpression) -> Result<Device, Error> {
        let device = match &*access.target {
            Node::Variable(name) => match self.variable(name) {
                Ok(Value::Device(device)) => device,
                Ok(Value::Operand(_)) => {
                    return Err(Error::Attribute(name.clone(), access.property.clone()));
                }
                Err(Error::UnboundLocal(name)) => return Err(Error::Name(name)),
                Err(e) => return Err(e),
            },
            other => {
                return Err(Error::Attribute(other.to_string(), access.property.clone()));
            }
        };

        Ok(device.with_property(access.property.clone()))
    }

    /// `device.Property`
    pub(crate) fn load_property(
        &mut self,
        access: &DotAccessExpression,
        destination: Option<Operand>,
    ) -> Result<Operand, Error> {
        let destination = self.current_destination(destination)?;

        let device = match &*access.target {
            Node::Variable(name) => match self.variable(name)? {
                Value::Device(device) => device,
                Value::Operand(_) => {
                    return Err(Error::Attribute(name.clone(), access.property.clone()));
                }
            },
            other => {
                return Err(Error::Attribute(other.to_string(), access.property.clone()));
            }
        };
        if !self.symbols.is_aliased(&device) {
            return Err(Error::Attribute(device.to_string(), access.property.clone()));
        }

        match reagent(&access.property) {
            Some(Ok((mode, reagent))) => {
                let description = format!(
                    "load reagent {} {} {} to {}",
                    device, mode, reagent, destination
                );
                self.emit(
                    Opcode::Lr,
                    vec![
                        destination.clone(),
                        device.operand(),
                        Operand::identifier(mode),
                        Operand::identifier(reagent),
                    ],
                    description,
                );
            }
            Some(Err(())) => {
                return Err(Error::Attribute(device.to_string(), access.property.clone()));
            }
            None => {
                let description = format!("load {} {} to {}", device, access.property, destination);
                self.emit(
                    Opcode::L,
                    vec![
                        destination.clone(),
                        device.operand(),
                        Operand::identifier(access.property.clone()),
                    ],
                    description,
                );
            }
        }

        Ok(destination)
    }

    /// `device.Property[index]`
    pub(crate) fn load_slot(
        &mut self,
        slot: &SlotAccessExpression,
        destination: Option<Operand>,
    ) -> Result<Operand, Error> {
        let index = {
            let mut scope = self.reserve(Reservation::Fresh)?;
            let r0 = scope.destination();
            scope.operand(&slot.index, r0)?
        };
        let destination = self.current_destination(destination)?;

        let device = self.property_target(&slot.access)?;
        let property = &slot.access.property;
        let description = format!("load {} {}[{}] to {}", device, property, index, destination);
        self.emit(
            Opcode::Ls,
            vec![
                destination.clone(),
                device.operand(),
                index,
                Operand::identifier(property.clone()),
            ],
            description,
        );

        Ok(destination)
    }

    /// `s device Property value`. The property is the single element of the device path.
    pub(crate) fn store_property(&mut self, device: &Device, value: Operand) -> Result<(), Error> {
        let property = match device.path.as_slice() {
            [property] => property,
            _ => {
                return Err(Error::Attribute(device.to_string(), device.path.join(".")));
            }
        };
        if property.starts_with(REAGENT_PREFIX) {
            return Err(Error::CannotSet(property.clone()));
        }

        let description = format!("save {} to {} {}", value, device, property);
        self.emit(
            Opcode::S,
            vec![
                device.operand(),
                Operand::identifier(property.clone()),
                value,
            ],
            description,
        );
        Ok(())
    }
}
